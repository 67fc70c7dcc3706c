//! SMILES string parser.
//!
//! Supports the organic subset, the `*` wildcard, bracket atoms (isotope,
//! aromatic symbols, tetrahedral chirality, hydrogen count, charge, atom
//! class), branches, single- and two-digit ring closures, explicit bond symbols
//! and dot disconnections. Bond direction marks (`/`, `\`) are read as single
//! bonds. Atom classes (`[CH3:1]`) are checked for syntax and then discarded;
//! they never reach the molecule. Parsing stops at the first whitespace, so a
//! trailing name is ignored.
//!
//! Kekulé rings are converted to aromatic form after parsing, so `C1=CC=CC=C1`
//! and `c1ccccc1` give the same molecule.

use std::collections::BTreeMap;

use scscore_core::{Result, ScscoreError};

use crate::aromatic;
use crate::element::{element_by_symbol, Element, WILDCARD};
use crate::molecule::{Bond, BondOrder, Chirality, MolAtom, Molecule};
use crate::stereo;

/// Parse a SMILES string into a `Molecule`.
///
/// An empty string yields an empty molecule.
pub fn parse_smiles(smiles: &str) -> Result<Molecule> {
    let mut parser = SmilesParser::new(smiles.trim_start());
    parser.parse()?;
    parser.check_complete()?;
    parser.into_molecule()
}

/// Position of a neighbor in the order the input wrote it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Atom(usize),
    /// A bracket hydrogen, or the lone pair position of a chiral atom without one
    Hydrogen,
    /// Ring bond opened here, partner not yet known
    PendingRing(u16),
}

struct RingOpening {
    atom: usize,
    order: Option<BondOrder>,
}

struct SmilesParser<'a> {
    input: &'a [u8],
    pos: usize,
    atoms: Vec<MolAtom>,
    bonds: Vec<Bond>,
    bracketed: Vec<bool>,
    written: Vec<Vec<Slot>>,
    ring_closures: BTreeMap<u16, RingOpening>,
    /// Stack of atom indices for branch handling
    stack: Vec<usize>,
    prev_atom: Option<usize>,
    pending_bond: Option<BondOrder>,
}

impl<'a> SmilesParser<'a> {
    fn new(input: &'a str) -> Self {
        SmilesParser {
            input: input.as_bytes(),
            pos: 0,
            atoms: Vec::new(),
            bonds: Vec::new(),
            bracketed: Vec::new(),
            written: Vec::new(),
            ring_closures: BTreeMap::new(),
            stack: Vec::new(),
            prev_atom: None,
            pending_bond: None,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.peek();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn error(&self, msg: impl std::fmt::Display) -> ScscoreError {
        ScscoreError::Parse(format!("{msg} at position {}", self.pos))
    }

    fn set_bond(&mut self, order: BondOrder) -> Result<()> {
        if self.pending_bond.is_some() {
            return Err(self.error("two consecutive bond symbols"));
        }
        if self.prev_atom.is_none() {
            return Err(self.error("bond symbol without preceding atom"));
        }
        self.advance();
        self.pending_bond = Some(order);
        Ok(())
    }

    fn parse(&mut self) -> Result<()> {
        while let Some(ch) = self.peek() {
            match ch {
                b'(' => {
                    let prev = self
                        .prev_atom
                        .ok_or_else(|| self.error("branch without preceding atom"))?;
                    if self.pending_bond.is_some() {
                        return Err(self.error("bond symbol before branch"));
                    }
                    self.advance();
                    self.stack.push(prev);
                }
                b')' => {
                    if self.pending_bond.is_some() {
                        return Err(self.error("dangling bond at end of branch"));
                    }
                    let open = self.stack.pop().ok_or_else(|| self.error("unmatched ')'"))?;
                    self.advance();
                    self.prev_atom = Some(open);
                }
                b'-' | b'/' | b'\\' => self.set_bond(BondOrder::Single)?,
                b'=' => self.set_bond(BondOrder::Double)?,
                b'#' => self.set_bond(BondOrder::Triple)?,
                b':' => self.set_bond(BondOrder::Aromatic)?,
                b'%' => {
                    self.advance();
                    let ring_num = self.parse_two_digit_ring()?;
                    self.handle_ring_closure(ring_num)?;
                }
                b'[' => self.parse_bracket_atom()?,
                b'.' => {
                    if self.pending_bond.is_some() {
                        return Err(self.error("bond symbol before '.'"));
                    }
                    self.advance();
                    self.prev_atom = None;
                }
                c if c.is_ascii_digit() => {
                    self.advance();
                    self.handle_ring_closure((c - b'0') as u16)?;
                }
                b'*' => {
                    self.advance();
                    self.push_atom(MolAtom::new(WILDCARD.atomic_number), false)?;
                }
                c if is_organic_atom_start(c) => self.parse_organic_atom()?,
                c if c.is_ascii_whitespace() => break,
                c => {
                    return Err(self.error(format!("unexpected character '{}'", c as char)));
                }
            }
        }
        Ok(())
    }

    fn parse_organic_atom(&mut self) -> Result<()> {
        let ch = self.advance().unwrap_or_default();
        let is_aromatic = ch.is_ascii_lowercase();

        let symbol = match ch {
            b'B' if self.peek() == Some(b'r') => {
                self.advance();
                "Br"
            }
            b'C' if self.peek() == Some(b'l') => {
                self.advance();
                "Cl"
            }
            b'B' | b'b' => "B",
            b'C' | b'c' => "C",
            b'N' | b'n' => "N",
            b'O' | b'o' => "O",
            b'P' | b'p' => "P",
            b'S' | b's' => "S",
            b'F' => "F",
            b'I' => "I",
            _ => return Err(self.error(format!("unknown organic atom '{}'", ch as char))),
        };

        let elem = self.lookup(symbol)?;
        let mut atom = MolAtom::new(elem.atomic_number);
        atom.is_aromatic = is_aromatic;
        self.push_atom(atom, false)?;
        Ok(())
    }

    fn lookup(&self, symbol: &str) -> Result<Element> {
        element_by_symbol(symbol).ok_or_else(|| self.error(format!("unknown element '{symbol}'")))
    }

    fn parse_bracket_atom(&mut self) -> Result<()> {
        self.advance(); // '['

        let isotope = self.parse_optional_number();
        let ch = self
            .advance()
            .ok_or_else(|| self.error("unexpected end of SMILES in bracket atom"))?;
        if ch != b'*' && !ch.is_ascii_alphabetic() {
            return Err(self.error(format!("expected element symbol, found '{}'", ch as char)));
        }
        let is_aromatic = ch.is_ascii_lowercase();
        let upper = ch.to_ascii_uppercase() as char;

        let two_letter = self.peek().filter(u8::is_ascii_lowercase).map(|next| {
            let mut s = String::from(upper);
            s.push(next as char);
            s
        });
        let symbol = match two_letter {
            _ if ch == b'*' => String::from("*"),
            Some(s) if element_by_symbol(&s).is_some()
                && (!is_aromatic || matches!(s.as_str(), "Se" | "As" | "Te")) =>
            {
                self.advance();
                s
            }
            _ => String::from(upper),
        };
        if is_aromatic && !matches!(symbol.as_str(), "B" | "C" | "N" | "O" | "P" | "S" | "Se" | "As" | "Te") {
            return Err(self.error(format!("'{symbol}' cannot be aromatic")));
        }
        let elem = self.lookup(&symbol)?;

        let chirality = self.parse_chirality()?;

        let mut hydrogens = 0u8;
        if self.peek() == Some(b'H') {
            self.advance();
            hydrogens = match self.peek() {
                Some(d) if d.is_ascii_digit() => {
                    self.advance();
                    d - b'0'
                }
                _ => 1,
            };
        }

        let charge = self.parse_charge()?;

        // Atom class, e.g. [CH3:1]; read and dropped
        if self.peek() == Some(b':') {
            self.advance();
            if self.parse_optional_number().is_none() {
                return Err(self.error("expected atom class number after ':'"));
            }
        }

        if self.advance() != Some(b']') {
            return Err(self.error("expected ']' in bracket atom"));
        }

        let isotope = isotope
            .map(|n| u16::try_from(n).map_err(|_| self.error(format!("isotope {n} out of range"))))
            .transpose()?;

        let atom = MolAtom {
            atomic_number: elem.atomic_number,
            formal_charge: charge,
            isotope,
            is_aromatic,
            implicit_hydrogens: hydrogens,
            chirality,
        };
        let idx = self.push_atom(atom, true)?;
        // Hydrogens sit right after the preceding atom in neighbor order
        let h_slots = if chirality != Chirality::None { hydrogens.max(1) } else { hydrogens };
        for _ in 0..h_slots {
            self.written[idx].push(Slot::Hydrogen);
        }
        Ok(())
    }

    fn parse_chirality(&mut self) -> Result<Chirality> {
        if self.peek() != Some(b'@') {
            return Ok(Chirality::None);
        }
        self.advance();
        if self.peek() == Some(b'@') {
            self.advance();
            return Ok(Chirality::Clockwise);
        }
        let class = (self.peek(), self.peek_at(1));
        match class {
            (Some(b'T'), Some(b'H')) => {
                self.pos += 2;
                match self.advance() {
                    Some(b'1') => Ok(Chirality::CounterClockwise),
                    Some(b'2') => Ok(Chirality::Clockwise),
                    _ => Err(self.error("expected 1 or 2 after '@TH'")),
                }
            }
            (Some(b'A'), Some(b'L'))
            | (Some(b'S'), Some(b'P'))
            | (Some(b'T'), Some(b'B'))
            | (Some(b'O'), Some(b'H')) => Err(self.error("unsupported chirality class")),
            _ => Ok(Chirality::CounterClockwise),
        }
    }

    fn parse_charge(&mut self) -> Result<i8> {
        let sign: i8 = match self.peek() {
            Some(b'+') => 1,
            Some(b'-') => -1,
            _ => return Ok(0),
        };
        let symbol = self.advance().unwrap_or_default();
        if let Some(n) = self.parse_optional_number() {
            let n = i8::try_from(n).map_err(|_| self.error(format!("charge {n} out of range")))?;
            return Ok(sign * n);
        }
        let mut magnitude: i8 = 1;
        while self.peek() == Some(symbol) {
            self.advance();
            magnitude = magnitude.saturating_add(1);
        }
        Ok(sign * magnitude)
    }

    fn parse_optional_number(&mut self) -> Option<u32> {
        let mut n: u32 = 0;
        let mut found = false;
        while let Some(ch) = self.peek().filter(u8::is_ascii_digit) {
            self.advance();
            n = n.saturating_mul(10).saturating_add((ch - b'0') as u32);
            found = true;
        }
        found.then_some(n)
    }

    fn parse_two_digit_ring(&mut self) -> Result<u16> {
        match (self.advance(), self.advance()) {
            (Some(d1), Some(d2)) if d1.is_ascii_digit() && d2.is_ascii_digit() => {
                Ok((d1 - b'0') as u16 * 10 + (d2 - b'0') as u16)
            }
            _ => Err(self.error("expected two digits after '%'")),
        }
    }

    fn push_atom(&mut self, atom: MolAtom, bracketed: bool) -> Result<usize> {
        let idx = self.atoms.len();
        self.atoms.push(atom);
        self.bracketed.push(bracketed);
        self.written.push(Vec::new());
        if let Some(prev) = self.prev_atom {
            let order = self.pending_bond.take();
            self.add_bond(prev, idx, order)?;
            self.written[prev].push(Slot::Atom(idx));
            self.written[idx].push(Slot::Atom(prev));
        }
        self.prev_atom = Some(idx);
        Ok(idx)
    }

    fn handle_ring_closure(&mut self, ring_num: u16) -> Result<()> {
        let current = self
            .prev_atom
            .ok_or_else(|| self.error("ring closure without preceding atom"))?;

        if let Some(open) = self.ring_closures.remove(&ring_num) {
            let order = match (self.pending_bond.take(), open.order) {
                (Some(a), Some(b)) if a != b => {
                    return Err(self.error(format!("conflicting bonds on ring closure {ring_num}")));
                }
                (a, b) => a.or(b),
            };
            self.add_bond(open.atom, current, order)?;
            let slot = self.written[open.atom]
                .iter_mut()
                .find(|s| **s == Slot::PendingRing(ring_num));
            if let Some(slot) = slot {
                *slot = Slot::Atom(current);
            }
            self.written[current].push(Slot::Atom(open.atom));
        } else {
            let order = self.pending_bond.take();
            self.ring_closures.insert(ring_num, RingOpening { atom: current, order });
            self.written[current].push(Slot::PendingRing(ring_num));
        }
        Ok(())
    }

    fn add_bond(&mut self, a: usize, b: usize, order: Option<BondOrder>) -> Result<()> {
        if a == b {
            return Err(self.error("atom bonded to itself"));
        }
        let duplicate = self
            .bonds
            .iter()
            .any(|bond| (bond.atom1 == a && bond.atom2 == b) || (bond.atom1 == b && bond.atom2 == a));
        if duplicate {
            return Err(self.error("duplicate bond between the same atoms"));
        }
        let both_aromatic = self.atoms[a].is_aromatic && self.atoms[b].is_aromatic;
        let order = order.unwrap_or(if both_aromatic { BondOrder::Aromatic } else { BondOrder::Single });
        self.bonds.push(Bond {
            atom1: a,
            atom2: b,
            order,
            is_aromatic: order == BondOrder::Aromatic,
        });
        Ok(())
    }

    fn check_complete(&self) -> Result<()> {
        if !self.ring_closures.is_empty() {
            let open: Vec<_> = self.ring_closures.keys().collect();
            return Err(ScscoreError::Parse(format!("unmatched ring closure(s): {open:?}")));
        }
        if !self.stack.is_empty() {
            return Err(ScscoreError::Parse(format!(
                "{} unmatched '(' in SMILES",
                self.stack.len()
            )));
        }
        if self.pending_bond.is_some() {
            return Err(ScscoreError::Parse("SMILES ends with a bond symbol".into()));
        }
        Ok(())
    }

    fn into_molecule(self) -> Result<Molecule> {
        let mut mol = Molecule::new(self.atoms, self.bonds);

        for i in 0..mol.atom_count() {
            if !self.bracketed[i] {
                mol.atoms[i].implicit_hydrogens = mol.default_hydrogen_count(i);
            }
        }
        aromatic::perceive_aromaticity(&mut mol);

        for (i, slots) in self.written.iter().enumerate() {
            if mol.atoms[i].chirality == Chirality::None {
                continue;
            }
            let written: Vec<Option<usize>> = slots
                .iter()
                .map(|s| match s {
                    Slot::Atom(n) => Ok(Some(*n)),
                    Slot::Hydrogen => Ok(None),
                    Slot::PendingRing(r) => {
                        Err(ScscoreError::Parse(format!("unmatched ring closure {r}")))
                    }
                })
                .collect::<Result<_>>()?;
            stereo::normalize_chirality(&mut mol, i, written);
        }

        Ok(mol)
    }
}

fn is_organic_atom_start(ch: u8) -> bool {
    matches!(
        ch,
        b'B' | b'C' | b'N' | b'O' | b'P' | b'S' | b'F' | b'I'
            | b'b' | b'c' | b'n' | b'o' | b'p' | b's'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_methane() {
        let mol = parse_smiles("C").unwrap();
        assert_eq!(mol.atom_count(), 1);
        assert_eq!(mol.bond_count(), 0);
        assert_eq!(mol.atoms[0].atomic_number, 6);
        assert_eq!(mol.atoms[0].implicit_hydrogens, 4);
    }

    #[test]
    fn parse_ethanol() {
        let mol = parse_smiles("CCO").unwrap();
        assert_eq!(mol.atom_count(), 3);
        assert_eq!(mol.bond_count(), 2);
        assert_eq!(mol.atoms[0].implicit_hydrogens, 3);
        assert_eq!(mol.atoms[1].implicit_hydrogens, 2);
        assert_eq!(mol.atoms[2].implicit_hydrogens, 1);
    }

    #[test]
    fn parse_benzene() {
        let mol = parse_smiles("c1ccccc1").unwrap();
        assert_eq!(mol.atom_count(), 6);
        assert_eq!(mol.bond_count(), 6);
        for atom in &mol.atoms {
            assert!(atom.is_aromatic);
            assert_eq!(atom.implicit_hydrogens, 1);
        }
        assert!(mol.bonds.iter().all(|b| b.order == BondOrder::Aromatic));
    }

    #[test]
    fn parse_aniline_from_demo_list() {
        let mol = parse_smiles("CCCNc1ccccc1").unwrap();
        assert_eq!(mol.atom_count(), 10);
        assert_eq!(mol.atoms[3].implicit_hydrogens, 1);
        assert_eq!(mol.atoms[4].implicit_hydrogens, 0);
    }

    #[test]
    fn parse_branching() {
        let mol = parse_smiles("CC(C)C").unwrap();
        assert_eq!(mol.atom_count(), 4);
        assert_eq!(mol.degree(1), 3);
    }

    #[test]
    fn parse_double_bond() {
        let mol = parse_smiles("C=C").unwrap();
        assert_eq!(mol.bonds[0].order, BondOrder::Double);
        assert_eq!(mol.atoms[0].implicit_hydrogens, 2);
    }

    #[test]
    fn parse_hypervalent_sulfur() {
        // Dimethyl sulfone: S takes its 6-valent state
        let mol = parse_smiles("CS(=O)(=O)C").unwrap();
        assert_eq!(mol.atoms[1].implicit_hydrogens, 0);
    }

    #[test]
    fn parse_bracket_atom() {
        let mol = parse_smiles("[NH4+]").unwrap();
        assert_eq!(mol.atoms[0].atomic_number, 7);
        assert_eq!(mol.atoms[0].formal_charge, 1);
        assert_eq!(mol.atoms[0].implicit_hydrogens, 4);
    }

    #[test]
    fn bracket_hydrogens_are_exact() {
        let mol = parse_smiles("c1cc[nH]c1").unwrap();
        assert_eq!(mol.atoms[3].implicit_hydrogens, 1);
        let mol = parse_smiles("[CH2]C").unwrap();
        assert_eq!(mol.atoms[0].implicit_hydrogens, 2);
    }

    #[test]
    fn parse_isotope_charge_and_class() {
        let mol = parse_smiles("[13CH3:7][O-]").unwrap();
        assert_eq!(mol.atoms[0].isotope, Some(13));
        assert_eq!(mol.atoms[0].implicit_hydrogens, 3);
        assert_eq!(mol.atoms[1].formal_charge, -1);
        let mol = parse_smiles("[Fe++]").unwrap();
        assert_eq!(mol.atoms[0].formal_charge, 2);
    }

    #[test]
    fn parse_two_digit_ring_closure() {
        let mol = parse_smiles("C%10CCCCCCCCC%10").unwrap();
        assert_eq!(mol.atom_count(), 10);
        assert_eq!(mol.bond_count(), 10);
    }

    #[test]
    fn explicit_single_between_aromatics() {
        let mol = parse_smiles("c1ccccc1-c1ccccc1").unwrap();
        assert_eq!(mol.bonds[6].order, BondOrder::Single);
    }

    #[test]
    fn directional_bonds_are_single() {
        let mol = parse_smiles("F/C=C/F").unwrap();
        assert_eq!(mol.bonds[0].order, BondOrder::Single);
        assert_eq!(mol.bonds[1].order, BondOrder::Double);
    }

    #[test]
    fn chirality_tags_are_read() {
        let mol = parse_smiles("N[C@@H](C)C(=O)O").unwrap();
        assert_ne!(mol.atoms[1].chirality, Chirality::None);
        let mol = parse_smiles("F[C@TH1](Cl)(Br)I").unwrap();
        assert_ne!(mol.atoms[1].chirality, Chirality::None);
        assert!(parse_smiles("F[C@SP1](Cl)(Br)I").is_err());
    }

    #[test]
    fn chirality_dropped_on_non_tetrahedral_atom() {
        let mol = parse_smiles("[C@H2](F)Cl").unwrap();
        assert_eq!(mol.atoms[0].chirality, Chirality::None);
    }

    #[test]
    fn heavy_elements_and_wildcard() {
        for (smi, an) in [("[U]", 92), ("[Pu]", 94), ("[Fr+]", 87), ("[Ra]", 88), ("[Og]", 118)] {
            let mol = parse_smiles(smi).unwrap();
            assert_eq!(mol.atoms[0].atomic_number, an, "{smi}");
        }
        let mol = parse_smiles("*CC[*]").unwrap();
        assert_eq!(mol.atom_count(), 4);
        assert_eq!(mol.atoms[0].atomic_number, 0);
        assert_eq!(mol.atoms[0].implicit_hydrogens, 0);
        assert_eq!(mol.atoms[3].atomic_number, 0);
        assert_eq!(mol.atoms[1].implicit_hydrogens, 2);
    }

    #[test]
    fn atom_classes_are_discarded() {
        let with_class = parse_smiles("[CH3:1][OH:12]").unwrap();
        let plain = parse_smiles("[CH3][OH]").unwrap();
        assert_eq!(with_class.atoms, plain.atoms);
        assert_eq!(with_class.bonds, plain.bonds);
        assert!(parse_smiles("[CH3:]").is_err());
    }

    #[test]
    fn trailing_name_is_ignored() {
        let mol = parse_smiles("CCO ethanol").unwrap();
        assert_eq!(mol.atom_count(), 3);
    }

    #[test]
    fn empty_input_is_empty_molecule() {
        assert!(parse_smiles("").unwrap().is_empty());
    }

    #[test]
    fn invalid_smiles_error() {
        assert!(parse_smiles("C(").is_err());
        assert!(parse_smiles("C)").is_err());
        assert!(parse_smiles("C1CC").is_err());
        assert!(parse_smiles("[").is_err());
        assert!(parse_smiles("C=").is_err());
        assert!(parse_smiles("=C").is_err());
        assert!(parse_smiles("C11").is_err());
        assert!(parse_smiles("C12CC12").is_err());
        assert!(parse_smiles("Xx").is_err());
        assert!(parse_smiles("[cl]").is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Strategy for valid simple SMILES: chains of organic subset atoms
    fn simple_smiles() -> impl Strategy<Value = String> {
        let atoms = prop_oneof![Just("C"), Just("N"), Just("O"), Just("S"), Just("Cl")];
        proptest::collection::vec(atoms, 1..=20).prop_map(|parts| parts.join(""))
    }

    proptest! {
        #[test]
        fn parse_smiles_does_not_panic(s in "\\PC{0,100}") {
            let _ = parse_smiles(&s);
        }

        #[test]
        fn chain_atom_count_matches(smi in simple_smiles()) {
            let mol = parse_smiles(&smi).unwrap();
            let expected = smi.len() - smi.matches("Cl").count();
            prop_assert_eq!(mol.atom_count(), expected);
            prop_assert_eq!(mol.bond_count(), expected - 1);
        }
    }
}

//! Canonical isomeric SMILES generation.
//!
//! Atoms are ranked by iterative partition refinement over atom invariants
//! (ties broken one class at a time), then written by a depth-first walk that
//! always visits the lowest-ranked neighbor first. Tetrahedral chirality and
//! isotopes are kept; chirality tags are re-expressed for the written
//! neighbor order.
//!
//! # Example
//!
//! ```
//! use scscore_chem::{parse_smiles, canonical_smiles};
//!
//! let mol1 = parse_smiles("OCC").unwrap();
//! let mol2 = parse_smiles("CCO").unwrap();
//! assert_eq!(canonical_smiles(&mol1), canonical_smiles(&mol2));
//! ```

use std::collections::HashMap;

use crate::element::{element_by_number, is_organic_subset};
use crate::molecule::{BondOrder, Chirality, Molecule};
use crate::ring;
use crate::stereo::{self, CipCode};

/// Generate a canonical SMILES string for the given molecule.
pub fn canonical_smiles(mol: &Molecule) -> String {
    let n = mol.atom_count();
    if n == 0 {
        return String::new();
    }

    let ranks = canonical_ranks(mol);
    let plan = Plan::build(mol, &ranks);

    let mut output = String::new();
    for (i, &root) in plan.roots.iter().enumerate() {
        if i > 0 {
            output.push('.');
        }
        write_branch(mol, &plan, root, None, &mut output);
    }
    output
}

/// Canonical rank of every atom; all ranks are distinct.
pub fn canonical_ranks(mol: &Molecule) -> Vec<usize> {
    let n = mol.atom_count();
    let in_ring = ring::ring_atoms(mol);

    let keys: Vec<_> = (0..n)
        .map(|i| {
            let atom = &mol.atoms[i];
            let cip = match stereo::assign_rs(mol, i) {
                None => 0u8,
                Some(CipCode::R) => 1,
                Some(CipCode::S) => 2,
            };
            (
                atom.atomic_number,
                mol.degree(i),
                atom.implicit_hydrogens,
                atom.formal_charge,
                atom.isotope.unwrap_or(0),
                atom.is_aromatic,
                in_ring[i],
                cip,
            )
        })
        .collect();
    let mut ranks = dense_ranks(&keys);

    loop {
        ranks = refine(mol, ranks);
        if count_distinct(&ranks) == n {
            return ranks;
        }
        // Break the lowest tied class by promoting its first member
        let mut counts = vec![0usize; n];
        for &r in &ranks {
            counts[r] += 1;
        }
        let tied = (0..n).find(|&r| counts[r] > 1).unwrap_or(0);
        let Some(chosen) = (0..n).find(|&i| ranks[i] == tied) else {
            return ranks;
        };
        let keys: Vec<(usize, bool)> = (0..n).map(|i| (ranks[i], i != chosen)).collect();
        ranks = dense_ranks(&keys);
    }
}

/// Refine ranks by neighbor ranks until the number of classes stops growing.
fn refine(mol: &Molecule, mut ranks: Vec<usize>) -> Vec<usize> {
    let n = mol.atom_count();
    let mut distinct = count_distinct(&ranks);
    loop {
        let keys: Vec<(usize, Vec<(usize, BondOrder)>)> = (0..n)
            .map(|i| {
                let mut around: Vec<(usize, BondOrder)> = mol.adjacency[i]
                    .iter()
                    .map(|&(nb, bi)| (ranks[nb], mol.bonds[bi].order))
                    .collect();
                around.sort_unstable();
                (ranks[i], around)
            })
            .collect();
        let next = dense_ranks(&keys);
        let next_distinct = count_distinct(&next);
        if next_distinct == distinct {
            return next;
        }
        ranks = next;
        distinct = next_distinct;
    }
}

/// Map each key to its position among the sorted distinct keys.
fn dense_ranks<K: Ord>(keys: &[K]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..keys.len()).collect();
    order.sort_by(|&a, &b| keys[a].cmp(&keys[b]));

    let mut ranks = vec![0usize; keys.len()];
    let mut rank = 0usize;
    for w in 0..order.len() {
        if w > 0 && keys[order[w]] != keys[order[w - 1]] {
            rank += 1;
        }
        ranks[order[w]] = rank;
    }
    ranks
}

fn count_distinct(values: &[usize]) -> usize {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    sorted.len()
}

/// A ring bond as seen from one of its ends.
#[derive(Debug, Clone, Copy)]
struct RingEnd {
    number: usize,
    partner: usize,
    bond: usize,
    opening: bool,
}

/// The spanning forest and ring bonds a canonical walk will write.
struct Plan {
    roots: Vec<usize>,
    children: Vec<Vec<(usize, usize)>>,
    ring_ends: Vec<Vec<RingEnd>>,
}

impl Plan {
    fn build(mol: &Molecule, ranks: &[usize]) -> Self {
        let n = mol.atom_count();
        let mut walk = Walk {
            mol,
            ranks,
            visited: vec![false; n],
            used_bonds: vec![false; mol.bond_count()],
            children: vec![Vec::new(); n],
            back_edges: vec![Vec::new(); n],
            preorder: Vec::with_capacity(n),
        };
        let mut roots = Vec::new();
        loop {
            let next = (0..n).filter(|&i| !walk.visited[i]).min_by_key(|&i| ranks[i]);
            let Some(root) = next else { break };
            roots.push(root);
            walk.visit(root, None);
        }
        let Walk { children, back_edges, preorder, .. } = walk;

        // Ring numbers in writing order, lowest free digit first, released
        // once the closing atom has been written.
        let mut position = vec![0usize; n];
        for (p, &a) in preorder.iter().enumerate() {
            position[a] = p;
        }
        let mut ring_ends: Vec<Vec<RingEnd>> = vec![Vec::new(); n];
        let mut in_use: Vec<bool> = Vec::new();
        let mut assigned: HashMap<usize, usize> = HashMap::new();

        for &atom in &preorder {
            let mut closing: Vec<RingEnd> = Vec::new();
            let mut opening: Vec<(usize, usize)> = Vec::new();
            for &(partner, bond) in &back_edges[atom] {
                if position[partner] < position[atom] {
                    if let Some(&number) = assigned.get(&bond) {
                        closing.push(RingEnd { number, partner, bond, opening: false });
                    }
                } else {
                    opening.push((partner, bond));
                }
            }
            closing.sort_by_key(|e| e.number);
            opening.sort_by_key(|&(partner, _)| position[partner]);

            let mut ends = closing.clone();
            for (partner, bond) in opening {
                let number = match in_use.iter().position(|&u| !u) {
                    Some(free) => free,
                    None => {
                        in_use.push(false);
                        in_use.len() - 1
                    }
                };
                in_use[number] = true;
                assigned.insert(bond, number);
                ends.push(RingEnd { number, partner, bond, opening: true });
            }
            for end in &closing {
                in_use[end.number] = false;
            }
            ring_ends[atom] = ends;
        }

        Plan { roots, children, ring_ends }
    }
}

/// Depth-first walk that visits the lowest-ranked neighbor first.
struct Walk<'a> {
    mol: &'a Molecule,
    ranks: &'a [usize],
    visited: Vec<bool>,
    used_bonds: Vec<bool>,
    children: Vec<Vec<(usize, usize)>>,
    back_edges: Vec<Vec<(usize, usize)>>,
    preorder: Vec<usize>,
}

impl Walk<'_> {
    fn visit(&mut self, atom: usize, via_bond: Option<usize>) {
        self.visited[atom] = true;
        self.preorder.push(atom);
        if let Some(b) = via_bond {
            self.used_bonds[b] = true;
        }

        let mut neighbors: Vec<(usize, usize)> = self.mol.adjacency[atom]
            .iter()
            .copied()
            .filter(|&(_, bi)| Some(bi) != via_bond)
            .collect();
        neighbors.sort_by_key(|&(nb, _)| self.ranks[nb]);

        for (nb, bi) in neighbors {
            if self.used_bonds[bi] {
                continue;
            }
            if self.visited[nb] {
                self.used_bonds[bi] = true;
                self.back_edges[atom].push((nb, bi));
                self.back_edges[nb].push((atom, bi));
            } else {
                self.children[atom].push((nb, bi));
                self.visit(nb, Some(bi));
            }
        }
    }
}

fn write_branch(mol: &Molecule, plan: &Plan, atom: usize, parent: Option<usize>, output: &mut String) {
    let ends = &plan.ring_ends[atom];
    let children = &plan.children[atom];

    let chirality = written_chirality(mol, atom, parent, ends, children);
    write_atom(mol, atom, chirality, output);

    for end in ends {
        if end.opening {
            write_bond_symbol(mol, end.bond, output);
        }
        write_ring_number(end.number + 1, output);
    }

    for (i, &(child, bond)) in children.iter().enumerate() {
        let last = i + 1 == children.len();
        if !last {
            output.push('(');
        }
        write_bond_symbol(mol, bond, output);
        write_branch(mol, plan, child, Some(atom), output);
        if !last {
            output.push(')');
        }
    }
}

/// Chirality tag valid for the order in which the walk writes the neighbors.
fn written_chirality(
    mol: &Molecule,
    atom: usize,
    parent: Option<usize>,
    ends: &[RingEnd],
    children: &[(usize, usize)],
) -> Chirality {
    let stored = mol.atoms[atom].chirality;
    if stored == Chirality::None {
        return stored;
    }
    let reference = stereo::reference_order(mol, atom);
    let implicit = reference.iter().filter(|n| n.is_none()).count();

    let written: Vec<Option<usize>> = parent
        .map(Some)
        .into_iter()
        .chain(std::iter::repeat(None).take(implicit))
        .chain(ends.iter().map(|e| Some(e.partner)))
        .chain(children.iter().map(|&(c, _)| Some(c)))
        .collect();
    stereo::reorder_chirality(stored, &reference, &written)
}

/// Write a ring closure number (two-digit numbers use `%`).
fn write_ring_number(num: usize, output: &mut String) {
    if num < 10 {
        output.push((b'0' + num as u8) as char);
    } else {
        output.push('%');
        output.push_str(&num.to_string());
    }
}

/// Write the bond symbol needed for the parser to recover the bond order.
fn write_bond_symbol(mol: &Molecule, bond_idx: usize, output: &mut String) {
    let bond = &mol.bonds[bond_idx];
    let both_aromatic = mol.atoms[bond.atom1].is_aromatic && mol.atoms[bond.atom2].is_aromatic;
    match bond.order {
        BondOrder::Single if both_aromatic => output.push('-'),
        BondOrder::Single => {}
        BondOrder::Double => output.push('='),
        BondOrder::Triple => output.push('#'),
        BondOrder::Aromatic if both_aromatic => {}
        BondOrder::Aromatic => output.push(':'),
    }
}

/// Write an atom, in brackets whenever the organic subset cannot express it.
fn write_atom(mol: &Molecule, atom_idx: usize, chirality: Chirality, output: &mut String) {
    let atom = &mol.atoms[atom_idx];
    let symbol = element_by_number(atom.atomic_number).map_or("*", |e| e.symbol);

    let needs_bracket = atom.formal_charge != 0
        || atom.isotope.is_some()
        || chirality != Chirality::None
        || !is_organic_subset(atom.atomic_number, atom.is_aromatic)
        || atom.implicit_hydrogens != mol.default_hydrogen_count(atom_idx);

    if needs_bracket {
        output.push('[');
        if let Some(iso) = atom.isotope {
            output.push_str(&iso.to_string());
        }
    }

    if atom.is_aromatic {
        output.extend(symbol.chars().map(|c| c.to_ascii_lowercase()));
    } else {
        output.push_str(symbol);
    }

    if needs_bracket {
        match chirality {
            Chirality::CounterClockwise => output.push('@'),
            Chirality::Clockwise => output.push_str("@@"),
            Chirality::None => {}
        }
        if atom.implicit_hydrogens > 0 {
            output.push('H');
            if atom.implicit_hydrogens > 1 {
                output.push_str(&atom.implicit_hydrogens.to_string());
            }
        }
        if atom.formal_charge > 0 {
            output.push('+');
            if atom.formal_charge > 1 {
                output.push_str(&atom.formal_charge.to_string());
            }
        } else if atom.formal_charge < 0 {
            output.push('-');
            if atom.formal_charge < -1 {
                output.push_str(&atom.formal_charge.unsigned_abs().to_string());
            }
        }
        output.push(']');
    }
}

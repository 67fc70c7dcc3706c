//! Molecular graph representation.

use scscore_core::Summarizable;

use crate::element::default_valences;

/// Tetrahedral chirality at a stereocenter.
///
/// Parsed `@`/`@@` marks are normalized so that the tag always refers to
/// [`Molecule::stereo_neighbors`] order, never to the order the input string
/// happened to list the neighbors in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Chirality {
    /// No chirality specified.
    #[default]
    None,
    /// Counterclockwise (`@` in SMILES).
    CounterClockwise,
    /// Clockwise (`@@` in SMILES).
    Clockwise,
}

impl Chirality {
    /// The opposite tag; `None` stays `None`.
    pub fn inverted(self) -> Self {
        match self {
            Chirality::None => Chirality::None,
            Chirality::CounterClockwise => Chirality::Clockwise,
            Chirality::Clockwise => Chirality::CounterClockwise,
        }
    }
}

/// Bond order classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BondOrder {
    Single,
    Double,
    Triple,
    Aromatic,
}

impl BondOrder {
    /// Numeric bond order for valence calculations.
    pub fn as_f64(self) -> f64 {
        match self {
            BondOrder::Single => 1.0,
            BondOrder::Double => 2.0,
            BondOrder::Triple => 3.0,
            BondOrder::Aromatic => 1.5,
        }
    }
}

/// An atom in a molecular graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MolAtom {
    pub atomic_number: u8,
    pub formal_charge: i8,
    pub isotope: Option<u16>,
    pub is_aromatic: bool,
    /// Hydrogens attached but not present as graph nodes.
    pub implicit_hydrogens: u8,
    pub chirality: Chirality,
}

impl MolAtom {
    /// A neutral, non-aromatic atom with no hydrogens assigned yet.
    pub fn new(atomic_number: u8) -> Self {
        MolAtom {
            atomic_number,
            formal_charge: 0,
            isotope: None,
            is_aromatic: false,
            implicit_hydrogens: 0,
            chirality: Chirality::None,
        }
    }
}

/// A bond between two atoms.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Bond {
    pub atom1: usize,
    pub atom2: usize,
    pub order: BondOrder,
    pub is_aromatic: bool,
}

/// A molecular graph with atoms, bonds, and adjacency information.
#[derive(Debug, Clone)]
pub struct Molecule {
    pub atoms: Vec<MolAtom>,
    pub bonds: Vec<Bond>,
    /// adjacency[atom_idx] = Vec<(neighbor_atom_idx, bond_idx)>, in bond order
    pub adjacency: Vec<Vec<(usize, usize)>>,
}

impl Molecule {
    /// Create a new molecule, building the adjacency list from atoms and bonds.
    pub fn new(atoms: Vec<MolAtom>, bonds: Vec<Bond>) -> Self {
        let mut adjacency = vec![Vec::new(); atoms.len()];
        for (bi, bond) in bonds.iter().enumerate() {
            adjacency[bond.atom1].push((bond.atom2, bi));
            adjacency[bond.atom2].push((bond.atom1, bi));
        }
        Molecule { atoms, bonds, adjacency }
    }

    /// Number of atoms (graph nodes; implicit hydrogens are not counted).
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    /// Number of bonds.
    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    /// Whether the molecule has no atoms.
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Number of non-hydrogen atoms.
    pub fn heavy_atom_count(&self) -> usize {
        self.atoms.iter().filter(|a| a.atomic_number != 1).count()
    }

    /// Neighbor atom indices for a given atom.
    pub fn neighbors(&self, atom_idx: usize) -> Vec<usize> {
        self.adjacency[atom_idx].iter().map(|&(n, _)| n).collect()
    }

    /// Graph degree of an atom (number of explicit bonds).
    pub fn degree(&self, atom_idx: usize) -> usize {
        self.adjacency[atom_idx].len()
    }

    /// Find the bond between two atoms, if any.
    pub fn get_bond(&self, a1: usize, a2: usize) -> Option<&Bond> {
        self.adjacency[a1]
            .iter()
            .find(|&&(n, _)| n == a2)
            .map(|&(_, bi)| &self.bonds[bi])
    }

    /// Sum of bond orders around an atom, rounded to the nearest integer.
    pub fn bond_order_sum(&self, atom_idx: usize) -> usize {
        let v: f64 = self.adjacency[atom_idx]
            .iter()
            .map(|&(_, bi)| self.bonds[bi].order.as_f64())
            .sum();
        v.round() as usize
    }

    /// Hydrogen count an unbracketed atom would receive from valence rules.
    ///
    /// Aromatic atoms give one valence electron to the pi system and count
    /// each bond once; other atoms use the smallest default valence that
    /// covers their bond-order sum.
    pub fn default_hydrogen_count(&self, atom_idx: usize) -> u8 {
        let atom = &self.atoms[atom_idx];
        let valences = default_valences(atom.atomic_number);
        if atom.is_aromatic {
            let available = valences.first().map_or(0, |&v| v as usize).saturating_sub(1);
            return available.saturating_sub(self.degree(atom_idx)) as u8;
        }
        let used = self.bond_order_sum(atom_idx);
        valences
            .iter()
            .map(|&v| v as usize)
            .find(|&v| v >= used)
            .map_or(0, |v| (v - used) as u8)
    }

    /// Neighbors in the reference order that [`Chirality`] tags refer to:
    /// implicit hydrogens first (as `None`), then explicit neighbors in
    /// adjacency order.
    pub fn stereo_neighbors(&self, atom_idx: usize) -> Vec<Option<usize>> {
        let h = self.atoms[atom_idx].implicit_hydrogens as usize;
        std::iter::repeat(None)
            .take(h)
            .chain(self.adjacency[atom_idx].iter().map(|&(n, _)| Some(n)))
            .collect()
    }

    /// Total hydrogen count (implicit + explicit H atoms).
    pub fn total_hydrogen_count(&self) -> usize {
        let explicit = self.atoms.iter().filter(|a| a.atomic_number == 1).count();
        let implicit: usize = self.atoms.iter().map(|a| a.implicit_hydrogens as usize).sum();
        explicit + implicit
    }

    /// Number of disconnected fragments.
    pub fn fragment_count(&self) -> usize {
        let n = self.atom_count();
        let mut visited = vec![false; n];
        let mut fragments = 0;
        for start in 0..n {
            if visited[start] {
                continue;
            }
            fragments += 1;
            visited[start] = true;
            let mut stack = vec![start];
            while let Some(curr) = stack.pop() {
                for &(neighbor, _) in &self.adjacency[curr] {
                    if !visited[neighbor] {
                        visited[neighbor] = true;
                        stack.push(neighbor);
                    }
                }
            }
        }
        fragments
    }
}

impl Summarizable for Molecule {
    fn summary(&self) -> String {
        format!(
            "Molecule: {} atoms, {} bonds, {} ring(s), {} fragment(s)",
            self.atom_count(),
            self.bond_count(),
            crate::ring::ring_count(self),
            self.fragment_count()
        )
    }
}

//! Aromaticity perception.
//!
//! Kekulé rings are rewritten to aromatic atoms and bonds so that both
//! spellings of a structure yield the same graph. Each smallest ring is tested
//! with the Hückel 4n+2 rule over its pi electron count; pairs of fused rings
//! are tested together when either ring fails on its own.

use std::collections::BTreeSet;

use crate::molecule::{BondOrder, Molecule};
use crate::ring;

/// Mark aromatic rings in place. Implicit hydrogen counts are left untouched.
pub fn perceive_aromaticity(mol: &mut Molecule) {
    let rings = ring::smallest_rings(mol);
    if rings.is_empty() {
        return;
    }
    let ring_bonds = ring::ring_bonds(mol);
    let electrons: Vec<Option<u8>> = (0..mol.atom_count())
        .map(|i| pi_electrons(mol, i, &ring_bonds))
        .collect();

    let candidates: Vec<&Vec<usize>> = rings
        .iter()
        .filter(|r| r.iter().all(|&a| electrons[a].is_some()))
        .filter(|r| !r.iter().all(|&a| mol.atoms[a].is_aromatic))
        .filter(|r| {
            ring::ring_bond_indices(mol, r)
                .iter()
                .all(|&b| mol.bonds[b].order != BondOrder::Triple)
        })
        .collect();

    let mut aromatic: Vec<bool> = candidates
        .iter()
        .map(|r| is_huckel(total(&electrons, r.iter().copied())))
        .collect();

    for i in 0..candidates.len() {
        for j in i + 1..candidates.len() {
            if aromatic[i] && aromatic[j] {
                continue;
            }
            let shared = candidates[i].iter().filter(|a| candidates[j].contains(a)).count();
            if shared < 2 {
                continue;
            }
            let union: BTreeSet<usize> =
                candidates[i].iter().chain(candidates[j].iter()).copied().collect();
            if is_huckel(total(&electrons, union)) {
                aromatic[i] = true;
                aromatic[j] = true;
            }
        }
    }

    for (ring, _) in candidates.iter().zip(&aromatic).filter(|(_, a)| **a) {
        for &a in ring.iter() {
            mol.atoms[a].is_aromatic = true;
        }
        for b in ring::ring_bond_indices(mol, ring) {
            mol.bonds[b].order = BondOrder::Aromatic;
            mol.bonds[b].is_aromatic = true;
        }
    }
}

fn total(electrons: &[Option<u8>], atoms: impl IntoIterator<Item = usize>) -> u32 {
    atoms.into_iter().map(|a| electrons[a].map_or(0, u32::from)).sum()
}

fn is_huckel(electrons: u32) -> bool {
    electrons >= 2 && (electrons - 2) % 4 == 0
}

/// Electrons an atom donates to a ring's pi system, or `None` if it cannot
/// take part in an aromatic ring.
fn pi_electrons(mol: &Molecule, idx: usize, ring_bonds: &[bool]) -> Option<u8> {
    let atom = &mol.atoms[idx];
    let charge = atom.formal_charge;
    let connections = mol.degree(idx) + atom.implicit_hydrogens as usize;

    if atom.is_aromatic {
        return match atom.atomic_number {
            6 => Some(match charge {
                -1 => 2,
                1 => 0,
                _ => 1,
            }),
            5 => Some(0),
            7 | 15 | 33 if charge == 0 && connections == 3 => Some(2),
            7 | 15 | 33 => Some(1),
            8 | 16 | 34 | 52 => Some(2),
            _ => None,
        };
    }

    let mut double = None;
    for &(partner, bond_idx) in &mol.adjacency[idx] {
        match mol.bonds[bond_idx].order {
            BondOrder::Triple => return None,
            BondOrder::Double | BondOrder::Aromatic if double.is_some() => return None,
            BondOrder::Double | BondOrder::Aromatic => double = Some((partner, bond_idx)),
            BondOrder::Single => {}
        }
    }

    match double {
        Some(_) if connections > 3 => None,
        Some((_, bond_idx)) if ring_bonds[bond_idx] => Some(1),
        // Exocyclic C=O and the like leave an empty p orbital
        Some((partner, _)) if mol.atoms[partner].atomic_number != 6 => Some(0),
        Some(_) => None,
        None => match (atom.atomic_number, charge) {
            (6, -1) if connections == 3 => Some(2),
            (6, 1) if connections == 3 => Some(0),
            (5, 0) if connections == 3 => Some(0),
            (7 | 15 | 33, 0) if connections == 3 => Some(2),
            (8 | 16 | 34 | 52, 0) if connections == 2 => Some(2),
            _ => None,
        },
    }
}

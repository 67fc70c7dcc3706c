//! Ring membership via bridge detection, and smallest rings per ring bond.
//!
//! A bond lies on a ring exactly when it is not a bridge of the molecular
//! graph. An atom is a ring atom when at least one of its bonds is a ring bond.

use std::collections::VecDeque;

use crate::molecule::Molecule;

/// Flags for every bond: `true` if the bond is part of some ring.
pub fn ring_bonds(mol: &Molecule) -> Vec<bool> {
    let n = mol.atom_count();
    let mut in_ring = vec![true; mol.bond_count()];
    let mut disc = vec![usize::MAX; n];
    let mut low = vec![0usize; n];
    let mut timer = 0usize;

    for root in 0..n {
        if disc[root] != usize::MAX {
            continue;
        }
        // Iterative DFS: (atom, bond used to enter it, next adjacency slot)
        let mut stack: Vec<(usize, Option<usize>, usize)> = vec![(root, None, 0)];
        disc[root] = timer;
        low[root] = timer;
        timer += 1;

        while let Some(frame) = stack.last_mut() {
            let (atom, via, slot) = *frame;
            if slot < mol.adjacency[atom].len() {
                frame.2 += 1;
                let (next, bond_idx) = mol.adjacency[atom][slot];
                if Some(bond_idx) == via {
                    continue;
                }
                if disc[next] == usize::MAX {
                    disc[next] = timer;
                    low[next] = timer;
                    timer += 1;
                    stack.push((next, Some(bond_idx), 0));
                } else {
                    low[atom] = low[atom].min(disc[next]);
                }
            } else {
                stack.pop();
                if let (Some(bond_idx), Some(parent)) = (via, stack.last()) {
                    let parent = parent.0;
                    low[parent] = low[parent].min(low[atom]);
                    if low[atom] > disc[parent] {
                        in_ring[bond_idx] = false;
                    }
                }
            }
        }
    }

    in_ring
}

/// Flags for every atom: `true` if the atom belongs to some ring.
pub fn ring_atoms(mol: &Molecule) -> Vec<bool> {
    let bonds = ring_bonds(mol);
    let mut atoms = vec![false; mol.atom_count()];
    for (bond, &in_ring) in mol.bonds.iter().zip(&bonds) {
        if in_ring {
            atoms[bond.atom1] = true;
            atoms[bond.atom2] = true;
        }
    }
    atoms
}

/// The smallest ring through every ring bond, deduplicated.
///
/// Each ring lists its atoms in path order, starting from the lowest index.
/// Rings are sorted by size, then by atoms.
pub fn smallest_rings(mol: &Molecule) -> Vec<Vec<usize>> {
    let in_ring = ring_bonds(mol);
    let mut rings: Vec<Vec<usize>> = Vec::new();
    for (bond_idx, bond) in mol.bonds.iter().enumerate() {
        if !in_ring[bond_idx] {
            continue;
        }
        let Some(mut ring) = shortest_path(mol, bond.atom1, bond.atom2, bond_idx, &in_ring) else {
            continue;
        };
        normalize_ring(&mut ring);
        if !rings.contains(&ring) {
            rings.push(ring);
        }
    }
    rings.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
    rings
}

/// Bond indices around a ring given in path order.
pub fn ring_bond_indices(mol: &Molecule, ring: &[usize]) -> Vec<usize> {
    (0..ring.len())
        .filter_map(|i| {
            let (a, b) = (ring[i], ring[(i + 1) % ring.len()]);
            mol.adjacency[a].iter().find(|&&(n, _)| n == b).map(|&(_, bi)| bi)
        })
        .collect()
}

/// BFS over ring bonds from `start` to `end`, never crossing `excluded`.
fn shortest_path(
    mol: &Molecule,
    start: usize,
    end: usize,
    excluded: usize,
    in_ring: &[bool],
) -> Option<Vec<usize>> {
    let mut parent = vec![usize::MAX; mol.atom_count()];
    parent[start] = start;
    let mut queue = VecDeque::from([start]);

    while let Some(curr) = queue.pop_front() {
        if curr == end {
            let mut path = vec![end];
            let mut node = end;
            while node != start {
                node = parent[node];
                path.push(node);
            }
            path.reverse();
            return Some(path);
        }
        for &(next, bond_idx) in &mol.adjacency[curr] {
            if bond_idx == excluded || !in_ring[bond_idx] || parent[next] != usize::MAX {
                continue;
            }
            parent[next] = curr;
            queue.push_back(next);
        }
    }
    None
}

/// Rotate so the lowest index comes first, then pick the direction whose
/// second atom is lower.
fn normalize_ring(ring: &mut [usize]) {
    let Some(min_pos) = ring.iter().enumerate().min_by_key(|&(_, &v)| v).map(|(i, _)| i) else {
        return;
    };
    ring.rotate_left(min_pos);
    let n = ring.len();
    if n > 2 && ring[n - 1] < ring[1] {
        ring[1..].reverse();
    }
}

/// Number of independent rings (cyclomatic number of the graph).
pub fn ring_count(mol: &Molecule) -> usize {
    (mol.bond_count() + mol.fragment_count()).saturating_sub(mol.atom_count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::parse_smiles;

    #[test]
    fn benzene_all_ring() {
        let mol = parse_smiles("c1ccccc1").unwrap();
        assert!(ring_atoms(&mol).iter().all(|&r| r));
        assert_eq!(ring_count(&mol), 1);
    }

    #[test]
    fn naphthalene_two_rings() {
        let mol = parse_smiles("c1ccc2ccccc2c1").unwrap();
        assert_eq!(ring_count(&mol), 2);
        assert!(ring_bonds(&mol).iter().all(|&r| r));
    }

    #[test]
    fn linker_between_rings_is_acyclic() {
        // Two phenyls joined by an ethylene linker
        let mol = parse_smiles("c1ccccc1CCc1ccccc1").unwrap();
        let atoms = ring_atoms(&mol);
        assert!(!atoms[6]);
        assert!(!atoms[7]);
        assert!(atoms[0] && atoms[8]);
        assert_eq!(ring_count(&mol), 2);
    }

    #[test]
    fn acyclic_no_rings() {
        let mol = parse_smiles("CCCC").unwrap();
        assert!(ring_atoms(&mol).iter().all(|&r| !r));
        assert_eq!(ring_count(&mol), 0);
        assert!(smallest_rings(&mol).is_empty());
    }

    #[test]
    fn smallest_rings_of_fused_system() {
        // indane: a six-ring fused to a five-ring
        let mol = parse_smiles("c1ccc2c(c1)CCC2").unwrap();
        let rings = smallest_rings(&mol);
        assert_eq!(rings.iter().map(Vec::len).collect::<Vec<_>>(), vec![5, 6]);
        assert_eq!(rings[1], vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(ring_bond_indices(&mol, &rings[1]).len(), 6);
    }
}

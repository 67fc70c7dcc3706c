//! Tetrahedral stereochemistry: tag normalization and R/S assignment.
//!
//! A chirality tag says how the neighbors of a center turn when viewed from
//! the first neighbor: `@` counterclockwise, `@@` clockwise. The same center
//! written with its neighbors in another order needs the tag flipped once per
//! odd permutation, which is all the helpers here deal in.

use crate::molecule::{Chirality, Molecule};

/// Cahn-Ingold-Prelog descriptor of a tetrahedral center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CipCode {
    R,
    S,
}

/// Whether reordering `from` into `to` is an odd permutation.
///
/// Both slices must hold the same elements; positions are matched greedily
/// so repeated elements pair up left to right.
pub fn is_odd_permutation<T: PartialEq>(from: &[T], to: &[T]) -> bool {
    let mut taken = vec![false; to.len()];
    let perm: Vec<usize> = from
        .iter()
        .map(|x| {
            let pos = (0..to.len())
                .find(|&j| !taken[j] && to[j] == *x)
                .unwrap_or(0);
            taken[pos] = true;
            pos
        })
        .collect();

    let mut inversions = 0usize;
    for i in 0..perm.len() {
        for j in i + 1..perm.len() {
            if perm[i] > perm[j] {
                inversions += 1;
            }
        }
    }
    inversions % 2 == 1
}

/// Re-express `tag`, written for neighbors in `written` order, against `target` order.
pub fn reorder_chirality<T: PartialEq>(tag: Chirality, written: &[T], target: &[T]) -> Chirality {
    if is_odd_permutation(written, target) {
        tag.inverted()
    } else {
        tag
    }
}

/// Neighbor order a stored tag refers to.
///
/// Same as [`Molecule::stereo_neighbors`], except that a three-coordinate
/// center without hydrogens gets its lone pair as a leading `None`.
pub fn reference_order(mol: &Molecule, atom_idx: usize) -> Vec<Option<usize>> {
    let mut order = mol.stereo_neighbors(atom_idx);
    if order.len() == 3 && mol.atoms[atom_idx].implicit_hydrogens == 0 {
        order.insert(0, None);
    }
    order
}

/// Rewrite the tag of `atom_idx`, given for neighbors in `written` order
/// (`None` = hydrogen or lone pair), against [`reference_order`].
///
/// Tags on atoms that cannot be tetrahedral centers are cleared.
pub fn normalize_chirality(mol: &mut Molecule, atom_idx: usize, mut written: Vec<Option<usize>>) {
    let hydrogens = mol.atoms[atom_idx].implicit_hydrogens as usize;
    let explicit = written.iter().filter(|n| n.is_some()).count();

    if hydrogens == 0 && explicit == 4 {
        written.retain(Option::is_some);
    }
    let tetrahedral = hydrogens <= 1 && (hydrogens + explicit == 4 || (hydrogens == 0 && explicit == 3));
    if !tetrahedral || written.len() != 4 {
        mol.atoms[atom_idx].chirality = Chirality::None;
        return;
    }

    let target = reference_order(mol, atom_idx);
    let tag = mol.atoms[atom_idx].chirality;
    mol.atoms[atom_idx].chirality = reorder_chirality(tag, &written, &target);
}

/// Assign R/S to a tetrahedral stereocenter.
///
/// Returns `None` for atoms without a chirality tag, with other than four
/// substituents, or whose substituents do not have distinct priorities.
pub fn assign_rs(mol: &Molecule, atom_idx: usize) -> Option<CipCode> {
    let atom = mol.atoms.get(atom_idx)?;
    if atom.chirality == Chirality::None {
        return None;
    }

    let neighbors = mol.stereo_neighbors(atom_idx);
    if neighbors.len() != 4 {
        return None;
    }

    let priorities: Vec<u64> = neighbors
        .iter()
        .map(|&n| cip_priority(mol, atom_idx, n))
        .collect();

    let mut ranked = priorities.clone();
    ranked.sort_unstable();
    if ranked.windows(2).any(|w| w[0] == w[1]) {
        return None;
    }

    // Lowest priority first, the rest descending. Viewed from the lowest
    // substituent, `@` then means the others run counterclockwise, which is
    // clockwise from the opposite side: R.
    let mut target = priorities.clone();
    target.sort_unstable();
    target[1..].reverse();

    match reorder_chirality(atom.chirality, &priorities, &target) {
        Chirality::CounterClockwise => Some(CipCode::R),
        Chirality::Clockwise => Some(CipCode::S),
        Chirality::None => None,
    }
}

/// CIP priority for comparison. Higher value = higher priority.
///
/// Packs the substituent's atomic number, its own substituents' atomic
/// numbers (descending) and the next sphere's two heaviest atoms into a u64.
/// `neighbor` is `None` for an implicit hydrogen.
fn cip_priority(mol: &Molecule, center: usize, neighbor: Option<usize>) -> u64 {
    let idx = match neighbor {
        None => return 1_u64 << 42,
        Some(idx) => idx,
    };
    let atom = &mol.atoms[idx];
    let an = atom.atomic_number as u64;

    let mut level1: Vec<u8> = mol.adjacency[idx]
        .iter()
        .filter(|&&(n, _)| n != center)
        .map(|&(n, _)| mol.atoms[n].atomic_number)
        .chain(std::iter::repeat(1).take(atom.implicit_hydrogens as usize))
        .collect();
    level1.sort_unstable_by(|a, b| b.cmp(a));
    let l1 = level1.iter().take(4).fold(0u64, |acc, &v| acc * 128 + v as u64);

    let mut level2: Vec<u8> = Vec::new();
    for &(n, _) in &mol.adjacency[idx] {
        if n == center {
            continue;
        }
        level2.extend(
            mol.adjacency[n]
                .iter()
                .filter(|&&(nn, _)| nn != idx)
                .map(|&(nn, _)| mol.atoms[nn].atomic_number),
        );
        level2.extend(std::iter::repeat(1).take(mol.atoms[n].implicit_hydrogens as usize));
    }
    level2.sort_unstable_by(|a, b| b.cmp(a));
    let l2 = level2.iter().take(2).fold(0u64, |acc, &v| acc * 128 + v as u64);

    (an << 42) | (l1 << 14) | l2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::parse_smiles;

    #[test]
    fn permutation_parity() {
        assert!(!is_odd_permutation(&[1, 2, 3], &[1, 2, 3]));
        assert!(is_odd_permutation(&[1, 2, 3], &[2, 1, 3]));
        assert!(!is_odd_permutation(&[1, 2, 3], &[2, 3, 1]));
        assert!(is_odd_permutation(&[1, 2, 3, 4], &[4, 2, 3, 1]));
    }

    #[test]
    fn l_alanine_is_s() {
        let mol = parse_smiles("N[C@@H](C)C(=O)O").unwrap();
        assert_eq!(assign_rs(&mol, 1), Some(CipCode::S));
    }

    #[test]
    fn d_alanine_is_r() {
        let mol = parse_smiles("N[C@H](C)C(=O)O").unwrap();
        assert_eq!(assign_rs(&mol, 1), Some(CipCode::R));
    }

    #[test]
    fn descriptor_independent_of_writing_order() {
        // L-alanine written starting from the carboxyl group
        let a = parse_smiles("N[C@@H](C)C(=O)O").unwrap();
        let b = parse_smiles("OC(=O)[C@@H](N)C").unwrap();
        assert_eq!(assign_rs(&a, 1), assign_rs(&b, 3));
    }

    #[test]
    fn none_for_untagged_or_symmetric() {
        let mol = parse_smiles("C").unwrap();
        assert_eq!(assign_rs(&mol, 0), None);
        let mol = parse_smiles("[C@@H](C)(C)C").unwrap();
        assert_eq!(assign_rs(&mol, 0), None);
    }
}

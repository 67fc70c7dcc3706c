//! Morgan (circular) fingerprints.
//!
//! Every atom gets an identifier hashed from its local invariants; each round
//! rehashes it together with the sorted identifiers of its neighbors and the
//! connecting bond orders, so round `r` describes the environment of radius
//! `r`. The bit form folds identifiers into a fixed width; the count form
//! keeps the full identifiers with their multiplicities.

use std::collections::BTreeMap;

use crate::molecule::Molecule;
use crate::ring;
use crate::stereo::{self, CipCode};

/// A fixed-size bit vector fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    bits: Vec<u64>,
    nbits: usize,
}

impl Fingerprint {
    /// Create an all-zero fingerprint of `nbits` bits.
    pub fn new(nbits: usize) -> Self {
        Fingerprint {
            bits: vec![0u64; nbits.div_ceil(64)],
            nbits,
        }
    }

    /// Set a bit; positions past the end wrap around.
    pub fn set_bit(&mut self, pos: usize) {
        let pos = pos % self.nbits;
        self.bits[pos / 64] |= 1u64 << (pos % 64);
    }

    /// Get a bit; positions past the end wrap around.
    pub fn get_bit(&self, pos: usize) -> bool {
        let pos = pos % self.nbits;
        (self.bits[pos / 64] >> (pos % 64)) & 1 == 1
    }

    /// Count the number of set bits.
    pub fn count_ones(&self) -> u32 {
        self.bits.iter().map(|w| w.count_ones()).sum()
    }

    /// Number of bits in the fingerprint.
    pub fn nbits(&self) -> usize {
        self.nbits
    }

    /// Bits in order, as booleans.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.nbits).map(move |i| self.get_bit(i))
    }
}

/// Sparse Morgan fingerprint: environment identifier → occurrence count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SparseCountFingerprint {
    counts: BTreeMap<u64, u32>,
}

impl SparseCountFingerprint {
    /// Identifiers with a nonzero count, in ascending identifier order.
    pub fn nonzero_elements(&self) -> impl Iterator<Item = (u64, u32)> + '_ {
        self.counts.iter().map(|(&k, &v)| (k, v))
    }

    /// Count for one identifier (0 when absent).
    pub fn get(&self, key: u64) -> u32 {
        self.counts.get(&key).copied().unwrap_or(0)
    }

    /// Number of distinct identifiers.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.values().map(|&v| v as u64).sum()
    }
}

/// Morgan (ECFP-like) bit fingerprint; with `use_chirality`, R/S centers hash
/// differently.
///
/// `radius` controls the neighborhood size (2 = ECFP4, 3 = ECFP6).
/// `nbits` is the fingerprint length (commonly 1024 or 2048).
pub fn morgan_fingerprint_with(
    mol: &Molecule,
    radius: usize,
    nbits: usize,
    use_chirality: bool,
) -> Fingerprint {
    let mut fp = Fingerprint::new(nbits);
    if nbits == 0 {
        return fp;
    }
    for id in morgan_identifiers(mol, radius, use_chirality) {
        fp.set_bit(fold_hash(id, nbits));
    }
    fp
}

/// Morgan count fingerprint over unfolded identifiers.
pub fn morgan_counts(mol: &Molecule, radius: usize, use_chirality: bool) -> SparseCountFingerprint {
    let mut fp = SparseCountFingerprint::default();
    for id in morgan_identifiers(mol, radius, use_chirality) {
        *fp.counts.entry(id).or_insert(0) += 1;
    }
    fp
}

/// Identifiers of every atom at every radius `0..=radius`.
fn morgan_identifiers(mol: &Molecule, radius: usize, use_chirality: bool) -> Vec<u64> {
    let n = mol.atom_count();
    let mut all = Vec::with_capacity(n * (radius + 1));
    if n == 0 {
        return all;
    }

    let ring_atoms = ring::ring_atoms(mol);

    let mut identifiers: Vec<u64> = Vec::with_capacity(n);
    for (i, atom) in mol.atoms.iter().enumerate() {
        let mut h = fnv1a_init();
        h = fnv1a_update(h, atom.atomic_number as u64);
        h = fnv1a_update(h, mol.degree(i) as u64);
        h = fnv1a_update(h, atom.implicit_hydrogens as u64);
        h = fnv1a_update(h, atom.formal_charge as u64);
        h = fnv1a_update(h, ring_atoms[i] as u64);
        h = fnv1a_update(h, atom.is_aromatic as u64);
        if use_chirality {
            match stereo::assign_rs(mol, i) {
                Some(CipCode::R) => h = fnv1a_update(h, 1),
                Some(CipCode::S) => h = fnv1a_update(h, 2),
                None => {}
            }
        }
        identifiers.push(h);
    }
    all.extend_from_slice(&identifiers);

    for _ in 0..radius {
        let mut next = Vec::with_capacity(n);
        for i in 0..n {
            let mut h = fnv1a_init();
            h = fnv1a_update(h, identifiers[i]);

            // Sort neighbor identifiers for determinism
            let mut around: Vec<(u64, u8)> = mol.adjacency[i]
                .iter()
                .map(|&(nb, bi)| (identifiers[nb], mol.bonds[bi].order as u8))
                .collect();
            around.sort_unstable();

            for (nid, order) in around {
                h = fnv1a_update(h, nid);
                h = fnv1a_update(h, order as u64);
            }
            next.push(h);
        }
        all.extend_from_slice(&next);
        identifiers = next;
    }

    all
}

// FNV-1a hash functions for deterministic hashing
const FNV_OFFSET: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

fn fnv1a_init() -> u64 {
    FNV_OFFSET
}

fn fnv1a_update(hash: u64, value: u64) -> u64 {
    value
        .to_le_bytes()
        .iter()
        .fold(hash, |h, &b| (h ^ b as u64).wrapping_mul(FNV_PRIME))
}

fn fold_hash(hash: u64, nbits: usize) -> usize {
    (hash % nbits as u64) as usize
}

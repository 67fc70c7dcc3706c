//! Turning molecules into the fixed-width input vector of the network.

use scscore_chem::{morgan_counts, morgan_fingerprint_with, Molecule};

use crate::tensor::ElementType;

/// How a molecule is encoded for the network. Fixed when weights are loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FingerprintMode {
    /// Folded Morgan bits.
    Bits,
    /// Folded Morgan occurrence counts, saturating at 255.
    Counts,
}

impl FingerprintMode {
    /// Networks trained on `uint8` inputs take counts; everything else takes bits.
    pub fn for_input_dtype(dtype: ElementType) -> Self {
        if dtype.is_unsigned_integer() {
            FingerprintMode::Counts
        } else {
            FingerprintMode::Bits
        }
    }
}

/// A fingerprint of fixed length in one of the two encodings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FingerprintVector {
    Bits(Vec<bool>),
    Counts(Vec<u8>),
}

impl FingerprintVector {
    /// All-zero vector of the given mode and length.
    pub fn zeros(mode: FingerprintMode, len: usize) -> Self {
        match mode {
            FingerprintMode::Bits => FingerprintVector::Bits(vec![false; len]),
            FingerprintMode::Counts => FingerprintVector::Counts(vec![0; len]),
        }
    }

    pub fn mode(&self) -> FingerprintMode {
        match self {
            FingerprintVector::Bits(_) => FingerprintMode::Bits,
            FingerprintVector::Counts(_) => FingerprintMode::Counts,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            FingerprintVector::Bits(v) => v.len(),
            FingerprintVector::Counts(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when no position is set.
    pub fn is_zero(&self) -> bool {
        match self {
            FingerprintVector::Bits(v) => v.iter().all(|&b| !b),
            FingerprintVector::Counts(v) => v.iter().all(|&c| c == 0),
        }
    }

    /// Widen to the network's input representation.
    pub fn to_f64(&self) -> Vec<f64> {
        match self {
            FingerprintVector::Bits(v) => v.iter().map(|&b| if b { 1.0 } else { 0.0 }).collect(),
            FingerprintVector::Counts(v) => v.iter().map(|&c| f64::from(c)).collect(),
        }
    }
}

/// Fingerprint a molecule; `None` (a structure that failed to parse) gives the
/// zero vector.
pub fn mol_to_fingerprint(
    mol: Option<&Molecule>,
    mode: FingerprintMode,
    len: usize,
    radius: usize,
) -> FingerprintVector {
    let Some(mol) = mol else {
        return FingerprintVector::zeros(mode, len);
    };
    if len == 0 {
        return FingerprintVector::zeros(mode, 0);
    }
    match mode {
        FingerprintMode::Bits => {
            let fp = morgan_fingerprint_with(mol, radius, len, true);
            FingerprintVector::Bits(fp.iter().collect())
        }
        FingerprintMode::Counts => {
            let mut folded = vec![0u8; len];
            for (key, count) in morgan_counts(mol, radius, true).nonzero_elements() {
                let slot = &mut folded[(key % len as u64) as usize];
                let add = u8::try_from(count).unwrap_or(u8::MAX);
                *slot = slot.saturating_add(add);
            }
            FingerprintVector::Counts(folded)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scscore_chem::parse_smiles;

    #[test]
    fn mode_from_dtype() {
        assert_eq!(FingerprintMode::for_input_dtype(ElementType::UInt), FingerprintMode::Counts);
        assert_eq!(FingerprintMode::for_input_dtype(ElementType::Int), FingerprintMode::Bits);
        assert_eq!(FingerprintMode::for_input_dtype(ElementType::Float), FingerprintMode::Bits);
    }

    #[test]
    fn absent_molecule_is_zero() {
        for mode in [FingerprintMode::Bits, FingerprintMode::Counts] {
            let fp = mol_to_fingerprint(None, mode, 64, 2);
            assert_eq!(fp.len(), 64);
            assert_eq!(fp.mode(), mode);
            assert!(fp.is_zero());
        }
    }

    #[test]
    fn bits_match_chem_fingerprint() {
        let mol = parse_smiles("CCCNc1ccccc1").unwrap();
        let fp = mol_to_fingerprint(Some(&mol), FingerprintMode::Bits, 1024, 2);
        let reference = morgan_fingerprint_with(&mol, 2, 1024, true);
        let FingerprintVector::Bits(bits) = &fp else { panic!("expected bits") };
        assert_eq!(bits.len(), 1024);
        assert_eq!(bits.iter().filter(|&&b| b).count() as u32, reference.count_ones());
        assert!(!fp.is_zero());
    }

    #[test]
    fn counts_fold_and_accumulate() {
        let mol = parse_smiles("CCCOCCC").unwrap();
        let sparse = morgan_counts(&mol, 2, true);
        let fp = mol_to_fingerprint(Some(&mol), FingerprintMode::Counts, 16, 2);
        let FingerprintVector::Counts(counts) = &fp else { panic!("expected counts") };
        assert_eq!(counts.len(), 16);
        let total: u64 = counts.iter().map(|&c| u64::from(c)).sum();
        assert_eq!(total, sparse.total());
        // six carbons share at least the radius-0 CH3/CH2 identifiers
        assert!(counts.iter().any(|&c| c > 1));
    }

    #[test]
    fn counts_saturate() {
        let long_chain = "C".repeat(400);
        let mol = parse_smiles(&long_chain).unwrap();
        let FingerprintVector::Counts(counts) =
            mol_to_fingerprint(Some(&mol), FingerprintMode::Counts, 1, 0)
        else {
            panic!("expected counts")
        };
        assert_eq!(counts, vec![u8::MAX]);
    }

    #[test]
    fn to_f64_widens() {
        let v = FingerprintVector::Counts(vec![0, 3, 255]);
        assert_eq!(v.to_f64(), vec![0.0, 3.0, 255.0]);
        let b = FingerprintVector::Bits(vec![true, false]);
        assert_eq!(b.to_f64(), vec![1.0, 0.0]);
    }
}

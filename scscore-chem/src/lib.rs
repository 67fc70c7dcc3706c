//! Small-molecule handling for SCScore.
//!
//! Provides the molecular graph, a SMILES parser, canonical isomeric SMILES,
//! tetrahedral stereo perception and Morgan fingerprints in bit and count
//! form. These are the four chemistry operations the scorer relies on.
//!
//! # Example
//!
//! ```
//! use scscore_chem::{canonical_smiles, morgan_counts, morgan_fingerprint_with, parse_smiles};
//!
//! let ether = parse_smiles("CCCOCCC").unwrap();
//! assert_eq!(ether.atom_count(), 7);
//! assert_eq!(canonical_smiles(&ether), canonical_smiles(&parse_smiles("C(CC)OCCC").unwrap()));
//!
//! let bits = morgan_fingerprint_with(&ether, 2, 1024, true);
//! assert_eq!(bits.nbits(), 1024);
//! let counts = morgan_counts(&ether, 2, true);
//! assert!(counts.nonzero_elements().count() > 0);
//! ```

pub mod canon;
pub mod element;
pub mod fingerprint;
pub mod molecule;
pub mod smiles;
pub mod stereo;

mod aromatic;
mod ring;

pub use canon::canonical_smiles;
pub use element::{element_by_number, element_by_symbol, Element};
pub use fingerprint::{
    morgan_counts, morgan_fingerprint_with, Fingerprint, SparseCountFingerprint,
};
pub use molecule::{Bond, BondOrder, Chirality, MolAtom, Molecule};
pub use smiles::parse_smiles;
pub use stereo::{assign_rs, CipCode};

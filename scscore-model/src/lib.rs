//! Synthetic complexity scoring (SCScore) for small molecules.
//!
//! A [`Scorer`] loads a pretrained dense network from a compressed JSON
//! weight file, fingerprints molecules parsed from SMILES and maps the
//! network output into `[1, score_scale]`.
//!
//! - **Weights**: [`WeightSet`] decodes alternating weight/bias tensors
//! - **Featurization**: Morgan bit or count fingerprints, chosen by the
//!   element type of the first weight matrix
//! - **Inference**: dense layers with ReLU, sigmoid output, rescaling
//!
//! # Example
//!
//! ```no_run
//! use scscore_model::{Scorer, ScorerConfig};
//!
//! let mut scorer = Scorer::new(ScorerConfig::default())?;
//! scorer.restore(None)?;
//! let result = scorer.score("CCCNc1ccccc1")?;
//! println!("{result}");
//! # Ok::<(), scscore_core::ScscoreError>(())
//! ```

pub mod config;
pub mod featurize;
pub mod network;
pub mod scorer;
pub mod tensor;
pub mod weights;

pub use config::{default_weight_path, ScorerConfig, DATA_DIR_ENV, DEFAULT_MODEL};
pub use featurize::{mol_to_fingerprint, FingerprintMode, FingerprintVector};
pub use network::DenseLayer;
pub use scorer::{ScoredSmiles, Scorer};
pub use tensor::{ElementType, Tensor};
pub use weights::WeightSet;

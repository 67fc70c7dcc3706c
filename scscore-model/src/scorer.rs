//! The SCScore scorer: SMILES in, canonical SMILES and a complexity score out.

use std::fmt;
use std::path::Path;

use tracing::{debug, info};

use scscore_chem::{canonical_smiles, parse_smiles, Molecule};
use scscore_core::{Result, Scored, ScscoreError, Summarizable};

use crate::config::ScorerConfig;
use crate::featurize::{mol_to_fingerprint, FingerprintMode, FingerprintVector};
use crate::network::rescale;
use crate::weights::WeightSet;

/// A scored input: canonical isomeric SMILES and its score.
///
/// A score of `0.0` means the input could not be scored (empty, unparsable,
/// or no fingerprint bits set); real scores lie in `[1, score_scale]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredSmiles {
    pub smiles: String,
    pub score: f64,
}

impl ScoredSmiles {
    fn unscored(smiles: String) -> Self {
        Self { smiles, score: 0.0 }
    }
}

impl Scored for ScoredSmiles {
    fn score(&self) -> f64 {
        self.score
    }
}

impl fmt::Display for ScoredSmiles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4} <--- {}", self.score, self.smiles)
    }
}

#[derive(Debug, Clone)]
struct Restored {
    weights: WeightSet,
    mode: FingerprintMode,
}

/// Scores molecules with a pretrained dense network.
///
/// Created unrestored; [`Scorer::restore`] loads the weights and fixes the
/// fingerprint mode. Afterwards the scorer is read-only and can be shared
/// across threads.
#[derive(Debug, Clone)]
pub struct Scorer {
    config: ScorerConfig,
    model: Option<Restored>,
}

impl Scorer {
    /// An unrestored scorer.
    pub fn new(config: ScorerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, model: None })
    }

    /// Build and restore from a weight file in one step.
    pub fn from_path(config: ScorerConfig, path: impl AsRef<Path>) -> Result<Self> {
        let mut scorer = Self::new(config)?;
        scorer.restore(Some(path.as_ref()))?;
        Ok(scorer)
    }

    /// Restore from an already-decoded weight set.
    pub fn with_weights(config: ScorerConfig, weights: WeightSet) -> Result<Self> {
        let mut scorer = Self::new(config)?;
        scorer.install(weights)?;
        Ok(scorer)
    }

    /// Load weights from `path`, or from the configured/default location.
    ///
    /// Replaces any previously loaded weights. On error the scorer keeps its
    /// previous state.
    pub fn restore(&mut self, path: Option<&Path>) -> Result<&mut Self> {
        let path = path.map_or_else(|| self.config.weight_path(), Path::to_path_buf);
        let weights = WeightSet::load(&path)?;
        self.install(weights)?;
        info!(path = %path.display(), mode = ?self.fingerprint_mode(), "scorer restored");
        Ok(self)
    }

    fn install(&mut self, weights: WeightSet) -> Result<()> {
        if weights.input_width() != self.config.fingerprint_length {
            return Err(ScscoreError::InvalidInput(format!(
                "network expects {} input features but fingerprint_length is {}",
                weights.input_width(),
                self.config.fingerprint_length
            )));
        }
        let mode = FingerprintMode::for_input_dtype(weights.input_dtype());
        debug!(summary = %weights.summary(), ?mode, "installing weights");
        self.model = Some(Restored { weights, mode });
        Ok(())
    }

    pub fn config(&self) -> &ScorerConfig {
        &self.config
    }

    pub fn is_restored(&self) -> bool {
        self.model.is_some()
    }

    /// Fingerprint mode of the loaded network, if any.
    pub fn fingerprint_mode(&self) -> Option<FingerprintMode> {
        self.model.as_ref().map(|m| m.mode)
    }

    pub fn weights(&self) -> Option<&WeightSet> {
        self.model.as_ref().map(|m| &m.weights)
    }

    fn restored(&self) -> Result<&Restored> {
        self.model.as_ref().ok_or(ScscoreError::NotRestored)
    }

    fn fingerprint(&self, mol: Option<&Molecule>) -> Result<FingerprintVector> {
        let mode = self.restored()?.mode;
        Ok(mol_to_fingerprint(
            mol,
            mode,
            self.config.fingerprint_length,
            self.config.fingerprint_radius,
        ))
    }

    /// Fingerprint a SMILES string in the loaded network's mode.
    ///
    /// Unparsable or empty input gives the zero vector.
    pub fn smiles_to_fingerprint(&self, smiles: &str) -> Result<FingerprintVector> {
        let mol = if smiles.is_empty() {
            None
        } else {
            parse_smiles(smiles).ok()
        };
        self.fingerprint(mol.as_ref())
    }

    /// Run the network on a fingerprint and rescale into `[1, score_scale]`.
    pub fn apply(&self, fp: &FingerprintVector) -> Result<f64> {
        let model = self.restored()?;
        let out = model.weights.forward(&fp.to_f64())?;
        let logit = out.first().copied().ok_or_else(|| {
            ScscoreError::InvalidInput("network produced an empty output".into())
        })?;
        Ok(rescale(logit, self.config.score_scale))
    }

    /// Score one SMILES string.
    pub fn score(&self, smiles: &str) -> Result<ScoredSmiles> {
        if smiles.is_empty() {
            return Ok(ScoredSmiles::unscored(String::new()));
        }
        self.restored()?;

        let mol = match parse_smiles(smiles) {
            Ok(mol) => mol,
            Err(e) => {
                debug!(smiles, error = %e, "could not parse input");
                return Ok(ScoredSmiles::unscored(String::new()));
            }
        };

        let canonical = canonical_smiles(&mol);
        let fp = self.fingerprint(Some(&mol))?;
        if fp.is_zero() {
            debug!(smiles, "empty fingerprint");
            return Ok(ScoredSmiles::unscored(canonical));
        }

        let score = self.apply(&fp)?;
        debug!(smiles, canonical = %canonical, molecule = %mol.summary(), score, "scored");
        Ok(ScoredSmiles { smiles: canonical, score })
    }

    /// Score each input in order.
    pub fn score_all<S: AsRef<str>>(&self, inputs: &[S]) -> Result<Vec<ScoredSmiles>> {
        inputs.iter().map(|s| self.score(s.as_ref())).collect()
    }
}

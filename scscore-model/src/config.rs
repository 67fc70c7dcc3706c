//! Scorer configuration and the default weight file location.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use scscore_core::compress::read_file;
use scscore_core::{Result, ScscoreError};

/// Environment variable overriding the directory weight files are looked up in.
pub const DATA_DIR_ENV: &str = "SCSCORE_DATA_DIR";

/// Bit-fingerprint model, relative to the data directory.
pub const DEFAULT_MODEL: &str =
    "models/full_reaxys_model_1024bool/model.ckpt-10654.as_numpy.json.gz";

/// Count-fingerprint model trained on 2048-wide folded counts.
pub const COUNT_MODEL: &str =
    "models/full_reaxys_model_2048uint8/model.ckpt-10654.as_numpy.json.gz";

/// Directory weight files are resolved against.
pub fn data_dir() -> PathBuf {
    std::env::var_os(DATA_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")))
}

/// Path of the shipped 1024-bit model.
pub fn default_weight_path() -> PathBuf {
    data_dir().join(DEFAULT_MODEL)
}

/// Configuration for a [`Scorer`](crate::Scorer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    /// Upper end of the score range; scores fall in `[1, score_scale]`.
    pub score_scale: f64,
    /// Fingerprint width; must match the first weight matrix.
    pub fingerprint_length: usize,
    /// Morgan radius.
    pub fingerprint_radius: usize,
    /// Weight file used when `restore` is given no explicit path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weights: Option<PathBuf>,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            score_scale: 5.0,
            fingerprint_length: 1024,
            fingerprint_radius: 2,
            weights: None,
        }
    }
}

impl ScorerConfig {
    /// Preset for the 2048-wide count-fingerprint model.
    pub fn counts_2048() -> Self {
        Self {
            fingerprint_length: 2048,
            weights: Some(data_dir().join(COUNT_MODEL)),
            ..Self::default()
        }
    }

    /// Read a JSON config file; missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = read_file(path)?;
        let config: ScorerConfig = serde_json::from_slice(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.score_scale.is_finite() || self.score_scale <= 1.0 {
            return Err(ScscoreError::InvalidInput(format!(
                "score_scale must be a finite number > 1, got {}",
                self.score_scale
            )));
        }
        if self.fingerprint_length == 0 {
            return Err(ScscoreError::InvalidInput(
                "fingerprint_length must be > 0".into(),
            ));
        }
        Ok(())
    }

    /// Configured weight path, or the shipped default.
    pub fn weight_path(&self) -> PathBuf {
        self.weights.clone().unwrap_or_else(default_weight_path)
    }
}

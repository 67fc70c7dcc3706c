//! Weight files: compressed JSON lists of alternating weight matrices and
//! bias vectors, one pair per dense layer.

use std::path::Path;

use serde_json::Value;
use tracing::{debug, info};

use scscore_core::compress::{decompress, detect_algorithm, read_file};
use scscore_core::hash::{sha256, short_digest};
use scscore_core::{Result, ScscoreError, Summarizable};

use crate::network::DenseLayer;
use crate::tensor::{ElementType, Tensor};

/// The loaded network: dense layers in application order.
///
/// Immutable once built; the element type of the first weight matrix is kept
/// because it decides how fingerprints are built for this network.
#[derive(Debug, Clone)]
pub struct WeightSet {
    layers: Vec<DenseLayer>,
    input_dtype: ElementType,
    digest: Option<String>,
}

impl WeightSet {
    /// Read, decompress and decode a weight file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = read_file(path)?;
        let algorithm = detect_algorithm(&raw);
        let json = decompress(&raw)?;
        let mut weights = Self::from_json_slice(&json)?;
        weights.digest = Some(sha256(&raw));

        info!(
            path = %path.display(),
            layers = weights.layers.len(),
            input_dtype = ?weights.input_dtype,
            "loaded weights"
        );
        debug!(
            compression = ?algorithm,
            sha256 = short_digest(weights.digest.as_deref().unwrap_or_default()),
            shapes = %weights.summary(),
            "weight file details"
        );
        Ok(weights)
    }

    /// Decode an uncompressed UTF-8 JSON weight document.
    pub fn from_json_slice(json: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(json)
            .map_err(|e| ScscoreError::Parse(format!("weight file is not UTF-8: {e}")))?;
        let value: Value = serde_json::from_str(text)?;
        let Value::Array(items) = value else {
            return Err(ScscoreError::InvalidInput(
                "weight document must be a JSON array of tensors".into(),
            ));
        };
        let tensors = items.iter().map(Tensor::from_json).collect::<Result<Vec<_>>>()?;
        Self::from_tensors(tensors)
    }

    /// Pair up `[W0, b0, W1, b1, ...]` into layers, checking that shapes chain.
    pub fn from_tensors(tensors: Vec<Tensor>) -> Result<Self> {
        if tensors.is_empty() {
            return Err(ScscoreError::InvalidInput("weight list is empty".into()));
        }
        if tensors.len() % 2 != 0 {
            return Err(ScscoreError::InvalidInput(format!(
                "expected alternating weights and biases, got {} tensors",
                tensors.len()
            )));
        }
        let input_dtype = tensors[0].dtype();

        let mut layers: Vec<DenseLayer> = Vec::with_capacity(tensors.len() / 2);
        let mut iter = tensors.into_iter();
        while let (Some(w), Some(b)) = (iter.next(), iter.next()) {
            let index = layers.len();
            if w.ndim() != 2 {
                return Err(ScscoreError::InvalidInput(format!(
                    "layer {index}: weight must be 2-D, got shape {:?}",
                    w.shape()
                )));
            }
            if b.ndim() != 1 {
                return Err(ScscoreError::InvalidInput(format!(
                    "layer {index}: bias must be 1-D, got shape {:?}",
                    b.shape()
                )));
            }
            let (n_in, n_out) = (w.shape()[0], w.shape()[1]);
            if b.len() != n_out {
                return Err(ScscoreError::InvalidInput(format!(
                    "layer {index}: bias has {} values for {n_out} outputs",
                    b.len()
                )));
            }
            if let Some(prev) = layers.last() {
                if prev.n_out() != n_in {
                    return Err(ScscoreError::InvalidInput(format!(
                        "layer {index}: expects {n_in} inputs but layer {} produces {}",
                        index - 1,
                        prev.n_out()
                    )));
                }
            }
            layers.push(DenseLayer::new(n_in, n_out, w.into_data(), b.into_data())?);
        }

        if layers.last().map_or(0, DenseLayer::n_out) == 0 {
            return Err(ScscoreError::InvalidInput("output layer has no units".into()));
        }

        Ok(WeightSet { layers, input_dtype, digest: None })
    }

    pub fn layers(&self) -> &[DenseLayer] {
        &self.layers
    }

    /// Width of the input the first layer expects.
    pub fn input_width(&self) -> usize {
        self.layers.first().map_or(0, DenseLayer::n_in)
    }

    /// Element type of the first weight matrix.
    pub fn input_dtype(&self) -> ElementType {
        self.input_dtype
    }

    /// SHA-256 of the compressed file, when loaded from disk.
    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }

    /// Run every layer, ReLU between layers, and return the raw output.
    pub fn forward(&self, input: &[f64]) -> Result<Vec<f64>> {
        if input.len() != self.input_width() {
            return Err(ScscoreError::InvalidInput(format!(
                "input has {} features, network expects {}",
                input.len(),
                self.input_width()
            )));
        }
        let last = self.layers.len() - 1;
        let mut x = input.to_vec();
        for (i, layer) in self.layers.iter().enumerate() {
            x = layer.forward(&x);
            if i < last {
                crate::network::relu_inplace(&mut x);
            }
        }
        Ok(x)
    }
}

impl Summarizable for WeightSet {
    fn summary(&self) -> String {
        let shapes: Vec<String> = self
            .layers
            .iter()
            .map(|l| format!("{}x{}", l.n_in(), l.n_out()))
            .collect();
        format!("WeightSet: {} layers [{}]", self.layers.len(), shapes.join(" -> "))
    }
}

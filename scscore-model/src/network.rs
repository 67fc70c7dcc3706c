//! Dense layers and activations.

use scscore_core::{Result, ScscoreError};

/// A fully connected layer computing `y = x·W + b`.
///
/// `W` is stored row-major with one row per input and one column per output,
/// matching the orientation of the weight files.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseLayer {
    n_in: usize,
    n_out: usize,
    weights: Vec<f64>,
    bias: Vec<f64>,
}

impl DenseLayer {
    pub fn new(n_in: usize, n_out: usize, weights: Vec<f64>, bias: Vec<f64>) -> Result<Self> {
        if weights.len() != n_in * n_out {
            return Err(ScscoreError::InvalidInput(format!(
                "weight matrix has {} values, expected {n_in}x{n_out}",
                weights.len()
            )));
        }
        if bias.len() != n_out {
            return Err(ScscoreError::InvalidInput(format!(
                "bias has {} values, expected {n_out}",
                bias.len()
            )));
        }
        Ok(DenseLayer { n_in, n_out, weights, bias })
    }

    pub fn n_in(&self) -> usize {
        self.n_in
    }

    pub fn n_out(&self) -> usize {
        self.n_out
    }

    /// Affine transform of one input vector. `x.len()` must equal `n_in`.
    ///
    /// Zero inputs are skipped.
    pub fn forward(&self, x: &[f64]) -> Vec<f64> {
        debug_assert_eq!(x.len(), self.n_in);
        let mut y = self.bias.clone();
        for (i, &xi) in x.iter().enumerate() {
            if xi == 0.0 {
                continue;
            }
            let row = &self.weights[i * self.n_out..(i + 1) * self.n_out];
            for (yj, &wij) in y.iter_mut().zip(row) {
                *yj += xi * wij;
            }
        }
        y
    }
}

/// Elementwise `max(0, x)`.
pub fn relu_inplace(x: &mut [f64]) {
    x.iter_mut().for_each(|v| *v = v.max(0.0));
}

/// Logistic sigmoid.
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Map a raw network output onto `[1, scale]`.
pub fn rescale(logit: f64, scale: f64) -> f64 {
    1.0 + (scale - 1.0) * sigmoid(logit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn affine_transform() {
        // W = [[1, 2], [3, 4]], b = [0.5, -0.5]
        let layer = DenseLayer::new(2, 2, vec![1.0, 2.0, 3.0, 4.0], vec![0.5, -0.5]).unwrap();
        assert_eq!(layer.forward(&[1.0, 1.0]), vec![4.5, 5.5]);
        assert_eq!(layer.forward(&[0.0, 2.0]), vec![6.5, 7.5]);
        assert_eq!(layer.forward(&[0.0, 0.0]), vec![0.5, -0.5]);
    }

    #[test]
    fn layer_shape_checks() {
        assert!(DenseLayer::new(2, 2, vec![0.0; 3], vec![0.0; 2]).is_err());
        assert!(DenseLayer::new(2, 2, vec![0.0; 4], vec![0.0; 1]).is_err());
    }

    #[test]
    fn relu_clamps() {
        let mut x = vec![-1.0, 0.0, 2.5];
        relu_inplace(&mut x);
        assert_eq!(x, vec![0.0, 0.0, 2.5]);
    }

    #[test]
    fn sigmoid_and_rescale() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
        assert!((rescale(0.0, 5.0) - 3.0).abs() < 1e-12);
        assert!(rescale(-50.0, 5.0) >= 1.0);
        assert!(rescale(50.0, 5.0) <= 5.0);
        assert!((rescale(1000.0, 5.0) - 5.0).abs() < 1e-12);
    }
}

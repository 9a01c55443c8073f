//! Supervised training of the final softmax layer.
use log::{debug, info};
use ndarray::{Array2, Axis};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::activation::ActivationType;
use crate::error::{Error, Result};
use crate::hyperparameters::ClassifierConfig;
use crate::layer::DenseLayer;
use crate::loss::cross_entropy;
use crate::utils::all_finite;

/// A single softmax layer mapping feature vectors to class-probability
/// distributions, trained against one-hot labels.
#[derive(Debug, Clone)]
pub struct SoftmaxClassifier {
    layer: DenseLayer,
}

impl SoftmaxClassifier {
    /// Trains the layer by full-batch gradient descent on cross-entropy
    /// with an L2 weight penalty. The explicit seed drives the weight
    /// initialization.
    pub fn train(
        features: &Array2<f32>,
        labels: &Array2<f32>,
        config: &ClassifierConfig,
        seed: u64,
    ) -> Result<Self> {
        config.validate()?;

        if features.nrows() != labels.nrows() {
            return Err(Error::DimensionMismatch {
                expected: features.nrows(),
                found: labels.nrows(),
            });
        }
        let samples = features.nrows();
        if samples == 0 || features.ncols() == 0 {
            return Err(Error::DimensionMismatch {
                expected: 1,
                found: 0,
            });
        }
        let classes = labels.ncols();
        if classes < 2 {
            return Err(Error::InvalidConfig(
                "labels must cover at least two classes".to_string(),
            ));
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut layer = DenseLayer::new(features.ncols(), classes, ActivationType::Softmax, &mut rng);
        let m = samples as f32;
        info!(
            "training softmax classifier {} -> {} on {} examples",
            features.ncols(),
            classes,
            samples
        );

        for epoch in 0..config.max_epochs {
            let probs = layer.forward(features);
            let loss = cross_entropy(&probs, labels)
                + 0.5 * config.l2_weight * layer.weights.mapv(|w| w * w).sum();
            if !loss.is_finite() {
                return Err(Error::OptimizationFailure(format!(
                    "non-finite loss at epoch {}",
                    epoch
                )));
            }
            if epoch % 10 == 0 {
                debug!("epoch {}/{}: loss = {:.6}", epoch + 1, config.max_epochs, loss);
            }

            // softmax + cross-entropy gradient
            let delta = (&probs - labels) / m;
            let grad_w = features.t().dot(&delta) + config.l2_weight * &layer.weights;
            let grad_b = delta.sum_axis(Axis(0));

            layer.weights = &layer.weights - config.learning_rate * &grad_w;
            layer.bias = &layer.bias - config.learning_rate * &grad_b;
        }

        if !all_finite(&layer.weights) {
            return Err(Error::OptimizationFailure(
                "non-finite weights after training".to_string(),
            ));
        }

        Ok(SoftmaxClassifier { layer })
    }

    /// Row-wise class-probability distributions for a feature batch.
    pub fn predict_proba(&self, features: &Array2<f32>) -> Result<Array2<f32>> {
        if features.ncols() != self.layer.inputs {
            return Err(Error::DimensionMismatch {
                expected: self.layer.inputs,
                found: features.ncols(),
            });
        }
        Ok(self.layer.forward(features))
    }

    pub fn input_size(&self) -> usize {
        self.layer.inputs
    }

    pub fn num_classes(&self) -> usize {
        self.layer.neurons
    }

    pub(crate) fn layer(&self) -> &DenseLayer {
        &self.layer
    }
}

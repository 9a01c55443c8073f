//! Layer-wise training of sparse autoencoders.
use log::{debug, info};
use ndarray::{Array2, Axis};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::activation::ActivationType;
use crate::error::{Error, Result};
use crate::hyperparameters::AutoencoderConfig;
use crate::layer::DenseLayer;
use crate::utils::all_finite;

/// A trained autoencoder: a sigmoid encoder mapping inputs to a smaller
/// hidden representation and a sigmoid decoder mapping it back, plus the
/// hyperparameters used to train it and the input rescaling range captured
/// when `scale_inputs` was set.
#[derive(Debug, Clone)]
pub struct Autoencoder {
    encoder: DenseLayer,
    decoder: DenseLayer,
    config: AutoencoderConfig,
    input_range: Option<(f32, f32)>,
}

/// Structural view of a trained autoencoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoencoderSummary {
    pub input_size: usize,
    pub hidden_size: usize,
    pub encoder_weights: (usize, usize),
    pub decoder_weights: (usize, usize),
}

impl Autoencoder {
    /// Trains an autoencoder on a batch of input rows by full-batch gradient
    /// descent on reconstruction error plus a weighted L2 penalty on the
    /// weights and a weighted KL-divergence sparsity penalty on the mean
    /// hidden activations.
    ///
    /// The explicit seed drives the only randomness (weight initialization):
    /// identical inputs and seed produce bit-identical weights.
    pub fn train(
        inputs: &Array2<f32>,
        hidden_size: usize,
        config: &AutoencoderConfig,
        seed: u64,
    ) -> Result<Self> {
        config.validate()?;

        let samples = inputs.nrows();
        let input_size = inputs.ncols();
        if samples == 0 || input_size == 0 {
            return Err(Error::DimensionMismatch {
                expected: 1,
                found: 0,
            });
        }
        if hidden_size == 0 {
            return Err(Error::InvalidConfig("hidden_size must be at least 1".to_string()));
        }
        if hidden_size >= input_size {
            return Err(Error::InvalidConfig(format!(
                "hidden_size ({}) must be smaller than the input dimensionality ({})",
                hidden_size, input_size
            )));
        }

        let (inputs, input_range) = if config.scale_inputs {
            let range = input_extent(inputs);
            (rescale(inputs, range), Some(range))
        } else {
            (inputs.to_owned(), None)
        };

        let mut rng = StdRng::seed_from_u64(seed);
        let mut encoder = DenseLayer::new(input_size, hidden_size, ActivationType::Sigmoid, &mut rng);
        let mut decoder = DenseLayer::new(hidden_size, input_size, ActivationType::Sigmoid, &mut rng);

        let m = samples as f32;
        let rho = config.sparsity_target;
        info!(
            "training autoencoder {} -> {} on {} examples",
            input_size, hidden_size, samples
        );

        for epoch in 0..config.max_epochs {
            let z1 = encoder.preactivate(&inputs);
            let hidden = encoder.activate(&z1);
            let z2 = decoder.preactivate(&hidden);
            let output = decoder.activate(&z2);

            let residual = &output - &inputs;
            // mean activation of each hidden unit, clamped away from 0 and 1
            let rho_hat = (hidden.sum_axis(Axis(0)) / m).mapv(|q| q.clamp(1e-6, 1.0 - 1e-6));

            let mse = residual.mapv(|v| v * v).sum() / (2.0 * m);
            let kl = rho_hat
                .mapv(|q| rho * (rho / q).ln() + (1.0 - rho) * ((1.0 - rho) / (1.0 - q)).ln())
                .sum();
            let l2 = 0.5
                * config.l2_weight
                * (encoder.weights.mapv(|w| w * w).sum() + decoder.weights.mapv(|w| w * w).sum());
            let loss = mse + config.sparsity_weight * kl + l2;
            if !loss.is_finite() {
                return Err(Error::OptimizationFailure(format!(
                    "non-finite loss at epoch {}",
                    epoch
                )));
            }
            if epoch % 10 == 0 {
                debug!("epoch {}/{}: loss = {:.6}", epoch + 1, config.max_epochs, loss);
            }

            // squared-error delta through the sigmoid decoder
            let delta_out = (&residual * &output.mapv(|a| a * (1.0 - a))) / m;
            let grad_w2 = hidden.t().dot(&delta_out) + config.l2_weight * &decoder.weights;
            let grad_b2 = delta_out.sum_axis(Axis(0));

            let sparsity_delta = rho_hat
                .mapv(|q| config.sparsity_weight * (-(rho / q) + (1.0 - rho) / (1.0 - q)) / m);
            let delta_hidden = (delta_out.dot(&decoder.weights.t()) + &sparsity_delta)
                * &hidden.mapv(|a| a * (1.0 - a));
            let grad_w1 = inputs.t().dot(&delta_hidden) + config.l2_weight * &encoder.weights;
            let grad_b1 = delta_hidden.sum_axis(Axis(0));

            encoder.weights = &encoder.weights - config.learning_rate * &grad_w1;
            encoder.bias = &encoder.bias - config.learning_rate * &grad_b1;
            decoder.weights = &decoder.weights - config.learning_rate * &grad_w2;
            decoder.bias = &decoder.bias - config.learning_rate * &grad_b2;
        }

        if !all_finite(&encoder.weights) || !all_finite(&decoder.weights) {
            return Err(Error::OptimizationFailure(
                "non-finite weights after training".to_string(),
            ));
        }

        Ok(Autoencoder {
            encoder,
            decoder,
            config: config.clone(),
            input_range,
        })
    }

    /// Applies the trained encoder to every input row, returning the hidden
    /// representation. Pure: repeated calls with the same weights and inputs
    /// return identical features. The input rescaling captured during
    /// training is applied first, so raw and encoded pipelines stay aligned.
    pub fn encode(&self, inputs: &Array2<f32>) -> Result<Array2<f32>> {
        if inputs.ncols() != self.encoder.inputs {
            return Err(Error::DimensionMismatch {
                expected: self.encoder.inputs,
                found: inputs.ncols(),
            });
        }
        let inputs = match self.input_range {
            Some(range) => rescale(inputs, range),
            None => inputs.to_owned(),
        };
        Ok(self.encoder.forward(&inputs))
    }

    /// Maps hidden representations back through the decoder.
    pub fn decode(&self, features: &Array2<f32>) -> Result<Array2<f32>> {
        if features.ncols() != self.decoder.inputs {
            return Err(Error::DimensionMismatch {
                expected: self.decoder.inputs,
                found: features.ncols(),
            });
        }
        Ok(self.decoder.forward(features))
    }

    /// Encode followed by decode.
    pub fn reconstruct(&self, inputs: &Array2<f32>) -> Result<Array2<f32>> {
        let features = self.encode(inputs)?;
        self.decode(&features)
    }

    pub fn input_size(&self) -> usize {
        self.encoder.inputs
    }

    pub fn hidden_size(&self) -> usize {
        self.encoder.neurons
    }

    pub(crate) fn encoder(&self) -> &DenseLayer {
        &self.encoder
    }

    pub fn config(&self) -> &AutoencoderConfig {
        &self.config
    }

    /// Structural summary: layer sizes and weight shapes.
    pub fn summary(&self) -> AutoencoderSummary {
        AutoencoderSummary {
            input_size: self.encoder.inputs,
            hidden_size: self.encoder.neurons,
            encoder_weights: self.encoder.weights.dim(),
            decoder_weights: self.decoder.weights.dim(),
        }
    }
}

fn input_extent(inputs: &Array2<f32>) -> (f32, f32) {
    let mut lo = f32::INFINITY;
    let mut hi = f32::NEG_INFINITY;
    for &v in inputs.iter() {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    (lo, hi)
}

// Rescales a batch to [0, 1], matching the decoder's sigmoid output range.
fn rescale(inputs: &Array2<f32>, (lo, hi): (f32, f32)) -> Array2<f32> {
    let span = hi - lo;
    if span <= f32::EPSILON {
        return inputs.mapv(|_| 0.0);
    }
    inputs.mapv(|v| (v - lo) / span)
}

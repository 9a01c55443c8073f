//! Composition of trained encoders and a classifier into one network,
//! plus end-to-end fine-tuning.
use log::{debug, info};
use ndarray::{Array2, Axis};

use crate::autoencoder::Autoencoder;
use crate::classifier::SoftmaxClassifier;
use crate::error::{Error, Result};
use crate::hyperparameters::FineTuneConfig;
use crate::layer::DenseLayer;
use crate::loss::cross_entropy;
use crate::utils::{all_finite, argmax};

/// An ordered chain of encoder layers followed by a softmax layer, exposing
/// a single mapping from raw flattened input to class probabilities.
#[derive(Debug, Clone)]
pub struct StackedNetwork {
    // sigmoid encoders in pipeline order, then the softmax output layer
    layers: Vec<DenseLayer>,
}

/// Structural view of a composed network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkSummary {
    pub input_size: usize,
    pub output_size: usize,
    pub layer_shapes: Vec<(usize, usize)>,
}

impl StackedNetwork {
    /// Composes trained encoders and a classifier. Purely structural: the
    /// encoder and classifier parameters are copied, so the source models
    /// remain untouched historical artifacts.
    pub fn stack(
        autoencoders: &[&Autoencoder],
        classifier: &SoftmaxClassifier,
    ) -> Result<StackedNetwork> {
        let first = autoencoders.first().ok_or_else(|| {
            Error::InvalidConfig("at least one encoder is required".to_string())
        })?;

        let mut layers = Vec::with_capacity(autoencoders.len() + 1);
        let mut expected = first.input_size();
        for autoencoder in autoencoders {
            if autoencoder.input_size() != expected {
                return Err(Error::DimensionMismatch {
                    expected,
                    found: autoencoder.input_size(),
                });
            }
            layers.push(autoencoder.encoder().clone());
            expected = autoencoder.hidden_size();
        }
        if classifier.input_size() != expected {
            return Err(Error::DimensionMismatch {
                expected,
                found: classifier.input_size(),
            });
        }
        layers.push(classifier.layer().clone());

        Ok(StackedNetwork { layers })
    }

    pub fn input_size(&self) -> usize {
        self.layers[0].inputs
    }

    pub fn output_size(&self) -> usize {
        self.layers[self.layers.len() - 1].neurons
    }

    /// Class-probability rows for a batch of raw flattened inputs.
    pub fn forward(&self, inputs: &Array2<f32>) -> Result<Array2<f32>> {
        if inputs.ncols() != self.input_size() {
            return Err(Error::DimensionMismatch {
                expected: self.input_size(),
                found: inputs.ncols(),
            });
        }
        let mut current = inputs.to_owned();
        for layer in &self.layers {
            current = layer.forward(&current);
        }
        Ok(current)
    }

    /// Arg-max class index for each input row.
    pub fn predict(&self, inputs: &Array2<f32>) -> Result<Vec<usize>> {
        let probs = self.forward(inputs)?;
        Ok(probs.rows().into_iter().map(argmax).collect())
    }

    /// Jointly retrains every parameter by mini-batch gradient descent on
    /// cross-entropy, starting from the current layer-wise values. This is
    /// the step that corrects for the greedy, layer-local pre-training.
    ///
    /// Returns the retrained network; `self` is left untouched so
    /// evaluations before and after tuning compare distinct values. The
    /// explicit seed drives the per-epoch shuffling and nothing else.
    pub fn fine_tune(
        &self,
        inputs: &Array2<f32>,
        labels: &Array2<f32>,
        config: &FineTuneConfig,
        seed: u64,
    ) -> Result<StackedNetwork> {
        config.validate()?;

        if inputs.nrows() != labels.nrows() {
            return Err(Error::DimensionMismatch {
                expected: inputs.nrows(),
                found: labels.nrows(),
            });
        }
        if inputs.ncols() != self.input_size() {
            return Err(Error::DimensionMismatch {
                expected: self.input_size(),
                found: inputs.ncols(),
            });
        }
        if labels.ncols() != self.output_size() {
            return Err(Error::DimensionMismatch {
                expected: self.output_size(),
                found: labels.ncols(),
            });
        }
        let samples = inputs.nrows();
        if samples == 0 {
            return Err(Error::DimensionMismatch {
                expected: 1,
                found: 0,
            });
        }

        let mut tuned = self.clone();
        let mut order: Vec<usize> = (0..samples).collect();
        let mut rng = fastrand::Rng::with_seed(seed);
        info!(
            "fine-tuning {} layers on {} examples",
            tuned.layers.len(),
            samples
        );

        for epoch in 0..config.max_epochs {
            rng.shuffle(&mut order);
            let mut epoch_loss = 0.0;
            for batch in order.chunks(config.batch_size) {
                let batch_inputs = inputs.select(Axis(0), batch);
                let batch_labels = labels.select(Axis(0), batch);
                let loss = tuned.train_batch(&batch_inputs, &batch_labels, config.learning_rate);
                epoch_loss += loss * batch.len() as f32;
            }
            epoch_loss /= samples as f32;
            if !epoch_loss.is_finite() {
                return Err(Error::OptimizationFailure(format!(
                    "non-finite loss at epoch {}",
                    epoch
                )));
            }
            if epoch % 10 == 0 {
                debug!(
                    "epoch {}/{}: loss = {:.6}",
                    epoch + 1,
                    config.max_epochs,
                    epoch_loss
                );
            }
        }

        for layer in &tuned.layers {
            if !all_finite(&layer.weights) {
                return Err(Error::OptimizationFailure(
                    "non-finite weights after fine-tuning".to_string(),
                ));
            }
        }
        Ok(tuned)
    }

    /// One gradient step over a mini-batch; returns the batch loss.
    fn train_batch(
        &mut self,
        inputs: &Array2<f32>,
        labels: &Array2<f32>,
        learning_rate: f32,
    ) -> f32 {
        let m = inputs.nrows() as f32;

        // forward pass, keeping each layer's input and pre-activation
        let mut layer_inputs = Vec::with_capacity(self.layers.len());
        let mut preactivations = Vec::with_capacity(self.layers.len());
        let mut current = inputs.to_owned();
        for layer in &self.layers {
            let z = layer.preactivate(&current);
            let a = layer.activate(&z);
            layer_inputs.push(current);
            preactivations.push(z);
            current = a;
        }
        let output = current;
        let loss = cross_entropy(&output, labels);

        // softmax + cross-entropy gradient at the output
        let mut delta = (&output - labels) / m;
        for k in (0..self.layers.len()).rev() {
            let grad_w = layer_inputs[k].t().dot(&delta);
            let grad_b = delta.sum_axis(Axis(0));
            if k > 0 {
                let upstream = delta.dot(&self.layers[k].weights.t());
                let act = self.layers[k - 1].activation;
                delta = upstream * &preactivations[k - 1].mapv(|v| act.derivative(v));
            }
            self.layers[k].weights = &self.layers[k].weights - learning_rate * &grad_w;
            self.layers[k].bias = &self.layers[k].bias - learning_rate * &grad_b;
        }

        loss
    }

    /// Structural summary: layer shapes from raw input to class output.
    pub fn summary(&self) -> NetworkSummary {
        NetworkSummary {
            input_size: self.input_size(),
            output_size: self.output_size(),
            layer_shapes: self.layers.iter().map(|l| (l.inputs, l.neurons)).collect(),
        }
    }
}

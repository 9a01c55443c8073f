use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use crate::activation::{softmax, ActivationType};

/// A fully connected layer operating on batches with one example per row.
#[derive(Debug, Clone)]
pub struct DenseLayer {
    pub inputs: usize,
    pub neurons: usize,
    /// Weight matrix of shape (inputs, neurons).
    pub weights: Array2<f32>,
    pub bias: Array1<f32>,
    pub activation: ActivationType,
}

impl DenseLayer {
    /// Constructs a new layer with Xavier-normal weights drawn from the
    /// caller-seeded generator. Biases start at zero.
    ///
    /// # Arguments
    ///
    /// * `inputs` - Number of inputs to this layer
    /// * `neurons` - Number of neurons in this layer
    /// * `activation` - Activation function type for the layer
    /// * `rng` - Seeded generator; the caller controls reproducibility
    pub fn new(
        inputs: usize,
        neurons: usize,
        activation: ActivationType,
        rng: &mut StdRng,
    ) -> Self {
        let std_dev = (2.0 / (inputs + neurons) as f32).sqrt();
        let normal_dist = Normal::new(0.0, std_dev).unwrap();

        let weights = Array2::from_shape_fn((inputs, neurons), |_| normal_dist.sample(rng));
        let bias = Array1::zeros(neurons);

        DenseLayer {
            inputs,
            neurons,
            weights,
            bias,
            activation,
        }
    }

    /// Pre-activation `z = xW + b` for a batch.
    pub fn preactivate(&self, input: &Array2<f32>) -> Array2<f32> {
        input.dot(&self.weights) + &self.bias
    }

    /// Applies the layer's activation to a pre-activation batch.
    pub fn activate(&self, z: &Array2<f32>) -> Array2<f32> {
        match self.activation {
            ActivationType::Softmax => softmax(z),
            act => z.mapv(|v| act.apply(v)),
        }
    }

    /// Forward propagation through the layer.
    pub fn forward(&self, input: &Array2<f32>) -> Array2<f32> {
        self.activate(&self.preactivate(input))
    }

    pub fn parameter_count(&self) -> usize {
        self.inputs * self.neurons + self.neurons
    }
}

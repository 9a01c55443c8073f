use crate::error::{Error, Result};

/// Hyperparameters for layer-wise autoencoder training.
#[derive(Debug, Clone)]
pub struct AutoencoderConfig {
    /// Number of full-batch gradient descent iterations
    pub max_epochs: usize,

    /// Step size for the gradient updates
    pub learning_rate: f32,

    /// L2 penalty on encoder and decoder weights
    pub l2_weight: f32,

    /// Strength of the KL-divergence sparsity penalty
    pub sparsity_weight: f32,

    /// Desired average activation of each hidden unit, in (0, 1)
    pub sparsity_target: f32,

    /// Rescale inputs to [0, 1] before training. Disable when the inputs
    /// are already-encoded features rather than raw pixels.
    pub scale_inputs: bool,
}

impl Default for AutoencoderConfig {
    fn default() -> Self {
        AutoencoderConfig {
            max_epochs: 400,
            learning_rate: 0.5,
            l2_weight: 0.004,
            sparsity_weight: 4.0,
            sparsity_target: 0.15,
            scale_inputs: true,
        }
    }
}

impl AutoencoderConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_epochs == 0 {
            return Err(Error::InvalidConfig("max_epochs must be at least 1".to_string()));
        }
        if !(self.learning_rate > 0.0) {
            return Err(Error::InvalidConfig("learning_rate must be positive".to_string()));
        }
        if !(self.l2_weight >= 0.0) {
            return Err(Error::InvalidConfig("l2_weight must be non-negative".to_string()));
        }
        if !(self.sparsity_weight >= 0.0) {
            return Err(Error::InvalidConfig(
                "sparsity_weight must be non-negative".to_string(),
            ));
        }
        if !(self.sparsity_target > 0.0 && self.sparsity_target < 1.0) {
            return Err(Error::InvalidConfig(
                "sparsity_target must lie strictly between 0 and 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Hyperparameters for supervised softmax-layer training.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub max_epochs: usize,
    pub learning_rate: f32,
    pub l2_weight: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        ClassifierConfig {
            max_epochs: 400,
            learning_rate: 0.5,
            l2_weight: 1e-4,
        }
    }
}

impl ClassifierConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_epochs == 0 {
            return Err(Error::InvalidConfig("max_epochs must be at least 1".to_string()));
        }
        if !(self.learning_rate > 0.0) {
            return Err(Error::InvalidConfig("learning_rate must be positive".to_string()));
        }
        if !(self.l2_weight >= 0.0) {
            return Err(Error::InvalidConfig("l2_weight must be non-negative".to_string()));
        }
        Ok(())
    }
}

/// Hyperparameters for end-to-end fine-tuning of a stacked network.
#[derive(Debug, Clone)]
pub struct FineTuneConfig {
    pub max_epochs: usize,
    pub learning_rate: f32,
    pub batch_size: usize,
}

impl Default for FineTuneConfig {
    fn default() -> Self {
        FineTuneConfig {
            max_epochs: 100,
            learning_rate: 0.1,
            batch_size: 32,
        }
    }
}

impl FineTuneConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_epochs == 0 {
            return Err(Error::InvalidConfig("max_epochs must be at least 1".to_string()));
        }
        if !(self.learning_rate > 0.0) {
            return Err(Error::InvalidConfig("learning_rate must be positive".to_string()));
        }
        if self.batch_size == 0 {
            return Err(Error::InvalidConfig("batch_size must be at least 1".to_string()));
        }
        Ok(())
    }
}

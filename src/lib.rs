mod activation;
mod autoencoder;
mod classifier;
mod dataset;
mod error;
mod hyperparameters;
mod layer;
mod loss;
mod metrics;
mod network;
mod utils;

pub use activation::ActivationType;
pub use autoencoder::{Autoencoder, AutoencoderSummary};
pub use classifier::SoftmaxClassifier;
pub use dataset::{
    DigitsDataset, Split, IMAGE_HEIGHT, IMAGE_SIZE, IMAGE_WIDTH, NUM_CLASSES,
};
pub use error::{Error, Result};
pub use hyperparameters::{AutoencoderConfig, ClassifierConfig, FineTuneConfig};
pub use layer::DenseLayer;
pub use loss::cross_entropy;
pub use metrics::{evaluate, Evaluation};
pub use network::{NetworkSummary, StackedNetwork};
pub use utils::{all_finite, argmax, one_hot};

//! Evaluation of a composed network on held-out data.
use std::fmt;

use ndarray::Array2;

use crate::error::{Error, Result};
use crate::network::StackedNetwork;
use crate::utils::argmax;

/// Evaluation report: class-by-class confusion counts (rows are true
/// classes, columns are predicted classes) and overall accuracy.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub confusion: Array2<usize>,
    pub accuracy: f32,
}

impl Evaluation {
    /// Total number of evaluated examples.
    pub fn total(&self) -> usize {
        self.confusion.sum()
    }

    /// Correctly classified examples (the confusion-matrix trace).
    pub fn correct(&self) -> usize {
        self.confusion.diag().sum()
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "accuracy: {:.4}", self.accuracy)?;
        writeln!(f, "confusion (rows: true, cols: predicted):")?;
        for row in self.confusion.rows() {
            for count in row {
                write!(f, "{:6}", count)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Runs forward inference over `inputs` and compares the arg-max prediction
/// of each row against the one-hot label's active index. Pure: no side
/// effects beyond the returned report.
pub fn evaluate(
    network: &StackedNetwork,
    inputs: &Array2<f32>,
    labels: &Array2<f32>,
) -> Result<Evaluation> {
    if inputs.nrows() != labels.nrows() {
        return Err(Error::DimensionMismatch {
            expected: inputs.nrows(),
            found: labels.nrows(),
        });
    }
    if labels.ncols() != network.output_size() {
        return Err(Error::DimensionMismatch {
            expected: network.output_size(),
            found: labels.ncols(),
        });
    }

    let probs = network.forward(inputs)?;
    let classes = network.output_size();
    let mut confusion = Array2::zeros((classes, classes));
    for (predicted_row, true_row) in probs.rows().into_iter().zip(labels.rows()) {
        let predicted = argmax(predicted_row);
        let actual = argmax(true_row);
        confusion[[actual, predicted]] += 1;
    }

    let correct: usize = confusion.diag().iter().sum();
    Ok(Evaluation {
        confusion,
        accuracy: correct as f32 / inputs.nrows() as f32,
    })
}

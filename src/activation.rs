use ndarray::Array2;

/// Enum representing different activation function types
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActivationType {
    Sigmoid,
    Linear,
    Softmax,
}

impl ActivationType {
    /// Applies the activation function to a given input.
    ///
    /// Softmax is not an elementwise function; it is applied row-wise in
    /// `DenseLayer::activate` and behaves as the identity here.
    pub fn apply(&self, x: f32) -> f32 {
        match self {
            ActivationType::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            ActivationType::Linear => x,
            ActivationType::Softmax => x,
        }
    }

    /// Computes the derivative of the activation function.
    ///
    /// For Softmax the Jacobian is folded into the cross-entropy gradient
    /// (prediction minus target), so the layer-local factor is 1.
    pub fn derivative(&self, x: f32) -> f32 {
        match self {
            ActivationType::Sigmoid => {
                let sigmoid = 1.0 / (1.0 + (-x).exp());
                sigmoid * (1.0 - sigmoid)
            }
            ActivationType::Linear => 1.0,
            ActivationType::Softmax => 1.0,
        }
    }
}

/// Numerically stable softmax applied to each row of a batch.
pub fn softmax(z: &Array2<f32>) -> Array2<f32> {
    let mut out = z.clone();
    for mut row in out.rows_mut() {
        let max = row.fold(f32::NEG_INFINITY, |m, &v| m.max(v));
        row.mapv_inplace(|v| (v - max).exp());
        let sum = row.sum();
        row.mapv_inplace(|v| v / sum);
    }
    out
}

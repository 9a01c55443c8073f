use ndarray::Array2;

/// Mean cross-entropy over a batch of probability rows and one-hot targets:
/// -Σ(target * log(prediction)) / n, with predictions clamped away from 0
/// and 1 to avoid log(0).
pub fn cross_entropy(predictions: &Array2<f32>, targets: &Array2<f32>) -> f32 {
    let epsilon = 1e-12;
    let safe = predictions.mapv(|p| p.clamp(epsilon, 1.0 - epsilon));
    -(targets * &safe.mapv(f32::ln)).sum() / predictions.nrows() as f32
}

use ndarray::{Array2, ArrayView1};

/// One-hot encodes class indices into an (n, classes) matrix.
pub fn one_hot(classes: usize, indices: &[usize]) -> Array2<f32> {
    let mut out = Array2::zeros((indices.len(), classes));
    for (row, &class) in indices.iter().enumerate() {
        out[[row, class]] = 1.0;
    }
    out
}

/// Index of the largest entry. Ties resolve to the earliest index.
pub fn argmax(values: ArrayView1<f32>) -> usize {
    let mut best = 0;
    let mut best_value = f32::NEG_INFINITY;
    for (i, &v) in values.iter().enumerate() {
        if v > best_value {
            best = i;
            best_value = v;
        }
    }
    best
}

/// Checks a parameter or activation matrix for NaN and infinities.
pub fn all_finite(values: &Array2<f32>) -> bool {
    values.iter().all(|v| v.is_finite())
}

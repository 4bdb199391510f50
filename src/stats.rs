use ndarray::{Array1, Array2, ArrayView2, Axis};

/// The column-wise mean of `samples`, zeros when there are no rows.
pub fn mean(samples: ArrayView2<f32>) -> Array1<f32> {
    samples
        .mean_axis(Axis(0))
        .unwrap_or_else(|| Array1::zeros(samples.ncols()))
}

/// The unbiased sample covariance of the columns of `samples`.
///
/// With less than two rows the covariance is undefined and zeros are returned.
pub fn covariance(samples: ArrayView2<f32>) -> Array2<f32> {
    let n = samples.nrows();
    let d = samples.ncols();

    if n < 2 {
        return Array2::zeros((d, d));
    }

    let centered = &samples - &mean(samples);
    centered.t().dot(&centered) / (n - 1) as f32
}

/// The Frobenius norm of `a - b`.
///
/// # Panics
/// If `a` and `b` don't have the same shape.
pub fn frobenius_distance(a: &Array2<f32>, b: &Array2<f32>) -> f32 {
    assert_eq!(a.dim(), b.dim(), "frobenius distance between different shapes");

    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f32>()
        .sqrt()
}

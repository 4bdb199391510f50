use std::io::{self, Write};

use machine_learning::dataset::Dataset;
use ndarray::{Array1, Array2, ArrayView2, arr1, arr2};
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::config::GanConfig;

/// Samples a `rows × cols` matrix of independent standard normal values.
pub fn standard_normal<R: Rng + ?Sized>(rng: &mut R, rows: usize, cols: usize) -> Array2<f32> {
    Array2::from_shape_simple_fn((rows, cols), || StandardNormal.sample(&mut *rng))
}

/// The real distribution `z · A + b` with `z ~ N(0, I)`.
#[derive(Debug, Clone)]
pub struct GaussianSource {
    transform: Array2<f32>,
    bias: Array1<f32>,
}

impl GaussianSource {
    /// Creates a new `GaussianSource`.
    ///
    /// # Arguments
    /// * `transform` - The matrix `A`.
    /// * `bias` - The vector `b`.
    pub fn new(transform: [[f32; 2]; 2], bias: [f32; 2]) -> Self {
        Self {
            transform: arr2(&transform),
            bias: arr1(&bias),
        }
    }

    pub fn from_config(config: &GanConfig) -> Self {
        Self::new(config.transform, config.bias)
    }

    /// Draws `n` samples, one per row.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R, n: usize) -> Array2<f32> {
        let z = standard_normal(rng, n, self.transform.nrows());
        z.dot(&self.transform) + &self.bias
    }

    /// Draws a `Dataset` of `n` samples.
    pub fn dataset<R: Rng + ?Sized>(&self, rng: &mut R, n: usize) -> Dataset {
        Dataset::from_array(self.sample(rng, n))
    }

    /// The exact mean of the distribution, `b`.
    pub fn mean(&self) -> Array1<f32> {
        self.bias.clone()
    }

    /// The exact covariance of the distribution, `Aᵀ · A`.
    pub fn covariance(&self) -> Array2<f32> {
        self.transform.t().dot(&self.transform)
    }
}

/// Writes the real and fake samples as `kind,x0,x1` CSV rows.
///
/// # Returns
/// An `InvalidInput` error if either set of samples isn't two columns wide.
pub fn write_samples_csv<W: Write>(
    mut w: W,
    real: ArrayView2<f32>,
    fake: ArrayView2<f32>,
) -> io::Result<()> {
    for (kind, samples) in [("real", real), ("fake", fake)] {
        if samples.ncols() != 2 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{kind} samples have {} columns, expected 2", samples.ncols()),
            ));
        }
    }

    writeln!(w, "kind,x0,x1")?;

    for (kind, samples) in [("real", real), ("fake", fake)] {
        for row in samples.rows() {
            writeln!(w, "{kind},{},{}", row[0], row[1])?;
        }
    }

    w.flush()
}

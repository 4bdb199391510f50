use std::num::NonZeroUsize;

use ndarray::{Array2, ArrayView2, Axis, iter::AxisChunksIter};
use rand::{Rng, seq::SliceRandom};

use crate::{MlErr, Result};

/// A fixed amount of samples stored as the rows of a matrix.
#[derive(Debug, Clone)]
pub struct Dataset {
    data: Array2<f32>,
}

impl Dataset {
    /// Creates a new `Dataset` from a flat row-major buffer.
    ///
    /// # Arguments
    /// * `data` - The samples, one after the other.
    /// * `x_size` - The width of each sample.
    ///
    /// # Returns
    /// An error if `x_size` is zero or `data` is not a whole number of samples.
    pub fn new(data: Vec<f32>, x_size: usize) -> Result<Self> {
        if x_size == 0 || data.len() % x_size != 0 {
            return Err(MlErr::SizeMismatch {
                what: "dataset rows",
                got: data.len(),
                expected: x_size * (data.len() / x_size.max(1)),
            });
        }

        let len = data.len() / x_size;
        let data = Array2::from_shape_vec((len, x_size), data)?;
        Ok(Self { data })
    }

    pub fn from_array(data: Array2<f32>) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.data.nrows() == 0
    }

    pub fn x_size(&self) -> usize {
        self.data.ncols()
    }

    pub fn view(&self) -> ArrayView2<'_, f32> {
        self.data.view()
    }

    /// Randomly permutes the order of the samples.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.shuffle(rng);
        self.data = self.data.select(Axis(0), &order);
    }

    /// Iterates the samples in order, `batch_size` rows at a time. The last batch is
    /// shorter whenever `batch_size` doesn't divide the amount of samples.
    pub fn batches(&self, batch_size: NonZeroUsize) -> AxisChunksIter<'_, f32, ndarray::Ix2> {
        self.data.axis_chunks_iter(Axis(0), batch_size.get())
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn dataset() -> Dataset {
        Dataset::new((0..10).flat_map(|i| [i as f32, -(i as f32)]).collect(), 2).unwrap()
    }

    #[test]
    fn rejects_partial_rows() {
        assert!(Dataset::new(vec![1.0, 2.0, 3.0], 2).is_err());
        assert!(Dataset::new(vec![1.0, 2.0], 0).is_err());
    }

    #[test]
    fn batches_cover_every_row_once() {
        let ds = dataset();
        let batches: Vec<_> = ds.batches(NonZeroUsize::new(4).unwrap()).collect();

        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].nrows(), 4);
        assert_eq!(batches[2].nrows(), 2);
        assert_eq!(batches.iter().map(|b| b.nrows()).sum::<usize>(), ds.len());
        assert_eq!(batches[2].row(1).to_vec(), [9.0, -9.0]);
    }

    #[test]
    fn shuffle_is_a_permutation_of_rows() {
        let mut ds = dataset();
        ds.shuffle(&mut StdRng::seed_from_u64(11));

        let mut firsts: Vec<f32> = ds.view().column(0).to_vec();
        assert_ne!(firsts, (0..10).map(|i| i as f32).collect::<Vec<_>>());

        for row in ds.view().rows() {
            assert_eq!(row[0], -row[1]);
        }

        firsts.sort_by(f32::total_cmp);
        assert_eq!(firsts, (0..10).map(|i| i as f32).collect::<Vec<_>>());
    }
}

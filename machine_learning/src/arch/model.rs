use ndarray::{Array2, ArrayView2};

use crate::{Result, params::ParamStore};

/// A differentiable function of a batch of rows.
///
/// A `Model` does not own its parameters, they live in a `ParamStore` sized after
/// `Model::size`.
pub trait Model {
    /// Returns the amount of parameters in the model.
    fn size(&self) -> usize;

    /// Makes a forward pass through the model, recording what `backward` needs.
    fn forward(&mut self, params: &ParamStore, x: ArrayView2<f32>) -> Result<Array2<f32>>;

    /// Makes a forward pass through the model without recording anything.
    fn predict(&self, params: &ParamStore, x: ArrayView2<f32>) -> Result<Array2<f32>>;

    /// Backpropagates `d`, the loss gradient with respect to the last `forward` output,
    /// accumulating the parameter gradient in `params`.
    ///
    /// # Returns
    /// The loss gradient with respect to the last `forward` input.
    fn backward(&mut self, params: &mut ParamStore, d: Array2<f32>) -> Result<Array2<f32>>;
}

use ndarray::{Array2, ArrayView2};

use super::{Model, layers::Layer};
use crate::{MlErr, Result, params::ParamStore};

/// A sequential model: information flows forward when computing an output and backward when
/// computing the *deltas* of its layers.
#[derive(Clone, Debug)]
pub struct Sequential {
    layers: Vec<Layer>,
}

impl Sequential {
    /// Creates a new `Sequential`.
    ///
    /// # Arguments
    /// * `layers` - The layers the sequential is composed of.
    ///
    /// # Returns
    /// A new `Sequential` instance.
    pub fn new<I>(layers: I) -> Self
    where
        I: IntoIterator<Item = Layer>,
    {
        Self {
            layers: layers.into_iter().collect(),
        }
    }

    /// Returns the width of the model's input, zero if it has no layers.
    pub fn input_dim(&self) -> usize {
        self.layers.first().map_or(0, |layer| layer.dim().0)
    }

    /// Returns the width of the model's output, zero if it has no layers.
    pub fn output_dim(&self) -> usize {
        self.layers.last().map_or(0, |layer| layer.dim().1)
    }

    fn check_params(&self, params: &ParamStore) -> Result<()> {
        let expected = self.size();

        if params.len() != expected {
            return Err(MlErr::SizeMismatch {
                what: "model params",
                got: params.len(),
                expected,
            });
        }

        Ok(())
    }
}

impl Model for Sequential {
    fn size(&self) -> usize {
        self.layers.iter().map(|layer| layer.size()).sum()
    }

    fn forward(&mut self, params: &ParamStore, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.check_params(params)?;

        let mut front = params.front();
        let mut y = x.to_owned();

        for layer in self.layers.iter_mut() {
            let size = layer.size();
            let layer_params = front.take(size).ok_or_else(|| MlErr::SizeMismatch {
                what: "layer params",
                got: front.remaining(),
                expected: size,
            })?;

            y = layer.forward(layer_params, y.view())?;
        }

        Ok(y)
    }

    fn predict(&self, params: &ParamStore, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.check_params(params)?;

        let mut front = params.front();
        let mut y = x.to_owned();

        for layer in self.layers.iter() {
            let size = layer.size();
            let layer_params = front.take(size).ok_or_else(|| MlErr::SizeMismatch {
                what: "layer params",
                got: front.remaining(),
                expected: size,
            })?;

            y = layer.predict(layer_params, y.view())?;
        }

        Ok(y)
    }

    fn backward(&mut self, params: &mut ParamStore, d: Array2<f32>) -> Result<Array2<f32>> {
        self.check_params(params)?;

        let nlayers = self.layers.len();
        let mut back = params.back();
        let mut d = d;

        for (i, layer) in self.layers.iter_mut().rev().enumerate() {
            let (layer_params, grad) =
                back.take(layer.size()).ok_or_else(|| MlErr::SizeMismatch {
                    what: "layers",
                    got: i,
                    expected: nlayers,
                })?;

            d = layer.backward(layer_params, grad, d)?;
        }

        Ok(d)
    }
}

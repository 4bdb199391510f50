use ndarray::{Array2, ArrayView2};

use super::LossFn;
use crate::arch::activations::sigmoid;

/// How the element-wise losses are folded into a single value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Reduction {
    #[default]
    Sum,
    Mean,
}

/// Binary cross entropy over raw logits, the sigmoid is folded into the loss.
///
/// Each element contributes `max(z, 0) - z * y + ln(1 + e^(-|z|))`, which equals
/// `-(y ln σ(z) + (1 - y) ln(1 - σ(z)))` but never evaluates `ln(0)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BceWithLogits {
    reduction: Reduction,
}

impl BceWithLogits {
    /// Returns a new `BceWithLogits`.
    pub fn new(reduction: Reduction) -> Self {
        Self { reduction }
    }

    fn scale(&self, n: usize) -> f32 {
        match self.reduction {
            Reduction::Sum => 1.,
            Reduction::Mean => 1. / n.max(1) as f32,
        }
    }
}

impl LossFn for BceWithLogits {
    fn loss(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> f32 {
        let total: f32 = y_pred
            .iter()
            .zip(y.iter())
            .map(|(&z, &y)| z.max(0.) - z * y + (-z.abs()).exp().ln_1p())
            .sum();

        total * self.scale(y_pred.len())
    }

    fn loss_prime(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> Array2<f32> {
        (y_pred.mapv(sigmoid) - &y) * self.scale(y_pred.len())
    }
}

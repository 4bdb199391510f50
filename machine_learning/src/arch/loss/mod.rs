mod bce;
mod loss_fn;

pub use bce::{BceWithLogits, Reduction};
pub use loss_fn::LossFn;

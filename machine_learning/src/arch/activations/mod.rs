mod act_fn;
mod sigmoid;
mod tanh;

pub use act_fn::ActFn;
pub use sigmoid::sigmoid;
pub use tanh::Tanh;

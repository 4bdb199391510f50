//! A generative adversarial network fit to a toy 2-D Gaussian.
//!
//! A linear `Generator` learns to map standard normal noise onto `N(b, Aᵀ · A)` by
//! competing against a small `Discriminator`, both built out of the
//! `machine_learning` primitives.

pub mod config;
pub mod data;
pub mod discriminator;
pub mod error;
pub mod gan;
pub mod generator;
mod network;
pub mod stats;
pub mod trainer;

pub use config::{GanConfig, InitSpec, OptimizerSpec};
pub use data::GaussianSource;
pub use discriminator::Discriminator;
pub use error::{GanErr, Result};
pub use gan::Gan;
pub use generator::Generator;
pub use trainer::{EpochStats, GanTrainer, TrainingReport};

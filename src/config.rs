use std::{
    fs,
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

use machine_learning::{
    initialization::{ConstParamGen, ParamGen, RandParamGen},
    optimization::{Adam, GradientDescent, GradientDescentWithMomentum, Optimizer},
};
use serde::{Deserialize, Serialize};

use crate::error::{GanErr, Result};

const NUM_SAMPLES: NonZeroUsize = NonZeroUsize::new(1000).unwrap();
const LATENT_DIM: NonZeroUsize = NonZeroUsize::new(2).unwrap();
const BATCH_SIZE: NonZeroUsize = NonZeroUsize::new(8).unwrap();
const EPOCHS: NonZeroUsize = NonZeroUsize::new(20).unwrap();
const EVAL_SAMPLES: NonZeroUsize = NonZeroUsize::new(100).unwrap();

fn default_beta1() -> f32 {
    Adam::BETA1
}

fn default_beta2() -> f32 {
    Adam::BETA2
}

fn default_epsilon() -> f32 {
    Adam::EPSILON
}

/// The specification for the `Optimizer` of one of the networks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerSpec {
    Adam {
        learning_rate: f32,
        #[serde(default = "default_beta1")]
        beta1: f32,
        #[serde(default = "default_beta2")]
        beta2: f32,
        #[serde(default = "default_epsilon")]
        epsilon: f32,
    },
    GradientDescent {
        learning_rate: f32,
    },
    GradientDescentWithMomentum {
        learning_rate: f32,
        momentum: f32,
    },
}

impl OptimizerSpec {
    /// Adam with the usual betas and epsilon.
    pub fn adam(learning_rate: f32) -> Self {
        Self::Adam {
            learning_rate,
            beta1: Adam::BETA1,
            beta2: Adam::BETA2,
            epsilon: Adam::EPSILON,
        }
    }

    pub fn learning_rate(&self) -> f32 {
        match *self {
            Self::Adam { learning_rate, .. }
            | Self::GradientDescent { learning_rate }
            | Self::GradientDescentWithMomentum { learning_rate, .. } => learning_rate,
        }
    }

    /// Builds the optimizer for a network of `len` parameters.
    pub fn build(&self, len: usize) -> Box<dyn Optimizer> {
        match *self {
            Self::Adam {
                learning_rate,
                beta1,
                beta2,
                epsilon,
            } => Box::new(Adam::new(len, learning_rate, beta1, beta2, epsilon)),
            Self::GradientDescent { learning_rate } => Box::new(GradientDescent::new(learning_rate)),
            Self::GradientDescentWithMomentum {
                learning_rate,
                momentum,
            } => Box::new(GradientDescentWithMomentum::new(len, learning_rate, momentum)),
        }
    }

    fn validate(&self, what: &str) -> Result<()> {
        let lr = self.learning_rate();
        if !(lr.is_finite() && lr > 0.) {
            return Err(GanErr::InvalidConfig(format!(
                "{what}: learning rate must be positive and finite, got {lr}"
            )));
        }

        let unit = |name: &str, x: f32| {
            if (0. ..1.).contains(&x) {
                Ok(())
            } else {
                Err(GanErr::InvalidConfig(format!(
                    "{what}: {name} must be in [0, 1), got {x}"
                )))
            }
        };

        match *self {
            Self::Adam {
                beta1,
                beta2,
                epsilon,
                ..
            } => {
                unit("beta1", beta1)?;
                unit("beta2", beta2)?;
                if !(epsilon.is_finite() && epsilon > 0.) {
                    return Err(GanErr::InvalidConfig(format!(
                        "{what}: epsilon must be positive and finite, got {epsilon}"
                    )));
                }
            }
            Self::GradientDescentWithMomentum { momentum, .. } => unit("momentum", momentum)?,
            Self::GradientDescent { .. } => {}
        }

        Ok(())
    }
}

/// The specification for the initial parameters of both networks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitSpec {
    Const { value: f32 },
    Normal { mean: f32, std_dev: f32 },
    Uniform { low: f32, high: f32 },
}

impl InitSpec {
    /// Builds a generator of exactly `len` parameters.
    pub fn build(&self, len: usize) -> Result<Box<dyn ParamGen>> {
        let param_gen: Box<dyn ParamGen> = match *self {
            Self::Const { value } => Box::new(ConstParamGen::new(value, len)),
            Self::Normal { mean, std_dev } => Box::new(RandParamGen::normal(len, mean, std_dev)?),
            Self::Uniform { low, high } => Box::new(RandParamGen::uniform(len, low, high)?),
        };

        Ok(param_gen)
    }
}

/// The hyperparameters of a training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GanConfig {
    /// Size of the real dataset.
    pub num_samples: NonZeroUsize,
    /// The matrix `A` in `x = z · A + b`, the target covariance is `Aᵀ · A`.
    pub transform: [[f32; 2]; 2],
    /// The vector `b` in `x = z · A + b`, the target mean.
    pub bias: [f32; 2],
    pub latent_dim: NonZeroUsize,
    pub batch_size: NonZeroUsize,
    pub epochs: NonZeroUsize,
    /// Amount of fake samples generated for inspection after each epoch.
    pub eval_samples: NonZeroUsize,
    pub discriminator_optimizer: OptimizerSpec,
    pub generator_optimizer: OptimizerSpec,
    pub init: InitSpec,
    pub seed: Option<u64>,
    /// Where to dump the real and last generated samples as CSV.
    pub samples_out: Option<PathBuf>,
}

impl Default for GanConfig {
    fn default() -> Self {
        Self {
            num_samples: NUM_SAMPLES,
            transform: [[1., 2.], [-0.1, 0.5]],
            bias: [1., 2.],
            latent_dim: LATENT_DIM,
            batch_size: BATCH_SIZE,
            epochs: EPOCHS,
            eval_samples: EVAL_SAMPLES,
            discriminator_optimizer: OptimizerSpec::adam(0.05),
            generator_optimizer: OptimizerSpec::adam(0.005),
            init: InitSpec::Normal {
                mean: 0.,
                std_dev: 0.02,
            },
            seed: None,
            samples_out: None,
        }
    }
}

impl GanConfig {
    /// Parses and validates a JSON config, missing fields take their default value.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        let finite = self
            .transform
            .iter()
            .flatten()
            .chain(&self.bias)
            .all(|x| x.is_finite());

        if !finite {
            return Err(GanErr::InvalidConfig(
                "transform and bias must be finite".into(),
            ));
        }

        self.discriminator_optimizer
            .validate("discriminator_optimizer")?;
        self.generator_optimizer.validate("generator_optimizer")?;

        self.init
            .build(0)
            .map_err(|e| GanErr::InvalidConfig(format!("init: {e}")))?;

        Ok(())
    }
}

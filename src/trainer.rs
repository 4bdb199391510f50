use std::{
    num::NonZeroUsize,
    time::{Duration, Instant},
};

use log::{debug, info, warn};
use machine_learning::dataset::Dataset;
use ndarray::{Array1, Array2, ArrayView2};
use rand::{SeedableRng, rngs::StdRng};

use crate::{
    config::GanConfig,
    data::{GaussianSource, standard_normal},
    error::Result,
    gan::Gan,
    stats,
};

/// Summed losses and processed examples over an epoch.
#[derive(Debug, Clone, Copy, Default)]
struct LossAccumulator {
    loss_d: f64,
    loss_g: f64,
    examples: usize,
}

impl LossAccumulator {
    fn add(&mut self, loss_d: f32, loss_g: f32, examples: usize) {
        self.loss_d += loss_d as f64;
        self.loss_g += loss_g as f64;
        self.examples += examples;
    }

    /// Returns the discriminator and generator losses per example.
    fn mean(&self) -> (f32, f32) {
        if self.examples == 0 {
            return (0., 0.);
        }

        let n = self.examples as f64;
        ((self.loss_d / n) as f32, (self.loss_g / n) as f32)
    }
}

/// What happened during a single epoch.
#[derive(Debug, Clone)]
pub struct EpochStats {
    pub epoch: usize,
    /// Discriminator loss per example.
    pub loss_d: f32,
    /// Generator loss per example.
    pub loss_g: f32,
    pub examples: usize,
    /// The fake samples generated after the epoch.
    pub samples: Array2<f32>,
    pub fake_mean: Array1<f32>,
    pub fake_cov: Array2<f32>,
}

/// The outcome of a whole training run.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub history: Vec<EpochStats>,
    pub elapsed: Duration,
    pub examples_per_sec: f64,
}

impl TrainingReport {
    pub fn last(&self) -> Option<&EpochStats> {
        self.history.last()
    }
}

/// Drives the adversarial training of a `Gan` over a fixed real dataset.
#[derive(Debug)]
pub struct GanTrainer {
    gan: Gan,
    source: GaussianSource,
    dataset: Dataset,
    rng: StdRng,
    latent_dim: usize,
    batch_size: NonZeroUsize,
    epochs: NonZeroUsize,
    eval_samples: NonZeroUsize,
}

impl GanTrainer {
    /// Creates a new `GanTrainer`, seeding its rng from `config.seed` or from the OS
    /// when there is none.
    pub fn from_config(config: &GanConfig) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Self::new(config, rng)
    }

    /// Creates a new `GanTrainer`.
    ///
    /// # Arguments
    /// * `config` - The hyperparameters of the run.
    /// * `rng` - Drives initialization, the real data, shuffling and the latent noise.
    ///
    /// # Returns
    /// An error if the config is invalid.
    pub fn new(config: &GanConfig, mut rng: StdRng) -> Result<Self> {
        config.validate()?;

        let gan = Gan::from_config(config, &mut rng)?;
        let source = GaussianSource::from_config(config);
        let dataset = source.dataset(&mut rng, config.num_samples.get());

        Ok(Self {
            gan,
            source,
            dataset,
            rng,
            latent_dim: config.latent_dim.get(),
            batch_size: config.batch_size,
            epochs: config.epochs,
            eval_samples: config.eval_samples,
        })
    }

    pub fn gan(&self) -> &Gan {
        &self.gan
    }

    pub fn source(&self) -> &GaussianSource {
        &self.source
    }

    /// The real samples, in the order of the last shuffle.
    pub fn real_samples(&self) -> ArrayView2<'_, f32> {
        self.dataset.view()
    }

    /// Draws `n` rows of standard normal latent noise.
    pub fn latent_batch(&mut self, n: usize) -> Array2<f32> {
        standard_normal(&mut self.rng, n, self.latent_dim)
    }

    /// Runs one discriminator step on real samples `x` and fakes generated out of `z`.
    pub fn update_discriminator(&mut self, x: ArrayView2<f32>, z: ArrayView2<f32>) -> Result<f32> {
        self.gan.update_discriminator(x, z)
    }

    /// Runs one generator step on the fakes generated out of `z`.
    pub fn update_generator(&mut self, z: ArrayView2<f32>) -> Result<f32> {
        self.gan.update_generator(z)
    }

    /// Runs a discriminator step and then a generator step, both on one fresh
    /// latent batch, just like every step of `train_epoch`.
    ///
    /// # Returns
    /// The discriminator and generator losses.
    pub fn train_step(&mut self, x: ArrayView2<f32>) -> Result<(f32, f32)> {
        train_step(&mut self.gan, &mut self.rng, self.latent_dim, x)
    }

    /// Generates `n` fake samples in inference mode.
    pub fn sample(&mut self, n: usize) -> Result<Array2<f32>> {
        let z = self.latent_batch(n);
        self.gan.sample(z.view())
    }

    /// Trains both networks over the shuffled dataset once, then generates
    /// `eval_samples` fake samples to inspect.
    pub fn train_epoch(&mut self, epoch: usize) -> Result<EpochStats> {
        self.dataset.shuffle(&mut self.rng);
        let mut acc = LossAccumulator::default();

        for (step, x) in self.dataset.batches(self.batch_size).enumerate() {
            let (loss_d, loss_g) = train_step(&mut self.gan, &mut self.rng, self.latent_dim, x)?;

            if !(loss_d.is_finite() && loss_g.is_finite()) {
                warn!("non finite loss: epoch={epoch} step={step} loss_d={loss_d} loss_g={loss_g}");
            }

            debug!("epoch={epoch} step={step} loss_d={loss_d:.4} loss_g={loss_g:.4}");
            acc.add(loss_d, loss_g, x.nrows());
        }

        let (loss_d, loss_g) = acc.mean();
        let samples = self.sample(self.eval_samples.get())?;
        let fake_mean = stats::mean(samples.view());
        let fake_cov = stats::covariance(samples.view());

        info!("epoch {}: loss_d={loss_d:.3} loss_g={loss_g:.3}", epoch + 1);
        info!(
            "fake mean={fake_mean} cov={} (real mean={} cov={})",
            fake_cov.to_string().replace('\n', ""),
            self.source.mean(),
            self.source.covariance().to_string().replace('\n', ""),
        );

        Ok(EpochStats {
            epoch,
            loss_d,
            loss_g,
            examples: acc.examples,
            samples,
            fake_mean,
            fake_cov,
        })
    }

    /// Trains for the configured amount of epochs.
    pub fn train(&mut self) -> Result<TrainingReport> {
        let epochs = self.epochs.get();
        info!(
            "training: samples={} batch_size={} epochs={epochs}",
            self.dataset.len(),
            self.batch_size
        );

        let start = Instant::now();
        let mut history = Vec::with_capacity(epochs);

        for epoch in 0..epochs {
            history.push(self.train_epoch(epoch)?);
        }

        let elapsed = start.elapsed();
        let examples: usize = history.iter().map(|stats| stats.examples).sum();
        let examples_per_sec = examples as f64 / elapsed.as_secs_f64().max(f64::EPSILON);

        if let Some(last) = history.last() {
            info!(
                "loss_d={:.3} loss_g={:.3}, {examples_per_sec:.1} examples/sec",
                last.loss_d, last.loss_g
            );
        }

        Ok(TrainingReport {
            history,
            elapsed,
            examples_per_sec,
        })
    }
}

fn train_step(
    gan: &mut Gan,
    rng: &mut StdRng,
    latent_dim: usize,
    x: ArrayView2<f32>,
) -> Result<(f32, f32)> {
    let z = standard_normal(rng, x.nrows(), latent_dim);
    let loss_d = gan.update_discriminator(x, z.view())?;
    let loss_g = gan.update_generator(z.view())?;
    Ok((loss_d, loss_g))
}

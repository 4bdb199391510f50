use machine_learning::{
    MlErr,
    arch::loss::{BceWithLogits, LossFn, Reduction},
};
use ndarray::{Array2, ArrayView2, Axis, concatenate, s};
use rand::RngCore;

use crate::{
    config::GanConfig,
    discriminator::Discriminator,
    error::Result,
    generator::Generator,
};

/// A generator and a discriminator playing against each other.
#[derive(Debug)]
pub struct Gan {
    generator: Generator,
    discriminator: Discriminator,
    loss_fn: BceWithLogits,
}

impl Gan {
    pub fn new(generator: Generator, discriminator: Discriminator) -> Self {
        Self {
            generator,
            discriminator,
            loss_fn: BceWithLogits::new(Reduction::Sum),
        }
    }

    /// Builds both networks out of `config`.
    pub fn from_config(config: &GanConfig, rng: &mut dyn RngCore) -> Result<Self> {
        let generator = Generator::new(
            config.latent_dim.get(),
            &config.init,
            &config.generator_optimizer,
            rng,
        )?;
        let discriminator =
            Discriminator::new(&config.init, &config.discriminator_optimizer, rng)?;

        Ok(Self::new(generator, discriminator))
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    pub fn discriminator(&self) -> &Discriminator {
        &self.discriminator
    }

    /// Generates fake samples in inference mode.
    pub fn sample(&self, z: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.generator.generate(z)
    }

    /// Makes the discriminator tell real samples `x` apart from samples generated
    /// out of `z`, stepping only the discriminator.
    ///
    /// The real and fake rows go through the discriminator as a single stacked batch
    /// labeled `[1.., 0..]`, halving the summed loss averages both halves.
    ///
    /// # Returns
    /// The average of the real and fake summed losses.
    pub fn update_discriminator(&mut self, x: ArrayView2<f32>, z: ArrayView2<f32>) -> Result<f32> {
        let fake = self.generator.generate(z)?;
        let batch = concatenate(Axis(0), &[x, fake.view()]).map_err(MlErr::from)?;

        let mut labels = Array2::zeros((batch.nrows(), 1));
        labels.slice_mut(s![..x.nrows(), ..]).fill(1.);

        self.discriminator.zero_grad();
        let logits = self.discriminator.forward(batch.view())?;

        let loss = self.loss_fn.loss(logits.view(), labels.view()) / 2.;
        let d = self.loss_fn.loss_prime(logits.view(), labels.view()) / 2.;

        self.discriminator.backward(d)?;
        self.discriminator.step()?;

        Ok(loss)
    }

    /// Makes the generator fool the discriminator with the samples generated out of
    /// `z`, stepping only the generator.
    ///
    /// # Returns
    /// The summed loss of the fake samples labeled as real.
    pub fn update_generator(&mut self, z: ArrayView2<f32>) -> Result<f32> {
        self.generator.zero_grad();
        let fake = self.generator.forward(z)?;
        let logits = self.discriminator.forward(fake.view())?;

        let labels = Array2::ones(logits.raw_dim());
        let loss = self.loss_fn.loss(logits.view(), labels.view());
        let d = self.loss_fn.loss_prime(logits.view(), labels.view());

        let d_fake = self.discriminator.backward(d)?;
        self.discriminator.zero_grad();

        self.generator.backward(d_fake)?;
        self.generator.step()?;

        Ok(loss)
    }
}

#[cfg(test)]
mod tests {
    use ndarray::arr2;
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::{
        config::{InitSpec, OptimizerSpec},
        data::{GaussianSource, standard_normal},
    };

    fn gan(rng: &mut StdRng) -> Gan {
        Gan::from_config(&GanConfig::default(), rng).unwrap()
    }

    #[test]
    fn discriminator_loss_at_zero_logits() {
        let mut rng = StdRng::seed_from_u64(0);
        let init = InitSpec::Const { value: 0. };
        let opt = OptimizerSpec::adam(0.01);
        let generator = Generator::new(2, &init, &opt, &mut rng).unwrap();
        let discriminator = Discriminator::new(&init, &opt, &mut rng).unwrap();
        let mut gan = Gan::new(generator, discriminator);

        let x = arr2(&[[1., 2.], [3., 4.], [5., 6.]]);
        let z = arr2(&[[0., 1.], [1., 0.], [1., 1.]]);

        // Every logit is zero, each sample contributes ln 2.
        let loss = gan.update_discriminator(x.view(), z.view()).unwrap();
        assert!((loss - 3. * std::f32::consts::LN_2).abs() < 1e-5, "{loss}");
    }

    #[test]
    fn losses_are_finite_and_non_negative() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut gan = gan(&mut rng);
        let source = GaussianSource::from_config(&GanConfig::default());

        for _ in 0..50 {
            let x = source.sample(&mut rng, 8);
            let z = standard_normal(&mut rng, 8, 2);

            let loss_d = gan.update_discriminator(x.view(), z.view()).unwrap();
            let loss_g = gan.update_generator(z.view()).unwrap();

            assert!(loss_d.is_finite() && loss_d >= 0., "{loss_d}");
            assert!(loss_g.is_finite() && loss_g >= 0., "{loss_g}");
        }
    }

    #[test]
    fn discriminator_learns_a_fixed_batch() {
        let mut rng = StdRng::seed_from_u64(21);
        let mut gan = gan(&mut rng);
        let source = GaussianSource::from_config(&GanConfig::default());

        let x = source.sample(&mut rng, 32);
        let z = standard_normal(&mut rng, 32, 2);

        let losses: Vec<f32> = (0..40)
            .map(|_| gan.update_discriminator(x.view(), z.view()).unwrap())
            .collect();

        let first: f32 = losses[..5].iter().sum();
        let last: f32 = losses[35..].iter().sum();
        assert!(last < first, "{losses:?}");
    }

    #[test]
    fn discriminator_update_leaves_the_generator_alone() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut gan = gan(&mut rng);
        let before = gan.generator().affine().unwrap();

        let x = arr2(&[[1., 2.], [0., 1.]]);
        let z = arr2(&[[0.3, -0.2], [1., 0.5]]);
        gan.update_discriminator(x.view(), z.view()).unwrap();

        assert_eq!(gan.generator().affine().unwrap(), before);
    }

    #[test]
    fn generator_update_leaves_the_discriminator_alone() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut gan = gan(&mut rng);
        let inputs = arr2(&[[1., 2.], [-1., 0.]]);
        let before = gan.discriminator().predict(inputs.view()).unwrap();

        let z = arr2(&[[0.3, -0.2], [1., 0.5]]);
        let fake_before = gan.sample(z.view()).unwrap();
        gan.update_generator(z.view()).unwrap();

        assert_eq!(gan.discriminator().predict(inputs.view()).unwrap(), before);
        assert_ne!(gan.sample(z.view()).unwrap(), fake_before);
    }
}

use machine_learning::{
    MlErr,
    arch::{Sequential, layers::Layer},
};
use ndarray::{Array2, ArrayView2};
use rand::RngCore;

use crate::{
    config::{InitSpec, OptimizerSpec},
    error::Result,
    network::Network,
};

/// The width of every generated sample.
pub const SAMPLE_DIM: usize = 2;

/// A single affine layer mapping latent noise onto the sample space.
#[derive(Debug)]
pub struct Generator {
    net: Network,
}

impl Generator {
    pub fn new(
        latent_dim: usize,
        init: &InitSpec,
        optimizer: &OptimizerSpec,
        rng: &mut dyn RngCore,
    ) -> Result<Self> {
        let model = Sequential::new([Layer::dense((latent_dim, SAMPLE_DIM), None)]);
        let net = Network::new(model, init, optimizer, rng)?;
        Ok(Self { net })
    }

    pub fn latent_dim(&self) -> usize {
        self.net.input_dim()
    }

    pub fn output_dim(&self) -> usize {
        self.net.output_dim()
    }

    /// Returns the weight matrix `W` and bias `b` of `z · W + b`.
    pub fn affine(&self) -> Result<(Array2<f32>, Array2<f32>)> {
        let params = self.net.params().params();
        let (w, b) = params.split_at(self.latent_dim() * SAMPLE_DIM);

        let w = Array2::from_shape_vec((self.latent_dim(), SAMPLE_DIM), w.to_vec())
            .map_err(MlErr::from)?;
        let b = Array2::from_shape_vec((1, SAMPLE_DIM), b.to_vec()).map_err(MlErr::from)?;
        Ok((w, b))
    }

    /// Generates one sample per latent row, recording what `backward` needs.
    pub fn forward(&mut self, z: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.net.forward(z)
    }

    /// Generates one sample per latent row in inference mode.
    pub fn generate(&self, z: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.net.predict(z)
    }

    pub fn backward(&mut self, d: Array2<f32>) -> Result<()> {
        self.net.backward(d)?;
        Ok(())
    }

    pub fn zero_grad(&mut self) {
        self.net.zero_grad();
    }

    pub fn step(&mut self) -> Result<()> {
        self.net.step()
    }
}

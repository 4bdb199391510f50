use machine_learning::arch::{Sequential, activations::ActFn, layers::Layer};
use ndarray::{Array2, ArrayView2};
use rand::RngCore;

use crate::{
    config::{InitSpec, OptimizerSpec},
    error::Result,
    generator::SAMPLE_DIM,
    network::Network,
};

/// A small feed-forward classifier `2 → 5 → 3 → 1` that outputs a logit, positive
/// when a sample looks real.
#[derive(Debug)]
pub struct Discriminator {
    net: Network,
}

impl Discriminator {
    pub fn new(init: &InitSpec, optimizer: &OptimizerSpec, rng: &mut dyn RngCore) -> Result<Self> {
        let model = Sequential::new([
            Layer::dense((SAMPLE_DIM, 5), Some(ActFn::tanh())),
            Layer::dense((5, 3), Some(ActFn::tanh())),
            Layer::dense((3, 1), None),
        ]);

        let net = Network::new(model, init, optimizer, rng)?;
        Ok(Self { net })
    }

    pub fn input_dim(&self) -> usize {
        self.net.input_dim()
    }

    pub fn forward(&mut self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.net.forward(x)
    }

    pub fn predict(&self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.net.predict(x)
    }

    /// Backpropagates `d` and returns the gradient with respect to the samples.
    pub fn backward(&mut self, d: Array2<f32>) -> Result<Array2<f32>> {
        self.net.backward(d)
    }

    pub fn zero_grad(&mut self) {
        self.net.zero_grad();
    }

    pub fn step(&mut self) -> Result<()> {
        self.net.step()
    }

    pub fn num_params(&self) -> usize {
        self.net.params().len()
    }
}

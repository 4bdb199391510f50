use machine_learning::{
    arch::{Model, Sequential},
    optimization::Optimizer,
    params::ParamStore,
};
use ndarray::{Array2, ArrayView2};
use rand::RngCore;

use crate::{
    config::{InitSpec, OptimizerSpec},
    error::Result,
};

/// A model bundled with its own parameters and optimizer.
pub struct Network {
    model: Sequential,
    params: ParamStore,
    optimizer: Box<dyn Optimizer>,
}

impl Network {
    /// Creates a new `Network`, sampling its initial parameters from `init`.
    ///
    /// # Arguments
    /// * `model` - The architecture.
    /// * `init` - How to initialize every parameter.
    /// * `optimizer` - How to apply the gradient onto the parameters.
    /// * `rng` - The source of randomness for the initialization.
    pub fn new(
        model: Sequential,
        init: &InitSpec,
        optimizer: &OptimizerSpec,
        rng: &mut dyn RngCore,
    ) -> Result<Self> {
        let size = model.size();
        let mut param_gen = init.build(size)?;
        let params = ParamStore::generate(size, param_gen.as_mut(), rng)?;

        Ok(Self {
            model,
            params,
            optimizer: optimizer.build(size),
        })
    }

    pub fn input_dim(&self) -> usize {
        self.model.input_dim()
    }

    pub fn output_dim(&self) -> usize {
        self.model.output_dim()
    }

    pub fn params(&self) -> &ParamStore {
        &self.params
    }

    pub fn forward(&mut self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        Ok(self.model.forward(&self.params, x)?)
    }

    pub fn predict(&self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        Ok(self.model.predict(&self.params, x)?)
    }

    pub fn backward(&mut self, d: Array2<f32>) -> Result<Array2<f32>> {
        Ok(self.model.backward(&mut self.params, d)?)
    }

    pub fn zero_grad(&mut self) {
        self.params.zero_grad();
    }

    /// Applies one optimizer step with the accumulated gradient.
    pub fn step(&mut self) -> Result<()> {
        Ok(self.params.optimize(self.optimizer.as_mut())?)
    }
}

impl std::fmt::Debug for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Network")
            .field("model", &self.model)
            .field("params", &self.params.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use machine_learning::arch::layers::Layer;
    use ndarray::arr2;
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn linear(value: f32, lr: f32) -> Network {
        let mut rng = StdRng::seed_from_u64(0);
        Network::new(
            Sequential::new([Layer::dense((2, 1), None)]),
            &InitSpec::Const { value },
            &OptimizerSpec::GradientDescent { learning_rate: lr },
            &mut rng,
        )
        .unwrap()
    }

    #[test]
    fn initializes_every_parameter() {
        let net = linear(0.25, 0.1);
        assert_eq!(net.params().params(), [0.25; 3]);
        assert_eq!((net.input_dim(), net.output_dim()), (2, 1));
    }

    #[test]
    fn step_follows_the_gradient() {
        let mut net = linear(0., 1.);
        let x = arr2(&[[1., 2.]]);

        net.zero_grad();
        net.forward(x.view()).unwrap();
        net.backward(arr2(&[[1.]])).unwrap();
        net.step().unwrap();

        assert_eq!(net.params().params(), [-1., -2., -1.]);
    }

    #[test]
    fn rejects_inputs_of_the_wrong_width() {
        let net = linear(0., 1.);
        assert!(net.predict(arr2(&[[1., 2., 3.]]).view()).is_err());
    }
}

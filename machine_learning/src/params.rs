use std::mem;

use rand::RngCore;

use crate::{MlErr, Result, initialization::ParamGen, optimization::Optimizer};

/// A model's flat parameter buffer together with its gradient.
///
/// Models don't own their parameters, each layer borrows a contiguous chunk of
/// this buffer. The chunks can be iterated sequentially in order or in reverse
/// through the `FrontIter` and the `BackIter`.
#[derive(Debug, Clone)]
pub struct ParamStore {
    params: Vec<f32>,
    grad: Vec<f32>,
}

impl ParamStore {
    /// Creates a new `ParamStore` with a zeroed gradient.
    ///
    /// # Arguments
    /// * `params` - The initial parameters.
    ///
    /// # Returns
    /// A new `ParamStore` instance.
    pub fn new(params: Vec<f32>) -> Self {
        let grad = vec![0.; params.len()];
        Self { params, grad }
    }

    /// Creates a new `ParamStore` sampling its initial parameters from a generator.
    ///
    /// # Arguments
    /// * `len` - The amount of parameters to hold.
    /// * `param_gen` - The generator of the initial values.
    /// * `rng` - A random number generator.
    ///
    /// # Returns
    /// An error if the generator could not provide `len` values.
    pub fn generate<G>(len: usize, param_gen: &mut G, rng: &mut dyn RngCore) -> Result<Self>
    where
        G: ParamGen + ?Sized,
    {
        let params = param_gen.sample(rng, len).unwrap_or_default();

        if params.len() != len {
            return Err(MlErr::SizeMismatch {
                what: "generated params",
                got: params.len(),
                expected: len,
            });
        }

        Ok(Self::new(params))
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn params(&self) -> &[f32] {
        &self.params
    }

    pub fn grad(&self) -> &[f32] {
        &self.grad
    }

    /// Zeroes out the gradient, backward passes accumulate on top of it.
    pub fn zero_grad(&mut self) {
        self.grad.fill(0.);
    }

    /// Creates a new `FrontIter` parameter iterator.
    ///
    /// The returned iterator iterates the model's layers forward.
    pub fn front(&self) -> FrontIter<'_> {
        FrontIter {
            params: &self.params,
        }
    }

    /// Creates a new `BackIter` parameter iterator.
    ///
    /// The returned iterator iterates the model's layers backwards, yielding each
    /// layer's parameters alongside its gradient slice.
    pub fn back(&mut self) -> BackIter<'_> {
        BackIter {
            params: &self.params,
            grad: &mut self.grad,
        }
    }

    /// Applies the accumulated gradient onto the parameters.
    ///
    /// # Arguments
    /// * `optimizer` - The optimizer that dictates how to update the parameters.
    pub fn optimize<O: Optimizer + ?Sized>(&mut self, optimizer: &mut O) -> Result<()> {
        optimizer.update_params(&self.grad, &mut self.params)
    }
}

/// The forward parameter iterator.
pub struct FrontIter<'pm> {
    params: &'pm [f32],
}

impl<'pm> FrontIter<'pm> {
    /// Takes the next `n` parameters.
    ///
    /// # Returns
    /// A slice of parameters or `None` if there are less than `n` parameters left.
    pub fn take(&mut self, n: usize) -> Option<&'pm [f32]> {
        if n > self.params.len() {
            return None;
        }

        let (head, tail) = self.params.split_at(n);
        self.params = tail;
        Some(head)
    }

    /// Returns the amount of parameters not taken yet.
    pub fn remaining(&self) -> usize {
        self.params.len()
    }
}

/// The reversed parameter iterator.
pub struct BackIter<'pm> {
    params: &'pm [f32],
    grad: &'pm mut [f32],
}

impl<'pm> BackIter<'pm> {
    /// Takes the last `n` parameters and their gradient.
    ///
    /// # Returns
    /// A tuple of parameters and gradient or `None` if there are less than `n` parameters left.
    pub fn take(&mut self, n: usize) -> Option<(&'pm [f32], &'pm mut [f32])> {
        let len = self.params.len();
        if n > len {
            return None;
        }

        let (params_head, params_tail) = self.params.split_at(len - n);
        self.params = params_head;

        let grad = mem::take(&mut self.grad);
        let (grad_head, grad_tail) = grad.split_at_mut(len - n);
        self.grad = grad_head;

        Some((params_tail, grad_tail))
    }
}

use ndarray::{linalg, prelude::*};

use crate::{MlErr, Result, arch::activations::ActFn};

/// A fully connected layer computing `act(x · W + b)` over a batch of rows.
///
/// The layer doesn't own its parameters, it reads them from a slice laid out as the
/// row-major `(in, out)` weight matrix followed by the `out` biases.
#[derive(Clone, Debug)]
pub struct Dense {
    dim: (usize, usize),
    act_fn: Option<ActFn>,
    size: usize,

    // Forward metadata
    x: Option<Array2<f32>>,
    z: Option<Array2<f32>>,
}

impl Dense {
    /// Creates a new `Dense` layer.
    ///
    /// # Arguments
    /// * `dim` - The input and output widths.
    /// * `act_fn` - The activation applied to the weighted sums, if any.
    pub fn new(dim: (usize, usize), act_fn: Option<ActFn>) -> Self {
        Self {
            dim,
            size: (dim.0 + 1) * dim.1,
            act_fn,
            x: None,
            z: None,
        }
    }

    /// Returns the amount of parameters this layer has.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn dim(&self) -> (usize, usize) {
        self.dim
    }

    /// Makes a forward pass keeping the metadata needed for `backward`.
    pub fn forward(&mut self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>> {
        let z = self.weighted_sum(params, x)?;
        let a = self.activate(&z);

        self.x = Some(x.to_owned());
        self.z = Some(z);
        Ok(a)
    }

    /// Makes a forward pass without recording anything for a later `backward`.
    pub fn predict(&self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>> {
        let z = self.weighted_sum(params, x)?;
        Ok(self.activate(&z))
    }

    /// Backpropagates `d`, the loss gradient with respect to this layer's output.
    ///
    /// The parameter gradient is **accumulated** onto `grad`.
    ///
    /// # Returns
    /// The loss gradient with respect to this layer's input of the last `forward` call.
    pub fn backward(
        &mut self,
        params: &[f32],
        grad: &mut [f32],
        mut d: Array2<f32>,
    ) -> Result<Array2<f32>> {
        let (Some(x), Some(z)) = (&self.x, &self.z) else {
            return Err(MlErr::MissingForwardPass);
        };

        if d.dim() != z.dim() {
            return Err(MlErr::SizeMismatch {
                what: "dense delta",
                got: d.len(),
                expected: z.len(),
            });
        }

        if let Some(act_fn) = self.act_fn {
            d.zip_mut_with(z, |d, &z| *d *= act_fn.df(z));
        }

        let (mut dw, mut db) = self.view_grad(grad)?;
        linalg::general_mat_mul(1.0, &x.t(), &d, 1.0, &mut dw);
        db += &d.sum_axis(Axis(0));

        let (w, _) = self.view_params(params)?;
        Ok(d.dot(&w.t()))
    }

    fn weighted_sum(&self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>> {
        if x.ncols() != self.dim.0 {
            return Err(MlErr::SizeMismatch {
                what: "dense input",
                got: x.ncols(),
                expected: self.dim.0,
            });
        }

        let (w, b) = self.view_params(params)?;
        let mut z = x.dot(&w);
        z += &b;
        Ok(z)
    }

    fn activate(&self, z: &Array2<f32>) -> Array2<f32> {
        match self.act_fn {
            Some(act_fn) => z.mapv(|z| act_fn.f(z)),
            None => z.clone(),
        }
    }

    fn check_len(&self, what: &'static str, got: usize) -> Result<()> {
        if got != self.size {
            return Err(MlErr::SizeMismatch {
                what,
                got,
                expected: self.size,
            });
        }

        Ok(())
    }

    /// Gives a view of the raw gradient slice as the delta weights and delta biases of this layer.
    fn view_grad<'a>(
        &self,
        grad: &'a mut [f32],
    ) -> Result<(ArrayViewMut2<'a, f32>, ArrayViewMut1<'a, f32>)> {
        self.check_len("dense grad", grad.len())?;

        let w_size = self.size - self.dim.1;
        let (dw_raw, db_raw) = grad.split_at_mut(w_size);
        let dw = ArrayViewMut2::from_shape(self.dim, dw_raw)?;
        let db = ArrayViewMut1::from_shape(self.dim.1, db_raw)?;
        Ok((dw, db))
    }

    /// Gives a view of the raw parameter slice as the weights and biases of this layer.
    fn view_params<'a>(&self, params: &'a [f32]) -> Result<(ArrayView2<'a, f32>, ArrayView1<'a, f32>)> {
        self.check_len("dense params", params.len())?;

        let w_size = self.size - self.dim.1;
        let (w_raw, b_raw) = params.split_at(w_size);
        let weights = ArrayView2::from_shape(self.dim, w_raw)?;
        let biases = ArrayView1::from_shape(self.dim.1, b_raw)?;
        Ok((weights, biases))
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    // 2 -> 2 layer, w = [[1, 2], [3, 4]], b = [0.5, -0.5]
    const PARAMS: [f32; 6] = [1.0, 2.0, 3.0, 4.0, 0.5, -0.5];

    #[test]
    fn forward_is_affine_without_act_fn() {
        let mut dense = Dense::new((2, 2), None);
        let x = array![[1.0, 1.0], [0.0, 2.0]];

        let y = dense.forward(&PARAMS, x.view()).unwrap();
        assert_eq!(y, array![[4.5, 5.5], [6.5, 7.5]]);
        assert_eq!(dense.predict(&PARAMS, x.view()).unwrap(), y);
    }

    #[test]
    fn backward_computes_param_and_input_gradients() {
        let mut dense = Dense::new((2, 2), None);
        let x = array![[1.0, 2.0]];
        let mut grad = [0.0; 6];

        dense.forward(&PARAMS, x.view()).unwrap();
        let dx = dense
            .backward(&PARAMS, &mut grad, array![[1.0, -1.0]])
            .unwrap();

        // dW = x^T d, db = d, dx = d W^T
        assert_eq!(grad, [1.0, -1.0, 2.0, -2.0, 1.0, -1.0]);
        assert_eq!(dx, array![[-1.0, -1.0]]);
    }

    #[test]
    fn backward_accumulates() {
        let mut dense = Dense::new((2, 2), None);
        let x = array![[1.0, 2.0]];
        let mut grad = [0.0; 6];

        for _ in 0..2 {
            dense.forward(&PARAMS, x.view()).unwrap();
            dense
                .backward(&PARAMS, &mut grad, array![[1.0, -1.0]])
                .unwrap();
        }

        assert_eq!(grad, [2.0, -2.0, 4.0, -4.0, 2.0, -2.0]);
    }

    #[test]
    fn gradient_matches_finite_differences() {
        let mut dense = Dense::new((2, 3), Some(ActFn::tanh()));
        let params: Vec<f32> = (0..dense.size()).map(|i| (i as f32 - 4.0) * 0.1).collect();
        let x = array![[0.3, -0.7], [1.1, 0.2]];

        // loss = sum(output)
        let y = dense.forward(&params, x.view()).unwrap();
        let mut grad = vec![0.0; dense.size()];
        dense
            .backward(&params, &mut grad, Array2::ones(y.raw_dim()))
            .unwrap();

        let h = 1e-2;
        for i in 0..params.len() {
            let mut plus = params.clone();
            let mut minus = params.clone();
            plus[i] += h;
            minus[i] -= h;

            let l_plus = dense.predict(&plus, x.view()).unwrap().sum();
            let l_minus = dense.predict(&minus, x.view()).unwrap().sum();
            let numeric = (l_plus - l_minus) / (2. * h);

            assert!((numeric - grad[i]).abs() < 1e-2, "param {i}: {numeric} vs {}", grad[i]);
        }
    }

    #[test]
    fn rejects_mismatched_shapes() {
        let mut dense = Dense::new((2, 2), None);

        assert!(matches!(
            dense.forward(&PARAMS, array![[1.0, 2.0, 3.0]].view()),
            Err(MlErr::SizeMismatch { expected: 2, .. })
        ));
        assert!(matches!(
            dense.forward(&PARAMS[..4], array![[1.0, 2.0]].view()),
            Err(MlErr::SizeMismatch { expected: 6, .. })
        ));
    }

    #[test]
    fn backward_before_forward_fails() {
        let mut dense = Dense::new((2, 2), None);
        let mut grad = [0.0; 6];

        assert!(matches!(
            dense.backward(&PARAMS, &mut grad, array![[1.0, 1.0]]),
            Err(MlErr::MissingForwardPass)
        ));
    }
}

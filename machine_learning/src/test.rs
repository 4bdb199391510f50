#![cfg(test)]

use std::num::NonZeroUsize;

use ndarray::{Array2, s};
use rand::{SeedableRng, rngs::StdRng};

use crate::{
    arch::{
        Model, Sequential,
        activations::{ActFn, sigmoid},
        layers::Layer,
        loss::{BceWithLogits, LossFn, Reduction},
    },
    dataset::Dataset,
    initialization::RandParamGen,
    optimization::{Adam, GradientDescent, Optimizer},
    params::ParamStore,
};

/// Trains `model` on rows of `[x.., y]` and returns the final mean loss.
fn train<O: Optimizer>(
    model: &mut Sequential,
    params: &mut ParamStore,
    optimizer: &mut O,
    data: &[f32],
    x_size: usize,
    epochs: usize,
) -> f32 {
    let mut dataset = Dataset::new(data.to_vec(), x_size + 1).unwrap();
    let mut rng = StdRng::seed_from_u64(0);
    let loss_fn = BceWithLogits::new(Reduction::Mean);
    let batch_size = NonZeroUsize::new(dataset.len()).unwrap();
    let mut last = f32::INFINITY;

    for _ in 0..epochs {
        dataset.shuffle(&mut rng);

        for batch in dataset.batches(batch_size) {
            let x = batch.slice(s![.., ..x_size]);
            let y = batch.slice(s![.., x_size..]);

            params.zero_grad();
            let y_pred = model.forward(params, x).unwrap();
            last = loss_fn.loss(y_pred.view(), y);

            let d = loss_fn.loss_prime(y_pred.view(), y);
            model.backward(params, d).unwrap();
            params.optimize(optimizer).unwrap();
        }
    }

    last
}

fn predictions(model: &Sequential, params: &ParamStore, data: &[f32], x_size: usize) -> Array2<f32> {
    let data = Dataset::new(data.to_vec(), x_size + 1).unwrap();
    let x = data.view().slice_move(s![.., ..x_size]);
    model.predict(params, x).unwrap().mapv(sigmoid)
}

#[test]
fn test_ml_and2_gate_convergence() {
    let and2 = [
        0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, //
        1.0, 0.0, 0.0, //
        1.0, 1.0, 1.0, //
    ];

    let mut model = Sequential::new([Layer::dense((2, 1), None)]);
    let mut params = ParamStore::new(vec![0.; model.size()]);
    let mut optimizer = GradientDescent::new(1.0);

    let loss = train(&mut model, &mut params, &mut optimizer, &and2, 2, 2000);
    let y_pred = predictions(&model, &params, &and2, 2);

    assert!(loss < 0.1, "loss: {loss}");
    for (p, y) in y_pred.iter().zip([0.0, 0.0, 0.0, 1.0]) {
        assert!((p - y).abs() < 0.5, "{y_pred:?}");
    }
}

#[test]
fn test_ml_xor2_gate_convergence() {
    let xor2 = [
        0.0, 0.0, 0.0, //
        0.0, 1.0, 1.0, //
        1.0, 0.0, 1.0, //
        1.0, 1.0, 0.0, //
    ];

    let mut model = Sequential::new([
        Layer::dense((2, 8), Some(ActFn::tanh())),
        Layer::dense((8, 1), None),
    ]);

    let mut rng = StdRng::seed_from_u64(42);
    let mut param_gen = RandParamGen::normal(model.size(), 0.0, 1.0).unwrap();
    let mut params = ParamStore::generate(model.size(), &mut param_gen, &mut rng).unwrap();
    let mut optimizer = Adam::with_defaults(model.size(), 0.05);

    let loss = train(&mut model, &mut params, &mut optimizer, &xor2, 2, 1000);
    let y_pred = predictions(&model, &params, &xor2, 2);

    assert!(loss < 0.1, "loss: {loss}");
    for (p, y) in y_pred.iter().zip([0.0, 1.0, 1.0, 0.0]) {
        assert!((p - y).abs() < 0.5, "{y_pred:?}");
    }
}

use custom_layers::error::LayerError;
use custom_layers::layers::{Activation, Center, Dense, Init, Layer, Sequential};
use custom_layers::optim::Sgd;
use custom_layers::params::ParamSet;
use custom_layers::tensor;
use custom_layers::tensors::Tensor;

#[test]
fn test_sgd_rejects_bad_learning_rates() {
    for lr in [0.0, -0.1, f64::NAN, f64::INFINITY] {
        assert!(matches!(Sgd::new(lr), Err(LayerError::InvalidConfig(_))));
    }
    assert_eq!(Sgd::new(0.01).unwrap().learning_rate(), 0.01);
}

#[test]
fn test_step_updates_only_named_parameters() {
    let mut dense = Dense::new(2, 2).unwrap();
    let mut grads = ParamSet::new();
    grads.insert("bias", tensor!([1.0, (-1.0)]));

    Sgd::new(0.5).unwrap().step(&mut dense, &grads).unwrap();
    assert_eq!(dense.bias().data, vec![0.5, 1.5]);
    assert_eq!(dense.weight(), &Tensor::ones(vec![2, 2]));
}

#[test]
fn test_step_with_unknown_gradient_leaves_layer_untouched() {
    let mut dense = Dense::new(2, 2).unwrap();
    let before = dense.clone();
    let mut grads = ParamSet::new();
    grads.insert("bias", tensor!([1.0, 1.0]));
    grads.insert("gamma", tensor!([1.0, 1.0]));

    let err = Sgd::new(0.5).unwrap().step(&mut dense, &grads).unwrap_err();
    assert!(matches!(err, LayerError::UnknownParameter(name) if name == "gamma"));
    assert_eq!(dense, before);
}

#[test]
fn test_step_with_non_finite_gradient_leaves_layer_untouched() {
    let mut dense = Dense::new(2, 2).unwrap();
    let before = dense.clone();
    let mut grads = ParamSet::new();
    grads.insert("bias", tensor!([1.0, 1.0]));
    grads.insert("weight", Tensor::full(vec![2, 2], f64::NAN));

    let err = Sgd::new(0.5).unwrap().step(&mut dense, &grads).unwrap_err();
    assert!(matches!(err, LayerError::NonFinite(name) if name == "weight"));
    assert_eq!(dense, before);
}

#[test]
fn test_step_with_misshapen_gradient_is_a_shape_error() {
    let mut dense = Dense::new(2, 2).unwrap();
    let mut grads = ParamSet::new();
    grads.insert("bias", Tensor::ones(vec![3]));

    let err = Sgd::new(0.5).unwrap().step(&mut dense, &grads).unwrap_err();
    assert!(err.is_shape_error());
    assert_eq!(dense.bias().data, vec![1.0, 1.0]);
}

#[test]
fn test_empty_gradients_are_a_no_op() {
    let mut center = Center;
    Sgd::new(0.1).unwrap().step(&mut center, &ParamSet::new()).unwrap();
}

#[test]
fn test_training_reduces_loss() {
    // y = 2x + 1
    let x = Tensor::new(vec![4, 1], vec![1.0, 2.0, 3.0, 4.0]);
    let y = Tensor::new(vec![4, 1], vec![3.0, 5.0, 7.0, 9.0]);

    let mut model = Sequential::new().with(
        Dense::builder(1, 1)
            .activation(Activation::Identity)
            .init(Init::Constant(0.5))
            .build()
            .unwrap(),
    );
    let sgd = Sgd::new(0.05).unwrap();

    let first = sgd.train_step(&mut model, &x, &y).unwrap();
    let mut last = first;
    for _ in 0..2000 {
        last = sgd.train_step(&mut model, &x, &y).unwrap();
    }
    assert!(last < first);
    assert!(last < 1e-6, "loss did not converge: {last}");

    let params = model.parameters();
    assert!((params.get("0.weight").unwrap().data[0] - 2.0).abs() < 1e-2);
    assert!((params.get("0.bias").unwrap().data[0] - 1.0).abs() < 1e-2);
}

#[test]
fn test_training_through_dyn_layer() {
    let mut model: Box<dyn Layer> = Box::new(
        Sequential::new()
            .with(Center)
            .with(Dense::builder(2, 1).init(Init::Sinusoidal).build().unwrap()),
    );
    let x = tensor!([[1.0, 2.0], [3.0, 5.0]]);
    let y = tensor!([[0.5], [2.0]]);
    let sgd = Sgd::new(0.1).unwrap();

    let first = sgd.train_step(model.as_mut(), &x, &y).unwrap();
    let second = sgd.train_step(model.as_mut(), &x, &y).unwrap();
    assert!(second < first);
}

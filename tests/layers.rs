use custom_layers::approx::approx_eq;
use custom_layers::error::LayerError;
use custom_layers::layers::{Activation, ActivationLayer, Center, Dense, Init, Layer, Sequential};
use custom_layers::params::ParamSet;
use custom_layers::tensor;
use custom_layers::tensors::Tensor;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_tensor(rng: &mut StdRng, shape: Vec<usize>) -> Tensor<f64> {
    let len = shape.iter().product();
    let data = (0..len).map(|_| rng.random_range(-100.0..100.0)).collect();
    Tensor::new(shape, data)
}

#[test]
fn test_center_output_has_zero_mean() {
    let mut rng = StdRng::seed_from_u64(7);
    for shape in [vec![1], vec![17], vec![4, 5], vec![2, 3, 4]] {
        let x = random_tensor(&mut rng, shape);
        let out = Center.apply(&x).unwrap();
        assert!(out.mean().unwrap().abs() < 1e-6);
    }
}

#[test]
fn test_center_handles_values_near_the_float_limit() {
    let x = Tensor::new(vec![3], vec![1e308, 1e308, -1e308]);
    let out = Center.apply(&x).unwrap();
    assert!(out.is_finite(), "centered output not finite: {:?}", out.data);
    assert!(out.mean().unwrap().abs() < 1e-12 * 1e308);
    let third = 1e308 / 3.0;
    assert!((out.data[0] / (1e308 - third) - 1.0).abs() < 1e-12);
    assert!((out.data[2] / (-1e308 - third) - 1.0).abs() < 1e-12);
}

#[test]
fn test_center_preserves_shape() {
    let x = Tensor::ones(vec![3, 1, 2]);
    let out = Center.apply(&x).unwrap();
    assert_eq!(out.shape, x.shape);
    assert_eq!(out.data, vec![0.0; 6]);
}

#[test]
fn test_center_twice_only_changes_by_rounding() {
    let mut rng = StdRng::seed_from_u64(11);
    let x = random_tensor(&mut rng, vec![8, 8]);
    let once = Center.apply(&x).unwrap();
    let twice = Center.apply(&once).unwrap();
    assert!(approx_eq(&once, &twice));
}

#[test]
fn test_center_scalar_and_empty() {
    let out = Center.apply(&tensor!(4.5)).unwrap();
    assert_eq!(out.shape, Vec::<usize>::new());
    assert_eq!(out.data, vec![0.0]);

    let err = Center.apply(&Tensor::zeros(vec![0, 3])).unwrap_err();
    assert!(matches!(err, LayerError::EmptyTensor { .. }));
}

#[test]
fn test_center_has_no_parameters() {
    let mut center = Center;
    assert!(center.parameters().is_empty());
    assert_eq!(center.num_parameters(), 0);

    let mut params = ParamSet::new();
    params.insert("weight", Tensor::ones(vec![1]));
    assert!(matches!(
        center.set_parameters(params),
        Err(LayerError::UnknownParameter(_))
    ));
}

#[test]
fn test_dense_all_ones() {
    let dense = Dense::new(5, 3).unwrap();
    assert_eq!(dense.weight(), &Tensor::ones(vec![5, 3]));
    assert_eq!(dense.bias(), &Tensor::ones(vec![3]));

    let out = dense.apply(&Tensor::ones(vec![2, 5])).unwrap();
    assert_eq!(out, tensor!([[6.0, 6.0, 6.0], [6.0, 6.0, 6.0]]));

    // identical before the activation
    let linear = Dense::builder(5, 3)
        .activation(Activation::Identity)
        .build()
        .unwrap();
    assert_eq!(linear.apply(&Tensor::ones(vec![2, 5])).unwrap(), out);
}

#[test]
fn test_dense_relu_clamps_negatives() {
    let dense = Dense::builder(2, 2).init(Init::Constant(-1.0)).build().unwrap();
    let out = dense.apply(&tensor!([[1.0, 1.0]])).unwrap();
    assert_eq!(out.data, vec![0.0, 0.0]);
}

#[test]
fn test_dense_shape_mismatch_is_an_error() {
    let dense = Dense::new(5, 3).unwrap();
    let err = dense.apply(&Tensor::ones(vec![2, 4])).unwrap_err();
    assert!(err.is_shape_error());
    match err {
        LayerError::ShapeMismatch { expected, found, .. } => {
            assert_eq!(expected, vec![2, 5]);
            assert_eq!(found, vec![2, 4]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(dense.forward(&Tensor::ones(vec![2, 4])).is_err());
}

#[test]
fn test_dense_parameters_are_named() {
    let dense = Dense::new(4, 2).unwrap();
    let params = dense.parameters();
    let names: Vec<&str> = params.names().collect();
    assert_eq!(names, vec!["bias", "weight"]);
    assert_eq!(dense.num_parameters(), 4 * 2 + 2);
}

#[test]
fn test_dense_apply_does_not_mutate_parameters() {
    let dense = Dense::builder(3, 2).init(Init::Sinusoidal).build().unwrap();
    let before = dense.parameters();
    let _ = dense.apply(&Tensor::ones(vec![4, 3])).unwrap();
    let _ = dense.forward(&Tensor::ones(vec![4, 3])).unwrap();
    assert_eq!(dense.parameters(), before);
}

#[test]
fn test_sequential_shapes_compose() {
    let model = Sequential::new()
        .with(Dense::new(64, 8).unwrap())
        .with(Dense::new(8, 1).unwrap());

    let mut rng = StdRng::seed_from_u64(3);
    let x = random_tensor(&mut rng, vec![2, 64]);
    let out = model.apply(&x).unwrap();
    assert_eq!(out.shape, vec![2, 1]);
    assert!(out.data.iter().all(|&v| v >= 0.0));
}

#[test]
fn test_sequential_matches_manual_chaining() {
    let a = Dense::builder(3, 4).init(Init::Sinusoidal).build().unwrap();
    let b = Dense::builder(4, 2).init(Init::Constant(0.25)).build().unwrap();
    let x = tensor!([[1.0, (-2.0), 3.0], [0.5, 0.5, (-0.5)]]);

    let manual = b.apply(&a.apply(&Center.apply(&x).unwrap()).unwrap()).unwrap();
    let model = Sequential::new().with(Center).with(a).with(b);
    assert_eq!(model.apply(&x).unwrap(), manual);
}

#[test]
fn test_sequential_aborts_at_first_failure() {
    let model = Sequential::new()
        .with(Dense::new(4, 3).unwrap())
        .with(Dense::new(5, 1).unwrap())
        .with(Dense::new(7, 1).unwrap());

    let err = model.apply(&Tensor::ones(vec![2, 4])).unwrap_err();
    match err {
        LayerError::ShapeMismatch { expected, found, .. } => {
            // reported by the second layer, not the third
            assert_eq!(expected, vec![2, 5]);
            assert_eq!(found, vec![2, 3]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_empty_sequential_is_identity() {
    let model = Sequential::new();
    assert!(model.is_empty());
    let x = tensor!([1.0, 2.0]);
    assert_eq!(model.apply(&x).unwrap(), x);

    let (out, back) = model.forward(&x).unwrap();
    assert_eq!(out, x);
    let grads = back(&tensor!([3.0, 4.0])).unwrap();
    assert_eq!(grads.input, tensor!([3.0, 4.0]));
    assert!(grads.params.is_empty());
}

#[test]
fn test_nested_sequential_parameter_names() {
    let inner = Sequential::new()
        .with(Dense::new(2, 2).unwrap())
        .with(ActivationLayer(Activation::Relu));
    let model = Sequential::new().with(Center).with(inner);

    let names: Vec<String> = model
        .parameters()
        .names()
        .map(str::to_string)
        .collect();
    assert_eq!(names, vec!["1.0.bias", "1.0.weight"]);
    assert_eq!(model.len(), 2);
    assert_eq!(
        model.iter().map(|l| l.name()).collect::<Vec<_>>(),
        vec!["center", "sequential"]
    );
}

#[test]
fn test_sequential_set_parameters_routes_to_children() {
    let mut model = Sequential::new()
        .with(Dense::new(2, 2).unwrap())
        .with(Dense::new(2, 1).unwrap());

    let mut params = ParamSet::new();
    params.insert("1.bias", tensor!([5.0]));
    model.set_parameters(params).unwrap();

    let out = model.apply(&tensor!([[0.0, 0.0]])).unwrap();
    // first layer: [1, 1]; second: 1 + 1 + 5
    assert_eq!(out.data, vec![7.0]);
}

#[test]
fn test_sequential_set_parameters_rolls_back() {
    let mut model = Sequential::new()
        .with(Dense::new(2, 2).unwrap())
        .with(Dense::new(2, 1).unwrap());
    let before = model.parameters();

    let mut params = ParamSet::new();
    params.insert("0.bias", tensor!([9.0, 9.0]));
    params.insert("1.weight", Tensor::ones(vec![3, 1]));
    assert!(model.set_parameters(params).is_err());
    assert_eq!(model.parameters(), before);

    let mut params = ParamSet::new();
    params.insert("2.weight", Tensor::ones(vec![2, 1]));
    assert!(matches!(
        model.set_parameters(params),
        Err(LayerError::UnknownParameter(name)) if name == "2.weight"
    ));
}

//! Runs in its own test binary because it flips the global backend.

use custom_layers::approx::approx_eq;
use custom_layers::backend::{get_backend, set_backend, Backend};
use custom_layers::layers::{Center, Dense, Init, Layer, Sequential};
use custom_layers::tensors::Tensor;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
fn test_serial_and_rayon_backends_agree() {
    assert_eq!(get_backend(), Backend::Cpu);

    let model = Sequential::new()
        .with(Center)
        .with(Dense::builder(32, 16).init(Init::Sinusoidal).build().unwrap())
        .with(Dense::builder(16, 4).init(Init::Sinusoidal).build().unwrap());

    let mut rng = StdRng::seed_from_u64(42);
    let data = (0..64 * 32).map(|_| rng.random_range(-1.0..1.0)).collect();
    let x = Tensor::new(vec![64, 32], data);
    let grad_out = Tensor::ones(vec![64, 4]);

    let serial = model.apply(&x).unwrap();
    let serial_grads = {
        let (_, back) = model.forward(&x).unwrap();
        back(&grad_out).unwrap()
    };

    set_backend(Backend::Rayon);
    assert_eq!(get_backend(), Backend::Rayon);
    let parallel = model.apply(&x).unwrap();
    let parallel_grads = {
        let (_, back) = model.forward(&x).unwrap();
        back(&grad_out).unwrap()
    };
    set_backend(Backend::Cpu);

    assert!(approx_eq(&serial, &parallel));
    assert!(approx_eq(&serial_grads.input, &parallel_grads.input));
    for (name, g) in serial_grads.params.iter() {
        assert!(approx_eq(g, parallel_grads.params.get(name).unwrap()), "{name}");
    }
}

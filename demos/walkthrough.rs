use custom_layers::{
    backend::{set_backend, Backend},
    layers::{Activation, Center, Dense, Init, Layer, Sequential},
    modelio::{load_params, save_params},
    optim::Sgd,
    tensors::Tensor,
};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    // a parameter-free layer
    let x = Tensor::new(vec![2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    let centered = Center.apply(&x)?;
    println!("centered: {:?} (mean {:?})", centered.data, centered.mean());

    // a parameterized layer with the naive all-ones initialization
    let dense = Dense::new(5, 3)?;
    let out = dense.apply(&Tensor::ones(vec![2, 5]))?;
    println!("dense(ones): {:?}", out.data);

    // shape mismatches surface as errors
    if let Err(e) = dense.apply(&Tensor::ones(vec![2, 4])) {
        println!("expected failure: {e}");
    }

    // composition, trained on y = 2x + 1 with the rayon backend
    set_backend(Backend::Rayon);
    let mut model = Sequential::new().with(Center).with(
        Dense::builder(1, 1)
            .activation(Activation::Identity)
            .init(Init::Constant(0.5))
            .build()?,
    );

    let x = Tensor::new(vec![4, 1], vec![1.0, 2.0, 3.0, 4.0]);
    let y = Tensor::new(vec![4, 1], vec![3.0, 5.0, 7.0, 9.0]);
    let sgd = Sgd::new(0.1)?;

    for epoch in 0..200 {
        let loss = sgd.train_step(&mut model, &x, &y)?;
        if epoch % 50 == 0 {
            println!("Epoch {epoch:4} Loss {loss:.6}");
        }
    }
    println!("trained parameters: {:?}", model.parameters());

    // persist and restore
    let path = std::env::temp_dir().join("walkthrough.lpar");
    save_params(&path, &model.parameters())?;
    let mut restored = Sequential::new()
        .with(Center)
        .with(Dense::builder(1, 1).activation(Activation::Identity).build()?);
    restored.set_parameters(load_params(&path)?)?;
    println!("restored prediction: {:?}", restored.apply(&x)?.data);

    Ok(())
}

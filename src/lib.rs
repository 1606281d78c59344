//! custom_layers: user-defined neural network layers in Rust.
//!
//! Shows how to author layer types over a small tensor and manual-autograd
//! core: a parameter-free layer, a parameterized layer, and their
//! composition into sequential models.
//!
//! # Features
//!
//! - A single capability trait, [`layers::Layer`], with `apply`, `forward`
//!   (returning a backward closure) and an explicit parameter interface.
//! - [`layers::Center`]: subtracts the global mean.
//! - [`layers::Dense`]: `activation(x · W + b)`, ReLU by default.
//! - [`layers::Sequential`]: a composite that is itself a layer.
//! - Parameter persistence in a small binary format.
//!
//! # Modules
//!
//! - [`tensors`] — Core tensor data structures.
//! - [`backprop`] — Differentiable operations and autograd utilities.
//! - [`ops`] — Shape-checked kernels and backend dispatch.
//! - [`backend`] — Serial or rayon execution.
//! - [`params`] — Named parameter sets.
//! - [`layers`] — The layer trait and its implementations.
//! - [`optim`] — SGD, the training-side collaborator that updates parameters.
//! - [`modelio`] — Saving/loading of parameter sets.
//! - [`approx`] — Float comparison helpers.
//!
//! # Example
//!
//! ```rust
//! use custom_layers::layers::{Dense, Layer, Sequential};
//! use custom_layers::tensors::Tensor;
//!
//! let model = Sequential::new()
//!     .with(Dense::new(64, 8).unwrap())
//!     .with(Dense::new(8, 1).unwrap());
//! let out = model.apply(&Tensor::ones(vec![2, 64])).unwrap();
//! assert_eq!(out.shape, vec![2, 1]);
//! ```

pub mod approx;
pub mod backend;
pub mod backprop;
pub mod error;
pub mod layers;
pub mod modelio;
pub mod ops;
pub mod optim;
pub mod params;
pub mod tensors;

pub use error::{LayerError, Result};

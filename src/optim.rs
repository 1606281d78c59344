//! Gradient-descent training step.
//!
//! Layers never update themselves. [`Sgd`] plays the external training loop:
//! it reads a layer's parameters, applies `param -= lr * grad` through
//! [`backprop::sgd`], and writes the result back with
//! [`Layer::set_parameters`].
//!
//! # Example
//!
//! ```rust
//! use custom_layers::layers::{Activation, Dense, Layer};
//! use custom_layers::optim::Sgd;
//! use custom_layers::tensor;
//!
//! let mut layer = Dense::builder(1, 1).activation(Activation::Identity).build().unwrap();
//! let sgd = Sgd::new(0.1).unwrap();
//! let x = tensor!([[1.0], [2.0]]);
//! let y = tensor!([[3.0], [5.0]]);
//!
//! let first = sgd.train_step(&mut layer, &x, &y).unwrap();
//! let second = sgd.train_step(&mut layer, &x, &y).unwrap();
//! assert!(second < first);
//! ```

use crate::backprop;
use crate::error::{LayerError, Result};
use crate::layers::Layer;
use crate::params::ParamSet;
use crate::tensors::{Ten64, WithGrad};

/// Plain stochastic gradient descent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sgd {
    lr: f64,
}

impl Sgd {
    /// Creates an optimizer with learning rate `lr`.
    ///
    /// # Errors
    /// [`LayerError::InvalidConfig`] unless `lr` is finite and positive.
    pub fn new(lr: f64) -> Result<Self> {
        if !lr.is_finite() || lr <= 0.0 {
            return Err(LayerError::InvalidConfig(format!(
                "learning rate must be finite and positive, got {lr}"
            )));
        }
        Ok(Self { lr })
    }

    pub fn learning_rate(&self) -> f64 {
        self.lr
    }

    /// Applies one update to every parameter named in `grads`.
    ///
    /// # Errors
    /// - [`LayerError::UnknownParameter`] if `grads` names a parameter the layer lacks.
    /// - [`LayerError::ShapeMismatch`] if a gradient's shape differs from its parameter.
    /// - [`LayerError::NonFinite`] if a gradient holds a NaN or infinity.
    ///
    /// On error the layer is unchanged.
    pub fn step<L: Layer + ?Sized>(&self, layer: &mut L, grads: &ParamSet) -> Result<()> {
        if grads.is_empty() {
            log::warn!("sgd: empty gradient set for {} layer", layer.name());
            return Ok(());
        }

        let mut current = layer.parameters();
        let mut updated = ParamSet::new();
        for (name, grad) in grads.iter() {
            let value = current
                .remove(name)
                .ok_or_else(|| LayerError::UnknownParameter(name.to_string()))?;
            if !grad.is_finite() {
                return Err(LayerError::NonFinite(name.to_string()));
            }
            let mut w = WithGrad::new(value);
            w.grad.update(grad.clone())?;
            backprop::sgd(&mut w, self.lr)?;
            updated.insert(name, w.value);
        }
        layer.set_parameters(updated)
    }

    /// Runs forward, MSE loss, backward and [`Sgd::step`] on one batch.
    ///
    /// Returns the loss measured before the update.
    pub fn train_step<L: Layer + ?Sized>(
        &self,
        layer: &mut L,
        input: &Ten64,
        target: &Ten64,
    ) -> Result<f64> {
        let (loss, grads) = {
            let (pred, back) = layer.forward(input)?;
            let (loss, loss_back) = backprop::mse_loss(&pred, target)?;
            (loss, back(&loss_back(1.0))?)
        };
        log::trace!("sgd: {} loss {loss:.6}", layer.name());
        self.step(layer, &grads.params)?;
        Ok(loss)
    }
}

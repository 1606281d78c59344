//! Layer abstractions.
//!
//! Every transformation implements the single capability trait [`Layer`].
//! Parameter-free layers ([`Center`], [`ActivationLayer`]) only transform
//! their input; parameterized layers ([`Dense`]) additionally own a
//! [`ParamSet`]. [`Sequential`] is itself a [`Layer`], so compositions nest.
//!
//! # Example
//!
//! ```rust
//! use custom_layers::layers::{Center, Dense, Layer, Sequential};
//! use custom_layers::tensors::Tensor;
//!
//! let model = Sequential::new()
//!     .with(Center)
//!     .with(Dense::new(4, 2).unwrap());
//! let out = model.apply(&Tensor::ones(vec![3, 4])).unwrap();
//! assert_eq!(out.shape, vec![3, 2]);
//! ```

use crate::error::{LayerError, Result};
use crate::params::ParamSet;
use crate::tensors::Ten64;

mod activation;
pub use self::activation::{Activation, ActivationLayer};

mod center;
pub use self::center::Center;

mod dense;
pub use self::dense::{Dense, DenseBuilder, Init};

mod sequential;
pub use self::sequential::Sequential;

/// Gradients produced by a layer's backward closure.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradients {
    /// `dL/d(input)`, same shape as the forward input.
    pub input: Ten64,
    /// `dL/d(param)` for every parameter, keyed like [`Layer::parameters`].
    pub params: ParamSet,
}

/// Backward closure returned by [`Layer::forward`]: maps `dL/d(output)` to
/// [`Gradients`].
pub type Backward<'a> = Box<dyn Fn(&Ten64) -> Result<Gradients> + 'a>;

/// An abstraction over all layers.
///
/// `apply` and `forward` never mutate the layer; parameters change only
/// through [`Layer::set_parameters`], which training code calls.
pub trait Layer {
    /// Short, human-readable layer kind.
    fn name(&self) -> &'static str;

    /// Runs the layer on `input`.
    ///
    /// # Errors
    /// Shape errors when `input` is incompatible with the layer.
    fn apply(&self, input: &Ten64) -> Result<Ten64>;

    /// Runs the layer and returns the closure that differentiates it.
    ///
    /// # Errors
    /// Same as [`Layer::apply`].
    fn forward(&self, input: &Ten64) -> Result<(Ten64, Backward<'_>)>;

    /// Snapshot of the layer's parameters.
    fn parameters(&self) -> ParamSet {
        ParamSet::new()
    }

    /// Replaces some or all parameters.
    ///
    /// Implementations validate every entry before changing anything.
    ///
    /// # Errors
    /// - [`LayerError::UnknownParameter`] for a name the layer does not declare.
    /// - [`LayerError::ShapeMismatch`] if a replacement has a different shape.
    fn set_parameters(&mut self, params: ParamSet) -> Result<()> {
        match params.into_iter().next() {
            Some((name, _)) => Err(LayerError::UnknownParameter(name)),
            None => Ok(()),
        }
    }

    /// Total number of scalar parameters.
    fn num_parameters(&self) -> usize {
        self.parameters().num_elements()
    }
}

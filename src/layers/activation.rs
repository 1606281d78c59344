use crate::backprop::{self, BackUnary};
use crate::error::Result;
use crate::params::ParamSet;
use crate::tensors::Ten64;

use super::{Backward, Gradients, Layer};

/// An enumeration of activation functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Activation {
    /// Rectified linear unit, `max(0, x)`.
    #[default]
    Relu,
    /// Leaves values unchanged.
    Identity,
}

impl Activation {
    /// Applies the activation without recording a gradient.
    pub fn apply(self, x: Ten64) -> Ten64 {
        match self {
            Self::Relu => crate::ops::dispatch::relu(&x),
            Self::Identity => x,
        }
    }

    /// Applies the activation and returns its backward closure.
    pub fn forward(self, x: &Ten64) -> (Ten64, BackUnary) {
        match self {
            Self::Relu => backprop::relu(x),
            Self::Identity => {
                let back: BackUnary =
                    Box::new(|grad: &Ten64| -> Result<Ten64> { Ok(grad.clone()) });
                (x.clone(), back)
            }
        }
    }
}

/// A parameter-free layer that only applies an activation function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActivationLayer(pub Activation);

impl Layer for ActivationLayer {
    fn name(&self) -> &'static str {
        match self.0 {
            Activation::Relu => "relu",
            Activation::Identity => "identity",
        }
    }

    fn apply(&self, input: &Ten64) -> Result<Ten64> {
        Ok(self.0.apply(input.clone()))
    }

    fn forward(&self, input: &Ten64) -> Result<(Ten64, Backward<'_>)> {
        let (out, back) = self.0.forward(input);
        let back = move |grad: &Ten64| -> Result<Gradients> {
            Ok(Gradients {
                input: back(grad)?,
                params: ParamSet::new(),
            })
        };
        Ok((out, Box::new(back)))
    }
}

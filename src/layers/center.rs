use crate::backprop;
use crate::error::Result;
use crate::ops::dispatch;
use crate::params::ParamSet;
use crate::tensors::Ten64;

use super::{Backward, Gradients, Layer};

/// Subtracts the mean of all input elements from every element.
///
/// Output has the input's shape and a mean of zero (up to rounding). The
/// layer has no parameters.
///
/// ```rust
/// use custom_layers::layers::{Center, Layer};
/// use custom_layers::tensor;
///
/// let out = Center.apply(&tensor!([1.0, 2.0, 3.0, 4.0, 5.0])).unwrap();
/// assert_eq!(out.data, vec![-2.0, -1.0, 0.0, 1.0, 2.0]);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Center;

impl Layer for Center {
    fn name(&self) -> &'static str {
        "center"
    }

    fn apply(&self, input: &Ten64) -> Result<Ten64> {
        log::trace!("center: input {:?}", input.shape);
        dispatch::center(input)
    }

    fn forward(&self, input: &Ten64) -> Result<(Ten64, Backward<'_>)> {
        let (out, back) = backprop::center(input)?;
        let back = move |grad: &Ten64| -> Result<Gradients> {
            Ok(Gradients {
                input: back(grad)?,
                params: ParamSet::new(),
            })
        };
        Ok((out, Box::new(back)))
    }
}

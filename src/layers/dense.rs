use crate::backprop;
use crate::error::{LayerError, Result};
use crate::ops::{dispatch, expect_rank, expect_shape};
use crate::params::ParamSet;
use crate::tensors::{Ten64, Tensor};

use super::{Activation, Backward, Gradients, Layer};

const WEIGHT: &str = "weight";
const BIAS: &str = "bias";

/// How a [`Dense`] layer fills its parameters at construction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Init {
    /// Every weight and bias is `1.0`.
    #[default]
    Ones,
    /// Every weight and bias is `0.0`.
    Zeros,
    /// Every weight and bias is the given value.
    Constant(f64),
    /// `sin(i * 1e-2)` over the flat index: deterministic and asymmetric.
    Sinusoidal,
}

impl Init {
    fn tensor(self, shape: Vec<usize>) -> Ten64 {
        match self {
            Self::Ones => Tensor::ones(shape),
            Self::Zeros => Tensor::zeros(shape),
            Self::Constant(c) => Tensor::full(shape, c),
            Self::Sinusoidal => {
                let len = shape.iter().product::<usize>();
                let data = (0..len).map(|i| (i as f64 * 1e-2).sin()).collect();
                Tensor::new(shape, data)
            }
        }
    }
}

/// Builder for [`Dense`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DenseBuilder {
    in_features: usize,
    out_features: usize,
    activation: Activation,
    init: Init,
}

impl DenseBuilder {
    /// Sets the activation applied after the affine map.
    #[must_use]
    pub fn activation(mut self, activation: Activation) -> Self {
        self.activation = activation;
        self
    }

    /// Sets the parameter initialization.
    #[must_use]
    pub fn init(mut self, init: Init) -> Self {
        self.init = init;
        self
    }

    /// Expands the layer.
    ///
    /// # Errors
    /// [`LayerError::InvalidDimension`] if either feature count is zero.
    pub fn build(self) -> Result<Dense> {
        if self.in_features == 0 {
            return Err(LayerError::InvalidDimension {
                what: "in_features",
            });
        }
        if self.out_features == 0 {
            return Err(LayerError::InvalidDimension {
                what: "out_features",
            });
        }
        log::debug!(
            "dense: {} -> {} ({:?}, init {:?})",
            self.in_features,
            self.out_features,
            self.activation,
            self.init
        );
        Ok(Dense {
            weight: self.init.tensor(vec![self.in_features, self.out_features]),
            bias: self.init.tensor(vec![self.out_features]),
            activation: self.activation,
        })
    }
}

/// Fully connected layer: `output = activation(input · weight + bias)`.
///
/// - `weight` has shape `(in_features, out_features)`
/// - `bias` has shape `(out_features)`
/// - inputs have shape `(batch, in_features)`
///
/// ```rust
/// use custom_layers::layers::{Dense, Layer};
/// use custom_layers::tensors::Tensor;
///
/// let dense = Dense::new(5, 3).unwrap();
/// let out = dense.apply(&Tensor::ones(vec![2, 5])).unwrap();
/// assert_eq!(out.data, vec![6.0; 6]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Dense {
    weight: Ten64,
    bias: Ten64,
    activation: Activation,
}

impl Dense {
    /// A ReLU dense layer with all-ones parameters.
    ///
    /// # Errors
    /// [`LayerError::InvalidDimension`] if either feature count is zero.
    pub fn new(in_features: usize, out_features: usize) -> Result<Self> {
        Self::builder(in_features, out_features).build()
    }

    /// Starts configuring a layer; defaults to ReLU and [`Init::Ones`].
    pub fn builder(in_features: usize, out_features: usize) -> DenseBuilder {
        DenseBuilder {
            in_features,
            out_features,
            activation: Activation::default(),
            init: Init::default(),
        }
    }

    /// Builds a layer around existing parameters.
    ///
    /// # Errors
    /// - [`LayerError::RankMismatch`] unless `weight` is 2-D.
    /// - [`LayerError::ShapeMismatch`] unless `bias` has shape `(out_features)`.
    /// - [`LayerError::InvalidDimension`] for zero-sized weights.
    pub fn from_parameters(weight: Ten64, bias: Ten64, activation: Activation) -> Result<Self> {
        expect_rank("dense", &weight, 2)?;
        if weight.shape[0] == 0 {
            return Err(LayerError::InvalidDimension {
                what: "in_features",
            });
        }
        if weight.shape[1] == 0 {
            return Err(LayerError::InvalidDimension {
                what: "out_features",
            });
        }
        expect_shape("dense", &bias, &weight.shape[1..])?;
        Ok(Self {
            weight,
            bias,
            activation,
        })
    }

    pub fn in_features(&self) -> usize {
        self.weight.shape[0]
    }

    pub fn out_features(&self) -> usize {
        self.weight.shape[1]
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn weight(&self) -> &Ten64 {
        &self.weight
    }

    pub fn bias(&self) -> &Ten64 {
        &self.bias
    }

    fn check_input(&self, input: &Ten64) -> Result<()> {
        expect_rank("dense", input, 2)?;
        if input.shape[1] != self.in_features() {
            return Err(LayerError::ShapeMismatch {
                op: "dense",
                expected: vec![input.shape[0], self.in_features()],
                found: input.shape.clone(),
            });
        }
        Ok(())
    }
}

impl Layer for Dense {
    fn name(&self) -> &'static str {
        "dense"
    }

    fn apply(&self, input: &Ten64) -> Result<Ten64> {
        self.check_input(input)?;
        log::trace!("dense: input {:?}", input.shape);
        let z = dispatch::matmul(input, &self.weight)?;
        let z = dispatch::add_bias(&z, &self.bias)?;
        Ok(self.activation.apply(z))
    }

    fn forward(&self, input: &Ten64) -> Result<(Ten64, Backward<'_>)> {
        self.check_input(input)?;
        let (xw, back_matmul) = backprop::matmul(input, &self.weight)?;
        let (z, back_bias) = backprop::add_bias(&xw, &self.bias)?;
        let (out, back_act) = self.activation.forward(&z);

        let back = move |grad: &Ten64| -> Result<Gradients> {
            let dz = back_act(grad)?;
            let (dxw, db) = back_bias(&dz)?;
            let (dx, dw) = back_matmul(&dxw)?;

            let mut params = ParamSet::new();
            params.insert(WEIGHT, dw);
            params.insert(BIAS, db);
            Ok(Gradients { input: dx, params })
        };

        Ok((out, Box::new(back)))
    }

    fn parameters(&self) -> ParamSet {
        let mut params = ParamSet::new();
        params.insert(WEIGHT, self.weight.clone());
        params.insert(BIAS, self.bias.clone());
        params
    }

    fn set_parameters(&mut self, params: ParamSet) -> Result<()> {
        let mut weight = None;
        let mut bias = None;
        for (name, tensor) in params {
            match name.as_str() {
                WEIGHT => {
                    expect_shape("set_parameters", &tensor, &self.weight.shape)?;
                    weight = Some(tensor);
                }
                BIAS => {
                    expect_shape("set_parameters", &tensor, &self.bias.shape)?;
                    bias = Some(tensor);
                }
                _ => return Err(LayerError::UnknownParameter(name)),
            }
        }

        log::debug!(
            "dense: replacing{}{}",
            if weight.is_some() { " weight" } else { "" },
            if bias.is_some() { " bias" } else { "" }
        );
        if let Some(weight) = weight {
            self.weight = weight;
        }
        if let Some(bias) = bias {
            self.bias = bias;
        }
        Ok(())
    }
}

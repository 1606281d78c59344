//! Differentiable operations and autograd utilities.
//!
//! # Backpropagation and Optimization Primitives
//!
//! The operations layers are assembled from, each paired with its gradient.
//!
//! **Key Features:**
//! - **Matrix Multiplication:** `m×k · k×n` with gradients for both operands.
//! - **Bias Add:** row-broadcast vector add with its column-sum gradient.
//! - **Elementwise Activation (ReLU):** zero-out negatives and mask gradients.
//! - **Centering:** subtract the global mean; the gradient is centered too.
//! - **Loss Computation (MSE):** mean squared error with gradient generator.
//! - **Optimizer (SGD):** in-place parameter update with gradient reset.
//!
//! ## Autograd Pattern
//!
//! Each operation follows a simple pattern:
//! 1. **Inputs** are borrowed tensors.
//! 2. **Forward Pass** computes an output tensor.
//! 3. **Backward Pass** returns a closure owning the minimal cloned data needed
//!    to map `dL/d(out)` to the input gradients.
//!
//! ## Usage Guidelines
//!
//! - Operations return [`LayerError`](crate::error::LayerError) on shape
//!   mismatches, both forward and backward.
//! - The backward closures implement `Fn`, allowing multiple invocations.

use crate::error::Result;
use crate::ops::{cpu, dispatch, expect_shape};
use crate::tensors::{Ten64, Tensor, WithGrad};

/// Backward closure of a single-input op.
pub type BackUnary = Box<dyn Fn(&Ten64) -> Result<Ten64>>;

/// Backward closure of a two-input op, returning both input gradients.
pub type BackBinary = Box<dyn Fn(&Ten64) -> Result<(Ten64, Ten64)>>;

/// Backward closure of a scalar loss.
pub type BackScalar = Box<dyn Fn(f64) -> Ten64>;

/// Performs matrix multiplication of two 2D tensors: `a` (m×k) · `b` (k×n).
///
/// # Returns
/// - `out`: Product tensor (m×n).
/// - `back`: Closure that given `dL/d(out)` returns `(dL/d(a), dL/d(b))`.
///
/// # Example
/// ```rust
/// use custom_layers::{backprop::matmul, tensor};
///
/// let a = tensor!([[1.0, 2.0], [3.0, 4.0]]);
/// let b = tensor!([[5.0, 6.0], [7.0, 8.0]]);
/// let (out, back) = matmul(&a, &b).unwrap();
/// assert_eq!(out.data, vec![19.0, 22.0, 43.0, 50.0]);
///
/// let (grad_a, grad_b) = back(&tensor!([[1.0, 1.0], [1.0, 1.0]])).unwrap();
/// assert_eq!(grad_a.shape, vec![2, 2]);
/// assert_eq!(grad_b.data, vec![4.0, 4.0, 6.0, 6.0]);
/// ```
pub fn matmul(a: &Ten64, b: &Ten64) -> Result<(Ten64, BackBinary)> {
    let out = dispatch::matmul(a, b)?;
    let out_shape = out.shape.clone();
    let a_t = dispatch::transpose(a)?;
    let b_t = dispatch::transpose(b)?;

    let back = move |grad: &Ten64| -> Result<(Ten64, Ten64)> {
        expect_shape("matmul_backward", grad, &out_shape)?;
        // dA = G · Bᵀ, dB = Aᵀ · G
        Ok((dispatch::matmul(grad, &b_t)?, dispatch::matmul(&a_t, grad)?))
    };

    Ok((out, Box::new(back)))
}

/// Adds the `(n)` bias `b` to every row of `x` (m×n).
///
/// # Returns
/// - `out`: `x + b` broadcast over rows.
/// - `back`: Closure returning `(dL/dx, dL/db)`; the bias gradient is the
///   column sum of the upstream gradient.
pub fn add_bias(x: &Ten64, b: &Ten64) -> Result<(Ten64, BackBinary)> {
    let out = dispatch::add_bias(x, b)?;
    let out_shape = out.shape.clone();

    let back = move |grad: &Ten64| -> Result<(Ten64, Ten64)> {
        expect_shape("add_bias_backward", grad, &out_shape)?;
        Ok((grad.clone(), dispatch::bias_grad(grad)?))
    };

    Ok((out, Box::new(back)))
}

/// Applies the ReLU activation (Rectified Linear Unit): `max(0, x)` elementwise.
///
/// # Returns
/// - `out`: Tensor with negatives zeroed.
/// - `back`: Closure mapping `dL/d(out)` to `dL/d(input)` by passing gradients only where input > 0.
///
/// # Example
/// ```rust
/// use custom_layers::{backprop::relu, tensors::Tensor};
///
/// let input = Tensor::new(vec![3], vec![-1.0, 0.0, 2.0]);
/// let (out, back) = relu(&input);
/// assert_eq!(out.data, vec![0.0, 0.0, 2.0]);
/// let grad_in = back(&Tensor::ones(vec![3])).unwrap();
/// assert_eq!(grad_in.data, vec![0.0, 0.0, 1.0]);
/// ```
pub fn relu(input: &Ten64) -> (Ten64, BackUnary) {
    let out = dispatch::relu(input);
    let saved = input.clone();
    let back = move |grad: &Ten64| dispatch::relu_backward(&saved, grad);
    (out, Box::new(back))
}

/// Subtracts the mean of all elements from every element.
///
/// # Returns
/// - `out`: Same shape as the input, with mean zero.
/// - `back`: `dL/dx = g - mean(g)`; centering is linear and its Jacobian is
///   symmetric, so the gradient is the centered upstream gradient.
///
/// # Errors
/// [`LayerError::EmptyTensor`](crate::error::LayerError::EmptyTensor) for an input without elements.
pub fn center(input: &Ten64) -> Result<(Ten64, BackUnary)> {
    let out = dispatch::center(input)?;
    let shape = input.shape.clone();
    let back = move |grad: &Ten64| -> Result<Ten64> {
        expect_shape("center_backward", grad, &shape)?;
        dispatch::center(grad)
    };
    Ok((out, Box::new(back)))
}

/// Computes Mean Squared Error (MSE) loss: `mean((prediction - target)^2)`.
///
/// # Returns
/// - Scalar loss value
/// - Closure that maps `dL/dloss` into gradient tensor shape
///
/// # Example
/// ```rust
/// use custom_layers::{backprop::mse_loss, tensors::Tensor};
///
/// let pred = Tensor::new(vec![2], vec![1.0, 2.0]);
/// let target = Tensor::new(vec![2], vec![1.5, 2.5]);
/// let (loss, back) = mse_loss(&pred, &target).unwrap();
/// assert_eq!(loss, 0.25);
/// assert_eq!(back(1.0).data, vec![-0.5, -0.5]);
/// ```
pub fn mse_loss(prediction: &Ten64, target: &Ten64) -> Result<(f64, BackScalar)> {
    let loss = dispatch::mse(prediction, target)?;
    let shape = prediction.shape.clone();
    let pred_data = prediction.data.clone();
    let target_data = target.data.clone();

    let back = move |grad_output: f64| {
        Tensor::new(
            shape.clone(),
            cpu::mse_backward(&pred_data, &target_data, grad_output),
        )
    };

    Ok((loss, Box::new(back)))
}

/// Performs an in-place Stochastic Gradient Descent (SGD) update.
///
/// Applies: `param = param - learning_rate * gradient` and then zeros gradient.
///
/// # Errors
/// [`LayerError::ShapeMismatch`](crate::error::LayerError::ShapeMismatch) if
/// the gradient shape differs from the value shape; nothing is updated.
pub fn sgd(w: &mut WithGrad<Ten64>, lr: f64) -> Result<()> {
    expect_shape("sgd", &w.grad, &w.value.shape)?;
    cpu::sgd(&mut w.value.data, &w.grad.data, lr);
    w.zero_grad();
    Ok(())
}

//! Operation Dispatch Layer
//!
//! Shape-checked tensor entry points. Each function validates its operands
//! once, then runs the kernel of the backend selected by
//! [`get_backend`], falling back to [`super::cpu`] when the backend has no
//! specialised version.
//!
//! # Example
//! ```rust
//! use custom_layers::ops::dispatch::matmul;
//! use custom_layers::tensor;
//!
//! let a = tensor!([[1.0, 2.0], [3.0, 4.0]]);
//! let b = tensor!([[1.0], [1.0]]);
//! let c = matmul(&a, &b).unwrap();
//! assert_eq!(c.data, vec![3.0, 7.0]);
//! ```

use super::{cpu, expect_rank, expect_shape, par};
use crate::backend::{get_backend, Backend};
use crate::error::{LayerError, Result};
use crate::tensors::{Ten64, Tensor};

/// Matrix product of `a: m×k` and `b: k×n`.
///
/// # Errors
/// - [`LayerError::RankMismatch`] unless both operands are 2-D.
/// - [`LayerError::ShapeMismatch`] if the inner dimensions differ.
pub fn matmul(a: &Ten64, b: &Ten64) -> Result<Ten64> {
    expect_rank("matmul", a, 2)?;
    expect_rank("matmul", b, 2)?;
    let (m, k) = (a.shape[0], a.shape[1]);
    let n = b.shape[1];
    if b.shape[0] != k {
        return Err(LayerError::ShapeMismatch {
            op: "matmul",
            expected: vec![k, n],
            found: b.shape.clone(),
        });
    }

    let data = match get_backend() {
        Backend::Rayon => par::matmul(&a.data, &b.data, m, k, n),
        Backend::Cpu => cpu::matmul(&a.data, &b.data, m, k, n),
    };
    Ok(Tensor::new(vec![m, n], data))
}

/// Transpose of a 2-D tensor.
pub fn transpose(a: &Ten64) -> Result<Ten64> {
    expect_rank("transpose", a, 2)?;
    let (m, n) = (a.shape[0], a.shape[1]);
    Ok(Tensor::new(vec![n, m], cpu::transpose(&a.data, m, n)))
}

/// Element-wise rectified-linear activation.
pub fn relu(x: &Ten64) -> Ten64 {
    let data = match get_backend() {
        Backend::Rayon => par::relu(&x.data),
        Backend::Cpu => cpu::relu(&x.data),
    };
    Tensor::new(x.shape.clone(), data)
}

/// Gradient of [`relu`] at `x` for upstream gradient `grad`.
pub fn relu_backward(x: &Ten64, grad: &Ten64) -> Result<Ten64> {
    expect_shape("relu_backward", grad, &x.shape)?;
    let data = match get_backend() {
        Backend::Rayon => par::relu_backward(&x.data, &grad.data),
        Backend::Cpu => cpu::relu_backward(&x.data, &grad.data),
    };
    Ok(Tensor::new(x.shape.clone(), data))
}

/// `x - mean(x)`, the mean taken over every element.
///
/// # Errors
/// [`LayerError::EmptyTensor`] if `x` has no elements.
pub fn center(x: &Ten64) -> Result<Ten64> {
    if x.data.is_empty() {
        return Err(LayerError::EmptyTensor { op: "center" });
    }
    let data = match get_backend() {
        Backend::Rayon => par::sub_scalar(&x.data, par::mean(&x.data)),
        Backend::Cpu => cpu::sub_scalar(&x.data, cpu::mean(&x.data)),
    };
    Ok(Tensor::new(x.shape.clone(), data))
}

/// Adds the `(n)` vector `b` to every row of the `(m, n)` matrix `x`.
pub fn add_bias(x: &Ten64, b: &Ten64) -> Result<Ten64> {
    expect_rank("add_bias", x, 2)?;
    let n = x.shape[1];
    expect_shape("add_bias", b, &[n])?;
    Ok(Tensor::new(x.shape.clone(), cpu::add_rows(&x.data, &b.data, n)))
}

/// Sums an `(m, n)` gradient down its rows into an `(n)` bias gradient.
pub fn bias_grad(grad: &Ten64) -> Result<Ten64> {
    expect_rank("bias_grad", grad, 2)?;
    let n = grad.shape[1];
    Ok(Tensor::new(vec![n], cpu::col_sums(&grad.data, n)))
}

/// Mean squared error between two tensors of the same shape.
pub fn mse(pred: &Ten64, target: &Ten64) -> Result<f64> {
    expect_shape("mse_loss", target, &pred.shape)?;
    if pred.data.is_empty() {
        return Err(LayerError::EmptyTensor { op: "mse_loss" });
    }
    Ok(cpu::mse(&pred.data, &target.data))
}

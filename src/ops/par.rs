//! Parallel CPU kernels
//!
//! Rayon versions of the kernels whose cost grows with batch size:
//! matrix multiplication, ReLU and the full reductions behind centering.
//! Selected by [`crate::backend::Backend::Rayon`].
//!
//! Results match [`super::cpu`] exactly for element-wise kernels and up to
//! summation order for reductions.

use rayon::prelude::*;

/// `C = A × B` for `A: m×k`, `B: k×n`, one rayon task per output row.
pub fn matmul(a: &[f64], b: &[f64], m: usize, k: usize, n: usize) -> Vec<f64> {
    let mut out = vec![0.0; m * n];
    if n == 0 {
        return out;
    }
    out.par_chunks_mut(n)
        .enumerate()
        .for_each(|(i, row)| super::cpu::matmul_row(a, b, i, k, n, row));
    out
}

/// Element-wise `max(0, x)`.
pub fn relu(x: &[f64]) -> Vec<f64> {
    x.par_iter()
        .map(|&v| if v > 0.0 { v } else { 0.0 })
        .collect()
}

/// Passes `grad` through where `x > 0`, zero elsewhere.
pub fn relu_backward(x: &[f64], grad: &[f64]) -> Vec<f64> {
    x.par_iter()
        .zip(grad.par_iter())
        .map(|(&v, &g)| if v > 0.0 { g } else { 0.0 })
        .collect()
}

/// Mean of all elements as `sum(x / n)`.
pub fn mean(x: &[f64]) -> f64 {
    let n = x.len() as f64;
    x.par_iter().map(|&v| v / n).sum()
}

/// `x - s` element-wise.
pub fn sub_scalar(x: &[f64], s: f64) -> Vec<f64> {
    x.par_iter().map(|&v| v - s).collect()
}

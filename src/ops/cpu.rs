//! Serial CPU kernels
//!
//! # CPU Backend
//!
//! Plain loops over row-major slices. These are the default kernels and the
//! fallback for every operation [`super::par`] does not cover.
//!
//! Kernels trust their callers: shapes are validated once in
//! [`super::dispatch`] and the sizes passed here always agree with the
//! slice lengths.

/// `C = A × B` for `A: m×k`, `B: k×n`, returning `C: m×n`.
pub fn matmul(a: &[f64], b: &[f64], m: usize, k: usize, n: usize) -> Vec<f64> {
    let mut out = vec![0.0; m * n];
    for (i, row) in out.chunks_mut(n.max(1)).enumerate().take(m) {
        matmul_row(a, b, i, k, n, row);
    }
    out
}

/// Computes row `i` of `A × B` into `row`.
#[inline]
pub(crate) fn matmul_row(a: &[f64], b: &[f64], i: usize, k: usize, n: usize, row: &mut [f64]) {
    let a_row = &a[i * k..(i + 1) * k];
    for (l, &a_il) in a_row.iter().enumerate() {
        // i-l-j order keeps both `b` and `row` accesses sequential
        let b_row = &b[l * n..(l + 1) * n];
        for (out, &b_lj) in row.iter_mut().zip(b_row) {
            *out += a_il * b_lj;
        }
    }
}

/// Transposes an `m×n` matrix.
pub fn transpose(a: &[f64], m: usize, n: usize) -> Vec<f64> {
    let mut out = vec![0.0; m * n];
    for i in 0..m {
        for j in 0..n {
            out[j * m + i] = a[i * n + j];
        }
    }
    out
}

/// Element-wise `max(0, x)`.
pub fn relu(x: &[f64]) -> Vec<f64> {
    x.iter().map(|&v| if v > 0.0 { v } else { 0.0 }).collect()
}

/// Passes `grad` through where `x > 0`, zero elsewhere.
pub fn relu_backward(x: &[f64], grad: &[f64]) -> Vec<f64> {
    x.iter()
        .zip(grad)
        .map(|(&v, &g)| if v > 0.0 { g } else { 0.0 })
        .collect()
}

/// Mean of all elements, accumulated as `sum(x / n)` so finite inputs
/// cannot overflow.
pub fn mean(x: &[f64]) -> f64 {
    let n = x.len() as f64;
    x.iter().map(|&v| v / n).sum()
}

/// `x - s` element-wise.
pub fn sub_scalar(x: &[f64], s: f64) -> Vec<f64> {
    x.iter().map(|&v| v - s).collect()
}

/// Adds the length-`n` vector `b` to every row of the `?×n` matrix `x`.
pub fn add_rows(x: &[f64], b: &[f64], n: usize) -> Vec<f64> {
    let mut out = x.to_vec();
    for row in out.chunks_mut(n.max(1)) {
        for (v, &bias) in row.iter_mut().zip(b) {
            *v += bias;
        }
    }
    out
}

/// Column sums of the `?×n` matrix `x` (the gradient of a row-broadcast add).
pub fn col_sums(x: &[f64], n: usize) -> Vec<f64> {
    let mut acc = vec![0.0; n];
    for row in x.chunks(n.max(1)) {
        for (a, &v) in acc.iter_mut().zip(row) {
            *a += v;
        }
    }
    acc
}

/// Mean of squared differences.
pub fn mse(pred: &[f64], target: &[f64]) -> f64 {
    let n = pred.len() as f64;
    pred.iter()
        .zip(target)
        .map(|(&y, &t)| (y - t).powi(2))
        .sum::<f64>()
        / n
}

/// `dL/dpred` of [`mse`] scaled by the upstream gradient.
pub fn mse_backward(pred: &[f64], target: &[f64], grad_output: f64) -> Vec<f64> {
    let n = pred.len() as f64;
    pred.iter()
        .zip(target)
        .map(|(&y, &t)| 2.0 * (y - t) * grad_output / n)
        .collect()
}

/// In-place `param -= lr * grad`.
pub fn sgd(param: &mut [f64], grad: &[f64], lr: f64) {
    for (p, g) in param.iter_mut().zip(grad) {
        *p -= lr * *g;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matmul_small() {
        // [[1,2],[3,4]] x [[5,6],[7,8]]
        let c = matmul(&[1.0, 2.0, 3.0, 4.0], &[5.0, 6.0, 7.0, 8.0], 2, 2, 2);
        assert_eq!(c, vec![19.0, 22.0, 43.0, 50.0]);
    }

    #[test]
    fn transpose_rectangular() {
        let t = transpose(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3);
        assert_eq!(t, vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    }

    #[test]
    fn bias_add_and_grad() {
        let x = [0.0, 0.0, 1.0, 1.0];
        assert_eq!(add_rows(&x, &[1.0, 2.0], 2), vec![1.0, 2.0, 2.0, 3.0]);
        assert_eq!(col_sums(&[1.0, 2.0, 3.0, 4.0], 2), vec![4.0, 6.0]);
    }

    #[test]
    fn mean_does_not_overflow() {
        assert_eq!(mean(&[1.0, 2.0, 3.0, 6.0]), 3.0);
        let m = mean(&[f64::MAX, f64::MAX]);
        assert!(m.is_finite());
        assert_eq!(m, f64::MAX);
    }

    #[test]
    fn sgd_steps_against_grad() {
        let mut p = [1.0, 2.0];
        sgd(&mut p, &[0.1, 0.2], 0.5);
        assert_eq!(p, [0.95, 1.9]);
    }
}

//! # Operation Dispatch Layer
//!
//! This module defines the tensor kernels the layers are built from and
//! dispatches them across execution backends.
//!
//! ## Submodules
//!
//! - [`cpu`] — Serial slice kernels (default backend and fallback)
//! - [`par`] — Rayon data-parallel versions of the heavy kernels
//! - [`dispatch`] — Shape-checked tensor entry points that pick a backend per call
//!
//! ## Backend Selection
//!
//! Dispatching is driven by [`crate::backend::get_backend`]. Kernels without
//! a parallel version always run on [`cpu`].
//!
//! ## Extending the Backend
//!
//! To add a new operation:
//!
//! 1. Implement the slice kernel in `cpu` (and `par` if it is worth it)
//! 2. Add a checked tensor entry point to `dispatch`
//! 3. Wrap it with a backward closure in [`crate::backprop`]

pub mod cpu;
pub mod dispatch;
pub mod par;

use crate::error::{LayerError, Result};
use crate::tensors::Ten64;

/// Fails unless `t` has exactly `rank` dimensions.
pub(crate) fn expect_rank(op: &'static str, t: &Ten64, rank: usize) -> Result<()> {
    if t.rank() != rank {
        return Err(LayerError::RankMismatch {
            op,
            expected: rank,
            found: t.shape.clone(),
        });
    }
    Ok(())
}

/// Fails unless `t` has exactly `shape`.
pub(crate) fn expect_shape(op: &'static str, t: &Ten64, shape: &[usize]) -> Result<()> {
    if t.shape != shape {
        return Err(LayerError::ShapeMismatch {
            op,
            expected: shape.to_vec(),
            found: t.shape.clone(),
        });
    }
    Ok(())
}

//! Error type shared by tensors, ops, layers and model I/O.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, LayerError>;

/// Everything that can go wrong while building, applying, training or
/// persisting layers.
///
/// Shape problems are the only failure mode of a forward pass; the
/// remaining variants belong to construction, parameter updates and I/O.
#[derive(Debug, Error)]
pub enum LayerError {
    /// Two shapes that must agree do not.
    #[error("{op}: shape mismatch, expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        op: &'static str,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    /// A tensor has the wrong number of dimensions.
    #[error("{op}: expected a rank-{expected} tensor, found shape {found:?}")]
    RankMismatch {
        op: &'static str,
        expected: usize,
        found: Vec<usize>,
    },

    /// Flat data does not fill the declared shape.
    #[error("shape {shape:?} is incompatible with {len} data elements")]
    DataLength { shape: Vec<usize>, len: usize },

    /// A reduction was requested over zero elements.
    #[error("{op}: tensor has no elements")]
    EmptyTensor { op: &'static str },

    /// A layer was configured with a zero-sized dimension.
    #[error("invalid dimension: {what} must be non-zero")]
    InvalidDimension { what: &'static str },

    /// A parameter name that the layer does not declare.
    #[error("unknown parameter `{0}`")]
    UnknownParameter(String),

    /// A gradient holds NaN or an infinity.
    #[error("non-finite gradient for `{0}`")]
    NonFinite(String),

    /// A configuration value outside its accepted range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The byte stream is not a parameter file.
    #[error("invalid parameter file: {0}")]
    InvalidFormat(String),

    /// The byte stream is a parameter file, but one of its records is damaged.
    #[error("corrupted parameter record: {0}")]
    Corrupted(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl LayerError {
    /// Returns `true` for the shape-related variants, the only errors a
    /// forward pass can produce.
    pub fn is_shape_error(&self) -> bool {
        matches!(
            self,
            Self::ShapeMismatch { .. }
                | Self::RankMismatch { .. }
                | Self::DataLength { .. }
                | Self::EmptyTensor { .. }
        )
    }
}

//! Saving/loading of layer parameters.
//!
//! # `.lpar` Parameter Format
//!
//! A `.lpar` file stores a [`ParamSet`]: named tensors, in name order.
//!
//! ```text
//! ┌──────────────┬──────────────────────────────────────────┐
//! │ Header       │ Entry (repeated `count` times)           │
//! ├──────────────┼──────────────────────────────────────────┤
//! │ "lpar"[4]    │ u32: name length   │ [u8] UTF-8 name     │
//! │ u32: count   │ u64: ndim          │ [u64; ndim] shape   │
//! │              │ [f64; prod(shape)] data                  │
//! └──────────────┴──────────────────────────────────────────┘
//! ```
//!
//! All integers and floats are little-endian. Each record is validated
//! before it becomes a tensor.
//!
//! # Example
//!
//! ```rust
//! use custom_layers::layers::{Dense, Layer};
//! use custom_layers::modelio::{read_params, write_params};
//!
//! let dense = Dense::new(3, 2).unwrap();
//! let mut buf = Vec::new();
//! write_params(&mut buf, &dense.parameters()).unwrap();
//!
//! let mut restored = Dense::new(3, 2).unwrap();
//! restored.set_parameters(read_params(buf.as_slice()).unwrap()).unwrap();
//! assert_eq!(restored, dense);
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use briny::prelude::{TrustedData, Validate, ValidationError};

use crate::error::{LayerError, Result};
use crate::params::ParamSet;
use crate::tensors::Tensor;

const LPAR_MAGIC: &[u8; 4] = b"lpar";

/// Longest accepted parameter name, in bytes.
const MAX_NAME_LEN: usize = 4096;

/// Internal representation of a packed record.
struct PackedTensor {
    name: String,
    shape: Vec<u64>,
    data: Vec<f64>,
}

impl Validate for PackedTensor {
    fn validate(&self) -> core::result::Result<(), ValidationError> {
        let expected = self
            .shape
            .iter()
            .try_fold(1u64, |acc, &d| acc.checked_mul(d))
            .ok_or(ValidationError)?;
        if self.name.is_empty() || self.data.len() as u64 != expected {
            return Err(ValidationError);
        }
        Ok(())
    }
}

/// Writes `params` to any writer.
///
/// # Errors
/// - [`LayerError::InvalidConfig`] if a name or count does not fit the format.
/// - [`LayerError::Io`] if writing fails.
pub fn write_params<W: Write>(mut writer: W, params: &ParamSet) -> Result<()> {
    let count = u32::try_from(params.len())
        .map_err(|_| LayerError::InvalidConfig("too many parameters for .lpar".into()))?;

    for (name, tensor) in params.iter() {
        if tensor.data.len() != tensor.shape.iter().product::<usize>() {
            return Err(LayerError::InvalidConfig(format!(
                "parameter `{name}` has {} elements for shape {:?}",
                tensor.data.len(),
                tensor.shape
            )));
        }
    }

    writer.write_all(LPAR_MAGIC)?;
    writer.write_all(&count.to_le_bytes())?;

    for (name, tensor) in params.iter() {
        if name.is_empty() || name.len() > MAX_NAME_LEN {
            return Err(LayerError::InvalidConfig(format!(
                "parameter name `{name}` must be 1..={MAX_NAME_LEN} bytes"
            )));
        }
        writer.write_all(&(name.len() as u32).to_le_bytes())?;
        writer.write_all(name.as_bytes())?;

        writer.write_all(&(tensor.shape.len() as u64).to_le_bytes())?;
        for &dim in &tensor.shape {
            writer.write_all(&(dim as u64).to_le_bytes())?;
        }
        for &val in &tensor.data {
            writer.write_all(&val.to_le_bytes())?;
        }
    }

    writer.flush()?;
    Ok(())
}

/// Reads a [`ParamSet`] from any reader.
///
/// # Errors
/// - [`LayerError::InvalidFormat`] if the stream does not start with `lpar`.
/// - [`LayerError::Corrupted`] if a record is malformed.
/// - [`LayerError::Io`] if reading fails, including truncated input.
pub fn read_params<R: Read>(mut reader: R) -> Result<ParamSet> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if &magic != LPAR_MAGIC {
        return Err(LayerError::InvalidFormat("bad magic header".into()));
    }

    let count = read_u32(&mut reader)? as usize;
    let mut params = ParamSet::new();

    for _ in 0..count {
        let name_len = read_u32(&mut reader)? as usize;
        if name_len == 0 || name_len > MAX_NAME_LEN {
            return Err(LayerError::Corrupted(format!(
                "name length {name_len} out of range"
            )));
        }
        let mut name = vec![0u8; name_len];
        reader.read_exact(&mut name)?;
        let name = String::from_utf8(name)
            .map_err(|_| LayerError::Corrupted("parameter name is not UTF-8".into()))?;

        let ndim = read_u64(&mut reader)?;
        let mut shape = Vec::new();
        for _ in 0..ndim {
            shape.push(read_u64(&mut reader)?);
        }

        let size = shape
            .iter()
            .try_fold(1u64, |acc, &d| acc.checked_mul(d))
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| LayerError::Corrupted(format!("`{name}` has an oversized shape")))?;
        // grow as bytes arrive so a damaged header cannot force a huge allocation
        let mut data = Vec::with_capacity(size.min(1 << 16));
        for _ in 0..size {
            data.push(f64::from_le_bytes(read_array(&mut reader)?));
        }

        let packed = PackedTensor { name, shape, data };
        let trusted = TrustedData::new(packed)
            .map_err(|_| LayerError::Corrupted("record failed validation".into()))?;
        let inner = trusted.into_inner();
        let shape: Vec<usize> = inner.shape.iter().map(|&d| d as usize).collect();
        let tensor = Tensor::try_new(shape, inner.data)?;

        if params.insert(inner.name.clone(), tensor).is_some() {
            return Err(LayerError::Corrupted(format!(
                "duplicate parameter `{}`",
                inner.name
            )));
        }
    }

    Ok(params)
}

/// Saves `params` to a `.lpar` file at `path`.
///
/// # Errors
/// Same as [`write_params`], plus file creation failures.
pub fn save_params(path: impl AsRef<Path>, params: &ParamSet) -> Result<()> {
    let path = path.as_ref();
    write_params(BufWriter::new(File::create(path)?), params)?;
    log::info!(
        "saved {} parameters ({} values) to {}",
        params.len(),
        params.num_elements(),
        path.display()
    );
    Ok(())
}

/// Loads a `.lpar` file written by [`save_params`].
///
/// # Errors
/// Same as [`read_params`], plus file open failures.
pub fn load_params(path: impl AsRef<Path>) -> Result<ParamSet> {
    let path = path.as_ref();
    let params = read_params(BufReader::new(File::open(path)?))?;
    log::info!("loaded {} parameters from {}", params.len(), path.display());
    Ok(params)
}

fn read_array<R: Read, const N: usize>(reader: &mut R) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32> {
    Ok(u32::from_le_bytes(read_array(reader)?))
}

fn read_u64<R: Read>(reader: &mut R) -> Result<u64> {
    Ok(u64::from_le_bytes(read_array(reader)?))
}

//! Backend selection module.
//!
//! This module defines the available execution backends for tensor kernels
//! and provides functions to set and get the current backend.
//!
//! # Supported Backends
//!
//! - `Cpu` — Serial loops on the calling thread (default).
//! - `Rayon` — Data-parallel kernels on rayon's global thread pool.
//!
//! The backend is stored globally using an `AtomicU8`, enabling fast
//! switching at runtime. Both backends produce the same results up to
//! floating-point summation order.

use core::convert::TryFrom;
use core::sync::atomic::{AtomicU8, Ordering};

/// Enumeration of supported execution backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Backend {
    /// Serial CPU backend (default).
    #[default]
    Cpu = 0,
    /// Multi-threaded CPU backend using `rayon`.
    Rayon,
}

impl TryFrom<u8> for Backend {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Cpu),
            1 => Ok(Self::Rayon),
            _ => Err(()),
        }
    }
}

/// Internal global state for the active backend.
///
/// The backend is expected to change rarely, not while kernels are running.
static GLOBAL_DEFAULT_BACKEND: AtomicU8 = AtomicU8::new(Backend::Cpu as u8);

/// Sets the active backend to use for tensor computation.
///
/// # Example
///
/// ```
/// use custom_layers::backend::{get_backend, set_backend, Backend};
/// set_backend(Backend::Rayon);
/// assert_eq!(get_backend(), Backend::Rayon);
/// set_backend(Backend::Cpu);
/// ```
pub fn set_backend(b: Backend) {
    log::debug!("switching compute backend to {b:?}");
    GLOBAL_DEFAULT_BACKEND.store(b as u8, Ordering::Release);
}

/// Returns the currently active computation backend.
///
/// If the stored value is invalid, defaults to [`Backend::Cpu`].
pub fn get_backend() -> Backend {
    Backend::try_from(GLOBAL_DEFAULT_BACKEND.load(Ordering::Acquire)).unwrap_or_default()
}

//! Shared primitives for the SCScore workspace.
//!
//! - **Error types**: [`ScscoreError`] and [`Result`] used by every crate
//! - **Traits**: [`Scored`], [`Summarizable`]
//! - **Hashing**: SHA-256 digests of weight files
//! - **Compression**: gzip and zstd decoding with magic-byte detection

pub mod compress;
pub mod error;
pub mod hash;
pub mod traits;

pub use error::{Result, ScscoreError};
pub use traits::*;

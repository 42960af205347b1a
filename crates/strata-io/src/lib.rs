#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for I/O operations.
///
/// Defines [`error::IoError`] variants for file access and encoding/decoding failures.
pub mod error;

/// High-level image reading and writing functions.
///
/// Every image is materialized as 8-bit RGBA regardless of the color type
/// stored in the file.
pub mod functional;

pub use crate::error::IoError;

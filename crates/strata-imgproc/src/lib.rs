#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for the filtering operations.
pub mod error;

/// image filtering module.
pub mod filter;

/// summed-area tables and O(1) region statistics.
pub mod integral;

/// edge preserving kuwahara filter.
pub mod kuwahara;

/// closed set of filter operations selectable at runtime.
pub mod operation;

/// module containing parallization utilities.
pub mod parallel;

/// image transposition.
pub mod transpose;

pub use crate::error::FilterError;

#![deny(missing_docs)]
//! Image types used to move RGBA pixel data between the filters and the codecs.

/// image representation for filtering purposes.
pub mod image;

/// Error types for the image module.
pub mod error;

pub use crate::error::ImageError;
pub use crate::image::{alloc_filled, Image, ImageSize, RasterBuffer, RGBA_CHANNELS};

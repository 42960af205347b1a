use std::{fmt, str::FromStr};

use strata_image::RasterBuffer;

use crate::{error::FilterError, filter::gaussian_blur, kuwahara::kuwahara};

/// The filters that can be selected by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperation {
    /// Separable gaussian blur, see [`gaussian_blur`].
    GaussianBlur,
    /// Edge preserving Kuwahara filter, see [`kuwahara`].
    Kuwahara,
}

impl FilterOperation {
    /// Run the filter from `src` into `dst`.
    ///
    /// # Arguments
    ///
    /// * `src` - The source image.
    /// * `dst` - The destination image, same size as `src`.
    /// * `radius` - The filter radius.
    /// * `workers` - Number of worker threads.
    pub fn apply(
        &self,
        src: &RasterBuffer,
        dst: &mut RasterBuffer,
        radius: usize,
        workers: usize,
    ) -> Result<(), FilterError> {
        match self {
            FilterOperation::GaussianBlur => gaussian_blur(src, dst, radius, workers),
            FilterOperation::Kuwahara => kuwahara(src, dst, radius, workers),
        }
    }
}

impl FromStr for FilterOperation {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "blur" | "gaussian" => Ok(FilterOperation::GaussianBlur),
            "kuwahara" => Ok(FilterOperation::Kuwahara),
            _ => Err(FilterError::UnknownOperation(s.to_string())),
        }
    }
}

impl fmt::Display for FilterOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterOperation::GaussianBlur => write!(f, "Gaussian blur"),
            FilterOperation::Kuwahara => write!(f, "Kuwahara filter"),
        }
    }
}

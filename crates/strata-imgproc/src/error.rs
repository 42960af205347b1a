use strata_image::ImageError;

use crate::parallel::ParallelError;

/// An error type for the filtering operations.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum FilterError {
    /// Error coming from the image buffers (shape mismatch, allocation).
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Error while dispatching work to the thread pool.
    #[error(transparent)]
    Parallel(#[from] ParallelError),

    /// The requested operation name is not a known filter.
    #[error("Unknown operation: {0}. Use 'blur' or 'kuwahara'")]
    UnknownOperation(String),
}

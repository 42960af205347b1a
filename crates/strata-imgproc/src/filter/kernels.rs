use strata_image::{alloc_filled, ImageError};

/// A normalized 1D gaussian kernel of `2 * radius + 1` weights.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianKernel {
    radius: usize,
    weights: Vec<f64>,
}

impl GaussianKernel {
    /// Create the kernel for the given radius, with `sigma = radius / 3`.
    ///
    /// A radius of zero gives the identity kernel `[1.0]`.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::AllocationFailed`] if the `2 * radius + 1`
    /// weights can not be allocated.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata_imgproc::filter::kernels::GaussianKernel;
    ///
    /// let kernel = GaussianKernel::new(2).unwrap();
    /// assert_eq!(kernel.weights().len(), 5);
    /// assert!((kernel.weights().iter().sum::<f64>() - 1.0).abs() < 1e-9);
    /// ```
    pub fn new(radius: usize) -> Result<Self, ImageError> {
        let weights = if radius == 0 {
            alloc_filled(1, 1.0)?
        } else {
            let kernel_size = radius
                .checked_mul(2)
                .and_then(|size| size.checked_add(1))
                .ok_or(ImageError::AllocationFailed(usize::MAX))?;
            gaussian_kernel_1d(kernel_size, radius as f64 / 3.0)?
        };
        Ok(Self { radius, weights })
    }

    /// The radius of the kernel.
    pub fn radius(&self) -> usize {
        self.radius
    }

    /// The kernel weights, centered at index `radius`.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }
}

/// Create a gaussian blur kernel.
///
/// # Arguments
///
/// * `kernel_size` - The size of the kernel.
/// * `sigma` - The sigma of the gaussian kernel.
///
/// # Returns
///
/// A vector of the kernel, normalized to sum to one.
///
/// # Errors
///
/// Returns [`ImageError::AllocationFailed`] if the kernel can not be allocated.
pub fn gaussian_kernel_1d(kernel_size: usize, sigma: f64) -> Result<Vec<f64>, ImageError> {
    let mut kernel = alloc_filled(kernel_size, 0.0)?;

    let mean = (kernel_size as f64 - 1.0) / 2.0;
    let sigma_sq = sigma * sigma;

    // compute the kernel
    for (i, k) in kernel.iter_mut().enumerate() {
        let x = i as f64 - mean;
        *k = (-(x * x) / (2.0 * sigma_sq)).exp();
    }

    // normalize the kernel
    let norm = kernel.iter().sum::<f64>();
    kernel.iter_mut().for_each(|k| *k /= norm);
    Ok(kernel)
}

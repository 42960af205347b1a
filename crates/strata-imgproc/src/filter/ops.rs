use std::time::Instant;

use strata_image::RasterBuffer;

use super::{horizontal_filter, kernels::GaussianKernel};
use crate::{error::FilterError, parallel::WorkerPool, transpose::transpose};

/// Blur an RGBA image using a separable gaussian filter.
///
/// The vertical pass runs as a horizontal pass over the transposed image so
/// both passes read memory row by row:
///
/// `src -> horizontal -> transpose -> horizontal -> transpose -> dst`
///
/// Two scratch buffers and one pool of `workers` threads are created per call
/// and shared by all four stages.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, 4).
/// * `dst` - The destination image with shape (H, W, 4).
/// * `radius` - The kernel radius, `sigma = radius / 3`.
/// * `workers` - Number of worker threads.
///
/// PRECONDITION: `src` and `dst` must have the same shape.
///
/// # Examples
///
/// ```
/// use strata_image::RasterBuffer;
/// use strata_imgproc::filter::gaussian_blur;
///
/// let src = RasterBuffer::from_size_val([6, 4].into(), 90).unwrap();
/// let mut dst = RasterBuffer::from_size_val(src.size(), 0).unwrap();
///
/// gaussian_blur(&src, &mut dst, 3, 2).unwrap();
/// assert_eq!(dst, src);
/// ```
pub fn gaussian_blur(
    src: &RasterBuffer,
    dst: &mut RasterBuffer,
    radius: usize,
    workers: usize,
) -> Result<(), FilterError> {
    src.check_same_size(dst)?;

    let kernel = GaussianKernel::new(radius)?;
    let pool = WorkerPool::new(workers)?;

    let mut horizontal = RasterBuffer::from_size_val(src.size(), 0)?;
    let mut transposed = RasterBuffer::from_size_val(src.size().transposed(), 0)?;

    let start = Instant::now();
    horizontal_filter(src, &mut horizontal, &kernel, &pool)?;
    log::debug!("horizontal pass: {}ms", start.elapsed().as_millis());

    transpose(&horizontal, &mut transposed, &pool)?;

    // the first scratch buffer is free again, reuse it for the vertical pass
    let mut vertical = horizontal.reshape(src.size().transposed())?;

    let start = Instant::now();
    horizontal_filter(&transposed, &mut vertical, &kernel, &pool)?;
    log::debug!("vertical pass: {}ms", start.elapsed().as_millis());

    transpose(&vertical, dst, &pool)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parallel::ParallelError;
    use strata_image::ImageError;

    #[test]
    fn test_gaussian_blur_radius_zero() -> Result<(), FilterError> {
        let data = (0..7 * 5 * 4).map(|i| (i * 37 % 256) as u8).collect();
        let src = RasterBuffer::new([7, 5].into(), data)?;
        let mut dst = RasterBuffer::from_size_val(src.size(), 0)?;
        gaussian_blur(&src, &mut dst, 0, 3)?;
        assert_eq!(dst, src);
        Ok(())
    }

    #[test]
    fn test_gaussian_blur_one_pixel_wide() -> Result<(), FilterError> {
        let src = RasterBuffer::new([1, 1].into(), vec![12, 34, 56, 78])?;
        let mut dst = RasterBuffer::from_size_val(src.size(), 0)?;
        gaussian_blur(&src, &mut dst, 5, 4)?;
        assert_eq!(dst, src);

        let src = RasterBuffer::new([1, 3].into(), [12, 34, 56, 78].repeat(3))?;
        let mut dst = RasterBuffer::from_size_val(src.size(), 0)?;
        gaussian_blur(&src, &mut dst, 5, 2)?;
        assert_eq!(dst, src);
        Ok(())
    }

    #[test]
    fn test_gaussian_blur_impulse() -> Result<(), FilterError> {
        let size = [5, 5].into();
        let mut src = RasterBuffer::from_size_val(size, 0)?;
        // center pixel, red channel
        src.as_slice_mut()[(2 * 5 + 2) * 4] = 255;

        let mut dst = RasterBuffer::from_size_val(size, 0)?;
        gaussian_blur(&src, &mut dst, 3, 2)?;

        let center = dst.get_pixel(2, 2, 0)?;
        assert!(center > 0 && center < 255);
        // symmetric spread
        assert_eq!(dst.get_pixel(1, 2, 0)?, dst.get_pixel(3, 2, 0)?);
        assert_eq!(dst.get_pixel(2, 1, 0)?, dst.get_pixel(2, 3, 0)?);
        assert_eq!(dst.get_pixel(1, 2, 0)?, dst.get_pixel(2, 1, 0)?);
        // other channels untouched
        assert!(dst.as_slice().chunks_exact(4).all(|p| p[1..] == [0, 0, 0]));
        Ok(())
    }

    #[test]
    fn test_gaussian_blur_non_square() -> Result<(), FilterError> {
        let data = (0..9 * 4 * 4).map(|i| (i * 11 % 256) as u8).collect();
        let src = RasterBuffer::new([9, 4].into(), data)?;
        let mut dst = RasterBuffer::from_size_val(src.size(), 0)?;
        gaussian_blur(&src, &mut dst, 2, 3)?;
        assert_eq!(dst.size(), src.size());
        Ok(())
    }

    #[test]
    fn test_gaussian_blur_size_mismatch() -> Result<(), ImageError> {
        let src = RasterBuffer::from_size_val([4, 2].into(), 0)?;
        let mut dst = RasterBuffer::from_size_val([2, 4].into(), 0)?;
        assert_eq!(
            gaussian_blur(&src, &mut dst, 1, 1),
            Err(FilterError::Image(ImageError::InvalidImageSize(2, 4, 4, 2)))
        );
        Ok(())
    }

    #[test]
    fn test_gaussian_blur_radius_too_large() -> Result<(), FilterError> {
        let src = RasterBuffer::from_size_val([4, 4].into(), 100)?;
        let mut dst = RasterBuffer::from_size_val(src.size(), 0)?;
        let res = gaussian_blur(&src, &mut dst, 1 << 61, 2);
        assert!(matches!(
            res,
            Err(FilterError::Image(ImageError::AllocationFailed(_)))
        ));
        Ok(())
    }

    #[test]
    fn test_gaussian_blur_zero_workers() -> Result<(), FilterError> {
        let src = RasterBuffer::from_size_val([4, 4].into(), 100)?;
        let mut dst = RasterBuffer::from_size_val(src.size(), 0)?;
        assert_eq!(
            gaussian_blur(&src, &mut dst, 1, 0),
            Err(FilterError::Parallel(ParallelError::InvalidThreadCount(0)))
        );
        Ok(())
    }
}

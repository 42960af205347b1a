use std::time::Instant;

use strata_image::{RasterBuffer, RGBA_CHANNELS};

use crate::{
    error::FilterError,
    integral::{IntegralImage, STAT_CHANNELS},
    parallel::{par_rows, WorkerPool},
};

/// The four overlapping windows around a pixel, as inclusive `[x1, y1, x2, y2]`.
///
/// The order is top-left, top-right, bottom-left, bottom-right and decides
/// which window wins when two have the same variance.
fn quadrants(x: isize, y: isize, radius: isize) -> [[isize; 4]; 4] {
    [
        [x - radius, y - radius, x, y],
        [x, y - radius, x + radius, y],
        [x - radius, y, x, y + radius],
        [x, y, x + radius, y + radius],
    ]
}

/// Compute the filtered color of the pixel at `(x, y)`.
///
/// Picks the quadrant with the strictly smallest total variance, so the
/// first quadrant in scan order wins ties, and returns its mean rounded to
/// the nearest integer. Quadrants are clipped to the image, so any radius
/// past the image extent behaves like the extent itself.
pub fn kuwahara_pixel(
    integral: &IntegralImage,
    x: usize,
    y: usize,
    radius: usize,
) -> [u8; STAT_CHANNELS] {
    let radius = radius.min(integral.width().max(integral.height()));

    let mut min_variance = f32::MAX;
    let mut best_mean = [0.0f32; STAT_CHANNELS];

    for [x1, y1, x2, y2] in quadrants(x as isize, y as isize, radius as isize) {
        let stats = integral.region_stats(x1, y1, x2, y2);
        let total_variance = stats.total_variance();

        if total_variance < min_variance {
            min_variance = total_variance;
            best_mean = stats.mean;
        }
    }

    best_mean.map(|m| m.clamp(0.0, 255.0).round() as u8)
}

/// Apply the Kuwahara filter to an RGBA image.
///
/// The integral image is built once on the calling thread, then the rows of
/// `dst` are split across `workers` threads. Alpha is copied from `src`.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `dst` - The destination image, same size as `src`.
/// * `radius` - Side length of each quadrant minus one.
/// * `workers` - Number of worker threads.
///
/// # Examples
///
/// ```
/// use strata_image::RasterBuffer;
/// use strata_imgproc::kuwahara::kuwahara;
///
/// let src = RasterBuffer::from_size_val([8, 8].into(), 128).unwrap();
/// let mut dst = RasterBuffer::from_size_val(src.size(), 0).unwrap();
///
/// kuwahara(&src, &mut dst, 2, 4).unwrap();
/// assert_eq!(dst, src);
/// ```
pub fn kuwahara(
    src: &RasterBuffer,
    dst: &mut RasterBuffer,
    radius: usize,
    workers: usize,
) -> Result<(), FilterError> {
    src.check_same_size(dst)?;

    let start = Instant::now();
    let integral = IntegralImage::new(src)?;
    log::debug!("SAT build time: {}ms", start.elapsed().as_millis());

    let pool = WorkerPool::new(workers)?;

    let cols = src.cols();
    let src_data = src.as_slice();
    let row_stride = dst.row_stride();

    par_rows(&pool, dst.as_slice_mut(), row_stride, |range, rows| {
        for (y, dst_row) in range.rows().zip(rows.chunks_exact_mut(row_stride)) {
            for (x, dst_pixel) in dst_row.chunks_exact_mut(RGBA_CHANNELS).enumerate() {
                let color = kuwahara_pixel(&integral, x, y, radius);
                dst_pixel[..STAT_CHANNELS].copy_from_slice(&color);
                dst_pixel[3] = src_data[(y * cols + x) * RGBA_CHANNELS + 3];
            }
        }
    })?;

    Ok(())
}

use strata_image::{Image, ImageError};

use crate::{
    error::FilterError,
    parallel::{par_rows, WorkerPool},
};

/// Transpose an image, swapping its width and height.
///
/// The pixel at `(x, y)` in `src` moves to `(y, x)` in `dst`, channels moved
/// together. Rows of `dst` (columns of `src`) are split across the workers
/// of `pool`.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (W, H, C).
/// * `pool` - The workers to run on.
///
/// # Examples
///
/// ```
/// use strata_image::Image;
/// use strata_imgproc::{parallel::WorkerPool, transpose::transpose};
///
/// let src = Image::<u8, 1>::new([3, 2].into(), vec![1, 2, 3, 4, 5, 6]).unwrap();
/// let mut dst = Image::<u8, 1>::from_size_val([2, 3].into(), 0).unwrap();
///
/// transpose(&src, &mut dst, &WorkerPool::new(2).unwrap()).unwrap();
/// assert_eq!(dst.as_slice(), &[1, 4, 2, 5, 3, 6]);
/// ```
pub fn transpose<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    pool: &WorkerPool,
) -> Result<(), FilterError>
where
    T: Copy + Send + Sync,
{
    if dst.size() != src.size().transposed() {
        return Err(ImageError::InvalidImageSize(
            dst.width(),
            dst.height(),
            src.height(),
            src.width(),
        )
        .into());
    }

    let src_cols = src.cols();
    let src_data = src.as_slice();
    let row_stride = dst.row_stride();

    par_rows(pool, dst.as_slice_mut(), row_stride, |range, rows| {
        // dst row `x` gathers column `x` of src
        for (x, dst_row) in range.rows().zip(rows.chunks_exact_mut(row_stride)) {
            for (y, dst_pixel) in dst_row.chunks_exact_mut(C).enumerate() {
                let src_idx = (y * src_cols + x) * C;
                dst_pixel.copy_from_slice(&src_data[src_idx..src_idx + C]);
            }
        }
    })?;

    Ok(())
}

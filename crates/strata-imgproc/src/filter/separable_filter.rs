use strata_image::Image;

use super::kernels::GaussianKernel;
use crate::{
    error::FilterError,
    parallel::{par_rows, WorkerPool},
};

/// A 1D convolution along the rows of an image.
///
/// Taps falling outside the row sample the nearest edge pixel.
struct RowFilter<'a> {
    weights: &'a [f64],
    radius: isize,
}

impl<'a> RowFilter<'a> {
    fn new(kernel: &'a GaussianKernel) -> Self {
        Self {
            weights: kernel.weights(),
            radius: kernel.radius() as isize,
        }
    }

    fn apply_row<const C: usize>(&self, src_row: &[u8], dst_row: &mut [u8]) {
        let cols = src_row.len() / C;
        let last_col = cols as isize - 1;

        for (c, dst_pixel) in dst_row.chunks_exact_mut(C).enumerate() {
            let mut acc = [0.0f64; C];
            for (i, &k) in self.weights.iter().enumerate() {
                let x = (c as isize + i as isize - self.radius).clamp(0, last_col) as usize;
                let src_pixel = &src_row[x * C..(x + 1) * C];
                for (acc_val, &v) in acc.iter_mut().zip(src_pixel) {
                    *acc_val += v as f64 * k;
                }
            }

            for (out, acc_val) in dst_pixel.iter_mut().zip(acc) {
                *out = acc_val.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

/// Convolve every row of `src` with `kernel` and write the result to `dst`.
///
/// All channels, alpha included, are filtered. The rows are split across the
/// workers of `pool`, each writing only the rows it owns.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `kernel` - The 1D kernel.
/// * `pool` - The workers to run on.
pub fn horizontal_filter<const C: usize>(
    src: &Image<u8, C>,
    dst: &mut Image<u8, C>,
    kernel: &GaussianKernel,
    pool: &WorkerPool,
) -> Result<(), FilterError> {
    src.check_same_size(dst)?;

    let filter = RowFilter::new(kernel);
    let row_stride = src.row_stride();
    let src_data = src.as_slice();

    par_rows(pool, dst.as_slice_mut(), row_stride, |range, rows| {
        let src_rows = &src_data[range.start * row_stride..range.end * row_stride];
        for (src_row, dst_row) in src_rows
            .chunks_exact(row_stride)
            .zip(rows.chunks_exact_mut(row_stride))
        {
            filter.apply_row::<C>(src_row, dst_row);
        }
    })?;

    Ok(())
}

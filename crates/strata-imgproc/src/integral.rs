use strata_image::{alloc_filled, ImageError, RasterBuffer, RGBA_CHANNELS};

/// Number of color channels tracked by the integral image (alpha is excluded).
pub const STAT_CHANNELS: usize = 3;

/// Mean and population variance of the color channels over a region.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RegionStats {
    /// Per channel mean.
    pub mean: [f32; STAT_CHANNELS],
    /// Per channel population variance, never negative.
    pub variance: [f32; STAT_CHANNELS],
}

impl RegionStats {
    /// Sum of the channel variances.
    pub fn total_variance(&self) -> f32 {
        self.variance.iter().sum()
    }
}

/// Summed-area tables of the color channels and of their squares.
///
/// Both tables have shape `(height + 1, width + 1, 3)`; row 0 and column 0
/// are zero so that any rectangle sum is four lookups.
pub struct IntegralImage {
    sum: Vec<f32>,
    sum_sq: Vec<f32>,
    width: usize,
    height: usize,
}

impl IntegralImage {
    /// Build the integral image of `src` in a single row-major pass.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::AllocationFailed`] if the tables can not be allocated.
    pub fn new(src: &RasterBuffer) -> Result<Self, ImageError> {
        let width = src.width();
        let height = src.height();
        let len = (width + 1) * (height + 1) * STAT_CHANNELS;

        let mut integral = Self {
            sum: alloc_filled(len, 0.0)?,
            sum_sq: alloc_filled(len, 0.0)?,
            width,
            height,
        };
        integral.accumulate(src.as_slice());

        Ok(integral)
    }

    fn accumulate(&mut self, pixels: &[u8]) {
        let iw = self.width + 1;

        for y in 1..=self.height {
            for x in 1..=self.width {
                let src_idx = ((y - 1) * self.width + (x - 1)) * RGBA_CHANNELS;

                for ch in 0..STAT_CHANNELS {
                    let val = pixels[src_idx + ch] as f32;
                    let idx = (y * iw + x) * STAT_CHANNELS + ch;
                    let idx_up = ((y - 1) * iw + x) * STAT_CHANNELS + ch;
                    let idx_left = (y * iw + (x - 1)) * STAT_CHANNELS + ch;
                    let idx_diag = ((y - 1) * iw + (x - 1)) * STAT_CHANNELS + ch;

                    self.sum[idx] =
                        val + self.sum[idx_up] + self.sum[idx_left] - self.sum[idx_diag];
                    self.sum_sq[idx] = val * val + self.sum_sq[idx_up] + self.sum_sq[idx_left]
                        - self.sum_sq[idx_diag];
                }
            }
        }
    }

    /// Width of the source image.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height of the source image.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Value of the sum table at integral coordinates `(y, x)`.
    ///
    /// Integral coordinates are shifted by one: `(0, _)` and `(_, 0)` are the zero border.
    pub fn sum(&self, y: usize, x: usize, ch: usize) -> f32 {
        self.sum[(y * (self.width + 1) + x) * STAT_CHANNELS + ch]
    }

    /// Value of the sum-of-squares table at integral coordinates `(y, x)`.
    pub fn sum_sq(&self, y: usize, x: usize, ch: usize) -> f32 {
        self.sum_sq[(y * (self.width + 1) + x) * STAT_CHANNELS + ch]
    }

    /// Mean and variance of the inclusive rectangle `[x1, x2] x [y1, y2]`.
    ///
    /// The rectangle is clamped to the image first. An empty or inverted
    /// rectangle yields all zeros.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata_image::RasterBuffer;
    /// use strata_imgproc::integral::IntegralImage;
    ///
    /// let img = RasterBuffer::from_size_val([4, 4].into(), 100).unwrap();
    /// let integral = IntegralImage::new(&img).unwrap();
    ///
    /// let stats = integral.region_stats(-2, -2, 1, 1);
    /// assert_eq!(stats.mean, [100.0; 3]);
    /// assert_eq!(stats.variance, [0.0; 3]);
    /// ```
    pub fn region_stats(&self, x1: isize, y1: isize, x2: isize, y2: isize) -> RegionStats {
        let x1 = x1.max(0);
        let y1 = y1.max(0);
        let x2 = x2.min(self.width as isize - 1);
        let y2 = y2.min(self.height as isize - 1);

        if x1 > x2 || y1 > y2 {
            return RegionStats::default();
        }

        // shift to integral coordinates
        let (x1, y1) = (x1 as usize, y1 as usize);
        let (x2, y2) = (x2 as usize + 1, y2 as usize + 1);

        let area = ((x2 - x1) * (y2 - y1)) as f32;
        let mut stats = RegionStats::default();

        for ch in 0..STAT_CHANNELS {
            let sum = self.sum(y2, x2, ch) - self.sum(y2, x1, ch) - self.sum(y1, x2, ch)
                + self.sum(y1, x1, ch);
            let sum_sq = self.sum_sq(y2, x2, ch) - self.sum_sq(y2, x1, ch)
                - self.sum_sq(y1, x2, ch)
                + self.sum_sq(y1, x1, ch);

            let mean = sum / area;
            stats.mean[ch] = mean;
            stats.variance[ch] = (sum_sq / area - mean * mean).max(0.0);
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use strata_image::{Image, ImageSize};

    fn random_image(size: ImageSize, seed: u64) -> Result<RasterBuffer, ImageError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let data = (0..size.num_pixels() * 4)
            .map(|_| rng.random::<u8>())
            .collect();
        RasterBuffer::new(size, data)
    }

    fn brute_force_stats(
        img: &Image<f32, 4>,
        x1: isize,
        y1: isize,
        x2: isize,
        y2: isize,
    ) -> RegionStats {
        let x1 = x1.max(0) as usize;
        let y1 = y1.max(0) as usize;
        let x2 = x2.min(img.width() as isize - 1);
        let y2 = y2.min(img.height() as isize - 1);
        if x2 < x1 as isize || y2 < y1 as isize {
            return RegionStats::default();
        }

        let mut stats = RegionStats::default();
        for ch in 0..STAT_CHANNELS {
            let values = (y1..=y2 as usize)
                .flat_map(|y| (x1..=x2 as usize).map(move |x| (x, y)))
                .map(|(x, y)| img.get_pixel(x, y, ch).unwrap() as f64)
                .collect::<Vec<_>>();
            let n = values.len() as f64;
            let mean = values.iter().sum::<f64>() / n;
            let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
            stats.mean[ch] = mean as f32;
            stats.variance[ch] = var as f32;
        }
        stats
    }

    #[test]
    fn test_border_is_zero() -> Result<(), ImageError> {
        let img = random_image([5, 4].into(), 1)?;
        let integral = IntegralImage::new(&img)?;

        for ch in 0..STAT_CHANNELS {
            for x in 0..=5 {
                assert_eq!(integral.sum(0, x, ch), 0.0);
                assert_eq!(integral.sum_sq(0, x, ch), 0.0);
            }
            for y in 0..=4 {
                assert_eq!(integral.sum(y, 0, ch), 0.0);
                assert_eq!(integral.sum_sq(y, 0, ch), 0.0);
            }
        }
        Ok(())
    }

    #[test]
    fn test_total_sum() -> Result<(), ImageError> {
        #[rustfmt::skip]
        let img = RasterBuffer::new(
            [2, 2].into(),
            vec![
                1, 2, 3, 255,   4, 5, 6, 255,
                7, 8, 9, 255,   10, 11, 12, 255,
            ],
        )?;
        let integral = IntegralImage::new(&img)?;

        assert_eq!(integral.sum(2, 2, 0), 22.0);
        assert_eq!(integral.sum(2, 2, 1), 26.0);
        assert_eq!(integral.sum(2, 2, 2), 30.0);
        assert_eq!(integral.sum_sq(2, 2, 0), 1.0 + 16.0 + 49.0 + 100.0);
        assert_eq!(integral.sum(1, 2, 0), 5.0);
        Ok(())
    }

    #[test]
    fn test_region_stats_matches_brute_force() -> Result<(), ImageError> {
        let img = random_image([9, 7].into(), 42)?;
        let img_f32 = img.cast::<f32>()?;
        let integral = IntegralImage::new(&img)?;

        let rects = [
            (0, 0, 8, 6),
            (2, 1, 5, 4),
            (-3, -3, 2, 2),
            (6, 4, 12, 10),
            (4, 3, 4, 3),
            (-10, 2, 20, 2),
        ];

        for (x1, y1, x2, y2) in rects {
            let fast = integral.region_stats(x1, y1, x2, y2);
            let slow = brute_force_stats(&img_f32, x1, y1, x2, y2);
            for ch in 0..STAT_CHANNELS {
                approx::assert_abs_diff_eq!(fast.mean[ch], slow.mean[ch], epsilon = 1e-3);
                approx::assert_relative_eq!(
                    fast.variance[ch],
                    slow.variance[ch],
                    epsilon = 1e-1,
                    max_relative = 1e-3
                );
            }
        }
        Ok(())
    }

    #[test]
    fn test_region_stats_variance_non_negative() -> Result<(), ImageError> {
        let img = random_image([16, 16].into(), 7)?;
        let integral = IntegralImage::new(&img)?;

        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..500 {
            let x1 = rng.random_range(-4i32..20) as isize;
            let y1 = rng.random_range(-4i32..20) as isize;
            let x2 = rng.random_range(-4i32..20) as isize;
            let y2 = rng.random_range(-4i32..20) as isize;
            let stats = integral.region_stats(x1, y1, x2, y2);
            assert!(stats.variance.iter().all(|&v| v >= 0.0));
        }
        Ok(())
    }

    #[test]
    fn test_region_stats_empty_rect() -> Result<(), ImageError> {
        let img = RasterBuffer::from_size_val([4, 4].into(), 50)?;
        let integral = IntegralImage::new(&img)?;

        // inverted
        assert_eq!(integral.region_stats(3, 3, 1, 1), RegionStats::default());
        // fully outside
        assert_eq!(integral.region_stats(10, 10, 12, 12), RegionStats::default());
        assert_eq!(integral.region_stats(-5, 0, -1, 3), RegionStats::default());
        Ok(())
    }

    #[test]
    fn test_empty_image() -> Result<(), ImageError> {
        let img = RasterBuffer::new([0, 0].into(), vec![])?;
        let integral = IntegralImage::new(&img)?;
        assert_eq!(integral.region_stats(0, 0, 1, 1), RegionStats::default());
        Ok(())
    }
}

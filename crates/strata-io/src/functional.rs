use std::path::Path;

use image::ExtendedColorType;
use strata_image::{ImageSize, RasterBuffer, RGBA_CHANNELS};

use crate::error::IoError;

/// The file formats understood by [`read_image_rgba8`] and [`write_image`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ImageFormat {
    Png,
    Jpeg,
}

fn format_from_path(file_path: &Path) -> Result<ImageFormat, IoError> {
    let extension = file_path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("png") => Ok(ImageFormat::Png),
        Some("jpg") | Some("jpeg") => Ok(ImageFormat::Jpeg),
        _ => Err(IoError::InvalidFileExtension(file_path.to_path_buf())),
    }
}

fn into_raster(image: image::DynamicImage) -> Result<RasterBuffer, IoError> {
    let rgba = image.into_rgba8();
    let size = ImageSize {
        width: rgba.width() as usize,
        height: rgba.height() as usize,
    };
    Ok(RasterBuffer::new(size, rgba.into_raw())?)
}

/// Reads a PNG or JPEG image as 8-bit RGBA.
///
/// # Arguments
///
/// * `file_path` - The path to the image file.
///
/// # Returns
///
/// A RGBA image with four channels. Images without alpha get an opaque alpha channel.
pub fn read_image_rgba8(file_path: impl AsRef<Path>) -> Result<RasterBuffer, IoError> {
    let file_path = file_path.as_ref();

    // verify the file exists and is a supported format
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }
    format_from_path(file_path)?;

    let image = image::open(file_path)?;
    into_raster(image)
}

/// Decodes an encoded image (PNG or JPEG) from raw bytes as 8-bit RGBA.
///
/// # Arguments
///
/// * `bytes` - Raw bytes of the encoded image.
pub fn decode_image_rgba8(bytes: &[u8]) -> Result<RasterBuffer, IoError> {
    let image = image::load_from_memory(bytes)?;
    into_raster(image)
}

/// Writes an RGBA image to disk, the format is chosen from the file extension.
///
/// JPEG has no alpha channel, so alpha is dropped when writing `.jpg`/`.jpeg`.
///
/// # Arguments
///
/// * `file_path` - The path to the output file.
/// * `image` - The image to write.
pub fn write_image(file_path: impl AsRef<Path>, image: &RasterBuffer) -> Result<(), IoError> {
    let file_path = file_path.as_ref();
    let [width, height]: [u32; 2] = image.size().into();

    match format_from_path(file_path)? {
        ImageFormat::Png => {
            image::save_buffer(
                file_path,
                image.as_slice(),
                width,
                height,
                ExtendedColorType::Rgba8,
            )?;
        }
        ImageFormat::Jpeg => {
            let rgb = image
                .as_slice()
                .chunks_exact(RGBA_CHANNELS)
                .flat_map(|px| [px[0], px[1], px[2]])
                .collect::<Vec<u8>>();
            image::save_buffer(file_path, &rgb, width, height, ExtendedColorType::Rgb8)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(size: ImageSize) -> RasterBuffer {
        let data = (0..size.num_pixels())
            .flat_map(|i| {
                let v = (i * 255 / size.num_pixels()) as u8;
                [v, 255 - v, v / 2, 200]
            })
            .collect();
        RasterBuffer::new(size, data).unwrap()
    }

    #[test]
    fn test_png_roundtrip() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("gradient.png");

        let image = gradient([13, 7].into());
        write_image(&file_path, &image)?;
        let image_back = read_image_rgba8(&file_path)?;

        assert_eq!(image_back, image);

        let bytes = std::fs::read(&file_path)?;
        assert_eq!(decode_image_rgba8(&bytes)?, image);
        Ok(())
    }

    #[test]
    fn test_jpeg_opaque_alpha() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("gradient.JPG");

        let image = gradient([16, 8].into());
        write_image(&file_path, &image)?;
        let image_back = read_image_rgba8(&file_path)?;

        assert_eq!(image_back.size(), image.size());
        assert!(image_back
            .as_slice()
            .chunks_exact(RGBA_CHANNELS)
            .all(|px| px[3] == 255));
        Ok(())
    }

    #[test]
    fn test_read_missing_file() {
        let res = read_image_rgba8("does/not/exist.png");
        assert!(matches!(res, Err(IoError::FileDoesNotExist(_))));
    }

    #[test]
    fn test_invalid_extension() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("image.bmp");
        std::fs::write(&file_path, b"not an image")?;

        let res = read_image_rgba8(&file_path);
        assert!(matches!(res, Err(IoError::InvalidFileExtension(_))));

        let image = gradient([2, 2].into());
        let res = write_image(&file_path, &image);
        assert!(matches!(res, Err(IoError::InvalidFileExtension(_))));
        Ok(())
    }

    #[test]
    fn test_decode_garbage() {
        assert!(matches!(
            decode_image_rgba8(b"definitely not an image"),
            Err(IoError::ImageDecodeError(_))
        ));
    }
}

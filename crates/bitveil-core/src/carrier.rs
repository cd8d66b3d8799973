//! # Carrier file handling
//!
//! Conversion between image files and [`PixelBuffer`], built on the `image`
//! crate. PNG is the only output format; anything lossy would destroy the
//! embedded bits. Wide samples are converted between the decoder's native
//! `u16` and the buffer's big endian byte order on the way through.

use std::path::Path;

use image::{DynamicImage, ImageBuffer, ImageFormat};
use log::debug;

use crate::buffer::{ColorLayout, PixelBuffer, PixelFormat};
use crate::error::BitveilError;
use crate::result::Result;

/// Decode the image at `path` into a buffer.
pub fn open_carrier(path: impl AsRef<Path>) -> Result<PixelBuffer> {
    let path = path.as_ref();
    debug!("opening carrier {}", path.display());

    from_dynamic(image::open(path)?)
}

/// Encode `buffer` as a PNG at `path`, whatever extension the path has.
pub fn save_carrier(path: impl AsRef<Path>, buffer: &PixelBuffer) -> Result<()> {
    let path = path.as_ref();
    debug!("saving carrier {}", path.display());

    to_dynamic(buffer).save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Take over the samples of a decoded image.
///
/// Float images have no defined bit pattern to embed into and are rejected
/// as [`BitveilError::UnsupportedColorType`].
pub fn from_dynamic(image: DynamicImage) -> Result<PixelBuffer> {
    let (width, height) = (image.width(), image.height());

    let (format, data) = match image {
        DynamicImage::ImageLuma8(image) => (PixelFormat::LUMA8, image.into_raw()),
        DynamicImage::ImageLumaA8(image) => (PixelFormat::LUMA_ALPHA8, image.into_raw()),
        DynamicImage::ImageRgb8(image) => (PixelFormat::RGB8, image.into_raw()),
        DynamicImage::ImageRgba8(image) => (PixelFormat::RGBA8, image.into_raw()),
        DynamicImage::ImageLuma16(image) => {
            (PixelFormat::LUMA16, big_endian_bytes(image.into_raw()))
        }
        DynamicImage::ImageLumaA16(image) => {
            (PixelFormat::LUMA_ALPHA16, big_endian_bytes(image.into_raw()))
        }
        DynamicImage::ImageRgb16(image) => (PixelFormat::RGB16, big_endian_bytes(image.into_raw())),
        DynamicImage::ImageRgba16(image) => {
            (PixelFormat::RGBA16, big_endian_bytes(image.into_raw()))
        }
        other => return Err(BitveilError::UnsupportedColorType(other.color())),
    };

    PixelBuffer::from_raw(width, height, format, data)
}

/// Hand the samples back to the `image` crate for encoding.
pub fn to_dynamic(buffer: &PixelBuffer) -> DynamicImage {
    let (width, height) = (buffer.width(), buffer.height());
    let format = buffer.format();
    let data = buffer.as_raw().to_vec();

    let image = match (format.layout(), format.bit_depth() == 16) {
        (ColorLayout::Luma, false) => {
            ImageBuffer::from_raw(width, height, data).map(DynamicImage::ImageLuma8)
        }
        (ColorLayout::LumaAlpha, false) => {
            ImageBuffer::from_raw(width, height, data).map(DynamicImage::ImageLumaA8)
        }
        (ColorLayout::Rgb, false) => {
            ImageBuffer::from_raw(width, height, data).map(DynamicImage::ImageRgb8)
        }
        (ColorLayout::Rgba, false) => {
            ImageBuffer::from_raw(width, height, data).map(DynamicImage::ImageRgba8)
        }
        (ColorLayout::Luma, true) => ImageBuffer::from_raw(width, height, native_samples(&data))
            .map(DynamicImage::ImageLuma16),
        (ColorLayout::LumaAlpha, true) => {
            ImageBuffer::from_raw(width, height, native_samples(&data))
                .map(DynamicImage::ImageLumaA16)
        }
        (ColorLayout::Rgb, true) => ImageBuffer::from_raw(width, height, native_samples(&data))
            .map(DynamicImage::ImageRgb16),
        (ColorLayout::Rgba, true) => ImageBuffer::from_raw(width, height, native_samples(&data))
            .map(DynamicImage::ImageRgba16),
    };

    // a buffer always holds exactly width * height * bytes_per_pixel bytes
    image.expect("buffer length matches its dimensions")
}

fn big_endian_bytes(samples: Vec<u16>) -> Vec<u8> {
    samples
        .into_iter()
        .flat_map(|sample| sample.to_be_bytes())
        .collect()
}

fn native_samples(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb};

    #[test]
    fn should_roundtrip_eight_bit_images() {
        let image = ImageBuffer::from_fn(3, 2, |x, y| Rgb([x as u8, y as u8, 42]));

        let buffer = from_dynamic(DynamicImage::ImageRgb8(image)).unwrap();
        assert_eq!(buffer.format(), PixelFormat::RGB8);
        assert_eq!(buffer.byte_count(), 18);
        assert_eq!(&buffer.as_raw()[..6], &[0, 0, 42, 1, 0, 42]);

        assert_eq!(from_dynamic(to_dynamic(&buffer)).unwrap(), buffer);
    }

    #[test]
    fn should_store_wide_samples_big_endian() {
        let image = ImageBuffer::from_pixel(2, 1, Luma([0x0102u16]));

        let buffer = from_dynamic(DynamicImage::ImageLuma16(image)).unwrap();

        assert_eq!(buffer.format(), PixelFormat::LUMA16);
        assert_eq!(buffer.as_raw(), &[0x01, 0x02, 0x01, 0x02]);
    }

    #[test]
    fn should_roundtrip_wide_samples() {
        let image = ImageBuffer::from_fn(2, 2, |x, y| Luma([(x * 1000 + y * 257) as u16]));

        let buffer = from_dynamic(DynamicImage::ImageLuma16(image)).unwrap();

        assert_eq!(from_dynamic(to_dynamic(&buffer)).unwrap(), buffer);
    }

    #[test]
    fn should_reject_float_images() {
        let image = ImageBuffer::from_pixel(1, 1, Rgb([0.0f32, 0.0, 0.0]));

        let result = from_dynamic(DynamicImage::ImageRgb32F(image));

        assert!(matches!(
            result,
            Err(BitveilError::UnsupportedColorType(_))
        ));
    }
}

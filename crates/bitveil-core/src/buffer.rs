//! # Carrier pixel buffers
//!
//! A [`PixelBuffer`] is the flat byte view the codec works on: row major
//! pixels, channels interleaved, 16 bit samples stored big endian. All
//! embedding math runs on byte offsets into this view, so the buffer knows
//! which offsets belong to an alpha channel and nothing about bits or depths.

use crate::error::BitveilError;
use crate::result::Result;

/// Channel arrangement of a buffer, without the sample width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorLayout {
    Luma,
    LumaAlpha,
    Rgb,
    Rgba,
}

impl ColorLayout {
    pub const fn channel_count(self) -> u32 {
        match self {
            ColorLayout::Luma => 1,
            ColorLayout::LumaAlpha => 2,
            ColorLayout::Rgb => 3,
            ColorLayout::Rgba => 4,
        }
    }

    pub const fn has_alpha(self) -> bool {
        matches!(self, ColorLayout::LumaAlpha | ColorLayout::Rgba)
    }

    pub(crate) const fn name(self) -> &'static str {
        match self {
            ColorLayout::Luma => "luma",
            ColorLayout::LumaAlpha => "luma alpha",
            ColorLayout::Rgb => "rgb",
            ColorLayout::Rgba => "rgba",
        }
    }
}

/// Layout plus sample width; only 8 and 16 bit samples exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelFormat {
    layout: ColorLayout,
    bit_depth: u8,
}

impl PixelFormat {
    pub const LUMA8: PixelFormat = PixelFormat::with_depth(ColorLayout::Luma, 8);
    pub const LUMA_ALPHA8: PixelFormat = PixelFormat::with_depth(ColorLayout::LumaAlpha, 8);
    pub const RGB8: PixelFormat = PixelFormat::with_depth(ColorLayout::Rgb, 8);
    pub const RGBA8: PixelFormat = PixelFormat::with_depth(ColorLayout::Rgba, 8);
    pub const LUMA16: PixelFormat = PixelFormat::with_depth(ColorLayout::Luma, 16);
    pub const LUMA_ALPHA16: PixelFormat = PixelFormat::with_depth(ColorLayout::LumaAlpha, 16);
    pub const RGB16: PixelFormat = PixelFormat::with_depth(ColorLayout::Rgb, 16);
    pub const RGBA16: PixelFormat = PixelFormat::with_depth(ColorLayout::Rgba, 16);

    const fn with_depth(layout: ColorLayout, bit_depth: u8) -> PixelFormat {
        PixelFormat { layout, bit_depth }
    }

    pub fn new(layout: ColorLayout, bit_depth: u8) -> Result<PixelFormat> {
        match bit_depth {
            8 | 16 => Ok(PixelFormat { layout, bit_depth }),
            other => Err(BitveilError::InvalidBitDepth(other)),
        }
    }

    pub const fn layout(self) -> ColorLayout {
        self.layout
    }

    pub const fn bit_depth(self) -> u8 {
        self.bit_depth
    }

    pub const fn bytes_per_channel(self) -> u32 {
        self.bit_depth as u32 / 8
    }

    pub const fn bytes_per_pixel(self) -> u32 {
        self.layout.channel_count() * self.bytes_per_channel()
    }
}

/// Decoded carrier image as a flat, byte addressable sample buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    format: PixelFormat,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// A zeroed buffer of the given dimensions.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Result<PixelBuffer> {
        let expected = expected_len(width, height, format);
        if expected > u32::MAX as u64 {
            return Err(BitveilError::OversizedBuffer(expected));
        }

        Ok(PixelBuffer {
            width,
            height,
            format,
            data: vec![0; expected as usize],
        })
    }

    /// Wrap existing sample bytes; `data` must hold exactly
    /// `width * height * bytes_per_pixel` bytes.
    pub fn from_raw(
        width: u32,
        height: u32,
        format: PixelFormat,
        data: Vec<u8>,
    ) -> Result<PixelBuffer> {
        let expected = expected_len(width, height, format);
        if expected > u32::MAX as u64 {
            return Err(BitveilError::OversizedBuffer(expected));
        }
        if data.len() as u64 != expected {
            return Err(BitveilError::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(PixelBuffer {
            width,
            height,
            format,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Total number of sample bytes, which is also the offset space the
    /// scatter permutation runs over.
    pub fn byte_count(&self) -> u32 {
        self.data.len() as u32
    }

    /// Read one sample byte.
    ///
    /// Panics when `offset` is past the end of the buffer.
    pub fn byte(&self, offset: u32) -> u8 {
        self.data[offset as usize]
    }

    /// Overwrite one sample byte.
    ///
    /// Panics when `offset` is past the end of the buffer.
    pub fn set_byte(&mut self, offset: u32, value: u8) {
        self.data[offset as usize] = value;
    }

    /// Whether `offset` falls into an alpha sample. Pure arithmetic on the
    /// layout; the offset itself is not range checked.
    pub fn is_alpha_index(&self, offset: u32) -> bool {
        let channels = self.format.layout().channel_count();
        self.format.layout().has_alpha()
            && (offset / self.format.bytes_per_channel()) % channels == channels - 1
    }

    /// Number of bytes [`is_alpha_index`](Self::is_alpha_index) is true for.
    pub fn alpha_byte_count(&self) -> u32 {
        if self.format.layout().has_alpha() {
            self.byte_count() / self.format.layout().channel_count()
        } else {
            0
        }
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }
}

fn expected_len(width: u32, height: u32, format: PixelFormat) -> u64 {
    // the pixel count always fits u64; only the bytes factor can wrap, and
    // a saturated product still trips the size guard
    (width as u64 * height as u64).saturating_mul(format.bytes_per_pixel() as u64)
}

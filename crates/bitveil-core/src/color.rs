//! # Color accessors
//!
//! Pixel level access on top of the byte view, for callers that want to
//! inspect or touch up a carrier without decoding it again. Channel values
//! are handled as `u16` regardless of the buffer depth; in an 8 bit buffer
//! only the low byte is stored.

use crate::buffer::{ColorLayout, PixelBuffer};
use crate::error::BitveilError;
use crate::result::Result;

/// One pixel of an rgb or rgba buffer. `alpha` is present exactly when the
/// layout carries an alpha channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RgbColor {
    pub red: u16,
    pub green: u16,
    pub blue: u16,
    pub alpha: Option<u16>,
}

/// One pixel of a luma or luma alpha buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrayColor {
    pub value: u16,
    pub alpha: Option<u16>,
}

impl PixelBuffer {
    /// Read the pixel at `x`, `y` of an rgb or rgba buffer.
    ///
    /// Panics when the coordinates lie outside the buffer.
    pub fn rgb_at(&self, x: u32, y: u32) -> Result<RgbColor> {
        let layout = self.guard_layout(x, y, ColorLayout::Rgb)?;
        let base = self.pixel_base(x, y);
        let step = self.format().bytes_per_channel();

        Ok(RgbColor {
            red: self.sample(base),
            green: self.sample(base + step),
            blue: self.sample(base + 2 * step),
            alpha: layout
                .has_alpha()
                .then(|| self.sample(base + 3 * step)),
        })
    }

    /// Write the pixel at `x`, `y` of an rgb or rgba buffer. An alpha value
    /// is written only where the layout has the channel; `None` leaves an
    /// existing alpha sample as it is.
    ///
    /// Panics when the coordinates lie outside the buffer.
    pub fn set_rgb_at(&mut self, x: u32, y: u32, color: RgbColor) -> Result<()> {
        let layout = self.guard_layout(x, y, ColorLayout::Rgb)?;
        let base = self.pixel_base(x, y);
        let step = self.format().bytes_per_channel();

        self.set_sample(base, color.red);
        self.set_sample(base + step, color.green);
        self.set_sample(base + 2 * step, color.blue);
        if let (true, Some(alpha)) = (layout.has_alpha(), color.alpha) {
            self.set_sample(base + 3 * step, alpha);
        }

        Ok(())
    }

    /// Read the pixel at `x`, `y` of a luma or luma alpha buffer.
    ///
    /// Panics when the coordinates lie outside the buffer.
    pub fn gray_at(&self, x: u32, y: u32) -> Result<GrayColor> {
        let layout = self.guard_layout(x, y, ColorLayout::Luma)?;
        let base = self.pixel_base(x, y);
        let step = self.format().bytes_per_channel();

        Ok(GrayColor {
            value: self.sample(base),
            alpha: layout.has_alpha().then(|| self.sample(base + step)),
        })
    }

    /// Write the pixel at `x`, `y` of a luma or luma alpha buffer, with the
    /// same alpha rules as [`set_rgb_at`](Self::set_rgb_at).
    ///
    /// Panics when the coordinates lie outside the buffer.
    pub fn set_gray_at(&mut self, x: u32, y: u32, color: GrayColor) -> Result<()> {
        let layout = self.guard_layout(x, y, ColorLayout::Luma)?;
        let base = self.pixel_base(x, y);
        let step = self.format().bytes_per_channel();

        self.set_sample(base, color.value);
        if let (true, Some(alpha)) = (layout.has_alpha(), color.alpha) {
            self.set_sample(base + step, alpha);
        }

        Ok(())
    }

    fn guard_layout(&self, x: u32, y: u32, base_layout: ColorLayout) -> Result<ColorLayout> {
        let layout = self.format().layout();
        let matches = match base_layout {
            ColorLayout::Rgb => matches!(layout, ColorLayout::Rgb | ColorLayout::Rgba),
            _ => matches!(layout, ColorLayout::Luma | ColorLayout::LumaAlpha),
        };
        if !matches {
            return Err(BitveilError::LayoutMismatch {
                expected: base_layout.name(),
                actual: layout.name(),
            });
        }
        if x >= self.width() || y >= self.height() {
            panic!(
                "pixel ({x}, {y}) outside a {}x{} buffer",
                self.width(),
                self.height()
            );
        }
        Ok(layout)
    }

    fn pixel_base(&self, x: u32, y: u32) -> u32 {
        (y * self.width() + x) * self.format().bytes_per_pixel()
    }

    /// One channel value; 16 bit samples are stored big endian.
    fn sample(&self, offset: u32) -> u16 {
        match self.format().bytes_per_channel() {
            1 => u16::from(self.byte(offset)),
            _ => u16::from(self.byte(offset)) << 8 | u16::from(self.byte(offset + 1)),
        }
    }

    fn set_sample(&mut self, offset: u32, value: u16) {
        match self.format().bytes_per_channel() {
            1 => self.set_byte(offset, value as u8),
            _ => {
                self.set_byte(offset, (value >> 8) as u8);
                self.set_byte(offset + 1, value as u8);
            }
        }
    }
}

use gridcaster_core::Rgb;

use crate::RenderingError;

/// Packs an opaque color as `0xFFRRGGBB`.
#[must_use]
pub const fn pack_rgb(color: Rgb) -> u32 {
    0xFF00_0000
        | (color.red() as u32) << 16
        | (color.green() as u32) << 8
        | color.blue() as u32
}

/// Flat, row-major buffer of packed pixels overwritten every frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl FrameBuffer {
    /// Allocates a black buffer of `width × height` pixels.
    pub fn new(width: u32, height: u32) -> Result<Self, RenderingError> {
        if width == 0 || height == 0 {
            return Err(RenderingError::ZeroDimension { width, height });
        }
        let len = width as usize * height as usize;
        Ok(Self {
            width,
            height,
            pixels: vec![pack_rgb(Rgb::BLACK); len],
        })
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Packed pixels in row-major order.
    #[must_use]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Packed pixel at `(x, y)`, or `None` outside the buffer.
    #[must_use]
    pub fn pixel(&self, x: i64, y: i64) -> Option<u32> {
        self.index(x, y).map(|index| self.pixels[index])
    }

    /// Writes one pixel, skipping coordinates outside the buffer.
    pub fn set_pixel(&mut self, x: i64, y: i64, pixel: u32) {
        if let Some(index) = self.index(x, y) {
            self.pixels[index] = pixel;
        }
    }

    /// Fills the rows `start..end`, clamped to the buffer.
    pub fn fill_rows(&mut self, start: u32, end: u32, pixel: u32) {
        let start = start.min(self.height) as usize * self.width as usize;
        let end = end.min(self.height) as usize * self.width as usize;
        if start < end {
            self.pixels[start..end].fill(pixel);
        }
    }

    /// Fills column `x` over rows `top..bottom`, skipping rows outside the buffer.
    pub fn fill_column(&mut self, x: i64, top: i64, bottom: i64, pixel: u32) {
        if x < 0 || x >= i64::from(self.width) {
            return;
        }
        let top = top.max(0);
        let bottom = bottom.min(i64::from(self.height));
        for y in top..bottom {
            self.set_pixel(x, y, pixel);
        }
    }

    /// Fills the `size × size` block whose top-left corner is `(x, y)`.
    pub fn fill_block(&mut self, x: i64, y: i64, size: u32, pixel: u32) {
        let size = i64::from(size);
        for row in y..y.saturating_add(size) {
            for column in x..x.saturating_add(size) {
                self.set_pixel(column, row, pixel);
            }
        }
    }

    /// Expands the packed pixels into RGBA bytes for texture upload.
    pub fn write_rgba(&self, out: &mut Vec<u8>) {
        out.clear();
        out.reserve(self.pixels.len() * 4);
        for pixel in &self.pixels {
            let [alpha, red, green, blue] = pixel.to_be_bytes();
            out.extend_from_slice(&[red, green, blue, alpha]);
        }
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return None;
        }
        usize::try_from(y * i64::from(self.width) + x).ok()
    }
}

/// Pre-rasterized overlay image; a zero pixel is transparent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sprite {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl Sprite {
    /// Wraps row-major packed pixels, rejecting a length that does not match the dimensions.
    pub fn new(width: u32, height: u32, pixels: Vec<u32>) -> Result<Self, RenderingError> {
        if width == 0 || height == 0 {
            return Err(RenderingError::ZeroDimension { width, height });
        }
        if pixels.len() != width as usize * height as usize {
            return Err(RenderingError::SpriteSize {
                width,
                height,
                pixels: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Iterates `(x, y, pixel)` for every opaque pixel.
    pub fn opaque_pixels(&self) -> impl Iterator<Item = (u32, u32, u32)> + '_ {
        let width = self.width;
        self.pixels
            .iter()
            .enumerate()
            .filter(|(_, pixel)| **pixel != 0)
            .map(move |(index, pixel)| {
                let index = index as u32;
                (index % width, index / width, *pixel)
            })
    }
}

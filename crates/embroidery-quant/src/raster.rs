//! RGBA8 raster buffer.
//!
//! [`Raster`] is the currency between pipeline stages. It is immutable once
//! built: every stage reads one raster and returns a new one.

use crate::api::{QuantError, Stage};
use crate::color::Color;

/// Bytes per pixel (R, G, B, A).
pub const CHANNELS: usize = 4;

/// A width x height image of RGBA8 pixels in row-major order.
///
/// Invariant: `pixels.len() == width * height * 4`.
///
/// # Example
///
/// ```
/// use embroidery_quant::{Color, Raster};
///
/// let raster = Raster::filled(2, 2, Color::rgb(255, 0, 0));
/// assert_eq!(raster.pixels().len(), 16);
/// assert_eq!(raster.pixel(1, 1), Color::rgb(255, 0, 0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl Raster {
    /// Wrap an RGBA8 buffer.
    ///
    /// A zero width or height describes an empty raster; stages that need
    /// pixels reject it.
    ///
    /// # Errors
    ///
    /// [`QuantError::InvalidParameter`] (input stage) if the buffer length is
    /// not `width * height * 4` or the dimensions overflow.
    pub fn new(width: usize, height: usize, pixels: Vec<u8>) -> Result<Self, QuantError> {
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(CHANNELS))
            .ok_or_else(|| {
                QuantError::invalid(Stage::Input, format!("dimensions overflow: {width}x{height}"))
            })?;

        if pixels.len() != expected {
            return Err(QuantError::invalid(
                Stage::Input,
                format!(
                    "pixel buffer has {} bytes, {width}x{height} RGBA needs {expected}",
                    pixels.len()
                ),
            ));
        }

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// A raster where every pixel is `color`.
    pub fn filled(width: usize, height: usize, color: Color) -> Self {
        let pixels = color.to_rgba().repeat(width * height);
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Build a raster from row-major colors.
    ///
    /// # Errors
    ///
    /// Same as [`Raster::new`].
    pub fn from_colors(width: usize, height: usize, colors: &[Color]) -> Result<Self, QuantError> {
        let pixels = colors.iter().flat_map(|c| c.to_rgba()).collect();
        Self::new(width, height, pixels)
    }

    /// Image width in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height in pixels.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of pixels.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// True if the raster holds no pixels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Raw RGBA8 bytes.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Color {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        let i = (y * self.width + x) * CHANNELS;
        Color::from_rgba_slice(&self.pixels[i..i + CHANNELS])
    }

    /// Iterate pixels in row-major order.
    pub fn colors(&self) -> impl Iterator<Item = Color> + '_ {
        self.pixels.chunks_exact(CHANNELS).map(Color::from_rgba_slice)
    }

    /// A raster with the same dimensions and new pixel bytes.
    pub(crate) fn with_pixels(&self, pixels: Vec<u8>) -> Raster {
        debug_assert_eq!(pixels.len(), self.pixels.len());
        Raster {
            width: self.width,
            height: self.height,
            pixels,
        }
    }

    /// Apply `f` to every pixel independently.
    pub fn map_colors(&self, mut f: impl FnMut(Color) -> Color) -> Raster {
        let pixels = self.colors().flat_map(|c| f(c).to_rgba()).collect();
        self.with_pixels(pixels)
    }

    /// Downscale by area averaging so the longer side is at most `max_side`.
    ///
    /// Never upscales: a raster that already fits is returned as a clone.
    /// Aspect ratio is kept (each side at least one pixel).
    ///
    /// ```
    /// use embroidery_quant::{Color, Raster};
    ///
    /// let big = Raster::filled(1024, 256, Color::rgb(9, 9, 9));
    /// let small = big.downscale_to_fit(512);
    /// assert_eq!((small.width(), small.height()), (512, 128));
    /// ```
    pub fn downscale_to_fit(&self, max_side: usize) -> Raster {
        let longest = self.width.max(self.height);
        if max_side == 0 || longest <= max_side {
            return self.clone();
        }

        let scale = max_side as f64 / longest as f64;
        let new_w = ((self.width as f64 * scale).round() as usize).clamp(1, max_side);
        let new_h = ((self.height as f64 * scale).round() as usize).clamp(1, max_side);

        let mut pixels = Vec::with_capacity(new_w * new_h * CHANNELS);
        for oy in 0..new_h {
            let y0 = oy * self.height / new_h;
            let y1 = ((oy + 1) * self.height / new_h).max(y0 + 1);
            for ox in 0..new_w {
                let x0 = ox * self.width / new_w;
                let x1 = ((ox + 1) * self.width / new_w).max(x0 + 1);

                let mut sums = [0u64; CHANNELS];
                for y in y0..y1 {
                    let row = y * self.width;
                    for x in x0..x1 {
                        let i = (row + x) * CHANNELS;
                        for c in 0..CHANNELS {
                            sums[c] += self.pixels[i + c] as u64;
                        }
                    }
                }

                let count = ((y1 - y0) * (x1 - x0)) as u64;
                for sum in sums {
                    pixels.push(((sum + count / 2) / count) as u8);
                }
            }
        }

        Raster {
            width: new_w,
            height: new_h,
            pixels,
        }
    }
}

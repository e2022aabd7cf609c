//! Error diffusion dithering.
//!
//! The [`Ditherer`] re-renders a raster against a fixed [`Palette`]. Each
//! pixel is matched to its nearest palette entry in Lab, and the RGB
//! difference between the working value and the chosen entry is spread over
//! forward neighbors according to a [`Kernel`].
//!
//! # Example
//!
//! ```
//! use embroidery_quant::{Color, DitherKernel, DitherOptions, Ditherer, Palette, Raster};
//!
//! let palette = Palette::new(&[Color::rgb(0, 0, 0), Color::rgb(255, 255, 255)]).unwrap();
//! let raster = Raster::filled(4, 4, Color::rgb(128, 128, 128));
//!
//! let ditherer = Ditherer::new(DitherOptions::new().kernel(DitherKernel::Atkinson)).unwrap();
//! let out = ditherer.dither(&raster, &palette).unwrap();
//! assert!(out.colors().all(|c| palette.contains(c)));
//! ```

mod kernel;
mod options;

use std::collections::HashMap;

use tracing::debug;

pub use kernel::*;
pub use options::{DitherKernel, DitherOptions, ParseKernelError};

use crate::api::{QuantError, Stage};
use crate::color::{Color, Lab};
use crate::palette::Palette;
use crate::raster::Raster;

/// Error buffer for efficient error diffusion.
///
/// Holds only the rows a kernel can reach (`max_dy + 1`) instead of a
/// full-image accumulator.
///
/// # Usage Pattern
///
/// 1. Create buffer with `new(width, row_depth)`
/// 2. For each row:
///    a. Read accumulated error with `get_accumulated(x)`
///    b. After processing pixel, distribute error with `add_error(x, dy, error)`
///    c. After row complete, call `advance_row()`
#[derive(Debug)]
pub struct ErrorBuffer {
    /// rows[0] is the current row, rows[1] the next, and so on.
    rows: Vec<Vec<[f32; 3]>>,
    width: usize,
}

impl ErrorBuffer {
    /// Create a zeroed buffer of `row_depth` rows.
    pub fn new(width: usize, row_depth: usize) -> Self {
        Self {
            rows: (0..row_depth.max(1)).map(|_| vec![[0.0; 3]; width]).collect(),
            width,
        }
    }

    /// RGB error accumulated for pixel `x` of the current row.
    #[inline]
    pub fn get_accumulated(&self, x: usize) -> [f32; 3] {
        self.rows[0][x]
    }

    /// Add error to pixel `x`, `row_offset` rows below the current one.
    ///
    /// Silently ignores out-of-bounds coordinates.
    #[inline]
    pub fn add_error(&mut self, x: usize, row_offset: usize, error: [f32; 3]) {
        if x < self.width && row_offset < self.rows.len() {
            let cell = &mut self.rows[row_offset][x];
            for c in 0..3 {
                cell[c] += error[c];
            }
        }
    }

    /// Drop the current row and append a zeroed one.
    pub fn advance_row(&mut self) {
        self.rows.rotate_left(1);
        if let Some(last) = self.rows.last_mut() {
            last.fill([0.0; 3]);
        }
    }
}

/// Error diffusion ditherer.
///
/// The scan is sequential: each pixel depends on the error left by the
/// pixels before it.
#[derive(Debug, Clone)]
pub struct Ditherer {
    options: DitherOptions,
}

impl Ditherer {
    /// Create a ditherer, validating the options.
    ///
    /// # Errors
    ///
    /// See [`DitherOptions::validate`].
    pub fn new(options: DitherOptions) -> Result<Self, QuantError> {
        options.validate()?;
        Ok(Self { options })
    }

    /// The ditherer's options.
    pub fn options(&self) -> &DitherOptions {
        &self.options
    }

    /// Dither `raster` to palette indices, one per pixel in row-major order.
    ///
    /// # Errors
    ///
    /// [`QuantError::InvalidParameter`] if the palette is empty.
    pub fn dither_indices(&self, raster: &Raster, palette: &Palette) -> Result<Vec<u8>, QuantError> {
        if palette.is_empty() {
            return Err(QuantError::invalid(Stage::Dither, "palette cannot be empty"));
        }

        debug!(
            width = raster.width(),
            height = raster.height(),
            colors = palette.len(),
            kernel = %self.options.kernel,
            intensity = self.options.intensity,
            serpentine = self.options.serpentine,
            "dithering"
        );

        Ok(diffuse(raster, palette, &self.options))
    }

    /// Dither `raster`, returning palette colors with the source alpha.
    ///
    /// # Errors
    ///
    /// [`QuantError::InvalidParameter`] if the palette is empty.
    pub fn dither(&self, raster: &Raster, palette: &Palette) -> Result<Raster, QuantError> {
        let indices = self.dither_indices(raster, palette)?;
        let mut pixels = Vec::with_capacity(raster.pixels().len());
        for (src, &idx) in raster.colors().zip(&indices) {
            let chosen = palette.color(idx as usize);
            pixels.extend_from_slice(&[chosen.r, chosen.g, chosen.b, src.a]);
        }
        Ok(raster.with_pixels(pixels))
    }
}

/// Core error diffusion loop.
fn diffuse(raster: &Raster, palette: &Palette, options: &DitherOptions) -> Vec<u8> {
    let width = raster.width();
    let height = raster.height();
    let pixels = raster.pixels();
    let mut output = vec![0u8; width * height];

    let kernel = options.kernel.kernel().filter(|_| options.intensity > 0.0);
    let intensity = options.intensity;

    // Nearest entry per distinct working color, Lab computed once per key
    let mut nearest_cache: HashMap<u32, u8> = HashMap::new();
    let mut error_buf = ErrorBuffer::new(width, kernel.map_or(1, |k| k.max_dy + 1));

    for y in 0..height {
        let reverse = options.serpentine && y % 2 == 1;

        let x_range: Box<dyn Iterator<Item = usize>> = if reverse {
            Box::new((0..width).rev())
        } else {
            Box::new(0..width)
        };

        for x in x_range {
            let idx = y * width + x;
            let px = &pixels[idx * 4..idx * 4 + 3];

            let accumulated = error_buf.get_accumulated(x);
            // Unclamped; overshoot past the channel range is carried forward
            let working = [
                px[0] as f32 + accumulated[0],
                px[1] as f32 + accumulated[1],
                px[2] as f32 + accumulated[2],
            ];

            let lookup = Color::from_f32_clamped(working[0], working[1], working[2], 255.0);
            let nearest = *nearest_cache
                .entry(lookup.rgb_key())
                .or_insert_with(|| palette.find_nearest(Lab::from(lookup)).0 as u8);
            output[idx] = nearest;

            let Some(kernel) = kernel else {
                continue;
            };

            let chosen = palette.color(nearest as usize);
            let error = [
                (working[0] - chosen.r as f32) * intensity,
                (working[1] - chosen.g as f32) * intensity,
                (working[2] - chosen.b as f32) * intensity,
            ];

            spread_error(&mut error_buf, kernel, x, height - y, reverse, error);
        }

        error_buf.advance_row();
    }

    output
}

/// Distribute `error` from pixel `x` of the current row over the kernel's
/// taps. `rows_left` counts the current row; taps past it or outside the
/// row are dropped. Reverse rows mirror the horizontal offsets.
fn spread_error(
    error_buf: &mut ErrorBuffer,
    kernel: &Kernel,
    x: usize,
    rows_left: usize,
    reverse: bool,
    error: [f32; 3],
) {
    let divisor = kernel.divisor as f32;
    for &(dx, dy, weight) in kernel.entries {
        let effective_dx = if reverse { -dx } else { dx };
        let nx = x as i32 + effective_dx;

        if nx >= 0 && (nx as usize) < error_buf.width && (dy as usize) < rows_left {
            let share = weight as f32 / divisor;
            error_buf.add_error(
                nx as usize,
                dy as usize,
                [error[0] * share, error[1] * share, error[2] * share],
            );
        }
    }
}

// Generated LUT tables and per-channel index loops
#![allow(
    clippy::excessive_precision,
    clippy::needless_range_loop,
    clippy::module_inception
)]

//! embroidery-quant: palette reduction for embroidery artwork
//!
//! This library turns a photograph into a raster of a few thread colors:
//! noise is smoothed away while edges are kept, the colors are reduced to a
//! small palette with room for distinct hues, and the remaining color error
//! is spread by error diffusion so the result still reads like the source.
//!
//! # Quick Start
//!
//! The [`Pipeline`] runs every stage in one call:
//!
//! ```
//! use embroidery_quant::{Color, Pipeline, PipelineParams, QuantizationParameters, Raster};
//!
//! let params = PipelineParams {
//!     quantization: QuantizationParameters::new(8),
//!     ..PipelineParams::default()
//! };
//!
//! let raster = Raster::filled(16, 16, Color::rgb(30, 90, 160));
//! let output = Pipeline::new(params).run(&raster).unwrap();
//!
//! assert_eq!(output.final_raster.width(), 16);
//! assert!(output.palette.len() <= 8);
//! ```
//!
//! # Stages
//!
//! ```text
//! RGBA8 raster
//!     |
//!     v
//! BilateralFilter          (spatial x RGB-similarity weights, rows in parallel)
//!     |
//!     +---> PaletteBuilder (histogram -> hue slots -> median cut -> k-means)
//!     |         |
//!     v         v
//! Ditherer  <-- Palette    (Lab nearest match, RGB error diffusion)
//!     |
//!     v
//! final raster
//! ```
//!
//! Each stage can also be used on its own: [`BilateralFilter`],
//! [`PaletteBuilder`] and [`Ditherer`] take a [`Raster`] and return a new
//! value. A [`Palette`] can be kept and applied to another raster with
//! [`Pipeline::apply_palette`].
//!
//! # Color Spaces
//!
//! Pixels stay 8-bit sRGB [`Color`] values end to end. CIE [`Lab`] (D65) is
//! used only to compare colors: palette matching, median cut partitioning
//! and hue sectors. Diffused error lives in float RGB, because it is added
//! back onto RGB pixels.
//!
//! # Dithering Kernels
//!
//! Eight choices via [`DitherKernel`]: plain nearest-color mapping (`None`),
//! Floyd-Steinberg (default), Atkinson (75% propagation), Burkes, Stucki,
//! and the Sierra family (three-row, two-row, lite). Serpentine scanning and
//! an error intensity factor are set on [`DitherOptions`].
//!
//! # Cancellation
//!
//! [`Pipeline::run_with`] checks a [`CancelToken`] before each stage. A
//! cancelled run yields [`QuantError::Cancelled`] and no partial output.

pub mod api;
pub mod color;
pub mod dither;
pub mod filter;
pub mod palette;
pub mod raster;

#[cfg(test)]
mod domain_tests;

pub use api::{CancelToken, Pipeline, PipelineOutput, PipelineParams, QuantError, Stage};
pub use color::{Color, Lab};
pub use dither::{DitherKernel, DitherOptions, Ditherer};
pub use filter::{BilateralFilter, FilterParameters};
pub use palette::{
    ColorHistogram, Palette, PaletteBuilder, PaletteError, ParseColorError,
    QuantizationParameters,
};
pub use raster::Raster;

//! Stitchquant - reduce photos to embroidery thread palettes
//!
//! Application layer around `embroidery-quant`: PNG I/O, configuration and
//! presets, palette export and the background pipeline worker.
//! This library exposes modules for integration testing.

pub mod error;
pub mod models;
pub mod rendering;
pub mod services;

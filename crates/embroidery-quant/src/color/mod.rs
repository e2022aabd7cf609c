//! Color types and conversion utilities
//!
//! Pixels travel through the pipeline as 8-bit RGBA [`Color`] values. CIE
//! [`Lab`] is used only for perceptual comparisons: nearest palette entry
//! lookups, palette partitioning and hue classification.
//!
//! # Example
//!
//! ```
//! use embroidery_quant::{Color, Lab};
//!
//! let red = Color::rgb(255, 0, 0);
//! let lab = Lab::from(red);
//! assert!(lab.l > 50.0 && lab.a > 70.0);
//!
//! // Distance is symmetric and zero only for identical RGB
//! let orange = Color::rgb(255, 128, 0);
//! assert_eq!(red.distance(orange), orange.distance(red));
//! assert_eq!(red.distance(red), 0.0);
//! ```

mod lab;
mod lut;
mod rgba;

pub use lab::Lab;
pub use rgba::Color;

//! 8-bit RGBA color type
//!
//! [`Color`] is the pixel and palette-entry type of the crate. Equality covers
//! all four channels; perceptual comparisons ignore alpha.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::lab::Lab;
use crate::palette::ParseColorError;

/// An 8-bit sRGB color with alpha.
///
/// Channels are stored as bytes, so every value is already within
/// `0..=255`. Float inputs (filter averages, error-diffused working values)
/// enter through [`Color::from_f32_clamped`], which rounds and clamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
    /// Alpha channel (255 = opaque)
    #[serde(default = "opaque")]
    pub a: u8,
}

fn opaque() -> u8 {
    255
}

impl Color {
    /// Create a color from all four channels.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color.
    ///
    /// # Example
    /// ```
    /// use embroidery_quant::Color;
    /// let red = Color::rgb(255, 0, 0);
    /// assert_eq!(red.a, 255);
    /// ```
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Create a color from float channels, rounding to nearest and clamping
    /// each channel to `0..=255`.
    ///
    /// # Example
    /// ```
    /// use embroidery_quant::Color;
    /// let c = Color::from_f32_clamped(300.0, -4.0, 127.5, 254.4);
    /// assert_eq!(c, Color::new(255, 0, 128, 254));
    /// ```
    #[inline]
    pub fn from_f32_clamped(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            r: clamp_round(r),
            g: clamp_round(g),
            b: clamp_round(b),
            a: clamp_round(a),
        }
    }

    /// Create a color from an RGBA byte slice of length 4.
    #[inline]
    pub fn from_rgba_slice(px: &[u8]) -> Self {
        Self::new(px[0], px[1], px[2], px[3])
    }

    /// Channels as `[r, g, b, a]`.
    #[inline]
    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// The same color made fully opaque.
    #[inline]
    pub fn opaque(self) -> Self {
        Self { a: 255, ..self }
    }

    /// The same RGB with a different alpha.
    #[inline]
    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Pack the RGB channels into `0xRRGGBB`, used as histogram and cache key.
    #[inline]
    pub fn rgb_key(self) -> u32 {
        (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    /// Inverse of [`rgb_key`](Self::rgb_key); the result is opaque.
    #[inline]
    pub fn from_rgb_key(key: u32) -> Self {
        Self::rgb((key >> 16) as u8, (key >> 8) as u8, key as u8)
    }

    /// True if the RGB channels match, whatever the alpha.
    #[inline]
    pub fn same_rgb(self, other: Color) -> bool {
        self.rgb_key() == other.rgb_key()
    }

    /// Convert to CIE Lab (D65).
    #[inline]
    pub fn to_lab(self) -> Lab {
        Lab::from(self)
    }

    /// Perceptual distance: Euclidean distance in CIE Lab.
    ///
    /// Symmetric, non-negative and zero iff the RGB channels are identical.
    /// Alpha is ignored.
    #[inline]
    pub fn distance(self, other: Color) -> f32 {
        self.to_lab().distance(other.to_lab())
    }

    /// Lowercase `#rrggbb` hex representation.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[inline]
fn clamp_round(v: f32) -> u8 {
    if v.is_nan() {
        return 0;
    }
    v.round().clamp(0.0, 255.0) as u8
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = ParseColorError;

    /// Parse an opaque color from a hex string.
    ///
    /// Supports `#RRGGBB`, `RRGGBB`, `#RGB` and `RGB`. Parsing is
    /// case-insensitive and surrounding whitespace is trimmed.
    ///
    /// ```
    /// use embroidery_quant::Color;
    ///
    /// let white: Color = "#FFFFFF".parse().unwrap();
    /// assert_eq!(white, Color::rgb(255, 255, 255));
    ///
    /// let red: Color = "#F00".parse().unwrap();
    /// assert_eq!(red, Color::rgb(255, 0, 0));
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s.strip_prefix('#').unwrap_or(s);

        if !s.is_ascii() {
            return Err(ParseColorError::InvalidLength);
        }

        match s.len() {
            3 => {
                // Shorthand: expand each digit by multiplying by 17 (0xF -> 0xFF)
                let r = u8::from_str_radix(&s[0..1], 16)? * 17;
                let g = u8::from_str_radix(&s[1..2], 16)? * 17;
                let b = u8::from_str_radix(&s[2..3], 16)? * 17;
                Ok(Self::rgb(r, g, b))
            }
            6 => {
                let r = u8::from_str_radix(&s[0..2], 16)?;
                let g = u8::from_str_radix(&s[2..4], 16)?;
                let b = u8::from_str_radix(&s[4..6], 16)?;
                Ok(Self::rgb(r, g, b))
            }
            _ => Err(ParseColorError::InvalidLength),
        }
    }
}

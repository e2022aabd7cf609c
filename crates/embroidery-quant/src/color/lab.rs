//! CIE L*a*b* color space
//!
//! Lab is the perceptual comparison space of the crate. Euclidean distance
//! between two Lab colors (CIE76 ΔE) approximates how different they look,
//! which is what palette matching and palette partitioning need.
//!
//! # References
//!
//! CIE 15:2004, Colorimetry. sRGB primaries per IEC 61966-2-1, D65 white.

use super::lut::srgb8_to_linear;
use super::rgba::Color;

/// D65 reference white, X component.
const XN: f32 = 0.95047;
/// D65 reference white, Y component.
const YN: f32 = 1.0;
/// D65 reference white, Z component.
const ZN: f32 = 1.08883;

/// (6/29)^3
const EPSILON: f32 = 0.008856;
/// (29/6)^2 / 3
const KAPPA_SLOPE: f32 = 7.787;

/// A color in CIE L*a*b* space (D65).
///
/// # Components
///
/// - `l`: Lightness (0.0 = black, 100.0 = white)
/// - `a`: Green-red axis (negative = green, positive = red)
/// - `b`: Blue-yellow axis (negative = blue, positive = yellow)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Lab {
    /// Lightness: 0.0 (black) to 100.0 (white)
    pub l: f32,
    /// Green-red axis: roughly -128 to 127
    pub a: f32,
    /// Blue-yellow axis: roughly -128 to 127
    pub b: f32,
}

impl Lab {
    /// Create a new Lab color.
    #[inline]
    pub fn new(l: f32, a: f32, b: f32) -> Self {
        Self { l, a, b }
    }

    /// Squared Euclidean distance.
    ///
    /// Use squared distance to avoid sqrt when only comparing distances.
    ///
    /// ```
    /// use embroidery_quant::Lab;
    ///
    /// let white = Lab::new(100.0, 0.0, 0.0);
    /// let black = Lab::new(0.0, 0.0, 0.0);
    /// let gray = Lab::new(50.0, 0.0, 0.0);
    ///
    /// assert!((gray.distance_squared(black) - gray.distance_squared(white)).abs() < 1e-3);
    /// ```
    #[inline]
    pub fn distance_squared(self, other: Lab) -> f32 {
        let dl = self.l - other.l;
        let da = self.a - other.a;
        let db = self.b - other.b;
        dl * dl + da * da + db * db
    }

    /// Euclidean distance (CIE76 ΔE).
    #[inline]
    pub fn distance(self, other: Lab) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// Chroma: distance from the neutral axis.
    #[inline]
    pub fn chroma(self) -> f32 {
        (self.a * self.a + self.b * self.b).sqrt()
    }

    /// Hue angle in degrees, `0.0..360.0`.
    ///
    /// Meaningless for neutral colors; check [`chroma`](Self::chroma) first.
    #[inline]
    pub fn hue_degrees(self) -> f32 {
        let h = self.b.atan2(self.a).to_degrees();
        if h < 0.0 {
            h + 360.0
        } else {
            h
        }
    }
}

#[inline]
fn lab_f(t: f32) -> f32 {
    if t > EPSILON {
        t.cbrt()
    } else {
        KAPPA_SLOPE * t + 16.0 / 116.0
    }
}

impl From<Color> for Lab {
    /// sRGB -> linear (gamma LUT) -> XYZ -> Lab. Alpha is ignored.
    ///
    /// ```
    /// use embroidery_quant::{Color, Lab};
    ///
    /// let gray = Lab::from(Color::rgb(119, 119, 119));
    /// assert!(gray.a.abs() < 0.01 && gray.b.abs() < 0.01);
    /// ```
    fn from(color: Color) -> Self {
        let r = srgb8_to_linear(color.r);
        let g = srgb8_to_linear(color.g);
        let b = srgb8_to_linear(color.b);

        // Linear sRGB to XYZ, normalized by the reference white
        let x = (r * 0.4124 + g * 0.3576 + b * 0.1805) / XN;
        let y = (r * 0.2126 + g * 0.7152 + b * 0.0722) / YN;
        let z = (r * 0.0193 + g * 0.1192 + b * 0.9505) / ZN;

        let fx = lab_f(x);
        let fy = lab_f(y);
        let fz = lab_f(z);

        Self {
            l: 116.0 * fy - 16.0,
            a: 500.0 * (fx - fy),
            b: 200.0 * (fy - fz),
        }
    }
}

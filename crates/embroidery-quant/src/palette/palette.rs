//! Palette struct with precomputed Lab entries and nearest-color matching.

use std::collections::HashSet;
use std::str::FromStr;

use super::error::PaletteError;
use crate::color::{Color, Lab};

/// Largest palette an index byte can address.
pub const MAX_PALETTE_LEN: usize = 256;

/// An ordered, deduplicated set of opaque colors.
///
/// Entry order is the construction order and stays fixed for the life of the
/// value, so a retained palette dithers a second image reproducibly. Lab
/// coordinates are computed once at construction; per-pixel matching never
/// converts palette entries again.
///
/// # Example
///
/// ```
/// use embroidery_quant::{Color, Palette};
///
/// let palette = Palette::new(&[Color::rgb(0, 0, 0), Color::rgb(255, 255, 255)]).unwrap();
/// assert_eq!(palette.len(), 2);
/// assert_eq!(palette.color(1), Color::rgb(255, 255, 255));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<Color>,
    lab: Vec<Lab>,
}

impl Palette {
    /// Create a palette from colors. Alpha is discarded; entries are stored
    /// opaque.
    ///
    /// # Errors
    ///
    /// - [`PaletteError::EmptyPalette`] if `colors` is empty
    /// - [`PaletteError::TooManyColors`] above [`MAX_PALETTE_LEN`] entries
    /// - [`PaletteError::DuplicateColor`] if two entries share RGB values
    pub fn new(colors: &[Color]) -> Result<Self, PaletteError> {
        if colors.is_empty() {
            return Err(PaletteError::EmptyPalette);
        }
        if colors.len() > MAX_PALETTE_LEN {
            return Err(PaletteError::TooManyColors { len: colors.len() });
        }

        let mut seen = HashSet::with_capacity(colors.len());
        for (i, color) in colors.iter().enumerate() {
            if !seen.insert(color.rgb_key()) {
                return Err(PaletteError::DuplicateColor { index: i });
            }
        }

        let colors: Vec<Color> = colors.iter().map(|c| c.opaque()).collect();
        let lab = colors.iter().map(|&c| Lab::from(c)).collect();

        Ok(Self { colors, lab })
    }

    /// Create a palette from hex color strings such as `"#FF0000"` or `"#F00"`.
    ///
    /// # Errors
    ///
    /// Returns [`PaletteError::ParseColor`] if any string is invalid, or the
    /// validation errors of [`Palette::new`].
    ///
    /// ```
    /// use embroidery_quant::Palette;
    ///
    /// let palette = Palette::from_hex(&["#000000", "#FFFFFF", "#F00"]).unwrap();
    /// assert_eq!(palette.len(), 3);
    /// ```
    pub fn from_hex(colors: &[&str]) -> Result<Self, PaletteError> {
        let parsed = colors
            .iter()
            .map(|s| Color::from_str(s).map_err(PaletteError::ParseColor))
            .collect::<Result<Vec<_>, _>>()?;
        Palette::new(&parsed)
    }

    /// Returns the number of colors in the palette.
    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Returns true if the palette is empty.
    ///
    /// Construction rejects empty palettes, so this is false for any value
    /// built through [`Palette::new`].
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Color at `idx`.
    #[inline]
    pub fn color(&self, idx: usize) -> Color {
        self.colors[idx]
    }

    /// All entries in palette order.
    #[inline]
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// True if some entry has the same RGB as `color`.
    pub fn contains(&self, color: Color) -> bool {
        self.colors.iter().any(|c| c.same_rgb(color))
    }

    /// Find the palette entry nearest to a Lab color.
    ///
    /// Returns `(index, squared distance)`. Ties resolve to the lowest index:
    /// an entry only wins on a strictly smaller distance.
    ///
    /// ```
    /// use embroidery_quant::{Color, Lab, Palette};
    ///
    /// let palette = Palette::new(&[Color::rgb(0, 0, 0), Color::rgb(255, 255, 255)]).unwrap();
    /// let (idx, _) = palette.find_nearest(Lab::from(Color::rgb(40, 40, 40)));
    /// assert_eq!(idx, 0);
    /// ```
    #[inline]
    pub fn find_nearest(&self, color: Lab) -> (usize, f32) {
        nearest_index(&self.lab, color)
    }

    /// Nearest palette color to an RGB color (alpha ignored).
    #[inline]
    pub fn nearest_color(&self, color: Color) -> Color {
        let (idx, _) = self.find_nearest(Lab::from(color));
        self.colors[idx]
    }
}

/// Index of the entry nearest to `color` and its squared distance.
///
/// Linear scan (at most 256 entries). An entry only wins on a strictly
/// smaller distance, so ties go to the lowest index.
pub(crate) fn nearest_index(entries: &[Lab], color: Lab) -> (usize, f32) {
    let mut best_idx = 0;
    let mut best_dist = f32::MAX;

    for (i, &entry) in entries.iter().enumerate() {
        let dist = color.distance_squared(entry);
        if dist < best_dist {
            best_dist = dist;
            best_idx = i;
        }
    }

    (best_idx, best_dist)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_basic_construction() {
        let colors = [
            Color::rgb(0, 0, 0),
            Color::rgb(255, 255, 255),
            Color::rgb(255, 0, 0),
        ];
        let palette = Palette::new(&colors).unwrap();
        assert_eq!(palette.len(), 3);
        assert!(!palette.is_empty());
        assert_eq!(palette.colors(), &colors);
    }

    #[test]
    fn test_palette_stores_opaque_entries() {
        let palette = Palette::new(&[Color::new(10, 20, 30, 7)]).unwrap();
        assert_eq!(palette.color(0), Color::rgb(10, 20, 30));
    }

    #[test]
    fn test_palette_empty_error() {
        assert!(matches!(Palette::new(&[]), Err(PaletteError::EmptyPalette)));
    }

    #[test]
    fn test_palette_duplicate_error() {
        let colors = [
            Color::rgb(255, 0, 0),
            Color::rgb(0, 255, 0),
            Color::new(255, 0, 0, 12), // same RGB, different alpha
        ];
        assert!(matches!(
            Palette::new(&colors),
            Err(PaletteError::DuplicateColor { index: 2 })
        ));
    }

    #[test]
    fn test_palette_too_many_colors() {
        let colors: Vec<Color> = (0..257u32).map(|i| Color::from_rgb_key(i * 1000)).collect();
        assert!(matches!(
            Palette::new(&colors),
            Err(PaletteError::TooManyColors { len: 257 })
        ));
        assert!(Palette::new(&colors[..256]).is_ok());
    }

    #[test]
    fn test_find_nearest_exact_match() {
        let palette = Palette::new(&[Color::rgb(0, 0, 0), Color::rgb(255, 255, 255)]).unwrap();
        let (idx, dist) = palette.find_nearest(Lab::from(Color::rgb(255, 255, 255)));
        assert_eq!(idx, 1);
        assert!(dist < 1e-6);
    }

    #[test]
    fn test_find_nearest_chromatic() {
        let palette = Palette::new(&[
            Color::rgb(0, 0, 0),
            Color::rgb(255, 255, 255),
            Color::rgb(220, 20, 20),
            Color::rgb(20, 40, 200),
        ])
        .unwrap();
        assert_eq!(palette.nearest_color(Color::rgb(250, 60, 50)), Color::rgb(220, 20, 20));
        assert_eq!(palette.nearest_color(Color::rgb(10, 10, 150)), Color::rgb(20, 40, 200));
    }

    #[test]
    fn test_nearest_index_tie_prefers_lowest_index() {
        let entries = [
            Lab::new(10.0, 0.0, 0.0),
            Lab::new(30.0, 0.0, 0.0),
            Lab::new(20.0, 10.0, 0.0),
        ];
        // Exactly 100.0 from all three entries
        let (idx, dist) = nearest_index(&entries, Lab::new(20.0, 0.0, 0.0));
        assert_eq!(idx, 0);
        assert_eq!(dist, 100.0);

        let reversed = [entries[1], entries[0]];
        let (idx, _) = nearest_index(&reversed, Lab::new(20.0, 0.0, 0.0));
        assert_eq!(idx, 0);
    }

    #[test]
    fn test_from_hex() {
        let palette = Palette::from_hex(&["#000000", "#FFF"]).unwrap();
        assert_eq!(palette.color(1), Color::rgb(255, 255, 255));

        assert!(matches!(
            Palette::from_hex(&["#000000", "#XYZ"]),
            Err(PaletteError::ParseColor(_))
        ));
    }

    #[test]
    fn test_contains() {
        let palette = Palette::new(&[Color::rgb(1, 2, 3)]).unwrap();
        assert!(palette.contains(Color::new(1, 2, 3, 0)));
        assert!(!palette.contains(Color::rgb(3, 2, 1)));
    }
}

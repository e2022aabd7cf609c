//! Palette construction parameters.

use serde::{Deserialize, Serialize};

use super::palette::MAX_PALETTE_LEN;
use crate::api::{QuantError, Stage};

/// Smallest palette worth building.
pub const MIN_COLOR_COUNT: usize = 2;

/// Dithering intensity ceiling applied to small embroidery palettes.
pub const EMBROIDERY_INTENSITY_CAP: f32 = 0.05;

/// Palettes at or below this size get the intensity cap.
const EMBROIDERY_CAP_MAX_COLORS: usize = 16;

/// Parameters for [`PaletteBuilder`](super::PaletteBuilder).
///
/// # Defaults
///
/// - `color_count`: 16
/// - `min_hue_colors`: 2
/// - `embroidery_optimized`: true
///
/// # Example
///
/// ```
/// use embroidery_quant::QuantizationParameters;
///
/// let params = QuantizationParameters::new(32).embroidery_optimized(true);
/// assert_eq!(params.effective_min_hue_colors(), 4);
/// assert_eq!(params.intensity_cap(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuantizationParameters {
    /// Number of palette entries to produce, `2..=256`.
    pub color_count: usize,

    /// Hue sectors that each reserve one palette slot.
    ///
    /// Overridden when `embroidery_optimized` is set.
    pub min_hue_colors: usize,

    /// Tune the palette and the dithering strength for thread work.
    ///
    /// Forces `min_hue_colors = max(2, color_count / 8)` and caps the
    /// dithering intensity at 0.05 for palettes of 16 colors or fewer.
    /// Serpentine scanning is not changed; set it on `DitherOptions`.
    pub embroidery_optimized: bool,
}

impl Default for QuantizationParameters {
    fn default() -> Self {
        Self {
            color_count: 16,
            min_hue_colors: 2,
            embroidery_optimized: true,
        }
    }
}

impl QuantizationParameters {
    /// Default parameters with the given color count.
    #[inline]
    pub fn new(color_count: usize) -> Self {
        Self {
            color_count,
            ..Self::default()
        }
    }

    /// Set the number of hue-reserved slots.
    #[inline]
    pub fn min_hue_colors(mut self, count: usize) -> Self {
        self.min_hue_colors = count;
        self
    }

    /// Enable or disable embroidery optimization.
    #[inline]
    pub fn embroidery_optimized(mut self, enabled: bool) -> Self {
        self.embroidery_optimized = enabled;
        self
    }

    /// Check the parameters before any pixel work.
    ///
    /// # Errors
    ///
    /// [`QuantError::InvalidParameter`] if `color_count` is outside `2..=256`.
    pub fn validate(&self) -> Result<(), QuantError> {
        if !(MIN_COLOR_COUNT..=MAX_PALETTE_LEN).contains(&self.color_count) {
            return Err(QuantError::invalid(
                Stage::Palette,
                format!(
                    "color_count must be in {MIN_COLOR_COUNT}..={MAX_PALETTE_LEN}, got {}",
                    self.color_count
                ),
            ));
        }
        Ok(())
    }

    /// Hue sectors actually reserved, after embroidery optimization.
    pub fn effective_min_hue_colors(&self) -> usize {
        if self.embroidery_optimized {
            (self.color_count / 8).max(2)
        } else {
            self.min_hue_colors
        }
    }

    /// Upper bound on dithering intensity, if these parameters impose one.
    pub fn intensity_cap(&self) -> Option<f32> {
        (self.embroidery_optimized && self.color_count <= EMBROIDERY_CAP_MAX_COLORS)
            .then_some(EMBROIDERY_INTENSITY_CAP)
    }
}

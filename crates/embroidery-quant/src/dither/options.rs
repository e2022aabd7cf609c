//! Dithering options and kernel selection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::kernel::{self, Kernel};
use crate::api::{QuantError, Stage};

/// Error diffusion kernel selection.
///
/// Parses case-insensitively from names such as `floyd-steinberg`,
/// `FloydSteinberg`, `sierra_lite` or `none`.
///
/// ```
/// use embroidery_quant::DitherKernel;
///
/// let kernel: DitherKernel = "Sierra-Lite".parse().unwrap();
/// assert_eq!(kernel, DitherKernel::SierraLite);
/// assert_eq!(kernel.to_string(), "sierra-lite");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DitherKernel {
    /// Plain nearest-color mapping, no diffusion.
    None,
    /// Floyd-Steinberg (4 taps, 100%).
    #[default]
    FloydSteinberg,
    /// Atkinson (6 taps, 75%).
    Atkinson,
    /// Burkes (7 taps over 2 rows).
    Burkes,
    /// Stucki (12 taps over 3 rows).
    Stucki,
    /// Sierra two-row.
    Sierra2,
    /// Sierra three-row.
    Sierra3,
    /// Sierra Lite (3 taps).
    SierraLite,
}

impl DitherKernel {
    /// Every kernel, in declaration order.
    pub const ALL: [DitherKernel; 8] = [
        DitherKernel::None,
        DitherKernel::FloydSteinberg,
        DitherKernel::Atkinson,
        DitherKernel::Burkes,
        DitherKernel::Stucki,
        DitherKernel::Sierra2,
        DitherKernel::Sierra3,
        DitherKernel::SierraLite,
    ];

    /// Diffusion matrix, or `None` for nearest-color mapping.
    pub fn kernel(self) -> Option<&'static Kernel> {
        match self {
            DitherKernel::None => None,
            DitherKernel::FloydSteinberg => Some(&kernel::FLOYD_STEINBERG),
            DitherKernel::Atkinson => Some(&kernel::ATKINSON),
            DitherKernel::Burkes => Some(&kernel::BURKES),
            DitherKernel::Stucki => Some(&kernel::STUCKI),
            DitherKernel::Sierra2 => Some(&kernel::SIERRA2),
            DitherKernel::Sierra3 => Some(&kernel::SIERRA3),
            DitherKernel::SierraLite => Some(&kernel::SIERRA_LITE),
        }
    }

    /// Canonical kebab-case name.
    pub fn name(self) -> &'static str {
        match self {
            DitherKernel::None => "none",
            DitherKernel::FloydSteinberg => "floyd-steinberg",
            DitherKernel::Atkinson => "atkinson",
            DitherKernel::Burkes => "burkes",
            DitherKernel::Stucki => "stucki",
            DitherKernel::Sierra2 => "sierra2",
            DitherKernel::Sierra3 => "sierra3",
            DitherKernel::SierraLite => "sierra-lite",
        }
    }
}

impl fmt::Display for DitherKernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown kernel name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown dither kernel '{0}'")]
pub struct ParseKernelError(pub String);

impl FromStr for DitherKernel {
    type Err = ParseKernelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .map(|c| c.to_ascii_lowercase())
            .collect();

        DitherKernel::ALL
            .into_iter()
            .find(|k| k.name().replace('-', "") == folded)
            .ok_or_else(|| ParseKernelError(s.to_string()))
    }
}

/// Configuration for [`Ditherer`](super::Ditherer).
///
/// # Defaults
///
/// - kernel: Floyd-Steinberg
/// - intensity: 1.0 (full error propagation)
/// - serpentine: enabled
///
/// # Example
///
/// ```
/// use embroidery_quant::{DitherKernel, DitherOptions};
///
/// let options = DitherOptions::new()
///     .kernel(DitherKernel::Atkinson)
///     .intensity(0.5)
///     .serpentine(false);
/// assert!(options.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DitherOptions {
    /// Diffusion kernel.
    pub kernel: DitherKernel,

    /// Scale applied to the quantization error before diffusion, `0.0..=1.0`.
    ///
    /// 0 disables diffusion while keeping nearest-color mapping.
    pub intensity: f32,

    /// Alternate row direction: odd rows run right-to-left with the kernel
    /// mirrored horizontally.
    pub serpentine: bool,
}

impl Default for DitherOptions {
    fn default() -> Self {
        Self {
            kernel: DitherKernel::FloydSteinberg,
            intensity: 1.0,
            serpentine: true,
        }
    }
}

impl DitherOptions {
    /// Create new dither options with default values.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the kernel.
    #[inline]
    pub fn kernel(mut self, kernel: DitherKernel) -> Self {
        self.kernel = kernel;
        self
    }

    /// Set the error intensity.
    #[inline]
    pub fn intensity(mut self, intensity: f32) -> Self {
        self.intensity = intensity;
        self
    }

    /// Set serpentine scanning mode.
    #[inline]
    pub fn serpentine(mut self, enabled: bool) -> Self {
        self.serpentine = enabled;
        self
    }

    /// Lower the intensity to `cap` if one is given.
    pub fn with_intensity_cap(mut self, cap: Option<f32>) -> Self {
        if let Some(cap) = cap {
            self.intensity = self.intensity.min(cap);
        }
        self
    }

    /// Check the options before any pixel work.
    ///
    /// # Errors
    ///
    /// [`QuantError::InvalidParameter`] if `intensity` is not within
    /// `0.0..=1.0`.
    pub fn validate(&self) -> Result<(), QuantError> {
        if !(0.0..=1.0).contains(&self.intensity) {
            return Err(QuantError::invalid(
                Stage::Dither,
                format!("intensity must be in 0..=1, got {}", self.intensity),
            ));
        }
        Ok(())
    }
}

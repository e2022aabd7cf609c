//! Unified error type for the embroidery-quant public API.
//!
//! [`QuantError`] carries every failure the pipeline can surface, tagged
//! with the [`Stage`] it originated from, for convenient `?` propagation in
//! application code.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::palette::{PaletteError, ParseColorError};

/// Pipeline stage, used to attribute errors and progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Raster construction and input checks
    Input,
    /// Bilateral filtering
    Filter,
    /// Palette construction
    Palette,
    /// Error-diffusion dithering
    Dither,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Input => "input",
            Stage::Filter => "filter",
            Stage::Palette => "palette",
            Stage::Dither => "dither",
        };
        f.write_str(name)
    }
}

/// Unified error type for the embroidery-quant public API.
///
/// # Example
///
/// ```
/// use embroidery_quant::{Palette, QuantError};
///
/// fn create_palette() -> Result<Palette, QuantError> {
///     let palette = Palette::from_hex(&["#000000", "#FFFFFF"])?;
///     Ok(palette)
/// }
/// # assert!(create_palette().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuantError {
    /// A parameter or input was rejected before any pixel work started.
    #[error("invalid {stage} parameter: {reason}")]
    InvalidParameter {
        /// Stage whose contract was violated
        stage: Stage,
        /// Human-readable reason
        reason: String,
    },

    /// Cooperative cancellation, observed before `stage` started.
    #[error("cancelled before {stage} stage")]
    Cancelled {
        /// Stage that did not run
        stage: Stage,
    },

    /// The computation exceeded its time budget and was abandoned.
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

impl QuantError {
    /// Shorthand for [`QuantError::InvalidParameter`].
    pub fn invalid(stage: Stage, reason: impl Into<String>) -> Self {
        QuantError::InvalidParameter {
            stage,
            reason: reason.into(),
        }
    }

    /// Stage the error originated from, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            QuantError::InvalidParameter { stage, .. } | QuantError::Cancelled { stage } => {
                Some(*stage)
            }
            QuantError::Timeout(_) => None,
        }
    }

    /// True for the cooperative abort outcomes (cancel and timeout).
    pub fn is_aborted(&self) -> bool {
        matches!(self, QuantError::Cancelled { .. } | QuantError::Timeout(_))
    }
}

impl From<PaletteError> for QuantError {
    fn from(err: PaletteError) -> Self {
        QuantError::invalid(Stage::Palette, err.to_string())
    }
}

impl From<ParseColorError> for QuantError {
    fn from(err: ParseColorError) -> Self {
        QuantError::invalid(Stage::Palette, err.to_string())
    }
}

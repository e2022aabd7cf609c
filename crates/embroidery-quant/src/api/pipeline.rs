//! Pipeline -- the primary entry point for the crate.
//!
//! [`Pipeline`] runs the stages in order (validate, bilateral filter,
//! palette construction, dithering) and checks a [`CancelToken`] between
//! stages. A cancelled run returns [`QuantError::Cancelled`] and no partial
//! output.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::error::{QuantError, Stage};
use crate::dither::{DitherOptions, Ditherer};
use crate::filter::{BilateralFilter, FilterParameters};
use crate::palette::{Palette, PaletteBuilder, QuantizationParameters};
use crate::raster::Raster;

/// Shared cooperative cancellation flag.
///
/// Clones share the flag; cancelling any clone cancels them all.
///
/// ```
/// use embroidery_quant::CancelToken;
///
/// let token = CancelToken::new();
/// let handle = token.clone();
/// handle.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// True once [`cancel`](Self::cancel) was called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn check(&self, next: Stage) -> Result<(), QuantError> {
        if self.is_cancelled() {
            debug!(stage = %next, "pipeline cancelled");
            return Err(QuantError::Cancelled { stage: next });
        }
        Ok(())
    }
}

/// Everything a pipeline run needs besides the raster.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineParams {
    /// Bilateral filter parameters
    pub filter: FilterParameters,
    /// Palette construction parameters
    pub quantization: QuantizationParameters,
    /// Dithering options, before the embroidery intensity cap
    pub dither: DitherOptions,
}

impl PipelineParams {
    /// Validate every stage's parameters.
    ///
    /// # Errors
    ///
    /// The first [`QuantError::InvalidParameter`] found, filter first.
    pub fn validate(&self) -> Result<(), QuantError> {
        self.filter.validate()?;
        self.quantization.validate()?;
        self.dither.validate()
    }

    /// Dither options with the quantization intensity cap applied.
    pub fn effective_dither(&self) -> DitherOptions {
        self.dither
            .clone()
            .with_intensity_cap(self.quantization.intensity_cap())
    }
}

/// Result of a pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    /// Bilateral filter output
    pub filtered: Raster,
    /// Palette the final raster was dithered against
    pub palette: Palette,
    /// Dithered raster; every pixel is a palette color
    pub final_raster: Raster,
    /// Wall time of the run
    pub elapsed: Duration,
}

impl PipelineOutput {
    /// Processing time in milliseconds.
    pub fn processing_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }
}

/// Bilateral filter, palette construction and dithering in one call.
///
/// Reusable: `run` takes `&self`, and identical inputs give identical
/// outputs (apart from `elapsed`).
///
/// # Example
///
/// ```
/// use embroidery_quant::{Color, Pipeline, PipelineParams, QuantizationParameters, Raster};
///
/// let params = PipelineParams {
///     quantization: QuantizationParameters::new(2),
///     ..PipelineParams::default()
/// };
/// let raster = Raster::filled(2, 2, Color::rgb(255, 0, 0));
/// let output = Pipeline::new(params).run(&raster).unwrap();
///
/// assert_eq!(output.palette.colors(), &[Color::rgb(255, 0, 0)]);
/// assert_eq!(output.final_raster, raster);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    params: PipelineParams,
}

impl Pipeline {
    /// Create a pipeline. Parameters are validated when it runs.
    pub fn new(params: PipelineParams) -> Self {
        Self { params }
    }

    /// The pipeline's parameters.
    pub fn params(&self) -> &PipelineParams {
        &self.params
    }

    /// Run all stages.
    ///
    /// # Errors
    ///
    /// [`QuantError::InvalidParameter`] for bad parameters or an empty raster.
    pub fn run(&self, raster: &Raster) -> Result<PipelineOutput, QuantError> {
        self.run_with(raster, &CancelToken::new(), |_| {})
    }

    /// Run all stages, checking `cancel` before each one and reporting each
    /// completed stage to `on_stage`.
    ///
    /// # Errors
    ///
    /// As [`run`](Self::run), plus [`QuantError::Cancelled`] naming the
    /// stage that did not start.
    pub fn run_with(
        &self,
        raster: &Raster,
        cancel: &CancelToken,
        mut on_stage: impl FnMut(Stage),
    ) -> Result<PipelineOutput, QuantError> {
        let start = Instant::now();

        self.params.validate()?;
        check_raster(raster)?;
        let filter = BilateralFilter::new(self.params.filter.clone())?;
        let builder = PaletteBuilder::new(self.params.quantization.clone());
        let ditherer = Ditherer::new(self.params.effective_dither())?;

        cancel.check(Stage::Filter)?;
        let filtered = filter.apply(raster);
        on_stage(Stage::Filter);

        cancel.check(Stage::Palette)?;
        let palette = builder.build(&filtered)?;
        on_stage(Stage::Palette);

        cancel.check(Stage::Dither)?;
        let final_raster = ditherer.dither(&filtered, &palette)?;
        on_stage(Stage::Dither);

        let elapsed = start.elapsed();
        info!(
            width = raster.width(),
            height = raster.height(),
            colors = palette.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "pipeline complete"
        );

        Ok(PipelineOutput {
            filtered,
            palette,
            final_raster,
            elapsed,
        })
    }

    /// Filter `raster` and dither it against a retained `palette`, skipping
    /// palette construction.
    ///
    /// # Errors
    ///
    /// As [`run_with`](Self::run_with); palette construction errors cannot
    /// occur.
    pub fn apply_palette(
        &self,
        raster: &Raster,
        palette: &Palette,
        cancel: &CancelToken,
    ) -> Result<PipelineOutput, QuantError> {
        let start = Instant::now();

        self.params.filter.validate()?;
        self.params.dither.validate()?;
        check_raster(raster)?;
        let filter = BilateralFilter::new(self.params.filter.clone())?;
        let ditherer = Ditherer::new(self.params.effective_dither())?;

        cancel.check(Stage::Filter)?;
        let filtered = filter.apply(raster);

        cancel.check(Stage::Dither)?;
        let final_raster = ditherer.dither(&filtered, palette)?;

        let elapsed = start.elapsed();
        info!(
            width = raster.width(),
            height = raster.height(),
            colors = palette.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "palette applied"
        );

        Ok(PipelineOutput {
            filtered,
            palette: palette.clone(),
            final_raster,
            elapsed,
        })
    }
}

fn check_raster(raster: &Raster) -> Result<(), QuantError> {
    if raster.is_empty() {
        return Err(QuantError::invalid(Stage::Input, "raster has no pixels"));
    }
    Ok(())
}

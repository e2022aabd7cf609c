//! Bilateral filter parameters.

use serde::{Deserialize, Serialize};

use crate::api::{QuantError, Stage};

/// Parameters for [`BilateralFilter`](super::BilateralFilter).
///
/// # Defaults
///
/// `sigma_space` 15, `sigma_color` 30, `kernel_size` 9, `iterations` 1.
///
/// # Example
///
/// ```
/// use embroidery_quant::FilterParameters;
///
/// let params = FilterParameters::default().kernel_size(5).iterations(2);
/// assert!(params.validate().is_ok());
/// assert_eq!(params.radius(), 2);
///
/// assert!(FilterParameters::default().kernel_size(4).validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterParameters {
    /// Spatial falloff in pixels.
    pub sigma_space: f64,
    /// Color falloff in RGB units.
    pub sigma_color: f64,
    /// Window side length; odd.
    pub kernel_size: usize,
    /// Number of passes, each filtering the previous output.
    pub iterations: usize,
}

impl Default for FilterParameters {
    fn default() -> Self {
        Self {
            sigma_space: 15.0,
            sigma_color: 30.0,
            kernel_size: 9,
            iterations: 1,
        }
    }
}

impl FilterParameters {
    /// Parameters tuned to the image size: larger images get a smaller
    /// window so a pass stays affordable.
    ///
    /// ```
    /// use embroidery_quant::FilterParameters;
    ///
    /// assert_eq!(FilterParameters::for_pixel_count(4_000_000).kernel_size, 7);
    /// assert_eq!(FilterParameters::for_pixel_count(100_000).kernel_size, 11);
    /// ```
    pub fn for_pixel_count(pixels: usize) -> Self {
        let (sigma_space, sigma_color, kernel_size) = if pixels > 1_000_000 {
            (10.0, 25.0, 7)
        } else if pixels > 500_000 {
            (12.0, 30.0, 9)
        } else {
            (15.0, 35.0, 11)
        };
        Self {
            sigma_space,
            sigma_color,
            kernel_size,
            iterations: 1,
        }
    }

    /// Set the spatial sigma.
    #[inline]
    pub fn sigma_space(mut self, sigma: f64) -> Self {
        self.sigma_space = sigma;
        self
    }

    /// Set the color sigma.
    #[inline]
    pub fn sigma_color(mut self, sigma: f64) -> Self {
        self.sigma_color = sigma;
        self
    }

    /// Set the window size.
    #[inline]
    pub fn kernel_size(mut self, size: usize) -> Self {
        self.kernel_size = size;
        self
    }

    /// Set the number of passes.
    #[inline]
    pub fn iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Window radius, `kernel_size / 2`.
    #[inline]
    pub fn radius(&self) -> usize {
        self.kernel_size / 2
    }

    /// Check the parameters before any pixel work.
    ///
    /// # Errors
    ///
    /// [`QuantError::InvalidParameter`] when a sigma is not strictly positive
    /// (NaN included), `kernel_size` is zero or even, or `iterations` is zero.
    pub fn validate(&self) -> Result<(), QuantError> {
        if !(self.sigma_space > 0.0) {
            return Err(QuantError::invalid(
                Stage::Filter,
                format!("sigma_space must be positive, got {}", self.sigma_space),
            ));
        }
        if !(self.sigma_color > 0.0) {
            return Err(QuantError::invalid(
                Stage::Filter,
                format!("sigma_color must be positive, got {}", self.sigma_color),
            ));
        }
        if self.kernel_size == 0 || self.kernel_size % 2 == 0 {
            return Err(QuantError::invalid(
                Stage::Filter,
                format!("kernel_size must be odd and positive, got {}", self.kernel_size),
            ));
        }
        if self.iterations == 0 {
            return Err(QuantError::invalid(Stage::Filter, "iterations must be at least 1"));
        }
        Ok(())
    }
}

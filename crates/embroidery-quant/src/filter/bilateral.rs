//! Edge-preserving bilateral smoothing.

use rayon::prelude::*;
use tracing::debug;

use super::options::FilterParameters;
use crate::api::QuantError;
use crate::raster::{Raster, CHANNELS};

/// Bilateral filter over RGBA8 rasters.
///
/// Each output pixel is the average of its square neighborhood, weighted by
/// spatial closeness and by RGB similarity to the center pixel, so flat
/// regions are smoothed while strong edges stay put. Rows are filtered in
/// parallel; every pass reads only the previous pass's output.
///
/// # Example
///
/// ```
/// use embroidery_quant::{BilateralFilter, Color, FilterParameters, Raster};
///
/// let raster = Raster::filled(4, 4, Color::rgb(10, 20, 30));
/// let filter = BilateralFilter::new(FilterParameters::default()).unwrap();
/// assert_eq!(filter.apply(&raster), raster);
/// ```
#[derive(Debug, Clone)]
pub struct BilateralFilter {
    params: FilterParameters,
    /// Spatial weights, `kernel_size * kernel_size`, row-major.
    spatial: Vec<f64>,
}

impl BilateralFilter {
    /// Create a filter, validating the parameters.
    ///
    /// # Errors
    ///
    /// See [`FilterParameters::validate`].
    pub fn new(params: FilterParameters) -> Result<Self, QuantError> {
        params.validate()?;

        let radius = params.radius() as i64;
        let denom = 2.0 * params.sigma_space * params.sigma_space;
        let mut spatial = Vec::with_capacity(params.kernel_size * params.kernel_size);
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                spatial.push((-((dx * dx + dy * dy) as f64) / denom).exp());
            }
        }

        Ok(Self { params, spatial })
    }

    /// The filter's parameters.
    pub fn params(&self) -> &FilterParameters {
        &self.params
    }

    /// Filter `raster`, running `iterations` passes.
    pub fn apply(&self, raster: &Raster) -> Raster {
        debug!(
            width = raster.width(),
            height = raster.height(),
            kernel_size = self.params.kernel_size,
            iterations = self.params.iterations,
            "bilateral filter"
        );

        let mut current = self.pass(raster);
        for _ in 1..self.params.iterations {
            current = self.pass(&current);
        }
        current
    }

    fn pass(&self, src: &Raster) -> Raster {
        let width = src.width();
        let height = src.height();
        let mut out = vec![0u8; src.pixels().len()];
        if out.is_empty() {
            return src.clone();
        }

        let pixels = src.pixels();
        let radius = self.params.radius() as i64;
        let side = self.params.kernel_size;
        let color_denom = 2.0 * self.params.sigma_color * self.params.sigma_color;

        out.par_chunks_mut(width * CHANNELS)
            .enumerate()
            .for_each(|(y, row)| {
                for x in 0..width {
                    let ci = (y * width + x) * CHANNELS;
                    let center = &pixels[ci..ci + CHANNELS];

                    let mut sums = [0.0f64; CHANNELS];
                    let mut weight_sum = 0.0f64;

                    for ky in -radius..=radius {
                        let ny = y as i64 + ky;
                        if ny < 0 || ny >= height as i64 {
                            continue;
                        }
                        for kx in -radius..=radius {
                            let nx = x as i64 + kx;
                            if nx < 0 || nx >= width as i64 {
                                continue;
                            }

                            let ni = (ny as usize * width + nx as usize) * CHANNELS;
                            let neighbor = &pixels[ni..ni + CHANNELS];

                            let dist_sq: f64 = (0..3)
                                .map(|c| {
                                    let d = neighbor[c] as f64 - center[c] as f64;
                                    d * d
                                })
                                .sum();

                            let spatial =
                                self.spatial[(ky + radius) as usize * side + (kx + radius) as usize];
                            let weight = spatial * (-dist_sq / color_denom).exp();

                            for c in 0..CHANNELS {
                                sums[c] += neighbor[c] as f64 * weight;
                            }
                            weight_sum += weight;
                        }
                    }

                    let target = &mut row[x * CHANNELS..(x + 1) * CHANNELS];
                    if weight_sum > 0.0 {
                        for c in 0..CHANNELS {
                            target[c] = (sums[c] / weight_sum).round().clamp(0.0, 255.0) as u8;
                        }
                    } else {
                        target.copy_from_slice(center);
                    }
                }
            });

        src.with_pixels(out)
    }
}

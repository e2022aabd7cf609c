//! Palette construction from an image's color distribution.
//!
//! The builder works in four steps over the exact RGB histogram:
//!
//! 1. Reserve one slot per non-empty hue sector (most frequent chromatic
//!    color of the sector), so small accents survive the reduction.
//! 2. Weighted median cut in Lab over the remaining colors, always splitting
//!    the box with the largest weighted squared error.
//! 3. A few rounds of weighted k-means to pull representatives onto the
//!    frequency-weighted centroids of their members.
//! 4. Deduplicate and top up with the most frequent unused colors until the
//!    palette holds exactly `color_count` entries.
//!
//! Every step is order-stable, so identical inputs give identical palettes.

use std::cmp::Ordering;
use std::collections::HashSet;

use tracing::debug;

use super::histogram::{ColorHistogram, HistogramEntry};
use super::options::QuantizationParameters;
use super::palette::{nearest_index, Palette};
use crate::api::{QuantError, Stage};
use crate::color::{Color, Lab};
use crate::raster::Raster;

/// Lab chroma below which a color counts as neutral for hue reservation.
const HUE_MIN_CHROMA: f32 = 10.0;

/// Upper bound on k-means refinement rounds.
const KMEANS_MAX_ITERS: usize = 8;

/// Builds a [`Palette`] summarizing the dominant colors of a raster.
///
/// # Example
///
/// ```
/// use embroidery_quant::{Color, PaletteBuilder, QuantizationParameters, Raster};
///
/// let raster = Raster::filled(2, 2, Color::rgb(255, 0, 0));
/// let palette = PaletteBuilder::new(QuantizationParameters::new(2))
///     .build(&raster)
///     .unwrap();
/// assert_eq!(palette.colors(), &[Color::rgb(255, 0, 0)]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PaletteBuilder {
    params: QuantizationParameters,
}

/// A histogram entry with its Lab coordinates.
#[derive(Debug, Clone, Copy)]
struct Sample {
    color: Color,
    lab: Lab,
    weight: f64,
}

impl From<&HistogramEntry> for Sample {
    fn from(entry: &HistogramEntry) -> Self {
        Self {
            color: entry.color,
            lab: Lab::from(entry.color),
            weight: entry.count as f64,
        }
    }
}

impl PaletteBuilder {
    /// Create a builder with the given parameters.
    pub fn new(params: QuantizationParameters) -> Self {
        Self { params }
    }

    /// The builder's parameters.
    pub fn params(&self) -> &QuantizationParameters {
        &self.params
    }

    /// Build a palette from a raster.
    ///
    /// # Errors
    ///
    /// [`QuantError::InvalidParameter`] if `color_count` is outside `2..=256`
    /// or the raster is empty.
    pub fn build(&self, raster: &Raster) -> Result<Palette, QuantError> {
        self.params.validate()?;
        if raster.is_empty() {
            return Err(QuantError::invalid(Stage::Palette, "raster has no pixels"));
        }
        self.build_from_histogram(&ColorHistogram::from_raster(raster))
    }

    /// Build a palette from a precomputed histogram.
    ///
    /// # Errors
    ///
    /// Same as [`PaletteBuilder::build`].
    pub fn build_from_histogram(&self, histogram: &ColorHistogram) -> Result<Palette, QuantError> {
        self.params.validate()?;
        if histogram.is_empty() {
            return Err(QuantError::invalid(Stage::Palette, "raster has no pixels"));
        }

        let target = self.params.color_count;
        let by_frequency = histogram.by_frequency();

        if by_frequency.len() <= target {
            debug!(
                distinct = by_frequency.len(),
                target, "image has no more colors than requested"
            );
            let colors: Vec<Color> = by_frequency.iter().map(|e| e.color).collect();
            return Ok(Palette::new(&colors)?);
        }

        let samples: Vec<Sample> = by_frequency.iter().map(Sample::from).collect();

        let sectors = self.params.effective_min_hue_colors().min(target);
        let reserved = reserve_hue_slots(&samples, sectors);
        let reserved_keys: HashSet<u32> = reserved.iter().map(|s| s.color.rgb_key()).collect();

        let remaining: Vec<Sample> = samples
            .iter()
            .filter(|s| !reserved_keys.contains(&s.color.rgb_key()))
            .copied()
            .collect();

        let slots = target - reserved.len();
        let mut weighted = if slots > 0 {
            let seeds = median_cut(remaining.clone(), slots);
            kmeans_refine(seeds, &remaining)
        } else {
            Vec::new()
        };
        weighted.extend(reserved.iter().map(|s| (s.color, s.weight)));

        // Dominant colors first
        weighted.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.rgb_key().cmp(&b.0.rgb_key()))
        });

        let mut seen = HashSet::with_capacity(target);
        let mut colors = Vec::with_capacity(target);
        for (color, _) in weighted {
            if seen.insert(color.rgb_key()) {
                colors.push(color);
            }
        }

        for sample in &samples {
            if colors.len() >= target {
                break;
            }
            if seen.insert(sample.color.rgb_key()) {
                colors.push(sample.color);
            }
        }
        colors.truncate(target);

        debug!(
            distinct = samples.len(),
            reserved = reserved.len(),
            colors = colors.len(),
            "palette built"
        );

        Ok(Palette::new(&colors)?)
    }
}

/// Most frequent chromatic sample of each non-empty hue sector, in sector
/// order. `samples` must be sorted by descending frequency.
fn reserve_hue_slots(samples: &[Sample], sectors: usize) -> Vec<Sample> {
    if sectors == 0 {
        return Vec::new();
    }

    let width = 360.0 / sectors as f32;
    let mut picks: Vec<Option<Sample>> = vec![None; sectors];

    for sample in samples {
        if sample.lab.chroma() < HUE_MIN_CHROMA {
            continue;
        }
        let sector = ((sample.lab.hue_degrees() / width) as usize).min(sectors - 1);
        if picks[sector].is_none() {
            picks[sector] = Some(*sample);
        }
    }

    picks.into_iter().flatten().collect()
}

/// A box of samples for median cut subdivision.
#[derive(Debug)]
struct ColorBox {
    samples: Vec<Sample>,
}

impl ColorBox {
    fn total_weight(&self) -> f64 {
        self.samples.iter().map(|s| s.weight).sum()
    }

    fn mean_lab(&self) -> Lab {
        let total = self.total_weight();
        let (mut l, mut a, mut b) = (0.0f64, 0.0f64, 0.0f64);
        for s in &self.samples {
            l += s.lab.l as f64 * s.weight;
            a += s.lab.a as f64 * s.weight;
            b += s.lab.b as f64 * s.weight;
        }
        Lab::new((l / total) as f32, (a / total) as f32, (b / total) as f32)
    }

    /// Weighted sum of squared Lab distances to the box mean.
    fn error(&self) -> f64 {
        let mean = self.mean_lab();
        self.samples
            .iter()
            .map(|s| s.lab.distance_squared(mean) as f64 * s.weight)
            .sum()
    }

    /// Index of the Lab axis with the largest extent.
    fn widest_axis(&self) -> usize {
        let mut min = [f32::MAX; 3];
        let mut max = [f32::MIN; 3];
        for s in &self.samples {
            for (axis, v) in [s.lab.l, s.lab.a, s.lab.b].into_iter().enumerate() {
                min[axis] = min[axis].min(v);
                max[axis] = max[axis].max(v);
            }
        }
        let ranges = [max[0] - min[0], max[1] - min[1], max[2] - min[2]];
        if ranges[0] >= ranges[1] && ranges[0] >= ranges[2] {
            0
        } else if ranges[1] >= ranges[2] {
            1
        } else {
            2
        }
    }

    /// Split along the widest axis at the weighted median.
    fn split(mut self) -> (ColorBox, ColorBox) {
        let axis = self.widest_axis();
        let coord = |s: &Sample| match axis {
            0 => s.lab.l,
            1 => s.lab.a,
            _ => s.lab.b,
        };
        self.samples.sort_by(|a, b| {
            coord(a)
                .partial_cmp(&coord(b))
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.color.rgb_key().cmp(&b.color.rgb_key()))
        });

        let half = self.total_weight() / 2.0;
        let mut accumulated = 0.0;
        let mut split_at = 1;
        for (i, s) in self.samples.iter().enumerate() {
            accumulated += s.weight;
            if accumulated >= half {
                split_at = i + 1;
                break;
            }
        }
        let split_at = split_at.clamp(1, self.samples.len() - 1);

        let right = self.samples.split_off(split_at);
        (self, ColorBox { samples: right })
    }
}

/// Partition `samples` into at most `count` boxes and return each box's
/// frequency-weighted centroid.
fn median_cut(samples: Vec<Sample>, count: usize) -> Vec<Color> {
    if samples.is_empty() || count == 0 {
        return Vec::new();
    }

    let mut boxes = vec![ColorBox { samples }];
    while boxes.len() < count {
        let candidate = boxes
            .iter()
            .enumerate()
            .filter(|(_, b)| b.samples.len() >= 2)
            .map(|(i, b)| (i, b.error()))
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));

        let Some((idx, _)) = candidate else {
            break;
        };

        let (left, right) = boxes.remove(idx).split();
        boxes.insert(idx, right);
        boxes.insert(idx, left);
    }

    boxes.iter().map(|b| weighted_centroid(&b.samples)).collect()
}

/// Frequency-weighted RGB mean of `samples`, rounded.
fn weighted_centroid(samples: &[Sample]) -> Color {
    let mut sums = [0.0f64; 3];
    let mut total = 0.0f64;
    for s in samples {
        sums[0] += s.color.r as f64 * s.weight;
        sums[1] += s.color.g as f64 * s.weight;
        sums[2] += s.color.b as f64 * s.weight;
        total += s.weight;
    }
    Color::from_f32_clamped(
        (sums[0] / total) as f32,
        (sums[1] / total) as f32,
        (sums[2] / total) as f32,
        255.0,
    )
}

/// Weighted k-means over `samples` seeded with `centroids`.
///
/// Returns each representative with the weight of its final cluster. A
/// cluster that loses all members keeps its previous representative.
fn kmeans_refine(mut centroids: Vec<Color>, samples: &[Sample]) -> Vec<(Color, f64)> {
    let k = centroids.len();
    let mut weights = vec![0.0f64; k];

    for iteration in 0..KMEANS_MAX_ITERS {
        let labs: Vec<Lab> = centroids.iter().map(|&c| Lab::from(c)).collect();
        let mut members: Vec<Vec<Sample>> = vec![Vec::new(); k];
        for s in samples {
            let (nearest, _) = nearest_index(&labs, s.lab);
            members[nearest].push(*s);
        }

        let mut changed = false;
        for (i, cluster) in members.iter().enumerate() {
            weights[i] = cluster.iter().map(|s| s.weight).sum();
            if cluster.is_empty() {
                continue;
            }
            let next = weighted_centroid(cluster);
            if next != centroids[i] {
                centroids[i] = next;
                changed = true;
            }
        }

        if !changed {
            debug!(iterations = iteration + 1, "k-means converged");
            break;
        }
    }

    centroids.into_iter().zip(weights).collect()
}

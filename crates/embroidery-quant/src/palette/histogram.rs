//! Exact RGB frequency distribution.

use std::collections::HashMap;

use rayon::prelude::*;

use crate::color::Color;
use crate::raster::{Raster, CHANNELS};

/// Pixels counted before the histogram switches to stride sampling.
pub const MAX_SAMPLED_PIXELS: usize = 1 << 20;

/// One distinct RGB value and how many sampled pixels carry it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistogramEntry {
    /// Opaque color
    pub color: Color,
    /// Number of sampled pixels with this RGB
    pub count: u64,
}

/// Frequency of every distinct RGB value in a raster (alpha ignored).
///
/// Entries are sorted by RGB key, so two histograms of the same raster are
/// identical regardless of how the parallel count was split.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColorHistogram {
    entries: Vec<HistogramEntry>,
    total: u64,
}

impl ColorHistogram {
    /// Count a raster, sampling every n-th pixel when it holds more than
    /// [`MAX_SAMPLED_PIXELS`].
    pub fn from_raster(raster: &Raster) -> Self {
        let stride = raster.pixel_count().div_ceil(MAX_SAMPLED_PIXELS).max(1);
        Self::from_pixels(raster.pixels(), stride)
    }

    /// Count RGBA8 bytes, visiting every `stride`-th pixel.
    pub fn from_pixels(pixels: &[u8], stride: usize) -> Self {
        let counts = pixels
            .par_chunks_exact(CHANNELS)
            .step_by(stride.max(1))
            .fold(HashMap::new, |mut counts: HashMap<u32, u64>, px| {
                let key = (px[0] as u32) << 16 | (px[1] as u32) << 8 | px[2] as u32;
                *counts.entry(key).or_insert(0) += 1;
                counts
            })
            .reduce(HashMap::new, merge_counts);

        let mut entries: Vec<HistogramEntry> = counts
            .into_iter()
            .map(|(key, count)| HistogramEntry {
                color: Color::from_rgb_key(key),
                count,
            })
            .collect();
        entries.sort_unstable_by_key(|e| e.color.rgb_key());

        let total = entries.iter().map(|e| e.count).sum();
        Self { entries, total }
    }

    /// Number of distinct colors.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing was counted.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts.
    #[inline]
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Entries in RGB key order.
    #[inline]
    pub fn entries(&self) -> &[HistogramEntry] {
        &self.entries
    }

    /// Entries ordered by count (descending), then RGB key.
    pub fn by_frequency(&self) -> Vec<HistogramEntry> {
        let mut sorted = self.entries.clone();
        sorted.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.color.rgb_key().cmp(&b.color.rgb_key()))
        });
        sorted
    }
}

fn merge_counts(mut a: HashMap<u32, u64>, mut b: HashMap<u32, u64>) -> HashMap<u32, u64> {
    if a.len() < b.len() {
        std::mem::swap(&mut a, &mut b);
    }
    for (key, count) in b {
        *a.entry(key).or_insert(0) += count;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_distinct_colors() {
        let red = Color::rgb(255, 0, 0);
        let blue = Color::rgb(0, 0, 255);
        let raster = Raster::from_colors(2, 2, &[red, blue, red, red]).unwrap();
        let hist = ColorHistogram::from_raster(&raster);

        assert_eq!(hist.len(), 2);
        assert_eq!(hist.total(), 4);
        // Key order: blue (0x0000ff) before red (0xff0000)
        assert_eq!(hist.entries()[0], HistogramEntry { color: blue, count: 1 });
        assert_eq!(hist.entries()[1], HistogramEntry { color: red, count: 3 });
    }

    #[test]
    fn test_alpha_is_ignored() {
        let raster =
            Raster::from_colors(2, 1, &[Color::new(9, 9, 9, 0), Color::new(9, 9, 9, 255)]).unwrap();
        let hist = ColorHistogram::from_raster(&raster);
        assert_eq!(hist.len(), 1);
        assert_eq!(hist.entries()[0].count, 2);
    }

    #[test]
    fn test_by_frequency_breaks_ties_by_key() {
        let a = Color::rgb(0, 0, 1);
        let b = Color::rgb(0, 0, 2);
        let c = Color::rgb(0, 0, 3);
        let raster = Raster::from_colors(5, 1, &[c, b, c, a, b]).unwrap();
        let order: Vec<Color> = ColorHistogram::from_raster(&raster)
            .by_frequency()
            .iter()
            .map(|e| e.color)
            .collect();
        assert_eq!(order, vec![b, c, a]);
    }

    #[test]
    fn test_stride_sampling() {
        let colors: Vec<Color> = (0..10u8).map(|i| Color::rgb(i, 0, 0)).collect();
        let raster = Raster::from_colors(10, 1, &colors).unwrap();
        let hist = ColorHistogram::from_pixels(raster.pixels(), 3);
        // Pixels 0, 3, 6, 9
        assert_eq!(hist.total(), 4);
        let reds: Vec<u8> = hist.entries().iter().map(|e| e.color.r).collect();
        assert_eq!(reds, vec![0, 3, 6, 9]);
    }

    #[test]
    fn test_empty_raster() {
        let raster = Raster::new(0, 0, Vec::new()).unwrap();
        assert!(ColorHistogram::from_raster(&raster).is_empty());
    }
}

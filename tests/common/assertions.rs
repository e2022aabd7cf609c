//! Assertion helpers for tests.

use embroidery_quant::{Palette, Raster};
use pretty_assertions::assert_eq;
use std::path::Path;

/// Assert every pixel of `raster` is a palette color
pub fn assert_palette_only(raster: &Raster, palette: &Palette) {
    if let Some(stray) = raster.colors().find(|&c| !palette.contains(c)) {
        panic!(
            "Expected only palette colors, found {} (palette: {:?})",
            stray.to_hex(),
            palette.colors()
        );
    }
}

/// Assert two rasters have the same dimensions
pub fn assert_same_size(actual: &Raster, expected: &Raster) {
    assert_eq!(
        (actual.width(), actual.height()),
        (expected.width(), expected.height()),
        "Raster dimensions differ"
    );
}

/// Assert `path` holds a PNG file
pub fn assert_png_file(path: &Path) {
    let bytes = std::fs::read(path)
        .unwrap_or_else(|e| panic!("Expected PNG at {}: {e}", path.display()));
    assert!(
        bytes.starts_with(b"\x89PNG\r\n\x1a\n"),
        "Expected PNG signature in {}, got {:?}",
        path.display(),
        &bytes[..8.min(bytes.len())]
    );
}

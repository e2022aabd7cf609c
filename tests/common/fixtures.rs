//! Test fixtures: synthetic rasters and files on disk.

use embroidery_quant::{Color, Raster};
use std::path::{Path, PathBuf};
use stitchquant::rendering::write_png;

/// Thread colors used by the hex-list palette fixtures
pub mod threads {
    pub const BLACK: &str = "#000000";
    pub const WHITE: &str = "#ffffff";
    pub const RED: &str = "#c83030";
    pub const BLUE: &str = "#2050c0";

    /// Comma-separated list of all thread fixtures
    pub const HEX_LIST: &str = "#000000, #ffffff, #c83030, #2050c0";
}

/// Smooth two-axis gradient with many distinct colors
pub fn gradient(width: usize, height: usize) -> Raster {
    let colors: Vec<Color> = (0..width * height)
        .map(|i| {
            let x = (i % width) as f32 / width as f32;
            let y = (i / width) as f32 / height as f32;
            Color::from_f32_clamped(255.0 * x, 255.0 * (1.0 - x) * y, 255.0 * (1.0 - y), 255.0)
        })
        .collect();
    Raster::from_colors(width, height, &colors).unwrap()
}

/// Left half red, right half blue
pub fn split_red_blue(width: usize, height: usize) -> Raster {
    let colors: Vec<Color> = (0..width * height)
        .map(|i| {
            if i % width < width / 2 {
                Color::rgb(200, 40, 40)
            } else {
                Color::rgb(40, 60, 200)
            }
        })
        .collect();
    Raster::from_colors(width, height, &colors).unwrap()
}

/// Write `raster` as a PNG named `name` inside `dir`.
pub fn write_input_png(dir: &Path, name: &str, raster: &Raster) -> PathBuf {
    let path = dir.join(name);
    write_png(&path, raster).unwrap();
    path
}

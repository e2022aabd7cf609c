use crate::error::AppError;
use embroidery_quant::{Color, Palette, Raster};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// One thread color with its usage in the final raster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteEntry {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default)]
    pub hex: String,
    /// Pixels (stitches) of this color in the final raster
    #[serde(default)]
    pub stitches: u64,
    /// Share of the final raster, `0.0..=1.0`
    #[serde(default)]
    pub coverage: f64,
}

impl PaletteEntry {
    pub fn color(&self) -> Color {
        Color::rgb(self.r, self.g, self.b)
    }
}

/// Palette entries in palette order, with stitch counts taken from
/// `final_raster`.
pub fn palette_report(palette: &Palette, final_raster: &Raster) -> Vec<PaletteEntry> {
    let mut counts: HashMap<u32, u64> = HashMap::with_capacity(palette.len());
    for color in final_raster.colors() {
        *counts.entry(color.rgb_key()).or_insert(0) += 1;
    }
    let total = final_raster.pixel_count() as f64;

    palette
        .colors()
        .iter()
        .map(|&c| {
            let stitches = counts.get(&c.rgb_key()).copied().unwrap_or(0);
            PaletteEntry {
                r: c.r,
                g: c.g,
                b: c.b,
                hex: c.to_hex(),
                stitches,
                coverage: if total > 0.0 {
                    stitches as f64 / total
                } else {
                    0.0
                },
            }
        })
        .collect()
}

/// Serialize a palette report as pretty JSON.
pub fn report_to_json(entries: &[PaletteEntry]) -> Result<String, AppError> {
    Ok(serde_json::to_string_pretty(entries)?)
}

/// Parse a palette from a JSON report or a hex list.
///
/// JSON input is an array of `{ "r", "g", "b" }` objects (other fields are
/// ignored). Anything else is read as hex colors separated by commas or
/// whitespace, e.g. `#000000, #ffffff, #c03`.
pub fn parse_palette(text: &str) -> Result<Palette, AppError> {
    let text = text.trim();
    if text.starts_with('[') {
        let entries: Vec<PaletteEntry> = serde_json::from_str(text)?;
        let colors: Vec<Color> = entries.iter().map(PaletteEntry::color).collect();
        return Ok(Palette::new(&colors)?);
    }

    let hex: Vec<&str> = text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect();
    if hex.is_empty() {
        return Err(AppError::PaletteFile("no colors found".to_string()));
    }
    Ok(Palette::from_hex(&hex)?)
}

/// Read a palette file, see [`parse_palette`].
pub fn read_palette_file(path: &Path) -> Result<Palette, AppError> {
    let text = std::fs::read_to_string(path)?;
    parse_palette(&text)
}

/// Write the palette report for `final_raster` to `path`.
pub fn write_palette_report(
    path: &Path,
    palette: &Palette,
    final_raster: &Raster,
) -> Result<(), AppError> {
    let json = report_to_json(&palette_report(palette, final_raster))?;
    std::fs::write(path, json)?;
    Ok(())
}

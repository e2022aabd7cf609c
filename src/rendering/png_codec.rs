use crate::error::AppError;
use embroidery_quant::Raster;
use std::io::Cursor;
use std::path::Path;

/// Decode a PNG into an RGBA8 raster.
///
/// Palette, grayscale and 16-bit images are expanded to 8-bit RGBA; images
/// without an alpha channel come back opaque.
pub fn decode_png(data: &[u8]) -> Result<Raster, AppError> {
    let mut decoder = png::Decoder::new(data);
    decoder.set_transformations(png::Transformations::normalize_to_color8());
    let mut reader = decoder
        .read_info()
        .map_err(|e| AppError::PngDecode(e.to_string()))?;

    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| AppError::PngDecode(e.to_string()))?;
    let bytes = &buf[..info.buffer_size()];

    let rgba: Vec<u8> = match info.color_type {
        png::ColorType::Rgba => bytes.to_vec(),
        png::ColorType::Rgb => bytes
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        png::ColorType::GrayscaleAlpha => bytes
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[0], p[0], p[1]])
            .collect(),
        png::ColorType::Grayscale => bytes.iter().flat_map(|&v| [v, v, v, 255]).collect(),
        png::ColorType::Indexed => {
            return Err(AppError::PngDecode(
                "indexed color was not expanded".to_string(),
            ))
        }
    };

    Ok(Raster::new(info.width as usize, info.height as usize, rgba)?)
}

/// Encode a raster as an 8-bit RGBA PNG.
pub fn encode_png(raster: &Raster) -> Result<Vec<u8>, AppError> {
    let unsupported = || AppError::UnsupportedDimensions {
        width: raster.width(),
        height: raster.height(),
    };
    if raster.is_empty() {
        return Err(unsupported());
    }
    let width = u32::try_from(raster.width()).map_err(|_| unsupported())?;
    let height = u32::try_from(raster.height()).map_err(|_| unsupported())?;

    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut buf, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(png::Compression::Default);
        let mut writer = encoder
            .write_header()
            .map_err(|e| AppError::PngEncode(e.to_string()))?;
        writer
            .write_image_data(raster.pixels())
            .map_err(|e| AppError::PngEncode(e.to_string()))?;
    }
    Ok(buf.into_inner())
}

/// Read and decode a PNG file.
pub fn read_png(path: &Path) -> Result<Raster, AppError> {
    let data = std::fs::read(path)?;
    decode_png(&data)
}

/// Encode a raster and write it to `path`.
pub fn write_png(path: &Path, raster: &Raster) -> Result<(), AppError> {
    let data = encode_png(raster)?;
    std::fs::write(path, data)?;
    Ok(())
}

use embroidery_quant::{PaletteError, QuantError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Quantization error: {0}")]
    Quant(#[from] QuantError),

    #[error("PNG decode error: {0}")]
    PngDecode(String),

    #[error("PNG encode error: {0}")]
    PngEncode(String),

    #[error("Unsupported dimensions: {width}x{height}")]
    UnsupportedDimensions { width: usize, height: usize },

    #[error("Palette file error: {0}")]
    PaletteFile(String),

    #[error("Unknown preset: {0}")]
    UnknownPreset(String),

    #[error("Worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<PaletteError> for AppError {
    fn from(e: PaletteError) -> Self {
        AppError::Quant(e.into())
    }
}

impl AppError {
    /// True when the pipeline stopped because of cancellation or timeout.
    pub fn is_aborted(&self) -> bool {
        matches!(self, AppError::Quant(e) if e.is_aborted())
    }
}

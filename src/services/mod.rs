pub mod palette_export;
pub mod worker;

pub use palette_export::{
    palette_report, parse_palette, read_palette_file, write_palette_report, PaletteEntry,
};
pub use worker::{PipelineJob, PipelineWorker, Progress};

pub mod config;
pub mod overrides;
pub mod preset;

pub use config::{AppConfig, WorkerConfig, CONFIG_ENV};
pub use overrides::ParamOverrides;
pub use preset::{builtin_preset, builtin_presets, Preset};

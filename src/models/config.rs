use embroidery_quant::{DitherOptions, FilterParameters, PipelineParams, QuantizationParameters};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::preset::{builtin_preset, builtin_presets, Preset};
use crate::error::AppError;

/// Environment variable naming the config file when `--config` is absent
pub const CONFIG_ENV: &str = "STITCHQUANT_CONFIG";

/// Application configuration loaded from config.yaml
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Fixed filter parameters; sized to the image when absent
    pub filter: Option<FilterParameters>,

    /// Palette construction defaults
    pub quantization: QuantizationParameters,

    /// Dithering defaults
    pub dither: DitherOptions,

    /// Background worker settings
    pub worker: WorkerConfig,

    /// Additional presets; a name shared with a built-in replaces it
    pub presets: BTreeMap<String, Preset>,
}

/// Settings for the pipeline worker
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct WorkerConfig {
    /// Maximum wall time of one job in seconds
    pub timeout_secs: u64,

    /// Longest side of preview rasters
    pub preview_max_size: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            preview_max_size: 512,
        }
    }
}

impl WorkerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl AppConfig {
    /// Parse configuration from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self, AppError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Load configuration from `path`, or from `$STITCHQUANT_CONFIG` when no
    /// path is given. Falls back to defaults when neither is set or the file
    /// cannot be used.
    pub fn load(path: Option<&Path>) -> Self {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(content) => match Self::from_yaml_str(&content) {
                Ok(config) => {
                    tracing::info!(
                        path = %path.display(),
                        presets = config.presets.len(),
                        "Loaded configuration"
                    );
                    config
                }
                Err(e) => {
                    tracing::warn!(%e, path = %path.display(), "Failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(%e, path = %path.display(), "Failed to read config, using defaults");
                Self::default()
            }
        }
    }

    /// Look up a preset, config entries first, then built-ins.
    ///
    /// An exact name match wins; otherwise the first config entry (in name
    /// order) matching without regard to ASCII case.
    pub fn preset(&self, name: &str) -> Option<Preset> {
        self.presets
            .get(name)
            .or_else(|| {
                self.presets
                    .iter()
                    .find(|(n, _)| n.eq_ignore_ascii_case(name))
                    .map(|(_, p)| p)
            })
            .cloned()
            .or_else(|| builtin_preset(name))
    }

    /// All available presets: built-ins in their fixed order, then
    /// config-only presets sorted by name.
    pub fn all_presets(&self) -> Vec<(String, Preset)> {
        let mut presets: Vec<(String, Preset)> = builtin_presets()
            .into_iter()
            .map(|(name, builtin)| {
                let preset = self.preset(name).unwrap_or(builtin);
                (name.to_string(), preset)
            })
            .collect();

        presets.extend(
            self.presets
                .iter()
                .filter(|(name, _)| builtin_preset(name).is_none())
                .map(|(name, p)| (name.clone(), p.clone())),
        );
        presets
    }

    /// Pipeline parameters for an image of `pixel_count` pixels, from the
    /// named preset or the config defaults.
    pub fn resolve_params(
        &self,
        preset: Option<&str>,
        pixel_count: usize,
    ) -> Result<PipelineParams, AppError> {
        if let Some(name) = preset {
            let preset = self
                .preset(name)
                .ok_or_else(|| AppError::UnknownPreset(name.to_string()))?;
            return Ok(preset.params(pixel_count));
        }

        Ok(PipelineParams {
            filter: self
                .filter
                .clone()
                .unwrap_or_else(|| FilterParameters::for_pixel_count(pixel_count)),
            quantization: self.quantization.clone(),
            dither: self.dither.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embroidery_quant::DitherKernel;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_yaml_gives_defaults() {
        let config = AppConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.worker.timeout(), Duration::from_secs(30));
        assert_eq!(config.worker.preview_max_size, 512);
    }

    #[test]
    fn test_parse_sections() {
        let yaml = r#"
filter:
  sigma_space: 8.0
  kernel_size: 5
quantization:
  color_count: 24
  embroidery_optimized: false
dither:
  kernel: stucki
  serpentine: false
worker:
  timeout_secs: 5
presets:
  patch:
    description: Badge patches
    quantization:
      color_count: 6
"#;
        let config = AppConfig::from_yaml_str(yaml).unwrap();
        let filter = config.filter.clone().unwrap();
        assert_eq!(filter.sigma_space, 8.0);
        assert_eq!(filter.kernel_size, 5);
        assert_eq!(filter.sigma_color, FilterParameters::default().sigma_color);
        assert_eq!(config.quantization.color_count, 24);
        assert!(!config.quantization.embroidery_optimized);
        assert_eq!(config.dither.kernel, DitherKernel::Stucki);
        assert!(!config.dither.serpentine);
        assert_eq!(config.worker.timeout_secs, 5);
        assert_eq!(config.worker.preview_max_size, 512);
        assert_eq!(config.preset("patch").unwrap().quantization.color_count, 6);
    }

    #[test]
    fn test_sample_config_parses() {
        let config = AppConfig::from_yaml_str(include_str!("../../config.yaml")).unwrap();
        assert!(config.filter.is_none());
        assert_eq!(config.worker, WorkerConfig::default());
        let monogram = config.preset("monogram").unwrap();
        assert_eq!(monogram.dither.kernel, DitherKernel::None);
        assert!(monogram.params(1000).validate().is_ok());
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        assert!(matches!(
            AppConfig::from_yaml_str("dither: [1, 2"),
            Err(AppError::Yaml(_))
        ));
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let config = AppConfig::load(Some(Path::new("/nonexistent/stitchquant.yaml")));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_resolve_params_adaptive_filter() {
        let config = AppConfig::default();
        let params = config.resolve_params(None, 800_000).unwrap();
        assert_eq!(params.filter, FilterParameters::for_pixel_count(800_000));
        assert_eq!(params.quantization, QuantizationParameters::default());
    }

    #[test]
    fn test_resolve_params_preset() {
        let config = AppConfig::default();
        let params = config.resolve_params(Some("detailed"), 100).unwrap();
        assert_eq!(params.quantization.color_count, 32);

        assert!(matches!(
            config.resolve_params(Some("huge"), 100),
            Err(AppError::UnknownPreset(name)) if name == "huge"
        ));
    }

    #[test]
    fn test_config_preset_overrides_builtin() {
        let yaml = r#"
presets:
  compact:
    quantization:
      color_count: 5
  zebra:
    quantization:
      color_count: 2
"#;
        let config = AppConfig::from_yaml_str(yaml).unwrap();
        let names: Vec<String> = config.all_presets().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["compact", "standard", "detailed", "zebra"]);
        assert_eq!(config.preset("compact").unwrap().quantization.color_count, 5);
    }

    #[test]
    fn test_preset_names_differing_in_case() {
        let yaml = r#"
presets:
  Patch:
    quantization:
      color_count: 4
  patch:
    quantization:
      color_count: 6
"#;
        let config = AppConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.preset("patch").unwrap().quantization.color_count, 6);
        assert_eq!(config.preset("Patch").unwrap().quantization.color_count, 4);
        // "Patch" sorts before "patch"
        assert_eq!(config.preset("PATCH").unwrap().quantization.color_count, 4);

        let names: Vec<String> = config.all_presets().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["compact", "standard", "detailed", "Patch", "patch"]);
    }
}

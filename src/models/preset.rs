use embroidery_quant::{
    DitherKernel, DitherOptions, FilterParameters, PipelineParams, QuantizationParameters,
};
use serde::{Deserialize, Serialize};

/// Named parameter set for a kind of embroidery job.
///
/// The filter is optional; without one the filter is sized to the image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    /// One-line summary shown by `stitchquant presets`
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub quantization: QuantizationParameters,

    #[serde(default)]
    pub dither: DitherOptions,

    #[serde(default)]
    pub filter: Option<FilterParameters>,
}

impl Preset {
    fn embroidery(
        description: &str,
        color_count: usize,
        kernel: DitherKernel,
        intensity: f32,
        min_hue_colors: usize,
    ) -> Self {
        Self {
            description: description.to_string(),
            quantization: QuantizationParameters::new(color_count)
                .min_hue_colors(min_hue_colors)
                .embroidery_optimized(true),
            dither: DitherOptions::new()
                .kernel(kernel)
                .intensity(intensity)
                .serpentine(true),
            filter: None,
        }
    }

    /// Pipeline parameters for an image of `pixel_count` pixels.
    pub fn params(&self, pixel_count: usize) -> PipelineParams {
        PipelineParams {
            filter: self
                .filter
                .clone()
                .unwrap_or_else(|| FilterParameters::for_pixel_count(pixel_count)),
            quantization: self.quantization.clone(),
            dither: self.dither.clone(),
        }
    }
}

/// Presets that ship with the binary, in display order.
pub fn builtin_presets() -> Vec<(&'static str, Preset)> {
    vec![
        (
            "compact",
            Preset::embroidery(
                "Few threads, flat fills for small patches",
                8,
                DitherKernel::FloydSteinberg,
                0.03,
                2,
            ),
        ),
        (
            "standard",
            Preset::embroidery(
                "Balanced thread count for most designs",
                16,
                DitherKernel::Atkinson,
                0.05,
                2,
            ),
        ),
        (
            "detailed",
            Preset::embroidery(
                "More threads and softer blends for large pieces",
                32,
                DitherKernel::FloydSteinberg,
                0.08,
                3,
            ),
        ),
    ]
}

/// Look up a built-in preset by name (case-insensitive).
pub fn builtin_preset(name: &str) -> Option<Preset> {
    builtin_presets()
        .into_iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, preset)| preset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builtin_presets_table() {
        let table: Vec<(&str, usize, DitherKernel, f32, usize)> = builtin_presets()
            .iter()
            .map(|(name, p)| {
                (
                    *name,
                    p.quantization.color_count,
                    p.dither.kernel,
                    p.dither.intensity,
                    p.quantization.min_hue_colors,
                )
            })
            .collect();
        assert_eq!(
            table,
            vec![
                ("compact", 8, DitherKernel::FloydSteinberg, 0.03, 2),
                ("standard", 16, DitherKernel::Atkinson, 0.05, 2),
                ("detailed", 32, DitherKernel::FloydSteinberg, 0.08, 3),
            ]
        );
    }

    #[test]
    fn test_builtin_presets_are_embroidery_serpentine() {
        for (name, preset) in builtin_presets() {
            assert!(preset.quantization.embroidery_optimized, "{name}");
            assert!(preset.dither.serpentine, "{name}");
            assert!(preset.params(10_000).validate().is_ok(), "{name}");
        }
    }

    #[test]
    fn test_builtin_preset_lookup() {
        assert_eq!(
            builtin_preset("Standard").map(|p| p.quantization.color_count),
            Some(16)
        );
        assert!(builtin_preset("poster").is_none());
    }

    #[test]
    fn test_params_use_adaptive_filter() {
        let preset = builtin_preset("compact").unwrap();
        assert_eq!(
            preset.params(2_000_000).filter,
            FilterParameters::for_pixel_count(2_000_000)
        );

        let fixed = Preset {
            filter: Some(FilterParameters::default().kernel_size(5)),
            ..preset
        };
        assert_eq!(fixed.params(2_000_000).filter.kernel_size, 5);
    }

    #[test]
    fn test_preset_from_yaml_defaults() {
        let yaml = r#"
description: Two-tone patches
quantization:
  color_count: 4
dither:
  kernel: none
"#;
        let preset: Preset = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(preset.quantization.color_count, 4);
        assert!(preset.quantization.embroidery_optimized);
        assert_eq!(preset.dither.kernel, DitherKernel::None);
        assert!(preset.filter.is_none());
    }
}

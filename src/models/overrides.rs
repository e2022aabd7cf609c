use embroidery_quant::{DitherKernel, PipelineParams};

/// Per-run parameter overrides, typically from command line flags.
///
/// Unset fields keep the value from the preset or config.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamOverrides {
    pub colors: Option<usize>,
    pub kernel: Option<DitherKernel>,
    pub intensity: Option<f32>,
    pub serpentine: Option<bool>,
    pub sigma_space: Option<f64>,
    pub sigma_color: Option<f64>,
    pub kernel_size: Option<usize>,
    pub iterations: Option<usize>,
}

impl ParamOverrides {
    pub fn apply(&self, mut params: PipelineParams) -> PipelineParams {
        if let Some(colors) = self.colors {
            params.quantization.color_count = colors;
        }
        if let Some(kernel) = self.kernel {
            params.dither.kernel = kernel;
        }
        if let Some(intensity) = self.intensity {
            params.dither.intensity = intensity;
        }
        if let Some(serpentine) = self.serpentine {
            params.dither.serpentine = serpentine;
        }
        if let Some(sigma) = self.sigma_space {
            params.filter.sigma_space = sigma;
        }
        if let Some(sigma) = self.sigma_color {
            params.filter.sigma_color = sigma;
        }
        if let Some(size) = self.kernel_size {
            params.filter.kernel_size = size;
        }
        if let Some(iterations) = self.iterations {
            params.filter.iterations = iterations;
        }
        params
    }
}

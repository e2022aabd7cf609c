use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use embroidery_quant::{DitherKernel, PipelineOutput};
use stitchquant::models::{AppConfig, ParamOverrides, CONFIG_ENV};
use stitchquant::rendering::{read_png, write_png};
use stitchquant::services::{read_palette_file, write_palette_report, PipelineWorker};

#[derive(Parser)]
#[command(name = "stitchquant")]
#[command(about = "Reduce photos to embroidery thread palettes")]
struct Cli {
    /// YAML configuration file (defaults to $STITCHQUANT_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Filter, quantize and dither a PNG
    Process {
        /// Input PNG file
        input: PathBuf,

        /// Output PNG file for the dithered result
        #[arg(short, long)]
        output: PathBuf,

        /// Also write the bilateral filter output
        #[arg(long)]
        filtered: Option<PathBuf>,

        /// Also write the palette with stitch counts as JSON
        #[arg(long)]
        palette: Option<PathBuf>,

        /// Named preset (see `stitchquant presets`)
        #[arg(short, long)]
        preset: Option<String>,

        /// Number of thread colors (2-256)
        #[arg(short = 'n', long)]
        colors: Option<usize>,

        /// Dither kernel (none, floyd-steinberg, atkinson, burkes, stucki,
        /// sierra2, sierra3, sierra-lite)
        #[arg(short, long)]
        kernel: Option<DitherKernel>,

        /// Error diffusion intensity (0.0-1.0)
        #[arg(long)]
        intensity: Option<f32>,

        /// Scan every row left to right
        #[arg(long)]
        no_serpentine: bool,

        /// Bilateral filter spatial sigma
        #[arg(long)]
        sigma_space: Option<f64>,

        /// Bilateral filter color sigma
        #[arg(long)]
        sigma_color: Option<f64>,

        /// Bilateral filter window size (odd)
        #[arg(long)]
        kernel_size: Option<usize>,

        /// Bilateral filter passes
        #[arg(long)]
        iterations: Option<usize>,

        /// Give up after this many seconds
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Process a downscaled preview instead of the full image
        #[arg(long)]
        preview: bool,
    },
    /// Dither a PNG against an existing palette file
    Apply {
        /// Input PNG file
        input: PathBuf,

        /// Palette as JSON (from `process --palette`) or a hex list
        #[arg(long)]
        palette_file: PathBuf,

        /// Output PNG file
        #[arg(short, long)]
        output: PathBuf,

        /// Dither kernel
        #[arg(short, long)]
        kernel: Option<DitherKernel>,

        /// Error diffusion intensity (0.0-1.0)
        #[arg(long)]
        intensity: Option<f32>,

        /// Scan every row left to right
        #[arg(long)]
        no_serpentine: bool,
    },
    /// List the available presets
    Presets,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Process {
            input,
            output,
            filtered,
            palette,
            preset,
            colors,
            kernel,
            intensity,
            no_serpentine,
            sigma_space,
            sigma_color,
            kernel_size,
            iterations,
            timeout_secs,
            preview,
        }) => {
            init_logging();
            let config = AppConfig::load(cli.config.as_deref());
            let overrides = ParamOverrides {
                colors,
                kernel,
                intensity,
                serpentine: no_serpentine.then_some(false),
                sigma_space,
                sigma_color,
                kernel_size,
                iterations,
            };
            let outputs = ProcessOutputs {
                output,
                filtered,
                palette,
            };
            run_process_command(
                config,
                &input,
                &outputs,
                preset.as_deref(),
                &overrides,
                timeout_secs,
                preview,
            )
            .await
        }
        Some(Commands::Apply {
            input,
            palette_file,
            output,
            kernel,
            intensity,
            no_serpentine,
        }) => {
            init_logging();
            let config = AppConfig::load(cli.config.as_deref());
            let overrides = ParamOverrides {
                kernel,
                intensity,
                serpentine: no_serpentine.then_some(false),
                ..Default::default()
            };
            run_apply_command(config, &input, &palette_file, &output, &overrides).await
        }
        Some(Commands::Presets) => {
            let config = AppConfig::load(cli.config.as_deref());
            run_presets_command(&config);
            Ok(())
        }
        None => {
            run_status_command(cli.config.as_deref());
            Ok(())
        }
    }
}

/// Minimal logging for CLI
fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stitchquant=info,embroidery_quant=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();
}

struct ProcessOutputs {
    output: PathBuf,
    filtered: Option<PathBuf>,
    palette: Option<PathBuf>,
}

async fn run_process_command(
    mut config: AppConfig,
    input: &Path,
    outputs: &ProcessOutputs,
    preset: Option<&str>,
    overrides: &ParamOverrides,
    timeout_secs: Option<u64>,
    preview: bool,
) -> anyhow::Result<()> {
    let raster = read_png(input)?;
    tracing::info!(
        path = %input.display(),
        width = raster.width(),
        height = raster.height(),
        "Loaded image"
    );

    let params = overrides.apply(config.resolve_params(preset, raster.pixel_count())?);

    if let Some(secs) = timeout_secs {
        config.worker.timeout_secs = secs;
    }
    let worker = PipelineWorker::new(&config.worker);
    let job = if preview {
        worker.submit_preview(&raster, params)
    } else {
        worker.submit(raster, params)
    };
    let result = job.wait().await?;

    write_png(&outputs.output, &result.final_raster)?;
    if let Some(path) = &outputs.filtered {
        write_png(path, &result.filtered)?;
    }
    if let Some(path) = &outputs.palette {
        write_palette_report(path, &result.palette, &result.final_raster)?;
    }

    print_summary(&outputs.output, &result);
    Ok(())
}

async fn run_apply_command(
    config: AppConfig,
    input: &Path,
    palette_file: &Path,
    output: &Path,
    overrides: &ParamOverrides,
) -> anyhow::Result<()> {
    let raster = read_png(input)?;
    let palette = read_palette_file(palette_file)?;
    tracing::info!(
        path = %palette_file.display(),
        colors = palette.len(),
        "Loaded palette"
    );

    let params = overrides.apply(config.resolve_params(None, raster.pixel_count())?);
    let worker = PipelineWorker::new(&config.worker);
    let result = worker.submit_apply(raster, params, palette).wait().await?;

    write_png(output, &result.final_raster)?;
    print_summary(output, &result);
    Ok(())
}

fn run_presets_command(config: &AppConfig) {
    println!("Presets:\n");
    for (name, preset) in config.all_presets() {
        println!(
            "  {name:<10} {:>3} colors  {:<16} intensity {:.2}  min hue {}",
            preset.quantization.color_count,
            preset.dither.kernel.name(),
            preset.dither.intensity,
            preset.quantization.min_hue_colors,
        );
        if !preset.description.is_empty() {
            println!("             {}", preset.description);
        }
    }
}

fn run_status_command(config_path: Option<&Path>) {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    let config_env = std::env::var(CONFIG_ENV).ok();

    println!("Stitchquant v{VERSION} - embroidery palette reduction\n");
    println!("Configuration:");
    println!(
        "  --config           = {}",
        config_path
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(not set)".to_string())
    );
    println!(
        "  {CONFIG_ENV} = {}",
        config_env.as_deref().unwrap_or("(not set)")
    );
    println!("\nRun 'stitchquant process <input.png> -o <output.png>' to convert an image,");
    println!("or 'stitchquant --help' for all commands.");
}

fn print_summary(output: &Path, result: &PipelineOutput) {
    println!(
        "Wrote {} ({}x{}, {} colors, {:.0} ms)",
        output.display(),
        result.final_raster.width(),
        result.final_raster.height(),
        result.palette.len(),
        result.processing_ms()
    );
}

//! Domain-critical regression tests for embroidery-quant.
//!
//! These tests exercise the stages together and pin down the properties a
//! caller relies on, not just happy paths. Each test documents the
//! regression it guards against.

#[cfg(test)]
mod domain_tests {
    use pretty_assertions::assert_eq;

    use crate::api::{CancelToken, Pipeline, PipelineParams, QuantError, Stage};
    use crate::color::Color;
    use crate::dither::{DitherKernel, DitherOptions, Ditherer};
    use crate::filter::FilterParameters;
    use crate::palette::{Palette, PaletteBuilder, QuantizationParameters};
    use crate::raster::Raster;

    fn checkerboard(size: usize) -> Raster {
        let colors: Vec<Color> = (0..size * size)
            .map(|i| {
                if (i % size + i / size) % 2 == 0 {
                    Color::rgb(0, 0, 0)
                } else {
                    Color::rgb(255, 255, 255)
                }
            })
            .collect();
        Raster::from_colors(size, size, &colors).unwrap()
    }

    fn color_wheel(width: usize, height: usize) -> Raster {
        let colors: Vec<Color> = (0..width * height)
            .map(|i| {
                let x = (i % width) as f32 / width as f32;
                let y = (i / width) as f32 / height as f32;
                Color::from_f32_clamped(255.0 * x, 255.0 * (1.0 - x) * y, 255.0 * (1.0 - y), 255.0)
            })
            .collect();
        Raster::from_colors(width, height, &colors).unwrap()
    }

    fn sample_palette() -> Palette {
        Palette::from_hex(&["#000000", "#ffffff", "#c83030", "#2050c0", "#30a040", "#e0c020"])
            .unwrap()
    }

    // ========================================================================
    // End-to-end fixtures
    // ========================================================================

    /// If this breaks, it means: a single-color image is no longer a fixed
    /// point of the pipeline, so filtering or dithering shifts flat areas.
    #[test]
    fn test_uniform_red_is_fixed_point() {
        let red = Color::rgb(255, 0, 0);
        let raster = Raster::filled(2, 2, red);
        let params = PipelineParams {
            quantization: QuantizationParameters::new(2),
            ..PipelineParams::default()
        };

        let output = Pipeline::new(params).run(&raster).unwrap();

        assert_eq!(output.palette.colors(), &[red]);
        assert_eq!(output.filtered, raster);
        assert_eq!(output.final_raster, raster);
    }

    /// If this breaks, it means: the color count lower bound is no longer
    /// enforced before pixel work.
    #[test]
    fn test_single_color_palette_rejected() {
        let raster = Raster::filled(2, 2, Color::rgb(255, 0, 0));
        let params = PipelineParams {
            quantization: QuantizationParameters::new(1),
            ..PipelineParams::default()
        };
        let err = Pipeline::new(params).run(&raster).unwrap_err();
        assert!(matches!(
            err,
            QuantError::InvalidParameter {
                stage: Stage::Palette,
                ..
            }
        ));
    }

    /// If this breaks, it means: the bilateral filter is bleeding across
    /// hard edges, or the two-color palette no longer keeps exact extremes.
    #[test]
    fn test_checkerboard_keeps_black_and_white() {
        let raster = checkerboard(4);
        let params = PipelineParams {
            filter: FilterParameters::default()
                .sigma_space(15.0)
                .sigma_color(30.0)
                .kernel_size(3),
            quantization: QuantizationParameters::new(2),
            ..PipelineParams::default()
        };

        let output = Pipeline::new(params).run(&raster).unwrap();

        assert_eq!(
            output.palette.colors(),
            &[Color::rgb(0, 0, 0), Color::rgb(255, 255, 255)]
        );
        let nearest = output
            .filtered
            .map_colors(|c| output.palette.nearest_color(c).with_alpha(c.a));
        assert_eq!(output.final_raster, nearest);
    }

    // ========================================================================
    // Palette properties
    // ========================================================================

    /// If this breaks, it means: an image with few colors gets invented or
    /// duplicated palette entries.
    #[test]
    fn test_small_images_keep_exact_colors() {
        let colors = [
            Color::rgb(10, 20, 30),
            Color::rgb(200, 10, 10),
            Color::rgb(10, 200, 10),
        ];
        let raster = Raster::from_colors(3, 1, &colors).unwrap();
        for count in [3, 4, 16, 256] {
            let palette = PaletteBuilder::new(QuantizationParameters::new(count))
                .build(&raster)
                .unwrap();
            let mut got = palette.colors().to_vec();
            got.sort_by_key(|c| c.rgb_key());
            let mut expected = colors.to_vec();
            expected.sort_by_key(|c| c.rgb_key());
            assert_eq!(got, expected, "color_count {count}");
        }
    }

    /// If this breaks, it means: palette construction depends on hash
    /// iteration order or on how rayon split the histogram.
    #[test]
    fn test_palette_builder_deterministic() {
        let raster = color_wheel(48, 32);
        let builder = PaletteBuilder::new(QuantizationParameters::new(12));
        let first = builder.build(&raster).unwrap();
        for _ in 0..3 {
            assert_eq!(builder.build(&raster).unwrap(), first);
        }
        assert_eq!(first.len(), 12);
    }

    // ========================================================================
    // Ditherer properties
    // ========================================================================

    /// If this breaks, it means: kernel None leaks state between pixels, so
    /// its output depends on scan order.
    #[test]
    fn test_kernel_none_is_nearest_mapping() {
        let raster = color_wheel(9, 7);
        let palette = sample_palette();
        let expected = raster.map_colors(|c| palette.nearest_color(c).with_alpha(c.a));

        for serpentine in [false, true] {
            let options = DitherOptions::new()
                .kernel(DitherKernel::None)
                .serpentine(serpentine);
            let out = Ditherer::new(options)
                .unwrap()
                .dither(&raster, &palette)
                .unwrap();
            assert_eq!(out, expected, "serpentine {serpentine}");
        }
    }

    /// If this breaks, it means: serpentine mode no longer reverses odd rows
    /// (or the kernel is not mirrored), or kernel None started diffusing.
    #[test]
    fn test_serpentine_changes_diffusion_only() {
        let raster = Raster::filled(6, 4, Color::rgb(64, 64, 64));
        let palette = Palette::new(&[Color::rgb(0, 0, 0), Color::rgb(255, 255, 255)]).unwrap();

        let run = |kernel: DitherKernel, serpentine: bool| {
            let options = DitherOptions::new()
                .kernel(kernel)
                .intensity(1.0)
                .serpentine(serpentine);
            Ditherer::new(options)
                .unwrap()
                .dither_indices(&raster, &palette)
                .unwrap()
        };

        let plain = run(DitherKernel::FloydSteinberg, false);
        let snake = run(DitherKernel::FloydSteinberg, true);
        assert_eq!(plain[..6], snake[..6], "first row scans left-to-right in both modes");
        assert_ne!(plain, snake);

        assert_eq!(run(DitherKernel::None, false), run(DitherKernel::None, true));
    }

    /// If this breaks, it means: reverse rows push error into pixels they
    /// already finished instead of the ones still ahead of the scan.
    #[test]
    fn test_reverse_row_error_lands_ahead() {
        let black = Color::rgb(0, 0, 0);
        let gray = Color::rgb(110, 110, 110);
        let raster = Raster::from_colors(3, 2, &[black, black, black, black, gray, gray]).unwrap();
        let palette = Palette::new(&[black, Color::rgb(255, 255, 255)]).unwrap();

        for kernel in [DitherKernel::SierraLite, DitherKernel::Atkinson] {
            let run = |serpentine: bool| {
                let options = DitherOptions::new()
                    .kernel(kernel)
                    .intensity(1.0)
                    .serpentine(serpentine);
                Ditherer::new(options)
                    .unwrap()
                    .dither_indices(&raster, &palette)
                    .unwrap()
            };

            // Gray 110 alone maps to black; its carried error tips the next one white
            assert_eq!(run(false), vec![0, 0, 0, 0, 0, 1], "{kernel} left-to-right");
            assert_eq!(run(true), vec![0, 0, 0, 0, 1, 0], "{kernel} serpentine");
        }
    }

    /// If this breaks, it means: a kernel table was edited and now gains or
    /// loses energy.
    #[test]
    fn test_kernel_propagation() {
        for kernel in DitherKernel::ALL {
            let Some(matrix) = kernel.kernel() else {
                continue;
            };
            let expected = if kernel == DitherKernel::Atkinson { 0.75 } else { 1.0 };
            assert!(
                (matrix.propagation() - expected).abs() < 1e-9,
                "{kernel}: {}",
                matrix.propagation()
            );
        }
    }

    /// If this breaks, it means: dithered output contains colors outside the
    /// palette.
    #[test]
    fn test_output_uses_palette_colors_only() {
        let raster = color_wheel(20, 12);
        let palette = sample_palette();
        for kernel in DitherKernel::ALL {
            let out = Ditherer::new(DitherOptions::new().kernel(kernel))
                .unwrap()
                .dither(&raster, &palette)
                .unwrap();
            assert!(out.colors().all(|c| palette.contains(c)), "{kernel}");
        }
    }

    // ========================================================================
    // Cancellation
    // ========================================================================

    /// If this breaks, it means: a cancellation raised after palette
    /// construction is ignored and a final raster is still produced.
    #[test]
    fn test_cancel_between_palette_and_dither() {
        let token = CancelToken::new();
        let trigger = token.clone();
        let params = PipelineParams {
            quantization: QuantizationParameters::new(4),
            ..PipelineParams::default()
        };

        let mut completed = Vec::new();
        let result = Pipeline::new(params).run_with(&color_wheel(16, 16), &token, |stage| {
            completed.push(stage);
            if stage == Stage::Palette {
                trigger.cancel();
            }
        });

        assert_eq!(result, Err(QuantError::Cancelled { stage: Stage::Dither }));
        assert_eq!(completed, vec![Stage::Filter, Stage::Palette]);
    }

    // ========================================================================
    // Color distance
    // ========================================================================

    /// If this breaks, it means: distance picked up an alpha dependency or
    /// lost symmetry, which would make nearest-color lookups order dependent.
    #[test]
    fn test_distance_properties() {
        let a = Color::new(200, 30, 90, 10);
        let b = Color::new(15, 160, 220, 255);
        assert_eq!(a.distance(b), b.distance(a));
        assert!(a.distance(b) > 0.0);
        assert_eq!(a.distance(Color::new(200, 30, 90, 255)), 0.0);
        assert!(a.distance(Color::new(201, 30, 90, 10)) > 0.0);
    }
}

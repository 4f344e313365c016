#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::io::Cursor;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tiff::decoder::{Decoder, DecodingResult};

    use crate::image_pipeline::bridge::ChannelState;
    use crate::image_pipeline::codec::{ImageCodec, TiffCodec};
    use crate::image_pipeline::common::error::PipelineError;
    use crate::image_pipeline::context::{
        FrameFlags, ImageContext, PixelFormat, Resolution, StoreFormat,
    };
    use crate::image_pipeline::engine::{EngineConfig, ImageProcessor};
    use crate::image_pipeline::strategies::{
        CellDelegateProcessor, ConvolutionProcessor, GrayscaleProcessor, Kernel,
        PixelDelegateProcessor, PixelInfo, PixelMetadata, Rgb,
    };

    fn pattern(width: usize, height: usize, bpp: usize) -> Vec<u8> {
        let mut data = Vec::with_capacity(width * height * bpp);
        for y in 0..height {
            for x in 0..width {
                for c in 0..bpp {
                    data.push(((x * 7 + y * 13 + c * 31) % 256) as u8);
                }
            }
        }
        data
    }

    fn checkerboard(width: usize, height: usize) -> Vec<u8> {
        let mut data = Vec::with_capacity(width * height * 3);
        for y in 0..height {
            for x in 0..width {
                let v = if (x + y) % 2 == 0 { 200 } else { 0 };
                data.extend_from_slice(&[v, v / 2, v / 4]);
            }
        }
        data
    }

    fn rgb_tiff(width: usize, height: usize, rgb: &[u8]) -> Vec<u8> {
        let mut buffer = Vec::new();
        let mut encoder = tiff::encoder::TiffEncoder::new(Cursor::new(&mut buffer)).unwrap();
        encoder
            .write_image::<tiff::encoder::colortype::RGB8>(width as u32, height as u32, rgb)
            .unwrap();
        buffer
    }

    fn tiff_samples(data: &[u8]) -> Vec<u8> {
        match Decoder::new(Cursor::new(data)).unwrap().read_image().unwrap() {
            DecodingResult::U8(values) => values,
            _ => panic!("expected 8-bit samples"),
        }
    }

    fn pixels(config: EngineConfig) -> PixelDelegateProcessor {
        PixelDelegateProcessor::new(config).unwrap()
    }

    fn identity(pixel: &PixelInfo) -> Rgb {
        pixel.rgb()
    }

    #[test]
    fn test_scenario_swap_red_blue_on_raw_rgb24() {
        let mut ctx = ImageContext::raw(
            [10u8, 20, 30].repeat(64),
            Resolution::new(8, 8),
            PixelFormat::Rgb24,
        );
        let layout_before = ctx.layout;
        let processor = pixels(EngineConfig::builder().cells(2, 2).build());

        processor
            .apply(&mut ctx, |p: &PixelInfo| (p.blue, p.green, p.red), PixelInfo::default())
            .unwrap();

        assert!(ctx.is_raw());
        assert_eq!(ctx.layout, layout_before);
        assert_eq!(ctx.stride(), Some(24));
        assert_eq!(ctx.data, [30u8, 20, 10].repeat(64));

        let prepared = processor.engine().prepare(&mut ctx).unwrap();
        assert_eq!(prepared.channels, ChannelState::RGB);
    }

    #[test]
    fn test_identity_preserves_raw_bytes() {
        let source = pattern(13, 9, 3);
        let mut ctx = ImageContext::raw(source.clone(), Resolution::new(13, 9), PixelFormat::Rgb24);

        pixels(EngineConfig::builder().cells(3, 2).build())
            .apply(&mut ctx, identity, PixelInfo::default())
            .unwrap();

        assert!(ctx.is_raw());
        assert_eq!(ctx.data, source);
    }

    #[test]
    fn test_identity_preserves_padded_rgba_rows() {
        // 5x3 Rgba32 with 4 bytes of padding per row
        let stride = 24;
        let mut source = Vec::new();
        for row in pattern(5, 3, 4).chunks(20) {
            source.extend_from_slice(row);
            source.extend_from_slice(&[0xAB; 4]);
        }
        let mut ctx = ImageContext::raw_with_stride(
            source.clone(),
            Resolution::new(5, 3),
            stride,
            PixelFormat::Rgba32,
        );

        pixels(EngineConfig::default())
            .apply(&mut ctx, identity, PixelInfo::default())
            .unwrap();

        assert_eq!(ctx.data, source);
    }

    #[test]
    fn test_encode_round_trip_is_lossless() {
        let rgb = pattern(12, 10, 3);
        let original = rgb_tiff(12, 10, &rgb);
        let mut ctx = ImageContext::encoded(original.clone()).with_store_format(StoreFormat::tiff());

        pixels(EngineConfig::builder().cells(2, 5).build())
            .apply(&mut ctx, identity, PixelInfo::default())
            .unwrap();

        assert!(!ctx.is_raw());
        assert_eq!(ctx.resolution, Resolution::new(12, 10));
        let before = TiffCodec.decode(&original).unwrap();
        let after = TiffCodec.decode(&ctx.data).unwrap();
        assert_eq!(after.data, before.data);
        assert_eq!(tiff_samples(&ctx.data), rgb);
    }

    #[test]
    fn test_pixel_function_sees_rgb_for_encoded_source() {
        let mut ctx = ImageContext::encoded(rgb_tiff(2, 2, &[10u8, 20, 30].repeat(4)))
            .with_store_format(StoreFormat::tiff());
        let seen = Mutex::new(Vec::new());

        pixels(EngineConfig::default())
            .apply(
                &mut ctx,
                |p: &PixelInfo| {
                    seen.lock().unwrap().push(p.rgb());
                    (p.red + 1, p.green, p.blue)
                },
                PixelInfo::default(),
            )
            .unwrap();

        assert!(seen.lock().unwrap().iter().all(|&px| px == (10, 20, 30)));
        assert_eq!(tiff_samples(&ctx.data), [11u8, 20, 30].repeat(4));
    }

    #[test]
    fn test_raw_source_with_store_format_encodes_correct_colours() {
        let rgb = pattern(6, 4, 3);
        let mut ctx = ImageContext::raw(rgb.clone(), Resolution::new(6, 4), PixelFormat::Rgb24)
            .with_store_format(StoreFormat::tiff());

        pixels(EngineConfig::builder().cells(2, 2).build())
            .apply(&mut ctx, identity, PixelInfo::default())
            .unwrap();

        assert!(!ctx.is_raw());
        assert_eq!(tiff_samples(&ctx.data), rgb);
    }

    #[test]
    fn test_encoded_source_returned_raw_is_rgb() {
        let rgb = pattern(4, 3, 3);
        let mut ctx = ImageContext::encoded(rgb_tiff(4, 3, &rgb));

        pixels(EngineConfig::default())
            .apply(&mut ctx, identity, PixelInfo::default())
            .unwrap();

        assert!(ctx.is_raw());
        assert_eq!(ctx.pixel_format(), Some(PixelFormat::Rgb24));
        assert_eq!(ctx.resolution, Resolution::new(4, 3));
        assert_eq!(ctx.data, rgb);
    }

    #[test]
    fn test_every_pixel_visited_exactly_once() {
        let (width, height) = (37, 23);
        let processor = pixels(EngineConfig::builder().cells(5, 4).build());

        for _ in 0..5 {
            let mut ctx = ImageContext::raw(
                vec![0; width * height * 3],
                Resolution::new(width, height),
                PixelFormat::Rgb24,
            );
            let calls = AtomicUsize::new(0);
            let visited = Mutex::new(HashSet::new());

            processor
                .apply(
                    &mut ctx,
                    |p: &PixelInfo| {
                        calls.fetch_add(1, Ordering::Relaxed);
                        assert!(visited.lock().unwrap().insert((p.x, p.y)));
                        p.rgb()
                    },
                    PixelInfo::default(),
                )
                .unwrap();

            assert_eq!(calls.load(Ordering::Relaxed), width * height);
            assert_eq!(visited.lock().unwrap().len(), width * height);
        }
    }

    #[test]
    fn test_channels_only_mode_skips_position() {
        let mut ctx = ImageContext::raw(vec![5; 4 * 4 * 3], Resolution::new(4, 4), PixelFormat::Rgb24);
        let initial = PixelInfo {
            x: 999,
            y: 999,
            ..Default::default()
        };

        pixels(EngineConfig::builder().cells(2, 2).build())
            .apply_channels_only(
                &mut ctx,
                |p: &PixelInfo| {
                    assert_eq!((p.x, p.y), (999, 999));
                    assert_eq!((p.width, p.height), (4, 4));
                    (p.red * 2, p.green, p.blue)
                },
                initial,
            )
            .unwrap();

        assert!(ctx.data.chunks(3).all(|px| px == [10u8, 5, 5]));
    }

    #[test]
    fn test_panicking_pixel_function_returns_buffer() {
        let source = pattern(4, 4, 3);
        let mut ctx = ImageContext::raw(source.clone(), Resolution::new(4, 4), PixelFormat::Rgb24);

        let result = pixels(EngineConfig::builder().cells(2, 2).build()).apply(
            &mut ctx,
            |p: &PixelInfo| {
                if p.x == 3 {
                    panic!("bad pixel at {}", p.y);
                }
                p.rgb()
            },
            PixelInfo::default(),
        );

        assert!(matches!(result, Err(PipelineError::ProcessingError(_))));
        assert!(ctx.is_raw());
        assert_eq!(ctx.stride(), Some(12));
        assert_eq!(ctx.data.len(), source.len());
        assert_eq!(ctx.data, source);
    }

    #[derive(Clone)]
    struct ThresholdPixel {
        base: PixelInfo,
        threshold: u8,
    }

    impl PixelMetadata for ThresholdPixel {
        fn set_width(&mut self, width: usize) {
            self.base.set_width(width);
        }
        fn set_height(&mut self, height: usize) {
            self.base.set_height(height);
        }
        fn set_x(&mut self, x: usize) {
            self.base.set_x(x);
        }
        fn set_y(&mut self, y: usize) {
            self.base.set_y(y);
        }
        fn set_red(&mut self, red: u8) {
            self.base.set_red(red);
        }
        fn set_green(&mut self, green: u8) {
            self.base.set_green(green);
        }
        fn set_blue(&mut self, blue: u8) {
            self.base.set_blue(blue);
        }
    }

    #[test]
    fn test_custom_metadata_carries_extra_context() {
        let source = pattern(8, 8, 3);
        let mut ctx = ImageContext::raw(source.clone(), Resolution::new(8, 8), PixelFormat::Rgb24);
        let initial = ThresholdPixel {
            base: PixelInfo::default(),
            threshold: 128,
        };

        pixels(EngineConfig::builder().cells(2, 2).build())
            .apply(
                &mut ctx,
                |p: &ThresholdPixel| {
                    let on = |v: u8| if v >= p.threshold { 255 } else { 0 };
                    (on(p.base.red), on(p.base.green), on(p.base.blue))
                },
                initial,
            )
            .unwrap();

        let expected: Vec<u8> = source.iter().map(|&v| if v >= 128 { 255 } else { 0 }).collect();
        assert_eq!(ctx.data, expected);
    }

    #[test]
    fn test_identity_kernel_leaves_image_unchanged() {
        let source = pattern(16, 16, 3);
        let mut ctx = ImageContext::raw(source.clone(), Resolution::new(16, 16), PixelFormat::Rgb24);

        ConvolutionProcessor::new(Kernel::identity(), EngineConfig::builder().cells(2, 2).build())
            .unwrap()
            .apply(&mut ctx)
            .unwrap();

        assert_eq!(ctx.data, source);
    }

    #[test]
    fn test_convolution_leaves_top_left_band_untouched() {
        let (width, height) = (16, 16);
        let source = checkerboard(width, height);
        let mut ctx = ImageContext::raw(source.clone(), Resolution::new(width, height), PixelFormat::Rgb24);

        ConvolutionProcessor::new(Kernel::box_blur(), EngineConfig::builder().cells(2, 2).build())
            .unwrap()
            .apply(&mut ctx)
            .unwrap();

        let mut interior_changed = false;
        for y in 0..height {
            for x in 0..width {
                let i = (y * width + x) * 3;
                if x <= 3 || y <= 3 {
                    assert_eq!(ctx.data[i..i + 3], source[i..i + 3], "pixel ({}, {})", x, y);
                } else if ctx.data[i..i + 3] != source[i..i + 3] {
                    interior_changed = true;
                }
            }
        }
        assert!(interior_changed);
        // No matching band on the far edges.
        let last = ((height - 1) * width + width - 1) * 3;
        assert_ne!(ctx.data[last..last + 3], source[last..last + 3]);
    }

    #[test]
    fn test_convolution_is_single_pass_in_place() {
        // Each pixel takes its left neighbour. Columns are visited left to right, so the
        // first filtered column's value propagates across the whole row.
        let (width, height) = (8, 6);
        let mut source = Vec::new();
        for _y in 0..height {
            for x in 0..width {
                source.extend_from_slice(&[(x * 10) as u8, (x * 10 + 1) as u8, (x * 10 + 2) as u8]);
            }
        }
        let kernel =
            Kernel::from_rows([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 0.0]]).unwrap();
        let mut ctx = ImageContext::raw(source.clone(), Resolution::new(width, height), PixelFormat::Rgb24);

        ConvolutionProcessor::new(kernel, EngineConfig::builder().cells(1, 1).build())
            .unwrap()
            .apply(&mut ctx)
            .unwrap();

        for y in 4..height {
            for x in 4..width {
                let i = (y * width + x) * 3;
                assert_eq!(ctx.data[i..i + 3], [30u8, 31, 32], "pixel ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_convolution_swaps_for_raw_source_with_store_format() {
        let rgb = pattern(10, 10, 3);
        let mut ctx = ImageContext::raw(rgb.clone(), Resolution::new(10, 10), PixelFormat::Rgb24)
            .with_store_format(StoreFormat::tiff());

        ConvolutionProcessor::new(Kernel::identity(), EngineConfig::builder().cells(2, 2).build())
            .unwrap()
            .apply(&mut ctx)
            .unwrap();

        assert_eq!(tiff_samples(&ctx.data), rgb);
    }

    #[test]
    fn test_convolution_swap_waits_for_every_cell() {
        let uniform = [10u8, 20, 200].repeat(16 * 16);

        for threads in [Some(1), None] {
            let config = EngineConfig::builder()
                .cells(2, 2)
                .worker_threads(threads)
                .build();
            let mut ctx =
                ImageContext::raw(uniform.clone(), Resolution::new(16, 16), PixelFormat::Rgb24)
                    .with_store_format(StoreFormat::tiff());

            ConvolutionProcessor::new(Kernel::sharpen(), config)
                .unwrap()
                .apply(&mut ctx)
                .unwrap();

            assert_eq!(tiff_samples(&ctx.data), uniform, "threads {:?}", threads);
        }
    }

    #[test]
    fn test_convolution_with_store_format_matches_raw_output() {
        let rgb = pattern(20, 14, 3);
        let config = || {
            EngineConfig::builder()
                .cells(3, 2)
                .worker_threads(Some(1))
                .build()
        };

        for kernel in [Kernel::sharpen(), Kernel::box_blur()] {
            let processor = ConvolutionProcessor::new(kernel, config()).unwrap();

            let mut reference =
                ImageContext::raw(rgb.clone(), Resolution::new(20, 14), PixelFormat::Rgb24);
            processor.apply(&mut reference).unwrap();

            let mut stored = ImageContext::raw(rgb.clone(), Resolution::new(20, 14), PixelFormat::Rgb24)
                .with_store_format(StoreFormat::tiff());
            processor.apply(&mut stored).unwrap();

            assert_ne!(reference.data, rgb);
            assert_eq!(tiff_samples(&stored.data), reference.data);
        }
    }

    #[test]
    fn test_convolution_on_encoded_source_matches_raw_output() {
        let rgb = pattern(15, 11, 3);
        let config = || {
            EngineConfig::builder()
                .cells(1, 1)
                .worker_threads(Some(1))
                .build()
        };

        for kernel in [Kernel::sharpen(), Kernel::box_blur()] {
            let processor = ConvolutionProcessor::new(kernel, config()).unwrap();

            let mut reference =
                ImageContext::raw(rgb.clone(), Resolution::new(15, 11), PixelFormat::Rgb24);
            processor.apply(&mut reference).unwrap();

            let mut encoded = ImageContext::encoded(rgb_tiff(15, 11, &rgb))
                .with_store_format(StoreFormat::tiff());
            processor.apply(&mut encoded).unwrap();
            assert_eq!(tiff_samples(&encoded.data), reference.data);

            let mut returned_raw = ImageContext::encoded(rgb_tiff(15, 11, &rgb));
            processor.apply(&mut returned_raw).unwrap();
            assert_eq!(returned_raw.data, reference.data);
        }
    }

    #[test]
    fn test_apply_kernel_overrides_own_kernel() {
        let source = checkerboard(12, 12);
        let processor =
            ConvolutionProcessor::new(Kernel::sharpen(), EngineConfig::builder().cells(3, 3).build())
                .unwrap();
        let mut ctx = ImageContext::raw(source.clone(), Resolution::new(12, 12), PixelFormat::Rgb24);

        processor.apply_kernel(&Kernel::identity(), &mut ctx).unwrap();

        assert_eq!(ctx.data, source);
        assert_eq!(processor.kernel(), &Kernel::sharpen());
    }

    #[test]
    fn test_cell_hook_called_once_per_cell() {
        let cells = Mutex::new(Vec::new());
        let processor = CellDelegateProcessor::new(
            EngineConfig::builder().cells(3, 2).build(),
            |task| {
                cells.lock().unwrap().push(task.cell);
                let green = ChannelState::GREEN_OFFSET;
                for y in task.cell.y..task.cell.bottom() {
                    for x in task.cell.x..task.cell.right() {
                        task.buffer.set(task.pixel_index(x, y) + green, 99);
                    }
                }
                Ok(())
            },
        )
        .unwrap();
        let mut ctx = ImageContext::raw(vec![0; 9 * 4 * 3], Resolution::new(9, 4), PixelFormat::Rgb24);

        processor.apply(&mut ctx).unwrap();

        assert_eq!(cells.lock().unwrap().len(), 6);
        assert!(ctx.data.chunks(3).all(|px| px == [0u8, 99, 0]));
    }

    #[test]
    fn test_cell_hook_failure_is_processing_error() {
        let processor = CellDelegateProcessor::new(EngineConfig::builder().cells(2, 2).build(), |task| {
            if task.cell.x == 0 && task.cell.y == 0 {
                anyhow::bail!("refusing the first cell");
            }
            Ok(())
        })
        .unwrap();
        let mut ctx = ImageContext::raw(vec![0; 4 * 4 * 3], Resolution::new(4, 4), PixelFormat::Rgb24);

        let result = processor.apply(&mut ctx);

        match result {
            Err(PipelineError::ProcessingError(e)) => {
                assert!(format!("{:#}", e).contains("refusing the first cell"));
            }
            other => panic!("expected ProcessingError, got {:?}", other),
        }
        assert!(ctx.is_raw());
    }

    #[test]
    fn test_grayscale_on_encoded_source() {
        let mut ctx = ImageContext::encoded(rgb_tiff(3, 3, &[200u8, 0, 0].repeat(9)))
            .with_store_format(StoreFormat::tiff());

        GrayscaleProcessor::new(EngineConfig::default())
            .unwrap()
            .apply(&mut ctx)
            .unwrap();

        assert_eq!(tiff_samples(&ctx.data), [60u8, 60, 60].repeat(9));
    }

    #[test]
    fn test_unsupported_store_format_reports_encode_error() {
        let source = pattern(4, 4, 3);
        let mut ctx = ImageContext::raw(source.clone(), Resolution::new(4, 4), PixelFormat::Rgb24)
            .with_store_format(StoreFormat::Png);

        let result = pixels(EngineConfig::default()).apply(&mut ctx, identity, PixelInfo::default());

        assert!(matches!(result, Err(PipelineError::EncodeError(_))));
        assert!(ctx.is_raw());
        assert_eq!(ctx.data, source);
    }

    #[test]
    fn test_flags_pass_through_untouched() {
        let flags = FrameFlags {
            eos: true,
            key_frame: true,
            timestamp: Some(123_456),
        };
        let mut ctx = ImageContext::raw(vec![1; 2 * 2 * 3], Resolution::new(2, 2), PixelFormat::Rgb24)
            .with_flags(flags);

        pixels(EngineConfig::default())
            .apply(&mut ctx, identity, PixelInfo::default())
            .unwrap();

        assert_eq!(ctx.flags, flags);
    }
}

use cellgrid_rs::image_pipeline::strategies::filters;
use cellgrid_rs::image_pipeline::{
    CellDelegateProcessor, CellTask, ConvolutionProcessor, EngineConfig, ImageContext,
    ImageProcessor, Kernel, PixelDelegateProcessor, PixelFormat, PixelInfo, Resolution,
};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

fn generate_mock_frame(width: usize, height: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        for x in 0..width {
            let value = ((x + y) % 256) as u8;
            data.extend_from_slice(&[value, value / 2, 255 - value]);
        }
    }
    data
}

fn raw_context(data: &[u8], width: usize, height: usize) -> ImageContext {
    ImageContext::raw(
        data.to_vec(),
        Resolution::new(width, height),
        PixelFormat::Rgb24,
    )
}

fn benchmark_convolution_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("convolution_by_size");

    let sizes = vec![
        (100, 100, "100x100"),
        (500, 500, "500x500"),
        (1000, 1000, "1000x1000"),
    ];

    for (width, height, label) in sizes {
        let data = generate_mock_frame(width, height);

        group.bench_with_input(BenchmarkId::from_parameter(label), &data, |b, data| {
            let processor =
                ConvolutionProcessor::new(Kernel::sharpen(), EngineConfig::default()).unwrap();
            b.iter(|| {
                let mut ctx = raw_context(data, width, height);
                processor.apply(black_box(&mut ctx)).unwrap();
            });
        });
    }

    group.finish();
}

fn benchmark_cell_counts(c: &mut Criterion) {
    let mut group = c.benchmark_group("cell_counts");
    let data = generate_mock_frame(512, 512);

    for cells in [1u32, 2, 4, 8, 16, 32] {
        group.bench_with_input(BenchmarkId::from_parameter(cells), &cells, |b, &cells| {
            let config = EngineConfig::builder().cells(cells, cells).build();
            let processor = ConvolutionProcessor::new(Kernel::box_blur(), config).unwrap();
            b.iter(|| {
                let mut ctx = raw_context(&data, 512, 512);
                processor.apply(black_box(&mut ctx)).unwrap();
            });
        });
    }

    group.finish();
}

fn benchmark_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("strategies");
    let data = generate_mock_frame(500, 500);

    group.bench_function("pixel_delegate_invert", |b| {
        let processor = PixelDelegateProcessor::new(EngineConfig::default()).unwrap();
        b.iter(|| {
            let mut ctx = raw_context(&data, 500, 500);
            processor
                .apply_channels_only(
                    black_box(&mut ctx),
                    |p: &PixelInfo| (255 - p.red, 255 - p.green, 255 - p.blue),
                    PixelInfo::default(),
                )
                .unwrap();
        });
    });

    group.bench_function("cell_delegate_mean", |b| {
        let processor = CellDelegateProcessor::new(EngineConfig::default(), |task: CellTask<'_>| {
            let mut total = 0u64;
            for y in task.cell.y..task.cell.bottom() {
                for x in task.cell.x..task.cell.right() {
                    total += u64::from(task.buffer.get(task.pixel_index(x, y) + 1));
                }
            }
            let mean = total / task.cell.area().max(1) as u64;
            for y in task.cell.y..task.cell.bottom() {
                for x in task.cell.x..task.cell.right() {
                    let i = task.pixel_index(x, y);
                    task.buffer.set(i + 1, mean as u8);
                }
            }
            Ok(())
        })
        .unwrap();
        b.iter(|| {
            let mut ctx = raw_context(&data, 500, 500);
            processor.apply(black_box(&mut ctx)).unwrap();
        });
    });

    group.bench_function("grayscale_filter", |b| {
        let processor = filters::by_name("grayscale", EngineConfig::default()).unwrap();
        b.iter(|| {
            let mut ctx = raw_context(&data, 500, 500);
            processor.apply(black_box(&mut ctx)).unwrap();
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_convolution_sizes,
    benchmark_cell_counts,
    benchmark_strategies
);
criterion_main!(benches);

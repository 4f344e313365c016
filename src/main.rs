use std::path::Path;
use std::process::ExitCode;

use cellgrid_rs::image_pipeline::strategies::filters::{self, FILTER_NAMES};
use cellgrid_rs::image_pipeline::{EngineConfig, StoreFormat, TiffCompression, TiffOptions};
use cellgrid_rs::logger;

use tracing::{error, info};

fn main() -> ExitCode {
    logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 || args.len() > 4 {
        eprintln!(
            "usage: {} <input.tiff> <output.tiff> [filter]\nfilters: {}",
            args.first().map(String::as_str).unwrap_or("cellgrid_rs"),
            FILTER_NAMES.join(", ")
        );
        return ExitCode::from(2);
    }

    let filter = args.get(3).map(String::as_str).unwrap_or("sharpen");

    info!("Starting cellgrid...");

    let config = EngineConfig::builder().validate_geometry(true).build();
    let processor = match filters::by_name(filter, config) {
        Ok(p) => p,
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(2);
        }
    };

    info!("Filter: {}", filter);

    let store_format = StoreFormat::Tiff(TiffOptions {
        compression: TiffCompression::Lzw,
        predictor: None,
    });

    match processor.process_file(Path::new(&args[1]), Path::new(&args[2]), store_format) {
        Ok(()) => {
            info!("Processing successful!");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Processing failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

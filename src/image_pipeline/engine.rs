//! Cell processing engine module
//!
//! Owns the lifecycle shared by every processing strategy: format bridge in, partition,
//! fork-join over the cells, format bridge out.

mod cell_engine;
pub mod config;
mod processor;


pub use cell_engine::{CellEngine, CellTask, PreparedFrame};
pub use config::{EngineConfig, EngineConfigBuilder};
pub use processor::ImageProcessor;

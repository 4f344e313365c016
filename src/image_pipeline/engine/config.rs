//! Engine configuration types

/// Configuration for a cell processing engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Number of cell columns; 0 lets the geometry provider choose
    pub horizontal_cells: u32,
    /// Number of cell rows; 0 lets the geometry provider choose
    pub vertical_cells: u32,
    /// Whether to verify that the computed cells exactly tile the image before dispatch
    pub validate_geometry: bool,
    /// Size of a dedicated worker pool; `None` shares rayon's global, host-sized pool
    pub worker_threads: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            horizontal_cells: 0,
            vertical_cells: 0,
            validate_geometry: cfg!(debug_assertions),
            worker_threads: None,
        }
    }
}

impl EngineConfig {
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }
}

/// Builder for EngineConfig
#[derive(Default)]
pub struct EngineConfigBuilder {
    horizontal_cells: Option<u32>,
    vertical_cells: Option<u32>,
    validate_geometry: Option<bool>,
    worker_threads: Option<Option<usize>>,
}

impl EngineConfigBuilder {
    pub fn cells(mut self, horizontal: u32, vertical: u32) -> Self {
        self.horizontal_cells = Some(horizontal);
        self.vertical_cells = Some(vertical);
        self
    }

    pub fn horizontal_cells(mut self, count: u32) -> Self {
        self.horizontal_cells = Some(count);
        self
    }

    pub fn vertical_cells(mut self, count: u32) -> Self {
        self.vertical_cells = Some(count);
        self
    }

    pub fn validate_geometry(mut self, validate: bool) -> Self {
        self.validate_geometry = Some(validate);
        self
    }

    pub fn worker_threads(mut self, threads: Option<usize>) -> Self {
        self.worker_threads = Some(threads);
        self
    }

    pub fn build(self) -> EngineConfig {
        let default = EngineConfig::default();
        EngineConfig {
            horizontal_cells: self.horizontal_cells.unwrap_or(default.horizontal_cells),
            vertical_cells: self.vertical_cells.unwrap_or(default.vertical_cells),
            validate_geometry: self.validate_geometry.unwrap_or(default.validate_geometry),
            worker_threads: self.worker_threads.unwrap_or(default.worker_threads),
        }
    }
}

use std::path::PathBuf;

use crate::error::HeatmapError;
use crate::points::WeightMode;
use crate::render::HeatmapOptions;

// ---------------------------------------------------------------------------
// Run configuration
// ---------------------------------------------------------------------------

/// Everything one run needs, independent of how it was collected.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Survey log to read.
    pub input: PathBuf,

    /// Where the map page is written.
    pub output: PathBuf,

    /// Which signal weights the points.
    pub mode: WeightMode,

    /// Heat layer appearance.
    pub options: HeatmapOptions,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("radio_log.csv"),
            output: PathBuf::from("radio_heatmap.html"),
            mode: WeightMode::Wifi,
            options: HeatmapOptions::default(),
        }
    }
}

impl RunConfig {
    /// Reject settings the heat layer cannot draw.
    pub fn validate(&self) -> Result<(), HeatmapError> {
        if self.options.radius == 0 {
            return Err(HeatmapError::InvalidConfig("radius must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.options.min_opacity) {
            return Err(HeatmapError::InvalidConfig(format!(
                "min opacity {} is outside 0.0 – 1.0",
                self.options.min_opacity
            )));
        }
        Ok(())
    }
}

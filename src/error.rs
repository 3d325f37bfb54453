use thiserror::Error;

/// Fatal, table-level failures of the heat-map pipeline.
///
/// Row-level problems (bad coordinates, unreadable signal values) never
/// surface here; those rows are dropped or fall back to a default weight.
#[derive(Debug, Error, PartialEq)]
pub enum HeatmapError {
    /// No detector could locate latitude and longitude.
    #[error("Unable to detect latitude and longitude columns automatically (columns: {columns})")]
    SchemaInference { columns: String },

    /// The table produced no point with usable coordinates.
    #[error("No valid points to plot ({rows} rows read)")]
    EmptyResult { rows: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

//! Turn table rows into weighted heat-map points.

use serde::Serialize;

use crate::data::model::{NumericSeries, Table};
use crate::error::HeatmapError;
use crate::schema::{detect_latlon, pick_rssi_columns};

/// Weight of a point whose signal is unknown. Low but non-zero, so the
/// sample still shows on the map.
pub const DEFAULT_WEIGHT: f64 = 0.2;

/// Signal that maps to weight 0.0.
const RSSI_FLOOR_DBM: f64 = -120.0;
/// Width of the dBm window mapped onto [0, 1]; -30 dBm maps to 1.0.
const RSSI_SPAN_DB: f64 = 90.0;

// ---------------------------------------------------------------------------
// Weighting mode
// ---------------------------------------------------------------------------

/// Which signal drives the point weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum WeightMode {
    /// Wifi signal, cellular when a row has no wifi reading.
    #[default]
    Wifi,
    /// Cellular signal, wifi when a row has no cellular reading.
    Cell,
    /// Every point weighs 1.0.
    Count,
}

// ---------------------------------------------------------------------------
// WeightedPoint
// ---------------------------------------------------------------------------

/// One heat-map sample. Serializes as `[lat, lon, weight]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightedPoint(pub f64, pub f64, pub f64);

impl WeightedPoint {
    pub fn lat(&self) -> f64 {
        self.0
    }

    pub fn lon(&self) -> f64 {
        self.1
    }

    pub fn weight(&self) -> f64 {
        self.2
    }
}

// ---------------------------------------------------------------------------
// Weighting
// ---------------------------------------------------------------------------

/// Map a signal strength in dBm onto [0, 1]: -120 dBm → 0.0, -30 dBm → 1.0,
/// clamped outside that window. Missing input has no weight.
pub fn rssi_to_weight(rssi: Option<f64>) -> Option<f64> {
    let r = rssi.filter(|r| !r.is_nan())?;
    Some(((r - RSSI_FLOOR_DBM) / RSSI_SPAN_DB).clamp(0.0, 1.0))
}

/// Build one point per row with usable coordinates.
///
/// Rows whose latitude or longitude is missing, non-numeric or not finite
/// are skipped. An empty result is an error since there is nothing to draw.
pub fn build_points(table: &Table, mode: WeightMode) -> Result<Vec<WeightedPoint>, HeatmapError> {
    let coords = detect_latlon(table)?;
    let signals = pick_rssi_columns(table);

    let lat_series = coords.latitude.series(table);
    let lon_series = coords.longitude.series(table);
    let wifi = signals.wifi.map(|i| table.numeric_column(i));
    let cell = signals.cell.map(|i| table.numeric_column(i));

    let (primary, fallback) = match mode {
        WeightMode::Wifi => (wifi.as_ref(), cell.as_ref()),
        WeightMode::Cell => (cell.as_ref(), wifi.as_ref()),
        WeightMode::Count => (None, None),
    };
    let reading = |series: Option<&NumericSeries>, row: usize| {
        rssi_to_weight(series.and_then(|s| s.get(row)))
    };

    let mut points = Vec::with_capacity(table.len());
    let mut defaulted = 0usize;

    for row in 0..table.len() {
        let (Some(lat), Some(lon)) = (lat_series.get(row), lon_series.get(row)) else {
            continue;
        };
        if !lat.is_finite() || !lon.is_finite() {
            continue;
        }

        let weight = match mode {
            WeightMode::Count => 1.0,
            _ => reading(primary, row)
                .or_else(|| reading(fallback, row))
                .unwrap_or_else(|| {
                    defaulted += 1;
                    DEFAULT_WEIGHT
                }),
        };

        points.push(WeightedPoint(lat, lon, weight));
    }

    let dropped = table.len() - points.len();
    if dropped > 0 {
        log::warn!("skipped {dropped} of {} rows without usable coordinates", table.len());
    }
    if defaulted > 0 {
        log::debug!("{defaulted} points had no signal reading, weighted {DEFAULT_WEIGHT}");
    }

    if points.is_empty() {
        return Err(HeatmapError::EmptyResult { rows: table.len() });
    }
    log::info!("built {} points ({mode:?} weighting)", points.len());
    Ok(points)
}

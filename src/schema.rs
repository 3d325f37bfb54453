//! Schema inference: find the coordinate and signal-strength columns of a
//! survey log whose header is not known in advance.
//!
//! Coordinates are located by an ordered chain of detectors, first hit
//! wins:
//!
//! 1. explicit `lat` / `lon` columns
//! 2. latitude encoded in one level of a composite row key
//! 3. a range scan over every column
//!
//! The range tests are deliberately loose. A longitude column also passes
//! the latitude test, and when several columns qualify the first one in
//! header order is taken.

use std::fmt;

use crate::data::model::{NumericSeries, Table};
use crate::error::HeatmapError;

const LAT_RANGE: (f64, f64) = (-90.0, 90.0);
const LON_RANGE: (f64, f64) = (-180.0, 180.0);

/// Share of in-range values a key level or a candidate column needs in the
/// encoded-index detector.
const INDEX_MAJORITY: f64 = 0.5;
/// Share of in-range values a column needs in the range-scan detector.
const SCAN_MAJORITY: f64 = 0.6;

/// Substrings marking a cellular signal column, best first.
const CELL_PREFERENCES: &[&str] = &[
    "cell_rsrp",
    "cell_dbm",
    "cell_rssi",
    "cell_rssicell_ci",
    "cell_rsrq",
];

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Where a coordinate series lives: a named column, or one level of a
/// composite row key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateSource {
    Column(usize),
    IndexLevel(usize),
}

impl CoordinateSource {
    /// Numerically coerced values of this source.
    pub fn series(self, table: &Table) -> NumericSeries {
        match self {
            CoordinateSource::Column(i) => table.numeric_column(i),
            CoordinateSource::IndexLevel(l) => table.numeric_level(l),
        }
    }

    fn describe(self, table: &Table) -> String {
        match self {
            CoordinateSource::Column(i) => format!("column '{}'", table.columns[i].name),
            CoordinateSource::IndexLevel(l) => format!("index level {l}"),
        }
    }
}

/// Which detector resolved the coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionMethod {
    ExplicitNames,
    EncodedIndex,
    RangeScan,
}

impl fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectionMethod::ExplicitNames => write!(f, "explicit names"),
            DetectionMethod::EncodedIndex => write!(f, "encoded index"),
            DetectionMethod::RangeScan => write!(f, "range scan"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateColumns {
    pub latitude: CoordinateSource,
    pub longitude: CoordinateSource,
    pub method: DetectionMethod,
}

/// Signal-strength columns by radio type. Either may be unresolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SignalColumns {
    pub wifi: Option<usize>,
    pub cell: Option<usize>,
}

// ---------------------------------------------------------------------------
// Coordinate detection
// ---------------------------------------------------------------------------

type Detector = fn(&Table) -> Option<CoordinateColumns>;

const DETECTORS: &[(DetectionMethod, Detector)] = &[
    (DetectionMethod::ExplicitNames, by_explicit_names),
    (DetectionMethod::EncodedIndex, by_encoded_index),
    (DetectionMethod::RangeScan, by_range_scan),
];

/// Locate the latitude and longitude series of `table`.
pub fn detect_latlon(table: &Table) -> Result<CoordinateColumns, HeatmapError> {
    for (method, detector) in DETECTORS {
        match detector(table) {
            Some(found) => {
                log::info!(
                    "coordinates via {}: latitude = {}, longitude = {}",
                    found.method,
                    found.latitude.describe(table),
                    found.longitude.describe(table)
                );
                return Ok(found);
            }
            None => log::debug!("{method}: no coordinates"),
        }
    }

    Err(HeatmapError::SchemaInference {
        columns: table.column_names().collect::<Vec<_>>().join(", "),
    })
}

/// Columns literally named `lat` and `lon`, each holding at least one number.
fn by_explicit_names(table: &Table) -> Option<CoordinateColumns> {
    let lat = table.column_index("lat")?;
    let lon = table.column_index("lon")?;
    if table.numeric_column(lat).valid_count() == 0
        || table.numeric_column(lon).valid_count() == 0
    {
        return None;
    }
    Some(CoordinateColumns {
        latitude: CoordinateSource::Column(lat),
        longitude: CoordinateSource::Column(lon),
        method: DetectionMethod::ExplicitNames,
    })
}

/// Latitude as one level of a composite row key, longitude from the columns.
///
/// For the longitude an explicit `lon` column is tried first, then a
/// `timestamp` column (a shifted header can leave longitudes under that
/// name; only the range decides), then the first column that is mostly
/// inside [-180, 180].
fn by_encoded_index(table: &Table) -> Option<CoordinateColumns> {
    let lon_like = |idx: usize| {
        let s = table.numeric_column(idx);
        s.valid_count() > 0 && s.fraction_within(LON_RANGE.0, LON_RANGE.1) > INDEX_MAJORITY
    };

    for level in 0..table.identity.composite_levels().len() {
        let lat = table.numeric_level(level);
        if lat.valid_count() == 0
            || lat.fraction_within(LAT_RANGE.0, LAT_RANGE.1) <= INDEX_MAJORITY
        {
            continue;
        }
        log::debug!("index level {level} looks like latitude");

        let lon = table
            .column_index("lon")
            .or_else(|| table.column_index("timestamp"))
            .filter(|&idx| lon_like(idx))
            .or_else(|| (0..table.columns.len()).find(|&idx| lon_like(idx)));

        if let Some(lon) = lon {
            return Some(CoordinateColumns {
                latitude: CoordinateSource::IndexLevel(level),
                longitude: CoordinateSource::Column(lon),
                method: DetectionMethod::EncodedIndex,
            });
        }
    }
    None
}

/// First column mostly in the latitude range, first column mostly in the
/// longitude range. The two may be the same column.
fn by_range_scan(table: &Table) -> Option<CoordinateColumns> {
    let mut lat = None;
    let mut lon = None;

    for idx in 0..table.columns.len() {
        let s = table.numeric_column(idx);
        if s.valid_count() == 0 {
            continue;
        }
        if lat.is_none() && s.fraction_within(LAT_RANGE.0, LAT_RANGE.1) > SCAN_MAJORITY {
            lat = Some(idx);
        }
        if lon.is_none() && s.fraction_within(LON_RANGE.0, LON_RANGE.1) > SCAN_MAJORITY {
            lon = Some(idx);
        }
    }

    Some(CoordinateColumns {
        latitude: CoordinateSource::Column(lat?),
        longitude: CoordinateSource::Column(lon?),
        method: DetectionMethod::RangeScan,
    })
}

// ---------------------------------------------------------------------------
// Signal columns
// ---------------------------------------------------------------------------

fn first_match(names: &[String], pred: impl Fn(&str) -> bool) -> Option<usize> {
    names.iter().position(|n| pred(n.as_str()))
}

/// Pick the wifi and cellular signal columns by name.
pub fn pick_rssi_columns(table: &Table) -> SignalColumns {
    let lower: Vec<String> = table.column_names().map(str::to_lowercase).collect();

    let mut wifi = first_match(&lower, |n| {
        n.contains("wifi") && (n.contains("rssi") || n.contains("dbm"))
    })
    .or_else(|| first_match(&lower, |n| n.contains("rssi") && !n.contains("cell")));

    let mut cell = CELL_PREFERENCES
        .iter()
        .find_map(|pref| first_match(&lower, |n| n.contains(pref)));

    // last resort: anything that merely mentions the radio
    if wifi.is_none() {
        wifi = first_match(&lower, |n| n.contains("wifi"));
    }
    if cell.is_none() {
        cell = first_match(&lower, |n| n.contains("cell"));
    }

    log::info!(
        "signal columns: wifi = {}, cell = {}",
        wifi.map_or("none", |i| table.columns[i].name.as_str()),
        cell.map_or("none", |i| table.columns[i].name.as_str())
    );

    SignalColumns { wifi, cell }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::read_csv;

    fn table(csv: &str) -> Table {
        read_csv(csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_explicit_names_win() {
        // `speed` would also pass the range scan and comes first
        let t = table("speed,lat,lon\n5,48.1,11.5\n6,48.2,11.6\n");
        let found = detect_latlon(&t).unwrap();

        assert_eq!(found.method, DetectionMethod::ExplicitNames);
        assert_eq!(found.latitude, CoordinateSource::Column(1));
        assert_eq!(found.longitude, CoordinateSource::Column(2));
    }

    #[test]
    fn test_explicit_names_need_numbers() {
        let t = table("lat,lon,y,x\nn/a,abc,48.1,11.5\n,,48.2,11.6\n");
        let found = detect_latlon(&t).unwrap();

        assert_eq!(found.method, DetectionMethod::RangeScan);
        assert_eq!(found.latitude, CoordinateSource::Column(2));
        assert_eq!(found.longitude, CoordinateSource::Column(2));
    }

    #[test]
    fn test_latitude_in_composite_key_with_lon_column() {
        let t = table(
            "lon,wifi_rssi\n\
             1700000000,48.10,11.50,-60\n\
             1700000001,48.11,11.51,-61\n\
             1700000002,48.12,11.52,-62\n",
        );
        let found = detect_latlon(&t).unwrap();

        assert_eq!(found.method, DetectionMethod::EncodedIndex);
        assert_eq!(found.latitude, CoordinateSource::IndexLevel(1));
        assert_eq!(found.longitude, CoordinateSource::Column(0));
        assert_eq!(found.latitude.series(&t).get(2), Some(48.12));
        assert_eq!(found.longitude.series(&t).get(0), Some(11.5));
    }

    #[test]
    fn test_timestamp_column_holding_longitudes() {
        let t = table(
            "timestamp,wifi_rssi,cell_rsrp\n\
             1700000000,48.10,11.50,-60,-95\n\
             1700000001,48.11,11.51,-61,-96\n",
        );
        let found = detect_latlon(&t).unwrap();

        assert_eq!(found.method, DetectionMethod::EncodedIndex);
        assert_eq!(found.latitude, CoordinateSource::IndexLevel(1));
        assert_eq!(found.longitude, CoordinateSource::Column(0));
    }

    #[test]
    fn test_out_of_range_lon_column_falls_back_to_scan() {
        // `lon` exists but is garbage, so the first plausible column is used
        let t = table(
            "lon,bearing\n\
             a,48.1,9999,120\n\
             b,48.2,9999,130\n",
        );
        let found = detect_latlon(&t).unwrap();

        assert_eq!(found.method, DetectionMethod::EncodedIndex);
        assert_eq!(found.latitude, CoordinateSource::IndexLevel(1));
        assert_eq!(found.longitude, CoordinateSource::Column(1));
    }

    #[test]
    fn test_single_index_level_is_not_encoded() {
        let t = table("x,y\n48.1,500,600\n48.2,500,600\n");
        let err = detect_latlon(&t).unwrap_err();
        assert!(matches!(err, HeatmapError::SchemaInference { .. }));
    }

    #[test]
    fn test_range_scan_first_match() {
        let t = table(
            "id,a,b,c\n\
             1000,45.0,150.0,10.0\n\
             1001,46.0,160.0,11.0\n\
             1002,47.0,170.0,12.0\n",
        );
        let found = detect_latlon(&t).unwrap();

        assert_eq!(found.method, DetectionMethod::RangeScan);
        assert_eq!(found.latitude, CoordinateSource::Column(1));
        assert_eq!(found.longitude, CoordinateSource::Column(1));
    }

    #[test]
    fn test_range_scan_needs_sixty_percent() {
        // b: 3 of 5 in range is exactly 60%, not enough
        let t = table("a,b\n500,10\n500,20\n500,30\n500,400\n500,500\n");
        assert!(detect_latlon(&t).is_err());
    }

    #[test]
    fn test_no_plausible_coordinates() {
        let t = table("a,b,name\n500,-900,x\n600,-800,y\n");
        let err = detect_latlon(&t).unwrap_err();

        assert_eq!(
            err,
            HeatmapError::SchemaInference {
                columns: "a, b, name".into()
            }
        );
    }

    #[test]
    fn test_pick_rssi_columns_preferred_names() {
        let t = table("lat,lon,cell_rsrq,WiFi_RSSI,cell_rsrp\n1,2,-10,-60,-90\n");
        let cols = pick_rssi_columns(&t);
        assert_eq!(cols.wifi, Some(3));
        assert_eq!(cols.cell, Some(4));
    }

    #[test]
    fn test_pick_rssi_columns_generic_rssi() {
        let t = table("cell_rssi,rssi,lat\n-90,-60,1\n");
        let cols = pick_rssi_columns(&t);
        assert_eq!(cols.wifi, Some(1));
        assert_eq!(cols.cell, Some(0));
    }

    #[test]
    fn test_pick_rssi_columns_last_resort() {
        let t = table("wifi_ssid,cellular,lat\nhome,x,1\n");
        let cols = pick_rssi_columns(&t);
        assert_eq!(cols.wifi, Some(0));
        assert_eq!(cols.cell, Some(1));
    }

    #[test]
    fn test_pick_rssi_columns_none() {
        let t = table("lat,lon\n1,2\n");
        assert_eq!(pick_rssi_columns(&t), SignalColumns::default());
    }
}

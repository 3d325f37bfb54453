//! Heat-map renderer: writes a self-contained Leaflet page with a
//! `leaflet.heat` layer over the weighted points.

use std::path::Path;

use anyhow::{Context, Result};

use crate::color::heat_gradient;
use crate::error::HeatmapError;
use crate::points::WeightedPoint;

const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";
const LEAFLET_HEAT_JS: &str = "https://unpkg.com/leaflet.heat@0.2.0/dist/leaflet-heat.js";
const TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
const ATTRIBUTION: &str = "&copy; OpenStreetMap contributors";
const ZOOM_START: u32 = 15;
const GRADIENT_STOPS: usize = 5;

/// Heat layer appearance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatmapOptions {
    /// Point radius in pixels.
    pub radius: u32,
    pub blur: u32,
    /// Opacity of the faintest point, 0.0 – 1.0.
    pub min_opacity: f64,
}

impl Default for HeatmapOptions {
    fn default() -> Self {
        Self {
            radius: 15,
            blur: 15,
            min_opacity: 0.2,
        }
    }
}

/// Median of the values; mean of the middle pair for even counts.
fn median(mut values: Vec<f64>) -> f64 {
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

/// Render the map page, centred on the median point position.
pub fn render_html(points: &[WeightedPoint], options: &HeatmapOptions) -> Result<String> {
    if points.is_empty() {
        return Err(HeatmapError::EmptyResult { rows: 0 }.into());
    }

    let center = [
        median(points.iter().map(WeightedPoint::lat).collect()),
        median(points.iter().map(WeightedPoint::lon).collect()),
    ];
    let center_json = serde_json::to_string(&center).context("serializing map centre")?;
    let points_json = serde_json::to_string(points).context("serializing points")?;
    let gradient_json =
        serde_json::to_string(&heat_gradient(GRADIENT_STOPS)).context("serializing gradient")?;

    log::debug!(
        "rendering {} points around {center:?} (radius {}, blur {}, min opacity {})",
        points.len(),
        options.radius,
        options.blur,
        options.min_opacity
    );

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Radio heat map</title>
<link rel="stylesheet" href="{LEAFLET_CSS}">
<script src="{LEAFLET_JS}"></script>
<script src="{LEAFLET_HEAT_JS}"></script>
<style>html, body, #map {{ width: 100%; height: 100%; margin: 0; padding: 0; }}</style>
</head>
<body>
<div id="map"></div>
<script>
var map = L.map("map").setView({center_json}, {ZOOM_START});
var tiles = L.tileLayer("{TILE_URL}", {{
    maxZoom: 19,
    attribution: "{ATTRIBUTION}"
}}).addTo(map);
var heat = L.heatLayer({points_json}, {{
    radius: {radius},
    blur: {blur},
    minOpacity: {min_opacity},
    gradient: {gradient_json}
}}).addTo(map);
L.control.layers({{"OpenStreetMap": tiles}}, {{"Heat map": heat}}).addTo(map);
</script>
</body>
</html>
"#,
        radius = options.radius,
        blur = options.blur,
        min_opacity = options.min_opacity,
    ))
}

/// Render the map and save it to `path`.
pub fn write_html(path: &Path, points: &[WeightedPoint], options: &HeatmapOptions) -> Result<()> {
    let html = render_html(points, options)?;
    std::fs::write(path, html).with_context(|| format!("writing {}", path.display()))?;
    log::info!("wrote {} ({} points)", path.display(), points.len());
    Ok(())
}

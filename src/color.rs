use std::collections::BTreeMap;

use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Heat gradient generator
// ---------------------------------------------------------------------------

/// Hue of the weakest signal (blue); the strongest ends at 0° (red).
const COLD_HUE: f32 = 240.0;

/// Generates `n` evenly spaced gradient stops running from blue at 0.0 to
/// red at 1.0, keyed by stop position as the heat layer expects.
pub fn heat_gradient(n: usize) -> BTreeMap<String, String> {
    if n < 2 {
        return BTreeMap::from([("1.00".to_string(), to_hex(0.0))]);
    }
    (0..n)
        .map(|i| {
            let t = i as f32 / (n - 1) as f32;
            (format!("{t:.2}"), to_hex(COLD_HUE * (1.0 - t)))
        })
        .collect()
}

fn to_hex(hue: f32) -> String {
    let hsl = Hsl::new(hue, 0.9, 0.5);
    let rgb: Srgb = hsl.into_color();
    format!(
        "#{:02x}{:02x}{:02x}",
        (rgb.red * 255.0).round() as u8,
        (rgb.green * 255.0).round() as u8,
        (rgb.blue * 255.0).round() as u8,
    )
}

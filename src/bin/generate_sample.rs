use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

/// Write a synthetic radio survey log for trying out the heat map.
#[derive(Parser)]
#[command(name = "generate_sample")]
struct Cli {
    /// Output CSV file.
    #[arg(long, short, default_value = "radio_log.csv")]
    output: PathBuf,

    /// Number of samples along the walk.
    #[arg(long, default_value_t = 600)]
    rows: usize,

    /// Write the short-header layout whose rows carry timestamp and
    /// latitude as extra leading fields.
    #[arg(long)]
    encoded_index: bool,
}

/// Access points along the route: (lat, lon, tx power at 1 m in dBm).
const ACCESS_POINTS: [(f64, f64, f64); 3] = [
    (48.1374, 11.5755, -32.0),
    (48.1392, 11.5790, -35.0),
    (48.1360, 11.5812, -30.0),
];
const CELL_TOWER: (f64, f64) = (48.1450, 11.5600);
const START: (f64, f64) = (48.1350, 11.5730);
const METRES_PER_DEGREE: f64 = 111_320.0;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Rough ground distance in metres, fine at survey scale.
fn distance_m(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dlat = (a.0 - b.0) * METRES_PER_DEGREE;
    let dlon = (a.1 - b.1) * METRES_PER_DEGREE * a.0.to_radians().cos();
    (dlat * dlat + dlon * dlon).sqrt()
}

/// Log-distance path loss with exponent 3.
fn path_loss_dbm(tx_dbm: f64, metres: f64) -> f64 {
    tx_dbm - 30.0 * metres.max(1.0).log10()
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut rng = SimpleRng::new(42);

    let mut writer = csv::WriterBuilder::new()
        .flexible(cli.encoded_index)
        .from_path(&cli.output)
        .with_context(|| format!("creating {}", cli.output.display()))?;

    if cli.encoded_index {
        writer.write_record(["timestamp", "wifi_rssi", "cell_rsrp"])?;
    } else {
        writer.write_record(["timestamp", "lat", "lon", "wifi_rssi", "cell_rsrp"])?;
    }

    let mut pos = START;
    let mut heading: f64 = 0.6;
    let t0: u64 = 1_700_000_000;

    for i in 0..cli.rows {
        // random walk, roughly 1.5 m per sample
        heading += rng.gauss(0.0, 0.25);
        let step = 1.5 / METRES_PER_DEGREE;
        pos.0 += step * heading.cos();
        pos.1 += step * heading.sin() / pos.0.to_radians().cos();

        let wifi = ACCESS_POINTS
            .iter()
            .map(|&(lat, lon, tx)| path_loss_dbm(tx, distance_m(pos, (lat, lon))))
            .fold(f64::NEG_INFINITY, f64::max)
            + rng.gauss(0.0, 4.0);
        let cell = path_loss_dbm(-20.0, distance_m(pos, CELL_TOWER)) + rng.gauss(0.0, 3.0);

        // GPS fix lost now and then, wifi scan sometimes empty
        let lat = if rng.next_f64() < 0.02 { String::new() } else { format!("{:.6}", pos.0) };
        let wifi = if rng.next_f64() < 0.1 { String::new() } else { format!("{wifi:.0}") };

        let record = [
            (t0 + i as u64).to_string(),
            lat,
            format!("{:.6}", pos.1),
            wifi,
            format!("{cell:.0}"),
        ];
        writer.write_record(&record)?;
    }

    writer.flush()?;
    println!(
        "Wrote {} samples to {}{}",
        cli.rows,
        cli.output.display(),
        if cli.encoded_index { " (encoded index layout)" } else { "" }
    );
    Ok(())
}

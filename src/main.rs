mod color;
mod config;
mod data;
mod error;
mod points;
mod render;
mod schema;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use config::RunConfig;
use points::WeightMode;
use render::HeatmapOptions;

/// Plot a radio log CSV as an interactive heat map (HTML).
#[derive(Parser)]
#[command(name = "radio-heatmap", version, about)]
struct Cli {
    /// Input CSV file.
    #[arg(long, short, default_value = "radio_log.csv")]
    input: PathBuf,

    /// Output HTML file.
    #[arg(long, short, default_value = "radio_heatmap.html")]
    output: PathBuf,

    /// Weight points by wifi RSSI, cellular RSSI, or uniformly.
    #[arg(long, short, value_enum, default_value_t = WeightMode::Wifi)]
    weight: WeightMode,

    /// Heat map radius (pixels).
    #[arg(long, default_value_t = 15)]
    radius: u32,

    /// Heat map blur.
    #[arg(long, default_value_t = 15)]
    blur: u32,

    /// Heat map minimum opacity.
    #[arg(long, default_value_t = 0.2)]
    min_opacity: f64,
}

impl From<Cli> for RunConfig {
    fn from(cli: Cli) -> Self {
        RunConfig {
            input: cli.input,
            output: cli.output,
            mode: cli.weight,
            options: HeatmapOptions {
                radius: cli.radius,
                blur: cli.blur,
                min_opacity: cli.min_opacity,
            },
        }
    }
}

fn run(config: &RunConfig) -> Result<()> {
    config.validate()?;

    let table = data::loader::load_file(&config.input)?;
    if table.is_empty() {
        log::warn!("{} has a header but no rows", config.input.display());
    }

    let points = points::build_points(&table, config.mode)?;
    render::write_html(&config.output, &points, &config.options)?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let config = RunConfig::from(Cli::parse());
    run(&config)?;

    println!("Saved heatmap to {}", config.output.display());
    Ok(())
}

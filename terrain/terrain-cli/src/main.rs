//! `terrain-stl`: turn a geographic region into a printable STL.
//!
//! # Usage
//!
//! ```text
//! terrain-stl --north 40.5 --south 40.3 --east -111.5 --west -111.7 -o wasatch.stl
//! terrain-stl --request request.json --config config.json -o out.stl
//! terrain-stl --print-config > config.json
//! ```
//!
//! Diagnostics are printed as JSON on stdout. Logs go to stderr and follow
//! `RUST_LOG` (default `info`).

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use terrain_pipeline::{Pipeline, PipelineConfig};
use terrain_types::{Body, BoundsSpec, RequestSpec, Resolution, Shape};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Generate a watertight terrain solid as binary STL
#[derive(Parser, Debug)]
#[command(name = "terrain-stl")]
#[command(about = "Generate a printable terrain solid from a geographic region", long_about = None)]
#[command(version)]
struct Cli {
    /// Request document (JSON, camelCase fields)
    #[arg(long, conflicts_with_all = ["north", "south", "east", "west"])]
    request: Option<PathBuf>,

    /// Northern bound, degrees
    #[arg(long, allow_negative_numbers = true, required_unless_present_any = ["request", "print_config"])]
    north: Option<f64>,

    /// Southern bound, degrees
    #[arg(long, allow_negative_numbers = true, required_unless_present_any = ["request", "print_config"])]
    south: Option<f64>,

    /// Eastern bound, degrees
    #[arg(long, allow_negative_numbers = true, required_unless_present_any = ["request", "print_config"])]
    east: Option<f64>,

    /// Western bound, degrees
    #[arg(long, allow_negative_numbers = true, required_unless_present_any = ["request", "print_config"])]
    west: Option<f64>,

    /// Vertical exaggeration, 0.5 to 5
    #[arg(long)]
    exaggeration: Option<f64>,

    /// Base slab height, 1 to 20
    #[arg(long)]
    base_height: Option<f64>,

    /// Model width
    #[arg(long)]
    model_width: Option<f64>,

    /// low, medium, high or ultra
    #[arg(long)]
    resolution: Option<Resolution>,

    /// rectangle or oval
    #[arg(long)]
    shape: Option<Shape>,

    /// earth, mars, moon or venus
    #[arg(long)]
    body: Option<Body>,

    /// Encode elevation as thickness
    #[arg(long)]
    lithophane: bool,

    /// Flip the relief
    #[arg(long)]
    invert: bool,

    /// Pipeline configuration (JSON, omitted fields use defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where to write the STL
    #[arg(short, long, required_unless_present = "print_config")]
    output: Option<PathBuf>,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,
}

impl Cli {
    /// The request described by `--request` or the bound flags, with any
    /// parameter flags applied on top.
    fn request_spec(&self) -> Result<RequestSpec> {
        let mut spec = match &self.request {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading request {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("parsing request {}", path.display()))?
            }
            None => RequestSpec::new(BoundsSpec {
                north: self.north.context("--north is required")?,
                south: self.south.context("--south is required")?,
                east: self.east.context("--east is required")?,
                west: self.west.context("--west is required")?,
            }),
        };

        if let Some(v) = self.exaggeration {
            spec.exaggeration = v;
        }
        if let Some(v) = self.base_height {
            spec.base_height = v;
        }
        if let Some(v) = self.model_width {
            spec.model_width = v;
        }
        if let Some(v) = self.resolution {
            spec.resolution = v;
        }
        if let Some(v) = self.shape {
            spec.shape = v;
        }
        if let Some(v) = self.body {
            spec.body = v;
        }
        spec.lithophane |= self.lithophane;
        spec.invert |= self.invert;
        Ok(spec)
    }

    fn pipeline_config(&self) -> Result<PipelineConfig> {
        match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                PipelineConfig::from_json(&text)
                    .with_context(|| format!("parsing config {}", path.display()))
            }
            None => Ok(PipelineConfig::default()),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.pipeline_config()?;

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let output = cli.output.clone().context("--output is required")?;
    let spec = cli.request_spec()?;
    let request = spec.validate()?;

    let pipeline = Pipeline::new(config)?;
    let result = pipeline.generate(&request)?;

    fs::write(&output, &result.stl).with_context(|| format!("writing {}", output.display()))?;
    info!("Wrote {} bytes to {}", result.stl.len(), output.display());

    println!("{}", serde_json::to_string_pretty(&result.diagnostics)?);
    Ok(())
}

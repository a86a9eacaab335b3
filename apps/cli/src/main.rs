// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Facade-Lite CLI - render scene and scaffold measurement for one building.
//!
//! Reads a provider building payload (JSON), runs the processing pipeline
//! for the given wall selection and writes the scene or just the wall
//! metrics as JSON.
//!
//! Usage:
//!   facade-lite <building.json> [options]

use std::env;
use std::fs;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use facade_lite_core::BuildingData;
use facade_lite_processing::{process_building, ScaffoldParams, SceneOptions};

mod config;

use config::Config;

/// Parsed command line
#[derive(Debug, Clone, PartialEq)]
struct Args {
    input: PathBuf,
    output: Option<PathBuf>,
    selected_walls: Vec<i64>,
    width_cm: f64,
    eave_difference_cm: f64,
    metrics_only: bool,
    dimensions: bool,
    pretty: bool,
}

fn print_usage() {
    eprintln!("Usage: facade-lite <building.json> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --select <i,j,...>   Wall indices to put a scaffold on");
    eprintln!("  --width <cm>         Scaffold width (default: $FACADE_SCAFFOLD_WIDTH_CM or 70)");
    eprintln!("  --eave <cm>          Eave height difference (default: $FACADE_EAVE_DIFFERENCE_CM or 0)");
    eprintln!("  --output <path>      Write JSON to a file instead of stdout");
    eprintln!("  --metrics-only       Only emit the wall metrics payload");
    eprintln!("  --no-dimensions      Skip edge dimension labels");
    eprintln!("  --compact            Single-line JSON");
    eprintln!();
    eprintln!("Logging is controlled with RUST_LOG (default: info,facade_lite=debug).");
}

fn parse_selection(value: &str) -> Result<Vec<i64>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .with_context(|| format!("Invalid wall index '{}'", s))
        })
        .collect()
}

/// Parse arguments (without the program name). `Ok(None)` means help was requested.
fn parse_args(args: &[String], config: &Config) -> Result<Option<Args>> {
    let Some(first) = args.first() else {
        return Ok(None);
    };
    if first == "--help" || first == "-h" {
        return Ok(None);
    }

    let mut parsed = Args {
        input: PathBuf::from(first),
        output: None,
        selected_walls: Vec::new(),
        width_cm: config.scaffold_width_cm,
        eave_difference_cm: config.eave_difference_cm,
        metrics_only: false,
        dimensions: true,
        pretty: config.pretty_json,
    };

    let mut rest = args[1..].iter();
    while let Some(arg) = rest.next() {
        let mut value = |name: &str| {
            rest.next()
                .with_context(|| format!("Missing value for {}", name))
        };

        match arg.as_str() {
            "--select" => parsed.selected_walls = parse_selection(value("--select")?)?,
            "--width" => {
                let v = value("--width")?;
                parsed.width_cm = v
                    .parse()
                    .with_context(|| format!("Invalid width '{}'", v))?;
            }
            "--eave" => {
                let v = value("--eave")?;
                parsed.eave_difference_cm = v
                    .parse()
                    .with_context(|| format!("Invalid eave difference '{}'", v))?;
            }
            "--output" => parsed.output = Some(PathBuf::from(value("--output")?)),
            "--metrics-only" => parsed.metrics_only = true,
            "--no-dimensions" => parsed.dimensions = false,
            "--compact" => parsed.pretty = false,
            other => bail!("Unknown option: {}", other),
        }
    }

    Ok(Some(parsed))
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

fn run(args: &Args) -> Result<()> {
    let file = fs::File::open(&args.input)
        .with_context(|| format!("Failed to open {}", args.input.display()))?;
    let building = BuildingData::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to read building data from {}", args.input.display()))?;

    let params = ScaffoldParams::new(
        args.selected_walls.clone(),
        args.width_cm,
        args.eave_difference_cm,
    );
    let options = SceneOptions {
        dimensions: args.dimensions && !args.metrics_only,
        ..SceneOptions::default()
    };

    let scene = process_building(&building, &params, &options)?;

    let json = if args.metrics_only {
        to_json(&scene.metrics, args.pretty)?
    } else {
        scene.to_json(args.pretty)?
    };

    match &args.output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(output = %path.display(), "Wrote scene");
        }
        None => println!("{}", json),
    }

    Ok(())
}

fn main() -> Result<()> {
    // Logs go to stderr, stdout is reserved for the JSON output
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,facade_lite=debug".into()),
        )
        .with_writer(std::io::stderr)
        .pretty()
        .init();

    let config = Config::from_env();
    let argv: Vec<String> = env::args().skip(1).collect();

    let args = match parse_args(&argv, &config) {
        Ok(Some(args)) => args,
        Ok(None) => {
            print_usage();
            return Ok(());
        }
        Err(e) => {
            print_usage();
            return Err(e);
        }
    };

    tracing::info!(
        input = %args.input.display(),
        selected = ?args.selected_walls,
        width_cm = args.width_cm,
        eave_difference_cm = args.eave_difference_cm,
        metrics_only = args.metrics_only,
        "Starting Facade-Lite"
    );

    run(&args)
}

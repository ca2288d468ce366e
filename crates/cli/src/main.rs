//! kdinterp CLI - scattered-data IDW interpolation over a k-d tree

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use kdinterp_algorithms::interpolation::{interpolate_points, InterpolationParams};
use kdinterp_algorithms::kdtree::KdTree;
use kdinterp_core::io::{read_points, write_points};
use kdinterp_core::Point;

mod config;
use config::{Config, AXIS_NAMES, DEFAULT_CONFIG_FN, VALUE_NAME};

/// Pipeline point type: 2-D integer coordinates, double values.
type SamplePoint = Point<i32, f64, 2>;

#[derive(Parser)]
#[command(name = "kdinterp")]
#[command(author, version, about = "Scattered-data IDW interpolation over a k-d tree", long_about = None)]
struct Cli {
    /// Config file path; prompts interactively when omitted
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(if verbose { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("a tracing subscriber was already installed");
}

fn spinner(msg: &'static str) -> ProgressBar {
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .expect("static spinner template");

    let pb = ProgressBar::new_spinner().with_style(style).with_message(msg);
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}

/// One interactive prompt for the config path; an empty line picks the
/// default.
fn prompt_config_path() -> Result<PathBuf> {
    print!("Config file path (empty = {DEFAULT_CONFIG_FN}): ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;

    let line = line.trim();
    Ok(PathBuf::from(if line.is_empty() {
        DEFAULT_CONFIG_FN
    } else {
        line
    }))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = match cli.config {
        Some(path) => path,
        None => prompt_config_path()?,
    };
    let config = Config::from_file(&config_path)?;

    let pb = spinner("Reading known points...");
    let known: Vec<SamplePoint> =
        read_points(&config.known_points_fn, &AXIS_NAMES, VALUE_NAME)
            .context("Failed to read known points")?;
    pb.finish_and_clear();
    if known.is_empty() {
        bail!("No known points");
    }
    info!("Known points: {}", known.len());

    let tree = KdTree::build(known);
    if tree.is_empty() {
        bail!("The tree is empty");
    }

    let pb = spinner("Reading unknown points...");
    let mut unknown: Vec<SamplePoint> =
        read_points(&config.unknown_points_fn, &AXIS_NAMES, VALUE_NAME)
            .context("Failed to read unknown points")?;
    pb.finish_and_clear();
    if unknown.is_empty() {
        bail!("No unknown points");
    }
    info!("Unknown points: {}", unknown.len());

    let params = InterpolationParams {
        num_neighbors: config.num_neighbors,
        reverse_search: config.reverse_search,
        idw_power: config.idw_power,
    };

    let pb = spinner("Interpolating...");
    let start = Instant::now();
    interpolate_points(&tree, &mut unknown, &params);
    let elapsed = start.elapsed();
    pb.finish_and_clear();

    write_points(
        &config.output_fn,
        &unknown,
        config.json_indent,
        &AXIS_NAMES,
        VALUE_NAME,
    )
    .context("Failed to write the result")?;

    info!(
        "Interpolated {} points against {} samples in {:.2?}",
        unknown.len(),
        tree.len(),
        elapsed
    );
    println!("Result saved to: {}", config.output_fn);
    println!("  Processing time: {:.2?}", elapsed);

    Ok(())
}

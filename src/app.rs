//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and installs the log subscriber
//! - parses CLI arguments
//! - runs the resolver (once, or across an energy sweep)
//! - prints reports/sketches and writes optional result files

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::{Cli, Command, ConfigArg, DiffArgs, ResolveArgs, SweepArgs};
use crate::error::AppError;

pub mod pipeline;

/// Default log filter when `RUST_LOG` is not set.
const DEFAULT_LOG_FILTER: &str = "warn,gi_geometry=info";

/// Entry point for the `gigeo` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_logging();

    let cli = Cli::parse();
    match cli.command {
        Command::Resolve(args) => handle_resolve(args),
        Command::Slots(args) => handle_slots(args),
        Command::Sweep(args) => handle_sweep(args),
        Command::Diff(args) => handle_diff(args),
    }
}

/// Log to stderr so stdout stays machine readable.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_resolve(args: ResolveArgs) -> Result<(), AppError> {
    let run = pipeline::run_resolve(&args)?;

    println!("{}", crate::report::format_geometry(&run.result));
    if args.sketch {
        println!("{}", crate::plot::render_sketch(&run.result, args.width, args.height));
    }
    if let Some(diff) = &run.diff {
        println!("Changes since previous result:");
        println!("{}", crate::report::format_diff(diff));
    }
    Ok(())
}

fn handle_slots(args: ConfigArg) -> Result<(), AppError> {
    let classification = pipeline::run_classify(&args)?;
    println!("{}", crate::report::format_slots(&classification));
    Ok(())
}

fn handle_sweep(args: SweepArgs) -> Result<(), AppError> {
    let rows = pipeline::run_sweep(&args)?;
    println!("{}", crate::report::format_sweep(&rows));
    Ok(())
}

fn handle_diff(args: DiffArgs) -> Result<(), AppError> {
    let previous = crate::io::read_result_json(&args.previous)?;
    let current = crate::io::read_result_json(&args.current)?;
    let diff = crate::report::diff_results(&previous.geometry, &current.geometry);
    print!("{}", crate::report::format_diff(&diff));
    Ok(())
}

//! Command-line parsing for the GI geometry resolver.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! resolution engine and the report formatting.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "gigeo", version, about = "Grating interferometer geometry resolver")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resolve a configuration, print the report and optionally a sketch / result file.
    Resolve(ResolveArgs),
    /// Show which distances the configured topology expects as input.
    Slots(ConfigArg),
    /// Resolve the configuration across a range of design energies.
    Sweep(SweepArgs),
    /// Compare two result files.
    Diff(DiffArgs),
}

/// Configuration file (TOML, or JSON by extension).
#[derive(Debug, Args, Clone)]
pub struct ConfigArg {
    #[arg(short = 'c', long, value_name = "FILE", env = "GIGEO_CONFIG")]
    pub config: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub config: ConfigArg,

    /// Override the design energy (keV).
    #[arg(long)]
    pub energy: Option<f64>,

    /// Render an ASCII sketch of the layout.
    #[arg(long)]
    pub sketch: bool,

    /// Sketch width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Sketch height (rows).
    #[arg(long, default_value_t = 21)]
    pub height: usize,

    /// Write the result (input + flat geometry) to a JSON file.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,

    /// Compare against a previously exported result file.
    #[arg(long, value_name = "JSON")]
    pub previous: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct SweepArgs {
    #[command(flatten)]
    pub config: ConfigArg,

    /// Lowest design energy (keV).
    #[arg(long)]
    pub e_min: f64,

    /// Highest design energy (keV).
    #[arg(long)]
    pub e_max: f64,

    /// Number of energies (inclusive of both ends).
    #[arg(long, default_value_t = 11)]
    pub steps: usize,
}

#[derive(Debug, Args, Clone)]
pub struct DiffArgs {
    /// Earlier result file.
    #[arg(long, value_name = "JSON")]
    pub previous: PathBuf,

    /// Later result file.
    #[arg(long, value_name = "JSON")]
    pub current: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_resolve_with_sketch() {
        let cli = Cli::try_parse_from(["gigeo", "resolve", "-c", "setup.toml", "--sketch", "--width", "60"]).unwrap();
        let Command::Resolve(args) = cli.command else {
            panic!("expected resolve");
        };
        assert_eq!(args.config.config, PathBuf::from("setup.toml"));
        assert!(args.sketch);
        assert_eq!(args.width, 60);
        assert_eq!(args.height, 21);
    }

    #[test]
    fn parses_sweep_range() {
        let cli = Cli::try_parse_from([
            "gigeo", "sweep", "--config", "s.json", "--e-min", "20", "--e-max", "40", "--steps", "5",
        ])
        .unwrap();
        let Command::Sweep(args) = cli.command else {
            panic!("expected sweep");
        };
        assert_eq!((args.e_min, args.e_max, args.steps), (20.0, 40.0, 5));
    }
}

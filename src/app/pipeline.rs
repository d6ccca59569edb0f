//! Shared command workflows.
//!
//! Keeping these in one place keeps the command handlers in `app` down to
//! presentation: load config -> resolve -> (export, compare) -> return outputs.

use tracing::info;

use crate::cli::{ConfigArg, ResolveArgs, SweepArgs};
use crate::domain::{Configuration, GeometryResult};
use crate::error::AppError;
use crate::geometry::{Classification, build_chain, classify, resolve};
use crate::report::DiffEntry;
use crate::sweep::SweepRow;

/// All computed outputs of a single `gigeo resolve` run.
#[derive(Debug, Clone)]
pub struct ResolveRun {
    pub config: Configuration,
    pub result: GeometryResult,
    /// Changes relative to `--previous`, when given.
    pub diff: Option<Vec<DiffEntry>>,
}

pub fn load_config(arg: &ConfigArg) -> Result<Configuration, AppError> {
    crate::io::read_configuration(&arg.config)
}

/// Resolve the configured setup, then export and compare as requested.
pub fn run_resolve(args: &ResolveArgs) -> Result<ResolveRun, AppError> {
    let mut config = load_config(&args.config)?;
    if let Some(energy) = args.energy {
        config.design_energy = energy;
    }

    let result = resolve(&config)?;
    info!(
        components = result.chain().len(),
        gratings = result.gratings().len(),
        "geometry resolved"
    );

    if let Some(path) = &args.export {
        crate::io::write_result_json(path, &config, &result)?;
        info!(path = %path.display(), "result written");
    }

    let diff = match &args.previous {
        Some(path) => {
            let previous = crate::io::read_result_json(path)?;
            Some(crate::report::diff_results(&previous.geometry, &result.to_map()))
        }
        None => None,
    };

    Ok(ResolveRun { config, result, diff })
}

/// Classify the distance slots of the configured setup.
pub fn run_classify(arg: &ConfigArg) -> Result<Classification, AppError> {
    let config = load_config(arg)?;
    let chain = build_chain(&config)?;
    Ok(classify(&chain, config.beam_geometry, config.gi_geometry, config.dual_phase))
}

/// Resolve the configured setup across the requested energy grid.
pub fn run_sweep(args: &SweepArgs) -> Result<Vec<SweepRow>, AppError> {
    let config = load_config(&args.config)?;
    let energies = crate::sweep::energy_grid(args.e_min, args.e_max, args.steps)?;
    let rows = crate::sweep::sweep_energies(&config, &energies);
    let failed = rows.iter().filter(|r| r.outcome.is_err()).count();
    info!(energies = rows.len(), failed, "sweep finished");
    Ok(rows)
}

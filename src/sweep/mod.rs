//! Design-energy sweep.
//!
//! Resolves one configuration at many design energies. Every resolution is an
//! independent pure call, so the grid is evaluated with rayon and the rows are
//! returned in grid order.

use rayon::prelude::*;

use crate::domain::{Configuration, GeometryResult};
use crate::error::{AppError, ResolveError};
use crate::geometry::resolve;

/// One energy of a sweep.
#[derive(Debug, Clone)]
pub struct SweepRow {
    pub energy: f64,
    pub outcome: Result<GeometryResult, ResolveError>,
}

/// `steps` evenly spaced energies between `min` and `max` (inclusive).
pub fn energy_grid(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, AppError> {
    if !(min.is_finite() && max.is_finite() && min > 0.0 && max >= min) {
        return Err(AppError::new(
            2,
            format!("Invalid energy range: min={min}, max={max} (must be finite, >0, and max>=min)."),
        ));
    }
    if steps == 0 {
        return Err(AppError::new(2, "Energy steps must be >= 1."));
    }
    if steps == 1 {
        return Ok(vec![min]);
    }

    let step = (max - min) / (steps as f64 - 1.0);
    Ok((0..steps).map(|i| min + step * i as f64).collect())
}

/// Resolve `config` at every energy of the grid.
pub fn sweep_energies(config: &Configuration, energies: &[f64]) -> Vec<SweepRow> {
    energies
        .par_iter()
        .map(|&energy| {
            let mut at_energy = config.clone();
            at_energy.design_energy = energy;
            SweepRow {
                energy,
                outcome: resolve(&at_energy),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BeamGeometry, Component, GiGeometry, Grating, GratingConfig, GratingType};

    #[test]
    fn energy_grid_is_inclusive() {
        let grid = energy_grid(20.0, 40.0, 5).unwrap();
        assert_eq!(grid, vec![20.0, 25.0, 30.0, 35.0, 40.0]);
        assert_eq!(energy_grid(30.0, 30.0, 1).unwrap(), vec![30.0]);
        assert!(energy_grid(0.0, 10.0, 3).is_err());
        assert!(energy_grid(10.0, 5.0, 3).is_err());
        assert!(energy_grid(10.0, 20.0, 0).is_err());
    }

    #[test]
    fn sweep_keeps_grid_order_and_matches_single_resolution() {
        let config = Configuration::new(BeamGeometry::Parallel, GiGeometry::Conv, 25.0)
            .with_grating(Grating::G1, GratingConfig::flat(GratingType::Phase))
            .with_grating(Grating::G2, GratingConfig::flat(GratingType::Abs))
            .with_fixed_pitch(Grating::G1, 5.0);
        let energies = energy_grid(20.0, 40.0, 9).unwrap();
        let rows = sweep_energies(&config, &energies);

        assert_eq!(rows.len(), energies.len());
        let mut previous = 0.0;
        for row in &rows {
            let result = row.outcome.as_ref().unwrap();
            let d = result.distance(Component::G1, Component::G2).unwrap();
            // Talbot distance grows linearly with energy
            assert!(d > previous);
            previous = d;

            let mut single = config.clone();
            single.design_energy = row.energy;
            assert_eq!(result, &resolve(&single).unwrap());
        }
    }
}

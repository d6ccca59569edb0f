//! Bent-grating and curved-detector radii.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::domain::{BeamGeometry, Component, Configuration, DistanceGraph, Grating, GratingSpec};
use crate::error::ResolveError;

/// Fill in `radius` for every bent grating.
///
/// An explicit radius wins; otherwise `matching_radius` sets it to the
/// distance from the Source, which only exists for a cone beam.
pub fn apply_radii(
    config: &Configuration,
    graph: &DistanceGraph,
    mut specs: BTreeMap<Grating, GratingSpec>,
) -> Result<BTreeMap<Grating, GratingSpec>, ResolveError> {
    for (&grating, spec) in specs.iter_mut() {
        let settings = config.grating(grating);
        let name = grating.display_name();

        if !settings.bent {
            if settings.radius.is_some() {
                warn!(grating = name, "ignoring radius of a straight grating");
            }
            continue;
        }

        let radius = match (settings.radius, settings.matching_radius) {
            (Some(radius), _) => radius,
            (None, true) => {
                if config.beam_geometry == BeamGeometry::Parallel {
                    return Err(ResolveError::geometry(format!(
                        "cannot match the radius of {name} to a parallel beam"
                    )));
                }
                graph.between(Component::Source, grating.component()).ok_or_else(|| {
                    ResolveError::geometry(format!("the Source to {name} distance is undefined"))
                })?
            }
            (None, false) => {
                return Err(ResolveError::geometry(format!(
                    "{name} is bent but has neither a radius nor a matching radius"
                )));
            }
        };
        if !(radius.is_finite() && radius > 0.0) {
            return Err(ResolveError::geometry(format!(
                "radius of {name} must be positive, got {radius} mm"
            )));
        }
        debug!(grating = name, radius, "bent grating");
        spec.radius = Some(radius);
    }
    Ok(specs)
}

/// Radius of a curved detector: its distance from the Source.
pub fn detector_radius(config: &Configuration, graph: &DistanceGraph) -> Result<Option<f64>, ResolveError> {
    if !config.curved_detector {
        return Ok(None);
    }
    if config.beam_geometry == BeamGeometry::Parallel {
        return Err(ResolveError::geometry("a curved detector needs a cone beam"));
    }
    let radius = graph
        .between(Component::Source, Component::Detector)
        .ok_or_else(|| ResolveError::geometry("the Source to Detector distance is undefined"))?;
    if radius <= 0.0 {
        return Err(ResolveError::geometry(format!(
            "radius of the detector must be positive, got {radius} mm"
        )));
    }
    Ok(Some(radius))
}

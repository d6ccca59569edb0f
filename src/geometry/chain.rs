//! Component chain builder.
//!
//! Turns the presence flags of a [`Configuration`] into the ordered component
//! sequence `Source, [G0], [G1], [G2], Detector` and inserts the sample at its
//! symbolic position.

use tracing::debug;

use crate::domain::{
    BeamGeometry, Component, ComponentChain, Configuration, Grating, GratingType, RelativePosition,
};
use crate::error::ResolveError;
use crate::geometry::sample::check_placement;

/// Build the full component chain (sample included) for a configuration.
pub fn build_chain(config: &Configuration) -> Result<ComponentChain, ResolveError> {
    let mut components = vec![Component::Source];
    for grating in Grating::ALL {
        if !config.grating(grating).present {
            continue;
        }
        if grating == Grating::G0 {
            if config.beam_geometry == BeamGeometry::Parallel {
                return Err(ResolveError::configuration("G0 can only be used with a cone beam."));
            }
            if config.dual_phase {
                return Err(ResolveError::configuration("G0 cannot be used in dual-phase mode."));
            }
        }
        components.push(grating.component());
    }
    components.push(Component::Detector);

    if !config.gi_geometry.is_free() {
        for grating in [Grating::G1, Grating::G2] {
            if !config.grating(grating).present {
                return Err(ResolveError::configuration(format!(
                    "The '{}' interferometer geometry requires G1 and G2 ({} is missing).",
                    config.gi_geometry.as_str(),
                    grating.display_name()
                )));
            }
        }
    }
    check_grating_types(config)?;

    let chain = ComponentChain::from_components(components);
    if !config.sample.present {
        return Ok(chain);
    }

    check_placement(config, &chain)?;
    let chain = insert_sample(&chain, config.sample.relative_to, config.sample.relative_position)?;
    debug!(components = ?chain.display_names(), "sample inserted");
    Ok(chain)
}

/// Insert the sample next to `relative_to`.
///
/// The sample lands at `index(relative_to) + 1` when placed after the
/// reference and at `index(relative_to)` when placed before it.
pub fn insert_sample(
    chain: &ComponentChain,
    relative_to: Component,
    position: RelativePosition,
) -> Result<ComponentChain, ResolveError> {
    if chain.contains(Component::Sample) {
        return Err(ResolveError::configuration("A sample is already placed in the setup."));
    }
    let index = chain.index_of(relative_to).ok_or_else(|| {
        ResolveError::configuration(format!(
            "Sample reference {} is not part of the setup.",
            relative_to.display_name()
        ))
    })?;
    let at = match position {
        RelativePosition::After => index + 1,
        RelativePosition::Before => index,
    };
    if at == 0 || at >= chain.len() {
        return Err(ResolveError::configuration(format!(
            "The sample cannot be placed {} {}.",
            position.as_str(),
            relative_to.display_name()
        )));
    }

    let mut components = chain.components().to_vec();
    components.insert(at, Component::Sample);
    Ok(ComponentChain::from_components(components))
}

/// Every present grating needs a type; fixed topologies restrict the choice.
fn check_grating_types(config: &Configuration) -> Result<(), ResolveError> {
    for grating in Grating::ALL {
        let g = config.grating(grating);
        if !g.present {
            continue;
        }
        let Some(kind) = g.kind else {
            return Err(ResolveError::configuration(format!(
                "Type of {} not defined.",
                grating.display_name()
            )));
        };
        if config.gi_geometry.is_free() {
            continue;
        }
        let allowed: &[GratingType] = match grating {
            Grating::G0 => &[GratingType::Mix, GratingType::Abs],
            Grating::G1 => &[GratingType::Mix, GratingType::Phase],
            Grating::G2 if config.dual_phase => &[GratingType::Mix, GratingType::Phase],
            Grating::G2 => &[GratingType::Mix, GratingType::Abs],
        };
        if !allowed.contains(&kind) {
            let options: Vec<&str> = allowed.iter().map(|t| t.as_str()).collect();
            return Err(ResolveError::configuration(format!(
                "{} cannot be of type '{}' in '{}' geometry. Options are {:?}.",
                grating.display_name(),
                kind.as_str(),
                config.gi_geometry.as_str(),
                options
            )));
        }
    }
    Ok(())
}

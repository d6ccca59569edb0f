//! Grating parameter resolver: pitch and duty cycle per grating.

use std::collections::BTreeMap;

use tracing::debug;

use crate::domain::{
    BeamGeometry, Component, ComponentChain, Configuration, DistanceGraph, FringeSpec, Grating, GratingSpec,
    GratingType, MixedDutyCycle,
};
use crate::error::ResolveError;
use crate::physics::{Talbot, UM_PER_MM, magnification, parallel_equivalent};

/// The externally pinned grating pitch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchReference {
    pub grating: Grating,
    /// Pitch as entered (µm); reported unchanged.
    pub pitch_um: f64,
    pub pitch_mm: f64,
}

impl PitchReference {
    /// Reads `fixed_grating` / `fixed_pitch`. Both or neither must be set.
    pub fn from_config(config: &Configuration, chain: &ComponentChain) -> Result<Option<Self>, ResolveError> {
        let (grating, pitch_um) = match (config.fixed_grating, config.fixed_pitch) {
            (None, None) => return Ok(None),
            (None, Some(_)) => {
                return Err(ResolveError::configuration("A fixed pitch was given but no fixed grating was chosen."));
            }
            (Some(grating), None) => {
                return Err(ResolveError::configuration(format!(
                    "Fixed grating {} has no pitch.",
                    grating.display_name()
                )));
            }
            (Some(grating), Some(pitch)) => (grating, pitch),
        };
        if !chain.has_grating(grating) {
            return Err(ResolveError::configuration(format!(
                "Fixed grating {} is not part of the setup.",
                grating.display_name()
            )));
        }
        if config.dual_phase && grating != Grating::G1 {
            return Err(ResolveError::configuration(
                "In dual-phase mode only G1 can be the fixed grating.",
            ));
        }
        if !(pitch_um.is_finite() && pitch_um > 0.0) {
            return Err(ResolveError::geometry(format!(
                "pitch of the fixed grating {} must be positive, got {pitch_um} µm",
                grating.display_name()
            )));
        }
        Ok(Some(Self {
            grating,
            pitch_um,
            pitch_mm: pitch_um / UM_PER_MM,
        }))
    }
}

/// Pitch and duty cycle of every present grating (radii are filled in later).
pub fn resolve_gratings(
    config: &Configuration,
    chain: &ComponentChain,
    graph: &DistanceGraph,
    reference: Option<&PitchReference>,
    talbot: &Talbot,
) -> Result<BTreeMap<Grating, GratingSpec>, ResolveError> {
    let mut pitches = talbot_pitches(config, chain, graph, talbot)?;
    if let Some(reference) = reference {
        pitches.insert(reference.grating, reference.pitch_um);
    }

    let reference_pitch = reference
        .map(|r| r.pitch_um)
        .or_else(|| pitches.get(&Grating::G1).copied());

    let mut specs = BTreeMap::new();
    for grating in chain.gratings() {
        let Some(&pitch) = pitches.get(&grating) else {
            return Err(ResolveError::geometry(format!(
                "the pitch of {} cannot be derived without both G1 and G2 or a fixed pitch",
                grating.display_name()
            )));
        };
        if !(pitch.is_finite() && pitch > 0.0) {
            return Err(ResolveError::geometry(format!(
                "derived pitch of {} is not positive ({pitch} µm)",
                grating.display_name()
            )));
        }
        let duty_cycle = duty_cycle(config, grating, pitch, reference_pitch)?;
        debug!(grating = grating.display_name(), pitch, duty_cycle, "grating resolved");
        specs.insert(
            grating,
            GratingSpec {
                pitch,
                duty_cycle,
                radius: None,
            },
        );
    }
    Ok(specs)
}

/// Pitches (µm) implied by the G1–G2 Talbot condition.
fn talbot_pitches(
    config: &Configuration,
    chain: &ComponentChain,
    graph: &DistanceGraph,
    talbot: &Talbot,
) -> Result<BTreeMap<Grating, f64>, ResolveError> {
    let mut pitches = BTreeMap::new();
    if !(chain.has_grating(Grating::G1) && chain.has_grating(Grating::G2)) {
        return Ok(pitches);
    }

    let d = graph
        .between(Component::G1, Component::G2)
        .ok_or_else(|| ResolveError::geometry("the G1 to G2 distance is undefined"))?;
    if d <= 0.0 {
        return Err(ResolveError::geometry(format!(
            "the G1 to G2 distance must be positive, got {d} mm"
        )));
    }

    match config.beam_geometry {
        BeamGeometry::Parallel => {
            let p1 = talbot.pitch(d) * UM_PER_MM;
            pitches.insert(Grating::G1, p1);
            pitches.insert(Grating::G2, p1);
        }
        BeamGeometry::Cone => {
            let upstream = chain.upstream();
            let l = graph.between(upstream, Component::G1).ok_or_else(|| {
                ResolveError::geometry(format!("the {upstream} to G1 distance is undefined"))
            })?;
            if l <= 0.0 {
                return Err(ResolveError::geometry(format!(
                    "the {upstream} to G1 distance must be positive, got {l} mm"
                )));
            }
            let p1 = talbot.pitch(parallel_equivalent(l, d)) * UM_PER_MM;
            let p2 = p1 * magnification(l, d);
            pitches.insert(Grating::G1, p1);
            pitches.insert(Grating::G2, p2);
            if chain.has_grating(Grating::G0) {
                pitches.insert(Grating::G0, p2 * l / d);
            }
        }
    }
    Ok(pitches)
}

fn duty_cycle(
    config: &Configuration,
    grating: Grating,
    pitch: f64,
    reference_pitch: Option<f64>,
) -> Result<f64, ResolveError> {
    let base = config.duty_cycle;
    let value = match (config.grating(grating).kind, config.mixed_duty_cycle, reference_pitch) {
        (Some(GratingType::Mix), MixedDutyCycle::PitchRatio, Some(reference)) => base * reference / pitch,
        _ => base,
    };
    if !(value > 0.0 && value < 1.0) {
        return Err(ResolveError::geometry(format!(
            "duty cycle of {} must lie in (0, 1), got {value}",
            grating.display_name()
        )));
    }
    Ok(value)
}

/// Detector fringe of a dual-phase setup: the G2 pitch projected onto the detector.
pub fn resolve_fringe(
    config: &Configuration,
    graph: &DistanceGraph,
    specs: &BTreeMap<Grating, GratingSpec>,
) -> Option<FringeSpec> {
    if !config.dual_phase {
        return None;
    }
    let g2 = specs.get(&Grating::G2)?;
    let projection = match config.beam_geometry {
        BeamGeometry::Parallel => 1.0,
        BeamGeometry::Cone => {
            let to_detector = graph.between(Component::Source, Component::Detector)?;
            let to_g2 = graph.between(Component::Source, Component::G2)?;
            to_detector / to_g2
        }
    };
    Some(FringeSpec {
        pitch: g2.pitch * projection,
        duty_cycle: config.duty_cycle,
    })
}

//! Distance solver.
//!
//! Fills every defined segment of the optical chain from the supplied values
//! and the topology algebra, then checks each supplied value against the
//! solved graph. The sample is placed later and is not part of this graph.
//! Totals are sums of the stored segments, so the path needs no check of its own.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::domain::{BeamGeometry, Component, ComponentChain, Configuration, DistanceGraph, GiGeometry, Grating, PairKey};
use crate::error::{DISTANCE_TOLERANCE, ResolveError};
use crate::geometry::gratings::PitchReference;
use crate::geometry::topology::{Classification, SlotKind};
use crate::math::{bisect, quadratic_roots};
use crate::physics::{Talbot, cone_distance};

type Supplied = BTreeMap<PairKey, f64>;

/// Solve the optical-chain distances.
pub fn solve_distances(
    chain: &ComponentChain,
    classification: &Classification,
    config: &Configuration,
    reference: Option<&PitchReference>,
    talbot: &Talbot,
) -> Result<DistanceGraph, ResolveError> {
    let optical = chain.optical();
    let supplied = collect_supplied(&optical, classification, config)?;

    let segments = match (config.beam_geometry, config.gi_geometry) {
        (_, GiGeometry::Free) => solve_free(&optical, &supplied)?,
        (BeamGeometry::Parallel, _) => solve_parallel(&optical, &supplied, config, reference, talbot)?,
        (BeamGeometry::Cone, _) => solve_cone(&optical, &supplied, config, reference, talbot)?,
    };
    let graph = DistanceGraph::new(optical.components().to_vec(), segments);

    check_supplied(&graph, &supplied)?;
    debug!(segments = ?graph.segments(), "distances solved");
    Ok(graph)
}

/// Supplied values of every non-forbidden slot, validated as finite and ≥ 0.
///
/// Totals between optical components that are not slots of their own (e.g.
/// Source to Detector from an earlier result) are kept for the consistency check.
fn collect_supplied(
    optical: &ComponentChain,
    classification: &Classification,
    config: &Configuration,
) -> Result<Supplied, ResolveError> {
    let mut supplied = Supplied::new();
    for (&pair, value) in &config.known_distances {
        let Some(value) = *value else { continue };
        let kind = classification.kind(pair);
        if kind.is_none() && !(optical.contains(pair.from) && optical.contains(pair.to)) {
            // distances to the sample are checked once it is placed
            if pair.from != Component::Sample && pair.to != Component::Sample {
                warn!(distance = %pair.label(), "ignoring distance that is not part of this setup");
            }
            continue;
        }
        if kind == Some(SlotKind::Forbidden) {
            warn!(distance = %pair.label(), value, "ignoring distance this topology does not define");
            continue;
        }
        if !(value.is_finite() && value >= 0.0) {
            return Err(ResolveError::geometry(format!(
                "{} must be a non-negative number of mm, got {value}",
                pair.label()
            )));
        }
        supplied.insert(pair, value);
    }
    Ok(supplied)
}

fn solve_free(optical: &ComponentChain, supplied: &Supplied) -> Result<Vec<Option<f64>>, ResolveError> {
    optical
        .components()
        .windows(2)
        .map(|w| {
            let pair = PairKey::new(w[0], w[1]);
            supplied
                .get(&pair)
                .copied()
                .map(Some)
                .ok_or(ResolveError::missing_distance(pair))
        })
        .collect()
}

/// Only G1–G2 is defined; it is either supplied or the Talbot distance of the fixed pitch.
fn solve_parallel(
    optical: &ComponentChain,
    supplied: &Supplied,
    config: &Configuration,
    reference: Option<&PitchReference>,
    talbot: &Talbot,
) -> Result<Vec<Option<f64>>, ResolveError> {
    let g1_g2 = PairKey::new(Component::G1, Component::G2);
    let d = match pinned_distance(supplied, config, g1_g2)? {
        Some(d) => d,
        None => {
            let reference = require_reference(reference, g1_g2)?;
            talbot.distance(reference.pitch_mm)
        }
    };
    ensure_positive(g1_g2, d)?;

    Ok(optical
        .components()
        .windows(2)
        .map(|w| (PairKey::new(w[0], w[1]) == g1_g2).then_some(d))
        .collect())
}

fn solve_cone(
    optical: &ComponentChain,
    supplied: &Supplied,
    config: &Configuration,
    reference: Option<&PitchReference>,
    talbot: &Talbot,
) -> Result<Vec<Option<f64>>, ResolveError> {
    let upstream = optical.upstream();
    let to_g1 = PairKey::new(upstream, Component::G1);
    let to_g2 = PairKey::new(upstream, Component::G2);
    let g1_g2 = PairKey::new(Component::G1, Component::G2);

    let pinned = if config.dual_phase {
        let d = pinned_distance(supplied, config, g1_g2)?;
        Some(d.ok_or(ResolveError::missing_distance(g1_g2))?)
    } else {
        config.fixed_distance
    };

    let (l, d) = if config.gi_geometry == GiGeometry::Sym {
        let d = match pinned {
            Some(d) => d,
            None => 3.0 * talbot.distance(symmetric_g1_pitch(require_reference(reference, g1_g2)?)),
        };
        (0.5 * d, d)
    } else {
        // A given l fixes d through the Talbot relation; conv/inv only pick
        // the root when l has to be found from the total.
        let l = match (supplied.get(&to_g1), supplied.get(&to_g2)) {
            (Some(&l), _) => l,
            (None, Some(&s)) => upstream_from_total(s, pinned, reference, talbot, config.gi_geometry, to_g2)?,
            (None, None) => {
                return Err(ResolveError::geometry(format!(
                    "missing required distance: {} or {}",
                    to_g1.label(),
                    to_g2.label()
                )));
            }
        };
        let d = match pinned {
            Some(d) => d,
            None => cone_distance(l, cone_talbot_distance(l, require_reference(reference, g1_g2)?, talbot))?,
        };
        (l, d)
    };
    ensure_positive(to_g1, l)?;
    ensure_positive(g1_g2, d)?;
    debug!(l, d, upstream = %upstream, "interferometer distances");

    Ok(optical
        .components()
        .windows(2)
        .map(|w| {
            let pair = PairKey::new(w[0], w[1]);
            if pair == to_g1 {
                Some(l)
            } else if pair == g1_g2 {
                Some(d)
            } else {
                Some(optional(supplied, pair))
            }
        })
        .collect())
}

/// Supplied G1–G2 value and `fixed_distance`; both given must agree.
fn pinned_distance(supplied: &Supplied, config: &Configuration, pair: PairKey) -> Result<Option<f64>, ResolveError> {
    match (supplied.get(&pair).copied(), config.fixed_distance) {
        (Some(value), Some(fixed)) if (value - fixed).abs() > DISTANCE_TOLERANCE => {
            Err(ResolveError::over_determined(pair, value, fixed))
        }
        (Some(value), _) => Ok(Some(value)),
        (None, fixed) => Ok(fixed),
    }
}

fn optional(supplied: &Supplied, pair: PairKey) -> f64 {
    supplied.get(&pair).copied().unwrap_or_else(|| {
        debug!(distance = %pair.label(), "optional distance not given, using 0 mm");
        0.0
    })
}

fn require_reference(reference: Option<&PitchReference>, pair: PairKey) -> Result<&PitchReference, ResolveError> {
    reference.ok_or_else(|| {
        ResolveError::geometry(format!(
            "{} cannot be derived: set a fixed grating pitch or a fixed distance",
            pair.label()
        ))
    })
}

fn ensure_positive(pair: PairKey, value: f64) -> Result<(), ResolveError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ResolveError::geometry(format!("{} must be positive, got {value} mm", pair.label())))
    }
}

/// G1 pitch (mm) of a symmetric setup, where `l = 1.5·D`, `d = 3·D` and `M = 3`.
fn symmetric_g1_pitch(reference: &PitchReference) -> f64 {
    match reference.grating {
        Grating::G0 => reference.pitch_mm / 1.5,
        Grating::G1 => reference.pitch_mm,
        Grating::G2 => reference.pitch_mm / 3.0,
    }
}

/// Talbot distance of a cone setup with upstream distance `l` and a fixed pitch.
fn cone_talbot_distance(l: f64, reference: &PitchReference, talbot: &Talbot) -> f64 {
    let k = talbot.k();
    let p = reference.pitch_mm;
    let p1 = match reference.grating {
        Grating::G1 => p,
        // p0 = p2·l/d = p1·l·(l+d)/(l·d) = l/(k·p1)
        Grating::G0 => l / (k * p),
        // k·p2·p1² + l·p1 − l·p2 = 0, positive root
        Grating::G2 => (-l + (l * l + 4.0 * k * p * p * l).sqrt()) / (2.0 * k * p),
    };
    talbot.distance(p1)
}

/// Upstream-to-G1 distance of a conv/inv setup when only the upstream-to-G2
/// total `s` is known.
fn upstream_from_total(
    s: f64,
    pinned: Option<f64>,
    reference: Option<&PitchReference>,
    talbot: &Talbot,
    gi: GiGeometry,
    total: PairKey,
) -> Result<f64, ResolveError> {
    if let Some(d) = pinned {
        let l = s - d;
        if l <= 0.0 {
            return Err(ResolveError::geometry(format!(
                "{} ({s} mm) must exceed the G1 to G2 distance ({d} mm)",
                total.label()
            )));
        }
        return Ok(l);
    }

    let g1_g2 = PairKey::new(Component::G1, Component::G2);
    let reference = require_reference(reference, g1_g2)?;
    let converging = gi == GiGeometry::Conv;
    let k = talbot.k();

    if reference.grating == Grating::G1 {
        // l·d/(l+d) = D with l + d = s  =>  l² − s·l + s·D = 0
        let talbot_d = talbot.distance(reference.pitch_mm);
        let (near, far) = quadratic_roots(1.0, -s, s * talbot_d).ok_or_else(|| {
            ResolveError::geometry(format!(
                "{} ({s} mm) is shorter than four Talbot distances ({} mm)",
                total.label(),
                4.0 * talbot_d
            ))
        })?;
        return Ok(if converging { far } else { near });
    }

    let fixed = reference.grating;
    let target = reference.pitch_mm;
    let residual = |l: f64| {
        let d = s - l;
        let p1 = talbot.pitch(l * d / s);
        let pitch = match fixed {
            Grating::G0 => l / (k * p1),
            _ => p1 * s / l,
        };
        pitch - target
    };
    let (lo, hi) = if converging {
        (0.5 * s, s * (1.0 - 1e-12))
    } else {
        (s * 1e-12, 0.5 * s)
    };
    bisect(residual, lo, hi).ok_or_else(|| {
        ResolveError::geometry(format!(
            "no '{}' layout with {} = {s} mm matches the fixed {} pitch",
            gi.as_str(),
            total.label(),
            fixed.display_name()
        ))
    })
}

/// Every supplied value must agree with the solved graph.
fn check_supplied(graph: &DistanceGraph, supplied: &Supplied) -> Result<(), ResolveError> {
    for (&pair, &value) in supplied {
        let Some(implied) = graph.between(pair.from, pair.to) else {
            continue;
        };
        if (value - implied).abs() > DISTANCE_TOLERANCE {
            return Err(ResolveError::over_determined(pair, value, implied));
        }
    }
    Ok(())
}

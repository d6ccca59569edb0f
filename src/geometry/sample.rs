//! Sample placement resolver.

use tracing::{debug, warn};

use crate::domain::{
    BeamGeometry, Component, ComponentChain, Configuration, DistanceGraph, GiGeometry, PairKey, RelativePosition,
    SamplePlacement,
};
use crate::error::{DISTANCE_TOLERANCE, ResolveError};

/// Placement rules for the sample relative to the optical chain.
pub fn check_placement(config: &Configuration, chain: &ComponentChain) -> Result<(), ResolveError> {
    let sample = &config.sample;
    let reference = sample.relative_to;
    let position = sample.relative_position;

    if reference == Component::Sample {
        return Err(ResolveError::configuration("The sample cannot be placed relative to itself."));
    }
    if !chain.contains(reference) {
        return Err(ResolveError::configuration(format!(
            "Sample reference {} is not part of the setup.",
            reference.display_name()
        )));
    }
    match (reference, position) {
        (Component::Source, RelativePosition::Before) => {
            return Err(ResolveError::configuration("The sample can only be placed after the Source."));
        }
        (Component::Detector, RelativePosition::After) => {
            return Err(ResolveError::configuration("The sample can only be placed before the Detector."));
        }
        _ => {}
    }

    let gi = config.gi_geometry;
    if gi.is_free() {
        return Ok(());
    }
    if reference != Component::G1 {
        return Err(ResolveError::configuration(format!(
            "In '{}' geometry the sample must be placed relative to G1.",
            gi.as_str()
        )));
    }
    match (gi, position, config.beam_geometry) {
        (GiGeometry::Conv, RelativePosition::After, BeamGeometry::Cone) => Err(ResolveError::configuration(
            "In 'conv' geometry the sample must be placed before G1.",
        )),
        (GiGeometry::Inv, RelativePosition::Before, _) => Err(ResolveError::configuration(
            "In 'inv' geometry the sample must be placed after G1.",
        )),
        _ => Ok(()),
    }
}

/// Two-part placement code: `a`/`b` followed by `s`, `d` or the grating key.
pub fn position_code(reference: Component, position: RelativePosition) -> String {
    let letter = match position {
        RelativePosition::Before => 'b',
        RelativePosition::After => 'a',
    };
    let target = match reference {
        Component::Source => "s",
        Component::Detector => "d",
        other => other.key(),
    };
    format!("{letter}{target}")
}

/// Place the sample in the optical distance graph.
///
/// `chain` is the full chain (sample included); `graph` covers its optical
/// part. The segment the sample lands in is split at `distance` from the
/// reference. Where that segment is undefined only the reference side is known.
pub fn place_sample(
    config: &Configuration,
    chain: &ComponentChain,
    graph: &DistanceGraph,
) -> Result<(DistanceGraph, Option<SamplePlacement>), ResolveError> {
    let Some(index) = chain.index_of(Component::Sample) else {
        for pair in supplied_sample_pairs(config).map(|(pair, _)| pair) {
            warn!(distance = %pair.label(), "ignoring sample distance, no sample is placed");
        }
        return Ok((graph.clone(), None));
    };
    let reference = config.sample.relative_to;
    let position = config.sample.relative_position;
    let order = graph.components();
    let (prev, next) = (order[index - 1], order[index]);

    let pair = match position {
        RelativePosition::After => PairKey::new(reference, Component::Sample),
        RelativePosition::Before => PairKey::new(Component::Sample, reference),
    };
    let distance = sample_distance(config, pair)?;
    if !(distance.is_finite() && distance >= 0.0) {
        return Err(ResolveError::geometry(format!(
            "{} must be a non-negative number of mm, got {distance}",
            pair.label()
        )));
    }

    let segment = graph.segment(prev, next);
    if let Some(segment) = segment
        && distance > segment + DISTANCE_TOLERANCE
    {
        return Err(ResolveError::geometry(format!(
            "sample distance {distance} mm exceeds the {} to {} distance of {segment} mm",
            prev.display_name(),
            next.display_name()
        )));
    }
    let rest = segment.map(|s| (s - distance).max(0.0));
    let (upstream, downstream) = match position {
        RelativePosition::After => (Some(distance), rest),
        RelativePosition::Before => (rest, Some(distance)),
    };

    let graph = graph.with_sample(index - 1, upstream, downstream);
    check_sample_pairs(config, &graph)?;
    let placement = SamplePlacement {
        reference,
        distance,
        position_code: position_code(reference, position),
    };
    debug!(code = %placement.position_code, distance, "sample placed");
    Ok((graph, Some(placement)))
}

/// Reference-to-sample distance from `known_distances` (either key order) or
/// from `sample.distance`; both given must agree.
fn sample_distance(config: &Configuration, pair: PairKey) -> Result<f64, ResolveError> {
    let supplied = config
        .known_distance(pair)
        .or_else(|| config.known_distance(PairKey::new(pair.to, pair.from)));
    match (supplied, config.sample.distance) {
        (Some(value), Some(alias)) if (value - alias).abs() > DISTANCE_TOLERANCE => {
            Err(ResolveError::over_determined(pair, alias, value))
        }
        (Some(value), _) | (None, Some(value)) => Ok(value),
        (None, None) => Err(ResolveError::missing_distance(pair)),
    }
}

fn supplied_sample_pairs(config: &Configuration) -> impl Iterator<Item = (PairKey, f64)> + '_ {
    config
        .known_distances
        .iter()
        .filter(|(pair, _)| pair.from == Component::Sample || pair.to == Component::Sample)
        .filter_map(|(&pair, value)| value.map(|v| (pair, v)))
}

/// Every supplied distance to the sample must agree with the placed sample.
fn check_sample_pairs(config: &Configuration, graph: &DistanceGraph) -> Result<(), ResolveError> {
    for (pair, value) in supplied_sample_pairs(config) {
        match graph.between(pair.from, pair.to) {
            Some(implied) if (value - implied).abs() > DISTANCE_TOLERANCE => {
                return Err(ResolveError::over_determined(pair, value, implied));
            }
            Some(_) => {}
            None => warn!(distance = %pair.label(), value, "ignoring sample distance this setup does not define"),
        }
    }
    Ok(())
}

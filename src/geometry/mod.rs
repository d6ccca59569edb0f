//! Geometry resolution engine.
//!
//! [`resolve`] runs the stages strictly in order, each consuming the output of
//! the previous one:
//!
//! 1. [`chain`]: component sequence and structural validation
//! 2. [`topology`]: role of every distance slot
//! 3. [`distances`]: the optical-chain distance graph
//! 4. [`gratings`]: pitch and duty cycle per grating
//! 5. [`radius`]: bent-grating and curved-detector radii
//! 6. [`sample`]: sample position and distance
//!
//! The engine is a pure function of the [`Configuration`]: no I/O, no shared
//! state, and identical input always yields an identical result.

pub mod chain;
pub mod distances;
pub mod gratings;
pub mod radius;
pub mod sample;
pub mod topology;

pub use chain::*;
pub use distances::*;
pub use gratings::*;
pub use radius::*;
pub use sample::*;
pub use topology::*;

use tracing::debug;

use crate::domain::{Configuration, GeometryResult, ResultFlags};
use crate::error::ResolveError;
use crate::physics::Talbot;

/// Resolve a configuration into one self-consistent layout.
pub fn resolve(config: &Configuration) -> Result<GeometryResult, ResolveError> {
    let talbot = Talbot::new(config.design_energy, config.talbot_order)?;
    check_settings(config)?;

    let chain = build_chain(config)?;
    debug!(components = ?chain.display_names(), "component chain");

    let classification = classify(&chain, config.beam_geometry, config.gi_geometry, config.dual_phase);
    let reference = PitchReference::from_config(config, &chain)?;

    let graph = solve_distances(&chain, &classification, config, reference.as_ref(), &talbot)?;
    let specs = resolve_gratings(config, &chain, &graph, reference.as_ref(), &talbot)?;
    let fringe = resolve_fringe(config, &graph, &specs);
    let specs = apply_radii(config, &graph, specs)?;
    let radius_detector = detector_radius(config, &graph)?;
    let (graph, sample) = place_sample(config, &chain, &graph)?;

    let flags = ResultFlags {
        beam_geometry: config.beam_geometry,
        gi_geometry: config.gi_geometry,
        dual_phase: config.dual_phase,
        curved_detector: config.curved_detector,
        design_energy: config.design_energy,
        talbot_order: config.talbot_order,
    };
    Ok(GeometryResult::new(chain, graph, specs, fringe, radius_detector, sample, flags))
}

/// Topology-independent settings.
fn check_settings(config: &Configuration) -> Result<(), ResolveError> {
    if !(config.duty_cycle > 0.0 && config.duty_cycle < 1.0) {
        return Err(ResolveError::geometry(format!(
            "duty cycle must lie in (0, 1), got {}",
            config.duty_cycle
        )));
    }
    if let Some(d) = config.fixed_distance
        && !(d.is_finite() && d > 0.0)
    {
        return Err(ResolveError::geometry(format!("fixed distance must be positive, got {d} mm")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BeamGeometry, Component, GiGeometry, Grating, GratingConfig, GratingType, PairKey, RelativePosition};
    use serde_json::Value;

    fn parallel_sym_scenario() -> Configuration {
        Configuration::new(BeamGeometry::Parallel, GiGeometry::Sym, 25.0)
            .with_grating(Grating::G1, GratingConfig::flat(GratingType::Phase))
            .with_grating(Grating::G2, GratingConfig::flat(GratingType::Abs))
            .with_distance(Component::G1, Component::G2, 1000.0)
            .with_fixed_pitch(Grating::G1, 5.0)
    }

    fn cone(gi: GiGeometry) -> Configuration {
        Configuration::new(BeamGeometry::Cone, gi, 30.0)
            .with_grating(Grating::G0, GratingConfig::flat(GratingType::Abs))
            .with_grating(Grating::G1, GratingConfig::flat(GratingType::Phase))
            .with_grating(Grating::G2, GratingConfig::matched(GratingType::Abs))
            .with_fixed_pitch(Grating::G2, 10.0)
            .with_distance(Component::Source, Component::G0, 50.0)
            .with_distance(Component::G2, Component::Detector, 200.0)
    }

    #[test]
    fn parallel_sym_scenario_resolves() {
        let result = resolve(&parallel_sym_scenario()).unwrap();
        let map = result.to_map();

        assert!(!map.contains_key("distance_source_g1"));
        assert_eq!(map["distance_g1_g2"], Value::from(1000.0));
        assert_eq!(map["pitch_g1"], Value::from(5.0));
        let p2 = result.grating(Grating::G2).unwrap().pitch;
        let expected = (8.0 * crate::physics::wavelength_mm(25.0) * 1000.0).sqrt() * 1000.0;
        assert!((p2 - expected).abs() < 1e-9, "got {p2}, expected {expected}");
        assert_eq!(map["duty_cycle_g1"], Value::from(0.5));
        assert_eq!(map["duty_cycle_g2"], Value::from(0.5));
        assert_eq!(map["radius_g1"], Value::Null);
        assert_eq!(map["gi_geometry"], Value::from("sym"));
    }

    #[test]
    fn resolving_twice_is_identical() {
        let config = cone(GiGeometry::Conv).with_distance(Component::G0, Component::G1, 900.0);
        let a = serde_json::to_string(&resolve(&config).unwrap()).unwrap();
        let b = serde_json::to_string(&resolve(&config).unwrap()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn conv_from_total_round_trips() {
        let config = cone(GiGeometry::Conv).with_distance(Component::G0, Component::G2, 1400.0);
        let first = resolve(&config).unwrap();
        let mut again = config.clone();
        for (pair, value) in first.distances().resolved_pairs() {
            again.known_distances.insert(pair, Some(value));
        }
        let second = resolve(&again).unwrap();
        assert_eq!(first.to_map(), second.to_map());
    }

    #[test]
    fn matched_bent_grating_radius_is_distance_from_source() {
        let config = cone(GiGeometry::Inv).with_distance(Component::G0, Component::G1, 300.0);
        let result = resolve(&config).unwrap();
        let radius = result.grating(Grating::G2).unwrap().radius.unwrap();
        assert_eq!(Some(radius), result.distance(Component::Source, Component::G2));
    }

    #[test]
    fn sym_cone_keeps_half_distance() {
        let config = cone(GiGeometry::Sym);
        let result = resolve(&config).unwrap();
        let l = result.distance(Component::G0, Component::G1).unwrap();
        let d = result.distance(Component::G1, Component::G2).unwrap();
        assert_eq!(l, d / 2.0);
        // symmetric magnification of 3 with p0 = p2·l/d
        let p0 = result.grating(Grating::G0).unwrap().pitch;
        assert!((p0 - 5.0).abs() < 1e-9, "got {p0}");
    }

    #[test]
    fn sample_in_result() {
        let config = cone(GiGeometry::Conv)
            .with_distance(Component::G0, Component::G1, 900.0)
            .with_sample(Component::G1, RelativePosition::Before, 100.0);
        let map = resolve(&config).unwrap().to_map();
        assert_eq!(map["sample_position"], Value::from("bg1"));
        assert_eq!(map["distance_sample_g1"], Value::from(100.0));
        assert_eq!(map["distance_g0_sample"], Value::from(800.0));
        assert_eq!(
            map["component_list"],
            serde_json::json!(["Source", "G0", "Sample", "G1", "G2", "Detector"])
        );
    }

    #[test]
    fn failures_leave_no_result() {
        let mut config = parallel_sym_scenario();
        config.duty_cycle = 1.5;
        assert!(resolve(&config).unwrap_err().is_geometry());

        let config = parallel_sym_scenario().with_fixed_distance(900.0);
        let err = resolve(&config).unwrap_err();
        assert_eq!(
            err,
            ResolveError::over_determined(PairKey::new(Component::G1, Component::G2), 1000.0, 900.0)
        );
    }

    #[test]
    fn dual_phase_reports_fringe() {
        let config = Configuration::new(BeamGeometry::Cone, GiGeometry::Inv, 25.0)
            .with_grating(Grating::G1, GratingConfig::flat(GratingType::Phase))
            .with_grating(Grating::G2, GratingConfig::flat(GratingType::Phase))
            .with_dual_phase(true)
            .with_distance(Component::Source, Component::G1, 200.0)
            .with_distance(Component::G1, Component::G2, 100.0)
            .with_distance(Component::G2, Component::Detector, 300.0);
        let result = resolve(&config).unwrap();
        let fringe = result.fringe().unwrap();
        let p2 = result.grating(Grating::G2).unwrap().pitch;
        assert!((fringe.pitch - 2.0 * p2).abs() < 1e-12);
    }
}

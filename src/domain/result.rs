//! The resolved geometry and its flat, serializable view.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::domain::{BeamGeometry, Component, ComponentChain, DistanceGraph, GiGeometry, Grating, PairKey};

/// Flat key/value view of a result, as exported and compared.
pub type ResultMap = BTreeMap<String, Value>;

/// Resolved parameters of one grating.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GratingSpec {
    /// Pitch (µm).
    pub pitch: f64,
    /// Duty cycle in (0, 1).
    pub duty_cycle: f64,
    /// Bending radius (mm); `None` for a straight grating.
    pub radius: Option<f64>,
}

/// Fringe pattern seen by the detector in dual-phase mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FringeSpec {
    /// Fringe period at the detector (µm).
    pub pitch: f64,
    pub duty_cycle: f64,
}

/// Resolved sample placement.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplePlacement {
    pub reference: Component,
    /// Distance between the reference component and the sample (mm).
    pub distance: f64,
    /// Two-part code: placement letter + reference (`ag1`, `bd`, `as`).
    pub position_code: String,
}

/// Echoed configuration flags.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResultFlags {
    pub beam_geometry: BeamGeometry,
    pub gi_geometry: GiGeometry,
    pub dual_phase: bool,
    pub curved_detector: bool,
    pub design_energy: f64,
    pub talbot_order: u32,
}

/// One fully resolved, self-consistent layout.
///
/// Produced once by [`crate::geometry::resolve`] and never modified.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryResult {
    chain: ComponentChain,
    distances: DistanceGraph,
    gratings: BTreeMap<Grating, GratingSpec>,
    fringe: Option<FringeSpec>,
    radius_detector: Option<f64>,
    sample: Option<SamplePlacement>,
    flags: ResultFlags,
}

impl GeometryResult {
    pub(crate) fn new(
        chain: ComponentChain,
        distances: DistanceGraph,
        gratings: BTreeMap<Grating, GratingSpec>,
        fringe: Option<FringeSpec>,
        radius_detector: Option<f64>,
        sample: Option<SamplePlacement>,
        flags: ResultFlags,
    ) -> Self {
        Self {
            chain,
            distances,
            gratings,
            fringe,
            radius_detector,
            sample,
            flags,
        }
    }

    pub fn chain(&self) -> &ComponentChain {
        &self.chain
    }

    pub fn distances(&self) -> &DistanceGraph {
        &self.distances
    }

    pub fn distance(&self, a: Component, b: Component) -> Option<f64> {
        self.distances.between(a, b)
    }

    pub fn grating(&self, grating: Grating) -> Option<&GratingSpec> {
        self.gratings.get(&grating)
    }

    pub fn gratings(&self) -> &BTreeMap<Grating, GratingSpec> {
        &self.gratings
    }

    pub fn fringe(&self) -> Option<&FringeSpec> {
        self.fringe.as_ref()
    }

    pub fn radius_detector(&self) -> Option<f64> {
        self.radius_detector
    }

    pub fn sample(&self) -> Option<&SamplePlacement> {
        self.sample.as_ref()
    }

    pub fn flags(&self) -> &ResultFlags {
        &self.flags
    }

    /// Build the flat mapping with stable keys.
    pub fn to_map(&self) -> ResultMap {
        let mut map = ResultMap::new();

        let names: Vec<Value> = self
            .chain
            .display_names()
            .into_iter()
            .map(Value::from)
            .collect();
        map.insert("component_list".to_string(), Value::Array(names));

        for (pair, length) in self.distances.resolved_pairs() {
            map.insert(pair.result_key(), Value::from(length));
        }

        for (grating, spec) in &self.gratings {
            let key = grating.key();
            map.insert(format!("pitch_{key}"), Value::from(spec.pitch));
            map.insert(format!("duty_cycle_{key}"), Value::from(spec.duty_cycle));
            map.insert(format!("radius_{key}"), opt_value(spec.radius));
        }

        if let Some(fringe) = &self.fringe {
            map.insert("pitch_fringe".to_string(), Value::from(fringe.pitch));
            map.insert("duty_cycle_fringe".to_string(), Value::from(fringe.duty_cycle));
        }
        map.insert("radius_detector".to_string(), opt_value(self.radius_detector));

        map.insert(
            "sample_distance".to_string(),
            opt_value(self.sample.as_ref().map(|s| s.distance)),
        );
        map.insert(
            "sample_position".to_string(),
            self.sample
                .as_ref()
                .map(|s| Value::from(s.position_code.clone()))
                .unwrap_or(Value::Null),
        );

        map.insert("beam_geometry".to_string(), Value::from(self.flags.beam_geometry.as_str()));
        map.insert("gi_geometry".to_string(), Value::from(self.flags.gi_geometry.as_str()));
        map.insert("dual_phase".to_string(), Value::from(self.flags.dual_phase));
        map.insert("curved_detector".to_string(), Value::from(self.flags.curved_detector));
        map.insert("design_energy".to_string(), Value::from(self.flags.design_energy));
        map.insert("talbot_order".to_string(), Value::from(self.flags.talbot_order));

        map
    }

    /// Lookup of a single `distance_<a>_<b>` value by key.
    pub fn distance_by_key(&self, pair: PairKey) -> Option<f64> {
        self.distance(pair.from, pair.to)
    }
}

impl Serialize for GeometryResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_map().serialize(serializer)
    }
}

fn opt_value(value: Option<f64>) -> Value {
    value.map(Value::from).unwrap_or(Value::Null)
}

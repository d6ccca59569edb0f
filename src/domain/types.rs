//! Shared domain types.
//!
//! These types are kept small and serializable so they can be:
//!
//! - loaded from TOML/JSON configuration files
//! - passed by reference through the resolver stages
//! - echoed back into exported result files

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Shape of the illuminating beam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BeamGeometry {
    Parallel,
    Cone,
}

impl BeamGeometry {
    pub fn as_str(self) -> &'static str {
        match self {
            BeamGeometry::Parallel => "parallel",
            BeamGeometry::Cone => "cone",
        }
    }
}

/// Interferometer topology.
///
/// - `Free`: every distance is entered by hand, no shortcut relations.
/// - `Sym`: symmetric setup, the upstream-to-G1 distance is half of G1–G2.
/// - `Conv`: conventional (converging) setup, G1 closer to G2 than to the source.
/// - `Inv`: inverse (diverging) setup, G1 closer to the source than to G2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GiGeometry {
    Free,
    Sym,
    Conv,
    Inv,
}

impl GiGeometry {
    pub fn as_str(self) -> &'static str {
        match self {
            GiGeometry::Free => "free",
            GiGeometry::Sym => "sym",
            GiGeometry::Conv => "conv",
            GiGeometry::Inv => "inv",
        }
    }

    pub fn is_free(self) -> bool {
        self == GiGeometry::Free
    }
}

/// A grating slot in the interferometer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grating {
    #[serde(alias = "G0")]
    G0,
    #[serde(alias = "G1")]
    G1,
    #[serde(alias = "G2")]
    G2,
}

impl Grating {
    pub const ALL: [Grating; 3] = [Grating::G0, Grating::G1, Grating::G2];

    pub fn component(self) -> Component {
        match self {
            Grating::G0 => Component::G0,
            Grating::G1 => Component::G1,
            Grating::G2 => Component::G2,
        }
    }

    /// Lower-case key used in result mappings (`pitch_g1`, ...).
    pub fn key(self) -> &'static str {
        match self {
            Grating::G0 => "g0",
            Grating::G1 => "g1",
            Grating::G2 => "g2",
        }
    }

    pub fn display_name(self) -> &'static str {
        self.component().display_name()
    }
}

/// Grating function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GratingType {
    #[serde(alias = "absorption")]
    Abs,
    Phase,
    #[serde(alias = "mixed")]
    Mix,
}

impl GratingType {
    pub fn as_str(self) -> &'static str {
        match self {
            GratingType::Abs => "abs",
            GratingType::Phase => "phase",
            GratingType::Mix => "mix",
        }
    }
}

/// Any element of the optical chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Component {
    #[serde(alias = "Source")]
    Source,
    #[serde(alias = "G0")]
    G0,
    #[serde(alias = "G1")]
    G1,
    #[serde(alias = "G2")]
    G2,
    #[serde(alias = "Sample")]
    Sample,
    #[serde(alias = "Detector")]
    Detector,
}

impl Component {
    pub fn display_name(self) -> &'static str {
        match self {
            Component::Source => "Source",
            Component::G0 => "G0",
            Component::G1 => "G1",
            Component::G2 => "G2",
            Component::Sample => "Sample",
            Component::Detector => "Detector",
        }
    }

    /// Lower-case key used in `distance_<a>_<b>` names.
    pub fn key(self) -> &'static str {
        match self {
            Component::Source => "source",
            Component::G0 => "g0",
            Component::G1 => "g1",
            Component::G2 => "g2",
            Component::Sample => "sample",
            Component::Detector => "detector",
        }
    }

    pub fn grating(self) -> Option<Grating> {
        match self {
            Component::G0 => Some(Grating::G0),
            Component::G1 => Some(Grating::G1),
            Component::G2 => Some(Grating::G2),
            _ => None,
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "source" => Some(Component::Source),
            "g0" => Some(Component::G0),
            "g1" => Some(Component::G1),
            "g2" => Some(Component::G2),
            "sample" => Some(Component::Sample),
            "detector" => Some(Component::Detector),
            _ => None,
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// An ordered pair of components naming a distance (`from` upstream of `to`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PairKey {
    pub from: Component,
    pub to: Component,
}

impl PairKey {
    pub fn new(from: Component, to: Component) -> Self {
        Self { from, to }
    }

    /// Result-mapping key, e.g. `distance_source_g1`.
    pub fn result_key(self) -> String {
        format!("distance_{self}")
    }

    /// Human-readable label, e.g. `Source to G1`.
    pub fn label(self) -> String {
        format!("{} to {}", self.from.display_name(), self.to.display_name())
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.from.key(), self.to.key())
    }
}

impl FromStr for PairKey {
    type Err = String;

    /// Accepts `source_g1` and `distance_source_g1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let body = trimmed.strip_prefix("distance_").unwrap_or(trimmed);
        let mut parts = body.split('_');
        let (Some(a), Some(b), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(format!("Invalid distance key '{s}' (expected e.g. 'source_g1')."));
        };
        let from = Component::from_key(a).ok_or_else(|| format!("Unknown component '{a}' in distance key '{s}'."))?;
        let to = Component::from_key(b).ok_or_else(|| format!("Unknown component '{b}' in distance key '{s}'."))?;
        if from == to {
            return Err(format!("Distance key '{s}' names the same component twice."));
        }
        Ok(PairKey::new(from, to))
    }
}

impl Serialize for PairKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PairKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Per-grating selection flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GratingConfig {
    pub present: bool,
    /// Mounted on a circular arc instead of a plane.
    pub bent: bool,
    /// Derive the radius from the distance to the source (bent gratings only).
    pub matching_radius: bool,
    #[serde(rename = "type")]
    pub kind: Option<GratingType>,
    /// Explicit bending radius (mm).
    pub radius: Option<f64>,
}

impl GratingConfig {
    /// A present, straight grating of the given type.
    pub fn flat(kind: GratingType) -> Self {
        Self {
            present: true,
            kind: Some(kind),
            ..Self::default()
        }
    }

    /// A present, bent grating whose radius is matched to the source distance.
    pub fn matched(kind: GratingType) -> Self {
        Self {
            present: true,
            bent: true,
            matching_radius: true,
            kind: Some(kind),
            radius: None,
        }
    }
}

/// Sample placement relative to the reference component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelativePosition {
    Before,
    #[default]
    After,
}

impl RelativePosition {
    pub fn as_str(self) -> &'static str {
        match self {
            RelativePosition::Before => "before",
            RelativePosition::After => "after",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleConfig {
    pub present: bool,
    pub relative_to: Component,
    pub relative_position: RelativePosition,
    /// Distance (mm) between the reference component and the sample. Same
    /// value as the reference/sample entry of `known_distances`; both given must agree.
    pub distance: Option<f64>,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            present: false,
            relative_to: Component::Source,
            relative_position: RelativePosition::After,
            distance: None,
        }
    }
}

/// How duty cycles of mixed-type gratings are derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MixedDutyCycle {
    /// `duty_cycle · p_ref / p`, where `p_ref` is the reference grating's pitch.
    #[default]
    PitchRatio,
    /// Same duty cycle as abs/phase gratings.
    Constant,
}

fn default_talbot_order() -> u32 {
    1
}

fn default_duty_cycle() -> f64 {
    0.5
}

/// One complete, immutable description of a setup to resolve.
///
/// Distances are in mm, pitches in µm, energy in keV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub beam_geometry: BeamGeometry,
    pub gi_geometry: GiGeometry,
    #[serde(default)]
    pub dual_phase: bool,
    #[serde(default)]
    pub curved_detector: bool,

    #[serde(default)]
    pub g0: GratingConfig,
    #[serde(default)]
    pub g1: GratingConfig,
    #[serde(default)]
    pub g2: GratingConfig,

    /// Grating whose pitch is the external reference.
    #[serde(default)]
    pub fixed_grating: Option<Grating>,
    /// Pitch (µm) of `fixed_grating`.
    #[serde(default)]
    pub fixed_pitch: Option<f64>,
    /// Pinned G1–G2 distance (mm).
    #[serde(default)]
    pub fixed_distance: Option<f64>,

    #[serde(default)]
    pub sample: SampleConfig,

    /// Design energy (keV).
    pub design_energy: f64,
    /// Fractional Talbot order `n` in `d = n·p²/(8λ)`.
    #[serde(default = "default_talbot_order")]
    pub talbot_order: u32,
    /// Duty cycle of abs/phase gratings and base value for mixed gratings.
    #[serde(default = "default_duty_cycle")]
    pub duty_cycle: f64,
    #[serde(default)]
    pub mixed_duty_cycle: MixedDutyCycle,

    /// Distances entered by the user; `None` marks an explicitly empty field.
    #[serde(default)]
    pub known_distances: BTreeMap<PairKey, Option<f64>>,
}

impl Configuration {
    /// A setup with only Source and Detector and no entered distances.
    pub fn new(beam_geometry: BeamGeometry, gi_geometry: GiGeometry, design_energy: f64) -> Self {
        Self {
            beam_geometry,
            gi_geometry,
            dual_phase: false,
            curved_detector: false,
            g0: GratingConfig::default(),
            g1: GratingConfig::default(),
            g2: GratingConfig::default(),
            fixed_grating: None,
            fixed_pitch: None,
            fixed_distance: None,
            sample: SampleConfig::default(),
            design_energy,
            talbot_order: default_talbot_order(),
            duty_cycle: default_duty_cycle(),
            mixed_duty_cycle: MixedDutyCycle::default(),
            known_distances: BTreeMap::new(),
        }
    }

    pub fn grating(&self, grating: Grating) -> &GratingConfig {
        match grating {
            Grating::G0 => &self.g0,
            Grating::G1 => &self.g1,
            Grating::G2 => &self.g2,
        }
    }

    pub fn grating_mut(&mut self, grating: Grating) -> &mut GratingConfig {
        match grating {
            Grating::G0 => &mut self.g0,
            Grating::G1 => &mut self.g1,
            Grating::G2 => &mut self.g2,
        }
    }

    /// Value entered for a distance, if any.
    pub fn known_distance(&self, pair: PairKey) -> Option<f64> {
        self.known_distances.get(&pair).copied().flatten()
    }

    pub fn with_grating(mut self, grating: Grating, config: GratingConfig) -> Self {
        *self.grating_mut(grating) = config;
        self
    }

    pub fn with_distance(mut self, from: Component, to: Component, value: f64) -> Self {
        self.known_distances.insert(PairKey::new(from, to), Some(value));
        self
    }

    pub fn with_fixed_pitch(mut self, grating: Grating, pitch_um: f64) -> Self {
        self.fixed_grating = Some(grating);
        self.fixed_pitch = Some(pitch_um);
        self
    }

    pub fn with_fixed_distance(mut self, distance: f64) -> Self {
        self.fixed_distance = Some(distance);
        self
    }

    pub fn with_sample(mut self, relative_to: Component, position: RelativePosition, distance: f64) -> Self {
        self.sample = SampleConfig {
            present: true,
            relative_to,
            relative_position: position,
            distance: Some(distance),
        };
        self
    }

    pub fn with_dual_phase(mut self, dual_phase: bool) -> Self {
        self.dual_phase = dual_phase;
        self
    }
}

//! Topology resolver: which distances are inputs and which are implied.

use serde::Serialize;

use crate::domain::{BeamGeometry, Component, ComponentChain, GiGeometry, PairKey};

/// Role of one distance slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum SlotKind {
    /// Must be supplied.
    Required,
    /// May be supplied; defaults to 0 mm.
    Optional,
    /// Computed; a supplied value is only checked against the result.
    Derived,
    /// Not meaningful for this topology; supplied values are ignored.
    Forbidden,
    /// Fixed to `factor` times another distance.
    FixedEqual { of: PairKey, factor: f64 },
}

impl SlotKind {
    /// Whether a supplied value drives the solution.
    pub fn accepts_input(self) -> bool {
        matches!(self, SlotKind::Required | SlotKind::Optional)
    }

    pub fn label(self) -> &'static str {
        match self {
            SlotKind::Required => "required",
            SlotKind::Optional => "optional",
            SlotKind::Derived => "derived",
            SlotKind::Forbidden => "forbidden",
            SlotKind::FixedEqual { .. } => "fixed",
        }
    }
}

/// One classified distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Slot {
    pub pair: PairKey,
    pub kind: SlotKind,
    /// Adjacent in the optical chain (a stored segment) or a total.
    pub adjacent: bool,
}

/// Classification of every distance slot of a chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    slots: Vec<Slot>,
    /// Two Required slots of which supplying either one is enough.
    exclusive: Option<(PairKey, PairKey)>,
    /// Kind of the reference-to-sample distance, when a sample is placed.
    sample: Option<SlotKind>,
}

impl Classification {
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn kind(&self, pair: PairKey) -> Option<SlotKind> {
        self.slots.iter().find(|s| s.pair == pair).map(|s| s.kind)
    }

    pub fn exclusive_pair(&self) -> Option<(PairKey, PairKey)> {
        self.exclusive
    }

    pub fn sample(&self) -> Option<SlotKind> {
        self.sample
    }

    /// Slots whose supplied value drives the solution.
    pub fn inputs(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter().filter(|s| s.kind.accepts_input())
    }
}

/// Classify every adjacent distance of the optical chain (sample removed),
/// plus the upstream-to-G2 total in cone interferometers.
pub fn classify(
    chain: &ComponentChain,
    beam: BeamGeometry,
    gi: GiGeometry,
    dual_phase: bool,
) -> Classification {
    let optical = chain.optical();
    let upstream = optical.upstream();
    let to_g1 = PairKey::new(upstream, Component::G1);
    let to_g2 = PairKey::new(upstream, Component::G2);
    let g1_g2 = PairKey::new(Component::G1, Component::G2);

    let mut slots: Vec<Slot> = optical
        .components()
        .windows(2)
        .map(|w| {
            let pair = PairKey::new(w[0], w[1]);
            let kind = match (beam, gi) {
                (_, GiGeometry::Free) => SlotKind::Required,
                (BeamGeometry::Parallel, _) if pair == g1_g2 => SlotKind::Derived,
                (BeamGeometry::Parallel, _) => SlotKind::Forbidden,
                (BeamGeometry::Cone, _) if pair == to_g1 => match gi {
                    GiGeometry::Sym => SlotKind::FixedEqual {
                        of: g1_g2,
                        factor: 0.5,
                    },
                    _ => SlotKind::Required,
                },
                (BeamGeometry::Cone, _) if pair == g1_g2 => {
                    if dual_phase {
                        SlotKind::Required
                    } else {
                        SlotKind::Derived
                    }
                }
                (BeamGeometry::Cone, _) if pair.from == Component::Source || pair.to == Component::Detector => {
                    SlotKind::Optional
                }
                (BeamGeometry::Cone, _) => SlotKind::Required,
            };
            Slot {
                pair,
                kind,
                adjacent: true,
            }
        })
        .collect();

    let mut exclusive = None;
    if beam == BeamGeometry::Cone && !gi.is_free() {
        let kind = if gi == GiGeometry::Sym {
            SlotKind::Derived
        } else {
            exclusive = Some((to_g1, to_g2));
            SlotKind::Required
        };
        slots.push(Slot {
            pair: to_g2,
            kind,
            adjacent: false,
        });
    }

    let sample = chain.contains(Component::Sample).then_some(SlotKind::Required);

    Classification {
        slots,
        exclusive,
        sample,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(components: &[Component]) -> ComponentChain {
        ComponentChain::from_components(components.to_vec())
    }

    fn full() -> ComponentChain {
        chain(&[Component::Source, Component::G0, Component::G1, Component::G2, Component::Detector])
    }

    fn pair(a: Component, b: Component) -> PairKey {
        PairKey::new(a, b)
    }

    #[test]
    fn parallel_fixed_topology_only_defines_g1_g2() {
        let c = chain(&[Component::Source, Component::G1, Component::G2, Component::Detector]);
        let cls = classify(&c, BeamGeometry::Parallel, GiGeometry::Sym, false);
        assert_eq!(cls.kind(pair(Component::G1, Component::G2)), Some(SlotKind::Derived));
        assert_eq!(cls.kind(pair(Component::Source, Component::G1)), Some(SlotKind::Forbidden));
        assert_eq!(cls.kind(pair(Component::G2, Component::Detector)), Some(SlotKind::Forbidden));
        assert_eq!(cls.exclusive_pair(), None);
        assert_eq!(cls.inputs().count(), 0);
    }

    #[test]
    fn cone_conv_uses_g0_as_upstream() {
        let cls = classify(&full(), BeamGeometry::Cone, GiGeometry::Conv, false);
        assert_eq!(cls.kind(pair(Component::Source, Component::G0)), Some(SlotKind::Optional));
        assert_eq!(cls.kind(pair(Component::G0, Component::G1)), Some(SlotKind::Required));
        assert_eq!(cls.kind(pair(Component::G0, Component::G2)), Some(SlotKind::Required));
        assert_eq!(cls.kind(pair(Component::G1, Component::G2)), Some(SlotKind::Derived));
        assert_eq!(cls.kind(pair(Component::G2, Component::Detector)), Some(SlotKind::Optional));
        assert_eq!(
            cls.exclusive_pair(),
            Some((pair(Component::G0, Component::G1), pair(Component::G0, Component::G2)))
        );
    }

    #[test]
    fn dual_phase_makes_g1_g2_required() {
        let c = chain(&[Component::Source, Component::G1, Component::G2, Component::Detector]);
        let cls = classify(&c, BeamGeometry::Cone, GiGeometry::Inv, true);
        assert_eq!(cls.kind(pair(Component::G1, Component::G2)), Some(SlotKind::Required));
    }

    #[test]
    fn sym_fixes_upstream_distance_to_half_of_g1_g2() {
        let c = chain(&[Component::Source, Component::G1, Component::G2, Component::Detector]);
        let cls = classify(&c, BeamGeometry::Cone, GiGeometry::Sym, false);
        assert_eq!(
            cls.kind(pair(Component::Source, Component::G1)),
            Some(SlotKind::FixedEqual {
                of: pair(Component::G1, Component::G2),
                factor: 0.5
            })
        );
        assert_eq!(cls.kind(pair(Component::Source, Component::G2)), Some(SlotKind::Derived));
        assert_eq!(cls.exclusive_pair(), None);
    }

    #[test]
    fn free_topology_requires_everything_including_sample() {
        let c = chain(&[Component::Source, Component::G1, Component::Sample, Component::Detector]);
        let cls = classify(&c, BeamGeometry::Cone, GiGeometry::Free, false);
        assert!(cls.slots().iter().all(|s| s.kind == SlotKind::Required && s.adjacent));
        assert_eq!(cls.slots().len(), 2);
        assert_eq!(cls.sample(), Some(SlotKind::Required));
    }
}

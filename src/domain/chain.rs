//! Ordered component sequence of a setup.

use serde::{Deserialize, Serialize};

use crate::domain::{Component, Grating};

/// Ordered list of components, Source first and Detector last.
///
/// Built by [`crate::geometry::build_chain`], which enforces the ordering
/// invariants; this type only offers read access and sample insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentChain {
    components: Vec<Component>,
}

impl ComponentChain {
    pub(crate) fn from_components(components: Vec<Component>) -> Self {
        Self { components }
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn contains(&self, component: Component) -> bool {
        self.components.contains(&component)
    }

    pub fn index_of(&self, component: Component) -> Option<usize> {
        self.components.iter().position(|&c| c == component)
    }

    pub fn has_grating(&self, grating: Grating) -> bool {
        self.contains(grating.component())
    }

    /// Gratings in chain order.
    pub fn gratings(&self) -> Vec<Grating> {
        self.components.iter().filter_map(|c| c.grating()).collect()
    }

    /// The chain with the sample removed (the optical chain the topology rules apply to).
    pub fn optical(&self) -> ComponentChain {
        ComponentChain {
            components: self
                .components
                .iter()
                .copied()
                .filter(|&c| c != Component::Sample)
                .collect(),
        }
    }

    /// Component the cone beam diverges from at the interferometer: G0 if present, else Source.
    pub fn upstream(&self) -> Component {
        if self.contains(Component::G0) {
            Component::G0
        } else {
            Component::Source
        }
    }

    /// Display names in order (`["Source", "G1", "G2", "Detector"]`).
    pub fn display_names(&self) -> Vec<&'static str> {
        self.components.iter().map(|c| c.display_name()).collect()
    }
}

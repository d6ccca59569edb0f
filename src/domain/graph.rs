//! Resolved distances along the component chain.
//!
//! The graph stores one (optional) length per adjacent pair of the optical
//! chain, plus where the sample splits one of those segments. Non-adjacent
//! distances are never stored: they are sums of the segments in between, so
//! `distance(A,C) = distance(A,B) + distance(B,C)` holds by construction.
//!
//! The sample never changes the optical segments: the distance between two
//! optical components is the same sum with or without a sample in between.

use crate::domain::{Component, PairKey};

/// Adjacent segment lengths (mm) over an ordered list of optical components.
///
/// A `None` segment is a distance the topology does not define (e.g. the
/// Source–G1 distance in a parallel-beam interferometer).
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceGraph {
    order: Vec<Component>,
    segments: Vec<Option<f64>>,
    sample: Option<SampleSplit>,
}

/// The sample sits inside optical segment `segment`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SampleSplit {
    segment: usize,
    /// Distance from the segment's upstream end to the sample.
    upstream: Option<f64>,
    /// Distance from the sample to the segment's downstream end.
    downstream: Option<f64>,
}

impl DistanceGraph {
    /// `segments[i]` is the distance between `order[i]` and `order[i + 1]`.
    pub(crate) fn new(order: Vec<Component>, segments: Vec<Option<f64>>) -> Self {
        debug_assert_eq!(segments.len() + 1, order.len().max(1));
        Self {
            order,
            segments,
            sample: None,
        }
    }

    /// Place the sample inside optical segment `segment`.
    pub(crate) fn with_sample(&self, segment: usize, upstream: Option<f64>, downstream: Option<f64>) -> Self {
        debug_assert!(segment < self.segments.len());
        Self {
            sample: Some(SampleSplit {
                segment,
                upstream,
                downstream,
            }),
            ..self.clone()
        }
    }

    /// Components in chain order, sample included.
    pub fn components(&self) -> Vec<Component> {
        let mut out = self.order.clone();
        if let Some(split) = self.sample {
            out.insert(split.segment + 1, Component::Sample);
        }
        out
    }

    fn index_of(&self, component: Component) -> Option<usize> {
        self.order.iter().position(|&c| c == component)
    }

    /// Length of an adjacent segment.
    pub fn segment(&self, from: Component, to: Component) -> Option<f64> {
        if let Some(split) = self.sample {
            let (up, down) = (self.order[split.segment], self.order[split.segment + 1]);
            if (from, to) == (up, Component::Sample) {
                return split.upstream;
            }
            if (from, to) == (Component::Sample, down) {
                return split.downstream;
            }
            if (from, to) == (up, down) {
                return None;
            }
        }
        let i = self.index_of(from)?;
        if self.order.get(i + 1) != Some(&to) {
            return None;
        }
        self.segments[i]
    }

    /// Resolved adjacent segments in chain order.
    pub fn segments(&self) -> Vec<(PairKey, f64)> {
        self.components()
            .windows(2)
            .filter_map(|w| self.segment(w[0], w[1]).map(|len| (PairKey::new(w[0], w[1]), len)))
            .collect()
    }

    /// Distance between two components (in either order), summed over the
    /// segments between them. `None` if any of those segments is undefined.
    pub fn between(&self, a: Component, b: Component) -> Option<f64> {
        if a == b {
            return None;
        }
        match (a, b) {
            (Component::Sample, other) | (other, Component::Sample) => self.from_sample(other),
            _ => self.optical_between(self.index_of(a)?, self.index_of(b)?),
        }
    }

    fn optical_between(&self, ia: usize, ib: usize) -> Option<f64> {
        let (lo, hi) = if ia < ib { (ia, ib) } else { (ib, ia) };
        let mut total = 0.0;
        for seg in &self.segments[lo..hi] {
            total += (*seg)?;
        }
        Some(total)
    }

    fn from_sample(&self, other: Component) -> Option<f64> {
        let split = self.sample?;
        let j = self.index_of(other)?;
        let i = split.segment;
        if j <= i {
            let up = split.upstream?;
            if j == i {
                Some(up)
            } else {
                Some(self.optical_between(j, i)? + up)
            }
        } else {
            let down = split.downstream?;
            if j == i + 1 {
                Some(down)
            } else {
                Some(down + self.optical_between(i + 1, j)?)
            }
        }
    }

    /// Every resolvable pair (adjacent and derived), upstream component first.
    pub fn resolved_pairs(&self) -> Vec<(PairKey, f64)> {
        let components = self.components();
        let mut out = Vec::new();
        for (i, &from) in components.iter().enumerate() {
            for &to in &components[i + 1..] {
                if let Some(len) = self.between(from, to) {
                    out.push((PairKey::new(from, to), len));
                }
            }
        }
        out
    }

    /// Position of each component relative to the first component of its
    /// resolved run. Components cut off by undefined segments start a new run.
    pub fn coordinates(&self) -> Vec<(Component, f64)> {
        let components = self.components();
        let mut out = Vec::with_capacity(components.len());
        let mut x = 0.0;
        for (i, &c) in components.iter().enumerate() {
            if i > 0 {
                match self.segment(components[i - 1], c) {
                    Some(seg) => x += seg,
                    None => x = 0.0,
                }
            }
            out.push((c, x));
        }
        out
    }
}

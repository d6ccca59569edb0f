//! Formatted terminal output.
//!
//! Formatting lives here so the engine stays free of presentation concerns and
//! output changes stay localized.

use crate::domain::{Component, GeometryResult, Grating, PairKey};
use crate::geometry::{Classification, SlotKind};
use crate::sweep::SweepRow;

/// Format the full geometry report (header, gratings, distances).
pub fn format_geometry(result: &GeometryResult) -> String {
    let flags = result.flags();
    let mut out = String::new();

    out.push_str("=== gigeo - GI geometry ===\n");
    out.push_str(&format!(
        "Beam: {} | GI: {} | dual-phase: {} | curved detector: {}\n",
        flags.beam_geometry.as_str(),
        flags.gi_geometry.as_str(),
        yes_no(flags.dual_phase),
        yes_no(flags.curved_detector),
    ));
    out.push_str(&format!(
        "Design energy: {:.3} keV | Talbot order: {}\n",
        flags.design_energy, flags.talbot_order
    ));
    out.push_str(&format!("Chain: {}\n", result.chain().display_names().join(" -> ")));

    out.push_str("\nGratings:\n");
    out.push_str(&format!("{:<9} {:>12} {:>8} {:>12}\n", "grating", "pitch[um]", "duty", "radius[mm]"));
    out.push_str(&format!("{:-<9} {:-<12} {:-<8} {:-<12}\n", "", "", "", ""));
    for (grating, spec) in result.gratings() {
        out.push_str(&format!(
            "{:<9} {:>12.3} {:>8.3} {:>12}\n",
            grating.display_name(),
            spec.pitch,
            spec.duty_cycle,
            fmt_opt(spec.radius),
        ));
    }
    if let Some(fringe) = result.fringe() {
        out.push_str(&format!(
            "{:<9} {:>12.3} {:>8.3} {:>12}\n",
            "fringe",
            fringe.pitch,
            fringe.duty_cycle,
            fmt_opt(result.radius_detector()),
        ));
    } else if let Some(radius) = result.radius_detector() {
        out.push_str(&format!("{:<9} {:>12} {:>8} {:>12.3}\n", "detector", "-", "-", radius));
    }

    out.push_str("\nDistances [mm]:\n");
    for (pair, tag) in distance_rows(result) {
        let Some(value) = result.distance(pair.from, pair.to) else {
            continue;
        };
        let label = match tag {
            Some(tag) => format!("{} ({tag})", pair.label()),
            None => pair.label(),
        };
        out.push_str(&format!("{label:<24} {value:>12.3}\n"));
    }
    if let Some(sample) = result.sample() {
        out.push_str(&format!("Sample position: {}\n", sample.position_code));
    }

    out
}

/// Report order: the interferometer distances first, then totals, then the rest.
fn distance_rows(result: &GeometryResult) -> Vec<(PairKey, Option<&'static str>)> {
    let chain = result.chain();
    let mut rows: Vec<(PairKey, Option<&'static str>)> = Vec::new();
    let mut push = |pair: PairKey, tag: Option<&'static str>| {
        if !rows.iter().any(|(p, _)| *p == pair) {
            rows.push((pair, tag));
        }
    };

    if !result.flags().gi_geometry.is_free() {
        let upstream = chain.upstream();
        push(PairKey::new(upstream, Component::G1), Some("l"));
        push(PairKey::new(Component::G1, Component::G2), Some("d"));
        push(PairKey::new(upstream, Component::G2), Some("s"));
    }
    push(PairKey::new(Component::Source, Component::Detector), None);
    if chain.contains(Component::Sample) {
        push(PairKey::new(Component::Source, Component::Sample), None);
    }

    let anchors: Vec<Component> = chain
        .components()
        .iter()
        .copied()
        .filter(|&c| c == Component::Source || c.grating().is_some())
        .collect();
    for (i, &from) in anchors.iter().enumerate() {
        for &to in &anchors[i + 1..] {
            push(PairKey::new(from, to), None);
        }
    }

    if let Some(sample) = result.sample() {
        let reference = sample.reference;
        let sample_first = chain.index_of(Component::Sample) < chain.index_of(reference);
        let pair = if sample_first {
            PairKey::new(Component::Sample, reference)
        } else {
            PairKey::new(reference, Component::Sample)
        };
        push(pair, None);
    }
    rows
}

/// Format the distance-slot classification (which distances are inputs).
pub fn format_slots(classification: &Classification) -> String {
    let exclusive = classification.exclusive_pair();
    let mut out = String::new();
    out.push_str("Distance slots:\n");
    for slot in classification.slots() {
        let detail = match slot.kind {
            SlotKind::FixedEqual { of, factor } => format!("fixed ({factor} x {})", of.label()),
            SlotKind::Required => match exclusive {
                Some((a, b)) if slot.pair == a => format!("required (or {})", b.label()),
                Some((a, b)) if slot.pair == b => format!("required (or {})", a.label()),
                _ => "required".to_string(),
            },
            SlotKind::Optional => "optional (default 0)".to_string(),
            other => other.label().to_string(),
        };
        out.push_str(&format!("{:<24} {detail}\n", slot.pair.label()));
    }
    if let Some(kind) = classification.sample() {
        out.push_str(&format!("{:<24} {}\n", "Sample distance", kind.label()));
    }
    out
}

/// Format an energy sweep as one row per energy.
pub fn format_sweep(rows: &[SweepRow]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:>10} {:>10} {:>10} {:>10} {:>12} {:>14}\n",
        "E[keV]", "p0[um]", "p1[um]", "p2[um]", "G1-G2[mm]", "Src-Det[mm]"
    ));
    out.push_str(&format!(
        "{:->10} {:->10} {:->10} {:->10} {:->12} {:->14}\n",
        "", "", "", "", "", ""
    ));
    for row in rows {
        match &row.outcome {
            Ok(result) => {
                let pitch = |g: Grating| fmt_opt(result.grating(g).map(|s| s.pitch));
                out.push_str(&format!(
                    "{:>10.3} {:>10} {:>10} {:>10} {:>12} {:>14}\n",
                    row.energy,
                    pitch(Grating::G0),
                    pitch(Grating::G1),
                    pitch(Grating::G2),
                    fmt_opt(result.distance(Component::G1, Component::G2)),
                    fmt_opt(result.distance(Component::Source, Component::Detector)),
                ));
            }
            Err(err) => out.push_str(&format!("{:>10.3} {err}\n", row.energy)),
        }
    }
    out
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.3}")).unwrap_or_else(|| "-".to_string())
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

//! Compare two flat result mappings.
//!
//! Used to show what changed between a stored result file and a fresh
//! resolution. Numbers are compared with an absolute tolerance so that
//! round-tripping through JSON text never reports a change.

use serde_json::Value;

use crate::domain::ResultMap;

/// Absolute tolerance for numeric values.
pub const DIFF_TOLERANCE: f64 = 1e-9;

/// One differing key.
#[derive(Debug, Clone, PartialEq)]
pub enum DiffEntry {
    Added { key: String, value: Value },
    Removed { key: String, value: Value },
    Changed { key: String, before: Value, after: Value },
}

impl DiffEntry {
    pub fn key(&self) -> &str {
        match self {
            DiffEntry::Added { key, .. } | DiffEntry::Removed { key, .. } | DiffEntry::Changed { key, .. } => key,
        }
    }
}

/// Keys added, removed or changed from `previous` to `current`, in key order.
pub fn diff_results(previous: &ResultMap, current: &ResultMap) -> Vec<DiffEntry> {
    let mut out = Vec::new();
    for (key, before) in previous {
        match current.get(key) {
            None => out.push(DiffEntry::Removed {
                key: key.clone(),
                value: before.clone(),
            }),
            Some(after) if !same_value(before, after) => out.push(DiffEntry::Changed {
                key: key.clone(),
                before: before.clone(),
                after: after.clone(),
            }),
            Some(_) => {}
        }
    }
    for (key, value) in current {
        if !previous.contains_key(key) {
            out.push(DiffEntry::Added {
                key: key.clone(),
                value: value.clone(),
            });
        }
    }
    out.sort_by(|a, b| a.key().cmp(b.key()));
    out
}

fn same_value(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => (x - y).abs() <= DIFF_TOLERANCE,
        _ => a == b,
    }
}

/// Human-readable diff listing.
pub fn format_diff(entries: &[DiffEntry]) -> String {
    if entries.is_empty() {
        return "No changes.\n".to_string();
    }
    let mut out = String::new();
    for entry in entries {
        let line = match entry {
            DiffEntry::Added { key, value } => format!("+ {key:<28} {}", fmt_value(value)),
            DiffEntry::Removed { key, value } => format!("- {key:<28} {}", fmt_value(value)),
            DiffEntry::Changed { key, before, after } => {
                format!("~ {key:<28} {} -> {}", fmt_value(before), fmt_value(after))
            }
        };
        out.push_str(&line);
        out.push('\n');
    }
    out
}

fn fmt_value(value: &Value) -> String {
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(v) if n.is_f64() => format!("{v:.6}"),
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, Value)]) -> ResultMap {
        entries.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn identical_maps_have_no_diff() {
        let a = map(&[("pitch_g1", Value::from(5.0)), ("gi_geometry", Value::from("sym"))]);
        assert!(diff_results(&a, &a).is_empty());
        assert_eq!(format_diff(&[]), "No changes.\n");
    }

    #[test]
    fn tiny_float_noise_is_ignored() {
        let a = map(&[("distance_g1_g2", Value::from(1000.0))]);
        let b = map(&[("distance_g1_g2", Value::from(1000.0 + 1e-12))]);
        assert!(diff_results(&a, &b).is_empty());
    }

    #[test]
    fn added_removed_and_changed_are_listed_in_key_order() {
        let a = map(&[("pitch_g1", Value::from(5.0)), ("radius_g2", Value::Null)]);
        let b = map(&[("pitch_g1", Value::from(4.0)), ("distance_g1_g2", Value::from(10.0))]);
        let diff = diff_results(&a, &b);
        let keys: Vec<&str> = diff.iter().map(|d| d.key()).collect();
        assert_eq!(keys, vec!["distance_g1_g2", "pitch_g1", "radius_g2"]);
        assert!(matches!(diff[0], DiffEntry::Added { .. }));
        assert!(matches!(diff[1], DiffEntry::Changed { .. }));
        assert!(matches!(diff[2], DiffEntry::Removed { .. }));

        let text = format_diff(&diff);
        assert!(text.contains("~ pitch_g1"));
        assert!(text.contains("5.000000 -> 4.000000"));
    }
}

//! Load a [`Configuration`] from disk.
//!
//! The format follows the extension: `.json` is read with serde_json, anything
//! else as TOML. Field defaults live on the `Configuration` type itself.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::domain::Configuration;
use crate::error::AppError;

/// Read and deserialize a configuration file.
pub fn read_configuration(path: &Path) -> Result<Configuration, AppError> {
    let text = fs::read_to_string(path)
        .map_err(|e| AppError::new(2, format!("Failed to read configuration '{}': {e}", path.display())))?;
    let config = parse_configuration(&text, is_json(path))
        .map_err(|message| AppError::new(2, format!("Invalid configuration '{}': {message}", path.display())))?;
    info!(path = %path.display(), "configuration loaded");
    Ok(config)
}

/// Parse configuration text in either format.
pub fn parse_configuration(text: &str, json: bool) -> Result<Configuration, String> {
    if json {
        serde_json::from_str(text).map_err(|e| e.to_string())
    } else {
        toml::from_str(text).map_err(|e| e.to_string())
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BeamGeometry, Component, Grating, PairKey};
    use std::path::PathBuf;

    #[test]
    fn format_follows_extension() {
        assert!(is_json(Path::new("setup.JSON")));
        assert!(!is_json(Path::new("setup.toml")));
        assert!(!is_json(Path::new("setup")));
    }

    #[test]
    fn reads_toml_file_from_disk() {
        let path: PathBuf = std::env::temp_dir().join(format!("gigeo-config-{}.toml", std::process::id()));
        fs::write(
            &path,
            r#"
beam_geometry = "cone"
gi_geometry = "conv"
design_energy = 30.0
fixed_grating = "g2"
fixed_pitch = 10.0

[g1]
present = true
type = "phase"

[g2]
present = true
type = "abs"

[known_distances]
source_g1 = 900.0
"#,
        )
        .unwrap();
        let config = read_configuration(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(config.beam_geometry, BeamGeometry::Cone);
        assert_eq!(config.fixed_grating, Some(Grating::G2));
        assert_eq!(
            config.known_distance(PairKey::new(Component::Source, Component::G1)),
            Some(900.0)
        );
    }

    #[test]
    fn missing_file_is_an_input_error() {
        let err = read_configuration(Path::new("/nonexistent/gigeo.toml")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn invalid_json_is_reported() {
        let err = parse_configuration("{\"beam_geometry\": \"fan\"}", true).unwrap_err();
        assert!(err.contains("fan"), "{err}");
    }
}

use thiserror::Error;

use crate::domain::PairKey;

/// Tolerance (mm) used when comparing a supplied distance against the value
/// implied by the rest of the configuration.
pub const DISTANCE_TOLERANCE: f64 = 1e-6;

/// Failure of a single geometry resolution.
///
/// - `Configuration`: the component selection or placement is structurally
///   invalid; the caller has to change the setup, not the numbers.
/// - `Geometry`: the numbers do not describe a valid layout (missing required
///   distance, over-determined input, non-positive pitch or radius, ...).
///
/// Messages are meant to be shown to the user verbatim.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Geometry error: {0}")]
    Geometry(String),
}

impl ResolveError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn geometry(message: impl Into<String>) -> Self {
        Self::Geometry(message.into())
    }

    pub fn missing_distance(pair: PairKey) -> Self {
        Self::Geometry(format!("missing required distance: {}", pair.label()))
    }

    pub fn over_determined(pair: PairKey, supplied: f64, implied: f64) -> Self {
        Self::Geometry(format!(
            "over-determined: {} was given as {supplied} mm but the other inputs imply {implied} mm",
            pair.label()
        ))
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    pub fn is_geometry(&self) -> bool {
        matches!(self, Self::Geometry(_))
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<ResolveError> for AppError {
    fn from(err: ResolveError) -> Self {
        let code = if err.is_configuration() { 2 } else { 3 };
        AppError::new(code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Component;

    #[test]
    fn resolve_errors_map_to_exit_codes() {
        let config: AppError = ResolveError::configuration("bad").into();
        let geometry: AppError = ResolveError::geometry("bad").into();
        assert_eq!(config.exit_code(), 2);
        assert_eq!(geometry.exit_code(), 3);
        assert_eq!(geometry.to_string(), "Geometry error: bad");
    }

    #[test]
    fn missing_distance_names_the_pair() {
        let err = ResolveError::missing_distance(PairKey::new(Component::Source, Component::G1));
        assert!(err.is_geometry());
        assert!(err.to_string().contains("missing required distance"));
        assert!(err.to_string().contains("Source to G1"));
    }
}

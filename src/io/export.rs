//! Read/write result JSON files.
//!
//! A result file is the portable record of one resolution:
//! - the tool name and a UTC timestamp
//! - the configuration that was resolved
//! - the flat geometry mapping (`component_list`, `distance_*`, `pitch_*`, ...)
//!
//! Reading a file back yields the mapping as plain JSON values, which is what
//! `report::diff_results` compares.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Configuration, GeometryResult, ResultMap};
use crate::error::AppError;

pub const TOOL_NAME: &str = "gigeo";

/// On-disk schema of a result file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultFile {
    pub tool: String,
    pub generated: DateTime<Utc>,
    pub input: Configuration,
    pub geometry: ResultMap,
}

impl ResultFile {
    pub fn new(input: &Configuration, result: &GeometryResult, generated: DateTime<Utc>) -> Self {
        Self {
            tool: TOOL_NAME.to_string(),
            generated,
            input: input.clone(),
            geometry: result.to_map(),
        }
    }
}

/// Write a result JSON file stamped with the current time.
pub fn write_result_json(path: &Path, input: &Configuration, result: &GeometryResult) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create result JSON '{}': {e}", path.display())))?;
    let record = ResultFile::new(input, result, Utc::now());
    serde_json::to_writer_pretty(file, &record)
        .map_err(|e| AppError::new(4, format!("Failed to write result JSON: {e}")))?;
    Ok(())
}

/// Read a result JSON file.
pub fn read_result_json(path: &Path) -> Result<ResultFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open result JSON '{}': {e}", path.display())))?;
    let record: ResultFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid result JSON: {e}")))?;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BeamGeometry, Component, GiGeometry, Grating, GratingConfig, GratingType};
    use crate::geometry::resolve;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn result_file_round_trips_through_disk() {
        let config = Configuration::new(BeamGeometry::Parallel, GiGeometry::Inv, 20.0)
            .with_grating(Grating::G1, GratingConfig::flat(GratingType::Phase))
            .with_grating(Grating::G2, GratingConfig::flat(GratingType::Abs))
            .with_distance(Component::G1, Component::G2, 150.0);
        let result = resolve(&config).unwrap();

        let path = std::env::temp_dir().join(format!("gigeo-result-{}.json", std::process::id()));
        write_result_json(&path, &config, &result).unwrap();
        let back = read_result_json(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(back.tool, TOOL_NAME);
        assert_eq!(back.input, config);
        assert_eq!(back.geometry, result.to_map());
    }

    #[test]
    fn result_values_survive_json_text_exactly() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let config = Configuration::new(BeamGeometry::Parallel, GiGeometry::Inv, rng.gen_range(15.0..60.0))
                .with_grating(Grating::G1, GratingConfig::flat(GratingType::Phase))
                .with_grating(Grating::G2, GratingConfig::flat(GratingType::Abs))
                .with_distance(Component::G1, Component::G2, rng.gen_range(10.0..1000.0));
            let result = resolve(&config).unwrap();
            let record = ResultFile::new(&config, &result, Utc::now());

            let text = serde_json::to_string(&record).unwrap();
            let back: ResultFile = serde_json::from_str(&text).unwrap();
            assert_eq!(back.geometry, record.geometry);
            assert_eq!(back.input, config);
        }
    }
}

use mapper::ExportConfig;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapperCliError {
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDeError(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSerError(#[from] toml::ser::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    Mapper(#[from] mapper::MapperError),
    #[error("Unsupported file format. Please use .toml or .json files")]
    UnsupportedFileFormat,
}

/// Input and output locations of one export run
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct JobPaths {
    /// Height raster JSON
    pub terrain: PathBuf,
    /// Entity catalog JSON
    pub catalog: PathBuf,
    /// Destination GeoJSON file
    pub output: PathBuf,
}

/// Export job file: paths plus the export settings
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ExportJob {
    pub paths: JobPaths,
    #[serde(default)]
    pub export: ExportConfig,
}

impl ExportJob {
    /// Load ExportJob configuration from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, MapperCliError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load ExportJob configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self, MapperCliError> {
        let job: ExportJob = toml::from_str(content)?;
        job.export.validate()?;
        Ok(job)
    }

    /// Load ExportJob configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, MapperCliError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Load ExportJob configuration from JSON string
    pub fn from_json(content: &str) -> Result<Self, MapperCliError> {
        let job: ExportJob = serde_json::from_str(content)?;
        job.export.validate()?;
        Ok(job)
    }

    /// Auto-detect file format and load configuration
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, MapperCliError> {
        let path_ref = path.as_ref();
        match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(MapperCliError::UnsupportedFileFormat),
        }
    }

    /// Save ExportJob configuration to a TOML file
    pub fn to_toml_file<P: AsRef<Path>>(&self, path: P) -> Result<(), MapperCliError> {
        let content = self.to_toml()?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Convert ExportJob to TOML string
    pub fn to_toml(&self) -> Result<String, MapperCliError> {
        Ok(toml::to_string_pretty(&self)?)
    }

    /// Convert ExportJob to JSON string
    pub fn to_json(&self) -> Result<String, MapperCliError> {
        Ok(serde_json::to_string_pretty(&self)?)
    }

    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ExportJob)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_from_toml_with_defaults() {
        let job = ExportJob::from_toml(
            r#"
            [paths]
            terrain = "terrain.json"
            catalog = "catalog.json"
            output = "city.geojson"

            [export.contours]
            levels = [0.5]
            "#,
        )
        .expect("valid job");
        assert_eq!(job.paths.output, PathBuf::from("city.geojson"));
        assert_eq!(job.export.contours.levels, vec![0.5]);
        assert_eq!(job.export.contours.tolerance, 8.0);
    }

    #[test]
    fn test_job_round_trips() {
        let job = ExportJob {
            paths: JobPaths {
                terrain: "t.json".into(),
                catalog: "c.json".into(),
                output: "o.geojson".into(),
            },
            export: ExportConfig::default(),
        };
        let toml = job.to_toml().expect("toml");
        assert_eq!(ExportJob::from_toml(&toml).expect("parse"), job);
        let json = job.to_json().expect("json");
        assert_eq!(ExportJob::from_json(&json).expect("parse"), job);
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let err = ExportJob::from_json(
            r#"{
                "paths": { "terrain": "t", "catalog": "c", "output": "o" },
                "export": { "contours": { "tolerance": -2.0 } }
            }"#,
        );
        assert!(matches!(err, Err(MapperCliError::Mapper(_))));
        assert!(matches!(
            ExportJob::from_file("job.yaml"),
            Err(MapperCliError::UnsupportedFileFormat)
        ));
    }
}

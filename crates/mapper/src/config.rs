use std::{fs, path::Path};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    algorithms::SimplificationMethod,
    error::{MapperError, Result},
    graph::IdConfig,
    projection::ProjectionConfig,
    types::{Tags, tags},
};

/// Terrain contour settings
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct ContourConfig {
    pub enabled: bool,
    /// Distance between terrain samples, in world units
    pub grid_size: f64,
    /// Number of samples along each axis, excluding the sentinel border
    pub steps: usize,
    /// Iso-levels of the water depth field (water surface minus ground)
    pub levels: Vec<f64>,
    /// Value written to the outermost ring of samples; must be below every level
    pub border_value: f64,
    pub method: SimplificationMethod,
    #[schemars(range(min = 0.0))]
    pub tolerance: f64,
    /// Tags attached to every contour polyline
    pub tags: Tags,
}

impl Default for ContourConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            grid_size: 16.0,
            steps: 1080,
            levels: vec![1.6],
            border_value: 0.0,
            method: SimplificationMethod::DouglasPeucker,
            tolerance: 8.0,
            tags: tags([("natural", "water")]),
        }
    }
}

/// Complete settings of one export session
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    pub contours: ContourConfig,
    pub projection: ProjectionConfig,
    pub ids: IdConfig,
}

impl ExportConfig {
    /// Reject settings the exporters cannot honour.
    pub fn validate(&self) -> Result<()> {
        let c = &self.contours;
        if !(c.grid_size.is_finite() && c.grid_size > 0.0) {
            return Err(MapperError::Config(format!(
                "contours.grid_size must be positive, got {}",
                c.grid_size
            )));
        }
        if !(c.tolerance.is_finite() && c.tolerance >= 0.0) {
            return Err(MapperError::Config(format!(
                "contours.tolerance must be non-negative, got {}",
                c.tolerance
            )));
        }
        if let Some(level) = c
            .levels
            .iter()
            .find(|&&l| !l.is_finite() || l <= c.border_value)
        {
            return Err(MapperError::Config(format!(
                "contour level {level} must be finite and above border value {}",
                c.border_value
            )));
        }
        Ok(())
    }

    /// Load configuration from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: ExportConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Load configuration from JSON string
    pub fn from_json(content: &str) -> Result<Self> {
        let config: ExportConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Auto-detect file format and load configuration
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(MapperError::UnsupportedFileFormat),
        }
    }

    /// Convert configuration to TOML string
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Convert configuration to JSON string
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// JSON schema of the configuration file
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ExportConfig)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ExportConfig::default();
        config.validate().expect("defaults validate");
        assert_eq!(config.contours.levels, vec![1.6]);
        assert_eq!(config.contours.tolerance, 8.0);
        assert_eq!(config.ids.first_point_id, 128_000);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = ExportConfig::from_toml(
            r#"
            [contours]
            levels = [1.0, 2.5]
            method = "visvalingam_whyatt"

            [contours.tags]
            natural = "coastline"

            [projection]
            scale = 2.0
            "#,
        )
        .expect("valid toml");
        assert_eq!(config.contours.levels, vec![1.0, 2.5]);
        assert_eq!(config.contours.method, SimplificationMethod::VisvalingamWhyatt);
        assert_eq!(config.contours.tags.get("natural").map(String::as_str), Some("coastline"));
        assert_eq!(config.contours.grid_size, 16.0);
        assert_eq!(config.projection.scale, 2.0);
        assert_eq!(config.projection.world_extent, 17_280.0);
    }

    #[test]
    fn test_round_trips_through_toml_and_json() {
        let mut config = ExportConfig::default();
        config.contours.steps = 64;
        config.ids.first_polyline_id = 1;

        let toml = config.to_toml().expect("toml");
        assert_eq!(ExportConfig::from_toml(&toml).expect("parse toml"), config);

        let json = config.to_json().expect("json");
        assert_eq!(ExportConfig::from_json(&json).expect("parse json"), config);
    }

    #[test]
    fn test_rejects_level_below_border() {
        let err = ExportConfig::from_json(r#"{ "contours": { "levels": [-1.0] } }"#);
        assert!(matches!(err, Err(MapperError::Config(_))));

        let err = ExportConfig::from_json(r#"{ "contours": { "grid_size": 0.0 } }"#);
        assert!(matches!(err, Err(MapperError::Config(_))));
    }

    #[test]
    fn test_unknown_extension() {
        assert!(matches!(
            ExportConfig::from_file("export.yaml"),
            Err(MapperError::UnsupportedFileFormat)
        ));
    }

    #[test]
    fn test_schema_lists_sections() {
        let schema = serde_json::to_value(ExportConfig::schema()).expect("schema json");
        let props = &schema["properties"];
        assert!(props.get("contours").is_some());
        assert!(props.get("projection").is_some());
        assert!(props.get("ids").is_some());
    }
}

//! Geometry configuration files
//!
//! A [`GeometryConfig`] names the geometry variant, overrides any of its
//! parameters, and carries the construction and sampling options that do not
//! belong to the parameter table. Files are TOML or JSON, chosen by extension:
//!
//! ```toml
//! variant = "xarapuca"
//!
//! [parameters]
//! count_z = 4
//! wls_material = "ej286"
//!
//! [construct]
//! dichroic_data = "data/dichroic_transmission.txt"
//!
//! [sampling]
//! region = "window"
//! events = 500
//! seed = 7
//! ```

use crate::error::{Result, SettingsError};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use xarapuca_core::{ParamValue, ParameterSet};
use xarapuca_geometry::{ConstructOptions, Detector, VariantKind};

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    /// Pick the format from the file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(ConfigFormat::Json),
            Some("toml") => Ok(ConfigFormat::Toml),
            Some(other) => Err(SettingsError::UnsupportedFormat(other.to_string())),
            None => Err(SettingsError::UnsupportedFormat(
                "Config file must be .json or .toml".to_string(),
            )),
        }
    }
}

/// Vertex sampling settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingSettings {
    /// Region tag; `None` picks the variant's first region
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Number of vertices to draw
    pub events: u32,
    /// Random seed
    pub seed: u64,
}

impl Default for SamplingSettings {
    fn default() -> Self {
        Self {
            region: None,
            events: 1000,
            seed: 0,
        }
    }
}

/// Complete geometry configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryConfig {
    /// Variant by name or numeric configuration code
    #[serde(deserialize_with = "variant_from_name_or_code")]
    pub variant: VariantKind,
    /// Parameter overrides on top of the variant defaults
    #[serde(default)]
    pub parameters: BTreeMap<String, ParamValue>,
    #[serde(default)]
    pub construct: ConstructOptions,
    #[serde(default)]
    pub sampling: SamplingSettings,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum VariantRepr {
    Code(u32),
    Name(String),
}

fn variant_from_name_or_code<'de, D>(deserializer: D) -> std::result::Result<VariantKind, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    match VariantRepr::deserialize(deserializer)? {
        VariantRepr::Code(code) => VariantKind::try_from(code).map_err(D::Error::custom),
        VariantRepr::Name(name) => name.parse().map_err(D::Error::custom),
    }
}

impl GeometryConfig {
    /// Config for `variant` with no overrides
    pub fn new(variant: VariantKind) -> Self {
        Self {
            variant,
            parameters: BTreeMap::new(),
            construct: ConstructOptions::default(),
            sampling: SamplingSettings::default(),
        }
    }

    /// Add a parameter override
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Variant defaults with every override applied and checked
    pub fn parameter_set(&self) -> Result<ParameterSet> {
        let mut params = self.variant.default_parameters();
        params.apply_overrides(&self.parameters)?;
        Ok(params)
    }

    /// Build the configured detector; fails if the layout is infeasible
    pub fn detector(&self) -> Result<Detector> {
        Ok(Detector::new(self.variant, self.parameter_set()?)?)
    }

    /// Parse a configuration from text in the given format
    pub fn from_str_as(content: &str, format: ConfigFormat) -> Result<Self> {
        let config: Self = match format {
            ConfigFormat::Json => serde_json::from_str(content)?,
            ConfigFormat::Toml => toml::from_str(content)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Render the configuration in the given format
    pub fn to_string_as(&self, format: ConfigFormat) -> Result<String> {
        self.validate()?;
        Ok(match format {
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
            ConfigFormat::Toml => toml::to_string_pretty(self)?,
        })
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path).map_err(|e| {
            SettingsError::LoadError(format!("{}: {}", path.display(), e))
        })?;
        let config = Self::from_str_as(&content, format)?;
        tracing::info!(
            path = %path.display(),
            variant = %config.variant,
            overrides = config.parameters.len(),
            "geometry configuration loaded"
        );
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let format = ConfigFormat::from_path(path)?;
        let content = self.to_string_as(format)?;
        std::fs::write(path, content)
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", path.display(), e)))?;
        tracing::debug!(path = %path.display(), "geometry configuration saved");
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.parameter_set()?;

        if self.sampling.events == 0 {
            return Err(SettingsError::invalid("sampling.events", "must be > 0"));
        }
        if let Some(region) = &self.sampling.region {
            if region.trim().is_empty() {
                return Err(SettingsError::invalid("sampling.region", "must not be empty"));
            }
        }
        if let Some(path) = &self.construct.dichroic_data {
            if path.as_os_str().is_empty() {
                return Err(SettingsError::invalid(
                    "construct.dichroic_data",
                    "must not be empty",
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("cell.toml")).unwrap(),
            ConfigFormat::Toml
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("cell.json")).unwrap(),
            ConfigFormat::Json
        );
        assert!(ConfigFormat::from_path(Path::new("cell.yaml")).is_err());
        assert!(ConfigFormat::from_path(Path::new("cell")).is_err());
    }

    #[test]
    fn test_numeric_variant_code() {
        let config = GeometryConfig::from_str_as("variant = 3\n", ConfigFormat::Toml).unwrap();
        assert_eq!(config.variant, VariantKind::DimpledPlate);

        let err = GeometryConfig::from_str_as("variant = 9\n", ConfigFormat::Toml).unwrap_err();
        assert!(err.to_string().contains("configuration code 9"));
    }

    #[test]
    fn test_overrides_are_checked() {
        let text = r#"
variant = "test_jig"

[parameters]
sipm_count = 0
"#;
        let err = GeometryConfig::from_str_as(text, ConfigFormat::Toml).unwrap_err();
        assert!(err.to_string().contains("sipm_count"));

        let text = r#"{"variant": "test_jig", "parameters": {"rocket_count": 2}}"#;
        let err = GeometryConfig::from_str_as(text, ConfigFormat::Json).unwrap_err();
        assert!(err.to_string().contains("rocket_count"));
    }

    #[test]
    fn test_integer_lengths_are_accepted() {
        let text = r#"
variant = "xarapuca"

[parameters]
assembly_length = 620
count_z = 4
"#;
        let config = GeometryConfig::from_str_as(text, ConfigFormat::Toml).unwrap();
        let params = config.parameter_set().unwrap();
        assert_eq!(params.length("assembly_length").unwrap(), 620.0);
        assert_eq!(params.count("count_z").unwrap(), 4);
    }

    #[test]
    fn test_zero_events_rejected() {
        let mut config = GeometryConfig::new(VariantKind::TestJig);
        config.sampling.events = 0;
        assert!(config.validate().is_err());
    }
}

//! Configuration loading
//!
//! Sources are applied in the order they are added. A file source replaces
//! the whole configuration (fields absent from the file take their defaults);
//! environment sources only override the variables that are set.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::model::AnalysisConfig;
use crate::error::{DataError, DataResult};

/// Prefix of every environment variable read by the loader
pub const ENV_PREFIX: &str = "PLANFIT_";

/// Source of configuration data
#[derive(Debug, Clone)]
pub enum ConfigSource {
    /// Configuration from a JSON, TOML or YAML file
    File(PathBuf),
    /// Configuration from process environment variables
    Environment,
    /// Environment-style variables supplied directly
    Variables(HashMap<String, String>),
    /// Default configuration
    Default,
}

/// Configuration loader with support for multiple sources
#[derive(Debug, Default)]
pub struct ConfigLoader {
    sources: Vec<ConfigSource>,
}

impl ConfigLoader {
    /// Create a new config loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a configuration source
    pub fn add_source(mut self, source: ConfigSource) -> Self {
        self.sources.push(source);
        self
    }

    /// Add a file source
    pub fn with_file<P: AsRef<Path>>(self, path: P) -> Self {
        self.add_source(ConfigSource::File(path.as_ref().to_path_buf()))
    }

    /// Add environment variables source
    pub fn with_env(self) -> Self {
        self.add_source(ConfigSource::Environment)
    }

    /// Add explicit environment-style variables
    pub fn with_vars(self, vars: HashMap<String, String>) -> Self {
        self.add_source(ConfigSource::Variables(vars))
    }

    /// Add default configuration source
    pub fn with_defaults(self) -> Self {
        self.add_source(ConfigSource::Default)
    }

    /// Load configuration from all sources, then validate it
    pub fn load(self) -> DataResult<AnalysisConfig> {
        let mut config = AnalysisConfig::default();

        for source in &self.sources {
            match source {
                ConfigSource::File(path) => {
                    tracing::debug!("Loading config from file: {}", path.display());
                    config = load_from_file(path)?;
                }
                ConfigSource::Environment => {
                    tracing::debug!("Loading config from environment");
                    apply_vars(&mut config, |key| env::var(key).ok())?;
                }
                ConfigSource::Variables(vars) => {
                    apply_vars(&mut config, |key| vars.get(key).cloned())?;
                }
                ConfigSource::Default => {
                    tracing::debug!("Loading default config");
                    config = AnalysisConfig::default();
                }
            }
        }

        config.validate()?;
        Ok(config)
    }
}

/// Load configuration from a file; a missing file yields the defaults
pub fn load_from_file(path: &Path) -> DataResult<AnalysisConfig> {
    if !path.exists() {
        tracing::debug!("Config file {} not found, using defaults", path.display());
        return Ok(AnalysisConfig::default());
    }

    let content = fs::read_to_string(path).map_err(|e| {
        DataError::invalid_config(format!("Failed to read config file '{}': {}", path.display(), e))
    })?;

    let config = match path.extension().and_then(|s| s.to_str()) {
        Some("toml") => toml::from_str(&content).map_err(|e| {
            DataError::invalid_config(format!("Failed to parse TOML config '{}': {}", path.display(), e))
        })?,
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content).map_err(|e| {
            DataError::invalid_config(format!("Failed to parse YAML config '{}': {}", path.display(), e))
        })?,
        _ => serde_json::from_str(&content).map_err(|e| {
            DataError::invalid_config(format!("Failed to parse JSON config '{}': {}", path.display(), e))
        })?,
    };

    Ok(config)
}

fn apply_vars<F>(config: &mut AnalysisConfig, lookup: F) -> DataResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

    if let Some(path) = var("TAU2_PATH") {
        config.tau2_path = PathBuf::from(path);
    }

    if let Some(dir) = var("INPUT_DIR") {
        config.input_dir = Some(PathBuf::from(dir));
    }

    if let Some(dir) = var("OUTPUT_DIR") {
        config.output_dir = Some(PathBuf::from(dir));
    }

    if let Some(formats) = var("FORMATS") {
        config.formats = formats
            .split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(String::from)
            .collect();
    }

    if let Some(value) = var("CONFIDENCE_INTERVALS") {
        config.confidence_intervals = parse_flag("CONFIDENCE_INTERVALS", &value)?;
    }

    if let Some(value) = var("Z") {
        config.z = value
            .trim()
            .parse()
            .map_err(|_| DataError::invalid_config(format!("Invalid {}Z value '{}'", ENV_PREFIX, value)))?;
    }

    if let Some(value) = var("PER_DOMAIN") {
        config.per_domain = parse_flag("PER_DOMAIN", &value)?;
    }

    Ok(())
}

fn parse_flag(name: &str, value: &str) -> DataResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(DataError::invalid_config(format!(
            "Invalid {}{} value '{}'",
            ENV_PREFIX, name, value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_only() {
        let config = ConfigLoader::new().with_defaults().load().unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn test_missing_file_is_default() {
        let config = ConfigLoader::new()
            .with_file("/nonexistent/planfit.toml")
            .load()
            .unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn test_file_formats() {
        let dir = TempDir::new().unwrap();

        let toml_path = dir.path().join("planfit.toml");
        fs::write(&toml_path, "tau2_path = \"/data/tau2\"\nz = 2.58\n").unwrap();
        let config = load_from_file(&toml_path).unwrap();
        assert_eq!(config.tau2_path, PathBuf::from("/data/tau2"));
        assert_eq!(config.z, 2.58);

        let yaml_path = dir.path().join("planfit.yaml");
        fs::write(&yaml_path, "formats: [json, csv]\nper_domain: true\n").unwrap();
        let config = load_from_file(&yaml_path).unwrap();
        assert_eq!(config.formats, vec!["json", "csv"]);
        assert!(config.per_domain);

        let json_path = dir.path().join("planfit.json");
        fs::write(&json_path, r#"{"confidence_intervals": true}"#).unwrap();
        assert!(load_from_file(&json_path).unwrap().confidence_intervals);
    }

    #[test]
    fn test_invalid_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("planfit.json");
        fs::write(&path, "{not json").unwrap();
        let err = ConfigLoader::new().with_file(&path).load().unwrap_err();
        assert!(matches!(err, DataError::InvalidConfig(_)));
    }

    #[test]
    fn test_vars_override_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("planfit.toml");
        fs::write(&path, "z = 2.58\nformats = [\"json\"]\n").unwrap();

        let config = ConfigLoader::new()
            .with_defaults()
            .with_file(&path)
            .with_vars(vars(&[
                ("PLANFIT_FORMATS", "table, markdown"),
                ("PLANFIT_CONFIDENCE_INTERVALS", "true"),
                ("PLANFIT_INPUT_DIR", "/runs"),
            ]))
            .load()
            .unwrap();

        assert_eq!(config.z, 2.58);
        assert_eq!(config.formats, vec!["table", "markdown"]);
        assert!(config.confidence_intervals);
        assert_eq!(config.input_dir, Some(PathBuf::from("/runs")));
    }

    #[test]
    fn test_invalid_vars() {
        let err = ConfigLoader::new()
            .with_vars(vars(&[("PLANFIT_Z", "wide")]))
            .load()
            .unwrap_err();
        assert!(err.to_string().contains("PLANFIT_Z"));

        let err = ConfigLoader::new()
            .with_vars(vars(&[("PLANFIT_PER_DOMAIN", "maybe")]))
            .load()
            .unwrap_err();
        assert!(err.to_string().contains("PLANFIT_PER_DOMAIN"));

        assert!(
            ConfigLoader::new()
                .with_vars(vars(&[("PLANFIT_Z", "-1")]))
                .load()
                .is_err()
        );
    }
}

use crate::{Error, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How reports are written to stdout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain report, as the scenario binaries print it
    #[default]
    Text,
    /// Pretty-printed JSON array of reports
    Json,
}

/// Optional settings for the `relmap` CLI
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct RelmapConfig {
    /// tracing filter directive, e.g. `relmap=debug`
    pub log_filter: Option<String>,
    pub format: Option<OutputFormat>,
    pub show_schemas: Option<bool>,
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("relmap.toml")
}

pub fn load_config(path: Option<&Path>) -> Result<Option<RelmapConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: RelmapConfig = toml::from_str(&contents)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &RelmapConfig, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(Error::Config(format!(
            "config already exists at {} (use --force to overwrite)",
            path.display()
        )));
    }

    let contents = toml::to_string_pretty(config).map_err(|e| Error::Config(e.to_string()))?;
    std::fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config(Some(&dir.path().join("relmap.toml"))).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relmap.toml");
        let config = RelmapConfig {
            log_filter: Some("relmap=debug".to_string()),
            format: Some(OutputFormat::Json),
            show_schemas: Some(false),
        };

        write_config(&path, &config, false).unwrap();
        assert_eq!(load_config(Some(&path)).unwrap(), Some(config.clone()));

        assert!(write_config(&path, &config, false).is_err());
        write_config(&path, &RelmapConfig::default(), true).unwrap();
        assert_eq!(load_config(Some(&path)).unwrap(), Some(RelmapConfig::default()));
    }

    #[test]
    fn test_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relmap.toml");
        std::fs::write(&path, "show_schemas = \"sometimes\"").unwrap();
        assert!(matches!(load_config(Some(&path)), Err(Error::Config(_))));
    }

    #[test]
    fn test_unknown_format_is_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relmap.toml");

        std::fs::write(&path, "format = \"yaml\"").unwrap();
        assert!(matches!(load_config(Some(&path)), Err(Error::Config(_))));

        std::fs::write(&path, "format = \"json\"").unwrap();
        let config = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(config.format, Some(OutputFormat::Json));
    }
}

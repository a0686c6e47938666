//! Application configuration: TOML file, then `MINDMAP_*` environment, then CLI

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use mindmap_core::model::DEFAULT_ROOT_LABEL;
use mindmap_export::{ExportOptions, DEFAULT_SETTLE};
use serde::Deserialize;

/// File read when `--config` is not given, if it exists.
pub const DEFAULT_CONFIG_FILE: &str = "mindmap.toml";
const ENV_PREFIX: &str = "MINDMAP_";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// CSV catalog of selectable entries.
    pub catalog: PathBuf,
    /// Directory searched for the root logo.
    pub asset_dir: PathBuf,
    pub root_label: String,
    /// Title printed on exported documents.
    pub title: String,
    pub settle_ms: u64,
    pub host: String,
    pub port: u16,
    /// Fixed placement seed for reproducible layouts.
    pub seed: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            catalog: PathBuf::from("catalog.csv"),
            asset_dir: PathBuf::from("."),
            root_label: DEFAULT_ROOT_LABEL.to_string(),
            title: ExportOptions::default().title,
            settle_ms: DEFAULT_SETTLE.as_millis() as u64,
            host: "127.0.0.1".to_string(),
            port: 7890,
            seed: None,
        }
    }
}

impl AppConfig {
    /// Load from `path`, or from [`DEFAULT_CONFIG_FILE`] when present, then
    /// apply the process environment (including a `.env` file).
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        dotenvy::dotenv().ok();
        config.apply_env(std::env::vars())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Override fields from `MINDMAP_*` variables; others are ignored.
    pub fn apply_env(&mut self, vars: impl IntoIterator<Item = (String, String)>) -> anyhow::Result<()> {
        for (key, value) in vars {
            let Some(name) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let invalid = || format!("invalid value for {key}: {value:?}");
            match name {
                "CATALOG" => self.catalog = PathBuf::from(&value),
                "ASSET_DIR" => self.asset_dir = PathBuf::from(&value),
                "ROOT_LABEL" => self.root_label = value.clone(),
                "TITLE" => self.title = value.clone(),
                "SETTLE_MS" => self.settle_ms = value.parse().with_context(invalid)?,
                "HOST" => self.host = value.clone(),
                "PORT" => self.port = value.parse().with_context(invalid)?,
                "SEED" => self.seed = Some(value.parse().with_context(invalid)?),
                _ => tracing::debug!("Ignoring unknown setting {}", key),
            }
        }
        Ok(())
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions { title: self.title.clone(), settle: Duration::from_millis(self.settle_ms) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_toml_fills_missing_keys_with_defaults() {
        let config = AppConfig::from_toml("catalog = \"services.csv\"\nport = 9000\n").unwrap();
        assert_eq!(config.catalog, PathBuf::from("services.csv"));
        assert_eq!(config.port, 9000);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.settle_ms, 450);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_unknown_toml_key_is_rejected() {
        assert!(AppConfig::from_toml("colour = \"red\"").is_err());
    }

    #[test]
    fn test_environment_overrides_file() {
        let mut config = AppConfig::from_toml("port = 9000\ntitle = \"File\"").unwrap();
        config
            .apply_env(vars(&[
                ("MINDMAP_PORT", "9100"),
                ("MINDMAP_SEED", "42"),
                ("MINDMAP_UNKNOWN", "x"),
                ("PATH", "/bin"),
            ]))
            .unwrap();
        assert_eq!(config.port, 9100);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.title, "File");
    }

    #[test]
    fn test_bad_environment_value_names_the_variable() {
        let err = AppConfig::default()
            .apply_env(vars(&[("MINDMAP_SETTLE_MS", "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains("MINDMAP_SETTLE_MS"));
    }

    #[test]
    fn test_config_file_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mindmap.toml");
        std::fs::write(&path, "root_label = \"Cloud\"\nsettle_ms = 10\n").unwrap();
        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.root_label, "Cloud");
        assert_eq!(config.export_options().settle, Duration::from_millis(10));
    }
}

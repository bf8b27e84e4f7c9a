use crate::errors::{EditorError, EditorResult};
use serde::{Deserialize, Serialize};
use sitecraft_document::SCHEMA_VERSION;
use std::path::Path;

pub const DEFAULT_CONFIG_NAME: &str = "sitecraft.config.json";

/// Editor configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Namespace baked into every minted id
    #[serde(default = "default_namespace")]
    pub namespace: String,

    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub migration: MigrationConfig,
}

fn default_namespace() -> String {
    "site".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryConfig {
    /// Maximum undo levels (0 = unlimited)
    #[serde(default)]
    pub max_levels: usize,

    /// Share of the back stack evicted by a trim, in `0.0..=1.0`
    #[serde(default = "default_clear_percent")]
    pub clear_percent: f64,
}

fn default_clear_percent() -> f64 {
    0.5
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_levels: 0,
            clear_percent: default_clear_percent(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationConfig {
    /// Version `migrate` walks to; the latest schema when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_version: Option<String>,
}

impl MigrationConfig {
    pub fn target_version(&self) -> &str {
        self.target_version.as_deref().unwrap_or(SCHEMA_VERSION)
    }
}

impl EditorConfig {
    /// Load config from a directory, falling back to defaults when the file
    /// does not exist
    pub fn load(dir: impl AsRef<Path>) -> EditorResult<Self> {
        let config_path = dir.as_ref().join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_json(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_json(json: &str) -> EditorResult<Self> {
        let config: EditorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> EditorResult<()> {
        if self.namespace.trim().is_empty() {
            return Err(EditorError::Config("namespace must not be empty".to_string()));
        }
        if !(0.0..=1.0).contains(&self.history.clear_percent) {
            return Err(EditorError::Config(format!(
                "history.clearPercent must be between 0 and 1, got {}",
                self.history.clear_percent
            )));
        }
        Ok(())
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            history: HistoryConfig::default(),
            migration: MigrationConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "namespace": "docs",
            "history": { "maxLevels": 50, "clearPercent": 0.25 },
            "migration": { "targetVersion": "2" }
        }"#;

        let config = EditorConfig::from_json(json).unwrap();
        assert_eq!(config.namespace, "docs");
        assert_eq!(config.history.max_levels, 50);
        assert_eq!(config.history.clear_percent, 0.25);
        assert_eq!(config.migration.target_version(), "2");
    }

    #[test]
    fn test_default_config() {
        let config = EditorConfig::from_json("{}").unwrap();
        assert_eq!(config, EditorConfig::default());
        assert_eq!(config.namespace, "site");
        assert_eq!(config.history.max_levels, 0);
        assert_eq!(config.history.clear_percent, 0.5);
        assert_eq!(config.migration.target_version(), SCHEMA_VERSION);
    }

    #[test]
    fn test_rejects_out_of_range_percent() {
        let err = EditorConfig::from_json(r#"{ "history": { "clearPercent": 1.5 } }"#).unwrap_err();
        assert!(matches!(err, EditorError::Config(_)));
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(EditorConfig::load(dir.path()).unwrap(), EditorConfig::default());

        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_NAME),
            r#"{ "namespace": "shop" }"#,
        )
        .unwrap();
        assert_eq!(EditorConfig::load(dir.path()).unwrap().namespace, "shop");
    }
}

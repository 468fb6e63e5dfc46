//! Editor configuration
//!
//! Stored as pretty-printed JSON. Every field has a default, so a partial file
//! only overrides what it names and a missing file means "all defaults".

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use workflow_graph::constants::workflow;
use workflow_graph::{LayoutConfig, LayoutKind};

/// Settings for a new editor session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Name given to workflows created by the editor
    pub default_workflow_name: String,
    /// Whether new workflows start with auto-positioning on
    pub auto_positioning: bool,
    /// Spacing and fallback sizes for layout and placement
    pub layout: LayoutConfig,
    /// Layout strategy used when positions are recomputed
    pub layout_strategy: LayoutKind,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_workflow_name: workflow::DEFAULT_NAME.to_string(),
            auto_positioning: true,
            layout: LayoutConfig::default(),
            layout_strategy: LayoutKind::default(),
        }
    }
}

impl EditorConfig {
    /// Load configuration from a JSON file
    ///
    /// A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::warn!("No editor config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(ConfigError::Parse)
    }

    /// Save configuration to a JSON file, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        fs::write(path, contents)?;

        log::info!("Editor configuration saved to {:?}", path);
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(serde_json::Error),

    #[error("Serialize error: {0}")]
    Serialize(serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = EditorConfig::load(&dir.path().join("editor.json")).unwrap();
        assert_eq!(config, EditorConfig::default());
        assert_eq!(config.default_workflow_name, "Untitled Workflow");
        assert_eq!(config.layout.horizontal_gap, 160.0);
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("editor.json");

        let mut config = EditorConfig::default();
        config.layout_strategy = LayoutKind::Grid;
        config.layout.vertical_gap = 40.0;
        config.auto_positioning = false;
        config.save(&path).unwrap();

        let loaded = EditorConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("editor.json");
        fs::write(
            &path,
            r#"{"layoutStrategy": "grid", "layout": {"horizontalGap": 200}}"#,
        )
        .unwrap();

        let config = EditorConfig::load(&path).unwrap();
        assert_eq!(config.layout_strategy, LayoutKind::Grid);
        assert_eq!(config.layout.horizontal_gap, 200.0);
        assert_eq!(config.layout.vertical_gap, 80.0);
        assert!(config.auto_positioning);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("editor.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(EditorConfig::load(&path), Err(ConfigError::Parse(_))));
    }
}

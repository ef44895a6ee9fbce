//! Viewer configuration.
//!
//! Resolution order: an explicit `--config` file, else
//! `<config_dir>/ridership-map/config.json` when it exists, else the
//! built-in preset ([`ViewerConfig::default`]).

pub mod preset;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use dirs::config_dir;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classify::ClassifyError;
use crate::legend::Legends;
use crate::loader::DataSource;
use crate::models::{BaseMap, InfoDialog, LayerDescriptor, ViewSettings};
use crate::popup::FieldMappings;

const APP_NAME: &str = "ridership-map";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Layer `{0}` is declared more than once")]
    DuplicateLayer(String),

    #[error("Overlay order names unknown layer `{0}`")]
    UnknownOverlay(String),

    #[error("Base layer `{0}` is not declared")]
    UnknownBaseLayer(String),

    #[error("Invalid style for layer `{layer}`: {source}")]
    Style {
        layer: String,
        source: ClassifyError,
    },
}

/// Where layer documents live. A directory wins over a URL.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataLocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl DataLocation {
    /// Explicit settings first, then the environment.
    pub fn source(&self) -> DataSource {
        match (&self.dir, &self.url) {
            (Some(dir), _) => DataSource::dir(dir),
            (None, Some(url)) => DataSource::http(url.clone()),
            (None, None) => DataSource::from_env(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    pub title: String,
    pub view: ViewSettings,
    pub base_maps: Vec<BaseMap>,
    pub layers: Vec<LayerDescriptor>,
    /// Display order of the overlay panel. Layers not listed get no entry.
    pub overlay_order: Vec<String>,
    #[serde(default)]
    pub legends: Legends,
    #[serde(default)]
    pub field_mappings: FieldMappings,
    pub about: InfoDialog,
    #[serde(default)]
    pub data: DataLocation,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        preset::taipei()
    }
}

impl ViewerConfig {
    /// Load from an explicit path, the user config directory, or the preset.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => Some(path.to_path_buf()),
            None => default_config_path().filter(|p| p.exists()),
        };

        let config = match path {
            Some(path) => {
                tracing::info!("Loading config from {}", path.display());
                Self::from_file(&path)?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut names = HashSet::new();
        for layer in &self.layers {
            if !names.insert(layer.name.as_str()) {
                return Err(ConfigError::DuplicateLayer(layer.name.clone()));
            }
            if let Some(style) = &layer.style {
                style.validate().map_err(|source| ConfigError::Style {
                    layer: layer.name.clone(),
                    source,
                })?;
            }
        }

        if let Some(unknown) = self
            .overlay_order
            .iter()
            .find(|name| !names.contains(name.as_str()))
        {
            return Err(ConfigError::UnknownOverlay(unknown.clone()));
        }

        if !self.base_maps.iter().any(|b| b.name == self.view.base_layer) {
            return Err(ConfigError::UnknownBaseLayer(self.view.base_layer.clone()));
        }

        Ok(())
    }

    pub fn descriptor(&self, name: &str) -> Option<&LayerDescriptor> {
        self.layers.iter().find(|l| l.name == name)
    }

    pub fn base_map(&self, name: &str) -> Option<&BaseMap> {
        self.base_maps.iter().find(|b| b.name == name)
    }
}

fn default_config_path() -> Option<PathBuf> {
    let mut path = config_dir()?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{Bucket, BucketTable, StyleRule};

    #[test]
    fn preset_is_valid() {
        ViewerConfig::default().validate().unwrap();
    }

    #[test]
    fn round_trips_through_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = ViewerConfig::default();
        fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

        let loaded = ViewerConfig::load(Some(&path)).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = ViewerConfig::load(Some(Path::new("/nonexistent/config.json"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn rejects_duplicate_layers() {
        let mut config = ViewerConfig::default();
        let first = config.layers[0].clone();
        config.layers.push(first);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateLayer(_))
        ));
    }

    #[test]
    fn rejects_unknown_overlay_names() {
        let mut config = ViewerConfig::default();
        config.overlay_order.push("不存在".to_string());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnknownOverlay(name)) if name == "不存在"
        ));
    }

    #[test]
    fn rejects_invalid_bucket_tables() {
        let mut config = ViewerConfig::default();
        config.layers[0].style = Some(StyleRule::Threshold(BucketTable {
            field: "v".to_string(),
            buckets: vec![Bucket::new(1.0, 2.0, "a"), Bucket::new(3.0, 4.0, "b")],
            no_data: "transparent".to_string(),
            fill_opacity: 0.8,
            stroke: Default::default(),
        }));
        assert!(matches!(config.validate(), Err(ConfigError::Style { .. })));
    }

    #[test]
    fn directory_wins_over_url() {
        let location = DataLocation {
            url: Some("http://localhost:9000".to_string()),
            dir: Some(PathBuf::from("/srv/data")),
        };
        assert!(matches!(location.source(), DataSource::Dir(_)));

        let location = DataLocation {
            url: Some("http://localhost:9000".to_string()),
            dir: None,
        };
        assert!(matches!(location.source(), DataSource::Http(_)));
    }
}

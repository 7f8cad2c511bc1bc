//! Configuration system
//!
//! Batching parameters can be built in code or loaded from TOML/RON files.

pub use serde::{Deserialize, Serialize};

use crate::render::batch::{DEFAULT_CAPACITY_THRESHOLD, MAX_VERTICES_PER_BATCH};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_str_with_format(&contents, path)
    }

    /// Parse configuration text, choosing the format from `path`'s extension
    fn from_str_with_format(contents: &str, path: &str) -> Result<Self, ConfigError> {
        if path.ends_with(".toml") {
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Settings for one skeleton mesh and the batches it owns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    /// Vertex capacity of every batch; at most 10920
    pub max_vertices_per_batch: usize,

    /// Fraction of the capacity a batch may fill before it reports full
    pub capacity_threshold: f32,

    /// Depth step added after each appended attachment
    pub z_offset: f32,

    /// Layer depth, the coarse component of each batch's render-order key
    pub depth: f32,

    /// Multiply tint RGB by alpha
    pub premultiplied_alpha: bool,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            max_vertices_per_batch: MAX_VERTICES_PER_BATCH,
            capacity_threshold: DEFAULT_CAPACITY_THRESHOLD,
            z_offset: -0.1,
            depth: 0.0,
            premultiplied_alpha: false,
        }
    }
}

impl Config for MeshConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MeshConfig::default();
        assert_eq!(config.max_vertices_per_batch, 10920);
        assert_eq!(config.capacity_threshold, 0.5);
        assert_eq!(config.z_offset, -0.1);
        assert!(!config.premultiplied_alpha);
    }

    #[test]
    fn test_parse_toml_with_missing_fields() {
        let text = "max_vertices_per_batch = 2048\npremultiplied_alpha = true\n";
        let config = MeshConfig::from_str_with_format(text, "mesh.toml").unwrap();
        assert_eq!(config.max_vertices_per_batch, 2048);
        assert!(config.premultiplied_alpha);
        assert_eq!(config.z_offset, -0.1);
    }

    #[test]
    fn test_parse_ron() {
        let text = "(depth: 2.0, capacity_threshold: 0.75)";
        let config = MeshConfig::from_str_with_format(text, "mesh.ron").unwrap();
        assert_eq!(config.depth, 2.0);
        assert_eq!(config.capacity_threshold, 0.75);
        assert_eq!(config.max_vertices_per_batch, 10920);
    }

    #[test]
    fn test_unsupported_extension() {
        let result = MeshConfig::from_str_with_format("{}", "mesh.json");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_toml_round_trip_through_file() {
        let path = std::env::temp_dir().join(format!("skeleton_mesh_cfg_{}.toml", std::process::id()));
        let path = path.to_string_lossy().to_string();
        let config = MeshConfig { depth: 3.0, ..MeshConfig::default() };
        config.save_to_file(&path).unwrap();
        let loaded = MeshConfig::load_from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, config);
    }
}

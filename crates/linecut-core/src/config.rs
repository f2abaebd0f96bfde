//! Configuration for the conversion pipeline.

use serde::{Deserialize, Serialize};

use crate::pairs::IMAGE_EXTENSIONS;

/// Main configuration for the linecut pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinecutConfig {
    /// Candidate image extensions, tried in priority order when matching
    /// an ALTO document to its page image.
    pub image_extensions: Vec<String>,

    /// Sort directory entries before pairing, making processing order and
    /// output reproducible.
    pub sort_entries: bool,

    /// Continue with the next pair when one fails instead of aborting the
    /// whole run.
    pub continue_on_error: bool,
}

impl Default for LinecutConfig {
    fn default() -> Self {
        Self {
            image_extensions: IMAGE_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            sort_entries: true,
            continue_on_error: false,
        }
    }
}

impl LinecutConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_extension_priority() {
        let config = LinecutConfig::default();
        assert_eq!(config.image_extensions, vec!["tif", "jpeg", "jpg", "png"]);
        assert!(config.sort_entries);
        assert!(!config.continue_on_error);
    }

    #[test]
    fn test_config_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("linecut.json");

        let mut config = LinecutConfig::default();
        config.continue_on_error = true;
        config.save(&path).unwrap();

        let loaded = LinecutConfig::from_file(&path).unwrap();
        assert!(loaded.continue_on_error);
        assert_eq!(loaded.image_extensions, config.image_extensions);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: LinecutConfig =
            serde_json::from_str(r#"{"continue_on_error": true}"#).unwrap();
        assert!(config.continue_on_error);
        assert_eq!(config.image_extensions, vec!["tif", "jpeg", "jpg", "png"]);
    }
}

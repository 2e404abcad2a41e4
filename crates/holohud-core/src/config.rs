//! Configuration loading and validation

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::demo::Demo;
use crate::error::ConfigError;

pub const DEFAULT_WASM_BASE_URL: &str =
    "https://cdn.jsdelivr.net/npm/@mediapipe/tasks-vision@latest/wasm";
pub const DEFAULT_FACE_MODEL_URL: &str =
    "https://storage.googleapis.com/mediapipe-models/face_landmarker/face_landmarker/float16/1/face_landmarker.task";
pub const DEFAULT_HAND_MODEL_URL: &str =
    "https://storage.googleapis.com/mediapipe-models/hand_landmarker/hand_landmarker/float16/1/hand_landmarker.task";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub demo: DemoConfig,
    pub vision: VisionConfig,
    pub camera: CameraConfig,
    pub assets: AssetsConfig,
    pub hud: HudConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Demo to run when none is given on the command line or URL
    pub kind: Demo,
    /// Fixed seed for the city layout; a fresh layout is drawn each run when unset
    pub city_seed: Option<u64>,
}

/// Vision runtime and model locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Base URL of the MediaPipe WASM fileset
    pub wasm_base_url: String,
    pub face_model_url: String,
    pub hand_model_url: String,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            wasm_base_url: DEFAULT_WASM_BASE_URL.to_string(),
            face_model_url: DEFAULT_FACE_MODEL_URL.to_string(),
            hand_model_url: DEFAULT_HAND_MODEL_URL.to_string(),
        }
    }
}

impl VisionConfig {
    pub fn model_url(&self, demo: Demo) -> &str {
        if demo.tracks_face() {
            &self.face_model_url
        } else {
            &self.hand_model_url
        }
    }
}

/// Camera resolution request; unset fields fall back to the demo default
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// glTF asset paths, relative to the asset root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    pub helmet: String,
    pub computer: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            helmet: "helmet.glb".to_string(),
            computer: "computer.glb".to_string(),
        }
    }
}

impl AssetsConfig {
    pub fn path_for(&self, demo: Demo) -> Option<&str> {
        match demo {
            Demo::Helmet => Some(self.helmet.as_str()),
            Demo::Computer => Some(self.computer.as_str()),
            Demo::City => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HudConfig {
    /// Clock refresh period in milliseconds
    pub refresh_ms: u64,
}

impl Default for HudConfig {
    fn default() -> Self {
        Self { refresh_ms: 1000 }
    }
}

impl Config {
    /// Parse configuration from a TOML string
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file, falling back to defaults when it is missing
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config = Self::from_toml(&content)?;
            info!(path = %path.display(), "Loaded configuration");
            Ok(config)
        } else {
            info!(
                path = %path.display(),
                "Configuration file not found, using defaults"
            );
            Ok(Self::default())
        }
    }

    /// Write the default configuration to file
    pub fn save_default(path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(&Self::default())?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hud.refresh_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "hud.refresh_ms".to_string(),
                message: "Refresh period must be greater than 0".to_string(),
            });
        }

        for (field, value) in [
            ("vision.face_model_url", &self.vision.face_model_url),
            ("vision.hand_model_url", &self.vision.hand_model_url),
            ("vision.wasm_base_url", &self.vision.wasm_base_url),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    message: "URL must not be empty".to_string(),
                });
            }
        }

        if matches!(self.camera.width, Some(0)) || matches!(self.camera.height, Some(0)) {
            return Err(ConfigError::InvalidValue {
                field: "camera".to_string(),
                message: "Resolution must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml = r#"
[demo]
kind = "city"

[camera]
width = 640
"#;

        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.demo.kind, Demo::City);
        assert_eq!(config.demo.city_seed, None);
        assert_eq!(config.camera.width, Some(640));
        assert_eq!(config.camera.height, None);
        assert_eq!(config.vision.hand_model_url, DEFAULT_HAND_MODEL_URL);
        assert_eq!(config.hud.refresh_ms, 1000);
    }

    #[test]
    fn test_model_url_per_demo() {
        let vision = VisionConfig::default();
        assert_eq!(vision.model_url(Demo::Helmet), DEFAULT_FACE_MODEL_URL);
        assert_eq!(vision.model_url(Demo::City), DEFAULT_HAND_MODEL_URL);
    }

    #[test]
    fn test_invalid_values() {
        assert!(Config::from_toml("[hud]\nrefresh_ms = 0\n").is_err());
        assert!(Config::from_toml("[vision]\nhand_model_url = \"\"\n").is_err());
        assert!(Config::from_toml("[camera]\nheight = 0\n").is_err());
        assert!(Config::from_toml("[demo]\nkind = \"tower\"\n").is_err());
    }

    #[test]
    fn test_save_and_load_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("holohud.toml");

        Config::save_default(&path).unwrap();
        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded.assets.path_for(Demo::Helmet), Some("helmet.glb"));
    }
}

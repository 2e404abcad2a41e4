//! Error types for HoloHUD

use thiserror::Error;

/// Umbrella error for HoloHUD operations
#[derive(Error, Debug)]
pub enum HoloError {
    #[error("Startup error: {0}")]
    Startup(#[from] StartupError),

    #[error("Tracking error: {0}")]
    Tracking(#[from] TrackingError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of the start sequence (session, camera, loop)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StartupError {
    #[error("Failed to open vision session: {0}")]
    Session(String),

    #[error("Failed to acquire camera: {0}")]
    Camera(String),

    #[error("Start sequence already ran (stage: {0})")]
    AlreadyStarted(String),
}

/// Per-frame detection and result decoding errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrackingError {
    #[error("Detection failed: {0}")]
    Detect(String),

    #[error("Failed to parse landmark result: {0}")]
    Parse(String),

    #[error("Timestamp {current} ms is not after previous {previous} ms")]
    NonMonotonicTimestamp { previous: f64, current: f64 },

    #[error("Transformation matrix must have 16 values, got {0}")]
    InvalidMatrix(usize),
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration value: {field} - {message}")]
    InvalidValue { field: String, message: String },
}

/// Result type alias for HoloHUD operations
pub type Result<T> = std::result::Result<T, HoloError>;

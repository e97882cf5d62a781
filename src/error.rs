use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScreensaverError {
    #[error("Invalid maze dimensions {rows}x{cols}: both must be at least 2")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Auto refresh error: {0}")]
    Refresh(#[from] RefreshError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshError {
    #[error("auto refresh requires a target that can be asked to reload")]
    TargetUnavailable,

    #[error("auto refresh requires a non-zero interval")]
    ZeroInterval,
}

pub type Result<T> = std::result::Result<T, ScreensaverError>;

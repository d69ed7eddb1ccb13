//! High-level error types

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Core protocol error: {0}")]
    Core(#[from] wgled_core::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] wgled_transport::Error),

    #[error("Type error: {0}")]
    Types(#[from] wgled_types::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Beacon task is no longer running")]
    BeaconClosed,
}

impl Error {
    /// Check if error came from frame delivery (non-fatal for the workflow)
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

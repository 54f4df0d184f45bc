use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] tickscan_core::ValidationError),

    #[error(transparent)]
    Provider(#[from] tickscan_core::ProviderError),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Provider(_) => 3,
            Self::Configuration(_) => 4,
            Self::Serialization(_) | Self::Io(_) => 10,
        }
    }
}

use thiserror::Error;

/// Accepted resource shapes, reported whenever a resource cannot be classified.
pub const INVALID_RESOURCE_HINT: &str = "Invalid resource type. Resource must be valid image. \
Also it should any of the following: image url, local image path, tuple of up to 5 image urls \
or tuple of up to 5 local image paths.";

#[derive(Error, Debug)]
pub enum MegaOptimError {
    #[error("{message}")]
    InvalidResource { message: String },

    #[error("Batch is empty: at least one resource is required")]
    EmptyBatch,

    #[error("Batch of {count} resources exceeds the limit of {max}")]
    BatchTooLarge { count: usize, max: usize },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("API request failed: {0}")]
    TransportError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("URL error: {0}")]
    UrlError(#[from] url::ParseError),
}

impl MegaOptimError {
    pub fn invalid_resource() -> Self {
        Self::InvalidResource {
            message: INVALID_RESOURCE_HINT.to_string(),
        }
    }

    /// True for errors caused by the caller's input rather than the service or network.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidResource { .. }
                | Self::EmptyBatch
                | Self::BatchTooLarge { .. }
                | Self::ConfigError { .. }
                | Self::InvalidConfigValueError { .. }
                | Self::MissingConfigError { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, MegaOptimError>;

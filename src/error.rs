//! Error types for the Tensorboard Operator

/// Result type for the operator
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the operator
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Kubernetes API error
    #[error("Kubernetes API error: {0}")]
    KubeError(String),
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

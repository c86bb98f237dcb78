use thiserror::Error;

/// Unified error type for version-stamp operations
#[derive(Error, Debug)]
pub enum StampError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Environment error: {0}")]
    Environment(String),

    #[error("Build service error: {0}")]
    Build(String),

    #[error("Source control error: {0}")]
    SourceControl(String),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

/// Convenience type alias for Results in version-stamp
pub type Result<T> = std::result::Result<T, StampError>;

impl StampError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        StampError::Config(msg.into())
    }

    /// Create an environment error with context
    pub fn environment(msg: impl Into<String>) -> Self {
        StampError::Environment(msg.into())
    }

    /// Create a build service error with context
    pub fn build(msg: impl Into<String>) -> Self {
        StampError::Build(msg.into())
    }

    /// Create a source control error with context
    pub fn source_control(msg: impl Into<String>) -> Self {
        StampError::SourceControl(msg.into())
    }
}

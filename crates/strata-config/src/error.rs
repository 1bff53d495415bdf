//! Configuration error types.

/// Errors that can occur when loading, saving, or parsing configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the config file from disk.
    #[error("failed to read config: {0}")]
    ReadError(#[source] std::io::Error),

    /// Failed to write the config file to disk.
    #[error("failed to write config: {0}")]
    WriteError(#[source] std::io::Error),

    /// Failed to parse RON content.
    #[error("failed to parse config: {0}")]
    ParseError(#[source] ron::error::SpannedError),

    /// Failed to serialize config to RON.
    #[error("failed to serialize config: {0}")]
    SerializeError(#[source] ron::Error),

    /// A `MIN..MAX` count range could not be parsed.
    #[error("invalid count range `{0}` (expected `N` or `MIN..MAX`)")]
    InvalidRange(String),

    /// Unknown rule randomization mode name.
    #[error("invalid randomization mode `{0}` (expected none, partial or full)")]
    InvalidMode(String),
}

//! CLI-specific error types and exit code mapping

use logscout_core::error::LogscoutError;
use logscout_engine::EngineError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// The input matched none of the loaded formats.
    #[error("no matching format: {0}")]
    NoMatch(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from logscout-core.
    #[error("{0}")]
    Core(#[from] LogscoutError),

    /// Recommendation engine error.
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                                  |
    /// |------|------------------------------------------|
    /// | 0    | Success                                  |
    /// | 1    | Command / usage error, validation failed |
    /// | 2    | Configuration error                      |
    /// | 3    | No format matched the input              |
    /// | 4    | Engine error (format loading, ...)       |
    /// | 5    | IO error                                 |
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) | Self::Core(LogscoutError::Config(_)) => 2,
            Self::Engine(EngineError::Config { .. }) => 2,
            Self::NoMatch(_) => 3,
            Self::Engine(EngineError::InvalidOptions { .. }) => 1,
            Self::Io(_) | Self::Engine(EngineError::Io(_)) | Self::Core(LogscoutError::Io(_)) => 5,
            Self::Engine(_) | Self::Core(_) => 4,
            Self::JsonSerialize(_) | Self::Command(_) => 1,
        }
    }
}

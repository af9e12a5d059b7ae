//! Configuration errors.
//!
//! All errors produced by the config module (validation and env loading) use [`ConfigError`].

use thiserror::Error;

/// Errors produced when building or validating configuration.
///
/// - **Validation**: values are out of range (e.g. an empty input list).
///   Raised by `Config::validate`.
/// - **EnvVar**: a variable is set but could not be read (e.g. invalid Unicode).
/// - **Parse**: a variable is set but does not parse into the expected type
///   (e.g. `SCALARGRAD_SCALE=abc`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Configuration validation failed.
    #[error("config validation: {0}")]
    Validation(String),

    /// Failed to read an environment variable.
    #[error("env var {key}: {message}")]
    EnvVar {
        /// The full environment variable name that was read.
        key: String,
        /// Underlying cause (e.g. not Unicode).
        message: String,
    },

    /// Environment variable was set but could not be parsed into the expected type.
    #[error("env var {key}={value:?}: {message}")]
    Parse {
        /// The full environment variable name.
        key: String,
        /// The raw value that failed to parse.
        value: String,
        /// Human-readable parse reason (e.g. "invalid float literal").
        message: String,
    },
}

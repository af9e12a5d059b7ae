//! Configuration for the walkthrough: input payload, constants, and graph retention.
//!
//! Load from environment via [`from_env`] and validate with [`Config::validate`].
//! Default values and env key names are centralized in the `constants` submodule.

mod builder;
mod constants;
mod error;

use constants::{DEFAULT_ADDEND, DEFAULT_INPUT, DEFAULT_RETAIN_GRAPH, DEFAULT_SCALE};

pub use builder::{env_key, env_parsed, env_string, from_env, InputValues};
pub use error::ConfigError;

/// Parameters of `y = x + addend; z = y * y * scale`.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Payload of the tracked input `x`. More than one element makes backward fail.
    pub input: Vec<f64>,
    /// Constant added to `x`.
    pub addend: f64,
    /// Constant multiplying `y * y`.
    pub scale: f64,
    /// Keep the graph after backward.
    pub retain_graph: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: DEFAULT_INPUT.to_vec(),
            addend: DEFAULT_ADDEND,
            scale: DEFAULT_SCALE,
            retain_graph: DEFAULT_RETAIN_GRAPH,
        }
    }
}

impl Config {
    /// Validates configuration. Returns `Ok(())` if valid, or a [`ConfigError`].
    ///
    /// Ensures the input is non-empty and every number is finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input.is_empty() {
            return Err(ConfigError::Validation(
                "input must hold at least one number".to_string(),
            ));
        }
        if let Some(v) = self.input.iter().find(|v| !v.is_finite()) {
            return Err(ConfigError::Validation(format!(
                "input values must be finite, got {v}"
            )));
        }
        if !self.addend.is_finite() || !self.scale.is_finite() {
            return Err(ConfigError::Validation(format!(
                "addend ({}) and scale ({}) must be finite",
                self.addend, self.scale
            )));
        }
        Ok(())
    }
}

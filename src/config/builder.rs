//! Build [`Config`] from environment variables.
//!
//! Uses [`env_string`] and [`env_parsed`] to read env vars with a single place for key names
//! (the config `constants` submodule) and typed errors ([`ConfigError`]).

use std::num::ParseFloatError;
use std::str::FromStr;

use super::constants::{ENV_ADDEND, ENV_INPUT, ENV_PREFIX, ENV_RETAIN_GRAPH, ENV_SCALE};
use super::Config;
use super::ConfigError;

/// Returns the full environment variable key for a given suffix (e.g. `INPUT` → `SCALARGRAD_INPUT`).
#[must_use]
pub fn env_key(suffix: &str) -> String {
    format!("{ENV_PREFIX}{suffix}")
}

/// Reads an environment variable as a string.
///
/// Returns `Some(value)` if the variable is set and valid UTF-8, `None` if unset.
/// Returns `Err(ConfigError::EnvVar)` if the variable is set but invalid (e.g. not Unicode).
pub fn env_string(key: &str) -> Result<Option<String>, ConfigError> {
    match std::env::var(key) {
        Ok(s) => Ok(Some(s)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(ConfigError::EnvVar {
            key: key.to_string(),
            message: e.to_string(),
        }),
    }
}

/// Reads an environment variable and parses it into type `T`.
///
/// Returns `Ok(Some(value))` if set and parse succeeds, `Ok(None)` if unset, and
/// `Err(ConfigError::Parse)` if set but parsing fails.
pub fn env_parsed<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(s) = env_string(key)? else {
        return Ok(None);
    };
    match s.parse() {
        Ok(t) => Ok(Some(t)),
        Err(e) => Err(ConfigError::Parse {
            key: key.to_string(),
            value: s,
            message: e.to_string(),
        }),
    }
}

/// Comma-separated list of numbers, e.g. `1` or `1, 2.5, -3`.
#[derive(Clone, Debug, PartialEq)]
pub struct InputValues(pub Vec<f64>);

impl FromStr for InputValues {
    type Err = ParseFloatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Ok(InputValues(Vec::new()));
        }
        s.split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map(InputValues)
    }
}

/// Builds [`Config`] from environment variables, falling back to [`Config::default`] for unset values.
///
/// Returns [`ConfigError`] if any *set* variable fails to parse (e.g. `SCALARGRAD_ADDEND=abc`).
pub fn from_env() -> Result<Config, ConfigError> {
    let default = Config::default();

    let input = env_parsed::<InputValues>(&env_key(ENV_INPUT))?
        .map(|v| v.0)
        .unwrap_or(default.input);
    let addend = env_parsed::<f64>(&env_key(ENV_ADDEND))?.unwrap_or(default.addend);
    let scale = env_parsed::<f64>(&env_key(ENV_SCALE))?.unwrap_or(default.scale);
    let retain_graph =
        env_parsed::<bool>(&env_key(ENV_RETAIN_GRAPH))?.unwrap_or(default.retain_graph);

    Ok(Config {
        input,
        addend,
        scale,
        retain_graph,
    })
}

//! Central place for configuration constants.
//!
//! Default values and environment variable key names used by the config builder.

/// Environment variable prefix (e.g. `SCALARGRAD_INPUT`).
pub(crate) const ENV_PREFIX: &str = "SCALARGRAD_";

// --- Env key suffixes (full key = ENV_PREFIX + suffix) ---

pub(crate) const ENV_INPUT: &str = "INPUT";
pub(crate) const ENV_ADDEND: &str = "ADDEND";
pub(crate) const ENV_SCALE: &str = "SCALE";
pub(crate) const ENV_RETAIN_GRAPH: &str = "RETAIN_GRAPH";

// --- Default values ---

pub(crate) const DEFAULT_INPUT: &[f64] = &[1.0];
pub(crate) const DEFAULT_ADDEND: f64 = 2.0;
pub(crate) const DEFAULT_SCALE: f64 = 3.0;
pub(crate) const DEFAULT_RETAIN_GRAPH: bool = false;

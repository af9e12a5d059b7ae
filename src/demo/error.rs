//! Walkthrough errors.

use thiserror::Error;

use crate::autograd::AutogradError;

/// Errors that stop the walkthrough.
#[derive(Debug, Error)]
pub enum DemoError {
    /// The autograd engine rejected an operation (e.g. a multi-element root).
    #[error("autograd: {0}")]
    Autograd(#[from] AutogradError),

    /// Writing the printed values failed.
    #[error("write output: {0}")]
    Io(#[from] std::io::Error),
}

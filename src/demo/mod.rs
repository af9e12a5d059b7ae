//! The walkthrough: build `x`, derive `y = x + addend` and `z = y * y * scale`,
//! run backward from `z`, and print each step the way PyTorch prints it.

mod error;

use std::io::Write;

use log::{debug, info};

use crate::autograd::{BackwardOptions, DisplayGradFn, Tensor};
use crate::config::Config;

pub use error::DemoError;

/// Tensors produced by one walkthrough.
#[derive(Debug)]
pub struct Report {
    /// Tracked input leaf.
    pub x: Tensor,
    /// `x + addend`.
    pub y: Tensor,
    /// `y * y * scale`.
    pub z: Tensor,
    /// Gradient of `z` with respect to `x`.
    pub x_grad: Option<Tensor>,
}

/// Runs the walkthrough for `config`, writing one line per printed value to `out`.
///
/// # Errors
///
/// Returns [`DemoError::Autograd`] if backward is rejected (e.g. the input has
/// more than one element); lines printed before the failure stay written.
pub fn run<W: Write>(config: &Config, out: &mut W) -> Result<Report, DemoError> {
    info!(
        "walkthrough: x={:?} addend={} scale={} retain_graph={}",
        config.input, config.addend, config.scale, config.retain_graph
    );

    let x = Tensor::new(config.input.clone());
    x.set_requires_grad(true)?;
    writeln!(out, "{}", DisplayGradFn(x.grad_fn().as_ref()))?;
    writeln!(out, "{x}")?;

    let y = &x + config.addend;
    writeln!(out, "{y}")?;
    writeln!(out, "{}", DisplayGradFn(y.grad_fn().as_ref()))?;

    let z = &y * &y * config.scale;
    writeln!(out, "{}", DisplayGradFn(z.grad_fn().as_ref()))?;
    writeln!(out, "{z}")?;

    z.backward_with(BackwardOptions {
        retain_graph: config.retain_graph,
    })?;
    let x_grad = x.grad();
    debug!("x.grad = {x_grad:?}");
    match &x_grad {
        Some(g) => writeln!(out, "{g}")?,
        None => writeln!(out, "None")?,
    }

    Ok(Report { x, y, z, x_grad })
}

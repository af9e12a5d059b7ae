//! PyTorch-style printing: `tensor([3.], grad_fn=<AddBackward0>)`.

use std::fmt;

use super::{GradFn, Tensor};

/// How every element of one tensor is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    /// `3.`
    Integral,
    /// `1.5000`
    Fixed,
    /// `1.0000e+20`
    Scientific,
}

fn style_for(data: &[f64]) -> Style {
    let finite: Vec<f64> = data.iter().copied().filter(|v| v.is_finite()).collect();
    let nonzero = finite.iter().map(|v| v.abs()).filter(|&v| v != 0.0);
    let max = nonzero.clone().fold(0.0, f64::max);
    let min = nonzero.fold(f64::INFINITY, f64::min);
    if max >= 1e8 || min < 1e-4 {
        Style::Scientific
    } else if finite.iter().all(|v| v.fract() == 0.0) {
        Style::Integral
    } else {
        Style::Fixed
    }
}

/// `1.0000e+20`: four decimals, signed exponent of at least two digits.
fn write_scientific(f: &mut fmt::Formatter<'_>, v: f64) -> fmt::Result {
    let s = format!("{v:.4e}");
    let (mantissa, exp) = s.split_once('e').unwrap_or((s.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let sign = if exp < 0 { '-' } else { '+' };
    write!(f, "{mantissa}e{sign}{:02}", exp.abs())
}

/// Writes `[v0, v1, ...]`. The whole tensor shares one style: whole numbers
/// as `3.`, scientific notation when magnitudes reach `1e8` or drop below
/// `1e-4`, four decimals otherwise. Non-finite values print as `nan`, `inf`
/// and `-inf`.
fn write_values(f: &mut fmt::Formatter<'_>, data: &[f64]) -> fmt::Result {
    let style = style_for(data);
    f.write_str("[")?;
    for (i, &v) in data.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        if v.is_nan() {
            f.write_str("nan")?;
        } else if v.is_infinite() {
            f.write_str(if v > 0.0 { "inf" } else { "-inf" })?;
        } else {
            match style {
                Style::Integral => write!(f, "{v}.")?,
                Style::Fixed => write!(f, "{v:.4}")?,
                Style::Scientific => write_scientific(f, v)?,
            }
        }
    }
    f.write_str("]")
}

impl fmt::Display for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.0.borrow();
        f.write_str("tensor(")?;
        write_values(f, &inner.data)?;
        match (&inner.grad_fn, inner.requires_grad) {
            (Some(grad_fn), _) => write!(f, ", grad_fn={grad_fn}")?,
            (None, true) => f.write_str(", requires_grad=True")?,
            (None, false) => {}
        }
        f.write_str(")")
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.0.borrow();
        f.debug_struct("Tensor")
            .field("data", &inner.data)
            .field("requires_grad", &inner.requires_grad)
            .field("grad_fn", &inner.grad_fn)
            .field("grad", &inner.grad)
            .finish()
    }
}

impl fmt::Display for GradFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.op())
    }
}

impl fmt::Debug for GradFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GradFn")
            .field("op", &self.op())
            .field("inputs", &self.inputs().len())
            .field("released", &self.is_released())
            .finish()
    }
}

/// Displays an optional producing operation the way Python prints `None`.
pub struct DisplayGradFn<'a>(pub Option<&'a GradFn>);

impl fmt::Display for DisplayGradFn<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(grad_fn) => fmt::Display::fmt(grad_fn, f),
            None => f.write_str("None"),
        }
    }
}

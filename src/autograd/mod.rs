//! Autograd: small `f64` tensors with reverse-mode automatic differentiation.
//!
//! The graph is recorded while arithmetic runs on tracked tensors: every result
//! of an operation over at least one tracked operand carries a [`GradFn`] naming
//! the operator and holding its operands. [`Tensor::backward`] walks that record
//! from a single-element root in reverse topological order and accumulates
//! gradients into every tracked leaf it reaches.

mod error;
mod format;
mod grad_mode;
pub mod impls;
#[cfg(test)]
mod tests;

pub use error::AutogradError;
pub use format::DisplayGradFn;
pub use grad_mode::{is_grad_enabled, no_grad, NoGradGuard};
pub use impls::engine::BackwardOptions;
pub use impls::grad_fn::{GradFn, Op};
pub use impls::tensor::Tensor;

/// Trait for raising a tensor to a scalar power (e.g. `(&a).pow(2.0)`).
pub trait Pow<Rhs> {
    /// Result of the power operation.
    type Output;

    /// Returns `self^exp` elementwise, recording the operation when tracked.
    #[must_use]
    fn pow(self, exp: Rhs) -> Self::Output;
}

/// Trait for reducing a tensor to a single element.
pub trait Sum {
    /// Result of the reduction.
    type Output;

    /// Returns the sum of all elements as a one-element tensor.
    #[must_use]
    fn sum(self) -> Self::Output;
}

//! Thread-local gradient mode.
//!
//! While a [`NoGradGuard`] is alive, operations produce untracked tensors and
//! record nothing.

use std::cell::Cell;
use std::marker::PhantomData;

thread_local! {
    static NO_GRAD_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Returns `true` unless a [`NoGradGuard`] is alive on this thread.
#[must_use]
pub fn is_grad_enabled() -> bool {
    NO_GRAD_DEPTH.with(|d| d.get() == 0)
}

/// Disables graph recording on this thread until the returned guard drops.
///
/// ```
/// use scalargrad::autograd::{no_grad, Tensor};
///
/// let x = Tensor::scalar(1.0);
/// x.set_requires_grad(true).unwrap();
/// let y = {
///     let _guard = no_grad();
///     &x + 2.0
/// };
/// assert!(!y.requires_grad());
/// ```
#[must_use = "gradient recording resumes as soon as the guard is dropped"]
pub fn no_grad() -> NoGradGuard {
    NO_GRAD_DEPTH.with(|d| d.set(d.get() + 1));
    NoGradGuard {
        _not_send: PhantomData,
    }
}

/// RAII guard returned by [`no_grad`]. Guards nest.
pub struct NoGradGuard {
    // The depth counter is per thread, so the guard must stay on it.
    _not_send: PhantomData<*const ()>,
}

impl Drop for NoGradGuard {
    fn drop(&mut self) {
        NO_GRAD_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}

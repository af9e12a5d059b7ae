//! Tensor handle: payload, tracking flag, producing operation, and gradient.

use std::cell::{Ref, RefCell};
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::rc::Rc;

use super::grad_fn::{GradFn, Op};
use crate::autograd::{is_grad_enabled, AutogradError, Pow, Sum};

/// Internal tensor state.
pub(crate) struct Inner {
    /// Forward pass values.
    pub(crate) data: Vec<f64>,
    /// Whether operations on this tensor are recorded.
    pub(crate) requires_grad: bool,
    /// Accumulated gradient; set by backward on tracked leaves.
    pub(crate) grad: Option<Vec<f64>>,
    /// Operation that produced this tensor; `None` for leaves.
    pub(crate) grad_fn: Option<GradFn>,
}

/// Handle to a one-dimensional `f64` tensor in the autograd graph.
///
/// Wraps the state in `Rc<RefCell<_>>` so that results can hold their operands
/// and gradients can be accumulated during backward. Cloning the handle shares
/// the tensor.
///
/// # Example
///
/// ```
/// use scalargrad::autograd::Tensor;
///
/// let x = Tensor::new(vec![1.0]);
/// x.set_requires_grad(true).unwrap();
/// let y = &x + 2.0;
/// let z = &y * &y * 3.0;
/// z.backward().unwrap();
/// assert_eq!(x.grad().unwrap().data(), vec![18.0]);
/// ```
#[derive(Clone)]
pub struct Tensor(pub(crate) Rc<RefCell<Inner>>);

impl Tensor {
    /// Creates an untracked leaf holding `data`.
    #[must_use]
    pub fn new(data: Vec<f64>) -> Self {
        Self::from_parts(data, false, None)
    }

    /// Creates an untracked one-element leaf.
    #[must_use]
    pub fn scalar(value: f64) -> Self {
        Self::new(vec![value])
    }

    fn from_parts(data: Vec<f64>, requires_grad: bool, grad_fn: Option<GradFn>) -> Self {
        Tensor(Rc::new(RefCell::new(Inner {
            data,
            requires_grad,
            grad: None,
            grad_fn,
        })))
    }

    /// Creates the result of `op` over `inputs`.
    ///
    /// The result is tracked, and remembers `op` and `inputs`, when gradient mode
    /// is on and at least one input is tracked.
    pub(crate) fn from_op(op: Op, inputs: Vec<Tensor>, data: Vec<f64>) -> Self {
        let track = is_grad_enabled() && inputs.iter().any(Tensor::requires_grad);
        let grad_fn = track.then(|| GradFn::new(op, inputs));
        Self::from_parts(data, track, grad_fn)
    }

    /// Returns a copy of the values.
    #[must_use]
    pub fn data(&self) -> Vec<f64> {
        self.0.borrow().data.clone()
    }

    pub(crate) fn data_ref(&self) -> Ref<'_, [f64]> {
        Ref::map(self.0.borrow(), |inner| inner.data.as_slice())
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.borrow().data.len()
    }

    /// `true` if the tensor holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The only element of a one-element tensor.
    ///
    /// # Errors
    ///
    /// Returns [`AutogradError::NotSingleElement`] for any other length.
    pub fn item(&self) -> Result<f64, AutogradError> {
        match &*self.data_ref() {
            [v] => Ok(*v),
            other => Err(AutogradError::NotSingleElement { len: other.len() }),
        }
    }

    /// Whether operations on this tensor are recorded.
    #[must_use]
    pub fn requires_grad(&self) -> bool {
        self.0.borrow().requires_grad
    }

    /// Turns gradient tracking on or off for a leaf.
    ///
    /// Has no effect on results already computed from this tensor.
    ///
    /// # Errors
    ///
    /// Returns [`AutogradError::NonLeafRequiresGrad`] if this tensor was
    /// produced by a tracked operation.
    pub fn set_requires_grad(&self, requires_grad: bool) -> Result<(), AutogradError> {
        let mut inner = self.0.borrow_mut();
        if inner.grad_fn.is_some() {
            return Err(AutogradError::NonLeafRequiresGrad);
        }
        inner.requires_grad = requires_grad;
        Ok(())
    }

    /// `true` if no tracked operation produced this tensor.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.0.borrow().grad_fn.is_none()
    }

    /// The operation that produced this tensor, if it was tracked.
    #[must_use]
    pub fn grad_fn(&self) -> Option<GradFn> {
        self.0.borrow().grad_fn.clone()
    }

    /// Accumulated gradient as an untracked tensor; `None` before any backward
    /// pass has reached this leaf.
    #[must_use]
    pub fn grad(&self) -> Option<Tensor> {
        self.0.borrow().grad.clone().map(Tensor::new)
    }

    /// Clears the accumulated gradient.
    pub fn zero_grad(&self) {
        self.0.borrow_mut().grad = None;
    }

    /// Adds `g` into the accumulated gradient.
    pub(crate) fn accumulate_grad(&self, g: &[f64]) {
        let mut inner = self.0.borrow_mut();
        match inner.grad.as_mut() {
            Some(acc) => acc.iter_mut().zip(g).for_each(|(a, b)| *a += b),
            None => inner.grad = Some(g.to_vec()),
        }
    }

    /// Untracked leaf with the same values and no link to this graph.
    #[must_use]
    pub fn detach(&self) -> Tensor {
        Tensor::new(self.data())
    }

    /// `true` if both handles point at the same tensor.
    #[must_use]
    pub fn ptr_eq(&self, other: &Tensor) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }

    fn binary(op: Op, lhs: &Tensor, rhs: &Tensor, f: impl Fn(f64, f64) -> f64) -> Tensor {
        let data = {
            let (a, b) = (lhs.data_ref(), rhs.data_ref());
            let Some(len) = broadcast_len(a.len(), b.len()) else {
                panic!("{op}: length mismatch ({} vs {})", a.len(), b.len());
            };
            (0..len)
                .map(|k| f(a[k.min(a.len() - 1)], b[k.min(b.len() - 1)]))
                .collect()
        };
        Tensor::from_op(op, vec![lhs.clone(), rhs.clone()], data)
    }

    fn unary(op: Op, input: &Tensor, f: impl Fn(f64) -> f64) -> Tensor {
        let data = input.data_ref().iter().map(|&v| f(v)).collect();
        Tensor::from_op(op, vec![input.clone()], data)
    }
}

/// Output length of an elementwise op, or `None` if the lengths do not broadcast.
fn broadcast_len(a: usize, b: usize) -> Option<usize> {
    match (a, b) {
        _ if a == b => Some(a),
        (1, n) | (n, 1) => Some(n),
        _ => None,
    }
}

impl From<Vec<f64>> for Tensor {
    fn from(data: Vec<f64>) -> Self {
        Tensor::new(data)
    }
}

impl From<f64> for Tensor {
    fn from(value: f64) -> Self {
        Tensor::scalar(value)
    }
}

// -----------------------------------------------------------------------------
// std::ops: x + y, x - y, x * y, x / y over tensors and f64 constants.
// Lengths must match, or one side must have a single element.
// -----------------------------------------------------------------------------

macro_rules! binary_op {
    ($trait:ident, $method:ident, $op:expr, $f:expr) => {
        impl $trait<&Tensor> for &Tensor {
            type Output = Tensor;

            fn $method(self, rhs: &Tensor) -> Tensor {
                Tensor::binary($op, self, rhs, $f)
            }
        }

        impl $trait<Tensor> for Tensor {
            type Output = Tensor;

            fn $method(self, rhs: Tensor) -> Tensor {
                Tensor::binary($op, &self, &rhs, $f)
            }
        }

        impl $trait<&Tensor> for Tensor {
            type Output = Tensor;

            fn $method(self, rhs: &Tensor) -> Tensor {
                Tensor::binary($op, &self, rhs, $f)
            }
        }

        impl $trait<Tensor> for &Tensor {
            type Output = Tensor;

            fn $method(self, rhs: Tensor) -> Tensor {
                Tensor::binary($op, self, &rhs, $f)
            }
        }

        impl $trait<f64> for &Tensor {
            type Output = Tensor;

            fn $method(self, rhs: f64) -> Tensor {
                Tensor::binary($op, self, &Tensor::scalar(rhs), $f)
            }
        }

        impl $trait<f64> for Tensor {
            type Output = Tensor;

            fn $method(self, rhs: f64) -> Tensor {
                Tensor::binary($op, &self, &Tensor::scalar(rhs), $f)
            }
        }

        impl $trait<&Tensor> for f64 {
            type Output = Tensor;

            fn $method(self, rhs: &Tensor) -> Tensor {
                Tensor::binary($op, &Tensor::scalar(self), rhs, $f)
            }
        }

        impl $trait<Tensor> for f64 {
            type Output = Tensor;

            fn $method(self, rhs: Tensor) -> Tensor {
                Tensor::binary($op, &Tensor::scalar(self), &rhs, $f)
            }
        }
    };
}

binary_op!(Add, add, Op::Add, |a, b| a + b);
binary_op!(Sub, sub, Op::Sub, |a, b| a - b);
binary_op!(Mul, mul, Op::Mul, |a, b| a * b);
binary_op!(Div, div, Op::Div, |a, b| a / b);

impl Neg for &Tensor {
    type Output = Tensor;

    fn neg(self) -> Tensor {
        Tensor::unary(Op::Neg, self, |v| -v)
    }
}

impl Neg for Tensor {
    type Output = Tensor;

    fn neg(self) -> Tensor {
        -&self
    }
}

// -----------------------------------------------------------------------------
// Pow, Sum: (&a).pow(exp), (&a).sum()
// -----------------------------------------------------------------------------

impl Pow<f64> for &Tensor {
    type Output = Tensor;

    fn pow(self, exp: f64) -> Tensor {
        Tensor::unary(Op::Pow(exp), self, |v| v.powf(exp))
    }
}

impl Sum for &Tensor {
    type Output = Tensor;

    fn sum(self) -> Tensor {
        let total = self.data_ref().iter().sum();
        Tensor::from_op(Op::Sum, vec![self.clone()], vec![total])
    }
}

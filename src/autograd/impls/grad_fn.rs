//! Producing operations: which operator made a tensor, from which operands,
//! and how upstream gradients flow back through it.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use super::tensor::Tensor;

/// Operator kinds recorded in the graph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
    Neg,
    /// Elementwise power with a constant exponent.
    Pow(f64),
    /// Reduction of all elements to one.
    Sum,
}

impl Op {
    /// Node name as PyTorch prints it (e.g. `AddBackward0`).
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Op::Add => "AddBackward0",
            Op::Sub => "SubBackward0",
            Op::Mul => "MulBackward0",
            Op::Div => "DivBackward0",
            Op::Neg => "NegBackward0",
            Op::Pow(_) => "PowBackward0",
            Op::Sum => "SumBackward0",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

struct Node {
    op: Op,
    inputs: Vec<Tensor>,
    /// Tracking flag of each input at the time the operation ran.
    tracked: Vec<bool>,
    released: Cell<bool>,
}

/// Shared record of the operation that produced a tensor.
///
/// Holds the operator kind, handles to the operands in operand order, and
/// whether each operand was tracked when the operation ran. A backward pass
/// follows only operands that were tracked then.
#[derive(Clone)]
pub struct GradFn(Rc<Node>);

impl GradFn {
    pub(crate) fn new(op: Op, inputs: Vec<Tensor>) -> Self {
        let tracked = inputs.iter().map(Tensor::requires_grad).collect();
        GradFn(Rc::new(Node {
            op,
            inputs,
            tracked,
            released: Cell::new(false),
        }))
    }

    /// The operator kind.
    #[must_use]
    pub fn op(&self) -> Op {
        self.0.op
    }

    /// Operand handles, in operand order.
    #[must_use]
    pub fn inputs(&self) -> &[Tensor] {
        &self.0.inputs
    }

    /// Operands that were tracked when the operation ran.
    pub(crate) fn tracked_inputs(&self) -> impl Iterator<Item = &Tensor> + '_ {
        self.0
            .inputs
            .iter()
            .zip(&self.0.tracked)
            .filter_map(|(input, &tracked)| tracked.then_some(input))
    }

    /// Whether operand `index` was tracked when the operation ran.
    #[must_use]
    pub fn input_tracked(&self, index: usize) -> bool {
        self.0.tracked.get(index).copied().unwrap_or(false)
    }

    /// `true` once a non-retaining backward pass has gone through this node.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.0.released.get()
    }

    pub(crate) fn release(&self) {
        self.0.released.set(true);
    }

    /// Maps the gradient of this node's output to one gradient per input, each
    /// already reduced to that input's length.
    pub(crate) fn backward(&self, upstream: &[f64]) -> Vec<Vec<f64>> {
        let data: Vec<_> = self.0.inputs.iter().map(Tensor::data).collect();
        let local: Vec<Vec<f64>> = match self.0.op {
            Op::Add => vec![upstream.to_vec(), upstream.to_vec()],
            Op::Sub => vec![upstream.to_vec(), upstream.iter().map(|g| -g).collect()],
            Op::Mul => {
                let (a, b) = (&data[0], &data[1]);
                vec![
                    map_indexed(upstream, |k, g| g * at(b, k)),
                    map_indexed(upstream, |k, g| g * at(a, k)),
                ]
            }
            Op::Div => {
                let (a, b) = (&data[0], &data[1]);
                vec![
                    map_indexed(upstream, |k, g| g / at(b, k)),
                    map_indexed(upstream, |k, g| -g * at(a, k) / (at(b, k) * at(b, k))),
                ]
            }
            Op::Neg => vec![upstream.iter().map(|g| -g).collect()],
            Op::Pow(exp) if exp == 0.0 => vec![vec![0.0; upstream.len()]],
            Op::Pow(exp) => {
                let a = &data[0];
                vec![map_indexed(upstream, |k, g| {
                    g * exp * at(a, k).powf(exp - 1.0)
                })]
            }
            Op::Sum => {
                let g = upstream.first().copied().unwrap_or(0.0);
                vec![vec![g; data[0].len()]]
            }
        };

        local
            .into_iter()
            .zip(&data)
            .map(|(g, input)| reduce_to(g, input.len()))
            .collect()
    }
}

/// Element `k` of `data`, repeating a one-element tensor.
fn at(data: &[f64], k: usize) -> f64 {
    if data.len() == 1 {
        data[0]
    } else {
        data[k]
    }
}

fn map_indexed(upstream: &[f64], f: impl Fn(usize, f64) -> f64) -> Vec<f64> {
    upstream.iter().enumerate().map(|(k, &g)| f(k, g)).collect()
}

/// Sums a broadcast gradient back onto a one-element operand.
fn reduce_to(grad: Vec<f64>, len: usize) -> Vec<f64> {
    if grad.len() == len {
        grad
    } else {
        vec![grad.iter().sum()]
    }
}

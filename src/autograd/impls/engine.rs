//! Reverse-mode pass: topological sort from the root, then the chain rule.

use std::collections::{HashMap, HashSet};

use log::{debug, trace};

use super::tensor::Tensor;
use crate::autograd::AutogradError;

/// Options for [`Tensor::backward_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackwardOptions {
    /// Keep the graph so that another backward pass can run through it.
    pub retain_graph: bool,
}

impl Tensor {
    /// Runs backpropagation from this single-element tensor and releases the
    /// graph afterwards.
    ///
    /// Every tracked leaf reachable from here gets `d(self)/d(leaf)` added to its
    /// gradient.
    ///
    /// # Errors
    ///
    /// - [`AutogradError::NonScalarRoot`] if this tensor has more than one element.
    /// - [`AutogradError::NoGradFn`] if no tracked operation produced it.
    /// - [`AutogradError::GraphReleased`] if an earlier pass released part of
    ///   the graph.
    pub fn backward(&self) -> Result<(), AutogradError> {
        self.backward_with(BackwardOptions::default())
    }

    /// [`Tensor::backward`] with explicit options.
    ///
    /// # Errors
    ///
    /// Same as [`Tensor::backward`]. Nothing is mutated when an error is returned.
    pub fn backward_with(&self, options: BackwardOptions) -> Result<(), AutogradError> {
        let len = self.len();
        if len != 1 {
            return Err(AutogradError::NonScalarRoot { len });
        }
        if self.grad_fn().is_none() {
            return Err(AutogradError::NoGradFn);
        }

        let mut topo = Vec::new();
        let mut visited = HashSet::new();
        build_topo(self, &mut visited, &mut topo)?;
        debug!(
            "backward over {} tensors (retain_graph={})",
            topo.len(),
            options.retain_graph
        );

        let mut grads: HashMap<_, Vec<f64>> = HashMap::new();
        grads.insert(self.id(), vec![1.0]);
        for t in topo.iter().rev() {
            let Some(g) = grads.remove(&t.id()) else {
                continue;
            };
            let Some(grad_fn) = t.grad_fn() else {
                trace!("leaf gradient {g:?}");
                t.accumulate_grad(&g);
                continue;
            };
            let input_grads = grad_fn.backward(&g);
            trace!("{}: upstream {g:?} -> {input_grads:?}", grad_fn.op());
            for (i, (input, ig)) in grad_fn.inputs().iter().zip(input_grads).enumerate() {
                if !grad_fn.input_tracked(i) {
                    continue;
                }
                grads
                    .entry(input.id())
                    .and_modify(|acc: &mut Vec<f64>| {
                        acc.iter_mut().zip(&ig).for_each(|(a, b)| *a += b)
                    })
                    .or_insert(ig);
            }
        }

        if !options.retain_graph {
            let mut released = 0;
            for grad_fn in topo.iter().filter_map(Tensor::grad_fn) {
                grad_fn.release();
                released += 1;
            }
            debug!("released {released} graph nodes");
        }
        Ok(())
    }
}

/// Pushes every tensor reachable from `t` through operands that were tracked
/// when recorded, after its inputs.
fn build_topo(
    t: &Tensor,
    visited: &mut HashSet<usize>,
    topo: &mut Vec<Tensor>,
) -> Result<(), AutogradError> {
    if !visited.insert(t.id()) {
        return Ok(());
    }
    if let Some(grad_fn) = t.grad_fn() {
        if grad_fn.is_released() {
            return Err(AutogradError::GraphReleased { op: grad_fn.op() });
        }
        for input in grad_fn.tracked_inputs() {
            build_topo(input, visited, topo)?;
        }
    }
    topo.push(t.clone());
    Ok(())
}

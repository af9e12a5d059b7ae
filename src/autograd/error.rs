//! Errors raised by the autograd engine.

use thiserror::Error;

use super::Op;

/// Errors produced when differentiating or inspecting tensors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AutogradError {
    /// Backward was triggered on a root that is not a single element.
    #[error("grad can be implicitly created only for single-element outputs, got {len} elements")]
    NonScalarRoot { len: usize },

    /// Backward was triggered on a value that no tracked operation produced.
    #[error("tensor does not require grad and does not have a grad_fn")]
    NoGradFn,

    /// Backward reached a node whose graph was released by an earlier pass.
    #[error(
        "trying to backward through {op} a second time; \
         pass retain_graph: true on the first backward to keep the graph"
    )]
    GraphReleased { op: Op },

    /// The tracking flag can only be changed on leaves.
    #[error("requires_grad can only be changed on leaf tensors")]
    NonLeafRequiresGrad,

    /// A single element was requested from a tensor of a different length.
    #[error("a tensor with {len} elements cannot be converted to a scalar")]
    NotSingleElement { len: usize },
}

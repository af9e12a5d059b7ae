//! Tensor, producing operations, and the backward engine.

pub mod engine;
pub mod grad_fn;
pub mod tensor;

//! # scalargrad
//!
//! Reverse-mode automatic differentiation on small `f64` tensors, and a
//! walkthrough that records `y = x + 2`, `z = y * y * 3`, runs backward from
//! `z`, and prints every step the way PyTorch does.

pub mod autograd;
pub mod config;
pub mod demo;

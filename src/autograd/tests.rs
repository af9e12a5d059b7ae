//! Tests for tensor autograd.
//!
//! Covers the walkthrough chain (`x + 2`, `y * y * 3`), per-operator backward
//! rules, broadcasting, accumulation, graph release, and gradient mode.

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::autograd::{
    no_grad, AutogradError, BackwardOptions, DisplayGradFn, Op, Pow, Sum, Tensor,
};

fn leaf(data: Vec<f64>) -> Tensor {
    let t = Tensor::new(data);
    t.set_requires_grad(true).unwrap();
    t
}

fn grad_of(t: &Tensor) -> Vec<f64> {
    t.grad().expect("gradient should be set").data()
}

#[test]
fn walkthrough_chain_values_and_gradient() {
    let _ = env_logger::builder().is_test(true).try_init();
    let x = leaf(vec![1.0]);
    let y = &x + 2.0;
    assert_eq!(y.data(), vec![3.0]);
    let z = &y * &y * 3.0;
    assert_eq!(z.data(), vec![27.0]);
    z.backward().unwrap();
    // d/dx 3(x+2)^2 = 6(x+2) = 18 at x=1
    assert_eq!(grad_of(&x), vec![18.0]);
}

#[test]
fn walkthrough_printed_lines() {
    let x = leaf(vec![1.0]);
    assert_eq!(DisplayGradFn(x.grad_fn().as_ref()).to_string(), "None");
    assert_eq!(x.to_string(), "tensor([1.], requires_grad=True)");
    let y = &x + 2.0;
    assert_eq!(y.to_string(), "tensor([3.], grad_fn=<AddBackward0>)");
    let z = &y * &y * 3.0;
    assert_eq!(z.grad_fn().unwrap().to_string(), "<MulBackward0>");
    assert_eq!(z.to_string(), "tensor([27.], grad_fn=<MulBackward0>)");
    z.backward().unwrap();
    assert_eq!(x.grad().unwrap().to_string(), "tensor([18.])");
}

#[test]
fn grad_is_absent_before_backward() {
    let x = leaf(vec![1.0]);
    let _y = &x + 2.0;
    assert!(x.grad().is_none());
}

#[test]
fn grad_fn_records_operator_and_operands() {
    let x = leaf(vec![1.0]);
    let y = &x + 2.0;
    let grad_fn = y.grad_fn().unwrap();
    assert_eq!(grad_fn.op(), Op::Add);
    assert_eq!(grad_fn.inputs().len(), 2);
    assert!(grad_fn.inputs()[0].ptr_eq(&x));
    assert_eq!(grad_fn.inputs()[1].data(), vec![2.0]);
    assert!(!y.is_leaf());
    assert!(x.is_leaf());
}

#[test]
fn untracked_values_never_accumulate() {
    let x = leaf(vec![1.0]);
    let c = Tensor::scalar(2.0);
    let y = &x * &c;
    y.backward().unwrap();
    assert_eq!(grad_of(&x), vec![2.0]);
    assert!(c.grad().is_none());
}

#[test]
fn ops_over_untracked_values_record_nothing() {
    let a = Tensor::scalar(2.0);
    let b = &a * 3.0;
    assert!(!b.requires_grad());
    assert!(b.grad_fn().is_none());
    assert_eq!(b.backward(), Err(AutogradError::NoGradFn));
    assert!(a.grad().is_none());
}

#[test]
fn tracking_flag_propagates_from_either_operand() {
    let tracked = leaf(vec![1.0]);
    let plain = Tensor::scalar(4.0);
    assert!((&plain + &tracked).requires_grad());
    assert!((&tracked - &plain).requires_grad());
    assert!(!(&plain * 2.0).requires_grad());
}

#[test]
fn enabling_tracking_later_leaves_earlier_results_alone() {
    let x = Tensor::scalar(1.0);
    let before = &x + 1.0;
    x.set_requires_grad(true).unwrap();
    let after = &x + 1.0;
    assert!(before.grad_fn().is_none());
    assert!(after.grad_fn().is_some());
}

#[test]
fn tracking_enabled_after_an_op_gets_no_gradient_from_it() {
    let x = leaf(vec![1.0]);
    let c = Tensor::scalar(5.0);
    let y = &x * &c;
    c.set_requires_grad(true).unwrap();
    assert!(!y.grad_fn().unwrap().input_tracked(1));
    y.backward().unwrap();
    assert_eq!(grad_of(&x), vec![5.0]);
    assert!(c.grad().is_none());
}

#[test]
fn tracking_disabled_after_an_op_still_receives_its_gradient() {
    let x = leaf(vec![2.0]);
    let y = &x * 3.0;
    x.set_requires_grad(false).unwrap();
    assert!(y.grad_fn().unwrap().input_tracked(0));
    y.backward().unwrap();
    assert_eq!(grad_of(&x), vec![3.0]);
}

#[test]
fn backward_on_multi_element_root_fails() {
    let x = leaf(vec![1.0, 2.0]);
    let y = &x * 2.0;
    assert_eq!(y.backward(), Err(AutogradError::NonScalarRoot { len: 2 }));
    assert!(x.grad().is_none());
}

#[test]
fn backward_on_leaf_fails() {
    let x = leaf(vec![1.0]);
    assert_eq!(x.backward(), Err(AutogradError::NoGradFn));
}

#[test]
fn requires_grad_cannot_change_on_non_leaf() {
    let x = leaf(vec![1.0]);
    let y = &x + 1.0;
    assert_eq!(
        y.set_requires_grad(false),
        Err(AutogradError::NonLeafRequiresGrad)
    );
    assert!(y.requires_grad());
}

#[test]
fn add_backward() {
    let a = leaf(vec![2.0]);
    let b = leaf(vec![3.0]);
    let c = &a + &b;
    assert_eq!(c.data(), vec![5.0]);
    c.backward().unwrap();
    assert_eq!(grad_of(&a), vec![1.0]);
    assert_eq!(grad_of(&b), vec![1.0]);
}

#[test]
fn mul_backward() {
    let a = leaf(vec![2.0]);
    let b = leaf(vec![3.0]);
    let c = &a * &b;
    assert_eq!(c.data(), vec![6.0]);
    c.backward().unwrap();
    assert_eq!(grad_of(&a), vec![3.0]);
    assert_eq!(grad_of(&b), vec![2.0]);
}

#[test]
fn sub_and_neg_backward() {
    let a = leaf(vec![5.0]);
    let b = leaf(vec![2.0]);
    let c = -(&a - &b);
    assert_eq!(c.data(), vec![-3.0]);
    assert_eq!(c.grad_fn().unwrap().op(), Op::Neg);
    c.backward().unwrap();
    assert_eq!(grad_of(&a), vec![-1.0]);
    assert_eq!(grad_of(&b), vec![1.0]);
}

#[test]
fn div_backward() {
    let a = leaf(vec![6.0]);
    let b = leaf(vec![2.0]);
    let c = &a / &b;
    assert_eq!(c.data(), vec![3.0]);
    c.backward().unwrap();
    assert_eq!(grad_of(&a), vec![0.5]);
    assert_eq!(grad_of(&b), vec![-1.5]); // -a / b^2
}

#[test]
fn constant_on_the_left() {
    let x = leaf(vec![4.0]);
    let y = 1.0 / &x;
    assert_eq!(y.data(), vec![0.25]);
    y.backward().unwrap();
    assert_relative_eq!(grad_of(&x)[0], -1.0 / 16.0);
}

#[test]
fn pow_backward() {
    let a = leaf(vec![2.0]);
    let b = (&a).pow(3.0);
    assert_relative_eq!(b.item().unwrap(), 8.0);
    b.backward().unwrap();
    // d/dx x^3 = 3x^2 = 12 at x=2
    assert_relative_eq!(grad_of(&a)[0], 12.0);
}

#[test]
fn pow_zero_has_zero_gradient() {
    let x = leaf(vec![0.0, 2.0]);
    let y = (&(&x).pow(0.0)).sum();
    assert_eq!(y.data(), vec![2.0]);
    y.backward().unwrap();
    assert_eq!(grad_of(&x), vec![0.0, 0.0]);
}

#[test]
fn sum_reduces_multi_element_root() {
    let x = leaf(vec![1.0, 2.0, 3.0]);
    let s = (&(&x * &x)).sum();
    assert_eq!(s.data(), vec![14.0]);
    s.backward().unwrap();
    assert_eq!(grad_of(&x), vec![2.0, 4.0, 6.0]);
}

#[test]
fn broadcast_gradient_sums_onto_single_element_operand() {
    let w = leaf(vec![2.0]);
    let x = leaf(vec![1.0, 2.0, 3.0]);
    let s = (&(&w * &x)).sum();
    s.backward().unwrap();
    assert_eq!(grad_of(&w), vec![6.0]);
    assert_eq!(grad_of(&x), vec![2.0, 2.0, 2.0]);
}

#[test]
fn reused_value_accumulates() {
    // c = a + a, dc/da = 2
    let a = leaf(vec![3.0]);
    let c = &a + &a;
    c.backward().unwrap();
    assert_eq!(grad_of(&a), vec![2.0]);
}

#[test]
fn diamond_graph_visits_shared_node_once() {
    let x = leaf(vec![3.0]);
    let h = &x * 2.0;
    let out = &(&h + 1.0) * &(&h - 1.0); // h^2 - 1
    out.backward().unwrap();
    // d/dx (4x^2 - 1) = 8x = 24
    assert_eq!(grad_of(&x), vec![24.0]);
}

#[test]
fn second_backward_after_release_fails() {
    let x = leaf(vec![1.0]);
    let z = &(&x + 2.0) * 3.0;
    z.backward().unwrap();
    assert!(z.grad_fn().unwrap().is_released());
    assert_eq!(
        z.backward(),
        Err(AutogradError::GraphReleased { op: Op::Mul })
    );
    assert_eq!(grad_of(&x), vec![3.0]);
}

#[test]
fn retained_graph_accumulates_across_passes() {
    let x = leaf(vec![1.0]);
    let y = &x + 2.0;
    let z = &y * &y * 3.0;
    let retain = BackwardOptions { retain_graph: true };
    z.backward_with(retain).unwrap();
    z.backward_with(retain).unwrap();
    assert_eq!(grad_of(&x), vec![36.0]);
    x.zero_grad();
    z.backward().unwrap();
    assert_eq!(grad_of(&x), vec![18.0]);
}

#[test]
fn no_grad_results_are_untracked() {
    let x = leaf(vec![1.0]);
    let y = {
        let _guard = no_grad();
        &x * 3.0
    };
    assert!(!y.requires_grad());
    assert!(y.grad_fn().is_none());
    assert!((&x * 3.0).requires_grad());
}

#[test]
fn from_conversions_build_untracked_leaves() {
    let v = Tensor::from(vec![1.0, 2.0]);
    let s: Tensor = 4.0.into();
    assert_eq!(v.data(), vec![1.0, 2.0]);
    assert_eq!(s.item(), Ok(4.0));
    assert!(v.is_leaf() && !v.requires_grad());
    assert!(s.is_leaf() && !s.requires_grad());
}

#[test]
fn detach_cuts_the_graph() {
    let x = leaf(vec![2.0]);
    let y = (&x * 3.0).detach();
    assert!(y.is_leaf());
    assert!(!y.requires_grad());
    assert_eq!(y.data(), vec![6.0]);
}

#[test]
fn gradients_match_finite_differences() {
    let mut rng = StdRng::seed_from_u64(42);
    let h = 1e-6;
    let f = |t: &Tensor| -> Tensor {
        let y = t + 2.0;
        let z = &y * &y * 3.0;
        &z / &(t * t + 1.0) - t
    };
    for _ in 0..20 {
        let v: f64 = rng.random_range(-5.0..5.0);
        let x = leaf(vec![v]);
        f(&x).backward().unwrap();
        let plus = f(&Tensor::scalar(v + h)).item().unwrap();
        let minus = f(&Tensor::scalar(v - h)).item().unwrap();
        let numeric = (plus - minus) / (2.0 * h);
        assert_relative_eq!(grad_of(&x)[0], numeric, epsilon = 1e-4, max_relative = 1e-4);
    }
}

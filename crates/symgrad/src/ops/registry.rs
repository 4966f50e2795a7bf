//! Static table of op rules, keyed by name.

/// How an op participates in differentiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientRule {
    /// Propagates upstream gradients to its inputs.
    Differentiable,
    /// Output does not depend on input values; contributes nothing.
    Constant,
    /// No rule; differentiating through it fails.
    Undefined,
}

/// Registry entry for one primitive op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpSpec {
    pub name: &'static str,
    pub arity: usize,
    pub gradient: GradientRule,
}

impl OpSpec {
    const fn new(name: &'static str, arity: usize, gradient: GradientRule) -> Self {
        Self {
            name,
            arity,
            gradient,
        }
    }

    pub fn is_differentiable(&self) -> bool {
        self.gradient != GradientRule::Undefined
    }
}

use GradientRule::{Constant, Differentiable, Undefined};

/// Every supported op, in [`Op`](super::Op) declaration order.
pub static OPS: [OpSpec; 27] = [
    OpSpec::new("add", 2, Differentiable),
    OpSpec::new("sub", 2, Differentiable),
    OpSpec::new("mul", 2, Differentiable),
    OpSpec::new("div", 2, Differentiable),
    OpSpec::new("rsub", 2, Differentiable),
    OpSpec::new("rdiv", 2, Differentiable),
    OpSpec::new("add_scalar", 1, Differentiable),
    OpSpec::new("sub_scalar", 1, Differentiable),
    OpSpec::new("mul_scalar", 1, Differentiable),
    OpSpec::new("div_scalar", 1, Differentiable),
    OpSpec::new("rsub_scalar", 1, Differentiable),
    OpSpec::new("rdiv_scalar", 1, Differentiable),
    OpSpec::new("neg", 1, Differentiable),
    OpSpec::new("sin", 1, Differentiable),
    OpSpec::new("cos", 1, Differentiable),
    OpSpec::new("exp", 1, Differentiable),
    OpSpec::new("log", 1, Differentiable),
    OpSpec::new("tanh", 1, Differentiable),
    OpSpec::new("square", 1, Differentiable),
    OpSpec::new("transpose", 1, Differentiable),
    OpSpec::new("mmul", 2, Differentiable),
    OpSpec::new("sum", 1, Differentiable),
    OpSpec::new("ones_like", 1, Constant),
    OpSpec::new("zeros_like", 1, Constant),
    OpSpec::new("scalar_not_equals", 1, Undefined),
    OpSpec::new("scalar_less_than_or_equal", 1, Undefined),
    OpSpec::new("sum_like", 2, Differentiable),
];

/// Find an op rule by its registry name.
///
/// ```
/// use symgrad::ops::registry::lookup;
///
/// assert_eq!(lookup("mmul").map(|spec| spec.arity), Some(2));
/// assert!(lookup("conv2d").is_none());
/// ```
pub fn lookup(name: &str) -> Option<&'static OpSpec> {
    OPS.iter().find(|spec| spec.name == name)
}

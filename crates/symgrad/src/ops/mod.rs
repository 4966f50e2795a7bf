//! Primitive op rules.
//!
//! Every op is a variant of the closed [`Op`] enum. Its metadata (name,
//! arity, whether it can be differentiated) lives in the static table in
//! [`registry`]; the forward rule, the numeric vector-Jacobian product and
//! the symbolic gradient builder are implemented per variant in the
//! sibling modules. Adding a primitive touches only this module.

mod forward;
pub mod registry;
mod symbolic;
mod vjp;

pub use registry::{GradientRule, OpSpec, lookup};

/// A primitive operation applied by a graph node.
///
/// Scalar variants carry their constant operand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
    /// `rhs - lhs`
    RSub,
    /// `rhs / lhs`
    RDiv,
    AddScalar(f64),
    SubScalar(f64),
    MulScalar(f64),
    DivScalar(f64),
    /// `scalar - x`
    RSubScalar(f64),
    /// `scalar / x`
    RDivScalar(f64),
    Neg,
    Sin,
    Cos,
    Exp,
    Log,
    Tanh,
    Square,
    Transpose,
    /// Matrix product of two rank-2 operands.
    MMul,
    /// Sum of all elements, shape `[1]`.
    Sum,
    OnesLike,
    ZerosLike,
    /// `1.0` where `x != scalar`, else `0.0`.
    ScalarNotEquals(f64),
    /// `1.0` where `x <= scalar`, else `0.0`.
    ScalarLessThanOrEqual(f64),
    /// First input summed or broadcast to the shape of the second; carries
    /// gradients back onto one-element operands.
    SumLike,
}

impl Op {
    fn table_index(&self) -> usize {
        match self {
            Op::Add => 0,
            Op::Sub => 1,
            Op::Mul => 2,
            Op::Div => 3,
            Op::RSub => 4,
            Op::RDiv => 5,
            Op::AddScalar(_) => 6,
            Op::SubScalar(_) => 7,
            Op::MulScalar(_) => 8,
            Op::DivScalar(_) => 9,
            Op::RSubScalar(_) => 10,
            Op::RDivScalar(_) => 11,
            Op::Neg => 12,
            Op::Sin => 13,
            Op::Cos => 14,
            Op::Exp => 15,
            Op::Log => 16,
            Op::Tanh => 17,
            Op::Square => 18,
            Op::Transpose => 19,
            Op::MMul => 20,
            Op::Sum => 21,
            Op::OnesLike => 22,
            Op::ZerosLike => 23,
            Op::ScalarNotEquals(_) => 24,
            Op::ScalarLessThanOrEqual(_) => 25,
            Op::SumLike => 26,
        }
    }

    /// Registry entry for this op.
    pub fn spec(&self) -> &'static OpSpec {
        &registry::OPS[self.table_index()]
    }

    /// Stable registry name.
    pub fn name(&self) -> &'static str {
        self.spec().name
    }

    pub fn arity(&self) -> usize {
        self.spec().arity
    }

    pub fn gradient_rule(&self) -> GradientRule {
        self.spec().gradient
    }

    /// Build an op from its registry name; `scalar` fills the constant of
    /// scalar variants and is ignored otherwise.
    ///
    /// ```
    /// use symgrad::Op;
    ///
    /// assert_eq!(Op::from_name("mul_scalar", 2.0), Some(Op::MulScalar(2.0)));
    /// assert_eq!(Op::from_name("tanh", 0.0), Some(Op::Tanh));
    /// assert_eq!(Op::from_name("softmax", 0.0), None);
    /// ```
    pub fn from_name(name: &str, scalar: f64) -> Option<Op> {
        let spec = lookup(name)?;
        let op = match spec.name {
            "add" => Op::Add,
            "sub" => Op::Sub,
            "mul" => Op::Mul,
            "div" => Op::Div,
            "rsub" => Op::RSub,
            "rdiv" => Op::RDiv,
            "add_scalar" => Op::AddScalar(scalar),
            "sub_scalar" => Op::SubScalar(scalar),
            "mul_scalar" => Op::MulScalar(scalar),
            "div_scalar" => Op::DivScalar(scalar),
            "rsub_scalar" => Op::RSubScalar(scalar),
            "rdiv_scalar" => Op::RDivScalar(scalar),
            "neg" => Op::Neg,
            "sin" => Op::Sin,
            "cos" => Op::Cos,
            "exp" => Op::Exp,
            "log" => Op::Log,
            "tanh" => Op::Tanh,
            "square" => Op::Square,
            "transpose" => Op::Transpose,
            "mmul" => Op::MMul,
            "sum" => Op::Sum,
            "ones_like" => Op::OnesLike,
            "zeros_like" => Op::ZerosLike,
            "scalar_not_equals" => Op::ScalarNotEquals(scalar),
            "scalar_less_than_or_equal" => Op::ScalarLessThanOrEqual(scalar),
            "sum_like" => Op::SumLike,
            _ => return None,
        };
        Some(op)
    }
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

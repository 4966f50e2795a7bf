//! Forward rules: arity checks, shape inference and values.

use super::Op;
use crate::error::{GraphError, TensorError};
use crate::graph::shape::{check_compatible, output_shape};
use crate::operations::{
    apply, apply_binary, apply_binary_into, apply_inplace, check_divisor, matmul, sum, sum_to,
    transpose,
};
use crate::tensor::Tensor;

/// Numeric shape of an op's forward computation.
#[derive(Clone, Copy)]
pub(super) enum Kernel {
    /// Elementwise over two operands with scalar broadcast.
    Binary(fn(f64, f64) -> f64),
    /// Elementwise over one operand with a constant parameter.
    Map(fn(f64, f64) -> f64, f64),
    Fill(f64),
    Transpose,
    MatMul,
    Sum,
    /// Reduce or broadcast the first input to the second input's shape.
    SumTo,
}

fn mask(holds: bool) -> f64 {
    if holds { 1.0 } else { 0.0 }
}

impl Op {
    pub(super) fn kernel(&self) -> Kernel {
        match *self {
            Op::Add => Kernel::Binary(|x, y| x + y),
            Op::Sub => Kernel::Binary(|x, y| x - y),
            Op::Mul => Kernel::Binary(|x, y| x * y),
            Op::Div => Kernel::Binary(|x, y| x / y),
            Op::RSub => Kernel::Binary(|x, y| y - x),
            Op::RDiv => Kernel::Binary(|x, y| y / x),
            Op::AddScalar(s) => Kernel::Map(|x, s| x + s, s),
            Op::SubScalar(s) => Kernel::Map(|x, s| x - s, s),
            Op::MulScalar(s) => Kernel::Map(|x, s| x * s, s),
            Op::DivScalar(s) => Kernel::Map(|x, s| x / s, s),
            Op::RSubScalar(s) => Kernel::Map(|x, s| s - x, s),
            Op::RDivScalar(s) => Kernel::Map(|x, s| s / x, s),
            Op::Neg => Kernel::Map(|x, _| -x, 0.0),
            Op::Sin => Kernel::Map(|x, _| x.sin(), 0.0),
            Op::Cos => Kernel::Map(|x, _| x.cos(), 0.0),
            Op::Exp => Kernel::Map(|x, _| x.exp(), 0.0),
            Op::Log => Kernel::Map(|x, _| x.ln(), 0.0),
            Op::Tanh => Kernel::Map(|x, _| x.tanh(), 0.0),
            Op::Square => Kernel::Map(|x, _| x * x, 0.0),
            Op::ScalarNotEquals(s) => Kernel::Map(|x, s| mask(x != s), s),
            Op::ScalarLessThanOrEqual(s) => Kernel::Map(|x, s| mask(x <= s), s),
            Op::OnesLike => Kernel::Fill(1.0),
            Op::ZerosLike => Kernel::Fill(0.0),
            Op::Transpose => Kernel::Transpose,
            Op::MMul => Kernel::MatMul,
            Op::Sum => Kernel::Sum,
            Op::SumLike => Kernel::SumTo,
        }
    }

    /// Whether this op combines two operands elementwise.
    pub fn is_elementwise_binary(&self) -> bool {
        matches!(self.kernel(), Kernel::Binary(_))
    }

    /// Fail unless `actual` matches the registered arity.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::ArityMismatch`.
    pub fn check_arity(&self, actual: usize) -> Result<(), GraphError> {
        if actual == self.arity() {
            Ok(())
        } else {
            Err(GraphError::ArityMismatch {
                op: self.name(),
                expected: self.arity(),
                actual,
            })
        }
    }

    /// Output shape for the given input shapes.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::ShapeMismatch` when the inputs cannot be
    /// combined, or `GraphError::ArityMismatch`.
    pub fn infer_shape(&self, shapes: &[&[usize]]) -> Result<Vec<usize>, GraphError> {
        self.check_arity(shapes.len())?;
        let shape = shapes[0];
        match self.kernel() {
            Kernel::Binary(_) => {
                check_compatible(shape, shapes[1])?;
                Ok(output_shape(Some(shape), shapes[1]))
            }
            Kernel::Map(..) | Kernel::Fill(_) => Ok(shape.to_vec()),
            Kernel::Transpose => Ok(shape.iter().rev().copied().collect()),
            Kernel::MatMul => match (shape, shapes[1]) {
                (&[m, k], &[k_b, n]) if k == k_b => Ok(vec![m, n]),
                (lhs, rhs) => Err(GraphError::ShapeMismatch {
                    lhs: lhs.to_vec(),
                    rhs: rhs.to_vec(),
                }),
            },
            Kernel::Sum => Ok(vec![1]),
            Kernel::SumTo => {
                check_compatible(shape, shapes[1])?;
                Ok(shapes[1].to_vec())
            }
        }
    }

    fn check_divisors(&self, inputs: &[&Tensor]) -> Result<(), TensorError> {
        match *self {
            Op::Div => check_divisor(inputs[1]),
            Op::RDiv | Op::RDivScalar(_) => check_divisor(inputs[0]),
            Op::DivScalar(s) if s == 0.0 => Err(TensorError::DivisionByZero { index: 0 }),
            _ => Ok(()),
        }
    }

    /// Forward value of this op.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::ArityMismatch` on a wrong input count and wraps
    /// tensor failures such as `TensorError::DivisionByZero`.
    pub fn value(&self, inputs: &[&Tensor]) -> Result<Tensor, GraphError> {
        self.check_arity(inputs.len())?;
        self.check_divisors(inputs)?;
        let x = inputs[0];
        let out = match self.kernel() {
            Kernel::Binary(f) => apply_binary(x, inputs[1], f)?,
            Kernel::Map(f, p) => apply(x, |v| f(v, p)),
            Kernel::Fill(v) => Tensor::full(x.shape(), v),
            Kernel::Transpose => transpose(x)?,
            Kernel::MatMul => matmul(x, inputs[1])?,
            Kernel::Sum => sum(x),
            Kernel::SumTo => sum_to(x, inputs[1].shape())?,
        };
        Ok(out)
    }

    /// Forward value that may write into `lhs`'s buffer instead of
    /// allocating. Falls back to [`Op::value`] for ops that change shape.
    ///
    /// # Errors
    ///
    /// Same as [`Op::value`].
    pub fn value_reusing(&self, mut lhs: Tensor, rest: &[&Tensor]) -> Result<Tensor, GraphError> {
        self.check_arity(rest.len() + 1)?;
        let inputs: Vec<&Tensor> = std::iter::once(&lhs).chain(rest.iter().copied()).collect();
        self.check_divisors(&inputs)?;
        match self.kernel() {
            Kernel::Binary(f) => Ok(apply_binary_into(lhs, rest[0], f)?),
            Kernel::Map(f, p) => {
                apply_inplace(&mut lhs, |v| f(v, p));
                Ok(lhs)
            }
            Kernel::Fill(v) => {
                lhs.fill(v);
                Ok(lhs)
            }
            Kernel::Transpose | Kernel::MatMul | Kernel::Sum | Kernel::SumTo => self.value(&inputs),
        }
    }
}

//! Numeric vector-Jacobian products.

use super::Op;
use crate::error::{GraphError, TensorError};
use crate::operations::{
    apply, apply_binary, div, matmul, mul, neg, scale, sum, sum_to, transpose,
};
use crate::strides::is_scalar_shape;
use crate::tensor::Tensor;

fn square(t: &Tensor) -> Tensor {
    apply(t, |v| v * v)
}

/// Collapse a gradient onto a one-element operand it was broadcast from.
fn unbroadcast(grad: Tensor, shape: &[usize]) -> Result<Tensor, TensorError> {
    if is_scalar_shape(shape) && grad.shape() != shape {
        sum(&grad).reshape(shape)
    } else {
        Ok(grad)
    }
}

impl Op {
    /// Gradient of a scalar objective with respect to each input, given
    /// the gradient `upstream` with respect to this op's output.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::MissingGradientRule` for ops without a rule,
    /// `GraphError::ArityMismatch`, or wrapped tensor failures.
    ///
    /// # Example
    ///
    /// ```
    /// use symgrad::{Op, Tensor};
    ///
    /// let x = Tensor::from_vec(vec![0.0], &[1]).unwrap();
    /// let up = Tensor::scalar(1.0);
    /// let grads = Op::Sin.local_gradient(&[&x], &up).unwrap();
    /// assert_eq!(grads[0].data(), &[1.0]);
    /// ```
    pub fn local_gradient(
        &self,
        inputs: &[&Tensor],
        upstream: &Tensor,
    ) -> Result<Vec<Tensor>, GraphError> {
        self.check_arity(inputs.len())?;
        let x = inputs[0];
        let up = upstream;
        let grads = match *self {
            Op::Add => vec![up.clone(), up.clone()],
            Op::Sub => vec![up.clone(), neg(up)],
            Op::Mul => vec![mul(up, inputs[1])?, mul(up, x)?],
            Op::Div => {
                let y = inputs[1];
                vec![div(up, y)?, neg(&div(&mul(up, x)?, &square(y))?)]
            }
            Op::RSub => vec![neg(up), up.clone()],
            Op::RDiv => {
                let y = inputs[1];
                vec![neg(&div(&mul(up, y)?, &square(x))?), div(up, x)?]
            }
            Op::AddScalar(_) | Op::SubScalar(_) => vec![up.clone()],
            Op::MulScalar(s) => vec![scale(up, s)],
            Op::DivScalar(s) => vec![scale(up, 1.0 / s)],
            Op::RSubScalar(_) | Op::Neg => vec![neg(up)],
            Op::RDivScalar(s) => vec![apply_binary(up, x, |g, v| -g * s / (v * v))?],
            Op::Sin => vec![apply_binary(up, x, |g, v| g * v.cos())?],
            Op::Cos => vec![apply_binary(up, x, |g, v| -g * v.sin())?],
            Op::Exp => vec![apply_binary(up, x, |g, v| g * v.exp())?],
            Op::Log => vec![apply_binary(up, x, |g, v| g / v)?],
            Op::Tanh => vec![apply_binary(up, x, |g, v| g * (1.0 - v.tanh().powi(2)))?],
            Op::Square => vec![apply_binary(up, x, |g, v| 2.0 * g * v)?],
            Op::Transpose => vec![transpose(up)?],
            Op::MMul => {
                let y = inputs[1];
                vec![matmul(up, &transpose(y)?)?, matmul(&transpose(x)?, up)?]
            }
            Op::Sum => vec![Tensor::full(x.shape(), up.item()?)],
            Op::OnesLike | Op::ZerosLike => vec![x.zeros_like()],
            // The second input only lends its shape.
            Op::SumLike => vec![sum_to(up, x.shape())?, inputs[1].zeros_like()],
            Op::ScalarNotEquals(_) | Op::ScalarLessThanOrEqual(_) => {
                return Err(GraphError::MissingGradientRule { op: self.name() });
            }
        };
        grads
            .into_iter()
            .zip(inputs)
            .map(|(grad, input)| unbroadcast(grad, input.shape()).map_err(GraphError::from))
            .collect()
    }
}

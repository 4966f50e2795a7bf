//! Symbolic gradient rules.
//!
//! Each rule is the graph-building counterpart of the numeric rule in
//! `vjp.rs`: instead of computing tensors it emits nodes, so gradients are
//! themselves differentiable.

use super::Op;
use crate::error::GraphError;
use crate::graph::{Graph, NodeId};

impl Op {
    /// Emit nodes computing the gradient flowing into each input of `node`,
    /// given the node `upstream` holding the gradient of its output.
    ///
    /// Entries are `None` for inputs that receive no contribution.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::MissingGradientRule` for ops without a rule and
    /// propagates failures from node construction.
    pub fn build_gradient(
        &self,
        graph: &mut Graph,
        node: NodeId,
        upstream: NodeId,
    ) -> Result<Vec<Option<NodeId>>, GraphError> {
        let inputs = graph.node_inputs(node)?;
        self.check_arity(inputs.len())?;
        let x = inputs[0];
        let y = inputs.get(1).copied().unwrap_or(x);
        let up = upstream;

        let grads = match *self {
            Op::Add => vec![up, up],
            Op::Sub => vec![up, graph.push_op(Op::Neg, &[up])?],
            Op::Mul => vec![
                graph.push_op(Op::Mul, &[up, y])?,
                graph.push_op(Op::Mul, &[up, x])?,
            ],
            Op::Div => {
                let gx = graph.push_op(Op::Div, &[up, y])?;
                let num = graph.push_op(Op::Mul, &[up, x])?;
                let den = graph.push_op(Op::Square, &[y])?;
                let quotient = graph.push_op(Op::Div, &[num, den])?;
                vec![gx, graph.push_op(Op::Neg, &[quotient])?]
            }
            Op::RSub => vec![graph.push_op(Op::Neg, &[up])?, up],
            Op::RDiv => {
                let num = graph.push_op(Op::Mul, &[up, y])?;
                let den = graph.push_op(Op::Square, &[x])?;
                let quotient = graph.push_op(Op::Div, &[num, den])?;
                vec![
                    graph.push_op(Op::Neg, &[quotient])?,
                    graph.push_op(Op::Div, &[up, x])?,
                ]
            }
            Op::AddScalar(_) | Op::SubScalar(_) => vec![up],
            Op::MulScalar(s) => vec![graph.push_op(Op::MulScalar(s), &[up])?],
            Op::DivScalar(s) => vec![graph.push_op(Op::DivScalar(s), &[up])?],
            Op::RSubScalar(_) | Op::Neg => vec![graph.push_op(Op::Neg, &[up])?],
            Op::RDivScalar(s) => {
                let num = graph.push_op(Op::MulScalar(s), &[up])?;
                let den = graph.push_op(Op::Square, &[x])?;
                let quotient = graph.push_op(Op::Div, &[num, den])?;
                vec![graph.push_op(Op::Neg, &[quotient])?]
            }
            Op::Sin => {
                let cos = graph.push_op(Op::Cos, &[x])?;
                vec![graph.push_op(Op::Mul, &[up, cos])?]
            }
            Op::Cos => {
                let sin = graph.push_op(Op::Sin, &[x])?;
                let scaled = graph.push_op(Op::Mul, &[up, sin])?;
                vec![graph.push_op(Op::Neg, &[scaled])?]
            }
            // d/dx exp(x) is the node itself
            Op::Exp => vec![graph.push_op(Op::Mul, &[up, node])?],
            Op::Log => vec![graph.push_op(Op::Div, &[up, x])?],
            Op::Tanh => {
                let squared = graph.push_op(Op::Square, &[node])?;
                let sech2 = graph.push_op(Op::RSubScalar(1.0), &[squared])?;
                vec![graph.push_op(Op::Mul, &[up, sech2])?]
            }
            Op::Square => {
                let twice = graph.push_op(Op::MulScalar(2.0), &[x])?;
                vec![graph.push_op(Op::Mul, &[up, twice])?]
            }
            Op::Transpose => vec![graph.push_op(Op::Transpose, &[up])?],
            Op::MMul => {
                let y_t = graph.push_op(Op::Transpose, &[y])?;
                let x_t = graph.push_op(Op::Transpose, &[x])?;
                vec![
                    graph.push_op(Op::MMul, &[up, y_t])?,
                    graph.push_op(Op::MMul, &[x_t, up])?,
                ]
            }
            Op::Sum => vec![graph.push_op(Op::SumLike, &[up, x])?],
            Op::SumLike => return Ok(vec![Some(graph.push_op(Op::SumLike, &[up, x])?), None]),
            Op::OnesLike | Op::ZerosLike => return Ok(vec![None]),
            Op::ScalarNotEquals(_) | Op::ScalarLessThanOrEqual(_) => {
                return Err(GraphError::MissingGradientRule { op: self.name() });
            }
        };

        if !self.is_elementwise_binary() {
            return Ok(grads.into_iter().map(Some).collect());
        }
        // A one-element operand broadcast over the output gets the gradient
        // summed back onto its own shape.
        let mut reduced = Vec::with_capacity(grads.len());
        for (grad, input) in grads.into_iter().zip(inputs) {
            let same_shape = match (graph.resolve_shape(grad), graph.resolve_shape(input)) {
                (Ok(grad_shape), Ok(input_shape)) => grad_shape == input_shape,
                _ => false,
            };
            reduced.push(Some(if same_shape {
                grad
            } else {
                graph.push_op(Op::SumLike, &[grad, input])?
            }));
        }
        Ok(reduced)
    }
}

//! Shape inference.
//!
//! Binary ops follow a scalar-aware, left-biased rule: operands must have
//! equal shapes unless one of them holds a single element, and the result
//! takes the right shape only when the left operand is absent or a scalar.

use std::collections::HashMap;

use crate::error::GraphError;
use crate::graph::{Graph, NodeId, Variable};
use crate::strides::is_scalar_shape;

/// Result shape of a binary op over shapes `a` and `b`.
///
/// ```
/// use symgrad::graph::shape::output_shape;
///
/// assert_eq!(output_shape(Some(&[1]), &[2, 3]), vec![2, 3]);
/// assert_eq!(output_shape(Some(&[2, 3]), &[1]), vec![2, 3]);
/// assert_eq!(output_shape(None, &[4]), vec![4]);
/// ```
pub fn output_shape(a: Option<&[usize]>, b: &[usize]) -> Vec<usize> {
    match a {
        Some(a) if !is_scalar_shape(a) => a.to_vec(),
        _ => b.to_vec(),
    }
}

/// Check that two operand shapes can be combined elementwise.
///
/// # Errors
///
/// Returns `GraphError::ShapeMismatch` if the shapes differ and neither
/// holds exactly one element.
pub fn check_compatible(a: &[usize], b: &[usize]) -> Result<(), GraphError> {
    if a == b || is_scalar_shape(a) || is_scalar_shape(b) {
        Ok(())
    } else {
        Err(GraphError::ShapeMismatch {
            lhs: a.to_vec(),
            rhs: b.to_vec(),
        })
    }
}

impl Graph {
    /// Shape of a variable: the shape fixed when it was built, else the
    /// shape inferred from the values bound to the placeholders it
    /// depends on.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::UnresolvedShape` when some leaf in the
    /// dependency subgraph has neither an explicit shape nor a value.
    pub fn shape(&self, variable: &Variable) -> Result<Vec<usize>, GraphError> {
        let id = self.resolve(variable)?;
        self.resolve_shape(id)
    }

    /// Shapes are stored on nodes whose shape cannot change, so only the
    /// part of the subgraph below a placeholder is walked, inputs first.
    pub(crate) fn resolve_shape(&self, id: NodeId) -> Result<Vec<usize>, GraphError> {
        if let Some(shape) = self.node_checked(id)?.shape() {
            return Ok(shape.to_vec());
        }
        let order = self.dependency_order(id, |node| node.shape.is_some())?;
        let mut shapes: HashMap<NodeId, Vec<usize>> = HashMap::with_capacity(order.len());
        for node_id in order {
            let node = self.node_checked(node_id)?;
            let shape = if let Some(shape) = node.shape() {
                shape.to_vec()
            } else if let Some(op) = node.op {
                let inputs = node
                    .inputs
                    .iter()
                    .map(|input| {
                        shapes
                            .get(input)
                            .map(Vec::as_slice)
                            .ok_or(GraphError::InvalidNode(input.index()))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                op.infer_shape(&inputs)?
            } else if let Some(value) = self.leaf_value(node_id) {
                value.shape().to_vec()
            } else {
                return Err(GraphError::UnresolvedShape {
                    name: self.display_name(node_id),
                });
            };
            shapes.insert(node_id, shape);
        }
        shapes.remove(&id).ok_or(GraphError::InvalidNode(id.index()))
    }
}

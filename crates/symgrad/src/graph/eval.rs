//! Forward evaluation and leaf bindings.

use std::collections::HashMap;

use log::{debug, trace};

use crate::error::GraphError;
use crate::graph::{Graph, NodeId, Variable};
use crate::tensor::Tensor;

impl Graph {
    /// Evaluate `variable` in this graph, memoizing every computed node.
    ///
    /// Nodes are visited inputs-first; a node with a memoized value is not
    /// descended into. Nothing is memoized unless the whole evaluation
    /// succeeds.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::UnboundPlaceholder` when a leaf on the path has
    /// no value, and propagates op failures such as division by zero.
    pub fn evaluate(&mut self, variable: &Variable) -> Result<Tensor, GraphError> {
        let root = self.resolve(variable)?;
        self.evaluate_node(root)
    }

    pub(crate) fn evaluate_node(&mut self, root: NodeId) -> Result<Tensor, GraphError> {
        let order = self.dependency_order(root, |node| node.cached_value.is_some())?;
        debug!("Evaluating node {root} over {} nodes", order.len());

        // Remaining reads of each node's value, for buffer reuse.
        let mut reads: HashMap<NodeId, usize> = HashMap::new();
        for &id in &order {
            let node = self.node_checked(id)?;
            if node.cached_value.is_none() {
                for &input in &node.inputs {
                    *reads.entry(input).or_default() += 1;
                }
            }
        }

        let mut values: HashMap<NodeId, Tensor> = HashMap::new();
        for &id in &order {
            let node = self.node_checked(id)?;
            let value = if let Some(cached) = &node.cached_value {
                cached.clone()
            } else if let Some(op) = node.op {
                trace!("Computing node {id} ({op})");
                let reusable = node
                    .inputs
                    .split_first()
                    .filter(|(first, _)| node.in_place && reads.get(*first) == Some(&1));
                if let Some((&first, rest)) = reusable {
                    trace!("Reusing buffer of node {first} for node {id}");
                    let lhs = values
                        .remove(&first)
                        .ok_or(GraphError::MissingValue(first.index()))?;
                    let rest = gather(&values, rest)?;
                    op.value_reusing(lhs, &rest)?
                } else {
                    let inputs = gather(&values, &node.inputs)?;
                    op.value(&inputs)?
                }
            } else {
                self.leaf_value(id)
                    .cloned()
                    .ok_or_else(|| GraphError::UnboundPlaceholder(self.display_name(id)))?
            };
            values.insert(id, value);
        }

        let result = values
            .get(&root)
            .cloned()
            .ok_or(GraphError::MissingValue(root.index()))?;
        for (id, value) in values {
            let node = &mut self.nodes[id.index()];
            if !node.is_leaf() && node.cached_value.is_none() {
                node.cached_value = Some(value);
            }
        }
        Ok(result)
    }

    /// Evaluate `variable` on a duplicate of this graph, leaving `self`
    /// untouched.
    ///
    /// The duplicate defines a function `"output"` returning `variable`,
    /// invokes it, and evaluates the result.
    ///
    /// # Errors
    ///
    /// Same as [`Graph::evaluate`].
    pub fn eval(&self, variable: &Variable) -> Result<Tensor, GraphError> {
        self.resolve(variable)?;
        let mut staged = self.duplicate();
        let output = variable.clone();
        staged.define_function("output", move |_, _| Ok(output.clone()));
        let output = staged.invoke_function("output")?;
        staged.evaluate(&output)
    }

    /// Bind `value` to a leaf, dropping every memoized value.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::NotALeaf` for derived variables and
    /// `GraphError::ShapeMismatch` if the leaf has an explicit shape that
    /// `value` does not match.
    pub fn assign(&mut self, variable: &Variable, value: Tensor) -> Result<(), GraphError> {
        let id = self.resolve(variable)?;
        let node = self.node_checked(id)?;
        if !node.is_leaf() {
            return Err(GraphError::NotALeaf(variable.name().to_string()));
        }
        if let Some(shape) = node.explicit_shape() {
            if shape != value.shape() {
                return Err(GraphError::ShapeMismatch {
                    lhs: shape.to_vec(),
                    rhs: value.shape().to_vec(),
                });
            }
        }
        if let Some(record) = self.variables.get_mut(variable.name()) {
            record.materialized = Some(value);
        }
        self.clear_cache();
        Ok(())
    }

    /// Bind zeros of the leaf's shape if it has no value yet.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::NotALeaf` for derived variables and
    /// `GraphError::UnresolvedShape` if the shape is unknown.
    pub fn allocate(&mut self, variable: &Variable) -> Result<(), GraphError> {
        if self.is_allocated(variable) {
            return Ok(());
        }
        let shape = self.shape(variable)?;
        self.assign(variable, Tensor::zeros(&shape))
    }

    /// Whether `variable` is a leaf with a bound value.
    pub fn is_allocated(&self, variable: &Variable) -> bool {
        self.resolve(variable).is_ok() && self.materialized(variable).is_some()
    }

    /// Value bound to a leaf, if any.
    pub fn materialized(&self, variable: &Variable) -> Option<&Tensor> {
        self.variables
            .get(variable.name())
            .filter(|record| record.node == variable.node_id())
            .and_then(|record| record.materialized.as_ref())
    }

    /// Value memoized by the last evaluation that reached `variable`.
    pub fn cached_value(&self, variable: &Variable) -> Option<&Tensor> {
        let id = self.resolve(variable).ok()?;
        self.node(id).and_then(|node| node.cached_value())
    }

    /// Drop every memoized value.
    pub fn clear_cache(&mut self) {
        for node in &mut self.nodes {
            node.cached_value = None;
        }
    }

    /// Leaf bindings by variable name, as passed to function builders.
    pub(crate) fn bindings(&self) -> HashMap<String, Tensor> {
        self.variables
            .iter()
            .filter_map(|(name, record)| {
                record
                    .materialized
                    .as_ref()
                    .map(|value| (name.clone(), value.clone()))
            })
            .collect()
    }
}

fn gather<'a>(
    values: &'a HashMap<NodeId, Tensor>,
    ids: &[NodeId],
) -> Result<Vec<&'a Tensor>, GraphError> {
    ids.iter()
        .map(|id| values.get(id).ok_or(GraphError::MissingValue(id.index())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TensorError;
    use approx::assert_relative_eq;

    fn vector(data: &[f64]) -> Tensor {
        Tensor::from_vec(data.to_vec(), &[data.len()]).unwrap()
    }

    #[test]
    fn test_evaluate_memoizes() {
        let mut g = Graph::new();
        let x = g.var_with_value("x", vector(&[1.0, 2.0])).unwrap();
        let y = g.square(&x).unwrap();
        let z = g.add_scalar(&y, 1.0).unwrap();

        assert!(g.cached_value(&z).is_none());
        let out = g.evaluate(&z).unwrap();
        assert_eq!(out.data(), &[2.0, 5.0]);
        assert_eq!(g.cached_value(&y).unwrap().data(), &[1.0, 4.0]);
        assert_eq!(g.cached_value(&z), Some(&out));
        // Leaves keep their binding, not a memoized copy.
        assert!(g.cached_value(&x).is_none());
    }

    #[test]
    fn test_failed_evaluation_commits_nothing() {
        let mut g = Graph::new();
        let x = g.var_with_value("x", vector(&[1.0, 2.0])).unwrap();
        let zero = g.var_with_value("zero", vector(&[0.0, 1.0])).unwrap();
        let y = g.exp(&x).unwrap();
        let z = g.div(&y, &zero).unwrap();

        assert_eq!(
            g.evaluate(&z),
            Err(GraphError::Tensor(TensorError::DivisionByZero { index: 0 }))
        );
        assert!(g.cached_value(&y).is_none());
        assert!(g.cached_value(&z).is_none());
    }

    #[test]
    fn test_unbound_placeholder() {
        let mut g = Graph::new();
        let p = g.var_with_shape("p", &[2]).unwrap();
        let y = g.neg(&p).unwrap();
        assert_eq!(
            g.evaluate(&y),
            Err(GraphError::UnboundPlaceholder("p".to_string()))
        );
        g.allocate(&p).unwrap();
        assert_eq!(g.evaluate(&y).unwrap().data(), &[-0.0, -0.0]);
    }

    #[test]
    fn test_assign_invalidates_cache() {
        let mut g = Graph::new();
        let x = g.var_with_value("x", vector(&[1.0])).unwrap();
        let y = g.mul_scalar(&x, 3.0).unwrap();
        assert_eq!(g.evaluate(&y).unwrap().data(), &[3.0]);

        g.assign(&x, vector(&[2.0])).unwrap();
        assert!(g.cached_value(&y).is_none());
        assert_eq!(g.evaluate(&y).unwrap().data(), &[6.0]);
    }

    #[test]
    fn test_assign_rejects_derived_and_misshaped() {
        let mut g = Graph::new();
        let x = g.var("x", &[2]).unwrap();
        let y = g.sin(&x).unwrap();
        assert_eq!(
            g.assign(&y, vector(&[1.0, 2.0])),
            Err(GraphError::NotALeaf(y.name().to_string()))
        );
        assert!(matches!(
            g.assign(&x, vector(&[1.0, 2.0, 3.0])),
            Err(GraphError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_allocate() {
        let mut g = Graph::new();
        let w = g.var_with_shape("w", &[2, 2]).unwrap();
        assert!(!g.is_allocated(&w));
        g.allocate(&w).unwrap();
        assert!(g.is_allocated(&w));
        assert_eq!(g.materialized(&w), Some(&Tensor::zeros(&[2, 2])));

        // An existing binding is kept.
        let v = g.var_with_value("v", vector(&[5.0])).unwrap();
        g.allocate(&v).unwrap();
        assert_eq!(g.materialized(&v).unwrap().data(), &[5.0]);

        let p = g.placeholder("p").unwrap();
        assert!(matches!(
            g.allocate(&p),
            Err(GraphError::UnresolvedShape { .. })
        ));
    }

    #[test]
    fn test_in_place_chain_reuses_intermediate() {
        let mut g = Graph::new();
        let x = g.var_with_value("x", vector(&[1.0, 2.0, 3.0])).unwrap();
        let a = g.mul_scalar(&x, 2.0).unwrap();
        let b = g.addi_scalar(&a, 1.0).unwrap();
        let c = g.muli(&b, &x).unwrap();

        assert_eq!(g.evaluate(&c).unwrap().data(), &[3.0, 10.0, 21.0]);
        // Intermediates whose buffers were taken over are not memoized.
        assert!(g.cached_value(&a).is_none());
        assert!(g.cached_value(&b).is_none());
        // The leaf binding is never overwritten.
        assert_eq!(g.materialized(&x).unwrap().data(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_in_place_keeps_shared_operand() {
        let mut g = Graph::new();
        let x = g.var_with_value("x", vector(&[1.0, 2.0])).unwrap();
        let a = g.exp(&x).unwrap();
        let b = g.addi(&a, &a).unwrap();
        let out = g.evaluate(&b).unwrap();
        assert_relative_eq!(out.data()[0], 2.0 * 1.0_f64.exp());
        assert_relative_eq!(out.data()[1], 2.0 * 2.0_f64.exp());
        assert!(g.cached_value(&a).is_some());
    }

    #[test]
    fn test_eval_leaves_graph_untouched() {
        let mut g = Graph::new();
        let x = g.var_with_value("x", vector(&[4.0])).unwrap();
        let y = g.rdiv_scalar(&x, 2.0).unwrap();
        let nodes = g.len();
        assert_eq!(g.eval(&y).unwrap().data(), &[0.5]);
        assert_eq!(g.len(), nodes);
        assert!(g.cached_value(&y).is_none());
        assert!(!g.has_function("output"));
    }
}

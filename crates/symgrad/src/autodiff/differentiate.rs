//! The reverse-mode pass.

use std::collections::{HashMap, HashSet};

use log::{debug, trace};

use crate::error::GraphError;
use crate::graph::{GradientMode, Graph, NodeId, Variable};
use crate::ops::{GradientRule, Op};

/// Append nodes computing the gradient of `root` with respect to every
/// node it depends on, and record them in the nodes' gradient slots.
///
/// The pass seeds `ones_like(root)` and walks the dependency subgraph in
/// reverse topological order, so every consumer of a node has contributed
/// before the node's own rule runs. Gradient slots of the subgraph are
/// reset first; nodes that receive no contribution keep an empty slot.
///
/// Returns the seed node.
///
/// # Errors
///
/// Returns `GraphError::MissingGradientRule` if a node that would receive
/// a gradient has no rule. A failed pass leaves the graph as it was.
pub fn differentiate(graph: &mut Graph, root: NodeId) -> Result<NodeId, GraphError> {
    let order = graph.dependency_order(root, |_| false)?;
    check_rules(graph, root, &order)?;
    debug!(
        "Differentiating node {root} over {} nodes ({:?})",
        order.len(),
        graph.options().gradient_mode
    );

    let checkpoint = graph.len();
    let saved_slots: Vec<(NodeId, Option<NodeId>)> = order
        .iter()
        .map(|&id| (id, graph.nodes[id.index()].gradient))
        .collect();

    match backward(graph, root, &order) {
        Ok(seed) => {
            debug!(
                "Differentiation of node {root} added {} nodes",
                graph.len() - checkpoint
            );
            Ok(seed)
        }
        Err(e) => {
            graph.truncate(checkpoint);
            for (id, slot) in saved_slots {
                graph.nodes[id.index()].gradient = slot;
            }
            Err(e)
        }
    }
}

/// Fail before emitting anything if gradient would flow into an op with
/// no rule.
fn check_rules(graph: &Graph, root: NodeId, order: &[NodeId]) -> Result<(), GraphError> {
    let mut receives: HashSet<NodeId> = HashSet::from([root]);
    for &id in order.iter().rev() {
        if !receives.contains(&id) {
            continue;
        }
        let node = graph.node_checked(id)?;
        let Some(op) = node.op() else { continue };
        match op.gradient_rule() {
            GradientRule::Undefined => {
                return Err(GraphError::MissingGradientRule { op: op.name() });
            }
            GradientRule::Constant => {}
            GradientRule::Differentiable => receives.extend(node.inputs().iter().copied()),
        }
    }
    Ok(())
}

fn backward(graph: &mut Graph, root: NodeId, order: &[NodeId]) -> Result<NodeId, GraphError> {
    let mode = graph.options().gradient_mode;
    for &id in order {
        graph.node_checked_mut(id)?.gradient = None;
    }

    let seed = graph.push_op(Op::OnesLike, &[root])?;
    let mut pending: HashMap<NodeId, NodeId> = HashMap::from([(root, seed)]);

    for &id in order.iter().rev() {
        let Some(upstream) = pending.remove(&id) else {
            trace!("Node {id} receives no gradient");
            continue;
        };
        let node = graph.node_checked_mut(id)?;
        node.gradient = Some(upstream);
        let Some(op) = node.op() else {
            trace!("Reached leaf {id}");
            continue;
        };
        trace!("Applying gradient rule of `{op}` at node {id}");

        let inputs = graph.node_inputs(id)?;
        let contributions = op.build_gradient(graph, id, upstream)?;
        for (input, contribution) in inputs.into_iter().zip(contributions) {
            let Some(contribution) = contribution else {
                continue;
            };
            let combined = match (mode, pending.get(&input)) {
                (GradientMode::Accumulate, Some(&existing)) => {
                    graph.push_op(Op::Add, &[existing, contribution])?
                }
                _ => contribution,
            };
            pending.insert(input, combined);
        }
    }
    Ok(seed)
}

impl Graph {
    /// Differentiate `variable`, recording gradients on every node it
    /// depends on. Returns the gradient of `variable` itself.
    ///
    /// # Errors
    ///
    /// Same as [`differentiate`].
    pub fn differentiate(&mut self, variable: &Variable) -> Result<Variable, GraphError> {
        let root = self.resolve(variable)?;
        differentiate(self, root)?;
        self.gradient_variable(variable, root)
    }

    /// Gradient of the last differentiation pass with respect to
    /// `variable`, registered as `"<name>-grad"` on first request.
    ///
    /// Returns `None` if no pass has reached `variable`.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::UnknownVariable` for handles from other graphs.
    pub fn gradient(&mut self, variable: &Variable) -> Result<Option<Variable>, GraphError> {
        let id = self.resolve(variable)?;
        match self.node_checked(id)?.gradient() {
            Some(_) => self.gradient_variable(variable, id).map(Some),
            None => Ok(None),
        }
    }

    /// [`Graph::gradient`] by variable name.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::UnknownVariable` if no variable has that name.
    pub fn get_gradient(&mut self, name: &str) -> Result<Option<Variable>, GraphError> {
        let variable = self
            .variable(name)
            .ok_or_else(|| GraphError::UnknownVariable(name.to_string()))?;
        self.gradient(&variable)
    }

    fn gradient_variable(&mut self, variable: &Variable, id: NodeId) -> Result<Variable, GraphError> {
        let grad_node = self
            .node_checked(id)?
            .gradient()
            .ok_or_else(|| GraphError::UnknownVariable(format!("{}-grad", variable.name())))?;

        let known = self
            .variables
            .get(variable.name())
            .and_then(|record| record.gradient_variable.clone());
        if let Some(name) = known {
            if let Some(record) = self.variables.get_mut(&name) {
                // A later pass moved the gradient; follow it.
                record.node = grad_node;
                self.node_names.entry(grad_node).or_insert_with(|| name.clone());
                return Ok(Variable::new(name, grad_node));
            }
        }

        let name = self.unique_name(format!("{}-grad", variable.name()), grad_node);
        self.register(name.clone(), grad_node, None);
        if let Some(record) = self.variables.get_mut(variable.name()) {
            record.gradient_variable = Some(name.clone());
        }
        Ok(Variable::new(name, grad_node))
    }
}

//! Symbolic computation graph.
//!
//! A [`Graph`] owns an arena of [`Node`]s indexed by [`NodeId`], a table of
//! named [`Variable`]s and a table of function definitions. Inputs are
//! stored as ids, so a node may feed any number of consumers without
//! shared ownership.
//!
//! # Example
//!
//! ```
//! use symgrad::{Graph, Tensor};
//!
//! let mut g = Graph::new();
//! let x = g.var_with_value("x", Tensor::scalar(2.0)).unwrap();
//! let w = g.var_with_value("w", Tensor::scalar(3.0)).unwrap();
//! let y = g.mul(&x, &w).unwrap();
//!
//! assert_eq!(g.eval(&y).unwrap().item().unwrap(), 6.0);
//!
//! g.differentiate(&y).unwrap();
//! let dx = g.gradient(&x).unwrap().unwrap();
//! assert_eq!(g.eval(&dx).unwrap().item().unwrap(), 3.0);
//! ```

mod builders;
mod eval;
mod function;
mod node;
mod options;
pub mod shape;
mod topo;
mod variable;

use std::collections::HashMap;
use std::fmt::Debug;

use log::debug;

use crate::error::GraphError;
use crate::ops::Op;
use crate::tensor::Tensor;

pub use function::FunctionDefinition;
pub use node::{Inputs, Node, NodeId};
pub use options::{GradientMode, GraphOptions};
pub use variable::Variable;
pub(crate) use variable::VariableRecord;

/// Arena-backed computation graph.
///
/// Cloning a graph is [`Graph::duplicate`]: every node, binding and
/// memoized value is copied, only the immutable function builders are
/// shared.
#[derive(Clone, Default)]
pub struct Graph {
    pub(crate) nodes: Vec<Node>,
    pub(crate) variables: HashMap<String, VariableRecord>,
    /// First name registered for each node.
    pub(crate) node_names: HashMap<NodeId, String>,
    pub(crate) functions: HashMap<String, FunctionDefinition>,
    pub(crate) options: GraphOptions,
}

impl Graph {
    /// Create a new empty graph with default options.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: GraphOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> GraphOptions {
        self.options
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get node by ID.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get all nodes.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Look up a registered variable by name.
    pub fn variable(&self, name: &str) -> Option<Variable> {
        self.variables
            .get(name)
            .map(|record| Variable::new(name, record.node))
    }

    /// Names of all registered variables, in no particular order.
    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    /// Node behind `variable`, checking that the handle belongs here.
    pub(crate) fn resolve(&self, variable: &Variable) -> Result<NodeId, GraphError> {
        match self.variables.get(variable.name()) {
            Some(record) if record.node == variable.node_id() => Ok(record.node),
            _ => Err(GraphError::UnknownVariable(variable.name().to_string())),
        }
    }

    pub(crate) fn node_checked(&self, id: NodeId) -> Result<&Node, GraphError> {
        self.nodes
            .get(id.index())
            .ok_or(GraphError::InvalidNode(id.index()))
    }

    pub(crate) fn node_checked_mut(&mut self, id: NodeId) -> Result<&mut Node, GraphError> {
        self.nodes
            .get_mut(id.index())
            .ok_or(GraphError::InvalidNode(id.index()))
    }

    pub(crate) fn node_inputs(&self, id: NodeId) -> Result<Inputs, GraphError> {
        Ok(self.node_checked(id)?.inputs.clone())
    }

    /// Display name of a node: its variable name, or `#id` for internal
    /// nodes.
    pub(crate) fn display_name(&self, id: NodeId) -> String {
        self.node_names
            .get(&id)
            .cloned()
            .unwrap_or_else(|| format!("#{id}"))
    }

    /// Value bound to a leaf node.
    pub(crate) fn leaf_value(&self, id: NodeId) -> Option<&Tensor> {
        self.node_names
            .get(&id)
            .and_then(|name| self.variables.get(name))
            .and_then(|record| record.materialized.as_ref())
    }

    fn next_id(&self) -> NodeId {
        NodeId(self.nodes.len())
    }

    pub(crate) fn register(&mut self, name: String, node: NodeId, materialized: Option<Tensor>) {
        self.node_names.entry(node).or_insert_with(|| name.clone());
        self.variables
            .insert(name, VariableRecord::new(node, materialized));
    }

    /// `base`, or `base` suffixed with the node id if already taken.
    pub(crate) fn unique_name(&self, base: String, node: NodeId) -> String {
        let mut name = base;
        while self.variables.contains_key(&name) {
            name = format!("{name}_{node}");
        }
        name
    }

    /// Create a leaf, failing if the name is taken.
    pub(crate) fn add_leaf(
        &mut self,
        name: &str,
        explicit_shape: Option<Vec<usize>>,
        value: Option<Tensor>,
    ) -> Result<Variable, GraphError> {
        if self.variables.contains_key(name) {
            return Err(GraphError::DuplicateVariable(name.to_string()));
        }
        let id = self.next_id();
        self.nodes.push(Node::leaf(id, explicit_shape));
        self.register(name.to_string(), id, value);
        debug!("Registered leaf `{name}` as node {id}");
        Ok(Variable::new(name, id))
    }

    /// Append an op node without registering a variable for it.
    ///
    /// Arity is checked against the registry. The output shape is inferred
    /// from the inputs' stored shapes, so appending does not walk the
    /// graph; only inputs that depend on a placeholder are resolved, and
    /// validation is deferred while any of them is unbound.
    pub(crate) fn push_op(&mut self, op: Op, inputs: &[NodeId]) -> Result<NodeId, GraphError> {
        op.check_arity(inputs.len())?;
        let mut shapes = Vec::with_capacity(inputs.len());
        let mut fixed = true;
        for &input in inputs {
            if let Some(shape) = self.node_checked(input)?.shape() {
                shapes.push(shape.to_vec());
                continue;
            }
            fixed = false;
            match self.resolve_shape(input) {
                Ok(shape) => shapes.push(shape),
                Err(GraphError::UnresolvedShape { .. }) => {}
                Err(e) => return Err(e),
            }
        }
        let shape = if shapes.len() == inputs.len() {
            let shapes: Vec<&[usize]> = shapes.iter().map(Vec::as_slice).collect();
            Some(op.infer_shape(&shapes)?)
        } else {
            None
        };
        let id = self.next_id();
        self.nodes.push(Node::apply(id, op, inputs, shape.filter(|_| fixed)));
        Ok(id)
    }

    /// Apply `op` to variables and register the result under a generated
    /// name such as `add(x,y)`.
    pub(crate) fn add_op(
        &mut self,
        op: Op,
        inputs: &[&Variable],
        in_place: bool,
    ) -> Result<Variable, GraphError> {
        self.add_named_op(None, op, inputs, in_place)
    }

    /// Apply `op` to variables and register the result as `name`, or under
    /// a generated name when `name` is `None`.
    ///
    /// Generated names spell out the op and the names of its inputs; an
    /// input that itself carries a generated name appears as `#id`, so
    /// names stay short along long chains.
    pub(crate) fn add_named_op(
        &mut self,
        name: Option<&str>,
        op: Op,
        inputs: &[&Variable],
        in_place: bool,
    ) -> Result<Variable, GraphError> {
        if let Some(taken) = name.filter(|name| self.variables.contains_key(*name)) {
            return Err(GraphError::DuplicateVariable(taken.to_string()));
        }
        let ids = inputs
            .iter()
            .map(|v| self.resolve(v))
            .collect::<Result<Vec<_>, _>>()?;
        let id = self.push_op(op, &ids)?;
        self.node_checked_mut(id)?.in_place = in_place;

        let (name, generated) = match name {
            Some(name) => (name.to_string(), false),
            None => {
                let args: Vec<String> = inputs.iter().map(|v| self.argument_name(v)).collect();
                let base = format!("{}({})", op.name(), args.join(","));
                (self.unique_name(base, id), true)
            }
        };
        self.register(name.clone(), id, None);
        if let Some(record) = self.variables.get_mut(&name) {
            record.generated = generated;
        }
        Ok(Variable::new(name, id))
    }

    fn argument_name(&self, variable: &Variable) -> String {
        match self.variables.get(variable.name()) {
            Some(record) if record.generated => format!("#{}", record.node),
            _ => variable.name().to_string(),
        }
    }

    /// Register `variable` under `new_name`, releasing its current name.
    ///
    /// Bindings, gradient links and function builders that look the
    /// variable up by name see the new name; handles carrying the old name
    /// stop resolving.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::DuplicateVariable` if `new_name` is taken and
    /// `GraphError::UnknownVariable` for handles from other graphs.
    pub fn rename(&mut self, variable: &Variable, new_name: &str) -> Result<Variable, GraphError> {
        let id = self.resolve(variable)?;
        let old_name = variable.name();
        if old_name == new_name {
            return Ok(variable.clone());
        }
        if self.variables.contains_key(new_name) {
            return Err(GraphError::DuplicateVariable(new_name.to_string()));
        }
        let mut record = self
            .variables
            .remove(old_name)
            .ok_or_else(|| GraphError::UnknownVariable(old_name.to_string()))?;
        record.generated = false;
        self.variables.insert(new_name.to_string(), record);

        if self.node_names.get(&id).map(String::as_str) == Some(old_name) {
            self.node_names.insert(id, new_name.to_string());
        }
        for record in self.variables.values_mut() {
            if record.gradient_variable.as_deref() == Some(old_name) {
                record.gradient_variable = Some(new_name.to_string());
            }
        }
        debug!("Renamed `{old_name}` to `{new_name}`");
        Ok(Variable::new(new_name, id))
    }

    /// Deep copy with the same node ids and variable names.
    ///
    /// Memoized values, gradient slots and bindings are copied, never
    /// shared, so the copy can be evaluated or differentiated (on another
    /// thread, if need be) without touching `self`.
    pub fn duplicate(&self) -> Graph {
        debug!(
            "Duplicating graph with {} nodes and {} variables",
            self.nodes.len(),
            self.variables.len()
        );
        self.clone()
    }

    /// Drop nodes appended after `len`, restoring an earlier arena.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.nodes.truncate(len);
    }
}

impl Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("num_nodes", &self.nodes.len())
            .field("num_variables", &self.variables.len())
            .field("num_functions", &self.functions.len())
            .field("options", &self.options)
            .finish()
    }
}

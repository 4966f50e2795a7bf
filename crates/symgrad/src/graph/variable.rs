//! Named handles onto graph nodes.

use crate::graph::NodeId;
use crate::tensor::Tensor;

/// User-facing handle onto a node of a [`Graph`](crate::Graph).
///
/// A `Variable` is a lightweight, cloneable key; the graph owns the node
/// and any bound value. Because duplication preserves names and ids, a
/// handle taken from a graph also addresses the same node in its
/// duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variable {
    name: String,
    node: NodeId,
}

impl Variable {
    pub(crate) fn new(name: impl Into<String>, node: NodeId) -> Self {
        Self {
            name: name.into(),
            node,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn node_id(&self) -> NodeId {
        self.node
    }
}

impl std::fmt::Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Per-name state kept in the graph's variable table.
#[derive(Debug, Clone)]
pub(crate) struct VariableRecord {
    pub(crate) node: NodeId,
    /// Bound value; only leaves carry one.
    pub(crate) materialized: Option<Tensor>,
    /// Name of the lazily registered gradient variable.
    pub(crate) gradient_variable: Option<String>,
    /// Name was derived from the op and its inputs rather than chosen.
    pub(crate) generated: bool,
}

impl VariableRecord {
    pub(crate) fn new(node: NodeId, materialized: Option<Tensor>) -> Self {
        Self {
            node,
            materialized,
            gradient_variable: None,
            generated: false,
        }
    }
}

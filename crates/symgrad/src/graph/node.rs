//! Graph nodes.

use smallvec::SmallVec;

use crate::ops::Op;
use crate::tensor::Tensor;

/// Unique identifier for a node: its index in the owning graph's arena.
///
/// Duplicated graphs keep ids, so an id names the same node in a graph and
/// in all of its duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Get the internal index.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered input list; nearly every op takes one or two inputs.
pub type Inputs = SmallVec<[NodeId; 2]>;

/// A vertex of the computation graph: a leaf, or an op applied to earlier
/// nodes.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) op: Option<Op>,
    pub(crate) inputs: Inputs,
    pub(crate) explicit_shape: Option<Vec<usize>>,
    /// Shape fixed at construction; `None` while it depends on a
    /// placeholder.
    pub(crate) shape: Option<Vec<usize>>,
    /// d(root)/d(this node), set by the last differentiation pass.
    pub(crate) gradient: Option<NodeId>,
    pub(crate) cached_value: Option<Tensor>,
    /// Forward evaluation may overwrite the first input's buffer.
    pub(crate) in_place: bool,
}

impl Node {
    pub(crate) fn leaf(id: NodeId, explicit_shape: Option<Vec<usize>>) -> Self {
        Self {
            id,
            op: None,
            inputs: Inputs::new(),
            shape: explicit_shape.clone(),
            explicit_shape,
            gradient: None,
            cached_value: None,
            in_place: false,
        }
    }

    pub(crate) fn apply(
        id: NodeId,
        op: Op,
        inputs: &[NodeId],
        shape: Option<Vec<usize>>,
    ) -> Self {
        Self {
            id,
            op: Some(op),
            inputs: Inputs::from_slice(inputs),
            explicit_shape: None,
            shape,
            gradient: None,
            cached_value: None,
            in_place: false,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn op(&self) -> Option<Op> {
        self.op
    }

    /// Registry name of the op, empty for leaves.
    pub fn op_name(&self) -> &'static str {
        self.op.map_or("", |op| op.name())
    }

    pub fn inputs(&self) -> &[NodeId] {
        &self.inputs
    }

    pub fn is_leaf(&self) -> bool {
        self.op.is_none()
    }

    pub fn explicit_shape(&self) -> Option<&[usize]> {
        self.explicit_shape.as_deref()
    }

    /// Shape known without evaluation: the declared shape of a leaf, or
    /// the inferred shape of an op whose inputs all have one.
    pub fn shape(&self) -> Option<&[usize]> {
        self.shape.as_deref()
    }

    /// Gradient node recorded by the last differentiation pass.
    pub fn gradient(&self) -> Option<NodeId> {
        self.gradient
    }

    /// Value memoized by forward evaluation.
    pub fn cached_value(&self) -> Option<&Tensor> {
        self.cached_value.as_ref()
    }

    pub fn is_in_place(&self) -> bool {
        self.in_place
    }
}

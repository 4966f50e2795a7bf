//! Error types for symgrad.

use thiserror::Error;

/// Errors raised by the dense tensor collaborator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TensorError {
    /// Data length does not match the element count of a shape.
    #[error("shape mismatch: expected {expected} elements, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// Two operands cannot be combined elementwise.
    #[error("cannot broadcast shape {lhs:?} with shape {rhs:?}")]
    BroadcastMismatch { lhs: Vec<usize>, rhs: Vec<usize> },

    /// Divisor holds a zero element.
    #[error("division by zero at linear index {index}")]
    DivisionByZero { index: usize },

    /// Wrong number of indices provided.
    #[error("wrong number of indices: expected {expected}, got {actual}")]
    WrongNumberOfIndices { expected: usize, actual: usize },

    /// Index out of bounds.
    #[error("index out of bounds: index {index} is out of range for dimension {dim_size}")]
    IndexOutOfBounds { index: usize, dim_size: usize },

    /// Invalid permutation.
    #[error("invalid permutation {perm:?} for tensor with {ndim} dimensions")]
    InvalidPermutation { perm: Vec<usize>, ndim: usize },

    /// Operation requires specific tensor rank.
    #[error("expected tensor of rank {expected}, got rank {actual}")]
    RankMismatch { expected: usize, actual: usize },

    /// Generic invalid operation.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
}

/// Errors raised while building, differentiating or evaluating a graph.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// Operand shapes are incompatible under the scalar-broadcast rule.
    #[error("shape mismatch: {lhs:?} is not compatible with {rhs:?}")]
    ShapeMismatch { lhs: Vec<usize>, rhs: Vec<usize> },

    /// Differentiation reached an op that declares no gradient rule.
    #[error("op `{op}` has no gradient rule")]
    MissingGradientRule { op: &'static str },

    /// A shape was requested before it could be determined.
    #[error("unable to infer the shape of `{name}`")]
    UnresolvedShape { name: String },

    /// Name lookup failed in the variable table.
    #[error("unknown variable `{0}`")]
    UnknownVariable(String),

    /// Name lookup failed in the function-definition table.
    #[error("unknown function `{0}`")]
    UnknownFunction(String),

    /// A user-supplied variable name is already registered.
    #[error("variable `{0}` is already defined")]
    DuplicateVariable(String),

    /// Forward evaluation reached a leaf with no bound value.
    #[error("placeholder `{0}` has no bound value")]
    UnboundPlaceholder(String),

    /// A value was assigned to a derived variable.
    #[error("variable `{0}` is derived and cannot be assigned a value")]
    NotALeaf(String),

    /// An op was applied to the wrong number of inputs.
    #[error("op `{op}` expects {expected} inputs, got {actual}")]
    ArityMismatch {
        op: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A node id does not name a node of this graph.
    #[error("node {0} is not in the graph")]
    InvalidNode(usize),

    /// Evaluation reached a node whose input value was never computed.
    #[error("no value computed for node {0}")]
    MissingValue(usize),

    /// The dependency subgraph is not acyclic.
    #[error("cycle detected at node {0}")]
    Cycle(usize),

    /// Failure reported by the tensor collaborator.
    #[error(transparent)]
    Tensor(#[from] TensorError),
}

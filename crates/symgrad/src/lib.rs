//! symgrad - symbolic computation graphs with reverse-mode autodiff
//!
//! Build a graph of tensor operations over named variables, evaluate it
//! lazily, and synthesize gradient subgraphs with the chain rule.
//!
//! # Architecture
//!
//! ```text
//! Level 1: Graph API (graph, autodiff modules)
//!     → var / placeholder, add / mul / sin / mmul ..., eval, differentiate
//!
//! Level 2: Op rules (ops module)
//!     → closed Op enum + static registry: value, local gradient,
//!       symbolic gradient
//!
//! Level 3: Dense tensors (tensor, operations, backend modules)
//!     → column-major Tensor<ElT>, elementwise kernels, faer matmul
//! ```
//!
//! # Example
//!
//! ```
//! use symgrad::{Graph, Tensor};
//!
//! let mut g = Graph::new();
//! let x = g.var_with_value("x", Tensor::from_vec(vec![1.0, 2.0], &[2]).unwrap()).unwrap();
//! let y = g.square(&x).unwrap();
//! let loss = g.sum(&y).unwrap();
//!
//! assert_eq!(g.eval(&loss).unwrap().data(), &[5.0]);
//!
//! g.differentiate(&loss).unwrap();
//! let dx = g.gradient(&x).unwrap().unwrap();
//! assert_eq!(g.eval(&dx).unwrap().data(), &[2.0, 4.0]);
//! ```

pub mod autodiff;
pub mod backend;
pub mod error;
pub mod graph;
pub mod operations;
pub mod ops;
pub mod scalar;
pub mod strides;
pub mod tensor;

pub use error::{GraphError, TensorError};
pub use graph::{GradientMode, Graph, GraphOptions, Node, NodeId, Variable};
pub use ops::Op;
pub use scalar::Scalar;
pub use tensor::Tensor;

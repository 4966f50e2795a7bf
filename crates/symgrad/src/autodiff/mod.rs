//! Reverse-mode differentiation over a [`Graph`](crate::Graph).
//!
//! Differentiation is symbolic: a pass appends gradient nodes to the same
//! graph and records, in each visited node's `gradient` slot, the node
//! holding d(root)/d(node). Gradient nodes are ordinary nodes, so they can
//! be evaluated, duplicated or differentiated again.
//!
//! # Example
//!
//! ```
//! use symgrad::{Graph, Tensor};
//!
//! let mut g = Graph::new();
//! let x = g.var_with_value("x", Tensor::scalar(0.0)).unwrap();
//! let y = g.sin(&x).unwrap();
//!
//! g.differentiate(&y).unwrap();
//! let dx = g.gradient(&x).unwrap().unwrap();
//! assert_eq!(dx.name(), "x-grad");
//! assert_eq!(g.eval(&dx).unwrap().item().unwrap(), 1.0);
//! ```
//!
//! # Design Notes
//!
//! - Contributions from several consumers are summed (see
//!   [`GradientMode`](crate::GradientMode) for the overwrite option).
//! - Gradient variables are only registered when first requested.

mod differentiate;

pub use differentiate::differentiate;

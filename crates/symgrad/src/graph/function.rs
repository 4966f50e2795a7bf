//! Named function definitions.
//!
//! A function is a builder closure that stages a subgraph in whatever
//! graph it is invoked on and returns the output variable. Builders are
//! shared between a graph and its duplicates, so they must not capture
//! mutable state.

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;

use crate::error::GraphError;
use crate::graph::{Graph, Variable};
use crate::tensor::Tensor;

/// Builder closure stored in a graph's function table.
///
/// Receives the target graph and its leaf bindings by name.
pub type FunctionDefinition = Arc<
    dyn Fn(&mut Graph, &HashMap<String, Tensor>) -> Result<Variable, GraphError> + Send + Sync,
>;

impl Graph {
    /// Register `builder` under `name`, replacing any earlier definition.
    ///
    /// No nodes are created until the function is invoked.
    pub fn define_function<F>(&mut self, name: &str, builder: F)
    where
        F: Fn(&mut Graph, &HashMap<String, Tensor>) -> Result<Variable, GraphError>
            + Send
            + Sync
            + 'static,
    {
        debug!("Defining function `{name}`");
        self.functions.insert(name.to_string(), Arc::new(builder));
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Run the builder registered here as `name` against `target`, with
    /// `target`'s bindings as inputs.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::UnknownFunction` if no builder is registered,
    /// and propagates the builder's own errors.
    pub fn invoke_function_on(
        &self,
        name: &str,
        target: &mut Graph,
    ) -> Result<Variable, GraphError> {
        let builder = self
            .functions
            .get(name)
            .cloned()
            .ok_or_else(|| GraphError::UnknownFunction(name.to_string()))?;
        run(name, &builder, target)
    }

    /// Run the builder registered as `name` against this graph.
    ///
    /// # Errors
    ///
    /// Same as [`Graph::invoke_function_on`].
    pub fn invoke_function(&mut self, name: &str) -> Result<Variable, GraphError> {
        let builder = self
            .functions
            .get(name)
            .cloned()
            .ok_or_else(|| GraphError::UnknownFunction(name.to_string()))?;
        run(name, &builder, self)
    }
}

fn run(
    name: &str,
    builder: &FunctionDefinition,
    target: &mut Graph,
) -> Result<Variable, GraphError> {
    let inputs = target.bindings();
    debug!(
        "Invoking function `{name}` with {} bound inputs",
        inputs.len()
    );
    let output = builder(target, &inputs)?;
    target.resolve(&output)?;
    Ok(output)
}

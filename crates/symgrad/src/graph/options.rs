//! Graph-wide options.

/// How a differentiation pass combines contributions that reach the same
/// node from several consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GradientMode {
    /// Sum every consumer's contribution (default).
    #[default]
    Accumulate,
    /// Keep only the last contribution written to the slot.
    ///
    /// Underestimates gradients of shared nodes; kept for reproducing
    /// results of graphs built against that behavior.
    Overwrite,
}

/// Options fixed when a graph is created and inherited by its duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GraphOptions {
    pub gradient_mode: GradientMode,
}

impl GraphOptions {
    pub fn with_gradient_mode(mut self, gradient_mode: GradientMode) -> Self {
        self.gradient_mode = gradient_mode;
        self
    }
}

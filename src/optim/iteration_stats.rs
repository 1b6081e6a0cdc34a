use serde::{Deserialize, Serialize};

/// Per-iteration statistics emitted by a `Minimizer`.
///
/// When a `progress_tx` channel is configured in `RunControl`, the minimizer
/// sends one `IterationStats` value after every completed iteration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IterationStats {
    /// 1-based iteration number.
    pub iteration: usize,
    /// Iteration budget for this run.
    pub max_iterations: usize,
    /// Objective value after this iteration.
    pub loss: f64,
    /// Largest absolute gradient entry after this iteration.
    pub gradient_max_abs: f64,
    /// Step length taken along the search direction.
    pub step_size: f64,
    /// Objective evaluations so far, line-search trials included.
    pub evaluations: usize,
    /// Wall-clock duration of this single iteration in milliseconds.
    pub elapsed_ms: u64,
}

pub mod conjugate_gradient;
pub mod gradient_descent;
pub mod iteration_stats;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};

use ndarray::{Array1, ArrayView1};

use crate::error::{NetError, Result};

pub use conjugate_gradient::ConjugateGradient;
pub use gradient_descent::GradientDescent;
pub use iteration_stats::IterationStats;

/// A differentiable scalar function of a flat parameter vector.
pub trait Objective: Sync {
    /// Length of the parameter vector the objective expects.
    fn dim(&self) -> usize;

    /// Returns the loss and its gradient at `params`.
    fn evaluate(&self, params: ArrayView1<f64>) -> Result<(f64, Array1<f64>)>;
}

/// An iterative method that drives an `Objective` towards a local minimum.
///
/// Implementations must stop within `control.max_iterations` iterations and
/// return the best parameters they found, converged or not.
pub trait Minimizer {
    fn name(&self) -> &'static str;

    fn minimize(
        &self,
        objective: &dyn Objective,
        initial: Array1<f64>,
        control: &RunControl,
    ) -> Result<Minimum>;
}

/// Why a minimization run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The largest gradient entry fell below the tolerance.
    Converged,
    /// The iteration budget ran out first.
    BudgetExhausted,
    /// No step along steepest descent decreased the loss any further.
    Stalled,
    /// The stop flag was raised or the progress receiver went away.
    Stopped,
}

/// Outcome of a minimization run.
#[derive(Debug, Clone)]
pub struct Minimum {
    pub params: Array1<f64>,
    pub value: f64,
    pub initial_value: f64,
    pub iterations: usize,
    pub evaluations: usize,
    pub termination: Termination,
}

impl Minimum {
    pub fn converged(&self) -> bool {
        self.termination == Termination::Converged
    }
}

/// Iteration budget, stopping tolerance and optional run monitoring.
///
/// # Fields
/// - `max_iterations`     — upper bound on update steps
/// - `gradient_tolerance` — the run converges once `max |g_i|` is at or below this
/// - `progress_tx`        — optional channel sender; one `IterationStats` is
///                          sent per completed iteration. If the receiver is
///                          dropped the run ends early (clean shutdown).
/// - `stop_flag`          — optional atomic flag; when set to `true` from
///                          another thread the run ends after the current iteration.
#[derive(Debug, Clone)]
pub struct RunControl {
    pub max_iterations: usize,
    pub gradient_tolerance: f64,
    pub progress_tx: Option<mpsc::Sender<IterationStats>>,
    pub stop_flag: Option<Arc<AtomicBool>>,
}

impl RunControl {
    /// Creates a `RunControl` with no progress channel and no stop flag.
    pub fn new(max_iterations: usize, gradient_tolerance: f64) -> Self {
        RunControl {
            max_iterations,
            gradient_tolerance,
            progress_tx: None,
            stop_flag: None,
        }
    }

    pub fn stop_requested(&self) -> bool {
        self.stop_flag
            .as_ref()
            .map_or(false, |flag| flag.load(Ordering::Relaxed))
    }

    /// Sends `stats` to the progress channel. Returns `false` if the receiver
    /// has been dropped.
    pub fn report(&self, stats: IterationStats) -> bool {
        match self.progress_tx {
            Some(ref tx) => tx.send(stats).is_ok(),
            None => true,
        }
    }
}

/// Wraps an objective with the checks every minimizer needs: evaluation
/// counting, gradient length, and finiteness of loss and gradient.
pub(crate) struct Probe<'a> {
    objective: &'a dyn Objective,
    pub evaluations: usize,
}

impl<'a> Probe<'a> {
    pub fn new(objective: &'a dyn Objective, initial: &Array1<f64>) -> Result<Probe<'a>> {
        if initial.len() != objective.dim() {
            return Err(NetError::DimensionMismatch {
                what: "initial parameter vector length",
                expected: objective.dim(),
                actual: initial.len(),
            });
        }
        Ok(Probe { objective, evaluations: 0 })
    }

    pub fn evaluate(&mut self, params: &Array1<f64>, iteration: usize) -> Result<(f64, Array1<f64>)> {
        self.evaluations += 1;
        let (value, gradient) = self.objective.evaluate(params.view())?;
        if gradient.len() != params.len() {
            return Err(NetError::OptimizationFailure {
                iteration,
                reason: format!(
                    "objective returned a gradient of length {} for {} parameters",
                    gradient.len(),
                    params.len()
                ),
            });
        }
        if !value.is_finite() {
            return Err(NetError::NumericInstability { what: "loss", iteration });
        }
        if gradient.iter().any(|g| !g.is_finite()) {
            return Err(NetError::NumericInstability { what: "gradient", iteration });
        }
        Ok((value, gradient))
    }
}

/// Largest absolute entry, the infinity norm.
pub(crate) fn max_abs(v: &Array1<f64>) -> f64 {
    v.iter().fold(0.0, |acc, x| acc.max(x.abs()))
}

#[cfg(test)]
pub(crate) mod test_objectives {
    use super::*;

    /// f(x) = 0.5 * sum(scale_i * (x_i - target_i)^2)
    pub struct Quadratic {
        pub target: Array1<f64>,
        pub scale: Array1<f64>,
    }

    impl Objective for Quadratic {
        fn dim(&self) -> usize {
            self.target.len()
        }

        fn evaluate(&self, params: ArrayView1<f64>) -> Result<(f64, Array1<f64>)> {
            let diff = &params - &self.target;
            let grad = &self.scale * &diff;
            Ok((0.5 * grad.dot(&diff), grad))
        }
    }

    /// Returns a gradient one entry too short.
    pub struct Truncated;

    impl Objective for Truncated {
        fn dim(&self) -> usize {
            3
        }

        fn evaluate(&self, params: ArrayView1<f64>) -> Result<(f64, Array1<f64>)> {
            Ok((params.sum(), Array1::ones(2)))
        }
    }

    /// Returns NaN once any parameter leaves [-1, 1].
    pub struct Blowup;

    impl Objective for Blowup {
        fn dim(&self) -> usize {
            2
        }

        fn evaluate(&self, params: ArrayView1<f64>) -> Result<(f64, Array1<f64>)> {
            if params.iter().any(|x| x.abs() > 1.0) {
                return Ok((f64::NAN, Array1::zeros(2)));
            }
            Ok((-params.sum(), Array1::from_elem(2, -1.0)))
        }
    }
    /// Finite loss, NaN gradient.
    pub struct NanGradient;

    impl Objective for NanGradient {
        fn dim(&self) -> usize {
            2
        }

        fn evaluate(&self, params: ArrayView1<f64>) -> Result<(f64, Array1<f64>)> {
            Ok((params.sum(), Array1::from_elem(2, f64::NAN)))
        }
    }

    /// f(x) = 0.5 * |x|^2 but reports the gradient with its sign flipped, so
    /// every claimed descent direction goes uphill.
    pub struct Uphill;

    impl Objective for Uphill {
        fn dim(&self) -> usize {
            4
        }

        fn evaluate(&self, params: ArrayView1<f64>) -> Result<(f64, Array1<f64>)> {
            Ok((0.5 * params.dot(&params), params.mapv(|x| -x)))
        }
    }
}

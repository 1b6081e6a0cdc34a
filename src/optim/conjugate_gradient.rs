use std::time::Instant;

use ndarray::Array1;
use tracing::{debug, warn};

use crate::error::Result;
use crate::optim::{max_abs, IterationStats, Minimizer, Minimum, Objective, Probe, RunControl, Termination};

/// Nonlinear conjugate gradient (Polak–Ribière+) with an Armijo line search.
///
/// The line search backtracks with safeguarded quadratic interpolation until
/// the sufficient-decrease condition holds, then makes one interpolation
/// step towards the line minimum (or doubles the step while the loss keeps
/// falling). Every accepted step strictly lowers the objective, so the
/// returned parameters are always the best seen.
#[derive(Debug, Clone)]
pub struct ConjugateGradient {
    /// Sufficient-decrease constant `c1` of the Armijo condition.
    pub armijo: f64,
    /// Trial steps allowed while backtracking before the search fails.
    pub max_line_search_steps: usize,
    /// Doublings tried when the loss along the line shows no curvature yet.
    pub max_expansions: usize,
    /// Cap on how far one interpolation step may extrapolate, as a multiple
    /// of the accepted step.
    pub max_growth: f64,
}

impl Default for ConjugateGradient {
    fn default() -> Self {
        ConjugateGradient {
            armijo: 1e-4,
            max_line_search_steps: 40,
            max_expansions: 10,
            max_growth: 10.0,
        }
    }
}

/// A point on the search line with its loss and gradient.
struct Step {
    alpha: f64,
    params: Array1<f64>,
    value: f64,
    gradient: Array1<f64>,
}

impl ConjugateGradient {
    fn trial(
        &self,
        probe: &mut Probe,
        params: &Array1<f64>,
        direction: &Array1<f64>,
        alpha: f64,
        iteration: usize,
    ) -> Result<Step> {
        let candidate = params + &(alpha * direction);
        let (value, gradient) = probe.evaluate(&candidate, iteration)?;
        Ok(Step { alpha, params: candidate, value, gradient })
    }

    fn sufficient_decrease(&self, value: f64, slope: f64, step: &Step) -> bool {
        step.value < value && step.value <= value + self.armijo * step.alpha * slope
    }

    /// Line search along `direction` from `params`.
    ///
    /// `slope` is the directional derivative `g · d` and must be negative.
    /// Returns `None` when backtracking runs out of trials.
    #[allow(clippy::too_many_arguments)]
    fn line_search(
        &self,
        probe: &mut Probe,
        params: &Array1<f64>,
        value: f64,
        direction: &Array1<f64>,
        slope: f64,
        initial_alpha: f64,
        iteration: usize,
    ) -> Result<Option<Step>> {
        // ── Backtracking ───────────────────────────────────────────────────
        let mut alpha = initial_alpha;
        let mut trials = 0;
        let mut accepted = loop {
            if trials == self.max_line_search_steps {
                return Ok(None);
            }
            trials += 1;
            let step = self.trial(probe, params, direction, alpha, iteration)?;
            if self.sufficient_decrease(value, slope, &step) {
                break step;
            }
            alpha = match interpolated_alpha(value, slope, &step) {
                Some(model) => model.clamp(0.1 * alpha, 0.5 * alpha),
                None => 0.5 * alpha,
            };
        };

        // ── Refinement ─────────────────────────────────────────────────────
        match interpolated_alpha(value, slope, &accepted) {
            Some(model) => {
                let model = model.min(self.max_growth * accepted.alpha);
                if (model - accepted.alpha).abs() > 0.1 * accepted.alpha {
                    let step = self.trial(probe, params, direction, model, iteration)?;
                    if self.sufficient_decrease(value, slope, &step) && step.value < accepted.value {
                        accepted = step;
                    }
                }
            }
            None => {
                for _ in 0..self.max_expansions {
                    let step = self.trial(probe, params, direction, 2.0 * accepted.alpha, iteration)?;
                    if self.sufficient_decrease(value, slope, &step) && step.value < accepted.value {
                        accepted = step;
                    } else {
                        break;
                    }
                }
            }
        }

        Ok(Some(accepted))
    }
}

/// Minimizer of the quadratic through `(0, value)` with derivative `slope`
/// and through `(step.alpha, step.value)`. `None` if that quadratic is not
/// convex.
fn interpolated_alpha(value: f64, slope: f64, step: &Step) -> Option<f64> {
    let curvature = step.value - value - slope * step.alpha;
    if curvature > 0.0 {
        Some(-slope * step.alpha * step.alpha / (2.0 * curvature))
    } else {
        None
    }
}

impl Minimizer for ConjugateGradient {
    fn name(&self) -> &'static str {
        "conjugate-gradient"
    }

    fn minimize(
        &self,
        objective: &dyn Objective,
        initial: Array1<f64>,
        control: &RunControl,
    ) -> Result<Minimum> {
        let mut probe = Probe::new(objective, &initial)?;
        let mut params = initial;
        let (mut value, mut gradient) = probe.evaluate(&params, 0)?;
        let initial_value = value;

        let mut direction = gradient.mapv(|g| -g);
        let mut grad_sq = gradient.dot(&gradient);
        let mut alpha = 1.0 / grad_sq.sqrt().max(f64::MIN_POSITIVE);
        let mut iterations = 0;

        let mut termination = if max_abs(&gradient) <= control.gradient_tolerance {
            Termination::Converged
        } else {
            Termination::BudgetExhausted
        };

        while termination == Termination::BudgetExhausted && iterations < control.max_iterations {
            if control.stop_requested() {
                termination = Termination::Stopped;
                break;
            }
            let t_start = Instant::now();
            let iteration = iterations + 1;

            let mut slope = gradient.dot(&direction);
            let mut steepest = false;
            if slope >= 0.0 {
                // Not a descent direction: restart along -g.
                direction = gradient.mapv(|g| -g);
                slope = -grad_sq;
                steepest = true;
            }

            let mut step = self.line_search(&mut probe, &params, value, &direction, slope, alpha, iteration)?;
            if step.is_none() && !steepest {
                debug!(iteration, "line search failed along conjugate direction, restarting");
                direction = gradient.mapv(|g| -g);
                slope = -grad_sq;
                alpha = 1.0 / grad_sq.sqrt().max(f64::MIN_POSITIVE);
                step = self.line_search(&mut probe, &params, value, &direction, slope, alpha, iteration)?;
            }
            let Some(step) = step else {
                warn!(iteration, loss = value, "line search could not decrease the loss");
                termination = Termination::Stalled;
                break;
            };

            // ── Polak–Ribière+ update ──────────────────────────────────────
            let new_grad_sq = step.gradient.dot(&step.gradient);
            let beta = ((new_grad_sq - step.gradient.dot(&gradient)) / grad_sq).max(0.0);
            direction = &direction * beta - &step.gradient;

            // Next initial step: keep the predicted first-order decrease.
            let new_slope = step.gradient.dot(&direction);
            alpha = if new_slope < 0.0 {
                step.alpha * slope / new_slope
            } else {
                1.0 / new_grad_sq.sqrt().max(f64::MIN_POSITIVE)
            };
            if !alpha.is_finite() || alpha <= 0.0 {
                alpha = 1.0;
            }

            params = step.params;
            value = step.value;
            gradient = step.gradient;
            grad_sq = new_grad_sq;
            iterations = iteration;

            let gradient_max_abs = max_abs(&gradient);
            debug!(iteration, loss = value, gradient_max_abs, step = step.alpha, "cg iteration");

            let stats = IterationStats {
                iteration,
                max_iterations: control.max_iterations,
                loss: value,
                gradient_max_abs,
                step_size: step.alpha,
                evaluations: probe.evaluations,
                elapsed_ms: t_start.elapsed().as_millis() as u64,
            };
            if !control.report(stats) {
                termination = Termination::Stopped;
                break;
            }

            if gradient_max_abs <= control.gradient_tolerance {
                termination = Termination::Converged;
            }
        }

        Ok(Minimum {
            params,
            value,
            initial_value,
            iterations,
            evaluations: probe.evaluations,
            termination,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NetError;
    use crate::optim::test_objectives::{Blowup, NanGradient, Quadratic, Truncated, Uphill};
    use approx::assert_relative_eq;
    use ndarray::arr1;
    use std::sync::atomic::AtomicBool;
    use std::sync::{mpsc, Arc};

    fn ill_conditioned() -> Quadratic {
        Quadratic {
            target: arr1(&[1.0, -2.0, 0.5, 3.0]),
            scale: arr1(&[1.0, 10.0, 100.0, 0.5]),
        }
    }

    #[test]
    fn converges_on_a_quadratic() {
        let objective = ill_conditioned();
        let control = RunControl::new(500, 1e-8);
        let min = ConjugateGradient::default()
            .minimize(&objective, Array1::zeros(4), &control)
            .unwrap();
        assert_eq!(min.termination, Termination::Converged);
        for (x, t) in min.params.iter().zip(objective.target.iter()) {
            assert_relative_eq!(x, t, epsilon = 1e-6);
        }
        assert!(min.value < min.initial_value);
    }

    #[test]
    fn budget_bounds_iterations() {
        let objective = ill_conditioned();
        let control = RunControl::new(2, 1e-12);
        let min = ConjugateGradient::default()
            .minimize(&objective, Array1::zeros(4), &control)
            .unwrap();
        assert_eq!(min.iterations, 2);
        assert_eq!(min.termination, Termination::BudgetExhausted);
        assert!(min.value < min.initial_value);
    }

    #[test]
    fn starting_at_the_minimum_converges_immediately() {
        let objective = ill_conditioned();
        let start = objective.target.clone();
        let min = ConjugateGradient::default()
            .minimize(&objective, start, &RunControl::new(10, 1e-9))
            .unwrap();
        assert_eq!(min.iterations, 0);
        assert!(min.converged());
    }

    #[test]
    fn short_gradient_fails_fast() {
        let err = ConjugateGradient::default()
            .minimize(&Truncated, Array1::zeros(3), &RunControl::new(10, 1e-9))
            .unwrap_err();
        assert!(matches!(err, NetError::OptimizationFailure { iteration: 0, .. }));
    }

    #[test]
    fn non_finite_loss_fails_fast() {
        let err = ConjugateGradient::default()
            .minimize(&Blowup, Array1::zeros(2), &RunControl::new(50, 1e-9))
            .unwrap_err();
        assert!(matches!(err, NetError::NumericInstability { what: "loss", .. }));
    }

    #[test]
    fn wrong_initial_length_is_rejected() {
        let err = ConjugateGradient::default()
            .minimize(&ill_conditioned(), Array1::zeros(3), &RunControl::new(10, 1e-9))
            .unwrap_err();
        assert!(matches!(err, NetError::DimensionMismatch { .. }));
    }

    #[test]
    fn stop_flag_ends_the_run() {
        let mut control = RunControl::new(100, 1e-12);
        control.stop_flag = Some(Arc::new(AtomicBool::new(true)));
        let min = ConjugateGradient::default()
            .minimize(&ill_conditioned(), Array1::zeros(4), &control)
            .unwrap();
        assert_eq!(min.termination, Termination::Stopped);
        assert_eq!(min.iterations, 0);
    }

    #[test]
    fn reports_progress_per_iteration() {
        let (tx, rx) = mpsc::channel();
        let mut control = RunControl::new(3, 1e-12);
        control.progress_tx = Some(tx);
        let min = ConjugateGradient::default()
            .minimize(&ill_conditioned(), Array1::zeros(4), &control)
            .unwrap();
        drop(control);
        let stats: Vec<IterationStats> = rx.iter().collect();
        assert_eq!(stats.len(), min.iterations);
        for pair in stats.windows(2) {
            assert!(pair[1].loss < pair[0].loss);
            assert_eq!(pair[1].iteration, pair[0].iteration + 1);
        }
    }

    #[test]
    fn non_finite_gradient_fails_fast() {
        let err = ConjugateGradient::default()
            .minimize(&NanGradient, Array1::zeros(2), &RunControl::new(10, 1e-9))
            .unwrap_err();
        assert!(matches!(err, NetError::NumericInstability { what: "gradient", iteration: 0 }));
    }

    #[test]
    fn stalls_when_no_step_decreases_the_loss() {
        let start = Array1::ones(4);
        let min = ConjugateGradient::default()
            .minimize(&Uphill, start.clone(), &RunControl::new(10, 1e-9))
            .unwrap();
        assert_eq!(min.termination, Termination::Stalled);
        assert_eq!(min.iterations, 0);
        assert_eq!(min.params, start);
        assert_eq!(min.value, min.initial_value);
        // One initial evaluation, then two full line searches (conjugate, then steepest).
        assert_eq!(min.evaluations, 1 + 2 * 40);
    }

    #[test]
    fn dropped_receiver_stops_the_run() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let mut control = RunControl::new(100, 1e-12);
        control.progress_tx = Some(tx);
        let min = ConjugateGradient::default()
            .minimize(&ill_conditioned(), Array1::zeros(4), &control)
            .unwrap();
        assert_eq!(min.termination, Termination::Stopped);
        assert_eq!(min.iterations, 1);
        assert!(min.value < min.initial_value);
    }
}

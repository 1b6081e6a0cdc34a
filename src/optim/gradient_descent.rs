use std::time::Instant;

use ndarray::Array1;
use tracing::debug;

use crate::error::{NetError, Result};
use crate::optim::{max_abs, IterationStats, Minimizer, Minimum, Objective, Probe, RunControl, Termination};

/// Full-batch gradient descent with a fixed learning rate.
///
/// Each iteration applies `params -= learning_rate * gradient`. A fixed step
/// can overshoot, so the best parameters seen are tracked and returned.
#[derive(Debug, Clone)]
pub struct GradientDescent {
    pub learning_rate: f64,
}

impl GradientDescent {
    pub fn new(learning_rate: f64) -> GradientDescent {
        GradientDescent { learning_rate }
    }
}

impl Minimizer for GradientDescent {
    fn name(&self) -> &'static str {
        "gradient-descent"
    }

    fn minimize(
        &self,
        objective: &dyn Objective,
        initial: Array1<f64>,
        control: &RunControl,
    ) -> Result<Minimum> {
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(NetError::InvalidConfig(format!(
                "learning rate must be positive, got {}",
                self.learning_rate
            )));
        }

        let mut probe = Probe::new(objective, &initial)?;
        let mut params = initial;
        let (mut value, mut gradient) = probe.evaluate(&params, 0)?;
        let initial_value = value;
        let mut best = (params.clone(), value);
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

            params.scaled_add(-self.learning_rate, &gradient);
            (value, gradient) = probe.evaluate(&params, iteration)?;
            iterations = iteration;
            if value < best.1 {
                best = (params.clone(), value);
            }

            let gradient_max_abs = max_abs(&gradient);
            debug!(iteration, loss = value, gradient_max_abs, "gd iteration");

            let stats = IterationStats {
                iteration,
                max_iterations: control.max_iterations,
                loss: value,
                gradient_max_abs,
                step_size: self.learning_rate,
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

        let (params, value) = best;
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
    use crate::optim::test_objectives::{Blowup, NanGradient, Quadratic};
    use ndarray::arr1;
    use std::sync::mpsc;

    fn bowl() -> Quadratic {
        Quadratic {
            target: arr1(&[1.0, -2.0, 0.5]),
            scale: arr1(&[1.0, 4.0, 10.0]),
        }
    }

    #[test]
    fn small_steps_reduce_the_loss() {
        let min = GradientDescent::new(0.05)
            .minimize(&bowl(), Array1::zeros(3), &RunControl::new(200, 1e-6))
            .unwrap();
        assert!(min.value < min.initial_value);
        assert!(min.value < 1e-6);
        assert!(min.iterations <= 200);
    }

    #[test]
    fn overshooting_keeps_the_best_point() {
        // 0.5 is past the stable limit 2 / 10 for the stiffest coordinate.
        let min = GradientDescent::new(0.5)
            .minimize(&bowl(), Array1::zeros(3), &RunControl::new(5, 1e-12))
            .unwrap();
        assert!(min.value <= min.initial_value);
        assert_eq!(min.iterations, 5);
        assert_eq!(min.termination, Termination::BudgetExhausted);
    }

    #[test]
    fn non_positive_learning_rate_is_rejected() {
        let err = GradientDescent::new(0.0)
            .minimize(&bowl(), Array1::zeros(3), &RunControl::new(5, 1e-9))
            .unwrap_err();
        assert!(matches!(err, NetError::InvalidConfig(_)));
    }

    #[test]
    fn non_finite_loss_fails_fast() {
        let err = GradientDescent::new(2.0)
            .minimize(&Blowup, Array1::zeros(2), &RunControl::new(10, 1e-9))
            .unwrap_err();
        assert!(matches!(err, NetError::NumericInstability { iteration: 1, .. }));
    }

    #[test]
    fn non_finite_gradient_fails_fast() {
        let err = GradientDescent::new(0.1)
            .minimize(&NanGradient, Array1::zeros(2), &RunControl::new(10, 1e-9))
            .unwrap_err();
        assert!(matches!(err, NetError::NumericInstability { what: "gradient", iteration: 0 }));
    }

    #[test]
    fn dropped_receiver_stops_the_run() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let mut control = RunControl::new(50, 1e-12);
        control.progress_tx = Some(tx);
        let min = GradientDescent::new(0.05)
            .minimize(&bowl(), Array1::zeros(3), &control)
            .unwrap();
        assert_eq!(min.termination, Termination::Stopped);
        assert_eq!(min.iterations, 1);
    }
}

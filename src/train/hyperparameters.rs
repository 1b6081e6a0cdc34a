use serde::{Deserialize, Serialize};

use crate::error::{NetError, Result};
use crate::optim::{ConjugateGradient, GradientDescent, Minimizer};

/// Selects which `Minimizer` fits the weights.
///
/// - `ConjugateGradient` — Polak–Ribière+ with a line search; needs no step size.
/// - `GradientDescent`   — fixed learning rate, mostly useful for comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OptimizerKind {
    ConjugateGradient,
    GradientDescent { learning_rate: f64 },
}

impl Default for OptimizerKind {
    fn default() -> Self {
        OptimizerKind::ConjugateGradient
    }
}

impl OptimizerKind {
    pub fn build(&self) -> Box<dyn Minimizer> {
        match *self {
            OptimizerKind::ConjugateGradient => Box::new(ConjugateGradient::default()),
            OptimizerKind::GradientDescent { learning_rate } => Box::new(GradientDescent::new(learning_rate)),
        }
    }
}

/// Model and optimizer settings for one training run.
///
/// Missing fields in a JSON file take their default values.
///
/// # Fields
/// - `n_hidden`           — hidden units (default 88)
/// - `lambda`             — L2 regularization strength, `>= 0` (default 0.4)
/// - `n_class`            — output classes (default 10)
/// - `max_iterations`     — optimizer iteration budget (default 50)
/// - `gradient_tolerance` — convergence threshold on `max |g_i|` (default 1e-5)
/// - `seed`               — seeds weight initialization and the validation
///                          split; `None` draws from OS entropy
/// - `optimizer`          — which minimizer to use (default conjugate gradient)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hyperparameters {
    pub n_hidden: usize,
    pub lambda: f64,
    pub n_class: usize,
    pub max_iterations: usize,
    pub gradient_tolerance: f64,
    pub seed: Option<u64>,
    pub optimizer: OptimizerKind,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Hyperparameters {
            n_hidden: 88,
            lambda: 0.4,
            n_class: 10,
            max_iterations: 50,
            gradient_tolerance: 1e-5,
            seed: None,
            optimizer: OptimizerKind::default(),
        }
    }
}

impl Hyperparameters {
    pub fn validate(&self) -> Result<()> {
        if self.n_hidden == 0 {
            return Err(NetError::InvalidConfig("n_hidden must be at least 1".into()));
        }
        if self.n_class == 0 {
            return Err(NetError::InvalidConfig("n_class must be at least 1".into()));
        }
        if !(self.lambda.is_finite() && self.lambda >= 0.0) {
            return Err(NetError::InvalidConfig(format!(
                "lambda must be finite and non-negative, got {}",
                self.lambda
            )));
        }
        if !(self.gradient_tolerance.is_finite() && self.gradient_tolerance >= 0.0) {
            return Err(NetError::InvalidConfig(format!(
                "gradient_tolerance must be finite and non-negative, got {}",
                self.gradient_tolerance
            )));
        }
        if let OptimizerKind::GradientDescent { learning_rate } = self.optimizer {
            if !(learning_rate.is_finite() && learning_rate > 0.0) {
                return Err(NetError::InvalidConfig(format!(
                    "learning_rate must be positive, got {learning_rate}"
                )));
            }
        }
        Ok(())
    }

    /// Reads hyperparameters from a JSON file and validates them.
    pub fn load_json(path: &str) -> Result<Hyperparameters> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let hyperparameters: Hyperparameters = serde_json::from_reader(reader)?;
        hyperparameters.validate()?;
        Ok(hyperparameters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_reference_run() {
        let hp = Hyperparameters::default();
        assert_eq!(hp.n_hidden, 88);
        assert_eq!(hp.lambda, 0.4);
        assert_eq!(hp.n_class, 10);
        assert_eq!(hp.max_iterations, 50);
        assert_eq!(hp.optimizer, OptimizerKind::ConjugateGradient);
        assert!(hp.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let hp: Hyperparameters = serde_json::from_str(
            r#"{ "n_hidden": 20, "optimizer": { "kind": "gradient_descent", "learning_rate": 0.5 } }"#,
        )
        .unwrap();
        assert_eq!(hp.n_hidden, 20);
        assert_eq!(hp.lambda, 0.4);
        assert_eq!(hp.optimizer, OptimizerKind::GradientDescent { learning_rate: 0.5 });
        assert_eq!(hp.optimizer.build().name(), "gradient-descent");
    }

    #[test]
    fn rejects_bad_values() {
        let bad = [
            Hyperparameters { n_hidden: 0, ..Default::default() },
            Hyperparameters { n_class: 0, ..Default::default() },
            Hyperparameters { lambda: -0.1, ..Default::default() },
            Hyperparameters { lambda: f64::NAN, ..Default::default() },
            Hyperparameters {
                optimizer: OptimizerKind::GradientDescent { learning_rate: 0.0 },
                ..Default::default()
            },
        ];
        for hp in &bad {
            assert!(matches!(hp.validate(), Err(NetError::InvalidConfig(_))), "{hp:?}");
        }
    }
}

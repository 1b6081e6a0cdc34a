//! `digitnet` command-line interface.
//!
//! - `train`    — load IDX data, hold out a validation split, fit the network,
//!                print accuracies and save the model as JSON
//! - `evaluate` — score a saved model on an IDX image/label pair

use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{info, warn};

use digitnet::{
    data::{holdout, load_idx_pair, DataSplits},
    logging::{setup_logging, verbosity_level},
    optim::IterationStats,
    train::{evaluate, run_experiment, trainer::run_rng, Hyperparameters, OptimizerKind, TrainConfig},
    TrainedModel,
};

#[derive(Parser)]
#[command(name = "digitnet")]
#[command(version)]
#[command(about = "Single-hidden-layer sigmoid network for handwritten digits", long_about = None)]
struct Cli {
    /// Verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a network and report train/validation/test accuracy
    Train {
        /// IDX3 training images
        #[arg(long)]
        train_images: PathBuf,

        /// IDX1 training labels
        #[arg(long)]
        train_labels: PathBuf,

        /// IDX3 test images
        #[arg(long)]
        test_images: PathBuf,

        /// IDX1 test labels
        #[arg(long)]
        test_labels: PathBuf,

        /// Training rows held out for validation
        #[arg(long, default_value_t = 10_000)]
        validation_size: usize,

        /// JSON hyperparameter file; flags below override its values
        #[arg(short, long)]
        config: Option<String>,

        #[command(flatten)]
        overrides: Overrides,

        /// Where to write the trained model
        #[arg(short, long, default_value = "params.json")]
        output: String,
    },

    /// Report the accuracy of a saved model
    Evaluate {
        /// Model JSON written by `train`
        #[arg(short, long)]
        model: String,

        /// IDX3 images
        #[arg(long)]
        images: PathBuf,

        /// IDX1 labels
        #[arg(long)]
        labels: PathBuf,
    },
}

/// Hyperparameter flags; each one set overrides the config file.
#[derive(Args, Default)]
struct Overrides {
    /// Hidden units
    #[arg(long)]
    hidden: Option<usize>,

    /// Regularization strength
    #[arg(long)]
    lambda: Option<f64>,

    /// Optimizer iteration budget
    #[arg(long)]
    max_iter: Option<usize>,

    /// Seed for weight initialization and the validation split
    #[arg(long)]
    seed: Option<u64>,

    /// Optimizer
    #[arg(long, value_enum)]
    optimizer: Option<OptimizerArg>,

    /// Learning rate for gradient descent [default: 0.5, or the config's value]
    #[arg(long)]
    learning_rate: Option<f64>,
}

const DEFAULT_LEARNING_RATE: f64 = 0.5;

impl Overrides {
    fn apply(self, hp: &mut Hyperparameters) -> Result<()> {
        if let Some(n) = self.hidden {
            hp.n_hidden = n;
        }
        if let Some(l) = self.lambda {
            hp.lambda = l;
        }
        if let Some(k) = self.max_iter {
            hp.max_iterations = k;
        }
        if self.seed.is_some() {
            hp.seed = self.seed;
        }

        let configured_rate = match hp.optimizer {
            OptimizerKind::GradientDescent { learning_rate } => Some(learning_rate),
            OptimizerKind::ConjugateGradient => None,
        };
        hp.optimizer = match (self.optimizer, self.learning_rate) {
            (Some(OptimizerArg::Cg), Some(_)) => {
                bail!("--learning-rate only applies to gradient descent, not --optimizer cg")
            }
            (Some(OptimizerArg::Cg), None) => OptimizerKind::ConjugateGradient,
            (Some(OptimizerArg::Gd), rate) => OptimizerKind::GradientDescent {
                learning_rate: rate.or(configured_rate).unwrap_or(DEFAULT_LEARNING_RATE),
            },
            (None, Some(learning_rate)) => match hp.optimizer {
                OptimizerKind::GradientDescent { .. } => OptimizerKind::GradientDescent { learning_rate },
                OptimizerKind::ConjugateGradient => bail!(
                    "--learning-rate needs gradient descent: pass --optimizer gd or select it in --config"
                ),
            },
            (None, None) => hp.optimizer,
        };
        Ok(())
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OptimizerArg {
    /// Conjugate gradient
    Cg,
    /// Fixed-step gradient descent
    Gd,
}

/// Waits for the progress logger. Returns `false` (after a warning) if it panicked.
fn join_progress(progress: thread::JoinHandle<()>) -> bool {
    let finished = progress.join().is_ok();
    if !finished {
        warn!("progress logging thread panicked; some iteration logs may be missing");
    }
    finished
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(verbosity_level(cli.verbose));

    match cli.command {
        Commands::Train {
            train_images,
            train_labels,
            test_images,
            test_labels,
            validation_size,
            config,
            overrides,
            output,
        } => {
            let mut hp = match config {
                Some(path) => Hyperparameters::load_json(&path)
                    .with_context(|| format!("reading hyperparameters from {path}"))?,
                None => Hyperparameters::default(),
            };
            overrides.apply(&mut hp)?;
            hp.validate()?;

            let full_train = load_idx_pair(&train_images, &train_labels)
                .with_context(|| format!("loading {}", train_images.display()))?;
            let test = load_idx_pair(&test_images, &test_labels)
                .with_context(|| format!("loading {}", test_images.display()))?;
            let (train, validation) = holdout(&full_train, validation_size, &mut run_rng(hp.seed))?;
            let splits = DataSplits::new(train, validation, test)?;
            info!(
                train = splits.train.len(),
                validation = splits.validation.len(),
                test = splits.test.len(),
                "data loaded"
            );

            let (tx, rx) = mpsc::channel::<IterationStats>();
            let progress = thread::spawn(move || {
                for stats in rx {
                    info!(
                        "iteration {}/{}  loss {:.6}  max|g| {:.3e}  ({} ms)",
                        stats.iteration, stats.max_iterations, stats.loss, stats.gradient_max_abs, stats.elapsed_ms
                    );
                }
            });

            let mut train_config = TrainConfig::new(hp);
            train_config.progress_tx = Some(tx);
            let report = run_experiment(&splits, &train_config);
            drop(train_config);
            join_progress(progress);
            let report = report?;

            println!("Training set accuracy:   {:.2}%", report.train_accuracy);
            match report.validation_accuracy {
                Some(acc) => println!("Validation set accuracy: {acc:.2}%"),
                None => println!("Validation set accuracy: n/a (no validation rows)"),
            }
            println!("Test set accuracy:       {:.2}%", report.test_accuracy);
            println!(
                "Optimizer: {} iterations, loss {:.6} -> {:.6} ({:?})",
                report.iterations, report.initial_loss, report.final_loss, report.termination
            );

            report
                .model
                .save_json(&output)
                .with_context(|| format!("saving model to {output}"))?;
            println!("Model saved to {output}");
        }

        Commands::Evaluate { model, images, labels } => {
            let trained = TrainedModel::load_json(&model).with_context(|| format!("loading model {model}"))?;
            let network = trained.network()?;
            let data = load_idx_pair(&images, &labels)
                .with_context(|| format!("loading {}", images.display()))?;
            let acc = evaluate(&network, &data)?;
            println!("Accuracy: {acc:.2}% on {} rows", data.len());
        }
    }

    Ok(())
}

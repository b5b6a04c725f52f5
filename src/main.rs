use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tabular_pipeline::steps::download::{self, DownloadOptions};
use tabular_pipeline::steps::evaluate::{self, EvaluateOptions};
use tabular_pipeline::steps::inference_prep::{self, InferencePrepOptions};
use tabular_pipeline::steps::predict::{self, PredictOptions};
use tabular_pipeline::steps::prep::{self, PrepOptions};
use tabular_pipeline::steps::train::{self, TrainOptions};
use tabular_pipeline::{
    logging, InProcessRunner, Pipeline, PipelineConfig, PipelineReport, PredictionSummary,
    RegressionMetrics, SubprocessRunner,
};

#[derive(Parser)]
#[command(name = "tabular-pipeline")]
#[command(author = "Hummer Team")]
#[command(version)]
#[command(about = "Download, split, train, evaluate and score tabular regression data", long_about = None)]
struct Cli {
    /// TOML configuration file (defaults to pipeline.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a dataset file from a GitHub repository, or copy it locally
    Download {
        /// Repository URL, owner/name, or "local"
        #[arg(long)]
        repo: String,

        /// Branch, tag or commit
        #[arg(long = "ref", default_value = "main")]
        git_ref: String,

        /// File path inside the repository
        #[arg(long)]
        path: String,

        /// Output file, or directory receiving the file
        #[arg(long)]
        output: PathBuf,

        /// Base directory for local copies
        #[arg(long, default_value = ".")]
        local_root: PathBuf,
    },

    /// Drop incomplete rows and split features/target into train and test sets
    Prep {
        /// Raw CSV dataset (last column is the target)
        #[arg(long)]
        input: PathBuf,

        /// Directory receiving the split files
        #[arg(long)]
        output: PathBuf,

        /// Held-out fraction, strictly between 0 and 1
        #[arg(long)]
        test_size: Option<f64>,

        /// Shuffle seed
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Fit a linear regression model on prepared training data
    Train {
        /// Directory with X_train.csv and y_train.csv
        #[arg(long)]
        input: PathBuf,

        /// Directory receiving model.arrow and metadata.json
        #[arg(long, alias = "model_output", alias = "model-output")]
        output: PathBuf,
    },

    /// Evaluate a trained model on the held-out test set
    #[command(alias = "evaluate")]
    Test {
        /// Directory with X_test.csv and y_test.csv
        #[arg(long)]
        input: PathBuf,

        /// Model directory or artifact file
        #[arg(long, alias = "model_path", alias = "model-path")]
        model: PathBuf,

        /// Metrics JSON file (defaults to the configured metrics_file)
        #[arg(long)]
        metrics_output: Option<PathBuf>,
    },

    /// Score new data with a trained model
    Predict {
        /// Model directory or artifact file
        #[arg(long)]
        model: PathBuf,

        /// CSV with the model's feature columns
        #[arg(long)]
        input: PathBuf,

        /// Directory receiving predictions.csv and prediction_summary.json
        #[arg(long)]
        output: PathBuf,
    },

    /// Report missing values in raw inference data and drop incomplete rows
    PrepareInference {
        #[arg(long)]
        input: PathBuf,

        #[arg(long)]
        output: PathBuf,
    },

    /// Run prep, train and test in sequence
    Run {
        /// Raw CSV dataset (defaults to the configured input_data)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Artifact root (defaults to the configured output_dir)
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Run every step in a child process
        #[arg(long)]
        isolated: bool,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logging::init();

    let cli = Cli::parse();
    let config = PipelineConfig::load(cli.config.as_deref()).context("failed to load configuration")?;

    match cli.command {
        Commands::Download {
            repo,
            git_ref,
            path,
            output,
            local_root,
        } => {
            let report = download::run(&DownloadOptions {
                repo,
                git_ref,
                path,
                output,
                local_root,
                github_token: std::env::var("GITHUB_TOKEN").ok(),
            })
            .context("download step failed")?;

            println!("Downloaded {} ({} bytes)", report.source, report.bytes);
            println!("Saved to: {}", report.output_file.display());
        }

        Commands::Prep {
            input,
            output,
            test_size,
            seed,
        } => {
            let report = prep::run(&PrepOptions {
                input,
                output_dir: output,
                test_size: test_size.unwrap_or(config.test_size),
                seed: seed.unwrap_or(config.seed),
            })
            .context("prep step failed")?;

            println!("Columns: {:?}", report.columns);
            println!(
                "Loaded {} rows, dropped {} with missing values",
                report.rows_loaded, report.rows_dropped
            );
            println!("Features: {}", report.n_features);
            println!("Train rows: {}", report.train_rows);
            println!("Test rows:  {}", report.test_rows);
            println!("Saved to: {}", report.output_dir.display());
        }

        Commands::Train { input, output } => {
            let report = train::run(&TrainOptions {
                input_dir: input,
                output_dir: output,
            })
            .context("train step failed")?;

            println!("\n=== {} ===", report.metadata.model_type);
            println!("Training samples: {}", report.metadata.n_training_samples);
            println!("Train R2:         {:.4}", report.metadata.train_score);
            println!("Intercept:        {:.4}", report.intercept);
            for (name, coef) in report
                .metadata
                .feature_names
                .iter()
                .zip(&report.coefficients)
            {
                println!("  {:<16} {:.4}", name, coef);
            }
            println!("Model saved to: {}", report.model_file.display());
        }

        Commands::Test {
            input,
            model,
            metrics_output,
        } => {
            let report = evaluate::run(&EvaluateOptions {
                input_dir: input,
                model,
                metrics_file: metrics_output.unwrap_or_else(|| config.metrics_file.clone()),
            })
            .context("test step failed")?;

            print_metrics(&report.metrics);
            println!("Metrics saved to: {}", report.metrics_file.display());
        }

        Commands::Predict {
            model,
            input,
            output,
        } => {
            let report = predict::run(&PredictOptions {
                model,
                input,
                output_dir: output,
            })
            .context("predict step failed")?;

            println!("{}", report.scored.preview(config.preview_rows));
            print_summary(&report.summary);
            println!("Predictions saved to: {}", report.predictions_file.display());
        }

        Commands::PrepareInference { input, output } => {
            let report = inference_prep::run(&InferencePrepOptions {
                input,
                output_dir: output,
            })
            .context("inference data preparation failed")?;

            println!("Columns: {:?}", report.columns);
            for (column, count) in &report.missing {
                println!("  {:<16} {} missing", column, count);
            }
            println!(
                "Rows: {} loaded, {} dropped, {} remaining",
                report.rows_loaded, report.rows_dropped, report.rows_remaining
            );
            println!("Saved to: {}", report.cleaned_file.display());
        }

        Commands::Run {
            input,
            output_dir,
            isolated,
        } => {
            let mut config = config;
            if let Some(input) = input {
                config.input_data = input;
            }
            if let Some(output_dir) = output_dir {
                config.metrics_file = output_dir.join("metrics.json");
                config.output_dir = output_dir;
            }

            let pipeline = Pipeline::from_config(&config);
            let report = if isolated {
                let mut runner = SubprocessRunner::current_exe()
                    .context("cannot locate the running executable")?;
                if let Some(path) = cli.config.as_deref() {
                    runner = runner.with_config(path);
                }
                pipeline.run(&mut runner)
            } else {
                pipeline.run(&mut InProcessRunner)
            }
            .context("pipeline failed")?;

            print_pipeline(&report);
        }
    }

    Ok(())
}

fn print_metrics(metrics: &RegressionMetrics) {
    println!("\n=== Test metrics ({} samples) ===", metrics.n_test_samples);
    println!("MSE:  {:.4}", metrics.mse);
    println!("RMSE: {:.4}", metrics.rmse);
    println!("MAE:  {:.4}", metrics.mae);
    println!("R2:   {:.4}", metrics.r2_score);
}

fn print_summary(summary: &PredictionSummary) {
    println!("\n=== Prediction summary ===");
    println!("Count: {}", summary.n_predictions);
    println!("Mean:  {:.2}", summary.mean_prediction);
    println!("Min:   {:.2}", summary.min_prediction);
    println!("Max:   {:.2}", summary.max_prediction);
    match summary.std_prediction {
        Some(std) => println!("Std:   {:.2}", std),
        None => println!("Std:   n/a"),
    }
}

fn print_pipeline(report: &PipelineReport) {
    println!("\n=== Pipeline completed ===");
    for step in &report.steps_completed {
        println!("[SUCCESS] {}", step);
    }
    println!("Prepared data: {}", report.prep_dir.display());
    println!("Model:         {}", report.train_dir.display());
    println!("Metrics:       {}", report.metrics_file.display());
}

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Serialize;
use tracing::{error, info};

use crate::config::PipelineConfig;
use crate::steps::evaluate::{self, EvaluateOptions};
use crate::steps::prep::{self, PrepOptions};
use crate::steps::train::{self, TrainOptions};
use crate::utils::PipelineError;
use crate::Result;

pub const PREP_OUTPUT_DIR: &str = "prep_output";
pub const TRAIN_OUTPUT_DIR: &str = "train_output";

/// What a pipeline step does, with the options it runs with
#[derive(Debug, Clone)]
pub enum StepKind {
    Prep(PrepOptions),
    Train(TrainOptions),
    Evaluate(EvaluateOptions),
}

/// A named step of the local pipeline
#[derive(Debug, Clone)]
pub struct PipelineStep {
    pub name: &'static str,
    pub kind: StepKind,
}

/// Executes a single pipeline step
pub trait StepRunner {
    fn run_step(&mut self, step: &PipelineStep) -> Result<()>;
}

/// Runs each step by calling the step function directly
#[derive(Debug, Default)]
pub struct InProcessRunner;

impl StepRunner for InProcessRunner {
    fn run_step(&mut self, step: &PipelineStep) -> Result<()> {
        let result = match &step.kind {
            StepKind::Prep(options) => prep::run(options).map(|_| ()),
            StepKind::Train(options) => train::run(options).map(|_| ()),
            StepKind::Evaluate(options) => evaluate::run(options).map(|_| ()),
        };
        result.map_err(|source| PipelineError::StepError {
            step: step.name.to_string(),
            source: Box::new(source),
        })
    }
}

/// Runs each step as a child process of the given executable
///
/// The child receives the subcommand matching the step, so a crash in one
/// step cannot take the runner down with it. Leading arguments (such as
/// `--config <file>`) are passed before the subcommand.
#[derive(Debug, Clone)]
pub struct SubprocessRunner {
    program: PathBuf,
    leading_args: Vec<OsString>,
}

impl SubprocessRunner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }

    /// Add an argument placed before every step's subcommand
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.leading_args.push(arg.into());
        self
    }

    /// Forward a configuration file to every child
    pub fn with_config(self, path: &Path) -> Self {
        self.arg("--config").arg(path)
    }

    /// Re-invoke the currently running binary
    pub fn current_exe() -> Result<Self> {
        Ok(Self::new(std::env::current_exe()?))
    }

    /// Command-line arguments that reproduce `step` as a subcommand
    pub fn command_args(step: &PipelineStep) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();
        match &step.kind {
            StepKind::Prep(o) => {
                args.push("prep".into());
                args.push("--input".into());
                args.push(o.input.clone().into());
                args.push("--output".into());
                args.push(o.output_dir.clone().into());
                args.push("--test-size".into());
                args.push(o.test_size.to_string().into());
                args.push("--seed".into());
                args.push(o.seed.to_string().into());
            }
            StepKind::Train(o) => {
                args.push("train".into());
                args.push("--input".into());
                args.push(o.input_dir.clone().into());
                args.push("--output".into());
                args.push(o.output_dir.clone().into());
            }
            StepKind::Evaluate(o) => {
                args.push("test".into());
                args.push("--input".into());
                args.push(o.input_dir.clone().into());
                args.push("--model".into());
                args.push(o.model.clone().into());
                args.push("--metrics-output".into());
                args.push(o.metrics_file.clone().into());
            }
        }
        args
    }
}

impl StepRunner for SubprocessRunner {
    fn run_step(&mut self, step: &PipelineStep) -> Result<()> {
        let status = Command::new(&self.program)
            .args(&self.leading_args)
            .args(Self::command_args(step))
            .status()?;

        if !status.success() {
            return Err(PipelineError::StepFailed {
                step: step.name.to_string(),
                code: status.code().unwrap_or(-1),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub output_dir: PathBuf,
    pub prep_dir: PathBuf,
    pub train_dir: PathBuf,
    pub metrics_file: PathBuf,
    pub steps_completed: Vec<String>,
}

/// The local prep → train → test pipeline
#[derive(Debug, Clone)]
pub struct Pipeline {
    pub input_data: PathBuf,
    pub output_dir: PathBuf,
    pub metrics_file: PathBuf,
    pub test_size: f64,
    pub seed: u64,
}

impl Pipeline {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            input_data: config.input_data.clone(),
            output_dir: config.output_dir.clone(),
            metrics_file: config.metrics_file.clone(),
            test_size: config.test_size,
            seed: config.seed,
        }
    }

    pub fn prep_dir(&self) -> PathBuf {
        self.output_dir.join(PREP_OUTPUT_DIR)
    }

    pub fn train_dir(&self) -> PathBuf {
        self.output_dir.join(TRAIN_OUTPUT_DIR)
    }

    /// The steps in execution order
    pub fn steps(&self) -> Vec<PipelineStep> {
        vec![
            PipelineStep {
                name: "Prep Step",
                kind: StepKind::Prep(PrepOptions {
                    input: self.input_data.clone(),
                    output_dir: self.prep_dir(),
                    test_size: self.test_size,
                    seed: self.seed,
                }),
            },
            PipelineStep {
                name: "Train Step",
                kind: StepKind::Train(TrainOptions {
                    input_dir: self.prep_dir(),
                    output_dir: self.train_dir(),
                }),
            },
            PipelineStep {
                name: "Test Step",
                kind: StepKind::Evaluate(EvaluateOptions {
                    input_dir: self.prep_dir(),
                    model: self.train_dir(),
                    metrics_file: self.metrics_file.clone(),
                }),
            },
        ]
    }

    /// Run every step in order, stopping at the first failure
    pub fn run<R: StepRunner>(&self, runner: &mut R) -> Result<PipelineReport> {
        if !self.input_data.is_file() {
            return Err(PipelineError::MissingInput(self.input_data.clone()));
        }

        fs::create_dir_all(self.prep_dir())?;
        fs::create_dir_all(self.train_dir())?;

        let mut steps_completed = Vec::new();
        for step in self.steps() {
            info!(step = step.name, "running");
            if let Err(err) = runner.run_step(&step) {
                error!(step = step.name, error = %err, "[FAILED]");
                return Err(err);
            }
            info!(step = step.name, "[SUCCESS]");
            steps_completed.push(step.name.to_string());
        }

        info!(output_dir = %self.output_dir.display(), "pipeline completed successfully");
        Ok(PipelineReport {
            output_dir: self.output_dir.clone(),
            prep_dir: self.prep_dir(),
            train_dir: self.train_dir(),
            metrics_file: self.metrics_file.clone(),
            steps_completed,
        })
    }
}

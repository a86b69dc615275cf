//! `vtx sync` command implementation
//!
//! Runs each step as a child process of the current binary. Children share
//! nothing with the parent beyond arguments and exit codes.
//!
//! Failure policy:
//! - a failed analysis or duplicate step is reported and the run continues
//! - apply never runs after a failed generate
//! - `--fail-fast` stops at the first failure
//! - the run fails when any step failed

use async_trait::async_trait;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info, warn};

use crate::error::{CliError, Result};
use crate::output;

/// Flags of one `vtx sync` invocation
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    pub skip_analysis: bool,
    pub skip_duplicates: bool,
    pub apply: bool,
    pub dry_run: bool,
    pub fail_fast: bool,
    pub dataset: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub verbose: bool,
}

/// A step of the sync job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Analyze,
    Duplicates,
    Generate,
    Apply { dry_run: bool },
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::Analyze => "analyze",
            Step::Duplicates => "duplicates",
            Step::Generate => "generate",
            Step::Apply { dry_run: false } => "apply",
            Step::Apply { dry_run: true } => "apply (dry run)",
        }
    }

    /// Child process arguments for this step
    pub fn args(&self, options: &SyncOptions) -> Vec<String> {
        let mut args = Vec::new();
        let path = |p: &PathBuf| p.display().to_string();

        match self {
            Step::Analyze => {
                args.push("analyze".to_string());
                if let Some(dataset) = &options.dataset {
                    args.extend(["--dataset".to_string(), path(dataset)]);
                }
            },
            Step::Duplicates => args.push("duplicates".to_string()),
            Step::Generate => {
                args.push("generate".to_string());
                if let Some(dataset) = &options.dataset {
                    args.extend(["--dataset".to_string(), path(dataset)]);
                }
                if let Some(output) = &options.output {
                    args.extend(["--output".to_string(), path(output)]);
                }
            },
            Step::Apply { dry_run } => {
                args.push("apply".to_string());
                if let Some(output) = &options.output {
                    args.push(path(output));
                }
                if *dry_run {
                    args.push("--dry-run".to_string());
                }
            },
        }

        if options.verbose {
            args.push("--verbose".to_string());
        }
        args
    }
}

/// The steps a set of flags selects, in execution order
pub fn plan_steps(options: &SyncOptions) -> Vec<Step> {
    let mut steps = Vec::new();
    if !options.skip_analysis {
        steps.push(Step::Analyze);
    }
    if !options.skip_duplicates {
        steps.push(Step::Duplicates);
    }
    steps.push(Step::Generate);
    if options.apply || options.dry_run {
        steps.push(Step::Apply {
            dry_run: options.dry_run,
        });
    }
    steps
}

/// How a step ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepStatus {
    Succeeded,
    Failed { code: Option<i32> },
    Skipped { reason: String },
}

impl StepStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, StepStatus::Failed { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub step: Step,
    #[serde(flatten)]
    pub status: StepStatus,
}

/// Outcome of every planned step
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncSummary {
    pub steps: Vec<StepOutcome>,
}

impl SyncSummary {
    pub fn failed(&self) -> usize {
        self.steps.iter().filter(|s| s.status.is_failure()).count()
    }

    fn failed_step(&self, step: Step) -> bool {
        self.steps.iter().any(|s| s.step == step && s.status.is_failure())
    }
}

/// Something that can run one step to completion
#[async_trait]
pub trait StepRunner: Send + Sync {
    async fn run_step(&self, step: Step, args: &[String]) -> Result<StepStatus>;
}

/// Runs steps as child processes of a binary, normally the current one
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    program: PathBuf,
}

impl ProcessRunner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn current_exe() -> Result<Self> {
        Ok(Self::new(std::env::current_exe()?))
    }
}

#[async_trait]
impl StepRunner for ProcessRunner {
    async fn run_step(&self, step: Step, args: &[String]) -> Result<StepStatus> {
        info!(step = step.name(), ?args, "Starting step");

        let status = tokio::process::Command::new(&self.program)
            .args(args)
            .status()
            .await?;

        if status.success() {
            Ok(StepStatus::Succeeded)
        } else {
            Ok(StepStatus::Failed {
                code: status.code(),
            })
        }
    }
}

/// Run planned steps in order under the failure policy
pub async fn execute(steps: &[Step], options: &SyncOptions, runner: &dyn StepRunner) -> SyncSummary {
    let mut summary = SyncSummary::default();
    let mut halted = false;

    for &step in steps {
        let status = if halted {
            StepStatus::Skipped {
                reason: "an earlier step failed (--fail-fast)".to_string(),
            }
        } else if matches!(step, Step::Apply { .. }) && summary.failed_step(Step::Generate) {
            StepStatus::Skipped {
                reason: "generate failed".to_string(),
            }
        } else {
            match runner.run_step(step, &step.args(options)).await {
                Ok(status) => status,
                Err(e) => {
                    error!(step = step.name(), error = %e, "Step could not be started");
                    StepStatus::Failed { code: None }
                },
            }
        };

        match &status {
            StepStatus::Succeeded => info!(step = step.name(), "Step succeeded"),
            StepStatus::Failed { code } => {
                warn!(step = step.name(), ?code, "Step failed");
                if options.fail_fast {
                    halted = true;
                }
            },
            StepStatus::Skipped { reason } => warn!(step = step.name(), reason, "Step skipped"),
        }

        summary.steps.push(StepOutcome { step, status });
    }

    summary
}

/// Run the sync job
pub async fn run(options: &SyncOptions) -> Result<()> {
    let steps = plan_steps(options);
    let runner = ProcessRunner::current_exe()?;

    println!(
        "{} {}",
        "Sync:".cyan().bold(),
        steps.iter().map(Step::name).collect::<Vec<_>>().join(" → ")
    );

    let summary = execute(&steps, options, &runner).await;
    print_summary(&summary);

    match summary.failed() {
        0 => Ok(()),
        failed => Err(CliError::StepsFailed {
            failed,
            total: summary.steps.len(),
        }),
    }
}

fn print_summary(summary: &SyncSummary) {
    let mut table = output::table(["Step", "Result"]);
    for outcome in &summary.steps {
        let result = match &outcome.status {
            StepStatus::Succeeded => "ok".green().to_string(),
            StepStatus::Failed { code } => format!("failed (exit {})", output::opt(*code)).red().to_string(),
            StepStatus::Skipped { reason } => format!("skipped: {reason}").yellow().to_string(),
        };
        table.add_row(vec![outcome.step.name().to_string(), result]);
    }
    println!("\n{table}");
}

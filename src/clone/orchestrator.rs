use crate::clone::runner::CommandRunner;
use crate::clone::task::CloneTask;
use crate::error::{CloneError, ForkfetchError, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, Semaphore};

#[derive(Clone, Debug)]
pub struct OrchestratorConfig {
    pub jobs: usize,
    pub dry_run: bool,
    pub base_dir: PathBuf,
}

#[derive(Debug)]
pub enum CloneOutcome {
    Success {
        task: CloneTask,
        output: String,
    },
    Failure {
        task: CloneTask,
        error: CloneError,
        output: String,
    },
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunResult {
    pub succeeded: usize,
    pub failed: usize,
}

impl RunResult {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    pub fn is_failure(&self) -> bool {
        self.failed > 0
    }

    pub fn into_result(self) -> Result<Self> {
        if self.is_failure() {
            Err(ForkfetchError::ClonesFailed {
                failed: self.failed,
                total: self.total(),
            })
        } else {
            Ok(self)
        }
    }
}

type Sink = Mutex<Box<dyn Write + Send>>;

pub struct Orchestrator<R> {
    config: OrchestratorConfig,
    runner: Arc<R>,
    stdout: Sink,
    stderr: Sink,
}

impl<R: CommandRunner> Orchestrator<R> {
    pub fn new(mut config: OrchestratorConfig, runner: R) -> Self {
        config.jobs = config.jobs.clamp(1, Semaphore::MAX_PERMITS);
        Self {
            config,
            runner: Arc::new(runner),
            stdout: Mutex::new(Box::new(std::io::stdout())),
            stderr: Mutex::new(Box::new(std::io::stderr())),
        }
    }

    /// Send clone output and failure diagnostics somewhere other than stdout/stderr.
    pub fn with_output(
        mut self,
        stdout: impl Write + Send + 'static,
        stderr: impl Write + Send + 'static,
    ) -> Self {
        self.stdout = Mutex::new(Box::new(stdout));
        self.stderr = Mutex::new(Box::new(stderr));
        self
    }

    /// Clone every task once, at most `jobs` at a time.
    ///
    /// One failed clone never stops the others; the returned [`RunResult`]
    /// counts both. Only preparing the base directory can fail the call itself.
    pub async fn run(&self, tasks: Vec<CloneTask>) -> Result<RunResult> {
        let total = tasks.len();
        if total == 0 {
            return Ok(RunResult::default());
        }

        let dry_run = self.config.dry_run;
        if !dry_run {
            tokio::fs::create_dir_all(&self.config.base_dir).await?;
        }

        let gate = Arc::new(Semaphore::new(self.config.jobs));
        let (tx, mut rx) = mpsc::unbounded_channel::<CloneOutcome>();
        tracing::info!(total, jobs = self.config.jobs, dry_run, "starting clones");

        for task in tasks {
            let gate = Arc::clone(&gate);
            let runner = Arc::clone(&self.runner);
            let tx = tx.clone();
            let cwd = (!dry_run).then(|| self.config.base_dir.clone());

            tokio::spawn(async move {
                // acquire only fails on a closed gate; any unit that ends without
                // sending is counted as failed by the collector
                let Ok(_permit) = gate.acquire_owned().await else {
                    return;
                };
                let outcome = clone_one(runner.as_ref(), task, dry_run, cwd.as_deref()).await;
                let _ = tx.send(outcome);
            });
        }
        drop(tx);

        let mut result = RunResult::default();
        let mut remaining = total;
        while remaining > 0 {
            // None only if every sender is gone, i.e. some unit died before reporting
            let Some(outcome) = rx.recv().await else {
                break;
            };
            remaining -= 1;
            match &outcome {
                CloneOutcome::Success { .. } => result.succeeded += 1,
                CloneOutcome::Failure { .. } => result.failed += 1,
            }
            self.report(&outcome);
        }

        if remaining > 0 {
            tracing::error!(remaining, "clone tasks ended without reporting an outcome");
            if let Ok(mut err) = self.stderr.lock() {
                let _ = writeln!(
                    err,
                    "error: {remaining} clone tasks ended without reporting an outcome"
                );
            }
            result.failed += remaining;
        }

        tracing::info!(
            succeeded = result.succeeded,
            failed = result.failed,
            "clones finished"
        );
        Ok(result)
    }

    fn report(&self, outcome: &CloneOutcome) {
        match outcome {
            CloneOutcome::Success { task, output } => {
                tracing::debug!(dir = %task.local_directory, "clone finished");
                if let Ok(mut out) = self.stdout.lock() {
                    let _ = writeln!(out, "{output}");
                }
            }
            CloneOutcome::Failure {
                task,
                error,
                output,
            } => {
                tracing::warn!(url = %task.source_url, %error, "clone failed");
                if let Ok(mut err) = self.stderr.lock() {
                    let _ = writeln!(
                        err,
                        "error: cloning {} into {}: {error}",
                        task.source_url, task.local_directory
                    );
                    if !output.is_empty() {
                        let _ = writeln!(err, "{output}");
                    }
                }
            }
        }
    }
}

async fn clone_one<R: CommandRunner + ?Sized>(
    runner: &R,
    task: CloneTask,
    dry_run: bool,
    cwd: Option<&Path>,
) -> CloneOutcome {
    if let Some(reason) = task.unsafe_directory() {
        return CloneOutcome::Failure {
            task,
            error: CloneError::UnsafeDirectory(reason),
            output: String::new(),
        };
    }

    let argv = task.argv(dry_run);
    tracing::debug!(url = %task.source_url, dir = %task.local_directory, "clone admitted");

    match runner.run(&argv, cwd).await {
        Ok(out) if out.success => CloneOutcome::Success {
            task,
            output: out.output.trim_end().to_string(),
        },
        Ok(out) => CloneOutcome::Failure {
            task,
            error: CloneError::Status(out.status),
            output: out.output.trim_end().to_string(),
        },
        Err(e) => CloneOutcome::Failure {
            task,
            error: CloneError::Launch(e),
            output: String::new(),
        },
    }
}

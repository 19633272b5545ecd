//! Dispatch: resolve arguments, run one action per resolved value under a
//! concurrency bound, and aggregate the results.
//!
//! Results are collected in completion order, not argument order. Each one
//! carries its original and resolved argument so output can still be matched
//! back to what the user typed.

use crate::commands::{Command, Resolution};
use crate::error::{ApiError, CommandError};
use crate::output::Output;
use crate::resolver::{ResolutionProvider, Resolver};
use crate::tui::livelog::{LiveLog, LiveLogConfig, LogEntry};
use std::collections::HashSet;
use std::io::Write;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

mod executor;
mod result;
mod work_queue;

pub use executor::Executor;
pub use result::{ExecuteResult, ResolvedArgument};
pub use work_queue::{WorkQueue, WorkQueueConfig, WorkQueueStats};

/// Exit code when the run was interrupted.
pub const EXIT_CODE_INTERRUPTED: i32 = 100;
/// Exit code for errors that abort before any task runs.
pub const EXIT_CODE_ERROR: i32 = 1;
const MAX_FAILURE_EXIT_CODE: usize = 99;

/// Every result of one dispatch, in completion order.
#[derive(Debug)]
pub struct Dispatched {
    results: Vec<ExecuteResult>,
}

impl Dispatched {
    pub fn results(&self) -> &[ExecuteResult] {
        &self.results
    }

    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_error()).count()
    }

    /// `min(failed, 99)`, so zero means every task succeeded.
    pub fn exit_code(&self) -> i32 {
        // bounded by MAX_FAILURE_EXIT_CODE, fits in i32
        self.failed_count().min(MAX_FAILURE_EXIT_CODE) as i32
    }

    /// True if any task gave up because the run was interrupted.
    pub fn was_interrupted(&self) -> bool {
        self.results
            .iter()
            .any(|r| matches!(&r.outcome, Err(err) if err.is_cancelled()))
    }

    pub fn into_outputs(self) -> Vec<Output> {
        self.results
            .into_iter()
            .map(ExecuteResult::into_output)
            .collect()
    }
}

/// Runs commands with a live progress display.
pub struct Dispatcher {
    enable_ui: bool,
    log_config: LiveLogConfig,
    writer: Option<Box<dyn Write + Send>>,
}

impl Dispatcher {
    /// Draw progress on stderr, or nowhere when `enable_ui` is false.
    pub fn new(enable_ui: bool, log_config: LiveLogConfig) -> Self {
        Self {
            enable_ui,
            log_config,
            writer: None,
        }
    }

    /// Draw progress into `writer`.
    pub fn with_writer(writer: Box<dyn Write + Send>, log_config: LiveLogConfig) -> Self {
        Self {
            enable_ui: true,
            log_config,
            writer: Some(writer),
        }
    }

    /// Resolve `args` for `command` and run its action once per result.
    ///
    /// Per-argument failures end up in the returned results. An `Err` means
    /// nothing ran: credentials were rejected or the resolver could not be
    /// built.
    pub async fn dispatch(
        self,
        command: Arc<dyn Command>,
        exec: &Executor,
        args: &[String],
    ) -> Result<Dispatched, CommandError> {
        let mut resolved = resolve_arguments(command.as_ref(), exec, args).await?;
        if resolved.is_empty() {
            resolved.push(ResolvedArgument::empty());
        }
        let resolved = Arc::new(resolved);
        let num_tasks = resolved.len();

        let config = WorkQueueConfig {
            num_tasks,
            max_concurrent_tasks: command.maximum_executions(),
            enable_ui: self.enable_ui,
        };
        let queue = match self.writer {
            Some(writer) => WorkQueue::with_live_log(config, LiveLog::new(writer, self.log_config)),
            None => WorkQueue::new(config, self.log_config),
        };
        info!(
            command = command.name(),
            tasks = num_tasks,
            max_concurrent = config.max_concurrent_tasks,
            "dispatching"
        );

        let (tx, mut rx) = mpsc::unbounded_channel::<ExecuteResult>();
        let handler = {
            let resolved = Arc::clone(&resolved);
            let command = Arc::clone(&command);
            move |job: usize, entry: Arc<LogEntry>| {
                let arg = resolved[job].clone();
                let command = Arc::clone(&command);
                let exec = exec.with_entry(entry);
                let tx = tx.clone();
                async move {
                    let outcome = run_task(command.as_ref(), &exec, &arg).await;
                    // receiver outlives every task; a failed send only means
                    // the dispatch itself was dropped
                    let _ = tx.send(ExecuteResult {
                        job,
                        outcome,
                        resolved_argument: arg,
                    });
                }
            }
        };

        let collect = async {
            let mut results = Vec::with_capacity(num_tasks);
            while results.len() < num_tasks {
                match rx.recv().await {
                    Some(result) => results.push(result),
                    None => break,
                }
            }
            results
        };

        let (stats, mut results) = tokio::join!(queue.run(handler), collect);

        if results.len() < num_tasks {
            warn!(
                expected = num_tasks,
                received = results.len(),
                panicked = stats.panicked,
                "tasks ended without a result"
            );
            let seen: HashSet<usize> = results.iter().map(|r| r.job).collect();
            for job in (0..num_tasks).filter(|job| !seen.contains(job)) {
                results.push(ExecuteResult {
                    job,
                    outcome: Err(
                        CommandError::Action("task ended without a result".into()).handled()
                    ),
                    resolved_argument: resolved[job].clone(),
                });
            }
        }

        let dispatched = Dispatched { results };
        debug!(
            command = command.name(),
            failed = dispatched.failed_count(),
            "dispatch finished"
        );
        Ok(dispatched)
    }
}

fn progress_message(command: &str, arg: &ResolvedArgument) -> String {
    if arg.original().is_empty() {
        command.to_string()
    } else {
        format!("{command} {}", arg.original())
    }
}

async fn run_task(
    command: &dyn Command,
    exec: &Executor,
    arg: &ResolvedArgument,
) -> Result<Output, CommandError> {
    let message = progress_message(command.name(), arg);
    exec.push_progress_update(message.as_str());

    if let Some(err) = arg.error() {
        return Err(exec.handle_error(message, CommandError::Resolution(err.clone())));
    }

    match command.execute(exec, arg.resolved_value()).await {
        Ok(output) => {
            if !exec.entry().is_some_and(|entry| entry.is_done()) {
                exec.push_progress_success(format!("{message}: done"));
            }
            Ok(output)
        }
        Err(err) if err.is_handled() => Err(err),
        Err(err) => Err(exec.handle_error(format!("{message}: failed"), err)),
    }
}

async fn resolve_arguments(
    command: &dyn Command,
    exec: &Executor,
    args: &[String],
) -> Result<Vec<ResolvedArgument>, CommandError> {
    match command.resolution() {
        Resolution::None => {
            exec.service().account().await.map_err(|err| {
                if err.is_unauthorized() {
                    CommandError::InvalidCredentials
                } else {
                    CommandError::Api(err)
                }
            })?;
            Ok(Vec::new())
        }
        Resolution::Only(provider) => {
            let resolver = build_resolver(provider, exec, args).await?;
            Ok(args
                .iter()
                .map(|arg| match resolver(arg.as_str()).get_only() {
                    Ok(id) => ResolvedArgument::resolved(arg.as_str(), id),
                    Err(err) => ResolvedArgument::failed(arg.as_str(), err),
                })
                .collect())
        }
        Resolution::All(provider) => {
            let resolver = build_resolver(provider, exec, args).await?;
            let mut resolved = Vec::with_capacity(args.len());
            for arg in args {
                match resolver(arg.as_str()).get_all() {
                    Ok(ids) => resolved.extend(
                        ids.into_iter()
                            .map(|id| ResolvedArgument::resolved(arg.as_str(), id)),
                    ),
                    Err(err) => resolved.push(ResolvedArgument::failed(arg.as_str(), err)),
                }
            }
            Ok(resolved)
        }
    }
}

async fn build_resolver(
    provider: &dyn ResolutionProvider,
    exec: &Executor,
    args: &[String],
) -> Result<Resolver, CommandError> {
    if args.is_empty() {
        return Err(CommandError::Action(format!(
            "at least one argument is required: {}",
            provider.positional_argument_help()
        )));
    }
    provider
        .get(exec.service())
        .await
        .map_err(|err: ApiError| {
            if err.is_unauthorized() {
                CommandError::InvalidCredentials
            } else {
                CommandError::ResolverUnavailable(err)
            }
        })
}

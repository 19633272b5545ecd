//! Per-task handle passed to every command action.

use crate::api::Service;
use crate::config::Config;
use crate::error::{ApiError, CommandError, WaitError};
use crate::tui::livelog::LogEntry;
use crate::tui::settings;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::debug;

struct ExecutorContext {
    config: Config,
    service: Arc<dyn Service>,
    cancel: watch::Receiver<bool>,
}

/// Gives actions the backend, the cancellation signal and their own
/// progress line.
///
/// The dispatcher clones one root executor per task and attaches that task's
/// [`LogEntry`]; progress hooks on an executor without an entry do nothing.
#[derive(Clone)]
pub struct Executor {
    ctx: Arc<ExecutorContext>,
    entry: Option<Arc<LogEntry>>,
}

impl Executor {
    pub fn new(config: Config, service: Arc<dyn Service>, cancel: watch::Receiver<bool>) -> Self {
        Self {
            ctx: Arc::new(ExecutorContext {
                config,
                service,
                cancel,
            }),
            entry: None,
        }
    }

    /// Executor sharing this context, reporting progress on `entry`.
    pub fn with_entry(&self, entry: Arc<LogEntry>) -> Self {
        Self {
            ctx: Arc::clone(&self.ctx),
            entry: Some(entry),
        }
    }

    pub fn config(&self) -> &Config {
        &self.ctx.config
    }

    pub fn service(&self) -> &dyn Service {
        self.ctx.service.as_ref()
    }

    pub fn is_cancelled(&self) -> bool {
        *self.ctx.cancel.borrow()
    }

    pub(crate) fn entry(&self) -> Option<&Arc<LogEntry>> {
        self.entry.as_ref()
    }

    pub fn push_progress_started(&self, message: impl Into<String>) {
        if let Some(entry) = &self.entry {
            entry.set_message(message);
            entry.mark_started();
        }
    }

    pub fn push_progress_update(&self, message: impl Into<String>) {
        if let Some(entry) = &self.entry {
            entry.set_message(message);
        }
    }

    pub fn push_progress_success(&self, message: impl Into<String>) {
        if let Some(entry) = &self.entry {
            entry.set_message(message);
            entry.mark_done();
        }
    }

    /// Finish the line with a warning instead of a failure.
    pub fn push_progress_warning(&self, message: impl Into<String>, details: impl Into<String>) {
        if let Some(entry) = &self.entry {
            entry.set_message(message);
            entry.set_details(details, "");
            entry.mark_warning();
        }
    }

    /// Show `err` as a failure on this task's line and mark it handled so the
    /// dispatcher does not report it a second time.
    pub fn handle_error(&self, message: impl Into<String>, err: CommandError) -> CommandError {
        if let Some(entry) = &self.entry {
            entry.set_message(message);
            entry.set_details(err.to_string(), settings::DETAILS_PREFIX_ERROR);
            entry.mark_failed();
        }
        err.handled()
    }

    /// Poll `check` every wait interval until it returns `true`.
    ///
    /// Gives up with [`WaitError::DeadlineExceeded`] after the configured wait
    /// timeout and with [`WaitError::Cancelled`] as soon as the run is
    /// interrupted. Errors from `check` end the wait immediately.
    pub async fn wait_for<F, Fut>(&self, target: &str, mut check: F) -> Result<(), CommandError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<bool, ApiError>>,
    {
        let interval = self.ctx.config.execution.wait_interval();
        let timeout = self.ctx.config.execution.wait_timeout();
        self.poll_until(target, interval, timeout, &mut check).await
    }

    async fn poll_until<F, Fut>(
        &self,
        target: &str,
        interval: Duration,
        timeout: Duration,
        check: &mut F,
    ) -> Result<(), CommandError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<bool, ApiError>>,
    {
        let mut cancel = self.ctx.cancel.clone();
        let deadline = Instant::now() + timeout;
        let cancelled = || WaitError::Cancelled {
            target: target.to_string(),
        };

        loop {
            if *cancel.borrow() {
                return Err(cancelled().into());
            }
            if check().await? {
                debug!(wait_target = target, "wait condition met");
                return Ok(());
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(WaitError::DeadlineExceeded {
                    target: target.to_string(),
                    after: timeout,
                }
                .into());
            }

            let wake = (now + interval).min(deadline);
            tokio::select! {
                _ = tokio::time::sleep_until(wake) => {}
                changed = cancel.changed() => {
                    if changed.is_err() {
                        // sender gone, nothing can cancel us any more
                        tokio::time::sleep_until(wake).await;
                    }
                }
            }
        }
    }
}

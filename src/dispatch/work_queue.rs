//! Bounded-concurrency task runner feeding a [`LiveLog`].
//!
//! Tasks are spawned onto the tokio runtime while fewer than
//! `max_concurrent_tasks` are in flight. The scheduler wakes on every task
//! completion and on a fixed render tick; it never spins.

use crate::tui::livelog::{LiveLog, LiveLogConfig, LogEntry};
use crate::tui::settings;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// Fixed for the lifetime of one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkQueueConfig {
    pub num_tasks: usize,
    pub max_concurrent_tasks: usize,
    pub enable_ui: bool,
}

/// Counters reported after every task has finished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkQueueStats {
    pub completed: usize,
    pub panicked: usize,
}

pub struct WorkQueue {
    config: WorkQueueConfig,
    live_log: Arc<LiveLog>,
}

impl WorkQueue {
    /// Queue drawing on stderr, or discarding its drawing when the UI is off.
    pub fn new(config: WorkQueueConfig, log_config: LiveLogConfig) -> Self {
        let live_log = if config.enable_ui {
            LiveLog::stderr(log_config)
        } else {
            LiveLog::discard(log_config)
        };
        Self::with_live_log(config, live_log)
    }

    pub fn with_live_log(config: WorkQueueConfig, live_log: LiveLog) -> Self {
        Self {
            config,
            live_log: Arc::new(live_log),
        }
    }

    pub fn live_log(&self) -> &Arc<LiveLog> {
        &self.live_log
    }

    /// Run `handler` once per task index, at most `max_concurrent_tasks` at a
    /// time, and return when all of them have finished.
    ///
    /// Each task gets a fresh entry registered with the live log. The entry is
    /// marked done when the task returns, or failed if it panicked.
    pub async fn run<F, Fut>(&self, handler: F) -> WorkQueueStats
    where
        F: Fn(usize, Arc<LogEntry>) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let max = self.config.max_concurrent_tasks.max(1);
        let mut tasks = JoinSet::new();
        let mut started = 0usize;
        let mut stats = WorkQueueStats::default();

        let mut ticker = tokio::time::interval(Duration::from_millis(settings::RENDER_TICK_MS));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        debug!(
            num_tasks = self.config.num_tasks,
            max_concurrent = max,
            "work queue starting"
        );

        loop {
            while tasks.len() < max && started < self.config.num_tasks {
                let entry = LogEntry::new(String::new());
                self.live_log.add_entries([Arc::clone(&entry)]);
                let work = handler(started, Arc::clone(&entry));
                tasks.spawn(async move {
                    let _guard = DoneOnDrop(entry);
                    work.await;
                });
                started += 1;
            }

            if tasks.is_empty() {
                break;
            }

            tokio::select! {
                joined = tasks.join_next() => match joined {
                    Some(Ok(())) => stats.completed += 1,
                    Some(Err(err)) => {
                        warn!(error = %err, "work queue task did not complete");
                        stats.panicked += 1;
                    }
                    None => {}
                },
                _ = ticker.tick() => self.render(),
            }
        }

        self.render();
        // Entries that started and finished within one tick only reach the
        // in-progress list on the render above; print them too.
        let counts = self.live_log.counts();
        if counts.pending + counts.in_progress > 0 {
            self.render();
        }
        debug!(?stats, "work queue finished");
        stats
    }

    fn render(&self) {
        if let Err(err) = self.live_log.render() {
            debug!(error = %err, "live log render failed");
        }
    }
}

/// Finishes the task's entry however the task exits.
struct DoneOnDrop(Arc<LogEntry>);

impl Drop for DoneOnDrop {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.0.mark_failed();
        } else {
            self.0.mark_done();
        }
    }
}

//! Live, incrementally redrawn multi-line task status display.
//!
//! A [`LiveLog`] owns three ordered lists of [`LogEntry`] handles (pending,
//! in progress, done). Worker tasks mutate their own entry through its lock
//! while [`LiveLog::render`] periodically moves entries forward and redraws
//! the still-active lines in place.
//!
//! Lock order: the LiveLog lock first, then entry locks (pending list before
//! in-progress list). Nothing else takes more than one entry lock at a time.

use crate::tui::settings;
use crate::tui::text::{fit_to_width, indent_lines, visible_width, wrap_soft};
use crossterm::cursor::MoveUp;
use crossterm::style::{Color, Print, PrintStyledContent, Stylize};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::QueueableCommand;
use std::io::{self, IsTerminal, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Final result class of a finished entry; selects the done-line colour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EntryOutcome {
    #[default]
    Success,
    Failed,
    Warning,
}

/// Which of the three LiveLog lists an entry belongs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPhase {
    Pending,
    InProgress,
    Done,
}

#[derive(Debug, Default)]
struct EntryState {
    message: String,
    details: String,
    details_prefix: String,
    started: Option<Instant>,
    done: bool,
    outcome: EntryOutcome,
}

impl EntryState {
    fn phase(&self) -> EntryPhase {
        match (self.started.is_some(), self.done) {
            (_, true) => EntryPhase::Done,
            (true, false) => EntryPhase::InProgress,
            (false, false) => EntryPhase::Pending,
        }
    }

    fn line_color(&self) -> Color {
        match self.phase() {
            EntryPhase::Pending => settings::COLOR_PENDING,
            EntryPhase::InProgress => settings::COLOR_IN_PROGRESS,
            EntryPhase::Done => match self.outcome {
                EntryOutcome::Success => settings::COLOR_DONE,
                EntryOutcome::Failed => settings::COLOR_FAILED,
                EntryOutcome::Warning => settings::COLOR_WARNING,
            },
        }
    }
}

/// Point-in-time copy of an entry's fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySnapshot {
    pub message: String,
    pub details: String,
    pub details_prefix: String,
    pub started: bool,
    pub done: bool,
    pub outcome: EntryOutcome,
}

/// One task's human-readable status line.
///
/// Every accessor takes the entry's own lock for the duration of the call.
#[derive(Debug, Default)]
pub struct LogEntry {
    state: Mutex<EntryState>,
}

impl LogEntry {
    /// Create a shareable entry with an initial message.
    pub fn new(message: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(EntryState {
                message: message.into(),
                ..EntryState::default()
            }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, EntryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the status message.
    pub fn set_message(&self, message: impl Into<String>) {
        self.lock().message = message.into();
    }

    /// Replace the detail text printed under the final line.
    pub fn set_details(&self, details: impl Into<String>, prefix: impl Into<String>) {
        let mut state = self.lock();
        state.details = details.into();
        state.details_prefix = prefix.into();
    }

    /// Record the start time. Later calls keep the first timestamp.
    pub fn mark_started(&self) {
        let mut state = self.lock();
        if state.started.is_none() {
            state.started = Some(Instant::now());
        }
    }

    /// Finish the entry successfully.
    pub fn mark_done(&self) {
        self.finish(EntryOutcome::Success);
    }

    /// Finish the entry as failed.
    pub fn mark_failed(&self) {
        self.finish(EntryOutcome::Failed);
    }

    /// Finish the entry with a warning.
    pub fn mark_warning(&self) {
        self.finish(EntryOutcome::Warning);
    }

    fn finish(&self, outcome: EntryOutcome) {
        let mut state = self.lock();
        if state.done {
            return;
        }
        // done must never be observable without started
        state.started.get_or_insert_with(Instant::now);
        state.done = true;
        state.outcome = outcome;
    }

    pub fn is_done(&self) -> bool {
        self.lock().done
    }

    pub fn phase(&self) -> EntryPhase {
        self.lock().phase()
    }

    pub fn snapshot(&self) -> EntrySnapshot {
        let state = self.lock();
        EntrySnapshot {
            message: state.message.clone(),
            details: state.details.clone(),
            details_prefix: state.details_prefix.clone(),
            started: state.started.is_some(),
            done: state.done,
            outcome: state.outcome,
        }
    }
}

/// Rendering options for a [`LiveLog`].
#[derive(Debug, Clone)]
pub struct LiveLogConfig {
    /// Forced line width. `0` means detect the terminal width on every render.
    pub entry_max_width: usize,
    /// Also draw entries that have not started yet.
    pub render_pending: bool,
    /// Append-only mode: print finished lines only, never redraw.
    pub disable_live_rendering: bool,
    pub color: bool,
}

impl Default for LiveLogConfig {
    fn default() -> Self {
        Self {
            entry_max_width: 0,
            render_pending: true,
            disable_live_rendering: !io::stderr().is_terminal(),
            color: true,
        }
    }
}

/// Number of entries in each list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LiveLogCounts {
    pub pending: usize,
    pub in_progress: usize,
    pub done: usize,
}

struct LiveLogInner {
    out: Box<dyn Write + Send>,
    pending: Vec<Arc<LogEntry>>,
    in_progress: Vec<Arc<LogEntry>>,
    done: Vec<Arc<LogEntry>>,
    /// Lines printed for active entries by the last render.
    height: usize,
    last_render_width: usize,
}

type WidthSource = Box<dyn Fn() -> usize + Send + Sync>;

/// Renderer state for one live log.
pub struct LiveLog {
    config: LiveLogConfig,
    width_source: Option<WidthSource>,
    inner: Mutex<LiveLogInner>,
}

impl LiveLog {
    pub fn new(out: Box<dyn Write + Send>, config: LiveLogConfig) -> Self {
        Self {
            config,
            width_source: None,
            inner: Mutex::new(LiveLogInner {
                out,
                pending: Vec::new(),
                in_progress: Vec::new(),
                done: Vec::new(),
                height: 0,
                last_render_width: 0,
            }),
        }
    }

    /// Live log drawing on stderr.
    pub fn stderr(config: LiveLogConfig) -> Self {
        Self::new(Box::new(io::stderr()), config)
    }

    /// Live log whose output is thrown away.
    pub fn discard(config: LiveLogConfig) -> Self {
        Self::new(Box::new(io::sink()), config)
    }

    /// Read the line width from `source` instead of the terminal.
    pub(crate) fn with_width_source<F>(mut self, source: F) -> Self
    where
        F: Fn() -> usize + Send + Sync + 'static,
    {
        self.width_source = Some(Box::new(source));
        self
    }

    pub fn config(&self) -> &LiveLogConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, LiveLogInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append entries to the pending list.
    pub fn add_entries<I>(&self, entries: I)
    where
        I: IntoIterator<Item = Arc<LogEntry>>,
    {
        self.lock().pending.extend(entries);
    }

    /// Lines printed for active entries by the most recent render.
    pub fn height(&self) -> usize {
        self.lock().height
    }

    pub fn counts(&self) -> LiveLogCounts {
        let inner = self.lock();
        LiveLogCounts {
            pending: inner.pending.len(),
            in_progress: inner.in_progress.len(),
            done: inner.done.len(),
        }
    }

    /// Maximum width of one rendered line.
    ///
    /// With `entry_max_width == 0` this follows the terminal, so it can change
    /// between renders.
    pub fn max_width(&self) -> usize {
        if self.config.entry_max_width != 0 {
            return self.config.entry_max_width;
        }
        if let Some(source) = &self.width_source {
            return source().max(settings::MIN_COLUMNS);
        }
        terminal::size()
            .map(|(cols, _)| cols as usize)
            .unwrap_or(settings::FALLBACK_COLUMNS)
            .max(settings::MIN_COLUMNS)
    }

    /// Move entries forward through their lists and redraw the active lines.
    pub fn render(&self) -> io::Result<()> {
        let mut guard = self.lock();
        let inner = &mut *guard;

        let active: Vec<Arc<LogEntry>> = inner
            .pending
            .iter()
            .chain(inner.in_progress.iter())
            .cloned()
            .collect();
        let states: Vec<MutexGuard<'_, EntryState>> =
            active.iter().map(|entry| entry.lock()).collect();
        let pending_len = inner.pending.len();

        let live = !self.config.disable_live_rendering;
        let width = self.max_width();
        let mut erase = inner.height;
        if inner.last_render_width > 0 && inner.last_render_width != width {
            // terminal was resized, previously printed lines may have rewrapped
            erase = (inner.height * inner.last_render_width).div_ceil(width);
        }

        let out = &mut inner.out;
        if live {
            out.queue(Print("\r"))?;
            for _ in 0..erase {
                out.queue(Clear(ClearType::CurrentLine))?;
                out.queue(MoveUp(1))?;
            }
        }

        let mut next_in_progress = Vec::new();
        for idx in pending_len..active.len() {
            let state = &states[idx];
            if !state.done {
                next_in_progress.push(idx);
                continue;
            }
            write_entry(out, &self.config, state, width)?;
            write_details(out, &self.config, state, width)?;
            inner.done.push(Arc::clone(&active[idx]));
        }

        let mut next_pending = Vec::new();
        for (idx, state) in states.iter().enumerate().take(pending_len) {
            if state.started.is_some() {
                next_in_progress.push(idx);
            } else {
                next_pending.push(idx);
            }
        }
        inner.in_progress = next_in_progress
            .iter()
            .map(|&idx| Arc::clone(&active[idx]))
            .collect();
        inner.pending = next_pending
            .iter()
            .map(|&idx| Arc::clone(&active[idx]))
            .collect();

        if !live {
            out.flush()?;
            drop(states);
            return Ok(());
        }

        let mut height = 0;
        for &idx in &next_in_progress {
            if states[idx].done {
                continue;
            }
            write_entry(out, &self.config, &states[idx], width)?;
            height += 1;
        }
        if self.config.render_pending {
            for &idx in &next_pending {
                write_entry(out, &self.config, &states[idx], width)?;
                height += 1;
            }
        }
        out.flush()?;
        inner.height = height;
        inner.last_render_width = width;
        drop(states);
        Ok(())
    }
}

fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{}m{}s", secs / 60, secs % 60)
}

fn write_entry<W: Write + ?Sized>(
    out: &mut W,
    config: &LiveLogConfig,
    state: &EntryState,
    width: usize,
) -> io::Result<()> {
    let elapsed = state
        .started
        .map(|started| format_elapsed(started.elapsed()))
        .unwrap_or_default();
    let message_width = width.saturating_sub(1 + visible_width(&elapsed));
    let line = fit_to_width(&state.message, message_width);
    if config.color {
        let styled = line.with(state.line_color());
        if state.phase() == EntryPhase::InProgress {
            out.queue(PrintStyledContent(styled.bold()))?;
        } else {
            out.queue(PrintStyledContent(styled))?;
        }
        out.queue(PrintStyledContent(elapsed.with(settings::COLOR_TIME)))?;
    } else {
        out.queue(Print(line))?;
        out.queue(Print(elapsed))?;
    }
    out.queue(Print("\n"))?;
    Ok(())
}

fn write_details<W: Write + ?Sized>(
    out: &mut W,
    config: &LiveLogConfig,
    state: &EntryState,
    width: usize,
) -> io::Result<()> {
    if state.details.is_empty() {
        return Ok(());
    }
    let prefix = &state.details_prefix;
    let wrapped = wrap_soft(&state.details, width.saturating_sub(visible_width(prefix)));
    for line in indent_lines(&wrapped, prefix) {
        let line = fit_to_width(&line, width);
        if config.color {
            out.queue(PrintStyledContent(line.with(settings::COLOR_DETAILS)))?;
        } else {
            out.queue(Print(line))?;
        }
        out.queue(Print("\n"))?;
    }
    Ok(())
}

//! Centralized, hardcoded UI settings for the live log.
//!
//! This is the single place to tweak colors, prefixes, and redraw timing.

use crossterm::style::Color;

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Width used when the terminal size cannot be queried.
pub const FALLBACK_COLUMNS: usize = 100;
/// Smallest line width the live log will lay out against.
pub const MIN_COLUMNS: usize = 20;

pub const TRUNCATION_SUFFIX: &str = "...";
pub const DETAILS_PREFIX_ERROR: &str = "error: ";

// ---------------------------------------------------------------------------
// Timing
// ---------------------------------------------------------------------------

/// Interval between live log redraws while tasks run.
pub const RENDER_TICK_MS: u64 = 100;

// ---------------------------------------------------------------------------
// Colors
// ---------------------------------------------------------------------------

pub const COLOR_PENDING: Color = Color::DarkGrey;
pub const COLOR_IN_PROGRESS: Color = Color::Blue;
pub const COLOR_DONE: Color = Color::Green;
pub const COLOR_FAILED: Color = Color::Red;
pub const COLOR_WARNING: Color = Color::Yellow;
pub const COLOR_DETAILS: Color = Color::DarkGrey;
pub const COLOR_TIME: Color = Color::Cyan;

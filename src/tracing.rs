//! Tracing infrastructure for diagnosing listener and edit sequences
//!
//! # Usage
//!
//! Configure via RUST_LOG environment variable:
//! - `RUST_LOG=debug` - all debug logs
//! - `RUST_LOG=styledtext::registry=trace` - every dispatched query
//! - `RUST_LOG=styledtext::content=debug` - mutations as they are applied
//!
//! # Log Files
//!
//! Logs are written to `~/.config/styledtext/logs/stx.log` with daily rotation.
//! File logging uses debug level by default.
//!
//! The library never installs a subscriber; hosting applications (and the
//! `stx` binary) call [`init`].

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::editor::StyledText;

/// Initialize tracing subscriber with console and file logging
///
/// Console output respects RUST_LOG (default `warn`). File logging writes to
/// the config dir's `logs/stx.log` with daily rotation, at debug level.
pub fn init() {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_filter(console_filter);

    let file_layer = match crate::config_paths::ensure_logs_dir() {
        Ok(logs_dir) => {
            let file_appender =
                tracing_appender::rolling::daily(logs_dir, crate::config_paths::LOG_FILE_PREFIX);
            Some(
                fmt::layer()
                    .with_writer(file_appender)
                    .with_ansi(false)
                    .with_target(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new("debug")),
            )
        }
        Err(e) => {
            eprintln!("Warning: Could not initialize file logging: {}", e);
            None
        }
    };

    if let Err(e) = tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
    {
        eprintln!("Warning: tracing already initialized: {}", e);
    }
}

/// Lightweight snapshot of caret/selection state for diffing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaretSnapshot {
    pub caret: usize,
    pub anchor: usize,
    pub line: usize,
    pub column: usize,
    pub char_count: usize,
}

impl CaretSnapshot {
    pub fn from_view(view: &StyledText) -> Self {
        let caret = view.caret_offset();
        let line = view.line_at_offset(caret);
        let column = caret - view.offset_at_line(line);
        Self {
            caret,
            anchor: view.selection().anchor,
            line,
            column,
            char_count: view.char_count(),
        }
    }

    /// Describe what changed between two snapshots
    pub fn diff(&self, other: &CaretSnapshot) -> Option<String> {
        let mut changes = Vec::new();
        if self.caret != other.caret {
            changes.push(format!(
                "caret ({},{}) → ({},{})",
                self.line, self.column, other.line, other.column
            ));
        }
        let was_empty = self.anchor == self.caret;
        let is_empty = other.anchor == other.caret;
        if was_empty != is_empty {
            let status = if is_empty { "cleared" } else { "active" };
            changes.push(format!("selection {}", status));
        }
        if self.char_count != other.char_count {
            changes.push(format!(
                "length {} → {}",
                self.char_count, other.char_count
            ));
        }

        if changes.is_empty() {
            None
        } else {
            Some(changes.join("; "))
        }
    }
}

//! Throttled single-line progress display
//!
//! Renders an overwritten status line such as
//! `Level 2/3 | Scope 2/3 | Queries 1/3 | Current: rust async runtimes`.
//! Updates arriving within the throttle interval of the previous render are
//! dropped, not queued.

use std::io::Write;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use console::Term;
use tracing::debug;

use crate::research::types::{InvestigationProgress, ProgressObserver};

/// Minimum time between two renders
pub const DEFAULT_THROTTLE_INTERVAL: Duration = Duration::from_millis(500);

/// Inquiry width used when the terminal width is unknown
const FALLBACK_INQUIRY_WIDTH: usize = 50;

/// Lower bound on the inquiry width for narrow terminals
const MIN_INQUIRY_WIDTH: usize = 20;

const CLEAR_LINE: &str = "\r\x1b[K";

pub struct ProgressReporter<W: Write + Send = Term> {
    state: Mutex<ReporterState<W>>,
    interval: Duration,
    columns: Option<usize>,
}

struct ReporterState<W> {
    sink: W,
    last_render: Option<Instant>,
    rendered: bool,
}

impl ProgressReporter<Term> {
    /// Reporter writing to stdout, sized to the current terminal
    pub fn stdout() -> Self {
        let term = Term::stdout();
        let columns = term.size_checked().map(|(_, cols)| cols as usize);
        Self::new(term, columns)
    }
}

impl<W: Write + Send> ProgressReporter<W> {
    /// Reporter writing to `sink`; `columns` is the terminal width if known.
    pub fn new(sink: W, columns: Option<usize>) -> Self {
        Self {
            state: Mutex::new(ReporterState {
                sink,
                last_render: None,
                rendered: false,
            }),
            interval: DEFAULT_THROTTLE_INTERVAL,
            columns,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Render `progress` unless the previous render was too recent.
    pub fn update_progress(&self, progress: &InvestigationProgress) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        let now = Instant::now();
        if let Some(last) = state.last_render {
            if now.duration_since(last) < self.interval {
                return;
            }
        }
        state.last_render = Some(now);

        let line = self.render_line(progress);
        let result = state
            .sink
            .write_all(format!("{}{}", CLEAR_LINE, line).as_bytes())
            .and_then(|_| state.sink.flush());
        match result {
            Ok(()) => state.rendered = true,
            Err(e) => debug!(error = %e, "Failed to render progress line"),
        }
    }

    /// Terminate the status line so later output starts on a fresh line.
    pub fn finish(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.rendered {
            let _ = state.sink.write_all(b"\n").and_then(|_| state.sink.flush());
            state.rendered = false;
        }
    }

    fn render_line(&self, progress: &InvestigationProgress) -> String {
        let mut line = format!(
            "Level {}/{} | Scope {}/{} | Queries {}/{}",
            progress.current_level,
            progress.total_levels,
            progress.current_scope,
            progress.total_scope,
            progress.completed_inquiries,
            progress.total_inquiries,
        );

        if let Some(inquiry) = &progress.current_inquiry {
            let max_len = match self.columns {
                Some(cols) => cols.saturating_sub(line.len() + 5).max(MIN_INQUIRY_WIDTH),
                None => FALLBACK_INQUIRY_WIDTH,
            };
            line.push_str(" | Current: ");
            line.push_str(&truncate(inquiry, max_len));
        }

        line
    }
}

impl<W: Write + Send> ProgressObserver for ProgressReporter<W> {
    fn on_progress(&self, progress: &InvestigationProgress) {
        self.update_progress(progress);
    }
}

fn truncate(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
}

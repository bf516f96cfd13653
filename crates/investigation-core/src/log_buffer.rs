//! Bounded, timestamped log of engine messages.
//!
//! Constructed by the caller and shared by `Arc`, so independent
//! investigations (and tests) each get their own buffer. Every message is
//! also emitted through `tracing`.

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::Utc;
use tracing::{error, info, warn};

/// Default number of retained messages
pub const DEFAULT_LOG_CAPACITY: usize = 1000;

#[derive(Debug)]
pub struct InvestigationLog {
    entries: Mutex<VecDeque<String>>,
    capacity: usize,
}

impl Default for InvestigationLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_LOG_CAPACITY)
    }
}

impl InvestigationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity.min(DEFAULT_LOG_CAPACITY))),
            capacity,
        }
    }

    /// Record a message, evicting the oldest entries beyond capacity.
    pub fn record(&self, message: impl Into<String>) {
        let message = message.into();
        info!(target: "investigation", "{}", message);
        self.push(message);
    }

    /// Record a recoverable failure (e.g. a timed-out branch)
    pub fn warn(&self, message: impl Into<String>) {
        let message = message.into();
        warn!(target: "investigation", "{}", message);
        self.push(message);
    }

    pub fn error(&self, message: impl Into<String>) {
        let message = message.into();
        error!(target: "investigation", "{}", message);
        self.push(message);
    }

    fn push(&self, message: String) {
        let line = format!("[{}] {}", Utc::now().to_rfc3339(), message);
        let mut entries = self.lock();
        entries.push_back(line);
        while entries.len() > self.capacity {
            entries.pop_front();
        }
    }

    /// Copy of the retained entries, oldest first
    pub fn entries(&self) -> Vec<String> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<String>> {
        // A poisoned log is still a valid list of strings.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

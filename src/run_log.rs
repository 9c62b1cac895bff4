/*!
 * Per-run log capture.
 *
 * Every pipeline component receives a `RunLog` handle when it is constructed.
 * Messages are forwarded to the `log` facade and also kept in memory, so a run
 * can write its issues to a file afterwards and tests can assert on what a
 * component reported without installing a global logger.
 */

use std::sync::Arc;

use parking_lot::Mutex;

/// Log entry captured during a run
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub level: String,
    pub message: String,
}

/// Shared, cloneable log handle
#[derive(Debug, Clone)]
pub struct RunLog {
    // @field: Component prefix used in forwarded messages
    scope: Option<String>,
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl Default for RunLog {
    fn default() -> Self {
        Self::new()
    }
}

impl RunLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self {
            scope: None,
            entries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Same storage, messages prefixed with `[scope]` (e.g. the target language)
    pub fn scoped(&self, scope: &str) -> Self {
        Self {
            scope: Some(scope.to_string()),
            entries: Arc::clone(&self.entries),
        }
    }

    fn decorate(&self, message: &str) -> String {
        match &self.scope {
            Some(scope) => format!("[{}] {}", scope, message),
            None => message.to_string(),
        }
    }

    fn record(&self, level: &str, message: String) {
        self.entries.lock().push(LogEntry {
            level: level.to_string(),
            message,
        });
    }

    pub fn error(&self, message: impl AsRef<str>) {
        let message = self.decorate(message.as_ref());
        log::error!("{}", message);
        self.record("ERROR", message);
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        let message = self.decorate(message.as_ref());
        log::warn!("{}", message);
        self.record("WARN", message);
    }

    pub fn info(&self, message: impl AsRef<str>) {
        let message = self.decorate(message.as_ref());
        log::info!("{}", message);
        self.record("INFO", message);
    }

    // Debug output is forwarded only; it is too chatty to keep per run.
    pub fn debug(&self, message: impl AsRef<str>) {
        log::debug!("{}", self.decorate(message.as_ref()));
    }

    /// Snapshot of everything recorded so far
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }

    /// Entries at WARN or ERROR level
    pub fn issues(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .iter()
            .filter(|entry| entry.level == "WARN" || entry.level == "ERROR")
            .cloned()
            .collect()
    }

    /// True if any recorded message contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.entries.lock().iter().any(|entry| entry.message.contains(needle))
    }
}

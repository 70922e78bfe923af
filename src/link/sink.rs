//! Diagnostic sink collaborators.
//!
//! Every user-visible outcome leaves the node through a
//! [`DiagnosticSink`]: an append-only, best-effort message channel.
//! Production wiring forwards to the `log` facade; tests capture lines in
//! memory and assert on them.

use std::sync::{Arc, Mutex};

/// Append-only diagnostic output.
///
/// Best effort by contract: implementations swallow their own failures
/// rather than propagate them back into the control loop.
pub trait DiagnosticSink {
    /// Appends one message.
    fn log(&mut self, message: &str);
}

/// Forwards diagnostics to the `log` facade at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn log(&mut self, message: &str) {
        log::info!("{message}");
    }
}

/// Captures diagnostics in memory for test assertions.
///
/// Clones share the buffer, so a test can hand one handle to the node
/// and keep another for inspection.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured lines, oldest first.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    /// Number of captured lines.
    pub fn len(&self) -> usize {
        self.lines.lock().unwrap().len()
    }

    /// Whether nothing has been captured yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether any captured line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.lock().unwrap().iter().any(|l| l.contains(needle))
    }
}

impl DiagnosticSink for MemorySink {
    fn log(&mut self, message: &str) {
        self.lines.lock().unwrap().push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_captures_in_order() {
        let mut sink = MemorySink::new();
        sink.log("first");
        sink.log("second");
        assert_eq!(sink.lines(), vec!["first", "second"]);
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn test_memory_sink_clones_share_buffer() {
        let sink = MemorySink::new();
        let mut writer = sink.clone();
        writer.log("via clone");
        assert!(sink.contains("via clone"));
        assert!(!sink.is_empty());
    }

    #[test]
    fn test_log_sink_does_not_panic() {
        let mut sink = LogSink;
        sink.log("smoke");
    }
}

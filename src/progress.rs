//! Live progress reporting for scrape runs.
//!
//! The orchestrator reports human-readable milestones through a [`LogSink`]
//! value it is constructed with. The binary logs through [`TracingSink`];
//! tests capture lines with `MemorySink`.

#[cfg(test)]
use std::sync::{Arc, Mutex};

#[cfg(test)]
use chrono::Local;
use tracing::info;

/// Something that accepts progress lines. Appends must not block the
/// scraping flow for longer than a short lock.
pub trait LogSink: Send + Sync {
    fn append(&self, message: &str);
}

/// Forwards progress lines to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn append(&self, message: &str) {
        info!("{}", message);
    }
}

/// Keeps `[HH:MM:SS] message` lines in memory for later display.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

#[cfg(test)]
impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything appended so far
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
impl LogSink for MemorySink {
    fn append(&self, message: &str) {
        let stamped = format!("[{}] {}", Local::now().format("%H:%M:%S"), message);
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(stamped);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_stamps_lines() {
        let sink = MemorySink::new();
        sink.append("Starting scrape");
        let lines = sink.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].ends_with("] Starting scrape"));
    }

    #[test]
    fn clones_share_the_buffer() {
        let sink = MemorySink::new();
        let shared = sink.clone();
        shared.append("one");
        sink.append("two");
        assert_eq!(sink.lines().len(), 2);
    }
}

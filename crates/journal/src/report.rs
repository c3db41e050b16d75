//! Operator-visible narration of a maintenance run

use tracing::warn;

/// Destination for report lines (console, message queue, ...)
pub trait ReportSink {
    /// Emit one line of text
    fn report(&mut self, message: &str) -> Result<(), String>;
}

/// Fire-and-forget wrapper around a sink
///
/// Sink failures are logged and swallowed so reporting never aborts a run.
pub struct Reporter<'a> {
    sink: &'a mut dyn ReportSink,
    failures: usize,
}

impl<'a> Reporter<'a> {
    pub fn new(sink: &'a mut dyn ReportSink) -> Self {
        Self { sink, failures: 0 }
    }

    pub fn line(&mut self, message: impl AsRef<str>) {
        let message = message.as_ref();
        if let Err(e) = self.sink.report(message) {
            self.failures += 1;
            warn!("Failed to send report line: {}", e);
        }
    }

    /// Number of lines the sink rejected
    pub fn failures(&self) -> usize {
        self.failures
    }
}

/// Sink that keeps every line in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    pub lines: Vec<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any recorded line contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|l| l.contains(needle))
    }
}

impl ReportSink for MemorySink {
    fn report(&mut self, message: &str) -> Result<(), String> {
        self.lines.push(message.to_string());
        Ok(())
    }
}

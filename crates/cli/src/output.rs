//! Report sinks for `*PRINT` and `*MSGQ` output

use chrono::Local;
use journal::ReportSink;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// Writes `HH:MM:SS-message` lines to a console stream
pub struct ConsoleSink<W: Write> {
    out: W,
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl ConsoleSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ReportSink for ConsoleSink<W> {
    fn report(&mut self, message: &str) -> Result<(), String> {
        writeln!(self.out, "{}-{}", Local::now().format("%H:%M:%S"), message)
            .and_then(|_| self.out.flush())
            .map_err(|e| e.to_string())
    }
}

/// Appends informational messages to a message queue file
pub struct MessageQueueSink {
    path: PathBuf,
}

impl MessageQueueSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ReportSink for MessageQueueSink {
    fn report(&mut self, message: &str) -> Result<(), String> {
        let mut queue = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| format!("{} from QMHSNDM ({})", e, self.path.display()))?;
        writeln!(queue, "{} *INFO {}", Local::now().to_rfc3339(), message)
            .map_err(|e| format!("{} from QMHSNDM ({})", e, self.path.display()))
    }
}

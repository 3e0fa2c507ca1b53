//! Observability sinks that diagnostics are reported to

use std::sync::Mutex;

/// Output channel of a reported line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Error,
    Warning,
}

/// Destination for reported diagnostics.
///
/// Implementations must not panic; a line that cannot be written is dropped.
pub trait DiagnosticSink {
    fn record(&self, channel: Channel, text: &str);
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &S {
    fn record(&self, channel: Channel, text: &str) {
        (**self).record(channel, text);
    }
}

/// Sink writing to the process-wide `tracing` subscriber
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, channel: Channel, text: &str) {
        match channel {
            Channel::Error => tracing::error!(target: "sift::diagnostics", "{text}"),
            Channel::Warning => tracing::warn!(target: "sift::diagnostics", "{text}"),
        }
    }
}

/// Sink keeping every line in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    lines: Mutex<Vec<(Channel, String)>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines recorded so far, in order
    pub fn lines(&self) -> Vec<(Channel, String)> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn lines_on(&self, channel: Channel) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|(c, _)| *c == channel)
            .map(|(_, line)| line)
            .collect()
    }
}

impl DiagnosticSink for CollectingSink {
    fn record(&self, channel: Channel, text: &str) {
        let mut lines = match self.lines.lock() {
            Ok(lines) => lines,
            Err(poisoned) => poisoned.into_inner(),
        };
        lines.push((channel, text.to_string()));
    }
}

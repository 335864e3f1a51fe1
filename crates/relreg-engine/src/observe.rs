//! Reporting seam for failures that are hidden from clients.
//!
//! Single-record lookups turn every failure into "not found". The failure is
//! still handed to an [`ErrorSink`] once so operators can see it.

#[cfg(test)]
use std::sync::Mutex;

use crate::error::RegistryError;

/// Receives swallowed resolver failures. Calls are fire-and-forget.
pub trait ErrorSink: Send + Sync {
    fn capture(&self, error: &RegistryError);
}

/// Logs captured errors through `tracing`.
///
/// Not-found class errors are routine traffic and go to `debug`; anything
/// else (unreadable or malformed data) goes to `warn`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingErrorSink;

impl ErrorSink for TracingErrorSink {
    fn capture(&self, error: &RegistryError) {
        if error.is_not_found() {
            tracing::debug!(error = %error, "registry lookup missed");
        } else {
            tracing::warn!(error = %error, "registry record could not be read");
        }
    }
}

/// Keeps captured error messages in memory.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingErrorSink {
    captured: Mutex<Vec<String>>,
}

#[cfg(test)]
impl RecordingErrorSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages captured so far, oldest first.
    pub fn captured(&self) -> Vec<String> {
        self.captured
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
impl ErrorSink for RecordingErrorSink {
    fn capture(&self, error: &RegistryError) {
        if let Ok(mut guard) = self.captured.lock() {
            guard.push(error.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_sink_keeps_order() {
        let sink = RecordingErrorSink::new();
        sink.capture(&RegistryError::InvalidPath {
            segment: "..".into(),
        });
        sink.capture(&RegistryError::InvalidCanonical { raw: "x".into() });
        let captured = sink.captured();
        assert_eq!(captured.len(), 2);
        assert!(captured[0].contains("invalid path"));
        assert!(captured[1].contains("invalid canonical"));
    }
}

//! Thread-safe message accumulator shared by pipeline stages.

use crate::message::LogMessage;
use crate::severity::Severity;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A thread-safe accumulator for log messages.
///
/// Multiple threads can emit messages concurrently via [`emit`](Self::emit).
/// The error count is tracked atomically for fast `has_errors` checks without
/// locking the message vector.
pub struct LogSink {
    messages: Mutex<Vec<LogMessage>>,
    error_count: AtomicUsize,
}

impl LogSink {
    /// Creates a new empty sink.
    pub fn new() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            error_count: AtomicUsize::new(0),
        }
    }

    /// Emits a message into the sink.
    ///
    /// If the message has [`Severity::Error`], the error count is incremented atomically.
    pub fn emit(&self, message: LogMessage) {
        if message.severity == Severity::Error {
            self.error_count.fetch_add(1, Ordering::Relaxed);
        }
        self.lock().push(message);
    }

    /// Emits a debug message.
    pub fn debug(&self, message: impl Into<String>) {
        self.emit(LogMessage::debug(message));
    }

    /// Emits a notice message.
    pub fn notice(&self, message: impl Into<String>) {
        self.emit(LogMessage::notice(message));
    }

    /// Emits a warning message.
    pub fn warning(&self, message: impl Into<String>) {
        self.emit(LogMessage::warning(message));
    }

    /// Returns `true` if any error-severity messages have been emitted.
    pub fn has_errors(&self) -> bool {
        self.error_count.load(Ordering::Relaxed) > 0
    }

    /// Returns the number of error-severity messages emitted so far.
    pub fn error_count(&self) -> usize {
        self.error_count.load(Ordering::Relaxed)
    }

    /// Takes all accumulated messages, leaving the sink empty.
    pub fn take_all(&self) -> Vec<LogMessage> {
        std::mem::take(&mut *self.lock())
    }

    /// Returns a snapshot of all accumulated messages without draining.
    pub fn messages(&self) -> Vec<LogMessage> {
        self.lock().clone()
    }

    /// Returns the texts of the messages with exactly `severity`.
    pub fn messages_with(&self, severity: Severity) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|m| m.severity == severity)
            .map(|m| m.message.clone())
            .collect()
    }

    // A panic while holding the lock cannot leave the vector half-written,
    // so a poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, Vec<LogMessage>> {
        self.messages.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new()
    }
}

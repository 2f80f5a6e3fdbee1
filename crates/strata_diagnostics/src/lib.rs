//! Leveled log messages for the mapper pipeline and the CLI.
//!
//! Pipeline stages emit [`LogMessage`]s into a shared, thread-safe
//! [`LogSink`] instead of printing. The CLI drains the sink once a command
//! finishes and formats the messages with a [`LogRenderer`].

#![warn(missing_docs)]

pub mod message;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use message::LogMessage;
pub use renderer::{LogRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::LogSink;

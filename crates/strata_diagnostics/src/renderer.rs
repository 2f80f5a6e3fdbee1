//! Rendering backends for log messages.

use crate::message::LogMessage;
use crate::severity::Severity;

/// Formats log messages for an output target.
pub trait LogRenderer {
    /// Renders a single message, or `None` when it is filtered out.
    fn render(&self, message: &LogMessage) -> Option<String>;
}

/// Renders messages as `severity: message` lines for a terminal.
///
/// Messages below `min_severity` are dropped. `Info` messages are printed
/// without a prefix since they are plain progress output.
pub struct TerminalRenderer {
    /// The least severe level that is still rendered.
    pub min_severity: Severity,
    /// Whether to use ANSI color codes in output.
    pub color: bool,
}

impl TerminalRenderer {
    /// Creates a new terminal renderer.
    pub fn new(min_severity: Severity, color: bool) -> Self {
        Self {
            min_severity,
            color,
        }
    }

    fn prefix(&self, severity: Severity) -> String {
        if !self.color {
            return format!("{severity}: ");
        }
        let code = match severity {
            Severity::Debug => "2",
            Severity::Info => "0",
            Severity::Notice => "36",
            Severity::Warning => "33",
            Severity::Error => "31",
        };
        format!("\x1b[{code}m{severity}\x1b[0m: ")
    }
}

impl LogRenderer for TerminalRenderer {
    fn render(&self, message: &LogMessage) -> Option<String> {
        if message.severity < self.min_severity {
            return None;
        }
        if message.severity == Severity::Info {
            return Some(message.message.clone());
        }
        Some(format!("{}{}", self.prefix(message.severity), message.message))
    }
}

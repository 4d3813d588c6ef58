//! # Printer Actions
//!
//! Rendering a message does not touch the printer. It produces a list of
//! [`PrinterAction`]s, plain data that is replayed against a
//! [`PrinterSink`](crate::sink::PrinterSink) afterwards:
//!
//! ```text
//! ┌──────────┐     ┌──────────┐     ┌─────────────────┐     ┌────────┐
//! │ Template │ ──► │  Markup  │ ──► │ Vec<Action>     │ ──► │ replay │ ──► sink
//! │  engine  │     │  render  │     │ (inspectable)   │     │        │
//! └──────────┘     └──────────┘     └─────────────────┘     └────────┘
//! ```
//!
//! Every action carries everything it needs, so replaying the same list twice
//! issues exactly the same sink calls.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use tracing::{debug, error};

use crate::error::MissiveError;
use crate::sink::PrinterSink;
use crate::style::Style;

/// One atomic printer operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Apply a complete style frame.
    SetStyle(Style),

    /// Print text as-is (newlines included).
    EmitText(String),

    /// Print an image file.
    EmitImage(PathBuf),

    /// Print a QR code encoding the given data.
    EmitQr(String),

    /// Feed and cut the paper.
    Cut,

    /// Pause replay, giving the device time to cool down.
    Sleep(Duration),
}

/// An [`Operation`] with a short description used in logs.
#[derive(Debug, Clone, PartialEq)]
pub struct PrinterAction {
    pub description: String,
    pub operation: Operation,
}

impl PrinterAction {
    pub fn new(description: impl Into<String>, operation: Operation) -> Self {
        Self {
            description: description.into(),
            operation,
        }
    }

    pub fn set_style(description: impl Into<String>, style: Style) -> Self {
        Self::new(description, Operation::SetStyle(style))
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new("text", Operation::EmitText(text.into()))
    }

    pub fn newline() -> Self {
        Self::new("newline", Operation::EmitText("\n".into()))
    }

    /// Execute this action against a sink.
    ///
    /// Failures are logged with the action description and returned unchanged.
    pub fn run(&self, sink: &mut dyn PrinterSink) -> Result<(), MissiveError> {
        debug!(action = %self.description, "action started");

        let result = match &self.operation {
            Operation::SetStyle(style) => sink.set_style(style),
            Operation::EmitText(text) => sink.print_text(text),
            Operation::EmitImage(path) => sink.print_image(path),
            Operation::EmitQr(data) => sink.print_qr(data),
            Operation::Cut => sink.cut(),
            Operation::Sleep(duration) => {
                thread::sleep(*duration);
                Ok(())
            }
        };

        if let Err(e) = &result {
            error!(action = %self.description, error = %e, "action failed");
        }
        result
    }
}

/// Replay actions in order, stopping at the first failure.
///
/// Actions before the failing one have already reached the device, so a
/// partially printed message is possible.
pub fn replay(actions: &[PrinterAction], sink: &mut dyn PrinterSink) -> Result<(), MissiveError> {
    for action in actions {
        action.run(sink)?;
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{RecordingSink, SinkCall};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_replay_preserves_order() {
        let actions = vec![
            PrinterAction::set_style("set b", Style::DEFAULT),
            PrinterAction::text("hello"),
            PrinterAction::new("qr", Operation::EmitQr("http://a.com".into())),
            PrinterAction::newline(),
            PrinterAction::new("cut", Operation::Cut),
        ];
        let mut sink = RecordingSink::new();
        replay(&actions, &mut sink).unwrap();

        assert_eq!(
            sink.calls,
            vec![
                SinkCall::SetStyle(Style::DEFAULT),
                SinkCall::Text("hello".into()),
                SinkCall::Qr("http://a.com".into()),
                SinkCall::Text("\n".into()),
                SinkCall::Cut,
            ]
        );
    }

    #[test]
    fn test_sleep_does_not_reach_sink() {
        let actions = vec![PrinterAction::new(
            "cool-down",
            Operation::Sleep(Duration::from_millis(1)),
        )];
        let mut sink = RecordingSink::new();
        replay(&actions, &mut sink).unwrap();
        assert!(sink.calls.is_empty());
    }

    #[test]
    fn test_failure_aborts_remaining_actions() {
        let actions = vec![
            PrinterAction::text("first"),
            PrinterAction::new("qr", Operation::EmitQr("x".into())),
            PrinterAction::text("never"),
        ];
        let mut sink = RecordingSink::new().fail_on_qr();
        let err = replay(&actions, &mut sink).unwrap_err();

        assert!(matches!(err, MissiveError::Transport(_)));
        assert_eq!(sink.calls, vec![SinkCall::Text("first".into())]);
    }

    #[test]
    fn test_replay_twice_is_identical() {
        let actions = vec![
            PrinterAction::set_style("set", Style::DEFAULT),
            PrinterAction::text("x"),
        ];
        let mut first = RecordingSink::new();
        let mut second = RecordingSink::new();
        replay(&actions, &mut first).unwrap();
        replay(&actions, &mut second).unwrap();
        assert_eq!(first.calls, second.calls);
    }
}

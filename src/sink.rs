//! # Printer Sinks
//!
//! A [`PrinterSink`] is anything that can carry out printer actions. The
//! processing loop only ever talks to this trait.
//!
//! | Sink | Use |
//! |------|-----|
//! | [`EscPosPrinter`](crate::printer::EscPosPrinter) | Real device, ESC/POS bytes |
//! | [`LogSink`] | `serve --dry-run`, logs every call |
//! | [`RecordingSink`] | Tests and `preview`, records every call |

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::MissiveError;
use crate::style::Style;

/// The capabilities rendering needs from a printer.
pub trait PrinterSink {
    /// Write raw text, newlines included.
    fn print_text(&mut self, text: &str) -> Result<(), MissiveError>;

    /// Print the image stored at `path`.
    fn print_image(&mut self, path: &Path) -> Result<(), MissiveError>;

    /// Print a QR code.
    fn print_qr(&mut self, data: &str) -> Result<(), MissiveError>;

    /// Feed and cut.
    fn cut(&mut self) -> Result<(), MissiveError>;

    /// Apply a complete style frame.
    fn set_style(&mut self, style: &Style) -> Result<(), MissiveError>;
}

impl<S: PrinterSink + ?Sized> PrinterSink for Box<S> {
    fn print_text(&mut self, text: &str) -> Result<(), MissiveError> {
        (**self).print_text(text)
    }

    fn print_image(&mut self, path: &Path) -> Result<(), MissiveError> {
        (**self).print_image(path)
    }

    fn print_qr(&mut self, data: &str) -> Result<(), MissiveError> {
        (**self).print_qr(data)
    }

    fn cut(&mut self) -> Result<(), MissiveError> {
        (**self).cut()
    }

    fn set_style(&mut self, style: &Style) -> Result<(), MissiveError> {
        (**self).set_style(style)
    }
}

/// A call received by a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq)]
pub enum SinkCall {
    Text(String),
    Image(PathBuf),
    Qr(String),
    Cut,
    SetStyle(Style),
}

/// Sink that records calls instead of printing.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub calls: Vec<SinkCall>,
    fail_on_qr: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `print_qr` call fail, for exercising error paths.
    pub fn fail_on_qr(mut self) -> Self {
        self.fail_on_qr = true;
        self
    }

    /// All printed text concatenated, ignoring styles and graphics.
    pub fn printed_text(&self) -> String {
        self.calls
            .iter()
            .filter_map(|call| match call {
                SinkCall::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl PrinterSink for RecordingSink {
    fn print_text(&mut self, text: &str) -> Result<(), MissiveError> {
        self.calls.push(SinkCall::Text(text.to_string()));
        Ok(())
    }

    fn print_image(&mut self, path: &Path) -> Result<(), MissiveError> {
        self.calls.push(SinkCall::Image(path.to_path_buf()));
        Ok(())
    }

    fn print_qr(&mut self, data: &str) -> Result<(), MissiveError> {
        if self.fail_on_qr {
            return Err(MissiveError::Transport("QR output unavailable".into()));
        }
        self.calls.push(SinkCall::Qr(data.to_string()));
        Ok(())
    }

    fn cut(&mut self) -> Result<(), MissiveError> {
        self.calls.push(SinkCall::Cut);
        Ok(())
    }

    fn set_style(&mut self, style: &Style) -> Result<(), MissiveError> {
        self.calls.push(SinkCall::SetStyle(*style));
        Ok(())
    }
}

/// Sink that logs each call at `info` level and prints nothing.
#[derive(Debug, Default)]
pub struct LogSink;

impl PrinterSink for LogSink {
    fn print_text(&mut self, text: &str) -> Result<(), MissiveError> {
        info!(text = ?text, "print text");
        Ok(())
    }

    fn print_image(&mut self, path: &Path) -> Result<(), MissiveError> {
        info!(path = %path.display(), "print image");
        Ok(())
    }

    fn print_qr(&mut self, data: &str) -> Result<(), MissiveError> {
        info!(data, "print qr");
        Ok(())
    }

    fn cut(&mut self) -> Result<(), MissiveError> {
        info!("cut");
        Ok(())
    }

    fn set_style(&mut self, style: &Style) -> Result<(), MissiveError> {
        info!(?style, "set style");
        Ok(())
    }
}

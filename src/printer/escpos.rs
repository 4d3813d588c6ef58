//! # ESC/POS Printer Sink
//!
//! [`EscPosPrinter`] turns sink calls into ESC/POS bytes and writes them to
//! any [`Write`] backend (a [`SerialTransport`](crate::transport::SerialTransport)
//! in production, a `Vec<u8>` in tests).
//!
//! ## Session Start
//!
//! ```text
//! ESC @          reset
//! ESC t 19       code page PC858
//! <style frame>  default style
//! ```
//!
//! ## Line State
//!
//! QR codes, raster images and the cutter only work at the start of a line.
//! The printer tracks whether the last text left a line open and sends
//! `LF` first when it did.

use std::io::Write;
use std::path::Path;

use tracing::debug;

use super::PrinterConfig;
use crate::error::MissiveError;
use crate::protocol::commands::{self, CodePage, LF};
use crate::protocol::qr::{self, ErrorCorrection};
use crate::protocol::{cp858, graphics, text};
use crate::render;
use crate::sink::PrinterSink;
use crate::style::Style;

/// Default QR module size in dots.
pub const DEFAULT_QR_SIZE: u8 = 6;

/// ESC/POS printer over a byte stream.
#[derive(Debug)]
pub struct EscPosPrinter<W: Write> {
    writer: W,
    config: PrinterConfig,
    qr_size: u8,
    line_open: bool,
}

impl<W: Write> EscPosPrinter<W> {
    /// Start a session on `writer`: reset, select PC858, apply the default
    /// style.
    pub fn open(writer: W, config: PrinterConfig, qr_size: u8) -> Result<Self, MissiveError> {
        let mut printer = Self {
            writer,
            config,
            qr_size,
            line_open: false,
        };

        let mut init = commands::init();
        init.extend(commands::code_page(CodePage::Pc858));
        init.extend(text::style(&Style::DEFAULT));
        printer.send(&init)?;

        debug!(printer = config.name, "printer initialised");
        Ok(printer)
    }

    pub fn config(&self) -> &PrinterConfig {
        &self.config
    }

    /// Give back the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn send(&mut self, bytes: &[u8]) -> Result<(), MissiveError> {
        self.writer
            .write_all(bytes)
            .and_then(|()| self.writer.flush())
            .map_err(|e| MissiveError::Transport(format!("Write failed: {}", e)))
    }

    /// Bytes that end an open line, if any.
    fn line_break(&mut self) -> Vec<u8> {
        if std::mem::take(&mut self.line_open) {
            vec![LF]
        } else {
            Vec::new()
        }
    }
}

impl<W: Write> PrinterSink for EscPosPrinter<W> {
    fn print_text(&mut self, text: &str) -> Result<(), MissiveError> {
        if text.is_empty() {
            return Ok(());
        }
        self.send(&cp858::encode(text))?;
        self.line_open = !text.ends_with('\n');
        Ok(())
    }

    fn print_image(&mut self, path: &Path) -> Result<(), MissiveError> {
        let raster = render::load_raster(path, self.config.width_dots as u32)?;
        debug!(
            path = %path.display(),
            width = raster.width,
            height = raster.height,
            "printing image"
        );

        let mut out = self.line_break();
        out.extend(graphics::raster_chunked(
            raster.width,
            raster.height,
            &raster.data,
            self.config.max_chunk_rows,
        ));
        self.send(&out)
    }

    fn print_qr(&mut self, data: &str) -> Result<(), MissiveError> {
        let mut out = self.line_break();
        out.extend(qr::qr_code(data, self.qr_size, ErrorCorrection::L)?);
        self.send(&out)
    }

    fn cut(&mut self) -> Result<(), MissiveError> {
        let mut out = self.line_break();
        out.extend(commands::cut_full_feed(self.config.cut_feed));
        self.send(&out)
    }

    fn set_style(&mut self, style: &Style) -> Result<(), MissiveError> {
        self.send(&text::style(style))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Align;
    use image::{GrayImage, Luma};
    use pretty_assertions::assert_eq;
    use std::io;

    fn session() -> Vec<u8> {
        let mut bytes = vec![0x1B, 0x40, 0x1B, 0x74, 19];
        bytes.extend(text::style(&Style::DEFAULT));
        bytes
    }

    fn printer() -> EscPosPrinter<Vec<u8>> {
        EscPosPrinter::open(Vec::new(), PrinterConfig::TM_T88III, DEFAULT_QR_SIZE).unwrap()
    }

    fn written(printer: EscPosPrinter<Vec<u8>>) -> Vec<u8> {
        printer.into_inner()[session().len()..].to_vec()
    }

    #[test]
    fn test_open_sends_session_start() {
        assert_eq!(printer().into_inner(), session());
    }

    #[test]
    fn test_text_is_cp858() {
        let mut p = printer();
        p.print_text("5€\n").unwrap();
        assert_eq!(written(p), vec![b'5', 0xD5, b'\n']);
    }

    #[test]
    fn test_set_style_sends_frame() {
        let centered = Style {
            align: Align::Center,
            ..Style::DEFAULT
        };
        let mut p = printer();
        p.set_style(&centered).unwrap();
        assert_eq!(written(p), text::style(&centered));
    }

    #[test]
    fn test_cut_after_open_line_breaks_first() {
        let mut p = printer();
        p.print_text("label").unwrap();
        p.cut().unwrap();
        assert_eq!(written(p), b"label\n\x1D\x56\x41\x03".to_vec());
    }

    #[test]
    fn test_cut_after_newline_does_not_add_one() {
        let mut p = printer();
        p.print_text("done\n").unwrap();
        p.cut().unwrap();
        assert_eq!(written(p), b"done\n\x1D\x56\x41\x03".to_vec());
    }

    #[test]
    fn test_qr_uses_configured_size() {
        let mut p = EscPosPrinter::open(Vec::new(), PrinterConfig::TM_T88III, 4).unwrap();
        p.print_qr("http://a.com").unwrap();
        let out = written(p);
        assert_eq!(
            &out[..9],
            &[0x1D, 0x28, 0x6B, 0x04, 0x00, 0x31, 0x41, 0x32, 0x00]
        );
        assert_eq!(out[16], 4);
    }

    #[test]
    fn test_empty_qr_is_protocol_error() {
        let mut p = printer();
        assert!(matches!(p.print_qr(""), Err(MissiveError::Protocol(_))));
    }

    #[test]
    fn test_image_is_rastered() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("black.png");
        GrayImage::from_pixel(16, 2, Luma([0])).save(&path).unwrap();

        let mut p = printer();
        p.print_image(&path).unwrap();
        assert_eq!(
            written(p),
            vec![0x1D, 0x76, 0x30, 0, 2, 0, 2, 0, 0xFF, 0xFF, 0xFF, 0xFF]
        );
    }

    #[test]
    fn test_missing_image_is_image_error() {
        let mut p = printer();
        let err = p.print_image(Path::new("/definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, MissiveError::Image(_)));
    }

    #[derive(Debug)]
    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "unplugged"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_failure_is_transport_error() {
        let err = EscPosPrinter::open(BrokenPipe, PrinterConfig::TM_T88III, 6).unwrap_err();
        assert!(matches!(err, MissiveError::Transport(_)));
    }
}

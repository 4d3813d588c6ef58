//! # Printer Module
//!
//! Printer hardware profiles and the ESC/POS sink that drives them.
//!
//! ## Modules
//!
//! - [`config`]: Printer hardware specifications
//! - [`escpos`]: [`EscPosPrinter`], a [`PrinterSink`](crate::sink::PrinterSink)
//!   writing ESC/POS to any byte stream

pub mod config;
pub mod escpos;

pub use config::PrinterConfig;
pub use escpos::EscPosPrinter;

//! # Printer Transport Layer
//!
//! Communication backends for sending bytes to printers.
//!
//! ## Available Transports
//!
//! - [`serial`]: Serial / USB serial TTY (Unix)
//!
//! Any [`std::io::Write`] works as a printer backend; tests use a `Vec<u8>`.

pub mod serial;

pub use serial::SerialTransport;

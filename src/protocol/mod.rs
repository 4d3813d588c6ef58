//! # ESC/POS Protocol Implementation
//!
//! Low-level command builders for Epson ESC/POS receipt printers. Every
//! builder returns the raw bytes; nothing here touches a device.
//!
//! ## Module Structure
//!
//! - [`commands`]: Init, code page, feed and cut
//! - [`text`]: Text styling, one command per style key
//! - [`qr`]: Native QR codes
//! - [`graphics`]: Raster bit images
//! - [`cp858`]: Unicode to PC858 text encoding
//!
//! ## Usage Example
//!
//! ```
//! use missive::protocol::{commands, cp858, text};
//! use missive::style::{Align, Style};
//!
//! let mut data = Vec::new();
//! data.extend(commands::init());
//! data.extend(commands::code_page(commands::CodePage::Pc858));
//! data.extend(text::style(&Style { align: Align::Center, bold: true, ..Style::DEFAULT }));
//! data.extend(cp858::encode("RECEIPT\n"));
//! data.extend(text::style(&Style::DEFAULT));
//! data.extend(commands::cut_full_feed(3));
//!
//! // Send `data` to the printer via a transport...
//! ```

pub mod commands;
pub mod cp858;
pub mod graphics;
pub mod qr;
pub mod text;

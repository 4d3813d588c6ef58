//! # Inline Markup
//!
//! Messages and templates may contain a small pseudo-HTML tag language:
//!
//! ```text
//! <h1>Header</h1>
//! <center>Centered <b>and bold</b></center>
//! Literal brackets: \<b\>
//! ```
//!
//! ## Modules
//!
//! - [`tags`]: the fixed tag registry
//! - [`parser`]: text → tree of [`Node`]s
//! - [`render`]: tree → ordered [`PrinterAction`](crate::action::PrinterAction)s

pub mod parser;
pub mod render;
pub mod tags;

pub use parser::{Node, Styled, parse};
pub use render::render;
pub use tags::{TagSpec, list_tags};

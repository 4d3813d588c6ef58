//! # Missive - Message-Relay Receipt Print Server
//!
//! Missive accepts short messages over TCP, queues them on disk and prints
//! them one at a time on an ESC/POS receipt printer. It provides:
//!
//! - **Markup**: a small inline tag language (`<b>`, `<center>`, `<h1>`, ...)
//! - **Templates**: placeholder substitution, URL references and QR codes
//! - **Queue**: a JSON-backed store guarded by an advisory file lock
//! - **Printer output**: ESC/POS commands over a serial TTY
//!
//! ## Data Flow
//!
//! ```text
//! client ──TCP──► server ──► QueueStore ──► worker ──► template ──► markup
//!                                                                     │
//!                             printer ◄── PrinterSink ◄── replay ◄── actions
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use missive::{
//!     message::Message,
//!     sink::RecordingSink,
//!     template::{self, RenderOptions},
//!     action,
//! };
//!
//! let mut message = Message::new("<center>Hi</center>").with_sender("Alice");
//! let actions = template::build_actions(&mut message, "{sender}: {text}", &RenderOptions::default());
//!
//! let mut sink = RecordingSink::new();
//! action::replay(&actions, &mut sink)?;
//! assert_eq!(sink.printed_text(), "Alice: Hi\n");
//!
//! # Ok::<(), missive::error::MissiveError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`style`] | Style frames and overrides |
//! | [`markup`] | Tag registry, parser and action renderer |
//! | [`action`] | Printer actions and replay |
//! | [`template`] | Template engine and template registry |
//! | [`message`] | The queued message record |
//! | [`queue`] | Persistent message queue |
//! | [`sink`] | The printer capability trait and test sinks |
//! | [`protocol`] | ESC/POS command builders |
//! | [`printer`] | Printer profiles and the ESC/POS sink |
//! | [`transport`] | Serial device backend |
//! | [`render`] | Image rasterization and dithering |
//! | [`server`] | TCP ingestion |
//! | [`worker`] | Processing loop |
//! | [`client`] | Submission client |
//! | [`config`] | Layered configuration |
//! | [`error`] | Error types |

pub mod action;
pub mod client;
pub mod config;
pub mod error;
pub mod markup;
pub mod message;
pub mod printer;
pub mod protocol;
pub mod queue;
pub mod render;
pub mod server;
pub mod sink;
pub mod style;
pub mod template;
pub mod transport;
pub mod worker;

// Re-exports for convenience
pub use config::MissiveConfig;
pub use error::MissiveError;
pub use message::Message;
pub use printer::PrinterConfig;
pub use queue::QueueStore;
pub use transport::SerialTransport;

//! # TCP Ingestion Server
//!
//! Accepts message submissions over a line-delimited TCP protocol and puts
//! them in the queue.
//!
//! ## Usage
//!
//! ```bash
//! missive serve --config missive.toml
//! ```
//!
//! Then submit from any client:
//!
//! ```bash
//! echo '{"api_key":"…","sender":"Alice","text":"<b>hi</b>"}' | nc 127.0.0.1 9000
//! ```
//!
//! ## Connection Lifecycle
//!
//! ```text
//! accept ──► spawn task ──► read one line ──► handle (blocking pool) ──► reply ──► close
//! ```
//!
//! Each connection carries exactly one submission. Failures are reported
//! to that client only; the listener keeps running.

mod handler;
pub mod image;
mod state;

pub use handler::{Reply, STORED_REPLY, Submission, UNAUTHORIZED_REPLY, handle_line};
pub use image::ImageSettings;
pub use state::{IngestState, SecurityConfig, ServerConfig};

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::error::MissiveError;

/// Bind the listener described by `config`.
pub async fn bind(config: &ServerConfig) -> Result<TcpListener, MissiveError> {
    let addr = config.listen_addr();
    TcpListener::bind(&addr)
        .await
        .map_err(|e| MissiveError::Transport(format!("Failed to bind to {}: {}", addr, e)))
}

/// Accept connections until `shutdown` completes.
///
/// ## Example
///
/// ```no_run
/// use missive::queue::QueueStore;
/// use missive::server::{self, ImageSettings, IngestState, SecurityConfig, ServerConfig};
///
/// # async fn example() -> Result<(), missive::error::MissiveError> {
/// let config = ServerConfig::default();
/// let state = IngestState {
///     store: QueueStore::open("data")?,
///     security: SecurityConfig::default(),
///     image: ImageSettings::default(),
///     max_line_bytes: config.max_line_bytes,
///     read_timeout: config.read_timeout(),
/// };
///
/// let listener = server::bind(&config).await?;
/// server::serve(listener, state, async {
///     let _ = tokio::signal::ctrl_c().await;
/// })
/// .await;
/// # Ok(())
/// # }
/// ```
pub async fn serve(listener: TcpListener, state: IngestState, shutdown: impl Future<Output = ()>) {
    let state = Arc::new(state);
    if let Ok(addr) = listener.local_addr() {
        info!(addr = %addr, "listening for submissions");
    }

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("listener stopping");
                return;
            }
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    tokio::spawn(handler::handle_connection(stream, peer, Arc::clone(&state)));
                }
                Err(e) => {
                    warn!(error = %e, "accept failed");
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
            },
        }
    }
}

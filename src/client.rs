//! Submission client, used by `missive send`.
//!
//! Opens one connection per submission, writes the JSON line and waits for
//! the server's status line.

use std::path::Path;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, instrument};

use crate::error::MissiveError;
use crate::server::Submission;

/// Client for a missive server.
#[derive(Debug, Clone)]
pub struct Client {
    addr: String,
    timeout: Duration,
}

impl Client {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            addr: format!("{}:{}", host, port),
            timeout: Duration::from_secs(30),
        }
    }

    /// Set the timeout for the whole exchange
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Send `submission` and return the server's reply without the newline.
    #[instrument(skip(self, submission), fields(addr = %self.addr))]
    pub async fn send(&self, submission: &Submission) -> Result<String, MissiveError> {
        let mut line = serde_json::to_vec(submission)?;
        line.push(b'\n');

        tokio::time::timeout(self.timeout, self.exchange(&line))
            .await
            .map_err(|_| MissiveError::Transport(format!("Timed out talking to {}", self.addr)))?
    }

    async fn exchange(&self, line: &[u8]) -> Result<String, MissiveError> {
        let stream = TcpStream::connect(&self.addr)
            .await
            .map_err(|e| MissiveError::Transport(format!("{}: {}", self.addr, e)))?;
        let (reader, mut writer) = stream.into_split();

        debug!(bytes = line.len(), "sending submission");
        writer
            .write_all(line)
            .await
            .map_err(|e| MissiveError::Transport(format!("Write failed: {}", e)))?;
        writer.flush().await?;

        let mut reply = String::new();
        BufReader::new(reader)
            .read_line(&mut reply)
            .await
            .map_err(|e| MissiveError::Transport(format!("Read failed: {}", e)))?;
        if reply.is_empty() {
            return Err(MissiveError::Transport(format!(
                "{} closed the connection without replying",
                self.addr
            )));
        }
        Ok(reply.trim_end().to_string())
    }
}

/// Read an image file and base64-encode it for [`Submission::image`].
pub fn encode_image_file(path: &Path) -> Result<String, MissiveError> {
    let bytes = std::fs::read(path)
        .map_err(|e| MissiveError::Image(format!("cannot read {}: {}", path.display(), e)))?;
    Ok(STANDARD.encode(bytes))
}

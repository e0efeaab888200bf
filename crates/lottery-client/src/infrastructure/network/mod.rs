//! Network transport for the lottery protocol.
//!
//! [`Connection`] exclusively owns the duplex stream for the session's
//! lifetime. Outbound messages are encoded fully in memory by `lottery-core`
//! and written with `write_all`, so partial writes are retried by the runtime
//! until the whole frame is on the wire or the stream errors. Inbound data is
//! fixed-shape and read with `read_exact`; a clean closure mid-read surfaces
//! as a transport error.

pub mod mock;

use lottery_core::{decode_winners, encode_message, ClientMessage, ResponseStatus};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, trace};

/// Upper bound on the winner count a response may declare. The count is an
/// untrusted wire value that sizes an allocation, so a corrupt or hostile
/// response must not be able to request gigabytes.
const MAX_WINNERS: u32 = 1 << 20;

/// Errors that can occur in the client network layer.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// An I/O error occurred on the established connection, including
    /// premature closure mid-read.
    #[error("connection I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The connection was already closed by [`Connection::close`].
    #[error("connection already closed")]
    Closed,

    /// The server answered the winners query with a non-OK status byte.
    #[error("server reported error (status {status})")]
    Rejected { status: u8 },
}

/// Owns the duplex stream to the lottery server.
///
/// The stream is held in an `Option` so that [`Connection::close`] tears it
/// down exactly once; a second close is a no-op.
pub struct Connection<S> {
    stream: Option<S>,
}

impl<S: AsyncRead + AsyncWrite + Unpin> Connection<S> {
    /// Wraps an already-connected duplex stream.
    pub fn new(stream: S) -> Self {
        Self {
            stream: Some(stream),
        }
    }

    fn stream_mut(&mut self) -> Result<&mut S, NetworkError> {
        self.stream.as_mut().ok_or(NetworkError::Closed)
    }

    /// Encodes and sends one framed message.
    pub async fn send(&mut self, msg: &ClientMessage) -> Result<(), NetworkError> {
        let bytes = encode_message(msg);
        let stream = self.stream_mut()?;
        stream.write_all(&bytes).await?;
        stream.flush().await?;
        trace!(msg_type = ?msg.message_type(), frame_len = bytes.len(), "sent message");
        Ok(())
    }

    /// Reads the 1-byte response that follows a Batch or FinishedNotice.
    ///
    /// Any status byte is structurally accepted; bytes other than OK/ERROR
    /// decode as [`ResponseStatus::Unknown`] and count as a rejection.
    pub async fn recv_response(&mut self) -> Result<ResponseStatus, NetworkError> {
        let stream = self.stream_mut()?;
        let mut status = [0u8; 1];
        stream.read_exact(&mut status).await?;
        Ok(ResponseStatus::from_byte(status[0]))
    }

    /// Reads a winners response: 1-byte status, then on OK a 4-byte count
    /// followed by that many 4-byte document numbers.
    ///
    /// A non-OK status yields [`NetworkError::Rejected`] without reading any
    /// winners payload. A stream closure before the full payload arrives is
    /// a transport error.
    pub async fn recv_winners(&mut self) -> Result<Vec<String>, NetworkError> {
        let status = self.recv_response().await?;
        if !status.is_accepted() {
            return Err(NetworkError::Rejected {
                status: status.as_byte(),
            });
        }

        let stream = self.stream_mut()?;
        let mut count_buf = [0u8; 4];
        stream.read_exact(&mut count_buf).await?;
        let count = u32::from_be_bytes(count_buf);
        if count > MAX_WINNERS {
            return Err(NetworkError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("winner count {count} exceeds limit {MAX_WINNERS}"),
            )));
        }
        let count = count as usize;

        let mut payload = vec![0u8; 4 + count * 4];
        payload[0..4].copy_from_slice(&count_buf);
        stream.read_exact(&mut payload[4..]).await?;

        let winners = decode_winners(&payload).map_err(|e| {
            NetworkError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                e.to_string(),
            ))
        })?;
        debug!(count, "received winners list");
        Ok(winners)
    }

    /// Shuts down the stream. Idempotent: only the first call closes.
    pub async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.shutdown().await {
                trace!("stream shutdown error ignored: {e}");
            }
            debug!("connection closed");
        }
    }

    /// Whether [`Connection::close`] has already run.
    pub fn is_closed(&self) -> bool {
        self.stream.is_none()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

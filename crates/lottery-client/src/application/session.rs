//! The session state machine.
//!
//! ```text
//! Connecting → SendingBatches → NotifyingFinished → QueryingWinners → Done
//!     │              │                  │                  │(retry, fixed delay)
//!     └──────────────┴──────────────────┴──→ Failed        └──→ self-loop
//! ```
//!
//! The socket bootstrap (the `Connecting` state) is the caller's job; the
//! controller takes the open stream, owns it exclusively for the session,
//! and closes it exactly once on every exit path. A `ShuttingDown` signal is
//! observed cooperatively between steps: in-flight reads and writes are
//! never interrupted, they complete or fail on their own.
//!
//! The winner-query retry loop is deliberately unbounded: the server
//! computes winners asynchronously once every agency has finished, so the
//! client polls until results arrive or shutdown is requested.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use lottery_core::ClientMessage;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time;
use tracing::{error, info, warn};

use crate::application::send_batches::BatchAssembler;
use crate::infrastructure::network::{Connection, NetworkError};
use crate::infrastructure::record_source::RecordSource;

/// Cooperative cancellation token.
///
/// Cloned into whoever needs to signal shutdown (e.g. the Ctrl-C handler)
/// and passed by reference into each phase, which checks it at defined
/// points. There is no global flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// All phases completed; carries the formatted winners list.
    Done(Vec<String>),
    /// A transport-level failure ended the session.
    Failed,
    /// Shutdown was observed at a cooperative checkpoint.
    Cancelled,
}

/// Knobs the session needs from configuration.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub agency_id: u32,
    pub max_batch_size: usize,
    /// Wait between winner-query attempts.
    pub retry_delay: Duration,
}

/// Orchestrates one full upload session over an exclusively-owned stream.
pub struct SessionController<S> {
    conn: Connection<S>,
    settings: SessionSettings,
    cancel: CancelToken,
}

impl<S: AsyncRead + AsyncWrite + Unpin> SessionController<S> {
    /// Takes ownership of the open stream produced by the socket bootstrap.
    pub fn new(stream: S, settings: SessionSettings, cancel: CancelToken) -> Self {
        Self {
            conn: Connection::new(stream),
            settings,
            cancel,
        }
    }

    /// Runs the session to a terminal outcome.
    ///
    /// No error escapes: every phase decides itself whether to continue,
    /// retry, or halt, and the connection is closed on every exit path.
    pub async fn run<R: RecordSource>(mut self, source: &mut R) -> SessionOutcome {
        let agency_id = self.settings.agency_id;

        // ── SendingBatches ───────────────────────────────────────────────────
        if self.cancel.is_cancelled() {
            return self.finish_cancelled().await;
        }
        info!(agency_id, "phase: sending batches");
        let assembler = BatchAssembler::new(agency_id, self.settings.max_batch_size);
        if let Err(e) = assembler.run(source, &mut self.conn, &self.cancel).await {
            error!(agency_id, error = %e, "transport failure during batch phase");
            return self.finish_failed().await;
        }
        if self.cancel.is_cancelled() {
            return self.finish_cancelled().await;
        }

        // ── NotifyingFinished ────────────────────────────────────────────────
        info!(agency_id, "phase: notifying finished");
        match self.notify_finished().await {
            Ok(accepted) => {
                if !accepted {
                    // Logged as a failure of the optimistic path; the session
                    // still proceeds to query winners.
                    warn!(agency_id, "server rejected finished notice");
                }
            }
            Err(e) => {
                error!(agency_id, error = %e, "transport failure during finished notice");
                return self.finish_failed().await;
            }
        }
        if self.cancel.is_cancelled() {
            return self.finish_cancelled().await;
        }

        // ── QueryingWinners ──────────────────────────────────────────────────
        info!(agency_id, "phase: querying winners");
        let winners = loop {
            if self.cancel.is_cancelled() {
                return self.finish_cancelled().await;
            }
            match self.query_winners_once().await {
                Ok(winners) => break winners,
                Err(NetworkError::Rejected { status }) => {
                    info!(agency_id, status, "winners not ready, will retry");
                }
                Err(e) => {
                    warn!(agency_id, error = %e, "winners query failed, will retry");
                }
            }
            time::sleep(self.settings.retry_delay).await;
        };

        info!(agency_id, winners = winners.len(), "session complete");
        self.conn.close().await;
        SessionOutcome::Done(winners)
    }

    /// Sends the FinishedNotice and waits for its response. Returns whether
    /// the server accepted it.
    async fn notify_finished(&mut self) -> Result<bool, NetworkError> {
        let agency_id = self.settings.agency_id;
        self.conn
            .send(&ClientMessage::FinishedNotice { agency_id })
            .await?;
        let status = self.conn.recv_response().await?;
        Ok(status.is_accepted())
    }

    /// One winner-query attempt: resend the query, then read the response.
    async fn query_winners_once(&mut self) -> Result<Vec<String>, NetworkError> {
        let agency_id = self.settings.agency_id;
        self.conn
            .send(&ClientMessage::QueryWinners { agency_id })
            .await?;
        self.conn.recv_winners().await
    }

    async fn finish_cancelled(mut self) -> SessionOutcome {
        info!(agency_id = self.settings.agency_id, "shutdown observed, ending session");
        self.conn.close().await;
        SessionOutcome::Cancelled
    }

    async fn finish_failed(mut self) -> SessionOutcome {
        self.conn.close().await;
        SessionOutcome::Failed
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

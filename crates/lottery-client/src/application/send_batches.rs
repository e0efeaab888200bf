//! Batch assembly: grouping an unbounded record source into bounded batches.
//!
//! The assembler pulls bets one at a time, accumulates them into an
//! in-progress batch, and transmits the batch as a single framed message
//! whenever it reaches `max_batch_size`. Exactly one message is in flight at
//! a time: each batch waits for the server's 1-byte response before the next
//! record is pulled. On source exhaustion the final non-empty partial batch
//! is flushed once; empty batches are never sent.

use lottery_core::{Bet, ClientMessage};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{info, warn};

use crate::application::session::CancelToken;
use crate::infrastructure::network::{Connection, NetworkError};
use crate::infrastructure::record_source::RecordSource;

/// Counters reported after the batch phase, for the session log.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchStats {
    /// Batches the server accepted.
    pub batches_sent: usize,
    /// Batches the server answered with a non-OK status.
    pub batches_rejected: usize,
    /// Bets contained in accepted batches.
    pub bets_sent: usize,
    /// Malformed source rows that were logged and skipped.
    pub bets_skipped: usize,
}

/// Groups a record source into batches of at most `max_batch_size` bets and
/// drives their transmission.
pub struct BatchAssembler {
    agency_id: u32,
    max_batch_size: usize,
}

impl BatchAssembler {
    pub fn new(agency_id: u32, max_batch_size: usize) -> Self {
        debug_assert!(max_batch_size > 0);
        Self {
            agency_id,
            max_batch_size,
        }
    }

    /// Runs the batch phase to source exhaustion or cancellation.
    ///
    /// A rejected batch is logged and does not abort the remaining batches;
    /// only a transport failure returns `Err` and halts the phase. The
    /// cancellation token is checked before each pull; when set, assembly
    /// stops immediately and the in-progress partial batch is dropped
    /// unsent.
    pub async fn run<S, R>(
        &self,
        source: &mut R,
        conn: &mut Connection<S>,
        cancel: &CancelToken,
    ) -> Result<BatchStats, NetworkError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
        R: RecordSource,
    {
        let mut stats = BatchStats::default();
        let mut batch: Vec<Bet> = Vec::with_capacity(self.max_batch_size);

        loop {
            if cancel.is_cancelled() {
                info!(
                    agency_id = self.agency_id,
                    pending = batch.len(),
                    "cancellation observed, stopping batch assembly"
                );
                return Ok(stats);
            }

            match source.next_bet() {
                None => break,
                Some(Err(e)) => {
                    warn!(agency_id = self.agency_id, error = %e, "skipping malformed record");
                    stats.bets_skipped += 1;
                }
                Some(Ok(bet)) => {
                    batch.push(bet);
                    if batch.len() == self.max_batch_size {
                        self.transmit(conn, &mut batch, &mut stats).await?;
                    }
                }
            }
        }

        // Final partial batch, flushed once on exhaustion.
        if !batch.is_empty() {
            self.transmit(conn, &mut batch, &mut stats).await?;
        }

        info!(
            agency_id = self.agency_id,
            batches_sent = stats.batches_sent,
            batches_rejected = stats.batches_rejected,
            bets_sent = stats.bets_sent,
            bets_skipped = stats.bets_skipped,
            "batch phase complete"
        );
        Ok(stats)
    }

    /// Sends the accumulated batch and waits for its response, leaving
    /// `batch` empty for the next round.
    async fn transmit<S>(
        &self,
        conn: &mut Connection<S>,
        batch: &mut Vec<Bet>,
        stats: &mut BatchStats,
    ) -> Result<(), NetworkError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let bets = std::mem::take(batch);
        let count = bets.len();
        let msg = ClientMessage::Batch {
            agency_id: self.agency_id,
            bets,
        };

        conn.send(&msg).await?;
        let status = conn.recv_response().await?;
        if status.is_accepted() {
            stats.batches_sent += 1;
            stats.bets_sent += count;
        } else {
            // Application-level reject: log and continue with later batches.
            warn!(
                agency_id = self.agency_id,
                batch_index = stats.batches_sent + stats.batches_rejected,
                count,
                status = status.as_byte(),
                "server rejected batch"
            );
            stats.batches_rejected += 1;
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

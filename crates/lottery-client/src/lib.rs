//! lottery-client library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! The client uploads its agency's bets to the lottery server in bounded
//! batches over one persistent TCP connection, notifies the server when the
//! upload is finished, and then polls for the winners list until the draw
//! has been performed:
//!
//! 1. Read bets from the agency's record file (one CSV per agency).
//! 2. Group them into batches of at most `max_batch_size` and send each as a
//!    framed Batch message, waiting for the 1-byte response before the next.
//! 3. Send a FinishedNotice, then QueryWinners; if the server has no results
//!    yet, wait a fixed delay and ask again.
//!
//! Shutdown is cooperative: a cancellation token is observed between steps,
//! never by interrupting an in-flight read or write.

/// Application layer: batch assembly and the session state machine.
pub mod application;

/// Infrastructure layer: network transport, record sources, configuration.
pub mod infrastructure;

//! Application layer: use cases driving the upload session.

pub mod send_batches;
pub mod session;

pub use send_batches::{BatchAssembler, BatchStats};
pub use session::{CancelToken, SessionController, SessionOutcome, SessionSettings};

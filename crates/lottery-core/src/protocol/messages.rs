//! Wire message types for the lottery batch-upload protocol.
//!
//! The protocol is asymmetric: every client-to-server message is framed with
//! an explicit type and payload length, while server-to-client responses are
//! fixed-shape and carry no frame header.

use serde::{Deserialize, Serialize};

use crate::domain::bet::Bet;

// ── Protocol constants ────────────────────────────────────────────────────────

/// Size of the outbound frame header: 4-byte type tag + 4-byte payload length.
pub const FRAME_HEADER_SIZE: usize = 8;

/// Status byte for an accepted message.
pub const RESPONSE_OK: u8 = 0;

/// Status byte for a rejected message.
pub const RESPONSE_ERROR: u8 = 1;

// ── Message type codes ────────────────────────────────────────────────────────

/// Type tag carried in the first four bytes of every outbound frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u32)]
pub enum MessageType {
    /// A bounded group of bets for one agency.
    Batch = 1,
    /// The agency has no further batches to send.
    FinishedNotice = 2,
    /// Ask the server for the winners of the agency's draw.
    QueryWinners = 3,
}

impl TryFrom<u32> for MessageType {
    type Error = ();

    fn try_from(value: u32) -> Result<Self, ()> {
        match value {
            1 => Ok(MessageType::Batch),
            2 => Ok(MessageType::FinishedNotice),
            3 => Ok(MessageType::QueryWinners),
            _ => Err(()),
        }
    }
}

// ── Outbound messages ─────────────────────────────────────────────────────────

/// Every message the client can send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientMessage {
    /// Upload a batch of bets on behalf of one agency.
    Batch { agency_id: u32, bets: Vec<Bet> },
    /// Notify the server that this agency has finished uploading.
    FinishedNotice { agency_id: u32 },
    /// Poll the server for this agency's winners.
    QueryWinners { agency_id: u32 },
}

impl ClientMessage {
    /// The type tag this message carries on the wire.
    pub fn message_type(&self) -> MessageType {
        match self {
            ClientMessage::Batch { .. } => MessageType::Batch,
            ClientMessage::FinishedNotice { .. } => MessageType::FinishedNotice,
            ClientMessage::QueryWinners { .. } => MessageType::QueryWinners,
        }
    }
}

// ── Inbound responses ─────────────────────────────────────────────────────────

/// Decoded form of the 1-byte server response.
///
/// Any status byte other than OK/ERROR is structurally accepted but treated
/// as a rejection, so a misbehaving server degrades to "rejected" rather
/// than desynchronising the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    Accepted,
    Rejected,
    Unknown(u8),
}

impl ResponseStatus {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            RESPONSE_OK => ResponseStatus::Accepted,
            RESPONSE_ERROR => ResponseStatus::Rejected,
            other => ResponseStatus::Unknown(other),
        }
    }

    pub fn is_accepted(self) -> bool {
        matches!(self, ResponseStatus::Accepted)
    }

    /// The raw status byte, for log context.
    pub fn as_byte(self) -> u8 {
        match self {
            ResponseStatus::Accepted => RESPONSE_OK,
            ResponseStatus::Rejected => RESPONSE_ERROR,
            ResponseStatus::Unknown(b) => b,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

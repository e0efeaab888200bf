//! Binary codec for the lottery batch-upload protocol.
//!
//! Outbound wire format:
//! ```text
//! [msg_type:4][payload_len:4][payload:N]
//! ```
//! All multi-byte integers are big-endian. The length field always equals the
//! exact byte count of the payload that follows it.
//!
//! Payload layouts:
//! - Batch:          `agency_id(4) count(4)` then per bet
//!                   `name_len(4) name last_len(4) last document(4) birth_date(4) number(4)`
//! - FinishedNotice: `agency_id(4)`
//! - QueryWinners:   `agency_id(4)`
//!
//! Inbound data is fixed-shape (no frame header); this module provides the
//! pure byte-level pieces ([`decode_winners`], [`format_winner`]) while the
//! transport layer owns the stream reads.

use thiserror::Error;
use tracing::trace;

use crate::domain::bet::{Bet, BirthDate};
use crate::protocol::messages::{ClientMessage, MessageType, FRAME_HEADER_SIZE};

/// Errors that can occur while decoding protocol bytes.
#[derive(Debug, Error, PartialEq)]
pub enum DecodeError {
    /// The byte slice is shorter than the minimum required length.
    #[error("insufficient data: need at least {needed} bytes, got {available}")]
    InsufficientData { needed: usize, available: usize },

    /// The type tag in the frame header is not a recognized value.
    #[error("unknown message type: {0}")]
    UnknownMessageType(u32),

    /// The encoded payload length field does not match the data available.
    #[error("payload length mismatch: header says {declared}, available is {available}")]
    PayloadLengthMismatch { declared: usize, available: usize },

    /// The payload could not be parsed (truncated field, invalid UTF-8, etc.).
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

// ── Encoding ──────────────────────────────────────────────────────────────────

/// Encodes a [`ClientMessage`] into a framed byte vector.
///
/// Field text is already validated and parsed at [`Bet`] construction, so
/// encoding cannot fail; the message is built fully in memory and the caller
/// writes it in one piece, so a bad record never leaves partial bytes on the
/// stream.
///
/// # Examples
///
/// ```rust
/// use lottery_core::{encode_message, decode_message, ClientMessage};
///
/// let msg = ClientMessage::QueryWinners { agency_id: 3 };
/// let bytes = encode_message(&msg);
/// let (decoded, consumed) = decode_message(&bytes).unwrap();
/// assert_eq!(decoded, msg);
/// assert_eq!(consumed, bytes.len());
/// ```
pub fn encode_message(msg: &ClientMessage) -> Vec<u8> {
    let payload = encode_payload(msg);

    let mut buf = Vec::with_capacity(FRAME_HEADER_SIZE + payload.len());
    buf.extend_from_slice(&(msg.message_type() as u32).to_be_bytes());
    buf.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    buf.extend_from_slice(&payload);

    trace!(
        msg_type = ?msg.message_type(),
        payload_len = payload.len(),
        "encoded message"
    );
    buf
}

fn encode_payload(msg: &ClientMessage) -> Vec<u8> {
    let mut buf = Vec::new();
    match msg {
        ClientMessage::Batch { agency_id, bets } => {
            buf.extend_from_slice(&agency_id.to_be_bytes());
            buf.extend_from_slice(&(bets.len() as u32).to_be_bytes());
            for bet in bets {
                encode_bet(&mut buf, bet);
            }
        }
        ClientMessage::FinishedNotice { agency_id } | ClientMessage::QueryWinners { agency_id } => {
            buf.extend_from_slice(&agency_id.to_be_bytes());
        }
    }
    buf
}

fn encode_bet(buf: &mut Vec<u8>, bet: &Bet) {
    write_length_prefixed_string(buf, &bet.first_name);
    write_length_prefixed_string(buf, &bet.last_name);
    buf.extend_from_slice(&bet.document.to_be_bytes());
    buf.extend_from_slice(&bet.birth_date.to_wire().to_be_bytes());
    buf.extend_from_slice(&bet.number.to_be_bytes());
}

// ── Decoding ──────────────────────────────────────────────────────────────────

/// Decodes one framed [`ClientMessage`] from the beginning of `bytes`.
///
/// Returns the decoded message and the total number of bytes consumed
/// (header + payload), so the caller can advance their read cursor. This is
/// the server-side view of the wire; the client uses it in tests and
/// in-process mock servers.
///
/// # Errors
///
/// Returns [`DecodeError`] if the bytes are malformed.
pub fn decode_message(bytes: &[u8]) -> Result<(ClientMessage, usize), DecodeError> {
    if bytes.len() < FRAME_HEADER_SIZE {
        return Err(DecodeError::InsufficientData {
            needed: FRAME_HEADER_SIZE,
            available: bytes.len(),
        });
    }

    let tag = u32::from_be_bytes(bytes[0..4].try_into().unwrap());
    let msg_type = MessageType::try_from(tag).map_err(|_| DecodeError::UnknownMessageType(tag))?;

    let payload_len = u32::from_be_bytes(bytes[4..8].try_into().unwrap()) as usize;
    let total_needed = FRAME_HEADER_SIZE + payload_len;
    if bytes.len() < total_needed {
        return Err(DecodeError::PayloadLengthMismatch {
            declared: payload_len,
            available: bytes.len() - FRAME_HEADER_SIZE,
        });
    }

    let payload = &bytes[FRAME_HEADER_SIZE..total_needed];
    let msg = decode_payload(msg_type, payload)?;
    Ok((msg, total_needed))
}

fn decode_payload(msg_type: MessageType, payload: &[u8]) -> Result<ClientMessage, DecodeError> {
    match msg_type {
        MessageType::Batch => decode_batch(payload),
        MessageType::FinishedNotice => {
            let agency_id = read_u32(payload, 0)?;
            Ok(ClientMessage::FinishedNotice { agency_id })
        }
        MessageType::QueryWinners => {
            let agency_id = read_u32(payload, 0)?;
            Ok(ClientMessage::QueryWinners { agency_id })
        }
    }
}

// Smallest possible encoded bet: two empty length-prefixed strings plus the
// three fixed u32 fields.
const MIN_BET_WIRE_SIZE: usize = 20;

fn decode_batch(p: &[u8]) -> Result<ClientMessage, DecodeError> {
    let agency_id = read_u32(p, 0)?;
    let count = read_u32(p, 4)? as usize;

    // The count is an untrusted wire value that sizes an allocation; a frame
    // cannot legitimately declare more bets than its payload can hold.
    if count > p.len().saturating_sub(8) / MIN_BET_WIRE_SIZE {
        return Err(DecodeError::MalformedPayload(format!(
            "batch declares {count} bets, payload of {} bytes cannot hold them",
            p.len()
        )));
    }

    let mut bets = Vec::with_capacity(count);
    let mut off = 8;
    for _ in 0..count {
        let (first_name, next) = read_length_prefixed_string(p, off)?;
        let (last_name, next) = read_length_prefixed_string(p, next)?;
        let document = read_u32(p, next)?;
        let birth_date = BirthDate::from_wire(read_u32(p, next + 4)?);
        let number = read_u32(p, next + 8)?;
        off = next + 12;
        bets.push(Bet {
            agency_id,
            first_name,
            last_name,
            document,
            birth_date,
            number,
        });
    }
    Ok(ClientMessage::Batch { agency_id, bets })
}

// ── Winners ───────────────────────────────────────────────────────────────────

/// Renders a winning document number as the 8-digit zero-padded form used in
/// the winners list. The width is a floor, not a cap: values wider than
/// eight digits are not truncated.
pub fn format_winner(document: u32) -> String {
    format!("{document:08}")
}

/// Decodes the winners payload that follows an accepted status byte:
/// `count(4)` then `count` 4-byte document numbers.
///
/// # Errors
///
/// Returns [`DecodeError::InsufficientData`] if the slice is shorter than the
/// declared count requires.
pub fn decode_winners(bytes: &[u8]) -> Result<Vec<String>, DecodeError> {
    let count = read_u32(bytes, 0)? as usize;
    let needed = 4 + count * 4;
    if bytes.len() < needed {
        return Err(DecodeError::InsufficientData {
            needed,
            available: bytes.len(),
        });
    }

    let mut winners = Vec::with_capacity(count);
    for i in 0..count {
        let document = read_u32(bytes, 4 + i * 4)?;
        winners.push(format_winner(document));
    }
    Ok(winners)
}

// ── Utility helpers ───────────────────────────────────────────────────────────

fn read_u32(buf: &[u8], offset: usize) -> Result<u32, DecodeError> {
    if buf.len() < offset + 4 {
        return Err(DecodeError::InsufficientData {
            needed: offset + 4,
            available: buf.len(),
        });
    }
    Ok(u32::from_be_bytes(buf[offset..offset + 4].try_into().unwrap()))
}

/// Writes a 4-byte length prefix followed by the raw UTF-8 string bytes.
/// No character-set validation beyond byte-length measurement.
fn write_length_prefixed_string(buf: &mut Vec<u8>, s: &str) {
    let bytes = s.as_bytes();
    buf.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
    buf.extend_from_slice(bytes);
}

/// Reads a 4-byte length prefix and then that many UTF-8 bytes.
/// Returns the string and the offset of the byte after the string.
fn read_length_prefixed_string(buf: &[u8], offset: usize) -> Result<(String, usize), DecodeError> {
    let len = read_u32(buf, offset)? as usize;
    let start = offset + 4;
    if buf.len() < start + len {
        return Err(DecodeError::MalformedPayload(format!(
            "string of length {len} at offset {start} exceeds buffer"
        )));
    }
    let s = std::str::from_utf8(&buf[start..start + len])
        .map_err(|e| DecodeError::MalformedPayload(format!("invalid UTF-8: {e}")))?
        .to_string();
    Ok((s, start + len))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bet(document: u32, number: u32) -> Bet {
        Bet::from_fields(
            1,
            "Santiago Lionel",
            "Lorca",
            &document.to_string(),
            "1999-03-17",
            &number.to_string(),
        )
        .unwrap()
    }

    fn round_trip(msg: &ClientMessage) -> ClientMessage {
        let encoded = encode_message(msg);
        let (decoded, consumed) = decode_message(&encoded).expect("decode failed");
        assert_eq!(consumed, encoded.len(), "consumed bytes should equal total encoded size");
        decoded
    }

    // ── Framing ──────────────────────────────────────────────────────────────

    #[test]
    fn test_length_field_equals_payload_length_for_every_message() {
        let messages = [
            ClientMessage::Batch {
                agency_id: 1,
                bets: vec![sample_bet(30_904_465, 7574), sample_bet(31_234_567, 1234)],
            },
            ClientMessage::FinishedNotice { agency_id: 1 },
            ClientMessage::QueryWinners { agency_id: 1 },
        ];
        for msg in &messages {
            let bytes = encode_message(msg);
            let declared = u32::from_be_bytes(bytes[4..8].try_into().unwrap()) as usize;
            assert_eq!(declared, bytes.len() - FRAME_HEADER_SIZE);
        }
    }

    #[test]
    fn test_type_tag_is_first_four_bytes() {
        let bytes = encode_message(&ClientMessage::FinishedNotice { agency_id: 9 });
        assert_eq!(u32::from_be_bytes(bytes[0..4].try_into().unwrap()), 2);
    }

    #[test]
    fn test_finished_notice_payload_is_agency_id_only() {
        let bytes = encode_message(&ClientMessage::FinishedNotice { agency_id: 5 });
        assert_eq!(bytes.len(), FRAME_HEADER_SIZE + 4);
        assert_eq!(u32::from_be_bytes(bytes[8..12].try_into().unwrap()), 5);
    }

    #[test]
    fn test_query_winners_payload_is_agency_id_only() {
        let bytes = encode_message(&ClientMessage::QueryWinners { agency_id: 3 });
        assert_eq!(bytes.len(), FRAME_HEADER_SIZE + 4);
        assert_eq!(u32::from_be_bytes(bytes[8..12].try_into().unwrap()), 3);
    }

    // ── Batch round trips ────────────────────────────────────────────────────

    #[test]
    fn test_batch_round_trip_recovers_every_field() {
        let msg = ClientMessage::Batch {
            agency_id: 4,
            bets: vec![
                Bet::from_fields(4, "Maria", "Garcia", "31234567", "1995-05-20", "1234").unwrap(),
                Bet::from_fields(4, "Juan Carlos", "Rodriguez", "29876543", "1987-11-15", "9876")
                    .unwrap(),
            ],
        };
        assert_eq!(round_trip(&msg), msg);
    }

    #[test]
    fn test_batch_round_trip_empty_names() {
        let msg = ClientMessage::Batch {
            agency_id: 1,
            bets: vec![Bet::from_fields(1, "", "", "42", "2000-01-01", "0").unwrap()],
        };
        assert_eq!(round_trip(&msg), msg);
    }

    #[test]
    fn test_batch_round_trip_non_ascii_names() {
        let msg = ClientMessage::Batch {
            agency_id: 2,
            bets: vec![Bet::from_fields(2, "José", "Muñoz", "123", "1990-07-01", "99").unwrap()],
        };
        assert_eq!(round_trip(&msg), msg);
    }

    #[test]
    fn test_batch_bet_layout_on_the_wire() {
        let bet = Bet::from_fields(1, "Ana", "Gil", "42", "1999-03-17", "7").unwrap();
        let bytes = encode_message(&ClientMessage::Batch {
            agency_id: 1,
            bets: vec![bet],
        });

        // payload: agency(4) count(4) name_len(4) "Ana" last_len(4) "Gil"
        //          document(4) birth_date(4) number(4)
        let p = &bytes[FRAME_HEADER_SIZE..];
        assert_eq!(u32::from_be_bytes(p[0..4].try_into().unwrap()), 1);
        assert_eq!(u32::from_be_bytes(p[4..8].try_into().unwrap()), 1);
        assert_eq!(u32::from_be_bytes(p[8..12].try_into().unwrap()), 3);
        assert_eq!(&p[12..15], b"Ana");
        assert_eq!(u32::from_be_bytes(p[15..19].try_into().unwrap()), 3);
        assert_eq!(&p[19..22], b"Gil");
        assert_eq!(u32::from_be_bytes(p[22..26].try_into().unwrap()), 42);
        assert_eq!(u32::from_be_bytes(p[26..30].try_into().unwrap()), 19_990_317);
        assert_eq!(u32::from_be_bytes(p[30..34].try_into().unwrap()), 7);
    }

    #[test]
    fn test_finished_notice_round_trip() {
        let msg = ClientMessage::FinishedNotice { agency_id: 7 };
        assert_eq!(round_trip(&msg), msg);
    }

    #[test]
    fn test_query_winners_round_trip() {
        let msg = ClientMessage::QueryWinners { agency_id: 7 };
        assert_eq!(round_trip(&msg), msg);
    }

    // ── Winners ──────────────────────────────────────────────────────────────

    #[test]
    fn test_format_winner_zero_pads_to_eight_digits() {
        assert_eq!(format_winner(42), "00000042");
    }

    #[test]
    fn test_format_winner_does_not_truncate_nine_digits() {
        assert_eq!(format_winner(123_456_789), "123456789");
    }

    #[test]
    fn test_decode_winners_formats_each_document() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&2u32.to_be_bytes());
        payload.extend_from_slice(&42u32.to_be_bytes());
        payload.extend_from_slice(&30_904_465u32.to_be_bytes());

        let winners = decode_winners(&payload).unwrap();
        assert_eq!(winners, vec!["00000042".to_string(), "30904465".to_string()]);
    }

    #[test]
    fn test_decode_winners_empty_list() {
        let payload = 0u32.to_be_bytes();
        assert_eq!(decode_winners(&payload).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_decode_winners_undersized_payload_is_error() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&3u32.to_be_bytes());
        payload.extend_from_slice(&42u32.to_be_bytes()); // only 1 of 3 documents

        let result = decode_winners(&payload);
        assert!(matches!(result, Err(DecodeError::InsufficientData { .. })));
    }

    // ── Error conditions ─────────────────────────────────────────────────────

    #[test]
    fn test_decode_empty_bytes_returns_insufficient_data() {
        let result = decode_message(&[]);
        assert!(matches!(result, Err(DecodeError::InsufficientData { .. })));
    }

    #[test]
    fn test_decode_truncated_header_returns_insufficient_data() {
        let result = decode_message(&[0, 0, 0, 1]); // only 4 bytes
        assert!(matches!(result, Err(DecodeError::InsufficientData { .. })));
    }

    #[test]
    fn test_decode_unknown_message_type_returns_error() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&99u32.to_be_bytes());
        bytes.extend_from_slice(&0u32.to_be_bytes());
        let result = decode_message(&bytes);
        assert_eq!(result, Err(DecodeError::UnknownMessageType(99)));
    }

    #[test]
    fn test_decode_payload_length_exceeds_available_returns_error() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&2u32.to_be_bytes());
        bytes.extend_from_slice(&100u32.to_be_bytes()); // declares 100, provides 0
        let result = decode_message(&bytes);
        assert!(matches!(result, Err(DecodeError::PayloadLengthMismatch { .. })));
    }

    #[test]
    fn test_decode_batch_count_exceeding_payload_returns_error() {
        // A hostile frame can declare an enormous bet count with a tiny
        // payload; the declared count must be rejected before any allocation
        // is sized from it.
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1u32.to_be_bytes()); // type: Batch
        bytes.extend_from_slice(&8u32.to_be_bytes()); // payload length
        bytes.extend_from_slice(&1u32.to_be_bytes()); // agency id
        bytes.extend_from_slice(&u32::MAX.to_be_bytes()); // declared count

        let result = decode_message(&bytes);
        assert!(matches!(result, Err(DecodeError::MalformedPayload(_))));
    }

    #[test]
    fn test_decode_batch_with_truncated_bet_returns_error() {
        let bet = Bet::from_fields(1, "Santiago", "Lorca", "42", "1999-03-17", "7").unwrap();
        let mut bytes = encode_message(&ClientMessage::Batch {
            agency_id: 1,
            bets: vec![bet],
        });
        // Drop the final number field but fix up the declared length so the
        // frame itself still parses.
        bytes.truncate(bytes.len() - 4);
        let payload_len = (bytes.len() - FRAME_HEADER_SIZE) as u32;
        bytes[4..8].copy_from_slice(&payload_len.to_be_bytes());

        let result = decode_message(&bytes);
        assert!(matches!(result, Err(DecodeError::InsufficientData { .. })));
    }
}

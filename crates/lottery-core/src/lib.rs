//! # lottery-core
//!
//! Shared library for the lottery agency client containing the binary wire
//! protocol codec and the domain entities it transports.
//!
//! This crate has zero dependencies on network sockets or the async runtime:
//! encoding produces byte vectors, decoding consumes byte slices. The
//! transport layer that moves those bytes lives in `lottery-client`.
//!
//! - **`domain`** – Typed entities: a [`Bet`] (one wager record) and its
//!   [`BirthDate`]. Text fields from a record source are parsed exactly once
//!   at construction; everything downstream works with typed integers.
//!
//! - **`protocol`** – How bytes travel over the wire. Outbound messages are
//!   self-framed (`type(4) len(4) payload`, all integers big-endian); inbound
//!   responses are fixed-shape and therefore decoded field by field.

pub mod domain;
pub mod protocol;

pub use domain::bet::{Bet, BirthDate, FieldError};
pub use protocol::codec::{
    decode_message, decode_winners, encode_message, format_winner, DecodeError,
};
pub use protocol::messages::{
    ClientMessage, MessageType, ResponseStatus, RESPONSE_ERROR, RESPONSE_OK,
};

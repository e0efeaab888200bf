//! Protocol module containing message types and the binary codec.

pub mod codec;
pub mod messages;

pub use codec::{decode_message, decode_winners, encode_message, format_winner, DecodeError};
pub use messages::*;

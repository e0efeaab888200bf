//! Domain entities shared by the codec and the client application.

pub mod bet;

pub use bet::{Bet, BirthDate, FieldError};

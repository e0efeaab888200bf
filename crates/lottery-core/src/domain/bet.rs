//! Wager record entities.
//!
//! Record sources deliver text fields; a [`Bet`] parses them exactly once at
//! construction and stores typed integers. A record that fails field parsing
//! never exists as a `Bet`, so encoding a batch of bets cannot encounter
//! malformed text.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while constructing a [`Bet`] from raw text fields.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    /// A numeric field did not parse as an unsigned 32-bit integer.
    #[error("invalid numeric field {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    /// The birth date did not split into exactly three numeric components.
    #[error("invalid birth date: {0:?} (expected YYYY-MM-DD)")]
    InvalidDate(String),

    /// The source row carried fewer columns than a record requires.
    #[error("row has {got} fields, expected at least {expected}")]
    MissingFields { expected: usize, got: usize },
}

// ── Birth date ────────────────────────────────────────────────────────────────

/// A calendar date, encoded on the wire as `year*10000 + month*100 + day`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirthDate {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl BirthDate {
    /// Wire representation: `YYYYMMDD` as a big-endian-serialisable integer.
    pub fn to_wire(self) -> u32 {
        self.year as u32 * 10_000 + self.month as u32 * 100 + self.day as u32
    }

    /// Reverses [`BirthDate::to_wire`]. Component ranges are not validated
    /// beyond what the arithmetic decomposition yields.
    pub fn from_wire(value: u32) -> Self {
        Self {
            year: (value / 10_000) as u16,
            month: ((value / 100) % 100) as u8,
            day: (value % 100) as u8,
        }
    }
}

impl FromStr for BirthDate {
    type Err = FieldError;

    /// Parses the `YYYY-MM-DD` text form. Fails unless the text splits into
    /// exactly three dash-separated components, each of which is numeric.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('-');
        let (year, month, day) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(y), Some(m), Some(d), None) => (y, m, d),
            _ => return Err(FieldError::InvalidDate(s.to_string())),
        };
        let year: u16 = year
            .parse()
            .map_err(|_| FieldError::InvalidDate(s.to_string()))?;
        let month: u8 = month
            .parse()
            .map_err(|_| FieldError::InvalidDate(s.to_string()))?;
        let day: u8 = day
            .parse()
            .map_err(|_| FieldError::InvalidDate(s.to_string()))?;
        Ok(Self { year, month, day })
    }
}

impl fmt::Display for BirthDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

// ── Bet ───────────────────────────────────────────────────────────────────────

/// A single wager record: bettor identity, birth date, and chosen number.
///
/// Immutable once constructed. The owning agency is recorded on each bet as
/// well as on the batch envelope that transmits it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bet {
    pub agency_id: u32,
    pub first_name: String,
    pub last_name: String,
    pub document: u32,
    pub birth_date: BirthDate,
    pub number: u32,
}

impl Bet {
    /// Builds a bet from the text fields of a source row, parsing the numeric
    /// and date fields. All parse failures surface here as [`FieldError`];
    /// nothing downstream re-parses these fields.
    pub fn from_fields(
        agency_id: u32,
        first_name: &str,
        last_name: &str,
        document: &str,
        birth_date: &str,
        number: &str,
    ) -> Result<Self, FieldError> {
        let document: u32 = document
            .trim()
            .parse()
            .map_err(|_| FieldError::InvalidNumber {
                field: "document",
                value: document.to_string(),
            })?;
        let birth_date: BirthDate = birth_date.trim().parse()?;
        let number: u32 = number.trim().parse().map_err(|_| FieldError::InvalidNumber {
            field: "number",
            value: number.to_string(),
        })?;
        Ok(Self {
            agency_id,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            document,
            birth_date,
            number,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

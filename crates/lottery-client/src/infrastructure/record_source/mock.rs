//! In-memory record source for unit testing.

use lottery_core::{Bet, FieldError};

use super::RecordSource;

/// Serves a fixed sequence of rows (well-formed or malformed) from memory.
pub struct MockRecordSource {
    rows: std::vec::IntoIter<Result<Bet, FieldError>>,
    /// How many rows have been pulled so far, for cancellation assertions.
    pub pulled: usize,
}

impl MockRecordSource {
    pub fn new(rows: Vec<Result<Bet, FieldError>>) -> Self {
        Self {
            rows: rows.into_iter(),
            pulled: 0,
        }
    }

    /// Convenience constructor: `count` distinct well-formed bets.
    pub fn with_bets(agency_id: u32, count: usize) -> Self {
        let rows = (0..count)
            .map(|i| {
                Bet::from_fields(
                    agency_id,
                    &format!("First{i}"),
                    &format!("Last{i}"),
                    &(1_000_000 + i as u32).to_string(),
                    "1990-01-01",
                    &(i as u32).to_string(),
                )
            })
            .collect();
        Self::new(rows)
    }
}

impl RecordSource for MockRecordSource {
    fn next_bet(&mut self) -> Option<Result<Bet, FieldError>> {
        let next = self.rows.next();
        if next.is_some() {
            self.pulled += 1;
        }
        next
    }
}

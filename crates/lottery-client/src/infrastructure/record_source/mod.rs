//! Record sources: where the agency's bets come from.
//!
//! The application pulls bets one at a time through the [`RecordSource`]
//! trait, so batch assembly never needs the whole file in memory. The
//! production implementation reads the per-agency CSV file; tests use the
//! in-memory [`mock::MockRecordSource`].

pub mod mock;

use std::io::Read;
use std::path::Path;

use lottery_core::{Bet, FieldError};
use thiserror::Error;
use tracing::debug;

/// Number of columns a record row must carry:
/// `first_name,last_name,document,birth_date,number`.
pub const RECORD_FIELDS: usize = 5;

/// Errors opening a record source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to open record file: {0}")]
    Io(#[from] std::io::Error),
}

/// A pull-based source of wager records.
///
/// `next_bet` yields `None` on exhaustion. A malformed row is yielded as
/// `Some(Err(_))` so the caller can log and skip it; iteration continues
/// past bad rows.
pub trait RecordSource {
    fn next_bet(&mut self) -> Option<Result<Bet, FieldError>>;
}

/// Reads bets from a headerless CSV agency file.
///
/// Rows are parsed lazily; the file is only read as far as the session pulls.
pub struct CsvRecordSource<R: Read> {
    agency_id: u32,
    rows: csv::StringRecordsIntoIter<R>,
}

impl CsvRecordSource<std::fs::File> {
    /// Opens the record file for one agency, conventionally
    /// `<records_dir>/agency-<id>.csv`.
    pub fn open(path: &Path, agency_id: u32) -> Result<Self, SourceError> {
        let file = std::fs::File::open(path)?;
        debug!(agency_id, path = %path.display(), "opened agency record file");
        Ok(Self::from_reader(file, agency_id))
    }
}

impl<R: Read> CsvRecordSource<R> {
    /// Builds a source over any reader; used directly by tests.
    pub fn from_reader(reader: R, agency_id: u32) -> Self {
        let rows = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader)
            .into_records();
        Self { agency_id, rows }
    }
}

impl<R: Read> RecordSource for CsvRecordSource<R> {
    fn next_bet(&mut self) -> Option<Result<Bet, FieldError>> {
        let row = match self.rows.next()? {
            Ok(row) => row,
            Err(e) => {
                // A row the csv reader itself cannot split is skipped like
                // any other malformed row.
                return Some(Err(FieldError::InvalidNumber {
                    field: "row",
                    value: e.to_string(),
                }));
            }
        };

        if row.len() < RECORD_FIELDS {
            return Some(Err(FieldError::MissingFields {
                expected: RECORD_FIELDS,
                got: row.len(),
            }));
        }

        Some(Bet::from_fields(
            self.agency_id,
            &row[0],
            &row[1],
            &row[2],
            &row[3],
            &row[4],
        ))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

use std::collections::HashMap;
use std::io;

use tracing::debug;

use crate::error::{Error, Result};
use crate::record::Record;
use crate::scanner::{Scanner, ScannerBuilder};
use crate::source::{RecordSource, Source};

/// A scanner that exposes the fields of each record by header name.
///
/// The first record of the input is consumed when the scanner is built and
/// becomes the header. Every later record is addressed through it.
///
/// If the header names the same column more than once, the last occurrence
/// wins: lookups by that name resolve to its rightmost position.
///
/// # Example
///
/// ```
/// use csv_scanner::ColumnScanner;
///
/// # fn main() -> csv_scanner::Result<()> {
/// let data = "first_name,last_name,username\nRob,Pike,rob\n";
/// let mut scanner = ColumnScanner::from_reader(data.as_bytes())?;
///
/// assert_eq!(scanner.header(), &vec!["first_name", "last_name", "username"]);
/// assert!(scanner.advance());
/// assert_eq!(scanner.column("last_name"), "Pike");
/// assert!(scanner.column_checked("missing").is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ColumnScanner<S> {
    scanner: Scanner<S>,
    header: Record,
    index: HashMap<String, usize>,
}

impl<R: io::Read> ColumnScanner<Source<R>> {
    /// Create a column scanner with a default configuration, reading the
    /// header from `rdr` immediately.
    pub fn from_reader(rdr: R) -> Result<ColumnScanner<Source<R>>> {
        ScannerBuilder::new().columns_from_reader(rdr)
    }
}

impl<S: RecordSource> ColumnScanner<S> {
    /// Wrap `scanner`, reading one record from it to use as the header.
    ///
    /// The scanner is used as configured. Build through
    /// `ScannerBuilder::columns_from_reader` to have rows checked against
    /// the width of the header.
    ///
    /// If no header can be read, then this returns the scanner's error, or
    /// `Error::MissingHeader` when the input is empty. A header that is read
    /// with an error under `continue_on_error` is rejected as well.
    pub fn new(mut scanner: Scanner<S>) -> Result<ColumnScanner<S>> {
        if !scanner.advance() {
            return Err(scanner.take_error().unwrap_or(Error::MissingHeader));
        }
        if let Some(err) = scanner.take_error() {
            return Err(err);
        }
        let header = match scanner.record() {
            Some(record) => record.clone(),
            None => return Err(Error::MissingHeader),
        };
        scanner.clear_record();
        let mut index = HashMap::with_capacity(header.len());
        for (i, name) in header.iter().enumerate() {
            if let Some(prev) = index.insert(name.to_string(), i) {
                debug!(column = name, prev, i, "duplicate header column");
            }
        }
        debug!(header = ?header, "read header record");
        Ok(ColumnScanner { scanner, header, index })
    }

    /// The header record, as it was read.
    pub fn header(&self) -> &Record {
        &self.header
    }

    /// The position of `column` in the header, if it's there.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.index.get(column).cloned()
    }

    /// Look up the field of the current record under the header `column`.
    ///
    /// This returns an error when the header has no such column, when there
    /// is no current record, or when the current record is too short.
    pub fn column_checked(&self, column: &str) -> Result<&str> {
        let i = match self.column_index(column) {
            Some(i) => i,
            None => {
                return Err(Error::ColumnNotFound {
                    column: column.to_string(),
                    header: self.header.clone(),
                })
            }
        };
        let record = self.scanner.record().ok_or(Error::NoRecord)?;
        record.get(i).ok_or_else(|| Error::MissingField {
            column: column.to_string(),
            index: i,
            len: record.len(),
        })
    }

    /// Look up the field of the current record under the header `column`.
    ///
    /// This is for call sites that already know the column exists, e.g.,
    /// because they took its name from `header`.
    ///
    /// # Panics
    ///
    /// This panics in every case where `column_checked` returns an error.
    pub fn column(&self, column: &str) -> &str {
        match self.column_checked(column) {
            Ok(field) => field,
            Err(err) => panic!("{}", err),
        }
    }

    /// Advance to the next record. See `Scanner::advance`.
    pub fn advance(&mut self) -> bool {
        self.scanner.advance()
    }

    /// The current record. See `Scanner::record`.
    pub fn record(&self) -> Option<&Record> {
        self.scanner.record()
    }

    /// The error from the most recent `advance`. See `Scanner::error`.
    pub fn error(&self) -> Option<&Error> {
        self.scanner.error()
    }

    /// Take the error from the most recent `advance`.
    pub fn take_error(&mut self) -> Option<Error> {
        self.scanner.take_error()
    }

    /// Returns true once `advance` will never return `true` again.
    pub fn is_done(&self) -> bool {
        self.scanner.is_done()
    }

    /// Returns a reference to the underlying record scanner.
    pub fn scanner(&self) -> &Scanner<S> {
        &self.scanner
    }

    /// Unwraps this column scanner, returning the underlying record scanner.
    pub fn into_scanner(self) -> Scanner<S> {
        self.scanner
    }
}

use std::io;

use tracing::trace;

use crate::column::ColumnScanner;
use crate::error::{Error, Result};
use crate::populate::Populate;
use crate::record::Record;
use crate::scanner::ScannerBuilder;
use crate::source::{RecordSource, Source};

/// A scanner that populates structs from the columns of each record.
///
/// This has the header semantics of `ColumnScanner`, which it wraps. Target
/// types describe their tagged fields by implementing `Populate`, usually
/// through the `populate_fields!` macro.
#[derive(Debug)]
pub struct StructScanner<S> {
    columns: ColumnScanner<S>,
}

impl<R: io::Read> StructScanner<Source<R>> {
    /// Create a struct scanner with a default configuration, reading the
    /// header from `rdr` immediately.
    pub fn from_reader(rdr: R) -> Result<StructScanner<Source<R>>> {
        ScannerBuilder::new().structs_from_reader(rdr)
    }
}

impl<S: RecordSource> StructScanner<S> {
    /// Wrap a column scanner whose header has already been read.
    pub fn new(columns: ColumnScanner<S>) -> StructScanner<S> {
        StructScanner { columns }
    }

    /// Populate the tagged fields of `target` from the current record.
    ///
    /// Population is best effort. A field whose column is missing from the
    /// header, or whose text cannot be coerced to the field's type, keeps its
    /// previous value. Untagged fields are never touched.
    ///
    /// The only error is `Error::NoRecord`, returned without touching
    /// `target` when there is no current record to populate from.
    pub fn populate<T: Populate>(&self, target: &mut T) -> Result<()> {
        let record = self.columns.record().ok_or(Error::NoRecord)?;
        for field in T::FIELDS {
            let raw = match self
                .columns
                .column_index(field.column)
                .and_then(|i| record.get(i))
            {
                None => continue,
                Some(raw) => raw,
            };
            if !(field.set)(target, raw) {
                trace!(
                    column = field.column,
                    raw,
                    "could not coerce column, leaving field unchanged"
                );
            }
        }
        Ok(())
    }

    /// The header record. See `ColumnScanner::header`.
    pub fn header(&self) -> &Record {
        self.columns.header()
    }

    /// Look up a column of the current record. See
    /// `ColumnScanner::column_checked`.
    pub fn column_checked(&self, column: &str) -> Result<&str> {
        self.columns.column_checked(column)
    }

    /// Look up a column of the current record, panicking if it's absent.
    /// See `ColumnScanner::column`.
    pub fn column(&self, column: &str) -> &str {
        self.columns.column(column)
    }

    /// Advance to the next record. See `Scanner::advance`.
    pub fn advance(&mut self) -> bool {
        self.columns.advance()
    }

    /// The current record. See `Scanner::record`.
    pub fn record(&self) -> Option<&Record> {
        self.columns.record()
    }

    /// The error from the most recent `advance`. See `Scanner::error`.
    pub fn error(&self) -> Option<&Error> {
        self.columns.error()
    }

    /// Returns true once `advance` will never return `true` again.
    pub fn is_done(&self) -> bool {
        self.columns.is_done()
    }

    /// Returns a reference to the underlying column scanner.
    pub fn columns(&self) -> &ColumnScanner<S> {
        &self.columns
    }

    /// Unwraps this struct scanner, returning the underlying column scanner.
    pub fn into_columns(self) -> ColumnScanner<S> {
        self.columns
    }
}

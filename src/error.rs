use std::error;
use std::fmt;
use std::io;
use std::result;

use crate::record::{Position, Record};

/// A type alias for `Result<T, csv_scanner::Error>`.
pub type Result<T> = result::Result<T, Error>;

/// An error that can occur when scanning or writing CSV data.
///
/// Note that reaching the end of the input is never an error. Scanners
/// report it by returning `false` from `advance`.
#[derive(Debug)]
pub enum Error {
    /// An I/O error that occurred while reading or writing CSV data.
    Io(io::Error),
    /// A UTF-8 decoding error that occurred while reading CSV data into a
    /// `Record`.
    Utf8 {
        /// The position of the record in which this error occurred, if
        /// available.
        pos: Option<Position>,
        /// The corresponding UTF-8 error.
        err: Utf8Error,
    },
    /// This error occurs when a record does not have the number of fields
    /// demanded by the source's `FieldCount` policy.
    ///
    /// There is no column number: the whole record is at fault, so `pos`
    /// (line, byte and record index of its first byte) is its location.
    UnequalLengths {
        /// The position of the offending record, if available.
        pos: Option<Position>,
        /// The expected number of fields in a record.
        expected_len: u64,
        /// The number of fields in the bad record.
        len: u64,
    },
    /// A column was looked up by a name that the header does not contain.
    ColumnNotFound {
        /// The name that was requested.
        column: String,
        /// The full header record, for diagnostics.
        header: Record,
    },
    /// The header contains the column, but the current record is too short
    /// to have a field at its position.
    MissingField {
        /// The name that was requested.
        column: String,
        /// The header position of the column.
        index: usize,
        /// The number of fields in the current record.
        len: usize,
    },
    /// A column lookup or a struct population was attempted while the
    /// scanner had no current record, i.e., before the first call to
    /// `advance` or after scanning stopped.
    NoRecord,
    /// The input ended before a header record could be read.
    MissingHeader,
}

impl Error {
    /// Returns true if this is an I/O error.
    ///
    /// I/O errors always halt a scanner, even when it is configured to
    /// continue past malformed records.
    pub fn is_io_error(&self) -> bool {
        match *self {
            Error::Io(_) => true,
            _ => false,
        }
    }

    /// Return the position of the record in which this error occurred, if
    /// one is available.
    pub fn position(&self) -> Option<&Position> {
        match *self {
            Error::Utf8 { ref pos, .. } => pos.as_ref(),
            Error::UnequalLengths { ref pos, .. } => pos.as_ref(),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> io::Error {
        io::Error::new(io::ErrorKind::Other, err)
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::Io(ref err) => Some(err),
            Error::Utf8 { ref err, .. } => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Io(ref err) => err.fmt(f),
            Error::Utf8 { pos: None, ref err } => {
                write!(f, "CSV parse error: field {}: {}", err.field(), err)
            }
            Error::Utf8 { pos: Some(ref pos), ref err } => write!(
                f,
                "CSV parse error: record {} \
                 (line {}, field: {}, byte: {}): {}",
                pos.record(),
                pos.line(),
                err.field(),
                pos.byte(),
                err
            ),
            Error::UnequalLengths { pos: None, expected_len, len } => write!(
                f,
                "CSV error: found record with {} fields, but \
                 {} fields are expected",
                len, expected_len
            ),
            Error::UnequalLengths { pos: Some(ref pos), expected_len, len } => {
                write!(
                    f,
                    "CSV parse error: record {} (line {}, byte: {}): \
                     found record with {} fields, but {} fields are \
                     expected",
                    pos.record(),
                    pos.line(),
                    pos.byte(),
                    len,
                    expected_len
                )
            }
            Error::ColumnNotFound { ref column, ref header } => write!(
                f,
                "column [{}] not present in header record: {:?}",
                column, header
            ),
            Error::MissingField { ref column, index, len } => write!(
                f,
                "column [{}] is at position {}, but the current record \
                 has only {} fields",
                column, index, len
            ),
            Error::NoRecord => {
                write!(f, "no current record: call advance first")
            }
            Error::MissingHeader => {
                write!(f, "CSV data ended before a header record was read")
            }
        }
    }
}

/// A UTF-8 validation error that occurred while decoding a record.
///
/// The error includes the index of the field that failed validation, and the
/// last byte at which valid UTF-8 was verified.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Utf8Error {
    /// The field index of a record in which UTF-8 validation failed.
    field: usize,
    /// The index into the given field up to which valid UTF-8 was verified.
    valid_up_to: usize,
}

impl Utf8Error {
    pub(crate) fn new(field: usize, valid_up_to: usize) -> Utf8Error {
        Utf8Error { field, valid_up_to }
    }

    /// The field index of a record in which UTF-8 validation failed.
    pub fn field(&self) -> usize {
        self.field
    }

    /// The index into the given field up to which valid UTF-8 was verified.
    pub fn valid_up_to(&self) -> usize {
        self.valid_up_to
    }
}

impl fmt::Display for Utf8Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "invalid utf-8: invalid UTF-8 in field {} near byte index {}",
            self.field, self.valid_up_to
        )
    }
}

impl error::Error for Utf8Error {}

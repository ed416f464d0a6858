use std::fmt;
use std::iter::FromIterator;
use std::ops;

/// A single CSV record: an ordered sequence of UTF-8 fields.
///
/// All fields are stored contiguously in one buffer, so a record can be
/// cleared and refilled without reallocating. Scanners configured with
/// `reuse_record` refill the same record on every call to `advance`; since
/// a scanner only ever lends out `&Record`, a caller that needs a record to
/// outlive the next `advance` must `clone` it.
#[derive(Clone, Default, Eq)]
pub struct Record {
    /// All fields in this record, stored contiguously.
    fields: String,
    /// The ending index of each field.
    ends: Vec<usize>,
    /// Where this record started in the input, if it was read from one.
    pos: Option<Position>,
}

impl Record {
    /// Create a new empty `Record`.
    pub fn new() -> Record {
        Record::default()
    }

    /// Create a new empty `Record` with room for `buffer` bytes of field
    /// data spread over `fields` fields.
    pub fn with_capacity(buffer: usize, fields: usize) -> Record {
        Record {
            fields: String::with_capacity(buffer),
            ends: Vec::with_capacity(fields),
            pos: None,
        }
    }

    /// Return the field at index `i`.
    ///
    /// If no field at index `i` exists, then this returns `None`.
    pub fn get(&self, i: usize) -> Option<&str> {
        let end = *self.ends.get(i)?;
        let start = match i.checked_sub(1) {
            None => 0,
            Some(prev) => self.ends[prev],
        };
        Some(&self.fields[start..end])
    }

    /// Returns true if and only if this record has no fields.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of fields in this record.
    pub fn len(&self) -> usize {
        self.ends.len()
    }

    /// Clear this record so that it has zero fields.
    ///
    /// The position is cleared too, but the allocation is kept.
    pub fn clear(&mut self) {
        self.fields.clear();
        self.ends.clear();
        self.pos = None;
    }

    /// Add a new field to the end of this record.
    pub fn push_field(&mut self, field: &str) {
        self.fields.push_str(field);
        self.ends.push(self.fields.len());
    }

    /// Returns an iterator over all fields in this record.
    pub fn iter(&self) -> RecordIter {
        RecordIter { rec: self, i: 0 }
    }

    /// Copy the fields into a freshly allocated vector of strings.
    pub fn to_vec(&self) -> Vec<String> {
        self.iter().map(|f| f.to_string()).collect()
    }

    /// The position at which this record started in its input, if it was
    /// produced by a record source.
    pub fn position(&self) -> Option<&Position> {
        self.pos.as_ref()
    }

    /// Set the position of this record.
    pub fn set_position(&mut self, pos: Option<Position>) {
        self.pos = pos;
    }

    /// Remove leading whitespace from every field, in place.
    pub(crate) fn trim_start(&mut self) {
        if !self.fields.chars().any(char::is_whitespace) {
            return;
        }
        let mut trimmed = Record::with_capacity(self.fields.len(), self.len());
        for field in self.iter() {
            trimmed.push_field(field.trim_start());
        }
        self.fields = trimmed.fields;
        self.ends = trimmed.ends;
    }
}

impl ops::Index<usize> for Record {
    type Output = str;

    fn index(&self, i: usize) -> &str {
        match self.get(i) {
            Some(field) => field,
            None => panic!(
                "field index {} out of range for record with {} fields",
                i,
                self.len()
            ),
        }
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Records compare equal when their fields are equal; positions are
/// ignored.
impl PartialEq for Record {
    fn eq(&self, other: &Record) -> bool {
        self.ends == other.ends && self.fields == other.fields
    }
}

impl<T: AsRef<str>> PartialEq<[T]> for Record {
    fn eq(&self, other: &[T]) -> bool {
        self.len() == other.len()
            && self.iter().zip(other).all(|(a, b)| a == b.as_ref())
    }
}

impl<'a, T: AsRef<str>> PartialEq<[T]> for &'a Record {
    fn eq(&self, other: &[T]) -> bool {
        **self == *other
    }
}

impl<T: AsRef<str>> PartialEq<Vec<T>> for Record {
    fn eq(&self, other: &Vec<T>) -> bool {
        *self == **other
    }
}

impl<'a, T: AsRef<str>> PartialEq<Vec<T>> for &'a Record {
    fn eq(&self, other: &Vec<T>) -> bool {
        **self == **other
    }
}

impl<T: AsRef<str>> From<Vec<T>> for Record {
    fn from(xs: Vec<T>) -> Record {
        Record::from_iter(xs)
    }
}

impl<'a, T: AsRef<str>> From<&'a [T]> for Record {
    fn from(xs: &'a [T]) -> Record {
        Record::from_iter(xs)
    }
}

impl<T: AsRef<str>> FromIterator<T> for Record {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Record {
        let mut record = Record::new();
        record.extend(iter);
        record
    }
}

impl<T: AsRef<str>> Extend<T> for Record {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for field in iter {
            self.push_field(field.as_ref());
        }
    }
}

impl<'a> IntoIterator for &'a Record {
    type IntoIter = RecordIter<'a>;
    type Item = &'a str;

    fn into_iter(self) -> RecordIter<'a> {
        self.iter()
    }
}

/// An iterator over the fields in a record.
pub struct RecordIter<'a> {
    rec: &'a Record,
    i: usize,
}

impl<'a> Iterator for RecordIter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let field = self.rec.get(self.i)?;
        self.i += 1;
        Some(field)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.rec.len() - self.i;
        (remaining, Some(remaining))
    }
}

impl<'a> ExactSizeIterator for RecordIter<'a> {}

/// A position in CSV data.
///
/// A position is used to report errors in CSV data. All positions include the
/// byte offset, line number and record index at which the error occurred.
///
/// Byte offsets and record indices start at `0`. Line numbers start at `1`.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Position {
    byte: u64,
    line: u64,
    record: u64,
}

impl Default for Position {
    fn default() -> Position {
        Position::new()
    }
}

impl Position {
    /// Returns a new position initialized to the start value.
    pub fn new() -> Position {
        Position { byte: 0, line: 1, record: 0 }
    }

    /// The byte offset, starting at `0`, of this position.
    pub fn byte(&self) -> u64 {
        self.byte
    }

    /// The line number, starting at `1`, of this position.
    pub fn line(&self) -> u64 {
        self.line
    }

    /// The record index, starting with the first record at `0`.
    pub fn record(&self) -> u64 {
        self.record
    }

    /// Set the byte offset of this position.
    pub fn set_byte(&mut self, byte: u64) -> &mut Position {
        self.byte = byte;
        self
    }

    /// Set the line number of this position.
    ///
    /// If the line number is less than `1`, then this method panics.
    pub fn set_line(&mut self, line: u64) -> &mut Position {
        assert!(line > 0);
        self.line = line;
        self
    }

    /// Set the record index of this position.
    pub fn set_record(&mut self, record: u64) -> &mut Position {
        self.record = record;
        self
    }
}

use std::io::{self, BufRead};
use std::str;

use csv_core::{Reader as CoreReader, ReadRecordResult};

use crate::error::{Error, Result, Utf8Error};
use crate::record::{Position, Record};

/// A producer of records, one at a time.
///
/// This is the seam between scanners and tokenization. The `Source` type in
/// this crate implements it on top of `csv-core`, but anything that can hand
/// out records in order (a fixture, a different dialect, a network feed) can
/// be scanned.
pub trait RecordSource {
    /// Read the next record into `record`.
    ///
    /// Returns `Ok(true)` when a record was read and `Ok(false)` once the
    /// input is exhausted. An error may still leave partial data in
    /// `record`.
    fn read_record(&mut self, record: &mut Record) -> Result<bool>;

    /// Whether the record handed to `read_record` should be refilled in place
    /// instead of being replaced by a fresh allocation on every read.
    ///
    /// This is a performance hint only.
    fn reuse_record(&self) -> bool {
        false
    }

    /// The position of the next byte the source will read.
    fn position(&self) -> &Position;
}

impl<'a, S: RecordSource + ?Sized> RecordSource for &'a mut S {
    fn read_record(&mut self, record: &mut Record) -> Result<bool> {
        (**self).read_record(record)
    }

    fn reuse_record(&self) -> bool {
        (**self).reuse_record()
    }

    fn position(&self) -> &Position {
        (**self).position()
    }
}

/// The policy for checking the number of fields in each record.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FieldCount {
    /// Every record must have as many fields as the first record read.
    ///
    /// This is the default.
    Infer,
    /// Every record must have exactly this many fields.
    Exactly(u64),
    /// Records may have any number of fields.
    Any,
}

impl Default for FieldCount {
    fn default() -> FieldCount {
        FieldCount::Infer
    }
}

/// A `RecordSource` that parses CSV data from an `io::Read`.
///
/// The input is buffered for you automatically. Lexical rules (delimiter,
/// quoting, comments) are handled by `csv-core`, whose parser tolerates
/// stray quotes rather than rejecting them.
#[derive(Debug)]
pub struct Source<R> {
    core: Box<CoreReader>,
    rdr: io::BufReader<R>,
    /// Field data of the record being read, before UTF-8 validation.
    buf: Vec<u8>,
    /// Field end offsets of the record being read.
    ends: Vec<usize>,
    /// The comment byte the tokenizer was built with.
    comment: Option<u8>,
    trim: bool,
    reuse: bool,
    fields_per_record: FieldCount,
    /// The field count every record must have, once it is known.
    expected_len: Option<u64>,
    cur_pos: Position,
    eof: bool,
}

impl<R: io::Read> Source<R> {
    /// Create a source with default options: comma delimited, double quote
    /// quoting, no comments and an inferred field count.
    pub fn from_reader(rdr: R) -> Source<R> {
        Source::new(CoreReader::new(), rdr)
    }

    pub(crate) fn new(core: CoreReader, rdr: R) -> Source<R> {
        Source {
            core: Box::new(core),
            rdr: io::BufReader::with_capacity(8 * (1 << 10), rdr),
            buf: vec![0; 1024],
            ends: vec![0; 16],
            comment: None,
            trim: false,
            reuse: false,
            fields_per_record: FieldCount::Infer,
            expected_len: None,
            cur_pos: Position::new(),
            eof: false,
        }
    }

    /// Tell the source which comment byte `core` skips, so that record
    /// positions step over comment lines too.
    pub(crate) fn comment(mut self, comment: Option<u8>) -> Source<R> {
        self.comment = comment;
        self
    }

    /// Trim leading whitespace from every field.
    pub fn trim_leading_space(mut self, yes: bool) -> Source<R> {
        self.trim = yes;
        self
    }

    /// Refill the caller's record in place on every read.
    pub fn reuse(mut self, yes: bool) -> Source<R> {
        self.reuse = yes;
        self
    }

    /// Set the field count policy.
    pub fn fields_per_record(mut self, count: FieldCount) -> Source<R> {
        self.fields_per_record = count;
        self.expected_len = match count {
            FieldCount::Exactly(n) => Some(n),
            FieldCount::Infer | FieldCount::Any => None,
        };
        self
    }

    /// Returns true once the underlying reader has been exhausted.
    pub fn is_done(&self) -> bool {
        self.eof
    }

    /// Returns a reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        self.rdr.get_ref()
    }

    /// Unwraps this source, returning the underlying reader.
    ///
    /// Any buffered but unread data is lost.
    pub fn into_inner(self) -> R {
        self.rdr.into_inner()
    }

    /// Read the raw fields of the next record, returning how many there are
    /// and where the record's first byte sits in the input.
    fn read_raw(&mut self) -> Result<Option<(usize, Position)>> {
        let (mut outlen, mut endlen) = (0, 0);
        let mut start = RecordStart::new(self.cur_pos.clone());
        loop {
            let (res, nin, nout, nend) = {
                let input = self.rdr.fill_buf()?;
                let (res, nin, nout, nend) = self.core.read_record(
                    input,
                    &mut self.buf[outlen..],
                    &mut self.ends[endlen..],
                );
                start.scan(&input[..nin], self.comment);
                (res, nin, nout, nend)
            };
            self.rdr.consume(nin);
            let byte = self.cur_pos.byte();
            self.cur_pos
                .set_byte(byte + nin as u64)
                .set_line(self.core.line());
            outlen += nout;
            endlen += nend;
            match res {
                ReadRecordResult::InputEmpty => continue,
                ReadRecordResult::OutputFull => {
                    let len = self.buf.len();
                    self.buf.resize(len * 2, 0);
                }
                ReadRecordResult::OutputEndsFull => {
                    let len = self.ends.len();
                    self.ends.resize(len * 2, 0);
                }
                ReadRecordResult::Record => {
                    let record = self.cur_pos.record();
                    self.cur_pos.set_record(record + 1);
                    return Ok(Some((endlen, start.pos)));
                }
                ReadRecordResult::End => {
                    self.eof = true;
                    return Ok(None);
                }
            }
        }
    }

    /// Copy the raw fields of the record just read into `record`,
    /// validating them as UTF-8.
    fn decode(&self, nfields: usize, record: &mut Record) -> Result<()> {
        let mut start = 0;
        for (i, &end) in self.ends[..nfields].iter().enumerate() {
            let field = &self.buf[start..end];
            match str::from_utf8(field) {
                Ok(field) => record.push_field(field),
                Err(err) => {
                    record.clear();
                    return Err(Error::Utf8 {
                        pos: None,
                        err: Utf8Error::new(i, err.valid_up_to()),
                    });
                }
            }
            start = end;
        }
        Ok(())
    }

    fn check_field_count(&mut self, pos: &Position, len: u64) -> Result<()> {
        if let FieldCount::Any = self.fields_per_record {
            return Ok(());
        }
        match self.expected_len {
            None => {
                self.expected_len = Some(len);
                Ok(())
            }
            Some(expected_len) if expected_len == len => Ok(()),
            Some(expected_len) => Err(Error::UnequalLengths {
                pos: Some(pos.clone()),
                expected_len,
                len,
            }),
        }
    }
}

/// Follows the bytes the tokenizer consumes to find where a record really
/// starts, past any blank and comment lines it skips first.
struct RecordStart {
    pos: Position,
    found: bool,
    in_comment: bool,
}

impl RecordStart {
    fn new(pos: Position) -> RecordStart {
        RecordStart { pos, found: false, in_comment: false }
    }

    fn scan(&mut self, consumed: &[u8], comment: Option<u8>) {
        for &b in consumed {
            if self.found {
                return;
            }
            if b == b'\n' {
                self.in_comment = false;
                let line = self.pos.line();
                self.pos.set_line(line + 1);
            } else if !self.in_comment && b != b'\r' {
                if Some(b) == comment {
                    self.in_comment = true;
                } else {
                    self.found = true;
                    return;
                }
            }
            let byte = self.pos.byte();
            self.pos.set_byte(byte + 1);
        }
    }
}

impl<R: io::Read> RecordSource for Source<R> {
    fn read_record(&mut self, record: &mut Record) -> Result<bool> {
        record.clear();
        if self.eof {
            return Ok(false);
        }
        let (nfields, pos) = match self.read_raw()? {
            None => return Ok(false),
            Some(raw) => raw,
        };
        if let Err(err) = self.decode(nfields, record) {
            return Err(match err {
                Error::Utf8 { err, .. } => Error::Utf8 { pos: Some(pos), err },
                err => err,
            });
        }
        if self.trim {
            record.trim_start();
        }
        record.set_position(Some(pos.clone()));
        self.check_field_count(&pos, nfields as u64)?;
        Ok(true)
    }

    fn reuse_record(&self) -> bool {
        self.reuse
    }

    fn position(&self) -> &Position {
        &self.cur_pos
    }
}

use std::fs::File;
use std::io;
use std::path::Path;

use csv_core::ReaderBuilder as CoreReaderBuilder;
use tracing::{debug, trace};

use crate::column::ColumnScanner;
use crate::error::{Error, Result};
use crate::record::Record;
use crate::source::{FieldCount, RecordSource, Source};
use crate::structs::StructScanner;

/// Builds a CSV scanner with various configuration knobs.
///
/// This builder can be used to tweak the field delimiter, comment handling,
/// field count checking and the error policy of the scanner. Once a builder
/// is configured, it can be used to build any number of scanners.
///
/// # Example
///
/// ```
/// use csv_scanner::ScannerBuilder;
///
/// let data = "\
/// city;country;pop
/// ## this line is ignored
/// Boston;United States;4628910
/// ";
/// let mut scanner = ScannerBuilder::new()
///     .delimiter(b';')
///     .comment(Some(b'#'))
///     .skip_header_record()
///     .from_reader(data.as_bytes());
///
/// assert!(scanner.advance());
/// assert_eq!(scanner.record().unwrap(), vec!["Boston", "United States", "4628910"]);
/// assert!(!scanner.advance());
/// assert!(scanner.error().is_none());
/// ```
#[derive(Debug)]
pub struct ScannerBuilder {
    builder: Box<CoreReaderBuilder>,
    comment: Option<u8>,
    trim: bool,
    reuse: bool,
    fields_per_record: FieldCount,
    continue_on_error: bool,
    skip: u64,
}

impl Default for ScannerBuilder {
    fn default() -> ScannerBuilder {
        ScannerBuilder {
            builder: Box::new(CoreReaderBuilder::default()),
            comment: None,
            trim: false,
            reuse: false,
            fields_per_record: FieldCount::Infer,
            continue_on_error: false,
            skip: 0,
        }
    }
}

impl ScannerBuilder {
    /// Create a new builder for configuring CSV scanning.
    ///
    /// To convert a builder into a scanner, call one of the methods starting
    /// with `from_`.
    pub fn new() -> ScannerBuilder {
        ScannerBuilder::default()
    }

    /// Build a CSV scanner from this configuration that reads data from
    /// `rdr`.
    ///
    /// Note that the CSV scanner is buffered automatically, so you should
    /// not wrap `rdr` in a buffered reader like `io::BufReader`.
    pub fn from_reader<R: io::Read>(&self, rdr: R) -> Scanner<Source<R>> {
        self.from_source(self.source(rdr, self.fields_per_record))
    }

    /// Build a CSV scanner from this configuration that reads data from the
    /// given file path.
    ///
    /// If there was a problem opening the file at the given path, then this
    /// returns the corresponding error.
    pub fn from_path<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<Scanner<Source<File>>> {
        Ok(self.from_reader(File::open(path)?))
    }

    /// Build a CSV scanner over an arbitrary record source.
    ///
    /// Only the scanning policy of this builder applies (`continue_on_error`
    /// and the leading record skips). Lexical options like the delimiter
    /// belong to the source.
    pub fn from_source<S: RecordSource>(&self, source: S) -> Scanner<S> {
        Scanner {
            source,
            record: Record::new(),
            has_record: false,
            err: None,
            state: State::Scanning,
            continue_on_error: self.continue_on_error,
            skip: self.skip,
        }
    }

    /// Build a column scanner that reads its header, and then its rows, from
    /// `rdr`.
    ///
    /// The field count policy is always `FieldCount::Infer`, so every row
    /// must be as wide as the header. If the header cannot be read, then
    /// this returns an error.
    pub fn columns_from_reader<R: io::Read>(
        &self,
        rdr: R,
    ) -> Result<ColumnScanner<Source<R>>> {
        ColumnScanner::new(self.from_source(self.source(rdr, FieldCount::Infer)))
    }

    /// Build a struct scanner that reads its header, and then its rows, from
    /// `rdr`.
    ///
    /// This has the same header semantics as `columns_from_reader`.
    pub fn structs_from_reader<R: io::Read>(
        &self,
        rdr: R,
    ) -> Result<StructScanner<Source<R>>> {
        self.columns_from_reader(rdr).map(StructScanner::new)
    }

    /// The field delimiter to use when parsing CSV.
    ///
    /// The default is `b','`.
    pub fn delimiter(&mut self, delimiter: u8) -> &mut ScannerBuilder {
        self.builder.delimiter(delimiter);
        self
    }

    /// The quote character to use when parsing CSV.
    ///
    /// The default is `b'"'`.
    pub fn quote(&mut self, quote: u8) -> &mut ScannerBuilder {
        self.builder.quote(quote);
        self
    }

    /// The comment character to use when parsing CSV.
    ///
    /// If the start of a record begins with the byte given here, then that
    /// line is ignored by the CSV parser.
    ///
    /// This is disabled by default.
    pub fn comment(&mut self, comment: Option<u8>) -> &mut ScannerBuilder {
        self.builder.comment(comment);
        self.comment = comment;
        self
    }

    /// Whether leading whitespace is removed from every field.
    ///
    /// This is disabled by default.
    pub fn trim_leading_space(&mut self, yes: bool) -> &mut ScannerBuilder {
        self.trim = yes;
        self
    }

    /// The number of fields every record must have.
    ///
    /// By default, this is `FieldCount::Infer`: the first record read sets
    /// the expected count. A record with the wrong number of fields produces
    /// an `UnequalLengths` error, but its fields are still made available.
    pub fn fields_per_record(
        &mut self,
        count: FieldCount,
    ) -> &mut ScannerBuilder {
        self.fields_per_record = count;
        self
    }

    /// Whether the scanner refills one record buffer on every `advance`
    /// instead of allocating a new record each time.
    ///
    /// This is a performance hint. Scanners only lend out `&Record`, so a
    /// caller that needs a record past the next `advance` must clone it.
    ///
    /// This is disabled by default.
    pub fn reuse_record(&mut self, yes: bool) -> &mut ScannerBuilder {
        self.reuse = yes;
        self
    }

    /// Whether scanning continues past a malformed record.
    ///
    /// When disabled (the default), the first parse error stops the scanner.
    /// When enabled, `advance` still returns `true` for a malformed record,
    /// and the error is available from `error` until the next `advance`.
    ///
    /// I/O errors stop the scanner either way.
    pub fn continue_on_error(&mut self, yes: bool) -> &mut ScannerBuilder {
        self.continue_on_error = yes;
        self
    }

    /// Discard the first record, which is typically a header.
    ///
    /// This adds one to the number of leading records skipped.
    pub fn skip_header_record(&mut self) -> &mut ScannerBuilder {
        self.skip += 1;
        self
    }

    /// Discard the first `n` records before any become visible.
    ///
    /// This adds `n` to the number of leading records skipped, so it
    /// combines with `skip_header_record` in either order.
    pub fn skip_records(&mut self, n: u64) -> &mut ScannerBuilder {
        self.skip += n;
        self
    }

    fn source<R: io::Read>(&self, rdr: R, count: FieldCount) -> Source<R> {
        Source::new(self.builder.build(), rdr)
            .comment(self.comment)
            .trim_leading_space(self.trim)
            .reuse(self.reuse)
            .fields_per_record(count)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum State {
    Scanning,
    /// The source was exhausted. This is terminal.
    Exhausted,
    /// An error stopped the scanner. This is terminal.
    Halted,
}

/// A pull-based scanner over the records of a `RecordSource`.
///
/// Call `advance` to move to the next record, and then inspect it with
/// `record` and `error`. End of input is never reported as an error.
///
/// # Example
///
/// ```
/// use csv_scanner::Scanner;
///
/// let mut scanner = Scanner::from_reader("a,b\n1,2\n".as_bytes());
/// let mut rows = vec![];
/// while scanner.advance() {
///     rows.push(scanner.record().unwrap().to_vec());
/// }
/// assert!(scanner.error().is_none());
/// assert_eq!(rows, vec![vec!["a", "b"], vec!["1", "2"]]);
/// ```
#[derive(Debug)]
pub struct Scanner<S> {
    source: S,
    record: Record,
    has_record: bool,
    err: Option<Error>,
    state: State,
    continue_on_error: bool,
    /// Leading records still to be discarded.
    skip: u64,
}

impl<R: io::Read> Scanner<Source<R>> {
    /// Create a new scanner with a default configuration for the given
    /// reader.
    pub fn from_reader(rdr: R) -> Scanner<Source<R>> {
        ScannerBuilder::new().from_reader(rdr)
    }
}

impl Scanner<Source<File>> {
    /// Create a new scanner with a default configuration for the given file
    /// path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Scanner<Source<File>>> {
        ScannerBuilder::new().from_path(path)
    }
}

impl<S: RecordSource> Scanner<S> {
    /// Advance the scanner to the next record.
    ///
    /// Returns `false` once the input is exhausted, or when a record could
    /// not be read and the scanner is not configured to continue on errors.
    /// Once this returns `false`, it always returns `false` and the source is
    /// never read again.
    ///
    /// When the scanner continues on errors, `true` is returned for a
    /// malformed record too. Check `error` to tell the two apart; `record`
    /// then holds whatever the source managed to produce.
    pub fn advance(&mut self) -> bool {
        if self.state != State::Scanning {
            return false;
        }
        while self.skip > 0 {
            self.skip -= 1;
            if !self.step() {
                return false;
            }
            trace!(remaining = self.skip, "skipped leading record");
        }
        self.step()
    }

    /// The record produced by the most recent call to `advance`.
    ///
    /// This is `None` before the first `advance` and after scanning stops.
    pub fn record(&self) -> Option<&Record> {
        if self.has_record {
            Some(&self.record)
        } else {
            None
        }
    }

    /// The error produced by the most recent call to `advance`, if any.
    ///
    /// This is reset by every call to `advance` that reads from the source,
    /// so a malformed record skipped over with `continue_on_error` does not
    /// taint the records after it. It is never an end of input.
    pub fn error(&self) -> Option<&Error> {
        self.err.as_ref()
    }

    /// Take ownership of the error produced by the most recent call to
    /// `advance`, if any.
    pub fn take_error(&mut self) -> Option<Error> {
        self.err.take()
    }

    /// Returns true once `advance` will never return `true` again.
    pub fn is_done(&self) -> bool {
        self.state != State::Scanning
    }

    /// Forget the current record, so that `record` returns `None` until the
    /// next `advance`.
    pub(crate) fn clear_record(&mut self) {
        self.record.clear();
        self.has_record = false;
    }

    /// Returns a reference to the underlying record source.
    pub fn get_ref(&self) -> &S {
        &self.source
    }

    /// Returns a mutable reference to the underlying record source.
    ///
    /// Reading from the source directly discards records the scanner will
    /// never see.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Unwraps this scanner, returning the underlying record source.
    pub fn into_source(self) -> S {
        self.source
    }

    /// Read exactly one record from the source and apply the error policy.
    fn step(&mut self) -> bool {
        if !self.source.reuse_record() {
            self.record = Record::new();
        }
        match self.source.read_record(&mut self.record) {
            Ok(true) => {
                self.has_record = true;
                self.err = None;
                true
            }
            Ok(false) => {
                debug!("record source exhausted");
                self.record.clear();
                self.has_record = false;
                self.err = None;
                self.state = State::Exhausted;
                false
            }
            Err(err) => {
                if self.continue_on_error && !err.is_io_error() {
                    debug!(error = %err, "continuing past malformed record");
                    self.has_record = true;
                    self.err = Some(err);
                    true
                } else {
                    debug!(error = %err, "scanning halted");
                    self.record.clear();
                    self.has_record = false;
                    self.err = Some(err);
                    self.state = State::Halted;
                    false
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use crate::error::Error;
    use crate::record::{Position, Record};
    use crate::source::{FieldCount, RecordSource};

    use super::{Scanner, ScannerBuilder};

    const CANON: &str = "\
first_name,last_name,username
\"Rob\",\"Pike\",rob
Ken,Thompson,ken
\"Robert\",\"Griesemer\",\"gri\"";

    const CANON_WITH_OPTIONS: &str = "\
first_name;last_name;username
\"Rob\";\"Pike\";rob
# lines beginning with a # character are ignored
Ken;Thompson;ken
\"Robert\";\"Griesemer\";\"gri\"";

    const INCONSISTENT: &str = "1,2,3\n1,2,3,4\n1,2,3";

    #[derive(Debug)]
    struct Scanned {
        line: u64,
        record: Option<Vec<String>>,
        err: Option<String>,
    }

    /// Drain `scanner`, recording the 1-based step at which each record or
    /// error showed up.
    fn scan_all<S: RecordSource>(mut scanner: Scanner<S>) -> Vec<Scanned> {
        let mut scanned = vec![];
        let mut line = 1;
        while scanner.advance() {
            scanned.push(Scanned {
                line,
                record: scanner.record().map(|r| r.to_vec()),
                err: scanner.error().map(|e| e.to_string()),
            });
            line += 1;
        }
        if let Some(err) = scanner.error() {
            scanned.push(Scanned {
                line,
                record: scanner.record().map(|r| r.to_vec()),
                err: Some(err.to_string()),
            });
        }
        scanned
    }

    fn records(scanned: &[Scanned]) -> Vec<Vec<String>> {
        scanned.iter().filter_map(|s| s.record.clone()).collect()
    }

    fn s(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|x| x.to_string()).collect()
    }

    fn canon_rows() -> Vec<Vec<String>> {
        vec![
            s(&["first_name", "last_name", "username"]),
            s(&["Rob", "Pike", "rob"]),
            s(&["Ken", "Thompson", "ken"]),
            s(&["Robert", "Griesemer", "gri"]),
        ]
    }

    #[test]
    fn canonical() {
        let scanner = ScannerBuilder::new()
            .delimiter(b',')
            .fields_per_record(FieldCount::Exactly(3))
            .from_reader(CANON.as_bytes());
        let scanned = scan_all(scanner);

        assert!(scanned.iter().all(|s| s.err.is_none()));
        assert_eq!(
            scanned.iter().map(|s| s.line).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
        assert_eq!(records(&scanned), canon_rows());
    }

    #[test]
    fn canonical_with_options() {
        let scanner = ScannerBuilder::new()
            .delimiter(b';')
            .comment(Some(b'#'))
            .from_reader(CANON_WITH_OPTIONS.as_bytes());
        let scanned = scan_all(scanner);

        assert!(scanned.iter().all(|s| s.err.is_none()));
        assert_eq!(records(&scanned), canon_rows());
    }

    #[test]
    fn inconsistent_field_counts_continue_on_error() {
        let mut scanner = ScannerBuilder::new()
            .continue_on_error(true)
            .from_reader(INCONSISTENT.as_bytes());

        assert!(scanner.advance());
        assert_eq!(scanner.record().unwrap(), vec!["1", "2", "3"]);
        assert!(scanner.error().is_none());

        assert!(scanner.advance());
        assert_eq!(scanner.record().unwrap(), vec!["1", "2", "3", "4"]);
        match scanner.error() {
            Some(&Error::UnequalLengths {
                pos: Some(ref pos),
                expected_len: 3,
                len: 4,
            }) => {
                assert_eq!(pos.line(), 2);
                assert_eq!(pos.record(), 1);
            }
            err => panic!("expected unequal lengths, got {:?}", err),
        }

        assert!(scanner.advance());
        assert_eq!(scanner.record().unwrap(), vec!["1", "2", "3"]);
        assert!(scanner.error().is_none());

        assert!(!scanner.advance());
        assert!(scanner.record().is_none());
        assert!(scanner.error().is_none());
    }

    #[test]
    fn inconsistent_field_counts_halt_on_error() {
        let mut scanner = Scanner::from_reader(INCONSISTENT.as_bytes());

        assert!(scanner.advance());
        assert_eq!(scanner.record().unwrap(), vec!["1", "2", "3"]);

        assert!(!scanner.advance());
        assert!(scanner.record().is_none());
        match scanner.error() {
            Some(&Error::UnequalLengths { pos: Some(ref pos), .. }) => {
                assert_eq!(pos.line(), 2);
            }
            err => panic!("expected unequal lengths, got {:?}", err),
        }

        // Halting is terminal and the error sticks around.
        assert!(!scanner.advance());
        assert!(scanner.record().is_none());
        assert!(scanner.error().is_some());
    }

    #[test]
    fn exact_count_rejects_wider_row() {
        let data = "a,b,c\n1,2,3,4\n5,6,7\n";
        let scanner = ScannerBuilder::new()
            .fields_per_record(FieldCount::Exactly(3))
            .from_reader(data.as_bytes());
        let scanned = scan_all(scanner);

        assert_eq!(scanned.len(), 2);
        assert_eq!(scanned[1].record, None);
        assert!(scanned[1].err.as_ref().unwrap().contains("line 2"));
    }

    #[test]
    fn any_count_accepts_ragged_rows() {
        let data = "a\nb,c\nd,e,f\n";
        let scanner = ScannerBuilder::new()
            .fields_per_record(FieldCount::Any)
            .from_reader(data.as_bytes());
        let scanned = scan_all(scanner);

        assert!(scanned.iter().all(|s| s.err.is_none()));
        assert_eq!(
            records(&scanned),
            vec![s(&["a"]), s(&["b", "c"]), s(&["d", "e", "f"])]
        );
    }

    #[test]
    fn calls_to_advance_after_eof_return_false() {
        let mut scanner = Scanner::from_reader("1,2,3".as_bytes());

        assert!(scanner.advance());
        assert_eq!(scanner.record().unwrap(), vec!["1", "2", "3"]);
        assert!(scanner.error().is_none());

        for _ in 0..100 {
            assert!(!scanner.advance());
            assert!(scanner.record().is_none());
            assert!(scanner.error().is_none());
            assert!(scanner.is_done());
        }
    }

    #[test]
    fn nothing_before_first_advance() {
        let scanner = Scanner::from_reader(CANON.as_bytes());
        assert!(scanner.record().is_none());
        assert!(scanner.error().is_none());
        assert!(!scanner.is_done());
    }

    #[test]
    fn empty_input() {
        let mut scanner = Scanner::from_reader("".as_bytes());
        assert!(!scanner.advance());
        assert!(scanner.error().is_none());
    }

    #[test]
    fn skip_header() {
        let scanner = ScannerBuilder::new()
            .skip_header_record()
            .from_reader(CANON.as_bytes());
        let scanned = scan_all(scanner);

        assert_eq!(records(&scanned), canon_rows()[1..].to_vec());
    }

    #[test]
    fn skip_records() {
        let scanner = ScannerBuilder::new()
            .skip_records(3)
            .from_reader(CANON.as_bytes());
        let scanned = scan_all(scanner);

        assert_eq!(scanned.len(), 1);
        assert_eq!(scanned[0].line, 1);
        assert_eq!(records(&scanned), vec![s(&["Robert", "Griesemer", "gri"])]);
    }

    #[test]
    fn skip_more_records_than_exist() {
        let mut scanner = ScannerBuilder::new()
            .skip_records(10)
            .from_reader(CANON.as_bytes());

        assert!(!scanner.advance());
        assert!(scanner.error().is_none());
        assert!(scanner.is_done());
    }

    #[test]
    fn trim_leading_space() {
        let mut scanner = ScannerBuilder::new()
            .trim_leading_space(true)
            .from_reader("a,  b,\tc \n".as_bytes());

        assert!(scanner.advance());
        assert_eq!(scanner.record().unwrap(), vec!["a", "b", "c "]);
    }

    #[test]
    fn reuse_record_keeps_contents_correct() {
        let mut scanner = ScannerBuilder::new()
            .reuse_record(true)
            .from_reader("aaaaaaaa,b\nc,dddddddd\n".as_bytes());
        assert!(scanner.get_ref().reuse_record());

        assert!(scanner.advance());
        let first = scanner.record().unwrap().clone();
        assert!(scanner.advance());
        assert_eq!(first, vec!["aaaaaaaa", "b"]);
        assert_eq!(scanner.record().unwrap(), vec!["c", "dddddddd"]);
    }

    #[test]
    fn record_positions() {
        let mut scanner = Scanner::from_reader("a,b\n\nc,d\n".as_bytes());

        assert!(scanner.advance());
        let pos = scanner.record().unwrap().position().unwrap().clone();
        assert_eq!((pos.byte(), pos.line(), pos.record()), (0, 1, 0));

        assert!(scanner.advance());
        let pos = scanner.record().unwrap().position().unwrap().clone();
        assert_eq!((pos.byte(), pos.line(), pos.record()), (5, 3, 1));
    }

    #[test]
    fn error_line_skips_blank_lines() {
        let mut scanner = Scanner::from_reader("a,b\n\n\n1,2,3\n".as_bytes());

        assert!(scanner.advance());
        assert!(!scanner.advance());
        match scanner.error() {
            Some(&Error::UnequalLengths { pos: Some(ref pos), .. }) => {
                assert_eq!((pos.byte(), pos.line(), pos.record()), (6, 4, 1));
            }
            err => panic!("expected unequal lengths, got {:?}", err),
        }
    }

    #[test]
    fn error_line_skips_comment_lines() {
        let data = "a,b,c\n1,2,3\n# note\n4,5,6,7\n";
        let mut scanner = ScannerBuilder::new()
            .comment(Some(b'#'))
            .from_reader(data.as_bytes());

        assert!(scanner.advance());
        assert!(scanner.advance());
        assert!(!scanner.advance());
        match scanner.error() {
            Some(&Error::UnequalLengths { pos: Some(ref pos), .. }) => {
                assert_eq!(pos.line(), 4);
                assert_eq!(pos.record(), 2);
            }
            err => panic!("expected unequal lengths, got {:?}", err),
        }
        assert!(scanner.error().unwrap().to_string().contains("line 4"));
    }

    #[test]
    fn exact_count_continue_on_error() {
        let data = "a,b,c\n1,2,3,4\n5,6,7\n8,9,10\n";
        let mut scanner = ScannerBuilder::new()
            .fields_per_record(FieldCount::Exactly(3))
            .continue_on_error(true)
            .from_reader(data.as_bytes());

        assert!(scanner.advance());
        assert!(scanner.error().is_none());

        assert!(scanner.advance());
        assert_eq!(scanner.record().unwrap(), vec!["1", "2", "3", "4"]);
        match scanner.error() {
            Some(&Error::UnequalLengths {
                pos: Some(ref pos),
                expected_len: 3,
                len: 4,
            }) => assert_eq!(pos.line(), 2),
            err => panic!("expected unequal lengths, got {:?}", err),
        }

        assert!(scanner.advance());
        assert!(scanner.error().is_none());
        assert_eq!(scanner.record().unwrap(), vec!["5", "6", "7"]);
        assert!(scanner.advance());
        assert!(scanner.error().is_none());
        assert_eq!(scanner.record().unwrap(), vec!["8", "9", "10"]);
        assert!(!scanner.advance());
        assert!(scanner.error().is_none());
    }

    #[test]
    fn skip_counts_add_up_in_any_order() {
        let data = "1\n2\n3\n4\n5\n6\n";
        let mut first = ScannerBuilder::new()
            .skip_records(3)
            .skip_header_record()
            .from_reader(data.as_bytes());
        let mut second = ScannerBuilder::new()
            .skip_header_record()
            .skip_records(3)
            .from_reader(data.as_bytes());

        assert!(first.advance());
        assert!(second.advance());
        assert_eq!(first.record().unwrap(), vec!["5"]);
        assert_eq!(second.record().unwrap(), vec!["5"]);
    }

    #[test]
    fn invalid_utf8_continue_on_error() {
        let data: &[u8] = b"a,b\nc,\xFF\ne,f\n";
        let mut scanner =
            ScannerBuilder::new().continue_on_error(true).from_reader(data);

        assert!(scanner.advance());
        assert!(scanner.advance());
        match scanner.error() {
            Some(&Error::Utf8 { ref err, .. }) => {
                assert_eq!(err.field(), 1);
                assert_eq!(err.valid_up_to(), 0);
            }
            err => panic!("expected utf-8 error, got {:?}", err),
        }
        assert!(scanner.record().unwrap().is_empty());

        assert!(scanner.advance());
        assert!(scanner.error().is_none());
        assert_eq!(scanner.record().unwrap(), vec!["e", "f"]);
    }

    #[derive(Debug)]
    struct ErrorReader;

    impl io::Read for ErrorReader {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "ERROR"))
        }
    }

    #[test]
    fn io_error_halts_even_when_continuing() {
        let mut scanner = ScannerBuilder::new()
            .continue_on_error(true)
            .from_reader(ErrorReader);

        assert!(!scanner.advance());
        assert!(scanner.error().unwrap().is_io_error());
        assert!(!scanner.advance());
    }

    /// A source that hands out canned results, counting how often it is
    /// asked.
    struct Canned {
        results: Vec<Result<Vec<&'static str>, ()>>,
        reads: usize,
        pos: Position,
    }

    impl RecordSource for Canned {
        fn read_record(
            &mut self,
            record: &mut Record,
        ) -> crate::error::Result<bool> {
            self.reads += 1;
            record.clear();
            if self.results.is_empty() {
                return Ok(false);
            }
            match self.results.remove(0) {
                Ok(fields) => {
                    record.extend(fields);
                    Ok(true)
                }
                Err(()) => {
                    record.push_field("partial");
                    Err(Error::UnequalLengths {
                        pos: None,
                        expected_len: 2,
                        len: 1,
                    })
                }
            }
        }

        fn position(&self) -> &Position {
            &self.pos
        }
    }

    #[test]
    fn custom_source_is_not_read_after_exhaustion() {
        let source = Canned {
            results: vec![Ok(vec!["x", "y"]), Err(()), Ok(vec!["z", "w"])],
            reads: 0,
            pos: Position::new(),
        };
        let mut scanner =
            ScannerBuilder::new().continue_on_error(true).from_source(source);

        assert!(scanner.advance());
        assert!(scanner.advance());
        assert_eq!(scanner.record().unwrap(), vec!["partial"]);
        assert!(scanner.error().is_some());
        assert!(scanner.advance());
        assert!(scanner.error().is_none());
        assert!(!scanner.advance());
        assert!(!scanner.advance());
        assert!(!scanner.advance());

        assert_eq!(scanner.into_source().reads, 4);
    }

    #[test]
    fn take_error_moves_it_out() {
        let mut scanner = Scanner::from_reader(INCONSISTENT.as_bytes());
        while scanner.advance() {}

        assert!(scanner.take_error().is_some());
        assert!(scanner.error().is_none());
    }
}

use std::borrow::Cow;
use std::fmt;
use std::fs::File;
use std::io;
use std::path::Path;

use csv_core::{
    WriteResult, Writer as CoreWriter, WriterBuilder as CoreWriterBuilder,
};

use crate::error::{Error, Result};

/// Builds a CSV writer with various configuration knobs.
#[derive(Debug)]
pub struct WriterBuilder {
    builder: CoreWriterBuilder,
    capacity: usize,
}

impl Default for WriterBuilder {
    fn default() -> WriterBuilder {
        WriterBuilder {
            builder: CoreWriterBuilder::new(),
            capacity: 8 * (1 << 10),
        }
    }
}

impl WriterBuilder {
    /// Create a new builder for configuring CSV writing.
    pub fn new() -> WriterBuilder {
        WriterBuilder::default()
    }

    /// Build a CSV writer from this configuration that writes data to `wtr`.
    ///
    /// Note that the CSV writer is buffered automatically, so you should not
    /// wrap `wtr` in a buffered writer like `io::BufWriter`.
    pub fn from_writer<W: io::Write>(&self, wtr: W) -> Writer<W> {
        Writer {
            core: self.builder.build(),
            wtr: Some(wtr),
            buf: vec![0; self.capacity],
            len: 0,
            panicked: false,
        }
    }

    /// Build a CSV writer from this configuration that writes data to the
    /// given file path. The file is truncated if it already exists.
    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<Writer<File>> {
        Ok(self.from_writer(File::create(path)?))
    }

    /// The field delimiter to use when writing CSV.
    ///
    /// The default is `b','`.
    pub fn delimiter(&mut self, delimiter: u8) -> &mut WriterBuilder {
        self.builder.delimiter(delimiter);
        self
    }

    /// The quote character to use when writing CSV.
    ///
    /// The default is `b'"'`.
    pub fn quote(&mut self, quote: u8) -> &mut WriterBuilder {
        self.builder.quote(quote);
        self
    }

    /// Set the capacity (in bytes) of the internal buffer used in the CSV
    /// writer. This defaults to a reasonable setting.
    pub fn buffer_capacity(&mut self, capacity: usize) -> &mut WriterBuilder {
        self.capacity = capacity;
        self
    }
}

/// A value with a default rendering as a CSV field.
///
/// Integers are written with `itoa` and floats with `ryu`, which produce the
/// shortest text that reads back to the same value.
pub trait ToField {
    /// The text of this value as a single field.
    fn to_field(&self) -> Cow<str>;
}

impl ToField for str {
    fn to_field(&self) -> Cow<str> {
        Cow::Borrowed(self)
    }
}

impl ToField for String {
    fn to_field(&self) -> Cow<str> {
        Cow::Borrowed(self)
    }
}

impl ToField for bool {
    fn to_field(&self) -> Cow<str> {
        Cow::Borrowed(if *self { "true" } else { "false" })
    }
}

impl ToField for char {
    fn to_field(&self) -> Cow<str> {
        Cow::Owned(self.to_string())
    }
}

/// `None` is written as an empty field.
impl<T: ToField> ToField for Option<T> {
    fn to_field(&self) -> Cow<str> {
        match *self {
            None => Cow::Borrowed(""),
            Some(ref value) => value.to_field(),
        }
    }
}

impl<'a, T: ToField + ?Sized> ToField for &'a T {
    fn to_field(&self) -> Cow<str> {
        (**self).to_field()
    }
}

macro_rules! to_field_itoa {
    ($($ty:ty),*) => {
        $(
            impl ToField for $ty {
                fn to_field(&self) -> Cow<str> {
                    Cow::Owned(itoa::Buffer::new().format(*self).to_string())
                }
            }
        )*
    }
}

macro_rules! to_field_ryu {
    ($($ty:ty),*) => {
        $(
            impl ToField for $ty {
                fn to_field(&self) -> Cow<str> {
                    Cow::Owned(ryu::Buffer::new().format(*self).to_string())
                }
            }
        )*
    }
}

to_field_itoa!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
to_field_ryu!(f32, f64);

/// A buffered CSV writer.
///
/// Quoting is applied only where a field needs it. The buffer is flushed
/// when the writer is dropped, but errors from that flush are lost, so call
/// `flush` or `into_inner` to observe them.
///
/// # Example
///
/// ```
/// use csv_scanner::Writer;
///
/// # fn main() -> csv_scanner::Result<()> {
/// let mut wtr = Writer::from_writer(vec![]);
/// wtr.write_record(&["name", "age", "height"])?;
/// wtr.write_fields(&[&"Jim", &18, &4.2])?;
///
/// let data = String::from_utf8(wtr.into_inner()?).unwrap();
/// assert_eq!(data, "name,age,height\nJim,18,4.2\n");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Writer<W: io::Write> {
    core: CoreWriter,
    wtr: Option<W>,
    buf: Vec<u8>,
    len: usize,
    /// Set while the underlying writer is being called, so that a panic in
    /// it doesn't trigger a second write from `Drop`.
    panicked: bool,
}

impl<W: io::Write> Drop for Writer<W> {
    fn drop(&mut self) {
        if self.wtr.is_some() && !self.panicked {
            let _ = self.flush();
        }
    }
}

impl Writer<File> {
    /// Build a CSV writer with a default configuration that writes data to
    /// the given file path. The file is truncated if it already exists.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Writer<File>> {
        WriterBuilder::new().from_path(path)
    }
}

impl<W: io::Write> Writer<W> {
    /// Build a CSV writer with a default configuration that writes data to
    /// `wtr`.
    pub fn from_writer(wtr: W) -> Writer<W> {
        WriterBuilder::new().from_writer(wtr)
    }

    /// Write a single record of string or byte fields.
    pub fn write_record<I, T>(&mut self, record: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let mut first = true;
        for field in record {
            if !first {
                self.write_delimiter()?;
            }
            first = false;
            self.write_field(field.as_ref())?;
        }
        self.write_terminator()
    }

    /// Write a single record built from values of mixed types, each in its
    /// default rendering.
    pub fn write_fields(&mut self, fields: &[&dyn ToField]) -> Result<()> {
        self.write_record(fields.iter().map(|f| f.to_field().into_owned()))
    }

    /// Write a single record, rendering every value with `format`.
    ///
    /// ```
    /// use csv_scanner::Writer;
    ///
    /// # fn main() -> csv_scanner::Result<()> {
    /// let mut wtr = Writer::from_writer(vec![]);
    /// wtr.write_formatted(&[1.0, 2.04], |x| format!("{:.1}", x))?;
    /// assert_eq!(wtr.into_inner()?, b"1.0,2.0\n");
    /// # Ok(())
    /// # }
    /// ```
    pub fn write_formatted<I, T, F>(
        &mut self,
        fields: I,
        mut format: F,
    ) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        F: FnMut(T) -> String,
    {
        self.write_record(fields.into_iter().map(|f| format(f)))
    }

    /// Write a single record from values that render themselves through
    /// `Display`.
    pub fn write_display<I, T>(&mut self, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: fmt::Display,
    {
        self.write_record(fields.into_iter().map(|f| f.to_string()))
    }

    /// Write every record produced by `records` until it runs out, then
    /// flush.
    ///
    /// This works with any iterator, including the receiving end of a
    /// channel, in which case it blocks until all senders hang up. The first
    /// error stops writing and is returned before the final flush. Output
    /// buffered up to that point, which may end in a partial record, stays
    /// in the buffer and is written by a later `flush` or when the writer is
    /// dropped.
    pub fn write_stream<I, R, T>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        for record in records {
            self.write_record(record)?;
        }
        self.flush()
    }

    /// Flush the contents of the internal buffer to the underlying writer,
    /// and then flush the underlying writer itself.
    pub fn flush(&mut self) -> Result<()> {
        self.flush_buf()?;
        if let Some(ref mut wtr) = self.wtr {
            wtr.flush()?;
        }
        Ok(())
    }

    /// Flush this writer and return the underlying writer.
    pub fn into_inner(mut self) -> Result<W> {
        self.flush()?;
        self.wtr.take().ok_or_else(|| {
            Error::Io(io::Error::new(
                io::ErrorKind::Other,
                "CSV writer has no underlying writer",
            ))
        })
    }

    fn write_field(&mut self, mut field: &[u8]) -> Result<()> {
        loop {
            let (res, nin, nout) =
                self.core.field(field, &mut self.buf[self.len..]);
            field = &field[nin..];
            self.len += nout;
            match res {
                WriteResult::InputEmpty => return Ok(()),
                WriteResult::OutputFull => self.flush_buf()?,
            }
        }
    }

    fn write_delimiter(&mut self) -> Result<()> {
        loop {
            let (res, nout) = self.core.delimiter(&mut self.buf[self.len..]);
            self.len += nout;
            match res {
                WriteResult::InputEmpty => return Ok(()),
                WriteResult::OutputFull => self.flush_buf()?,
            }
        }
    }

    fn write_terminator(&mut self) -> Result<()> {
        loop {
            let (res, nout) = self.core.terminator(&mut self.buf[self.len..]);
            self.len += nout;
            match res {
                WriteResult::InputEmpty => return Ok(()),
                WriteResult::OutputFull => self.flush_buf()?,
            }
        }
    }

    fn flush_buf(&mut self) -> io::Result<()> {
        if let Some(ref mut wtr) = self.wtr {
            self.panicked = true;
            let result = wtr.write_all(&self.buf[..self.len]);
            self.panicked = false;
            result?;
        }
        self.len = 0;
        Ok(())
    }
}

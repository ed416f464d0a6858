/*!
Layered scanning of CSV data.

The bottom layer, [`Scanner`](struct.Scanner.html), reads one record at a
time and keeps the most recent error alongside it, so a caller can step
through the whole input and decide per record whether an error matters.
[`ColumnScanner`](struct.ColumnScanner.html) consumes the first record as a
header and looks fields up by column name.
[`StructScanner`](struct.StructScanner.html) copies named columns into the
fields of a struct that implements [`Populate`](trait.Populate.html).

A [`Writer`](struct.Writer.html) covers the other direction.

Records are produced by a [`RecordSource`](trait.RecordSource.html). The
default source, [`Source`](struct.Source.html), tokenizes bytes from any
`io::Read` with `csv-core`, but any type implementing the trait can be
scanned.

# Example

```
use csv_scanner::Scanner;

# fn main() -> csv_scanner::Result<()> {
let data = "\
city,country
Boston,United States
Concord,United States
";
let mut scanner = Scanner::from_reader(data.as_bytes());
let mut cities = vec![];
while scanner.advance() {
    if let Some(err) = scanner.take_error() {
        return Err(err);
    }
    if let Some(record) = scanner.record() {
        cities.push(record[0].to_string());
    }
}
assert_eq!(cities, vec!["city", "Boston", "Concord"]);
# Ok(())
# }
```

# Errors

`advance` never returns an error itself. Once it returns `false`, the scanner
is done, and `error` tells exhaustion (`None`) apart from a failure. With
`ScannerBuilder::continue_on_error`, a malformed record still comes back from
`advance` with its error attached, and scanning may carry on past it.
*/

pub use crate::column::ColumnScanner;
pub use crate::error::{Error, Result, Utf8Error};
pub use crate::populate::{Field, FromField, Populate};
pub use crate::record::{Position, Record, RecordIter};
pub use crate::scanner::{Scanner, ScannerBuilder};
pub use crate::source::{FieldCount, RecordSource, Source};
pub use crate::structs::StructScanner;
pub use crate::writer::{ToField, Writer, WriterBuilder};

mod column;
mod error;
mod populate;
mod record;
mod scanner;
#[cfg(feature = "serde")]
mod serde_impl;
mod source;
mod structs;
mod writer;

//! The reading/writing trait shared by every format adapter.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Cursor, Write},
    path::Path,
};

use crate::error::Error;

/// Reads one file format into its in-memory shape and writes it back.
///
/// Implementors only provide [`from_reader`](Parser::from_reader) and
/// [`to_writer`](Parser::to_writer); paths, strings and byte slices are
/// handled here.
///
/// # Example
///
/// ```rust,no_run
/// use locsync::traits::Parser;
/// let format = locsync::formats::json::Format::read_from("en/common.json")?;
/// format.write_to("en/common.copy.json")?;
/// Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait Parser {
    /// Parse from any reader.
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error>
    where
        Self: Sized;

    /// Parse from file path.
    fn read_from<P: AsRef<Path>>(path: P) -> Result<Self, Error>
    where
        Self: Sized,
    {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Write to any writer.
    fn to_writer<W: Write>(&self, writer: W) -> Result<(), Error>;

    /// Write to file path.
    fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let file = File::create(path)?;
        self.to_writer(BufWriter::new(file))
    }

    /// Parse from a string.
    fn from_str(s: &str) -> Result<Self, Error>
    where
        Self: Sized,
    {
        Self::from_reader(Cursor::new(s))
    }

    /// Parse from bytes.
    fn from_bytes(bytes: &[u8]) -> Result<Self, Error>
    where
        Self: Sized,
    {
        Self::from_reader(Cursor::new(bytes))
    }

    /// Serialize into a `String`.
    fn write_to_string(&self) -> Result<String, Error> {
        let mut buf = Vec::new();
        self.to_writer(&mut buf)?;
        String::from_utf8(buf).map_err(|e| Error::conversion_error("output is not UTF-8", Some(Box::new(e))))
    }
}

/// Reads the whole input and checks that its first significant character is
/// one of `expected`. A leading BOM and whitespace are skipped.
pub(crate) fn read_expecting<R: BufRead>(mut reader: R, expected: &[char]) -> Result<String, Error> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    let body = text.trim_start_matches('\u{feff}').trim_start();
    match body.chars().next() {
        Some(c) if expected.contains(&c) => Ok(body.to_string()),
        found => Err(Error::format_mismatch(
            expected.iter().collect::<String>(),
            found.map_or_else(|| "end of input".to_string(), String::from),
        )),
    }
}

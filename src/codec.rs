//! Null-aware delimited reader and writer.
//!
//! Reading turns every raw field exactly equal to the configured input-null
//! token into [`Cell::Null`]; when no token is configured nothing is ever
//! read as null, so empty-but-present fields stay empty text. Writing turns
//! [`Cell::Null`] into the output-null token (empty by default). Input and
//! output carry independent dialects.

use std::{
    io::{Read, Write},
    path::Path,
};

use anyhow::{Context, Result};
use csv::{ByteRecord, QuoteStyle, Terminator};
use encoding_rs::{Encoding, UTF_8};

use crate::{
    cli::{DialectName, GlobalArgs},
    data::{Cell, Header, Row},
    io_utils,
};

/// Delimiter and quoting convention of a delimited stream.
#[derive(Debug, Clone, Copy)]
pub struct Dialect {
    pub delimiter: u8,
    pub quote_style: QuoteStyle,
    pub terminator: Terminator,
}

impl Dialect {
    pub fn named(name: DialectName) -> Self {
        match name {
            DialectName::Excel => Dialect {
                delimiter: b',',
                quote_style: QuoteStyle::Necessary,
                terminator: Terminator::CRLF,
            },
            DialectName::ExcelTab => Dialect {
                delimiter: b'\t',
                quote_style: QuoteStyle::Necessary,
                terminator: Terminator::CRLF,
            },
            DialectName::Unix => Dialect {
                delimiter: b',',
                quote_style: QuoteStyle::Always,
                terminator: Terminator::Any(b'\n'),
            },
        }
    }

    pub fn with_delimiter(mut self, delimiter: Option<u8>) -> Self {
        if let Some(delimiter) = delimiter {
            self.delimiter = delimiter;
        }
        self
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Dialect::named(DialectName::Excel)
    }
}

#[derive(Debug, Clone)]
pub struct InputConfig {
    pub dialect: Dialect,
    pub null: Option<String>,
    pub encoding: &'static Encoding,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            null: None,
            encoding: UTF_8,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub dialect: Dialect,
    pub null: String,
    pub encoding: &'static Encoding,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            null: String::new(),
            encoding: UTF_8,
        }
    }
}

/// Everything the readers and writers of one invocation need to know.
#[derive(Debug, Clone, Default)]
pub struct CodecConfig {
    pub input: InputConfig,
    pub output: OutputConfig,
}

impl CodecConfig {
    pub fn from_args(args: &GlobalArgs) -> Result<Self> {
        Ok(Self {
            input: InputConfig {
                dialect: Dialect::named(args.input_dialect).with_delimiter(args.input_delimiter),
                null: args.input_null.clone(),
                encoding: io_utils::resolve_encoding(args.input_encoding.as_deref())?,
            },
            output: OutputConfig {
                dialect: Dialect::named(args.output_dialect)
                    .with_delimiter(args.output_delimiter),
                null: args.output_null.clone().unwrap_or_default(),
                encoding: io_utils::resolve_encoding(args.output_encoding.as_deref())?,
            },
        })
    }
}

/// Row source: the header first, then a single pass over the data rows.
pub struct RowReader<R: Read> {
    reader: csv::Reader<R>,
    record: ByteRecord,
    null: Option<String>,
    encoding: &'static Encoding,
    records_read: usize,
}

impl<R: Read> RowReader<R> {
    pub fn new(source: R, config: &InputConfig) -> Self {
        let mut builder = csv::ReaderBuilder::new();
        builder
            .has_headers(false)
            .delimiter(config.dialect.delimiter)
            .quoting(!matches!(config.dialect.quote_style, QuoteStyle::Never))
            .double_quote(true)
            .flexible(true);
        Self {
            reader: builder.from_reader(source),
            record: ByteRecord::new(),
            null: config.null.clone(),
            encoding: config.encoding,
            records_read: 0,
        }
    }

    /// Reads the first record as plain column names. Returns `None` for an
    /// empty stream.
    pub fn read_header(&mut self) -> Result<Option<Header>> {
        if !self.next_record()? {
            return Ok(None);
        }
        self.decode_current().map(Some)
    }

    pub fn read_row(&mut self) -> Result<Option<Row>> {
        if !self.next_record()? {
            return Ok(None);
        }
        let fields = self
            .decode_current()
            .with_context(|| format!("Decoding row {}", self.records_read))?;
        Ok(Some(
            fields
                .into_iter()
                .map(|field| self.to_cell(field))
                .collect(),
        ))
    }

    /// Reads every remaining row into memory.
    pub fn read_all(&mut self) -> Result<Vec<Row>> {
        let mut rows = Vec::new();
        while let Some(row) = self.read_row()? {
            rows.push(row);
        }
        Ok(rows)
    }

    pub fn records_read(&self) -> usize {
        self.records_read
    }

    fn next_record(&mut self) -> Result<bool> {
        let more = self
            .reader
            .read_byte_record(&mut self.record)
            .with_context(|| format!("Reading row {}", self.records_read + 1))?;
        if more {
            self.records_read += 1;
        }
        Ok(more)
    }

    // Only the first record of the stream may start with a byte order mark.
    fn decode_current(&self) -> Result<Vec<String>> {
        if self.records_read == 1 {
            io_utils::decode_first_record(&self.record, self.encoding)
        } else {
            io_utils::decode_record(&self.record, self.encoding)
        }
    }

    fn to_cell(&self, field: String) -> Cell {
        match &self.null {
            Some(token) if *token == field => Cell::Null,
            _ => Cell::Text(field),
        }
    }
}

impl<R: Read> Iterator for RowReader<R> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_row().transpose()
    }
}

/// Row sink applying the output-null token and output dialect.
pub struct RowWriter<W: Write> {
    writer: csv::Writer<W>,
    null: String,
    rows_written: usize,
}

impl<W: Write> RowWriter<W> {
    pub fn new(sink: W, config: &OutputConfig) -> Self {
        let mut builder = csv::WriterBuilder::new();
        builder
            .delimiter(config.dialect.delimiter)
            .quote_style(config.dialect.quote_style)
            .terminator(config.dialect.terminator)
            .double_quote(true)
            .flexible(true);
        Self {
            writer: builder.from_writer(sink),
            null: config.null.clone(),
            rows_written: 0,
        }
    }

    pub fn write_header(&mut self, header: &[String]) -> Result<()> {
        self.writer
            .write_record(header.iter())
            .context("Writing output headers")
    }

    pub fn write_row(&mut self, row: &[Cell]) -> Result<()> {
        let null = self.null.as_str();
        self.writer
            .write_record(row.iter().map(|cell| cell.render(null).into_owned()))
            .with_context(|| format!("Writing output row {}", self.rows_written + 1))?;
        self.rows_written += 1;
        Ok(())
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().context("Flushing output")
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|err| anyhow::anyhow!("Flushing output: {}", err.error()))
    }
}

pub fn open_reader(path: Option<&Path>, config: &InputConfig) -> Result<RowReader<Box<dyn Read>>> {
    Ok(RowReader::new(io_utils::open_input(path)?, config))
}

pub fn open_writer(
    path: Option<&Path>,
    config: &OutputConfig,
) -> Result<RowWriter<Box<dyn Write>>> {
    Ok(RowWriter::new(
        io_utils::open_output(path, config.encoding)?,
        config,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(null: Option<&str>) -> InputConfig {
        InputConfig {
            null: null.map(str::to_string),
            ..InputConfig::default()
        }
    }

    fn output(null: &str) -> OutputConfig {
        OutputConfig {
            null: null.to_string(),
            ..OutputConfig::default()
        }
    }

    #[test]
    fn unset_null_token_keeps_empty_fields_as_text() {
        let mut reader = RowReader::new("a,b\n,x\n".as_bytes(), &input(None));
        assert_eq!(
            reader.read_header().unwrap(),
            Some(vec!["a".to_string(), "b".to_string()])
        );
        let row = reader.read_row().unwrap().unwrap();
        assert_eq!(row, vec![Cell::text(""), Cell::text("x")]);
        assert!(reader.read_row().unwrap().is_none());
    }

    #[test]
    fn matching_fields_become_null() {
        let mut reader = RowReader::new("a,b\nNULL,\n".as_bytes(), &input(Some("NULL")));
        reader.read_header().unwrap();
        let row = reader.read_row().unwrap().unwrap();
        assert_eq!(row, vec![Cell::Null, Cell::text("")]);
    }

    #[test]
    fn empty_token_reads_empty_fields_as_null() {
        let mut reader = RowReader::new("a,b\n,x\n".as_bytes(), &input(Some("")));
        reader.read_header().unwrap();
        let row = reader.read_row().unwrap().unwrap();
        assert_eq!(row, vec![Cell::Null, Cell::text("x")]);
    }

    #[test]
    fn ragged_rows_are_tolerated() {
        let reader = RowReader::new("a,b\n1\n1,2,3\n".as_bytes(), &input(None)).skip(1);
        let rows = reader.collect::<Result<Vec<_>>>().unwrap();
        assert_eq!(rows[0].len(), 1);
        assert_eq!(rows[1].len(), 3);
    }

    #[test]
    fn writer_substitutes_output_null() {
        let mut writer = RowWriter::new(Vec::new(), &output("\\N"));
        writer
            .write_header(&["a".to_string(), "b".to_string()])
            .unwrap();
        writer.write_row(&[Cell::Null, Cell::text("")]).unwrap();
        let bytes = writer.into_inner().unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "a,b\r\n\\N,\r\n");
    }

    #[test]
    fn round_trip_preserves_null_and_empty() {
        let rows = vec![
            vec![Cell::text("east"), Cell::Null, Cell::text("")],
            vec![Cell::text("a,b"), Cell::text("say \"hi\""), Cell::Null],
        ];
        let mut writer = RowWriter::new(Vec::new(), &output("<null>"));
        for row in &rows {
            writer.write_row(row).unwrap();
        }
        let bytes = writer.into_inner().unwrap();

        let mut reader = RowReader::new(bytes.as_slice(), &input(Some("<null>")));
        assert_eq!(reader.read_all().unwrap(), rows);
    }

    #[test]
    fn dialects_are_independent() {
        let input_config = InputConfig {
            dialect: Dialect::named(DialectName::ExcelTab),
            ..InputConfig::default()
        };
        let output_config = OutputConfig {
            dialect: Dialect::named(DialectName::Unix),
            ..OutputConfig::default()
        };
        let mut reader = RowReader::new("a\tb\n1\t2\n".as_bytes(), &input_config);
        let header = reader.read_header().unwrap().unwrap();
        let mut writer = RowWriter::new(Vec::new(), &output_config);
        writer.write_header(&header).unwrap();
        for row in reader.by_ref() {
            writer.write_row(&row.unwrap()).unwrap();
        }
        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(text, "\"a\",\"b\"\n\"1\",\"2\"\n");
    }

    #[test]
    fn delimiter_override_applies() {
        let dialect = Dialect::named(DialectName::Excel).with_delimiter(Some(b';'));
        assert_eq!(dialect.delimiter, b';');
        assert_eq!(Dialect::default().with_delimiter(None).delimiter, b',');
    }

    #[test]
    fn byte_order_mark_is_dropped_from_the_header_only() {
        let source = "\u{feff}id,name\n\u{feff}1,x\n";
        let mut reader = RowReader::new(source.as_bytes(), &input(None));
        assert_eq!(reader.read_header().unwrap().unwrap(), vec!["id", "name"]);
        let rows = reader.read_all().unwrap();
        assert_eq!(rows, vec![vec![Cell::from("\u{feff}1"), Cell::from("x")]]);
        assert_eq!(reader.records_read(), 2);
    }
}

//! PostgreSQL/SQLite `COPY FROM` text format.

use std::io::Write;

use anyhow::Result;
use itertools::Itertools;

use crate::{
    cli::GlobalArgs,
    codec::CodecConfig,
    data::{Cell, Row},
};

const COPY_NULL: &str = "\\N";

pub fn execute(global: &GlobalArgs, config: &CodecConfig) -> Result<()> {
    // The header is not part of COPY data.
    super::run("copy", global, config, |_header, rows, out| write_copy(rows, out))
}

pub fn write_copy(rows: impl Iterator<Item = Result<Row>>, out: &mut dyn Write) -> Result<usize> {
    let mut written = 0usize;
    for row in rows {
        let line = row?.iter().map(copy_field).join("\t");
        out.write_all(line.as_bytes())?;
        out.write_all(b"\n")?;
        written += 1;
    }
    Ok(written)
}

fn copy_field(cell: &Cell) -> String {
    match cell {
        Cell::Null => COPY_NULL.to_string(),
        other => escape(&other.render("")),
    }
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'\\' => escaped.push_str("\\\\"),
            0x08 => escaped.push_str("\\b"),
            0x0c => escaped.push_str("\\f"),
            b'\n' => escaped.push_str("\\n"),
            b'\r' => escaped.push_str("\\r"),
            b'\t' => escaped.push_str("\\t"),
            0x0b => escaped.push_str("\\v"),
            32..=126 => escaped.push(byte as char),
            other => escaped.push_str(&format!("\\{other:03o}")),
        }
    }
    escaped
}

//! LDIF (RFC 2849) records.
//!
//! The `dn` (or `DN`) column is written first. Null attributes are omitted.
//! Values containing bytes outside printable ASCII are base64-encoded and
//! introduced with `::`. Long lines are folded with a single leading space.

use std::io::Write;

use anyhow::Result;
use base64::Engine;

use crate::{
    cli::GlobalArgs,
    codec::CodecConfig,
    data::{Cell, Row, cell_at},
};

const FIRST_LINE_WIDTH: usize = 77;
const CONTINUATION_WIDTH: usize = 76;

pub fn execute(global: &GlobalArgs, config: &CodecConfig) -> Result<()> {
    super::run("ldif", global, config, |header, rows, out| {
        write_ldif(&header, rows, out)
    })
}

pub fn write_ldif(
    header: &[String],
    rows: impl Iterator<Item = Result<Row>>,
    out: &mut dyn Write,
) -> Result<usize> {
    let order = attribute_order(header);
    let mut written = 0usize;
    for row in rows {
        let row = row?;
        for &(name, idx) in &order {
            match cell_at(&row, idx)? {
                Cell::Null => {}
                cell => write_attribute(out, name, &cell.render(""))?,
            }
        }
        out.write_all(b"\n")?;
        written += 1;
    }
    Ok(written)
}

fn attribute_order(header: &[String]) -> Vec<(&str, usize)> {
    let mut order = header
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.as_str(), idx))
        .collect::<Vec<_>>();
    let dn = ["dn", "DN"]
        .iter()
        .find_map(|dn| order.iter().position(|(name, _)| name == dn));
    if let Some(pos) = dn {
        let entry = order.remove(pos);
        order.insert(0, entry);
    }
    order
}

fn write_attribute(out: &mut dyn Write, name: &str, value: &str) -> Result<()> {
    let printable = value.bytes().all(|b| (32..=126).contains(&b));
    let (prefix, encoded) = if printable {
        (format!("{name}: "), value.to_string())
    } else {
        (
            format!("{name}:: "),
            base64::engine::general_purpose::STANDARD.encode(value.as_bytes()),
        )
    };

    // Both branches are pure ASCII here, so byte offsets are char offsets.
    let first = FIRST_LINE_WIDTH.saturating_sub(prefix.len()).min(encoded.len());
    writeln!(out, "{prefix}{}", &encoded[..first])?;
    let mut rest = &encoded[first..];
    while !rest.is_empty() {
        let take = CONTINUATION_WIDTH.min(rest.len());
        writeln!(out, " {}", &rest[..take])?;
        rest = &rest[take..];
    }
    Ok(())
}

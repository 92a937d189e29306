use std::io::Write;

use anyhow::Result;

use crate::{
    cli::{GlobalArgs, VertArgs},
    codec::CodecConfig,
    data::Row,
    error::TableError,
};

pub fn execute(args: &VertArgs, global: &GlobalArgs, config: &CodecConfig) -> Result<()> {
    let null = config.output.null.as_str();
    super::run("vertical records", global, config, |header, rows, out| {
        write_vertical(&header, rows, args, null, out)
    })
}

/// Writes one `name<SEP>value` line per field, with a blank line between
/// records.
pub fn write_vertical(
    header: &[String],
    rows: impl Iterator<Item = Result<Row>>,
    args: &VertArgs,
    null: &str,
    out: &mut dyn Write,
) -> Result<usize> {
    let widest = header
        .iter()
        .map(|name| name.chars().count())
        .max()
        .unwrap_or(0);
    let width = args.max_width.map_or(widest, |max| widest.min(max));
    let labels = header
        .iter()
        .map(|name| {
            let truncated = name.chars().take(width).collect::<String>();
            if args.left_justify {
                format!("{truncated:<width$}")
            } else {
                format!("{truncated:>width$}")
            }
        })
        .collect::<Vec<_>>();

    let mut written = 0usize;
    for row in rows {
        let row = row?;
        if written > 0 {
            out.write_all(b"\n")?;
        }
        for (idx, cell) in row.iter().enumerate() {
            let label = labels.get(idx).ok_or(TableError::ColumnOutOfRange {
                index: idx as isize,
                len: header.len(),
            })?;
            writeln!(out, "{label}{}{}", args.separator, cell.render(null))?;
        }
        written += 1;
    }
    Ok(written)
}

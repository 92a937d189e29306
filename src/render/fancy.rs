use std::io::Write;

use anyhow::Result;

use super::{ColumnWidths, fit, text_row};
use crate::{
    cli::{GlobalArgs, WidthArgs},
    codec::CodecConfig,
    data::Row,
};

pub fn execute(args: &WidthArgs, global: &GlobalArgs, config: &CodecConfig) -> Result<()> {
    let null = config.output.null.as_str();
    super::run("fancy grid", global, config, |header, rows, out| {
        write_fancy(&header, rows, args, null, out)
    })
}

/// Renders a bordered grid:
///
/// ```text
/// +--+-----+
/// |id|name |
/// +==+=====+
/// |1 |Alice|
/// +--+-----+
/// ```
pub fn write_fancy(
    header: &[String],
    rows: impl Iterator<Item = Result<Row>>,
    args: &WidthArgs,
    null: &str,
    out: &mut dyn Write,
) -> Result<usize> {
    let mut widths = ColumnWidths::new(args.widths.as_ref(), args.max_width);
    widths.update(header);
    let mut table = Vec::new();
    for row in rows {
        let row = text_row(&row?, null);
        widths.update(&row);
        table.push(row);
    }
    let widths = widths.finalize();

    out.write_all(separator(&widths, '-').as_bytes())?;
    out.write_all(format_row(header, &widths).as_bytes())?;
    out.write_all(separator(&widths, '=').as_bytes())?;
    for row in &table {
        out.write_all(format_row(row, &widths).as_bytes())?;
        out.write_all(separator(&widths, '-').as_bytes())?;
    }
    Ok(table.len())
}

fn separator(widths: &[usize], fill: char) -> String {
    let segments = widths
        .iter()
        .map(|w| fill.to_string().repeat(*w))
        .collect::<Vec<_>>();
    format!("+{}+\n", segments.join("+"))
}

fn format_row(row: &[String], widths: &[usize]) -> String {
    let cells = widths
        .iter()
        .enumerate()
        .map(|(idx, w)| fit(row.get(idx).map(String::as_str).unwrap_or(""), *w))
        .collect::<Vec<_>>();
    format!("|{}|\n", cells.join("|"))
}

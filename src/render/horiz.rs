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
    super::run("horizontal table", global, config, |header, rows, out| {
        write_horizontal(&header, rows, args, null, out)
    })
}

pub fn write_horizontal(
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

    // Header
    writeln!(out, "{}", format_row(header, &widths))?;

    // Separator
    let rule = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    writeln!(out, "{}", format_row(&rule, &widths))?;

    // Rows
    for row in &table {
        writeln!(out, "{}", format_row(row, &widths))?;
    }
    Ok(table.len())
}

fn format_row(values: &[String], widths: &[usize]) -> String {
    widths
        .iter()
        .enumerate()
        .map(|(idx, width)| fit(values.get(idx).map(String::as_str).unwrap_or(""), *width))
        .collect::<Vec<_>>()
        .join(" ")
}

use std::io::Write;

use anyhow::{Context, Result};

use crate::{
    cli::{GlobalArgs, HtmlArgs},
    codec::CodecConfig,
    columns,
    data::Row,
};

pub fn execute(args: &HtmlArgs, global: &GlobalArgs, config: &CodecConfig) -> Result<()> {
    let null = config.output.null.as_str();
    super::run("html", global, config, |header, rows, out| {
        write_html(&header, rows, args, null, out)
    })
}

pub fn write_html(
    header: &[String],
    rows: impl Iterator<Item = Result<Row>>,
    args: &HtmlArgs,
    null: &str,
    out: &mut dyn Write,
) -> Result<usize> {
    let right_justified = columns::resolve_list(header, args.right_justify.as_deref())
        .context("Resolving right-justified columns")?;

    if args.full_page {
        writeln!(
            out,
            "<html><head><title>{}</title></head><body>",
            escape(&args.title)
        )?;
    }
    writeln!(out, "<table border=1>")?;
    if !args.title.is_empty() {
        writeln!(
            out,
            "<tr><th colspan={}>{}</th></tr>",
            header.len(),
            escape(&args.title)
        )?;
    }

    let cells = header.iter().map(String::as_str);
    writeln!(out, "{}", html_row(cells, "th", &right_justified))?;

    let mut written = 0usize;
    for row in rows {
        let row = row?;
        let cells = row.iter().map(|cell| cell.render(null));
        writeln!(out, "{}", html_row(cells, "td", &right_justified))?;
        written += 1;
    }

    writeln!(out, "</table>")?;
    if args.full_page {
        writeln!(out, "</body></html>")?;
    }
    Ok(written)
}

fn html_row<S: AsRef<str>>(cells: impl Iterator<Item = S>, tag: &str, right: &[usize]) -> String {
    let mut line = String::from("<tr>");
    for (idx, cell) in cells.enumerate() {
        let align = if right.contains(&idx) {
            " align=\"right\""
        } else {
            ""
        };
        line.push_str(&format!("<{tag}{align}>{}</{tag}>", escape(cell.as_ref())));
    }
    line.push_str("</tr>");
    line
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            other => escaped.push(other),
        }
    }
    escaped
}

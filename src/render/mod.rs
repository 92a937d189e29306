//! Report renderers.
//!
//! Each renderer consumes the null-aware row stream and writes a
//! non-delimited format (grids, HTML, SQL, LDIF, ...) to the output. Null
//! cells render as the output-null token unless the format has its own
//! notion of null.

pub mod copy;
pub mod fancy;
pub mod horiz;
pub mod html;
pub mod ldif;
pub mod sql;
pub mod vert;

use std::{
    borrow::Cow,
    io::{Read, Write},
};

use anyhow::{Context, Result};
use log::{debug, info};

use crate::{
    cli::{FixedWidths, GlobalArgs},
    codec::{self, CodecConfig, RowReader},
    data::{Cell, Header},
    io_utils,
};

/// Opens the input and output, hands the header and remaining rows to
/// `render`, and flushes. `render` returns the number of data rows written.
pub(crate) fn run<F>(
    format: &str,
    global: &GlobalArgs,
    config: &CodecConfig,
    render: F,
) -> Result<()>
where
    F: FnOnce(Header, RowReader<Box<dyn Read>>, &mut dyn Write) -> Result<usize>,
{
    let mut reader = codec::open_reader(global.input.as_deref(), &config.input)?;
    let Some(header) = reader.read_header()? else {
        debug!("Input is empty; nothing to render as {format}");
        return Ok(());
    };
    let mut out = io_utils::open_output(global.output.as_deref(), config.output.encoding)?;
    let rendered = render(header, reader, &mut out)?;
    out.flush().context("Flushing output")?;
    info!("Rendered {rendered} row(s) as {format}");
    Ok(())
}

pub(crate) fn text_row(row: &[Cell], null: &str) -> Vec<String> {
    row.iter().map(|cell| cell.render(null).into_owned()).collect()
}

/// Replaces control characters that would break a grid layout.
pub(crate) fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(
            value
                .chars()
                .map(|ch| match ch {
                    '\n' | '\r' | '\t' => ' ',
                    other => other,
                })
                .collect(),
        )
    } else {
        Cow::Borrowed(value)
    }
}

pub(crate) fn display_width(value: &str) -> usize {
    value.chars().count()
}

/// Pads `value` with spaces, or truncates it, to exactly `width` characters.
pub(crate) fn fit(value: &str, width: usize) -> String {
    let sanitized = sanitize_cell(value);
    let mut cell = sanitized.chars().take(width).collect::<String>();
    let padding = width.saturating_sub(display_width(&cell));
    cell.push_str(&" ".repeat(padding));
    cell
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Width {
    Fixed(usize),
    Auto(usize),
}

/// Column widths for the grid renderers. Fixed widths come from `-w`;
/// every other column grows to its widest cell, capped at `-m`.
#[derive(Debug, Clone)]
pub(crate) struct ColumnWidths {
    widths: Vec<Width>,
    max_width: usize,
}

impl ColumnWidths {
    pub(crate) fn new(fixed: Option<&FixedWidths>, max_width: Option<usize>) -> Self {
        let widths: Vec<Width> = fixed
            .map(|fixed| {
                fixed
                    .0
                    .iter()
                    .map(|width| match width {
                        Some(w) if *w > 0 => Width::Fixed(*w),
                        _ => Width::Auto(0),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self {
            widths,
            max_width: max_width.unwrap_or(usize::MAX),
        }
    }

    pub(crate) fn update(&mut self, row: &[String]) {
        if row.len() > self.widths.len() {
            self.widths.resize(row.len(), Width::Auto(0));
        }
        for (width, value) in self.widths.iter_mut().zip(row) {
            if let Width::Auto(current) = width {
                let len = display_width(&sanitize_cell(value));
                *current = (*current).max(len).min(self.max_width);
            }
        }
    }

    pub(crate) fn finalize(&self) -> Vec<usize> {
        self.widths
            .iter()
            .map(|width| match width {
                Width::Fixed(w) | Width::Auto(w) => *w,
            })
            .collect()
    }
}

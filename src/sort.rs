use std::cmp::Ordering;

use anyhow::{Context, Result};
use log::{debug, info};

use crate::{
    cli::{GlobalArgs, SortArgs},
    codec::{self, CodecConfig},
    columns,
    data::{Row, cell_at, cell_at_mut},
    error::TableError,
};

/// One term of a sort specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortTerm {
    pub index: usize,
    pub descending: bool,
    pub numeric: bool,
}

impl SortTerm {
    /// Parses a single term: leading `-` (descending), `+` (ascending) and
    /// `#` (numeric) modifiers, applied in order, followed by a column spec.
    pub fn parse(header: &[String], term: &str) -> Result<Self, TableError> {
        let mut descending = false;
        let mut numeric = false;
        let mut rest = term;
        while let Some(modifier) = rest.chars().next() {
            match modifier {
                '-' => descending = true,
                '+' => descending = false,
                '#' => numeric = true,
                _ => break,
            }
            rest = &rest[1..];
        }
        Ok(SortTerm {
            index: columns::resolve(header, rest)?,
            descending,
            numeric,
        })
    }

    fn compare(&self, a: &Row, b: &Row) -> Ordering {
        let ord = a.get(self.index).cmp(&b.get(self.index));
        if self.descending { ord.reverse() } else { ord }
    }
}

/// Parses a comma-separated sort specification. The first term is the
/// primary key.
pub fn parse_sort_spec(header: &[String], spec: &str) -> Result<Vec<SortTerm>, TableError> {
    spec.split(',')
        .map(|term| SortTerm::parse(header, term))
        .collect()
}

/// Stable multi-key sort.
///
/// Every row must reach every term's column. Numeric terms replace the
/// column's text with its numeric value in each row before any comparison.
/// Ties on all terms keep their input order.
pub fn sort_rows(mut rows: Vec<Row>, terms: &[SortTerm]) -> Result<Vec<Row>, TableError> {
    for row in rows.iter_mut() {
        for term in terms {
            if term.numeric {
                cell_at_mut(row, term.index)?.coerce_numeric()?;
            } else {
                cell_at(row, term.index)?;
            }
        }
    }

    rows.sort_by(|a, b| {
        terms
            .iter()
            .map(|term| term.compare(a, b))
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    });
    Ok(rows)
}

pub fn execute(args: &SortArgs, global: &GlobalArgs, config: &CodecConfig) -> Result<()> {
    let mut reader = codec::open_reader(global.input.as_deref(), &config.input)?;
    let Some(header) = reader.read_header()? else {
        debug!("Input is empty; nothing to sort");
        return Ok(());
    };

    let terms = parse_sort_spec(&header, &args.spec)
        .with_context(|| format!("Parsing sort specification '{}'", args.spec))?;
    debug!("Sort terms: {terms:?}");

    let rows = reader.read_all()?;
    debug!("Read {} record(s) including the header", reader.records_read());
    let sorted = sort_rows(rows, &terms).context("Sorting rows")?;

    let mut writer = codec::open_writer(global.output.as_deref(), &config.output)?;
    writer.write_header(&header)?;
    for row in &sorted {
        writer.write_row(row)?;
    }
    writer.flush()?;
    info!(
        "Sorted {} row(s) on {} term(s)",
        writer.rows_written(),
        terms.len()
    );
    Ok(())
}

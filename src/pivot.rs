//! Pivot tables.
//!
//! Rows are grouped by a row key (`-y`) and a column key (`-x`); the value
//! column (`-z`) is summed per combination. The distinct row keys and column
//! keys are each sorted independently, so output is deterministic regardless
//! of input order. Combinations never observed are emitted as null rather
//! than zero.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Context, Result};
use itertools::Itertools;
use log::{debug, info};

use crate::{
    cli::{GlobalArgs, PivotArgs},
    codec::{self, CodecConfig},
    columns,
    data::{Cell, Header, Number, Row, cell_at},
    error::TableError,
};

type PivotKey = Vec<Cell>;

/// Resolved column indices driving a pivot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PivotSpec {
    pub row_keys: Vec<usize>,
    pub column_keys: Vec<usize>,
    pub value: usize,
}

impl PivotSpec {
    pub fn resolve(
        header: &[String],
        rows: Option<&str>,
        columns: Option<&str>,
        value: &str,
    ) -> Result<Self, TableError> {
        Ok(Self {
            row_keys: columns::resolve_list(header, rows)?,
            column_keys: columns::resolve_list(header, columns)?,
            value: columns::resolve(header, value)?,
        })
    }
}

/// A materialised output table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub header: Header,
    pub rows: Vec<Row>,
}

pub fn pivot(header: &[String], rows: &[Row], spec: &PivotSpec) -> Result<Table, TableError> {
    let mut totals: BTreeMap<PivotKey, BTreeMap<PivotKey, Number>> = BTreeMap::new();
    let mut seen_columns: BTreeSet<PivotKey> = BTreeSet::new();

    for row in rows {
        let y = key_for(row, &spec.row_keys)?;
        let x = key_for(row, &spec.column_keys)?;
        let value = cell_at(row, spec.value)?.to_number()?;

        seen_columns.insert(x.clone());
        let total = totals
            .entry(y)
            .or_default()
            .entry(x)
            .or_insert(Number::Integer(0));
        *total = *total + value;
    }

    let mut output_header = spec
        .row_keys
        .iter()
        .map(|&idx| column_name(header, idx))
        .collect::<Result<Vec<_>, _>>()?;
    if spec.column_keys.is_empty() {
        output_header.push(column_name(header, spec.value)?);
    } else {
        output_header.extend(
            seen_columns
                .iter()
                .map(|key| key.iter().map(|cell| cell.render("")).join("-")),
        );
    }

    let output_rows = totals
        .into_iter()
        .map(|(y, mut by_column)| {
            let mut row = y;
            row.extend(
                seen_columns
                    .iter()
                    .map(|x| by_column.remove(x).map_or(Cell::Null, Cell::Number)),
            );
            row
        })
        .collect();

    Ok(Table {
        header: output_header,
        rows: output_rows,
    })
}

pub fn execute(args: &PivotArgs, global: &GlobalArgs, config: &CodecConfig) -> Result<()> {
    let mut reader = codec::open_reader(global.input.as_deref(), &config.input)?;
    let Some(header) = reader.read_header()? else {
        debug!("Input is empty; nothing to pivot");
        return Ok(());
    };

    let spec = PivotSpec::resolve(
        &header,
        args.rows.as_deref(),
        args.columns.as_deref(),
        &args.value,
    )
    .context("Resolving pivot columns")?;
    debug!("Pivot spec: {spec:?}");

    let rows = reader.read_all()?;
    debug!("Read {} record(s) including the header", reader.records_read());
    let table = pivot(&header, &rows, &spec)
        .with_context(|| format!("Pivoting {} row(s)", rows.len()))?;

    let mut writer = codec::open_writer(global.output.as_deref(), &config.output)?;
    writer.write_header(&table.header)?;
    for row in &table.rows {
        writer.write_row(row)?;
    }
    writer.flush()?;
    info!(
        "Pivoted {} row(s) into {} row(s) x {} column(s)",
        rows.len(),
        table.rows.len(),
        table.header.len()
    );
    Ok(())
}

fn key_for(row: &[Cell], indices: &[usize]) -> Result<PivotKey, TableError> {
    indices
        .iter()
        .map(|&idx| cell_at(row, idx).cloned())
        .collect()
}

fn column_name(header: &[String], idx: usize) -> Result<String, TableError> {
    header
        .get(idx)
        .cloned()
        .ok_or(TableError::ColumnOutOfRange {
            index: idx as isize,
            len: header.len(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> Vec<String> {
        vec!["region".into(), "month".into(), "amount".into()]
    }

    fn sales() -> Vec<Row> {
        vec![
            vec!["east".into(), "jan".into(), "10".into()],
            vec!["east".into(), "feb".into(), "5".into()],
            vec!["west".into(), "jan".into(), "7".into()],
        ]
    }

    fn int(i: i64) -> Cell {
        Cell::Number(Number::Integer(i))
    }

    #[test]
    fn sums_by_row_key_without_column_key() {
        let spec = PivotSpec::resolve(&header(), Some("region"), None, "amount").unwrap();
        let table = pivot(&header(), &sales(), &spec).unwrap();
        assert_eq!(table.header, vec!["region", "amount"]);
        assert_eq!(
            table.rows,
            vec![vec!["east".into(), int(15)], vec!["west".into(), int(7)]]
        );
    }

    #[test]
    fn cross_tabulates_with_gaps_as_null() {
        let spec = PivotSpec::resolve(&header(), Some("region"), Some("month"), "amount").unwrap();
        let table = pivot(&header(), &sales(), &spec).unwrap();
        assert_eq!(table.header, vec!["region", "feb", "jan"]);
        assert_eq!(
            table.rows,
            vec![
                vec!["east".into(), int(5), int(10)],
                vec!["west".into(), Cell::Null, int(7)],
            ]
        );
    }

    #[test]
    fn column_key_only_yields_single_row() {
        let spec = PivotSpec::resolve(&header(), None, Some("region,month"), "3").unwrap();
        let table = pivot(&header(), &sales(), &spec).unwrap();
        assert_eq!(table.header, vec!["east-feb", "east-jan", "west-jan"]);
        assert_eq!(table.rows, vec![vec![int(5), int(10), int(7)]]);
    }

    #[test]
    fn mixed_numbers_sum_to_float() {
        let rows: Vec<Row> = vec![
            vec!["a".into(), "x".into(), "1".into()],
            vec!["a".into(), "x".into(), "0.5".into()],
        ];
        let spec = PivotSpec::resolve(&header(), Some("1"), None, "-1").unwrap();
        let table = pivot(&header(), &rows, &spec).unwrap();
        assert_eq!(
            table.rows,
            vec![vec!["a".into(), Cell::Number(Number::Float(1.5))]]
        );
    }

    #[test]
    fn null_keys_sort_first() {
        let rows: Vec<Row> = vec![
            vec!["b".into(), "x".into(), "1".into()],
            vec![Cell::Null, "x".into(), "2".into()],
        ];
        let spec = PivotSpec::resolve(&header(), Some("region"), None, "amount").unwrap();
        let table = pivot(&header(), &rows, &spec).unwrap();
        assert_eq!(table.rows[0], vec![Cell::Null, int(2)]);
    }

    #[test]
    fn non_numeric_value_fails() {
        let rows: Vec<Row> = vec![vec!["a".into(), "x".into(), "lots".into()]];
        let spec = PivotSpec::resolve(&header(), Some("region"), None, "amount").unwrap();
        assert_eq!(
            pivot(&header(), &rows, &spec),
            Err(TableError::NotNumeric("lots".to_string()))
        );
    }

    #[test]
    fn short_rows_are_out_of_range() {
        let rows: Vec<Row> = vec![vec!["a".into()]];
        let spec = PivotSpec::resolve(&header(), Some("region"), None, "amount").unwrap();
        assert_eq!(
            pivot(&header(), &rows, &spec),
            Err(TableError::ColumnOutOfRange { index: 2, len: 1 })
        );
    }
}

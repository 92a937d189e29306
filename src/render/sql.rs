//! SQL statement generation (`INSERT` and `UPDATE`), one statement per row,
//! each terminated by a `go` batch separator.

use std::io::Write;

use anyhow::{Context, Result};
use itertools::Itertools;

use crate::{
    cli::{GlobalArgs, InsertArgs, UpdateArgs},
    codec::CodecConfig,
    columns,
    data::{Cell, Row},
    error::TableError,
};

pub fn execute_insert(args: &InsertArgs, global: &GlobalArgs, config: &CodecConfig) -> Result<()> {
    super::run("sql insert", global, config, |header, rows, out| {
        let noquote = columns::resolve_list(&header, args.noquote_columns.as_deref())
            .context("Resolving no-quote columns")?;
        write_inserts(&header, rows, &args.table, &noquote, out)
    })
}

pub fn execute_update(args: &UpdateArgs, global: &GlobalArgs, config: &CodecConfig) -> Result<()> {
    super::run("sql update", global, config, |header, rows, out| {
        let noquote = columns::resolve_list(&header, args.noquote_columns.as_deref())
            .context("Resolving no-quote columns")?;
        let keys = columns::resolve_list(&header, Some(&args.key_columns))
            .context("Resolving key columns")?;
        let plan = UpdatePlan {
            table: &args.table,
            keys: &keys,
            noquote: &noquote,
            insert_or_update: args.insert_or_update,
        };
        write_updates(&header, rows, &plan, out)
    })
}

pub fn write_inserts(
    header: &[String],
    rows: impl Iterator<Item = Result<Row>>,
    table: &str,
    noquote: &[usize],
    out: &mut dyn Write,
) -> Result<usize> {
    let columns = header.join(", ");
    let mut written = 0usize;
    for row in rows {
        let values = row?
            .iter()
            .enumerate()
            .map(|(idx, cell)| sql_literal(cell, noquote.contains(&idx)))
            .join(", ");
        write!(out, "INSERT INTO {table} ({columns}) VALUES ({values})\ngo\n")?;
        written += 1;
    }
    Ok(written)
}

#[derive(Debug, Clone, Copy)]
pub struct UpdatePlan<'a> {
    pub table: &'a str,
    pub keys: &'a [usize],
    pub noquote: &'a [usize],
    pub insert_or_update: bool,
}

pub fn write_updates(
    header: &[String],
    rows: impl Iterator<Item = Result<Row>>,
    plan: &UpdatePlan<'_>,
    out: &mut dyn Write,
) -> Result<usize> {
    let table = plan.table;
    let all_columns = header.join(", ");
    let mut written = 0usize;
    for row in rows {
        let row = row?;
        let mut keys = Vec::new();
        let mut assignments = Vec::new();
        let mut values = Vec::with_capacity(row.len());
        for (idx, cell) in row.iter().enumerate() {
            let literal = sql_literal(cell, plan.noquote.contains(&idx));
            let name = header.get(idx).ok_or(TableError::ColumnOutOfRange {
                index: idx as isize,
                len: header.len(),
            })?;
            let assignment = format!("{name}={literal}");
            if plan.keys.contains(&idx) {
                keys.push(assignment);
            } else {
                assignments.push(assignment);
            }
            values.push(literal);
        }
        let keys = keys.join(" AND ");
        let assignments = assignments.join(", ");
        let update = format!("UPDATE {table} SET {assignments}\n\tWHERE {keys}");

        if plan.insert_or_update {
            let values = values.join(", ");
            write!(
                out,
                "IF EXISTS (SELECT * FROM {table} WHERE {keys})\n\t{update}\n\
                 ELSE INSERT INTO {table} ({all_columns})\n\tVALUES ({values})"
            )?;
        } else {
            write!(out, "{update}")?;
        }
        write!(out, "\ngo\n")?;
        written += 1;
    }
    Ok(written)
}

fn sql_literal(cell: &Cell, unquoted: bool) -> String {
    match cell {
        Cell::Null => "NULL".to_string(),
        other => {
            let text = other.render("");
            if unquoted {
                text.into_owned()
            } else {
                format!("\"{}\"", text.replace('"', "\"\""))
            }
        }
    }
}

//! Column addressing.
//!
//! A column spec is either a 1-based position (negative positions count from
//! the right, so `-1` is the last column) or a column name. Names are matched
//! exactly first and case-insensitively second, so two columns differing only
//! by case never shadow an exact match. Specs are resolved once against the
//! header; the header is never modified.

use crate::error::TableError;

pub fn resolve(header: &[String], spec: &str) -> Result<usize, TableError> {
    if let Ok(position) = spec.trim().parse::<i64>() {
        return resolve_position(header.len(), position);
    }

    if let Some(idx) = header.iter().position(|name| name == spec) {
        return Ok(idx);
    }

    let lowered = spec.to_lowercase();
    header
        .iter()
        .position(|name| name.to_lowercase() == lowered)
        .ok_or_else(|| TableError::ColumnNotFound(spec.to_string()))
}

/// Resolves a comma-separated list of specs, preserving order and
/// duplicates. Empty or absent input yields an empty list.
pub fn resolve_list(header: &[String], spec: Option<&str>) -> Result<Vec<usize>, TableError> {
    match spec {
        None | Some("") => Ok(Vec::new()),
        Some(list) => list.split(',').map(|term| resolve(header, term)).collect(),
    }
}

fn resolve_position(len: usize, position: i64) -> Result<usize, TableError> {
    match position {
        0 => Err(TableError::InvalidColumnNumber),
        p if p > 0 => Ok((p - 1) as usize),
        p => {
            let index = len as i64 + p;
            if index < 0 {
                Err(TableError::ColumnOutOfRange {
                    index: index as isize,
                    len,
                })
            } else {
                Ok(index as usize)
            }
        }
    }
}

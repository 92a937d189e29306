use std::{borrow::Cow, cmp::Ordering, fmt, ops::Add};

use crate::error::TableError;

pub type Header = Vec<String>;
pub type Row = Vec<Cell>;

/// A numeric value produced by coercing a text cell.
#[derive(Debug, Clone, Copy)]
pub enum Number {
    Integer(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Integer(i) => i as f64,
            Number::Float(f) => f,
        }
    }
}

impl Add for Number {
    type Output = Number;

    fn add(self, other: Number) -> Number {
        match (self, other) {
            (Number::Integer(a), Number::Integer(b)) => match a.checked_add(b) {
                Some(sum) => Number::Integer(sum),
                None => Number::Float(a as f64 + b as f64),
            },
            (left, right) => Number::Float(left.as_f64() + right.as_f64()),
        }
    }
}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Number::Integer(a), Number::Integer(b)) => a.cmp(b),
            (Number::Integer(a), Number::Float(b)) => compare_int_float(*a, *b),
            (Number::Float(a), Number::Integer(b)) => compare_int_float(*b, *a).reverse(),
            (Number::Float(a), Number::Float(b)) => {
                // Treats 0.0 and -0.0 as equal. NaN falls back to total_cmp.
                a.partial_cmp(b).unwrap_or_else(|| a.total_cmp(b))
            }
        }
    }
}

// Exact comparison, with no rounding of `int` through f64. Positive NaN sorts
// above every integer and negative NaN below, matching `f64::total_cmp`.
fn compare_int_float(int: i64, float: f64) -> Ordering {
    const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;
    if float.is_nan() {
        return if float.is_sign_negative() {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }
    if float >= TWO_POW_63 {
        return Ordering::Less;
    }
    if float < -TWO_POW_63 {
        return Ordering::Greater;
    }
    let whole = float.trunc();
    // In range and integral, so the cast is exact.
    int.cmp(&(whole as i64)).then_with(|| {
        0.0f64
            .partial_cmp(&(float - whole))
            .unwrap_or(Ordering::Equal)
    })
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Number {}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(i) => write!(f, "{i}"),
            Number::Float(value) => f.write_str(&format_float(*value)),
        }
    }
}

/// One field of a row.
///
/// `Null` is a logical state distinct from `Text(String::new())`. `Number`
/// only appears after a command coerces a column; decoded input is always
/// `Text` or `Null`.
///
/// Cells are totally ordered: `Null` sorts before every number, and numbers
/// sort before every text value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Null,
    Number(Number),
    Text(String),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Renders the cell for output, substituting `null` for the null marker.
    pub fn render<'a>(&'a self, null: &'a str) -> Cow<'a, str> {
        match self {
            Cell::Null => Cow::Borrowed(null),
            Cell::Text(text) => Cow::Borrowed(text.as_str()),
            Cell::Number(number) => Cow::Owned(number.to_string()),
        }
    }

    pub fn to_number(&self) -> Result<Number, TableError> {
        match self {
            Cell::Number(number) => Ok(*number),
            Cell::Text(text) => to_numeric(text),
            Cell::Null => Err(TableError::NotNumeric("NULL".to_string())),
        }
    }

    /// Replaces a text cell with its numeric value. Null cells stay null.
    pub fn coerce_numeric(&mut self) -> Result<(), TableError> {
        if let Cell::Text(text) = self {
            *self = Cell::Number(to_numeric(text)?);
        }
        Ok(())
    }

    fn rank(&self) -> u8 {
        match self {
            Cell::Null => 0,
            Cell::Number(_) => 1,
            Cell::Text(_) => 2,
        }
    }
}

impl Ord for Cell {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Cell::Text(a), Cell::Text(b)) => a.cmp(b),
            (Cell::Number(a), Cell::Number(b)) => a.cmp(b),
            (left, right) => left.rank().cmp(&right.rank()),
        }
    }
}

impl PartialOrd for Cell {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<Number> for Cell {
    fn from(value: Number) -> Self {
        Cell::Number(value)
    }
}

/// Parses `raw` as an integer when it is lexically integral, otherwise as a
/// float. Surrounding whitespace is ignored.
pub fn to_numeric(raw: &str) -> Result<Number, TableError> {
    let trimmed = raw.trim();
    if let Ok(parsed) = trimmed.parse::<i64>() {
        return Ok(Number::Integer(parsed));
    }
    trimmed
        .parse::<f64>()
        .map(Number::Float)
        .map_err(|_| TableError::NotNumeric(raw.to_string()))
}

/// Returns the cell at `index`, failing when the row is too short.
pub fn cell_at(row: &[Cell], index: usize) -> Result<&Cell, TableError> {
    row.get(index).ok_or(TableError::ColumnOutOfRange {
        index: index as isize,
        len: row.len(),
    })
}

pub fn cell_at_mut(row: &mut [Cell], index: usize) -> Result<&mut Cell, TableError> {
    let len = row.len();
    row.get_mut(index).ok_or(TableError::ColumnOutOfRange {
        index: index as isize,
        len,
    })
}

// Integral floats keep a trailing ".0" so they stay distinguishable from
// integers in the output.
fn format_float(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else if value.is_infinite() {
        let sign = if value < 0.0 { "-" } else { "" };
        format!("{sign}inf")
    } else if value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

use thiserror::Error;

/// Failures raised while addressing columns or coercing cell values.
///
/// These surface mid-stream, after the header and possibly some rows have
/// been read, and are always fatal for the running command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("Column numbers start at 1")]
    InvalidColumnNumber,
    #[error("Cannot find column named '{0}'")]
    ColumnNotFound(String),
    #[error("Column index {index} is out of range for {len} field(s)")]
    ColumnOutOfRange { index: isize, len: usize },
    #[error("Value '{0}' is not numeric")]
    NotNumeric(String),
}

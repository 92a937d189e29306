use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum, builder::NonEmptyStringValueParser};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Pivot, sort, and reformat delimited tables",
    long_about = None
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// CSV input dialect
    #[arg(short = 'I', long = "input-dialect", value_enum, default_value = "excel")]
    pub input_dialect: DialectName,
    /// CSV output dialect
    #[arg(short = 'O', long = "output-dialect", value_enum, default_value = "excel")]
    pub output_dialect: DialectName,
    /// Override the input dialect's delimiter (supports ',', 'tab', ';', '|')
    #[arg(long = "input-delimiter", value_parser = parse_delimiter)]
    pub input_delimiter: Option<u8>,
    /// Override the output dialect's delimiter (supports ',', 'tab', ';', '|')
    #[arg(long = "output-delimiter", value_parser = parse_delimiter)]
    pub output_delimiter: Option<u8>,
    /// Input representation of NULL (no substitution when omitted)
    #[arg(short = 'X', long = "input-null", allow_hyphen_values = true)]
    pub input_null: Option<String>,
    /// Output representation of NULL (defaults to an empty string)
    #[arg(short = 'N', long = "output-null", allow_hyphen_values = true)]
    pub output_null: Option<String>,
    /// Character encoding of the input (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Character encoding for the output (defaults to utf-8)
    #[arg(long = "output-encoding")]
    pub output_encoding: Option<String>,
    /// Input file (stdin if omitted or '-'); `cat` takes its files as arguments
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,
    /// Output file (stdout if omitted or '-')
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum DialectName {
    /// Comma separated, minimal quoting, CRLF line endings
    Excel,
    /// Tab separated, minimal quoting, CRLF line endings
    ExcelTab,
    /// Comma separated, every field quoted, LF line endings
    Unix,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Catenate
    Cat(CatArgs),
    /// Pivot table
    Pivot(PivotArgs),
    /// Sort table
    Sort(SortArgs),
    /// Convert to PostgreSQL/SQLite "COPY FROM" compatible format
    Tocopy,
    /// Format in fancy fashion
    Tofancy(WidthArgs),
    /// Format in horizontal format
    Tohoriz(WidthArgs),
    /// Format in HTML
    Tohtml(HtmlArgs),
    /// Generate SQL INSERT statements
    Toinsert(InsertArgs),
    /// Convert to LDIF
    Toldif,
    /// Generate SQL UPDATE statements
    Toupdate(UpdateArgs),
    /// Format in vertical style
    Tovert(VertArgs),
}

#[derive(Debug, Args)]
pub struct CatArgs {
    /// Remove headers from second and later files
    #[arg(short = 'r', long = "remove-headers")]
    pub remove_headers: bool,
    /// Files to catenate (stdin if none or '-')
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Args)]
#[command(group(
    ArgGroup::new("axes")
        .args(["columns", "rows"])
        .required(true)
        .multiple(true)
))]
pub struct PivotArgs {
    /// Column list for output columns
    #[arg(short = 'x', long = "columns", value_name = "COLLIST", allow_hyphen_values = true)]
    pub columns: Option<String>,
    /// Column list for output rows
    #[arg(short = 'y', long = "rows", value_name = "COLLIST", allow_hyphen_values = true)]
    pub rows: Option<String>,
    /// Column whose values are summed
    #[arg(short = 'z', long = "value", value_name = "COLSPEC", allow_hyphen_values = true)]
    pub value: String,
}

#[derive(Debug, Args)]
pub struct SortArgs {
    /// Comma-separated columns, each optionally prefixed with '-' (descending),
    /// '+' (ascending) or '#' (numeric)
    #[arg(value_name = "SORTSPEC", allow_hyphen_values = true)]
    pub spec: String,
}

#[derive(Debug, Args)]
pub struct WidthArgs {
    /// Maximum column width
    #[arg(short = 'm', long = "max-width", value_name = "WIDTH")]
    pub max_width: Option<usize>,
    /// Fixed column widths separated by commas, leave a column blank to auto-size
    #[arg(short = 'w', long = "widths", value_name = "WIDTHS", value_parser = parse_widths)]
    pub widths: Option<FixedWidths>,
}

/// Per-column fixed widths; `None` entries are auto-sized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixedWidths(pub Vec<Option<usize>>);

#[derive(Debug, Args)]
pub struct HtmlArgs {
    /// Generate a complete html page instead of a fragment
    #[arg(short = 'p', long = "full-page")]
    pub full_page: bool,
    /// Column list to right-justify
    #[arg(short = 'r', long = "right-justify", value_name = "COLLIST", allow_hyphen_values = true)]
    pub right_justify: Option<String>,
    /// Add a title to the table
    #[arg(short = 't', long = "title", default_value = "")]
    pub title: String,
}

#[derive(Debug, Args)]
pub struct InsertArgs {
    /// Column list for numeric or other no-quotes columns
    #[arg(short = 'n', long = "noquote-columns", value_name = "COLLIST", allow_hyphen_values = true)]
    pub noquote_columns: Option<String>,
    /// Target table name
    #[arg(value_name = "TABLENAME")]
    pub table: String,
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Update if present else insert
    #[arg(short = 'i', long = "insert-or-update")]
    pub insert_or_update: bool,
    /// Column list for numeric or other no-quotes columns
    #[arg(short = 'n', long = "noquote-columns", value_name = "COLLIST", allow_hyphen_values = true)]
    pub noquote_columns: Option<String>,
    /// Target table name
    #[arg(value_name = "TABLENAME")]
    pub table: String,
    /// Key columns used in the WHERE clause
    #[arg(
        value_name = "KEYCOLLIST",
        allow_hyphen_values = true,
        value_parser = NonEmptyStringValueParser::new()
    )]
    pub key_columns: String,
}

#[derive(Debug, Args)]
pub struct VertArgs {
    /// Left justify column names
    #[arg(short = 'l', long = "left-justify")]
    pub left_justify: bool,
    /// Maximum column name width
    #[arg(short = 'm', long = "max-width", value_name = "WIDTH")]
    pub max_width: Option<usize>,
    /// Separator between name and value
    #[arg(short = 's', long = "separator", default_value = " ", allow_hyphen_values = true)]
    pub separator: String,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}

pub fn parse_widths(value: &str) -> Result<FixedWidths, String> {
    value
        .split(',')
        .map(|part| {
            let part = part.trim();
            if part.is_empty() {
                Ok(None)
            } else {
                part.parse::<usize>()
                    .map(Some)
                    .map_err(|_| format!("Invalid column width '{part}'"))
            }
        })
        .collect::<Result<Vec<_>, _>>()
        .map(FixedWidths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_widths_allows_blank_entries() {
        assert_eq!(
            parse_widths("10,,5").unwrap(),
            FixedWidths(vec![Some(10), None, Some(5)])
        );
        assert!(parse_widths("ten").is_err());
    }

    #[test]
    fn parse_delimiter_accepts_names() {
        assert_eq!(parse_delimiter("tab"), Ok(b'\t'));
        assert_eq!(parse_delimiter(";"), Ok(b';'));
        assert!(parse_delimiter("ab").is_err());
    }

    #[test]
    fn pivot_requires_an_axis() {
        let parsed = Cli::try_parse_from(["csvtool", "pivot", "-z", "amount"]);
        assert!(parsed.is_err());
        let parsed = Cli::try_parse_from(["csvtool", "pivot", "-y", "region", "-z", "-1"]);
        assert!(parsed.is_ok());
    }

    #[test]
    fn sort_spec_may_start_with_a_dash() {
        let cli = Cli::try_parse_from(["csvtool", "sort", "-2,#1"]).expect("parse");
        match cli.command {
            Commands::Sort(args) => assert_eq!(args.spec, "-2,#1"),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn clap_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}

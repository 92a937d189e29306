pub mod cat;
pub mod cli;
pub mod codec;
pub mod columns;
pub mod data;
pub mod error;
pub mod io_utils;
pub mod pivot;
pub mod render;
pub mod sort;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::{LevelFilter, debug};

use crate::{
    cli::{Cli, Commands},
    codec::CodecConfig,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csvtool", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config = CodecConfig::from_args(&cli.global)?;
    debug!(
        "Input dialect delimiter '{}', output dialect delimiter '{}'",
        printable_delimiter(config.input.dialect.delimiter),
        printable_delimiter(config.output.dialect.delimiter)
    );

    let global = &cli.global;
    match &cli.command {
        Commands::Cat(args) => cat::execute(args, global, &config),
        Commands::Pivot(args) => pivot::execute(args, global, &config),
        Commands::Sort(args) => sort::execute(args, global, &config),
        Commands::Tocopy => render::copy::execute(global, &config),
        Commands::Tofancy(args) => render::fancy::execute(args, global, &config),
        Commands::Tohoriz(args) => render::horiz::execute(args, global, &config),
        Commands::Tohtml(args) => render::html::execute(args, global, &config),
        Commands::Toinsert(args) => render::sql::execute_insert(args, global, &config),
        Commands::Toldif => render::ldif::execute(global, &config),
        Commands::Toupdate(args) => render::sql::execute_update(args, global, &config),
        Commands::Tovert(args) => render::vert::execute(args, global, &config),
    }
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        other => (other as char).to_string(),
    }
}

use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use crate::{
    cli::{CatArgs, GlobalArgs},
    codec::{self, CodecConfig},
    io_utils,
};

/// Streams every input to the output one row at a time, re-encoding through
/// the output dialect and null token.
pub fn execute(args: &CatArgs, global: &GlobalArgs, config: &CodecConfig) -> Result<()> {
    let inputs: Vec<Option<&Path>> = if args.files.is_empty() {
        vec![global.input.as_deref()]
    } else {
        args.files.iter().map(|path| Some(path.as_path())).collect()
    };

    let mut writer = codec::open_writer(global.output.as_deref(), &config.output)?;
    for (idx, input) in inputs.into_iter().enumerate() {
        let name = io_utils::describe_path(input);
        let mut reader = codec::open_reader(input, &config.input)?;
        if idx > 0 && args.remove_headers {
            reader
                .read_row()
                .with_context(|| format!("Skipping header of {name}"))?;
        }
        for row in reader {
            let row = row.with_context(|| format!("Reading {name}"))?;
            writer.write_row(&row)?;
        }
        info!("✓ Catenated {name}");
    }
    writer.flush()?;
    info!("Wrote {} row(s) to output", writer.rows_written());
    Ok(())
}

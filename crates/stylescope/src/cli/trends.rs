//! The `stylescope trends` command.

use std::path::PathBuf;

use clap::Args;
use stylescope_core::trends::{load_records, summarize};
use stylescope_core::{Config, OutputWriter};

/// Arguments for the `trends` command.
#[derive(Args, Debug)]
pub struct TrendsArgs {
    /// JSON array of `{"createdAt": ..., "style": ...}` records
    pub records: PathBuf,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Execute the trends command.
pub fn execute(args: TrendsArgs, config: &Config) -> anyhow::Result<()> {
    let records = load_records(&args.records)?;
    let vocabulary = config.label_vocabulary()?;
    tracing::debug!(
        "Summarizing {} records against {} styles",
        records.len(),
        vocabulary.len()
    );

    let report = summarize(&records, &vocabulary);

    let stdout = std::io::stdout();
    let mut writer = OutputWriter::new(stdout.lock(), args.pretty || config.output.pretty);
    writer.write_json(&report)?;
    writer.flush()?;
    Ok(())
}

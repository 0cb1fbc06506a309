//! The `imident parse` command: captured `identify -verbose` text to JSON.

use clap::Args;
use imident_core::{parse_metadata, Config};
use std::path::PathBuf;

use super::types::OutputFormat;

/// Arguments for the `parse` command.
#[derive(Args, Debug)]
pub struct ParseArgs {
    /// File with `identify -verbose` output (defaults to stdin)
    pub input: Option<PathBuf>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (defaults to the config file setting)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Pretty-print JSON
    #[arg(long)]
    pub pretty: bool,
}

/// Execute the parse command.
pub async fn execute(args: ParseArgs, config: &Config) -> anyhow::Result<()> {
    let text = super::read_text(args.input.as_deref())?;
    let report = parse_metadata(&text);
    tracing::info!("Parsed {} frame(s)", report.frame_count());

    let mut writer = super::json_writer(config, args.output.as_ref(), args.format, args.pretty)?;
    writer.write_report(&report)?;
    writer.flush()?;
    Ok(())
}

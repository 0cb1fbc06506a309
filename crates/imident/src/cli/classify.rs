//! The `imident classify` command: captured ImageMagick stderr to a typed error.

use clap::Args;
use imident_core::{classify_error, Config};
use std::path::PathBuf;

/// Arguments for the `classify` command.
#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// File with ImageMagick stderr output (defaults to stdin)
    pub input: Option<PathBuf>,

    /// Pretty-print JSON
    #[arg(long)]
    pub pretty: bool,
}

/// Execute the classify command.
pub async fn execute(args: ClassifyArgs, config: &Config) -> anyhow::Result<()> {
    let text = super::read_text(args.input.as_deref())?;
    let classified = classify_error(&text);
    tracing::info!(
        kind = %classified.kind,
        status = classified.status,
        "Classified diagnostic"
    );

    let mut writer = super::json_writer(config, None, None, args.pretty)?;
    writer.write(&classified)?;
    writer.flush()?;
    Ok(())
}

//! The `imident identify` command: run `identify -verbose` and print the report.

use clap::Args;
use imident_core::{Config, MagickRunner};
use std::path::PathBuf;

use super::types::OutputFormat;

/// Arguments for the `identify` command.
#[derive(Args, Debug)]
pub struct IdentifyArgs {
    /// Image file, or `-` for stdin
    #[arg(required = true)]
    pub input: PathBuf,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (defaults to the config file setting)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Pretty-print JSON
    #[arg(long)]
    pub pretty: bool,

    /// Kill ImageMagick after this many milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

/// Execute the identify command.
pub async fn execute(args: IdentifyArgs, config: &Config) -> anyhow::Result<()> {
    let mut magick = config.magick.clone();
    if let Some(timeout_ms) = args.timeout_ms {
        magick.timeout_ms = timeout_ms;
    }
    let runner = MagickRunner::new(magick);

    let result = if super::is_stdio(Some(&args.input)) {
        runner.identify(tokio::io::stdin()).await
    } else {
        runner.identify_file(&args.input).await
    };

    let report = match result {
        Ok(report) => report,
        Err(e) => return Err(super::convert::report_driver_error(e)),
    };
    tracing::info!(
        "Identified {} ({} frame(s))",
        args.input.display(),
        report.frame_count()
    );

    let mut writer = super::json_writer(config, args.output.as_ref(), args.format, args.pretty)?;
    writer.write_report(&report)?;
    writer.flush()?;
    Ok(())
}

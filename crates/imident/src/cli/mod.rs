//! Subcommand implementations.

pub mod classify;
pub mod config;
pub mod convert;
pub mod identify;
pub mod parse;
pub mod types;

use imident_core::{Config, OutputFormat as CoreOutputFormat, OutputWriter};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use types::OutputFormat;

/// `-` or no path means stdin/stdout.
pub(crate) fn is_stdio(path: Option<&Path>) -> bool {
    path.map_or(true, |p| p.as_os_str() == "-")
}

/// Read a whole text input from a file or stdin.
pub(crate) fn read_text(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(p) if !is_stdio(Some(p)) => std::fs::read_to_string(p)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", p.display(), e)),
        _ => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

/// Build a JSON writer, preferring CLI flags over the config file.
pub(crate) fn json_writer(
    config: &Config,
    output: Option<&PathBuf>,
    format: Option<OutputFormat>,
    pretty: bool,
) -> anyhow::Result<OutputWriter<Box<dyn Write>>> {
    let format = match format {
        Some(f) => f.into(),
        None => CoreOutputFormat::parse(&config.output.format).unwrap_or_default(),
    };
    let pretty = pretty || config.output.pretty;

    let sink: Box<dyn Write> = match output {
        Some(path) if !is_stdio(Some(path)) => Box::new(BufWriter::new(File::create(path)?)),
        _ => Box::new(std::io::stdout().lock()),
    };

    Ok(OutputWriter::new(sink, format, pretty))
}

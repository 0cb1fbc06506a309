//! The `imident convert` command: run `convert` over one image.

use clap::Args;
use imident_core::{Config, ConvertCommand, DriverError, MagickRunner};
use std::io::Write;
use std::path::PathBuf;

/// Arguments for the `convert` command.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Source image, or `-` for stdin
    pub input: PathBuf,

    /// Destination file, or `-` for stdout
    pub output: PathBuf,

    /// Resize geometry (e.g. 800x600, 50%)
    #[arg(long)]
    pub resize: Option<String>,

    /// Crop geometry (e.g. 100x100+10+10)
    #[arg(long)]
    pub crop: Option<String>,

    /// Extent geometry, padding or cropping to an exact size
    #[arg(long)]
    pub extent: Option<String>,

    /// Gravity for crop and extent (e.g. center, north)
    #[arg(long)]
    pub gravity: Option<String>,

    /// Encoder quality (1-100)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=100))]
    pub quality: Option<u32>,

    /// Rotation in degrees
    #[arg(long)]
    pub rotate: Option<String>,

    /// Thumbnail geometry (resize and strip profiles)
    #[arg(long)]
    pub thumbnail: Option<String>,

    /// Remove profiles and comments
    #[arg(long)]
    pub strip: bool,

    /// Rotate according to the EXIF orientation
    #[arg(long)]
    pub auto_orient: bool,

    /// Output image format (e.g. png, webp)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Kill ImageMagick after this many milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

impl ConvertArgs {
    /// Translate flags into a convert invocation. Operations run in a fixed
    /// order: orientation first, geometry next, encoding options last.
    fn command(&self) -> ConvertCommand {
        let mut command = ConvertCommand::new().auto_orient(self.auto_orient);
        if let Some(gravity) = &self.gravity {
            command = command.gravity(gravity);
        }
        if let Some(degrees) = &self.rotate {
            command = command.rotate(degrees);
        }
        if let Some(geometry) = &self.crop {
            command = command.crop(geometry);
        }
        if let Some(geometry) = &self.resize {
            command = command.resize(geometry);
        }
        if let Some(geometry) = &self.thumbnail {
            command = command.thumbnail(geometry);
        }
        if let Some(geometry) = &self.extent {
            command = command.extent(geometry);
        }
        if let Some(quality) = self.quality {
            command = command.quality(quality);
        }
        command = command.strip(self.strip);
        if let Some(format) = &self.format {
            command = command.format(format);
        }
        command
    }
}

/// Execute the convert command.
pub async fn execute(args: ConvertArgs, config: &Config) -> anyhow::Result<()> {
    let mut magick = config.magick.clone();
    if let Some(timeout_ms) = args.timeout_ms {
        magick.timeout_ms = timeout_ms;
    }
    let runner = MagickRunner::new(magick);
    let command = args.command();

    let result = if super::is_stdio(Some(&args.input)) {
        runner.convert(tokio::io::stdin(), &command).await
    } else {
        let file = tokio::fs::File::open(&args.input)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to open {}: {}", args.input.display(), e))?;
        runner.convert(file, &command).await
    };

    let bytes = result.map_err(report_driver_error)?;
    tracing::info!(
        "Converted {} -> {} ({} bytes)",
        args.input.display(),
        args.output.display(),
        bytes.len()
    );

    if super::is_stdio(Some(&args.output)) {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&bytes)?;
        stdout.flush()?;
    } else {
        tokio::fs::write(&args.output, &bytes)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", args.output.display(), e))?;
    }
    Ok(())
}

/// Print a classified ImageMagick failure as JSON on stderr and turn any
/// driver error into the command's failure.
pub(crate) fn report_driver_error(err: DriverError) -> anyhow::Error {
    if let Some(classified) = err.classified() {
        if classified.kind.is_client_error() {
            tracing::debug!(raw = %classified.raw, "ImageMagick rejected the input");
        } else {
            tracing::error!(raw = %classified.raw, "ImageMagick failed");
        }
        match serde_json::to_string(classified) {
            Ok(json) => eprintln!("{json}"),
            Err(e) => tracing::warn!("Failed to serialize diagnostic: {e}"),
        }
    }
    anyhow::Error::new(err)
}

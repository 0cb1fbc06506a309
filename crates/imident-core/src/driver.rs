//! Runs the ImageMagick binaries over a byte stream.
//!
//! The input is copied into the child's stdin from a separate task while
//! stdout and stderr are drained to completion, so a child that writes a lot
//! before it finishes reading cannot deadlock the pipeline. Only complete
//! output is handed to the report parser or the diagnostic classifier.

use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::AsyncRead;
use tokio::process::Command;
use tokio::time::timeout;

use crate::command::{ConvertCommand, IdentifyCommand};
use crate::config::MagickConfig;
use crate::diagnostic::classify_error;
use crate::error::{DriverError, DriverResult};
use crate::report::{parse_metadata, Report};

/// Spawns `identify` and `convert` according to [`MagickConfig`].
#[derive(Debug, Clone)]
pub struct MagickRunner {
    config: MagickConfig,
}

impl MagickRunner {
    pub fn new(config: MagickConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MagickConfig {
        &self.config
    }

    /// Describe an image with `identify -verbose`.
    pub async fn identify<R>(&self, input: R) -> DriverResult<Report>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let program = self.config.identify_path();
        let stdout = self.run(&program, &IdentifyCommand.args(), input).await?;
        let text = String::from_utf8_lossy(&stdout);
        Ok(parse_metadata(&text))
    }

    /// Describe an image file with `identify -verbose`.
    pub async fn identify_file(&self, path: &Path) -> DriverResult<Report> {
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|source| DriverError::Io {
                program: self.config.identify_bin.clone(),
                source,
            })?;
        self.identify(file).await
    }

    /// Transform an image with `convert`, returning the encoded result.
    pub async fn convert<R>(&self, input: R, command: &ConvertCommand) -> DriverResult<Vec<u8>>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let program = self.config.convert_path();
        self.run(&program, &command.args(), input).await
    }

    /// Run one process to completion and return its stdout.
    async fn run<R>(&self, program: &Path, args: &[String], mut input: R) -> DriverResult<Vec<u8>>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let name = program.display().to_string();
        tracing::debug!(program = %name, ?args, "Spawning ImageMagick");

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| DriverError::Spawn {
                program: name.clone(),
                source,
            })?;

        let stdin = child.stdin.take();
        let writer = tokio::spawn(async move {
            match stdin {
                Some(mut stdin) => tokio::io::copy(&mut input, &mut stdin).await,
                None => Ok(0),
            }
        });

        let timeout_duration = Duration::from_millis(self.config.timeout_ms);
        let output = match timeout(timeout_duration, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(source)) => {
                writer.abort();
                return Err(DriverError::Io {
                    program: name,
                    source,
                });
            }
            Err(_) => {
                writer.abort();
                return Err(DriverError::Timeout {
                    program: name,
                    timeout_ms: self.config.timeout_ms,
                });
            }
        };

        // The tool may stop reading early (e.g. on a bad header); a broken pipe is not the failure.
        match writer.await {
            Ok(Ok(bytes)) => tracing::debug!(program = %name, bytes, "Input written"),
            Ok(Err(e)) => tracing::debug!(program = %name, "Input stream closed early: {}", e),
            Err(e) => tracing::debug!(program = %name, "Input task failed: {}", e),
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let has_stderr = !stderr.trim().is_empty();

        if !output.status.success() || (output.stdout.is_empty() && has_stderr) {
            let text = if has_stderr {
                stderr.into_owned()
            } else {
                exit_message(&name, output.status)
            };
            return Err(DriverError::Magick(classify_error(&text)));
        }

        if has_stderr {
            let warning = classify_error(&stderr);
            tracing::warn!(
                program = %name,
                kind = %warning.kind,
                "ImageMagick warning: {}",
                warning.message
            );
        }

        Ok(output.stdout)
    }
}

fn exit_message(program: &str, status: ExitStatus) -> String {
    format!("{program} exited with {status} and no diagnostic output")
}

//! Classification of ImageMagick failure output.
//!
//! `identify` and `convert` report problems as prose on stderr:
//!
//! ```text
//! identify: Premature end of JPEG file `/tmp/x' @ warning/jpeg.c/JPEGWarningHandler/325.
//! identify: Corrupt JPEG data: premature end of data segment `/tmp/x' @ warning/jpeg.c/JPEGWarningHandler/325.
//! ```
//!
//! [`classify_error`] pulls the command, messages, quoted path and source
//! location out of every such line, then picks an [`ErrorKind`] by keyword.
//! Callers should branch on [`ClassifiedError::kind`] or `status`; message
//! text is for humans.

mod kind;

pub use kind::ErrorKind;

use regex::Regex;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::LazyLock;
use thiserror::Error;

/// `<command>: <message> [`<path>'] @ <location>` on a single line.
static DIAGNOSTIC_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)(identify|convert|mogrify|composite|montage|magick): *([^@]+?)(?:`([^']+)')? @ (.+?)$",
    )
    .expect("valid diagnostic pattern")
});

/// Which end of the message list supplies the primary message.
#[derive(Debug, Clone, Copy)]
enum MessageSource {
    First,
    Last,
}

/// Keyword table, checked in order against the raw text. First match wins.
const CLASSES: &[(&[&str], ErrorKind, MessageSource)] = &[
    (&["Corrupt"], ErrorKind::Corrupt, MessageSource::First),
    (
        &["must specify image size"],
        ErrorKind::UnsupportedType,
        MessageSource::First,
    ),
    (
        &[
            "no decode delegate for this image format",
            "missing an image filename",
            "invalid argument",
        ],
        ErrorKind::InvalidArgument,
        MessageSource::Last,
    ),
];

/// A tool failure reduced to a stable kind plus human-readable context.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct ClassifiedError {
    /// Primary human-readable description; never empty.
    pub message: String,
    /// Secondary detail, empty when there is none.
    pub description: String,
    /// 422 for input problems, 500 when unclassified.
    pub status: u16,
    #[serde(rename = "errorKind")]
    pub kind: ErrorKind,
    /// Path quoted in the diagnostic, backslashes removed.
    pub filename: String,
    /// Tool sub-command that emitted the last diagnostic line.
    pub command: String,
    /// Source location token of the last diagnostic line.
    pub location: String,
    /// The text exactly as received.
    pub raw: String,
}

/// Fields collected from every diagnostic line, in order.
#[derive(Debug, Default)]
struct Extracted {
    command: Option<String>,
    filename: Option<String>,
    location: Option<String>,
    messages: VecDeque<String>,
}

fn extract(raw: &str) -> Extracted {
    let mut out = Extracted::default();

    for caps in DIAGNOSTIC_LINE.captures_iter(raw) {
        if let Some(command) = caps.get(1) {
            out.command = Some(command.as_str().to_string());
        }
        if let Some(path) = caps.get(3) {
            out.filename = Some(path.as_str().to_string());
        }
        if let Some(location) = caps.get(4) {
            out.location = Some(location.as_str().trim_end_matches('\r').to_string());
        }
        let message = caps
            .get(2)
            .map(|m| m.as_str().trim().replace("\\'", "'"))
            .unwrap_or_default();
        out.messages.push_back(message);
    }

    out
}

/// Classify the complete stderr text of a failed (or warning) run.
///
/// Never fails: text without any recognizable diagnostic becomes an
/// [`ErrorKind::Unclassified`] error whose message is the whole input.
pub fn classify_error(raw: &str) -> ClassifiedError {
    let Extracted {
        command,
        filename,
        location,
        mut messages,
    } = extract(raw);

    let class = CLASSES
        .iter()
        .find(|(keywords, _, _)| keywords.iter().any(|k| raw.contains(k)));

    let (kind, message, description) = match class {
        Some((_, kind, source)) => {
            let message = match source {
                MessageSource::First => messages.pop_front(),
                MessageSource::Last => messages.pop_back(),
            };
            let description = messages.pop_front();
            (*kind, message, description)
        }
        None => {
            tracing::warn!(raw, "could not classify ImageMagick diagnostic");
            if messages.is_empty() {
                tracing::warn!("no diagnostic line found in ImageMagick output");
            }
            (ErrorKind::Unclassified, messages.pop_front(), None)
        }
    };

    let message = message
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| raw.to_string());

    ClassifiedError {
        message,
        description: description.unwrap_or_default(),
        status: kind.status(),
        kind,
        filename: filename
            .map(|f| f.trim().replace('\\', ""))
            .unwrap_or_default(),
        command: command.unwrap_or_default(),
        location: location.unwrap_or_default(),
        raw: raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    /// Collects formatted log output for assertions.
    #[derive(Clone, Default)]
    struct LogCapture(Arc<Mutex<Vec<u8>>>);

    impl LogCapture {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for LogCapture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for LogCapture {
        type Writer = LogCapture;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn classify_with_logs(text: &str) -> (ClassifiedError, String) {
        let capture = LogCapture::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(capture.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();
        let err = tracing::subscriber::with_default(subscriber, || classify_error(text));
        (err, capture.contents())
    }

    fn fixture(name: &str) -> String {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../../tests/fixtures")
            .join(name);
        std::fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {}", path.display(), e))
    }

    #[test]
    fn test_corrupt_jpeg() {
        let text = "identify: Premature end of JPEG file `/tmp/x' @ warning/jpeg.c/JPEGWarningHandler/325.\nidentify: Corrupt JPEG data: premature end of data segment `/tmp/x' @ warning/jpeg.c/JPEGWarningHandler/325.";
        let err = classify_error(text);
        assert_eq!(err.kind, ErrorKind::Corrupt);
        assert_eq!(err.status, 422);
        assert_eq!(err.message, "Premature end of JPEG file");
        assert_eq!(
            err.description,
            "Corrupt JPEG data: premature end of data segment"
        );
        assert_eq!(err.filename, "/tmp/x");
        assert_eq!(err.command, "identify");
        assert_eq!(err.location, "warning/jpeg.c/JPEGWarningHandler/325.");
        assert_eq!(err.raw, text);
    }

    #[test]
    fn test_corrupt_fixture() {
        let err = classify_error(&fixture("identify-err.txt"));
        assert_eq!(err.status, 422);
        assert_eq!(err.kind, ErrorKind::Corrupt);
        assert_eq!(err.message, "Premature end of JPEG file");
        assert_eq!(
            err.description,
            "Corrupt JPEG data: premature end of data segment"
        );
        assert_eq!(
            err.filename,
            "/var/folders/_n/pchsjj1d6jqdkd05yjx2tz0c0000gn/T/magick-fECuVcfB"
        );
    }

    #[test]
    fn test_invalid_argument_fixture_uses_last_message() {
        let err = classify_error(&fixture("convert-err.txt"));
        assert_eq!(err.status, 422);
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
        assert_eq!(err.message, "invalid argument for option `-resize': 800+0+0");
        assert_eq!(err.description, "no decode delegate for this image format");
        assert_eq!(
            err.filename,
            "/var/folders/_n/pchsjj1d6jqdkd05yjx2tz0c0000gn/T/magick-mI6bV7wa"
        );
        assert_eq!(err.command, "convert");
        assert_eq!(err.location, "error/convert.c/ConvertImageCommand/2355.");
    }

    #[test]
    fn test_unsupported_type() {
        let text = "identify: must specify image size `/tmp/in.raw' @ error/raw.c/ReadRAWImage/139.";
        let err = classify_error(text);
        assert_eq!(err.kind, ErrorKind::UnsupportedType);
        assert_eq!(err.status, 422);
        assert_eq!(err.message, "must specify image size");
        assert_eq!(err.description, "");
        assert_eq!(err.filename, "/tmp/in.raw");
    }

    #[test]
    fn test_missing_filename_is_invalid_argument() {
        let text = "convert: missing an image filename `-' @ error/convert.c/ConvertImageCommand/3011.";
        let err = classify_error(text);
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
        assert_eq!(err.message, "missing an image filename");
        assert_eq!(err.filename, "-");
    }

    #[test]
    fn test_corrupt_outranks_invalid_argument() {
        let text = "convert: invalid argument for option `-crop': x @ error/convert.c/ConvertImageCommand/1.\nconvert: Corrupt image `/tmp/a.png' @ error/png.c/ReadPNGImage/3.";
        let err = classify_error(text);
        assert_eq!(err.kind, ErrorKind::Corrupt);
        assert_eq!(err.message, "invalid argument for option `-crop': x");
        assert_eq!(err.description, "Corrupt image");
    }

    #[test]
    fn test_unclassified_plain_text_keeps_raw_message() {
        let text = "something went terribly wrong";
        let err = classify_error(text);
        assert_eq!(err.kind, ErrorKind::Unclassified);
        assert_eq!(err.status, 500);
        assert_eq!(err.message, text);
        assert_eq!(err.description, "");
        assert_eq!(err.filename, "");
        assert_eq!(err.command, "");
    }

    #[test]
    fn test_unclassified_with_extracted_message() {
        let text = "convert: unable to open image `/tmp/missing.jpg': No such file or directory @ error/blob.c/OpenBlob/2701.";
        let err = classify_error(text);
        assert_eq!(err.kind, ErrorKind::Unclassified);
        assert_eq!(err.status, 500);
        // The quoted path is followed by more text, so it stays in the message.
        assert_eq!(
            err.message,
            "unable to open image `/tmp/missing.jpg': No such file or directory"
        );
        assert_eq!(err.filename, "");
        assert_eq!(err.command, "convert");
    }

    #[test]
    fn test_crlf_line_endings() {
        let text = "convert: no decode delegate for this image format `/tmp/a' @ error/constitute.c/ReadImage/532.\r\nconvert: invalid argument for option `-resize': 800+0+0 @ error/convert.c/ConvertImageCommand/2355.\r\n";
        let err = classify_error(text);
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
        assert_eq!(err.message, "invalid argument for option `-resize': 800+0+0");
        assert_eq!(err.description, "no decode delegate for this image format");
        assert_eq!(err.location, "error/convert.c/ConvertImageCommand/2355.");
    }

    #[test]
    fn test_unclassified_diagnostic_logs_warning() {
        let text = "convert: unable to open image `/tmp/missing.jpg': No such file or directory @ error/blob.c/OpenBlob/2701.";
        let (err, logs) = classify_with_logs(text);
        assert_eq!(err.kind, ErrorKind::Unclassified);
        assert!(logs.contains("WARN"));
        assert!(logs.contains("could not classify ImageMagick diagnostic"));
        assert!(!logs.contains("no diagnostic line found"));
    }

    #[test]
    fn test_classified_diagnostic_logs_nothing() {
        let (err, logs) =
            classify_with_logs("identify: Corrupt image `/tmp/a' @ error/x.c/Y/1.");
        assert_eq!(err.kind, ErrorKind::Corrupt);
        assert!(logs.is_empty(), "unexpected log output: {logs}");
    }

    #[test]
    fn test_keyword_without_pattern_falls_back_to_raw() {
        let text = "Corrupt header";
        let err = classify_error(text);
        assert_eq!(err.kind, ErrorKind::Corrupt);
        assert_eq!(err.message, text);
        assert_eq!(err.description, "");
    }

    #[test]
    fn test_escaped_quotes_and_backslashes() {
        let text = "identify: Corrupt file name\\'s data `/tmp/with\\ space.jpg' @ error/jpeg.c/X/1.";
        let err = classify_error(text);
        assert_eq!(err.message, "Corrupt file name's data");
        assert_eq!(err.filename, "/tmp/with space.jpg");
    }

    #[test]
    fn test_last_command_and_filename_win() {
        let text = "identify: first problem `/tmp/a' @ a.c/1.\nconvert: invalid argument `/tmp/b' @ b.c/2.";
        let err = classify_error(text);
        assert_eq!(err.command, "convert");
        assert_eq!(err.filename, "/tmp/b");
        assert_eq!(err.location, "b.c/2.");
    }

    #[test]
    fn test_display_is_message() {
        let err = classify_error("identify: Corrupt image `/tmp/a' @ x.c/1.");
        assert_eq!(err.to_string(), "Corrupt image");
    }

    #[test]
    fn test_serialized_shape() {
        let err = classify_error(&fixture("identify-err.txt"));
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["errorKind"], "corrupt");
        assert_eq!(json["status"], 422);
        assert_eq!(json["message"], "Premature end of JPEG file");
        assert!(json["raw"].as_str().unwrap().starts_with("identify:"));
    }
}

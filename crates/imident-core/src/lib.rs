//! imident core - typed data from ImageMagick's human-oriented output.
//!
//! ImageMagick describes images and reports failures as free-form text. This
//! crate turns both into values a program can branch on:
//!
//! ```text
//! identify -verbose stdout → parse_metadata → Report (one Record per frame)
//! identify/convert stderr  → classify_error → ClassifiedError (kind + status)
//! ```
//!
//! Both parsers are pure functions over a complete string. [`MagickRunner`]
//! is the thin process driver that feeds them.
//!
//! # Usage
//!
//! ```rust
//! use imident_core::{classify_error, parse_metadata, ErrorKind};
//!
//! let report = parse_metadata("Image: foo.jpg\n  Format: JPEG\n  Quality: 92\n");
//! let frame = report.first().unwrap();
//! assert_eq!(frame.get_str("format"), Some("JPEG"));
//! assert_eq!(frame.get_f64("quality"), Some(92.0));
//!
//! let err = classify_error("identify: Corrupt image `/tmp/a.jpg' @ error/jpeg.c/ReadJPEGImage/1.");
//! assert_eq!(err.kind, ErrorKind::Corrupt);
//! assert_eq!(err.status, 422);
//! ```

pub mod command;
pub mod config;
pub mod diagnostic;
pub mod driver;
pub mod error;
pub mod output;
pub mod report;

// Re-exports for convenient access
pub use command::{ConvertCommand, IdentifyCommand};
pub use config::Config;
pub use diagnostic::{classify_error, ClassifiedError, ErrorKind};
pub use driver::MagickRunner;
pub use error::{ConfigError, DriverError, DriverResult};
pub use output::{OutputFormat, OutputWriter};
pub use report::{parse_metadata, FieldValue, Record, Report};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

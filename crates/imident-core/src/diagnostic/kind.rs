//! The closed set of failure classes callers branch on.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Machine-checkable failure class of an ImageMagick diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed or truncated image data.
    Corrupt,
    /// The input needs metadata the tool cannot infer (raw formats without a size).
    UnsupportedType,
    /// An argument was rejected, or no decoder/encoder was found.
    InvalidArgument,
    /// Nothing in the text matched a known pattern.
    Unclassified,
}

impl ErrorKind {
    /// HTTP-style status: 422 for input problems, 500 for anything unknown.
    pub fn status(self) -> u16 {
        match self {
            ErrorKind::Corrupt | ErrorKind::UnsupportedType | ErrorKind::InvalidArgument => 422,
            ErrorKind::Unclassified => 500,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Corrupt => "corrupt",
            ErrorKind::UnsupportedType => "unsupported_type",
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::Unclassified => "unclassified",
        }
    }

    /// Whether the failure is caused by the input rather than the tool.
    pub fn is_client_error(self) -> bool {
        self.status() < 500
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

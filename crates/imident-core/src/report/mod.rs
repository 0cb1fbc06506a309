//! Parser for `identify -verbose` reports.
//!
//! The report is an indentation-structured list of `Key: value` lines, two
//! spaces per level, repeated once per frame for multi-frame images:
//!
//! ```text
//! Image: foo.gif
//!   Format: GIF (CompuServe graphics interchange format)
//!   Channel depth:
//!     red: 8-bit
//!   Properties:
//!     date:create: 2013-01-21T15:08:49+01:00
//! Image: foo.gif
//!   ...
//! ```
//!
//! Each frame becomes a [`Record`] with camelCased keys and typed values
//! (see [`coerce`]). Lines without a value open a nested record that collects
//! the deeper lines below them.

mod key;
mod value;

pub use key::{camel_case, split_embedded_key};
pub use value::{coerce, parse_date, FieldValue, Record};

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// One report line: indentation, key up to the first colon, value to end of line.
/// Trailing blank lines are swallowed with the line.
static REPORT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^((?:  )*)([^:]+): *([^\n]*)\n*").expect("valid report-line pattern")
});

/// Column-0 prefix that starts every frame.
const IDENTITY_PREFIX: &str = "Image:";

/// Width of one indentation level.
const INDENT_UNIT: &str = "  ";

/// Parsed `identify -verbose` output.
///
/// A single-image report yields [`Report::Single`]; a report with several
/// frames yields one record per frame in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Report {
    Single(Record),
    Frames(Vec<Record>),
}

impl Report {
    /// All frames, regardless of how many there are.
    pub fn frames(&self) -> &[Record] {
        match self {
            Report::Single(record) => std::slice::from_ref(record),
            Report::Frames(records) => records,
        }
    }

    pub fn into_frames(self) -> Vec<Record> {
        match self {
            Report::Single(record) => vec![record],
            Report::Frames(records) => records,
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frames().len()
    }

    pub fn is_multi_frame(&self) -> bool {
        matches!(self, Report::Frames(_))
    }

    /// The first (or only) frame.
    pub fn first(&self) -> Option<&Record> {
        self.frames().first()
    }
}

/// Parse the complete stdout of `identify -verbose`.
///
/// Never fails: unrecognized text yields an empty record.
pub fn parse_metadata(text: &str) -> Report {
    let mut frames: Vec<Record> = split_frames(text).into_iter().map(parse_frame).collect();

    tracing::debug!(frames = frames.len(), "parsed identify report");

    if frames.len() == 1 {
        Report::Single(frames.remove(0))
    } else {
        Report::Frames(frames)
    }
}

/// Split before every column-0 `Image:` line except at the very start.
fn split_frames(text: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        if offset > 0 && line.starts_with(IDENTITY_PREFIX) {
            segments.push(&text[start..offset]);
            start = offset;
        }
        offset += line.len();
    }
    segments.push(&text[start..]);

    segments
}

/// A record still receiving lines, with the key it will be stored under.
struct OpenRecord {
    key: String,
    record: Record,
}

/// Stack of open records; the root sits at the bottom and is never popped.
struct RecordStack {
    open: Vec<OpenRecord>,
}

impl RecordStack {
    fn new() -> Self {
        Self {
            open: vec![OpenRecord {
                key: String::new(),
                record: Record::new(),
            }],
        }
    }

    /// Close records until at most `depth` remain open (never below the root).
    fn unwind_to(&mut self, depth: usize) {
        while self.open.len() > depth.max(1) {
            self.close_top();
        }
    }

    fn close_top(&mut self) {
        if self.open.len() < 2 {
            return;
        }
        if let Some(child) = self.open.pop() {
            self.current()
                .insert(child.key, FieldValue::Record(child.record));
        }
    }

    fn current(&mut self) -> &mut Record {
        let top = self.open.len() - 1;
        &mut self.open[top].record
    }

    fn open_child(&mut self, key: String) {
        self.open.push(OpenRecord {
            key,
            record: Record::new(),
        });
    }

    fn finish(mut self) -> Record {
        self.unwind_to(1);
        self.open
            .pop()
            .map(|root| root.record)
            .unwrap_or_default()
    }
}

/// Parse one frame segment into a record.
fn parse_frame(segment: &str) -> Record {
    // The identity line is not indented but belongs at the same level as its fields.
    let padded = format!("{INDENT_UNIT}{segment}");
    let mut rest = padded.as_str();
    let mut stack = RecordStack::new();

    while let Some(caps) = REPORT_LINE.captures(rest) {
        let depth = caps[1].len() / INDENT_UNIT.len();
        let (raw_key, raw_value) = split_embedded_key(&caps[2], &caps[3]);
        let key = camel_case(&raw_key);
        let value = coerce(&key, raw_value);

        stack.unwind_to(depth);

        match value {
            FieldValue::Absent => stack.open_child(key),
            leaf => stack.current().insert(key, leaf),
        }

        rest = &rest[caps[0].len()..];
    }

    stack.finish()
}

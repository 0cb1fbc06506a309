//! Typed field values and the records that hold them.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::btree_map::{self, BTreeMap};

/// A single value from an `identify -verbose` report.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Number(f64),
    Boolean(bool),
    Date(DateTime<FixedOffset>),
    Record(Record),
    /// The line carried no value; its indented children become a nested record.
    Absent,
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            FieldValue::Date(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            FieldValue::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, FieldValue::Absent)
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::String(s) => serializer.serialize_str(s),
            FieldValue::Number(n) => serializer.serialize_f64(*n),
            FieldValue::Boolean(b) => serializer.serialize_bool(*b),
            FieldValue::Date(d) => serializer.serialize_str(&d.to_rfc3339()),
            FieldValue::Record(r) => r.serialize(serializer),
            FieldValue::Absent => serializer.serialize_none(),
        }
    }
}

/// A mapping of camelCased field names to values.
///
/// Records are only built by the report parser; callers get read access.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, key: String, value: FieldValue) {
        self.fields.insert(key, value);
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FieldValue::as_str)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(FieldValue::as_f64)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(FieldValue::as_bool)
    }

    pub fn get_date(&self, key: &str) -> Option<&DateTime<FixedOffset>> {
        self.get(key).and_then(FieldValue::as_date)
    }

    pub fn get_record(&self, key: &str) -> Option<&Record> {
        self.get(key).and_then(FieldValue::as_record)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, FieldValue> {
        self.fields.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a String, &'a FieldValue);
    type IntoIter = btree_map::Iter<'a, String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Key the tool uses for the colormap size, which is not a useful value.
const COLORMAP_KEY: &str = "colormap";

/// Coerce a raw report value into a typed field.
///
/// Order matters: dates (by key), booleans, numbers, empty, then plain strings.
/// `colormap` is always `Absent` so its `Colormap entry` children nest under it.
pub fn coerce(key: &str, raw: &str) -> FieldValue {
    if key == COLORMAP_KEY {
        return FieldValue::Absent;
    }

    if key.starts_with("date") {
        if let Some(date) = parse_date(raw) {
            return FieldValue::Date(date);
        }
    }

    if raw.eq_ignore_ascii_case("true") {
        return FieldValue::Boolean(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return FieldValue::Boolean(false);
    }

    if let Some(n) = parse_number(raw) {
        return FieldValue::Number(n);
    }

    if raw.is_empty() {
        return FieldValue::Absent;
    }

    FieldValue::String(raw.to_string())
}

/// Accept a number only if its canonical rendering is exactly the input,
/// so `100x100`, `1.0`, `08` and `-0` stay strings.
fn parse_number(raw: &str) -> Option<f64> {
    let n: f64 = raw.parse().ok()?;
    if n.is_finite() && canonical_number(n) == raw {
        Some(n)
    } else {
        None
    }
}

/// Shortest round-trip rendering of a finite number. Zero has no sign,
/// and magnitudes below 1e-6 or from 1e21 up use exponent form (`1e+21`,
/// `1.5e-7`).
fn canonical_number(n: f64) -> String {
    if n == 0.0 {
        return "0".to_string();
    }
    let magnitude = n.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return n.to_string();
    }
    let exp = format!("{n:e}");
    match exp.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => format!("{mantissa}e+{power}"),
        _ => exp,
    }
}

/// Parse the date renderings ImageMagick emits in properties and EXIF tags.
pub fn parse_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(d) = DateTime::parse_from_rfc3339(raw) {
        return Some(d);
    }
    if let Ok(d) = DateTime::parse_from_rfc2822(raw) {
        return Some(d);
    }
    if let Ok(d) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(d);
    }

    const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y:%m:%d %H:%M:%S"];
    NAIVE_FORMATS.iter().find_map(|fmt| {
        NaiveDateTime::parse_from_str(raw, fmt)
            .ok()
            .map(|naive| Utc.from_utc_datetime(&naive).fixed_offset())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_plain_string() {
        assert_eq!(
            coerce("geometry", "100x100+0+0"),
            FieldValue::String("100x100+0+0".to_string())
        );
    }

    #[test]
    fn test_coerce_booleans_case_insensitive() {
        assert_eq!(coerce("verbose", "true"), FieldValue::Boolean(true));
        assert_eq!(coerce("verbose", "TRUE"), FieldValue::Boolean(true));
        assert_eq!(coerce("tainted", "False"), FieldValue::Boolean(false));
    }

    #[test]
    fn test_coerce_numbers() {
        assert_eq!(coerce("quality", "92"), FieldValue::Number(92.0));
        assert_eq!(coerce("gamma", "0.454545"), FieldValue::Number(0.454545));
        assert_eq!(coerce("kurtosis", "-1.5"), FieldValue::Number(-1.5));
    }

    #[test]
    fn test_coerce_zero_is_number_not_absent() {
        assert_eq!(coerce("iterations", "0"), FieldValue::Number(0.0));
    }

    #[test]
    fn test_coerce_non_canonical_numbers_stay_strings() {
        assert_eq!(coerce("version", "1.0"), FieldValue::String("1.0".into()));
        assert_eq!(coerce("scene", "08"), FieldValue::String("08".into()));
        assert_eq!(coerce("resolution", "72x72"), FieldValue::String("72x72".into()));
        assert_eq!(coerce("size", "+5"), FieldValue::String("+5".into()));
        assert_eq!(coerce("skewness", "-0"), FieldValue::String("-0".into()));
        assert_eq!(coerce("mean", "0.0000001"), FieldValue::String("0.0000001".into()));
        assert_eq!(coerce("mean", "1e7"), FieldValue::String("1e7".into()));
    }

    #[test]
    fn test_coerce_exponent_numbers_in_canonical_form() {
        assert_eq!(coerce("mean", "1e-7"), FieldValue::Number(1e-7));
        assert_eq!(coerce("mean", "1.5e-7"), FieldValue::Number(1.5e-7));
        assert_eq!(coerce("pixels", "1e+21"), FieldValue::Number(1e21));
        assert_eq!(coerce("pixels", "1e21"), FieldValue::String("1e21".into()));
        assert_eq!(coerce("mean", "0.000001"), FieldValue::Number(0.000001));
    }

    #[test]
    fn test_coerce_empty_is_absent() {
        assert!(coerce("channelDepth", "").is_absent());
    }

    #[test]
    fn test_coerce_colormap_always_absent() {
        assert!(coerce("colormap", "256").is_absent());
        assert!(coerce("colormap", "").is_absent());
    }

    #[test]
    fn test_coerce_date_key_takes_priority() {
        let value = coerce("dateCreate", "2013-01-21T15:08:49+01:00");
        let date = value.as_date().unwrap();
        assert_eq!(date.to_rfc3339(), "2013-01-21T15:08:49+01:00");
    }

    #[test]
    fn test_coerce_date_key_with_unparseable_value_falls_through() {
        assert_eq!(
            coerce("dateCreate", "sometime"),
            FieldValue::String("sometime".into())
        );
        assert!(coerce("date", "").is_absent());
    }

    #[test]
    fn test_coerce_non_date_key_keeps_date_text() {
        assert_eq!(
            coerce("created", "2013-01-21T15:08:49+01:00"),
            FieldValue::String("2013-01-21T15:08:49+01:00".into())
        );
    }

    #[test]
    fn test_parse_date_formats() {
        assert!(parse_date("2013-01-21T15:08:49+01:00").is_some());
        assert!(parse_date("Mon, 21 Jan 2013 15:08:49 +0100").is_some());
        assert!(parse_date("2013-01-21T15:08:49+0100").is_some());

        let exif = parse_date("2013:01:21 15:08:49").unwrap();
        assert_eq!(exif.to_rfc3339(), "2013-01-21T15:08:49+00:00");

        assert!(parse_date("not a date").is_none());
        assert!(parse_date("").is_none());
    }

    #[test]
    fn test_record_accessors() {
        let mut child = Record::new();
        child.insert("red".into(), FieldValue::String("8-bit".into()));

        let mut record = Record::new();
        record.insert("image".into(), FieldValue::String("foo.jpg".into()));
        record.insert("quality".into(), FieldValue::Number(92.0));
        record.insert("channelDepth".into(), FieldValue::Record(child));

        assert_eq!(record.len(), 3);
        assert_eq!(record.get_str("image"), Some("foo.jpg"));
        assert_eq!(record.get_f64("quality"), Some(92.0));
        assert_eq!(record.get_str("quality"), None);
        assert_eq!(
            record.get_record("channelDepth").unwrap().get_str("red"),
            Some("8-bit")
        );
        assert_eq!(
            record.keys().collect::<Vec<_>>(),
            vec!["channelDepth", "image", "quality"]
        );
    }

    #[test]
    fn test_record_insert_overwrites() {
        let mut record = Record::new();
        record.insert("format".into(), FieldValue::String("PNG".into()));
        record.insert("format".into(), FieldValue::String("JPEG".into()));
        assert_eq!(record.len(), 1);
        assert_eq!(record.get_str("format"), Some("JPEG"));
    }

    #[test]
    fn test_serialize_nested_record() {
        let mut child = Record::new();
        child.insert(
            "dateCreate".into(),
            coerce("dateCreate", "2013-01-21T15:08:49+01:00"),
        );

        let mut record = Record::new();
        record.insert("image".into(), FieldValue::String("foo.jpg".into()));
        record.insert("verbose".into(), FieldValue::Boolean(true));
        record.insert("properties".into(), FieldValue::Record(child));

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["image"], "foo.jpg");
        assert_eq!(json["verbose"], true);
        assert_eq!(
            json["properties"]["dateCreate"],
            "2013-01-21T15:08:49+01:00"
        );
    }
}

//! Board records loaded from a points file.
//!
//! A points file holds the records as the message board backend serializes
//! them. It is either a bare JSON array of messages:
//!
//! ```json
//! [{"id": 1, "message": "hello", "lat": 40.7, "lng": -74.0, "posted_at": "2025-01-01T12:00:00Z"}]
//! ```
//!
//! or an object with separate message and location summary lists:
//!
//! ```json
//! {
//!   "messages": [{"id": 1, "message": "hello", "lat": 40.7, "lng": -74.0}],
//!   "summaries": [{"id": 2, "summary": "A busy harbour.", "location": "New York", "lat": 40.7, "lng": -74.0}]
//! }
//! ```
//!
//! `posted_at` and `color` (`"#rrggbb"`) are optional. Ids must be unique
//! across both lists since they become marker ids.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use globe_core::GeoPoint;
use serde::Deserialize;

/// Result type for points-file operations.
pub type Result<T> = std::result::Result<T, PointsError>;

/// Marker color for summaries without their own color.
pub const SUMMARY_MARKER_COLOR: u32 = 0x4d_a6_ff;

/// Errors that can occur while loading a points file.
#[derive(Debug)]
pub enum PointsError {
    /// The file could not be read.
    Io {
        /// Path as given on the command line.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The contents are not a valid points file.
    Parse(serde_json::Error),
    /// A record has a coordinate outside the valid range.
    InvalidCoordinate {
        /// Which list the record is in.
        kind: RecordKind,
        /// Position of the record within its list.
        index: usize,
        /// The record's id.
        id: u64,
        /// Latitude as read, in degrees.
        lat: f64,
        /// Longitude as read, in degrees.
        lng: f64,
    },
    /// A record has a color that is not `#rrggbb`.
    InvalidColor {
        /// Which list the record is in.
        kind: RecordKind,
        /// Position of the record within its list.
        index: usize,
        /// The record's id.
        id: u64,
        /// The color string as read.
        color: String,
    },
    /// Two records share an id.
    DuplicateId {
        /// The repeated id.
        id: u64,
    },
}

impl fmt::Display for PointsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointsError::Io { path, source } => write!(f, "failed to read {path}: {source}"),
            PointsError::Parse(e) => write!(f, "invalid points file: {e}"),
            PointsError::InvalidCoordinate {
                kind,
                index,
                id,
                lat,
                lng,
            } => write!(
                f,
                "{kind} {index} (id {id}) has invalid coordinate ({lat}, {lng})"
            ),
            PointsError::InvalidColor {
                kind,
                index,
                id,
                color,
            } => {
                write!(f, "{kind} {index} (id {id}) has invalid color '{color}'")
            }
            PointsError::DuplicateId { id } => write!(f, "id {id} is used by more than one record"),
        }
    }
}

impl std::error::Error for PointsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PointsError::Io { source, .. } => Some(source),
            PointsError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for PointsError {
    fn from(e: serde_json::Error) -> Self {
        PointsError::Parse(e)
    }
}

/// The two kinds of record on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Message,
    Summary,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Message => write!(f, "message"),
            RecordKind::Summary => write!(f, "summary"),
        }
    }
}

/// One message on the board.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MessageRecord {
    pub id: u64,
    pub message: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub posted_at: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

/// A generated description of a place.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SummaryRecord {
    pub id: u64,
    pub summary: String,
    /// Place name, used as the marker label.
    pub location: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub posted_at: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

/// A message or a summary.
#[derive(Debug, Clone, PartialEq)]
pub enum BoardRecord {
    Message(MessageRecord),
    Summary(SummaryRecord),
}

impl BoardRecord {
    pub fn kind(&self) -> RecordKind {
        match self {
            BoardRecord::Message(_) => RecordKind::Message,
            BoardRecord::Summary(_) => RecordKind::Summary,
        }
    }

    pub fn id(&self) -> u64 {
        match self {
            BoardRecord::Message(record) => record.id,
            BoardRecord::Summary(record) => record.id,
        }
    }

    /// Latitude and longitude in degrees.
    pub fn coordinate(&self) -> (f64, f64) {
        match self {
            BoardRecord::Message(record) => (record.lat, record.lng),
            BoardRecord::Summary(record) => (record.lat, record.lng),
        }
    }

    /// Text shown as the marker label and list entry.
    pub fn title(&self) -> &str {
        match self {
            BoardRecord::Message(record) => &record.message,
            BoardRecord::Summary(record) => &record.location,
        }
    }

    pub fn posted_at(&self) -> Option<&str> {
        match self {
            BoardRecord::Message(record) => record.posted_at.as_deref(),
            BoardRecord::Summary(record) => record.posted_at.as_deref(),
        }
    }

    fn color(&self) -> Option<&str> {
        match self {
            BoardRecord::Message(record) => record.color.as_deref(),
            BoardRecord::Summary(record) => record.color.as_deref(),
        }
    }

    /// Build the point to plot for this record.
    ///
    /// Expects a record that has passed [`validate`]. Summaries without a
    /// color get [`SUMMARY_MARKER_COLOR`].
    pub fn to_geo_point(&self) -> GeoPoint {
        let (lat, lng) = self.coordinate();
        let point = GeoPoint::new(self.id(), lat, lng).with_label(self.title().to_owned());
        let color = match (self.color().and_then(parse_hex_color), self.kind()) {
            (Some(color), _) => Some(color),
            (None, RecordKind::Summary) => Some(SUMMARY_MARKER_COLOR),
            (None, RecordKind::Message) => None,
        };
        match color {
            Some(color) => point.with_color(color),
            None => point,
        }
    }
}

/// Object form of a points file.
#[derive(Debug, Default, Deserialize)]
struct PointsFile {
    #[serde(default)]
    messages: Vec<MessageRecord>,
    #[serde(default)]
    summaries: Vec<SummaryRecord>,
}

/// Parse a `#rrggbb` color into `0xRRGGBB`.
pub fn parse_hex_color(s: &str) -> Option<u32> {
    let hex = s.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

/// Check every record's coordinate and color, and that ids are unique.
pub fn validate(records: &[BoardRecord]) -> Result<()> {
    let mut ids = HashSet::with_capacity(records.len());
    for (position, record) in records.iter().enumerate() {
        let kind = record.kind();
        let id = record.id();
        // Position within the record's own list, only needed for errors.
        let index = || {
            records[..position]
                .iter()
                .filter(|other| other.kind() == kind)
                .count()
        };

        let (lat, lng) = record.coordinate();
        let lat_ok = lat.is_finite() && (-90.0..=90.0).contains(&lat);
        let lng_ok = lng.is_finite() && (-180.0..=180.0).contains(&lng);
        if !lat_ok || !lng_ok {
            return Err(PointsError::InvalidCoordinate {
                kind,
                index: index(),
                id,
                lat,
                lng,
            });
        }
        if let Some(color) = record.color()
            && parse_hex_color(color).is_none()
        {
            return Err(PointsError::InvalidColor {
                kind,
                index: index(),
                id,
                color: color.to_owned(),
            });
        }
        if !ids.insert(id) {
            return Err(PointsError::DuplicateId { id });
        }
    }
    Ok(())
}

/// Parse and validate a points file's contents. Messages come first.
pub fn parse_records(json: &str) -> Result<Vec<BoardRecord>> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let file = if value.is_array() {
        PointsFile {
            messages: serde_json::from_value(value)?,
            ..PointsFile::default()
        }
    } else {
        serde_json::from_value(value)?
    };

    let records: Vec<BoardRecord> = file
        .messages
        .into_iter()
        .map(BoardRecord::Message)
        .chain(file.summaries.into_iter().map(BoardRecord::Summary))
        .collect();
    validate(&records)?;
    Ok(records)
}

/// Read, parse and validate a points file.
pub fn load_records(path: &Path) -> Result<Vec<BoardRecord>> {
    let json = std::fs::read_to_string(path).map_err(|source| PointsError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_records(&json)
}

/// Built-in records shown when no points file is given.
pub fn sample_records() -> Vec<BoardRecord> {
    let message = |id, message: &str, lat, lng| {
        BoardRecord::Message(MessageRecord {
            id,
            message: message.to_string(),
            lat,
            lng,
            posted_at: None,
            color: None,
        })
    };
    let summary = |id, location: &str, summary: &str, lat, lng| {
        BoardRecord::Summary(SummaryRecord {
            id,
            summary: summary.to_string(),
            location: location.to_string(),
            lat,
            lng,
            posted_at: None,
            color: None,
        })
    };
    vec![
        message(1, "Hello from New York", 40.7128, -74.006),
        message(2, "Greetings from London", 51.5074, -0.1278),
        message(3, "Tokyo says hi", 35.6762, 139.6503),
        message(4, "Sunny in Sydney", -33.8688, 151.2093),
        message(5, "Good morning, Nairobi", -1.2921, 36.8219),
        message(6, "Rio checking in", -22.9068, -43.1729),
        message(7, "Reykjavik is cold", 64.1466, -21.9426),
        summary(
            101,
            "Cairo",
            "Capital of Egypt on the Nile, close to the Giza pyramids.",
            30.0444,
            31.2357,
        ),
        summary(
            102,
            "Lima",
            "Coastal capital of Peru with a mild, dry climate.",
            -12.0464,
            -77.0428,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_records() {
        let json = r##"[
            {"id": 1, "message": "hi", "lat": 10.0, "lng": 20.0, "posted_at": "2025-05-01T10:00:00Z"},
            {"id": 2, "message": "yo", "lat": -5.0, "lng": -5.0, "color": "#00ff80"}
        ]"##;
        let records = parse_records(json).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.kind() == RecordKind::Message));
        assert_eq!(records[0].posted_at(), Some("2025-05-01T10:00:00Z"));

        let point = records[1].to_geo_point();
        assert_eq!(point.id, 2);
        assert_eq!(point.label.as_deref(), Some("yo"));
        assert_eq!(point.color, Some(0x00_ff_80));

        // Messages without a color use the marker default.
        assert_eq!(records[0].to_geo_point().color, None);
    }

    #[test]
    fn test_parse_summaries() {
        let json = r#"{"summaries": [
            {"id": 4, "summary": "Old port city.", "location": "Lisbon", "lat": 38.72, "lng": -9.14, "posted_at": "2025-06-01T08:30:00Z"}
        ]}"#;
        let records = parse_records(json).unwrap();
        assert_eq!(records.len(), 1);

        let BoardRecord::Summary(summary) = &records[0] else {
            panic!("expected a summary, got {:?}", records[0]);
        };
        assert_eq!(summary.summary, "Old port city.");
        assert_eq!(records[0].title(), "Lisbon");
        assert_eq!(records[0].posted_at(), Some("2025-06-01T08:30:00Z"));

        let point = records[0].to_geo_point();
        assert_eq!(point.id, 4);
        assert_eq!(point.label.as_deref(), Some("Lisbon"));
        assert_eq!(point.color, Some(SUMMARY_MARKER_COLOR));
    }

    #[test]
    fn test_parse_messages_and_summaries() {
        let json = r##"{
            "messages": [{"id": 1, "message": "hi", "lat": 10.0, "lng": 20.0}],
            "summaries": [
                {"id": 2, "summary": "s", "location": "Here", "lat": 0.0, "lng": 0.0, "color": "#112233"},
                {"id": 3, "summary": "t", "location": "There", "lat": 1.0, "lng": 1.0}
            ]
        }"##;
        let records = parse_records(json).unwrap();
        let kinds: Vec<RecordKind> = records.iter().map(BoardRecord::kind).collect();
        assert_eq!(
            kinds,
            vec![RecordKind::Message, RecordKind::Summary, RecordKind::Summary]
        );
        // An explicit color beats the summary default.
        assert_eq!(records[1].to_geo_point().color, Some(0x11_22_33));
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        let json = r#"[
            {"id": 1, "message": "ok", "lat": 0.0, "lng": 0.0},
            {"id": 9, "message": "bad", "lat": 91.0, "lng": 0.0}
        ]"#;
        let err = parse_records(json).unwrap_err();
        assert!(matches!(
            err,
            PointsError::InvalidCoordinate {
                kind: RecordKind::Message,
                index: 1,
                id: 9,
                ..
            }
        ));
        assert!(err.to_string().contains("id 9"));

        // Summary indices count within the summary list.
        let json = r#"{
            "messages": [{"id": 1, "message": "ok", "lat": 0.0, "lng": 0.0}],
            "summaries": [{"id": 5, "summary": "s", "location": "L", "lat": 0.0, "lng": 200.0}]
        }"#;
        assert!(matches!(
            parse_records(json),
            Err(PointsError::InvalidCoordinate {
                kind: RecordKind::Summary,
                index: 0,
                id: 5,
                ..
            })
        ));
    }

    #[test]
    fn test_parse_rejects_duplicate_ids_across_kinds() {
        let json = r#"{
            "messages": [{"id": 7, "message": "m", "lat": 0.0, "lng": 0.0}],
            "summaries": [{"id": 7, "summary": "s", "location": "L", "lat": 1.0, "lng": 1.0}]
        }"#;
        let err = parse_records(json).unwrap_err();
        assert!(matches!(err, PointsError::DuplicateId { id: 7 }));
    }

    #[test]
    fn test_parse_rejects_bad_records_and_json() {
        let json = r#"[{"id": 1, "message": "x", "lat": 0.0, "lng": 0.0, "color": "red"}]"#;
        assert!(matches!(
            parse_records(json),
            Err(PointsError::InvalidColor { .. })
        ));
        assert!(matches!(
            parse_records("{not json"),
            Err(PointsError::Parse(_))
        ));
        // A summary must name its location.
        let json = r#"{"summaries": [{"id": 1, "summary": "s", "lat": 0.0, "lng": 0.0}]}"#;
        assert!(matches!(parse_records(json), Err(PointsError::Parse(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_records(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, PointsError::Io { .. }));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#ff4d4d"), Some(0xff_4d_4d));
        assert_eq!(parse_hex_color("ff4d4d"), None);
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(parse_hex_color("#gggggg"), None);
    }

    #[test]
    fn test_sample_records_are_valid() {
        let records = sample_records();
        assert!(validate(&records).is_ok());
        assert!(records.iter().any(|r| r.kind() == RecordKind::Summary));
    }
}

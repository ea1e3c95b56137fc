pub mod tags;
pub mod text;

pub use chrono;
pub use serde;
pub use serde::{Deserialize, Serialize};
pub use serde_json;
pub use toml;

use chrono::{DateTime, SecondsFormat, Utc};

/// File name offered to browsers for a full export
pub const EXPORT_FILENAME: &str = "commands_backup.json";

/// A stored command as it travels over the wire
///
/// This is both the REST response body and one element of an export
/// file. Importers only read `command`, `description`, `tags` and
/// `subcommands`; the remaining fields are informational.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandRecord {
    pub id: i32,
    pub command: String,
    pub description: Option<String>,
    pub tags: Option<String>,
    #[serde(default, with = "iso_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub subcommands: Vec<SubcommandRecord>,
}

/// A subcommand nested under its parent record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubcommandRecord {
    pub command: String,
    pub description: Option<String>,
}

/// Response body of a successful create
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreatedCommand {
    pub id: i32,
    pub command: String,
}

/// Error body shared by every JSON endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub error: String,
}

/// Outcome of an import batch
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

/// ISO-8601 timestamps with microsecond precision and an explicit UTC offset
mod iso_timestamp {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => serializer.serialize_some(&ts.to_rfc3339_opts(SecondsFormat::Micros, false)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| {
            DateTime::parse_from_rfc3339(&s)
                .map(|ts| ts.with_timezone(&Utc))
                .map_err(serde::de::Error::custom)
        })
        .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn created_at_serializes_as_utc_iso8601() {
        let record = CommandRecord {
            id: 7,
            command: "ls -la".to_string(),
            description: None,
            tags: Some("fs".to_string()),
            created_at: Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap()),
            subcommands: vec![],
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["created_at"], "2024-03-01T12:30:00.000000+00:00");
        assert_eq!(json["description"], serde_json::Value::Null);

        let back: CommandRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn missing_timestamp_is_null() {
        let record = CommandRecord {
            id: 1,
            command: "pwd".to_string(),
            description: None,
            tags: None,
            created_at: None,
            subcommands: vec![],
        };

        let json = serde_json::to_value(&record).unwrap();
        assert!(json["created_at"].is_null());
    }
}

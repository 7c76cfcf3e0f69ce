//! Date and timestamp codecs.
//!
//! Timestamps are written as fixed-width RFC 3339 UTC with microsecond
//! precision (`2024-03-01T09:30:00.000000Z`). Sub-microsecond precision is
//! dropped on write. Rows written elsewhere in the `YYYY-MM-DD HH:MM:SS` form
//! are also read; any other text is malformed.
//!
//! Those two forms do not sort against each other as text (`' ' < 'T'`), so
//! predicates and ordering on timestamp columns go through
//! [`timestamp_key`], which widens the short form to the canonical one.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

use super::{FieldCodec, SqlType, StoredValue, expect_text};
use crate::error::DecodeError;

const DATE_FORMAT: &str = "%Y-%m-%d";
const LEGACY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const LEGACY_TIMESTAMP_LEN: usize = 19;

/// Formats a timestamp the way it is stored.
pub(crate) fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// SQL expression ordering a stored timestamp column chronologically.
pub(crate) fn timestamp_key(column: &str) -> String {
    format!(
        "(CASE WHEN length({0}) = {1} THEN replace({0}, ' ', 'T') || '.000000Z' ELSE {0} END)",
        column, LEGACY_TIMESTAMP_LEN
    )
}

fn parse_canonical(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
        .filter(|parsed| format_timestamp(parsed) == text)
}

fn parse_legacy(text: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(text, LEGACY_TIMESTAMP_FORMAT)
        .ok()
        .filter(|naive| naive.format(LEGACY_TIMESTAMP_FORMAT).to_string() == text)
        .map(|naive| naive.and_utc())
}

impl FieldCodec for DateTime<Utc> {
    const SQL_TYPE: SqlType = SqlType::Timestamp;

    fn encode(&self) -> StoredValue {
        StoredValue::Text(format_timestamp(self))
    }

    fn decode(column: &str, value: &StoredValue) -> Result<Self, DecodeError> {
        let text = expect_text(column, value)?;

        parse_canonical(text)
            .or_else(|| parse_legacy(text))
            .ok_or_else(|| DecodeError::Malformed {
                column: column.to_string(),
                value: text.to_string(),
                message: "expected a UTC timestamp with microseconds".to_string(),
            })
    }
}

/// Date-only fields never carry a time of day. A stored timestamp decodes to
/// its date part.
impl FieldCodec for NaiveDate {
    const SQL_TYPE: SqlType = SqlType::Text;

    fn encode(&self) -> StoredValue {
        StoredValue::Text(self.format(DATE_FORMAT).to_string())
    }

    fn decode(column: &str, value: &StoredValue) -> Result<Self, DecodeError> {
        let text = expect_text(column, value)?;

        NaiveDate::parse_from_str(text, DATE_FORMAT)
            .ok()
            .filter(|date| date.format(DATE_FORMAT).to_string() == text)
            .or_else(|| {
                parse_canonical(text)
                    .or_else(|| parse_legacy(text))
                    .map(|timestamp| timestamp.date_naive())
            })
            .ok_or_else(|| DecodeError::Malformed {
                column: column.to_string(),
                value: text.to_string(),
                message: "expected YYYY-MM-DD".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn test_timestamp_fixed_width() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        assert_eq!(
            ts.encode(),
            StoredValue::from("2024-03-01T09:30:00.000000Z")
        );
    }

    #[test]
    fn test_timestamp_roundtrip() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 15).unwrap();
        let decoded = DateTime::<Utc>::decode("at", &ts.encode()).unwrap();
        assert_eq!(decoded, ts);
    }

    #[test]
    fn test_timestamp_text_order_is_chronological() {
        let early = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let late = early + chrono::Duration::microseconds(1);
        let (StoredValue::Text(a), StoredValue::Text(b)) = (early.encode(), late.encode()) else {
            panic!("timestamps encode as text");
        };
        assert!(a < b);
    }

    #[test]
    fn test_timestamp_accepts_legacy_format() {
        let decoded =
            DateTime::<Utc>::decode("at", &StoredValue::from("2024-03-01 09:30:00")).unwrap();
        assert_eq!(decoded.hour(), 9);
        assert_eq!(decoded.minute(), 30);
    }

    #[test]
    fn test_timestamp_rejects_other_forms() {
        for text in [
            "yesterday",
            "2024-03-01T09:30:00Z",
            "2024-03-01T11:30:00.000000+02:00",
            "2024-03-01 09:30",
            "2024-03-01 09:30:00xyz",
        ] {
            let err = DateTime::<Utc>::decode("at", &StoredValue::from(text)).unwrap_err();
            assert!(matches!(err, DecodeError::Malformed { .. }), "{text}");
        }
    }

    #[test]
    fn test_timestamp_key_widens_legacy_rows() {
        assert_eq!(
            timestamp_key("published_at"),
            "(CASE WHEN length(published_at) = 19 THEN replace(published_at, ' ', 'T') || '.000000Z' ELSE published_at END)"
        );
    }

    #[test]
    fn test_date_roundtrip() {
        let date = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        assert_eq!(date.encode(), StoredValue::from("2023-12-31"));
        assert_eq!(NaiveDate::decode("d", &date.encode()).unwrap(), date);
    }

    #[test]
    fn test_date_discards_time_of_day() {
        let decoded =
            NaiveDate::decode("d", &StoredValue::from("2023-12-31T23:59:59.000000Z")).unwrap();
        assert_eq!(decoded, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
        assert_eq!(decoded.encode(), StoredValue::from("2023-12-31"));

        let decoded = NaiveDate::decode("d", &StoredValue::from("2023-12-31 08:00:00")).unwrap();
        assert_eq!(decoded, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
    }

    #[test]
    fn test_date_with_trailing_text_is_malformed() {
        for text in ["2023-12-31xyz", "2023-12-31T", "2023-1-5"] {
            let err = NaiveDate::decode("d", &StoredValue::from(text)).unwrap_err();
            assert!(matches!(err, DecodeError::Malformed { .. }), "{text}");
        }
    }
}

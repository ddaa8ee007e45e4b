//! Codec for the API's timestamp text, e.g. `2022-05-20 22:40:44.522 +0000 UTC`.
//!
//! Layout: `YYYY-MM-DD HH:MM:SS[.fraction] ±HHMM ZONE`. The fraction is
//! optional on input (any number of digits up to nanoseconds) and written as
//! milliseconds with trailing zeros trimmed. The numeric offset is
//! authoritative; the zone abbreviation is checked for shape only.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use thiserror::Error;

pub type Timestamp = DateTime<FixedOffset>;

/// Seconds between `0001-01-01T00:00:00Z` and the Unix epoch.
const YEAR_ONE_UNIX: i64 = -62_135_596_800;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed timestamp {input:?}: {reason}")]
pub struct TimestampError {
    input: String,
    reason: &'static str,
}

impl TimestampError {
    fn new(input: &str, reason: &'static str) -> Self {
        Self {
            input: input.to_string(),
            reason,
        }
    }
}

/// Encode `value` in the API layout.
///
/// The layout holds four-digit years and whole-minute offsets only. Values
/// outside that range are written anyway and will not decode back to the
/// same instant; use `try_encode` to reject them instead.
pub fn encode(value: &Timestamp) -> String {
    let mut out = value.format("%Y-%m-%d %H:%M:%S").to_string();

    let millis = value.nanosecond() % 1_000_000_000 / 1_000_000;
    if millis != 0 {
        let fraction = format!("{millis:03}");
        out.push('.');
        out.push_str(fraction.trim_end_matches('0'));
    }

    let offset = value.offset().local_minus_utc();
    let sign = if offset < 0 { '-' } else { '+' };
    let abs = offset.unsigned_abs();
    let numeric = format!("{sign}{:02}{:02}", abs / 3600, abs % 3600 / 60);
    let zone = if offset == 0 { "UTC" } else { numeric.as_str() };
    format!("{out} {numeric} {zone}")
}

/// Encode `value`, failing when the layout cannot represent it.
///
/// # Errors
/// Returns `TimestampError` for years outside `0000..=9999` and for UTC
/// offsets with a seconds component.
pub fn try_encode(value: &Timestamp) -> Result<String, TimestampError> {
    if !(0..=9999).contains(&value.year()) {
        return Err(TimestampError::new(&value.to_rfc3339(), "year outside 0000..=9999"));
    }
    if value.offset().local_minus_utc() % 60 != 0 {
        return Err(TimestampError::new(&value.to_rfc3339(), "UTC offset is not whole minutes"));
    }
    Ok(encode(value))
}

/// Decode a timestamp. The empty string means "not set" and yields `None`.
pub fn decode(text: &str) -> Result<Option<Timestamp>, TimestampError> {
    if text.is_empty() {
        return Ok(None);
    }

    let fields: Vec<&str> = text.split(' ').collect();
    let &[date, time, offset, zone] = fields.as_slice() else {
        return Err(TimestampError::new(text, "expected `date time offset zone`"));
    };

    let date = parse_date(date).ok_or_else(|| TimestampError::new(text, "invalid date"))?;
    let time = parse_time(time).ok_or_else(|| TimestampError::new(text, "invalid time of day"))?;
    let offset = parse_offset(offset).ok_or_else(|| TimestampError::new(text, "invalid UTC offset"))?;
    if zone.is_empty() || !zone.chars().all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-') {
        return Err(TimestampError::new(text, "invalid zone name"));
    }

    NaiveDateTime::new(date, time)
        .and_local_timezone(offset)
        .single()
        .map(Some)
        .ok_or_else(|| TimestampError::new(text, "time out of range"))
}

/// True for the instants the API uses as "never": the Unix epoch and
/// `0001-01-01 00:00:00 UTC`.
pub fn is_zero(value: &Timestamp) -> bool {
    value.timestamp_subsec_nanos() == 0 && matches!(value.timestamp(), 0 | YEAR_ONE_UNIX)
}

fn digits(text: &str, len: usize) -> Option<u32> {
    if text.len() != len || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    let mut parts = text.split('-');
    let year = digits(parts.next()?, 4)?;
    let month = digits(parts.next()?, 2)?;
    let day = digits(parts.next()?, 2)?;
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year as i32, month, day)
}

fn parse_time(text: &str) -> Option<NaiveTime> {
    let (clock, fraction) = match text.split_once('.') {
        Some((clock, fraction)) => (clock, Some(fraction)),
        None => (text, None),
    };

    let mut parts = clock.split(':');
    let hour = digits(parts.next()?, 2)?;
    let minute = digits(parts.next()?, 2)?;
    let second = digits(parts.next()?, 2)?;
    if parts.next().is_some() {
        return None;
    }

    let nanos = match fraction {
        None => 0,
        Some(f) if !f.is_empty() && f.len() <= 9 && f.bytes().all(|b| b.is_ascii_digit()) => {
            format!("{f:0<9}").parse().ok()?
        }
        Some(_) => return None,
    };

    NaiveTime::from_hms_nano_opt(hour, minute, second, nanos)
}

fn parse_offset(text: &str) -> Option<FixedOffset> {
    let (sign, rest) = match text.as_bytes().first()? {
        b'+' => (1, &text[1..]),
        b'-' => (-1, &text[1..]),
        _ => return None,
    };
    let hours = digits(rest.get(..2)?, 2)?;
    let minutes = digits(rest.get(2..)?, 2)?;
    if minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60) as i32)
}

/// Serde adapter for `Option<Timestamp>` fields.
///
/// `""` and `null` decode to `None`; `None` encodes as `""`.
pub mod option {
    use serde::{de, ser, Deserialize, Deserializer, Serializer};

    use super::Timestamp;

    pub fn serialize<S: Serializer>(value: &Option<Timestamp>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => serializer.serialize_str(&super::try_encode(ts).map_err(ser::Error::custom)?),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Timestamp>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(text) => super::decode(&text).map_err(de::Error::custom),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32, ms: u32) -> Timestamp {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap().fixed_offset()
            + chrono::Duration::milliseconds(ms as i64)
    }

    #[test]
    fn decodes_fixture_strings() {
        assert_eq!(
            decode("2022-05-20 22:40:44.522 +0000 UTC").unwrap(),
            Some(utc(2022, 5, 20, 22, 40, 44, 522))
        );
        assert_eq!(
            decode("2022-05-20 22:40:45.85 +0000 UTC").unwrap(),
            Some(utc(2022, 5, 20, 22, 40, 45, 850))
        );
    }

    #[test]
    fn decodes_without_fraction() {
        assert_eq!(
            decode("2021-01-02 03:04:05 +0000 UTC").unwrap(),
            Some(utc(2021, 1, 2, 3, 4, 5, 0))
        );
    }

    #[test]
    fn decodes_non_utc_offset() {
        let ts = decode("2022-05-21 00:40:44.522 +0200 CEST").unwrap().unwrap();
        assert_eq!(ts, utc(2022, 5, 20, 22, 40, 44, 522));
        assert_eq!(ts.offset().local_minus_utc(), 7200);
    }

    #[test]
    fn empty_string_is_absent() {
        assert_eq!(decode("").unwrap(), None);
    }

    #[test]
    fn malformed_input_is_an_error() {
        for bad in [
            "2022-05-20T22:40:44Z",
            "2022-05-20 22:40:44.522 +0000",
            "2022-13-20 22:40:44 +0000 UTC",
            "2022-05-20 25:40:44 +0000 UTC",
            "2022-05-20 22:40:44. +0000 UTC",
            "2022-05-20 22:40:44 0000 UTC",
            "2022-05-20 22:40:44 +0000 UTC extra",
            "not a timestamp",
        ] {
            assert!(decode(bad).is_err(), "{bad} should not decode");
        }
    }

    #[test]
    fn encodes_layout() {
        assert_eq!(encode(&utc(2022, 5, 20, 22, 40, 45, 850)), "2022-05-20 22:40:45.85 +0000 UTC");
        assert_eq!(encode(&utc(2022, 5, 20, 22, 40, 45, 0)), "2022-05-20 22:40:45 +0000 UTC");

        let offset = FixedOffset::west_opt(5 * 3600 + 30 * 60).unwrap();
        let ts = utc(2022, 5, 20, 22, 40, 45, 7).with_timezone(&offset);
        assert_eq!(encode(&ts), "2022-05-20 17:10:45.007 -0530 -0530");
    }

    #[test]
    fn round_trips_through_layout() {
        let offsets = [0, 3600, -4 * 3600, 5 * 3600 + 45 * 60];
        for (i, secs) in offsets.into_iter().enumerate() {
            let offset = FixedOffset::east_opt(secs).unwrap();
            let original = utc(2000 + i as i32 * 7, 1 + i as u32, 28, 12, 30, 59, 10 * i as u32 + 1)
                .with_timezone(&offset);
            let decoded = decode(&encode(&original)).unwrap().unwrap();
            assert_eq!(decoded, original);
            assert_eq!(decoded.offset(), original.offset());
        }
    }

    #[test]
    fn rejects_values_the_layout_cannot_hold() {
        let far = utc(9999, 12, 31, 23, 59, 59, 0) + chrono::Duration::days(1);
        assert_eq!(far.year(), 10000);
        assert!(decode(&encode(&far)).is_err());
        assert!(try_encode(&far).is_err());

        let odd = FixedOffset::east_opt(3601).unwrap();
        let ts = utc(2022, 5, 20, 22, 40, 45, 0).with_timezone(&odd);
        assert_ne!(decode(&encode(&ts)).unwrap().unwrap().offset(), ts.offset());
        assert!(try_encode(&ts).is_err());

        assert_eq!(
            try_encode(&utc(2022, 5, 20, 22, 40, 45, 850)).unwrap(),
            "2022-05-20 22:40:45.85 +0000 UTC"
        );
    }

    #[test]
    fn serde_adapter_refuses_unencodable_values() {
        #[derive(serde::Serialize)]
        struct Stamped {
            #[serde(with = "option")]
            at: Option<Timestamp>,
        }

        let far = utc(9999, 12, 31, 23, 59, 59, 0) + chrono::Duration::days(1);
        assert!(serde_json::to_string(&Stamped { at: Some(far) }).is_err());
        assert_eq!(
            serde_json::to_string(&Stamped { at: None }).unwrap(),
            r#"{"at":""}"#
        );
    }

    #[test]
    fn zero_instants() {
        assert!(is_zero(&decode("0001-01-01 00:00:00 +0000 UTC").unwrap().unwrap()));
        assert!(is_zero(&decode("1970-01-01 00:00:00 +0000 UTC").unwrap().unwrap()));
        assert!(!is_zero(&utc(2022, 5, 20, 22, 40, 45, 0)));
    }
}

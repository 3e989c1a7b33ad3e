//! Timestamp and date text parsing.
//!
//! Timestamps are microseconds and dates milliseconds since the Unix epoch,
//! both UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

/// Parse a possibly partial ISO-8601 timestamp, flooring missing fields.
///
/// Accepts `YYYY`, `YYYY-MM`, `YYYY-MM-DD`, then optionally `T` or a space
/// followed by `HH`, `HH:MM`, `HH:MM:SS` and a fraction of up to nine
/// digits (truncated to microseconds), with an optional trailing `Z`.
pub fn parse_floor_partial_timestamp(text: &str) -> Option<i64> {
    let text = text.trim();
    let text = text.strip_suffix('Z').unwrap_or(text);
    let mut cursor = Cursor::new(text);

    let year = cursor.digits(4)? as i32;
    let mut month = 1;
    let mut day = 1;
    let mut hour = 0;
    let mut minute = 0;
    let mut second = 0;
    let mut micros = 0;

    if cursor.eat(b'-') {
        month = cursor.digits(2)?;
        if cursor.eat(b'-') {
            day = cursor.digits(2)?;
            if cursor.eat(b'T') || cursor.eat(b' ') {
                hour = cursor.digits(2)?;
                if cursor.eat(b':') {
                    minute = cursor.digits(2)?;
                    if cursor.eat(b':') {
                        second = cursor.digits(2)?;
                        if cursor.eat(b'.') {
                            micros = cursor.fraction_micros()?;
                        }
                    }
                }
            }
        }
    }

    if !cursor.is_done() {
        return None;
    }

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = NaiveTime::from_hms_micro_opt(hour, minute, second, micros)?;
    Some(NaiveDateTime::new(date, time).and_utc().timestamp_micros())
}

/// Date layouts accepted by [`parse_date`], tried in order.
const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a date in one of the supported layouts, returning milliseconds.
///
/// Accepts `YYYY-MM-DD`, and `YYYY-MM-DD[T ]HH:MM:SS[.fff]` with an
/// optional trailing `Z`.
pub fn parse_date(text: &str) -> Option<i64> {
    let text = text.trim();
    let text = text.strip_suffix('Z').unwrap_or(text);

    for format in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}

/// Render microseconds as `YYYY-MM-DDTHH:MM:SS.ffffffZ`.
pub fn format_timestamp(micros: i64) -> String {
    match DateTime::from_timestamp_micros(micros) {
        Some(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string(),
        None => micros.to_string(),
    }
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            bytes: text.as_bytes(),
            pos: 0,
        }
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.bytes.get(self.pos) == Some(&byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Exactly `count` ASCII digits.
    fn digits(&mut self, count: usize) -> Option<u32> {
        let end = self.pos.checked_add(count)?;
        let slice = self.bytes.get(self.pos..end)?;
        let mut value = 0u32;
        for b in slice {
            if !b.is_ascii_digit() {
                return None;
            }
            value = value * 10 + u32::from(b - b'0');
        }
        self.pos = end;
        Some(value)
    }

    /// One to nine digits of fractional seconds, as microseconds.
    fn fraction_micros(&mut self) -> Option<u32> {
        let start = self.pos;
        while self.bytes.get(self.pos).is_some_and(u8::is_ascii_digit) {
            self.pos += 1;
        }
        let len = self.pos - start;
        if len == 0 || len > 9 {
            return None;
        }
        let mut micros = 0u32;
        for i in 0..6 {
            let digit = if i < len {
                u32::from(self.bytes[start + i] - b'0')
            } else {
                0
            };
            micros = micros * 10 + digit;
        }
        Some(micros)
    }

    fn is_done(&self) -> bool {
        self.pos == self.bytes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY_MICROS: i64 = 86_400_000_000;

    #[test]
    fn partial_timestamps_floor() {
        assert_eq!(parse_floor_partial_timestamp("1970"), Some(0));
        assert_eq!(parse_floor_partial_timestamp("1970-01"), Some(0));
        assert_eq!(parse_floor_partial_timestamp("1970-01-02"), Some(DAY_MICROS));
        assert_eq!(
            parse_floor_partial_timestamp("1970-01-01T01"),
            Some(3_600_000_000)
        );
        assert_eq!(
            parse_floor_partial_timestamp("1970-01-01 00:00:01.5"),
            Some(1_500_000)
        );
        assert_eq!(
            parse_floor_partial_timestamp("1970-01-01T00:00:00.000001999Z"),
            Some(1)
        );
    }

    #[test]
    fn malformed_timestamps_fail() {
        assert_eq!(parse_floor_partial_timestamp(""), None);
        assert_eq!(parse_floor_partial_timestamp("abc"), None);
        assert_eq!(parse_floor_partial_timestamp("2024-13"), None);
        assert_eq!(parse_floor_partial_timestamp("2024-01-01T"), None);
        assert_eq!(parse_floor_partial_timestamp("2024-01-01x"), None);
    }

    #[test]
    fn dates_parse_to_millis() {
        assert_eq!(parse_date("1970-01-02"), Some(86_400_000));
        assert_eq!(parse_date("1970-01-01T00:00:01.250Z"), Some(1_250));
        assert_eq!(parse_date("1970-01-01 00:01:00"), Some(60_000));
        assert_eq!(parse_date("not a date"), None);
    }

    #[test]
    fn format_round_trips() {
        let micros = parse_floor_partial_timestamp("2024-03-05T10:20:30.123456").unwrap();
        assert_eq!(format_timestamp(micros), "2024-03-05T10:20:30.123456Z");
    }
}

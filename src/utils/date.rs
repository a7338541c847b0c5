//! UTC datetime utilities without timezone dependencies.
//!
//! Provides a lightweight `DateTimeUtc` struct for post timestamps.
//! Ordering is chronological, and `DateTimeUtc::UNSET` sorts before every
//! real date so undated posts sink to the end of a newest-first listing.
//!
//! # Examples
//!
//! ```ignore
//! let dt = DateTimeUtc::parse("2024-06-15").unwrap();
//! let dt = DateTimeUtc::parse("2024-06-15T14:30:45Z").unwrap();
//! assert_eq!(dt.to_rfc3339(), "2024-06-15T14:30:45Z");
//! ```

use anyhow::{Result, bail};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// UTC datetime without timezone complexity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateTimeUtc {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl DateTimeUtc {
    /// Sentinel for "no known date": `0001-01-01T00:00:00Z`.
    pub const UNSET: Self = Self::new(1, 1, 1, 0, 0, 0);

    pub const fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    pub const fn from_ymd(year: u16, month: u8, day: u8) -> Self {
        Self::new(year, month, day, 0, 0, 0)
    }

    /// Build a validated date from year, month and day.
    pub fn checked_ymd(year: u16, month: u8, day: u8) -> Option<Self> {
        let dt = Self::from_ymd(year, month, day);
        dt.validate().ok()?;
        Some(dt)
    }

    #[inline]
    pub fn is_unset(&self) -> bool {
        *self == Self::UNSET
    }

    /// Parse from one of:
    /// - `YYYY-MM-DD`
    /// - `YYYY-MM-DDTHH:MM:SS` (optional trailing `Z`)
    /// - `YYYY-MM-DD HH:MM[:SS]`
    pub fn parse(s: &str) -> Option<Self> {
        let bytes = s.trim().as_bytes();

        // Minimum: "YYYY-MM-DD" (10 chars)
        if bytes.len() < 10 {
            return None;
        }

        let year = parse_u16(&bytes[0..4])?;
        if bytes[4] != b'-' {
            return None;
        }
        let month = parse_u8(&bytes[5..7])?;
        if bytes[7] != b'-' {
            return None;
        }
        let day = parse_u8(&bytes[8..10])?;

        let (hour, minute, second) = if bytes.len() == 10 {
            (0, 0, 0)
        } else {
            parse_time(&bytes[10..])?
        };

        let dt = Self::new(year, month, day, hour, minute, second);
        dt.validate().ok()?;
        Some(dt)
    }

    #[allow(clippy::trivially_copy_pass_by_ref)] // Method style is more idiomatic
    pub fn validate(&self) -> Result<()> {
        let Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        } = *self;

        if year == 0 {
            bail!("year is invalid: {year}");
        }
        if !(1..=12).contains(&month) {
            bail!("month is invalid: {month}");
        }

        let max_days = Self::days_in_month(year, month);
        if day == 0 || day > max_days {
            bail!("day is invalid: {day}");
        }
        if hour > 23 {
            bail!("hour is invalid: {hour}");
        }
        if minute > 59 {
            bail!("minute is invalid: {minute}");
        }
        if second > 59 {
            bail!("second is invalid: {second}");
        }

        Ok(())
    }

    #[inline]
    #[allow(clippy::manual_is_multiple_of)] // Manual impl for const fn
    const fn is_leap_year(year: u16) -> bool {
        year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
    }

    #[inline]
    const fn days_in_month(year: u16, month: u8) -> u8 {
        match month {
            1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
            4 | 6 | 9 | 11 => 30,
            2 if Self::is_leap_year(year) => 29,
            2 => 28,
            _ => 0,
        }
    }

    /// Format as RFC 3339: `YYYY-MM-DDTHH:MM:SSZ`
    pub fn to_rfc3339(self) -> String {
        format!(
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }

    /// Format the date part only: `YYYY-MM-DD` (sitemap `<lastmod>`).
    pub fn to_date_string(self) -> String {
        format!("{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl Default for DateTimeUtc {
    fn default() -> Self {
        Self::UNSET
    }
}

impl fmt::Display for DateTimeUtc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

impl Serialize for DateTimeUtc {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for DateTimeUtc {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid date: {s}")))
    }
}

/// Parse the time suffix after the date: `THH:MM:SS[Z]` or ` HH:MM[:SS]`.
fn parse_time(bytes: &[u8]) -> Option<(u8, u8, u8)> {
    let (sep, rest) = bytes.split_first()?;
    if *sep != b'T' && *sep != b' ' {
        return None;
    }
    let rest = rest.strip_suffix(b"Z").unwrap_or(rest);

    match rest.len() {
        5 if rest[2] == b':' => Some((parse_u8(&rest[0..2])?, parse_u8(&rest[3..5])?, 0)),
        8 if rest[2] == b':' && rest[5] == b':' => Some((
            parse_u8(&rest[0..2])?,
            parse_u8(&rest[3..5])?,
            parse_u8(&rest[6..8])?,
        )),
        _ => None,
    }
}

/// Parse 2-digit ASCII number
#[inline]
fn parse_u8(bytes: &[u8]) -> Option<u8> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = bytes[0].wrapping_sub(b'0');
    let d2 = bytes[1].wrapping_sub(b'0');
    if d1 > 9 || d2 > 9 {
        return None;
    }
    Some(d1 * 10 + d2)
}

/// Parse 4-digit ASCII number
#[inline]
fn parse_u16(bytes: &[u8]) -> Option<u16> {
    if bytes.len() != 4 {
        return None;
    }
    let mut result = 0u16;
    for &b in bytes {
        let d = b.wrapping_sub(b'0');
        if d > 9 {
            return None;
        }
        result = result * 10 + u16::from(d);
    }
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_only() {
        let dt = DateTimeUtc::parse("2024-03-15").unwrap();
        assert_eq!(dt, DateTimeUtc::from_ymd(2024, 3, 15));
    }

    #[test]
    fn test_parse_with_time() {
        assert_eq!(
            DateTimeUtc::parse("2024-06-15T14:30:45Z"),
            Some(DateTimeUtc::new(2024, 6, 15, 14, 30, 45))
        );
        assert_eq!(
            DateTimeUtc::parse("2024-06-15T14:30:45"),
            Some(DateTimeUtc::new(2024, 6, 15, 14, 30, 45))
        );
        assert_eq!(
            DateTimeUtc::parse("2024-06-15 09:05"),
            Some(DateTimeUtc::new(2024, 6, 15, 9, 5, 0))
        );
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(DateTimeUtc::parse(""), None);
        assert_eq!(DateTimeUtc::parse("yesterday"), None);
        assert_eq!(DateTimeUtc::parse("2024/06/15"), None);
        assert_eq!(DateTimeUtc::parse("2024-13-01"), None);
        assert_eq!(DateTimeUtc::parse("2023-02-29"), None);
        assert_eq!(DateTimeUtc::parse("2024-06-15T25:00:00Z"), None);
        assert_eq!(DateTimeUtc::parse("2024-06-15Tnoon"), None);
    }

    #[test]
    fn test_validate_leap_year() {
        assert!(DateTimeUtc::new(2024, 2, 29, 12, 0, 0).validate().is_ok());
        assert!(DateTimeUtc::new(2000, 2, 29, 12, 0, 0).validate().is_ok());
        assert!(DateTimeUtc::new(2023, 2, 29, 12, 0, 0).validate().is_err());
        assert!(DateTimeUtc::new(1900, 2, 29, 12, 0, 0).validate().is_err());
    }

    #[test]
    fn test_unset_sorts_first() {
        let real = DateTimeUtc::from_ymd(1970, 1, 1);
        assert!(DateTimeUtc::UNSET < real);
        assert!(DateTimeUtc::UNSET.is_unset());
        assert!(!real.is_unset());
        assert_eq!(DateTimeUtc::default(), DateTimeUtc::UNSET);
    }

    #[test]
    fn test_serde_as_rfc3339() {
        let dt = DateTimeUtc::from_ymd(2023, 1, 1);
        let json = serde_json::to_string(&dt).unwrap();
        assert_eq!(json, "\"2023-01-01T00:00:00Z\"");
        let back: DateTimeUtc = serde_json::from_str(&json).unwrap();
        assert_eq!(back, dt);
    }

    #[test]
    fn test_date_string() {
        assert_eq!(
            DateTimeUtc::new(2024, 6, 5, 14, 30, 45).to_date_string(),
            "2024-06-05"
        );
    }
}

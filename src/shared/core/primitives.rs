// Small value types shared by every module: timezones, half-open time ranges
// and duration formatting.
//
// A timezone is an IANA zone such as `Europe/Amsterdam` or a fixed UTC
// offset. It is always passed explicitly to the code that needs it; nothing
// here reads ambient state.

use chrono::{
    DateTime, Datelike, FixedOffset, Months, NaiveDate, NaiveDateTime, NaiveTime, Offset,
    TimeDelta, TimeZone, Utc,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimezoneError {
    #[error("unrecognized timezone `{0}`, expected a name such as Europe/Amsterdam or an offset such as +02:00")]
    Unrecognized(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Zone {
    Named(Tz),
    Fixed(FixedOffset),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timezone(Zone);

impl Timezone {
    pub fn utc() -> Self {
        Self(Zone::Named(Tz::UTC))
    }

    pub fn named(zone: Tz) -> Self {
        Self(Zone::Named(zone))
    }

    /// The offset from UTC in force at `instant`.
    pub fn offset_at(&self, instant: DateTime<Utc>) -> FixedOffset {
        *self.localize(instant).offset()
    }

    pub fn now(&self) -> DateTime<FixedOffset> {
        self.localize(Utc::now())
    }

    pub fn localize(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
        match self.0 {
            Zone::Named(zone) => instant.with_timezone(&zone).fixed_offset(),
            Zone::Fixed(offset) => instant.with_timezone(&offset),
        }
    }

    /// Interpret a wall-clock date and time in this timezone. An ambiguous
    /// time resolves to its earlier instant; a time skipped by a transition
    /// is read with the offset in force before it, landing after the gap.
    pub fn make_aware(&self, date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
        let local = date.and_time(time);
        match self.0 {
            Zone::Named(zone) => zone
                .from_local_datetime(&local)
                .earliest()
                .map(|aware| aware.with_timezone(&Utc))
                .unwrap_or_else(|| {
                    let before = zone.offset_from_utc_datetime(&(local - TimeDelta::days(1)));
                    shift(local, before.fix())
                }),
            Zone::Fixed(offset) => shift(local, offset),
        }
    }

    /// The local calendar day `date` as a UTC range.
    pub fn day_range(&self, date: NaiveDate) -> TimeRange {
        let next = date + TimeDelta::days(1);
        TimeRange::new(
            self.make_aware(date, NaiveTime::MIN),
            self.make_aware(next, NaiveTime::MIN),
        )
    }

    /// The local calendar month containing `reference`, from the first moment
    /// of the month up to the first moment of the next one.
    pub fn month_range(&self, reference: DateTime<Utc>) -> TimeRange {
        let today = self.localize(reference).date_naive();
        let first = today - TimeDelta::days(i64::from(today.day0()));
        let next = first + Months::new(1);
        TimeRange::new(
            self.make_aware(first, NaiveTime::MIN),
            self.make_aware(next, NaiveTime::MIN),
        )
    }
}

fn shift(local: NaiveDateTime, offset: FixedOffset) -> DateTime<Utc> {
    (local - TimeDelta::seconds(i64::from(offset.local_minus_utc()))).and_utc()
}

impl Default for Timezone {
    fn default() -> Self {
        Self::utc()
    }
}

impl FromStr for Timezone {
    type Err = TimezoneError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let unrecognized = || TimezoneError::Unrecognized(value.to_string());

        if ["utc", "z", "gmt"].contains(&trimmed.to_ascii_lowercase().as_str()) {
            return Ok(Self::utc());
        }
        if let Ok(zone) = trimmed.parse::<Tz>() {
            return Ok(Self::named(zone));
        }

        let (sign, rest) = match trimmed.chars().next() {
            Some('+') => (1, &trimmed[1..]),
            Some('-') => (-1, &trimmed[1..]),
            _ => return Err(unrecognized()),
        };
        let digits: String = rest.chars().filter(|c| *c != ':').collect();
        if !matches!(digits.len(), 2 | 4) || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(unrecognized());
        }
        let hours: i32 = digits[..2].parse().map_err(|_| unrecognized())?;
        let minutes: i32 = match digits.get(2..) {
            Some("") | None => 0,
            Some(m) => m.parse().map_err(|_| unrecognized())?,
        };
        if hours > 23 || minutes > 59 {
            return Err(unrecognized());
        }

        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
            .map(|offset| Self(Zone::Fixed(offset)))
            .ok_or_else(unrecognized)
    }
}

impl TryFrom<String> for Timezone {
    type Error = TimezoneError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Timezone> for String {
    fn from(value: Timezone) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Timezone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Zone::Named(zone) => f.write_str(zone.name()),
            Zone::Fixed(offset) if offset.local_minus_utc() == 0 => f.write_str("UTC"),
            Zone::Fixed(offset) => write!(f, "{offset}"),
        }
    }
}

/// Half-open range `[start, end)` of instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// Render a duration as `H:MM:SS`.
pub fn format_duration(duration: TimeDelta) -> String {
    let total = duration.num_seconds();
    let sign = if total < 0 { "-" } else { "" };
    let total = total.abs();
    format!(
        "{sign}{}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

pub fn hours(duration: TimeDelta) -> f64 {
    (duration.num_seconds() as f64 + f64::from(duration.subsec_nanos()) / 1e9) / 3600.0
}

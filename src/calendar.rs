//! Calendar decomposition of timestamps.
use crate::{period::ValueType, utils, Error, Result};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike};

/// Formats tried in order by [`parse_timestamp`] after RFC 3339 and RFC 2822.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S UTC",
    "%Y-%m-%d %I:%M:%S %p",
    "%Y-%m-%d %I:%M:%S %p UTC",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%a %b %e %H:%M:%S %Y",
];

/// `ctime`-like format without the weekday, which is ignored if it disagrees with the date.
const CTIME_FORMAT: &str = "%b %e %H:%M:%S %Y";

/// Calendar fields of a timestamp, one per scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct CalendarFields {
    pub(crate) year: ValueType,
    pub(crate) month: ValueType,
    pub(crate) week: ValueType,
    pub(crate) year_day: ValueType,
    pub(crate) month_day: ValueType,
    pub(crate) week_day: ValueType,
    pub(crate) hour: ValueType,
    pub(crate) minute: ValueType,
    pub(crate) second: ValueType,
}

impl CalendarFields {
    pub(crate) fn new<T: Datelike + Timelike>(time: &T) -> Self {
        let month_day = time.day() as ValueType;
        let week_day = time.weekday().num_days_from_sunday() as ValueType;

        Self {
            // Years out of the representable range never match any year range anyway.
            year: time.year().clamp(0, ValueType::MAX as i32) as ValueType,
            month: time.month() as ValueType,
            week: utils::week_of_month(month_day, week_day),
            year_day: time.ordinal() as ValueType,
            month_day,
            week_day,
            hour: time.hour() as ValueType,
            minute: time.minute() as ValueType,
            second: time.second() as ValueType,
        }
    }
}

/// Best-effort parsing of a free-form timestamp, offset (if any) is dropped keeping the wall-clock time.
pub(crate) fn parse_timestamp(input: &str) -> Result<NaiveDateTime> {
    let input = input.trim();

    if let Ok(time) = DateTime::parse_from_rfc3339(input) {
        return Ok(time.naive_local());
    }
    if let Ok(time) = DateTime::parse_from_rfc2822(input) {
        return Ok(time.naive_local());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
        .or_else(|| {
            let (weekday, rest) = input.split_once(' ')?;
            weekday
                .chars()
                .all(|c| c.is_ascii_alphabetic())
                .then(|| NaiveDateTime::parse_from_str(rest.trim_start(), CTIME_FORMAT).ok())
                .flatten()
        })
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| Error::InvalidTimestamp(input.to_owned()))
}

//! Calendar-day arithmetic and the date formats used in URLs and pages.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

/// Format of the `?date=` query parameter
pub const DATE_PARAM_FORMAT: &str = "%Y-%m-%d";

lazy_static! {
    static ref DATE_PARAM_REGEX: Regex = Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").unwrap();
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateParamError {
    #[error("Invalid date '{0}', expected yyyy-MM-dd")]
    Malformed(String),
}

/// Resolve the `date` query parameter. Absent or empty means `today`; anything
/// else must be a real calendar date in `yyyy-MM-dd` form.
pub fn parse_date_param(param: Option<&str>, today: NaiveDate) -> Result<NaiveDate, DateParamError> {
    let raw = match param.map(str::trim) {
        None | Some("") => return Ok(today),
        Some(raw) => raw,
    };

    if !DATE_PARAM_REGEX.is_match(raw) {
        return Err(DateParamError::Malformed(raw.to_string()));
    }

    NaiveDate::parse_from_str(raw, DATE_PARAM_FORMAT)
        .map_err(|_| DateParamError::Malformed(raw.to_string()))
}

pub fn format_date_param(date: NaiveDate) -> String {
    date.format(DATE_PARAM_FORMAT).to_string()
}

/// First instant of `date` in `tz`.
///
/// Some zones skip local midnight on DST changes; the first local time of the
/// day that exists is used instead.
pub fn start_of_day<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    (0..=8)
        .find_map(|step| {
            tz.from_local_datetime(&(midnight + Duration::minutes(step * 15)))
                .earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| midnight.and_utc())
}

/// Half-open UTC range `[start_of_day, start_of_next_day)` covering `date` in `tz`
pub fn day_bounds<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = start_of_day(date, tz);
    let end = date
        .succ_opt()
        .map(|next| start_of_day(next, tz))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    (start, end)
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

/// Long display form, e.g. `15th Jan 2024`
pub fn format_long_date(date: NaiveDate) -> String {
    format!(
        "{}{} {}",
        date.day(),
        ordinal_suffix(date.day()),
        date.format("%b %Y")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Timelike};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_date_param_absent_or_empty_is_today() {
        let today = date(2024, 3, 9);
        assert_eq!(parse_date_param(None, today), Ok(today));
        assert_eq!(parse_date_param(Some(""), today), Ok(today));
        assert_eq!(parse_date_param(Some("  "), today), Ok(today));
    }

    #[test]
    fn test_parse_date_param_valid() {
        let today = date(2024, 3, 9);
        assert_eq!(parse_date_param(Some("2024-01-15"), today), Ok(date(2024, 1, 15)));
        assert_eq!(parse_date_param(Some("2024-02-29"), today), Ok(date(2024, 2, 29)));
    }

    #[test]
    fn test_parse_date_param_malformed() {
        let today = date(2024, 3, 9);
        assert!(parse_date_param(Some("15/01/2024"), today).is_err());
        assert!(parse_date_param(Some("2024-1-5"), today).is_err());
        assert!(parse_date_param(Some("2023-02-29"), today).is_err());
        assert!(parse_date_param(Some("2024-13-01"), today).is_err());
        assert!(parse_date_param(Some("yesterday"), today).is_err());
        assert_eq!(
            parse_date_param(Some("٢٠٢٤-٠١-١٥"), today),
            Err(DateParamError::Malformed("٢٠٢٤-٠١-١٥".to_string()))
        );
    }

    #[test]
    fn test_day_bounds_utc() {
        let (start, end) = day_bounds(date(2024, 1, 15), &Utc);
        assert_eq!(start.to_rfc3339(), "2024-01-15T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2024-01-16T00:00:00+00:00");
    }

    #[test]
    fn test_day_bounds_follow_offset() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let (start, end) = day_bounds(date(2024, 1, 15), &tz);
        assert_eq!(start.to_rfc3339(), "2024-01-14T22:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2024-01-15T22:00:00+00:00");
        assert_eq!((end - start).num_hours(), 24);
    }

    #[test]
    fn test_start_of_day_is_midnight() {
        let start = start_of_day(date(2024, 6, 1), &Utc);
        assert_eq!((start.hour(), start.minute(), start.second()), (0, 0, 0));
    }

    #[test]
    fn test_format_long_date() {
        assert_eq!(format_long_date(date(2024, 1, 1)), "1st Jan 2024");
        assert_eq!(format_long_date(date(2024, 1, 2)), "2nd Jan 2024");
        assert_eq!(format_long_date(date(2024, 1, 3)), "3rd Jan 2024");
        assert_eq!(format_long_date(date(2024, 1, 11)), "11th Jan 2024");
        assert_eq!(format_long_date(date(2024, 1, 12)), "12th Jan 2024");
        assert_eq!(format_long_date(date(2024, 1, 15)), "15th Jan 2024");
        assert_eq!(format_long_date(date(2024, 1, 22)), "22nd Jan 2024");
        assert_eq!(format_long_date(date(2024, 1, 31)), "31st Jan 2024");
    }

    #[test]
    fn test_format_date_param() {
        assert_eq!(format_date_param(date(2024, 1, 5)), "2024-01-05");
    }
}

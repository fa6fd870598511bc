use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDate, Utc};
use spendcast_core::calendar::Calendar;

/// Parses a command-line date.
///
/// Accepts `today`, `YYYY-MM-DD` (midnight in `calendar`) and RFC 3339
/// timestamps.
pub fn parse_date(input: &str, calendar: &Calendar) -> Result<DateTime<Utc>> {
    let input = input.trim();

    if input.eq_ignore_ascii_case("today") {
        let today = calendar.date_of(Utc::now());
        return calendar
            .start_of_day(today)
            .ok_or_else(|| anyhow!("Today has no midnight in {}", calendar.name()));
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return calendar
            .start_of_day(date)
            .ok_or_else(|| anyhow!("'{}' does not exist in {}", input, calendar.name()));
    }

    DateTime::parse_from_rfc3339(input)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| anyhow!("Failed to parse date '{}': expected YYYY-MM-DD or RFC 3339", input))
}

pub fn parse_optional_date(input: Option<&str>, calendar: &Calendar) -> Result<Option<DateTime<Utc>>> {
    input.map(|s| parse_date(s, calendar)).transpose()
}

/// Closes an open-ended `--from`/`--to` range. Missing ends become the first
/// and last four-digit years, which keeps stored dates comparable as text.
pub fn parse_range(
    from: Option<&str>,
    to: Option<&str>,
    calendar: &Calendar,
) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let start = parse_optional_date(from, calendar)?.unwrap_or_else(|| {
        NaiveDate::from_ymd_opt(1, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map_or(DateTime::<Utc>::MIN_UTC, |naive| naive.and_utc())
    });
    let end = parse_optional_date(to, calendar)?.unwrap_or_else(|| {
        NaiveDate::from_ymd_opt(9999, 12, 31)
            .and_then(|d| d.and_hms_opt(23, 59, 59))
            .map_or(DateTime::<Utc>::MAX_UTC, |naive| naive.and_utc())
    });
    if start > end {
        return Err(anyhow!("The range starts after it ends"));
    }
    Ok((start, end))
}

use crate::error::CoreError;
use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::str::FromStr;

/// Calendar used for every piece of date arithmetic in the recurrence engine.
///
/// Occurrences are always `DateTime<Utc>` instants. Arithmetic happens on the
/// wall-clock representation in `tz` and is mapped back to UTC, so "one month
/// later" keeps the local time of day even across a DST change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    tz: Tz,
}

impl Default for Calendar {
    fn default() -> Self {
        Self::utc()
    }
}

impl Calendar {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn utc() -> Self {
        Self::new(Tz::UTC)
    }

    /// Builds a calendar from an IANA zone name (e.g. "Europe/Lisbon").
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        Tz::from_str(name.trim())
            .map(Self::new)
            .map_err(|_| CoreError::InvalidTimezone(name.to_string()))
    }

    /// The caller's local calendar.
    ///
    /// Checks `TZ` first, then asks the operating system, and falls back to
    /// UTC. Only outer entry points should reach for this; everything inside
    /// the core takes the calendar as an explicit argument.
    pub fn local() -> Self {
        if let Ok(name) = std::env::var("TZ") {
            if let Ok(calendar) = Self::from_name(&name) {
                return calendar;
            }
        }

        if let Ok(name) = iana_time_zone::get_timezone() {
            if let Ok(calendar) = Self::from_name(&name) {
                return calendar;
            }
        }

        Self::utc()
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn name(&self) -> &'static str {
        self.tz.name()
    }

    fn local_naive(&self, dt: DateTime<Utc>) -> NaiveDateTime {
        dt.with_timezone(&self.tz).naive_local()
    }

    /// Maps a wall-clock time back to UTC.
    ///
    /// Ambiguous times (DST fall-back) take the earliest instant; times inside
    /// a DST gap move forward one hour.
    fn to_utc(&self, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
        if let Some(local) = self.tz.from_local_datetime(&naive).earliest() {
            return Some(local.with_timezone(&Utc));
        }
        let shifted = naive.checked_add_signed(chrono::Duration::hours(1))?;
        self.tz
            .from_local_datetime(&shifted)
            .earliest()
            .map(|local| local.with_timezone(&Utc))
    }

    /// Calendar date of `dt` in this calendar.
    pub fn date_of(&self, dt: DateTime<Utc>) -> NaiveDate {
        self.local_naive(dt).date()
    }

    pub fn day_of_month(&self, dt: DateTime<Utc>) -> u32 {
        self.local_naive(dt).day()
    }

    /// `(year, month)` of `dt` in this calendar.
    pub fn year_month(&self, dt: DateTime<Utc>) -> (i32, u32) {
        let date = self.date_of(dt);
        (date.year(), date.month())
    }

    /// Adds whole days, keeping the wall-clock time. `None` on overflow.
    pub fn add_days(&self, dt: DateTime<Utc>, days: i64) -> Option<DateTime<Utc>> {
        let naive = self.local_naive(dt);
        let magnitude = Days::new(days.unsigned_abs());
        let shifted = if days >= 0 {
            naive.checked_add_days(magnitude)?
        } else {
            naive.checked_sub_days(magnitude)?
        };
        self.to_utc(shifted)
    }

    /// Adds calendar months. The day of month is clamped to the last valid day
    /// of the target month, so Jan 31 + 1 month is Feb 28 (or 29).
    pub fn add_months(&self, dt: DateTime<Utc>, months: i32) -> Option<DateTime<Utc>> {
        let naive = self.local_naive(dt);
        let magnitude = Months::new(months.unsigned_abs());
        let shifted = if months >= 0 {
            naive.checked_add_months(magnitude)?
        } else {
            naive.checked_sub_months(magnitude)?
        };
        self.to_utc(shifted)
    }

    pub fn add_years(&self, dt: DateTime<Utc>, years: i32) -> Option<DateTime<Utc>> {
        self.add_months(dt, years.checked_mul(12)?)
    }

    /// Number of days in the given month, or `None` for an invalid month.
    pub fn days_in_month(&self, year: i32, month: u32) -> Option<u32> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next = first.checked_add_months(Months::new(1))?;
        u32::try_from(next.signed_duration_since(first).num_days()).ok()
    }

    /// Clamps `day` into `1..=last day of the month`.
    pub fn clamp_day(&self, year: i32, month: u32, day: u32) -> Option<u32> {
        let last = self.days_in_month(year, month)?;
        Some(day.clamp(1, last))
    }

    /// The instant on `day` (clamped) of the given month, at `anchor`'s
    /// wall-clock time of day.
    pub fn at_day_of_month(
        &self,
        anchor: DateTime<Utc>,
        year: i32,
        month: u32,
        day: u32,
    ) -> Option<DateTime<Utc>> {
        let day = self.clamp_day(year, month, day)?;
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        self.to_utc(date.and_time(self.local_naive(anchor).time()))
    }

    /// Signed count of whole days from `from` to `to`, truncated toward zero.
    pub fn whole_days_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
        self.local_naive(to)
            .signed_duration_since(self.local_naive(from))
            .num_days()
    }

    pub fn is_same_day(&self, a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
        self.date_of(a) == self.date_of(b)
    }

    /// Midnight of `date` in this calendar.
    pub fn start_of_day(&self, date: NaiveDate) -> Option<DateTime<Utc>> {
        self.to_utc(date.and_hms_opt(0, 0, 0)?)
    }
}

/// Month following `(year, month)`.
pub(crate) fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month >= 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

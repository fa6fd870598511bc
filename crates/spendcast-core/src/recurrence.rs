use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::calendar::{next_month, Calendar};

/// The fixed vocabulary of recurrence patterns the engine can expand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pattern {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Yearly,
    SemiMonthly,
}

impl Pattern {
    /// Matches a legacy keyword (trimmed, case-insensitive).
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.trim().to_ascii_lowercase().as_str() {
            "daily" => Some(Pattern::Daily),
            "weekly" => Some(Pattern::Weekly),
            "biweekly" => Some(Pattern::Biweekly),
            "monthly" => Some(Pattern::Monthly),
            "quarterly" => Some(Pattern::Quarterly),
            "yearly" => Some(Pattern::Yearly),
            "semimonthly" => Some(Pattern::SemiMonthly),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Pattern::Daily => "daily",
            Pattern::Weekly => "weekly",
            Pattern::Biweekly => "biweekly",
            Pattern::Monthly => "monthly",
            Pattern::Quarterly => "quarterly",
            Pattern::Yearly => "yearly",
            Pattern::SemiMonthly => "semimonthly",
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// RRULE `FREQ` values understood by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl FromStr for Frequency {
    type Err = ParseRecurrenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DAILY" => Ok(Frequency::Daily),
            "WEEKLY" => Ok(Frequency::Weekly),
            "MONTHLY" => Ok(Frequency::Monthly),
            "YEARLY" => Ok(Frequency::Yearly),
            _ => Err(ParseRecurrenceError::UnknownFrequency(s.trim().to_string())),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::Daily => write!(f, "DAILY"),
            Frequency::Weekly => write!(f, "WEEKLY"),
            Frequency::Monthly => write!(f, "MONTHLY"),
            Frequency::Yearly => write!(f, "YEARLY"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseRecurrenceError {
    #[error("Unknown recurrence keyword: '{0}'")]
    UnknownKeyword(String),
    #[error("Recurrence rule has no FREQ")]
    MissingFrequency,
    #[error("Unknown FREQ value: '{0}'")]
    UnknownFrequency(String),
    #[error("Invalid INTERVAL value: '{0}'")]
    InvalidInterval(String),
    #[error("Invalid BYDAY value: '{0}'")]
    InvalidWeekday(String),
    #[error("Invalid BYMONTHDAY value: '{0}'")]
    InvalidMonthDay(String),
    #[error("Malformed rule part: '{0}'")]
    Malformed(String),
}

/// A parsed RRULE-subset rule: `FREQ=..;INTERVAL=..;BYDAY=..;BYMONTHDAY=d1,d2`.
///
/// Parsing accepts more than the engine can expand (any interval, any number
/// of weekdays or month days) so the rule builder can round-trip what it
/// stored. [`Rule::pattern`] decides what is actually expandable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub frequency: Frequency,
    pub interval: u32,
    pub by_day: Vec<Weekday>,
    pub by_month_day: Vec<u32>,
}

impl Rule {
    pub fn new(frequency: Frequency) -> Self {
        Self {
            frequency,
            interval: 1,
            by_day: Vec::new(),
            by_month_day: Vec::new(),
        }
    }

    /// Maps the rule onto the fixed vocabulary, or `None` when the rule is a
    /// shape the engine does not expand.
    pub fn pattern(&self) -> Option<Pattern> {
        if self.by_day.len() > 1 {
            return None;
        }
        match (self.frequency, self.interval, self.by_month_day.len()) {
            (Frequency::Monthly, _, 2) => Some(Pattern::SemiMonthly),
            (_, _, n) if n != 0 => None,
            (Frequency::Daily, 1, _) => Some(Pattern::Daily),
            (Frequency::Weekly, 1, _) => Some(Pattern::Weekly),
            (Frequency::Weekly, 2, _) => Some(Pattern::Biweekly),
            (Frequency::Monthly, 1, _) => Some(Pattern::Monthly),
            (Frequency::Monthly, 3, _) => Some(Pattern::Quarterly),
            (Frequency::Yearly, _, _) => Some(Pattern::Yearly),
            _ => None,
        }
    }
}

fn parse_weekday(code: &str) -> Result<Weekday, ParseRecurrenceError> {
    match code.trim().to_ascii_uppercase().as_str() {
        "MO" => Ok(Weekday::Mon),
        "TU" => Ok(Weekday::Tue),
        "WE" => Ok(Weekday::Wed),
        "TH" => Ok(Weekday::Thu),
        "FR" => Ok(Weekday::Fri),
        "SA" => Ok(Weekday::Sat),
        "SU" => Ok(Weekday::Sun),
        _ => Err(ParseRecurrenceError::InvalidWeekday(code.trim().to_string())),
    }
}

fn weekday_code(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

impl FromStr for Rule {
    type Err = ParseRecurrenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let body = match trimmed.get(..6) {
            Some(prefix) if prefix.eq_ignore_ascii_case("RRULE:") => &trimmed[6..],
            _ => trimmed,
        };

        let mut frequency = None;
        let mut interval = 1;
        let mut by_day = Vec::new();
        let mut by_month_day = Vec::new();

        for part in body.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = part
                .split_once('=')
                .ok_or_else(|| ParseRecurrenceError::Malformed(part.to_string()))?;
            let value = value.trim();

            match key.trim().to_ascii_uppercase().as_str() {
                "FREQ" => frequency = Some(value.parse::<Frequency>()?),
                "INTERVAL" => {
                    interval = value
                        .parse::<u32>()
                        .ok()
                        .filter(|n| *n > 0)
                        .ok_or_else(|| ParseRecurrenceError::InvalidInterval(value.to_string()))?;
                }
                "BYDAY" => {
                    by_day = value
                        .split(',')
                        .map(parse_weekday)
                        .collect::<Result<Vec<_>, _>>()?;
                }
                "BYMONTHDAY" => {
                    by_month_day = value
                        .split(',')
                        .map(|d| {
                            d.trim()
                                .parse::<u32>()
                                .ok()
                                .filter(|n| (1..=31).contains(n))
                                .ok_or_else(|| ParseRecurrenceError::InvalidMonthDay(d.trim().to_string()))
                        })
                        .collect::<Result<Vec<_>, _>>()?;
                }
                other => {
                    tracing::debug!(key = other, "ignoring unsupported rule part");
                }
            }
        }

        let frequency = frequency.ok_or(ParseRecurrenceError::MissingFrequency)?;
        Ok(Self {
            frequency,
            interval,
            by_day,
            by_month_day,
        })
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FREQ={}", self.frequency)?;
        if self.interval != 1 {
            write!(f, ";INTERVAL={}", self.interval)?;
        }
        if !self.by_day.is_empty() {
            let codes: Vec<&str> = self.by_day.iter().map(|d| weekday_code(*d)).collect();
            write!(f, ";BYDAY={}", codes.join(","))?;
        }
        if !self.by_month_day.is_empty() {
            let days: Vec<String> = self.by_month_day.iter().map(u32::to_string).collect();
            write!(f, ";BYMONTHDAY={}", days.join(","))?;
        }
        Ok(())
    }
}

/// A recurrence description, parsed once at the boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recurrence {
    Keyword(Pattern),
    Rule(Rule),
}

impl Recurrence {
    pub fn pattern(&self) -> Option<Pattern> {
        match self {
            Recurrence::Keyword(pattern) => Some(*pattern),
            Recurrence::Rule(rule) => rule.pattern(),
        }
    }
}

impl FromStr for Recurrence {
    type Err = ParseRecurrenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.to_ascii_lowercase().contains("freq=") {
            return s.parse::<Rule>().map(Recurrence::Rule);
        }
        Pattern::from_keyword(s)
            .map(Recurrence::Keyword)
            .ok_or_else(|| ParseRecurrenceError::UnknownKeyword(s.trim().to_string()))
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recurrence::Keyword(pattern) => write!(f, "{}", pattern),
            Recurrence::Rule(rule) => write!(f, "{}", rule),
        }
    }
}

/// Closed date interval `[start, end]`; both ends are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpansionWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ExpansionWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Window used when materializing a series: from the base date through
    /// the explicit end date, or one calendar year after the base date.
    pub fn for_series(
        calendar: &Calendar,
        base: DateTime<Utc>,
        explicit_end: Option<DateTime<Utc>>,
    ) -> Self {
        let end = explicit_end
            .or_else(|| calendar.add_years(base, 1))
            .unwrap_or(base);
        Self::new(base, end)
    }

    #[inline]
    pub fn contains(&self, dt: DateTime<Utc>) -> bool {
        self.start <= dt && dt <= self.end
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }
}

/// Second day of month for the semi-monthly pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecondaryDay {
    Day(u32),
    /// Use the day of month of this date.
    FromDate(DateTime<Utc>),
}

impl SecondaryDay {
    /// An explicit day wins over a date.
    pub fn from_parts(day: Option<u32>, date: Option<DateTime<Utc>>) -> Option<Self> {
        day.map(SecondaryDay::Day)
            .or_else(|| date.map(SecondaryDay::FromDate))
    }
}

/// Expands recurrence descriptions into occurrence dates.
///
/// The resolver holds nothing but its calendar, so a single instance can be
/// shared freely across threads. Every call is a pure function of its
/// arguments: the result is sorted ascending, may contain the base date, and
/// is empty for anything the engine does not understand.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecurrenceResolver {
    calendar: Calendar,
}

impl RecurrenceResolver {
    pub fn new(calendar: Calendar) -> Self {
        Self { calendar }
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    /// Parses `description` and expands it over `window`.
    ///
    /// Strings containing `freq=` (any case) are read as rules, everything
    /// else as a keyword. Unparseable input yields no occurrences.
    pub fn resolve(
        &self,
        description: &str,
        base: DateTime<Utc>,
        window: &ExpansionWindow,
        secondary: Option<SecondaryDay>,
    ) -> Vec<DateTime<Utc>> {
        match description.parse::<Recurrence>() {
            Ok(recurrence) => self.resolve_recurrence(&recurrence, base, window, secondary),
            Err(error) => {
                tracing::debug!(description, %error, "unrecognized recurrence, no occurrences");
                Vec::new()
            }
        }
    }

    pub fn resolve_recurrence(
        &self,
        recurrence: &Recurrence,
        base: DateTime<Utc>,
        window: &ExpansionWindow,
        secondary: Option<SecondaryDay>,
    ) -> Vec<DateTime<Utc>> {
        if window.is_empty() {
            return Vec::new();
        }

        let Some(pattern) = recurrence.pattern() else {
            tracing::debug!(%recurrence, "unsupported rule shape, no occurrences");
            return Vec::new();
        };

        match pattern {
            Pattern::Daily => self.step_days(base, window, 1),
            Pattern::Weekly => self.step_days(base, window, 7),
            Pattern::Biweekly => self.step_days(base, window, 14),
            Pattern::Monthly => self.step_months(base, window, 1),
            Pattern::Quarterly => self.step_months(base, window, 3),
            Pattern::Yearly => self.step_months(base, window, 12),
            Pattern::SemiMonthly => {
                let secondary_day = self.secondary_day(base, secondary);
                self.semi_monthly(base, window, secondary_day)
            }
        }
    }

    /// Fixed day-count stepping. Jumps straight to the first step at or after
    /// the window start instead of walking day by day.
    fn step_days(&self, base: DateTime<Utc>, window: &ExpansionWindow, step: i64) -> Vec<DateTime<Utc>> {
        let mut index: i64 = 0;
        if window.start > base {
            let delta = self.calendar.whole_days_between(base, window.start).max(0);
            index = (delta + step - 1) / step;
        }

        let mut occurrences = Vec::new();
        loop {
            let Some(cursor) = index
                .checked_mul(step)
                .and_then(|days| self.calendar.add_days(base, days))
            else {
                break;
            };
            if cursor > window.end {
                break;
            }
            // Whole-day truncation can leave the first candidate short of the
            // window start when the base carries a later time of day.
            if cursor >= window.start {
                occurrences.push(cursor);
            }
            index += 1;
        }
        occurrences
    }

    /// Calendar-month stepping. Each step is taken from the previous
    /// occurrence, so month-end clamping carries forward.
    fn step_months(&self, base: DateTime<Utc>, window: &ExpansionWindow, months: i32) -> Vec<DateTime<Utc>> {
        let mut cursor = base;
        while cursor < window.start {
            match self.calendar.add_months(cursor, months) {
                Some(next) => cursor = next,
                None => return Vec::new(),
            }
        }

        let mut occurrences = Vec::new();
        while cursor <= window.end {
            occurrences.push(cursor);
            match self.calendar.add_months(cursor, months) {
                Some(next) => cursor = next,
                None => break,
            }
        }
        occurrences
    }

    /// The `BYMONTHDAY` pair of a rule only selects the semi-monthly shape;
    /// the second date always comes from here.
    fn secondary_day(&self, base: DateTime<Utc>, secondary: Option<SecondaryDay>) -> u32 {
        let day = match secondary {
            Some(SecondaryDay::Day(day)) => day,
            Some(SecondaryDay::FromDate(date)) => self.calendar.day_of_month(date),
            None if self.calendar.day_of_month(base) <= 15 => 30,
            None => 15,
        };
        day.clamp(1, 31)
    }

    /// Two dates per month: the base's day and the secondary day, each clamped
    /// to the month's length and kept only when inside the window and not
    /// before the base date.
    fn semi_monthly(
        &self,
        base: DateTime<Utc>,
        window: &ExpansionWindow,
        secondary_day: u32,
    ) -> Vec<DateTime<Utc>> {
        let base_day = self.calendar.day_of_month(base);
        let (mut year, mut month) = self.calendar.year_month(base.max(window.start));
        let last = self.calendar.year_month(window.end);

        let mut occurrences = Vec::new();
        while (year, month) <= last {
            for day in [base_day, secondary_day] {
                if let Some(candidate) = self.calendar.at_day_of_month(base, year, month, day) {
                    if window.contains(candidate) && candidate >= base {
                        occurrences.push(candidate);
                    }
                }
            }
            (year, month) = next_month(year, month);
        }

        occurrences.sort_unstable();
        occurrences.dedup();
        occurrences
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        at(y, m, d, 0)
    }

    fn resolver() -> RecurrenceResolver {
        RecurrenceResolver::new(Calendar::utc())
    }

    mod parsing_tests {
        use super::*;

        #[test]
        fn test_keywords_are_case_insensitive() {
            assert_eq!("Monthly".parse::<Recurrence>(), Ok(Recurrence::Keyword(Pattern::Monthly)));
            assert_eq!(" semimonthly ".parse::<Recurrence>(), Ok(Recurrence::Keyword(Pattern::SemiMonthly)));
            assert!(matches!(
                "fortnightly".parse::<Recurrence>(),
                Err(ParseRecurrenceError::UnknownKeyword(_))
            ));
        }

        #[test]
        fn test_rule_dispatch_on_freq_substring() {
            let parsed = "freq=weekly;interval=2".parse::<Recurrence>().unwrap();
            assert_eq!(parsed.pattern(), Some(Pattern::Biweekly));

            let parsed = "RRULE:FREQ=MONTHLY;INTERVAL=3".parse::<Recurrence>().unwrap();
            assert_eq!(parsed.pattern(), Some(Pattern::Quarterly));
        }

        #[test]
        fn test_rule_parts() {
            let rule: Rule = "FREQ=WEEKLY;BYDAY=FR".parse().unwrap();
            assert_eq!(rule.frequency, Frequency::Weekly);
            assert_eq!(rule.interval, 1);
            assert_eq!(rule.by_day, vec![Weekday::Fri]);
            assert_eq!(rule.pattern(), Some(Pattern::Weekly));

            let rule: Rule = "FREQ=MONTHLY;BYMONTHDAY=1,15".parse().unwrap();
            assert_eq!(rule.by_month_day, vec![1, 15]);
            assert_eq!(rule.pattern(), Some(Pattern::SemiMonthly));
        }

        #[test]
        fn test_rule_errors() {
            assert_eq!("INTERVAL=2".parse::<Rule>(), Err(ParseRecurrenceError::MissingFrequency));
            assert!(matches!("FREQ=HOURLY".parse::<Rule>(), Err(ParseRecurrenceError::UnknownFrequency(_))));
            assert!(matches!("FREQ=DAILY;INTERVAL=0".parse::<Rule>(), Err(ParseRecurrenceError::InvalidInterval(_))));
            assert!(matches!("FREQ=WEEKLY;BYDAY=1MO".parse::<Rule>(), Err(ParseRecurrenceError::InvalidWeekday(_))));
            assert!(matches!("FREQ=MONTHLY;BYMONTHDAY=0,32".parse::<Rule>(), Err(ParseRecurrenceError::InvalidMonthDay(_))));
            assert!(matches!("FREQ=DAILY;garbage".parse::<Rule>(), Err(ParseRecurrenceError::Malformed(_))));
        }

        #[test]
        fn test_unsupported_shapes_have_no_pattern() {
            for raw in [
                "FREQ=WEEKLY;INTERVAL=3",
                "FREQ=DAILY;INTERVAL=2",
                "FREQ=MONTHLY;INTERVAL=2",
                "FREQ=MONTHLY;BYMONTHDAY=15",
                "FREQ=MONTHLY;BYMONTHDAY=1,10,20",
                "FREQ=WEEKLY;BYDAY=MO,WE",
                "FREQ=WEEKLY;BYMONTHDAY=1,15",
            ] {
                let rule: Rule = raw.parse().unwrap();
                assert_eq!(rule.pattern(), None, "{raw}");
            }
        }

        #[test]
        fn test_rule_display_is_canonical() {
            let rule: Rule = "rrule:freq=monthly; bymonthday=5,20 ;interval=1".parse().unwrap();
            assert_eq!(rule.to_string(), "FREQ=MONTHLY;BYMONTHDAY=5,20");

            let rule: Rule = "FREQ=WEEKLY;INTERVAL=2;BYDAY=MO".parse().unwrap();
            assert_eq!(rule.to_string(), "FREQ=WEEKLY;INTERVAL=2;BYDAY=MO");
        }
    }

    mod resolver_tests {
        use super::*;

        #[test]
        fn test_monthly_inclusive_through_end() {
            let base = at(2025, 9, 1, 12);
            let window = ExpansionWindow::new(at(2025, 9, 1, 12), at(2025, 11, 1, 12));
            let expected = vec![at(2025, 9, 1, 12), at(2025, 10, 1, 12), at(2025, 11, 1, 12)];

            assert_eq!(resolver().resolve("monthly", base, &window, None), expected);
            assert_eq!(resolver().resolve("FREQ=MONTHLY", base, &window, None), expected);
        }

        #[test]
        fn test_quarterly_rule() {
            let window = ExpansionWindow::new(day(2025, 9, 1), day(2026, 10, 1));
            let result = resolver().resolve("FREQ=MONTHLY;INTERVAL=3", day(2025, 9, 1), &window, None);
            assert_eq!(
                result,
                vec![day(2025, 9, 1), day(2025, 12, 1), day(2026, 3, 1), day(2026, 6, 1), day(2026, 9, 1)]
            );
            assert_eq!(resolver().resolve("quarterly", day(2025, 9, 1), &window, None), result);
        }

        #[test]
        fn test_yearly_rule() {
            let window = ExpansionWindow::new(day(2025, 9, 1), day(2026, 10, 1));
            let result = resolver().resolve("FREQ=YEARLY", day(2025, 9, 1), &window, None);
            assert_eq!(result, vec![day(2025, 9, 1), day(2026, 9, 1)]);
        }

        #[test]
        fn test_daily_inclusive_count() {
            let base = day(2025, 9, 1);
            let window = ExpansionWindow::new(base, day(2025, 9, 30));
            let result = resolver().resolve("daily", base, &window, None);
            assert_eq!(result.len(), 30);
            assert_eq!(result.first(), Some(&base));
            assert_eq!(result.last(), Some(&day(2025, 9, 30)));
        }

        #[test]
        fn test_daily_excludes_last_day_when_base_has_later_time() {
            // The window end is midnight, the base carries 12:00: the
            // occurrence on Sep 30 at 12:00 falls after the end and is dropped.
            let base = at(2025, 9, 1, 12);
            let window = ExpansionWindow::new(base, day(2025, 9, 30));
            let result = resolver().resolve("daily", base, &window, None);
            assert_eq!(result.len(), 29);
            assert_eq!(result.last(), Some(&at(2025, 9, 29, 12)));
        }

        #[test]
        fn test_daily_aligns_past_truncated_day_delta() {
            let base = at(2025, 9, 1, 12);
            let window = ExpansionWindow::new(at(2025, 9, 3, 8), at(2025, 9, 5, 23));
            let result = resolver().resolve("daily", base, &window, None);
            assert_eq!(result, vec![at(2025, 9, 3, 12), at(2025, 9, 4, 12), at(2025, 9, 5, 12)]);
        }

        #[test]
        fn test_weekly_and_biweekly_alignment() {
            let base = day(2025, 9, 1);
            let window = ExpansionWindow::new(day(2025, 10, 1), day(2025, 10, 31));

            let weekly = resolver().resolve("weekly", base, &window, None);
            assert_eq!(
                weekly,
                vec![day(2025, 10, 6), day(2025, 10, 13), day(2025, 10, 20), day(2025, 10, 27)]
            );

            let biweekly = resolver().resolve("FREQ=WEEKLY;INTERVAL=2;BYDAY=MO", base, &window, None);
            assert_eq!(biweekly, vec![day(2025, 10, 13), day(2025, 10, 27)]);
        }

        #[test]
        fn test_window_start_on_step_is_included() {
            let base = day(2025, 9, 1);
            let window = ExpansionWindow::new(day(2025, 9, 15), day(2025, 9, 20));
            let result = resolver().resolve("biweekly", base, &window, None);
            assert_eq!(result, vec![day(2025, 9, 15)]);
        }

        #[test]
        fn test_monthly_from_later_window() {
            let window = ExpansionWindow::new(day(2025, 6, 1), day(2025, 8, 31));
            let result = resolver().resolve("monthly", day(2025, 1, 15), &window, None);
            assert_eq!(result, vec![day(2025, 6, 15), day(2025, 7, 15), day(2025, 8, 15)]);
        }

        #[test]
        fn test_monthly_clamps_and_carries_month_end() {
            let base = day(2025, 1, 31);
            let window = ExpansionWindow::new(base, day(2025, 4, 30));
            let result = resolver().resolve("monthly", base, &window, None);
            assert_eq!(result, vec![day(2025, 1, 31), day(2025, 2, 28), day(2025, 3, 28), day(2025, 4, 28)]);
        }

        #[test]
        fn test_yearly_rule_ignores_interval() {
            let window = ExpansionWindow::new(day(2025, 9, 1), day(2026, 10, 1));
            let result = resolver().resolve("FREQ=YEARLY;INTERVAL=2", day(2025, 9, 1), &window, None);
            assert_eq!(result, vec![day(2025, 9, 1), day(2026, 9, 1)]);
        }

        #[test]
        fn test_yearly_from_leap_day() {
            let base = day(2024, 2, 29);
            let window = ExpansionWindow::new(base, day(2026, 12, 31));
            let result = resolver().resolve("yearly", base, &window, None);
            assert_eq!(result, vec![day(2024, 2, 29), day(2025, 2, 28), day(2026, 2, 28)]);
        }

        #[test]
        fn test_semimonthly_contains_both_anchors() {
            let base = day(2025, 9, 5);
            let window = ExpansionWindow::new(day(2025, 9, 1), day(2025, 9, 30));
            let result = resolver().resolve("semimonthly", base, &window, Some(SecondaryDay::Day(20)));
            assert_eq!(result, vec![day(2025, 9, 5), day(2025, 9, 20)]);
        }

        #[test]
        fn test_semimonthly_sorts_when_secondary_precedes_base_day() {
            let base = day(2025, 9, 20);
            let window = ExpansionWindow::new(day(2025, 9, 1), day(2025, 10, 31));
            let result = resolver().resolve("semimonthly", base, &window, Some(SecondaryDay::Day(5)));
            assert_eq!(result, vec![day(2025, 9, 20), day(2025, 10, 5), day(2025, 10, 20)]);
        }

        #[test]
        fn test_semimonthly_inferred_secondary_day() {
            // Base day <= 15 pairs with the 30th, clamped in February.
            let window = ExpansionWindow::new(day(2025, 1, 10), day(2025, 2, 28));
            let result = resolver().resolve("semimonthly", day(2025, 1, 10), &window, None);
            assert_eq!(
                result,
                vec![day(2025, 1, 10), day(2025, 1, 30), day(2025, 2, 10), day(2025, 2, 28)]
            );

            // Base day > 15 pairs with the 15th.
            let window = ExpansionWindow::new(day(2025, 1, 20), day(2025, 2, 28));
            let result = resolver().resolve("semimonthly", day(2025, 1, 20), &window, None);
            assert_eq!(result, vec![day(2025, 1, 20), day(2025, 2, 15), day(2025, 2, 20)]);
        }

        #[test]
        fn test_semimonthly_secondary_from_date() {
            let window = ExpansionWindow::new(day(2025, 3, 1), day(2025, 3, 31));
            let secondary = SecondaryDay::from_parts(None, Some(at(2024, 7, 25, 18)));
            let result = resolver().resolve("semimonthly", day(2025, 3, 1), &window, secondary);
            assert_eq!(result, vec![day(2025, 3, 1), day(2025, 3, 25)]);
        }

        #[test]
        fn test_semimonthly_rule_infers_secondary_like_keyword() {
            // Base day 5 is not in the BYMONTHDAY list; the pair only picks
            // the shape, so the dates match the keyword form.
            let base = day(2025, 9, 5);
            let window = ExpansionWindow::new(day(2025, 9, 1), day(2025, 10, 31));
            let result = resolver().resolve("FREQ=MONTHLY;BYMONTHDAY=1,15", base, &window, None);
            assert_eq!(
                result,
                vec![day(2025, 9, 5), day(2025, 9, 30), day(2025, 10, 5), day(2025, 10, 30)]
            );
            assert_eq!(resolver().resolve("semimonthly", base, &window, None), result);

            let base = day(2025, 1, 20);
            let window = ExpansionWindow::new(base, day(2025, 2, 28));
            let result = resolver().resolve("RRULE:FREQ=MONTHLY;BYMONTHDAY=1,15", base, &window, None);
            assert_eq!(result, vec![day(2025, 1, 20), day(2025, 2, 15), day(2025, 2, 20)]);
        }

        #[test]
        fn test_semimonthly_rule_takes_explicit_secondary_day() {
            let base = day(2025, 9, 5);
            let window = ExpansionWindow::new(day(2025, 9, 1), day(2025, 9, 30));
            let result =
                resolver().resolve("FREQ=MONTHLY;BYMONTHDAY=1,15", base, &window, Some(SecondaryDay::Day(20)));
            assert_eq!(result, vec![day(2025, 9, 5), day(2025, 9, 20)]);
        }

        #[test]
        fn test_semimonthly_collapses_same_clamped_day() {
            let base = day(2025, 1, 30);
            let window = ExpansionWindow::new(base, day(2025, 2, 28));
            let result = resolver().resolve("semimonthly", base, &window, Some(SecondaryDay::Day(31)));
            assert_eq!(result, vec![day(2025, 1, 30), day(2025, 1, 31), day(2025, 2, 28)]);
        }

        #[test]
        fn test_semimonthly_keeps_base_time_of_day() {
            let base = at(2025, 9, 5, 9);
            let window = ExpansionWindow::new(day(2025, 9, 1), day(2025, 9, 30));
            let result = resolver().resolve("semimonthly", base, &window, Some(SecondaryDay::Day(20)));
            assert_eq!(result, vec![at(2025, 9, 5, 9), at(2025, 9, 20, 9)]);
        }

        #[test]
        fn test_unknown_patterns_resolve_to_empty() {
            let base = day(2025, 9, 1);
            let window = ExpansionWindow::new(base, day(2026, 9, 1));
            for raw in ["", "fortnightly", "every other tuesday", "FREQ=HOURLY", "FREQ=WEEKLY;INTERVAL=3", "FREQ=MONTHLY;BYMONTHDAY=15"] {
                assert!(resolver().resolve(raw, base, &window, None).is_empty(), "{raw}");
            }
        }

        #[test]
        fn test_inverted_window_is_empty() {
            let window = ExpansionWindow::new(day(2025, 9, 30), day(2025, 9, 1));
            assert!(resolver().resolve("daily", day(2025, 9, 1), &window, None).is_empty());
        }

        #[test]
        fn test_window_before_base_is_empty() {
            let window = ExpansionWindow::new(day(2025, 1, 1), day(2025, 3, 1));
            assert!(resolver().resolve("monthly", day(2025, 6, 1), &window, None).is_empty());
            assert!(resolver().resolve("daily", day(2025, 6, 1), &window, None).is_empty());
            assert!(resolver().resolve("semimonthly", day(2025, 6, 1), &window, None).is_empty());
        }

        #[test]
        fn test_resolution_follows_calendar_wall_clock() {
            let calendar = Calendar::from_name("America/New_York").unwrap();
            let resolver = RecurrenceResolver::new(calendar);
            // 09:00 EST on 2025-03-01; after the DST switch 09:00 is EDT.
            let base = at(2025, 3, 1, 14);
            let window = ExpansionWindow::new(base, at(2025, 4, 30, 0));
            let result = resolver.resolve("monthly", base, &window, None);
            assert_eq!(result, vec![at(2025, 3, 1, 14), at(2025, 4, 1, 13)]);
        }
    }

    #[test]
    fn test_for_series_window_defaults_to_one_year() {
        let calendar = Calendar::utc();
        let window = ExpansionWindow::for_series(&calendar, day(2024, 2, 29), None);
        assert_eq!(window.end, day(2025, 2, 28));

        let window = ExpansionWindow::for_series(&calendar, day(2025, 1, 1), Some(day(2025, 6, 30)));
        assert_eq!(window, ExpansionWindow::new(day(2025, 1, 1), day(2025, 6, 30)));
    }
}

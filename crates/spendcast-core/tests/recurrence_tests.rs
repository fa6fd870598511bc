use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use rstest::rstest;
use spendcast_core::calendar::Calendar;
use spendcast_core::recurrence::{ExpansionWindow, RecurrenceResolver, SecondaryDay};

fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

fn resolver() -> RecurrenceResolver {
    RecurrenceResolver::new(Calendar::utc())
}

#[rstest]
#[case::monthly_keyword("monthly", at(2025, 11, 1, 12), vec![at(2025, 9, 1, 12), at(2025, 10, 1, 12), at(2025, 11, 1, 12)])]
#[case::monthly_rule("FREQ=MONTHLY", at(2025, 11, 1, 12), vec![at(2025, 9, 1, 12), at(2025, 10, 1, 12), at(2025, 11, 1, 12)])]
#[case::quarterly_rule(
    "FREQ=MONTHLY;INTERVAL=3",
    at(2026, 10, 1, 12),
    vec![at(2025, 9, 1, 12), at(2025, 12, 1, 12), at(2026, 3, 1, 12), at(2026, 6, 1, 12), at(2026, 9, 1, 12)]
)]
#[case::quarterly_keyword(
    "Quarterly",
    at(2026, 10, 1, 12),
    vec![at(2025, 9, 1, 12), at(2025, 12, 1, 12), at(2026, 3, 1, 12), at(2026, 6, 1, 12), at(2026, 9, 1, 12)]
)]
#[case::yearly_rule("FREQ=YEARLY", at(2026, 10, 1, 12), vec![at(2025, 9, 1, 12), at(2026, 9, 1, 12)])]
#[case::biweekly_rule(
    "RRULE:FREQ=WEEKLY;INTERVAL=2",
    at(2025, 10, 1, 12),
    vec![at(2025, 9, 1, 12), at(2025, 9, 15, 12), at(2025, 9, 29, 12)]
)]
fn test_patterns_from_first_of_september(
    #[case] description: &str,
    #[case] end: DateTime<Utc>,
    #[case] expected: Vec<DateTime<Utc>>,
) {
    let base = at(2025, 9, 1, 12);
    let window = ExpansionWindow::new(base, end);
    assert_eq!(resolver().resolve(description, base, &window, None), expected);
}

#[rstest]
#[case::unknown_keyword("fortnightly")]
#[case::empty("")]
#[case::rule_without_freq("INTERVAL=2;BYDAY=MO")]
#[case::hourly("FREQ=HOURLY")]
#[case::daily_interval("FREQ=DAILY;INTERVAL=2")]
#[case::multiple_weekdays("FREQ=WEEKLY;BYDAY=MO,WE")]
#[case::three_month_days("FREQ=MONTHLY;BYMONTHDAY=1,10,20")]
#[case::garbage_interval("FREQ=WEEKLY;INTERVAL=often")]
fn test_unrecognized_descriptions_resolve_to_nothing(#[case] description: &str) {
    let base = at(2025, 9, 1, 0);
    let window = ExpansionWindow::new(base, at(2026, 9, 1, 0));
    assert!(resolver().resolve(description, base, &window, None).is_empty());
}

#[rstest]
#[case::explicit_day(Some(SecondaryDay::Day(20)), 20)]
#[case::from_date(Some(SecondaryDay::FromDate(at(2024, 2, 20, 0))), 20)]
#[case::inferred_from_early_base(None, 30)]
fn test_semimonthly_secondary_day_sources(#[case] secondary: Option<SecondaryDay>, #[case] expected_day: u32) {
    let base = at(2025, 9, 5, 0);
    let window = ExpansionWindow::new(at(2025, 9, 1, 0), at(2025, 9, 30, 0));
    let dates = resolver().resolve("semimonthly", base, &window, secondary);
    assert_eq!(dates, vec![at(2025, 9, 5, 0), at(2025, 9, expected_day, 0)]);
}

#[rstest]
#[case::early_base(at(2025, 9, 5, 0), vec![at(2025, 9, 5, 0), at(2025, 9, 30, 0)])]
#[case::late_base(at(2025, 8, 20, 0), vec![at(2025, 9, 15, 0), at(2025, 9, 20, 0)])]
fn test_semimonthly_rule_matches_keyword_when_base_is_off_the_pair(
    #[case] base: DateTime<Utc>,
    #[case] expected: Vec<DateTime<Utc>>,
) {
    let window = ExpansionWindow::new(at(2025, 9, 1, 0), at(2025, 9, 30, 0));
    let rule = resolver().resolve("FREQ=MONTHLY;BYMONTHDAY=1,15", base, &window, None);
    assert_eq!(rule, expected);
    assert_eq!(resolver().resolve("semimonthly", base, &window, None), rule);
}

#[test]
fn test_daily_inclusive_count() {
    let base = at(2025, 9, 1, 0);
    let window = ExpansionWindow::new(base, at(2025, 9, 30, 0));
    let dates = resolver().resolve("daily", base, &window, None);
    assert_eq!(dates.len(), 30);
    assert_eq!(dates.first(), Some(&base));
    assert_eq!(dates.last(), Some(&window.end));
}

fn description_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "daily",
        "weekly",
        "biweekly",
        "monthly",
        "quarterly",
        "yearly",
        "semimonthly",
        "FREQ=DAILY",
        "FREQ=WEEKLY;INTERVAL=2",
        "FREQ=MONTHLY;BYMONTHDAY=1,15",
        "FREQ=MONTHLY;INTERVAL=3",
        "FREQ=YEARLY",
    ])
}

fn instant_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    // 2000-01-01 .. 2040-01-01, minute resolution
    (0i64..21_038_400).prop_map(|minutes| at(2000, 1, 1, 0) + Duration::minutes(minutes))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_resolution_is_deterministic(
        description in description_strategy(),
        base in instant_strategy(),
        offset_days in 0i64..400,
        span_days in 0i64..400,
        secondary in prop::option::of(1u32..=31),
    ) {
        let start = base + Duration::days(offset_days);
        let window = ExpansionWindow::new(start, start + Duration::days(span_days));
        let secondary = secondary.map(SecondaryDay::Day);

        let first = resolver().resolve(description, base, &window, secondary);
        let second = resolver().resolve(description, base, &window, secondary);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_output_is_sorted_and_inside_window(
        description in description_strategy(),
        base in instant_strategy(),
        offset_days in -60i64..400,
        span_days in 0i64..400,
        secondary in prop::option::of(1u32..=31),
    ) {
        let start = base + Duration::days(offset_days);
        let window = ExpansionWindow::new(start, start + Duration::days(span_days));
        let dates = resolver().resolve(description, base, &window, secondary.map(SecondaryDay::Day));

        prop_assert!(dates.windows(2).all(|pair| pair[0] < pair[1]));
        prop_assert!(dates.iter().all(|d| window.contains(*d)));
        prop_assert!(dates.iter().all(|d| *d >= base));
    }

    #[test]
    fn prop_day_stepping_lands_on_step_multiples(
        base in instant_strategy(),
        offset_days in 0i64..800,
        span_days in 0i64..120,
    ) {
        let start = base + Duration::days(offset_days);
        let window = ExpansionWindow::new(start, start + Duration::days(span_days));

        for (keyword, step) in [("daily", 1i64), ("weekly", 7), ("biweekly", 14)] {
            for date in resolver().resolve(keyword, base, &window, None) {
                prop_assert_eq!((date - base).num_days() % step, 0);
                prop_assert_eq!(date.time(), base.time());
            }
        }
    }
}

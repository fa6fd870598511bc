pub mod expense;
pub mod income;
pub mod preview;
pub mod project;

use chrono::{DateTime, Utc};
use owo_colors::OwoColorize;
use spendcast_core::calendar::Calendar;
use spendcast_core::error::CoreError;
use spendcast_core::recurrence::Recurrence;
use spendcast_core::regeneration::RegenerationSummary;

use crate::cli::EditRecurrenceArgs;
use crate::parser::parse_date;

/// Parses a recurrence the way the resolver will, so the user hears about
/// a typo instead of silently getting no occurrences.
pub fn check_recurrence(description: &str) -> Result<Recurrence, CoreError> {
    let recurrence = description
        .parse::<Recurrence>()
        .map_err(|e| CoreError::InvalidRecurrence(format!("'{}': {}", description, e)))?;
    if recurrence.pattern().is_none() {
        return Err(CoreError::InvalidRecurrence(format!(
            "'{}' is not a supported recurrence shape",
            description
        )));
    }
    Ok(recurrence)
}

/// Warns when a recurrence about to be saved will never produce occurrences.
pub fn warn_unresolvable(description: Option<&str>) {
    if let Some(Err(e)) = description.map(check_recurrence) {
        eprintln!(
            "{} {}; it is saved as-is but will not generate occurrences",
            "Warning:".yellow().bold(),
            e
        );
    }
}

/// The `--until` / `--until-clear` pair of an edit.
pub fn edited_until(args: &EditRecurrenceArgs, calendar: &Calendar) -> anyhow::Result<Option<Option<DateTime<Utc>>>> {
    if args.until_clear {
        return Ok(Some(None));
    }
    args.until
        .as_deref()
        .map(|until| parse_date(until, calendar).map(Some))
        .transpose()
}

pub fn print_regeneration(summary: Option<RegenerationSummary>) {
    if let Some(summary) = summary {
        println!(
            "  {} Series rebuilt: removed {}, created {}",
            "→".blue(),
            summary.removed,
            summary.created
        );
    }
}

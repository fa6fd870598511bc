use anyhow::Result;
use spendcast_core::recurrence::{ExpansionWindow, RecurrenceResolver, SecondaryDay};

use crate::cli::PreviewCommand;
use crate::commands::check_recurrence;
use crate::parser::{parse_date, parse_optional_date};
use crate::views::table::display_occurrences;

pub fn preview(resolver: &RecurrenceResolver, command: PreviewCommand) -> Result<()> {
    let calendar = resolver.calendar();
    let recurrence = check_recurrence(&command.recurrence)?;
    let base = parse_date(&command.base, calendar)?;
    let end = parse_optional_date(command.end.as_deref(), calendar)?;

    let window = ExpansionWindow::for_series(calendar, base, end);
    let secondary = command.secondary_day.map(SecondaryDay::Day);
    let dates = resolver.resolve_recurrence(&recurrence, base, &window, secondary);

    if command.json {
        println!("{}", serde_json::to_string_pretty(&dates)?);
    } else {
        display_occurrences(&dates, calendar);
    }

    Ok(())
}

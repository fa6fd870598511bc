use anyhow::{anyhow, Result};
use spendcast_core::projection::project;
use spendcast_core::recurrence::ExpansionWindow;
use spendcast_core::repository::Repository;

use crate::cli::ProjectCommand;
use crate::config::Config;
use crate::parser::{parse_date, parse_optional_date};
use crate::views::table::display_projection;

pub async fn project_command(repo: &impl Repository, config: &Config, command: ProjectCommand) -> Result<()> {
    let resolver = repo.regenerator().resolver();
    let calendar = resolver.calendar();

    let start = parse_date(command.from.as_deref().unwrap_or("today"), calendar)?;
    let end = match parse_optional_date(command.to.as_deref(), calendar)? {
        Some(end) => end,
        None => {
            let months = i32::try_from(config.default_horizon_months)?;
            calendar
                .add_months(start, months)
                .ok_or_else(|| anyhow!("Projection horizon of {} months is out of range", months))?
        }
    };
    if start > end {
        return Err(anyhow!("The projection starts after it ends"));
    }

    let incomes = repo.find_incomes().await?;
    let expenses = repo.find_expenses().await?;
    let projection = project(resolver, &incomes, &expenses, ExpansionWindow::new(start, end));
    tracing::debug!(occurrences = projection.totals.count, "projection computed");

    if command.json {
        println!("{}", serde_json::to_string_pretty(&projection)?);
    } else {
        display_projection(&projection, calendar);
    }
    Ok(())
}

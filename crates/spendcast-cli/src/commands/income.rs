use anyhow::Result;
use dialoguer::Confirm;
use owo_colors::{OwoColorize, Style};
use spendcast_core::calendar::Calendar;
use spendcast_core::error::CoreError;
use spendcast_core::models::{Income, NewIncomeData, RecordKind, UpdateIncomeData};
use spendcast_core::repository::Repository;

use crate::cli::{
    AddIncomeCommand, DeleteCommand, EditIncomeCommand, IncomeCommand, IncomeSubcommand, ListCommand, RegenCommand,
};
use crate::commands::{edited_until, print_regeneration, warn_unresolvable};
use crate::parser::{parse_date, parse_optional_date, parse_range};
use crate::util::resolve_income_id;
use crate::views::table::{display_records, ViewRecord};

pub async fn income_command(repo: &impl Repository, calendar: &Calendar, command: IncomeCommand) -> Result<()> {
    match command.command {
        IncomeSubcommand::Add(command) => add_income(repo, calendar, command).await,
        IncomeSubcommand::Edit(command) => edit_income(repo, calendar, command).await,
        IncomeSubcommand::List(command) => list_incomes(repo, calendar, command).await,
        IncomeSubcommand::Regen(command) => regenerate_income(repo, command).await,
        IncomeSubcommand::Delete(command) => delete_income(repo, command).await,
    }
}

impl From<Income> for ViewRecord {
    fn from(income: Income) -> Self {
        ViewRecord {
            id: income.id,
            label: income.source,
            amount: income.amount,
            date: income.date,
            recurrence: income.recurrence,
            detail: Some(if income.is_planned { "planned" } else { "received" }.to_string()),
            parent_id: income.parent_id,
        }
    }
}

async fn add_income(repo: &impl Repository, calendar: &Calendar, command: AddIncomeCommand) -> Result<()> {
    let date = parse_date(&command.date, calendar)?;
    let recurrence_end_date = parse_optional_date(command.recurrence.until.as_deref(), calendar)?;
    let recurrence = command.recurrence.description();
    warn_unresolvable(recurrence.as_deref());

    let income = repo
        .add_income(NewIncomeData {
            source: command.source,
            amount: command.amount,
            is_planned: !command.unplanned,
            card_id: None,
            date,
            recurrence,
            recurrence_end_date,
            secondary_day: command.recurrence.secondary_day,
        })
        .await?;

    let success_style = Style::new().green().bold();
    let info_style = Style::new().blue();

    println!(
        "{} Added income: {} ({:.2})",
        "✓".style(success_style),
        income.source.bright_white().bold(),
        income.amount
    );
    println!("  {} ID: {}", "→".style(info_style), income.id.to_string().yellow());

    if let Some(recurrence) = &income.recurrence {
        let occurrences = repo.find_income_children(income.id).await?.len();
        println!(
            "  {} Repeats {}: {} more occurrence(s) scheduled",
            "→".style(info_style),
            recurrence,
            occurrences
        );
    }

    Ok(())
}

async fn edit_income(repo: &impl Repository, calendar: &Calendar, command: EditIncomeCommand) -> Result<()> {
    let id = resolve_income_id(repo, &command.id).await?;

    let date = command.date.as_deref().map(|d| parse_date(d, calendar)).transpose()?;
    let recurrence_end_date = edited_until(&command.recurrence, calendar)?;
    let recurrence = command.recurrence.recurrence();
    if let Some(new) = &recurrence {
        warn_unresolvable(new.as_deref());
    }

    let update_data = UpdateIncomeData {
        is_planned: command.is_planned(),
        source: command.source,
        amount: command.amount,
        card_id: None,
        date,
        recurrence,
        recurrence_end_date,
        secondary_day: command.recurrence.secondary_day(),
    };

    let updated = repo.update_income(id, update_data).await?;

    println!(
        "{} Updated income: {} ({:.2})",
        "✓".green().bold(),
        updated.record.source.bright_white().bold(),
        updated.record.amount
    );
    print_regeneration(updated.regeneration);
    Ok(())
}

async fn list_incomes(repo: &impl Repository, calendar: &Calendar, command: ListCommand) -> Result<()> {
    let incomes = if command.from.is_none() && command.to.is_none() {
        repo.find_incomes().await?
    } else {
        let (start, end) = parse_range(command.from.as_deref(), command.to.as_deref(), calendar)?;
        repo.find_incomes_between(start, end).await?
    };

    if command.json {
        println!("{}", serde_json::to_string_pretty(&incomes)?);
        return Ok(());
    }

    let records: Vec<ViewRecord> = incomes.into_iter().map(ViewRecord::from).collect();
    display_records(&records, RecordKind::Income, calendar);
    Ok(())
}

async fn regenerate_income(repo: &impl Repository, command: RegenCommand) -> Result<()> {
    let id = resolve_income_id(repo, &command.id).await?;
    let summary = repo.regenerate_income_series(id).await?;

    println!(
        "{} Regenerated series {}: removed {}, created {}",
        "✓".green().bold(),
        summary.parent_id.to_string().yellow(),
        summary.removed,
        summary.created
    );
    Ok(())
}

async fn delete_income(repo: &impl Repository, command: DeleteCommand) -> Result<()> {
    let id = resolve_income_id(repo, &command.id).await?;
    let income = repo
        .find_income_by_id(id)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("Income with id {} not found", id)))?;

    if !command.force {
        let confirmation = Confirm::new()
            .with_prompt(format!(
                "Are you sure you want to delete income '{}' and its generated occurrences?",
                income.source
            ))
            .default(false)
            .interact()
            .unwrap_or(false);

        if !confirmation {
            println!("Deletion cancelled.");
            return Ok(());
        }
    }

    repo.delete_income(id).await?;
    println!("{} Deleted income: {}", "✓".green().bold(), income.source);
    Ok(())
}

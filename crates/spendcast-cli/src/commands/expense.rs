use anyhow::Result;
use dialoguer::Confirm;
use owo_colors::{OwoColorize, Style};
use spendcast_core::calendar::Calendar;
use spendcast_core::error::CoreError;
use spendcast_core::models::{NewExpenseData, RecordKind, UnplannedExpense, UpdateExpenseData};
use spendcast_core::repository::Repository;

use crate::cli::{
    AddExpenseCommand, DeleteCommand, EditExpenseCommand, ExpenseCommand, ExpenseSubcommand, ListCommand, RegenCommand,
};
use crate::commands::{edited_until, print_regeneration, warn_unresolvable};
use crate::parser::{parse_date, parse_optional_date, parse_range};
use crate::util::resolve_expense_id;
use crate::views::table::{display_records, ViewRecord};

pub async fn expense_command(repo: &impl Repository, calendar: &Calendar, command: ExpenseCommand) -> Result<()> {
    match command.command {
        ExpenseSubcommand::Add(command) => add_expense(repo, calendar, command).await,
        ExpenseSubcommand::Edit(command) => edit_expense(repo, calendar, command).await,
        ExpenseSubcommand::List(command) => list_expenses(repo, calendar, command).await,
        ExpenseSubcommand::Regen(command) => regenerate_expense(repo, command).await,
        ExpenseSubcommand::Delete(command) => delete_expense(repo, command).await,
    }
}

impl From<UnplannedExpense> for ViewRecord {
    fn from(expense: UnplannedExpense) -> Self {
        ViewRecord {
            id: expense.id,
            label: expense.description,
            amount: expense.amount,
            date: expense.date,
            recurrence: expense.recurrence,
            detail: expense.category,
            parent_id: expense.parent_id,
        }
    }
}

async fn add_expense(repo: &impl Repository, calendar: &Calendar, command: AddExpenseCommand) -> Result<()> {
    let date = parse_date(&command.date, calendar)?;
    let recurrence_end_date = parse_optional_date(command.recurrence.until.as_deref(), calendar)?;
    let recurrence = command.recurrence.description();
    warn_unresolvable(recurrence.as_deref());

    let expense = repo
        .add_expense(NewExpenseData {
            description: command.description,
            amount: command.amount,
            card_id: None,
            category: command.category.filter(|c| !c.trim().is_empty()),
            date,
            recurrence,
            recurrence_end_date,
            secondary_day: command.recurrence.secondary_day,
        })
        .await?;

    let success_style = Style::new().green().bold();
    let info_style = Style::new().blue();

    println!(
        "{} Added expense: {} ({:.2})",
        "✓".style(success_style),
        expense.description.bright_white().bold(),
        expense.amount
    );
    println!("  {} ID: {}", "→".style(info_style), expense.id.to_string().yellow());

    if let Some(recurrence) = &expense.recurrence {
        let occurrences = repo.find_expense_children(expense.id).await?.len();
        println!(
            "  {} Repeats {}: {} more occurrence(s) scheduled",
            "→".style(info_style),
            recurrence,
            occurrences
        );
    }

    Ok(())
}

async fn edit_expense(repo: &impl Repository, calendar: &Calendar, command: EditExpenseCommand) -> Result<()> {
    let id = resolve_expense_id(repo, &command.id).await?;

    let date = command.date.as_deref().map(|d| parse_date(d, calendar)).transpose()?;
    let recurrence_end_date = edited_until(&command.recurrence, calendar)?;
    let recurrence = command.recurrence.recurrence();
    if let Some(new) = &recurrence {
        warn_unresolvable(new.as_deref());
    }

    let category = if command.category_clear {
        Some(None)
    } else {
        command.category.map(Some)
    };

    let update_data = UpdateExpenseData {
        description: command.description,
        amount: command.amount,
        card_id: None,
        category,
        date,
        recurrence,
        recurrence_end_date,
        secondary_day: command.recurrence.secondary_day(),
    };

    let updated = repo.update_expense(id, update_data).await?;

    println!(
        "{} Updated expense: {} ({:.2})",
        "✓".green().bold(),
        updated.record.description.bright_white().bold(),
        updated.record.amount
    );
    print_regeneration(updated.regeneration);
    Ok(())
}

async fn list_expenses(repo: &impl Repository, calendar: &Calendar, command: ListCommand) -> Result<()> {
    let expenses = if command.from.is_none() && command.to.is_none() {
        repo.find_expenses().await?
    } else {
        let (start, end) = parse_range(command.from.as_deref(), command.to.as_deref(), calendar)?;
        repo.find_expenses_between(start, end).await?
    };

    if command.json {
        println!("{}", serde_json::to_string_pretty(&expenses)?);
        return Ok(());
    }

    let records: Vec<ViewRecord> = expenses.into_iter().map(ViewRecord::from).collect();
    display_records(&records, RecordKind::Expense, calendar);
    Ok(())
}

async fn regenerate_expense(repo: &impl Repository, command: RegenCommand) -> Result<()> {
    let id = resolve_expense_id(repo, &command.id).await?;
    let summary = repo.regenerate_expense_series(id).await?;

    println!(
        "{} Regenerated series {}: removed {}, created {}",
        "✓".green().bold(),
        summary.parent_id.to_string().yellow(),
        summary.removed,
        summary.created
    );
    Ok(())
}

async fn delete_expense(repo: &impl Repository, command: DeleteCommand) -> Result<()> {
    let id = resolve_expense_id(repo, &command.id).await?;
    let expense = repo
        .find_expense_by_id(id)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("Expense with id {} not found", id)))?;

    if !command.force {
        let confirmation = Confirm::new()
            .with_prompt(format!(
                "Are you sure you want to delete expense '{}' and its generated occurrences?",
                expense.description
            ))
            .default(false)
            .interact()
            .unwrap_or(false);

        if !confirmation {
            println!("Deletion cancelled.");
            return Ok(());
        }
    }

    repo.delete_expense(id).await?;
    println!("{} Deleted expense: {}", "✓".green().bold(), expense.description);
    Ok(())
}

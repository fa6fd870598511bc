use clap::{Parser, Subcommand, ValueEnum};
use spendcast_core::recurrence::Pattern;

/// Spendcast: track incomes and unplanned expenses, and see where recurring
/// money lands on the calendar
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Database file (overrides `database_path` from the configuration)
    #[arg(long, global = true)]
    pub db: Option<String>,
    /// IANA timezone for calendar arithmetic (overrides `timezone` from the configuration)
    #[arg(long, global = true)]
    pub timezone: Option<String>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Show the dates a recurrence falls on, without saving anything
    Preview(PreviewCommand),
    /// Manage incomes
    Income(IncomeCommand),
    /// Manage unplanned expenses
    Expense(ExpenseCommand),
    /// Project incomes and expenses over a date range
    Project(ProjectCommand),
}

/// Shared recurrence options for `add`
#[derive(clap::Args, Debug, Clone)]
pub struct RecurrenceArgs {
    /// The recurrence (keyword or rule, e.g. 'FREQ=MONTHLY;BYMONTHDAY=1,15')
    #[arg(long, conflicts_with = "every")]
    pub recurrence: Option<String>,
    /// Human-friendly frequency
    #[arg(long, value_enum)]
    pub every: Option<RecurrenceShortcut>,
    /// Last date the series may fall on (defaults to one year after the first date)
    #[arg(long)]
    pub until: Option<String>,
    /// Second day of month for semi-monthly series
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=31))]
    pub secondary_day: Option<u32>,
}

impl RecurrenceArgs {
    pub fn description(&self) -> Option<String> {
        self.recurrence
            .clone()
            .or_else(|| self.every.map(|e| e.to_string()))
    }
}

/// Recurrence changes for `edit`; each `--*-clear` flag removes the field
#[derive(clap::Args, Debug, Clone)]
pub struct EditRecurrenceArgs {
    /// New recurrence (keyword or rule)
    #[arg(long, conflicts_with_all = ["every", "recurrence_clear"])]
    pub recurrence: Option<String>,
    /// New human-friendly frequency
    #[arg(long, value_enum, conflicts_with = "recurrence_clear")]
    pub every: Option<RecurrenceShortcut>,
    /// Stop repeating (generated occurrences are removed)
    #[arg(long)]
    pub recurrence_clear: bool,
    /// New last date of the series
    #[arg(long, conflicts_with = "until_clear")]
    pub until: Option<String>,
    /// Fall back to one year after the first date
    #[arg(long)]
    pub until_clear: bool,
    /// New second day of month for semi-monthly series
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=31), conflicts_with = "secondary_day_clear")]
    pub secondary_day: Option<u32>,
    /// Infer the second day from the first date again
    #[arg(long)]
    pub secondary_day_clear: bool,
}

impl EditRecurrenceArgs {
    pub fn recurrence(&self) -> Option<Option<String>> {
        if self.recurrence_clear {
            return Some(None);
        }
        self.recurrence
            .clone()
            .or_else(|| self.every.map(|e| e.to_string()))
            .map(Some)
    }

    pub fn secondary_day(&self) -> Option<Option<u32>> {
        if self.secondary_day_clear {
            Some(None)
        } else {
            self.secondary_day.map(Some)
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct PreviewCommand {
    /// Recurrence keyword or rule
    pub recurrence: String,
    /// First date of the series
    #[arg(long)]
    pub base: String,
    /// Last date to show (defaults to one year after the base date)
    #[arg(long)]
    pub end: Option<String>,
    /// Second day of month for semi-monthly series
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=31))]
    pub secondary_day: Option<u32>,
    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct IncomeCommand {
    #[command(subcommand)]
    pub command: IncomeSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum IncomeSubcommand {
    /// Add an income
    Add(AddIncomeCommand),
    /// Edit an income; editing a recurring income rebuilds its occurrences
    Edit(EditIncomeCommand),
    /// List incomes
    List(ListCommand),
    /// Rebuild the generated occurrences of a recurring income
    Regen(RegenCommand),
    /// Delete an income and its generated occurrences
    Delete(DeleteCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct AddIncomeCommand {
    /// Where the money comes from
    pub source: String,
    /// The amount
    pub amount: f64,
    /// Date of the (first) payment
    #[arg(long)]
    pub date: String,
    /// Mark the income as already received rather than planned
    #[arg(long)]
    pub unplanned: bool,
    #[command(flatten)]
    pub recurrence: RecurrenceArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct EditIncomeCommand {
    /// The ID (or unique ID prefix) of the income
    pub id: String,
    #[arg(long)]
    pub source: Option<String>,
    #[arg(long)]
    pub amount: Option<f64>,
    /// New date (for a recurring income, the first date of the series)
    #[arg(long)]
    pub date: Option<String>,
    /// Mark the income as expected
    #[arg(long, conflicts_with = "unplanned")]
    pub planned: bool,
    /// Mark the income as already received
    #[arg(long)]
    pub unplanned: bool,
    #[command(flatten)]
    pub recurrence: EditRecurrenceArgs,
}

impl EditIncomeCommand {
    pub fn is_planned(&self) -> Option<bool> {
        match (self.planned, self.unplanned) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct ExpenseCommand {
    #[command(subcommand)]
    pub command: ExpenseSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ExpenseSubcommand {
    /// Add an unplanned expense
    Add(AddExpenseCommand),
    /// Edit an expense; editing a recurring expense rebuilds its occurrences
    Edit(EditExpenseCommand),
    /// List unplanned expenses
    List(ListCommand),
    /// Rebuild the generated occurrences of a recurring expense
    Regen(RegenCommand),
    /// Delete an expense and its generated occurrences
    Delete(DeleteCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct AddExpenseCommand {
    /// What the money was spent on
    pub description: String,
    /// The amount
    pub amount: f64,
    /// Date of the (first) expense
    #[arg(long)]
    pub date: String,
    /// Spending category
    #[arg(long)]
    pub category: Option<String>,
    #[command(flatten)]
    pub recurrence: RecurrenceArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct EditExpenseCommand {
    /// The ID (or unique ID prefix) of the expense
    pub id: String,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub amount: Option<f64>,
    /// New date (for a recurring expense, the first date of the series)
    #[arg(long)]
    pub date: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long, conflicts_with = "category")]
    pub category_clear: bool,
    #[command(flatten)]
    pub recurrence: EditRecurrenceArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct ListCommand {
    /// Only records on or after this date
    #[arg(long)]
    pub from: Option<String>,
    /// Only records on or before this date
    #[arg(long)]
    pub to: Option<String>,
    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct RegenCommand {
    /// The ID (or unique ID prefix) of the record
    pub id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct DeleteCommand {
    /// The ID (or unique ID prefix) of the record to delete
    pub id: String,
    /// Force deletion without confirmation
    #[clap(short, long)]
    pub force: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct ProjectCommand {
    /// Start of the projection (defaults to today)
    #[arg(long)]
    pub from: Option<String>,
    /// End of the projection (defaults to `default_horizon_months` after the start)
    #[arg(long)]
    pub to: Option<String>,
    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Human-friendly recurrence patterns
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecurrenceShortcut {
    /// Every day
    Daily,
    /// Every week (same weekday)
    Weekly,
    /// Every other week
    Biweekly,
    /// Twice a month
    Semimonthly,
    /// Every month (same date)
    Monthly,
    /// Every three months
    Quarterly,
    /// Every year (same date)
    Yearly,
}

impl RecurrenceShortcut {
    pub fn pattern(&self) -> Pattern {
        match self {
            RecurrenceShortcut::Daily => Pattern::Daily,
            RecurrenceShortcut::Weekly => Pattern::Weekly,
            RecurrenceShortcut::Biweekly => Pattern::Biweekly,
            RecurrenceShortcut::Semimonthly => Pattern::SemiMonthly,
            RecurrenceShortcut::Monthly => Pattern::Monthly,
            RecurrenceShortcut::Quarterly => Pattern::Quarterly,
            RecurrenceShortcut::Yearly => Pattern::Yearly,
        }
    }
}

impl std::fmt::Display for RecurrenceShortcut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.pattern().keyword())
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::regeneration::RecurringRecord;

/// An income entry. Recurring incomes are parents; each generated occurrence
/// is a child row pointing back through `parent_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Income {
    pub id: Uuid,
    pub source: String,
    pub amount: f64,
    /// Planned (expected) income vs. income that has actually arrived
    pub is_planned: bool,
    pub card_id: Option<Uuid>,
    pub date: DateTime<Utc>,
    /// Keyword (`monthly`, `semimonthly`, ...) or RRULE subset, stored verbatim
    pub recurrence: Option<String>,
    pub recurrence_end_date: Option<DateTime<Utc>>,
    /// Second day of month for semi-monthly incomes
    pub secondary_day: Option<u32>,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Default for Income {
    fn default() -> Self {
        Self {
            id: Uuid::now_v7(),
            source: String::new(),
            amount: 0.0,
            is_planned: true,
            card_id: None,
            date: Utc::now(),
            recurrence: None,
            recurrence_end_date: None,
            secondary_day: None,
            parent_id: None,
            created_at: Utc::now(),
        }
    }
}

/// A spend that was not part of a budget's planned expenses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct UnplannedExpense {
    pub id: Uuid,
    pub description: String,
    pub amount: f64,
    pub card_id: Option<Uuid>,
    pub category: Option<String>,
    pub date: DateTime<Utc>,
    pub recurrence: Option<String>,
    pub recurrence_end_date: Option<DateTime<Utc>>,
    pub secondary_day: Option<u32>,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Default for UnplannedExpense {
    fn default() -> Self {
        Self {
            id: Uuid::now_v7(),
            description: String::new(),
            amount: 0.0,
            card_id: None,
            category: None,
            date: Utc::now(),
            recurrence: None,
            recurrence_end_date: None,
            secondary_day: None,
            parent_id: None,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewIncomeData {
    pub source: String,
    pub amount: f64,
    pub is_planned: bool,
    pub card_id: Option<Uuid>,
    pub date: DateTime<Utc>,
    pub recurrence: Option<String>,
    pub recurrence_end_date: Option<DateTime<Utc>>,
    pub secondary_day: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct NewExpenseData {
    pub description: String,
    pub amount: f64,
    pub card_id: Option<Uuid>,
    pub category: Option<String>,
    pub date: DateTime<Utc>,
    pub recurrence: Option<String>,
    pub recurrence_end_date: Option<DateTime<Utc>>,
    pub secondary_day: Option<u32>,
}

/// Partial update of an income. `None` leaves a field alone; for optional
/// fields `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct UpdateIncomeData {
    pub source: Option<String>,
    pub amount: Option<f64>,
    pub is_planned: Option<bool>,
    pub card_id: Option<Option<Uuid>>,
    pub date: Option<DateTime<Utc>>,
    pub recurrence: Option<Option<String>>,
    pub recurrence_end_date: Option<Option<DateTime<Utc>>>,
    pub secondary_day: Option<Option<u32>>,
}

impl UpdateIncomeData {
    /// True when the update changes how the series recurs.
    pub fn changes_recurrence(&self) -> bool {
        self.recurrence.is_some() || self.recurrence_end_date.is_some() || self.secondary_day.is_some()
    }
}

/// Partial update of an unplanned expense, same conventions as
/// [`UpdateIncomeData`].
#[derive(Debug, Clone, Default)]
pub struct UpdateExpenseData {
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub card_id: Option<Option<Uuid>>,
    pub category: Option<Option<String>>,
    pub date: Option<DateTime<Utc>>,
    pub recurrence: Option<Option<String>>,
    pub recurrence_end_date: Option<Option<DateTime<Utc>>>,
    pub secondary_day: Option<Option<u32>>,
}

impl UpdateExpenseData {
    pub fn changes_recurrence(&self) -> bool {
        self.recurrence.is_some() || self.recurrence_end_date.is_some() || self.secondary_day.is_some()
    }
}

fn non_blank(recurrence: Option<String>) -> Option<String> {
    recurrence.filter(|r| !r.trim().is_empty())
}

impl Income {
    pub fn apply(&mut self, data: UpdateIncomeData) {
        if let Some(source) = data.source {
            self.source = source;
        }
        if let Some(amount) = data.amount {
            self.amount = amount;
        }
        if let Some(is_planned) = data.is_planned {
            self.is_planned = is_planned;
        }
        if let Some(card_id) = data.card_id {
            self.card_id = card_id;
        }
        if let Some(date) = data.date {
            self.date = date;
        }
        if let Some(recurrence) = data.recurrence {
            self.recurrence = non_blank(recurrence);
        }
        if let Some(end) = data.recurrence_end_date {
            self.recurrence_end_date = end;
        }
        if let Some(day) = data.secondary_day {
            self.secondary_day = day;
        }
    }
}

impl UnplannedExpense {
    pub fn apply(&mut self, data: UpdateExpenseData) {
        if let Some(description) = data.description {
            self.description = description;
        }
        if let Some(amount) = data.amount {
            self.amount = amount;
        }
        if let Some(card_id) = data.card_id {
            self.card_id = card_id;
        }
        if let Some(category) = data.category {
            self.category = category;
        }
        if let Some(date) = data.date {
            self.date = date;
        }
        if let Some(recurrence) = data.recurrence {
            self.recurrence = non_blank(recurrence);
        }
        if let Some(end) = data.recurrence_end_date {
            self.recurrence_end_date = end;
        }
        if let Some(day) = data.secondary_day {
            self.secondary_day = day;
        }
    }
}

impl From<NewIncomeData> for Income {
    fn from(data: NewIncomeData) -> Self {
        Self {
            source: data.source,
            amount: data.amount,
            is_planned: data.is_planned,
            card_id: data.card_id,
            date: data.date,
            recurrence: non_blank(data.recurrence),
            recurrence_end_date: data.recurrence_end_date,
            secondary_day: data.secondary_day,
            ..Default::default()
        }
    }
}

impl From<NewExpenseData> for UnplannedExpense {
    fn from(data: NewExpenseData) -> Self {
        Self {
            description: data.description,
            amount: data.amount,
            card_id: data.card_id,
            category: data.category,
            date: data.date,
            recurrence: non_blank(data.recurrence),
            recurrence_end_date: data.recurrence_end_date,
            secondary_day: data.secondary_day,
            ..Default::default()
        }
    }
}

impl RecurringRecord for Income {
    fn id(&self) -> Uuid {
        self.id
    }

    fn parent_id(&self) -> Option<Uuid> {
        self.parent_id
    }

    fn recurrence(&self) -> Option<&str> {
        self.recurrence.as_deref()
    }

    fn base_date(&self) -> Option<DateTime<Utc>> {
        Some(self.date)
    }

    fn end_date(&self) -> Option<DateTime<Utc>> {
        self.recurrence_end_date
    }

    fn secondary_day(&self) -> Option<u32> {
        self.secondary_day
    }

    fn spawn_occurrence(&self, date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            date,
            recurrence: None,
            recurrence_end_date: None,
            secondary_day: None,
            parent_id: Some(self.id),
            created_at: Utc::now(),
            ..self.clone()
        }
    }
}

impl RecurringRecord for UnplannedExpense {
    fn id(&self) -> Uuid {
        self.id
    }

    fn parent_id(&self) -> Option<Uuid> {
        self.parent_id
    }

    fn recurrence(&self) -> Option<&str> {
        self.recurrence.as_deref()
    }

    fn base_date(&self) -> Option<DateTime<Utc>> {
        Some(self.date)
    }

    fn end_date(&self) -> Option<DateTime<Utc>> {
        self.recurrence_end_date
    }

    fn secondary_day(&self) -> Option<u32> {
        self.secondary_day
    }

    fn spawn_occurrence(&self, date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            date,
            recurrence: None,
            recurrence_end_date: None,
            secondary_day: None,
            parent_id: Some(self.id),
            created_at: Utc::now(),
            ..self.clone()
        }
    }
}

/// Which kind of record a projected occurrence came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Income,
    Expense,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordKind::Income => write!(f, "income"),
            RecordKind::Expense => write!(f, "expense"),
        }
    }
}

use crate::db::DbPool;
use crate::error::CoreError;
use crate::models::{
    Income, NewExpenseData, NewIncomeData, UnplannedExpense, UpdateExpenseData, UpdateIncomeData,
};
use crate::regeneration::{RegenerationSummary, SeriesRegenerator, SeriesStore, UpdatedRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

// Re-export domain modules
pub mod expenses;
pub mod incomes;
pub mod series;

/// Domain-specific trait for income operations
#[async_trait]
pub trait IncomeRepository {
    /// Inserts the income; a recurring income gets its series materialized in
    /// the same transaction.
    async fn add_income(&self, data: NewIncomeData) -> Result<Income, CoreError>;
    async fn find_income_by_id(&self, id: Uuid) -> Result<Option<Income>, CoreError>;
    async fn find_incomes_by_short_id_prefix(&self, short_id: &str) -> Result<Vec<Income>, CoreError>;
    async fn find_incomes(&self) -> Result<Vec<Income>, CoreError>;
    async fn find_incomes_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Income>, CoreError>;
    async fn find_income_children(&self, parent_id: Uuid) -> Result<Vec<Income>, CoreError>;
    /// Saves the edit. Editing a parent rebuilds its series in the same
    /// transaction; a generated occurrence only accepts payload changes.
    async fn update_income(&self, id: Uuid, data: UpdateIncomeData) -> Result<UpdatedRecord<Income>, CoreError>;
    /// Deletes the income and every occurrence generated from it.
    async fn delete_income(&self, id: Uuid) -> Result<(), CoreError>;
}

/// Domain-specific trait for unplanned expense operations
#[async_trait]
pub trait ExpenseRepository {
    async fn add_expense(&self, data: NewExpenseData) -> Result<UnplannedExpense, CoreError>;
    async fn find_expense_by_id(&self, id: Uuid) -> Result<Option<UnplannedExpense>, CoreError>;
    async fn find_expenses_by_short_id_prefix(&self, short_id: &str) -> Result<Vec<UnplannedExpense>, CoreError>;
    async fn find_expenses(&self) -> Result<Vec<UnplannedExpense>, CoreError>;
    async fn find_expenses_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<UnplannedExpense>, CoreError>;
    async fn find_expense_children(&self, parent_id: Uuid) -> Result<Vec<UnplannedExpense>, CoreError>;
    async fn update_expense(
        &self,
        id: Uuid,
        data: UpdateExpenseData,
    ) -> Result<UpdatedRecord<UnplannedExpense>, CoreError>;
    async fn delete_expense(&self, id: Uuid) -> Result<(), CoreError>;
}

/// Domain-specific trait for series regeneration
#[async_trait]
pub trait SeriesRepository {
    /// The regenerator (and through it the resolver and calendar) the
    /// repository materializes series with.
    fn regenerator(&self) -> &SeriesRegenerator;
    async fn regenerate_income_series(&self, id: Uuid) -> Result<RegenerationSummary, CoreError>;
    async fn regenerate_expense_series(&self, id: Uuid) -> Result<RegenerationSummary, CoreError>;
}

/// Main repository trait that composes all domain traits
#[async_trait]
pub trait Repository:
    IncomeRepository
    + ExpenseRepository
    + SeriesRepository
    + SeriesStore<Income>
    + SeriesStore<UnplannedExpense>
    + Send
    + Sync
{
}

/// SQLite implementation of the repository pattern
pub struct SqliteRepository {
    pool: DbPool,
    regenerator: SeriesRegenerator,
}

impl SqliteRepository {
    pub fn new(pool: DbPool, regenerator: SeriesRegenerator) -> Self {
        Self { pool, regenerator }
    }

    /// Get a reference to the database pool for internal use across modules
    pub(crate) fn pool(&self) -> &DbPool {
        &self.pool
    }
}

/// `LIKE` pattern matching a hex id prefix against a BLOB uuid column.
pub(crate) fn short_id_pattern(short_id: &str) -> String {
    let mut pattern: String = short_id
        .chars()
        .filter(|c| *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect();
    pattern.push('%');
    pattern
}

impl Repository for SqliteRepository {}

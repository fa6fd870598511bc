use crate::error::CoreError;
use crate::models::{NewExpenseData, UnplannedExpense, UpdateExpenseData};
use crate::regeneration::{RegenerationSummary, UpdatedRecord};
use crate::repository::incomes::validate_secondary_day;
use crate::repository::{short_id_pattern, SeriesRepository, SqliteRepository};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Sqlite, Transaction};
use uuid::Uuid;

#[async_trait]
impl super::ExpenseRepository for SqliteRepository {
    async fn add_expense(&self, data: NewExpenseData) -> Result<UnplannedExpense, CoreError> {
        if data.description.trim().is_empty() {
            return Err(CoreError::InvalidInput("Expense description cannot be empty".to_string()));
        }
        validate_secondary_day(data.secondary_day)?;

        let expense = UnplannedExpense::from(data);
        let plan = self.regenerator().plan(&expense);

        let mut tx = self.pool().begin().await?;
        Self::insert_expense_in_transaction(&mut tx, &expense).await?;
        for child in &plan.children {
            Self::insert_expense_in_transaction(&mut tx, child).await?;
        }
        tx.commit().await?;

        tracing::debug!(id = %expense.id, occurrences = plan.children.len(), "expense added");
        Ok(expense)
    }

    async fn find_expense_by_id(&self, id: Uuid) -> Result<Option<UnplannedExpense>, CoreError> {
        let expense = sqlx::query_as("SELECT * FROM unplanned_expenses WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(expense)
    }

    async fn find_expenses_by_short_id_prefix(&self, short_id: &str) -> Result<Vec<UnplannedExpense>, CoreError> {
        let expenses = sqlx::query_as("SELECT * FROM unplanned_expenses WHERE lower(hex(id)) LIKE $1")
            .bind(short_id_pattern(short_id))
            .fetch_all(self.pool())
            .await?;
        Ok(expenses)
    }

    async fn find_expenses(&self) -> Result<Vec<UnplannedExpense>, CoreError> {
        let expenses = sqlx::query_as("SELECT * FROM unplanned_expenses ORDER BY date, id")
            .fetch_all(self.pool())
            .await?;
        Ok(expenses)
    }

    async fn find_expenses_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<UnplannedExpense>, CoreError> {
        let expenses = sqlx::query_as(
            r#"SELECT * FROM unplanned_expenses
            WHERE date BETWEEN $1 AND $2
            ORDER BY date, id"#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(self.pool())
        .await?;
        Ok(expenses)
    }

    async fn find_expense_children(&self, parent_id: Uuid) -> Result<Vec<UnplannedExpense>, CoreError> {
        let expenses = sqlx::query_as("SELECT * FROM unplanned_expenses WHERE parent_id = $1 ORDER BY date")
            .bind(parent_id)
            .fetch_all(self.pool())
            .await?;
        Ok(expenses)
    }

    async fn update_expense(
        &self,
        id: Uuid,
        data: UpdateExpenseData,
    ) -> Result<UpdatedRecord<UnplannedExpense>, CoreError> {
        let mut tx = self.pool().begin().await?;

        let mut expense: UnplannedExpense = sqlx::query_as("SELECT * FROM unplanned_expenses WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Expense with id {} not found", id)))?;

        if expense.parent_id.is_some() && data.changes_recurrence() {
            return Err(CoreError::InvalidInput(format!(
                "Expense {} is a generated occurrence, edit the recurrence of its parent instead",
                id
            )));
        }

        expense.apply(data);
        if expense.description.trim().is_empty() {
            return Err(CoreError::InvalidInput("Expense description cannot be empty".to_string()));
        }
        validate_secondary_day(expense.secondary_day)?;

        sqlx::query(
            r#"UPDATE unplanned_expenses
            SET description = $1, amount = $2, card_id = $3, category = $4, date = $5,
                recurrence = $6, recurrence_end_date = $7, secondary_day = $8
            WHERE id = $9"#,
        )
        .bind(&expense.description)
        .bind(expense.amount)
        .bind(expense.card_id)
        .bind(&expense.category)
        .bind(expense.date)
        .bind(&expense.recurrence)
        .bind(expense.recurrence_end_date)
        .bind(expense.secondary_day)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let regeneration = if expense.parent_id.is_none() {
            let plan = self.regenerator().plan(&expense);
            let created = plan.children.len();
            let removed = Self::replace_expense_children_in_transaction(&mut tx, id, &plan.children).await?;
            Some(RegenerationSummary {
                parent_id: id,
                removed,
                created,
            })
        } else {
            None
        };

        tx.commit().await?;

        tracing::debug!(%id, ?regeneration, "expense updated");
        Ok(UpdatedRecord {
            record: expense,
            regeneration,
        })
    }

    async fn delete_expense(&self, id: Uuid) -> Result<(), CoreError> {
        let mut tx = self.pool().begin().await?;

        sqlx::query("DELETE FROM unplanned_expenses WHERE parent_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM unplanned_expenses WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("Expense with id {} not found", id)));
        }

        tx.commit().await?;
        Ok(())
    }
}

impl SqliteRepository {
    pub(crate) async fn insert_expense_in_transaction<'a>(
        tx: &mut Transaction<'a, Sqlite>,
        expense: &UnplannedExpense,
    ) -> Result<(), CoreError> {
        sqlx::query(
            r#"INSERT INTO unplanned_expenses (id, description, amount, card_id, category, date, recurrence, recurrence_end_date, secondary_day, parent_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"#,
        )
        .bind(expense.id)
        .bind(&expense.description)
        .bind(expense.amount)
        .bind(expense.card_id)
        .bind(&expense.category)
        .bind(expense.date)
        .bind(&expense.recurrence)
        .bind(expense.recurrence_end_date)
        .bind(expense.secondary_day)
        .bind(expense.parent_id)
        .bind(expense.created_at)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    pub(crate) async fn replace_expense_children_in_transaction<'a>(
        tx: &mut Transaction<'a, Sqlite>,
        parent_id: Uuid,
        children: &[UnplannedExpense],
    ) -> Result<usize, CoreError> {
        let removed = sqlx::query("DELETE FROM unplanned_expenses WHERE parent_id = $1")
            .bind(parent_id)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        for child in children {
            Self::insert_expense_in_transaction(tx, child).await?;
        }

        Ok(usize::try_from(removed).unwrap_or(usize::MAX))
    }
}

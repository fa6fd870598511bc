use crate::error::CoreError;
use crate::models::{Income, NewIncomeData, UpdateIncomeData};
use crate::regeneration::{RegenerationSummary, UpdatedRecord};
use crate::repository::{short_id_pattern, SeriesRepository, SqliteRepository};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Sqlite, Transaction};
use uuid::Uuid;

#[async_trait]
impl super::IncomeRepository for SqliteRepository {
    async fn add_income(&self, data: NewIncomeData) -> Result<Income, CoreError> {
        if data.source.trim().is_empty() {
            return Err(CoreError::InvalidInput("Income source cannot be empty".to_string()));
        }
        validate_secondary_day(data.secondary_day)?;

        let income = Income::from(data);
        let plan = self.regenerator().plan(&income);

        let mut tx = self.pool().begin().await?;
        Self::insert_income_in_transaction(&mut tx, &income).await?;
        for child in &plan.children {
            Self::insert_income_in_transaction(&mut tx, child).await?;
        }
        tx.commit().await?;

        tracing::debug!(id = %income.id, occurrences = plan.children.len(), "income added");
        Ok(income)
    }

    async fn find_income_by_id(&self, id: Uuid) -> Result<Option<Income>, CoreError> {
        let income = sqlx::query_as("SELECT * FROM incomes WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(income)
    }

    async fn find_incomes_by_short_id_prefix(&self, short_id: &str) -> Result<Vec<Income>, CoreError> {
        let incomes = sqlx::query_as("SELECT * FROM incomes WHERE lower(hex(id)) LIKE $1")
            .bind(short_id_pattern(short_id))
            .fetch_all(self.pool())
            .await?;
        Ok(incomes)
    }

    async fn find_incomes(&self) -> Result<Vec<Income>, CoreError> {
        let incomes = sqlx::query_as("SELECT * FROM incomes ORDER BY date, id")
            .fetch_all(self.pool())
            .await?;
        Ok(incomes)
    }

    async fn find_incomes_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Income>, CoreError> {
        let incomes = sqlx::query_as(
            r#"SELECT * FROM incomes
            WHERE date BETWEEN $1 AND $2
            ORDER BY date, id"#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(self.pool())
        .await?;
        Ok(incomes)
    }

    async fn find_income_children(&self, parent_id: Uuid) -> Result<Vec<Income>, CoreError> {
        let incomes = sqlx::query_as("SELECT * FROM incomes WHERE parent_id = $1 ORDER BY date")
            .bind(parent_id)
            .fetch_all(self.pool())
            .await?;
        Ok(incomes)
    }

    async fn update_income(&self, id: Uuid, data: UpdateIncomeData) -> Result<UpdatedRecord<Income>, CoreError> {
        let mut tx = self.pool().begin().await?;

        let mut income: Income = sqlx::query_as("SELECT * FROM incomes WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Income with id {} not found", id)))?;

        if income.parent_id.is_some() && data.changes_recurrence() {
            return Err(CoreError::InvalidInput(format!(
                "Income {} is a generated occurrence, edit the recurrence of its parent instead",
                id
            )));
        }

        income.apply(data);
        if income.source.trim().is_empty() {
            return Err(CoreError::InvalidInput("Income source cannot be empty".to_string()));
        }
        validate_secondary_day(income.secondary_day)?;

        sqlx::query(
            r#"UPDATE incomes
            SET source = $1, amount = $2, is_planned = $3, card_id = $4, date = $5,
                recurrence = $6, recurrence_end_date = $7, secondary_day = $8
            WHERE id = $9"#,
        )
        .bind(&income.source)
        .bind(income.amount)
        .bind(income.is_planned)
        .bind(income.card_id)
        .bind(income.date)
        .bind(&income.recurrence)
        .bind(income.recurrence_end_date)
        .bind(income.secondary_day)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let regeneration = if income.parent_id.is_none() {
            let plan = self.regenerator().plan(&income);
            let created = plan.children.len();
            let removed = Self::replace_income_children_in_transaction(&mut tx, id, &plan.children).await?;
            Some(RegenerationSummary {
                parent_id: id,
                removed,
                created,
            })
        } else {
            None
        };

        tx.commit().await?;

        tracing::debug!(%id, ?regeneration, "income updated");
        Ok(UpdatedRecord {
            record: income,
            regeneration,
        })
    }

    async fn delete_income(&self, id: Uuid) -> Result<(), CoreError> {
        let mut tx = self.pool().begin().await?;

        sqlx::query("DELETE FROM incomes WHERE parent_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM incomes WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("Income with id {} not found", id)));
        }

        tx.commit().await?;
        Ok(())
    }
}

impl SqliteRepository {
    pub(crate) async fn insert_income_in_transaction<'a>(
        tx: &mut Transaction<'a, Sqlite>,
        income: &Income,
    ) -> Result<(), CoreError> {
        sqlx::query(
            r#"INSERT INTO incomes (id, source, amount, is_planned, card_id, date, recurrence, recurrence_end_date, secondary_day, parent_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"#,
        )
        .bind(income.id)
        .bind(&income.source)
        .bind(income.amount)
        .bind(income.is_planned)
        .bind(income.card_id)
        .bind(income.date)
        .bind(&income.recurrence)
        .bind(income.recurrence_end_date)
        .bind(income.secondary_day)
        .bind(income.parent_id)
        .bind(income.created_at)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Removes every generated occurrence of `parent_id` and writes
    /// `children`, inside the caller's transaction.
    pub(crate) async fn replace_income_children_in_transaction<'a>(
        tx: &mut Transaction<'a, Sqlite>,
        parent_id: Uuid,
        children: &[Income],
    ) -> Result<usize, CoreError> {
        let removed = sqlx::query("DELETE FROM incomes WHERE parent_id = $1")
            .bind(parent_id)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        for child in children {
            Self::insert_income_in_transaction(tx, child).await?;
        }

        Ok(usize::try_from(removed).unwrap_or(usize::MAX))
    }
}

pub(crate) fn validate_secondary_day(day: Option<u32>) -> Result<(), CoreError> {
    match day {
        Some(d) if !(1..=31).contains(&d) => Err(CoreError::InvalidInput(format!(
            "Secondary day must be between 1 and 31, got {}",
            d
        ))),
        _ => Ok(()),
    }
}

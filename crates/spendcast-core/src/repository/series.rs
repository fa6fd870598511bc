use crate::error::CoreError;
use crate::models::{Income, UnplannedExpense};
use crate::regeneration::{RegenerationSummary, SeriesRegenerator, SeriesStore};
use crate::repository::{ExpenseRepository, IncomeRepository, SeriesRepository, SqliteRepository};
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
impl SeriesStore<Income> for SqliteRepository {
    async fn replace_children(&self, parent_id: Uuid, children: Vec<Income>) -> Result<usize, CoreError> {
        let mut tx = self.pool().begin().await?;
        let removed = Self::replace_income_children_in_transaction(&mut tx, parent_id, &children).await?;
        tx.commit().await?;
        Ok(removed)
    }
}

#[async_trait]
impl SeriesStore<UnplannedExpense> for SqliteRepository {
    async fn replace_children(&self, parent_id: Uuid, children: Vec<UnplannedExpense>) -> Result<usize, CoreError> {
        let mut tx = self.pool().begin().await?;
        let removed = Self::replace_expense_children_in_transaction(&mut tx, parent_id, &children).await?;
        tx.commit().await?;
        Ok(removed)
    }
}

#[async_trait]
impl SeriesRepository for SqliteRepository {
    fn regenerator(&self) -> &SeriesRegenerator {
        &self.regenerator
    }

    async fn regenerate_income_series(&self, id: Uuid) -> Result<RegenerationSummary, CoreError> {
        let parent = self
            .find_income_by_id(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Income with id {} not found", id)))?;
        self.regenerator().regenerate(self, &parent).await
    }

    async fn regenerate_expense_series(&self, id: Uuid) -> Result<RegenerationSummary, CoreError> {
        let parent = self
            .find_expense_by_id(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Expense with id {} not found", id)))?;
        self.regenerator().regenerate(self, &parent).await
    }
}

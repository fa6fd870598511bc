use anyhow::{anyhow, Result};
use spendcast_core::error::CoreError;
use spendcast_core::repository::{ExpenseRepository, IncomeRepository};
use uuid::Uuid;

fn pick_unique(short_id: &str, kind: &str, matches: Vec<(Uuid, String)>) -> Result<Uuid> {
    match matches.as_slice() {
        [(id, _)] => Ok(*id),
        [] => Err(anyhow!(CoreError::NotFound(format!(
            "No {} found with ID prefix '{}'",
            kind, short_id
        )))),
        _ => Err(anyhow!(CoreError::AmbiguousId(
            matches
                .into_iter()
                .map(|(id, label)| (id.to_string(), label))
                .collect()
        ))),
    }
}

fn check_short_id(short_id: &str) -> Result<Option<Uuid>> {
    if let Ok(id) = Uuid::parse_str(short_id) {
        return Ok(Some(id));
    }
    if short_id.len() < 2 || !short_id.chars().all(|c| c.is_ascii_hexdigit() || c == '-') {
        return Err(anyhow!(CoreError::InvalidInput(format!(
            "'{}' is not an ID: use at least 2 hex characters",
            short_id
        ))));
    }
    Ok(None)
}

pub async fn resolve_income_id(repo: &impl IncomeRepository, short_id: &str) -> Result<Uuid> {
    if let Some(id) = check_short_id(short_id)? {
        return Ok(id);
    }
    let incomes = repo.find_incomes_by_short_id_prefix(short_id).await?;
    let matches = incomes.into_iter().map(|i| (i.id, i.source)).collect();
    pick_unique(short_id, "income", matches)
}

pub async fn resolve_expense_id(repo: &impl ExpenseRepository, short_id: &str) -> Result<Uuid> {
    if let Some(id) = check_short_id(short_id)? {
        return Ok(id);
    }
    let expenses = repo.find_expenses_by_short_id_prefix(short_id).await?;
    let matches = expenses.into_iter().map(|e| (e.id, e.description)).collect();
    pick_unique(short_id, "expense", matches)
}

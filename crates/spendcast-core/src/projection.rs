//! Projection of recurring and one-off records over a budget window.
//!
//! This is what a budget summary or calendar view shows: every occurrence of
//! every record in the window, computed on the fly rather than read back from
//! materialized rows.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{Income, RecordKind, UnplannedExpense};
use crate::recurrence::{ExpansionWindow, Recurrence, RecurrenceResolver, SecondaryDay};
use crate::regeneration::RecurringRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedOccurrence {
    pub source_id: Uuid,
    pub kind: RecordKind,
    pub label: String,
    pub date: DateTime<Utc>,
    pub amount: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectionTotals {
    pub count: usize,
    pub income: f64,
    pub expenses: f64,
    pub net: f64,
}

impl ProjectionTotals {
    fn from_occurrences(occurrences: &[ProjectedOccurrence]) -> Self {
        let mut totals = ProjectionTotals {
            count: occurrences.len(),
            ..Default::default()
        };
        for occurrence in occurrences {
            match occurrence.kind {
                RecordKind::Income => totals.income += occurrence.amount,
                RecordKind::Expense => totals.expenses += occurrence.amount,
            }
        }
        totals.net = totals.income - totals.expenses;
        totals
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Projection {
    pub window: ExpansionWindow,
    pub occurrences: Vec<ProjectedOccurrence>,
    pub totals: ProjectionTotals,
}

/// Something that can appear in a projection.
pub trait Projectable: RecurringRecord {
    fn kind(&self) -> RecordKind;
    fn label(&self) -> &str;
    fn amount(&self) -> f64;
}

impl Projectable for Income {
    fn kind(&self) -> RecordKind {
        RecordKind::Income
    }

    fn label(&self) -> &str {
        &self.source
    }

    fn amount(&self) -> f64 {
        self.amount
    }
}

impl Projectable for UnplannedExpense {
    fn kind(&self) -> RecordKind {
        RecordKind::Expense
    }

    fn label(&self) -> &str {
        &self.description
    }

    fn amount(&self) -> f64 {
        self.amount
    }
}

/// Expands `records` over `window`.
///
/// Generated children are skipped: their parent's recurrence already covers
/// them. A parent's expansion stops where its materialized series stops (the
/// explicit end date, or one year after the base), so the projection never
/// shows a date that regeneration would not store. Records without a
/// recurrence contribute their own date when it falls inside the window, and
/// so do records whose recurrence is not recognized.
pub fn project_records<R: Projectable>(
    resolver: &RecurrenceResolver,
    records: &[R],
    window: &ExpansionWindow,
) -> Vec<ProjectedOccurrence> {
    let mut occurrences = Vec::new();

    for record in records.iter().filter(|r| r.parent_id().is_none()) {
        let Some(base) = record.base_date() else {
            continue;
        };

        let recurrence = record
            .active_recurrence()
            .and_then(|r| r.parse::<Recurrence>().ok())
            .filter(|r| r.pattern().is_some());

        let dates = match recurrence {
            Some(recurrence) => {
                let secondary = record.secondary_day().map(SecondaryDay::Day);
                let series_end =
                    ExpansionWindow::for_series(resolver.calendar(), base, record.end_date()).end;
                let mut series_window = *window;
                series_window.end = series_window.end.min(series_end);
                resolver.resolve_recurrence(&recurrence, base, &series_window, secondary)
            }
            None if window.contains(base) => vec![base],
            None => Vec::new(),
        };

        occurrences.extend(dates.into_iter().map(|date| ProjectedOccurrence {
            source_id: record.id(),
            kind: record.kind(),
            label: record.label().to_string(),
            date,
            amount: record.amount(),
        }));
    }

    occurrences
}

/// Projects incomes and expenses together, ordered by date then source id.
pub fn project(
    resolver: &RecurrenceResolver,
    incomes: &[Income],
    expenses: &[UnplannedExpense],
    window: ExpansionWindow,
) -> Projection {
    let mut occurrences = project_records(resolver, incomes, &window);
    occurrences.extend(project_records(resolver, expenses, &window));
    occurrences.sort_by(|a, b| a.date.cmp(&b.date).then(a.source_id.cmp(&b.source_id)));

    let totals = ProjectionTotals::from_occurrences(&occurrences);
    Projection {
        window,
        occurrences,
        totals,
    }
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::CoreError;
use crate::recurrence::{ExpansionWindow, RecurrenceResolver, SecondaryDay};

/// A record that can host a recurring series.
///
/// The same type plays both roles: a parent carries the recurrence, and its
/// materialized occurrences are children whose `parent_id` points back at it.
pub trait RecurringRecord: Clone + Send + Sync {
    fn id(&self) -> Uuid;
    fn parent_id(&self) -> Option<Uuid>;
    fn recurrence(&self) -> Option<&str>;
    fn base_date(&self) -> Option<DateTime<Utc>>;
    fn end_date(&self) -> Option<DateTime<Utc>>;
    fn secondary_day(&self) -> Option<u32>;

    /// A new child on `date`: payload copied, fresh id, parent reference set.
    fn spawn_occurrence(&self, date: DateTime<Utc>) -> Self;

    /// Recurrence string, or `None` when absent or blank.
    fn active_recurrence(&self) -> Option<&str> {
        self.recurrence().filter(|r| !r.trim().is_empty())
    }
}

/// Persistence side of regeneration.
#[async_trait]
pub trait SeriesStore<R: RecurringRecord> {
    /// Deletes every row whose parent reference equals `parent_id` and inserts
    /// `children`, as a single unit of work. Nothing is applied on error.
    /// Returns the number of rows removed.
    async fn replace_children(&self, parent_id: Uuid, children: Vec<R>) -> Result<usize, CoreError>;
}

/// The children a regeneration will write for one parent.
#[derive(Debug, Clone)]
pub struct RegenerationPlan<R> {
    pub parent_id: Uuid,
    pub children: Vec<R>,
}

impl<R: RecurringRecord> RegenerationPlan<R> {
    pub fn dates(&self) -> Vec<DateTime<Utc>> {
        self.children
            .iter()
            .filter_map(RecurringRecord::base_date)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegenerationSummary {
    pub parent_id: Uuid,
    pub removed: usize,
    pub created: usize,
}

/// Result of editing a record. Editing a parent always rebuilds its series so
/// the children pick up the new payload and recurrence.
#[derive(Debug, Clone)]
pub struct UpdatedRecord<R> {
    pub record: R,
    pub regeneration: Option<RegenerationSummary>,
}

/// Rebuilds the materialized children of a recurring record.
///
/// Children are never diffed: every regeneration removes the whole previous
/// series and writes a fresh one. Callers must not regenerate the same parent
/// concurrently.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeriesRegenerator {
    resolver: RecurrenceResolver,
}

impl SeriesRegenerator {
    pub fn new(resolver: RecurrenceResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &RecurrenceResolver {
        &self.resolver
    }

    /// Computes the children for `parent` without touching storage.
    ///
    /// An empty plan means "clear the series": no recurrence, no base date,
    /// or a recurrence the resolver does not understand.
    pub fn plan<R: RecurringRecord>(&self, parent: &R) -> RegenerationPlan<R> {
        let parent_id = parent.id();
        let (Some(recurrence), Some(base)) = (parent.active_recurrence(), parent.base_date()) else {
            return RegenerationPlan {
                parent_id,
                children: Vec::new(),
            };
        };

        let calendar = self.resolver.calendar();
        let window = ExpansionWindow::for_series(calendar, base, parent.end_date());
        let secondary = parent.secondary_day().map(SecondaryDay::Day);

        let children = self
            .resolver
            .resolve(recurrence, base, &window, secondary)
            .into_iter()
            .filter(|date| !calendar.is_same_day(*date, base))
            .map(|date| parent.spawn_occurrence(date))
            .collect();

        RegenerationPlan { parent_id, children }
    }

    /// Replaces the persisted children of `parent` with a freshly resolved set.
    #[tracing::instrument(skip(self, store, parent), fields(parent_id = %parent.id()))]
    pub async fn regenerate<R, S>(&self, store: &S, parent: &R) -> Result<RegenerationSummary, CoreError>
    where
        R: RecurringRecord,
        S: SeriesStore<R> + Sync + ?Sized,
    {
        if parent.parent_id().is_some() {
            return Err(CoreError::InvalidInput(format!(
                "Record {} is a generated occurrence, regenerate its parent instead",
                parent.id()
            )));
        }

        let plan = self.plan(parent);
        let created = plan.children.len();
        let removed = store.replace_children(plan.parent_id, plan.children).await?;

        tracing::info!(removed, created, "series regenerated");
        Ok(RegenerationSummary {
            parent_id: parent.id(),
            removed,
            created,
        })
    }
}

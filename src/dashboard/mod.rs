// ============================================================================
// src/dashboard/mod.rs - Overview aggregates
// ============================================================================
//
// Features:
// - Status breakdowns for tasks and projects, in rank order
// - Recently touched tasks (ModifiedOn, else CreatedOn, newest first)
// - Upcoming deadlines (open tasks with a due date, soonest first)
// - Completed/pending counts for quick tasks
//
// ============================================================================

use crate::connection::{ANONYMOUS_NAME, AuthProvider, Identity};
use crate::core::{EntityKind, Record, Result, Value};
use crate::evaluator::FilterCriterion;
use crate::executor::SortDirection;
use crate::schema::{RankTables, schema};
use crate::services::{ProjectService, TaskService};
use crate::storage::entries_of;
use crate::view::Projector;
use serde::Serialize;
use std::cmp::Ordering;
use tracing::debug;

/// Length of the short lists on the dashboard.
pub const SHORT_LIST_LEN: usize = 5;

/// Count of records per status value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusBreakdown {
    pub total: usize,
    /// Known statuses in rank order, zero counts included
    pub counts: Vec<(String, usize)>,
}

impl StatusBreakdown {
    pub fn compute(kind: EntityKind, records: &[Record], ranks: &RankTables) -> Self {
        let status_field = schema(kind).status_field;
        let counts = ranks
            .labels(kind, status_field)
            .into_iter()
            .map(|label| {
                let n = records
                    .iter()
                    .filter(|r| r.text(status_field) == Some(label))
                    .count();
                (label.to_string(), n)
            })
            .collect();
        Self {
            total: records.len(),
            counts,
        }
    }

    pub fn count(&self, status: &str) -> usize {
        self.counts
            .iter()
            .find(|(label, _)| label == status)
            .map_or(0, |(_, n)| *n)
    }
}

/// Completed/pending split of the quick task list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuickStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

impl QuickStats {
    pub fn compute(records: &[Record]) -> Self {
        let completed = records
            .iter()
            .filter(|r| r.get("completed").and_then(Value::as_bool) == Some(true))
            .count();
        Self {
            total: records.len(),
            completed,
            pending: records.len() - completed,
        }
    }
}

pub fn greeting(identity: Option<&Identity>) -> String {
    let name = identity.map_or(ANONYMOUS_NAME, Identity::greeting_name);
    format!("Welcome back, {}!", name)
}

/// Up to five tasks, most recently modified (or created) first.
///
/// Tasks with neither stamp come last; ties keep list order.
pub fn recent_tasks(tasks: &[Record]) -> Vec<Record> {
    let touched = |r: &Record| {
        r.get("ModifiedOn")
            .and_then(Value::as_timestamp_millis)
            .or_else(|| r.get("CreatedOn").and_then(Value::as_timestamp_millis))
    };
    let mut entries: Vec<_> = entries_of(tasks).map(|e| (touched(e.record), e)).collect();
    entries.sort_by(|(a, ea), (b, eb)| {
        let primary = match (a, b) {
            (Some(a), Some(b)) => b.cmp(a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        primary.then(ea.seq.cmp(&eb.seq))
    });
    entries
        .into_iter()
        .take(SHORT_LIST_LEN)
        .map(|(_, e)| e.record.clone())
        .collect()
}

/// Up to five open tasks with a due date, soonest first.
///
/// Blank and unparseable due dates count as no due date.
pub fn upcoming_deadlines(tasks: &[Record], projector: &Projector) -> Result<Vec<Record>> {
    let open_with_due = FilterCriterion::not_equals("status", "Completed")
        .and(FilterCriterion::present("due_date"));
    let view = projector.project(
        EntityKind::Task,
        entries_of(tasks),
        &open_with_due,
        "due_date",
        SortDirection::Ascending,
    )?;
    Ok(view
        .iter()
        .filter(|r| r.get("due_date").and_then(Value::as_timestamp_millis).is_some())
        .take(SHORT_LIST_LEN)
        .cloned()
        .collect())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub greeting: String,
    pub tasks: StatusBreakdown,
    pub projects: StatusBreakdown,
    pub recent_tasks: Vec<Record>,
    pub upcoming_deadlines: Vec<Record>,
}

impl Dashboard {
    pub fn compute(
        identity: Option<&Identity>,
        tasks: &[Record],
        projects: &[Record],
        projector: &Projector,
    ) -> Result<Self> {
        Ok(Self {
            greeting: greeting(identity),
            tasks: StatusBreakdown::compute(EntityKind::Task, tasks, projector.ranks()),
            projects: StatusBreakdown::compute(EntityKind::Project, projects, projector.ranks()),
            recent_tasks: recent_tasks(tasks),
            upcoming_deadlines: upcoming_deadlines(tasks, projector)?,
        })
    }

    /// Fetch tasks and projects concurrently, then aggregate.
    pub async fn load(
        tasks: &TaskService,
        projects: &ProjectService,
        auth: &dyn AuthProvider,
        projector: &Projector,
    ) -> Result<Self> {
        let (task_rows, project_rows) = futures::try_join!(tasks.fetch_all(), projects.fetch_all())?;
        let identity = auth.current_user().await;
        debug!(
            tasks = task_rows.len(),
            projects = project_rows.len(),
            "dashboard data loaded"
        );
        Self::compute(identity.as_ref(), &task_rows, &project_rows, projector)
    }
}

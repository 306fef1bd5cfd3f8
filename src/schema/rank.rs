use crate::core::{EntityKind, Value};
use std::collections::HashMap;

/// Rank given to values missing from a table.
pub const UNRANKED: i64 = 0;

/// Ordinal ranks for enumerated fields, keyed by entity kind and field name.
///
/// This is the one place enum orderings are defined; the sort engine and the
/// dashboard both read from it.
#[derive(Debug, Clone, Default)]
pub struct RankTables {
    tables: HashMap<(EntityKind, String), HashMap<String, i64>>,
}

impl RankTables {
    /// No tables at all: every value ranks [`UNRANKED`].
    pub fn empty() -> Self {
        Self::default()
    }

    /// The board's stock orderings.
    pub fn standard() -> Self {
        Self::empty()
            .with_table(
                EntityKind::Task,
                "priority",
                &[("High", 3), ("Medium", 2), ("Low", 1)],
            )
            .with_table(
                EntityKind::Task,
                "status",
                &[("To Do", 1), ("In Progress", 2), ("Completed", 3)],
            )
            .with_table(
                EntityKind::Project,
                "status",
                &[
                    ("Not Started", 1),
                    ("In Progress", 2),
                    ("On Hold", 3),
                    ("Completed", 4),
                ],
            )
            .with_table(
                EntityKind::QuickTask,
                "priority",
                &[("high", 3), ("medium", 2), ("low", 1)],
            )
    }

    /// Install (or replace) the table for one entity field.
    pub fn with_table(mut self, kind: EntityKind, field: &str, entries: &[(&str, i64)]) -> Self {
        let table = entries
            .iter()
            .map(|(label, rank)| (label.to_string(), *rank))
            .collect();
        self.tables.insert((kind, field.to_string()), table);
        self
    }

    pub fn has_table(&self, kind: EntityKind, field: &str) -> bool {
        self.tables.contains_key(&(kind, field.to_string()))
    }

    /// Rank of a field value. Non-text, missing and unmapped values rank 0.
    pub fn rank(&self, kind: EntityKind, field: &str, value: Option<&Value>) -> i64 {
        let Some(label) = value.and_then(Value::as_str) else {
            return UNRANKED;
        };
        self.tables
            .get(&(kind, field.to_string()))
            .and_then(|table| table.get(label))
            .copied()
            .unwrap_or(UNRANKED)
    }

    /// Labels of a table ordered by rank, lowest first.
    pub fn labels(&self, kind: EntityKind, field: &str) -> Vec<&str> {
        let Some(table) = self.tables.get(&(kind, field.to_string())) else {
            return Vec::new();
        };
        let mut entries: Vec<(&str, i64)> =
            table.iter().map(|(label, rank)| (label.as_str(), *rank)).collect();
        entries.sort_by_key(|(_, rank)| *rank);
        entries.into_iter().map(|(label, _)| label).collect()
    }
}

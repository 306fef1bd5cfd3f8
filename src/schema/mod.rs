// ============================================================================
// src/schema/mod.rs - Entity schemas: field allow-lists and sort catalog
// ============================================================================

pub mod rank;

pub use rank::RankTables;

use crate::core::{BoardError, EntityKind, ID_FIELDS, Result};
use crate::executor::sort::SortDirection;

/// How the values of a sort key are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// ISO-8601 date or date-time strings
    Date,
    /// Integers and floats
    Numeric,
    /// Locale-aware text collation
    Text,
    /// Ordinal enum ranks from [`RankTables`]
    Rank,
}

/// One entry of an entity's sort allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortField {
    pub name: &'static str,
    pub comparison: Comparison,
}

impl SortField {
    const fn new(name: &'static str, comparison: Comparison) -> Self {
        Self { name, comparison }
    }
}

/// Static description of one entity kind.
#[derive(Debug)]
pub struct EntitySchema {
    pub kind: EntityKind,
    /// Backend table the records live in
    pub table: &'static str,
    /// Field shown as the record's name in lists
    pub display_field: &'static str,
    pub status_field: &'static str,
    /// Every field a record of this kind may carry
    pub fields: &'static [&'static str],
    /// Fields a create/update form submits
    pub editable_fields: &'static [&'static str],
    /// Fields preserved by an update besides identity
    pub creation_fields: &'static [&'static str],
    pub sort_fields: &'static [SortField],
    pub default_sort: (&'static str, SortDirection),
}

impl EntitySchema {
    /// Whether `field` is on this entity's allow-list. Identity fields always are.
    pub fn has_field(&self, field: &str) -> bool {
        ID_FIELDS.contains(&field) || self.fields.contains(&field)
    }

    pub fn require_field(&self, field: &str) -> Result<()> {
        if self.has_field(field) {
            Ok(())
        } else {
            Err(BoardError::UnknownField {
                kind: self.kind,
                field: field.to_string(),
            })
        }
    }

    pub fn sort_field(&self, key: &str) -> Result<SortField> {
        self.sort_fields
            .iter()
            .copied()
            .find(|f| f.name == key)
            .ok_or_else(|| BoardError::UnknownSortKey {
                kind: self.kind,
                key: key.to_string(),
            })
    }

    /// Identity and creation metadata: never overwritten by an update.
    pub fn is_preserved_on_update(&self, field: &str) -> bool {
        ID_FIELDS.contains(&field) || self.creation_fields.contains(&field)
    }
}

static TASK: EntitySchema = EntitySchema {
    kind: EntityKind::Task,
    table: "task7",
    display_field: "title",
    status_field: "status",
    fields: &[
        "Id",
        "Name",
        "title",
        "description",
        "due_date",
        "status",
        "priority",
        "assignee",
        "tags",
        "CreatedOn",
        "ModifiedOn",
    ],
    editable_fields: &["title", "description", "due_date", "status", "priority", "tags"],
    creation_fields: &["CreatedOn"],
    sort_fields: &[
        SortField::new("due_date", Comparison::Date),
        SortField::new("priority", Comparison::Rank),
        SortField::new("title", Comparison::Text),
        SortField::new("status", Comparison::Rank),
        SortField::new("CreatedOn", Comparison::Date),
        SortField::new("ModifiedOn", Comparison::Date),
        SortField::new("Id", Comparison::Numeric),
    ],
    default_sort: ("due_date", SortDirection::Ascending),
};

static PROJECT: EntitySchema = EntitySchema {
    kind: EntityKind::Project,
    table: "project3",
    display_field: "Name",
    status_field: "status",
    fields: &[
        "Id",
        "Name",
        "description",
        "start_date",
        "end_date",
        "status",
        "team_members",
        "CreatedOn",
        "ModifiedOn",
    ],
    editable_fields: &[
        "Name",
        "description",
        "start_date",
        "end_date",
        "status",
        "team_members",
    ],
    creation_fields: &["CreatedOn"],
    sort_fields: &[
        SortField::new("start_date", Comparison::Date),
        SortField::new("end_date", Comparison::Date),
        SortField::new("Name", Comparison::Text),
        SortField::new("status", Comparison::Rank),
        SortField::new("CreatedOn", Comparison::Date),
        SortField::new("ModifiedOn", Comparison::Date),
        SortField::new("Id", Comparison::Numeric),
    ],
    default_sort: ("start_date", SortDirection::Ascending),
};

static QUICK_TASK: EntitySchema = EntitySchema {
    kind: EntityKind::QuickTask,
    table: "tasks",
    display_field: "title",
    status_field: "completed",
    fields: &[
        "id",
        "title",
        "description",
        "dueDate",
        "priority",
        "completed",
        "createdAt",
        "updatedAt",
        "completedAt",
    ],
    editable_fields: &["title", "description", "dueDate", "priority"],
    creation_fields: &["createdAt"],
    sort_fields: &[
        SortField::new("createdAt", Comparison::Date),
        SortField::new("dueDate", Comparison::Date),
        SortField::new("priority", Comparison::Rank),
        SortField::new("title", Comparison::Text),
    ],
    default_sort: ("createdAt", SortDirection::Descending),
};

/// Schema for an entity kind.
pub fn schema(kind: EntityKind) -> &'static EntitySchema {
    match kind {
        EntityKind::Task => &TASK,
        EntityKind::Project => &PROJECT,
        EntityKind::QuickTask => &QUICK_TASK,
    }
}

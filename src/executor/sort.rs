// ============================================================================
// src/executor/sort.rs - Record sorting
// ============================================================================
//
// Design Patterns:
// - Comparator Pattern: one comparison rule per key type
// - Strategy Pattern: configurable missing-value placement and direction
//
// Features:
// - Date, numeric, locale-aware text and ranked-enum keys
// - Missing values placed by an explicit MissingValuePolicy
// - Direction flips the primary comparison only
// - Ties always keep store order, whatever the direction
//
// ============================================================================

use crate::core::{BoardError, EntityKind, Record, Result};
use crate::executor::collation::locale_compare;
use crate::schema::{Comparison, RankTables, schema};
use crate::storage::Entry;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// SORT DIRECTION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn is_descending(self) -> bool {
        matches!(self, Self::Descending)
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Ascending),
            "desc" | "descending" => Ok(Self::Descending),
            other => Err(BoardError::Config(format!("unknown sort direction '{}'", other))),
        }
    }
}

// ============================================================================
// MISSING VALUE STRATEGY
// ============================================================================

/// Where records without a date (or number) go for date/numeric keys.
///
/// Applied before direction, so `Last` means "latest possible": last when
/// ascending, first when descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingValuePolicy {
    /// Missing sorts as positive infinity
    #[default]
    Last,
    /// Missing sorts as negative infinity
    First,
    /// Missing sorts as the Unix epoch (numeric zero)
    Epoch,
}

impl FromStr for MissingValuePolicy {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "last" => Ok(Self::Last),
            "first" => Ok(Self::First),
            "epoch" => Ok(Self::Epoch),
            other => Err(BoardError::Config(format!(
                "missing value policy must be one of: last, first, epoch (got '{}')",
                other
            ))),
        }
    }
}

// ============================================================================
// SORT KEY - validated field, direction and comparison
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub kind: EntityKind,
    pub field: &'static str,
    pub comparison: Comparison,
    pub direction: SortDirection,
    pub missing: MissingValuePolicy,
}

impl SortKey {
    /// Look the key up on the entity's sort allow-list.
    pub fn new(kind: EntityKind, key: &str, direction: SortDirection) -> Result<Self> {
        let field = schema(kind).sort_field(key)?;
        Ok(Self {
            kind,
            field: field.name,
            comparison: field.comparison,
            direction,
            missing: MissingValuePolicy::default(),
        })
    }

    /// The entity's default list ordering, checked against the allow-list
    /// like any other key.
    pub fn default_for(kind: EntityKind) -> Result<Self> {
        let (field, direction) = schema(kind).default_sort;
        Self::new(kind, field, direction)
    }

    pub fn with_missing_policy(mut self, missing: MissingValuePolicy) -> Self {
        self.missing = missing;
        self
    }

    pub fn with_direction(mut self, direction: SortDirection) -> Self {
        self.direction = direction;
        self
    }
}

// ============================================================================
// SORT VALUE - extracted, comparable key
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    /// Dates (epoch millis) and numbers; `None` when missing
    Scalar(Option<f64>),
    Rank(i64),
    Text(String),
}

// ============================================================================
// RECORD COMPARATOR
// ============================================================================

pub struct RecordComparator<'a> {
    key: SortKey,
    ranks: &'a RankTables,
}

impl<'a> RecordComparator<'a> {
    pub fn new(key: SortKey, ranks: &'a RankTables) -> Self {
        Self { key, ranks }
    }

    /// Pull the comparable value for this key out of a record.
    pub fn extract(&self, record: &Record) -> SortValue {
        let raw = record.get(self.key.field);
        match self.key.comparison {
            Comparison::Date => {
                SortValue::Scalar(raw.and_then(|v| v.as_timestamp_millis()).map(|ms| ms as f64))
            }
            Comparison::Numeric => SortValue::Scalar(raw.and_then(|v| v.as_f64())),
            Comparison::Rank => SortValue::Rank(self.ranks.rank(self.key.kind, self.key.field, raw)),
            Comparison::Text => SortValue::Text(
                raw.and_then(|v| v.as_str()).unwrap_or_default().to_string(),
            ),
        }
    }

    /// Primary comparison with direction applied. No tie-break.
    pub fn compare_values(&self, a: &SortValue, b: &SortValue) -> Ordering {
        let ordering = match (a, b) {
            (SortValue::Scalar(a), SortValue::Scalar(b)) => self.compare_scalars(*a, *b),
            (SortValue::Rank(a), SortValue::Rank(b)) => a.cmp(b),
            (SortValue::Text(a), SortValue::Text(b)) => locale_compare(a, b),
            // one key never yields mixed shapes
            _ => Ordering::Equal,
        };

        if self.key.direction.is_descending() {
            ordering.reverse()
        } else {
            ordering
        }
    }

    fn compare_scalars(&self, a: Option<f64>, b: Option<f64>) -> Ordering {
        match self.key.missing {
            MissingValuePolicy::Epoch => a.unwrap_or(0.0).total_cmp(&b.unwrap_or(0.0)),
            policy => match (a, b) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => match policy {
                    MissingValuePolicy::First => Ordering::Less,
                    _ => Ordering::Greater,
                },
                (Some(_), None) => match policy {
                    MissingValuePolicy::First => Ordering::Greater,
                    _ => Ordering::Less,
                },
                (Some(a), Some(b)) => a.total_cmp(&b),
            },
        }
    }

    /// Full comparison of two entries: primary key, then store order.
    pub fn compare(&self, a: &Entry<'_>, b: &Entry<'_>) -> Ordering {
        self.compare_values(&self.extract(a.record), &self.extract(b.record))
            .then_with(|| a.seq.cmp(&b.seq))
    }
}

// ============================================================================
// SORT EXECUTOR
// ============================================================================

pub struct SortExecutor;

impl SortExecutor {
    /// Sort entries in place.
    ///
    /// Keys are extracted once per entry before sorting. The comparator ends
    /// with the store sequence, so the order is total and independent of
    /// the input order.
    pub fn sort(entries: &mut Vec<Entry<'_>>, key: SortKey, ranks: &RankTables) {
        if entries.len() < 2 {
            return;
        }

        let comparator = RecordComparator::new(key, ranks);
        let mut keyed: Vec<(SortValue, Entry<'_>)> = entries
            .drain(..)
            .map(|entry| (comparator.extract(entry.record), entry))
            .collect();

        keyed.sort_by(|(va, ea), (vb, eb)| {
            comparator
                .compare_values(va, vb)
                .then_with(|| ea.seq.cmp(&eb.seq))
        });

        entries.extend(keyed.into_iter().map(|(_, entry)| entry));
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{RecordId, Value};
    use crate::storage::entries_of;

    fn ids(entries: &[Entry<'_>]) -> Vec<RecordId> {
        entries.iter().filter_map(|e| e.record.id()).collect()
    }

    fn rids(raw: &[i64]) -> Vec<RecordId> {
        raw.iter().copied().map(RecordId::Int).collect()
    }

    fn sorted(records: &[Record], key: SortKey) -> Vec<RecordId> {
        let ranks = RankTables::standard();
        let mut entries: Vec<Entry<'_>> = entries_of(records).collect();
        SortExecutor::sort(&mut entries, key, &ranks);
        ids(&entries)
    }

    fn task_key(field: &str, direction: SortDirection) -> SortKey {
        SortKey::new(EntityKind::Task, field, direction).unwrap()
    }

    #[test]
    fn test_direction_parsing_and_toggle() {
        assert_eq!("desc".parse::<SortDirection>().unwrap(), SortDirection::Descending);
        assert_eq!("ASC".parse::<SortDirection>().unwrap(), SortDirection::Ascending);
        assert!("up".parse::<SortDirection>().is_err());
        assert_eq!(SortDirection::Ascending.toggled(), SortDirection::Descending);
    }

    #[test]
    fn test_unknown_sort_key() {
        let err = SortKey::new(EntityKind::Project, "priority", SortDirection::Ascending);
        assert!(matches!(err, Err(BoardError::UnknownSortKey { .. })));
    }

    #[test]
    fn test_priority_rank_ordering() {
        let records = vec![
            Record::new(1).with("priority", "Low"),
            Record::new(2).with("priority", "High"),
            Record::new(3).with("priority", "Medium"),
            Record::new(4).with("priority", "Urgent"),
        ];
        assert_eq!(
            sorted(&records, task_key("priority", SortDirection::Ascending)),
            rids(&[4, 1, 3, 2])
        );
        assert_eq!(
            sorted(&records, task_key("priority", SortDirection::Descending)),
            rids(&[2, 3, 1, 4])
        );
    }

    #[test]
    fn test_missing_dates_are_latest_by_default() {
        let records = vec![
            Record::new(1).with("due_date", Value::Null),
            Record::new(2).with("due_date", "2024-03-01"),
            Record::new(3),
            Record::new(4).with("due_date", "2024-01-01"),
        ];
        assert_eq!(
            sorted(&records, task_key("due_date", SortDirection::Ascending)),
            rids(&[4, 2, 1, 3])
        );
        // missing first when descending, still in store order among themselves
        assert_eq!(
            sorted(&records, task_key("due_date", SortDirection::Descending)),
            rids(&[1, 3, 2, 4])
        );
    }

    #[test]
    fn test_missing_value_policies() {
        let records = vec![
            Record::new(1).with("due_date", "1969-12-31"),
            Record::new(2),
            Record::new(3).with("due_date", "2024-01-01"),
        ];

        let first = task_key("due_date", SortDirection::Ascending)
            .with_missing_policy(MissingValuePolicy::First);
        assert_eq!(sorted(&records, first), rids(&[2, 1, 3]));

        let epoch = task_key("due_date", SortDirection::Ascending)
            .with_missing_policy(MissingValuePolicy::Epoch);
        assert_eq!(sorted(&records, epoch), rids(&[1, 2, 3]));
    }

    #[test]
    fn test_malformed_date_counts_as_missing() {
        let records = vec![
            Record::new(1).with("due_date", "someday"),
            Record::new(2).with("due_date", "2024-01-01"),
        ];
        assert_eq!(
            sorted(&records, task_key("due_date", SortDirection::Ascending)),
            rids(&[2, 1])
        );
    }

    #[test]
    fn test_text_sort_is_locale_aware() {
        let records = vec![
            Record::new(1).with("title", "banana"),
            Record::new(2).with("title", "Apple"),
            Record::new(3),
            Record::new(4).with("title", "Éclair"),
        ];
        assert_eq!(
            sorted(&records, task_key("title", SortDirection::Ascending)),
            rids(&[3, 2, 1, 4])
        );
    }

    #[test]
    fn test_ties_keep_store_order_in_both_directions() {
        let records = vec![
            Record::new(10).with("status", "In Progress"),
            Record::new(11).with("status", "To Do"),
            Record::new(12).with("status", "In Progress"),
            Record::new(13).with("status", "To Do"),
        ];
        assert_eq!(
            sorted(&records, task_key("status", SortDirection::Ascending)),
            rids(&[11, 13, 10, 12])
        );
        assert_eq!(
            sorted(&records, task_key("status", SortDirection::Descending)),
            rids(&[10, 12, 11, 13])
        );
    }

    #[test]
    fn test_tie_break_uses_sequence_not_input_position() {
        let a = Record::new(1).with("priority", "High");
        let b = Record::new(2).with("priority", "High");
        let ranks = RankTables::standard();
        let mut entries = vec![Entry { seq: 5, record: &a }, Entry { seq: 2, record: &b }];
        SortExecutor::sort(&mut entries, task_key("priority", SortDirection::Descending), &ranks);
        assert_eq!(ids(&entries), rids(&[2, 1]));
    }

    #[test]
    fn test_numeric_key() {
        let records = vec![
            Record::empty().with("Id", 30),
            Record::empty().with("Id", 4),
            Record::empty().with("Id", 200),
        ];
        assert_eq!(
            sorted(&records, task_key("Id", SortDirection::Ascending)),
            rids(&[4, 30, 200])
        );
    }

    #[test]
    fn test_default_keys() {
        let key = SortKey::default_for(EntityKind::QuickTask).unwrap();
        assert_eq!(key.field, "createdAt");
        assert_eq!(key.direction, SortDirection::Descending);
        assert_eq!(key.comparison, Comparison::Date);
    }

    #[test]
    fn test_default_key_matches_allow_list_entry() {
        for kind in EntityKind::ALL {
            let key = SortKey::default_for(kind).unwrap();
            let (field, direction) = schema(kind).default_sort;
            let allowed = schema(kind).sort_field(field).unwrap();
            assert_eq!(key.field, allowed.name);
            assert_eq!(key.comparison, allowed.comparison);
            assert_eq!(key.direction, direction);
        }
    }
}

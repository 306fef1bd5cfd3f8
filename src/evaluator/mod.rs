// ============================================================================
// src/evaluator/mod.rs - Filter engine
// ============================================================================
//
// A FilterCriterion is plain data (what the user picked); a Filter is the
// criterion checked against an entity's field allow-list and ready to run.
// Evaluation is pure: records are only ever read.
//
// ============================================================================

pub mod presets;

pub use presets::{preset, preset_names};

use crate::core::{EntityKind, Record, Result, Value};
use crate::schema::schema;

/// Right-hand side of an equality test.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Value(Value),
    /// Matches records where the field is absent or null.
    Absent,
}

impl From<Value> for FilterValue {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Value(Value::Text(value))
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Value(Value::Integer(value))
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self::Value(Value::Boolean(value))
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum FilterCriterion {
    #[default]
    All,
    Equals(String, FilterValue),
    NotEquals(String, FilterValue),
    /// Field present and not null
    Present(String),
    /// Conjunction; empty matches everything
    And(Vec<FilterCriterion>),
}

impl FilterCriterion {
    pub fn equals(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::Equals(field.into(), value.into())
    }

    pub fn not_equals(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::NotEquals(field.into(), value.into())
    }

    pub fn present(field: impl Into<String>) -> Self {
        Self::Present(field.into())
    }

    pub fn and(self, other: FilterCriterion) -> Self {
        match (self, other) {
            (Self::All, other) => other,
            (this, Self::All) => this,
            (Self::And(mut items), Self::And(more)) => {
                items.extend(more);
                Self::And(items)
            }
            (Self::And(mut items), other) => {
                items.push(other);
                Self::And(items)
            }
            (this, other) => Self::And(vec![this, other]),
        }
    }

    fn visit_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::All => {}
            Self::Equals(field, _) | Self::NotEquals(field, _) | Self::Present(field) => {
                out.push(field)
            }
            Self::And(items) => items.iter().for_each(|c| c.visit_fields(out)),
        }
    }

    fn matches(&self, record: &Record) -> bool {
        match self {
            Self::All => true,
            Self::Equals(field, expected) => field_equals(record, field, expected),
            Self::NotEquals(field, expected) => !field_equals(record, field, expected),
            Self::Present(field) => !record.is_missing(field),
            Self::And(items) => items.iter().all(|c| c.matches(record)),
        }
    }
}

fn field_equals(record: &Record, field: &str, expected: &FilterValue) -> bool {
    match (record.get(field), expected) {
        (None | Some(Value::Null), FilterValue::Absent) => true,
        (None | Some(Value::Null), FilterValue::Value(_)) => false,
        (Some(_), FilterValue::Absent) => false,
        (Some(actual), FilterValue::Value(wanted)) => actual == wanted,
    }
}

/// A criterion validated for one entity kind.
#[derive(Debug, Clone)]
pub struct Filter {
    kind: EntityKind,
    criterion: FilterCriterion,
}

impl Filter {
    /// Check every referenced field against the entity's allow-list.
    pub fn compile(kind: EntityKind, criterion: FilterCriterion) -> Result<Self> {
        let entity = schema(kind);
        let mut fields = Vec::new();
        criterion.visit_fields(&mut fields);
        for field in fields {
            entity.require_field(field)?;
        }
        Ok(Self { kind, criterion })
    }

    pub fn all(kind: EntityKind) -> Self {
        Self {
            kind,
            criterion: FilterCriterion::All,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn criterion(&self) -> &FilterCriterion {
        &self.criterion
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.criterion.matches(record)
    }
}

use super::{BoardError, Result, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Field names that carry record identity, in lookup order.
///
/// Backend rows use `Id`; the local quick-task list uses `id`.
pub const ID_FIELDS: [&str; 2] = ["id", "Id"];

/// Identity of a record within one collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl RecordId {
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Integer(i) => Some(Self::Int(*i)),
            Value::Text(s) if !s.is_empty() => Some(Self::Text(s.clone())),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::Int(i) => Value::Integer(*i),
            Self::Text(s) => Value::Text(s.clone()),
        }
    }

    /// Parse user input: all-digit strings become integer ids.
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<i64>() {
            Ok(i) => Self::Int(i),
            Err(_) => Self::Text(raw.to_string()),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{}", i),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for RecordId {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// A record: a mapping from field name to value.
///
/// Serializes as a flat JSON object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    /// Create a record carrying only its `id`.
    pub fn new(id: impl Into<RecordId>) -> Self {
        let mut record = Self::default();
        record.set("id", id.into().to_value());
        record
    }

    /// Create a record without identity (e.g. a create payload).
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Text content of a field, when it holds text.
    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    /// Absent and `Null` fields are both missing.
    pub fn is_missing(&self, field: &str) -> bool {
        self.get(field).is_none_or(Value::is_null)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Name of the identity field this record uses, if any.
    pub fn id_field(&self) -> Option<&'static str> {
        ID_FIELDS
            .iter()
            .copied()
            .find(|name| self.get(name).and_then(RecordId::from_value).is_some())
    }

    pub fn id(&self) -> Option<RecordId> {
        self.id_field()
            .and_then(|name| self.get(name))
            .and_then(RecordId::from_value)
    }

    pub fn require_id(&self) -> Result<RecordId> {
        self.id()
            .ok_or_else(|| BoardError::validation("id", "Record has no identity field"))
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Keep only the named fields (plus identity), like a backend field list.
    pub fn project_fields(&self, names: &[&str]) -> Record {
        let mut out = Record::default();
        for (name, value) in &self.fields {
            if names.contains(&name.as_str()) || ID_FIELDS.contains(&name.as_str()) {
                out.fields.insert(name.clone(), value.clone());
            }
        }
        out
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// The entity kinds the board manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Task,
    Project,
    /// Tasks of the legacy quick list kept in local storage.
    QuickTask,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [Self::Task, Self::Project, Self::QuickTask];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Project => "project",
            Self::QuickTask => "quick",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "task" | "tasks" => Ok(Self::Task),
            "project" | "projects" => Ok(Self::Project),
            "quick" | "quick_task" | "quick-task" => Ok(Self::QuickTask),
            other => Err(BoardError::Config(format!("unknown entity kind '{}'", other))),
        }
    }
}

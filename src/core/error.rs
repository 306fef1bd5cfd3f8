use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use super::{EntityKind, RecordId};

/// Field-level validation messages, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// Drop the message for a field, as when the user edits it again.
    pub fn clear(&mut self, field: &str) {
        self.fields.remove(field);
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `Ok(())` when empty, otherwise a [`BoardError::Validation`].
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(BoardError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

#[derive(Error, Debug)]
pub enum BoardError {
    #[error("Record '{id}' not found in {kind}")]
    NotFound { kind: EntityKind, id: RecordId },

    #[error("Record '{id}' already exists in {kind}")]
    DuplicateId { kind: EntityKind, id: RecordId },

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Remote error: {0}")]
    Remote(String),

    #[error("Field '{field}' is not filterable for {kind}")]
    UnknownField { kind: EntityKind, field: String },

    #[error("Field '{key}' is not a sort key for {kind}")]
    UnknownSortKey { kind: EntityKind, key: String },

    #[error("Filter preset '{preset}' is not defined for {kind}")]
    UnknownPreset { kind: EntityKind, preset: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Session for {0} is closed")]
    SessionClosed(EntityKind),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BoardError>;

impl BoardError {
    pub fn not_found(kind: EntityKind, id: impl Into<RecordId>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote(message.into())
    }

    /// Single-field validation failure.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(field, message);
        Self::Validation(errors)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Message shown in the page-level error banner.
    ///
    /// Validation errors are rendered inline per field, so they have none.
    pub fn banner_message(&self) -> Option<String> {
        match self {
            Self::Validation(_) => None,
            Self::NotFound { kind, .. } => Some(format!(
                "The requested {} could not be found. It may have been deleted.",
                kind
            )),
            Self::Remote(_) | Self::Io(_) | Self::Serialization(_) => {
                Some("Something went wrong while talking to the server. Please try again later.".into())
            }
            other => Some(other.to_string()),
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for BoardError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::Remote(format!("lock poisoned: {}", err))
    }
}

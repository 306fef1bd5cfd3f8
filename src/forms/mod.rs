// ============================================================================
// src/forms/mod.rs - Create/edit form models and validation
// ============================================================================
//
// A form holds what the user typed. `submit()` validates it and produces the
// payload record for the entity service; failures come back as a
// field -> message map so each message can sit next to its input.
//
// ============================================================================

use crate::core::{EntityKind, Record, Result, ValidationErrors, Value, parse_timestamp_millis};
use chrono::{DateTime, Utc};

pub const TITLE_REQUIRED: &str = "Title is required";
pub const NAME_REQUIRED: &str = "Project name is required";
pub const INVALID_DATE: &str = "Invalid date format";
pub const END_BEFORE_START: &str = "End date must be after start date";

pub trait Form {
    const KIND: EntityKind;

    fn validate(&self) -> ValidationErrors;

    /// Payload with the entity's editable fields.
    fn to_payload(&self) -> Record;

    fn submit(&self) -> Result<Record> {
        self.validate().into_result()?;
        Ok(self.to_payload())
    }
}

fn check_date(errors: &mut ValidationErrors, field: &str, raw: &str) -> Option<i64> {
    if raw.trim().is_empty() {
        return None;
    }
    let parsed = parse_timestamp_millis(raw);
    if parsed.is_none() {
        errors.add(field, INVALID_DATE);
    }
    parsed
}

fn date_value(raw: &str) -> Value {
    match raw.trim() {
        "" => Value::Null,
        date => Value::from(date),
    }
}

/// Stored date or date-time reduced to the `YYYY-MM-DD` a date input shows.
fn date_input(record: &Record, field: &str) -> String {
    record
        .get(field)
        .and_then(Value::as_timestamp_millis)
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn text_or(record: &Record, field: &str, default: &str) -> String {
    record
        .text(field)
        .filter(|s| !s.is_empty())
        .unwrap_or(default)
        .to_string()
}

/// Comma-joined text or a list of strings, as a list.
fn string_list(record: &Record, field: &str) -> Vec<String> {
    match record.get(field) {
        Some(Value::Text(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::List(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

// ============================================================================
// TASK FORM
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub status: String,
    pub priority: String,
    pub tags: Vec<String>,
}

impl Default for TaskForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            due_date: String::new(),
            status: "To Do".to_string(),
            priority: "Medium".to_string(),
            tags: Vec::new(),
        }
    }
}

impl TaskForm {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Self::default()
        }
    }

    /// Pre-fill the form for editing an existing task.
    pub fn from_record(record: &Record) -> Self {
        Self {
            title: text_or(record, "title", ""),
            description: text_or(record, "description", ""),
            due_date: date_input(record, "due_date"),
            status: text_or(record, "status", "To Do"),
            priority: text_or(record, "priority", "Medium"),
            tags: string_list(record, "tags"),
        }
    }
}

impl Form for TaskForm {
    const KIND: EntityKind = EntityKind::Task;

    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if self.title.trim().is_empty() {
            errors.add("title", TITLE_REQUIRED);
        }
        check_date(&mut errors, "due_date", &self.due_date);
        errors
    }

    fn to_payload(&self) -> Record {
        Record::empty()
            .with("title", self.title.trim())
            .with("description", self.description.as_str())
            .with("due_date", date_value(&self.due_date))
            .with("status", self.status.as_str())
            .with("priority", self.priority.as_str())
            .with("tags", self.tags.join(","))
    }
}

// ============================================================================
// PROJECT FORM
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectForm {
    pub name: String,
    pub description: String,
    pub start_date: String,
    pub end_date: String,
    pub status: String,
    pub team_members: Vec<String>,
}

impl Default for ProjectForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            start_date: String::new(),
            end_date: String::new(),
            status: "Not Started".to_string(),
            team_members: Vec::new(),
        }
    }
}

impl ProjectForm {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn from_record(record: &Record) -> Self {
        Self {
            name: text_or(record, "Name", ""),
            description: text_or(record, "description", ""),
            start_date: date_input(record, "start_date"),
            end_date: date_input(record, "end_date"),
            status: text_or(record, "status", "Not Started"),
            team_members: string_list(record, "team_members"),
        }
    }
}

impl Form for ProjectForm {
    const KIND: EntityKind = EntityKind::Project;

    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if self.name.trim().is_empty() {
            errors.add("Name", NAME_REQUIRED);
        }
        let start = check_date(&mut errors, "start_date", &self.start_date);
        let end = check_date(&mut errors, "end_date", &self.end_date);
        if matches!((start, end), (Some(start), Some(end)) if start > end) {
            errors.add("end_date", END_BEFORE_START);
        }
        errors
    }

    fn to_payload(&self) -> Record {
        Record::empty()
            .with("Name", self.name.trim())
            .with("description", self.description.as_str())
            .with("start_date", date_value(&self.start_date))
            .with("end_date", date_value(&self.end_date))
            .with("status", self.status.as_str())
            .with("team_members", self.team_members.clone())
    }
}

// ============================================================================
// QUICK TASK FORM
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct QuickTaskForm {
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub priority: String,
}

impl Default for QuickTaskForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            due_date: String::new(),
            priority: "medium".to_string(),
        }
    }
}

impl QuickTaskForm {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Self::default()
        }
    }

    pub fn from_record(record: &Record) -> Self {
        Self {
            title: text_or(record, "title", ""),
            description: text_or(record, "description", ""),
            due_date: text_or(record, "dueDate", ""),
            priority: text_or(record, "priority", "medium"),
        }
    }
}

impl Form for QuickTaskForm {
    const KIND: EntityKind = EntityKind::QuickTask;

    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if self.title.trim().is_empty() {
            errors.add("title", TITLE_REQUIRED);
        }
        check_date(&mut errors, "dueDate", &self.due_date);
        errors
    }

    fn to_payload(&self) -> Record {
        Record::empty()
            .with("title", self.title.trim())
            .with("description", self.description.trim())
            .with("dueDate", self.due_date.trim())
            .with("priority", self.priority.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BoardError;

    fn errors_of(result: Result<Record>) -> ValidationErrors {
        match result {
            Err(BoardError::Validation(errors)) => errors,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_task_title_required() {
        let errors = errors_of(TaskForm::new("   ").submit());
        assert_eq!(errors.get("title"), Some(TITLE_REQUIRED));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_task_invalid_date() {
        let form = TaskForm {
            due_date: "next tuesday".into(),
            ..TaskForm::new("Plan")
        };
        let errors = errors_of(form.submit());
        assert_eq!(errors.get("due_date"), Some(INVALID_DATE));
    }

    #[test]
    fn test_task_payload() {
        let form = TaskForm {
            due_date: "2024-05-01".into(),
            tags: vec!["home".into(), "urgent".into()],
            ..TaskForm::new("  Plan trip ")
        };
        let payload = form.submit().unwrap();
        assert_eq!(payload.text("title"), Some("Plan trip"));
        assert_eq!(payload.text("tags"), Some("home,urgent"));
        assert_eq!(payload.text("status"), Some("To Do"));
        assert_eq!(payload.text("priority"), Some("Medium"));
        assert!(payload.id().is_none());
    }

    #[test]
    fn test_empty_due_date_is_null() {
        let payload = TaskForm::new("x").submit().unwrap();
        assert!(payload.is_missing("due_date"));
    }

    #[test]
    fn test_task_from_record() {
        let record = Record::new(3)
            .with("title", "Ship")
            .with("due_date", "2024-05-01T15:30:00Z")
            .with("tags", "a, b");
        let form = TaskForm::from_record(&record);
        assert_eq!(form.due_date, "2024-05-01");
        assert_eq!(form.tags, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(form.status, "To Do");
    }

    #[test]
    fn test_project_messages() {
        let errors = errors_of(ProjectForm::default().submit());
        assert_eq!(errors.get("Name"), Some(NAME_REQUIRED));

        let form = ProjectForm {
            start_date: "2024-03-01".into(),
            end_date: "2024-02-01".into(),
            ..ProjectForm::new("Launch")
        };
        let errors = errors_of(form.submit());
        assert_eq!(errors.get("end_date"), Some(END_BEFORE_START));

        let form = ProjectForm {
            start_date: "2024-03-01".into(),
            end_date: "2024-03-01".into(),
            ..ProjectForm::new("Launch")
        };
        assert!(form.submit().is_ok());
    }

    #[test]
    fn test_project_invalid_dates_reported_per_field() {
        let form = ProjectForm {
            start_date: "soon".into(),
            end_date: "later".into(),
            ..ProjectForm::new("Launch")
        };
        let errors = errors_of(form.submit());
        assert_eq!(errors.get("start_date"), Some(INVALID_DATE));
        assert_eq!(errors.get("end_date"), Some(INVALID_DATE));
    }

    #[test]
    fn test_quick_task_defaults() {
        let payload = QuickTaskForm::new("Buy milk").submit().unwrap();
        assert_eq!(payload.text("priority"), Some("medium"));
        assert_eq!(errors_of(QuickTaskForm::default().submit()).get("title"), Some(TITLE_REQUIRED));
    }
}

use crate::core::{EntityKind, Result};
use crate::evaluator::{FilterCriterion, preset};
use crate::executor::{SortDirection, SortKey};
use crate::schema::schema;

/// The selections a list view currently shows: filter, sort key, direction.
///
/// Ephemeral. A fresh state starts on the `all` preset and the entity's
/// default sort.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    kind: EntityKind,
    preset: Option<String>,
    criterion: FilterCriterion,
    sort_key: &'static str,
    direction: SortDirection,
}

impl ViewState {
    pub fn new(kind: EntityKind) -> Self {
        let (sort_key, direction) = schema(kind).default_sort;
        Self {
            kind,
            preset: Some("all".to_string()),
            criterion: FilterCriterion::All,
            sort_key,
            direction,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Name of the selected preset, `None` after a custom criterion.
    pub fn preset(&self) -> Option<&str> {
        self.preset.as_deref()
    }

    pub fn criterion(&self) -> &FilterCriterion {
        &self.criterion
    }

    pub fn sort_key(&self) -> &'static str {
        self.sort_key
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    /// Select a named filter preset. Unknown names leave the state as is.
    pub fn select_preset(&mut self, name: &str) -> Result<()> {
        self.criterion = preset(self.kind, name)?;
        self.preset = Some(name.to_string());
        Ok(())
    }

    pub fn set_criterion(&mut self, criterion: FilterCriterion) {
        self.criterion = criterion;
        self.preset = None;
    }

    /// Select a key and direction outright.
    pub fn set_sort(&mut self, key: &str, direction: SortDirection) -> Result<()> {
        let key = SortKey::new(self.kind, key, direction)?;
        self.sort_key = key.field;
        self.direction = direction;
        Ok(())
    }

    /// Header click: the selected key flips direction, any other key is
    /// selected ascending.
    pub fn toggle_sort(&mut self, key: &str) -> Result<()> {
        let direction = if key == self.sort_key {
            self.direction.toggled()
        } else {
            SortDirection::Ascending
        };
        self.set_sort(key, direction)
    }

    /// Arrow shown next to a column header, if that column drives the sort.
    pub fn sort_indicator(&self, key: &str) -> Option<&'static str> {
        (key == self.sort_key).then(|| match self.direction {
            SortDirection::Ascending => "↑",
            SortDirection::Descending => "↓",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BoardError;

    #[test]
    fn test_defaults_follow_schema() {
        let tasks = ViewState::new(EntityKind::Task);
        assert_eq!(tasks.sort_key(), "due_date");
        assert_eq!(tasks.direction(), SortDirection::Ascending);
        assert_eq!(tasks.preset(), Some("all"));

        let quick = ViewState::new(EntityKind::QuickTask);
        assert_eq!(quick.sort_key(), "createdAt");
        assert_eq!(quick.direction(), SortDirection::Descending);
    }

    #[test]
    fn test_toggle_same_key_flips() {
        let mut state = ViewState::new(EntityKind::Task);
        state.toggle_sort("due_date").unwrap();
        assert_eq!(state.direction(), SortDirection::Descending);
        state.toggle_sort("due_date").unwrap();
        assert_eq!(state.direction(), SortDirection::Ascending);
    }

    #[test]
    fn test_toggle_other_key_selects_ascending() {
        let mut state = ViewState::new(EntityKind::Task);
        state.toggle_sort("due_date").unwrap();
        state.toggle_sort("priority").unwrap();
        assert_eq!(state.sort_key(), "priority");
        assert_eq!(state.direction(), SortDirection::Ascending);
    }

    #[test]
    fn test_unknown_key_leaves_state() {
        let mut state = ViewState::new(EntityKind::Project);
        let before = state.clone();
        assert!(matches!(
            state.toggle_sort("priority"),
            Err(BoardError::UnknownSortKey { .. })
        ));
        assert_eq!(state, before);
    }

    #[test]
    fn test_presets() {
        let mut state = ViewState::new(EntityKind::Project);
        state.select_preset("on-hold").unwrap();
        assert_eq!(state.preset(), Some("on-hold"));
        assert_eq!(state.criterion(), &FilterCriterion::equals("status", "On Hold"));

        assert!(state.select_preset("archived").is_err());
        assert_eq!(state.preset(), Some("on-hold"));

        state.set_criterion(FilterCriterion::present("end_date"));
        assert_eq!(state.preset(), None);
    }

    #[test]
    fn test_sort_indicator() {
        let mut state = ViewState::new(EntityKind::Task);
        assert_eq!(state.sort_indicator("due_date"), Some("↑"));
        assert_eq!(state.sort_indicator("title"), None);
        state.toggle_sort("due_date").unwrap();
        assert_eq!(state.sort_indicator("due_date"), Some("↓"));
    }
}

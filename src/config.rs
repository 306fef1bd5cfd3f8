use crate::core::{BoardError, EntityKind, Result};
use crate::executor::{MissingValuePolicy, SortDirection, SortKey};
use crate::remote::DEFAULT_PAGE_LIMIT;
use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;

pub const ENV_DATA: &str = "TASKBOARD_DATA";
pub const ENV_PAGE_SIZE: &str = "TASKBOARD_PAGE_SIZE";
pub const ENV_MISSING_DATES: &str = "TASKBOARD_MISSING_DATES";

/// Board configuration
///
/// Built with chained setters, or read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardConfig {
    /// Directory holding one JSON file per table
    pub data_dir: PathBuf,

    /// Records fetched per list call
    pub page_size: usize,

    /// Placement of records without a date
    pub missing_dates: MissingValuePolicy,

    /// Per-entity replacement for the built-in default sort
    pub default_sorts: BTreeMap<EntityKind, (String, SortDirection)>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("taskboard-data"),
            page_size: DEFAULT_PAGE_LIMIT,
            missing_dates: MissingValuePolicy::default(),
            default_sorts: BTreeMap::new(),
        }
    }
}

impl BoardConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the data directory
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Set the page size
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the missing-date policy
    pub fn missing_dates(mut self, policy: MissingValuePolicy) -> Self {
        self.missing_dates = policy;
        self
    }

    /// Override the default sort of one entity kind
    pub fn default_sort(mut self, kind: EntityKind, key: &str, direction: SortDirection) -> Self {
        self.default_sorts.insert(kind, (key.to_string(), direction));
        self
    }

    /// Sort key a new view of `kind` starts with.
    pub fn sort_key_for(&self, kind: EntityKind) -> Result<SortKey> {
        let key = match self.default_sorts.get(&kind) {
            Some((field, direction)) => SortKey::new(kind, field, *direction)?,
            None => SortKey::default_for(kind)?,
        };
        Ok(key.with_missing_policy(self.missing_dates))
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(BoardError::Config("page size must be at least 1".into()));
        }
        for kind in self.default_sorts.keys() {
            self.sort_key_for(*kind)?;
        }
        Ok(())
    }

    /// Read `TASKBOARD_DATA`, `TASKBOARD_PAGE_SIZE` and
    /// `TASKBOARD_MISSING_DATES`; unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(dir) = lookup(ENV_DATA).filter(|d| !d.trim().is_empty()) {
            config.data_dir = PathBuf::from(dir);
        }

        if let Some(raw) = lookup(ENV_PAGE_SIZE) {
            config.page_size = raw.trim().parse::<usize>().map_err(|_| {
                BoardError::Config(format!("{} must be a positive integer (got '{}')", ENV_PAGE_SIZE, raw))
            })?;
        }

        if let Some(raw) = lookup(ENV_MISSING_DATES) {
            config.missing_dates = raw.parse()?;
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = BoardConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, BoardConfig::default());
        assert_eq!(config.page_size, 100);
        assert_eq!(config.missing_dates, MissingValuePolicy::Last);
    }

    #[test]
    fn test_env_values() {
        let config = BoardConfig::from_lookup(lookup(&[
            (ENV_DATA, "/tmp/board"),
            (ENV_PAGE_SIZE, "25"),
            (ENV_MISSING_DATES, "epoch"),
        ]))
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/board"));
        assert_eq!(config.page_size, 25);
        assert_eq!(config.missing_dates, MissingValuePolicy::Epoch);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            BoardConfig::from_lookup(lookup(&[(ENV_PAGE_SIZE, "lots")])),
            Err(BoardError::Config(_))
        ));
        assert!(matches!(
            BoardConfig::from_lookup(lookup(&[(ENV_PAGE_SIZE, "0")])),
            Err(BoardError::Config(_))
        ));
        assert!(matches!(
            BoardConfig::from_lookup(lookup(&[(ENV_MISSING_DATES, "middle")])),
            Err(BoardError::Config(_))
        ));
    }

    #[test]
    fn test_default_sort_override() {
        let config = BoardConfig::new()
            .missing_dates(MissingValuePolicy::First)
            .default_sort(EntityKind::Task, "priority", SortDirection::Descending);
        let key = config.sort_key_for(EntityKind::Task).unwrap();
        assert_eq!(key.field, "priority");
        assert_eq!(key.direction, SortDirection::Descending);
        assert_eq!(key.missing, MissingValuePolicy::First);

        let project = config.sort_key_for(EntityKind::Project).unwrap();
        assert_eq!(project.field, "start_date");

        let bad = BoardConfig::new().default_sort(EntityKind::Project, "priority", SortDirection::Ascending);
        assert!(matches!(bad.validate(), Err(BoardError::UnknownSortKey { .. })));
    }
}

use super::FilterCriterion;
use crate::core::{BoardError, EntityKind, Result};

/// Dropdown filters offered by each list view, in display order.
const TASK_PRESETS: &[(&str, Option<&str>)] = &[
    ("all", None),
    ("todo", Some("To Do")),
    ("in-progress", Some("In Progress")),
    ("completed", Some("Completed")),
];

const PROJECT_PRESETS: &[(&str, Option<&str>)] = &[
    ("all", None),
    ("not-started", Some("Not Started")),
    ("in-progress", Some("In Progress")),
    ("on-hold", Some("On Hold")),
    ("completed", Some("Completed")),
];

const QUICK_PRESETS: &[&str] = &["all", "completed", "pending"];

pub fn preset_names(kind: EntityKind) -> Vec<&'static str> {
    match kind {
        EntityKind::Task => TASK_PRESETS.iter().map(|(name, _)| *name).collect(),
        EntityKind::Project => PROJECT_PRESETS.iter().map(|(name, _)| *name).collect(),
        EntityKind::QuickTask => QUICK_PRESETS.to_vec(),
    }
}

/// Resolve a named filter preset into a criterion.
pub fn preset(kind: EntityKind, name: &str) -> Result<FilterCriterion> {
    let unknown = || BoardError::UnknownPreset {
        kind,
        preset: name.to_string(),
    };

    let status_table = match kind {
        EntityKind::Task => TASK_PRESETS,
        EntityKind::Project => PROJECT_PRESETS,
        EntityKind::QuickTask => {
            return match name {
                "all" => Ok(FilterCriterion::All),
                "completed" => Ok(FilterCriterion::equals("completed", true)),
                // tasks saved before the flag existed have no `completed` field
                "pending" => Ok(FilterCriterion::not_equals("completed", true)),
                _ => Err(unknown()),
            };
        }
    };

    let (_, status) = status_table
        .iter()
        .find(|(preset, _)| *preset == name)
        .ok_or_else(unknown)?;

    Ok(match status {
        None => FilterCriterion::All,
        Some(status) => FilterCriterion::equals("status", *status),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Record;
    use crate::evaluator::Filter;

    #[test]
    fn test_task_presets() {
        assert_eq!(preset(EntityKind::Task, "all").unwrap(), FilterCriterion::All);
        assert_eq!(
            preset(EntityKind::Task, "in-progress").unwrap(),
            FilterCriterion::equals("status", "In Progress")
        );
        assert!(matches!(
            preset(EntityKind::Task, "on-hold"),
            Err(BoardError::UnknownPreset { .. })
        ));
    }

    #[test]
    fn test_project_presets() {
        assert_eq!(
            preset(EntityKind::Project, "on-hold").unwrap(),
            FilterCriterion::equals("status", "On Hold")
        );
        assert_eq!(preset_names(EntityKind::Project).len(), 5);
    }

    #[test]
    fn test_quick_pending_includes_unflagged() {
        let filter = Filter::compile(
            EntityKind::QuickTask,
            preset(EntityKind::QuickTask, "pending").unwrap(),
        )
        .unwrap();
        assert!(filter.matches(&Record::new("a").with("completed", false)));
        assert!(filter.matches(&Record::new("b")));
        assert!(!filter.matches(&Record::new("c").with("completed", true)));
    }

    #[test]
    fn test_every_preset_compiles() {
        for kind in EntityKind::ALL {
            for name in preset_names(kind) {
                let criterion = preset(kind, name).unwrap();
                assert!(Filter::compile(kind, criterion).is_ok(), "{kind}/{name}");
            }
        }
    }
}

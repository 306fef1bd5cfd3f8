// ============================================================================
// src/cli/mod.rs - Command-line front end
// ============================================================================
//
// Every command works on the JSON data files under the configured data
// directory and returns its output as text; `main` only prints it.
//
// ============================================================================

use crate::config::BoardConfig;
use crate::connection::StaticAuthProvider;
use crate::core::{EntityKind, RecordId};
use crate::dashboard::{Dashboard, QuickStats};
use crate::executor::SortDirection;
use crate::forms::{Form, ProjectForm, QuickTaskForm, TaskForm};
use crate::remote::{LocalFileRecordService, RecordService};
use crate::services::{ProjectService, QuickTaskService, TaskService};
use crate::session::BoardSession;
use crate::view::Projector;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "taskboard")]
#[command(about = "List, add and remove tasks and projects kept in local JSON files")]
pub struct Cli {
    /// Data directory (overrides TASKBOARD_DATA)
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show one list, filtered and sorted
    List {
        #[arg(long, default_value = "task")]
        kind: EntityKind,
        /// Filter preset, e.g. `todo`, `on-hold`, `pending`
        #[arg(long, default_value = "all")]
        filter: String,
        /// Sort key; defaults to the list's usual ordering
        #[arg(long)]
        sort: Option<String>,
        #[arg(long)]
        desc: bool,
    },
    /// Create a record
    Add {
        #[arg(long, default_value = "task")]
        kind: EntityKind,
        /// Task or quick task title
        #[arg(long)]
        title: Option<String>,
        /// Project name
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        /// Due date (tasks), YYYY-MM-DD
        #[arg(long)]
        due: Option<String>,
        /// Start date (projects), YYYY-MM-DD
        #[arg(long)]
        start: Option<String>,
        /// End date (projects), YYYY-MM-DD
        #[arg(long)]
        end: Option<String>,
        /// Comma-separated tags (tasks)
        #[arg(long)]
        tags: Option<String>,
    },
    /// Delete a record by id
    Remove {
        #[arg(long, default_value = "task")]
        kind: EntityKind,
        id: String,
    },
    /// Mark a quick task done, or open again
    Toggle { id: String },
    /// Dashboard summary
    Stats,
}

/// Columns shown by `list` for each kind.
pub fn list_columns(kind: EntityKind) -> &'static [&'static str] {
    match kind {
        EntityKind::Task => &["Id", "title", "status", "priority", "due_date"],
        EntityKind::Project => &["Id", "Name", "status", "start_date", "end_date"],
        EntityKind::QuickTask => &["id", "title", "priority", "dueDate", "completed"],
    }
}

fn backend(config: &BoardConfig, kind: EntityKind) -> Arc<dyn RecordService> {
    Arc::new(LocalFileRecordService::in_dir(kind, &config.data_dir))
}

pub async fn run(cli: Cli, mut config: BoardConfig) -> Result<String> {
    if let Some(dir) = cli.data {
        config.data_dir = dir;
    }

    match cli.command {
        Command::List {
            kind,
            filter,
            sort,
            desc,
        } => list(&config, kind, &filter, sort.as_deref(), desc).await,
        Command::Add {
            kind,
            title,
            name,
            description,
            status,
            priority,
            due,
            start,
            end,
            tags,
        } => {
            let args = AddArgs {
                title,
                name,
                description,
                status,
                priority,
                due,
                start,
                end,
                tags,
            };
            add(&config, kind, args).await
        }
        Command::Remove { kind, id } => remove(&config, kind, &id).await,
        Command::Toggle { id } => toggle(&config, &id).await,
        Command::Stats => stats(&config).await,
    }
}

async fn list(
    config: &BoardConfig,
    kind: EntityKind,
    filter: &str,
    sort: Option<&str>,
    desc: bool,
) -> Result<String> {
    let mut session = BoardSession::new(kind, backend(config, kind), config)?;
    session.refresh().await.context("failed to load records")?;
    session.select_preset(filter)?;

    let key = sort.unwrap_or(session.state().sort_key()).to_string();
    let direction = if desc {
        SortDirection::Descending
    } else if sort.is_some() {
        SortDirection::Ascending
    } else {
        session.state().direction()
    };
    session.state_mut().set_sort(&key, direction)?;

    let view = session.view()?;
    Ok(view.to_result(list_columns(kind)).render())
}

struct AddArgs {
    title: Option<String>,
    name: Option<String>,
    description: Option<String>,
    status: Option<String>,
    priority: Option<String>,
    due: Option<String>,
    start: Option<String>,
    end: Option<String>,
    tags: Option<String>,
}

async fn add(config: &BoardConfig, kind: EntityKind, args: AddArgs) -> Result<String> {
    let remote = backend(config, kind);
    let created = match kind {
        EntityKind::Task => {
            let mut form = TaskForm::new(args.title.as_deref().unwrap_or_default());
            form.description = args.description.unwrap_or_default();
            form.due_date = args.due.unwrap_or_default();
            if let Some(status) = args.status {
                form.status = status;
            }
            if let Some(priority) = args.priority {
                form.priority = priority;
            }
            form.tags = args
                .tags
                .map(|t| t.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_default();
            TaskService::new(remote).create(&form.submit()?).await?
        }
        EntityKind::Project => {
            let mut form = ProjectForm::new(args.name.as_deref().unwrap_or_default());
            form.description = args.description.unwrap_or_default();
            form.start_date = args.start.unwrap_or_default();
            form.end_date = args.end.unwrap_or_default();
            if let Some(status) = args.status {
                form.status = status;
            }
            ProjectService::new(remote).create(&form.submit()?).await?
        }
        EntityKind::QuickTask => {
            let mut form = QuickTaskForm::new(args.title.as_deref().unwrap_or_default());
            form.description = args.description.unwrap_or_default();
            form.due_date = args.due.unwrap_or_default();
            if let Some(priority) = args.priority {
                form.priority = priority;
            }
            QuickTaskService::new(remote).create(&form.submit()?).await?
        }
    };

    let id = created
        .id()
        .context("backend returned a record without an id")?;
    Ok(format!("Created {} {}\n", kind, id))
}

async fn remove(config: &BoardConfig, kind: EntityKind, id: &str) -> Result<String> {
    let id = RecordId::parse(id);
    backend(config, kind)
        .delete(&id)
        .await
        .with_context(|| format!("no {} with id '{}'", kind, id))?;
    Ok(format!("Deleted {} {}\n", kind, id))
}

async fn toggle(config: &BoardConfig, id: &str) -> Result<String> {
    let service = QuickTaskService::new(backend(config, EntityKind::QuickTask));
    let record = service.toggle_completed(&RecordId::parse(id)).await?;
    let state = match record.get("completed").and_then(|v| v.as_bool()) {
        Some(true) => "completed",
        _ => "pending",
    };
    Ok(format!("Quick task {} is {}\n", id, state))
}

async fn stats(config: &BoardConfig) -> Result<String> {
    let tasks = TaskService::new(backend(config, EntityKind::Task)).with_page_size(config.page_size);
    let projects =
        ProjectService::new(backend(config, EntityKind::Project)).with_page_size(config.page_size);
    let quick = QuickTaskService::new(backend(config, EntityKind::QuickTask));
    let projector = Projector::default().with_missing_policy(config.missing_dates);

    let dashboard = Dashboard::load(&tasks, &projects, &StaticAuthProvider::anonymous(), &projector)
        .await
        .context("failed to load dashboard data")?;
    let quick_stats = QuickStats::compute(&quick.fetch_all().await?);

    let mut out = String::new();
    writeln!(out, "{}\n", dashboard.greeting)?;
    for (title, breakdown) in [("Tasks", &dashboard.tasks), ("Projects", &dashboard.projects)] {
        writeln!(out, "{}: {} total", title, breakdown.total)?;
        for (status, count) in &breakdown.counts {
            writeln!(out, "  {:<12} {}", status, count)?;
        }
    }
    writeln!(
        out,
        "Quick tasks: {} total, {} completed, {} pending\n",
        quick_stats.total, quick_stats.completed, quick_stats.pending
    )?;

    writeln!(out, "Upcoming deadlines:")?;
    if dashboard.upcoming_deadlines.is_empty() {
        writeln!(out, "  none")?;
    }
    for task in &dashboard.upcoming_deadlines {
        writeln!(
            out,
            "  {}  {}",
            task.get("due_date").map(|v| v.to_string()).unwrap_or_default(),
            task.text("title").unwrap_or_default()
        )?;
    }
    Ok(out)
}

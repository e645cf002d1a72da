use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::util::money::Amount;

/// Stable numeric task identifier. `0` is reserved as the wire-format
/// sentinel for "no parent" and is never assigned to a task.
pub type TaskId = u64;

/// Workflow status of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Maturity {
    Draft,
    InProgress,
    Completed,
}

impl Maturity {
    pub fn as_str(self) -> &'static str {
        match self {
            Maturity::Draft => "draft",
            Maturity::InProgress => "in_progress",
            Maturity::Completed => "completed",
        }
    }

    /// Parse a wire/CLI name into a maturity
    pub fn parse(s: &str) -> Option<Maturity> {
        match s {
            "draft" => Some(Maturity::Draft),
            "in_progress" => Some(Maturity::InProgress),
            "completed" => Some(Maturity::Completed),
            _ => None,
        }
    }
}

impl std::fmt::Display for Maturity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structural role of a task: the wire format's `type`/`subType` pair
/// collapsed into one discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Project,
    Phase,
    Normal,
    Milestone,
}

impl TaskKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskKind::Project => "project",
            TaskKind::Phase => "phase",
            TaskKind::Normal => "task",
            TaskKind::Milestone => "milestone",
        }
    }

    /// Parse a CLI name into a kind
    pub fn parse(s: &str) -> Option<TaskKind> {
        match s {
            "project" => Some(TaskKind::Project),
            "phase" => Some(TaskKind::Phase),
            "task" => Some(TaskKind::Normal),
            "milestone" => Some(TaskKind::Milestone),
            _ => None,
        }
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An inclusive date range. Both endpoints are whole days; `start <= end`
/// is validated at the edit boundary, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateSpan {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateSpan {
    pub fn new(start: NaiveDate, end: NaiveDate) -> DateSpan {
        DateSpan { start, end }
    }

    /// A zero-length span pinned to a single day (milestones).
    pub fn on(date: NaiveDate) -> DateSpan {
        DateSpan {
            start: date,
            end: date,
        }
    }

    /// Whole days covered, minimum 1 (a same-day span is one day of work).
    pub fn duration_days(&self) -> i64 {
        (self.end - self.start).num_days().max(1)
    }

    /// Inclusive-range overlap test.
    pub fn overlaps(&self, other: &DateSpan) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

/// Fields of a container task (`project` or `phase`). All of them are
/// derived by aggregation from children; the stored values are only
/// authoritative while the container has no aggregation inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerFields {
    pub span: DateSpan,
    pub progress: u8,
    pub price: Amount,
    pub maturity: Maturity,
}

/// Fields of a normal (schedulable) leaf task, all authored.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkFields {
    pub span: DateSpan,
    pub progress: u8,
    pub price: Amount,
    pub price_ratio: f64,
    pub maturity: Maturity,
}

/// Fields of a milestone. Milestones carry no progress, price, or ratio;
/// the wire layer materializes zeros for those columns.
#[derive(Debug, Clone, PartialEq)]
pub struct MilestoneFields {
    pub span: DateSpan,
    pub maturity: Maturity,
}

/// Role-specific task payload
#[derive(Debug, Clone, PartialEq)]
pub enum TaskData {
    Project(ContainerFields),
    Phase(ContainerFields),
    Normal(WorkFields),
    Milestone(MilestoneFields),
}

/// A task in the flat schedule list
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: TaskId,
    /// Parent task id; `None` for root tasks
    pub parent: Option<TaskId>,
    /// Display label
    pub text: String,
    pub data: TaskData,
}

impl Task {
    /// True for `project` and `phase` tasks, whose fields are derived.
    pub fn is_container(&self) -> bool {
        matches!(self.data, TaskData::Project(_) | TaskData::Phase(_))
    }

    pub fn is_project(&self) -> bool {
        matches!(self.data, TaskData::Project(_))
    }

    pub fn is_phase(&self) -> bool {
        matches!(self.data, TaskData::Phase(_))
    }

    pub fn is_normal(&self) -> bool {
        matches!(self.data, TaskData::Normal(_))
    }

    pub fn is_milestone(&self) -> bool {
        matches!(self.data, TaskData::Milestone(_))
    }

    pub fn kind(&self) -> TaskKind {
        match self.data {
            TaskData::Project(_) => TaskKind::Project,
            TaskData::Phase(_) => TaskKind::Phase,
            TaskData::Normal(_) => TaskKind::Normal,
            TaskData::Milestone(_) => TaskKind::Milestone,
        }
    }

    /// The wire-format role name (`type` column).
    pub fn kind_name(&self) -> &'static str {
        match self.data {
            TaskData::Project(_) => "project",
            TaskData::Phase(_) => "phase",
            TaskData::Normal(_) | TaskData::Milestone(_) => "task",
        }
    }

    pub fn span(&self) -> DateSpan {
        match &self.data {
            TaskData::Project(c) | TaskData::Phase(c) => c.span,
            TaskData::Normal(w) => w.span,
            TaskData::Milestone(m) => m.span,
        }
    }

    pub fn set_span(&mut self, span: DateSpan) {
        match &mut self.data {
            TaskData::Project(c) | TaskData::Phase(c) => c.span = span,
            TaskData::Normal(w) => w.span = span,
            TaskData::Milestone(m) => m.span = span,
        }
    }

    /// Derived duration in whole days.
    pub fn duration_days(&self) -> i64 {
        self.span().duration_days()
    }

    pub fn maturity(&self) -> Maturity {
        match &self.data {
            TaskData::Project(c) | TaskData::Phase(c) => c.maturity,
            TaskData::Normal(w) => w.maturity,
            TaskData::Milestone(m) => m.maturity,
        }
    }

    pub fn set_maturity(&mut self, maturity: Maturity) {
        match &mut self.data {
            TaskData::Project(c) | TaskData::Phase(c) => c.maturity = maturity,
            TaskData::Normal(w) => w.maturity = maturity,
            TaskData::Milestone(m) => m.maturity = maturity,
        }
    }

    /// Progress percentage; `None` for milestones.
    pub fn progress(&self) -> Option<u8> {
        match &self.data {
            TaskData::Project(c) | TaskData::Phase(c) => Some(c.progress),
            TaskData::Normal(w) => Some(w.progress),
            TaskData::Milestone(_) => None,
        }
    }

    /// Monetary amount; `None` for milestones.
    pub fn price(&self) -> Option<&Amount> {
        match &self.data {
            TaskData::Project(c) | TaskData::Phase(c) => Some(&c.price),
            TaskData::Normal(w) => Some(&w.price),
            TaskData::Milestone(_) => None,
        }
    }
}

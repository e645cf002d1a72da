use std::collections::HashSet;

use chrono::NaiveDate;

use crate::model::schedule::Schedule;
use crate::model::task::{
    ContainerFields, DateSpan, Maturity, MilestoneFields, Task, TaskData, TaskId, TaskKind,
    WorkFields,
};
use crate::ops::aggregate::aggregate;
use crate::ops::maturity::cascade_maturity;
use crate::util::money::Amount;

/// Error type for schedule operations. Every rejection leaves the schedule
/// exactly as it was.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("task not found: {0}")]
    NotFound(TaskId),
    #[error("moving task {task} under {parent} would create a cycle")]
    CircularReference { task: TaskId, parent: TaskId },
    #[error("dates overlap with sibling task \"{sibling}\"")]
    DateOverlap { sibling: String },
    #[error("invalid date range: end {end} is before start {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
    #[error("a {child} cannot be placed under a {parent}")]
    InvalidParent {
        child: &'static str,
        parent: &'static str,
    },
}

/// Blueprint for a task to be added
#[derive(Debug, Clone)]
pub struct NewTask {
    pub text: String,
    /// Parent id; `None` adds a root task
    pub parent: Option<TaskId>,
    pub kind: TaskKind,
    pub span: DateSpan,
    pub progress: u8,
    pub price: Amount,
    pub price_ratio: f64,
}

impl NewTask {
    pub fn new(kind: TaskKind, text: impl Into<String>, span: DateSpan) -> NewTask {
        NewTask {
            text: text.into(),
            parent: None,
            kind,
            span,
            progress: 0,
            price: Amount::zero(),
            price_ratio: 0.0,
        }
    }

    pub fn under(mut self, parent: TaskId) -> NewTask {
        self.parent = Some(parent);
        self
    }
}

/// A partial update merged into an existing task by [`modify_task`]
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub text: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub progress: Option<u8>,
    pub price: Option<Amount>,
    pub price_ratio: Option<f64>,
    pub maturity: Option<Maturity>,
    /// Retype a leaf: `true` makes it a milestone, `false` a normal task
    pub milestone: Option<bool>,
}

/// Re-derive every container from the current leaves. Called after each
/// committed mutation and once after loading a schedule.
pub fn recalculate(schedule: &mut Schedule) {
    schedule.tasks = aggregate(&schedule.tasks);
}

// ---------------------------------------------------------------------------
// Add
// ---------------------------------------------------------------------------

/// Add a task with a freshly generated id. Returns the id.
pub fn add_task(schedule: &mut Schedule, new: NewTask) -> Result<TaskId, ScheduleError> {
    validate_span(new.span)?;
    if let Some(parent_id) = new.parent {
        let parent = schedule
            .task(parent_id)
            .ok_or(ScheduleError::NotFound(parent_id))?;
        check_parent_rule(parent, new.kind)?;
    }
    if new.kind == TaskKind::Normal {
        check_sibling_overlap(schedule, new.parent, None, new.span)?;
    }

    let id = schedule.next_id();
    let data = match new.kind {
        TaskKind::Project => TaskData::Project(ContainerFields {
            span: new.span,
            progress: new.progress,
            price: new.price,
            maturity: Maturity::Draft,
        }),
        TaskKind::Phase => TaskData::Phase(ContainerFields {
            span: new.span,
            progress: new.progress,
            price: new.price,
            maturity: Maturity::Draft,
        }),
        TaskKind::Normal => TaskData::Normal(WorkFields {
            span: new.span,
            progress: new.progress,
            price: new.price,
            price_ratio: new.price_ratio,
            maturity: Maturity::Draft,
        }),
        TaskKind::Milestone => TaskData::Milestone(MilestoneFields {
            span: new.span,
            maturity: Maturity::Draft,
        }),
    };
    schedule.tasks.push(Task {
        id,
        parent: new.parent,
        text: new.text,
        data,
    });
    recalculate(schedule);
    Ok(id)
}

// ---------------------------------------------------------------------------
// Modify
// ---------------------------------------------------------------------------

/// Merge a patch into an existing task, validate, commit, re-derive.
///
/// Progress edits on a normal leaf adjust its maturity as a side effect:
/// reaching 100 completes it, leaving 0 starts a draft, and dropping back
/// to 0 returns an in-progress task to draft. A maturity change (patched or
/// derived) triggers the upward cascade after aggregation.
pub fn modify_task(
    schedule: &mut Schedule,
    id: TaskId,
    patch: TaskPatch,
) -> Result<(), ScheduleError> {
    let current = schedule.task(id).ok_or(ScheduleError::NotFound(id))?.clone();
    let mut updated = current.clone();

    // Retype before the field merge so the patch lands on the new shape.
    if let Some(to_milestone) = patch.milestone {
        retype_leaf(&mut updated, to_milestone);
    }

    if let Some(text) = patch.text {
        updated.text = text;
    }

    let mut span = updated.span();
    if let Some(start) = patch.start {
        span.start = start;
    }
    if let Some(end) = patch.end {
        span.end = end;
    }
    validate_span(span)?;
    updated.set_span(span);

    // Progress, price, and ratio only exist on normal leaves; container
    // values are derived and milestone values do not exist at all.
    if let TaskData::Normal(work) = &mut updated.data {
        if let Some(progress) = patch.progress {
            let progress = progress.min(100);
            work.progress = progress;
            if progress == 100 {
                work.maturity = Maturity::Completed;
            } else if progress > 0 && work.maturity == Maturity::Draft {
                work.maturity = Maturity::InProgress;
            } else if progress == 0 && work.maturity == Maturity::InProgress {
                work.maturity = Maturity::Draft;
            }
        }
        if let Some(price) = patch.price {
            work.price = price;
        }
        if let Some(ratio) = patch.price_ratio {
            work.price_ratio = ratio;
        }
    }

    if let Some(maturity) = patch.maturity {
        updated.set_maturity(maturity);
    }

    if updated.is_normal() && updated.span() != current.span() {
        check_sibling_overlap(schedule, updated.parent, Some(id), updated.span())?;
    }

    let maturity_changed = updated.maturity() != current.maturity();
    let new_maturity = updated.maturity();
    if let Some(slot) = schedule.task_mut(id) {
        *slot = updated;
    }
    recalculate(schedule);
    if maturity_changed {
        schedule.tasks = cascade_maturity(&schedule.tasks, id, new_maturity);
    }
    Ok(())
}

/// Convenience wrapper for the most common edit.
pub fn set_progress(
    schedule: &mut Schedule,
    id: TaskId,
    progress: u8,
) -> Result<(), ScheduleError> {
    modify_task(
        schedule,
        id,
        TaskPatch {
            progress: Some(progress),
            ..TaskPatch::default()
        },
    )
}

/// Explicit status edit. Aggregation runs first (it is the authoritative
/// derivation for containers), then the cascade applies the leaf-driven
/// rules on top.
pub fn set_maturity(
    schedule: &mut Schedule,
    id: TaskId,
    maturity: Maturity,
) -> Result<(), ScheduleError> {
    if !schedule.contains(id) {
        return Err(ScheduleError::NotFound(id));
    }
    recalculate(schedule);
    schedule.tasks = cascade_maturity(&schedule.tasks, id, maturity);
    Ok(())
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

/// Delete a task and, recursively, every descendant. Returns the removed
/// ids (the target first).
pub fn delete_task(schedule: &mut Schedule, id: TaskId) -> Result<Vec<TaskId>, ScheduleError> {
    if !schedule.contains(id) {
        return Err(ScheduleError::NotFound(id));
    }
    let mut removed = vec![id];
    removed.extend(schedule.descendant_ids(id));
    let gone: HashSet<TaskId> = removed.iter().copied().collect();
    schedule.tasks.retain(|t| !gone.contains(&t.id));
    recalculate(schedule);
    Ok(removed)
}

// ---------------------------------------------------------------------------
// Move
// ---------------------------------------------------------------------------

/// Reparent a task. Rejected if the new parent is the task itself or one of
/// its descendants, or if the parent's role cannot hold it. Both the old
/// and new ancestor chains are re-derived by the aggregation pass.
pub fn move_task(
    schedule: &mut Schedule,
    id: TaskId,
    new_parent: Option<TaskId>,
) -> Result<(), ScheduleError> {
    let task = schedule.task(id).ok_or(ScheduleError::NotFound(id))?;
    let kind = task.kind();
    let span = task.span();

    if let Some(parent_id) = new_parent {
        if parent_id == id || schedule.is_descendant_of(parent_id, id) {
            return Err(ScheduleError::CircularReference {
                task: id,
                parent: parent_id,
            });
        }
        let parent = schedule
            .task(parent_id)
            .ok_or(ScheduleError::NotFound(parent_id))?;
        check_parent_rule(parent, kind)?;
        if kind == TaskKind::Normal {
            check_sibling_overlap(schedule, Some(parent_id), Some(id), span)?;
        }
    }

    if let Some(task) = schedule.task_mut(id) {
        task.parent = new_parent;
    }
    recalculate(schedule);
    Ok(())
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

fn validate_span(span: DateSpan) -> Result<(), ScheduleError> {
    if span.end < span.start {
        return Err(ScheduleError::InvalidRange {
            start: span.start,
            end: span.end,
        });
    }
    Ok(())
}

/// Structural rules: a project holds phases, tasks, and milestones; a phase
/// holds tasks and milestones; leaves hold nothing.
fn check_parent_rule(parent: &Task, child: TaskKind) -> Result<(), ScheduleError> {
    let allowed = match (&parent.data, child) {
        (TaskData::Project(_), TaskKind::Phase | TaskKind::Normal | TaskKind::Milestone) => true,
        (TaskData::Phase(_), TaskKind::Normal | TaskKind::Milestone) => true,
        _ => false,
    };
    if allowed {
        Ok(())
    } else {
        Err(ScheduleError::InvalidParent {
            child: child.as_str(),
            parent: parent.kind().as_str(),
        })
    }
}

/// Two normal tasks under the same parent must not overlap in time. The
/// error names the conflicting sibling.
fn check_sibling_overlap(
    schedule: &Schedule,
    parent: Option<TaskId>,
    exclude: Option<TaskId>,
    span: DateSpan,
) -> Result<(), ScheduleError> {
    for sibling in &schedule.tasks {
        if sibling.parent == parent
            && Some(sibling.id) != exclude
            && sibling.is_normal()
            && span.overlaps(&sibling.span())
        {
            return Err(ScheduleError::DateOverlap {
                sibling: sibling.text.clone(),
            });
        }
    }
    Ok(())
}

/// Convert a leaf between normal task and milestone. Containers are not
/// retyped. A demoted milestone restarts with zeroed work fields; a task
/// promoted to milestone sheds them.
fn retype_leaf(task: &mut Task, to_milestone: bool) {
    match (&task.data, to_milestone) {
        (TaskData::Normal(work), true) => {
            task.data = TaskData::Milestone(MilestoneFields {
                span: work.span,
                maturity: work.maturity,
            });
        }
        (TaskData::Milestone(milestone), false) => {
            task.data = TaskData::Normal(WorkFields {
                span: milestone.span,
                progress: 0,
                price: Amount::zero(),
                price_ratio: 0.0,
                maturity: milestone.maturity,
            });
        }
        _ => {}
    }
}

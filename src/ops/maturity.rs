use std::collections::HashSet;

use crate::model::task::{Maturity, Task, TaskId};

/// Apply a status change to one task and propagate it up the ancestor
/// chain.
///
/// Milestones take the new status directly and propagate nothing. For a
/// normal leaf, moving to `in_progress` or `completed` promotes every
/// still-`draft` ancestor to `in_progress`, stopping at the first ancestor
/// already past draft. Moving to `completed` additionally completes each
/// ancestor whose non-milestone direct children are now all completed,
/// recursing upward until one is not.
///
/// Runs after [`aggregate`](crate::ops::aggregate::aggregate) when a leaf
/// status is edited directly. Until the next aggregation pass this can
/// leave an ancestor's status ahead of its progress-derived value; the
/// next pass rederives container status from progress and wins.
pub fn cascade_maturity(tasks: &[Task], changed_id: TaskId, new_maturity: Maturity) -> Vec<Task> {
    let mut out = tasks.to_vec();
    let Some(changed) = out.iter_mut().find(|t| t.id == changed_id) else {
        return out;
    };

    changed.set_maturity(new_maturity);
    if changed.is_milestone() {
        return out;
    }
    let parent = changed.parent;

    if matches!(new_maturity, Maturity::InProgress | Maturity::Completed) {
        promote_ancestors(&mut out, parent);
    }
    if new_maturity == Maturity::Completed {
        complete_ancestors(&mut out, parent);
    }
    out
}

/// Replay the upward rules for every task already started or finished,
/// used once after loading a schedule so stored statuses become
/// consistent.
pub fn initialize_maturity_cascade(tasks: &[Task]) -> Vec<Task> {
    let mut out = tasks.to_vec();
    for i in 0..out.len() {
        let (parent, maturity, is_milestone) = {
            let task = &out[i];
            (task.parent, task.maturity(), task.is_milestone())
        };
        if is_milestone {
            continue;
        }
        if matches!(maturity, Maturity::InProgress | Maturity::Completed) {
            promote_ancestors(&mut out, parent);
        }
        if maturity == Maturity::Completed {
            complete_ancestors(&mut out, parent);
        }
    }
    out
}

/// Walk upward flipping `draft` ancestors to `in_progress`. Stops at the
/// first ancestor that is already non-draft (higher ancestors are assumed
/// consistent), at a milestone, or on a repeated id.
fn promote_ancestors(tasks: &mut [Task], start: Option<TaskId>) {
    let mut visited = HashSet::new();
    let mut current = start;
    while let Some(id) = current {
        if !visited.insert(id) {
            break;
        }
        let Some(parent) = tasks.iter_mut().find(|t| t.id == id) else {
            break;
        };
        if parent.is_milestone() || parent.maturity() != Maturity::Draft {
            break;
        }
        parent.set_maturity(Maturity::InProgress);
        current = parent.parent;
    }
}

/// Walk upward completing each ancestor whose non-milestone direct
/// children are all completed; partial completion stops the walk.
fn complete_ancestors(tasks: &mut [Task], start: Option<TaskId>) {
    let mut visited = HashSet::new();
    let mut current = start;
    while let Some(id) = current {
        if !visited.insert(id) {
            break;
        }
        let mut has_children = false;
        let all_completed = tasks
            .iter()
            .filter(|t| t.parent == Some(id) && !t.is_milestone())
            .inspect(|_| has_children = true)
            .all(|c| c.maturity() == Maturity::Completed);
        if !has_children || !all_completed {
            break;
        }
        let Some(parent) = tasks.iter_mut().find(|t| t.id == id) else {
            break;
        };
        if parent.is_milestone() {
            break;
        }
        parent.set_maturity(Maturity::Completed);
        current = parent.parent;
    }
}

use std::collections::{HashMap, HashSet};

use crate::model::task::{ContainerFields, DateSpan, Maturity, Task, TaskData, TaskId};
use crate::util::money::Amount;

/// Container maturity as derived from its freshly aggregated progress.
pub fn maturity_from_progress(progress: u8) -> Maturity {
    match progress {
        100 => Maturity::Completed,
        0 => Maturity::Draft,
        _ => Maturity::InProgress,
    }
}

/// Recompute every container's derived fields from its children, bottom-up.
///
/// Pure: returns a new list in the input's order. Containers are visited in
/// post-order over an id-keyed children index, with results held in a memo
/// map, so the input list may arrive in any order and no task is computed
/// twice. Tasks unreachable from a root (corrupted parent links) pass
/// through untouched.
///
/// Aggregation inputs are direct children only: for a phase, normal tasks;
/// for a project, phases and normal tasks. Milestones never contribute. A
/// container with no inputs keeps its stored fields as they are.
pub fn aggregate(tasks: &[Task]) -> Vec<Task> {
    let ids: HashSet<TaskId> = tasks.iter().map(|t| t.id).collect();

    let mut children_of: HashMap<TaskId, Vec<TaskId>> = HashMap::new();
    let mut roots: Vec<TaskId> = Vec::new();
    for task in tasks {
        match task.parent {
            Some(parent) if ids.contains(&parent) => {
                children_of.entry(parent).or_default().push(task.id);
            }
            _ => roots.push(task.id),
        }
    }

    let mut computed: HashMap<TaskId, Task> =
        tasks.iter().map(|t| (t.id, t.clone())).collect();

    let mut order = Vec::with_capacity(tasks.len());
    let mut visited = HashSet::new();
    for root in roots {
        push_post_order(root, &children_of, &mut visited, &mut order);
    }

    for id in order {
        let child_ids = children_of.get(&id).cloned().unwrap_or_default();
        let Some(task) = computed.get(&id) else { continue };

        let fields = match &task.data {
            TaskData::Phase(fields) => {
                let inputs = select(&computed, &child_ids, |c| c.is_normal());
                derive_fields(fields, &inputs)
            }
            TaskData::Project(fields) => {
                let inputs = select(&computed, &child_ids, |c| c.is_phase() || c.is_normal());
                derive_fields(fields, &inputs)
            }
            _ => continue,
        };

        if let Some(task) = computed.get_mut(&id)
            && let (TaskData::Project(stored) | TaskData::Phase(stored)) = &mut task.data
        {
            *stored = fields;
        }
    }

    tasks
        .iter()
        .map(|t| computed.remove(&t.id).unwrap_or_else(|| t.clone()))
        .collect()
}

/// Children before parents, each id once.
fn push_post_order(
    id: TaskId,
    children_of: &HashMap<TaskId, Vec<TaskId>>,
    visited: &mut HashSet<TaskId>,
    order: &mut Vec<TaskId>,
) {
    if !visited.insert(id) {
        return;
    }
    if let Some(children) = children_of.get(&id) {
        for child in children {
            push_post_order(*child, children_of, visited, order);
        }
    }
    order.push(id);
}

fn select<'a>(
    computed: &'a HashMap<TaskId, Task>,
    child_ids: &[TaskId],
    keep: fn(&Task) -> bool,
) -> Vec<&'a Task> {
    child_ids
        .iter()
        .filter_map(|id| computed.get(id))
        .filter(|c| keep(c))
        .collect()
}

/// Derive a container's fields from its aggregation inputs. With no inputs
/// the stored fields stand (no synthetic dates, no division by zero).
fn derive_fields(stored: &ContainerFields, inputs: &[&Task]) -> ContainerFields {
    if inputs.is_empty() {
        return stored.clone();
    }

    let start = inputs.iter().map(|c| c.span().start).min();
    let end = inputs.iter().map(|c| c.span().end).max();
    let span = match (start, end) {
        (Some(start), Some(end)) => DateSpan::new(start, end),
        _ => stored.span,
    };

    let total: f64 = inputs
        .iter()
        .map(|c| c.progress().unwrap_or(0) as f64)
        .sum();
    let progress = (total / inputs.len() as f64).round() as u8;

    let price = Amount::new(
        inputs
            .iter()
            .map(|c| c.price().map(|p| p.value()).unwrap_or(0.0))
            .sum(),
    );

    ContainerFields {
        span,
        progress,
        price,
        maturity: maturity_from_progress(progress),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::{MilestoneFields, WorkFields};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn container(span: DateSpan) -> ContainerFields {
        ContainerFields {
            span,
            progress: 0,
            price: Amount::zero(),
            maturity: Maturity::Draft,
        }
    }

    fn project(id: TaskId) -> Task {
        Task {
            id,
            parent: None,
            text: format!("project {}", id),
            data: TaskData::Project(container(DateSpan::new(
                date(2025, 1, 1),
                date(2025, 12, 31),
            ))),
        }
    }

    fn phase(id: TaskId, parent: TaskId) -> Task {
        Task {
            id,
            parent: Some(parent),
            text: format!("phase {}", id),
            data: TaskData::Phase(container(DateSpan::new(date(2025, 1, 1), date(2025, 6, 30)))),
        }
    }

    fn work(
        id: TaskId,
        parent: TaskId,
        start: NaiveDate,
        end: NaiveDate,
        progress: u8,
        price: f64,
    ) -> Task {
        Task {
            id,
            parent: Some(parent),
            text: format!("task {}", id),
            data: TaskData::Normal(WorkFields {
                span: DateSpan::new(start, end),
                progress,
                price: Amount::new(price),
                price_ratio: 0.0,
                maturity: Maturity::Draft,
            }),
        }
    }

    fn milestone(id: TaskId, parent: TaskId, on: NaiveDate) -> Task {
        Task {
            id,
            parent: Some(parent),
            text: format!("milestone {}", id),
            data: TaskData::Milestone(MilestoneFields {
                span: DateSpan::on(on),
                maturity: Maturity::Draft,
            }),
        }
    }

    #[test]
    fn test_phase_derives_from_normal_children() {
        let tasks = vec![
            project(1),
            phase(10, 1),
            work(11, 10, date(2025, 1, 1), date(2025, 1, 31), 100, 120_000.0),
            work(12, 10, date(2025, 2, 1), date(2025, 3, 15), 50, 240_000.0),
        ];
        let result = aggregate(&tasks);
        let phase = result.iter().find(|t| t.id == 10).unwrap();
        assert_eq!(phase.span(), DateSpan::new(date(2025, 1, 1), date(2025, 3, 15)));
        assert_eq!(phase.progress(), Some(75));
        assert_eq!(phase.price().unwrap().value(), 360_000.0);
        assert_eq!(phase.maturity(), Maturity::InProgress);

        // The project aggregates the freshly computed phase.
        let project = result.iter().find(|t| t.id == 1).unwrap();
        assert_eq!(project.progress(), Some(75));
        assert_eq!(project.price().unwrap().value(), 360_000.0);
        assert_eq!(project.span(), DateSpan::new(date(2025, 1, 1), date(2025, 3, 15)));
    }

    #[test]
    fn test_project_averages_phases_and_bare_tasks_alike() {
        let tasks = vec![
            project(1),
            phase(10, 1),
            work(11, 10, date(2025, 1, 1), date(2025, 1, 31), 100, 0.0),
            work(20, 1, date(2025, 2, 1), date(2025, 2, 28), 40, 0.0),
        ];
        let result = aggregate(&tasks);
        let project = result.iter().find(|t| t.id == 1).unwrap();
        // Phase aggregates to 100, then the project averages (100 + 40) / 2.
        assert_eq!(project.progress(), Some(70));
    }

    #[test]
    fn test_milestones_are_excluded_everywhere() {
        let with_milestones = vec![
            project(1),
            phase(10, 1),
            work(11, 10, date(2025, 1, 5), date(2025, 1, 31), 80, 100_000.0),
            milestone(12, 10, date(2025, 6, 30)),
            milestone(2, 1, date(2025, 12, 31)),
        ];
        let without: Vec<Task> = with_milestones
            .iter()
            .filter(|t| !t.is_milestone())
            .cloned()
            .collect();

        let a = aggregate(&with_milestones);
        let b = aggregate(&without);
        for task in &b {
            let twin = a.iter().find(|t| t.id == task.id).unwrap();
            assert_eq!(twin, task);
        }
        // In particular the milestone dates must not stretch the spans.
        let phase = a.iter().find(|t| t.id == 10).unwrap();
        assert_eq!(phase.span().end, date(2025, 1, 31));
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let tasks = vec![
            project(1),
            phase(10, 1),
            work(11, 10, date(2025, 1, 1), date(2025, 1, 31), 33, 100.0),
            work(12, 10, date(2025, 2, 1), date(2025, 2, 28), 34, 200.0),
            work(13, 10, date(2025, 3, 1), date(2025, 3, 31), 33, 300.0),
            milestone(14, 10, date(2025, 3, 31)),
        ];
        let once = aggregate(&tasks);
        let twice = aggregate(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_maturity_tracks_progress_exactly() {
        for (children, expected) in [
            (vec![100, 100], Maturity::Completed),
            (vec![0, 0], Maturity::Draft),
            (vec![100, 0], Maturity::InProgress),
            (vec![1], Maturity::InProgress),
            (vec![99, 100], Maturity::InProgress),
        ] {
            let mut tasks = vec![project(1), phase(10, 1)];
            for (i, p) in children.iter().enumerate() {
                tasks.push(work(
                    20 + i as TaskId,
                    10,
                    date(2025, 1, 1),
                    date(2025, 1, 31),
                    *p,
                    0.0,
                ));
            }
            let result = aggregate(&tasks);
            let phase = result.iter().find(|t| t.id == 10).unwrap();
            assert_eq!(phase.maturity(), expected, "children {:?}", children);
            assert_eq!(
                phase.maturity(),
                maturity_from_progress(phase.progress().unwrap_or(0))
            );
        }
    }

    #[test]
    fn test_childless_phase_is_left_unchanged() {
        let tasks = vec![project(1), phase(10, 1), milestone(11, 10, date(2025, 3, 1))];
        let result = aggregate(&tasks);
        let before = tasks.iter().find(|t| t.id == 10).unwrap();
        let after = result.iter().find(|t| t.id == 10).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let mut tasks = vec![
            work(11, 10, date(2025, 1, 1), date(2025, 1, 31), 60, 100.0),
            phase(10, 1),
            work(12, 10, date(2025, 2, 1), date(2025, 2, 28), 20, 50.0),
            project(1),
        ];
        let shuffled = aggregate(&tasks);
        tasks.sort_by_key(|t| t.id);
        let sorted = aggregate(&tasks);
        for task in &sorted {
            let twin = shuffled.iter().find(|t| t.id == task.id).unwrap();
            assert_eq!(twin, task);
        }
    }

    #[test]
    fn test_price_sum_survives_display_round_trip() {
        let tasks = vec![
            project(1),
            phase(10, 1),
            work(11, 10, date(2025, 1, 1), date(2025, 1, 31), 0, 120_000_000.0),
            work(12, 10, date(2025, 2, 1), date(2025, 2, 28), 0, 360_000_000.0),
        ];
        let result = aggregate(&tasks);
        let phase = result.iter().find(|t| t.id == 10).unwrap();
        let rendered = phase.price().unwrap().to_string();
        assert_eq!(rendered, "480,000,000");
        let parsed: Amount = rendered.parse().unwrap();
        assert_eq!(parsed.value(), 480_000_000.0);
    }
}

use std::collections::{HashMap, HashSet};

use crate::model::task::{Task, TaskId};

/// A task with its children attached, forming one tree of the forest
#[derive(Debug, Clone, PartialEq)]
pub struct TaskNode {
    pub task: Task,
    pub children: Vec<TaskNode>,
}

/// A task annotated with its depth in the tree (root = 0), used for
/// indentation and visibility filtering
#[derive(Debug, Clone, PartialEq)]
pub struct FlatRow {
    pub task: Task,
    pub level: usize,
}

/// Group a flat task list into a forest by `parent` links.
///
/// A task whose declared parent does not exist in the input is treated as a
/// root rather than an error. Input order is preserved for roots and for
/// each parent's children; the input itself is never mutated.
pub fn build_hierarchy(tasks: &[Task]) -> Vec<TaskNode> {
    let ids: HashSet<TaskId> = tasks.iter().map(|t| t.id).collect();

    let mut children_of: HashMap<TaskId, Vec<&Task>> = HashMap::new();
    let mut roots: Vec<&Task> = Vec::new();
    for task in tasks {
        match task.parent {
            Some(parent) if ids.contains(&parent) => {
                children_of.entry(parent).or_default().push(task);
            }
            _ => roots.push(task),
        }
    }

    let mut visited = HashSet::new();
    roots
        .into_iter()
        .filter_map(|root| build_node(root, &children_of, &mut visited))
        .collect()
}

fn build_node(
    task: &Task,
    children_of: &HashMap<TaskId, Vec<&Task>>,
    visited: &mut HashSet<TaskId>,
) -> Option<TaskNode> {
    // Guard against corrupted parent links; each task appears at most once.
    if !visited.insert(task.id) {
        return None;
    }
    let children = children_of
        .get(&task.id)
        .map(|kids| {
            kids.iter()
                .filter_map(|child| build_node(child, children_of, visited))
                .collect()
        })
        .unwrap_or_default();
    Some(TaskNode {
        task: task.clone(),
        children,
    })
}

/// Flatten a forest back into a depth-annotated list, pre-order
/// (parent before its children), preserving child ordering.
pub fn flatten_hierarchy(forest: &[TaskNode]) -> Vec<FlatRow> {
    let mut rows = Vec::new();
    flatten_into(forest, 0, &mut rows);
    rows
}

fn flatten_into(nodes: &[TaskNode], level: usize, rows: &mut Vec<FlatRow>) {
    for node in nodes {
        rows.push(FlatRow {
            task: node.task.clone(),
            level,
        });
        flatten_into(&node.children, level + 1, rows);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::{DateSpan, Maturity, TaskData, WorkFields};
    use crate::util::money::Amount;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn leaf(id: TaskId, parent: Option<TaskId>) -> Task {
        Task {
            id,
            parent,
            text: format!("task {}", id),
            data: TaskData::Normal(WorkFields {
                span: DateSpan::new(date(2025, 1, 1), date(2025, 1, 5)),
                progress: 0,
                price: Amount::zero(),
                price_ratio: 0.0,
                maturity: Maturity::Draft,
            }),
        }
    }

    #[test]
    fn test_build_and_flatten_round_trip() {
        let tasks = vec![
            leaf(1, None),
            leaf(2, Some(1)),
            leaf(3, Some(2)),
            leaf(4, Some(1)),
        ];
        let forest = build_hierarchy(&tasks);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].children.len(), 2);

        let rows = flatten_hierarchy(&forest);
        let ids: Vec<_> = rows.iter().map(|r| r.task.id).collect();
        let levels: Vec<_> = rows.iter().map(|r| r.level).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert_eq!(levels, vec![0, 1, 2, 1]);
    }

    #[test]
    fn test_missing_parent_becomes_root() {
        let tasks = vec![leaf(1, None), leaf(2, Some(42))];
        let forest = build_hierarchy(&tasks);
        let root_ids: Vec<_> = forest.iter().map(|n| n.task.id).collect();
        assert_eq!(root_ids, vec![1, 2]);
    }

    #[test]
    fn test_child_order_is_preserved() {
        let tasks = vec![leaf(1, None), leaf(5, Some(1)), leaf(3, Some(1)), leaf(4, Some(1))];
        let forest = build_hierarchy(&tasks);
        let child_ids: Vec<_> = forest[0].children.iter().map(|n| n.task.id).collect();
        assert_eq!(child_ids, vec![5, 3, 4]);
    }

    #[test]
    fn test_every_task_flattens_exactly_once() {
        let tasks = vec![
            leaf(1, None),
            leaf(2, Some(1)),
            leaf(3, Some(1)),
            leaf(4, Some(3)),
            leaf(5, None),
        ];
        let rows = flatten_hierarchy(&build_hierarchy(&tasks));
        let mut ids: Vec<_> = rows.iter().map(|r| r.task.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }
}

use std::collections::HashSet;

use super::task::{DateSpan, Task, TaskId};

/// A flat list of tasks related by `parent` links.
///
/// All engine operations are expressed over this wrapper; it owns no state
/// beyond the list itself. Lookups that walk parent links carry a visited
/// set so a corrupted input (cycle, dangling parent) can never hang a walk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schedule {
    pub tasks: Vec<Task>,
}

impl Schedule {
    pub fn new(tasks: Vec<Task>) -> Schedule {
        Schedule { tasks }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn task_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.task(id).is_some()
    }

    /// Direct children of `id`, in list order.
    pub fn children(&self, id: TaskId) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.parent == Some(id)).collect()
    }

    /// Tasks with no parent, plus tasks whose declared parent is missing
    /// from the list (those are treated as roots rather than errors).
    pub fn roots(&self) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| match t.parent {
                None => true,
                Some(p) => !self.contains(p),
            })
            .collect()
    }

    /// Every transitive descendant of `id`, not including `id` itself.
    pub fn descendant_ids(&self, id: TaskId) -> Vec<TaskId> {
        let mut out = Vec::new();
        let mut visited = HashSet::new();
        let mut queue = vec![id];
        visited.insert(id);
        while let Some(current) = queue.pop() {
            for child in self.children(current) {
                if visited.insert(child.id) {
                    out.push(child.id);
                    queue.push(child.id);
                }
            }
        }
        out
    }

    /// The parent chain of `id`, nearest first. Stops at a root, a missing
    /// parent, or a repeated id.
    pub fn ancestor_ids(&self, id: TaskId) -> Vec<TaskId> {
        let mut out = Vec::new();
        let mut visited = HashSet::new();
        visited.insert(id);
        let mut current = self.task(id).and_then(|t| t.parent);
        while let Some(parent_id) = current {
            if !visited.insert(parent_id) {
                break;
            }
            match self.task(parent_id) {
                Some(parent) => {
                    out.push(parent_id);
                    current = parent.parent;
                }
                None => break,
            }
        }
        out
    }

    /// True if `candidate` sits somewhere below `ancestor`.
    pub fn is_descendant_of(&self, candidate: TaskId, ancestor: TaskId) -> bool {
        self.ancestor_ids(candidate).contains(&ancestor)
    }

    /// Next free id: one past the highest id in use.
    pub fn next_id(&self) -> TaskId {
        self.tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1
    }

    /// The date range covered by all tasks, if any.
    pub fn overall_span(&self) -> Option<DateSpan> {
        let start = self.tasks.iter().map(|t| t.span().start).min()?;
        let end = self.tasks.iter().map(|t| t.span().end).max()?;
        Some(DateSpan::new(start, end))
    }
}

use chrono::NaiveDate;
use serde::Serialize;

use crate::model::schedule::Schedule;
use crate::model::task::{Maturity, Task, TaskKind};

/// Aggregate counts over a schedule, suitable for `--json` output.
#[derive(Debug, Default, Serialize)]
pub struct ScheduleStats {
    pub total: usize,
    pub projects: usize,
    pub phases: usize,
    pub tasks: usize,
    pub milestones: usize,
    pub draft: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub overdue: usize,
}

/// A task is overdue once its end date has passed without completion.
/// `today` is supplied by the caller; the engine reads no clock.
pub fn is_overdue(task: &Task, today: NaiveDate) -> bool {
    task.maturity() != Maturity::Completed && task.span().end < today
}

pub fn schedule_stats(schedule: &Schedule, today: NaiveDate) -> ScheduleStats {
    let mut stats = ScheduleStats {
        total: schedule.len(),
        ..ScheduleStats::default()
    };
    for task in &schedule.tasks {
        match task.kind() {
            TaskKind::Project => stats.projects += 1,
            TaskKind::Phase => stats.phases += 1,
            TaskKind::Normal => stats.tasks += 1,
            TaskKind::Milestone => stats.milestones += 1,
        }
        match task.maturity() {
            Maturity::Draft => stats.draft += 1,
            Maturity::InProgress => stats.in_progress += 1,
            Maturity::Completed => stats.completed += 1,
        }
        if is_overdue(task, today) {
            stats.overdue += 1;
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::{DateSpan, TaskData, WorkFields};
    use crate::util::money::Amount;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn work(id: u64, end: NaiveDate, maturity: Maturity) -> Task {
        Task {
            id,
            parent: None,
            text: format!("task {}", id),
            data: TaskData::Normal(WorkFields {
                span: DateSpan::new(date(2025, 1, 1), end),
                progress: 0,
                price: Amount::zero(),
                price_ratio: 0.0,
                maturity,
            }),
        }
    }

    #[test]
    fn test_overdue_requires_incomplete_and_past_end() {
        let today = date(2025, 3, 1);
        assert!(is_overdue(&work(1, date(2025, 2, 28), Maturity::Draft), today));
        assert!(!is_overdue(&work(1, date(2025, 3, 1), Maturity::Draft), today));
        assert!(!is_overdue(
            &work(1, date(2025, 2, 28), Maturity::Completed),
            today
        ));
    }

    #[test]
    fn test_counts_by_kind_and_maturity() {
        let schedule = Schedule::new(vec![
            work(1, date(2025, 1, 31), Maturity::Completed),
            work(2, date(2025, 2, 28), Maturity::InProgress),
            work(3, date(2025, 6, 30), Maturity::Draft),
        ]);
        let stats = schedule_stats(&schedule, date(2025, 3, 10));
        assert_eq!(stats.total, 3);
        assert_eq!(stats.tasks, 3);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.in_progress, 1);
        assert_eq!(stats.draft, 1);
        assert_eq!(stats.overdue, 1);
    }
}

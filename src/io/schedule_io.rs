use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::schedule::Schedule;
use crate::model::task::{
    ContainerFields, DateSpan, Maturity, MilestoneFields, Task, TaskData, TaskId, WorkFields,
};
use crate::util::money::Amount;

/// Error type for schedule I/O operations
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse schedule: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("task {id}: {reason}")]
    InvalidRecord { id: TaskId, reason: String },
}

/// One persisted task row.
///
/// The shape mirrors the widget's stored format: the role split across
/// `type` and `subType`, `parent: 0` for roots, ISO dates, `duration`
/// derived on write, and `price` accepted as a number or a comma-grouped
/// string (old exports contain both).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: TaskId,
    pub text: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub duration: i64,
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub price: Amount,
    #[serde(default)]
    pub price_ratio: f64,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "subType", default = "default_sub_type")]
    pub sub_type: String,
    pub maturity: Maturity,
    #[serde(default)]
    pub parent: TaskId,
}

fn default_sub_type() -> String {
    "normal".to_string()
}

impl TaskRecord {
    pub fn from_task(task: &Task) -> TaskRecord {
        let span = task.span();
        TaskRecord {
            id: task.id,
            text: task.text.clone(),
            start: span.start,
            end: span.end,
            duration: task.duration_days(),
            // Milestones carry no progress or price; the columns persist
            // as zeros, matching the widget's stored rows.
            progress: task.progress().unwrap_or(0),
            price: task.price().copied().unwrap_or_else(Amount::zero),
            price_ratio: match &task.data {
                TaskData::Normal(work) => work.price_ratio,
                _ => 0.0,
            },
            kind: task.kind_name().to_string(),
            sub_type: if task.is_milestone() {
                "milestone".to_string()
            } else {
                default_sub_type()
            },
            maturity: task.maturity(),
            parent: task.parent.unwrap_or(0),
        }
    }

    pub fn into_task(self) -> Result<Task, IoError> {
        let span = DateSpan::new(self.start, self.end);
        if span.end < span.start {
            return Err(IoError::InvalidRecord {
                id: self.id,
                reason: format!("end {} is before start {}", self.end, self.start),
            });
        }

        let progress = self.progress.min(100);
        let data = match (self.kind.as_str(), self.sub_type.as_str()) {
            ("project", _) => TaskData::Project(ContainerFields {
                span,
                progress,
                price: self.price,
                maturity: self.maturity,
            }),
            ("phase", _) => TaskData::Phase(ContainerFields {
                span,
                progress,
                price: self.price,
                maturity: self.maturity,
            }),
            // Some exports write `type: "milestone"` instead of the
            // task/subType pair; accept either spelling.
            ("task", "milestone") | ("milestone", _) => TaskData::Milestone(MilestoneFields {
                span,
                maturity: self.maturity,
            }),
            ("task", _) => TaskData::Normal(WorkFields {
                span,
                progress,
                price: self.price,
                price_ratio: self.price_ratio,
                maturity: self.maturity,
            }),
            (other, _) => {
                return Err(IoError::InvalidRecord {
                    id: self.id,
                    reason: format!("unknown task type {:?}", other),
                });
            }
        };

        Ok(Task {
            id: self.id,
            parent: if self.parent == 0 {
                None
            } else {
                Some(self.parent)
            },
            text: self.text,
            data,
        })
    }
}

/// Load a schedule from a JSON file of task records.
pub fn load_schedule(path: &Path) -> Result<Schedule, IoError> {
    let text = fs::read_to_string(path).map_err(|e| IoError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_schedule(&text)
}

/// Parse a schedule from JSON text.
pub fn parse_schedule(text: &str) -> Result<Schedule, IoError> {
    let records: Vec<TaskRecord> = serde_json::from_str(text)?;
    let tasks = records
        .into_iter()
        .map(TaskRecord::into_task)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Schedule::new(tasks))
}

/// Save a schedule, keeping the previous file contents in a `.bak` sibling.
pub fn save_schedule(path: &Path, schedule: &Schedule) -> Result<(), IoError> {
    let records: Vec<TaskRecord> = schedule.tasks.iter().map(TaskRecord::from_task).collect();
    let mut json = serde_json::to_string_pretty(&records)?;
    json.push('\n');

    if path.exists() {
        let backup = backup_path(path);
        fs::copy(path, &backup).map_err(|e| IoError::Write {
            path: backup,
            source: e,
        })?;
    }
    fs::write(path, json).map_err(|e| IoError::Write {
        path: path.to_path_buf(),
        source: e,
    })
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".bak");
    PathBuf::from(name)
}

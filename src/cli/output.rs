use serde::Serialize;

use crate::model::task::{Maturity, Task};
use crate::ops::hierarchy::FlatRow;
use crate::timeline::position::BarGeometry;
use crate::timeline::scale::ScaleCell;
use crate::timeline::upper::UpperScale;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<u64>,
    pub text: String,
    pub kind: String,
    pub start: String,
    pub end: String,
    pub duration: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    pub maturity: Maturity,
    pub level: usize,
}

impl TaskJson {
    pub fn from_task(task: &Task, level: usize) -> TaskJson {
        let span = task.span();
        TaskJson {
            id: task.id,
            parent: task.parent,
            text: task.text.clone(),
            kind: task.kind().as_str().to_string(),
            start: span.start.to_string(),
            end: span.end.to_string(),
            duration: task.duration_days(),
            progress: task.progress(),
            price: task.price().map(|p| p.to_string()),
            maturity: task.maturity(),
            level,
        }
    }

    pub fn from_row(row: &FlatRow) -> TaskJson {
        TaskJson::from_task(&row.task, row.level)
    }
}

#[derive(Serialize)]
pub struct TaskListJson {
    pub tasks: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct ScaleJson {
    pub unit: String,
    pub cells: Vec<ScaleCell>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bands: Vec<UpperScale>,
}

#[derive(Serialize)]
pub struct DeleteJson {
    pub deleted: Vec<u64>,
}

#[derive(Serialize)]
pub struct PositionJson {
    pub id: u64,
    #[serde(flatten)]
    pub geometry: BarGeometry,
}

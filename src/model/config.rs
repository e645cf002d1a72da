use serde::{Deserialize, Serialize};

use crate::timeline::scale::TimeUnit;

/// Configuration from gantry.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GanttConfig {
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub view: ViewConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Schedule file path, relative to the config file's directory.
    #[serde(default = "default_schedule_file")]
    pub file: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        ScheduleConfig {
            file: default_schedule_file(),
        }
    }
}

/// Timeline geometry defaults used by the `scale` command and any
/// embedding renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    #[serde(default = "default_unit")]
    pub unit: TimeUnit,
    #[serde(default = "default_cell_width")]
    pub cell_width: f64,
    #[serde(default = "default_cell_gap")]
    pub cell_gap: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        ViewConfig {
            unit: default_unit(),
            cell_width: default_cell_width(),
            cell_gap: default_cell_gap(),
        }
    }
}

fn default_schedule_file() -> String {
    "schedule.json".to_string()
}

fn default_unit() -> TimeUnit {
    TimeUnit::Month
}

fn default_cell_width() -> f64 {
    100.0
}

fn default_cell_gap() -> f64 {
    2.0
}

use std::fs;
use std::path::Path;

use crate::cli::commands::InitArgs;
use crate::io::config_io::{self, CONFIG_FILE};
use crate::io::schedule_io;

const CONFIG_TEMPLATE: &str = r#"# gantry configuration

[schedule]
file = "schedule.json"

[view]
unit = "month"        # day | week | month | quarter | year
cell_width = 100.0
cell_gap = 2.0
"#;

/// The bundled demo plan: one project, two phases, sequential tasks, and a
/// completed kickoff milestone.
const SAMPLE_SCHEDULE: &str = r#"[
  {
    "id": 1, "text": "Summit observation tower", "type": "project",
    "start": "2025-01-01", "end": "2025-12-31", "duration": 365,
    "progress": 0, "price": "12,800,000,000", "price_ratio": 100.0,
    "subType": "normal", "maturity": "draft", "parent": 0
  },
  {
    "id": 2, "text": "Groundbreaking", "type": "task", "subType": "milestone",
    "start": "2025-01-02", "end": "2025-01-02", "duration": 1,
    "progress": 0, "price": 0, "price_ratio": 0,
    "maturity": "completed", "parent": 1
  },
  {
    "id": 10, "text": "Temporary works", "type": "phase",
    "start": "2025-01-01", "end": "2025-03-31", "duration": 90,
    "progress": 0, "price": "480,000,000", "price_ratio": 3.75,
    "subType": "normal", "maturity": "draft", "parent": 1
  },
  {
    "id": 11, "text": "Survey stakeout", "type": "task",
    "start": "2025-01-01", "end": "2025-01-31", "duration": 31,
    "progress": 100, "price": "120,000,000", "price_ratio": 0.94,
    "subType": "normal", "maturity": "completed", "parent": 10
  },
  {
    "id": 12, "text": "Site fencing", "type": "task",
    "start": "2025-02-01", "end": "2025-03-31", "duration": 59,
    "progress": 40, "price": "360,000,000", "price_ratio": 2.81,
    "subType": "normal", "maturity": "in_progress", "parent": 10
  },
  {
    "id": 20, "text": "Foundation works", "type": "phase",
    "start": "2025-04-01", "end": "2025-08-31", "duration": 153,
    "progress": 0, "price": "3,200,000,000", "price_ratio": 25.0,
    "subType": "normal", "maturity": "draft", "parent": 1
  },
  {
    "id": 21, "text": "Excavation", "type": "task",
    "start": "2025-04-01", "end": "2025-06-15", "duration": 76,
    "progress": 0, "price": "1,400,000,000", "price_ratio": 10.9,
    "subType": "normal", "maturity": "draft", "parent": 20
  },
  {
    "id": 22, "text": "Pile driving", "type": "task",
    "start": "2025-06-16", "end": "2025-08-31", "duration": 77,
    "progress": 0, "price": "1,800,000,000", "price_ratio": 14.1,
    "subType": "normal", "maturity": "draft", "parent": 20
  }
]
"#;

/// Create gantry.toml (if absent) and the schedule file in `dir`.
pub fn cmd_init(dir: &Path, args: InitArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = dir.join(CONFIG_FILE);
    if !config_path.exists() {
        fs::write(&config_path, CONFIG_TEMPLATE)?;
    }

    let config = config_io::load_config(dir)?;
    let schedule_path = dir.join(&config.schedule.file);
    if schedule_path.exists() && !args.force {
        return Err(format!(
            "schedule file {} already exists (use --force to overwrite)",
            schedule_path.display()
        )
        .into());
    }

    if args.sample {
        // Parse the template rather than writing it verbatim, so the demo
        // plan goes through the same validation as user data.
        let mut schedule = schedule_io::parse_schedule(SAMPLE_SCHEDULE)?;
        crate::ops::task_ops::recalculate(&mut schedule);
        schedule.tasks = crate::ops::maturity::initialize_maturity_cascade(&schedule.tasks);
        schedule_io::save_schedule(&schedule_path, &schedule)?;
        println!(
            "Initialized schedule with the demo plan: {} ({} tasks)",
            schedule_path.display(),
            schedule.len()
        );
    } else {
        fs::write(&schedule_path, "[]\n")?;
        println!("Initialized empty schedule: {}", schedule_path.display());
    }
    Ok(())
}

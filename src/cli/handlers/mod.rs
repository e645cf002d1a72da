mod init;
pub use init::cmd_init;

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::{config_io, schedule_io};
use crate::model::config::GanttConfig;
use crate::model::schedule::Schedule;
use crate::model::task::{DateSpan, Maturity, TaskKind};
use crate::ops::hierarchy::{FlatRow, build_hierarchy, flatten_hierarchy};
use crate::ops::maturity::initialize_maturity_cascade;
use crate::ops::stats::schedule_stats;
use crate::ops::task_ops::{self, NewTask, TaskPatch};
use crate::timeline::position::map_position;
use crate::timeline::scale::{TimeUnit, generate_scale};
use crate::timeline::upper::generate_upper_scales;
use crate::util::money::Amount;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;
    let start = resolve_dir(cli.dir.as_deref())?;

    match cli.command {
        // Init runs before (and without) config discovery.
        Commands::Init(args) => init::cmd_init(&start, args),
        command => {
            let root = config_io::discover_config_dir(&start).unwrap_or(start);
            let config = config_io::load_config(&root)?;
            let path = root.join(&config.schedule.file);
            match command {
                Commands::Init(_) => Ok(()),

                // Read commands
                Commands::List(args) => cmd_list(&path, args, json),
                Commands::Show(args) => cmd_show(&path, args, json),
                Commands::Scale(args) => cmd_scale(&path, &config, args, json),
                Commands::Pos(args) => cmd_pos(&path, &config, args, json),
                Commands::Stats => cmd_stats(&path, json),

                // Write commands
                Commands::Add(args) => cmd_add(&path, args),
                Commands::Edit(args) => cmd_edit(&path, args),
                Commands::Progress(args) => cmd_progress(&path, args),
                Commands::Status(args) => cmd_status(&path, args),
                Commands::Rm(args) => cmd_rm(&path, args, json),
                Commands::Mv(args) => cmd_mv(&path, args),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn resolve_dir(dir: Option<&str>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match dir {
        Some(d) => std::fs::canonicalize(d)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", d, e).into()),
        None => Ok(std::env::current_dir()?),
    }
}

/// Load the schedule and bring the derived values up to date, the same way
/// the widget recomputes on mount.
fn load_schedule(path: &Path) -> Result<Schedule, Box<dyn std::error::Error>> {
    if !path.is_file() {
        return Err(format!(
            "no schedule file at {} (run `gy init` first)",
            path.display()
        )
        .into());
    }
    let mut schedule = schedule_io::load_schedule(path)?;
    task_ops::recalculate(&mut schedule);
    schedule.tasks = initialize_maturity_cascade(&schedule.tasks);
    Ok(schedule)
}

fn save_schedule(path: &Path, schedule: &Schedule) -> Result<(), Box<dyn std::error::Error>> {
    schedule_io::save_schedule(path, schedule)?;
    Ok(())
}

fn parse_date(s: &str) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{}', expected YYYY-MM-DD", s).into())
}

fn parse_kind(s: &str) -> Result<TaskKind, Box<dyn std::error::Error>> {
    TaskKind::parse(s)
        .ok_or_else(|| format!("unknown kind '{}' (project, phase, task, milestone)", s).into())
}

fn parse_maturity(s: &str) -> Result<Maturity, Box<dyn std::error::Error>> {
    Maturity::parse(s)
        .ok_or_else(|| format!("unknown status '{}' (draft, in_progress, completed)", s).into())
}

fn parse_unit(s: &str) -> Result<TimeUnit, Box<dyn std::error::Error>> {
    TimeUnit::parse(s)
        .ok_or_else(|| format!("unknown unit '{}' (day, week, month, quarter, year)", s).into())
}

fn parse_amount(s: &str) -> Result<Amount, Box<dyn std::error::Error>> {
    Ok(s.parse::<Amount>()?)
}

fn render_row(row: &FlatRow) -> String {
    let task = &row.task;
    let span = task.span();
    let progress = match task.progress() {
        Some(p) => format!("{:>3}%", p),
        None => "  --".to_string(),
    };
    format!(
        "{:>4}  {:<9} {} .. {}  {}  {:<11} {}{}",
        task.id,
        task.kind().as_str(),
        span.start,
        span.end,
        progress,
        task.maturity().as_str(),
        "  ".repeat(row.level),
        task.text
    )
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(path: &Path, args: ListArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let schedule = load_schedule(path)?;
    let mut rows = flatten_hierarchy(&build_hierarchy(&schedule.tasks));
    if let Some(status) = &args.status {
        let maturity = parse_maturity(status)?;
        rows.retain(|r| r.task.maturity() == maturity);
    }

    if json {
        let out = TaskListJson {
            tasks: rows.iter().map(TaskJson::from_row).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for row in &rows {
            println!("{}", render_row(row));
        }
    }
    Ok(())
}

fn cmd_show(path: &Path, args: ShowArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let schedule = load_schedule(path)?;
    let task = schedule
        .task(args.id)
        .ok_or_else(|| format!("task not found: {}", args.id))?;
    let level = schedule.ancestor_ids(args.id).len();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&TaskJson::from_task(task, level))?
        );
        return Ok(());
    }

    let span = task.span();
    println!("{} ({})", task.text, task.kind());
    println!("  id:        {}", task.id);
    match task.parent {
        Some(parent) => println!("  parent:    {}", parent),
        None => println!("  parent:    none (root)"),
    }
    println!("  dates:     {} .. {} ({} days)", span.start, span.end, task.duration_days());
    if let Some(progress) = task.progress() {
        println!("  progress:  {}%", progress);
    }
    if let Some(price) = task.price() {
        println!("  price:     {}", price);
    }
    println!("  status:    {}", task.maturity());
    Ok(())
}

fn cmd_scale(
    path: &Path,
    config: &GanttConfig,
    args: ScaleArgs,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let unit = match &args.unit {
        Some(u) => parse_unit(u)?,
        None => config.view.unit,
    };

    let (from, to) = resolve_range(path, args.from.as_deref(), args.to.as_deref())?;
    let cells = generate_scale(from, to, unit);
    let bands = if args.bands {
        generate_upper_scales(&cells, unit)
    } else {
        Vec::new()
    };

    if json {
        let out = ScaleJson {
            unit: unit.to_string(),
            cells,
            bands,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    for cell in &cells {
        let weekend = if cell.is_weekend { "  weekend" } else { "" };
        println!("{}  {:<4}{}", cell.date, cell.label, weekend);
    }
    if !bands.is_empty() {
        println!();
        for band in &bands {
            println!(
                "level {}  {:<5} start {:>3}  span {}",
                band.level, band.label, band.start_index, band.span
            );
        }
    }
    Ok(())
}

fn cmd_pos(
    path: &Path,
    config: &GanttConfig,
    args: PosArgs,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let unit = match &args.unit {
        Some(u) => parse_unit(u)?,
        None => config.view.unit,
    };
    let schedule = load_schedule(path)?;
    let task = schedule
        .task(args.id)
        .ok_or_else(|| format!("task not found: {}", args.id))?;
    let span = schedule
        .overall_span()
        .ok_or("schedule is empty")?;

    let cells = generate_scale(span.start, span.end, unit);
    let geometry = map_position(
        task.span(),
        &cells,
        config.view.cell_width,
        config.view.cell_gap,
        unit,
    );

    if json {
        let out = PositionJson {
            id: task.id,
            geometry,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!(
            "task {} on the {} axis: x {:.1}, width {:.1}",
            task.id, unit, geometry.x, geometry.width
        );
    }
    Ok(())
}

fn cmd_stats(path: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let schedule = load_schedule(path)?;
    let stats = schedule_stats(&schedule, Local::now().date_naive());

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("tasks:       {}", stats.total);
    println!(
        "  by kind:   {} project, {} phase, {} task, {} milestone",
        stats.projects, stats.phases, stats.tasks, stats.milestones
    );
    println!(
        "  by status: {} draft, {} in progress, {} completed",
        stats.draft, stats.in_progress, stats.completed
    );
    println!("  overdue:   {}", stats.overdue);
    Ok(())
}

/// Use explicit --from/--to when given, otherwise fall back to the range
/// covered by the schedule.
fn resolve_range(
    path: &Path,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<(NaiveDate, NaiveDate), Box<dyn std::error::Error>> {
    let fallback = if from.is_none() || to.is_none() {
        Some(
            load_schedule(path)?
                .overall_span()
                .ok_or("schedule is empty; pass --from and --to")?,
        )
    } else {
        None
    };
    let from = match from {
        Some(f) => parse_date(f)?,
        None => fallback.map(|s| s.start).unwrap_or_default(),
    };
    let to = match to {
        Some(t) => parse_date(t)?,
        None => fallback.map(|s| s.end).unwrap_or_default(),
    };
    if to < from {
        return Err(format!("range end {} is before start {}", to, from).into());
    }
    Ok((from, to))
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(path: &Path, args: AddArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut schedule = load_schedule(path)?;
    let kind = parse_kind(&args.kind)?;
    let start = parse_date(&args.start)?;
    let end = match &args.end {
        Some(e) => parse_date(e)?,
        None => start,
    };

    let mut new = NewTask::new(kind, args.text.clone(), DateSpan::new(start, end));
    new.parent = args.parent;
    if let Some(price) = &args.price {
        new.price = parse_amount(price)?;
    }
    if let Some(ratio) = args.ratio {
        new.price_ratio = ratio;
    }
    if let Some(progress) = args.progress {
        new.progress = progress.min(100);
    }

    let id = task_ops::add_task(&mut schedule, new)?;
    save_schedule(path, &schedule)?;
    println!("Added {} {}: {}", kind, id, args.text);
    Ok(())
}

fn cmd_edit(path: &Path, args: EditArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut schedule = load_schedule(path)?;

    let patch = TaskPatch {
        text: args.text,
        start: args.start.as_deref().map(parse_date).transpose()?,
        end: args.end.as_deref().map(parse_date).transpose()?,
        progress: args.progress,
        price: args.price.as_deref().map(parse_amount).transpose()?,
        price_ratio: args.ratio,
        maturity: args.status.as_deref().map(parse_maturity).transpose()?,
        milestone: if args.to_milestone {
            Some(true)
        } else if args.to_task {
            Some(false)
        } else {
            None
        },
    };

    task_ops::modify_task(&mut schedule, args.id, patch)?;
    save_schedule(path, &schedule)?;
    println!("Updated task {}", args.id);
    Ok(())
}

fn cmd_progress(path: &Path, args: ProgressArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut schedule = load_schedule(path)?;
    task_ops::set_progress(&mut schedule, args.id, args.percent)?;
    save_schedule(path, &schedule)?;
    let status = schedule
        .task(args.id)
        .map(|t| t.maturity().as_str())
        .unwrap_or("unknown");
    println!("task {}: progress {}% ({})", args.id, args.percent.min(100), status);
    Ok(())
}

fn cmd_status(path: &Path, args: StatusArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut schedule = load_schedule(path)?;
    let maturity = parse_maturity(&args.status)?;
    task_ops::set_maturity(&mut schedule, args.id, maturity)?;
    save_schedule(path, &schedule)?;
    println!("task {}: status {}", args.id, maturity);
    Ok(())
}

fn cmd_rm(path: &Path, args: RmArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut schedule = load_schedule(path)?;
    let removed = task_ops::delete_task(&mut schedule, args.id)?;
    save_schedule(path, &schedule)?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&DeleteJson { deleted: removed })?
        );
    } else {
        let ids: Vec<String> = removed.iter().map(|id| id.to_string()).collect();
        println!("Deleted {} task(s): {}", removed.len(), ids.join(", "));
    }
    Ok(())
}

fn cmd_mv(path: &Path, args: MvArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut schedule = load_schedule(path)?;
    let parent = if args.parent == 0 {
        None
    } else {
        Some(args.parent)
    };
    task_ops::move_task(&mut schedule, args.id, parent)?;
    save_schedule(path, &schedule)?;
    match parent {
        Some(parent) => println!("Moved task {} under {}", args.id, parent),
        None => println!("Moved task {} to the root", args.id),
    }
    Ok(())
}

//! Read-only views: calendar, agenda, upcoming and progress.

use chrono::{Datelike, Days, NaiveDate};

use crate::calendar::{parse_month, MonthGrid, WeekStart};
use crate::cli::{day_arg, Context};
use crate::date::{day_key, today};
use crate::deadline::{rebuild_index, DeadlineEntry, EntryKind};
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput};
use crate::progress::{overview, Overview, ProgressSummary};

#[derive(serde::Serialize)]
struct AgendaOutput<'a> {
    date: String,
    entries: &'a [DeadlineEntry],
}

#[derive(serde::Serialize)]
struct UpcomingDay<'a> {
    date: &'a str,
    entries: &'a [DeadlineEntry],
}

#[derive(serde::Serialize)]
struct UpcomingOutput<'a> {
    from: String,
    to: String,
    total: usize,
    days: Vec<UpcomingDay<'a>>,
}

#[derive(serde::Serialize)]
struct ProjectProgressOutput {
    project_id: String,
    title: String,
    progress: ProgressSummary,
}

pub fn run_calendar(
    ctx: &Context,
    month: Option<String>,
    week_start: Option<WeekStart>,
) -> Result<()> {
    let session = ctx.session()?;
    let today = today();
    let (year, month) = match month.as_deref() {
        Some(raw) => parse_month(raw)?,
        None => (today.year(), today.month()),
    };
    let week_start = week_start.unwrap_or(ctx.config.calendar.week_start);

    let index = rebuild_index(&session.projects()?, &session.tasks(None)?);
    let grid = MonthGrid::build(year, month, week_start)?.with_markers(&index);

    let mut human = HumanOutput::new(grid.render(Some(today)));
    let marked: Vec<_> = grid.days().filter(|cell| cell.deadlines > 0).collect();
    for cell in &marked {
        let titles = entry_titles(index.lookup_date(cell.date));
        human.push_detail(format!("{}: {titles}", cell.date));
    }
    if let Some(cell) = marked.first() {
        human.push_next_step(format!("projectpro agenda {}", cell.date));
    }
    emit_success(ctx.output, "calendar", &grid, Some(&human))
}

pub fn run_agenda(ctx: &Context, date: Option<String>) -> Result<()> {
    let session = ctx.session()?;
    let day = day_arg(date.as_deref())?;
    let index = rebuild_index(&session.projects()?, &session.tasks(None)?);
    let entries = index.lookup_date(day);

    let output = AgendaOutput {
        date: day_key(day),
        entries,
    };
    let mut human = HumanOutput::new(format!("Agenda for {}", output.date));
    human.push_summary("Deadlines", entries.len().to_string());
    for entry in entries {
        human.push_detail(entry_line(entry));
    }
    emit_success(ctx.output, "agenda", &output, Some(&human))
}

pub fn run_upcoming(ctx: &Context, days: Option<u32>) -> Result<()> {
    let days = days.unwrap_or(ctx.config.agenda.upcoming_days);
    if days == 0 {
        return Err(Error::InvalidArgument("days must be at least 1".to_string()));
    }
    let session = ctx.session()?;
    let from = today();
    let to = last_day(from, days)?;
    let index = rebuild_index(&session.projects()?, &session.tasks(None)?);

    let upcoming: Vec<UpcomingDay<'_>> = index
        .range(from, to)
        .map(|(date, entries)| UpcomingDay { date, entries })
        .collect();
    let total: usize = upcoming.iter().map(|day| day.entries.len()).sum();

    let mut human = HumanOutput::new(format!("Upcoming deadlines {from} .. {to}"));
    human.push_summary("Deadlines", total.to_string());
    for day in &upcoming {
        for entry in day.entries {
            human.push_detail(format!("{} {}", day.date, entry_line(entry)));
        }
    }

    let output = UpcomingOutput {
        from: day_key(from),
        to: day_key(to),
        total,
        days: upcoming,
    };
    emit_success(ctx.output, "upcoming", &output, Some(&human))
}

pub fn run_progress(ctx: &Context, project: Option<String>) -> Result<()> {
    let session = ctx.session()?;
    if let Some(project) = project {
        let project = session.store().get_project(session.user(), &project)?;
        let tasks = session.tasks(Some(project.id.as_str()))?;
        let completed = tasks.iter().filter(|task| task.completed).count();
        let output = ProjectProgressOutput {
            progress: ProgressSummary::from_counts(tasks.len(), completed),
            project_id: project.id,
            title: project.title,
        };
        let mut human = HumanOutput::new(format!("Progress for {}", output.title));
        push_progress(&mut human, "Completed", &output.progress);
        return emit_success(ctx.output, "progress", &output, Some(&human));
    }

    let projects = session.projects()?;
    let tasks = session.tasks(None)?;
    let report: Overview = overview(&projects, &tasks, today());

    let mut human = HumanOutput::new("Progress");
    human.push_summary("Projects", report.projects.to_string());
    push_progress(&mut human, "Tasks completed", &report.overall);
    human.push_summary("Overdue", report.overdue.to_string());
    human.push_summary(
        "By priority",
        format!(
            "urgent {}, medium {}, low {}, unset {}",
            report.by_priority.urgent,
            report.by_priority.medium,
            report.by_priority.low,
            report.by_priority.unset
        ),
    );
    for project in &projects {
        let summary = report
            .per_project
            .get(&project.id)
            .copied()
            .unwrap_or_default();
        human.push_detail(format!(
            "{} {}% ({}/{})",
            project.title, summary.percentage, summary.completed, summary.total
        ));
    }
    if report.overdue > 0 {
        human.push_warning(format!("{} open task(s) past their deadline", report.overdue));
    }
    emit_success(ctx.output, "progress", &report, Some(&human))
}

/// Last day of a window of `days` days starting at `from`.
fn last_day(from: NaiveDate, days: u32) -> Result<NaiveDate> {
    from.checked_add_days(Days::new(u64::from(days) - 1))
        .ok_or_else(|| Error::InvalidArgument(format!("{days} days from {from} is out of range")))
}

fn push_progress(human: &mut HumanOutput, label: &str, summary: &ProgressSummary) {
    human.push_summary(
        label,
        format!("{}% ({}/{})", summary.percentage, summary.completed, summary.total),
    );
}

fn entry_line(entry: &DeadlineEntry) -> String {
    match entry.kind {
        EntryKind::Project => format!("project {} {}", entry.id, entry.title),
        EntryKind::Task => {
            let mark = if entry.completed == Some(true) { "x" } else { " " };
            format!("[{mark}] task {} {}", entry.id, entry.title)
        }
    }
}

fn entry_titles(entries: &[DeadlineEntry]) -> String {
    entries
        .iter()
        .map(|entry| entry.title.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

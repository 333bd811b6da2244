//! projectpro watch: follow store changes and reprint one day's agenda.

use crate::cli::{day_arg, Context};
use crate::date::day_key;
use crate::deadline::DeadlineEntry;
use crate::error::Result;
use crate::output::{emit_json_line, format_human, HumanOutput};
use crate::progress::ProgressSummary;
use crate::watch::DashboardState;

#[derive(serde::Serialize)]
struct WatchFrame<'a> {
    revision: u64,
    date: &'a str,
    entries: &'a [DeadlineEntry],
    overall: ProgressSummary,
}

pub fn run(ctx: &Context, date: Option<String>) -> Result<()> {
    let day = day_arg(date.as_deref())?;
    let key = day_key(day);
    let session = ctx.session()?;
    let subscription = session.subscribe()?;
    tracing::info!(date = %key, user = session.user(), "watching deadlines");

    let mut state = DashboardState::new();
    for event in subscription {
        match event {
            Ok(event) => state.apply(event),
            Err(err) => {
                tracing::warn!(error = %err, "watch event failed");
                if !ctx.output.json && !ctx.output.quiet {
                    eprintln!("warning: {err}");
                }
                continue;
            }
        }
        // The first two events are the initial snapshots.
        if state.revision() < 2 {
            continue;
        }

        let total = state.tasks().len();
        let completed = state.tasks().iter().filter(|task| task.completed).count();
        let frame = WatchFrame {
            revision: state.revision(),
            date: &key,
            entries: state.index().lookup(&key),
            overall: ProgressSummary::from_counts(total, completed),
        };

        if ctx.output.json {
            emit_json_line("watch", &frame)?;
        } else if !ctx.output.quiet {
            println!("{}", format_human(&frame_human(&frame)));
            println!();
        }
    }
    Ok(())
}

fn frame_human(frame: &WatchFrame<'_>) -> HumanOutput {
    let mut human =
        HumanOutput::new(format!("Agenda for {} (rev {})", frame.date, frame.revision));
    human.push_summary("Deadlines", frame.entries.len().to_string());
    human.push_summary(
        "Tasks completed",
        format!(
            "{}% ({}/{})",
            frame.overall.percentage, frame.overall.completed, frame.overall.total
        ),
    );
    for entry in frame.entries {
        human.push_detail(format!("{} {}", entry.id, entry.title));
    }
    human
}

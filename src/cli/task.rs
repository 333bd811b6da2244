//! projectpro task command implementations.

use crate::cli::{optional_change, Context, TaskCommands};
use crate::error::Result;
use crate::model::{Priority, Task};
use crate::ordering::sort_tasks;
use crate::output::{emit_success, HumanOutput};
use crate::validate::{self, TaskDraft, TaskPatch};

#[derive(serde::Serialize)]
struct TaskListOutput {
    total: usize,
    open: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    project_id: Option<String>,
    tasks: Vec<Task>,
}

struct NewTaskOptions {
    project: String,
    title: String,
    description: Option<String>,
    deadline: Option<String>,
    priority: Option<Priority>,
}

pub fn run(ctx: &Context, command: TaskCommands) -> Result<()> {
    match command {
        TaskCommands::New {
            project,
            title,
            description,
            deadline,
            priority,
        } => run_new(
            ctx,
            NewTaskOptions {
                project,
                title,
                description,
                deadline,
                priority,
            },
        ),
        TaskCommands::List { project, open } => run_list(ctx, project.as_deref(), open),
        TaskCommands::Show { id } => run_show(ctx, &id),
        TaskCommands::Edit {
            id,
            title,
            description,
            clear_description,
            deadline,
            clear_deadline,
            priority,
            project,
        } => {
            let deadline = deadline.as_deref().map(validate::deadline).transpose()?;
            let patch = TaskPatch {
                title,
                description: optional_change(description, clear_description),
                deadline: optional_change(deadline, clear_deadline),
                priority,
                project_id: project,
                completed: None,
            };
            run_edit(ctx, &id, patch)
        }
        TaskCommands::Toggle { id } => run_toggle(ctx, &id),
        TaskCommands::Rm { id } => run_rm(ctx, &id),
    }
}

fn run_new(ctx: &Context, options: NewTaskOptions) -> Result<()> {
    let session = ctx.session()?;
    let draft = TaskDraft {
        project_id: options.project,
        title: options.title,
        description: options.description,
        deadline: options
            .deadline
            .as_deref()
            .map(validate::deadline)
            .transpose()?,
        priority: options
            .priority
            .unwrap_or(ctx.config.tasks.default_priority),
    };
    let task = session.store().create_task(session.user(), draft)?;

    let mut human = HumanOutput::new("Task created");
    push_task_summary(&mut human, &task);
    human.push_next_step(format!("projectpro task toggle {}", task.id));
    emit_success(ctx.output, "task new", &task, Some(&human))
}

fn run_list(ctx: &Context, project: Option<&str>, open_only: bool) -> Result<()> {
    let session = ctx.session()?;
    let project_id = match project {
        Some(project) => Some(session.store().get_project(session.user(), project)?.id),
        None => None,
    };
    let mut tasks = session.tasks(project_id.as_deref())?;
    if open_only {
        tasks.retain(|task| !task.completed);
    }
    sort_tasks(&mut tasks);

    let open = tasks.iter().filter(|task| !task.completed).count();
    let mut human = HumanOutput::new("Tasks");
    if let Some(project_id) = project_id.as_ref() {
        human.push_summary("Project", project_id.clone());
    }
    human.push_summary("Total", tasks.len().to_string());
    human.push_summary("Open", open.to_string());
    for task in &tasks {
        let mut line = task_line(task);
        if ctx.verbose {
            if let Some(description) = task.description.as_ref() {
                line.push_str(&format!(" - {description}"));
            }
        }
        human.push_detail(line);
    }

    let output = TaskListOutput {
        total: tasks.len(),
        open,
        project_id,
        tasks,
    };
    emit_success(ctx.output, "task list", &output, Some(&human))
}

fn run_show(ctx: &Context, id: &str) -> Result<()> {
    let session = ctx.session()?;
    let task = session.store().get_task(session.user(), id)?;
    let mut human = HumanOutput::new(format!("Task {}", task.id));
    push_task_summary(&mut human, &task);
    if task.deadline.is_some() && task.deadline.as_ref().and_then(|d| d.calendar_day()).is_none() {
        human.push_warning("deadline is not a valid date and is hidden from the calendar");
    }
    emit_success(ctx.output, "task show", &task, Some(&human))
}

fn run_edit(ctx: &Context, id: &str, patch: TaskPatch) -> Result<()> {
    let session = ctx.session()?;
    if patch.is_empty() {
        let task = session.store().get_task(session.user(), id)?;
        let mut human = HumanOutput::new("No task changes");
        human.push_summary("ID", task.id.clone());
        return emit_success(ctx.output, "task edit", &task, Some(&human));
    }
    let task = session.store().update_task(session.user(), id, patch)?;
    let mut human = HumanOutput::new("Task updated");
    push_task_summary(&mut human, &task);
    emit_success(ctx.output, "task edit", &task, Some(&human))
}

fn run_toggle(ctx: &Context, id: &str) -> Result<()> {
    let session = ctx.session()?;
    let task = session.store().toggle_task(session.user(), id)?;
    let mut human = HumanOutput::new(if task.completed {
        "Task completed"
    } else {
        "Task reopened"
    });
    human.push_summary("ID", task.id.clone());
    human.push_summary("Title", task.title.clone());
    emit_success(ctx.output, "task toggle", &task, Some(&human))
}

fn run_rm(ctx: &Context, id: &str) -> Result<()> {
    let session = ctx.session()?;
    let task = session.store().delete_task(session.user(), id)?;
    let mut human = HumanOutput::new("Task deleted");
    human.push_summary("ID", task.id.clone());
    human.push_summary("Title", task.title.clone());
    emit_success(ctx.output, "task rm", &task, Some(&human))
}

fn push_task_summary(human: &mut HumanOutput, task: &Task) {
    human.push_summary("ID", task.id.clone());
    human.push_summary("Title", task.title.clone());
    human.push_summary("Project", task.project_id.clone());
    human.push_summary("Priority", super::project::priority_label(task.priority));
    human.push_summary("Status", if task.completed { "done" } else { "open" });
    if let Some(deadline) = task.deadline.as_ref() {
        let shown = deadline
            .calendar_day()
            .map(|day| day.to_string())
            .unwrap_or_else(|| deadline.to_string());
        human.push_summary("Deadline", shown);
    }
    if let Some(description) = task.description.as_ref() {
        human.push_summary("Description", description.clone());
    }
}

/// One-line rendering used by task and project listings.
pub(crate) fn task_line(task: &Task) -> String {
    let mark = if task.completed { "x" } else { " " };
    let mut line = format!(
        "[{mark}] {} {} ({})",
        task.id,
        task.title,
        super::project::priority_label(task.priority)
    );
    if let Some(day) = task.deadline.as_ref().and_then(|d| d.calendar_day()) {
        line.push_str(&format!(" due {day}"));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::DateValue;

    #[test]
    fn task_line_marks_completion_and_deadline() {
        let task = Task {
            id: "tsk-1".to_string(),
            title: "Write report".to_string(),
            description: None,
            deadline: Some(DateValue::Text("2025-10-15".to_string())),
            priority: Some(Priority::Urgent),
            completed: true,
            project_id: "prj-1".to_string(),
            owner_id: "u1".to_string(),
            created_at: None,
            updated_at: None,
        };
        assert_eq!(
            task_line(&task),
            "[x] tsk-1 Write report (urgent) due 2025-10-15"
        );
    }

    #[test]
    fn task_line_skips_unresolvable_deadline() {
        let task = Task {
            id: "tsk-2".to_string(),
            title: "Plan".to_string(),
            description: None,
            deadline: Some(DateValue::Text("soon".to_string())),
            priority: None,
            completed: false,
            project_id: "prj-1".to_string(),
            owner_id: "u1".to_string(),
            created_at: None,
            updated_at: None,
        };
        assert_eq!(task_line(&task), "[ ] tsk-2 Plan (none)");
    }
}

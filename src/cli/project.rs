//! projectpro project command implementations.

use crate::cli::{optional_change, Context, ProjectCommands};
use crate::error::Result;
use crate::model::{Project, Task};
use crate::ordering::{sort_projects, sort_tasks};
use crate::output::{emit_success, HumanOutput};
use crate::progress::{summarize, ProgressSummary};
use crate::store::ProjectDeleteReport;
use crate::validate::{self, ProjectDraft, ProjectPatch};

#[derive(serde::Serialize)]
struct ProjectListOutput {
    total: usize,
    projects: Vec<ProjectWithProgress>,
}

#[derive(serde::Serialize)]
struct ProjectWithProgress {
    #[serde(flatten)]
    project: Project,
    progress: ProgressSummary,
}

#[derive(serde::Serialize)]
struct ProjectShowOutput {
    #[serde(flatten)]
    project: Project,
    progress: ProgressSummary,
    tasks: Vec<Task>,
}

pub fn run(ctx: &Context, command: ProjectCommands) -> Result<()> {
    match command {
        ProjectCommands::New {
            title,
            description,
            deadline,
            priority,
            image,
        } => run_new(ctx, title, description, deadline, priority, image),
        ProjectCommands::List => run_list(ctx),
        ProjectCommands::Show { id } => run_show(ctx, &id),
        ProjectCommands::Edit {
            id,
            title,
            description,
            clear_description,
            deadline,
            clear_deadline,
            priority,
            image,
            clear_image,
        } => {
            let deadline = deadline.as_deref().map(validate::deadline).transpose()?;
            let patch = ProjectPatch {
                title,
                description: optional_change(description, clear_description),
                deadline: optional_change(deadline, clear_deadline),
                priority,
                image: optional_change(image, clear_image),
            };
            run_edit(ctx, &id, patch)
        }
        ProjectCommands::Rm { id } => run_rm(ctx, &id),
    }
}

fn run_new(
    ctx: &Context,
    title: String,
    description: Option<String>,
    deadline: Option<String>,
    priority: Option<crate::model::Priority>,
    image: Option<String>,
) -> Result<()> {
    let session = ctx.session()?;
    let draft = ProjectDraft {
        title,
        description,
        deadline: deadline.as_deref().map(validate::deadline).transpose()?,
        priority: priority.unwrap_or(ctx.config.tasks.default_priority),
        image,
    };
    let project = session.store().create_project(session.user(), draft)?;

    let mut human = HumanOutput::new("Project created");
    push_project_summary(&mut human, &project);
    human.push_next_step(format!("projectpro task new {} \"First task\"", project.id));
    emit_success(ctx.output, "project new", &project, Some(&human))
}

fn run_list(ctx: &Context) -> Result<()> {
    let session = ctx.session()?;
    let mut projects = session.projects()?;
    sort_projects(&mut projects);
    let progress = summarize(&session.tasks(None)?);

    let projects: Vec<ProjectWithProgress> = projects
        .into_iter()
        .map(|project| ProjectWithProgress {
            progress: progress.get(&project.id).copied().unwrap_or_default(),
            project,
        })
        .collect();

    let mut human = HumanOutput::new("Projects");
    human.push_summary("Total", projects.len().to_string());
    for entry in &projects {
        let project = &entry.project;
        let mut line = format!(
            "{} {} [{}] {}% ({}/{})",
            project.id,
            project.title,
            priority_label(project.priority),
            entry.progress.percentage,
            entry.progress.completed,
            entry.progress.total,
        );
        if let Some(day) = project.deadline.as_ref().and_then(|d| d.calendar_day()) {
            line.push_str(&format!(" due {day}"));
        }
        if ctx.verbose {
            if let Some(description) = project.description.as_ref() {
                line.push_str(&format!(" - {description}"));
            }
        }
        human.push_detail(line);
    }
    if projects.is_empty() {
        human.push_next_step("projectpro project new \"My first project\"");
    }

    let output = ProjectListOutput {
        total: projects.len(),
        projects,
    };
    emit_success(ctx.output, "project list", &output, Some(&human))
}

fn run_show(ctx: &Context, id: &str) -> Result<()> {
    let session = ctx.session()?;
    let project = session.store().get_project(session.user(), id)?;
    let mut tasks = session.tasks(Some(project.id.as_str()))?;
    sort_tasks(&mut tasks);
    let progress = summarize(&tasks)
        .get(&project.id)
        .copied()
        .unwrap_or_default();

    let mut human = HumanOutput::new(format!("Project {}", project.id));
    push_project_summary(&mut human, &project);
    human.push_summary(
        "Progress",
        format!("{}% ({}/{})", progress.percentage, progress.completed, progress.total),
    );
    for task in &tasks {
        human.push_detail(super::task::task_line(task));
    }
    if project.deadline.is_some()
        && project.deadline.as_ref().and_then(|d| d.calendar_day()).is_none()
    {
        human.push_warning("deadline is not a valid date and is hidden from the calendar");
    }

    let output = ProjectShowOutput {
        project,
        progress,
        tasks,
    };
    emit_success(ctx.output, "project show", &output, Some(&human))
}

fn run_edit(ctx: &Context, id: &str, patch: ProjectPatch) -> Result<()> {
    let session = ctx.session()?;
    if patch.is_empty() {
        let project = session.store().get_project(session.user(), id)?;
        let mut human = HumanOutput::new("No project changes");
        human.push_summary("ID", project.id.clone());
        return emit_success(ctx.output, "project edit", &project, Some(&human));
    }
    let project = session.store().update_project(session.user(), id, patch)?;
    let mut human = HumanOutput::new("Project updated");
    push_project_summary(&mut human, &project);
    emit_success(ctx.output, "project edit", &project, Some(&human))
}

fn run_rm(ctx: &Context, id: &str) -> Result<()> {
    let session = ctx.session()?;
    let report: ProjectDeleteReport = session.store().delete_project(session.user(), id)?;
    let mut human = HumanOutput::new("Project deleted");
    human.push_summary("ID", report.project_id.clone());
    human.push_summary("Tasks removed", report.tasks_removed.to_string());
    emit_success(ctx.output, "project rm", &report, Some(&human))
}

fn push_project_summary(human: &mut HumanOutput, project: &Project) {
    human.push_summary("ID", project.id.clone());
    human.push_summary("Title", project.title.clone());
    human.push_summary("Priority", priority_label(project.priority));
    if let Some(deadline) = project.deadline.as_ref() {
        let shown = deadline
            .calendar_day()
            .map(|day| day.to_string())
            .unwrap_or_else(|| deadline.to_string());
        human.push_summary("Deadline", shown);
    }
    if let Some(description) = project.description.as_ref() {
        human.push_summary("Description", description.clone());
    }
    if let Some(image) = project.image.as_ref() {
        human.push_summary("Image", image.clone());
    }
}

pub(crate) fn priority_label(priority: Option<crate::model::Priority>) -> &'static str {
    priority.map(|p| p.as_str()).unwrap_or("none")
}

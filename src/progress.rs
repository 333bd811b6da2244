//! Completion progress per project and the analytics overview.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::model::{Priority, Project, Task};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProgressSummary {
    pub total: usize,
    pub completed: usize,
    pub percentage: u8,
}

impl ProgressSummary {
    pub fn from_counts(total: usize, completed: usize) -> Self {
        let completed = completed.min(total);
        Self {
            total,
            completed,
            percentage: percentage(completed, total),
        }
    }
}

/// `round(completed / total * 100)` with halves rounded up; 0 for an empty
/// set.
pub fn percentage(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let completed = completed.min(total) as u128;
    let total = total as u128;
    let rounded = (completed * 200 + total) / (total * 2);
    rounded as u8
}

/// Per-project completion counts, keyed by project id.
pub fn summarize(tasks: &[Task]) -> BTreeMap<String, ProgressSummary> {
    let mut counts: BTreeMap<String, (usize, usize)> = BTreeMap::new();
    for task in tasks {
        let entry = counts.entry(task.project_id.clone()).or_default();
        entry.0 += 1;
        if task.completed {
            entry.1 += 1;
        }
    }
    counts
        .into_iter()
        .map(|(project_id, (total, completed))| {
            (project_id, ProgressSummary::from_counts(total, completed))
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PriorityCounts {
    pub urgent: usize,
    pub medium: usize,
    pub low: usize,
    pub unset: usize,
}

impl PriorityCounts {
    fn add(&mut self, priority: Option<Priority>) {
        match priority {
            Some(Priority::Urgent) => self.urgent += 1,
            Some(Priority::Medium) => self.medium += 1,
            Some(Priority::Low) => self.low += 1,
            None => self.unset += 1,
        }
    }
}

/// Everything the analytics view shows in one pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Overview {
    pub projects: usize,
    pub overall: ProgressSummary,
    pub by_priority: PriorityCounts,
    /// Incomplete tasks whose deadline day is before `today`.
    pub overdue: usize,
    /// Every listed project, including those with no tasks yet.
    pub per_project: BTreeMap<String, ProgressSummary>,
}

/// Analytics overview. Tasks with unresolvable deadlines are never overdue.
pub fn overview(projects: &[Project], tasks: &[Task], today: NaiveDate) -> Overview {
    let mut per_project = summarize(tasks);
    for project in projects {
        per_project.entry(project.id.clone()).or_default();
    }

    let completed = tasks.iter().filter(|task| task.completed).count();
    let mut by_priority = PriorityCounts::default();
    let mut overdue = 0;
    for task in tasks {
        by_priority.add(task.priority);
        let day = task.deadline.as_ref().and_then(|d| d.calendar_day());
        if !task.completed && day.is_some_and(|day| day < today) {
            overdue += 1;
        }
    }

    Overview {
        projects: projects.len(),
        overall: ProgressSummary::from_counts(tasks.len(), completed),
        by_priority,
        overdue,
        per_project,
    }
}

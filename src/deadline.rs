//! Deadline aggregation for the calendar view.
//!
//! Projects and tasks arrive as two independent collections. Every change to
//! either one rebuilds the whole index; there is no incremental update.
//! Items whose deadline cannot be resolved to a calendar day are left out of
//! the index without any error or log line.

use std::collections::BTreeMap;

use chrono::{Local, NaiveDate, TimeZone};
use serde::Serialize;

use crate::date::day_key;
use crate::model::{Priority, Project, Task};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Project,
    Task,
}

/// One deadline under a calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeadlineEntry {
    pub kind: EntryKind,
    pub id: String,
    pub title: String,
    /// Owning project for task entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// Completion flag for task entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl DeadlineEntry {
    fn project(project: &Project) -> Self {
        Self {
            kind: EntryKind::Project,
            id: project.id.clone(),
            title: project.title.clone(),
            project_id: None,
            priority: project.priority,
            completed: None,
        }
    }

    fn task(task: &Task) -> Self {
        Self {
            kind: EntryKind::Task,
            id: task.id.clone(),
            title: task.title.clone(),
            project_id: Some(task.project_id.clone()),
            priority: task.priority,
            completed: Some(task.completed),
        }
    }
}

/// Calendar-day keyed deadline entries. Keys iterate chronologically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DeadlineIndex {
    days: BTreeMap<String, Vec<DeadlineEntry>>,
}

impl DeadlineIndex {
    /// Entries for a `YYYY-MM-DD` key; empty for unknown keys.
    pub fn lookup(&self, key: &str) -> &[DeadlineEntry] {
        self.days.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn lookup_date(&self, day: NaiveDate) -> &[DeadlineEntry] {
        self.lookup(&day_key(day))
    }

    /// Days that have at least one entry, in chronological order.
    pub fn days(&self) -> impl Iterator<Item = &str> {
        self.days.keys().map(String::as_str)
    }

    /// Days within `from..=to`, in chronological order.
    pub fn range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> impl Iterator<Item = (&str, &[DeadlineEntry])> {
        let bounds = if from <= to {
            Some((day_key(from), day_key(to)))
        } else {
            None
        };
        bounds
            .into_iter()
            .flat_map(move |(start, end)| self.days.range(start..=end))
            .map(|(key, entries)| (key.as_str(), entries.as_slice()))
    }

    /// Number of days with entries.
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Total entries across all days.
    pub fn entry_count(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }

    fn push(&mut self, day: NaiveDate, entry: DeadlineEntry) {
        self.days.entry(day_key(day)).or_default().push(entry);
    }
}

/// Rebuild the index using the system local zone.
pub fn rebuild_index(projects: &[Project], tasks: &[Task]) -> DeadlineIndex {
    rebuild_index_in(projects, tasks, &Local)
}

/// Rebuild the index with calendar days taken in `tz`.
///
/// Within a day, projects come first in input order, then tasks in input
/// order.
pub fn rebuild_index_in<Tz: TimeZone>(
    projects: &[Project],
    tasks: &[Task],
    tz: &Tz,
) -> DeadlineIndex {
    let mut index = DeadlineIndex::default();
    for project in projects {
        if let Some(day) = project.deadline.as_ref().and_then(|d| d.calendar_day_in(tz)) {
            index.push(day, DeadlineEntry::project(project));
        }
    }
    for task in tasks {
        if let Some(day) = task.deadline.as_ref().and_then(|d| d.calendar_day_in(tz)) {
            index.push(day, DeadlineEntry::task(task));
        }
    }
    index
}

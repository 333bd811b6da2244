//! Presentation order for task and project lists.
//!
//! The creation-time tier only orders two items when both carry a timestamp,
//! so it is not transitive across untimed items. Sorting therefore orders by
//! the total part of the key first, then reorders only the timestamped items
//! of each group among the slots they already occupy.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, Utc};

use crate::model::{Priority, Project, Task};

/// Open tasks first, then by priority rank, then newest created first when
/// both sides carry a creation time. Remaining ties compare equal.
pub fn compare_tasks(left: &Task, right: &Task) -> Ordering {
    task_group(left)
        .cmp(&task_group(right))
        .then_with(|| newest_first(left.created_at, right.created_at))
}

/// Sort with [`compare_tasks`]. Untimed tasks keep their position within
/// their group.
pub fn sort_tasks(tasks: &mut [Task]) {
    sort_grouped(tasks, task_group, |task| task.created_at);
}

/// Priority rank, then earliest resolvable deadline (undated last), then
/// newest created first among projects that carry a creation time.
pub fn sort_projects(projects: &mut [Project]) {
    sort_grouped(projects, project_group, |project| project.created_at);
}

fn task_group(task: &Task) -> (bool, usize) {
    (task.completed, Priority::rank(task.priority))
}

fn project_group(project: &Project) -> (usize, bool, Option<NaiveDate>) {
    let day = project.deadline.as_ref().and_then(|d| d.calendar_day());
    (Priority::rank(project.priority), day.is_none(), day)
}

fn newest_first(left: Option<DateTime<Utc>>, right: Option<DateTime<Utc>>) -> Ordering {
    match (left, right) {
        (Some(a), Some(b)) => b.cmp(&a),
        _ => Ordering::Equal,
    }
}

fn sort_grouped<T, K, G, C>(items: &mut [T], group: G, created: C)
where
    T: Clone,
    K: Ord,
    G: Fn(&T) -> K,
    C: Fn(&T) -> Option<DateTime<Utc>>,
{
    items.sort_by_key(|item| group(item));
    for chunk in items.chunk_by_mut(|a, b| group(a) == group(b)) {
        let slots: Vec<usize> = (0..chunk.len())
            .filter(|&i| created(&chunk[i]).is_some())
            .collect();
        if slots.len() < 2 {
            continue;
        }
        let mut timed: Vec<T> = slots.iter().map(|&i| chunk[i].clone()).collect();
        timed.sort_by(|a, b| newest_first(created(a), created(b)));
        for (slot, item) in slots.into_iter().zip(timed) {
            chunk[slot] = item;
        }
    }
}

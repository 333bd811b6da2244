//! Live collections and the derived dashboard state.
//!
//! A [`Subscription`] emits whole-collection replacements: never diffs.
//! [`DashboardState::apply`] folds each replacement in and recomputes the
//! deadline index and progress summary from scratch, so a consumer always
//! reads a complete result for the latest snapshots.

use std::collections::BTreeMap;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use serde::Serialize;

use crate::deadline::{rebuild_index, DeadlineIndex};
use crate::error::Result;
use crate::model::{Project, Task};
use crate::progress::{summarize, ProgressSummary};
use crate::session::Session;

const WATCH_DEBOUNCE_MS: u64 = 150;
const WATCH_IDLE_SECS: u64 = 3600;

/// A full replacement of one collection.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionEvent {
    Projects(Vec<Project>),
    Tasks(Vec<Task>),
}

/// Latest snapshots plus everything derived from them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardState {
    projects: Vec<Project>,
    tasks: Vec<Task>,
    index: DeadlineIndex,
    progress: BTreeMap<String, ProgressSummary>,
    revision: u64,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace one collection and recompute all derived views.
    pub fn apply(&mut self, event: CollectionEvent) {
        match event {
            CollectionEvent::Projects(projects) => self.projects = projects,
            CollectionEvent::Tasks(tasks) => self.tasks = tasks,
        }
        self.index = rebuild_index(&self.projects, &self.tasks);
        self.progress = summarize(&self.tasks);
        self.revision += 1;
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn index(&self) -> &DeadlineIndex {
        &self.index
    }

    pub fn progress(&self) -> &BTreeMap<String, ProgressSummary> {
        &self.progress
    }

    /// Number of events applied so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

/// Receiving end of a live collection feed. Dropping it stops the watcher
/// thread at its next delivery attempt.
pub struct Subscription {
    receiver: Receiver<Result<CollectionEvent>>,
}

impl Subscription {
    /// Wait up to `timeout` for the next event. `None` on timeout or when the
    /// feed has ended.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Result<CollectionEvent>> {
        self.receiver.recv_timeout(timeout).ok()
    }
}

impl Iterator for Subscription {
    type Item = Result<CollectionEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        self.receiver.recv().ok()
    }
}

/// Start a feed for `session`: the current snapshots first, then a fresh
/// snapshot of each collection whose content changed on disk.
///
/// The watcher is registered before the snapshots are read, so a write
/// landing in between is reported rather than lost.
pub fn subscribe(session: Session) -> Result<Subscription> {
    let (event_tx, event_rx) = mpsc::channel();
    let mut watcher: RecommendedWatcher = notify::recommended_watcher(move |res| {
        let _ = event_tx.send(res);
    })?;
    let dir = session.store().dir();
    watcher.watch(&dir, RecursiveMode::NonRecursive)?;
    tracing::debug!(dir = %dir.display(), "watching store");

    let (tx, rx) = mpsc::channel();
    let projects = session.projects()?;
    let tasks = session.tasks(None)?;
    let _ = tx.send(Ok(CollectionEvent::Projects(projects.clone())));
    let _ = tx.send(Ok(CollectionEvent::Tasks(tasks.clone())));

    thread::spawn(move || {
        let _watcher = watcher;
        let mut last = (projects, tasks);
        let debounce = Duration::from_millis(WATCH_DEBOUNCE_MS);
        let mut pending: Option<Instant> = None;

        loop {
            let timeout = pending
                .map(|deadline| deadline.saturating_duration_since(Instant::now()))
                .unwrap_or(Duration::from_secs(WATCH_IDLE_SECS));
            match event_rx.recv_timeout(timeout) {
                Ok(Ok(_)) => {
                    pending = Some(Instant::now() + debounce);
                }
                Ok(Err(err)) => {
                    tracing::warn!(error = %err, "store watch error");
                    if tx.send(Err(err.into())).is_err() {
                        break;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    if pending.take().is_some() && !reload(&session, &mut last, &tx) {
                        break;
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        tracing::debug!("store watch ended");
    });

    Ok(Subscription { receiver: rx })
}

/// Emit changed collections. Returns `false` once the receiver is gone.
fn reload(
    session: &Session,
    last: &mut (Vec<Project>, Vec<Task>),
    tx: &Sender<Result<CollectionEvent>>,
) -> bool {
    match session.projects() {
        Ok(projects) if projects != last.0 => {
            last.0 = projects.clone();
            if tx.send(Ok(CollectionEvent::Projects(projects))).is_err() {
                return false;
            }
        }
        Ok(_) => {}
        Err(err) => {
            tracing::warn!(error = %err, "reloading projects failed");
            if tx.send(Err(err)).is_err() {
                return false;
            }
        }
    }
    match session.tasks(None) {
        Ok(tasks) if tasks != last.1 => {
            last.1 = tasks.clone();
            tx.send(Ok(CollectionEvent::Tasks(tasks))).is_ok()
        }
        Ok(_) => true,
        Err(err) => {
            tracing::warn!(error = %err, "reloading tasks failed");
            tx.send(Err(err)).is_ok()
        }
    }
}

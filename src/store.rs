//! Local document store for projects and tasks.
//!
//! # Directory Structure
//!
//! ```text
//! .projectpro/                  # Store root
//!   projects.json               # Project collection
//!   tasks.json                  # Task collection
//!   store.lock                  # Writer lock
//! ```
//!
//! Each collection file is a snapshot document holding every owner's items.
//! Queries are always scoped to one owner. Writers hold the store lock for
//! the whole read-modify-write cycle and replace files atomically.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use ulid::Ulid;

use crate::error::{Error, Result};
use crate::lock::{write_atomic, FileLock, DEFAULT_LOCK_TIMEOUT_MS};
use crate::model::{Project, Task};
use crate::validate::{ProjectDraft, ProjectPatch, TaskDraft, TaskPatch};

/// Name of the store directory under the root
pub const STORE_DIR: &str = ".projectpro";

const PROJECTS_FILE: &str = "projects.json";
const TASKS_FILE: &str = "tasks.json";
const LOCK_FILE: &str = "store.lock";
const SCHEMA_VERSION: &str = "projectpro.documents.v1";
const PROJECT_ID_PREFIX: &str = "prj";
const TASK_ID_PREFIX: &str = "tsk";

/// On-disk snapshot of one collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection<T> {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub items: Vec<T>,
}

impl<T> Collection<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            generated_at: Utc::now(),
            items,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectDeleteReport {
    pub project_id: String,
    pub tasks_removed: usize,
}

#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    /// Handle for the store under `root`; does not touch the filesystem.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Open an initialized store.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let store = Self::new(root);
        if !store.is_initialized() {
            return Err(Error::NotInitialized(store.dir()));
        }
        Ok(store)
    }

    /// Create the store directory and empty collections when missing.
    pub fn init(&self) -> Result<bool> {
        let _lock = self.lock()?;
        let mut created = false;
        if !self.projects_path().exists() {
            self.write_raw(&self.projects_path(), Vec::new())?;
            created = true;
        }
        if !self.tasks_path().exists() {
            self.write_raw(&self.tasks_path(), Vec::new())?;
            created = true;
        }
        tracing::info!(dir = %self.dir().display(), created, "store initialized");
        Ok(created)
    }

    pub fn is_initialized(&self) -> bool {
        self.dir().is_dir()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dir(&self) -> PathBuf {
        self.root.join(STORE_DIR)
    }

    pub fn projects_path(&self) -> PathBuf {
        self.dir().join(PROJECTS_FILE)
    }

    pub fn tasks_path(&self) -> PathBuf {
        self.dir().join(TASKS_FILE)
    }

    pub fn lock_path(&self) -> PathBuf {
        self.dir().join(LOCK_FILE)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Every owner's projects, in stored order.
    pub fn load_projects(&self) -> Result<Vec<Project>> {
        Ok(self.load::<Project>(&self.projects_path())?.into_items())
    }

    /// Every owner's tasks, in stored order.
    pub fn load_tasks(&self) -> Result<Vec<Task>> {
        Ok(self.load::<Task>(&self.tasks_path())?.into_items())
    }

    pub fn list_projects(&self, owner: &str) -> Result<Vec<Project>> {
        let mut projects = self.load_projects()?;
        projects.retain(|project| project.owner_id == owner);
        Ok(projects)
    }

    /// Owner's tasks, optionally limited to one project.
    pub fn list_tasks(&self, owner: &str, project_id: Option<&str>) -> Result<Vec<Task>> {
        let mut tasks = self.load_tasks()?;
        tasks.retain(|task| {
            task.owner_id == owner && project_id.map_or(true, |id| task.project_id == id)
        });
        Ok(tasks)
    }

    /// Look up a project by id or unique id prefix.
    pub fn get_project(&self, owner: &str, id: &str) -> Result<Project> {
        let projects = self.load::<Project>(&self.projects_path())?;
        let slot = projects
            .find(owner, id)?
            .ok_or_else(|| Error::ProjectNotFound(id.to_string()))?;
        Ok(projects.take(slot))
    }

    /// Look up a task by id or unique id prefix.
    pub fn get_task(&self, owner: &str, id: &str) -> Result<Task> {
        let tasks = self.load::<Task>(&self.tasks_path())?;
        let slot = tasks
            .find(owner, id)?
            .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
        Ok(tasks.take(slot))
    }

    // =========================================================================
    // Project mutations
    // =========================================================================

    pub fn create_project(&self, owner: &str, draft: ProjectDraft) -> Result<Project> {
        let draft = draft.validate()?;
        let _lock = self.lock()?;
        let mut projects = self.load::<Project>(&self.projects_path())?;
        let now = Utc::now();
        let project = Project {
            id: new_id(PROJECT_ID_PREFIX),
            title: draft.title,
            description: draft.description,
            deadline: draft.deadline,
            priority: Some(draft.priority),
            image: draft.image,
            owner_id: owner.to_string(),
            created_at: Some(now),
            updated_at: Some(now),
        };
        projects.push(project.clone())?;
        self.write_documents(&self.projects_path(), projects)?;
        tracing::info!(id = %project.id, owner, "project created");
        Ok(project)
    }

    pub fn update_project(&self, owner: &str, id: &str, patch: ProjectPatch) -> Result<Project> {
        let patch = patch.validate()?;
        let _lock = self.lock()?;
        let mut projects = self.load::<Project>(&self.projects_path())?;
        let slot = projects
            .find(owner, id)?
            .ok_or_else(|| Error::ProjectNotFound(id.to_string()))?;

        let mut project = projects.get(slot).clone();
        if let Some(title) = patch.title {
            project.title = title;
        }
        if let Some(description) = patch.description {
            project.description = description;
        }
        if let Some(deadline) = patch.deadline {
            project.deadline = deadline;
        }
        if let Some(priority) = patch.priority {
            project.priority = Some(priority);
        }
        if let Some(image) = patch.image {
            project.image = image;
        }
        project.updated_at = Some(Utc::now());

        projects.replace(slot, project.clone())?;
        self.write_documents(&self.projects_path(), projects)?;
        tracing::info!(id = %project.id, "project updated");
        Ok(project)
    }

    /// Delete a project and every task that belongs to it.
    ///
    /// The project file is written first: a failure in between leaves
    /// orphaned tasks rather than losing them.
    pub fn delete_project(&self, owner: &str, id: &str) -> Result<ProjectDeleteReport> {
        let _lock = self.lock()?;
        let mut projects = self.load::<Project>(&self.projects_path())?;
        let slot = projects
            .find(owner, id)?
            .ok_or_else(|| Error::ProjectNotFound(id.to_string()))?;
        let removed = projects.get(slot).clone();
        projects.retain(|project| project.id != removed.id || project.owner_id != owner);

        let mut tasks = self.load::<Task>(&self.tasks_path())?;
        let tasks_removed =
            tasks.retain(|task| task.project_id != removed.id || task.owner_id != owner);

        self.write_documents(&self.projects_path(), projects)?;
        self.write_documents(&self.tasks_path(), tasks)?;
        tracing::info!(id = %removed.id, tasks_removed, "project deleted");
        Ok(ProjectDeleteReport {
            project_id: removed.id,
            tasks_removed,
        })
    }

    // =========================================================================
    // Task mutations
    // =========================================================================

    /// Create a task under an existing project owned by `owner`.
    pub fn create_task(&self, owner: &str, draft: TaskDraft) -> Result<Task> {
        let draft = draft.validate()?;
        let _lock = self.lock()?;
        let project_id = self.owned_project_id(owner, &draft.project_id)?;
        let mut tasks = self.load::<Task>(&self.tasks_path())?;
        let now = Utc::now();
        let task = Task {
            id: new_id(TASK_ID_PREFIX),
            title: draft.title,
            description: draft.description,
            deadline: draft.deadline,
            priority: Some(draft.priority),
            completed: false,
            project_id,
            owner_id: owner.to_string(),
            created_at: Some(now),
            updated_at: Some(now),
        };
        tasks.push(task.clone())?;
        self.write_documents(&self.tasks_path(), tasks)?;
        tracing::info!(id = %task.id, project = %task.project_id, "task created");
        Ok(task)
    }

    pub fn update_task(&self, owner: &str, id: &str, patch: TaskPatch) -> Result<Task> {
        let patch = patch.validate()?;
        let _lock = self.lock()?;
        let project_id = match patch.project_id.as_deref() {
            Some(project) => Some(self.owned_project_id(owner, project)?),
            None => None,
        };
        self.modify_task(owner, id, |task| {
            if let Some(title) = patch.title {
                task.title = title;
            }
            if let Some(description) = patch.description {
                task.description = description;
            }
            if let Some(deadline) = patch.deadline {
                task.deadline = deadline;
            }
            if let Some(priority) = patch.priority {
                task.priority = Some(priority);
            }
            if let Some(project_id) = project_id {
                task.project_id = project_id;
            }
            if let Some(completed) = patch.completed {
                task.completed = completed;
            }
        })
    }

    pub fn set_task_completed(&self, owner: &str, id: &str, completed: bool) -> Result<Task> {
        let _lock = self.lock()?;
        self.modify_task(owner, id, |task| task.completed = completed)
    }

    /// Flip the completion flag.
    pub fn toggle_task(&self, owner: &str, id: &str) -> Result<Task> {
        let _lock = self.lock()?;
        self.modify_task(owner, id, |task| task.completed = !task.completed)
    }

    pub fn delete_task(&self, owner: &str, id: &str) -> Result<Task> {
        let _lock = self.lock()?;
        let mut tasks = self.load::<Task>(&self.tasks_path())?;
        let slot = tasks
            .find(owner, id)?
            .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
        let removed = tasks.get(slot).clone();
        tasks.retain(|task| task.id != removed.id || task.owner_id != owner);
        self.write_documents(&self.tasks_path(), tasks)?;
        tracing::info!(id = %removed.id, "task deleted");
        Ok(removed)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn lock(&self) -> Result<FileLock> {
        FileLock::acquire(self.lock_path(), DEFAULT_LOCK_TIMEOUT_MS)
    }

    /// Apply `change` to one task and bump `updated_at`. Caller holds the lock.
    fn modify_task(&self, owner: &str, id: &str, change: impl FnOnce(&mut Task)) -> Result<Task> {
        let mut tasks = self.load::<Task>(&self.tasks_path())?;
        let slot = tasks
            .find(owner, id)?
            .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;

        let mut task = tasks.get(slot).clone();
        change(&mut task);
        task.updated_at = Some(Utc::now());

        tasks.replace(slot, task.clone())?;
        self.write_documents(&self.tasks_path(), tasks)?;
        tracing::info!(id = %task.id, completed = task.completed, "task updated");
        Ok(task)
    }

    fn owned_project_id(&self, owner: &str, id: &str) -> Result<String> {
        let projects = self.load::<Project>(&self.projects_path())?;
        let slot = projects
            .find(owner, id)?
            .ok_or_else(|| Error::ProjectNotFound(id.to_string()))?;
        Ok(projects.take(slot).id)
    }

    /// Read a collection file. Missing or blank files read as empty; items
    /// that do not parse as `T` are kept raw but never surfaced.
    fn load<T: Document>(&self, path: &Path) -> Result<Documents<T>> {
        if !path.exists() {
            return Ok(Documents::default());
        }
        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Documents::default());
        }
        let collection: Collection<Value> = serde_json::from_str(&content)?;
        let mut parsed = Vec::with_capacity(collection.items.len());
        for (position, value) in collection.items.iter().enumerate() {
            match serde_json::from_value::<T>(value.clone()) {
                Ok(item) => parsed.push((position, item)),
                Err(err) => {
                    tracing::warn!(
                        path = %path.display(),
                        position,
                        error = %err,
                        "skipping malformed document"
                    );
                }
            }
        }
        Ok(Documents {
            raw: collection.items,
            parsed,
        })
    }

    fn write_documents<T>(&self, path: &Path, documents: Documents<T>) -> Result<()> {
        self.write_raw(path, documents.raw)
    }

    fn write_raw(&self, path: &Path, items: Vec<Value>) -> Result<()> {
        let collection = Collection::new(items);
        let mut data = serde_json::to_vec_pretty(&collection)?;
        data.push(b'\n');
        write_atomic(path, &data)
    }
}

/// A stored document kind.
trait Document: Clone + Serialize + DeserializeOwned {
    /// Other names a field may carry in imported documents.
    const ALIASES: &'static [(&'static str, &'static [&'static str])];

    fn id(&self) -> &str;
    fn owner_id(&self) -> &str;

    fn aliases(field: &str) -> &'static [&'static str] {
        Self::ALIASES
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, aliases)| *aliases)
            .unwrap_or(&[])
    }
}

impl Document for Project {
    const ALIASES: &'static [(&'static str, &'static [&'static str])] = &[
        ("image", &["imageUrl"]),
        ("owner_id", &["ownerId", "userId"]),
        ("created_at", &["createdAt"]),
        ("updated_at", &["updatedAt"]),
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> &str {
        &self.owner_id
    }
}

impl Document for Task {
    const ALIASES: &'static [(&'static str, &'static [&'static str])] = &[
        ("project_id", &["projectId"]),
        ("owner_id", &["ownerId", "userId"]),
        ("created_at", &["createdAt"]),
        ("updated_at", &["updatedAt"]),
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> &str {
        &self.owner_id
    }
}

/// Raw items of one collection file plus the ones that parsed as `T`.
///
/// Writes go back through `raw`, so unparsed items and fields the model
/// does not know survive every mutation.
struct Documents<T> {
    raw: Vec<Value>,
    /// `(index into raw, item)`, ascending by index.
    parsed: Vec<(usize, T)>,
}

impl<T> Default for Documents<T> {
    fn default() -> Self {
        Self {
            raw: Vec::new(),
            parsed: Vec::new(),
        }
    }
}

impl<T: Document> Documents<T> {
    fn into_items(self) -> Vec<T> {
        self.parsed.into_iter().map(|(_, item)| item).collect()
    }

    /// Slot of the owner's item matching `input`.
    fn find(&self, owner: &str, input: &str) -> Result<Option<usize>> {
        resolve(
            self.parsed
                .iter()
                .enumerate()
                .filter(|(_, (_, item))| item.owner_id() == owner)
                .map(|(slot, (_, item))| (slot, item.id())),
            input,
        )
    }

    fn get(&self, slot: usize) -> &T {
        &self.parsed[slot].1
    }

    fn take(mut self, slot: usize) -> T {
        self.parsed.swap_remove(slot).1
    }

    fn push(&mut self, item: T) -> Result<()> {
        self.raw.push(serde_json::to_value(&item)?);
        self.parsed.push((self.raw.len() - 1, item));
        Ok(())
    }

    /// Store `updated` in `slot`, rewriting only the fields that changed.
    fn replace(&mut self, slot: usize, updated: T) -> Result<()> {
        let (index, current) = &self.parsed[slot];
        merge_changes(&mut self.raw[*index], current, &updated)?;
        self.parsed[slot].1 = updated;
        Ok(())
    }

    /// Drop parsed items failing `keep`; unparsed items always stay.
    /// Returns the number removed.
    fn retain(&mut self, keep: impl Fn(&T) -> bool) -> usize {
        let before = self.raw.len();
        let mut parsed = std::mem::take(&mut self.parsed).into_iter().peekable();
        let mut raw = Vec::with_capacity(before);
        for (index, value) in std::mem::take(&mut self.raw).into_iter().enumerate() {
            match parsed.next_if(|(at, _)| *at == index) {
                Some((_, item)) if !keep(&item) => {}
                Some((_, item)) => {
                    self.parsed.push((raw.len(), item));
                    raw.push(value);
                }
                None => raw.push(value),
            }
        }
        self.raw = raw;
        before - self.raw.len()
    }
}

/// Apply the field-level difference between `before` and `after` to `raw`.
/// Untouched fields, unknown fields and aliases of untouched fields keep
/// their stored form.
fn merge_changes<T: Document>(raw: &mut Value, before: &T, after: &T) -> Result<()> {
    let after = serde_json::to_value(after)?;
    if !raw.is_object() {
        *raw = after;
        return Ok(());
    }
    let before = serde_json::to_value(before)?;
    let empty = Map::new();
    let before = before.as_object().unwrap_or(&empty);
    let after = after.as_object().unwrap_or(&empty);
    let Some(target) = raw.as_object_mut() else {
        return Ok(());
    };

    let mut fields: Vec<&String> = before.keys().chain(after.keys()).collect();
    fields.sort();
    fields.dedup();
    for field in fields {
        if before.get(field) == after.get(field) {
            continue;
        }
        for alias in T::aliases(field) {
            target.remove(*alias);
        }
        match after.get(field) {
            Some(value) => {
                target.insert(field.clone(), value.clone());
            }
            None => {
                target.remove(field);
            }
        }
    }
    Ok(())
}

fn new_id(prefix: &str) -> String {
    format!("{prefix}_{}", Ulid::new().to_string().to_lowercase())
}

/// Exact id match wins; otherwise a unique prefix of the id (with or without
/// its kind prefix) matches. Returns the paired index.
fn resolve<'a>(
    candidates: impl IntoIterator<Item = (usize, &'a str)>,
    input: &str,
) -> Result<Option<usize>> {
    let needle = input.trim().to_ascii_lowercase();
    if needle.is_empty() {
        return Ok(None);
    }
    let candidates: Vec<(usize, &str)> = candidates.into_iter().collect();
    if let Some((index, _)) = candidates
        .iter()
        .find(|(_, id)| id.eq_ignore_ascii_case(&needle))
    {
        return Ok(Some(*index));
    }
    let matches: Vec<(usize, &str)> = candidates
        .into_iter()
        .filter(|(_, id)| {
            let full = id.to_ascii_lowercase();
            let bare = full.split_once('_').map(|(_, rest)| rest).unwrap_or(&full);
            full.starts_with(&needle) || bare.starts_with(&needle)
        })
        .collect();
    match matches.as_slice() {
        [] => Ok(None),
        [(index, _)] => Ok(Some(*index)),
        _ => {
            let mut ids: Vec<String> = matches.iter().map(|(_, id)| id.to_string()).collect();
            ids.sort();
            Err(Error::AmbiguousId {
                input: input.to_string(),
                matches: ids,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::DateValue;
    use crate::model::Priority;

    fn setup_store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Store::new(dir.path());
        store.init().expect("init");
        (dir, store)
    }

    fn project_draft(title: &str) -> ProjectDraft {
        ProjectDraft {
            title: title.to_string(),
            description: None,
            deadline: Some(DateValue::Text("2025-10-15".to_string())),
            priority: Priority::Medium,
            image: None,
        }
    }

    fn task_draft(project_id: &str, title: &str) -> TaskDraft {
        TaskDraft {
            project_id: project_id.to_string(),
            title: title.to_string(),
            description: None,
            deadline: None,
            priority: Priority::Low,
        }
    }

    #[test]
    fn open_requires_init() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = Store::open(dir.path()).expect_err("not initialized");
        assert!(matches!(err, Error::NotInitialized(_)));
        Store::new(dir.path()).init().expect("init");
        Store::open(dir.path()).expect("open");
    }

    #[test]
    fn create_and_list_are_owner_scoped() {
        let (_dir, store) = setup_store();
        let mine = store.create_project("alice", project_draft("Launch")).expect("create");
        store.create_project("bob", project_draft("Other")).expect("create");

        let listed = store.list_projects("alice").expect("list");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, mine.id);
        assert!(mine.id.starts_with("prj_"));

        let err = store.get_project("bob", &mine.id).expect_err("other owner");
        assert!(matches!(err, Error::ProjectNotFound(_)));
    }

    #[test]
    fn task_requires_existing_project() {
        let (_dir, store) = setup_store();
        let err = store
            .create_task("alice", task_draft("prj_missing", "Write"))
            .expect_err("missing project");
        assert!(matches!(err, Error::ProjectNotFound(_)));
    }

    #[test]
    fn toggle_flips_completion() {
        let (_dir, store) = setup_store();
        let project = store.create_project("alice", project_draft("Launch")).expect("project");
        let task = store
            .create_task("alice", task_draft(&project.id, "Write"))
            .expect("task");
        assert!(!task.completed);

        let toggled = store.toggle_task("alice", &task.id).expect("toggle");
        assert!(toggled.completed);
        let toggled = store.toggle_task("alice", &task.id).expect("toggle");
        assert!(!toggled.completed);

        for _ in 0..2 {
            let done = store.set_task_completed("alice", &task.id, true).expect("set");
            assert!(done.completed);
        }
    }

    #[test]
    fn delete_project_cascades_to_tasks() {
        let (_dir, store) = setup_store();
        let keep = store.create_project("alice", project_draft("Keep")).expect("project");
        let doomed = store.create_project("alice", project_draft("Drop")).expect("project");
        store.create_task("alice", task_draft(&keep.id, "a")).expect("task");
        store.create_task("alice", task_draft(&doomed.id, "b")).expect("task");
        store.create_task("alice", task_draft(&doomed.id, "c")).expect("task");

        let report = store.delete_project("alice", &doomed.id).expect("delete");
        assert_eq!(report.tasks_removed, 2);
        let remaining = store.list_tasks("alice", None).expect("tasks");
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].project_id, keep.id);
    }

    #[test]
    fn update_can_clear_deadline() {
        let (_dir, store) = setup_store();
        let project = store.create_project("alice", project_draft("Launch")).expect("project");
        assert!(project.deadline.is_some());

        let updated = store
            .update_project(
                "alice",
                &project.id,
                ProjectPatch {
                    deadline: Some(None),
                    priority: Some(Priority::Urgent),
                    ..ProjectPatch::default()
                },
            )
            .expect("update");
        assert_eq!(updated.deadline, None);
        assert_eq!(updated.priority, Some(Priority::Urgent));
        assert_eq!(store.get_project("alice", &project.id).expect("get"), updated);
    }

    #[test]
    fn ids_resolve_by_unique_prefix() {
        let (_dir, store) = setup_store();
        let project = store.create_project("alice", project_draft("Launch")).expect("project");
        let bare = project.id.trim_start_matches("prj_");
        let found = store.get_project("alice", &bare[..12]).expect("prefix");
        assert_eq!(found.id, project.id);
        let upper = project.id.to_uppercase();
        assert_eq!(store.get_project("alice", &upper).expect("exact").id, project.id);
    }

    #[test]
    fn ambiguous_prefix_is_reported() {
        let ids = ["prj_abc1", "prj_abc2"];
        let candidates = || ids.iter().copied().enumerate();
        let err = resolve(candidates(), "abc").expect_err("ambiguous");
        match err {
            Error::AmbiguousId { matches, .. } => assert_eq!(matches.len(), 2),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(resolve(candidates(), "abc2").expect("unique"), Some(1));
        assert_eq!(resolve(candidates(), "PRJ_ABC1").expect("exact"), Some(0));
        assert_eq!(resolve(candidates(), "zzz").expect("none"), None);
    }

    #[test]
    fn malformed_documents_are_skipped() {
        let (_dir, store) = setup_store();
        let content = serde_json::json!({
            "schema_version": SCHEMA_VERSION,
            "generated_at": "2025-10-01T00:00:00Z",
            "items": [
                {
                    "id": "tsk_1",
                    "title": "ok",
                    "project_id": "p",
                    "owner_id": "alice",
                    "deadline": "not-a-date"
                },
                {"id": "tsk_2"}
            ]
        });
        std::fs::write(store.tasks_path(), content.to_string()).expect("write");
        let tasks = store.list_tasks("alice", None).expect("tasks");
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, "tsk_1");
    }

    fn write_items(path: &Path, items: Value) {
        let content = serde_json::json!({
            "schema_version": SCHEMA_VERSION,
            "generated_at": "2025-10-01T00:00:00Z",
            "items": items,
        });
        std::fs::write(path, content.to_string()).expect("write");
    }

    fn read_items(path: &Path) -> Vec<Value> {
        let content = std::fs::read_to_string(path).expect("read");
        let collection: Collection<Value> = serde_json::from_str(&content).expect("collection");
        collection.items
    }

    fn item<'a>(items: &'a [Value], id: &str) -> &'a Value {
        items
            .iter()
            .find(|item| item["id"] == id)
            .unwrap_or_else(|| panic!("{id} missing from {items:?}"))
    }

    #[test]
    fn writes_keep_unparsed_items_and_unknown_fields() {
        let (_dir, store) = setup_store();
        write_items(
            &store.tasks_path(),
            serde_json::json!([
                {"id": "tsk_a", "title": "mine", "projectId": "p", "ownerId": "alice"},
                {"id": "tsk_b", "title": "null flag", "project_id": "p", "owner_id": "bob",
                 "completed": null},
                {"id": "tsk_c", "title": "extra", "project_id": "p", "owner_id": "bob",
                 "deadline": 1760486400, "notes": "keep me"}
            ]),
        );

        let toggled = store.toggle_task("alice", "tsk_a").expect("toggle");
        assert!(toggled.completed);

        let items = read_items(&store.tasks_path());
        assert_eq!(items.len(), 3);
        let mine = item(&items, "tsk_a");
        assert_eq!(mine["completed"], true);
        assert_eq!(mine["ownerId"], "alice");
        assert_eq!(mine["projectId"], "p");
        assert!(mine.get("owner_id").is_none());
        assert_eq!(item(&items, "tsk_b")["completed"], Value::Null);
        let extra = item(&items, "tsk_c");
        assert_eq!(extra["deadline"], 1760486400);
        assert_eq!(extra["notes"], "keep me");
    }

    #[test]
    fn cleared_fields_drop_from_stored_document() {
        let (_dir, store) = setup_store();
        write_items(
            &store.projects_path(),
            serde_json::json!([
                {"id": "prj_a", "title": "Launch", "ownerId": "alice",
                 "deadline": {"_seconds": 1760486400, "_nanoseconds": 0},
                 "imageUrl": "https://example.com/a.png", "color": "teal"}
            ]),
        );

        store
            .update_project(
                "alice",
                "prj_a",
                ProjectPatch {
                    deadline: Some(None),
                    image: Some(Some("https://example.com/b.png".to_string())),
                    ..ProjectPatch::default()
                },
            )
            .expect("update");

        let items = read_items(&store.projects_path());
        let project = item(&items, "prj_a");
        assert!(project.get("deadline").is_none());
        assert!(project.get("imageUrl").is_none());
        assert_eq!(project["image"], "https://example.com/b.png");
        assert_eq!(project["color"], "teal");
        assert_eq!(project["ownerId"], "alice");
    }

    #[test]
    fn deletes_keep_documents_that_do_not_parse() {
        let (_dir, store) = setup_store();
        let project = store.create_project("alice", project_draft("Launch")).expect("project");
        store.create_task("alice", task_draft(&project.id, "a")).expect("task");
        let mut items = read_items(&store.tasks_path());
        items.push(serde_json::json!({"id": "tsk_broken", "project_id": project.id}));
        write_items(&store.tasks_path(), Value::Array(items));

        let report = store.delete_project("alice", &project.id).expect("delete");
        assert_eq!(report.tasks_removed, 1);
        let items = read_items(&store.tasks_path());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["id"], "tsk_broken");
        assert!(read_items(&store.projects_path()).is_empty());
    }
}

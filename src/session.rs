//! The current-user handle passed to everything that talks to the store.

use std::path::Path;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{Project, Task};
use crate::store::Store;
use crate::watch::{self, Subscription};

#[derive(Debug, Clone)]
pub struct Session {
    store: Store,
    user: String,
}

impl Session {
    pub fn new(store: Store, user: impl Into<String>) -> Result<Self> {
        let user = user.into().trim().to_string();
        if user.is_empty() {
            return Err(Error::InvalidArgument("user cannot be empty".to_string()));
        }
        Ok(Self { store, user })
    }

    /// Open the store under `root` as `user`, or as the configured user.
    pub fn open(root: &Path, user: Option<String>, config: &Config) -> Result<Self> {
        let store = Store::open(root)?;
        let user = user.unwrap_or_else(|| config.session.user.clone());
        tracing::debug!(root = %root.display(), user = %user, "session opened");
        Self::new(store, user)
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn projects(&self) -> Result<Vec<Project>> {
        self.store.list_projects(&self.user)
    }

    pub fn tasks(&self, project_id: Option<&str>) -> Result<Vec<Task>> {
        self.store.list_tasks(&self.user, project_id)
    }

    /// Live feed of this user's collections.
    pub fn subscribe(&self) -> Result<Subscription> {
        watch::subscribe(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_user_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = Session::new(Store::new(dir.path()), "  ").expect_err("blank user");
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn open_falls_back_to_configured_user() {
        let dir = tempfile::tempdir().expect("tempdir");
        Store::new(dir.path()).init().expect("init");
        let mut config = Config::default();
        config.session.user = "carol".to_string();

        let session = Session::open(dir.path(), None, &config).expect("session");
        assert_eq!(session.user(), "carol");
        let session =
            Session::open(dir.path(), Some("dave".to_string()), &config).expect("session");
        assert_eq!(session.user(), "dave");
    }
}

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use projectpro::store::Store;
use serde_json::Value;
use tempfile::TempDir;

pub struct TestRoot {
    dir: TempDir,
}

impl TestRoot {
    /// Empty directory with no store.
    pub fn empty() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        Self { dir }
    }

    /// Directory with an initialized store.
    pub fn init() -> Self {
        let root = Self::empty();
        root.store().init().expect("init store");
        root
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn store(&self) -> Store {
        Store::new(self.dir.path())
    }

    pub fn write_file(&self, rel_path: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(&path, contents).expect("write file");
        path
    }

    pub fn write_config(&self, contents: &str) -> PathBuf {
        self.write_file(projectpro::config::CONFIG_FILE, contents)
    }

    /// Command bound to this root as `user`.
    pub fn cmd(&self, user: &str) -> Command {
        let mut cmd = Command::cargo_bin("projectpro").expect("binary");
        cmd.env("PROJECTPRO_ROOT", self.dir.path())
            .env("PROJECTPRO_USER", user)
            .env_remove("RUST_LOG");
        cmd
    }

    /// Run a `--json` command and return its `data` payload.
    pub fn json(&self, user: &str, args: &[&str]) -> Value {
        let output = self
            .cmd(user)
            .args(args)
            .arg("--json")
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        let value: Value = serde_json::from_slice(&output).expect("json envelope");
        assert_eq!(value["status"], "success");
        value["data"].clone()
    }

    pub fn new_project(&self, user: &str, title: &str, extra: &[&str]) -> String {
        let mut args = vec!["project", "new", title];
        args.extend_from_slice(extra);
        let data = self.json(user, &args);
        data["id"].as_str().expect("project id").to_string()
    }

    pub fn new_task(&self, user: &str, project: &str, title: &str, extra: &[&str]) -> String {
        let mut args = vec!["task", "new", project, title];
        args.extend_from_slice(extra);
        let data = self.json(user, &args);
        data["id"].as_str().expect("task id").to_string()
    }
}

mod support;

use predicates::str::contains;

use support::TestRoot;

#[test]
fn project_and_task_lifecycle() {
    let root = TestRoot::init();
    let project = root.new_project(
        "alice",
        "Launch",
        &["--deadline", "2025-10-15", "--priority", "urgent"],
    );
    assert!(project.starts_with("prj_"));

    let first = root.new_task("alice", &project, "Draft copy", &["--priority", "low"]);
    let second = root.new_task("alice", &project, "Book venue", &["--deadline", "2025-10-14"]);

    let toggled = root.json("alice", &["task", "toggle", &first]);
    assert_eq!(toggled["completed"], true);

    let list = root.json("alice", &["task", "list", "--project", &project]);
    assert_eq!(list["total"], 2);
    assert_eq!(list["open"], 1);
    // Open tasks come before completed ones.
    assert_eq!(list["tasks"][0]["id"], second.as_str());
    assert_eq!(list["tasks"][1]["id"], first.as_str());

    let shown = root.json("alice", &["project", "show", &project]);
    assert_eq!(shown["progress"]["percentage"], 50);
    assert_eq!(shown["tasks"].as_array().map(Vec::len), Some(2));

    let removed = root.json("alice", &["project", "rm", &project]);
    assert_eq!(removed["tasks_removed"], 2);
    let list = root.json("alice", &["task", "list"]);
    assert_eq!(list["total"], 0);
}

#[test]
fn new_tasks_use_configured_default_priority() {
    let root = TestRoot::init();
    root.write_config("[tasks]\ndefault_priority = \"urgent\"\n");
    let project = root.new_project("alice", "Config", &[]);
    let task = root.json("alice", &["task", "new", &project, "Inherit"]);
    assert_eq!(task["priority"], "urgent");
}

#[test]
fn edit_sets_and_clears_fields() {
    let root = TestRoot::init();
    let project = root.new_project(
        "alice",
        "Site",
        &["--description", "old", "--deadline", "2025-11-01"],
    );

    let edited = root.json(
        "alice",
        &["project", "edit", &project, "--title", "Website", "--clear-description"],
    );
    assert_eq!(edited["title"], "Website");
    assert!(edited.get("description").map_or(true, |v| v.is_null()));
    assert_eq!(edited["deadline"], "2025-11-01");

    let edited = root.json("alice", &["project", "edit", &project, "--clear-deadline"]);
    assert!(edited.get("deadline").map_or(true, |v| v.is_null()));
}

#[test]
fn tasks_move_between_owned_projects_only() {
    let root = TestRoot::init();
    let home = root.new_project("alice", "Home", &[]);
    let work = root.new_project("alice", "Work", &[]);
    let foreign = root.new_project("bob", "Bob's", &[]);
    let task = root.new_task("alice", &home, "Paint", &[]);

    let moved = root.json("alice", &["task", "edit", &task, "--project", &work]);
    assert_eq!(moved["project_id"], work.as_str());

    root.cmd("alice")
        .args(["task", "edit", &task, "--project", &foreign])
        .assert()
        .code(2)
        .stderr(contains("Project not found"));
}

#[test]
fn queries_are_scoped_to_the_session_user() {
    let root = TestRoot::init();
    let project = root.new_project("alice", "Private", &["--deadline", "2025-10-15"]);
    root.new_project("bob", "Other", &["--deadline", "2025-10-15"]);

    let list = root.json("bob", &["project", "list"]);
    assert_eq!(list["total"], 1);
    assert_eq!(list["projects"][0]["title"], "Other");

    let agenda = root.json("bob", &["agenda", "2025-10-15"]);
    assert_eq!(agenda["entries"].as_array().map(Vec::len), Some(1));

    root.cmd("bob")
        .args(["project", "show", &project])
        .assert()
        .code(2)
        .stderr(contains("Project not found"));
}

#[test]
fn ids_resolve_by_unique_prefix() {
    let root = TestRoot::init();
    let project = root.new_project("alice", "Prefix", &[]);
    let bare = project.trim_start_matches("prj_");
    let shown = root.json("alice", &["project", "show", &bare[..bare.len() - 4]]);
    assert_eq!(shown["id"], project.as_str());
}

#[test]
fn invalid_input_is_a_user_error() {
    let root = TestRoot::init();
    root.cmd("alice")
        .args(["project", "new", "   "])
        .assert()
        .code(2)
        .stderr(contains("title"));

    root.cmd("alice")
        .args(["project", "new", "Soon", "--deadline", "next week"])
        .assert()
        .code(2)
        .stderr(contains("deadline"));

    root.cmd("alice")
        .args(["task", "new", "prj_nothing", "Orphan"])
        .assert()
        .code(2)
        .stderr(contains("Project not found"));
}

#[test]
fn malformed_documents_are_skipped() {
    let root = TestRoot::init();
    root.write_file(
        ".projectpro/projects.json",
        r#"{
  "schema_version": "projectpro.documents.v1",
  "generated_at": "2025-10-01T00:00:00Z",
  "items": [
    {"id": "prj_a", "title": "Good", "ownerId": "alice",
     "deadline": "garbage", "priority": "urgent"},
    {"title": "No id"},
    {"id": "prj_b", "title": "Imported", "ownerId": "alice",
     "deadline": {"_seconds": 1760529600, "_nanoseconds": 0}, "priority": "whenever"}
  ]
}"#,
    );

    let list = root.json("alice", &["project", "list"]);
    assert_eq!(list["total"], 2);
    // Known priority sorts before an unrecognised one.
    assert_eq!(list["projects"][0]["id"], "prj_a");
    assert_eq!(list["projects"][1]["id"], "prj_b");
}

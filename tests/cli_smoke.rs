mod support;

use predicates::prelude::*;
use serde_json::Value;

use support::TestHome;

fn envelope(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("json envelope")
}

/// Two registered users and a `Groceries` category owned by alice holding one todo.
fn alice_and_bob() -> (TestHome, u64, u64) {
    let home = TestHome::new();
    home.add_user("alice@example.com", "Alice");
    home.add_user("bob@example.com", "Bob");
    let task = home.json_as(
        "alice@example.com",
        &["task", "new", "Buy milk", "--category", "Groceries"],
    );
    let task_id = task["id"].as_u64().expect("task id");
    let category_id = task["category_id"].as_u64().expect("category id");
    (home, task_id, category_id)
}

#[test]
fn user_add_reports_json_envelope() {
    let home = TestHome::new();
    let output = home
        .cmd()
        .args(["--json", "user", "add", "Alice@Example.com", "--name", "Alice"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json = envelope(&output);
    assert_eq!(json["schema_version"], "todoshare.v1");
    assert_eq!(json["command"], "user add");
    assert_eq!(json["status"], "success");
    assert_eq!(json["data"]["email"], "alice@example.com");

    home.cmd()
        .args(["user", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Alice <alice@example.com>"));
}

#[test]
fn duplicate_email_is_conflict() {
    let home = TestHome::new();
    home.add_user("alice@example.com", "Alice");
    home.cmd()
        .args(["user", "add", "ALICE@example.com", "--name", "Other"])
        .assert()
        .code(5);
}

#[test]
fn missing_actor_is_validation_error() {
    let home = TestHome::new();
    home.add_user("alice@example.com", "Alice");
    home.cmd()
        .args(["board"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no acting user"));
}

#[test]
fn actor_set_persists_and_env_overrides() {
    let home = TestHome::new();
    home.add_user("alice@example.com", "Alice");
    home.add_user("bob@example.com", "Bob");

    home.cmd()
        .args(["actor", "set", "alice@example.com"])
        .assert()
        .success();
    home.cmd()
        .args(["actor", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("alice@example.com"));

    home.cmd()
        .env("TODOSHARE_USER", "bob@example.com")
        .args(["actor", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bob@example.com"));
}

#[test]
fn actor_set_requires_existing_user() {
    let home = TestHome::new();
    home.cmd()
        .args(["actor", "set", "ghost@example.com"])
        .assert()
        .code(3);
}

#[test]
fn task_new_without_category_is_validation_error() {
    let home = TestHome::new();
    home.add_user("alice@example.com", "Alice");
    home.cmd()
        .args(["--user", "alice@example.com", "task", "new", "Loose end"])
        .assert()
        .code(2);
}

#[test]
fn sharing_lifecycle_through_the_cli() {
    let (home, task_id, category_id) = alice_and_bob();
    let task = task_id.to_string();
    let category = category_id.to_string();
    let bob = ["--user", "bob@example.com"];
    let alice = ["--user", "alice@example.com"];

    // Unshared todos are invisible, not forbidden.
    home.cmd().args(bob).args(["task", "show", &task]).assert().code(3);

    home.cmd()
        .args(alice)
        .args(["share", "add", &category, "bob@example.com"])
        .assert()
        .success();
    home.cmd()
        .args(bob)
        .args(["task", "show", &task])
        .assert()
        .success()
        .stdout(predicate::str::contains("Buy milk"));
    home.cmd()
        .args(bob)
        .args(["task", "edit", &task, "--done"])
        .assert()
        .code(4);

    home.cmd()
        .args(alice)
        .args(["share", "set", &category, "bob@example.com", "write"])
        .assert()
        .success();
    let edited = home.json_as("bob@example.com", &["task", "edit", &task, "--done"]);
    assert_eq!(edited["completed"], true);
    let perm = home.json_as("bob@example.com", &["category", "perm", &category]);
    assert_eq!(perm["permission"], "write");

    home.cmd()
        .args(alice)
        .args(["share", "rm", &category, "bob@example.com"])
        .assert()
        .success();
    home.cmd().args(bob).args(["task", "show", &task]).assert().code(3);
    home.cmd()
        .args(alice)
        .args(["share", "rm", &category, "bob@example.com"])
        .assert()
        .code(3);
}

#[test]
fn share_conflicts_exit_with_conflict_code() {
    let (home, _task_id, category_id) = alice_and_bob();
    let category = category_id.to_string();
    let alice = ["--user", "alice@example.com"];

    home.cmd()
        .args(alice)
        .args(["share", "add", &category, "Alice@Example.com"])
        .assert()
        .code(5);

    home.cmd()
        .args(alice)
        .args(["share", "add", &category, "bob@example.com", "--permission", "write"])
        .assert()
        .success();
    home.cmd()
        .args(alice)
        .args(["share", "add", &category, "bob@example.com"])
        .assert()
        .code(5);

    let shares = home.json_as("alice@example.com", &["share", "list", &category]);
    assert_eq!(shares.as_array().map(Vec::len), Some(1));
    assert_eq!(shares[0]["permission"], "write");
}

#[test]
fn non_owner_cannot_manage_shares() {
    let (home, _task_id, category_id) = alice_and_bob();
    let category = category_id.to_string();
    home.add_user("carol@example.com", "Carol");

    home.cmd()
        .args(["--user", "alice@example.com"])
        .args(["share", "add", &category, "bob@example.com", "--permission", "write"])
        .assert()
        .success();
    home.cmd()
        .args(["--user", "bob@example.com"])
        .args(["share", "add", &category, "carol@example.com"])
        .assert()
        .code(4);
}

#[test]
fn invalid_permission_is_rejected_by_the_parser() {
    let (home, _task_id, category_id) = alice_and_bob();
    home.cmd()
        .args(["--user", "alice@example.com"])
        .args(["share", "add", &category_id.to_string(), "bob@example.com"])
        .args(["--permission", "owner"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be read or write"));
}

#[test]
fn error_envelope_carries_kind_and_code() {
    let home = TestHome::new();
    home.add_user("alice@example.com", "Alice");
    let output = home
        .cmd()
        .args(["--json", "--user", "alice@example.com", "task", "show", "999"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));

    let json = envelope(&output);
    assert_eq!(json["status"], "error");
    assert_eq!(json["command"], "task show");
    assert_eq!(json["error"]["kind"], "not_found");
    assert_eq!(json["error"]["code"], 3);
    assert_eq!(json["error"]["details"]["todo_id"], 999);
}

#[test]
fn board_groups_owned_and_shared_categories() {
    let (home, _task_id, category_id) = alice_and_bob();
    home.json_as("bob@example.com", &["category", "new", "Errands"]);
    home.cmd()
        .args(["--user", "alice@example.com"])
        .args(["share", "add", &category_id.to_string(), "bob@example.com"])
        .assert()
        .success();

    let board = home.json_as("bob@example.com", &["board"]);
    let categories = board["categories"].as_array().expect("categories");
    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0]["name"], "Errands");
    assert_eq!(categories[0]["user_permission"], "owner");
    assert_eq!(categories[0]["tasks"].as_array().map(Vec::len), Some(0));
    assert_eq!(categories[1]["name"], "Groceries");
    assert_eq!(categories[1]["user_permission"], "read");
    assert_eq!(categories[1]["owner_name"], "Alice");
    assert_eq!(categories[1]["tasks"][0]["title"], "Buy milk");
}

#[test]
fn deleting_a_category_removes_its_todos() {
    let (home, task_id, category_id) = alice_and_bob();
    let alice = ["--user", "alice@example.com"];

    home.cmd()
        .args(alice)
        .args(["category", "rm", &category_id.to_string()])
        .assert()
        .success();
    home.cmd()
        .args(alice)
        .args(["task", "show", &task_id.to_string()])
        .assert()
        .code(3);
    let list = home.json_as("alice@example.com", &["task", "list"]);
    assert_eq!(list["total"], 0);
}

#[test]
fn config_sets_the_default_page_size() {
    let home = TestHome::new();
    home.add_user("alice@example.com", "Alice");
    home.write_config("[pagination]\ndefault_page_size = 2\nmax_page_size = 3\n");
    for n in 0..5 {
        home.json_as(
            "alice@example.com",
            &["task", "new", &format!("todo {n}"), "--category", "Inbox"],
        );
    }

    let first = home.json_as("alice@example.com", &["task", "list"]);
    assert_eq!(first["page_size"], 2);
    assert_eq!(first["total"], 5);
    assert_eq!(first["total_pages"], 3);
    assert_eq!(first["tasks"][0]["title"], "todo 4");

    let clamped = home.json_as(
        "alice@example.com",
        &["task", "list", "--page", "-4", "--page-size", "50"],
    );
    assert_eq!(clamped["page"], 1);
    assert_eq!(clamped["page_size"], 3);
}

#[test]
fn invalid_config_is_validation_error() {
    let home = TestHome::new();
    home.write_config("[pagination]\ndefault_page_size = 0\n");
    home.cmd().args(["user", "list"]).assert().code(2);
}

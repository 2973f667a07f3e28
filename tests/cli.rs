//! CLI integration tests for tasklane admin commands.
//!
//! Each test uses an isolated temp directory for the database, ensuring tests
//! can run in parallel safely.

#![allow(deprecated)] // Command::cargo_bin deprecation only affects custom build dirs

use std::path::Path;

use assert_cmd::Command;
use assert_fs::TempDir;
use predicates::prelude::*;
use tasklane::auth::parse_token;
use tasklane::store::{SqliteStore, Store};

struct TestContext {
    temp_dir: TempDir,
}

impl TestContext {
    fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    fn data_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    fn data_dir_str(&self) -> String {
        self.data_dir().to_string_lossy().to_string()
    }

    fn init(&self) -> assert_cmd::assert::Assert {
        Command::cargo_bin("tasklane")
            .expect("failed to find binary")
            .args([
                "admin",
                "init",
                "--data-dir",
                &self.data_dir_str(),
                "--non-interactive",
            ])
            .assert()
    }
}

#[test]
fn test_init_creates_database_and_secrets() {
    let ctx = TestContext::new();

    ctx.init()
        .success()
        .stdout(predicate::str::contains("Admin token"));

    assert!(ctx.data_dir().join("tasklane.db").exists());

    let token = std::fs::read_to_string(ctx.data_dir().join(".admin_token"))
        .expect("admin token written");
    let (lookup, _) = parse_token(token.trim()).expect("token is well formed");

    let secret = std::fs::read_to_string(ctx.data_dir().join(".jwt_secret"))
        .expect("link share secret written");
    assert_eq!(secret.len(), 64);

    let store = SqliteStore::new(ctx.data_dir().join("tasklane.db")).expect("open store");
    let session = store.session().expect("open session");
    let stored = session
        .get_token_by_lookup(&lookup)
        .expect("query token")
        .expect("token stored");
    assert!(stored.is_admin);
}

#[cfg(unix)]
#[test]
fn test_init_restricts_secret_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let ctx = TestContext::new();
    ctx.init().success();

    for file in [".admin_token", ".jwt_secret"] {
        let mode = std::fs::metadata(ctx.data_dir().join(file))
            .expect("file exists")
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600, "{file}");
    }
}

#[test]
fn test_init_twice_fails() {
    let ctx = TestContext::new();
    ctx.init().success();

    ctx.init()
        .failure()
        .stderr(predicate::str::contains("already initialized"));
}

#[test]
fn test_serve_requires_init() {
    let ctx = TestContext::new();

    Command::cargo_bin("tasklane")
        .expect("failed to find binary")
        .args(["serve", "--data-dir", &ctx.data_dir_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("tasklane admin init"));
}

//! Download tests against local Git repositories.

use srcpin::download::Downloader;
use srcpin::model::{Locator, Package};
use srcpin::vcs::{for_directory, VcsKind};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tempfile::TempDir;

// Serialize git-process tests to avoid flaky failures under parallel execution
static GIT_LOCK: Mutex<()> = Mutex::new(());

fn lock() -> MutexGuard<'static, ()> {
    let guard = GIT_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    // Submodules are cloned from local paths
    std::env::set_var("GIT_CONFIG_COUNT", "1");
    std::env::set_var("GIT_CONFIG_KEY_0", "protocol.file.allow");
    std::env::set_var("GIT_CONFIG_VALUE_0", "always");
    guard
}

fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn init_repo(dir: &Path) {
    fs::create_dir_all(dir).unwrap();
    git(dir, &["init", "--quiet", "--initial-branch=main"]);
    git(dir, &["config", "user.name", "Test"]);
    git(dir, &["config", "user.email", "test@test.com"]);
    git(dir, &["config", "uploadpack.allowReachableSHA1InWant", "true"]);
}

/// A library repository and a project embedding it as submodule `vendor/lib`.
/// Returns the project path and its head commit.
fn project_with_submodule(parent: &Path) -> (PathBuf, String) {
    let lib = parent.join("lib");
    init_repo(&lib);
    fs::write(lib.join("lib.txt"), "library\n").unwrap();
    git(&lib, &["add", "."]);
    git(&lib, &["commit", "--quiet", "-m", "Library"]);

    let project = parent.join("project");
    init_repo(&project);
    fs::create_dir_all(project.join("docs")).unwrap();
    fs::write(project.join("docs/guide.md"), "# Guide\n").unwrap();
    fs::write(project.join("README.md"), "project\n").unwrap();
    git(
        &project,
        &["submodule", "add", "--quiet", &lib.to_string_lossy(), "vendor/lib"],
    );
    git(&project, &["add", "."]);
    git(&project, &["commit", "--quiet", "-m", "Project"]);
    let head = git(&project, &["rev-parse", "HEAD"]);

    (project, head)
}

fn package(url: &Path, revision: &str, path: &str) -> Package {
    Package::new(
        "Test::project:1.0",
        Locator::new("Git", url.to_string_lossy(), revision, path),
    )
}

#[test]
fn recursive_download_materializes_submodules() {
    let _lock = lock();
    let temp = TempDir::new().unwrap();
    let (project, head) = project_with_submodule(temp.path());
    let target = temp.path().join("checkout");

    let tree = Downloader::new()
        .with_timeout(Duration::from_secs(120))
        .download(&package(&project, &head, ""), &target, false, true)
        .unwrap();

    assert!(tree.is_valid());
    assert_eq!(tree.revision().unwrap(), head);
    assert_eq!(
        fs::read_to_string(target.join("vendor/lib/lib.txt")).unwrap(),
        "library\n"
    );
}

#[test]
fn non_recursive_download_leaves_placeholders() {
    let _lock = lock();
    let temp = TempDir::new().unwrap();
    let (project, head) = project_with_submodule(temp.path());
    let target = temp.path().join("checkout");

    Downloader::new()
        .download(&package(&project, &head, ""), &target, false, false)
        .unwrap();

    assert!(target.join("README.md").is_file());
    assert!(!target.join("vendor/lib/lib.txt").exists());
}

#[test]
fn sub_path_download_is_sparse() {
    let _lock = lock();
    let temp = TempDir::new().unwrap();
    let (project, head) = project_with_submodule(temp.path());
    let target = temp.path().join("checkout");

    let tree = Downloader::new()
        .download(&package(&project, &head, "docs"), &target, false, false)
        .unwrap();

    assert!(target.join("docs/guide.md").is_file());
    assert!(!target.join("README.md").exists());

    let info = tree.info(Some(target.join("docs").as_path())).unwrap();
    assert_eq!(info.vcs_type, "Git");
    assert_eq!(info.revision, head);
    assert_eq!(info.path, "docs");
}

#[test]
fn downloaded_tree_is_detected() {
    let _lock = lock();
    let temp = TempDir::new().unwrap();
    let (project, head) = project_with_submodule(temp.path());
    let target = temp.path().join("checkout");

    Downloader::new()
        .download(&package(&project, &head, ""), &target, false, false)
        .unwrap();

    let tree = for_directory(&target.join("docs")).unwrap();
    assert_eq!(tree.vcs_type(), VcsKind::Git);
    assert!(tree.is_shallow().unwrap());
    assert_eq!(tree.revision().unwrap(), head);
    assert_eq!(tree.remote_url().unwrap(), project.to_string_lossy());
    assert!(tree.list_remote_tags().unwrap().is_empty());
    assert_eq!(tree.guess_revision_name("project", "1.0").unwrap(), "");
}

#[test]
fn moving_revision_with_permission() {
    let _lock = lock();
    let temp = TempDir::new().unwrap();
    let (project, head) = project_with_submodule(temp.path());
    let target = temp.path().join("checkout");

    let tree = Downloader::new()
        .download(&package(&project, "", ""), &target, true, false)
        .unwrap();

    assert_eq!(tree.revision().unwrap(), head);
}

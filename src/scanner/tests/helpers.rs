//! Test helper functions for scanner unit tests
//!
//! Builds throwaway git repositories with controlled author dates. These are
//! separate from the integration test helpers in tests/common/ since unit
//! tests and integration tests run in different contexts.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

/// Run git in `dir`, panicking with stderr on failure
pub fn git(dir: &Path, args: &[&str]) {
    git_with_date(dir, args, None);
}

/// Run git with author and committer dates pinned to `date` (RFC 2822 or ISO 8601)
pub fn git_with_date(dir: &Path, args: &[&str], date: Option<&str>) {
    git_with_dates(dir, args, date, date);
}

/// Run git with independent author and committer dates
pub fn git_with_dates(dir: &Path, args: &[&str], author: Option<&str>, committer: Option<&str>) {
    let mut command = Command::new("git");
    command.args(args).current_dir(dir);
    if let Some(date) = author {
        command.env("GIT_AUTHOR_DATE", date);
    }
    if let Some(date) = committer {
        command.env("GIT_COMMITTER_DATE", date);
    }
    let output = command.output().expect("git must be installed");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Empty repository on branch `main` with a local identity
pub fn init_repo() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path();
    git(path, &["init", "--quiet", "--initial-branch=main"]);
    git(path, &["config", "user.name", "Test User"]);
    git(path, &["config", "user.email", "test@example.com"]);
    git(path, &["config", "commit.gpgsign", "false"]);
    git(path, &["config", "tag.gpgsign", "false"]);
    temp_dir
}

/// Write `files`, commit them at `date` and create a lightweight tag
pub fn commit_and_tag(dir: &Path, files: &[(&str, &str)], tag: &str, date: &str) {
    commit_and_tag_with_dates(dir, files, tag, date, date);
}

/// Like [`commit_and_tag`], with the committer date set apart from the
/// author date the way a rebase or cherry-pick leaves it
pub fn commit_and_tag_with_dates(
    dir: &Path,
    files: &[(&str, &str)],
    tag: &str,
    authored: &str,
    committed: &str,
) {
    for (relative, content) in files {
        let path = dir.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }
    git(dir, &["add", "--all"]);
    git_with_dates(
        dir,
        &["commit", "--quiet", "--allow-empty", "-m", tag],
        Some(authored),
        Some(committed),
    );
    git(dir, &["tag", tag]);
}

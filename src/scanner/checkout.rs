//! Working Tree Checkout
//!
//! The working tree is the single shared mutable resource of a run. Only the
//! walker owns a [`CheckoutManager`], which keeps tag checkouts strictly
//! sequential. Checkouts are forced, the way a release audit expects: local
//! modifications in the audited clone are discarded.
//!
//! Tags are read through gix, but moving an existing working tree is done by
//! the `git` executable, which must be on `PATH` at runtime.
//! [`CheckoutManager::ensure_git`] checks for it before any tag is touched.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::scanner::error::{CheckoutError, CheckoutResult};

/// Conventional default branch names tried first when restoring
pub const DEFAULT_BRANCHES: &[&str] = &["main", "master"];

pub const GIT_PROGRAM: &str = "git";

/// Where HEAD pointed before the run started
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginalState {
    Branch(String),
    Detached(String),
    Unknown,
}

/// Moves the working tree between commits using the `git` executable
#[derive(Debug)]
pub struct CheckoutManager {
    git: OsString,
    work_tree: PathBuf,
    original: OriginalState,
    current: Option<String>,
}

impl CheckoutManager {
    pub fn new(work_tree: impl Into<PathBuf>, original: OriginalState) -> Self {
        Self {
            git: OsString::from(GIT_PROGRAM),
            work_tree: work_tree.into(),
            original,
            current: None,
        }
    }

    /// Run checkouts with another git binary
    pub fn with_git_program(mut self, program: impl AsRef<OsStr>) -> Self {
        self.git = program.as_ref().to_os_string();
        self
    }

    /// Fail early when the git executable cannot be started
    pub fn ensure_git(&self) -> CheckoutResult<String> {
        let unavailable = |message: String| CheckoutError::GitUnavailable {
            program: self.git.to_string_lossy().to_string(),
            message,
        };
        let output = Command::new(&self.git)
            .arg("--version")
            .output()
            .map_err(|e| unavailable(e.to_string()))?;
        if !output.status.success() {
            return Err(unavailable(format!("'--version' exited with {}", output.status)));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    pub fn work_tree(&self) -> &Path {
        &self.work_tree
    }

    pub fn original_state(&self) -> &OriginalState {
        &self.original
    }

    /// Revision of the last successful checkout, if any
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Force the working tree to `rev`
    pub fn checkout(&mut self, rev: &str) -> CheckoutResult<()> {
        self.run_git(
            rev,
            &[
                "-c",
                "advice.detachedHead=false",
                "checkout",
                "--force",
                "--quiet",
                rev,
            ],
        )?;
        self.current = Some(rev.to_string());
        Ok(())
    }

    /// Revisions tried by [`restore`](Self::restore), in order
    pub fn restore_candidates(&self) -> Vec<String> {
        let mut candidates: Vec<String> = DEFAULT_BRANCHES
            .iter()
            .filter(|branch| self.branch_exists(branch))
            .map(|branch| branch.to_string())
            .collect();
        match &self.original {
            OriginalState::Branch(name) | OriginalState::Detached(name) => {
                if !candidates.contains(name) {
                    candidates.push(name.clone());
                }
            }
            OriginalState::Unknown => {}
        }
        candidates
    }

    /// Best effort: check out the first candidate that succeeds
    ///
    /// Returns the revision restored to, or `None` when every candidate
    /// failed and the tree stays at the last checked-out tag.
    pub fn restore(&mut self) -> Option<String> {
        for candidate in self.restore_candidates() {
            match self.run_git(&candidate, &["checkout", "--quiet", &candidate]) {
                Ok(()) => {
                    self.current = Some(candidate.clone());
                    return Some(candidate);
                }
                Err(e) => log::debug!("Restore to '{}' failed: {}", candidate, e),
            }
        }
        None
    }

    fn branch_exists(&self, branch: &str) -> bool {
        Command::new(&self.git)
            .args(["rev-parse", "--verify", "--quiet"])
            .arg(format!("refs/heads/{}", branch))
            .current_dir(&self.work_tree)
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    fn run_git(&self, rev: &str, args: &[&str]) -> CheckoutResult<()> {
        let output = Command::new(&self.git)
            .args(args)
            .current_dir(&self.work_tree)
            .output()?;

        if output.status.success() {
            Ok(())
        } else {
            Err(CheckoutError::Git {
                rev: rev.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn git(dir: &Path, args: &[&str]) {
        let status = Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .expect("git must be installed")
            .status;
        assert!(status.success(), "git {:?} failed", args);
    }

    fn repo_with_two_commits() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path();
        git(path, &["init", "--quiet", "--initial-branch=trunk"]);
        git(path, &["config", "user.name", "Test User"]);
        git(path, &["config", "user.email", "test@example.com"]);
        std::fs::write(path.join("a.txt"), "one").unwrap();
        git(path, &["add", "."]);
        git(path, &["commit", "--quiet", "-m", "first"]);
        git(path, &["tag", "v1"]);
        std::fs::write(path.join("a.txt"), "two").unwrap();
        git(path, &["commit", "--quiet", "-am", "second"]);
        temp_dir
    }

    #[test]
    #[serial_test::serial]
    fn test_checkout_moves_working_tree() {
        let temp_dir = repo_with_two_commits();
        let mut manager =
            CheckoutManager::new(temp_dir.path(), OriginalState::Branch("trunk".into()));

        manager.checkout("v1").unwrap();
        assert_eq!(manager.current(), Some("v1"));
        let content = std::fs::read_to_string(temp_dir.path().join("a.txt")).unwrap();
        assert_eq!(content, "one");
    }

    #[test]
    #[serial_test::serial]
    fn test_checkout_unknown_rev_is_recoverable_error() {
        let temp_dir = repo_with_two_commits();
        let mut manager = CheckoutManager::new(temp_dir.path(), OriginalState::Unknown);

        let err = manager.checkout("no-such-tag").unwrap_err();
        assert!(matches!(err, CheckoutError::Git { ref rev, .. } if rev == "no-such-tag"));
        assert_eq!(manager.current(), None);
    }

    #[test]
    #[serial_test::serial]
    fn test_restore_falls_back_to_original_branch() {
        let temp_dir = repo_with_two_commits();
        let mut manager =
            CheckoutManager::new(temp_dir.path(), OriginalState::Branch("trunk".into()));

        // no main/master in this repository
        assert_eq!(manager.restore_candidates(), vec!["trunk".to_string()]);

        manager.checkout("v1").unwrap();
        assert_eq!(manager.restore(), Some("trunk".to_string()));
        let content = std::fs::read_to_string(temp_dir.path().join("a.txt")).unwrap();
        assert_eq!(content, "two");
    }

    #[test]
    #[serial_test::serial]
    fn test_restore_prefers_default_branch() {
        let temp_dir = repo_with_two_commits();
        git(temp_dir.path(), &["branch", "main", "v1"]);
        let mut manager =
            CheckoutManager::new(temp_dir.path(), OriginalState::Branch("trunk".into()));

        assert_eq!(
            manager.restore_candidates(),
            vec!["main".to_string(), "trunk".to_string()]
        );
        assert_eq!(manager.restore(), Some("main".to_string()));
    }

    #[test]
    fn test_ensure_git_reports_version() {
        let temp_dir = TempDir::new().unwrap();
        let manager = CheckoutManager::new(temp_dir.path(), OriginalState::Unknown);
        assert!(manager.ensure_git().unwrap().starts_with("git version"));
    }

    #[test]
    fn test_missing_git_program_is_reported_up_front() {
        let temp_dir = TempDir::new().unwrap();
        let manager = CheckoutManager::new(temp_dir.path(), OriginalState::Unknown)
            .with_git_program("repodrift-no-such-git");
        let err = manager.ensure_git().unwrap_err();
        assert!(
            matches!(err, CheckoutError::GitUnavailable { ref program, .. } if program == "repodrift-no-such-git")
        );
    }

    #[test]
    fn test_restore_with_nothing_to_restore() {
        let temp_dir = TempDir::new().unwrap();
        let mut manager = CheckoutManager::new(temp_dir.path(), OriginalState::Unknown);
        assert!(manager.restore_candidates().is_empty());
        assert_eq!(manager.restore(), None);
    }
}

//! Shared integration test helpers
//!
//! Git fixture repositories and the injection fixture: a small state machine
//! `Untested -> PreTagged -> Injected` whose final state is a repository
//! whose last tag carries a known payload.

#![allow(dead_code)]

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

/// Source that every clean release ships unchanged
pub const CLEAN_MODULE: &str = "\
def handle(request):
    user = request.user
    if user is None:
        return None
    return render(user)
";

/// Run git in `dir`, panicking with stderr on failure
pub fn git(dir: &Path, args: &[&str]) -> String {
    git_with_date(dir, args, None)
}

/// Run git with author and committer dates pinned to `date`
pub fn git_with_date(dir: &Path, args: &[&str], date: Option<&str>) -> String {
    let mut command = Command::new("git");
    command.args(args).current_dir(dir);
    if let Some(date) = date {
        command
            .env("GIT_AUTHOR_DATE", date)
            .env("GIT_COMMITTER_DATE", date);
    }
    let output = command.output().expect("git must be installed");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Empty repository on branch `main` with a local identity
pub fn init_repo() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path();
    git(path, &["init", "--quiet", "--initial-branch=main"]);
    git(path, &["config", "user.name", "Release Bot"]);
    git(path, &["config", "user.email", "release@example.com"]);
    git(path, &["config", "commit.gpgsign", "false"]);
    git(path, &["config", "tag.gpgsign", "false"]);
    temp_dir
}

/// Write `files`, commit them at `date` and tag the commit
pub fn commit_and_tag(dir: &Path, files: &[(&str, &str)], tag: &str, date: &str) {
    for (relative, content) in files {
        let path = dir.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }
    git(dir, &["add", "--all"]);
    git_with_date(
        dir,
        &["commit", "--quiet", "--allow-empty", "-m", tag],
        Some(date),
    );
    git(dir, &["tag", tag]);
}

/// One release per day from 2023-01-01
pub fn release_date(index: usize) -> String {
    format!("2023-01-{:02}T12:00:00Z", index + 1)
}

/// `blank_space_ratio` payload: a command hidden past the right margin
pub fn whitespace_payload(base: &str) -> String {
    format!("{}{}__import__('os').system('sh')\n", base, " ".repeat(2000))
}

/// Unicode payload: a Cyrillic `а` in a literal and a right-to-left override
pub fn unicode_payload(base: &str) -> String {
    format!(
        "{}\ndef is_admin(user):\n    return user.name == \"\u{0430}dmin\" \u{202E}# trusted\n",
        base
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureState {
    Untested,
    PreTagged,
    Injected,
}

/// Tagged repository whose newest release carries a payload
pub struct InjectionFixture {
    repo: TempDir,
    state: FixtureState,
    tags: Vec<String>,
}

impl InjectionFixture {
    pub fn new() -> Self {
        Self {
            repo: init_repo(),
            state: FixtureState::Untested,
            tags: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        self.repo.path()
    }

    pub fn state(&self) -> FixtureState {
        self.state
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Tag `releases` clean releases of `files`; no-op unless untested
    pub fn pre_tag(&mut self, files: &[(&str, &str)], releases: usize) -> &mut Self {
        if self.state != FixtureState::Untested {
            return self;
        }
        for index in 0..releases {
            let tag = format!("v0.{}", index + 1);
            let version = format!("{}\n", tag);
            let mut release: Vec<(&str, &str)> = files.to_vec();
            release.push(("VERSION", &version));
            commit_and_tag(self.path(), &release, &tag, &release_date(index));
            self.tags.push(tag);
        }
        self.state = FixtureState::PreTagged;
        self
    }

    /// Tag one more release with `payload` written to `file`; no-op once injected
    pub fn inject(&mut self, file: &str, payload: &str) -> &mut Self {
        match self.state {
            FixtureState::Injected => return self,
            FixtureState::Untested => panic!("inject requires a pre-tagged fixture"),
            FixtureState::PreTagged => {}
        }
        let index = self.tags.len();
        let tag = format!("v0.{}", index + 1);
        let version = format!("{}\n", tag);
        commit_and_tag(
            self.path(),
            &[(file, payload), ("VERSION", &version)],
            &tag,
            &release_date(index),
        );
        self.tags.push(tag);
        self.state = FixtureState::Injected;
        self
    }

    /// Tag pair across which the payload appeared
    pub fn injection_pair(&self) -> Option<(&str, &str)> {
        match (self.state, self.tags.len()) {
            (FixtureState::Injected, n) if n >= 2 => {
                Some((self.tags[n - 2].as_str(), self.tags[n - 1].as_str()))
            }
            _ => None,
        }
    }
}

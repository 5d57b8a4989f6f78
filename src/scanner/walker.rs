//! Version Walker
//!
//! Lists a repository's tags in chronological order and moves the working
//! tree from one tag to the next. Tags are read through gix; the working tree
//! is moved by the [`CheckoutManager`].

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::scanner::checkout::{CheckoutManager, OriginalState, GIT_PROGRAM};
use crate::scanner::error::{CheckoutResult, WalkerError, WalkerResult};
use crate::scanner::types::{sort_chronologically, Tag};

/// Access to a repository's release history
///
/// Implementors own the working tree; callers must not run two checkouts
/// concurrently, which `&mut self` enforces.
pub trait VersionWalker {
    /// Tags sorted ascending by commit author time. Pure read.
    fn chronological_tags(&self) -> WalkerResult<Vec<Tag>>;

    /// Move the working tree to the tag's commit
    fn checkout(&mut self, tag: &Tag) -> CheckoutResult<()>;

    /// Best effort return to a sensible branch. Returns `false` (after
    /// logging a warning) if the tree was left at the last checked-out tag.
    fn restore_original_state(&mut self) -> bool;

    /// Root of the working tree that checkouts mutate
    fn work_tree(&self) -> &Path;
}

/// [`VersionWalker`] over a local git clone
pub struct GitVersionWalker {
    repository: gix::Repository,
    checkout: CheckoutManager,
}

impl std::fmt::Debug for GitVersionWalker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitVersionWalker")
            .field("git_dir", &self.repository.git_dir())
            .field("checkout", &self.checkout)
            .finish()
    }
}

impl GitVersionWalker {
    /// Open the repository whose working tree contains `path`
    ///
    /// Fails with [`WalkerError::GitUnavailable`] when the `git` executable
    /// needed for checkouts cannot be run.
    pub fn open(path: impl AsRef<Path>) -> WalkerResult<Self> {
        Self::open_with_git(path, GIT_PROGRAM)
    }

    /// [`open`](Self::open) with an explicit git binary for checkouts
    pub fn open_with_git(path: impl AsRef<Path>, git: impl AsRef<OsStr>) -> WalkerResult<Self> {
        let path = path.as_ref();
        let repository = gix::open(path).map_err(|e| WalkerError::Repository {
            message: format!("Failed to open repository '{}': {}", path.display(), e),
        })?;

        let work_tree: PathBuf = repository
            .workdir()
            .ok_or_else(|| WalkerError::Bare {
                path: path.display().to_string(),
            })?
            .to_path_buf();

        let original = Self::head_state(&repository);
        log::debug!("Repository HEAD before the run: {:?}", original);

        let checkout = CheckoutManager::new(work_tree, original).with_git_program(git);
        let git_version = checkout.ensure_git()?;
        log::debug!("Checkouts use {}", git_version);

        Ok(Self {
            repository,
            checkout,
        })
    }

    pub fn original_state(&self) -> &OriginalState {
        self.checkout.original_state()
    }

    fn head_state(repository: &gix::Repository) -> OriginalState {
        match repository.head_name() {
            Ok(Some(name)) => OriginalState::Branch(name.shorten().to_string()),
            _ => match repository.head_id() {
                Ok(id) => OriginalState::Detached(id.to_string()),
                Err(_) => OriginalState::Unknown,
            },
        }
    }

    /// Resolve one tag reference to (commit id, author time)
    fn resolve_tag(
        repository: &gix::Repository,
        reference: &mut gix::Reference<'_>,
    ) -> Result<(String, DateTime<Utc>), String> {
        let id = reference
            .peel_to_id_in_place()
            .map_err(|e| format!("cannot peel reference: {}", e))?;
        let commit = repository
            .find_commit(id.detach())
            .map_err(|e| format!("does not point to a commit: {}", e))?;
        let author = commit
            .author()
            .map_err(|e| format!("cannot decode author: {}", e))?;
        let time = author
            .time()
            .map_err(|e| format!("cannot parse author time: {}", e))?;
        let authored_at = DateTime::<Utc>::from_timestamp(time.seconds, 0)
            .ok_or_else(|| format!("author time {} out of range", time.seconds))?;
        Ok((commit.id().to_string(), authored_at))
    }
}

impl VersionWalker for GitVersionWalker {
    fn chronological_tags(&self) -> WalkerResult<Vec<Tag>> {
        let platform = self
            .repository
            .references()
            .map_err(|e| WalkerError::Repository {
                message: format!("Failed to read references: {}", e),
            })?;
        let tag_refs = platform.tags().map_err(|e| WalkerError::Repository {
            message: format!("Failed to list tags: {}", e),
        })?;

        let mut tags = Vec::new();
        for reference in tag_refs {
            let mut reference = match reference {
                Ok(reference) => reference,
                Err(e) => {
                    log::warn!("Skipping unreadable tag reference: {}", e);
                    continue;
                }
            };
            let name = reference.name().shorten().to_string();
            match Self::resolve_tag(&self.repository, &mut reference) {
                Ok((commit, authored_at)) => tags.push(Tag::new(name, commit, authored_at)),
                Err(reason) => log::warn!("Skipping tag {}: {}", name, reason),
            }
        }

        sort_chronologically(&mut tags);
        Ok(tags)
    }

    fn checkout(&mut self, tag: &Tag) -> CheckoutResult<()> {
        log::debug!("Checking out {} ({})", tag.name, tag.short_commit());
        self.checkout.checkout(&tag.commit)
    }

    fn restore_original_state(&mut self) -> bool {
        match self.checkout.restore() {
            Some(rev) => {
                log::info!("Restored repository to '{}'", rev);
                true
            }
            None => {
                log::warn!(
                    "Could not restore the repository to its original branch; it remains at {}. \
                     Restore it manually (e.g. 'git checkout main').",
                    self.checkout.current().unwrap_or("the last checked-out tag")
                );
                false
            }
        }
    }

    fn work_tree(&self) -> &Path {
        self.checkout.work_tree()
    }
}

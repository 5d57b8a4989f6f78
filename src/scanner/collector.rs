//! File Collector
//!
//! Enumerates the regular files of the checked-out working tree that pass the
//! extension filter and do not live under an excluded directory.

use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::path::{Component, Path};

use walkdir::{DirEntry, WalkDir};

use crate::scanner::types::CollectedFile;

/// Extension filter plus excluded directory names
#[derive(Debug, Clone, Default)]
pub struct FileCollector {
    extension: Option<String>,
    excluded_dirs: BTreeSet<String>,
}

impl FileCollector {
    /// `extension` is given without the leading dot
    pub fn new(extension: Option<String>, excluded_dirs: BTreeSet<String>) -> Self {
        Self {
            extension,
            excluded_dirs,
        }
    }

    pub fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }

    /// Eligible files under `root`, sorted by relative path
    ///
    /// Unreadable entries are logged and skipped. Symlinks are not followed.
    pub fn collect(&self, root: &Path) -> Vec<CollectedFile> {
        let mut files = Vec::new();
        let walker = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| !self.is_excluded_dir(entry));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Skipping unreadable path under {}: {}", root.display(), e);
                    continue;
                }
            };
            if !entry.file_type().is_file() || !self.matches_extension(entry.file_name()) {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(root) else {
                continue;
            };
            files.push(CollectedFile {
                relative: to_slash_path(relative),
                absolute: entry.path().to_path_buf(),
            });
        }

        files.sort();
        files
    }

    /// Suffix match on the file name; no filter accepts everything
    pub fn matches_extension(&self, file_name: &OsStr) -> bool {
        match &self.extension {
            None => true,
            Some(ext) => file_name
                .to_str()
                .is_some_and(|name| name.len() > ext.len() + 1 && name.ends_with(&format!(".{}", ext))),
        }
    }

    /// True if any directory segment of `relative` is excluded
    pub fn is_excluded_path(&self, relative: &Path) -> bool {
        let Some(parent) = relative.parent() else {
            return false;
        };
        parent.components().any(|component| match component {
            Component::Normal(segment) => segment
                .to_str()
                .is_some_and(|s| self.excluded_dirs.contains(s)),
            _ => false,
        })
    }

    fn is_excluded_dir(&self, entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| self.excluded_dirs.contains(name))
    }
}

fn to_slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

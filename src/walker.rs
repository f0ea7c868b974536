//! Local tree walk that mirrors directories as remote folders.
//!
//! The walk is a pre-order depth-first traversal driven by an explicit
//! worklist of `(parent handle, directory)` pairs. For each directory:
//!
//! 1. Register it remotely under its parent (unless it is the root marker).
//! 2. Upload every file in it, in file-name order.
//! 3. Queue its subdirectories, to be visited in file-name order.
//!
//! The first failure anywhere aborts the whole walk. Symlinks are followed,
//! but a directory whose canonical path was already visited is skipped, so a
//! link back up the tree cannot recurse.

use anyhow::{bail, Context, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::error::Outcome;
use crate::models::RemoteId;
use crate::progress::{IngestEvent, NoProgress, ProgressReporter};
use crate::remote::RemoteStore;
use crate::upload::{upload_file, UploadStatus};

/// Counters for a finished walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkReport {
    pub folders_created: u64,
    pub folders_existing: u64,
    pub files_uploaded: u64,
    pub files_unchanged: u64,
    pub bytes_uploaded: u64,
}

pub struct Walker<'a, S: RemoteStore + ?Sized> {
    store: &'a S,
    root_marker: &'a str,
    progress: &'a dyn ProgressReporter,
}

impl<'a, S: RemoteStore + ?Sized> Walker<'a, S> {
    /// A walker whose directories named `root_marker` are not registered
    /// remotely; their contents land under the customer's root instead.
    pub fn new(store: &'a S, root_marker: &'a str) -> Self {
        Self {
            store,
            root_marker,
            progress: &NoProgress,
        }
    }

    pub fn with_progress(mut self, progress: &'a dyn ProgressReporter) -> Self {
        self.progress = progress;
        self
    }

    /// Mirror the tree at `root` under the remote folder `parent`.
    pub fn walk(&self, parent: Option<RemoteId>, root: &Path) -> Result<WalkReport> {
        let mut report = WalkReport::default();
        let mut pending: Vec<(Option<RemoteId>, PathBuf)> = vec![(parent, root.to_path_buf())];
        let mut visited: HashSet<PathBuf> = HashSet::new();

        while let Some((parent, dir)) = pending.pop() {
            let canonical = dir
                .canonicalize()
                .with_context(|| format!("cannot resolve folder: {}", dir.display()))?;
            if !visited.insert(canonical) {
                warn!(folder = %dir.display(), "skipping folder already visited through a symlink");
                continue;
            }

            let handle = self
                .register(parent.as_ref(), &dir, &mut report)
                .with_context(|| format!("error processing folder: {}", dir.display()))?;

            let (files, subdirs) = list_children(&dir)?;

            for file in &files {
                let status = upload_file(self.store, handle.as_ref(), file)
                    .with_context(|| format!("Error uploading: {}", file.display()))?;
                match status {
                    UploadStatus::Uploaded { bytes } => {
                        report.files_uploaded += 1;
                        report.bytes_uploaded += bytes;
                        self.progress.report(IngestEvent::uploaded(file, bytes));
                    }
                    UploadStatus::Unchanged => {
                        report.files_unchanged += 1;
                        self.progress.report(IngestEvent::unchanged(file));
                    }
                }
            }

            // Reversed so the stack pops them in name order.
            for sub in subdirs.into_iter().rev() {
                pending.push((handle.clone(), sub));
            }
        }

        Ok(report)
    }

    /// Register `dir` remotely and return the handle its children hang off.
    fn register(
        &self,
        parent: Option<&RemoteId>,
        dir: &Path,
        report: &mut WalkReport,
    ) -> Result<Option<RemoteId>> {
        let name = folder_name(dir)?;
        if name == self.root_marker {
            return Ok(None);
        }

        match self.store.create_folder(parent, &name)? {
            Outcome::Success(id) => {
                info!(folder = %dir.display(), id = %id, "created folder");
                report.folders_created += 1;
                self.progress.report(IngestEvent::folder(dir, false));
                Ok(Some(id))
            }
            Outcome::Conflict(existing) => {
                report.folders_existing += 1;
                self.progress.report(IngestEvent::folder(dir, true));
                if existing.is_none() {
                    warn!(
                        folder = %dir.display(),
                        "folder already exists but no id was returned; children go under the root"
                    );
                } else {
                    info!(folder = %dir.display(), "folder already exists");
                }
                Ok(existing)
            }
        }
    }
}

/// Base name of a directory, resolving `.` and `..` through the filesystem.
fn folder_name(dir: &Path) -> Result<String> {
    if let Some(name) = dir.file_name() {
        return Ok(name.to_string_lossy().to_string());
    }
    let resolved = dir
        .canonicalize()
        .with_context(|| format!("cannot resolve folder: {}", dir.display()))?;
    match resolved.file_name() {
        Some(name) => Ok(name.to_string_lossy().to_string()),
        None => bail!("folder has no name: {}", dir.display()),
    }
}

/// Immediate children of `dir`, split into files and directories, each sorted
/// by file name. Symlinks are followed.
fn list_children(dir: &Path) -> Result<(Vec<PathBuf>, Vec<PathBuf>)> {
    let mut files = Vec::new();
    let mut dirs = Vec::new();

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) if e.depth() == 0 => {
                return Err(e).with_context(|| format!("cannot list folder: {}", dir.display()))
            }
            Err(e) => {
                warn!(folder = %dir.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };

        let file_type = entry.file_type();
        if file_type.is_dir() {
            dirs.push(entry.into_path());
        } else if file_type.is_file() {
            files.push(entry.into_path());
        }
    }

    Ok((files, dirs))
}

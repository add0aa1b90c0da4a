use crate::cancel::CancelToken;
use crate::error::{Error, Result};
use crate::options::HashOptions;
use crate::types::Omission;
use camino::{Utf8DirEntry, Utf8Path, Utf8PathBuf};
use std::collections::HashSet;
use std::io::ErrorKind;
use tracing::{debug, warn};

const HIDDEN_ENTRY_PREFIX: char = '.';

/// Everything the walk found beneath a root.
#[derive(Debug, Default)]
pub struct Walk {
    /// Absolute (root-joined) paths of every file to hash.
    /// Order is whatever the OS handed us.
    pub files: Vec<Utf8PathBuf>,
    /// Directories that could not be listed (best-effort only).
    pub omissions: Vec<Omission>,
}

/// Fails before any hashing if `root` is missing or is not a directory.
pub fn check_root(root: &Utf8Path) -> Result<()> {
    match root.metadata() {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(Error::NotADirectory {
            path: root.to_path_buf(),
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::NotFound {
            path: root.to_path_buf(),
        }),
        Err(e) => Err(Error::io(root, e)),
    }
}

/// Collects the paths of all files beneath `root` that `options` admits.
///
/// Uses an explicit stack of pending directories rather than recursion, so
/// deep trees cannot exhaust the call stack and `cancel` is consulted before
/// each directory is read.
#[inline(never)]
pub fn get_files(root: &Utf8Path, options: &HashOptions, cancel: &CancelToken) -> Result<Walk> {
    let mut walk = Walk::default();
    let mut folders = vec![root.to_path_buf()];
    // Only needed when symlinked directories may lead back into the tree.
    let mut visited = HashSet::new();
    if options.follow_symlinks {
        visited.insert(canonical(root)?);
    }

    while let Some(cur_folder) = folders.pop() {
        cancel.check()?;
        let pushed = push_entries(&cur_folder, options, &mut visited, &mut walk.files, &mut folders);
        match pushed {
            Ok(()) => {}
            Err(Error::Io { path, source }) if options.best_effort && path.as_path() != root => {
                warn!(%path, error = %source, "skipping unreadable directory");
                walk.omissions.push(Omission {
                    path,
                    reason: source.to_string(),
                });
            }
            Err(e) => return Err(e),
        }
    }
    debug!(%root, files = walk.files.len(), "walk finished");
    Ok(walk)
}

/// Pushes the admitted files and folders directly beneath `dir_path`.
///
/// Entries are taken in name order and folders are stacked so the smallest
/// name pops first. The walk, and with it the choice of which symlink alias
/// reaches an already-visited directory first, depends only on names.
fn push_entries(
    dir_path: &Utf8Path,
    options: &HashOptions,
    visited: &mut HashSet<Utf8PathBuf>,
    files: &mut Vec<Utf8PathBuf>,
    folders: &mut Vec<Utf8PathBuf>,
) -> Result<()> {
    let mut entries = dir_path
        .read_dir_utf8()
        .map_err(|e| Error::io(dir_path, e))?
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| Error::io(dir_path, e))?;
    entries.sort_unstable_by(|a, b| a.file_name().cmp(b.file_name()));

    let mut subfolders = Vec::new();
    for entry in entries {
        if !options.include_hidden && entry.file_name().starts_with(HIDDEN_ENTRY_PREFIX) {
            continue;
        }
        match classify(&entry, options)? {
            Kind::File => files.push(entry.into_path()),
            Kind::Dir => subfolders.push(entry.into_path()),
            Kind::LinkedDir => {
                let path = entry.into_path();
                if visited.insert(canonical(&path)?) {
                    subfolders.push(path);
                } else {
                    debug!(%path, "directory already visited, not following");
                }
            }
            Kind::Skip => {}
        }
    }
    folders.extend(subfolders.into_iter().rev());
    Ok(())
}

enum Kind {
    File,
    Dir,
    LinkedDir,
    Skip,
}

fn classify(entry: &Utf8DirEntry, options: &HashOptions) -> Result<Kind> {
    // Does not follow symlinks.
    let entry_type = entry.file_type().map_err(|e| Error::io(entry.path(), e))?;
    if entry_type.is_file() {
        return Ok(Kind::File);
    }
    if entry_type.is_dir() {
        return Ok(Kind::Dir);
    }
    if !entry_type.is_symlink() {
        debug!(path = %entry.path(), "skipping special file");
        return Ok(Kind::Skip);
    }

    // Symlink: look at what it points to.
    let target = match entry.path().metadata() {
        Ok(meta) => meta,
        Err(e) => {
            debug!(path = %entry.path(), error = %e, "skipping dangling symlink");
            return Ok(Kind::Skip);
        }
    };
    let kind = if target.is_file() && options.include_symlinked_files {
        Kind::File
    } else if target.is_dir() && options.follow_symlinks {
        Kind::LinkedDir
    } else {
        debug!(path = %entry.path(), "not following symlink");
        Kind::Skip
    };
    Ok(kind)
}

fn canonical(path: &Utf8Path) -> Result<Utf8PathBuf> {
    path.canonicalize_utf8().map_err(|e| Error::io(path, e))
}

/// Path of `file` relative to `root`, components joined by `/` on every
/// platform.
pub fn relative_path(root: &Utf8Path, file: &Utf8Path) -> String {
    let stripped = file.strip_prefix(root).unwrap_or(file);
    stripped
        .components()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join("/")
}

use crate::cancel::CancelToken;
use crate::error::{Error, Result};
use crate::fs::{check_root, get_files, relative_path};
use crate::options::HashOptions;
use crate::types::{Digest, DirectoryDigest, FileEntry, Omission};
use camino::{Utf8Path, Utf8PathBuf};
use md5::{Digest as _, Md5};
use rayon::prelude::*;
use std::fs::File;
use std::io::{ErrorKind, Read};
use tracing::{debug, info, warn};

/// Read size per `update` call. Memory use per file is capped at this,
/// however large the file.
const CHUNK_SIZE: usize = 64 * 1024;

/// Separates one entry from the next in the aggregate input.
/// Paths never contain NUL, so `digest || path || NUL` is unambiguous.
const ENTRY_TERMINATOR: u8 = 0;

/// MD5 of a single file's bytes.
pub fn hash_file(path: impl AsRef<Utf8Path>) -> Result<Digest> {
    hash_file_counted(path.as_ref()).map(|(digest, _)| digest)
}

/// Streams `path` through a fresh accumulator, returning the digest and
/// the number of bytes read.
fn hash_file_counted(path: &Utf8Path) -> Result<(Digest, u64)> {
    let mut file = File::open(path).map_err(|e| Error::io(path, e))?;
    let mut hasher = Md5::new();
    let mut buf = vec![0; CHUNK_SIZE];
    let mut size = 0;
    loop {
        let read = match file.read(&mut buf) {
            Ok(0) => break,
            Ok(read) => read,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::io(path, e)),
        };
        hasher.update(&buf[..read]);
        size += read as u64;
    }
    Ok((finish(hasher), size))
}

#[inline]
fn finish(hasher: Md5) -> Digest {
    let mut bytes = [0; Digest::LEN];
    bytes.copy_from_slice(&hasher.finalize());
    Digest::from_bytes(bytes)
}

/// Combines per-file digests into one value for the whole tree.
///
/// `entries` must already be sorted by path; the result depends on both
/// the content and the name of every file.
pub fn aggregate(entries: &[FileEntry]) -> Digest {
    let mut hasher = Md5::new();
    for entry in entries {
        hasher.update(entry.digest.as_bytes());
        hasher.update(entry.path.as_bytes());
        hasher.update([ENTRY_TERMINATOR]);
    }
    finish(hasher)
}

/// Hashes every file beneath `root` and folds them into a
/// [`DirectoryDigest`].
pub fn hash_directory(root: impl AsRef<Utf8Path>, options: &HashOptions) -> Result<DirectoryDigest> {
    hash_directory_cancellable(root, options, &CancelToken::new())
}

/// Like [`hash_directory`], but gives up with [`Error::Cancelled`] as soon as
/// `cancel` is observed between two directories or two files.
pub fn hash_directory_cancellable(
    root: impl AsRef<Utf8Path>,
    options: &HashOptions,
    cancel: &CancelToken,
) -> Result<DirectoryDigest> {
    let root = root.as_ref();
    match options.threads {
        Some(num_threads) => with_threads(num_threads, || hash_tree(root, options, cancel))?,
        None => hash_tree(root, options, cancel),
    }
}

fn hash_tree(root: &Utf8Path, options: &HashOptions, cancel: &CancelToken) -> Result<DirectoryDigest> {
    check_root(root)?;
    let walk = get_files(root, options, cancel)?;
    let (hashed, mut omissions) = hash_files(root, walk.files, options, cancel)?;
    omissions.extend(walk.omissions);
    omissions.sort_unstable_by(|a, b| a.path.cmp(&b.path));

    // Everything below runs only once every file hash is in. Sorting here is
    // what makes the aggregate independent of enumeration order.
    let mut size = 0;
    let mut entries: Vec<FileEntry> = hashed
        .into_iter()
        .map(|file| {
            size += file.size;
            file.entry
        })
        .collect();
    entries.sort_unstable_by(|a, b| a.path.cmp(&b.path));
    let digest = aggregate(&entries);

    info!(
        %root,
        files = entries.len(),
        bytes = size,
        omitted = omissions.len(),
        %digest,
        "hashed directory"
    );
    Ok(DirectoryDigest {
        dir_name: root.file_name().unwrap_or(root.as_str()).to_string(),
        entries,
        digest,
        size,
        omissions,
    })
}

struct HashedFile {
    entry: FileEntry,
    size: u64,
}

/// Hashes `files` in parallel. Each task owns its file and its accumulator;
/// the only shared step is the final collect.
fn hash_files(
    root: &Utf8Path,
    files: Vec<Utf8PathBuf>,
    options: &HashOptions,
    cancel: &CancelToken,
) -> Result<(Vec<HashedFile>, Vec<Omission>)> {
    let hash_one = |file_path: Utf8PathBuf| -> Result<HashedFile> {
        cancel.check()?;
        let path = relative_path(root, &file_path);
        // A line break anywhere would not survive the listing's line format.
        if path.contains(['\n', '\r']) {
            return Err(Error::UnlistablePath { path: file_path });
        }
        let (digest, size) = hash_file_counted(&file_path)?;
        debug!(%path, %digest, size, "hashed file");
        Ok(HashedFile {
            entry: FileEntry { path, digest },
            size,
        })
    };

    if !options.best_effort {
        // Short-circuits on the first failure.
        let hashed = files.into_par_iter().map(hash_one).collect::<Result<Vec<_>>>()?;
        return Ok((hashed, Vec::new()));
    }

    let outcomes: Vec<Result<HashedFile>> = files.into_par_iter().map(hash_one).collect();
    let mut hashed = Vec::with_capacity(outcomes.len());
    let mut omissions = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(file) => hashed.push(file),
            Err(Error::Io { path, source }) => {
                warn!(%path, error = %source, "skipping unreadable file");
                omissions.push(Omission {
                    path,
                    reason: source.to_string(),
                });
            }
            Err(e) => return Err(e),
        }
    }
    Ok((hashed, omissions))
}

/// Runs `func` inside a dedicated rayon pool of `num_threads` threads.
fn with_threads<F, R>(num_threads: usize, func: F) -> Result<R>
where
    F: FnOnce() -> R + Send,
    R: Send,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()?;
    Ok(pool.install(func))
}

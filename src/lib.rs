//! Content fingerprints of directory trees.
//!
//! [`hash_directory`] walks a tree, MD5s every file in parallel and folds
//! the sorted results into one aggregate [`Digest`]. The per-file listing
//! can be written out with [`write_listing`], read back with
//! [`load_listing`], and two listings diffed with [`compare`].
//!
//! MD5 here identifies content; it is not a defence against tampering.

mod cancel;
mod compare;
mod error;
mod fs;
mod hasher;
mod listing;
mod options;
mod types;

pub use cancel::CancelToken;
pub use compare::{compare, compare_with_identical, DiffResult};
pub use error::{Error, ParseError, ParseErrorKind, Result};
pub use hasher::{aggregate, hash_directory, hash_directory_cancellable, hash_file};
pub use listing::{load_listing, parse_listing, render_listing, write_listing};
pub use options::{HashOptions, OutputMode};
pub use types::{Digest, DirectoryDigest, FileEntry, Omission};

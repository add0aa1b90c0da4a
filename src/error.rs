use camino::Utf8PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can go wrong while hashing a tree or comparing listings.
#[derive(Debug, Error)]
pub enum Error {
    #[error("no such directory: {path}")]
    NotFound { path: Utf8PathBuf },

    #[error("not a directory: {path}")]
    NotADirectory { path: Utf8PathBuf },

    #[error("failed to read {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("operation cancelled")]
    Cancelled,

    /// A file name contains a line break, which the listing format cannot carry.
    #[error("file name cannot be written to a listing: {path:?}")]
    UnlistablePath { path: Utf8PathBuf },

    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl Error {
    pub(crate) fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

/// A malformed entry in a listing.
///
/// `line` is 1-based and absent when the listing was never text
/// (e.g. entries built in memory and handed to the comparator).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{listing}{}: {kind}", line_suffix(.line))]
pub struct ParseError {
    pub listing: String,
    pub line: Option<usize>,
    pub kind: ParseErrorKind,
}

fn line_suffix(line: &Option<usize>) -> String {
    line.map(|n| format!(":{n}")).unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("expected '<digest>  <path>'")]
    MissingSeparator,

    #[error("invalid digest '{0}'")]
    InvalidDigest(String),

    #[error("empty path")]
    EmptyPath,

    #[error("duplicate entry for '{0}'")]
    DuplicatePath(String),
}

/// What a tree hash should produce for the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// A single digest for the whole tree.
    Aggregate,
    /// One `<digest>  <path>` line per file.
    #[default]
    Listing,
}

/// Every knob `hash_directory` recognizes.
///
/// The defaults never traverse symlinked directories, include hidden
/// entries, and abort on the first unreadable file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashOptions {
    /// Descend into symlinked directories. Each directory is still visited
    /// at most once (by canonical path), so link cycles terminate.
    pub follow_symlinks: bool,
    /// Include entries whose name starts with a dot. An excluded hidden
    /// directory hides everything beneath it.
    pub include_hidden: bool,
    /// Hash symlinks that point at files as if they were the file itself.
    pub include_symlinked_files: bool,
    /// Record unreadable files as omissions instead of failing the hash.
    pub best_effort: bool,
    pub output_mode: OutputMode,
    /// Size of a dedicated rayon pool. `None` uses the global pool.
    pub threads: Option<usize>,
}

impl Default for HashOptions {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            include_hidden: true,
            include_symlinked_files: true,
            best_effort: false,
            output_mode: OutputMode::default(),
            threads: None,
        }
    }
}

use camino::Utf8PathBuf;
use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use md5dir::{HashOptions, OutputMode};

#[derive(Parser, Debug)]
#[command(version, about = "Fingerprint directory trees with MD5 and compare the results")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(long, short, global = true, default_value = "warn", value_enum)]
    pub log_level: LogLevel,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the MD5 of every file beneath DIR, or one digest for the whole tree
    Hash(HashArgs),
    /// Compare two saved listings, or two directories hashed on the spot
    Compare(CompareArgs),
}

#[derive(Args, Debug)]
pub struct HashArgs {
    pub dir: Utf8PathBuf,

    /// Print a single digest for the whole tree instead of one line per file
    #[arg(short = 'u', long)]
    pub aggregate: bool,

    /// Write the result to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<Utf8PathBuf>,

    #[command(flatten)]
    pub walk: WalkArgs,
}

#[derive(Args, Debug)]
#[command(group(
    // Traversal flags only mean something when the inputs are directories.
    ArgGroup::new("walk_flags")
        .args(["exclude_hidden", "follow_symlinks", "skip_symlinked_files", "best_effort", "threads"])
        .multiple(true)
        .requires("dirs")
))]
pub struct CompareArgs {
    /// First listing file (or directory, with --dirs)
    pub a: Utf8PathBuf,
    /// Second listing file (or directory, with --dirs)
    pub b: Utf8PathBuf,

    /// Treat A and B as directories and hash them first
    #[arg(long)]
    pub dirs: bool,

    /// Only compare the aggregate digest of each directory
    #[arg(short = 'u', long, requires = "dirs")]
    pub aggregate: bool,

    /// Write the report to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<Utf8PathBuf>,

    #[command(flatten)]
    pub walk: WalkArgs,
}

/// Traversal flags shared by every command that hashes a tree.
#[derive(Args, Debug, Clone)]
pub struct WalkArgs {
    /// Leave out files and directories whose name starts with a dot
    #[arg(long)]
    pub exclude_hidden: bool,

    /// Descend into symlinked directories (each directory is visited once)
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Ignore symlinks that point at files
    #[arg(long)]
    pub skip_symlinked_files: bool,

    /// Report unreadable files instead of failing
    #[arg(long)]
    pub best_effort: bool,

    /// Number of hashing threads (defaults to one per core)
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,
}

impl From<&WalkArgs> for HashOptions {
    fn from(args: &WalkArgs) -> Self {
        HashOptions {
            follow_symlinks: args.follow_symlinks,
            include_hidden: !args.exclude_hidden,
            include_symlinked_files: !args.skip_symlinked_files,
            best_effort: args.best_effort,
            threads: args.threads,
            ..HashOptions::default()
        }
    }
}

impl From<&HashArgs> for HashOptions {
    fn from(args: &HashArgs) -> Self {
        let output_mode = match args.aggregate {
            true => OutputMode::Aggregate,
            false => OutputMode::Listing,
        };
        HashOptions {
            output_mode,
            ..HashOptions::from(&args.walk)
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum LogLevel {
    Debug,
    Info,
    #[default]
    Warn,
    Error,
    Silent,
}

impl LogLevel {
    pub fn to_tracing_level(self) -> Option<tracing::Level> {
        match self {
            LogLevel::Debug => Some(tracing::Level::DEBUG),
            LogLevel::Info => Some(tracing::Level::INFO),
            LogLevel::Warn => Some(tracing::Level::WARN),
            LogLevel::Error => Some(tracing::Level::ERROR),
            LogLevel::Silent => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn hash_flags_map_to_options() {
        let cli = Cli::parse_from([
            "md5dir",
            "hash",
            "some/dir",
            "-u",
            "--exclude-hidden",
            "--best-effort",
            "-j",
            "3",
        ]);
        let Command::Hash(args) = cli.command else {
            panic!("expected hash command");
        };
        let options = HashOptions::from(&args);
        assert_eq!(
            options,
            HashOptions {
                follow_symlinks: false,
                include_hidden: false,
                include_symlinked_files: true,
                best_effort: true,
                output_mode: OutputMode::Aggregate,
                threads: Some(3),
            }
        );
    }

    #[test]
    fn walk_flags_on_compare_need_dirs() {
        for flags in [&["--best-effort"][..], &["--exclude-hidden"][..], &["-j", "2"][..]] {
            let mut args = vec!["md5dir", "compare", "a", "b"];
            args.extend_from_slice(flags);
            assert!(Cli::try_parse_from(args.clone()).is_err(), "{flags:?}");
            args.push("--dirs");
            assert!(Cli::try_parse_from(args.clone()).is_ok(), "{flags:?}");
        }
        assert!(Cli::try_parse_from(["md5dir", "hash", "d", "--best-effort"]).is_ok());
    }

    #[test]
    fn aggregate_compare_needs_dirs() {
        assert!(Cli::try_parse_from(["md5dir", "compare", "a", "b", "-u"]).is_err());
        assert!(Cli::try_parse_from(["md5dir", "compare", "a", "b", "-u", "--dirs"]).is_ok());
    }
}

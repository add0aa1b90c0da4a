mod cli;

use clap::Parser as _;
use cli::{Cli, Command, CompareArgs, HashArgs, LogLevel};
use md5dir::{Error, HashOptions};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Whether the command found the two sides to match.
enum Outcome {
    Same,
    Different,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_tracing(cli.log_level);
    debug!("Parsed CLI arguments: {cli:?}");

    let result = match &cli.command {
        Command::Hash(args) => hash(args),
        Command::Compare(args) => compare(args),
    };
    match result {
        Ok(Outcome::Same) => ExitCode::SUCCESS,
        Ok(Outcome::Different) => ExitCode::from(1),
        Err(e) => {
            eprintln!("md5dir: {e}");
            ExitCode::from(2)
        }
    }
}

fn setup_tracing(log_level: LogLevel) {
    if let Some(level) = log_level.to_tracing_level() {
        // RUST_LOG, when set, takes precedence over --log-level.
        let filter = EnvFilter::builder()
            .with_default_directive(LevelFilter::from_level(level).into())
            .from_env_lossy();
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .without_time()
            .compact()
            .init();
    }
}

fn hash(args: &HashArgs) -> md5dir::Result<Outcome> {
    const MEG: f64 = (1 << 20) as f64;

    let options = HashOptions::from(args);
    let (res, time) = time(|| md5dir::hash_directory(&args.dir, &options));
    let res = res?;
    info!(
        "{} files, {} bytes in {:.2} s ({:.2} MiB/s)",
        res.len(),
        res.size,
        time,
        res.size as f64 / time / MEG
    );
    emit(args.output.as_ref(), &res.render(options.output_mode))?;
    Ok(Outcome::Same)
}

fn compare(args: &CompareArgs) -> md5dir::Result<Outcome> {
    let (a, b) = match args.dirs {
        true => {
            let options = HashOptions::from(&args.walk);
            let a = md5dir::hash_directory(&args.a, &options)?;
            let b = md5dir::hash_directory(&args.b, &options)?;
            if args.aggregate {
                return compare_aggregates(args, &a, &b);
            }
            (a.entries, b.entries)
        }
        false => (md5dir::load_listing(&args.a)?, md5dir::load_listing(&args.b)?),
    };

    let diff = md5dir::compare(&a, &b)?;
    info!(
        only_in_a = diff.only_in_a.len(),
        only_in_b = diff.only_in_b.len(),
        differing = diff.differing.len(),
        identical = diff.identical_count,
        "compared listings"
    );
    emit(args.output.as_ref(), &diff.render())?;
    Ok(match diff.is_identical() {
        true => Outcome::Same,
        false => Outcome::Different,
    })
}

fn compare_aggregates(
    args: &CompareArgs,
    a: &md5dir::DirectoryDigest,
    b: &md5dir::DirectoryDigest,
) -> md5dir::Result<Outcome> {
    let same = a.same_content_as(b);
    let verdict = match same {
        true => "identical",
        false => "differing",
    };
    let report = format!("A: {}\nB: {}\n{verdict}\n", a.digest, b.digest);
    emit(args.output.as_ref(), &report)?;
    Ok(match same {
        true => Outcome::Same,
        false => Outcome::Different,
    })
}

/// Writes `text` to `output`, or to stdout when no file was given.
fn emit(output: Option<&camino::Utf8PathBuf>, text: &str) -> md5dir::Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, text).map_err(|source| Error::Io {
                path: path.clone(),
                source,
            })?;
            info!(%path, "wrote result");
        }
        None => print!("{text}"),
    }
    Ok(())
}

#[inline(always)]
fn time<F, R>(func: F) -> (R, f64)
where
    F: FnOnce() -> R,
{
    let start = std::time::Instant::now();
    let res = func();
    (res, start.elapsed().as_secs_f64())
}

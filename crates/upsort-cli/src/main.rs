use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use upsort_core::{Config, HistoryCache, SortError, cached_history, resolve_heads, sort_mapping};
use upsort_git::GixBackend;

mod dump;
mod input;

/// Sort input lines by upstream integration order
///
/// Reads lines from standard input; the first whitespace-delimited token
/// of each line names a commit (full hash, abbreviated hash, or any other
/// rev-parse spelling), and the rest of the line is carried along as-is.
/// Lines are printed back in the order their commits were integrated into
/// the configured upstream branches, highest-priority upstream first.
///
/// Heads are declared in upsort.toml (current directory, then the user
/// config directory). When none of the declared upstreams is configured as
/// a remote, sorting falls back to the commits reachable from HEAD.
///
/// Lines whose commit is valid but not reachable from any configured head
/// are listed verbatim on stderr and the exit status is non-zero.
#[derive(Parser)]
#[command(name = "upsort")]
#[command(version, about)]
struct Cli {
    /// Print the branch heads used for sorting (debugging)
    #[arg(short = 'd', long)]
    dump_heads: bool,

    /// Configuration file to use, bypassing the search path
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Repository to sort against (overrides GIT_DIR and the config key)
    #[arg(long, value_name = "PATH")]
    git_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::find()?.1,
    };
    let git = open_repository(cli, &config)?;
    let cache =
        HistoryCache::default_location().context("could not determine the user cache directory")?;

    if cli.dump_heads {
        dump::run(&config, &git, &cache)?;
        return Ok(ExitCode::SUCCESS);
    }

    let mapping = input::read_mapping(io::stdin().lock(), &git)?;

    let heads = resolve_heads(&config, &git)?;
    let history = cached_history(&heads, &git, &cache)?;
    let (sorted, residual) = sort_mapping(&history, mapping);

    let mut out = io::stdout().lock();
    for entry in &sorted {
        for line in &entry.payloads {
            writeln!(out, "{line}")?;
        }
    }
    out.flush()?;

    let leftovers = residual.into_leftovers();
    if leftovers.is_empty() {
        return Ok(ExitCode::SUCCESS);
    }
    eprintln!("error: the following entries were not found in the indexed heads:");
    for (_, payloads) in &leftovers {
        for line in payloads {
            eprintln!("{line}");
        }
    }
    Ok(ExitCode::FAILURE)
}

/// Locate the repository: `--git-dir`, then `GIT_DIR`, then the config
/// key, then upward discovery from the current directory.
fn open_repository(cli: &Cli, config: &Config) -> Result<GixBackend, SortError> {
    let explicit = cli
        .git_dir
        .clone()
        .or_else(|| std::env::var_os("GIT_DIR").map(PathBuf::from))
        .or_else(|| config.git_dir.clone());
    let git = match explicit {
        Some(path) => {
            tracing::debug!(path = %path.display(), "opening repository");
            GixBackend::open(&path)?
        }
        None => GixBackend::discover(Path::new("."))?,
    };
    Ok(git)
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

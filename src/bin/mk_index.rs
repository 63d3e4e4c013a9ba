//! `mk-index`: walks one or more file or directory paths and builds a
//! persistent inverted N-gram index.

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use ngrex::engine::{IndexEngine, DEFAULT_NGRAM_LEN};
use ngrex::walk;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

/// Generate a text search index from the given PATHS.
#[derive(Parser)]
#[command(name = "mk-index", version)]
struct Cli {
    /// One or more file or directory paths to index.
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Print more verbose output to stderr. Repeat for trace logging.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Write the index to PATH instead of standard output.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    ngrex::logging::init(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> io::Result<()> {
    let mut engine = IndexEngine::new(DEFAULT_NGRAM_LEN);

    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} indexed {pos} file(s): {msg}")
            .unwrap(),
    );

    for entry in walk::walk_roots(cli.paths) {
        let path_display = entry.path.display().to_string();
        progress.set_message(path_display.clone());
        progress.inc(1);

        let path_bytes = path_to_bytes(&entry.path);
        match engine.ingest(entry.file, &path_bytes) {
            Ok(count) => log::debug!("ingested '{}': {} ngram(s)", path_display, count),
            Err(e) => log::warn!("failed to read '{}': {}", path_display, e),
        }
    }
    progress.finish_and_clear();

    log::info!(
        "built index over {} distinct ngram(s)",
        engine.posting_index().ngram_count()
    );

    match &cli.output {
        Some(path) => {
            let file = File::create(path)?;
            let mut writer = BufWriter::new(file);
            engine.save(&mut writer)?;
            writer.flush()?;
        }
        None => {
            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            engine.save(&mut writer)?;
            writer.flush()?;
        }
    }

    Ok(())
}

#[cfg(unix)]
fn path_to_bytes(path: &std::path::Path) -> Vec<u8> {
    use std::os::unix::ffi::OsStrExt;
    path.as_os_str().as_bytes().to_vec()
}

#[cfg(not(unix))]
fn path_to_bytes(path: &std::path::Path) -> Vec<u8> {
    path.to_string_lossy().into_owned().into_bytes()
}

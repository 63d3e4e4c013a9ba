//! `search`: loads an index and prints annotated matches for a query
//! string.

use clap::Parser;
use ngrex::engine::{IndexEngine, DEFAULT_NGRAM_LEN, DEFAULT_VERIFY_BUFFER};
use ngrex::error::{LoadError, SearchError};
use ngrex::matcher::LiteralMatcher;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

const EXIT_HITS: u8 = 0;
const EXIT_NO_HITS: u8 = 1;
const EXIT_QUERY_TOO_SHORT: u8 = 2;
const EXIT_LOAD_FAILED: u8 = 3;

/// Query an index, printing annotated hits for SEARCH_STRING.
#[derive(Parser)]
#[command(name = "search", version)]
struct Cli {
    /// The string to search for (must be at least N bytes long).
    query: String,

    /// Print more verbose output to stderr. Repeat for trace logging.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Read the index from PATH instead of standard input.
    #[arg(short, long)]
    index: Option<PathBuf>,

    /// Wrap printed hits in terminal color escapes.
    #[arg(short, long)]
    color: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    ngrex::logging::init(cli.verbose);

    match run(cli) {
        Ok(hit_count) => {
            if hit_count > 0 {
                ExitCode::from(EXIT_HITS)
            } else {
                ExitCode::from(EXIT_NO_HITS)
            }
        }
        Err(SearchError::QueryTooShort { len, n }) => {
            log::error!("query string of length {len} is shorter than N={n}");
            ExitCode::from(EXIT_QUERY_TOO_SHORT)
        }
        Err(SearchError::Load(e)) => {
            log::error!("failed to load index: {e}");
            ExitCode::from(EXIT_LOAD_FAILED)
        }
        Err(SearchError::Io(e)) => {
            log::error!("io error: {e}");
            ExitCode::from(EXIT_LOAD_FAILED)
        }
    }
}

fn run(cli: Cli) -> Result<u64, SearchError> {
    let query = cli.query.as_bytes();
    if query.len() < DEFAULT_NGRAM_LEN {
        return Err(SearchError::QueryTooShort {
            len: query.len(),
            n: DEFAULT_NGRAM_LEN,
        });
    }
    log::debug!("processing query string \"{}\"", cli.query);

    let engine = load_engine(&cli.index)?;

    let matcher = LiteralMatcher::new(query);
    let stdout = io::stdout();
    let mut sink = BufWriter::new(stdout.lock());
    let hit_count = engine.search(query, &matcher, DEFAULT_VERIFY_BUFFER, cli.color, &mut sink)?;
    sink.flush().map_err(SearchError::Io)?;

    Ok(hit_count)
}

fn load_engine(index_path: &Option<PathBuf>) -> Result<IndexEngine, LoadError> {
    match index_path {
        Some(path) => {
            log::debug!("loading index from '{}'", path.display());
            let file = File::open(path)?;
            IndexEngine::load(BufReader::new(file), DEFAULT_NGRAM_LEN)
        }
        None => {
            log::debug!("loading index from standard input");
            let stdin = io::stdin();
            IndexEngine::load(BufReader::new(stdin.lock()), DEFAULT_NGRAM_LEN)
        }
    }
}

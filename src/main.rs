//! Command-line shell around the chess browser core.
//!
//! `upload` reads PGN files (glob patterns allowed), parses them and reconciles
//! the games into a DuckDB file, printing progress as it goes. `query` prints
//! the report for a set of filters.

use anyhow::{Context, Result, bail};
use chess_browser::chess::log;
use chess_browser::{
    CompressionMode, FilterSpec, GameResult, InputError, ReadOptions, open_database, parse,
    query, read_pgn_file, reconcile,
};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "chess-browser", about = "Load PGN games into DuckDB and query them")]
struct Cli {
    /// DuckDB database file.
    #[arg(long, global = true, default_value = "chess.duckdb")]
    db: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse PGN files and upsert their games.
    Upload(UploadArgs),
    /// Print games matching the given filters.
    Query(QueryArgs),
}

#[derive(Args)]
struct UploadArgs {
    /// PGN files or glob patterns.
    #[arg(required = true)]
    patterns: Vec<String>,

    /// Input compression (only `zstd` is supported).
    #[arg(long, value_parser = parse_compression)]
    compression: Option<CompressionMode>,

    /// Per-file size cap in bytes; 0 disables it.
    #[arg(long, default_value_t = chess_browser::chess::DEFAULT_MAX_BYTES)]
    max_bytes: u64,
}

#[derive(Args)]
struct QueryArgs {
    #[arg(long, default_value = "")]
    white: String,

    #[arg(long, default_value = "")]
    black: String,

    /// Leading moves, e.g. "1.e4 c5".
    #[arg(long, default_value = "")]
    opening: String,

    /// W, B or D.
    #[arg(long, value_parser = parse_winner)]
    winner: Option<GameResult>,

    /// First event date (YYYY-MM-DD), inclusive.
    #[arg(long, requires = "end")]
    start: Option<NaiveDate>,

    /// Last event date (YYYY-MM-DD), inclusive.
    #[arg(long, requires = "start")]
    end: Option<NaiveDate>,

    /// Include move text in the report.
    #[arg(long)]
    show_moves: bool,
}

fn parse_compression(raw: &str) -> Result<CompressionMode, InputError> {
    CompressionMode::parse(raw)
}

fn parse_winner(raw: &str) -> Result<GameResult, String> {
    GameResult::from_code(raw).ok_or_else(|| format!("expected W, B or D, got '{raw}'"))
}

fn expand_patterns(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for pattern in patterns {
        let before = paths.len();
        for entry in glob::glob(pattern).with_context(|| format!("invalid pattern '{pattern}'"))? {
            paths.push(entry?);
        }
        if paths.len() == before {
            bail!("no files match '{pattern}'");
        }
    }
    Ok(paths)
}

fn run_upload(db: &Path, args: UploadArgs) -> Result<()> {
    let options = ReadOptions {
        compression: args.compression.unwrap_or_default(),
        max_bytes: (args.max_bytes > 0).then_some(args.max_bytes),
    };

    let mut lines = Vec::new();
    for path in expand_patterns(&args.patterns)? {
        tracing::info!(path = %path.display(), "Reading PGN");
        let mut file_lines = read_pgn_file(&path, &options)?;
        // Keep games from adjacent files apart.
        file_lines.push(String::new());
        lines.append(&mut file_lines);
    }

    let games = parse(&lines);
    let mut store = open_database(db)?;

    let mut stderr = std::io::stderr();
    let summary = reconcile(&games, &mut store, |percent| {
        let _ = write!(stderr, "\rUploading... {percent:>3}%");
        let _ = stderr.flush();
    })
    .with_context(|| format!("upload into '{}' failed", db.display()))?;
    if !games.is_empty() {
        eprintln!();
    }

    println!(
        "{} games parsed: {} inserted, {} updated, {} unchanged",
        games.len(),
        summary.games_inserted,
        summary.games_updated,
        summary.games_unchanged
    );
    Ok(())
}

fn run_query(db: &Path, args: QueryArgs) -> Result<()> {
    let filters = FilterSpec {
        white: args.white,
        black: args.black,
        opening: args.opening,
        winner: args.winner,
        date_range: args.start.zip(args.end),
        show_moves: args.show_moves,
    };
    let store = open_database(db)?;
    let report = query(&filters, &store)?;
    print!("{}", report.text);
    Ok(())
}

fn main() -> Result<()> {
    log::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Upload(args) => run_upload(&cli.db, args),
        Commands::Query(args) => run_query(&cli.db, args),
    }
}

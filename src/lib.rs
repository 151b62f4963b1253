//! Chess game browser core: PGN ingestion, idempotent persistence into DuckDB,
//! and filtered retrieval of stored games.

pub mod chess;

pub use chess::{
    CompressionMode, DuckDbStore, FilterSpec, GameRecord, GameResult, GameStore, InputError,
    QueryReport, ReadOptions, ReconcileSummary, StorageError, clean_movetext, open_database,
    open_memory, parse, parse_str, query, read_pgn_file, reconcile,
};

mod dates;
mod error;
mod filter;
pub mod log;
mod query;
mod reader;
mod reconcile;
mod store;
mod types;

pub(crate) use error::ErrorAccumulator;
pub use error::{InputError, StorageError};
pub use filter::clean_movetext;
pub use query::{Clause, FilterSpec, Predicate, QueryReport, query};
pub use reader::{
    CompressionMode, DEFAULT_MAX_BYTES, PgnReader, ReadOptions, parse, parse_str, read_pgn_file,
    split_lines,
};
pub use reconcile::{ReconcileSummary, reconcile};
pub use store::{
    DuckDbStore, EventKey, GameKey, GameReportRow, GameStore, PlayerRow, StoredGame,
    open_database, open_memory,
};
pub use types::{GameRecord, GameResult};

//! Storage seam for players, events and games.
//!
//! [`GameStore`] exposes the point lookups, conditional updates, inserts and
//! the joined filtered read that reconciliation and querying need. The DuckDB
//! implementation lives in [`DuckDbStore`]; other backends only have to
//! translate the same calls.

mod database;
mod schema;

pub use database::{DuckDbStore, open_database, open_memory};

use super::{GameResult, Predicate, StorageError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerRow {
    pub id: i64,
    pub name: String,
    pub elo: u32,
}

/// Composite unique key of an event. `date` is already normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventKey {
    pub name: String,
    pub site: String,
    pub date: String,
}

/// Composite unique key of a game.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GameKey {
    pub round: String,
    pub white_player_id: i64,
    pub black_player_id: i64,
    pub event_id: i64,
}

/// Mutable columns of a stored game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredGame {
    pub result: GameResult,
    pub moves: String,
}

/// One game joined with its players and event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameReportRow {
    pub event_name: String,
    pub site: String,
    pub event_date: String,
    pub white_name: String,
    pub white_elo: u32,
    pub black_name: String,
    pub black_elo: u32,
    pub result: GameResult,
    pub moves: String,
}

/// Relational store used by [`reconcile`](crate::chess::reconcile) and
/// [`query`](crate::chess::query).
///
/// Implementations are single-writer: nothing here makes concurrent
/// reconciliation against one store safe.
pub trait GameStore {
    /// Open the transaction scope covering one record.
    fn begin_record(&mut self) -> Result<(), StorageError>;
    fn commit_record(&mut self) -> Result<(), StorageError>;
    fn rollback_record(&mut self) -> Result<(), StorageError>;

    fn find_player(&self, name: &str) -> Result<Option<PlayerRow>, StorageError>;
    /// Returns the generated player id.
    fn insert_player(&mut self, name: &str, elo: u32) -> Result<i64, StorageError>;
    fn update_player_elo(&mut self, id: i64, elo: u32) -> Result<(), StorageError>;

    fn find_event(&self, key: &EventKey) -> Result<Option<i64>, StorageError>;
    /// Returns the generated event id.
    fn insert_event(&mut self, key: &EventKey) -> Result<i64, StorageError>;

    fn find_game(&self, key: &GameKey) -> Result<Option<StoredGame>, StorageError>;
    fn update_game(&mut self, key: &GameKey, game: &StoredGame) -> Result<(), StorageError>;
    fn insert_game(&mut self, key: &GameKey, game: &StoredGame) -> Result<(), StorageError>;

    /// All games matching every clause of `predicate`.
    fn select_games(&self, predicate: &Predicate) -> Result<Vec<GameReportRow>, StorageError>;
}

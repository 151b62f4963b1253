use super::{
    EventKey, GameKey, GameReportRow, GameStore, PlayerRow, StoredGame, schema::create_schema,
};
use crate::chess::{Clause, GameResult, Predicate, StorageError, dates::format_stored_date};
use duckdb::{Connection, params, params_from_iter};
use std::path::Path;
use tracing::debug;

const SELECT_GAMES_SQL: &str = "SELECT e.name, e.site, e.event_date, w.name, w.elo, b.name, b.elo, g.result, g.moves
     FROM games g
     JOIN players w ON w.id = g.white_player_id
     JOIN players b ON b.id = g.black_player_id
     JOIN events e ON e.id = g.event_id";

/// [`GameStore`] backed by a DuckDB connection.
///
/// The connection is closed when the store is dropped.
pub struct DuckDbStore {
    conn: Connection,
}

/// Open or create a database file with the schema in place.
pub fn open_database(path: &Path) -> Result<DuckDbStore, StorageError> {
    debug!(path = %path.display(), "Opening DuckDB store");
    DuckDbStore::new(Connection::open(path)?)
}

/// In-memory database with the schema in place.
pub fn open_memory() -> Result<DuckDbStore, StorageError> {
    DuckDbStore::new(Connection::open_in_memory()?)
}

impl DuckDbStore {
    pub fn new(conn: Connection) -> Result<Self, StorageError> {
        create_schema(&conn)?;
        Ok(Self { conn })
    }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }
}

fn optional<T>(result: duckdb::Result<T>) -> Result<Option<T>, StorageError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn elo_from_sql(value: i64) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

fn result_from_sql(code: &str) -> Result<GameResult, StorageError> {
    GameResult::from_code(code).ok_or_else(|| StorageError::InvalidResult(code.to_string()))
}

fn result_to_sql(result: GameResult) -> Result<&'static str, StorageError> {
    result
        .code()
        .ok_or_else(|| StorageError::InvalidResult(result.to_string()))
}

/// Translate clauses into a `WHERE` fragment and its bound values, in order.
fn predicate_sql(predicate: &Predicate) -> (String, Vec<String>) {
    let mut conditions = Vec::with_capacity(predicate.clauses().len());
    let mut values = Vec::with_capacity(predicate.clauses().len() + 1);

    for clause in predicate.clauses() {
        match clause {
            Clause::WhiteName(name) => {
                conditions.push("w.name = ?");
                values.push(name.clone());
            }
            Clause::BlackName(name) => {
                conditions.push("b.name = ?");
                values.push(name.clone());
            }
            Clause::OpeningPrefix(prefix) => {
                conditions.push("starts_with(g.moves, ?)");
                values.push(prefix.clone());
            }
            Clause::Winner(result) => {
                conditions.push("g.result = ?");
                values.push(result.to_string());
            }
            Clause::EventDateBetween { start, end } => {
                conditions.push("e.event_date BETWEEN ? AND ?");
                values.push(format_stored_date(*start));
                values.push(format_stored_date(*end));
            }
        }
    }

    if conditions.is_empty() {
        (String::new(), values)
    } else {
        (format!(" WHERE {}", conditions.join(" AND ")), values)
    }
}

impl GameStore for DuckDbStore {
    fn begin_record(&mut self) -> Result<(), StorageError> {
        self.conn.execute_batch("BEGIN TRANSACTION")?;
        Ok(())
    }

    fn commit_record(&mut self) -> Result<(), StorageError> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    fn rollback_record(&mut self) -> Result<(), StorageError> {
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }

    fn find_player(&self, name: &str) -> Result<Option<PlayerRow>, StorageError> {
        optional(self.conn.query_row(
            "SELECT id, name, elo FROM players WHERE name = ?",
            params![name],
            |row| {
                Ok(PlayerRow {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    elo: elo_from_sql(row.get(2)?),
                })
            },
        ))
    }

    fn insert_player(&mut self, name: &str, elo: u32) -> Result<i64, StorageError> {
        let id = self.conn.query_row(
            "INSERT INTO players (name, elo) VALUES (?, ?) RETURNING id",
            params![name, i64::from(elo)],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    fn update_player_elo(&mut self, id: i64, elo: u32) -> Result<(), StorageError> {
        self.conn.execute(
            "UPDATE players SET elo = ? WHERE id = ?",
            params![i64::from(elo), id],
        )?;
        Ok(())
    }

    fn find_event(&self, key: &EventKey) -> Result<Option<i64>, StorageError> {
        optional(self.conn.query_row(
            "SELECT id FROM events WHERE name = ? AND site = ? AND event_date = ?",
            params![key.name, key.site, key.date],
            |row| row.get(0),
        ))
    }

    fn insert_event(&mut self, key: &EventKey) -> Result<i64, StorageError> {
        let id = self.conn.query_row(
            "INSERT INTO events (name, site, event_date) VALUES (?, ?, ?) RETURNING id",
            params![key.name, key.site, key.date],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    fn find_game(&self, key: &GameKey) -> Result<Option<StoredGame>, StorageError> {
        let row = optional(self.conn.query_row(
            "SELECT result, moves FROM games
             WHERE round = ? AND white_player_id = ? AND black_player_id = ? AND event_id = ?",
            params![
                key.round,
                key.white_player_id,
                key.black_player_id,
                key.event_id
            ],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
        ))?;

        row.map(|(code, moves)| {
            Ok(StoredGame {
                result: result_from_sql(&code)?,
                moves,
            })
        })
        .transpose()
    }

    fn update_game(&mut self, key: &GameKey, game: &StoredGame) -> Result<(), StorageError> {
        self.conn.execute(
            "UPDATE games SET result = ?, moves = ?
             WHERE round = ? AND white_player_id = ? AND black_player_id = ? AND event_id = ?",
            params![
                result_to_sql(game.result)?,
                game.moves,
                key.round,
                key.white_player_id,
                key.black_player_id,
                key.event_id
            ],
        )?;
        Ok(())
    }

    fn insert_game(&mut self, key: &GameKey, game: &StoredGame) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO games (round, result, moves, white_player_id, black_player_id, event_id)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                key.round,
                result_to_sql(game.result)?,
                game.moves,
                key.white_player_id,
                key.black_player_id,
                key.event_id
            ],
        )?;
        Ok(())
    }

    fn select_games(&self, predicate: &Predicate) -> Result<Vec<GameReportRow>, StorageError> {
        let (where_sql, values) = predicate_sql(predicate);
        let sql = format!("{SELECT_GAMES_SQL}{where_sql} ORDER BY g.id");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), |row| {
            Ok((
                GameReportRow {
                    event_name: row.get(0)?,
                    site: row.get(1)?,
                    event_date: row.get(2)?,
                    white_name: row.get(3)?,
                    white_elo: elo_from_sql(row.get(4)?),
                    black_name: row.get(5)?,
                    black_elo: elo_from_sql(row.get(6)?),
                    result: GameResult::Unknown,
                    moves: row.get(8)?,
                },
                row.get::<_, String>(7)?,
            ))
        })?;

        let mut games = Vec::new();
        for row in rows {
            let (mut game, code) = row?;
            game.result = result_from_sql(&code)?;
            games.push(game);
        }
        Ok(games)
    }
}

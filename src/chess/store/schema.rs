use duckdb::Connection;

/// Create sequences, tables and unique keys if they don't exist.
pub(super) fn create_schema(conn: &Connection) -> duckdb::Result<()> {
    conn.execute_batch(SCHEMA_SQL)
}

const SCHEMA_SQL: &str = r#"
CREATE SEQUENCE IF NOT EXISTS players_id_seq START 1;
CREATE SEQUENCE IF NOT EXISTS events_id_seq START 1;
CREATE SEQUENCE IF NOT EXISTS games_id_seq START 1;

CREATE TABLE IF NOT EXISTS players (
    id BIGINT PRIMARY KEY DEFAULT nextval('players_id_seq'),
    name VARCHAR NOT NULL UNIQUE,
    elo BIGINT NOT NULL DEFAULT 0
);

-- event_date is YYYY-MM-DD, or 0000-00-00 when unknown
CREATE TABLE IF NOT EXISTS events (
    id BIGINT PRIMARY KEY DEFAULT nextval('events_id_seq'),
    name VARCHAR NOT NULL,
    site VARCHAR NOT NULL,
    event_date VARCHAR NOT NULL,
    UNIQUE (name, site, event_date)
);

-- result is W, B or D
CREATE TABLE IF NOT EXISTS games (
    id BIGINT PRIMARY KEY DEFAULT nextval('games_id_seq'),
    round VARCHAR NOT NULL,
    result VARCHAR NOT NULL,
    moves VARCHAR NOT NULL,
    white_player_id BIGINT NOT NULL,
    black_player_id BIGINT NOT NULL,
    event_id BIGINT NOT NULL,
    UNIQUE (round, white_player_id, black_player_id, event_id)
);
"#;

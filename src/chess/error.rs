use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure opening the store or executing a statement against it.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),
    #[error("stored game has unrecognized result code '{0}'")]
    InvalidResult(String),
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Failure loading PGN text from disk.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Failed to open file '{}': {source}", path.display())]
    Open { path: PathBuf, source: io::Error },
    #[error("Failed to initialize zstd decoder for '{}': {source}", path.display())]
    Decoder { path: PathBuf, source: io::Error },
    #[error("Failed to read '{}': {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("'{}' exceeds the {limit} byte upload limit", path.display())]
    TooLarge { path: PathBuf, limit: u64 },
    #[error("Invalid compression value '{0}'. Supported values: 'zstd' or omitted.")]
    Compression(String),
}

/// Joins diagnostic messages with `; `.
#[derive(Debug, Clone, Default)]
pub struct ErrorAccumulator(Option<String>);

impl ErrorAccumulator {
    pub fn push(&mut self, msg: &str) {
        match &mut self.0 {
            Some(existing) => {
                existing.push_str("; ");
                existing.push_str(msg);
            }
            None => self.0 = Some(msg.to_string()),
        }
    }

    pub fn take(&mut self) -> Option<String> {
        self.0.take()
    }
}

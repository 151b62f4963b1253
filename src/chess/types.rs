use super::ErrorAccumulator;
use std::fmt;

/// Stored placeholder for an event date that is absent or only partially known.
pub const UNKNOWN_EVENT_DATE: &str = "0000-00-00";

/// Outcome of a game as decoded from the `Result` tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum GameResult {
    White,
    Black,
    Draw,
    #[default]
    Unknown,
}

impl GameResult {
    /// Decode a PGN `Result` tag value. Anything other than a decisive or
    /// drawn result (including `*`) is `Unknown`.
    pub fn from_tag(value: &str) -> Self {
        match value {
            "1-0" => Self::White,
            "0-1" => Self::Black,
            "1/2-1/2" => Self::Draw,
            _ => Self::Unknown,
        }
    }

    /// Single-letter code used in storage and in winner filters.
    pub fn code(self) -> Option<&'static str> {
        match self {
            Self::White => Some("W"),
            Self::Black => Some("B"),
            Self::Draw => Some("D"),
            Self::Unknown => None,
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "W" | "w" => Some(Self::White),
            "B" | "b" => Some(Self::Black),
            "D" | "d" => Some(Self::Draw),
            _ => None,
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code().unwrap_or("?"))
    }
}

/// One game parsed from a PGN block, after field-level cleanup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRecord {
    pub event_name: String,
    pub site: String,
    pub date: String,
    pub round: String,
    pub white: String,
    pub black: String,
    pub white_elo: u32,
    pub black_elo: u32,
    pub result: GameResult,
    pub event_date: String,
    /// Movetext without move numbers, comments or variations.
    pub moves: String,
}

impl Default for GameRecord {
    fn default() -> Self {
        Self {
            event_name: String::new(),
            site: String::new(),
            date: String::new(),
            round: String::new(),
            white: String::new(),
            black: String::new(),
            white_elo: 0,
            black_elo: 0,
            result: GameResult::Unknown,
            event_date: UNKNOWN_EVENT_DATE.to_string(),
            moves: String::new(),
        }
    }
}

impl GameRecord {
    pub fn is_valid(&self) -> bool {
        !self.white.is_empty() && !self.black.is_empty() && self.result != GameResult::Unknown
    }

    /// Collect the reasons this record would be rejected by [`GameRecord::is_valid`].
    pub(crate) fn collect_defects(&self, defects: &mut ErrorAccumulator) {
        if self.white.is_empty() {
            defects.push("missing White");
        }
        if self.black.is_empty() {
            defects.push("missing Black");
        }
        if self.result == GameResult::Unknown {
            defects.push("undecodable Result");
        }
    }
}

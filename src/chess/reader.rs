use super::{
    ErrorAccumulator, InputError, clean_movetext,
    types::{GameRecord, GameResult, UNKNOWN_EVENT_DATE},
};
use regex::Regex;
use std::fs::File;
use std::io::Read;
use std::mem;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;
use zstd::stream::read::Decoder as ZstdDecoder;

/// Upload cap applied by [`ReadOptions::default`].
pub const DEFAULT_MAX_BYTES: u64 = 1_000_000;

static TAG_PAIR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\[(\w+) "(.+?)"\]"#).expect("valid tag pair regex"));

type PgnInput = Box<dyn Read>;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum CompressionMode {
    #[default]
    Plain,
    Zstd,
}

impl CompressionMode {
    pub fn parse(raw: &str) -> Result<Self, InputError> {
        let normalized = raw.trim();
        if normalized.eq_ignore_ascii_case("zstd") {
            Ok(Self::Zstd)
        } else {
            Err(InputError::Compression(normalized.to_string()))
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ReadOptions {
    pub compression: CompressionMode,
    /// Maximum decoded size in bytes; `None` disables the cap.
    pub max_bytes: Option<u64>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            compression: CompressionMode::Plain,
            max_bytes: Some(DEFAULT_MAX_BYTES),
        }
    }
}

fn open_input_stream(path: &Path, compression: CompressionMode) -> Result<PgnInput, InputError> {
    let file = File::open(path).map_err(|source| InputError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    match compression {
        CompressionMode::Plain => Ok(Box::new(file)),
        CompressionMode::Zstd => ZstdDecoder::new(file)
            .map(|decoder| Box::new(decoder) as PgnInput)
            .map_err(|source| InputError::Decoder {
                path: path.to_path_buf(),
                source,
            }),
    }
}

/// Read a PGN file into lines, enforcing the configured size cap.
///
/// Invalid UTF-8 is replaced rather than rejected.
pub fn read_pgn_file(path: &Path, options: &ReadOptions) -> Result<Vec<String>, InputError> {
    let input = open_input_stream(path, options.compression)?;
    let mut bytes = Vec::new();
    let read_result = match options.max_bytes {
        Some(limit) => input.take(limit.saturating_add(1)).read_to_end(&mut bytes),
        None => {
            let mut input = input;
            input.read_to_end(&mut bytes)
        }
    };
    read_result.map_err(|source| InputError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(limit) = options.max_bytes
        && bytes.len() as u64 > limit
    {
        return Err(InputError::TooLarge {
            path: path.to_path_buf(),
            limit,
        });
    }

    let text = String::from_utf8_lossy(&bytes);
    Ok(split_lines(&text).into_iter().map(str::to_string).collect())
}

/// Split on `\r\n`, `\r` or `\n`. A trailing terminator yields a final empty line.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut rest = text;
    while let Some(pos) = rest.find(['\r', '\n']) {
        lines.push(&rest[..pos]);
        let terminator_len = if rest[pos..].starts_with("\r\n") { 2 } else { 1 };
        rest = &rest[pos + terminator_len..];
    }
    lines.push(rest);
    lines
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ReaderState {
    ReadingTags,
    ReadingMoves,
}

/// Line-driven PGN reader.
///
/// Tag lines fill the current record; any other non-blank line is movetext.
/// A blank line after movetext closes the game. Blocks that end up without
/// both players or a decisive/drawn result are dropped.
pub struct PgnReader {
    state: ReaderState,
    current: GameRecord,
    movetext: String,
    games: Vec<GameRecord>,
    dropped: usize,
}

impl Default for PgnReader {
    fn default() -> Self {
        Self::new()
    }
}

impl PgnReader {
    pub fn new() -> Self {
        Self {
            state: ReaderState::ReadingTags,
            current: GameRecord::default(),
            movetext: String::new(),
            games: Vec::new(),
            dropped: 0,
        }
    }

    pub fn push_line(&mut self, line: &str) {
        let line = line.trim();

        if line.is_empty() {
            if self.state == ReaderState::ReadingMoves && !self.movetext.is_empty() {
                self.close_game();
            }
            return;
        }

        if line.starts_with('[') {
            self.apply_tag_line(line);
        } else {
            self.state = ReaderState::ReadingMoves;
            if !self.movetext.is_empty() {
                self.movetext.push(' ');
            }
            self.movetext.push_str(line);
        }
    }

    /// Close any unterminated game and return every accepted record in input order.
    pub fn finish(mut self) -> Vec<GameRecord> {
        if !self.movetext.is_empty() {
            self.close_game();
        }
        if self.dropped > 0 {
            debug!(dropped = self.dropped, "Skipped incomplete PGN blocks");
        }
        self.games
    }

    #[cfg(test)]
    pub(crate) fn dropped(&self) -> usize {
        self.dropped
    }

    fn apply_tag_line(&mut self, line: &str) {
        let Some(captures) = TAG_PAIR_RE.captures(line) else {
            return;
        };
        let (name, value) = (&captures[1], &captures[2]);
        let game = &mut self.current;

        match name {
            "Event" => game.event_name = value.to_string(),
            "Site" => {
                game.site = if value == "?" {
                    "Unknown".to_string()
                } else {
                    value.to_string()
                }
            }
            "Date" => game.date = value.to_string(),
            "Round" => {
                game.round = if value.contains("??") {
                    "0".to_string()
                } else {
                    value.to_string()
                }
            }
            "White" => game.white = value.to_string(),
            "Black" => game.black = value.to_string(),
            "WhiteElo" => game.white_elo = value.trim().parse().unwrap_or(0),
            "BlackElo" => game.black_elo = value.trim().parse().unwrap_or(0),
            "Result" => game.result = GameResult::from_tag(value),
            "EventDate" => {
                game.event_date = if value.contains("??") {
                    UNKNOWN_EVENT_DATE.to_string()
                } else {
                    value.to_string()
                }
            }
            _ => {}
        }
    }

    fn close_game(&mut self) {
        let mut game = mem::take(&mut self.current);
        game.moves = clean_movetext(&mem::take(&mut self.movetext));
        self.state = ReaderState::ReadingTags;

        if game.is_valid() {
            self.games.push(game);
        } else {
            let mut defects = ErrorAccumulator::default();
            game.collect_defects(&mut defects);
            self.dropped += 1;
            debug!(
                white = %game.white,
                black = %game.black,
                reason = %defects.take().unwrap_or_default(),
                "Dropping PGN block"
            );
        }
    }
}

/// Parse PGN lines into game records, preserving input order.
pub fn parse<I, L>(lines: I) -> Vec<GameRecord>
where
    I: IntoIterator<Item = L>,
    L: AsRef<str>,
{
    let mut reader = PgnReader::new();
    for line in lines {
        reader.push_line(line.as_ref());
    }
    reader.finish()
}

pub fn parse_str(text: &str) -> Vec<GameRecord> {
    parse(split_lines(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TWO_GAMES: &str = r#"[Event "World Championship"]
[Site "Dubai UAE"]
[Date "2021.12.03"]
[Round "6"]
[White "Carlsen, Magnus"]
[Black "Nepomniachtchi, Ian"]
[Result "1-0"]
[WhiteElo "2855"]
[BlackElo "2782"]
[EventDate "2021.11.24"]

1. d4 Nf6 2. Nf3 d5 3. g3 e6 {Catalan} 4. Bg2 Be7
5. O-O O-O 1-0

[Event "Casual"]
[Site "?"]
[Date "2022.??.??"]
[Round "?"]
[White "Anand, Viswanathan"]
[Black "Carlsen, Magnus"]
[Result "1/2-1/2"]
[WhiteElo "-"]
[EventDate "2022.??.??"]

1. e4 e5 (1... c5 2. Nf3) 2. Nf3 1/2-1/2
"#;

    #[test]
    fn test_parse_two_games_in_order() {
        let games = parse_str(TWO_GAMES);
        assert_eq!(games.len(), 2);

        let first = &games[0];
        assert_eq!(first.event_name, "World Championship");
        assert_eq!(first.site, "Dubai UAE");
        assert_eq!(first.date, "2021.12.03");
        assert_eq!(first.round, "6");
        assert_eq!(first.white, "Carlsen, Magnus");
        assert_eq!(first.black, "Nepomniachtchi, Ian");
        assert_eq!(first.white_elo, 2855);
        assert_eq!(first.black_elo, 2782);
        assert_eq!(first.result, GameResult::White);
        assert_eq!(first.event_date, "2021.11.24");
        assert_eq!(first.moves, "d4 Nf6 Nf3 d5 g3 e6 Bg2 Be7 O-O O-O 1-0");

        let second = &games[1];
        assert_eq!(second.site, "Unknown");
        assert_eq!(second.round, "?");
        assert_eq!(second.white_elo, 0);
        assert_eq!(second.black_elo, 0);
        assert_eq!(second.result, GameResult::Draw);
        assert_eq!(second.event_date, UNKNOWN_EVENT_DATE);
        assert_eq!(second.moves, "e4 e5 Nf3 1/2-1/2");
    }

    #[test]
    fn test_parse_is_deterministic() {
        assert_eq!(parse_str(TWO_GAMES), parse_str(TWO_GAMES));
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(parse_str("").is_empty());
        assert!(parse(Vec::<String>::new()).is_empty());
        assert!(parse(["", "   ", ""]).is_empty());
    }

    #[test]
    fn test_round_with_double_question_marks_becomes_zero() {
        let games = parse([
            r#"[White "A"]"#,
            r#"[Black "B"]"#,
            r#"[Result "0-1"]"#,
            r#"[Round "??"]"#,
            "",
            "1. f3 e5 2. g4 Qh4# 0-1",
        ]);
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].round, "0");
        assert_eq!(games[0].result, GameResult::Black);
    }

    #[test]
    fn test_block_missing_player_is_dropped() {
        let mut reader = PgnReader::new();
        for line in [
            r#"[White "Only White"]"#,
            r#"[Result "1-0"]"#,
            "",
            "1. e4 1-0",
            "",
            r#"[White "A"]"#,
            r#"[Black "B"]"#,
            r#"[Result "1-0"]"#,
            "",
            "1. d4 1-0",
        ] {
            reader.push_line(line);
        }
        assert_eq!(reader.dropped(), 1);

        let games = reader.finish();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].white, "A");
    }

    #[test]
    fn test_block_with_unfinished_result_is_dropped() {
        let games = parse([
            r#"[White "A"]"#,
            r#"[Black "B"]"#,
            r#"[Result "*"]"#,
            "",
            "1. e4 *",
        ]);
        assert!(games.is_empty());
    }

    #[test]
    fn test_malformed_tag_lines_are_ignored() {
        let games = parse([
            r#"[White "A"]"#,
            r#"[Black "B"]"#,
            r#"[Result "1-0"]"#,
            r#"[Event unquoted]"#,
            r#"[Site ""]"#,
            "[",
            "",
            "1. e4 1-0",
        ]);
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].event_name, "");
        assert_eq!(games[0].site, "");
    }

    #[test]
    fn test_unparseable_elo_is_zero() {
        let games = parse([
            r#"[White "A"]"#,
            r#"[Black "B"]"#,
            r#"[Result "1-0"]"#,
            r#"[WhiteElo "abc"]"#,
            r#"[BlackElo "2400"]"#,
            "1. e4 1-0",
        ]);
        assert_eq!(games[0].white_elo, 0);
        assert_eq!(games[0].black_elo, 2400);
    }

    #[test]
    fn test_padded_elo_is_parsed() {
        let games = parse([
            r#"[White "A"]"#,
            r#"[Black "B"]"#,
            r#"[Result "1-0"]"#,
            r#"[WhiteElo " 2855"]"#,
            r#"[BlackElo "2782 "]"#,
            "1. e4 1-0",
        ]);
        assert_eq!(games[0].white_elo, 2855);
        assert_eq!(games[0].black_elo, 2782);
    }

    #[test]
    fn test_multiline_comment_is_removed() {
        let games = parse([
            r#"[White "A"]"#,
            r#"[Black "B"]"#,
            r#"[Result "1-0"]"#,
            "",
            "1. e4 {a comment that",
            "spans two lines} e5 2. Qh5 1-0",
        ]);
        assert_eq!(games[0].moves, "e4 e5 Qh5 1-0");
    }

    #[test]
    fn test_split_lines_handles_all_terminators() {
        assert_eq!(split_lines("a\r\nb\rc\nd"), vec!["a", "b", "c", "d"]);
        assert_eq!(split_lines("a\n"), vec!["a", ""]);
        assert_eq!(split_lines(""), vec![""]);
    }

    #[test]
    fn test_crlf_input_keeps_multiline_movetext_in_one_game() {
        let text = "[White \"A\"]\r\n[Black \"B\"]\r\n[Result \"0-1\"]\r\n\r\n1. e4 e5\r\n2. Nf3 0-1\r\n";
        let games = parse_str(text);
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].moves, "e4 e5 Nf3 0-1");
    }

    #[test]
    fn test_parse_compression_mode() {
        assert_eq!(CompressionMode::parse("zstd").unwrap(), CompressionMode::Zstd);
        assert_eq!(CompressionMode::parse(" ZSTD ").unwrap(), CompressionMode::Zstd);
        assert!(matches!(
            CompressionMode::parse("gzip"),
            Err(InputError::Compression(value)) if value == "gzip"
        ));
    }

    #[test]
    fn test_read_pgn_file_plain() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TWO_GAMES.as_bytes()).unwrap();

        let lines = read_pgn_file(file.path(), &ReadOptions::default()).unwrap();
        assert_eq!(parse(&lines).len(), 2);
    }

    #[test]
    fn test_read_pgn_file_zstd() {
        let compressed = zstd::stream::encode_all(TWO_GAMES.as_bytes(), 3).unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&compressed).unwrap();

        let options = ReadOptions {
            compression: CompressionMode::Zstd,
            ..ReadOptions::default()
        };
        let lines = read_pgn_file(file.path(), &options).unwrap();
        assert_eq!(parse(&lines), parse_str(TWO_GAMES));
    }

    #[test]
    fn test_read_pgn_file_enforces_size_cap() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TWO_GAMES.as_bytes()).unwrap();

        let options = ReadOptions {
            max_bytes: Some(16),
            ..ReadOptions::default()
        };
        assert!(matches!(
            read_pgn_file(file.path(), &options),
            Err(InputError::TooLarge { limit: 16, .. })
        ));

        let unlimited = ReadOptions {
            max_bytes: None,
            ..ReadOptions::default()
        };
        assert!(read_pgn_file(file.path(), &unlimited).is_ok());
    }

    #[test]
    fn test_read_pgn_file_missing() {
        let result = read_pgn_file(Path::new("/nonexistent/games.pgn"), &ReadOptions::default());
        assert!(matches!(result, Err(InputError::Open { .. })));
    }
}

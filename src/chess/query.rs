use super::{
    GameResult, StorageError, clean_movetext, dates::render_report_date,
    store::{GameReportRow, GameStore},
};
use chrono::NaiveDate;
use smallvec::SmallVec;
use std::fmt::Write;
use tracing::debug;

/// Caller-supplied filters. Empty strings and `None` impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    pub white: String,
    pub black: String,
    /// Move prefix, e.g. `"1.e4"`; cleaned like stored moves before matching.
    pub opening: String,
    pub winner: Option<GameResult>,
    /// Inclusive range on the event date.
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    /// Include move text in each report block.
    pub show_moves: bool,
}

/// One typed condition on the games/players/events join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    WhiteName(String),
    BlackName(String),
    OpeningPrefix(String),
    Winner(GameResult),
    EventDateBetween { start: NaiveDate, end: NaiveDate },
}

/// Conjunction of clauses; empty matches every game.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predicate {
    clauses: SmallVec<[Clause; 5]>,
}

impl Predicate {
    pub fn from_clauses(clauses: impl IntoIterator<Item = Clause>) -> Self {
        Self {
            clauses: clauses.into_iter().collect(),
        }
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }
}

impl From<&FilterSpec> for Predicate {
    fn from(filters: &FilterSpec) -> Self {
        let mut clauses = SmallVec::new();

        let white = filters.white.trim();
        if !white.is_empty() {
            clauses.push(Clause::WhiteName(white.to_string()));
        }
        let black = filters.black.trim();
        if !black.is_empty() {
            clauses.push(Clause::BlackName(black.to_string()));
        }
        let opening = clean_movetext(&filters.opening);
        if !opening.is_empty() {
            clauses.push(Clause::OpeningPrefix(opening));
        }
        if let Some(winner) = filters.winner
            && winner != GameResult::Unknown
        {
            clauses.push(Clause::Winner(winner));
        }
        if let Some((start, end)) = filters.date_range {
            clauses.push(Clause::EventDateBetween { start, end });
        }

        Self { clauses }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryReport {
    pub count: usize,
    pub text: String,
}

/// Retrieve every stored game matching `filters` and format the report.
pub fn query<S>(filters: &FilterSpec, store: &S) -> Result<QueryReport, StorageError>
where
    S: GameStore + ?Sized,
{
    let predicate = Predicate::from(filters);
    let rows = store.select_games(&predicate)?;
    debug!(
        clauses = predicate.clauses().len(),
        matched = rows.len(),
        "Game query finished"
    );

    Ok(QueryReport {
        count: rows.len(),
        text: format_report(&rows, filters.show_moves),
    })
}

fn format_report(rows: &[GameReportRow], show_moves: bool) -> String {
    let mut text = format!("{} results\n\n", rows.len());
    for row in rows {
        write_game_block(&mut text, row, show_moves);
        text.push('\n');
    }
    text
}

fn write_game_block(out: &mut String, row: &GameReportRow, show_moves: bool) {
    // Writing into a String cannot fail.
    let _ = writeln!(out, "Event: {}", row.event_name);
    let _ = writeln!(out, "Site: {}", row.site);
    let _ = writeln!(out, "Date: {}", render_report_date(&row.event_date));
    let _ = writeln!(out, "White: {} ({})", row.white_name, row.white_elo);
    let _ = writeln!(out, "Black: {} ({})", row.black_name, row.black_elo);
    let _ = writeln!(out, "Result: {}", row.result);
    if show_moves {
        let _ = writeln!(out, "{}", row.moves);
    }
}

use super::types::UNKNOWN_EVENT_DATE;
use chrono::NaiveDate;

const STORED_DATE_FORMAT: &str = "%Y-%m-%d";
const REPORT_DATE_FORMAT: &str = "%m/%d/%Y";

fn normalize_date_separators(s: &str) -> String {
    let s = s.trim();
    if s.contains('.') {
        s.replace('.', "-")
    } else {
        s.to_string()
    }
}

fn parse_pgn_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&normalize_date_separators(raw), STORED_DATE_FORMAT).ok()
}

/// Canonical `YYYY-MM-DD` form of a PGN date, or the unknown-date sentinel when
/// the value is not a complete calendar date.
pub(crate) fn normalize_event_date(raw: &str) -> String {
    parse_pgn_date(raw)
        .map(format_stored_date)
        .unwrap_or_else(|| UNKNOWN_EVENT_DATE.to_string())
}

pub(crate) fn format_stored_date(date: NaiveDate) -> String {
    date.format(STORED_DATE_FORMAT).to_string()
}

/// `MM/DD/YYYY` rendering used in query reports.
pub(crate) fn render_report_date(stored: &str) -> String {
    match parse_pgn_date(stored) {
        Some(date) => date.format(REPORT_DATE_FORMAT).to_string(),
        None => "00/00/0000".to_string(),
    }
}

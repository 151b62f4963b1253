use regex::Regex;
use std::sync::LazyLock;

// Non-nested: the first `}` or `)` closes a span.
static MOVETEXT_NOISE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{.*?\}|\(.*?\)|\d+\.+").expect("valid movetext noise regex")
});

/// Strip `{ ... }` comments, `( ... )` variations and move numbers from
/// movetext, collapsing the remaining tokens onto single spaces.
///
/// Result markers (`1-0`, `1/2-1/2`, ...) and NAGs are left in place.
pub fn clean_movetext(movetext: &str) -> String {
    let stripped = MOVETEXT_NOISE_RE.replace_all(movetext, " ");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_comment_and_variation() {
        let input = "1.e4 e5 2.Nf3 {a comment} (1...d6 2.d4) Nc6";
        assert_eq!(clean_movetext(input), "e4 e5 Nf3 Nc6");
    }

    #[test]
    fn test_clean_spaced_move_numbers() {
        assert_eq!(
            clean_movetext("1. e4 e5 2. Nf3 Nc6 3. Bb5 a6"),
            "e4 e5 Nf3 Nc6 Bb5 a6"
        );
    }

    #[test]
    fn test_clean_black_continuation_numbers() {
        assert_eq!(clean_movetext("12... Nf6 13. Bg5"), "Nf6 Bg5");
    }

    #[test]
    fn test_clean_keeps_result_marker() {
        assert_eq!(
            clean_movetext("1. e4 e5 2. Qh5 Nc6 3. Qxf7# 1-0"),
            "e4 e5 Qh5 Nc6 Qxf7# 1-0"
        );
        assert_eq!(clean_movetext("1. d4 d5 1/2-1/2"), "d4 d5 1/2-1/2");
    }

    #[test]
    fn test_clean_lichess_style_annotations() {
        let input = "1. d4 { [%eval 0.25] [%clk 1:30:43] } Nf6 { [%eval 0.22] [%clk 1:30:42] }";
        assert_eq!(clean_movetext(input), "d4 Nf6");
    }

    #[test]
    fn test_clean_empty_and_whitespace() {
        assert_eq!(clean_movetext(""), "");
        assert_eq!(clean_movetext("   \t "), "");
        assert_eq!(clean_movetext("{only a comment}"), "");
        assert_eq!(clean_movetext("1. 2. 3."), "");
    }

    #[test]
    fn test_clean_nested_variation_is_single_pass() {
        // The inner `)` closes the span; the trailing `)` survives.
        assert_eq!(clean_movetext("1. e4 (1. d4 (1. c4) d5) e5"), "e4 d5) e5");
    }

    #[test]
    fn test_clean_castling_untouched() {
        assert_eq!(clean_movetext("1. e4 O-O-O+"), "e4 O-O-O+");
    }
}

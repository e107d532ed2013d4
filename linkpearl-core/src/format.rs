//! Normalization of reconstructed tooltip lines into in-game spacing.
//!
//! The wiki renders stat lines with display spacing the client never shows:
//! `HP +50` in game is `HP+50`, `DEF: 42` is `DEF:42`. Each rule is a plain
//! textual substitution; rules apply in order and each feeds the next. The
//! rule set is a fixed point on already-formatted lines.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref BRACKET_TAG: Regex = Regex::new(r"\[([^\]]+)\]\s+").unwrap();
    static ref PAREN_TAG: Regex = Regex::new(r"\(([^)]+)\)\s+").unwrap();
    static ref STAT_DELTA: Regex = Regex::new(r"([A-Z][A-Za-z\s]*?)\s+([+\-]\d+%?)").unwrap();
    static ref COLON_BEFORE_DIGIT: Regex = Regex::new(r":\s+(\d)").unwrap();
    static ref PERIOD_BEFORE_DIGIT: Regex = Regex::new(r"\.\s+(\d+)").unwrap();
    static ref SLASH_SEPARATOR: Regex = Regex::new(r"\s*/\s*").unwrap();
}

/// Apply the spacing rules to a single line.
pub fn format_line(line: &str) -> String {
    // Slot/weapon-type tag: "[Head] All Races" -> "[Head]All Races"
    let line = BRACKET_TAG.replace_all(line, "[${1}]");
    // Race/job qualifier: "(Scythe) DMG" -> "(Scythe)DMG"
    let line = PAREN_TAG.replace_all(&line, "(${1})");
    // Stat delta: "HP +50" -> "HP+50", "Haste +5%" -> "Haste+5%"
    let line = STAT_DELTA.replace_all(&line, "${1}${2}");
    // Numeric labels: "DEF: 42" -> "DEF:42", "Lv. 75" -> "Lv.75"
    let line = COLON_BEFORE_DIGIT.replace_all(&line, ":${1}");
    let line = PERIOD_BEFORE_DIGIT.replace_all(&line, ".${1}");
    // Job lists: "WAR / DRK" -> "WAR/DRK"
    SLASH_SEPARATOR.replace_all(&line, "/").into_owned()
}

/// Format every line, preserving count and order.
pub fn format_lines(lines: &[String]) -> Vec<String> {
    lines.iter().map(|line| format_line(line)).collect()
}

use once_cell::sync::Lazy;
use regex::Regex;

static DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d").expect("static digit pattern"));

/// Trim whitespace + strip outer quotes if present.
pub fn clean_str(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    }
}

/// True if `s` holds at least one decimal digit (any Unicode `Nd`).
pub fn has_digit(s: &str) -> bool {
    DIGIT.is_match(s)
}

//! Title sanitization
//!
//! Produces the display title for an artifact. The file on disk keeps its
//! original name.

use regex::Regex;
use std::sync::LazyLock;

/// Maximum title length in characters
pub const MAX_TITLE_CHARS: usize = 100;

static ILLEGAL_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[<>:"/\\|?*\x00-\x1F\x7F]"#).expect("Invalid illegal-chars pattern"));

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace pattern"));

/// Clean a filename-derived title.
///
/// Strips characters illegal in filenames, collapses whitespace runs to one
/// space, trims, and truncates to [`MAX_TITLE_CHARS`]. Idempotent.
pub fn sanitize_title(raw: &str) -> String {
    // Whitespace first so tabs and newlines become spaces instead of vanishing
    // with the other control characters
    let spaced = WHITESPACE_RUN.replace_all(raw, " ");
    let stripped = ILLEGAL_CHARS.replace_all(&spaced, "");
    let collapsed = WHITESPACE_RUN.replace_all(&stripped, " ");
    let trimmed = collapsed.trim();

    if trimmed.chars().count() <= MAX_TITLE_CHARS {
        return trimmed.to_string();
    }

    // Truncation can expose a trailing space
    let truncated: String = trimmed.chars().take(MAX_TITLE_CHARS).collect();
    truncated.trim_end().to_string()
}

//! Video URL validation
//!
//! Pattern matching only: no DNS lookup and no scheme enforcement. Each
//! pattern is anchored at the start of the URL; anything may follow it.

use regex::Regex;
use std::sync::LazyLock;

pub const MSG_URL_REQUIRED: &str = "URL is required";
pub const MSG_INVALID_URL: &str = "Please provide a valid YouTube URL";

/// Accepted URL shapes. Overlapping on purpose; the first is a superset of most others.
static VIDEO_URL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^(https?://)?(www\.)?(youtube|youtu|youtube-nocookie)\.(com|be)/",
        r"^(https?://)?(www\.)?youtu\.be/",
        r"^(https?://)?(www\.)?youtube\.com/watch\?v=",
        r"^(https?://)?(www\.)?youtube\.com/embed/",
        r"^(https?://)?(www\.)?youtube\.com/v/",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid video URL pattern"))
    .collect()
});

/// Reason a URL was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlRejection {
    Empty,
    UnsupportedUrl,
}

impl UrlRejection {
    /// Message returned to the caller
    pub fn message(self) -> &'static str {
        match self {
            UrlRejection::Empty => MSG_URL_REQUIRED,
            UrlRejection::UnsupportedUrl => MSG_INVALID_URL,
        }
    }
}

/// True when `url` matches at least one accepted pattern
pub fn is_supported_video_url(url: &str) -> bool {
    VIDEO_URL_PATTERNS.iter().any(|re| re.is_match(url))
}

/// Trim and validate a caller-supplied URL, returning the trimmed form
pub fn validate(raw: &str) -> Result<&str, UrlRejection> {
    let url = raw.trim();
    if url.is_empty() {
        return Err(UrlRejection::Empty);
    }
    if !is_supported_video_url(url) {
        return Err(UrlRejection::UnsupportedUrl);
    }
    Ok(url)
}

//! Trailing reference block removal.
//!
//! Copied answers often end with a block of reference definitions whose long
//! URLs were wrapped across several lines. The scanner walks backward from the
//! last line and drops lines while they look like that debris, stopping at the
//! first line of real content. Lines earlier in the text are never touched.

use regex::Regex;
use std::sync::LazyLock;

/// Wrapped-URL continuation lines must be shorter than this.
const MAX_CONTINUATION_LEN: usize = 120;

/// Domain fragments left behind when a URL wraps after its first letter
/// (e.g. `c` + `hatgpt.com`).
const WRAPPED_DOMAIN_FRAGMENTS: &[&str] = &["hatgpt.com"];

static RE_DEFINITION_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[[^\]]+\]:").unwrap());

static RE_URL_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^https?://").unwrap());

static RE_URL_SAFE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9\-_/.?=&%]+$").unwrap());

/// Returns true if a (trimmed) line is reference debris.
pub fn is_reference_debris(line: &str) -> bool {
    if line.is_empty() {
        return true;
    }

    if RE_DEFINITION_START.is_match(line) || RE_URL_LINE.is_match(line) {
        return true;
    }

    if line.to_ascii_lowercase().contains("utm_") {
        return true;
    }

    if is_wrapped_domain_fragment(line) {
        return true;
    }

    is_url_continuation(line)
}

fn is_wrapped_domain_fragment(line: &str) -> bool {
    WRAPPED_DOMAIN_FRAGMENTS.iter().any(|fragment| {
        line.get(..fragment.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(fragment))
    })
}

/// A short line made only of URL-safe characters. Single-word lines such as
/// `Done` qualify too; they are indistinguishable from a wrapped URL piece.
fn is_url_continuation(line: &str) -> bool {
    line.len() < MAX_CONTINUATION_LEN && RE_URL_SAFE.is_match(line)
}

/// Removes the trailing run of reference debris lines from `text`.
///
/// Only the tail is cut; everything before the first kept line is returned
/// byte for byte (including `\r\n` line endings).
///
/// # Example
///
/// ```
/// use copyclean::trailing::strip_trailing_references;
///
/// let text = "The answer.\n[1]: https://example.com/a?utm_source=x\nutm_campaign=y\n";
/// assert_eq!(strip_trailing_references(text), "The answer.");
/// ```
pub fn strip_trailing_references(text: &str) -> &str {
    let mut end = text.len();

    loop {
        let head = &text[..end];
        let (line_start, line) = match head.rfind('\n') {
            Some(newline) => (newline, &head[newline + 1..]),
            None => (0, head),
        };

        if !is_reference_debris(line.trim()) {
            break;
        }

        end = line_start;
        if end == 0 {
            break;
        }
    }

    &text[..end]
}

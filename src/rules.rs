//! # Pattern Rule Set
//!
//! Ordered text rewrites that strip citation and reference noise from prose.
//!
//! Each rule is a standalone pure function from `&str` to a (possibly
//! borrowed) string, tagged with a priority. A [`RuleSet`] is the list of
//! rules for one [`CleaningMode`], sorted by priority. Order matters: link
//! rules must run before the generic bracket stripper, and whitespace
//! normalization runs last because every removal can leave gaps behind.
//!
//! | Priority | Rule                      | Aggressive | Conservative |
//! |---------:|---------------------------|:----------:|:------------:|
//! | 10       | citation markers          | x          | x            |
//! | 20       | reference definitions     | x          | x            |
//! | 30       | reference-style links     | x          | x            |
//! | 35       | inline links              | x          |              |
//! | 40       | compound references       | x          | x            |
//! | 45       | bracket markers           | any        | numeric only |
//! | 50       | autolinks                 | x          | x            |
//! | 55       | bare URLs / tracking      | remove URL | strip `utm_` |
//! | 60       | source badges             | x          | x            |
//! | 70-110   | whitespace normalization  | x          | x            |
//!
//! All patterns run on the `regex` crate, which guarantees linear-time
//! matching; adversarial page content cannot trigger catastrophic
//! backtracking.

use crate::settings::CleaningMode;
use regex::Regex;
use std::borrow::Cow;
use std::fmt;
use std::sync::LazyLock;

/// Signature shared by every rewrite.
pub type Rewrite = fn(&str) -> Cow<'_, str>;

/// A single prioritized rewrite.
#[derive(Clone, Copy)]
pub struct Rule {
    /// Short identifier, stable across releases.
    pub name: &'static str,
    /// Position in the pipeline; lower runs first.
    pub priority: u16,
    rewrite: Rewrite,
}

impl Rule {
    const fn new(name: &'static str, priority: u16, rewrite: Rewrite) -> Self {
        Self {
            name,
            priority,
            rewrite,
        }
    }

    /// Applies this rule alone.
    pub fn apply<'a>(&self, text: &'a str) -> Cow<'a, str> {
        (self.rewrite)(text)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .finish()
    }
}

const COMMON_RULES: &[Rule] = &[
    Rule::new("citation-markers", 10, remove_citation_markers),
    Rule::new("reference-definitions", 20, remove_reference_definitions),
    Rule::new("reference-links", 30, collapse_reference_links),
    Rule::new("compound-references", 40, remove_compound_references),
    Rule::new("autolinks", 50, remove_autolinks),
    Rule::new("source-badges", 60, strip_source_badges),
    Rule::new("empty-parens", 70, remove_empty_parens),
    Rule::new("collapse-spaces", 80, collapse_spaces),
    Rule::new("trim-line-edges", 90, trim_line_edges),
    Rule::new("collapse-blank-lines", 100, collapse_blank_lines),
    Rule::new("trim", 110, trim_segment),
];

const AGGRESSIVE_RULES: &[Rule] = &[
    Rule::new("inline-links", 35, collapse_inline_links),
    Rule::new("bracket-markers", 45, remove_bracket_markers),
    Rule::new("bare-urls", 55, remove_bare_urls),
];

const CONSERVATIVE_RULES: &[Rule] = &[
    Rule::new("numeric-markers", 45, remove_numeric_markers),
    Rule::new("tracking-params", 55, strip_tracking_params),
];

static AGGRESSIVE: LazyLock<RuleSet> =
    LazyLock::new(|| RuleSet::build(CleaningMode::Aggressive, AGGRESSIVE_RULES));

static CONSERVATIVE: LazyLock<RuleSet> =
    LazyLock::new(|| RuleSet::build(CleaningMode::Conservative, CONSERVATIVE_RULES));

/// The ordered rules for one cleaning mode.
#[derive(Debug)]
pub struct RuleSet {
    mode: CleaningMode,
    rules: Vec<Rule>,
}

impl RuleSet {
    fn build(mode: CleaningMode, extra: &[Rule]) -> Self {
        let mut rules: Vec<Rule> = COMMON_RULES.iter().chain(extra).copied().collect();
        rules.sort_by_key(|rule| rule.priority);
        Self { mode, rules }
    }

    /// Returns the shared rule set for `mode`.
    pub fn for_mode(mode: CleaningMode) -> &'static RuleSet {
        match mode {
            CleaningMode::Aggressive => &AGGRESSIVE,
            CleaningMode::Conservative => &CONSERVATIVE,
        }
    }

    /// The mode this set implements.
    pub fn mode(&self) -> CleaningMode {
        self.mode
    }

    /// Rules in execution order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Looks a rule up by name.
    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.name == name)
    }

    /// Runs every rule over `text` in priority order.
    pub fn apply(&self, text: &str) -> String {
        let mut current = text.to_owned();

        for rule in &self.rules {
            let rewritten = match rule.apply(&current) {
                Cow::Borrowed(unchanged) if unchanged.len() == current.len() => continue,
                rewritten => rewritten.into_owned(),
            };
            current = rewritten;
        }

        current
    }
}

// ============================================================================
// Citation and reference rules
// ============================================================================

// Chat assistants wrap citations in private-use delimiters:
// U+E200 "cite" U+E202 "turn0search3" U+E201. Plain-text copies often lose the
// delimiters and leave "citeturn0search3" glued to the previous word.
static RE_CITATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"[ \t]*\x{E200}?(?:\bcite\b|cite(?:turn\d|\x{E202}))(?:[^\n\x{E201}]*\x{E201}|[^\n]*)",
    )
    .unwrap()
});

static RE_REFERENCE_DEFINITION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*\[[^\]\n]+\]:[ \t]*\S+.*$").unwrap());

static RE_REFERENCE_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]\n]+)\]\[[^\]\n]+\]").unwrap());

static RE_INLINE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\[([^\]\n]+)\]\((?:https?://|www\.)[^)\n]+\)").unwrap()
});

// Runs after reference-links, which usually collapses the inner `[..][..]`
// first and leaves `(label)` plus any `<--` note in place.
static RE_COMPOUND_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[ \t]*\(\[[^\]\n]+\]\[[^\]\n]+\]\)[ \t]*(?:<-+.*)?").unwrap()
});

static RE_BRACKET_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]*\[[^\]\n]+\]").unwrap());

static RE_NUMERIC_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]*\[\d+\]").unwrap());

static RE_AUTOLINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<https?://[^>\n]+>").unwrap());

static RE_BARE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:https?://|www\.)\S+").unwrap());

static RE_TRACKING_PARAMS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\bhttps?://[^\s?]+)\?utm_[^\s)]*").unwrap());

/// Removes a citation keyword and everything after it up to the closing
/// citation delimiter, or to the end of the line when there is none.
pub fn remove_citation_markers(text: &str) -> Cow<'_, str> {
    RE_CITATION.replace_all(text, "")
}

/// Removes whole lines of the form `[label]: target`.
pub fn remove_reference_definitions(text: &str) -> Cow<'_, str> {
    RE_REFERENCE_DEFINITION.replace_all(text, "")
}

/// `[label][ref]` becomes `label`.
pub fn collapse_reference_links(text: &str) -> Cow<'_, str> {
    RE_REFERENCE_LINK.replace_all(text, "${1}")
}

/// `[label](https://...)` becomes `label`.
pub fn collapse_inline_links(text: &str) -> Cow<'_, str> {
    RE_INLINE_LINK.replace_all(text, "${1}")
}

/// Removes `([Title][ref])` and an optional trailing `<--` annotation.
pub fn remove_compound_references(text: &str) -> Cow<'_, str> {
    RE_COMPOUND_REFERENCE.replace_all(text, "")
}

/// Removes every bracketed marker, whatever it contains.
pub fn remove_bracket_markers(text: &str) -> Cow<'_, str> {
    RE_BRACKET_MARKER.replace_all(text, "")
}

/// Removes purely numeric markers like `[12]`; `[i]` or `[note]` survive.
pub fn remove_numeric_markers(text: &str) -> Cow<'_, str> {
    RE_NUMERIC_MARKER.replace_all(text, "")
}

/// Removes `<https://...>` autolinks.
pub fn remove_autolinks(text: &str) -> Cow<'_, str> {
    RE_AUTOLINK.replace_all(text, "")
}

/// Removes bare `http(s)://` and `www.` URLs.
pub fn remove_bare_urls(text: &str) -> Cow<'_, str> {
    RE_BARE_URL.replace_all(text, "")
}

/// Drops a `?utm_...` query from surviving URLs, keeping the URL itself.
pub fn strip_tracking_params(text: &str) -> Cow<'_, str> {
    RE_TRACKING_PARAMS.replace_all(text, "${1}")
}

// ============================================================================
// Source badges
// ============================================================================

static RE_BADGE_COUNT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\+\d+\b").unwrap());

/// Shortest badge phrase: a capital plus two more characters.
const BADGE_MIN_LEN: usize = 3;

/// Longest badge phrase: a capital plus up to 80 more characters.
const BADGE_MAX_LEN: usize = 81;

/// Removes source badge crumbs such as `MDN Web Docs+1`.
///
/// A badge is a run of capitalized words (digits and `&`/`-`/`/` connectors
/// allowed in between) that starts after whitespace or at the start of the
/// text and is glued to a `+N` count. A sentence-initial title-case word in
/// front of further capitalized words is ordinary capitalization and is kept
/// when the sentence goes on: `See MDN Web Docs+1 for details` loses only
/// `MDN Web Docs+1`. A badge that ends its line is removed whole, so
/// `Done.\nStack Overflow+2` loses `Stack Overflow+2`.
/// Whitespace before the badge is left for the spacing rules.
pub fn strip_source_badges(text: &str) -> Cow<'_, str> {
    let mut out = String::new();
    let mut copied = 0;

    for count in RE_BADGE_COUNT.find_iter(text) {
        if let Some(start) = badge_start(text, copied, count.start(), count.end()) {
            out.push_str(&text[copied..start]);
            copied = count.end();
        }
    }

    if copied == 0 {
        return Cow::Borrowed(text);
    }

    out.push_str(&text[copied..]);
    Cow::Owned(out)
}

#[derive(Debug, PartialEq, Eq)]
enum BadgeWord {
    /// Can open a badge phrase.
    Capitalized,
    /// Can sit inside a phrase but not open it.
    Continuation,
    /// Ends the backward walk.
    Other,
}

fn is_badge_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b' ' | b'.' | b',' | b'&' | b'/' | b'-')
}

fn classify_badge_word(word: &[u8]) -> BadgeWord {
    match word.first() {
        Some(b) if b.is_ascii_uppercase() => BadgeWord::Capitalized,
        Some(b) if b.is_ascii_digit() => BadgeWord::Continuation,
        _ if !word.iter().any(u8::is_ascii_alphanumeric) => BadgeWord::Continuation,
        _ => BadgeWord::Other,
    }
}

/// Finds where the badge whose count spans `plus..count_end` begins, never
/// looking before `floor`.
fn badge_start(text: &str, floor: usize, plus: usize, count_end: usize) -> Option<usize> {
    let bytes = text.as_bytes();

    // All badge bytes are ASCII, so every index visited is a char boundary.
    let mut window = plus;
    while window > floor && plus - window < BADGE_MAX_LEN && is_badge_byte(bytes[window - 1]) {
        window -= 1;
    }

    // Phrase starts, collected right to left
    let mut candidates = Vec::new();
    let mut end = plus;
    loop {
        while end > window && bytes[end - 1] == b' ' {
            end -= 1;
        }
        if end == window {
            break;
        }

        let mut start = end;
        while start > window && bytes[start - 1] != b' ' {
            start -= 1;
        }

        match classify_badge_word(&bytes[start..end]) {
            BadgeWord::Capitalized => {
                let len = plus - start;
                if follows_whitespace(text, start) && (BADGE_MIN_LEN..=BADGE_MAX_LEN).contains(&len)
                {
                    candidates.push(start);
                }
            }
            BadgeWord::Continuation => {}
            BadgeWord::Other => break,
        }

        end = start;
    }

    let leftmost = *candidates.last()?;
    if candidates.len() > 1
        && is_title_case(&bytes[leftmost..plus])
        && is_sentence_start(text, leftmost)
        && !ends_line(text, count_end)
    {
        return Some(candidates[candidates.len() - 2]);
    }

    Some(leftmost)
}

fn follows_whitespace(text: &str, pos: usize) -> bool {
    text[..pos].chars().next_back().map_or(true, char::is_whitespace)
}

fn is_title_case(word: &[u8]) -> bool {
    matches!(word, [first, second, ..] if first.is_ascii_uppercase() && second.is_ascii_lowercase())
}

/// True if only closing punctuation and spaces follow `pos` on its line.
fn ends_line(text: &str, pos: usize) -> bool {
    let rest = text[pos..].trim_start_matches([' ', '\t', '.', ',', ';', ':', '!', '?', ')']);
    rest.is_empty() || rest.starts_with(['\n', '\r'])
}

fn is_sentence_start(text: &str, pos: usize) -> bool {
    let before = text[..pos].trim_end_matches([' ', '\t']);
    match before.chars().next_back() {
        None => true,
        Some(c) => matches!(c, '\n' | '\r' | '.' | '!' | '?' | ':'),
    }
}

// ============================================================================
// Whitespace normalization
// ============================================================================

static RE_EMPTY_PARENS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(\s*\)").unwrap());

static RE_HORIZONTAL_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());

static RE_NEWLINE_EDGES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]*\n[ \t]*").unwrap());

static RE_BLANK_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Removes `()` pairs emptied by earlier removals.
pub fn remove_empty_parens(text: &str) -> Cow<'_, str> {
    RE_EMPTY_PARENS.replace_all(text, "")
}

/// Collapses runs of spaces and tabs to one space.
pub fn collapse_spaces(text: &str) -> Cow<'_, str> {
    // Skip the rewrite when no run needs collapsing
    if !text.contains("  ") && !text.contains('\t') {
        return Cow::Borrowed(text);
    }
    RE_HORIZONTAL_SPACE.replace_all(text, " ")
}

/// Strips spaces hugging a newline.
pub fn trim_line_edges(text: &str) -> Cow<'_, str> {
    RE_NEWLINE_EDGES.replace_all(text, "\n")
}

/// Reduces 3+ consecutive newlines to one blank line.
pub fn collapse_blank_lines(text: &str) -> Cow<'_, str> {
    RE_BLANK_RUN.replace_all(text, "\n\n")
}

/// Trims the whole segment.
pub fn trim_segment(text: &str) -> Cow<'_, str> {
    Cow::Borrowed(text.trim())
}

//! # Cleaning Pipeline
//!
//! Turns raw copied text into a [`CleaningResult`].
//!
//! ## Pipeline Stages
//!
//! 1. **Segmentation** - split fenced/inline code away from prose (when code protection is on)
//! 2. **Rewriting** - run the mode's [`RuleSet`] over every prose segment
//! 3. **Tail trimming** - drop a trailing reference block
//! 4. **Rendering** - trim and produce the plain text + HTML pair
//!
//! Stages 1-3 repeat until the text stops changing, so cleaning is idempotent.
//! Cleaning never fails. Empty or missing input yields an empty result.

use crate::render::{render_html, HtmlOptions};
use crate::rules::RuleSet;
use crate::segment::{split_segments, SegmentKind};
use crate::settings::{CleaningMode, Settings};
use crate::trailing::strip_trailing_references;
use rayon::prelude::*;
use serde::Serialize;

/// Cleaned text in both clipboard flavors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleaningResult {
    /// Cleaned plain text.
    pub plain_text: String,
    /// `plain_text` escaped inside a whitespace-preserving container.
    pub html: String,
}

impl CleaningResult {
    /// Returns true if there is nothing worth writing to the clipboard.
    pub fn is_empty(&self) -> bool {
        self.plain_text.is_empty()
    }

    /// Returns true if cleaning changed `raw`. Callers skip the clipboard
    /// override when it did not.
    pub fn differs_from(&self, raw: &str) -> bool {
        self.plain_text != raw
    }
}

/// Cleans `text` according to `settings`.
///
/// `settings.enabled` is not consulted here; deciding whether to clean at all
/// is the caller's job.
///
/// # Example
///
/// ```
/// use copyclean::{clean, Settings};
///
/// let result = clean("See MDN Web Docs+1 for details [1].", &Settings::default());
/// assert_eq!(result.plain_text, "See for details.");
/// ```
pub fn clean(text: &str, settings: &Settings) -> CleaningResult {
    clean_with_options(text, settings, &HtmlOptions::default())
}

/// Cleans `text`, rendering the HTML flavor with custom options.
pub fn clean_with_options(
    text: &str,
    settings: &Settings,
    html_options: &HtmlOptions,
) -> CleaningResult {
    let plain_text = clean_text(text, settings);
    let html = render_html(&plain_text, html_options);
    CleaningResult { plain_text, html }
}

/// Cleans possibly-missing input; `None` behaves like an empty string.
pub fn clean_optional(text: Option<&str>, settings: &Settings) -> CleaningResult {
    clean(text.unwrap_or_default(), settings)
}

/// Runs the pipeline and returns only the plain text.
pub fn clean_text(text: &str, settings: &Settings) -> String {
    if text.is_empty() {
        return String::new();
    }

    let rules = RuleSet::for_mode(settings.mode);

    // A removal can expose a new match (`[[a][b]][c]`, `Text MDN+1+2`), so
    // passes repeat until the text is stable.
    let mut cleaned = clean_pass(text, rules, settings.protect_code_blocks);
    let mut passes = 1;
    while passes < MAX_PASSES {
        let next = clean_pass(&cleaned, rules, settings.protect_code_blocks);
        if next == cleaned {
            break;
        }
        cleaned = next;
        passes += 1;
    }

    tracing::trace!(
        mode = %settings.mode,
        input_bytes = text.len(),
        output_bytes = cleaned.len(),
        passes,
        "cleaned text"
    );

    cleaned
}

/// Upper bound on pipeline passes. A pass that changes the text either
/// shortens it or turns a tab into a space; only deeply nested brackets
/// come near the cap.
const MAX_PASSES: usize = 64;

/// One run of rewrite, tail trimming and trim.
fn clean_pass(text: &str, rules: &RuleSet, protect_code: bool) -> String {
    let rewritten = if protect_code {
        rewrite_prose_segments(text, rules)
    } else {
        rules.apply(text)
    };

    strip_trailing_references(&rewritten).trim().to_string()
}

/// Applies `rules` to prose only, leaving code spans verbatim.
fn rewrite_prose_segments(text: &str, rules: &RuleSet) -> String {
    let mut out = String::with_capacity(text.len());

    for segment in split_segments(text) {
        match segment.kind {
            SegmentKind::Code => out.push_str(segment.text),
            SegmentKind::Prose => push_cleaned_prose(&mut out, segment.text, rules),
        }
    }

    out
}

/// The rule set trims each prose segment, which would glue prose onto an
/// adjacent code span (`run `ls` now` -> `run`ls`now`). The whitespace that
/// separated the segment from its neighbours is restored in normalized form.
fn push_cleaned_prose(out: &mut String, prose: &str, rules: &RuleSet) {
    let body = prose.trim();
    let leading = &prose[..prose.len() - prose.trim_start().len()];
    let trailing = &prose[prose.trim_end().len()..];

    let cleaned = if body.is_empty() {
        String::new()
    } else {
        rules.apply(body)
    };

    if cleaned.is_empty() {
        // Leading and trailing are the same run when the body is blank
        let gap = if body.is_empty() {
            separator(prose)
        } else {
            separator_for(newlines(leading) + newlines(trailing), true)
        };
        out.push_str(gap);
        return;
    }

    out.push_str(separator(leading));
    out.push_str(&cleaned);
    out.push_str(separator(trailing));
}

fn newlines(whitespace: &str) -> usize {
    whitespace.matches('\n').count()
}

fn separator(whitespace: &str) -> &'static str {
    separator_for(newlines(whitespace), !whitespace.is_empty())
}

fn separator_for(newlines: usize, any_whitespace: bool) -> &'static str {
    match newlines {
        0 if any_whitespace => " ",
        0 => "",
        1 => "\n",
        _ => "\n\n",
    }
}

/// Cleans many independent texts in parallel.
///
/// Each call shares only the read-only settings snapshot.
pub fn clean_batch<S: AsRef<str> + Sync>(texts: &[S], settings: &Settings) -> Vec<CleaningResult> {
    texts
        .par_iter()
        .map(|text| clean(text.as_ref(), settings))
        .collect()
}

/// A reusable cleaner bound to one settings snapshot.
///
/// # Example
///
/// ```
/// use copyclean::Cleaner;
///
/// let cleaner = Cleaner::new().conservative();
/// let result = cleaner.clean("[OpenAI](https://openai.com)[3]");
/// assert_eq!(result.plain_text, "[OpenAI](https://openai.com)");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Cleaner {
    settings: Settings,
    html_options: HtmlOptions,
}

impl Cleaner {
    /// Creates a cleaner with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a cleaner for an existing snapshot.
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings,
            html_options: HtmlOptions::default(),
        }
    }

    /// Sets the cleaning mode.
    pub fn mode(mut self, mode: CleaningMode) -> Self {
        self.settings.mode = mode;
        self
    }

    /// Uses conservative mode.
    pub fn conservative(self) -> Self {
        self.mode(CleaningMode::Conservative)
    }

    /// Uses aggressive mode.
    pub fn aggressive(self) -> Self {
        self.mode(CleaningMode::Aggressive)
    }

    /// Enables or disables code span protection.
    pub fn protect_code(mut self, protect: bool) -> Self {
        self.settings.protect_code_blocks = protect;
        self
    }

    /// Sets HTML rendering options.
    pub fn html_options(mut self, options: HtmlOptions) -> Self {
        self.html_options = options;
        self
    }

    /// The snapshot this cleaner runs with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Cleans one text.
    pub fn clean(&self, text: &str) -> CleaningResult {
        clean_with_options(text, &self.settings, &self.html_options)
    }

    /// Cleans one text, returning only the plain text.
    pub fn clean_text(&self, text: &str) -> String {
        clean_text(text, &self.settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Container;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn aggressive() -> Settings {
        Settings::default().aggressive()
    }

    fn conservative() -> Settings {
        Settings::default().conservative()
    }

    fn both_modes() -> [Settings; 2] {
        [aggressive(), conservative()]
    }

    #[test]
    fn test_hello_world_is_noop() {
        for settings in both_modes() {
            let result = clean("Hello world", &settings);
            assert_eq!(result.plain_text, "Hello world");
            assert!(!result.differs_from("Hello world"));
        }
    }

    #[test]
    fn test_mode_divergence_on_inline_link() {
        let input = "Visit [OpenAI](https://openai.com) now";
        assert_eq!(clean(input, &aggressive()).plain_text, "Visit OpenAI now");
        assert_eq!(clean(input, &conservative()).plain_text, input);
    }

    #[test]
    fn test_badge_stripping() {
        for settings in both_modes() {
            assert_eq!(
                clean("See MDN Web Docs+1 for details", &settings).plain_text,
                "See for details"
            );
        }
    }

    #[test]
    fn test_badge_ending_a_line_is_removed_whole() {
        for settings in both_modes() {
            assert_eq!(
                clean("It works. Stack Overflow+2", &settings).plain_text,
                "It works."
            );
            assert_eq!(
                clean("Hello there.\nStack Overflow+2", &settings).plain_text,
                "Hello there."
            );
        }
    }

    #[test]
    fn test_single_word_last_line_is_dropped() {
        for settings in both_modes() {
            assert_eq!(
                clean("Intro sentence here.\nDone", &settings).plain_text,
                "Intro sentence here."
            );
        }
    }

    #[test]
    fn test_compound_reference_is_collapsed_by_reference_links_first() {
        // Reference links run first, so the compound form never survives to
        // its own rule and the `<--` note stays.
        for settings in both_modes() {
            assert_eq!(
                clean("Claim ([Source][1]) <-- see above", &settings).plain_text,
                "Claim (Source) <-- see above"
            );
        }
    }

    #[test]
    fn test_removals_exposing_new_matches_are_cleaned() {
        assert_eq!(
            clean("See [[a][b]][c] here", &conservative()).plain_text,
            "See a here"
        );
    }

    #[test]
    fn test_numeric_vs_named_brackets_conservative() {
        assert_eq!(
            clean("result[1] and note[i]", &conservative()).plain_text,
            "result and note[i]"
        );
    }

    #[test]
    fn test_reference_block_trimmed_in_both_modes() {
        let input = "The answer is 42.\n[1]: https://example.com/a?utm_source=x\nutm_campaign=y\n";
        for settings in both_modes() {
            assert_eq!(clean(input, &settings).plain_text, "The answer is 42.");
        }
    }

    #[test]
    fn test_fenced_code_preserved() {
        let code = "```python\nxs = [1, 2, 3]\nprint(xs[1])  # see [1]\nurl = \"https://example.com\"\n```";
        let input = format!("Here is code [1]:\n\n{code}\n\nDone, see https://example.com.");

        for settings in both_modes() {
            let result = clean(&input, &settings);
            assert!(
                result.plain_text.contains(code),
                "code block altered in {:?}: {}",
                settings.mode,
                result.plain_text
            );
            assert!(!result.plain_text.starts_with("Here is code [1]"));
        }
    }

    #[test]
    fn test_inline_code_preserved_with_spacing() {
        let result = clean("Use `arr[1]` and `<https://x.io>` here [2].", &aggressive());
        assert_eq!(result.plain_text, "Use `arr[1]` and `<https://x.io>` here.");
    }

    #[test]
    fn test_without_code_protection_rules_touch_code() {
        let settings = aggressive().without_code_protection();
        assert_eq!(clean("Use `arr[1]` here", &settings).plain_text, "Use `arr` here");
    }

    #[test]
    fn test_unclosed_fence_is_cleaned_as_prose() {
        let result = clean("```\nlet x = y[1];", &aggressive());
        assert_eq!(result.plain_text, "```\nlet x = y;");
    }

    #[test]
    fn test_code_segments_separated_by_blank_lines() {
        let input = "```\na\n```\n\n\n\n```\nb\n```";
        assert_eq!(
            clean(input, &aggressive()).plain_text,
            "```\na\n```\n\n```\nb\n```"
        );
    }

    #[test]
    fn test_prose_emptied_between_code_keeps_one_separator() {
        let result = clean("`a` [1] `b`", &aggressive());
        assert_eq!(result.plain_text, "`a` `b`");
    }

    #[test]
    fn test_citation_markers_removed() {
        let input = "Tokyo is large.\u{E200}cite\u{E202}turn0search1\u{E201} It has many parks.";
        assert_eq!(
            clean(input, &conservative()).plain_text,
            "Tokyo is large. It has many parks."
        );
    }

    #[test]
    fn test_empty_and_missing_input() {
        let settings = Settings::default();
        assert_eq!(clean("", &settings), CleaningResult {
            plain_text: String::new(),
            html: "<div style=\"white-space:pre-wrap;font-family:inherit;\"></div>".into(),
        });
        assert!(clean_optional(None, &settings).is_empty());
        assert!(clean("   \n\n  ", &settings).is_empty());
    }

    #[test]
    fn test_unknown_mode_from_json_cleans_aggressively() {
        let settings = Settings::from_json(r#"{"mode":"???"}"#).unwrap();
        assert_eq!(
            clean("see [a](https://a.io) here", &settings).plain_text,
            "see a here"
        );
    }

    #[test]
    fn test_html_matches_plain_text() {
        let result = clean("Tom & Jerry <3 [1]", &aggressive());
        assert_eq!(result.plain_text, "Tom & Jerry <3");
        assert_eq!(
            result.html,
            "<div style=\"white-space:pre-wrap;font-family:inherit;\">Tom &amp; Jerry &lt;3</div>"
        );
    }

    #[test]
    fn test_idempotence() {
        let inputs = [
            "Hello world",
            "See MDN Web Docs+1 for details",
            "result[1] and note[i]",
            "[OpenAI](https://openai.com)",
            "Visit <https://a.io> or www.b.io ([Docs][1]) now.\n\n\n\nNext [x][y] para.",
            "Use `arr[1]` and\n```\nraw [1] https://x.io\n```\nthen https://c.io?utm_source=z end.",
            "Paris.\u{E200}cite\u{E202}turn0search0\u{E201} More.\n[1]: https://a.io\nutm_x=1\n",
            "  padded   text\t\twith   gaps  ",
            "Text MDN+1+2 more",
            "[[a][b]][c]",
            "[a]<https://c.io>[a]https://a.io/p?utm_s=1",
            "Hello.\nStack Overflow+2",
            "Intro sentence here.\nDone",
        ];

        for settings in both_modes() {
            for protect in [true, false] {
                let settings = Settings {
                    protect_code_blocks: protect,
                    ..settings
                };
                for input in inputs {
                    let once = clean(input, &settings).plain_text;
                    let twice = clean(&once, &settings).plain_text;
                    assert_eq!(once, twice, "not idempotent for {input:?} with {settings:?}");
                }
            }
        }
    }

    #[test]
    fn test_idempotence_random_inputs() {
        const ALPHABET: &[char] = &[
            '[', ']', '(', ')', '<', '>', '+', '1', '2', 'A', 'M', 'a', 'c', 'e', 'i', 't',
            'h', 'p', 's', 'w', 'u', 'm', '_', '=', '?', ':', '/', '.', '`', ' ', ' ', '\n',
            '\t',
        ];

        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..2_000 {
            let len = rng.gen_range(0..=24);
            let input: String = (0..len)
                .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())])
                .collect();

            for settings in both_modes() {
                for protect in [true, false] {
                    let settings = Settings {
                        protect_code_blocks: protect,
                        ..settings
                    };
                    let once = clean_text(&input, &settings);
                    let twice = clean_text(&once, &settings);
                    assert_eq!(once, twice, "not idempotent for {input:?} with {settings:?}");
                }
            }
        }
    }

    #[test]
    fn test_clean_batch_matches_sequential() {
        let texts = vec![
            "one [1]".to_string(),
            "two https://x.io".to_string(),
            "three".to_string(),
        ];
        let settings = aggressive();
        let batch = clean_batch(&texts, &settings);
        let sequential: Vec<_> = texts.iter().map(|t| clean(t, &settings)).collect();
        assert_eq!(batch, sequential);
    }

    #[test]
    fn test_cleaner_builder() {
        let cleaner = Cleaner::new()
            .conservative()
            .protect_code(false)
            .html_options(HtmlOptions::new().with_container(Container::Pre).without_style());

        assert_eq!(cleaner.settings().mode, CleaningMode::Conservative);
        assert!(!cleaner.settings().protect_code_blocks);

        let result = cleaner.clean("a [1] b");
        assert_eq!(result.plain_text, "a b");
        assert_eq!(result.html, "<pre>a b</pre>");
        assert_eq!(cleaner.clean_text("a [1] b"), "a b");
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let json = serde_json::to_string(&clean("x y", &aggressive())).unwrap();
        assert!(json.starts_with("{\"plainText\":\"x y\",\"html\":"));
    }
}

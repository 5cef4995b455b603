//! Code-span splitting.
//!
//! Partitions text into alternating prose and code segments so the rule set
//! never touches fenced blocks or inline code. Concatenating the segments in
//! order reproduces the input byte for byte.

use regex::Regex;
use std::sync::LazyLock;

/// Fenced blocks (non-greedy, may span lines) or single-backtick inline code
/// without an embedded newline. Unclosed spans do not match and stay prose.
static RE_CODE_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```.*?```|`[^`\n]+`").unwrap());

/// What a segment contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// Ordinary text, subject to the rule set.
    Prose,
    /// A well-formed fenced block or inline code span, kept verbatim.
    Code,
}

/// A contiguous slice of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub kind: SegmentKind,
    pub text: &'a str,
}

impl<'a> Segment<'a> {
    fn prose(text: &'a str) -> Self {
        Self {
            kind: SegmentKind::Prose,
            text,
        }
    }

    fn code(text: &'a str) -> Self {
        Self {
            kind: SegmentKind::Code,
            text,
        }
    }

    /// Returns true for code segments.
    pub fn is_code(&self) -> bool {
        self.kind == SegmentKind::Code
    }
}

/// Splits `input` into ordered prose/code segments.
///
/// Empty prose gaps between adjacent code spans are omitted; every byte of
/// the input belongs to exactly one segment.
///
/// # Example
///
/// ```
/// use copyclean::segment::{split_segments, SegmentKind};
///
/// let segments = split_segments("run `ls -la` now");
/// let kinds: Vec<_> = segments.iter().map(|s| s.kind).collect();
/// assert_eq!(kinds, [SegmentKind::Prose, SegmentKind::Code, SegmentKind::Prose]);
/// assert_eq!(segments[1].text, "`ls -la`");
/// ```
pub fn split_segments(input: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut last = 0;

    for m in RE_CODE_SPAN.find_iter(input) {
        if m.start() > last {
            segments.push(Segment::prose(&input[last..m.start()]));
        }
        segments.push(Segment::code(m.as_str()));
        last = m.end();
    }

    if last < input.len() {
        segments.push(Segment::prose(&input[last..]));
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejoin(segments: &[Segment<'_>]) -> String {
        segments.iter().map(|s| s.text).collect()
    }

    #[test]
    fn test_plain_text_is_single_prose_segment() {
        let segments = split_segments("Hello world");
        assert_eq!(segments, vec![Segment::prose("Hello world")]);
    }

    #[test]
    fn test_empty_input() {
        assert!(split_segments("").is_empty());
    }

    #[test]
    fn test_fenced_block() {
        let input = "Intro:\n```rust\nlet v = arr[1];\n```\nAfter [1]";
        let segments = split_segments(input);

        assert_eq!(segments.len(), 3);
        assert_eq!(segments[1], Segment::code("```rust\nlet v = arr[1];\n```"));
        assert_eq!(rejoin(&segments), input);
    }

    #[test]
    fn test_fences_are_non_greedy() {
        let input = "```a```middle```b```";
        let segments = split_segments(input);
        let kinds: Vec<_> = segments.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            [SegmentKind::Code, SegmentKind::Prose, SegmentKind::Code]
        );
        assert_eq!(segments[1].text, "middle");
    }

    #[test]
    fn test_adjacent_code_spans_have_no_empty_prose() {
        let segments = split_segments("`a``b`");
        assert_eq!(segments, vec![Segment::code("`a`"), Segment::code("`b`")]);
    }

    #[test]
    fn test_unclosed_fence_is_prose() {
        let input = "```python\nprint('never closed')";
        let segments = split_segments(input);
        assert_eq!(segments, vec![Segment::prose(input)]);
    }

    #[test]
    fn test_inline_code_cannot_span_lines() {
        let input = "a `broken\nspan` b";
        let segments = split_segments(input);
        assert!(segments.iter().all(|s| !s.is_code()));
        assert_eq!(rejoin(&segments), input);
    }

    #[test]
    fn test_partition_is_lossless() {
        let input = "x `y` z\n```\ncode\n```\n`unclosed and ``` tail";
        assert_eq!(rejoin(&split_segments(input)), input);
    }
}

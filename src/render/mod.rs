//! HTML rendering for cleaned text.
//!
//! The rich-clipboard flavor of a cleaning result is the plain text, escaped
//! and wrapped in one whitespace-preserving container. No other structure is
//! produced.

mod options;

pub use options::{Container, HtmlOptions, DEFAULT_CONTAINER_STYLE};

use std::borrow::Cow;

/// Escapes the five HTML-significant characters. Everything else passes
/// through verbatim.
pub fn escape_html(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + text.len() / 8);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// Renders `text` as an HTML fragment with custom options.
pub fn render_html(text: &str, options: &HtmlOptions) -> String {
    let tag = options.container.tag();
    let body = escape_html(text);

    if options.style.is_empty() {
        format!("<{tag}>{body}</{tag}>")
    } else {
        format!(
            "<{tag} style=\"{}\">{body}</{tag}>",
            escape_html(&options.style)
        )
    }
}

/// Renders `text` with the default `<div style="white-space:pre-wrap;...">` wrapper.
///
/// # Example
///
/// ```
/// use copyclean::render::to_html;
///
/// assert_eq!(
///     to_html("a < b"),
///     "<div style=\"white-space:pre-wrap;font-family:inherit;\">a &lt; b</div>"
/// );
/// ```
pub fn to_html(text: &str) -> String {
    render_html(text, &HtmlOptions::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_all_five() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_escape_passthrough_is_borrowed() {
        let text = "plain text — with unicode ✓ and\nnewlines";
        assert!(matches!(escape_html(text), Cow::Borrowed(t) if t == text));
    }

    #[test]
    fn test_escape_ampersand_first() {
        // Already-escaped input is escaped again, never decoded
        assert_eq!(escape_html("&lt;"), "&amp;lt;");
    }

    #[test]
    fn test_to_html_default_wrapper() {
        assert_eq!(
            to_html("line 1\nline 2"),
            "<div style=\"white-space:pre-wrap;font-family:inherit;\">line 1\nline 2</div>"
        );
    }

    #[test]
    fn test_to_html_empty() {
        assert_eq!(
            to_html(""),
            "<div style=\"white-space:pre-wrap;font-family:inherit;\"></div>"
        );
    }

    #[test]
    fn test_render_pre_without_style() {
        let options = HtmlOptions::new()
            .with_container(Container::Pre)
            .without_style();
        assert_eq!(render_html("x > y", &options), "<pre>x &gt; y</pre>");
    }

    #[test]
    fn test_custom_style_is_escaped() {
        let options = HtmlOptions::new().with_style("font-family:\"Fira\"");
        assert_eq!(
            render_html("a", &options),
            "<div style=\"font-family:&quot;Fira&quot;\">a</div>"
        );
    }
}

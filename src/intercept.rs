//! Decisions made around a copy event.
//!
//! Capturing text (selection copy, copy buttons, patched clipboard APIs)
//! belongs to the host. This module holds the logic the host runs on the
//! captured text: whether to clean at all, how to honour text that was
//! already cleaned upstream, and how to rewrite a multi-format clipboard item.

use crate::cleanup::{clean, clean_text, CleaningResult};
use crate::render::to_html;
use crate::settings::Settings;

/// Sentinel prefix marking text that was already cleaned upstream.
pub const BYPASS_MARKER: &str = "\0__COPY_CLEANER_BYPASS__\0";

/// MIME type of the plain-text clipboard flavor.
pub const MIME_TEXT_PLAIN: &str = "text/plain";

/// MIME type of the rich-text clipboard flavor.
pub const MIME_TEXT_HTML: &str = "text/html";

/// Prefixes `text` with the bypass marker.
pub fn mark_bypass(text: &str) -> String {
    format!("{BYPASS_MARKER}{text}")
}

/// Returns the text behind the bypass marker, if present.
pub fn strip_bypass_marker(text: &str) -> Option<&str> {
    text.strip_prefix(BYPASS_MARKER)
}

fn notify(settings: &Settings, message: &str) {
    if settings.show_notifications {
        tracing::info!(mode = %settings.mode, "{message}");
    } else {
        tracing::debug!(mode = %settings.mode, "{message}");
    }
}

// ============================================================================
// Selection copy
// ============================================================================

/// Why a copy event was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Cleaning is switched off.
    Disabled,
    /// Nothing was selected.
    EmptySelection,
    /// Cleaning removed everything.
    EmptyResult,
    /// Cleaning made no difference.
    Unchanged,
}

/// What the host should do with a copy event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyDecision {
    /// Let the default copy proceed.
    Skip(SkipReason),
    /// Replace the clipboard contents with the cleaned result.
    Override(CleaningResult),
}

impl CopyDecision {
    /// Returns the cleaned result when the clipboard should be overridden.
    pub fn into_result(self) -> Option<CleaningResult> {
        match self {
            CopyDecision::Override(result) => Some(result),
            CopyDecision::Skip(_) => None,
        }
    }
}

/// Decides whether a selection copy should be overridden.
///
/// # Example
///
/// ```
/// use copyclean::intercept::{selection_copy, CopyDecision, SkipReason};
/// use copyclean::Settings;
///
/// let settings = Settings::default();
/// assert_eq!(
///     selection_copy("Hello world", &settings),
///     CopyDecision::Skip(SkipReason::Unchanged)
/// );
/// assert!(matches!(selection_copy("Hi there [1]", &settings), CopyDecision::Override(_)));
/// ```
pub fn selection_copy(raw: &str, settings: &Settings) -> CopyDecision {
    if !settings.enabled {
        return CopyDecision::Skip(SkipReason::Disabled);
    }
    if raw.is_empty() {
        return CopyDecision::Skip(SkipReason::EmptySelection);
    }

    let result = clean(raw, settings);
    if result.is_empty() {
        return CopyDecision::Skip(SkipReason::EmptyResult);
    }
    if !result.differs_from(raw) {
        return CopyDecision::Skip(SkipReason::Unchanged);
    }

    notify(settings, "selection copy cleaned");
    CopyDecision::Override(result)
}

// ============================================================================
// Clipboard writes
// ============================================================================

/// Cleans text handed to a plain-text clipboard write.
///
/// Disabled settings pass the text through untouched; bypass-marked text is
/// unmarked but not cleaned again.
pub fn intercept_write_text(text: &str, settings: &Settings) -> String {
    if !settings.enabled {
        return text.to_string();
    }

    if let Some(unmarked) = strip_bypass_marker(text) {
        notify(settings, "clipboard write bypassed (already cleaned)");
        return unmarked.to_string();
    }

    let cleaned = clean_text(text, settings);
    notify(settings, "clipboard write cleaned");
    cleaned
}

/// Payload of one clipboard flavor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardData {
    Text(String),
    Binary(Vec<u8>),
}

/// One MIME-typed flavor of a clipboard item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardEntry {
    pub mime: String,
    pub data: ClipboardData,
}

impl ClipboardEntry {
    /// Creates a text entry.
    pub fn text(mime: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            mime: mime.into(),
            data: ClipboardData::Text(text.into()),
        }
    }

    /// Creates a binary entry.
    pub fn binary(mime: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            mime: mime.into(),
            data: ClipboardData::Binary(bytes.into()),
        }
    }

    fn as_text(&self) -> Option<&str> {
        match &self.data {
            ClipboardData::Text(text) => Some(text),
            ClipboardData::Binary(_) => None,
        }
    }
}

/// A clipboard item: the same content in several formats, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClipboardItem {
    pub entries: Vec<ClipboardEntry>,
}

impl ClipboardItem {
    /// Creates an item from its entries.
    pub fn new(entries: Vec<ClipboardEntry>) -> Self {
        Self { entries }
    }

    /// Returns the text of the first entry with `mime`.
    pub fn text(&self, mime: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.mime == mime)
            .and_then(ClipboardEntry::as_text)
    }
}

/// Rewrites a rich clipboard write.
///
/// `text/plain` is cleaned (honouring the bypass marker). `text/html` is
/// regenerated from the cleaned plain text so it carries no links; an item
/// without a plain-text flavor falls back to cleaning the HTML entry's text.
/// Every other flavor (images, ...) is kept as is.
pub fn intercept_write(items: Vec<ClipboardItem>, settings: &Settings) -> Vec<ClipboardItem> {
    if !settings.enabled {
        return items;
    }

    let cleaned: Vec<_> = items
        .into_iter()
        .map(|item| clean_item(item, settings))
        .collect();

    notify(settings, "clipboard write cleaned");
    cleaned
}

fn clean_item(item: ClipboardItem, settings: &Settings) -> ClipboardItem {
    let plain = item.text(MIME_TEXT_PLAIN).map(|text| match strip_bypass_marker(text) {
        Some(unmarked) => unmarked.to_string(),
        None => clean_text(text, settings),
    });

    let entries = item
        .entries
        .into_iter()
        .map(|entry| {
            let replacement = match (entry.mime.as_str(), entry.as_text(), plain.as_deref()) {
                (MIME_TEXT_PLAIN, Some(_), Some(cleaned)) => Some(cleaned.to_string()),
                (MIME_TEXT_HTML, Some(_), Some(cleaned)) => Some(to_html(cleaned)),
                (MIME_TEXT_HTML, Some(html), None) => Some(to_html(&clean_text(html, settings))),
                _ => None,
            };

            match replacement {
                Some(text) => ClipboardEntry {
                    mime: entry.mime,
                    data: ClipboardData::Text(text),
                },
                None => entry,
            }
        })
        .collect();

    ClipboardItem { entries }
}

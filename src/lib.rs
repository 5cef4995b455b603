//! # copyclean
//!
//! Strips citation markers, reference blocks, source badges and link noise
//! from text copied out of AI chat assistants, producing a clean plain-text
//! and HTML pair ready for the clipboard.
//!
//! ## Modes
//!
//! - **Aggressive** (default): removes links (keeping their text), bare URLs
//!   and every bracketed marker
//! - **Conservative**: keeps links, removes numeric markers and `utm_*`
//!   tracking parameters
//!
//! Fenced and inline code spans are left untouched unless code protection
//! is switched off.
//!
//! ## Quick Start
//!
//! ```
//! use copyclean::{clean, Settings};
//!
//! let raw = "Rust is fast [1].\n\n[1]: https://www.rust-lang.org/?utm_source=chatgpt.com\n";
//! let result = clean(raw, &Settings::default());
//!
//! assert_eq!(result.plain_text, "Rust is fast.");
//! assert!(result.html.starts_with("<div"));
//! ```
//!
//! ## Features
//!
//! - `async`: Async I/O support with Tokio
//! - `ffi`: C ABI bindings

pub mod cleanup;
pub mod error;
pub mod intercept;
pub mod render;
pub mod rules;
pub mod segment;
pub mod settings;
pub mod trailing;

#[cfg(feature = "ffi")]
pub mod ffi;

#[cfg(feature = "async")]
pub mod async_api;

// Re-exports
pub use cleanup::{
    clean, clean_batch, clean_optional, clean_text, clean_with_options, Cleaner, CleaningResult,
};
pub use error::{Error, Result};
pub use intercept::{
    intercept_write, intercept_write_text, mark_bypass, selection_copy, strip_bypass_marker,
    ClipboardData, ClipboardEntry, ClipboardItem, CopyDecision, SkipReason, BYPASS_MARKER,
};
pub use render::{render_html, to_html, Container, HtmlOptions};
pub use rules::{Rule, RuleSet};
pub use settings::{CleaningMode, Settings, SettingsUpdate};

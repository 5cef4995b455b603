//! Rendering options for HTML clipboard output.

/// Inline style that keeps line breaks and inherits the page font.
pub const DEFAULT_CONTAINER_STYLE: &str = "white-space:pre-wrap;font-family:inherit;";

/// Options for HTML rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlOptions {
    /// Element wrapping the escaped text.
    pub container: Container,

    /// Value of the container's `style` attribute. Empty means no attribute.
    pub style: String,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            container: Container::Div,
            style: DEFAULT_CONTAINER_STYLE.to_string(),
        }
    }
}

impl HtmlOptions {
    /// Creates new options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the wrapping element.
    pub fn with_container(mut self, container: Container) -> Self {
        self.container = container;
        self
    }

    /// Sets the inline style.
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    /// Drops the inline style attribute.
    pub fn without_style(mut self) -> Self {
        self.style.clear();
        self
    }
}

/// Element used to wrap the rendered text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Container {
    /// `<div>`, relying on the style for whitespace preservation.
    #[default]
    Div,
    /// `<pre>`, preserving whitespace natively.
    Pre,
}

impl Container {
    /// Returns the tag name.
    pub fn tag(&self) -> &'static str {
        match self {
            Container::Div => "div",
            Container::Pre => "pre",
        }
    }
}

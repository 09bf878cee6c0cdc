use super::heading::HeadingConfig;

/// Configuration types for Markdown rendering.
///
/// [`RenderOptions`] is the caller-facing configuration. The engine boundary
/// marshals it into one of two native encodings (see `engine::options`), so
/// every field here has a documented safe default.

/// Options for Markdown rendering.
///
/// # Examples
///
/// ```rust
/// use unhwp::markdown::{RenderOptions, TableFallback};
///
/// // Create with defaults
/// let options = RenderOptions::default();
/// assert!(options.image_path_prefix.is_empty());
///
/// // Or customize
/// let options = RenderOptions::new()
///     .with_frontmatter(true)
///     .with_image_prefix("assets/")
///     .with_table_fallback(TableFallback::Html);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Emit a YAML frontmatter block with the document metadata
    pub include_frontmatter: bool,
    /// Prepended to resource ids in image links
    pub image_path_prefix: String,
    /// How tables are rendered
    pub table_fallback: TableFallback,
    /// Render in-paragraph line breaks as Markdown hard breaks instead of spaces
    pub preserve_line_breaks: bool,
    /// Backslash-escape Markdown metacharacters in text runs
    pub escape_special_chars: bool,
    /// Separate paragraphs with a blank line
    pub paragraph_spacing: bool,
    /// Document-wide heading analysis; `None` trusts paragraph styles alone
    pub heading_analysis: Option<HeadingConfig>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            include_frontmatter: false,
            image_path_prefix: String::new(),
            table_fallback: TableFallback::Markdown,
            preserve_line_breaks: true,
            escape_special_chars: false,
            paragraph_spacing: true,
            heading_analysis: None,
        }
    }
}

impl RenderOptions {
    /// Create options with default values.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to emit YAML frontmatter.
    ///
    /// The block lists title, author, description, dates, tags, generator
    /// and format, omitting fields the document does not have.
    #[inline]
    pub fn with_frontmatter(mut self, include: bool) -> Self {
        self.include_frontmatter = include;
        self
    }

    /// Set the prefix for image links.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use unhwp::markdown::RenderOptions;
    ///
    /// let options = RenderOptions::new().with_image_prefix("images/");
    /// assert_eq!(options.image_path_prefix, "images/");
    /// ```
    #[inline]
    pub fn with_image_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.image_path_prefix = prefix.into();
        self
    }

    #[inline]
    pub fn with_table_fallback(mut self, fallback: TableFallback) -> Self {
        self.table_fallback = fallback;
        self
    }

    #[inline]
    pub fn with_line_breaks(mut self, preserve: bool) -> Self {
        self.preserve_line_breaks = preserve;
        self
    }

    #[inline]
    pub fn with_escaping(mut self, escape: bool) -> Self {
        self.escape_special_chars = escape;
        self
    }

    #[inline]
    pub fn with_paragraph_spacing(mut self, spacing: bool) -> Self {
        self.paragraph_spacing = spacing;
        self
    }

    /// Decide headings with a [`HeadingAnalyzer`](super::HeadingAnalyzer) over the whole document.
    #[inline]
    pub fn with_heading_analysis(mut self, config: HeadingConfig) -> Self {
        self.heading_analysis = Some(config);
        self
    }
}

/// Table rendering modes.
///
/// Discriminants are the values used by the native record encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum TableFallback {
    /// Markdown grid tables.
    ///
    /// Merged cells are expanded: the content sits in the top-left slot and
    /// the covered slots are left empty.
    ///
    /// ```markdown
    /// | Header 1 | Header 2 |
    /// | --- | --- |
    /// | Cell 1 | Cell 2 |
    /// ```
    #[default]
    Markdown = 0,

    /// HTML tables with `rowspan`/`colspan` attributes.
    Html = 1,

    /// One line of text per row, cells separated by ` | `.
    Text = 2,
}

impl TableFallback {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(TableFallback::Markdown),
            1 => Some(TableFallback::Html),
            2 => Some(TableFallback::Text),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_options_builder() {
        let options = RenderOptions::new()
            .with_frontmatter(true)
            .with_image_prefix("img/")
            .with_table_fallback(TableFallback::Text)
            .with_line_breaks(false)
            .with_escaping(true)
            .with_paragraph_spacing(false);

        assert!(options.include_frontmatter);
        assert_eq!(options.image_path_prefix, "img/");
        assert_eq!(options.table_fallback, TableFallback::Text);
        assert!(!options.preserve_line_breaks);
        assert!(options.escape_special_chars);
        assert!(!options.paragraph_spacing);
    }

    #[test]
    fn test_render_options_default() {
        let options = RenderOptions::default();
        assert!(!options.include_frontmatter);
        assert_eq!(options.image_path_prefix, "");
        assert_eq!(options.table_fallback, TableFallback::Markdown);
        assert!(options.preserve_line_breaks);
        assert!(!options.escape_special_chars);
        assert!(options.paragraph_spacing);
        assert!(options.heading_analysis.is_none());
    }

    #[test]
    fn test_heading_analysis_option() {
        let options = RenderOptions::new().with_heading_analysis(HeadingConfig::new().with_max_level(3));
        assert_eq!(options.heading_analysis.map(|c| c.max_heading_level), Some(3));
    }

    #[test]
    fn test_table_fallback_codes() {
        for fallback in [TableFallback::Markdown, TableFallback::Html, TableFallback::Text] {
            assert_eq!(TableFallback::from_u8(fallback as u8), Some(fallback));
        }
        assert_eq!(TableFallback::from_u8(3), None);
    }
}

/// Core trait for Markdown conversion.
///
/// This module defines the `ToMarkdown` trait implemented by the content
/// model types.
use super::config::RenderOptions;
use crate::common::Result;

/// Types that can be rendered as Markdown.
///
/// Implemented for [`Document`](crate::model::Document) and its parts.
/// Rendering never mutates the value, so the same document can be rendered
/// repeatedly with different options.
///
/// # Examples
///
/// ```rust
/// use unhwp::markdown::{RenderOptions, ToMarkdown};
/// use unhwp::model::Paragraph;
///
/// # fn main() -> Result<(), unhwp::Error> {
/// let para = Paragraph::text("a*b");
/// assert_eq!(para.to_markdown()?, "a*b");
///
/// let options = RenderOptions::new().with_escaping(true);
/// assert_eq!(para.to_markdown_with_options(&options)?, "a\\*b");
/// # Ok(())
/// # }
/// ```
pub trait ToMarkdown {
    /// Convert this item to Markdown with default options.
    fn to_markdown(&self) -> Result<String> {
        self.to_markdown_with_options(&RenderOptions::default())
    }

    /// Convert this item to Markdown with custom options.
    fn to_markdown_with_options(&self, options: &RenderOptions) -> Result<String>;
}

/// Markdown rendering for parsed documents.
///
/// # Quick Start
///
/// ```rust,no_run
/// use unhwp::markdown::{RenderOptions, TableFallback, ToMarkdown};
///
/// # fn main() -> Result<(), unhwp::Error> {
/// let document = unhwp::parse_file("report.hwp")?;
/// let markdown = document.to_markdown()?;
///
/// // Or with custom options
/// let options = RenderOptions::new()
///     .with_frontmatter(true)
///     .with_image_prefix("assets/")
///     .with_table_fallback(TableFallback::Html);
/// let markdown = document.to_markdown_with_options(&options)?;
/// # Ok(())
/// # }
/// ```
///
/// # Architecture
///
/// - [`ToMarkdown`] trait: implemented by `Document`, `Paragraph` and `Table`
/// - [`RenderOptions`]: configuration for conversion behavior
/// - `writer`: block separation, inline markup, tables and frontmatter
/// - [`equation`]: HWP equation scripts to LaTeX math
/// - [`HeadingAnalyzer`]: optional document-wide heading detection
///
/// Rendering borrows the document and never mutates it, so one parsed
/// document can be rendered any number of times with different options.
mod config;
mod document;
pub mod equation;
mod heading;
mod traits;
mod writer;

pub use config::{RenderOptions, TableFallback};
pub use heading::{
    ChapterKind, ChapterMarker, HeadingAnalyzer, HeadingConfig, HeadingDecision, chapter_marker,
};
pub use traits::ToMarkdown;
pub use writer::escape_markdown;

use crate::common::Result;
use crate::model::Document;

/// Render a document with the given options.
#[inline]
pub fn render_markdown(document: &Document, options: &RenderOptions) -> Result<String> {
    document.to_markdown_with_options(options)
}

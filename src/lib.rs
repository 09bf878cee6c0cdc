//! unhwp - content extraction for Hangul Word Processor documents
//!
//! This library reads HWP 5.0 (compound file), HWPX (OWPML in a ZIP package)
//! and legacy HWP 3.x documents into a format-independent content model, and
//! renders that model as Markdown, plain text or JSON.
//!
//! # Features
//!
//! - **HWP 5.0**: record streams, embedded images, summary metadata,
//!   distribution documents with a readable body
//! - **HWPX**: section XML, package manifest, `BinData` resources (`hwpx`
//!   feature, on by default)
//! - **HWP 3.x**: EUC-KR bodies (`hwp3` feature, on by default)
//! - **Markdown**: frontmatter, headings, lists, emphasis, tables with merged
//!   cells, images, equations and footnotes
//! - **Cleanup**: optional pipeline that strips page numbers, tables of
//!   contents and other layout noise from rendered Markdown
//! - **Engine boundary**: handle lifecycle, error taxonomy and a C ABI for
//!   host-language bindings
//!
//! # Example - Markdown from a file
//!
//! ```no_run
//! use unhwp::markdown::RenderOptions;
//!
//! # fn main() -> Result<(), unhwp::Error> {
//! let markdown = unhwp::to_markdown_with_options(
//!     "report.hwp",
//!     &RenderOptions::new().with_frontmatter(true),
//! )?;
//! println!("{}", markdown);
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Walking the content model
//!
//! ```no_run
//! use unhwp::model::Block;
//!
//! # fn main() -> Result<(), unhwp::Error> {
//! let document = unhwp::parse_file("report.hwpx")?;
//! println!("title: {:?}", document.metadata.title);
//!
//! for section in &document.sections {
//!     for block in &section.content {
//!         match block {
//!             Block::Paragraph(p) => println!("{}", p.plain_text()),
//!             Block::Table(t) => println!("[table: {} rows]", t.row_count()),
//!         }
//!     }
//! }
//!
//! for resource in &document.resources {
//!     println!("{} ({} bytes)", resource.id, resource.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Handles
//!
//! ```no_run
//! use unhwp::cleanup::CleanupOptions;
//! use unhwp::engine::{ContentAccess, Engine};
//! use unhwp::markdown::RenderOptions;
//!
//! # fn main() -> Result<(), unhwp::Error> {
//! let engine = Engine::new();
//! let handle = engine.open_file("report.hwp", RenderOptions::default(), CleanupOptions::default())?;
//! for id in handle.resource_ids()? {
//!     std::fs::write(&id, handle.resource_data(&id)?)?;
//! }
//! handle.release();
//! # Ok(())
//! # }
//! ```

/// Markdown cleanup pipeline
pub mod cleanup;

/// Errors, format detection and binary helpers shared by the readers
pub mod common;

/// Handle lifecycle, option marshaling and error channel
pub mod engine;

/// C ABI over the engine
pub mod ffi;

/// HWP 5.0 reader
pub mod hwp5;

/// HWPX reader
#[cfg(feature = "hwpx")]
pub mod hwpx;

/// HWP 3.x reader
#[cfg(feature = "hwp3")]
pub mod hwp3;

/// Markdown rendering
pub mod markdown;

/// Format-independent content model
pub mod model;

/// Compound file (OLE2) container reader
pub mod ole;

pub mod parse_options;

// Re-export commonly used types for convenience
pub use cleanup::{CleanupOptions, CleanupPreset, cleanup};
pub use common::{Error, ErrorKind, FormatKind, Result, detect_format, detect_format_from_bytes};
pub use markdown::{RenderOptions, TableFallback, ToMarkdown};
pub use model::Document;
pub use parse_options::{ErrorMode, ParseOptions};

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

/// Parse a document from a file path with default options.
///
/// The format is detected from content, not from the extension.
///
/// # Examples
///
/// ```no_run
/// let document = unhwp::parse_file("example.hwp")?;
/// println!("paragraphs: {}", document.paragraph_count());
/// # Ok::<(), unhwp::Error>(())
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    parse_file_with_options(path, &ParseOptions::default())
}

/// Parse a document from a file path.
///
/// A missing file fails with [`Error::FileNotFound`].
pub fn parse_file_with_options<P: AsRef<Path>>(path: P, options: &ParseOptions) -> Result<Document> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::FileNotFound(path.to_path_buf()),
        _ => Error::Io(e),
    })?;
    parse_reader(BufReader::new(file), options)
}

/// Parse a document held in memory with default options.
///
/// # Examples
///
/// ```rust
/// use unhwp::ErrorKind;
///
/// let err = unhwp::parse_bytes(b"not a document").unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::ParseError);
/// ```
pub fn parse_bytes(data: &[u8]) -> Result<Document> {
    parse_reader(Cursor::new(data), &ParseOptions::default())
}

/// Parse a document held in memory.
pub fn parse_bytes_with_options(data: &[u8], options: &ParseOptions) -> Result<Document> {
    parse_reader(Cursor::new(data), options)
}

/// Parse a document from any seekable reader.
///
/// Unrecognized content fails with [`Error::InvalidFormat`], which reports
/// as [`ErrorKind::ParseError`].
pub fn parse_reader<R: Read + Seek>(mut reader: R, options: &ParseOptions) -> Result<Document> {
    let format = common::detect_format_from_reader(&mut reader);
    log::debug!("parsing {} document", format);

    match format {
        FormatKind::Hwp5 => hwp5::Hwp5Reader::open(reader)?.parse(options),
        #[cfg(feature = "hwpx")]
        FormatKind::Hwpx => hwpx::HwpxReader::open(reader)?.parse(options),
        #[cfg(feature = "hwp3")]
        FormatKind::Hwp3 => hwp3::Hwp3Reader::open(reader)?.parse(options),
        FormatKind::Unknown => Err(Error::InvalidFormat(
            "not an HWP, HWPX or HWP 3.x document".to_string(),
        )),
        #[allow(unreachable_patterns)]
        other => Err(Error::Unsupported(format!(
            "{} support is not compiled in",
            other
        ))),
    }
}

/// Detect the format of a file; see [`common::detect_format`].
#[inline]
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> FormatKind {
    detect_format(path)
}

/// Plain text of a document file: paragraphs and table cells, one per line.
///
/// # Examples
///
/// ```no_run
/// let text = unhwp::extract_text("document.hwp")?;
/// println!("{}", text);
/// # Ok::<(), unhwp::Error>(())
/// ```
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    Ok(parse_file(path)?.plain_text())
}

/// Markdown of a document file with default render options.
pub fn to_markdown<P: AsRef<Path>>(path: P) -> Result<String> {
    to_markdown_with_options(path, &RenderOptions::default())
}

/// Markdown of a document file.
///
/// # Examples
///
/// ```no_run
/// use unhwp::{RenderOptions, TableFallback};
///
/// let options = RenderOptions::new()
///     .with_image_prefix("images/")
///     .with_table_fallback(TableFallback::Html)
///     .with_frontmatter(true);
/// let markdown = unhwp::to_markdown_with_options("document.hwp", &options)?;
/// std::fs::write("output.md", markdown)?;
/// # Ok::<(), unhwp::Error>(())
/// ```
pub fn to_markdown_with_options<P: AsRef<Path>>(path: P, options: &RenderOptions) -> Result<String> {
    parse_file(path)?.to_markdown_with_options(options)
}

/// Library version.
#[inline]
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

//! Engine boundary.
//!
//! Everything a host binding needs on top of the readers and renderers:
//!
//! - [`Engine`]: entry point that detects, parses and wraps a document in a
//!   handle
//! - [`ResultHandle`] / [`DocumentHandle`]: the two handle shapes, both read
//!   through [`ContentAccess`]
//! - [`options`]: the record and bit-flag encodings of render options
//! - [`ErrorChannel`]: per-thread last error for status-code callers
//! - [`BufferRegistry`]: ownership of strings and buffers handed to a host
//!
//! # Example
//!
//! ```rust
//! use unhwp::engine::{Engine, ErrorChannel};
//! use unhwp::{CleanupOptions, ErrorKind, RenderOptions};
//!
//! let engine = Engine::new();
//! let parsed = engine.parse_bytes(b"not a document", &RenderOptions::default(), &CleanupOptions::default());
//! assert!(ErrorChannel::capture(parsed).is_none());
//! assert_eq!(ErrorChannel::last_code(), ErrorKind::ParseError.code());
//! ```

// Submodule declarations
pub mod buffers;
pub mod error_channel;
pub mod handle;
pub mod lifecycle;
pub mod options;
pub mod resources;

// Re-exports
pub use buffers::BufferRegistry;
pub use error_channel::{EmbeddedError, ErrorChannel};
pub use handle::{ContentAccess, DocumentHandle, ResultHandle};
pub use lifecycle::{HandleCell, HandleId, HandleTable};
pub use options::{
    NativeCleanup, NativeEncoding, NativeRenderOptions, RenderFlags, from_native,
    table_fallback_from_native, to_native,
};

use crate::cleanup::CleanupOptions;
use crate::common::{FormatKind, Result, detect_format, detect_format_from_bytes};
use crate::markdown::RenderOptions;
use crate::model::Document;
use crate::parse_options::ParseOptions;
use std::path::Path;

/// Entry point of the boundary.
///
/// Parsing either succeeds and yields a handle, or fails with an error and
/// yields nothing; a partially built handle never escapes.
///
/// # Examples
///
/// ```rust,no_run
/// use unhwp::engine::{ContentAccess, Engine};
/// use unhwp::{CleanupOptions, RenderOptions};
///
/// let engine = Engine::new();
/// let result = engine.parse_file(
///     "report.hwp",
///     &RenderOptions::new().with_frontmatter(true),
///     &CleanupOptions::default(),
/// )?;
/// println!("{}", result.markdown(None)?);
/// result.release();
/// # Ok::<(), unhwp::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Engine {
    parse: ParseOptions,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse = options;
        self
    }

    #[inline]
    pub fn parse_options(&self) -> &ParseOptions {
        &self.parse
    }

    /// Detect the format of a file. Never fails.
    #[inline]
    pub fn detect<P: AsRef<Path>>(&self, path: P) -> FormatKind {
        detect_format(path)
    }

    /// Detect the format of an in-memory buffer. Never fails.
    #[inline]
    pub fn detect_bytes(&self, data: &[u8]) -> FormatKind {
        detect_format_from_bytes(data)
    }

    /// Parse a file into a handle with everything rendered up front.
    pub fn parse_file<P: AsRef<Path>>(
        &self,
        path: P,
        render: &RenderOptions,
        cleanup: &CleanupOptions,
    ) -> Result<ResultHandle> {
        let document = self.load_file(path.as_ref())?;
        Ok(ResultHandle::new(document, render.clone(), cleanup))
    }

    /// Parse a buffer into a handle with everything rendered up front.
    pub fn parse_bytes(
        &self,
        data: &[u8],
        render: &RenderOptions,
        cleanup: &CleanupOptions,
    ) -> Result<ResultHandle> {
        let document = self.load_bytes(data)?;
        Ok(ResultHandle::new(document, render.clone(), cleanup))
    }

    /// Open a file as a handle that renders on demand.
    ///
    /// `defaults` apply to Markdown calls that pass no options; `cleanup`
    /// applies to every Markdown call.
    pub fn open_file<P: AsRef<Path>>(
        &self,
        path: P,
        defaults: RenderOptions,
        cleanup: CleanupOptions,
    ) -> Result<DocumentHandle> {
        let document = self.load_file(path.as_ref())?;
        Ok(DocumentHandle::new(document, defaults, cleanup))
    }

    /// Open a buffer as a handle that renders on demand.
    pub fn open_bytes(
        &self,
        data: &[u8],
        defaults: RenderOptions,
        cleanup: CleanupOptions,
    ) -> Result<DocumentHandle> {
        let document = self.load_bytes(data)?;
        Ok(DocumentHandle::new(document, defaults, cleanup))
    }

    fn load_file(&self, path: &Path) -> Result<Document> {
        let document = crate::parse_file_with_options(path, &self.parse)?;
        log::debug!(
            "opened {}: {} sections, {} resources",
            path.display(),
            document.section_count(),
            document.resources.len()
        );
        Ok(document)
    }

    fn load_bytes(&self, data: &[u8]) -> Result<Document> {
        let document = crate::parse_bytes_with_options(data, &self.parse)?;
        log::debug!(
            "opened {} byte buffer: {} sections, {} resources",
            data.len(),
            document.section_count(),
            document.resources.len()
        );
        Ok(document)
    }
}

#[cfg(test)]
mod tests;

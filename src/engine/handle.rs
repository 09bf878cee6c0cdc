//! Document and result handles.
//!
//! Both handle types own one parsed [`Document`] and expose it through
//! [`ContentAccess`]. They differ in when content is produced:
//!
//! - [`ResultHandle`] renders everything once, while the handle is built.
//!   Its render options are fixed; asking for Markdown with different options
//!   is an error and the caller must parse again.
//! - [`DocumentHandle`] renders on every call, with whatever options the call
//!   passes. Rendering never mutates the document.
//!
//! Every accessor checks that the handle is still open and holds it open for
//! the duration of the call.

use super::error_channel::EmbeddedError;
use super::lifecycle::HandleCell;
use super::options::{NativeRenderOptions, from_native};
use super::resources;
use crate::cleanup::{self, CleanupOptions};
use crate::common::{Error, Result};
use crate::markdown::{RenderOptions, render_markdown};
use crate::model::{Document, Metadata};
use bytes::Bytes;
use parking_lot::MappedRwLockReadGuard;

/// Render `document` and run the cleanup pipeline over the result.
pub(crate) fn render(
    document: &Document,
    options: &RenderOptions,
    cleanup: &CleanupOptions,
) -> Result<String> {
    let markdown = render_markdown(document, options)?;
    if cleanup.enabled {
        Ok(cleanup::cleanup(&markdown, cleanup))
    } else {
        Ok(markdown)
    }
}

/// Read access to a parsed document.
pub trait ContentAccess: Send + Sync {
    /// Whether [`markdown`](Self::markdown) honours options passed per call.
    fn supports_per_call_options(&self) -> bool;

    /// Borrow the document. Fails with [`Error::InvalidState`] after release.
    fn document(&self) -> Result<MappedRwLockReadGuard<'_, Document>>;

    /// Markdown for the document.
    ///
    /// `None` uses the options the handle was created with.
    fn markdown(&self, options: Option<&RenderOptions>) -> Result<String>;

    /// Plain text, one line per paragraph and table cell.
    fn text(&self) -> Result<String>;

    /// The content tree as JSON.
    fn json(&self, pretty: bool) -> Result<String>;

    /// Close the handle. Returns whether this call did the closing; later
    /// calls are no-ops.
    fn release(&self) -> bool;

    fn is_open(&self) -> bool;

    fn section_count(&self) -> Result<usize> {
        Ok(self.document()?.section_count())
    }

    fn paragraph_count(&self) -> Result<usize> {
        Ok(self.document()?.paragraph_count())
    }

    fn resource_count(&self) -> Result<usize> {
        Ok(resources::resource_count(&*self.document()?))
    }

    fn image_count(&self) -> Result<usize> {
        Ok(self.document()?.image_count())
    }

    fn metadata(&self) -> Result<Metadata> {
        Ok(self.document()?.metadata.clone())
    }

    fn title(&self) -> Result<Option<String>> {
        Ok(self.document()?.metadata.title.clone())
    }

    fn author(&self) -> Result<Option<String>> {
        Ok(self.document()?.metadata.author.clone())
    }

    fn is_distribution(&self) -> Result<bool> {
        Ok(self.document()?.metadata.is_distribution)
    }

    fn resource_ids(&self) -> Result<Vec<String>> {
        Ok(resources::resource_ids(&*self.document()?))
    }

    fn resource_data(&self, id: &str) -> Result<Bytes> {
        resources::resource_data(&*self.document()?, id)
    }

    fn all_resources(&self) -> Result<Vec<(String, Bytes)>> {
        Ok(resources::all_resources(&*self.document()?))
    }
}

/// Content produced at parse time.
#[derive(Debug)]
struct Precomputed {
    document: Document,
    options: RenderOptions,
    markdown: std::result::Result<String, EmbeddedError>,
    text: String,
    json: std::result::Result<String, EmbeddedError>,
    json_pretty: std::result::Result<String, EmbeddedError>,
}

/// Handle with all content rendered up front.
///
/// A rendering failure does not fail the parse: it is kept as an embedded
/// error, returned by the affected accessor and by [`error`](Self::error).
#[derive(Debug)]
pub struct ResultHandle {
    cell: HandleCell<Precomputed>,
}

impl ResultHandle {
    pub fn new(document: Document, options: RenderOptions, cleanup: &CleanupOptions) -> Self {
        let embed = |r: Result<String>| r.map_err(|e| EmbeddedError::from_error(&e));
        let markdown = embed(render(&document, &options, cleanup));
        let text = document.plain_text();
        let json = embed(document.to_json(false));
        let json_pretty = embed(document.to_json(true));
        if let Err(e) = &markdown {
            log::warn!("markdown rendering failed: {}", e.message);
        }

        Self {
            cell: HandleCell::new(Precomputed {
                document,
                options,
                markdown,
                text,
                json,
                json_pretty,
            }),
        }
    }

    /// Options the Markdown was rendered with.
    pub fn options(&self) -> Result<RenderOptions> {
        Ok(self.cell.read()?.options.clone())
    }

    /// The first error embedded while rendering, if any.
    pub fn error(&self) -> Result<Option<EmbeddedError>> {
        let state = self.cell.read()?;
        Ok([&state.markdown, &state.json, &state.json_pretty]
            .into_iter()
            .find_map(|r| r.as_ref().err().cloned()))
    }

    /// Compact JSON of the content tree.
    pub fn raw_content(&self) -> Result<String> {
        self.json(false)
    }
}

impl ContentAccess for ResultHandle {
    fn supports_per_call_options(&self) -> bool {
        false
    }

    fn document(&self) -> Result<MappedRwLockReadGuard<'_, Document>> {
        Ok(MappedRwLockReadGuard::map(self.cell.read()?, |state| {
            &state.document
        }))
    }

    fn markdown(&self, options: Option<&RenderOptions>) -> Result<String> {
        let state = self.cell.read()?;
        if let Some(requested) = options {
            if *requested != state.options {
                return Err(Error::InvalidArgument(
                    "render options are fixed when the result is parsed; parse again to change them"
                        .to_string(),
                ));
            }
        }
        state.markdown.clone().map_err(|e| e.to_error())
    }

    fn text(&self) -> Result<String> {
        Ok(self.cell.read()?.text.clone())
    }

    fn json(&self, pretty: bool) -> Result<String> {
        let state = self.cell.read()?;
        let json = if pretty { &state.json_pretty } else { &state.json };
        json.clone().map_err(|e| e.to_error())
    }

    fn release(&self) -> bool {
        let closed = self.cell.close();
        if closed {
            log::debug!("result handle released");
        }
        closed
    }

    fn is_open(&self) -> bool {
        self.cell.is_open()
    }
}

impl Drop for ResultHandle {
    fn drop(&mut self) {
        self.release();
    }
}

/// Handle that renders on demand.
#[derive(Debug)]
pub struct DocumentHandle {
    cell: HandleCell<Document>,
    defaults: RenderOptions,
    cleanup: CleanupOptions,
}

impl DocumentHandle {
    pub fn new(document: Document, defaults: RenderOptions, cleanup: CleanupOptions) -> Self {
        Self {
            cell: HandleCell::new(document),
            defaults,
            cleanup,
        }
    }

    /// Markdown with options in a native encoding.
    pub fn markdown_native(&self, options: &NativeRenderOptions) -> Result<String> {
        self.markdown(Some(&from_native(options)))
    }

    pub fn cleanup_options(&self) -> &CleanupOptions {
        &self.cleanup
    }
}

impl ContentAccess for DocumentHandle {
    fn supports_per_call_options(&self) -> bool {
        true
    }

    fn document(&self) -> Result<MappedRwLockReadGuard<'_, Document>> {
        self.cell.read()
    }

    fn markdown(&self, options: Option<&RenderOptions>) -> Result<String> {
        let document = self.cell.read()?;
        render(&document, options.unwrap_or(&self.defaults), &self.cleanup)
    }

    fn text(&self) -> Result<String> {
        Ok(self.cell.read()?.plain_text())
    }

    fn json(&self, pretty: bool) -> Result<String> {
        self.cell.read()?.to_json(pretty)
    }

    fn release(&self) -> bool {
        let closed = self.cell.close();
        if closed {
            log::debug!("document handle released");
        }
        closed
    }

    fn is_open(&self) -> bool {
        self.cell.is_open()
    }
}

impl Drop for DocumentHandle {
    fn drop(&mut self) {
        self.release();
    }
}

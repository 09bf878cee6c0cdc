//! Generation 2: document ids.
//!
//! `unhwp_open` returns a non-zero id. Content is rendered on each call, so
//! one open document can be rendered with any number of option sets. Id 0
//! means failure; a closed id is rejected with `UNHWP_ERR_INVALID_STATE`.

use super::types::{UnhwpCleanupOptions, UnhwpRenderOptions};
use super::{byte_slice, c_str, count, give_string, guard, status, write_out};
use crate::common::{Error, Result};
use crate::engine::{
    BufferRegistry, ContentAccess, DocumentHandle, Engine, HandleId, HandleTable,
    NativeRenderOptions, RenderFlags,
};
use once_cell::sync::Lazy;
use std::ffi::c_char;
use std::ptr;
use std::sync::Arc;

static DOCUMENTS: Lazy<HandleTable<DocumentHandle>> = Lazy::new(HandleTable::new);

fn lookup(doc: HandleId) -> Result<Arc<DocumentHandle>> {
    DOCUMENTS.get(doc)
}

/// Optional string accessor: NULL when absent, with the slot cleared.
fn optional_string(value: Option<String>) -> Result<*mut c_char> {
    match value {
        Some(value) => give_string(value),
        None => Ok(ptr::null_mut()),
    }
}

/// Open a file. Returns 0 on failure.
///
/// `defaults` apply to [`unhwp_doc_markdown_ex`] calls without options;
/// `cleanup` applies to every Markdown call. NULL means defaults and cleanup
/// off. Release with [`unhwp_close`].
///
/// # Safety
///
/// `path` must be a valid null-terminated string; option pointers must be
/// NULL or valid records.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn unhwp_open(
    path: *const c_char,
    defaults: *const UnhwpRenderOptions,
    cleanup: *const UnhwpCleanupOptions,
) -> HandleId {
    guard(0, || {
        let path = unsafe { c_str(path, "path") }?;
        let defaults = unsafe { UnhwpRenderOptions::resolve(defaults) }?;
        let cleanup = unsafe { UnhwpCleanupOptions::resolve(cleanup) }?;
        let handle = Engine::new().open_file(path, defaults, cleanup)?;
        Ok(DOCUMENTS.insert(handle))
    })
}

/// Open an in-memory document; see [`unhwp_open`].
///
/// # Safety
///
/// `data` must be valid for reads of `len` bytes; option pointers as for
/// [`unhwp_open`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn unhwp_open_bytes(
    data: *const u8,
    len: usize,
    defaults: *const UnhwpRenderOptions,
    cleanup: *const UnhwpCleanupOptions,
) -> HandleId {
    guard(0, || {
        let bytes = unsafe { byte_slice(data, len) }?;
        let defaults = unsafe { UnhwpRenderOptions::resolve(defaults) }?;
        let cleanup = unsafe { UnhwpCleanupOptions::resolve(cleanup) }?;
        let handle = Engine::new().open_bytes(bytes, defaults, cleanup)?;
        Ok(DOCUMENTS.insert(handle))
    })
}

/// Markdown with render flags (see `RenderFlags`).
///
/// A closed id fails with `UNHWP_ERR_INVALID_STATE` before the flags are
/// checked; undefined bits fail with `UNHWP_ERR_INVALID_ARG`. Free with
/// `unhwp_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn unhwp_doc_markdown(doc: HandleId, flags: u32) -> *mut c_char {
    guard(ptr::null_mut(), || {
        let handle = lookup(doc)?;
        let flags = NativeRenderOptions::Flags(RenderFlags::from_native(flags)?);
        give_string(handle.markdown_native(&flags)?)
    })
}

/// Markdown with a full options record; NULL uses the defaults given at open.
///
/// # Safety
///
/// `options` must be NULL or a valid record.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn unhwp_doc_markdown_ex(
    doc: HandleId,
    options: *const UnhwpRenderOptions,
) -> *mut c_char {
    guard(ptr::null_mut(), || {
        let handle = lookup(doc)?;
        let markdown = match unsafe { options.as_ref() } {
            Some(record) => {
                let record = NativeRenderOptions::Record(unsafe { record.to_options() }?);
                handle.markdown_native(&record)?
            },
            None => handle.markdown(None)?,
        };
        give_string(markdown)
    })
}

/// Plain text. Free with `unhwp_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn unhwp_doc_text(doc: HandleId) -> *mut c_char {
    guard(ptr::null_mut(), || give_string(lookup(doc)?.text()?))
}

/// Content tree as JSON, indented when `pretty` is non-zero.
#[unsafe(no_mangle)]
pub extern "C" fn unhwp_doc_json(doc: HandleId, pretty: i32) -> *mut c_char {
    guard(ptr::null_mut(), || give_string(lookup(doc)?.json(pretty != 0)?))
}

#[unsafe(no_mangle)]
pub extern "C" fn unhwp_doc_section_count(doc: HandleId) -> i32 {
    guard(-1, || Ok(count(lookup(doc)?.section_count()?)))
}

#[unsafe(no_mangle)]
pub extern "C" fn unhwp_doc_paragraph_count(doc: HandleId) -> i32 {
    guard(-1, || Ok(count(lookup(doc)?.paragraph_count()?)))
}

#[unsafe(no_mangle)]
pub extern "C" fn unhwp_doc_resource_count(doc: HandleId) -> i32 {
    guard(-1, || Ok(count(lookup(doc)?.resource_count()?)))
}

#[unsafe(no_mangle)]
pub extern "C" fn unhwp_doc_image_count(doc: HandleId) -> i32 {
    guard(-1, || Ok(count(lookup(doc)?.image_count()?)))
}

#[unsafe(no_mangle)]
pub extern "C" fn unhwp_doc_is_distribution(doc: HandleId) -> i32 {
    guard(-1, || Ok(i32::from(lookup(doc)?.is_distribution()?)))
}

/// Title, or NULL when the document has none (last error code stays OK).
#[unsafe(no_mangle)]
pub extern "C" fn unhwp_doc_title(doc: HandleId) -> *mut c_char {
    guard(ptr::null_mut(), || optional_string(lookup(doc)?.title()?))
}

/// Author, or NULL when the document has none (last error code stays OK).
#[unsafe(no_mangle)]
pub extern "C" fn unhwp_doc_author(doc: HandleId) -> *mut c_char {
    guard(ptr::null_mut(), || optional_string(lookup(doc)?.author()?))
}

/// Resource ids in discovery order, as a JSON array of strings.
#[unsafe(no_mangle)]
pub extern "C" fn unhwp_doc_resource_ids(doc: HandleId) -> *mut c_char {
    guard(ptr::null_mut(), || {
        let ids = lookup(doc)?.resource_ids()?;
        give_string(serde_json::to_string(&ids)?)
    })
}

/// Copy of the resource named `id`.
///
/// Returns NULL with `UNHWP_ERR_NOT_FOUND` for an unknown id. Free with
/// `unhwp_free_buffer(ptr, *out_len)`.
///
/// # Safety
///
/// `id` must be a valid null-terminated string, `out_len` valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn unhwp_doc_resource(
    doc: HandleId,
    id: *const c_char,
    out_len: *mut usize,
) -> *mut u8 {
    guard(ptr::null_mut(), || {
        if out_len.is_null() {
            return Err(Error::InvalidArgument("output pointer is NULL".to_string()));
        }
        let id = unsafe { c_str(id, "resource id") }?;
        let data = lookup(doc)?.resource_data(id)?;
        let (buffer, len) = BufferRegistry::global().alloc_bytes(&data)?;
        unsafe { write_out(out_len, len) }?;
        Ok(buffer)
    })
}

/// Close a document. Closing an id twice, or id 0, is a no-op and returns
/// `UNHWP_OK`.
#[unsafe(no_mangle)]
pub extern "C" fn unhwp_close(doc: HandleId) -> i32 {
    status(|| {
        if let Some(handle) = DOCUMENTS.remove(doc) {
            handle.release();
        }
        Ok(())
    })
}

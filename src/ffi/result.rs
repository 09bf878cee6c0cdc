//! Generation 1: result handles.
//!
//! `unhwp_parse` renders Markdown, text and JSON once and returns an opaque
//! `UnhwpResult*`. The pointer value is a handle table id; it is never
//! dereferenced, so a freed or forged pointer is rejected with
//! `UNHWP_ERR_INVALID_STATE` rather than touching freed memory.

use super::types::{UnhwpCleanupOptions, UnhwpImage, UnhwpRenderOptions, UnhwpResult};
use super::{byte_slice, c_str, count, give_string, guard, status, write_out};
use crate::common::{Error, Result};
use crate::engine::{BufferRegistry, ContentAccess, Engine, HandleId, HandleTable, ResultHandle};
use once_cell::sync::Lazy;
use std::ffi::c_char;
use std::ptr;
use std::sync::Arc;

static RESULTS: Lazy<HandleTable<ResultHandle>> = Lazy::new(HandleTable::new);

#[inline]
fn to_ptr(id: HandleId) -> *mut UnhwpResult {
    id as usize as *mut UnhwpResult
}

fn lookup(result: *const UnhwpResult) -> Result<Arc<ResultHandle>> {
    if result.is_null() {
        return Err(Error::InvalidArgument("result is NULL".to_string()));
    }
    RESULTS.get(result as usize as HandleId)
}

fn register(handle: ResultHandle) -> *mut UnhwpResult {
    to_ptr(RESULTS.insert(handle))
}

/// Parse a file.
///
/// Returns NULL on failure; the reason is in the last-error slot. NULL
/// options mean defaults and cleanup off. Release with
/// [`unhwp_result_free`].
///
/// # Safety
///
/// `path` must be a valid null-terminated string; option pointers must be
/// NULL or valid records.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn unhwp_parse(
    path: *const c_char,
    render_options: *const UnhwpRenderOptions,
    cleanup_options: *const UnhwpCleanupOptions,
) -> *mut UnhwpResult {
    guard(ptr::null_mut(), || {
        let path = unsafe { c_str(path, "path") }?;
        let render = unsafe { UnhwpRenderOptions::resolve(render_options) }?;
        let cleanup = unsafe { UnhwpCleanupOptions::resolve(cleanup_options) }?;
        let handle = Engine::new().parse_file(path, &render, &cleanup)?;
        Ok(register(handle))
    })
}

/// Parse an in-memory document; see [`unhwp_parse`].
///
/// # Safety
///
/// `data` must be valid for reads of `len` bytes; option pointers as for
/// [`unhwp_parse`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn unhwp_parse_bytes(
    data: *const u8,
    len: usize,
    render_options: *const UnhwpRenderOptions,
    cleanup_options: *const UnhwpCleanupOptions,
) -> *mut UnhwpResult {
    guard(ptr::null_mut(), || {
        let bytes = unsafe { byte_slice(data, len) }?;
        let render = unsafe { UnhwpRenderOptions::resolve(render_options) }?;
        let cleanup = unsafe { UnhwpCleanupOptions::resolve(cleanup_options) }?;
        let handle = Engine::new().parse_bytes(bytes, &render, &cleanup)?;
        Ok(register(handle))
    })
}

/// Markdown rendered at parse time. Free with `unhwp_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn unhwp_result_get_markdown(result: *const UnhwpResult) -> *mut c_char {
    guard(ptr::null_mut(), || give_string(lookup(result)?.markdown(None)?))
}

/// Plain text. Free with `unhwp_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn unhwp_result_get_text(result: *const UnhwpResult) -> *mut c_char {
    guard(ptr::null_mut(), || give_string(lookup(result)?.text()?))
}

/// Content tree as compact JSON. Free with `unhwp_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn unhwp_result_get_raw_content(result: *const UnhwpResult) -> *mut c_char {
    guard(ptr::null_mut(), || give_string(lookup(result)?.raw_content()?))
}

/// Number of sections, or -1 on error.
#[unsafe(no_mangle)]
pub extern "C" fn unhwp_result_get_section_count(result: *const UnhwpResult) -> i32 {
    guard(-1, || Ok(count(lookup(result)?.section_count()?)))
}

/// Number of top-level paragraphs, or -1 on error.
#[unsafe(no_mangle)]
pub extern "C" fn unhwp_result_get_paragraph_count(result: *const UnhwpResult) -> i32 {
    guard(-1, || Ok(count(lookup(result)?.paragraph_count()?)))
}

/// Number of retrievable embedded resources, or -1 on error.
#[unsafe(no_mangle)]
pub extern "C" fn unhwp_result_get_image_count(result: *const UnhwpResult) -> i32 {
    guard(-1, || Ok(count(lookup(result)?.resource_count()?)))
}

/// Copy the resource at `index` into `out_image`.
///
/// Both the name and the data belong to the caller afterwards.
///
/// # Safety
///
/// `out_image` must be valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn unhwp_result_get_image(
    result: *const UnhwpResult,
    index: i32,
    out_image: *mut UnhwpImage,
) -> i32 {
    status(|| {
        if out_image.is_null() {
            return Err(Error::InvalidArgument("output pointer is NULL".to_string()));
        }
        let handle = lookup(result)?;
        let ids = handle.resource_ids()?;
        let id = usize::try_from(index)
            .ok()
            .and_then(|i| ids.get(i))
            .ok_or_else(|| {
                Error::InvalidArgument(format!("image index {} out of range 0..{}", index, ids.len()))
            })?;

        let data = handle.resource_data(id)?;
        let registry = BufferRegistry::global();
        let (data_ptr, data_len) = registry.alloc_bytes(&data)?;
        let name = match registry.alloc_string(id.clone()) {
            Ok(name) => name,
            Err(e) => {
                let _ = registry.free_bytes(data_ptr, data_len);
                return Err(e);
            },
        };
        unsafe {
            write_out(
                out_image,
                UnhwpImage {
                    name,
                    data: data_ptr,
                    data_len,
                },
            )
        }
    })
}

/// 1 for a distribution document, 0 otherwise, -1 on error.
#[unsafe(no_mangle)]
pub extern "C" fn unhwp_result_get_is_distribution(result: *const UnhwpResult) -> i32 {
    guard(-1, || Ok(i32::from(lookup(result)?.is_distribution()?)))
}

/// Error embedded while rendering at parse time, or NULL when rendering
/// succeeded. Free with `unhwp_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn unhwp_result_get_error(result: *const UnhwpResult) -> *mut c_char {
    guard(ptr::null_mut(), || match lookup(result)?.error()? {
        Some(error) => give_string(error.message),
        None => Ok(ptr::null_mut()),
    })
}

/// Release a result. Releasing NULL or an already released result is a
/// no-op; strings and buffers taken from the result stay valid.
#[unsafe(no_mangle)]
pub extern "C" fn unhwp_result_free(result: *mut UnhwpResult) {
    if result.is_null() {
        return;
    }
    if let Some(handle) = RESULTS.remove(result as usize as HandleId) {
        handle.release();
    }
}

//! C ABI.
//!
//! Two handle generations share one error model:
//!
//! - [`result`]: `unhwp_parse*` returns an opaque `UnhwpResult*` whose
//!   content was rendered at parse time.
//! - [`document`]: `unhwp_open*` returns a non-zero integer id; Markdown is
//!   rendered per call, with bit flags or with a full options record.
//!
//! Every call records its outcome in a per-thread slot read back with
//! [`unhwp_last_error_code`] and [`unhwp_last_error_message`]. Every string
//! and buffer returned by the library, except [`unhwp_version`], belongs to
//! the caller and is released exactly once with [`unhwp_free_string`] or
//! [`unhwp_free_buffer`]. Releasing an unknown or already released pointer is
//! reported with `UNHWP_ERR_INVALID_STATE` and otherwise ignored.

// Submodule declarations
pub mod document;
pub mod result;
pub mod types;

// Re-exports
pub use document::*;
pub use result::*;
pub use types::{UnhwpCleanupOptions, UnhwpImage, UnhwpRenderOptions, UnhwpResult};

use crate::common::error::STATUS_OK;
use crate::common::{Error, FormatKind, Result};
use crate::engine::{BufferRegistry, ErrorChannel};
use crate::model::Document;
use std::ffi::{CStr, c_char};
use std::ptr;

// ============================================================================
// Status codes
// ============================================================================

pub const UNHWP_OK: i32 = STATUS_OK;
pub const UNHWP_ERR_FILE_NOT_FOUND: i32 = -1;
pub const UNHWP_ERR_PARSE: i32 = -2;
pub const UNHWP_ERR_RENDER: i32 = -3;
pub const UNHWP_ERR_INVALID_ARG: i32 = -4;
pub const UNHWP_ERR_UNSUPPORTED: i32 = -5;
pub const UNHWP_ERR_INVALID_STATE: i32 = -6;
pub const UNHWP_ERR_NOT_FOUND: i32 = -7;
pub const UNHWP_ERR_UNKNOWN: i32 = -99;

/// Bits of [`unhwp_supported_formats`].
pub const UNHWP_FORMAT_HWP5: i32 = 0x01;
pub const UNHWP_FORMAT_HWPX: i32 = 0x02;
pub const UNHWP_FORMAT_HWP3: i32 = 0x04;

// ============================================================================
// Boundary helpers
// ============================================================================

/// Run `f`, record its outcome and return its value or `fallback`.
pub(crate) fn guard<T>(fallback: T, f: impl FnOnce() -> Result<T>) -> T {
    ErrorChannel::capture(f()).unwrap_or(fallback)
}

/// Run `f` and return its status code.
pub(crate) fn status(f: impl FnOnce() -> Result<()>) -> i32 {
    match ErrorChannel::capture(f()) {
        Some(()) => UNHWP_OK,
        None => ErrorChannel::last_code(),
    }
}

/// Borrow a caller string.
///
/// # Safety
///
/// `ptr` must be NULL or a valid null-terminated string that outlives `'a`.
pub(crate) unsafe fn c_str<'a>(ptr: *const c_char, what: &str) -> Result<&'a str> {
    if ptr.is_null() {
        return Err(Error::InvalidArgument(format!("{} is NULL", what)));
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map_err(|_| Error::InvalidArgument(format!("{} is not UTF-8", what)))
}

/// Borrow a caller buffer. NULL is rejected; a zero length is passed on so
/// the parser reports it.
///
/// # Safety
///
/// `data` must be NULL or valid for reads of `len` bytes during `'a`.
pub(crate) unsafe fn byte_slice<'a>(data: *const u8, len: usize) -> Result<&'a [u8]> {
    if data.is_null() {
        return Err(Error::InvalidArgument("input buffer is NULL".to_string()));
    }
    Ok(unsafe { std::slice::from_raw_parts(data, len) })
}

/// Store `value` behind a caller-owned out pointer.
///
/// # Safety
///
/// `out` must be NULL or valid for writes.
pub(crate) unsafe fn write_out<T>(out: *mut T, value: T) -> Result<()> {
    if out.is_null() {
        return Err(Error::InvalidArgument("output pointer is NULL".to_string()));
    }
    unsafe { out.write(value) };
    Ok(())
}

/// Hand a string to the caller.
#[inline]
pub(crate) fn give_string(text: String) -> Result<*mut c_char> {
    BufferRegistry::global().alloc_string(text)
}

/// Count as a C integer, saturating.
#[inline]
pub(crate) fn count(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

// ============================================================================
// Shared entry points
// ============================================================================

/// Library version as a static null-terminated string. Do not free.
#[unsafe(no_mangle)]
pub extern "C" fn unhwp_version() -> *const c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}

/// Bit set of the formats compiled into this build.
#[unsafe(no_mangle)]
pub extern "C" fn unhwp_supported_formats() -> i32 {
    let mut formats = UNHWP_FORMAT_HWP5;
    if cfg!(feature = "hwpx") {
        formats |= UNHWP_FORMAT_HWPX;
    }
    if cfg!(feature = "hwp3") {
        formats |= UNHWP_FORMAT_HWP3;
    }
    formats
}

/// Detect the format of a file.
///
/// Returns 0 (unknown), 1 (HWP 5.0), 2 (HWPX) or 3 (HWP 3.x). Never fails:
/// a NULL or missing path is unknown.
///
/// # Safety
///
/// `path` must be NULL or a valid null-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn unhwp_detect_format(path: *const c_char) -> i32 {
    match unsafe { c_str(path, "path") } {
        Ok(path) => crate::detect_format(path).as_i32(),
        Err(_) => FormatKind::Unknown.as_i32(),
    }
}

/// Detect the format of an in-memory buffer; see [`unhwp_detect_format`].
///
/// # Safety
///
/// `data` must be NULL or valid for reads of `len` bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn unhwp_detect_format_bytes(data: *const u8, len: usize) -> i32 {
    match unsafe { byte_slice(data, len) } {
        Ok(bytes) => crate::detect_format_from_bytes(bytes).as_i32(),
        Err(_) => FormatKind::Unknown.as_i32(),
    }
}

/// Default render options record.
#[unsafe(no_mangle)]
pub extern "C" fn unhwp_render_options_default() -> UnhwpRenderOptions {
    UnhwpRenderOptions::default()
}

/// Default cleanup options record: cleanup off.
#[unsafe(no_mangle)]
pub extern "C" fn unhwp_cleanup_options_default() -> UnhwpCleanupOptions {
    UnhwpCleanupOptions::default()
}

/// Status code of the last call on this thread.
#[unsafe(no_mangle)]
pub extern "C" fn unhwp_last_error_code() -> i32 {
    ErrorChannel::last_code()
}

/// Message of the last error on this thread, or NULL after a successful
/// call. Free with [`unhwp_free_string`].
#[unsafe(no_mangle)]
pub extern "C" fn unhwp_last_error_message() -> *mut c_char {
    match ErrorChannel::last() {
        Some(error) => BufferRegistry::global()
            .alloc_string(error.message.replace('\0', " "))
            .unwrap_or(ptr::null_mut()),
        None => ptr::null_mut(),
    }
}

/// Release a string returned by the library. NULL is a no-op.
///
/// Returns `UNHWP_ERR_INVALID_STATE` for a pointer that is not live.
#[unsafe(no_mangle)]
pub extern "C" fn unhwp_free_string(ptr: *mut c_char) -> i32 {
    status(|| BufferRegistry::global().free_string(ptr))
}

/// Release a buffer returned by the library. `len` is the length it was
/// returned with. NULL is a no-op.
#[unsafe(no_mangle)]
pub extern "C" fn unhwp_free_buffer(ptr: *mut u8, len: usize) -> i32 {
    status(|| BufferRegistry::global().free_bytes(ptr, len))
}

/// Convert a file to Markdown with default options.
///
/// On success `*out_markdown` receives a string to free with
/// [`unhwp_free_string`].
///
/// # Safety
///
/// `path` must be a valid null-terminated string, `out_markdown` valid for
/// writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn unhwp_to_markdown(path: *const c_char, out_markdown: *mut *mut c_char) -> i32 {
    unsafe { unhwp_to_markdown_ex(path, ptr::null(), ptr::null(), out_markdown) }
}

/// Convert a file to Markdown.
///
/// NULL options mean defaults and cleanup off.
///
/// # Safety
///
/// As [`unhwp_to_markdown`]; option pointers must be NULL or valid records.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn unhwp_to_markdown_ex(
    path: *const c_char,
    render_options: *const UnhwpRenderOptions,
    cleanup_options: *const UnhwpCleanupOptions,
    out_markdown: *mut *mut c_char,
) -> i32 {
    status(|| {
        if out_markdown.is_null() {
            return Err(Error::InvalidArgument("output pointer is NULL".to_string()));
        }
        let path = unsafe { c_str(path, "path") }?;
        let render = unsafe { UnhwpRenderOptions::resolve(render_options) }?;
        let cleanup = unsafe { UnhwpCleanupOptions::resolve(cleanup_options) }?;
        let document = crate::parse_file(path)?;
        let markdown = crate::engine::handle::render(&document, &render, &cleanup)?;
        unsafe { write_out(out_markdown, give_string(markdown)?) }
    })
}

/// Extract plain text from a file.
///
/// # Safety
///
/// As [`unhwp_to_markdown`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn unhwp_extract_text(path: *const c_char, out_text: *mut *mut c_char) -> i32 {
    status(|| {
        if out_text.is_null() {
            return Err(Error::InvalidArgument("output pointer is NULL".to_string()));
        }
        let path = unsafe { c_str(path, "path") }?;
        let document: Document = crate::parse_file(path)?;
        unsafe { write_out(out_text, give_string(document.plain_text())?) }
    })
}

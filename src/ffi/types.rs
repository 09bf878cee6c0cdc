//! C layouts of the caller configuration.

use crate::cleanup::CleanupOptions;
use crate::common::{Error, Result};
use crate::engine::{NativeCleanup, NativeRenderOptions, from_native, table_fallback_from_native};
use crate::markdown::RenderOptions;
use std::ffi::{CStr, c_char};
use std::ptr;

/// Render options record.
///
/// Booleans are `0` for off and any other value for on.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct UnhwpRenderOptions {
    /// Emit YAML frontmatter
    pub include_frontmatter: i32,
    /// Null-terminated UTF-8 prefix for image links, or NULL for none
    pub image_path_prefix: *const c_char,
    /// Table mode: 0 = Markdown, 1 = HTML, 2 = text rows
    pub table_fallback: i32,
    /// Keep soft line breaks inside paragraphs
    pub preserve_line_breaks: i32,
    /// Escape Markdown metacharacters in text
    pub escape_special_chars: i32,
    /// Blank line between blocks
    pub paragraph_spacing: i32,
}

impl Default for UnhwpRenderOptions {
    fn default() -> Self {
        let defaults = RenderOptions::default();
        Self {
            include_frontmatter: defaults.include_frontmatter.into(),
            image_path_prefix: ptr::null(),
            table_fallback: defaults.table_fallback as i32,
            preserve_line_breaks: defaults.preserve_line_breaks.into(),
            escape_special_chars: defaults.escape_special_chars.into(),
            paragraph_spacing: defaults.paragraph_spacing.into(),
        }
    }
}

impl UnhwpRenderOptions {
    /// Decode the record.
    ///
    /// # Safety
    ///
    /// `image_path_prefix` must be NULL or a valid null-terminated string.
    pub unsafe fn to_options(&self) -> Result<RenderOptions> {
        let image_path_prefix = if self.image_path_prefix.is_null() {
            String::new()
        } else {
            unsafe { CStr::from_ptr(self.image_path_prefix) }
                .to_str()
                .map_err(|_| Error::InvalidArgument("image path prefix is not UTF-8".to_string()))?
                .to_string()
        };

        let record = NativeRenderOptions::Record(RenderOptions {
            include_frontmatter: self.include_frontmatter != 0,
            image_path_prefix,
            table_fallback: table_fallback_from_native(self.table_fallback)?,
            preserve_line_breaks: self.preserve_line_breaks != 0,
            escape_special_chars: self.escape_special_chars != 0,
            paragraph_spacing: self.paragraph_spacing != 0,
            heading_analysis: None,
        });
        Ok(from_native(&record))
    }

    /// Decode an optional record; NULL means defaults.
    ///
    /// # Safety
    ///
    /// `options` must be NULL or point to a valid record.
    pub(crate) unsafe fn resolve(options: *const Self) -> Result<RenderOptions> {
        match unsafe { options.as_ref() } {
            Some(options) => unsafe { options.to_options() },
            None => Ok(RenderOptions::default()),
        }
    }
}

/// Cleanup options record.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnhwpCleanupOptions {
    /// 0 = off
    pub enabled: i32,
    /// 0 = default, 1 = minimal, 2 = aggressive
    pub preset: i32,
    pub detect_mojibake: i32,
    pub preserve_frontmatter: i32,
}

impl From<NativeCleanup> for UnhwpCleanupOptions {
    fn from(native: NativeCleanup) -> Self {
        Self {
            enabled: native.enabled.into(),
            preset: native.preset,
            detect_mojibake: native.detect_mojibake.into(),
            preserve_frontmatter: native.preserve_frontmatter.into(),
        }
    }
}

impl Default for UnhwpCleanupOptions {
    fn default() -> Self {
        NativeCleanup::default().into()
    }
}

impl UnhwpCleanupOptions {
    pub fn to_options(&self) -> Result<CleanupOptions> {
        NativeCleanup {
            enabled: self.enabled != 0,
            preset: self.preset,
            detect_mojibake: self.detect_mojibake != 0,
            preserve_frontmatter: self.preserve_frontmatter != 0,
        }
        .to_options()
    }

    /// Decode an optional record; NULL means cleanup off.
    ///
    /// # Safety
    ///
    /// `options` must be NULL or point to a valid record.
    pub(crate) unsafe fn resolve(options: *const Self) -> Result<CleanupOptions> {
        match unsafe { options.as_ref() } {
            Some(options) => options.to_options(),
            None => Ok(CleanupOptions::disabled()),
        }
    }
}

/// One embedded resource.
///
/// `name` is released with `unhwp_free_string`, `data` with
/// `unhwp_free_buffer(data, data_len)`.
#[repr(C)]
#[derive(Debug)]
pub struct UnhwpImage {
    pub name: *mut c_char,
    pub data: *mut u8,
    pub data_len: usize,
}

impl Default for UnhwpImage {
    fn default() -> Self {
        Self {
            name: ptr::null_mut(),
            data: ptr::null_mut(),
            data_len: 0,
        }
    }
}

/// Opaque generation-1 result.
///
/// Pointers of this type are table ids and are never dereferenced.
#[repr(C)]
pub struct UnhwpResult {
    _private: [u8; 0],
}

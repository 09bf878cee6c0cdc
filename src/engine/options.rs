//! Native encodings of the caller configuration.
//!
//! Two engine generations accept render options differently: the current one
//! takes a fixed-layout record with every field, the older one a single
//! bit-flag integer. Marshaling is pure. A field the flags encoding cannot
//! carry is rejected when it differs from its safe default, never dropped.

use crate::cleanup::{CleanupOptions, CleanupPreset};
use crate::common::{Error, Result};
use crate::markdown::{RenderOptions, TableFallback};
use bitflags::bitflags;

bitflags! {
    /// Render switches of the flags-only encoding.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RenderFlags: u32 {
        const FRONTMATTER = 0x01;
        const ESCAPE_SPECIAL = 0x02;
        const PARAGRAPH_SPACING = 0x04;
    }
}

impl RenderFlags {
    /// Parse a native flags integer, rejecting undefined bits.
    pub fn from_native(bits: u32) -> Result<Self> {
        Self::from_bits(bits).ok_or_else(|| {
            Error::InvalidArgument(format!("undefined render flag bits {:#x}", bits))
        })
    }
}

impl Default for RenderFlags {
    /// The flags matching [`RenderOptions::default`].
    fn default() -> Self {
        RenderFlags::PARAGRAPH_SPACING
    }
}

/// Which encoding an engine entry point accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeEncoding {
    Record,
    Flags,
}

/// Render options in one of the two native encodings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeRenderOptions {
    /// Every field, as carried by the fixed-layout record
    Record(RenderOptions),
    /// Frontmatter, escaping and paragraph spacing only
    Flags(RenderFlags),
}

impl NativeRenderOptions {
    #[inline]
    pub fn encoding(&self) -> NativeEncoding {
        match self {
            NativeRenderOptions::Record(_) => NativeEncoding::Record,
            NativeRenderOptions::Flags(_) => NativeEncoding::Flags,
        }
    }
}

/// Encode caller options for an engine that accepts `encoding`.
///
/// For [`NativeEncoding::Flags`], a non-empty image prefix, a table mode
/// other than Markdown, disabled line-break preservation or heading analysis
/// cannot be represented and fail with [`Error::InvalidArgument`].
///
/// # Examples
///
/// ```rust
/// use unhwp::engine::{to_native, NativeEncoding, NativeRenderOptions, RenderFlags};
/// use unhwp::markdown::RenderOptions;
///
/// let options = RenderOptions::new().with_frontmatter(true);
/// let native = to_native(&options, NativeEncoding::Flags).unwrap();
/// assert_eq!(
///     native,
///     NativeRenderOptions::Flags(RenderFlags::FRONTMATTER | RenderFlags::PARAGRAPH_SPACING)
/// );
///
/// let prefixed = options.with_image_prefix("img/");
/// assert!(to_native(&prefixed, NativeEncoding::Flags).is_err());
/// ```
pub fn to_native(options: &RenderOptions, encoding: NativeEncoding) -> Result<NativeRenderOptions> {
    match encoding {
        NativeEncoding::Record => Ok(NativeRenderOptions::Record(options.clone())),
        NativeEncoding::Flags => {
            check_flags_representable(options)?;
            let mut flags = RenderFlags::empty();
            flags.set(RenderFlags::FRONTMATTER, options.include_frontmatter);
            flags.set(RenderFlags::ESCAPE_SPECIAL, options.escape_special_chars);
            flags.set(RenderFlags::PARAGRAPH_SPACING, options.paragraph_spacing);
            Ok(NativeRenderOptions::Flags(flags))
        },
    }
}

fn check_flags_representable(options: &RenderOptions) -> Result<()> {
    let defaults = RenderOptions::default();
    if !options.image_path_prefix.is_empty() {
        return Err(Error::InvalidArgument(format!(
            "image path prefix '{}' is not supported by the flags encoding",
            options.image_path_prefix
        )));
    }
    if options.table_fallback != defaults.table_fallback {
        return Err(Error::InvalidArgument(format!(
            "table mode {:?} is not supported by the flags encoding",
            options.table_fallback
        )));
    }
    if options.preserve_line_breaks != defaults.preserve_line_breaks {
        return Err(Error::InvalidArgument(
            "line break mode is not supported by the flags encoding".to_string(),
        ));
    }
    if options.heading_analysis.is_some() {
        return Err(Error::InvalidArgument(
            "heading analysis is not supported by the flags encoding".to_string(),
        ));
    }
    Ok(())
}

/// Canonical options for a native encoding.
///
/// Fields the flags encoding does not carry take their safe defaults: an
/// empty image prefix and Markdown tables.
pub fn from_native(native: &NativeRenderOptions) -> RenderOptions {
    match native {
        NativeRenderOptions::Record(options) => options.clone(),
        NativeRenderOptions::Flags(flags) => RenderOptions {
            include_frontmatter: flags.contains(RenderFlags::FRONTMATTER),
            escape_special_chars: flags.contains(RenderFlags::ESCAPE_SPECIAL),
            paragraph_spacing: flags.contains(RenderFlags::PARAGRAPH_SPACING),
            ..RenderOptions::default()
        },
    }
}

/// Decode a native table mode.
pub fn table_fallback_from_native(code: i32) -> Result<TableFallback> {
    u8::try_from(code)
        .ok()
        .and_then(TableFallback::from_u8)
        .ok_or_else(|| Error::InvalidArgument(format!("invalid table mode {}", code)))
}

/// Cleanup options as the native record carries them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeCleanup {
    pub enabled: bool,
    pub preset: i32,
    pub detect_mojibake: bool,
    pub preserve_frontmatter: bool,
}

impl Default for NativeCleanup {
    /// Disabled, default preset, both heuristics on.
    fn default() -> Self {
        Self {
            enabled: false,
            preset: CleanupPreset::Default.code(),
            detect_mojibake: true,
            preserve_frontmatter: true,
        }
    }
}

impl NativeCleanup {
    /// Resolve the preset and apply the overrides.
    ///
    /// The preset code is validated even when cleanup is disabled.
    pub fn to_options(&self) -> Result<CleanupOptions> {
        let preset = CleanupPreset::from_code(self.preset)?;
        Ok(CleanupOptions::preset(preset)
            .with_mojibake_detection(self.detect_mojibake)
            .with_frontmatter_preserved(self.preserve_frontmatter)
            .with_enabled(self.enabled))
    }

    pub fn from_options(options: &CleanupOptions) -> Self {
        Self {
            enabled: options.enabled,
            preset: options.preset.code(),
            detect_mojibake: options.detect_mojibake,
            preserve_frontmatter: options.preserve_frontmatter,
        }
    }
}

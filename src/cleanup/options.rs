//! Cleanup configuration and presets.

use crate::common::{Error, Result};

/// Named cleanup presets.
///
/// Discriminants are the preset codes used by the native cleanup record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum CleanupPreset {
    /// All four stages, header/footer threshold 0.8
    #[default]
    Default = 0,
    /// String normalization and final normalization only
    Minimal = 1,
    /// All four stages with a lower header/footer threshold
    Aggressive = 2,
}

impl CleanupPreset {
    #[inline]
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Resolve a native preset code.
    ///
    /// Codes outside `0..=2` are rejected with [`Error::InvalidArgument`].
    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            0 => Ok(CleanupPreset::Default),
            1 => Ok(CleanupPreset::Minimal),
            2 => Ok(CleanupPreset::Aggressive),
            other => Err(Error::InvalidArgument(format!(
                "invalid cleanup preset code {other}"
            ))),
        }
    }
}

/// Options for the Markdown cleanup pipeline.
///
/// # Examples
///
/// ```rust
/// use unhwp::cleanup::{CleanupOptions, CleanupPreset};
///
/// let options = CleanupOptions::aggressive().with_mojibake_detection(false);
/// assert_eq!(options.preset, CleanupPreset::Aggressive);
/// assert!(options.enabled);
///
/// assert!(!CleanupOptions::disabled().enabled);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CleanupOptions {
    /// Master switch; when false the pipeline returns its input unchanged
    pub enabled: bool,
    /// Preset the stage switches below were derived from
    pub preset: CleanupPreset,
    /// Drop lines and line tails that look like decoding garbage
    pub detect_mojibake: bool,
    /// Keep a leading YAML frontmatter block out of structural filtering
    pub preserve_frontmatter: bool,
    /// Stage 1: control characters, bullets, fullwidth forms
    pub normalize_strings: bool,
    /// Stage 2: page numbers, TOC leaders, placeholders, headers/footers
    pub clean_lines: bool,
    /// Stage 3: empty emphasis
    pub filter_structure: bool,
    /// Stage 4: blank lines, spaces, orphan lines
    pub final_normalize: bool,
    /// Remove Private Use Area characters in stage 1
    pub remove_pua: bool,
    /// Remove `[EQ]`, `[표]` and similar placeholder lines in stage 2
    pub remove_hwp_placeholders: bool,
    /// Fraction of estimated pages a line must repeat on to count as a
    /// header or footer
    pub header_footer_threshold: f64,
    /// Longer lines are never treated as headers or footers
    pub max_header_footer_length: usize,
}

impl Default for CleanupOptions {
    fn default() -> Self {
        Self::preset(CleanupPreset::Default)
    }
}

impl CleanupOptions {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the options a preset stands for.
    pub fn preset(preset: CleanupPreset) -> Self {
        let (clean_lines, filter_structure, threshold, max_len) = match preset {
            CleanupPreset::Default => (true, true, 0.8, 100),
            CleanupPreset::Minimal => (false, false, 0.8, 100),
            CleanupPreset::Aggressive => (true, true, 0.7, 150),
        };
        Self {
            enabled: true,
            preset,
            detect_mojibake: true,
            preserve_frontmatter: true,
            normalize_strings: true,
            clean_lines,
            filter_structure,
            final_normalize: true,
            remove_pua: true,
            remove_hwp_placeholders: true,
            header_footer_threshold: threshold,
            max_header_footer_length: max_len,
        }
    }

    #[inline]
    pub fn minimal() -> Self {
        Self::preset(CleanupPreset::Minimal)
    }

    #[inline]
    pub fn aggressive() -> Self {
        Self::preset(CleanupPreset::Aggressive)
    }

    /// Options that leave the input untouched.
    #[inline]
    pub fn disabled() -> Self {
        Self::default().with_enabled(false)
    }

    #[inline]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[inline]
    pub fn with_mojibake_detection(mut self, detect: bool) -> Self {
        self.detect_mojibake = detect;
        self
    }

    #[inline]
    pub fn with_frontmatter_preserved(mut self, preserve: bool) -> Self {
        self.preserve_frontmatter = preserve;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_preset() {
        let options = CleanupOptions::minimal();
        assert!(options.normalize_strings);
        assert!(!options.clean_lines);
        assert!(!options.filter_structure);
        assert!(options.final_normalize);
    }

    #[test]
    fn test_aggressive_preset() {
        let options = CleanupOptions::aggressive();
        assert!(options.clean_lines);
        assert!(options.filter_structure);
        assert!(options.header_footer_threshold < CleanupOptions::default().header_footer_threshold);
        assert!(options.max_header_footer_length > 100);
    }

    #[test]
    fn test_preset_codes() {
        for preset in [
            CleanupPreset::Default,
            CleanupPreset::Minimal,
            CleanupPreset::Aggressive,
        ] {
            assert_eq!(CleanupPreset::from_code(preset.code()).unwrap(), preset);
        }
        assert!(matches!(
            CleanupPreset::from_code(3),
            Err(Error::InvalidArgument(_))
        ));
        assert!(CleanupPreset::from_code(-1).is_err());
    }

    #[test]
    fn test_disabled_keeps_other_fields() {
        let options = CleanupOptions::disabled();
        assert!(!options.enabled);
        assert_eq!(options.preset, CleanupPreset::Default);
        assert!(options.detect_mojibake);
    }
}

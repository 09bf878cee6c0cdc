//! Markdown cleanup pipeline.
//!
//! Rendered Markdown from word-processor documents carries layout noise:
//! page numbers, dot-leader tables of contents, bullet glyphs, running
//! headers and text decoded with the wrong code page. [`cleanup`] runs four
//! stages over the rendered output:
//!
//! 1. string normalization ([`normalize_string`])
//! 2. line cleaning ([`clean_lines`])
//! 3. structural filtering ([`filter_structure`])
//! 4. final normalization ([`final_normalize`])
//!
//! Each stage can be switched off in [`CleanupOptions`]; presets pick a
//! sensible combination.
//!
//! # Examples
//!
//! ```rust
//! use unhwp::cleanup::{cleanup, CleanupOptions};
//!
//! let dirty = "●첫번째 항목\n\n\n\n- 15 -\n\n정상 내용입니다.";
//! let clean = cleanup(dirty, &CleanupOptions::default());
//! assert_eq!(clean, "- 첫번째 항목\n\n정상 내용입니다.");
//!
//! // Disabled options return the input unchanged.
//! assert_eq!(cleanup(dirty, &CleanupOptions::disabled()), dirty);
//! ```

mod finalize;
mod lines;
mod mojibake;
mod normalize;
mod options;
mod structure;

pub use finalize::final_normalize;
pub use lines::clean_lines;
pub use mojibake::{is_mojibake_line, trim_trailing_mojibake};
pub use normalize::normalize_string;
pub use options::{CleanupOptions, CleanupPreset};
pub use structure::filter_structure;

/// Run the enabled stages over `input`.
pub fn cleanup(input: &str, options: &CleanupOptions) -> String {
    if !options.enabled {
        return input.to_string();
    }

    let mut result = input.to_string();
    if options.normalize_strings {
        result = normalize_string(&result, options);
    }
    if options.clean_lines {
        result = clean_lines(&result, options);
    }
    if options.filter_structure {
        result = filter_structure(&result, options);
    }
    if options.final_normalize {
        result = final_normalize(&result, options);
    }

    log::trace!(
        "cleanup ({:?}): {} -> {} bytes",
        options.preset,
        input.len(),
        result.len()
    );
    result
}

/// [`cleanup`] with the default preset.
#[inline]
pub fn cleanup_default(input: &str) -> String {
    cleanup(input, &CleanupOptions::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIRTY: &str = concat!(
        "●첫번째 항목\n",
        "- 15 -\n",
        "\u{E000}PUA문자\n",
        "\n\n\n\n",
        "정상 내용입니다.\n",
        "서론.......... 5\n",
        "마지막 내용."
    );

    #[test]
    fn test_full_pipeline() {
        let result = cleanup_default(DIRTY);
        assert!(result.contains("- 첫번째 항목"));
        assert!(!result.contains("- 15 -"));
        assert!(!result.contains('\u{E000}'));
        assert!(result.contains("PUA문자"));
        assert!(!result.contains("\n\n\n"));
        assert!(!result.contains("서론"));
        assert!(result.ends_with("마지막 내용."));
    }

    #[test]
    fn test_disabled_is_identity() {
        assert_eq!(cleanup(DIRTY, &CleanupOptions::disabled()), DIRTY);
        let off = CleanupOptions::aggressive().with_enabled(false);
        assert_eq!(cleanup(DIRTY, &off), DIRTY);
    }

    #[test]
    fn test_minimal_keeps_layout_lines() {
        let result = cleanup(DIRTY, &CleanupOptions::minimal());
        assert!(result.contains("- 15 -"));
        assert!(result.contains("서론.......... 5"));
        assert!(!result.contains('\u{E000}'));
    }

    #[test]
    fn test_frontmatter_survives() {
        let input = "---\ntitle: \"문서\"\nformat: \"5.0.4.0\"\n---\n\n# 제목\n\n본문 ** ** 내용";
        let result = cleanup_default(input);
        assert!(result.starts_with("---\ntitle: \"문서\"\nformat: \"5.0.4.0\"\n---"));
        assert!(result.contains("# 제목"));
        assert!(result.ends_with("본문 내용"));
    }

    #[test]
    fn test_inline_code_survives() {
        let result = cleanup_default("Use the `a**  **b` operator in text.\n");
        assert_eq!(result, "Use the `a**  **b` operator in text.");
    }

    #[test]
    fn test_decomposed_hangul_recomposed() {
        let result = cleanup_default("\u{1112}\u{1161}\u{11AB}\u{1100}\u{1173}\u{11AF} 문서");
        assert!(result.contains("한글"));
    }
}

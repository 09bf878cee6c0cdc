//! Stage 1: character-level normalization.

use super::CleanupOptions;
use unicode_normalization::UnicodeNormalization;

/// Bullet glyphs and the Markdown they become.
const BULLET_MAPPINGS: &[(char, &str)] = &[
    ('●', "- "),
    ('■', "- "),
    ('◆', "- "),
    ('▶', "- "),
    ('►', "- "),
    ('➢', "- "),
    ('➤', "- "),
    ('•', "- "),
    ('·', "- "),
    ('○', "- "),
    ('□', "- "),
    ('◇', "- "),
    ('▷', "- "),
    ('→', "- "),
    ('⇒', "- "),
    ('➔', "- "),
    ('※', "> ※ "),
    ('★', "- "),
    ('☆', "- "),
    ('✓', "- [x] "),
    ('✔', "- [x] "),
    ('✗', "- [ ] "),
    ('✘', "- [ ] "),
];

/// Compose to NFC, remove invisible characters, map bullets to list markers
/// and fold fullwidth ASCII forms.
///
/// Decomposed Hangul (conjoining jamo) is recomposed into syllables.
pub fn normalize_string(input: &str, options: &CleanupOptions) -> String {
    let mut result = String::with_capacity(input.len());

    for c in input.nfc() {
        if is_removed_control(c) || (options.remove_pua && is_private_use(c)) {
            continue;
        }
        if let Some(replacement) = bullet_replacement(c) {
            result.push_str(replacement);
            continue;
        }
        result.push(fold_fullwidth(c).unwrap_or(c));
    }

    result
}

#[inline]
fn is_removed_control(c: char) -> bool {
    matches!(
        c,
        '\0' | '\x0B' | '\x0C' | '\u{FEFF}' | '\u{FFFD}' | '\u{00AD}'
    )
}

#[inline]
fn is_private_use(c: char) -> bool {
    matches!(
        c as u32,
        0xE000..=0xF8FF | 0xF0000..=0xFFFFD | 0x100000..=0x10FFFD
    )
}

fn bullet_replacement(c: char) -> Option<&'static str> {
    BULLET_MAPPINGS
        .iter()
        .find(|(bullet, _)| *bullet == c)
        .map(|(_, replacement)| *replacement)
}

/// Ideographic space and the fullwidth block U+FF01..U+FF5E.
fn fold_fullwidth(c: char) -> Option<char> {
    match c {
        '\u{3000}' => Some(' '),
        '\u{FF01}'..='\u{FF5E}' => char::from_u32(c as u32 - 0xFF01 + 0x21),
        _ => None,
    }
}

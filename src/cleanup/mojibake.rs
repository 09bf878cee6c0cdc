//! Heuristics for text decoded with the wrong code page.
//!
//! Garbage from a bad decode usually shows up as a handful of isolated CJK
//! ideographs, either alone on a line or glued to the end of otherwise
//! readable Latin or Hangul text. The checks below work on Unicode ranges
//! only; there is no dictionary.

#[inline]
fn is_hangul(c: char) -> bool {
    matches!(c as u32, 0xAC00..=0xD7AF | 0x1100..=0x11FF | 0x3130..=0x318F)
}

#[inline]
fn is_cjk_ideograph(c: char) -> bool {
    matches!(c as u32, 0x4E00..=0x9FFF | 0x3400..=0x4DBF | 0x20000..=0x2A6DF)
}

/// ASCII, Hangul and the punctuation blocks Korean text uses.
#[inline]
fn is_normal_content(c: char) -> bool {
    c.is_ascii() || is_hangul(c) || matches!(c as u32, 0x2000..=0x206F | 0x3000..=0x303F)
}

/// A short line made only of CJK ideographs.
pub fn is_mojibake_line(line: &str) -> bool {
    let trimmed = line.trim();
    let count = trimmed.chars().count();
    (1..=5).contains(&count) && trimmed.chars().all(is_cjk_ideograph)
}

/// Strip garbage ideographs from the end of a line.
pub fn trim_trailing_mojibake(line: &str) -> String {
    let chars: Vec<char> = line.chars().collect();

    if let Some(end) = trailing_garbage_start(&chars) {
        return chars[..end].iter().collect();
    }

    let mut end = chars.len();
    for i in (0..chars.len()).rev() {
        let c = chars[i];
        if is_normal_content(c) || !is_suspicious_tail(&chars, i) {
            break;
        }
        end = i;
    }

    if end < chars.len() {
        chars[..end].iter().collect()
    } else {
        line.to_string()
    }
}

/// Readable content followed by one to three ideographs and at most a couple
/// of stray ASCII letters, e.g. `https://example.com湰灧` or `주소汫h`.
fn trailing_garbage_start(chars: &[char]) -> Option<usize> {
    if chars.len() < 3 {
        return None;
    }

    let text: String = chars.iter().collect();
    let has_content = chars.iter().any(|&c| is_hangul(c) || c.is_ascii_alphanumeric())
        || text.contains("://");
    if !has_content {
        return None;
    }

    let mut start = None;
    let mut ideographs = 0;
    let mut trailing_ascii = 0;

    for (i, &c) in chars.iter().enumerate().rev() {
        if is_cjk_ideograph(c) {
            ideographs += 1;
            start = Some(i);
            continue;
        }
        if ideographs > 0 {
            if ideographs <= 3 && (is_normal_content(c) || c.is_ascii_punctuation()) {
                return start;
            }
            return None;
        }
        if c.is_ascii_alphabetic() && trailing_ascii < 3 {
            trailing_ascii += 1;
            continue;
        }
        return None;
    }

    None
}

fn is_suspicious_tail(chars: &[char], pos: usize) -> bool {
    let code = chars[pos] as u32;

    if (0x4E00..=0x9FFF).contains(&code) {
        let before = &chars[..pos];
        let latin_before = before.iter().any(|c| c.is_ascii_alphanumeric());
        let url_before = before.iter().collect::<String>().contains("://");
        if (latin_before || url_before) && ideograph_neighbors(chars, pos) < 2 {
            return true;
        }
    }

    // Extension blocks and Specials almost never occur in real documents.
    matches!(
        code,
        0x3400..=0x4DBF | 0x20000..=0x2A6DF | 0x2A700..=0x2B73F | 0xFFF0..=0xFFFF
    )
}

fn ideograph_neighbors(chars: &[char], pos: usize) -> usize {
    let before = chars[pos.saturating_sub(3)..pos].iter();
    let after = chars.iter().skip(pos + 1).take(3);
    before.chain(after).filter(|&&c| is_cjk_ideograph(c)).count()
}

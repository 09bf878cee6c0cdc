//! Stage 2: line-level cleaning.
//!
//! Lines that are pure layout artifacts (page numbers, table-of-contents
//! leaders, placeholder tokens, running headers and footers) are blanked
//! rather than removed, so paragraph boundaries survive until the final
//! normalization stage collapses them.

use super::CleanupOptions;
use super::mojibake::{is_mojibake_line, trim_trailing_mojibake};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// `- 15 -`, `[3]`, `(12)`
static RE_PAGE_HYPHEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*[-\[\(]\s*\d+\s*[-\]\)]\s*$").expect("valid page number regex")
});

/// `3 / 20`, `Page 3 of 20`
static RE_PAGE_RATIO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:Page\s*)?\d+\s*(?:/|of)\s*\d+\s*$").expect("valid page ratio regex")
});

/// `12 쪽`, `- 3 페이지 -`, `3쪽 / 20쪽`
static RE_PAGE_KOREAN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?:-\s*)?\d+\s*(?:쪽|페이지|Page)(?:\s*-)?(?:\s*/\s*\d+(?:쪽|페이지|Page)?)?\s*$",
    )
    .expect("valid korean page regex")
});

static RE_TOC_DOTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^.*\.{3,}[.\s]*\d+\s*$").expect("valid toc regex"));

static RE_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-=*_]{3,}$").expect("valid separator regex"));

static RE_HWP_PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\[(?:EQ|수식|표|TABLE|그림|IMAGE)\]\s*$").expect("valid placeholder regex")
});

static RE_EMPTY_BRACKETS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[(\[{<]\s*[)\]}>]$").expect("valid bracket regex"));

/// Lines per page used to estimate the page count for header/footer
/// detection.
const LINES_PER_PAGE: f64 = 40.0;

/// A line must repeat at least this often to be a header or footer.
const MIN_REPEATS: usize = 3;

pub fn clean_lines(input: &str, options: &CleanupOptions) -> String {
    let lines: Vec<&str> = input.lines().collect();
    let repeated = repeated_lines(&lines, options);

    let mut result = Vec::with_capacity(lines.len());
    for line in &lines {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            result.push(line.to_string());
            continue;
        }
        if RE_SEPARATOR.is_match(trimmed) {
            result.push("---".to_string());
            continue;
        }

        let blank = is_page_number(trimmed)
            || RE_TOC_DOTS.is_match(trimmed)
            || (options.remove_hwp_placeholders && RE_HWP_PLACEHOLDER.is_match(trimmed))
            || RE_EMPTY_BRACKETS.is_match(trimmed)
            || repeated.contains_key(trimmed)
            || (options.detect_mojibake && is_mojibake_line(trimmed));
        if blank {
            result.push(String::new());
            continue;
        }

        if options.detect_mojibake {
            result.push(trim_trailing_mojibake(line));
        } else {
            result.push(line.to_string());
        }
    }

    result.join("\n")
}

fn is_page_number(line: &str) -> bool {
    RE_PAGE_HYPHEN.is_match(line) || RE_PAGE_RATIO.is_match(line) || RE_PAGE_KOREAN.is_match(line)
}

/// Short lines that repeat on most estimated pages.
fn repeated_lines<'a>(lines: &[&'a str], options: &CleanupOptions) -> HashMap<&'a str, usize> {
    let mut freq: HashMap<&str, usize> = HashMap::new();
    for line in lines {
        let trimmed = line.trim();
        if !trimmed.is_empty() && trimmed.len() <= options.max_header_footer_length {
            *freq.entry(trimmed).or_insert(0) += 1;
        }
    }

    let pages = (lines.len() as f64 / LINES_PER_PAGE).ceil();
    let threshold = ((pages * options.header_footer_threshold) as usize).max(MIN_REPEATS);
    freq.retain(|_, count| *count >= threshold);

    if !freq.is_empty() {
        log::debug!("cleanup: {} repeated header/footer lines", freq.len());
    }
    freq
}

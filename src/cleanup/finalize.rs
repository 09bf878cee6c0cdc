//! Stage 4: whitespace normalization and orphan line removal.

use super::CleanupOptions;
use once_cell::sync::Lazy;
use regex::Regex;

static RE_MULTIPLE_NEWLINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("valid newline regex"));

static RE_MULTIPLE_SPACES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]+").expect("valid space regex"));

pub fn final_normalize(input: &str, _options: &CleanupOptions) -> String {
    let collapsed = RE_MULTIPLE_NEWLINES.replace_all(input, "\n\n");

    let mut lines = Vec::new();
    let mut in_fence = false;
    for line in collapsed.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            lines.push(line.trim_end().to_string());
            continue;
        }
        if in_fence {
            lines.push(line.to_string());
            continue;
        }
        if is_orphan_line(trimmed) {
            continue;
        }
        // Indented code keeps its leading whitespace.
        let indent = if line.starts_with("    ") || line.starts_with('\t') {
            &line[..line.len() - line.trim_start().len()]
        } else {
            ""
        };
        lines.push(format!("{indent}{}", collapse_spaces(trimmed)));
    }

    RE_MULTIPLE_NEWLINES
        .replace_all(&lines.join("\n"), "\n\n")
        .into_owned()
}

/// Collapse runs of blanks outside inline code spans.
fn collapse_spaces(line: &str) -> String {
    let parts: Vec<&str> = line.split('`').collect();
    if parts.len() % 2 == 0 {
        // Unbalanced backticks: no code spans on this line.
        return RE_MULTIPLE_SPACES.replace_all(line, " ").into_owned();
    }
    parts
        .iter()
        .enumerate()
        .map(|(i, part)| {
            if i % 2 == 0 {
                RE_MULTIPLE_SPACES.replace_all(part, " ")
            } else {
                std::borrow::Cow::Borrowed(*part)
            }
        })
        .collect::<Vec<_>>()
        .join("`")
}

/// A line that carries no content: stray punctuation from layout noise.
///
/// Rules, list markers, numbered lines and headings are never orphans.
fn is_orphan_line(line: &str) -> bool {
    if line.is_empty() || matches!(line, "---" | "..." | "***" | "___") {
        return false;
    }
    if line.starts_with("- ")
        || line.starts_with("* ")
        || line.starts_with("+ ")
        || line.starts_with('#')
        || line.starts_with(|c: char| c.is_ascii_digit())
    {
        return false;
    }

    let mut chars = line.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c.is_ascii_punctuation() || matches!(c, '。' | '、'),
        _ => line
            .chars()
            .all(|c| c.is_ascii_punctuation() || c.is_whitespace()),
    }
}

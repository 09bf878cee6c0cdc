//! Stage 3: structural filtering.
//!
//! The body is parsed with pulldown-cmark. Emphasis elements with no visible
//! content are dropped, and the empty-marker patterns left behind by earlier
//! stages are removed from plain text only. Code spans, code blocks, HTML
//! blocks and thematic breaks are copied through untouched, and a leading
//! YAML frontmatter block can be held out of the pass entirely.

use super::CleanupOptions;
use once_cell::sync::Lazy;
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use regex::Regex;
use std::cmp::Reverse;
use std::ops::Range;

static RE_EMPTY_STRONG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\*\*[ \t]*\*\*|__[ \t]*__").expect("valid empty strong regex")
});

static RE_EMPTY_STRIKE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"~~[ \t]*~~").expect("valid empty strike regex"));

static RE_EMPTY_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<(?:sup|sub|u)>[ \t]*</(?:sup|sub|u)>").expect("valid empty tag regex")
});

/// `*` `*` standing alone between whitespace.
static RE_EMPTY_EMPHASIS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(^|[ \t])\*[ \t]*\*([ \t]|$)").expect("valid empty emphasis regex")
});

pub fn filter_structure(input: &str, options: &CleanupOptions) -> String {
    let (frontmatter, body) = if options.preserve_frontmatter {
        split_frontmatter(input).unwrap_or(("", input))
    } else {
        ("", input)
    };

    let mut output = String::with_capacity(input.len());
    output.push_str(frontmatter);

    let mut cursor = 0;
    for span in scan(body) {
        if span.range.start < cursor {
            // Nested inside a span already handled.
            continue;
        }
        output.push_str(&strip_text(&body[cursor..span.range.start]));
        if span.keep {
            output.push_str(&body[span.range.clone()]);
        }
        cursor = span.range.end;
    }
    output.push_str(&strip_text(&body[cursor..]));

    output
}

/// A source range copied verbatim (`keep`) or dropped.
#[derive(Debug)]
struct Span {
    range: Range<usize>,
    keep: bool,
}

/// Walk the parser events and collect the verbatim and dropped ranges,
/// ordered by start offset.
fn scan(body: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    // Open emphasis elements and whether anything visible was seen inside.
    let mut open: Vec<(Range<usize>, bool)> = Vec::new();

    for (event, range) in Parser::new_ext(body, Options::ENABLE_STRIKETHROUGH).into_offset_iter() {
        match event {
            Event::Start(Tag::CodeBlock(_) | Tag::HtmlBlock) | Event::Rule => {
                spans.push(Span { range, keep: true });
            },
            Event::Code(_) => {
                spans.push(Span { range, keep: true });
                mark_visible(&mut open);
            },
            Event::Start(Tag::Emphasis | Tag::Strong | Tag::Strikethrough) => {
                open.push((range, false));
            },
            Event::End(TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough) => {
                if let Some((range, false)) = open.pop() {
                    spans.push(Span { range, keep: false });
                }
            },
            Event::Text(text) if text.trim().is_empty() => {},
            Event::SoftBreak | Event::HardBreak | Event::End(_) => {},
            _ => mark_visible(&mut open),
        }
    }

    spans.sort_by_key(|span| (span.range.start, Reverse(span.range.end)));
    spans
}

#[inline]
fn mark_visible(open: &mut [(Range<usize>, bool)]) {
    for (_, visible) in open.iter_mut() {
        *visible = true;
    }
}

/// Remove empty-marker patterns from plain text, line by line.
fn strip_text(text: &str) -> String {
    text.split('\n')
        .map(strip_empty_emphasis)
        .collect::<Vec<_>>()
        .join("\n")
}

fn strip_empty_emphasis(line: &str) -> String {
    let mut result = RE_EMPTY_STRONG.replace_all(line, "").into_owned();
    result = RE_EMPTY_STRIKE.replace_all(&result, "").into_owned();
    result = RE_EMPTY_TAG.replace_all(&result, "").into_owned();
    if !result.trim_start().starts_with("* ") {
        result = RE_EMPTY_EMPHASIS.replace_all(&result, "$1$2").into_owned();
    }
    result
}

/// Split a leading `---` ... `---` (or `...`) block from the rest.
///
/// The returned frontmatter includes both delimiter lines and the newline
/// after the closing one.
pub(crate) fn split_frontmatter(input: &str) -> Option<(&str, &str)> {
    let start = input.len() - input.trim_start_matches(['\n', '\r']).len();
    let body = &input[start..];

    let mut lines = body.split_inclusive('\n');
    let opening = lines.next()?;
    if opening.trim_end() != "---" {
        return None;
    }

    let mut end = opening.len();
    for line in lines {
        end += line.len();
        let trimmed = line.trim();
        if trimmed == "---" || trimmed == "..." {
            let split = start + end;
            return Some((&input[..split], &input[split..]));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(input: &str) -> String {
        filter_structure(input, &CleanupOptions::default())
    }

    #[test]
    fn test_empty_emphasis_removed() {
        assert_eq!(run("text **  ** more"), "text  more");
        assert_eq!(run("a****b"), "ab");
        assert_eq!(run("x ~~ ~~ y"), "x  y");
        assert_eq!(run("<sup></sup>2"), "2");
        assert_eq!(run("left ** right"), "left  right");
    }

    #[test]
    fn test_real_emphasis_kept() {
        let input = "**bold** and *it* and ~~gone~~\n* list item\n- **a**";
        assert_eq!(run(input), input);
    }

    #[test]
    fn test_breaks_and_fences_untouched() {
        let input = "***\n```\n** **\n```\n___";
        assert_eq!(run(input), input);
    }

    #[test]
    fn test_code_untouched() {
        let inline = "Use the `a**  **b` operator in text.\n";
        assert_eq!(run(inline), inline);

        let indented = "para\n\n    ** ** code\n\nafter ** ** x";
        assert_eq!(run(indented), "para\n\n    ** ** code\n\nafter  x");
    }

    #[test]
    fn test_parsed_empty_emphasis_dropped() {
        assert_eq!(run("a **&nbsp;** b"), "a  b");
        assert_eq!(run("keep **`x`** here"), "keep **`x`** here");
    }

    #[test]
    fn test_frontmatter_split() {
        let input = "---\ntitle: \"Test\"\n---\n\nContent here";
        let (fm, rest) = split_frontmatter(input).unwrap();
        assert_eq!(fm, "---\ntitle: \"Test\"\n---\n");
        assert_eq!(rest, "\nContent here");

        assert!(split_frontmatter("Just content\n---\n").is_none());
        assert!(split_frontmatter("---\nunterminated").is_none());
    }

    #[test]
    fn test_frontmatter_preserved() {
        let input = "---\ntitle: \"My Document\"\nformat: \"5.0.4.0\"\n---\n\n## Heading\n\n** ** text";
        let result = run(input);
        assert!(result.starts_with("---\ntitle: \"My Document\"\nformat: \"5.0.4.0\"\n---\n"));
        assert!(result.contains("## Heading"));
        assert!(result.ends_with("\n text"));
    }
}

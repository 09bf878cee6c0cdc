//! Character and paragraph styles.

use serde::Serialize;

/// Character formatting carried by a text run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct TextStyle {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub superscript: bool,
    pub subscript: bool,
}

impl TextStyle {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn bold() -> Self {
        Self {
            bold: true,
            ..Default::default()
        }
    }

    #[inline]
    pub fn italic() -> Self {
        Self {
            italic: true,
            ..Default::default()
        }
    }

    /// True when any markup-relevant flag is set.
    pub fn has_formatting(&self) -> bool {
        self.bold
            || self.italic
            || self.underline
            || self.strikethrough
            || self.superscript
            || self.subscript
    }
}

/// Paragraph-level style.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParagraphStyle {
    /// 0 for body text, 1 through 6 for headings
    pub heading_level: u8,
    pub list_style: Option<ListStyle>,
    /// Nesting depth for list items
    pub indent_level: u8,
}

impl ParagraphStyle {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Heading style; levels above 6 are clamped.
    pub fn heading(level: u8) -> Self {
        Self {
            heading_level: level.min(6),
            ..Default::default()
        }
    }

    pub fn list(style: ListStyle, indent_level: u8) -> Self {
        Self {
            list_style: Some(style),
            indent_level,
            ..Default::default()
        }
    }

    #[inline]
    pub fn is_heading(&self) -> bool {
        self.heading_level > 0
    }

    #[inline]
    pub fn is_list_item(&self) -> bool {
        self.list_style.is_some()
    }

    /// Heading level implied by an outline style name such as `개요 2` or
    /// `Outline 2`.
    pub fn outline_level_from_name(name: &str) -> Option<u8> {
        let rest = name
            .strip_prefix("개요")
            .or_else(|| name.strip_prefix("Outline"))?;
        let level: u8 = rest.trim().parse().ok()?;
        (1..=6).contains(&level).then_some(level)
    }
}

/// List marker kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ListStyle {
    Ordered,
    Unordered,
    CustomBullet(char),
}

/// Horizontal alignment of table cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

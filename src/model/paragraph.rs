//! Paragraphs and inline content.

use super::{ParagraphStyle, TextStyle};
use serde::Serialize;

/// A run of text sharing one character style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextRun {
    pub text: String,
    pub style: TextStyle,
}

impl TextRun {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: TextStyle::default(),
        }
    }

    pub fn with_style(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Content that can appear within a paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum InlineContent {
    Text(TextRun),
    LineBreak,
    Image(ImageRef),
    Equation(Equation),
    /// Footnote or endnote body text
    Footnote(String),
    Link { text: String, url: String },
}

/// Reference to an image resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRef {
    /// Resource id, or the base name of one (`image1` for `image1.png`)
    pub id: String,
    pub alt_text: Option<String>,
}

impl ImageRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            alt_text: None,
        }
    }
}

/// Equation in the HWP equation script language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Equation {
    pub script: String,
}

impl Equation {
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
        }
    }
}

/// A paragraph: a style plus a sequence of inline content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Paragraph {
    pub style: ParagraphStyle,
    pub content: Vec<InlineContent>,
}

impl Paragraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_style(style: ParagraphStyle) -> Self {
        Self {
            style,
            content: Vec::new(),
        }
    }

    /// Paragraph holding a single unstyled run.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            style: ParagraphStyle::default(),
            content: vec![InlineContent::Text(TextRun::new(text))],
        }
    }

    /// Append a run, merging it into the previous run when the styles match.
    pub fn push_text(&mut self, run: TextRun) {
        if run.is_empty() {
            return;
        }
        if let Some(InlineContent::Text(last)) = self.content.last_mut()
            && last.style == run.style
        {
            last.text.push_str(&run.text);
            return;
        }
        self.content.push(InlineContent::Text(run));
    }

    #[inline]
    pub fn push_line_break(&mut self) {
        self.content.push(InlineContent::LineBreak);
    }

    #[inline]
    pub fn push(&mut self, item: InlineContent) {
        match item {
            InlineContent::Text(run) => self.push_text(run),
            other => self.content.push(other),
        }
    }

    pub fn plain_text(&self) -> String {
        let mut result = String::new();
        for item in &self.content {
            match item {
                InlineContent::Text(run) => result.push_str(&run.text),
                InlineContent::LineBreak => result.push('\n'),
                InlineContent::Link { text, .. } => result.push_str(text),
                _ => {},
            }
        }
        result
    }

    /// No content, or only empty text runs.
    pub fn is_empty(&self) -> bool {
        self.content.iter().all(|c| match c {
            InlineContent::Text(run) => run.is_empty(),
            _ => false,
        })
    }

    /// At least one run with non-whitespace text.
    pub fn has_text_content(&self) -> bool {
        self.content.iter().any(|c| match c {
            InlineContent::Text(run) => !run.text.trim().is_empty(),
            InlineContent::Link { text, .. } => !text.trim().is_empty(),
            _ => false,
        })
    }

    /// Images and nothing but whitespace otherwise.
    pub fn is_image_only(&self) -> bool {
        let mut has_image = false;
        for item in &self.content {
            match item {
                InlineContent::Image(_) => has_image = true,
                InlineContent::Text(run) if run.text.trim().is_empty() => {},
                InlineContent::LineBreak => {},
                _ => return false,
            }
        }
        has_image
    }

    pub fn images(&self) -> impl Iterator<Item = &ImageRef> {
        self.content.iter().filter_map(|c| match c {
            InlineContent::Image(img) => Some(img),
            _ => None,
        })
    }
}

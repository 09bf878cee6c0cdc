/// Low-level writer for Markdown generation.
///
/// This module provides the `MarkdownWriter` struct which turns the content
/// model into Markdown text. Block separation is tracked here so that list
/// items stay adjacent while tables and headings get the blank lines
/// CommonMark needs around them.
use super::config::{RenderOptions, TableFallback};
use super::equation::to_latex;
use super::heading::{HeadingAnalyzer, HeadingDecision};
use crate::common::{Error, Result};
use crate::model::{
    Alignment, Block, Document, InlineContent, ListStyle, Metadata, Paragraph, Table, TableCell,
    TextRun,
};
use chrono::SecondsFormat;
use serde::Serialize;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt::Write as FmtWrite;

/// Paragraph text longer than this is never rendered as a heading.
const MAX_HEADING_CHARS: usize = 80;

const MAX_HEADING_LEVEL: u8 = 6;

/// Leading characters that mark a paragraph as a list entry rather than a
/// heading, even when its style says otherwise.
const LIST_MARKERS: &[char] = &[
    '-', '*', '>', '•', '◦', '▪', '▫', '☐', '☑', '☒', '✓', '✗', 'ㅇ', 'ㆍ', '·', '∙', '→', '←',
    '↔', '⇒', '⇐', '⇔', '►', '▶', '▷', '◀', '◁', '▻',
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Frontmatter,
    Paragraph,
    Heading,
    ListItem,
    Table,
}

/// Where inline content is being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InlineMode {
    Body,
    /// Single line; breaks become spaces
    Heading,
    /// Single line inside a grid table; pipes are escaped
    Cell,
}

/// Writer for Markdown output.
pub(crate) struct MarkdownWriter<'a> {
    buffer: String,
    options: &'a RenderOptions,
    /// Resource id and base name → resource id
    images: HashMap<String, String>,
    footnotes: Vec<String>,
    last: Option<BlockKind>,
}

impl<'a> MarkdownWriter<'a> {
    pub fn new(options: &'a RenderOptions) -> Self {
        Self {
            buffer: String::with_capacity(4096),
            options,
            images: HashMap::new(),
            footnotes: Vec::new(),
            last: None,
        }
    }

    /// Resolve image references against the document's resources.
    pub fn with_resources(mut self, document: &Document) -> Self {
        for resource in &document.resources {
            self.images
                .entry(resource.base_name().to_string())
                .or_insert_with(|| resource.id.clone());
            self.images.insert(resource.id.clone(), resource.id.clone());
        }
        self
    }

    pub fn write_document(&mut self, document: &Document) -> Result<()> {
        if self.options.include_frontmatter {
            self.write_frontmatter(&document.metadata)?;
        }
        let analysis = self
            .options
            .heading_analysis
            .as_ref()
            .map(|config| HeadingAnalyzer::new(config.clone()).analyze(document));
        let mut decisions = analysis.iter().flatten();
        for section in &document.sections {
            for block in &section.content {
                match block {
                    Block::Paragraph(para) => {
                        let level = match decisions.next() {
                            Some(&decision) => decided_level(para, decision),
                            None => self.heading_level(para),
                        };
                        self.write_paragraph_at(para, level)?
                    },
                    Block::Table(table) => self.write_table(table)?,
                }
            }
        }
        Ok(())
    }

    fn write_frontmatter(&mut self, metadata: &Metadata) -> Result<()> {
        let frontmatter = Frontmatter::from_metadata(metadata);
        self.buffer.push_str("---\n");
        if !frontmatter.is_empty() {
            let yaml = serde_saphyr::to_string(&frontmatter)
                .map_err(|e| Error::RenderError(format!("Failed to serialize frontmatter to YAML: {}", e)))?;
            self.buffer.push_str(&yaml);
            if !yaml.ends_with('\n') {
                self.buffer.push('\n');
            }
        }
        self.buffer.push_str("---\n");
        self.last = Some(BlockKind::Frontmatter);
        Ok(())
    }

    /// Write a paragraph as a heading, list item or plain paragraph.
    pub fn write_paragraph(&mut self, para: &Paragraph) -> Result<()> {
        let level = self.heading_level(para);
        self.write_paragraph_at(para, level)
    }

    fn write_paragraph_at(&mut self, para: &Paragraph, heading_level: u8) -> Result<()> {
        if para.is_empty() {
            return Ok(());
        }
        let style = &para.style;
        let has_text = para.has_text_content();
        if style.is_heading() && !has_text && !para.is_image_only() {
            return Ok(());
        }

        let kind = if heading_level > 0 {
            BlockKind::Heading
        } else if style.is_list_item() {
            BlockKind::ListItem
        } else {
            BlockKind::Paragraph
        };

        let mut line = String::new();
        let mode = if kind == BlockKind::Heading {
            InlineMode::Heading
        } else {
            InlineMode::Body
        };
        for item in &para.content {
            self.write_inline(&mut line, item, mode);
        }
        let body = if kind == BlockKind::Heading {
            line.trim()
        } else {
            line.trim_end()
        };
        if body.is_empty() {
            return Ok(());
        }

        self.begin_block(kind);
        match kind {
            BlockKind::Heading => {
                for _ in 0..heading_level {
                    self.buffer.push('#');
                }
                self.buffer.push(' ');
            },
            BlockKind::ListItem => {
                for _ in 0..style.indent_level {
                    self.buffer.push_str("  ");
                }
                match style.list_style {
                    Some(ListStyle::Ordered) => self.buffer.push_str("1. "),
                    Some(ListStyle::CustomBullet(c)) => {
                        self.buffer.push(c);
                        self.buffer.push(' ');
                    },
                    Some(ListStyle::Unordered) | None => self.buffer.push_str("- "),
                }
            },
            _ => {},
        }
        self.buffer.push_str(body);
        self.buffer.push('\n');
        Ok(())
    }

    /// Effective heading level, or 0 when the paragraph should not be a
    /// heading.
    fn heading_level(&self, para: &Paragraph) -> u8 {
        let style = &para.style;
        if !style.is_heading() || style.is_list_item() || para.is_image_only() {
            return 0;
        }
        let text = para.plain_text();
        let text = text.trim();
        if text.is_empty()
            || text.chars().count() > MAX_HEADING_CHARS
            || text.starts_with(LIST_MARKERS)
        {
            return 0;
        }
        style.heading_level.min(MAX_HEADING_LEVEL)
    }

    fn write_inline(&mut self, out: &mut String, item: &InlineContent, mode: InlineMode) {
        match item {
            InlineContent::Text(run) => self.write_run(out, run, mode),
            InlineContent::LineBreak => match mode {
                InlineMode::Body if self.options.preserve_line_breaks => out.push_str("  \n"),
                _ => out.push(' '),
            },
            InlineContent::Image(image) => {
                let alt = image.alt_text.as_deref().unwrap_or("image");
                out.push_str("![");
                out.push_str(alt);
                out.push_str("](");
                out.push_str(&self.image_path(&image.id));
                out.push(')');
            },
            InlineContent::Equation(equation) => {
                let latex = to_latex(&equation.script);
                if !latex.is_empty() {
                    out.push('$');
                    out.push_str(&latex);
                    out.push('$');
                }
            },
            InlineContent::Footnote(text) => {
                self.footnotes.push(text.clone());
                let _ = write!(out, "[^{}]", self.footnotes.len());
            },
            InlineContent::Link { text, url } => {
                let _ = write!(out, "[{}]({})", text, url);
            },
        }
    }

    /// Write a text run, keeping surrounding whitespace outside the emphasis
    /// markers.
    fn write_run(&self, out: &mut String, run: &TextRun, mode: InlineMode) {
        let mut text: Cow<'_, str> = if self.options.escape_special_chars {
            Cow::Owned(escape_markdown(&run.text))
        } else {
            Cow::Borrowed(&run.text)
        };
        if mode != InlineMode::Body && text.contains('\n') {
            text = Cow::Owned(text.replace('\n', " "));
        }
        if mode == InlineMode::Cell && !self.options.escape_special_chars && text.contains('|') {
            text = Cow::Owned(text.replace('|', "\\|"));
        }

        let style = &run.style;
        let core = text.trim();
        if core.is_empty() || !style.has_formatting() {
            out.push_str(&text);
            return;
        }
        let lead = &text[..text.len() - text.trim_start().len()];
        let trail = &text[lead.len() + core.len()..];

        let mut open = String::new();
        let mut close = String::new();
        let mut wrap = |start: &str, end: &str| {
            open.push_str(start);
            close.insert_str(0, end);
        };
        if style.bold {
            wrap("**", "**");
        }
        if style.italic {
            wrap("*", "*");
        }
        if style.strikethrough {
            wrap("~~", "~~");
        }
        if style.superscript {
            wrap("<sup>", "</sup>");
        } else if style.subscript {
            wrap("<sub>", "</sub>");
        }

        out.push_str(lead);
        out.push_str(&open);
        out.push_str(core);
        out.push_str(&close);
        out.push_str(trail);
    }

    fn image_path(&self, id: &str) -> String {
        let resolved = self.images.get(id).map_or(id, String::as_str);
        format!("{}{}", self.options.image_path_prefix, resolved)
    }

    /// Write a table in the configured fallback mode.
    pub fn write_table(&mut self, table: &Table) -> Result<()> {
        if table.rows.iter().all(|row| row.cells.is_empty()) {
            return Ok(());
        }
        match self.options.table_fallback {
            // Single-row tables are boxes around text, not data
            TableFallback::Markdown if table.rows.len() == 1 => self.write_table_text(table, " "),
            TableFallback::Markdown => self.write_markdown_table(table),
            TableFallback::Html => self.write_html_table(table),
            TableFallback::Text => self.write_table_text(table, " | "),
        }
    }

    /// Rows as text lines, cell contents joined by `separator`.
    fn write_table_text(&mut self, table: &Table, separator: &str) -> Result<()> {
        for row in &table.rows {
            let texts: Vec<String> = row
                .cells
                .iter()
                .map(|cell| self.cell_content(cell, InlineMode::Heading))
                .filter(|text| !text.is_empty())
                .collect();
            if texts.is_empty() {
                continue;
            }
            self.begin_block(BlockKind::Paragraph);
            self.buffer.push_str(&texts.join(separator));
            self.buffer.push('\n');
        }
        Ok(())
    }

    /// Grid table with merged cells expanded.
    fn write_markdown_table(&mut self, table: &Table) -> Result<()> {
        let columns = table
            .rows
            .iter()
            .map(|row| row.cells.iter().map(|c| c.colspan.max(1) as usize).sum::<usize>())
            .max()
            .unwrap_or(0);
        if columns == 0 {
            return Ok(());
        }

        let mut lines = String::new();
        // Rows still covered by a rowspan from above, per column
        let mut covered = vec![0u32; columns];
        for (row_index, row) in table.rows.iter().enumerate() {
            let mut slots: Vec<(String, Alignment)> = Vec::with_capacity(columns);
            let mut cells = row.cells.iter();
            while slots.len() < columns {
                let column = slots.len();
                if covered[column] > 0 {
                    covered[column] -= 1;
                    slots.push((String::new(), Alignment::Left));
                    continue;
                }
                let Some(cell) = cells.next() else {
                    slots.push((String::new(), Alignment::Left));
                    continue;
                };
                let span = (cell.colspan.max(1) as usize).min(columns - column);
                slots.push((self.cell_content(cell, InlineMode::Cell), cell.alignment));
                for _ in 1..span {
                    slots.push((String::new(), cell.alignment));
                }
                if cell.rowspan > 1 {
                    for slot in &mut covered[column..column + span] {
                        *slot = cell.rowspan - 1;
                    }
                }
            }

            lines.push('|');
            for (text, _) in &slots {
                if text.is_empty() {
                    lines.push_str(" |");
                } else {
                    write!(lines, " {} |", text).map_err(render_error)?;
                }
            }
            lines.push('\n');
            if row_index == 0 {
                lines.push('|');
                for (_, alignment) in &slots {
                    lines.push_str(match alignment {
                        Alignment::Center => " :---: |",
                        Alignment::Right => " ---: |",
                        Alignment::Left | Alignment::Justify => " --- |",
                    });
                }
                lines.push('\n');
            }
        }

        self.begin_block(BlockKind::Table);
        self.buffer.push_str(&lines);
        Ok(())
    }

    fn write_html_table(&mut self, table: &Table) -> Result<()> {
        let mut html = String::from("<table>\n");
        for (row_index, row) in table.rows.iter().enumerate() {
            let tag = if row_index == 0 && table.has_header {
                "th"
            } else {
                "td"
            };
            html.push_str("  <tr>\n");
            for cell in &row.cells {
                write!(html, "    <{}", tag).map_err(render_error)?;
                if cell.rowspan > 1 {
                    write!(html, " rowspan=\"{}\"", cell.rowspan).map_err(render_error)?;
                }
                if cell.colspan > 1 {
                    write!(html, " colspan=\"{}\"", cell.colspan).map_err(render_error)?;
                }
                writeln!(html, ">{}</{}>", self.html_cell(cell), tag).map_err(render_error)?;
            }
            html.push_str("  </tr>\n");
        }
        html.push_str("</table>\n");

        self.begin_block(BlockKind::Table);
        self.buffer.push_str(&html);
        Ok(())
    }

    /// Cell paragraphs rendered inline and joined by spaces.
    fn cell_content(&mut self, cell: &TableCell, mode: InlineMode) -> String {
        let mut parts = Vec::with_capacity(cell.content.len());
        for para in &cell.content {
            let mut line = String::new();
            for item in &para.content {
                self.write_inline(&mut line, item, mode);
            }
            let line = line.trim();
            if !line.is_empty() {
                parts.push(line.to_string());
            }
        }
        parts.join(" ")
    }

    fn html_cell(&self, cell: &TableCell) -> String {
        let mut parts = Vec::with_capacity(cell.content.len());
        for para in &cell.content {
            let mut line = String::new();
            for item in &para.content {
                match item {
                    InlineContent::Text(run) => line.push_str(&escape_html(&run.text)),
                    InlineContent::LineBreak => line.push_str("<br>"),
                    InlineContent::Image(image) => {
                        let _ = write!(
                            line,
                            "<img src=\"{}\" alt=\"{}\">",
                            escape_html(&self.image_path(&image.id)),
                            escape_html(image.alt_text.as_deref().unwrap_or("image"))
                        );
                    },
                    InlineContent::Equation(equation) => {
                        line.push('$');
                        line.push_str(&escape_html(&to_latex(&equation.script)));
                        line.push('$');
                    },
                    InlineContent::Link { text, .. } => line.push_str(&escape_html(text)),
                    InlineContent::Footnote(_) => {},
                }
            }
            let line = line.trim();
            if !line.is_empty() {
                parts.push(line.to_string());
            }
        }
        parts.join("<br>")
    }

    /// Separate the next block from the previous one.
    fn begin_block(&mut self, kind: BlockKind) {
        if let Some(last) = self.last {
            let adjacent_list = last == BlockKind::ListItem && kind == BlockKind::ListItem;
            let needs_blank = !adjacent_list
                && (self.options.paragraph_spacing
                    || matches!(last, BlockKind::Table | BlockKind::Frontmatter | BlockKind::Heading)
                    || matches!(kind, BlockKind::Table | BlockKind::Heading)
                    || (last == BlockKind::ListItem) != (kind == BlockKind::ListItem));
            if needs_blank && !self.buffer.ends_with("\n\n") {
                self.buffer.push('\n');
            }
        }
        self.last = Some(kind);
    }

    /// Append footnote definitions and return the output.
    pub fn finish(mut self) -> String {
        if !self.footnotes.is_empty() {
            if !self.buffer.is_empty() && !self.buffer.ends_with("\n\n") {
                self.buffer.push('\n');
            }
            for (index, text) in self.footnotes.iter().enumerate() {
                let _ = writeln!(self.buffer, "[^{}]: {}", index + 1, text.trim());
            }
        }
        self.buffer
    }
}

/// YAML frontmatter fields, in output order.
#[derive(Debug, Default, Serialize)]
struct Frontmatter<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lastmod: Option<String>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    tags: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    generator: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'a str>,
}

impl<'a> Frontmatter<'a> {
    fn from_metadata(metadata: &'a Metadata) -> Self {
        let timestamp = |t: &chrono::DateTime<chrono::Utc>| t.to_rfc3339_opts(SecondsFormat::Secs, true);
        Self {
            title: metadata.title.as_deref(),
            author: metadata.author.as_deref(),
            description: metadata.subject.as_deref(),
            date: metadata.created.as_ref().map(timestamp),
            lastmod: metadata.modified.as_ref().map(timestamp),
            tags: &metadata.keywords,
            generator: metadata.creator_app.as_deref(),
            format: metadata.format_version.as_deref(),
        }
    }

    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.description.is_none()
            && self.date.is_none()
            && self.lastmod.is_none()
            && self.tags.is_empty()
            && self.generator.is_none()
            && self.format.is_none()
    }
}

/// Level for an analyzer decision, or 0 when the paragraph cannot be
/// rendered as a heading.
fn decided_level(para: &Paragraph, decision: HeadingDecision) -> u8 {
    decision
        .level()
        .filter(|_| {
            para.has_text_content() && !para.is_image_only() && !para.style.is_list_item()
        })
        .map_or(0, |level| level.min(MAX_HEADING_LEVEL))
}

fn render_error(err: std::fmt::Error) -> Error {
    Error::RenderError(err.to_string())
}

/// Escape the characters that are special anywhere in a line.
///
/// `#`, `+`, `-`, `!`, brackets and `.` only matter in specific positions
/// and are left alone.
pub fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '`' | '*' | '_' | '|') {
            result.push('\\');
        }
        result.push(c);
    }
    result
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

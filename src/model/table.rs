//! Tables.

use super::{Alignment, Paragraph};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    pub rows: Vec<TableRow>,
    /// First row is a header row
    pub has_header: bool,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Width of the widest row once column spans are expanded.
    pub fn column_count(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.cells.iter().map(|c| c.colspan.max(1) as usize).sum())
            .max()
            .unwrap_or(0)
    }

    pub fn has_merged_cells(&self) -> bool {
        self.rows
            .iter()
            .any(|row| row.cells.iter().any(TableCell::is_merged))
    }

    pub fn cells(&self) -> impl Iterator<Item = &TableCell> {
        self.rows.iter().flat_map(|r| r.cells.iter())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

impl TableRow {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A cell. Content is a list of paragraphs; spans are at least 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableCell {
    pub content: Vec<Paragraph>,
    pub rowspan: u32,
    pub colspan: u32,
    pub alignment: Alignment,
}

impl Default for TableCell {
    fn default() -> Self {
        Self {
            content: Vec::new(),
            rowspan: 1,
            colspan: 1,
            alignment: Alignment::Left,
        }
    }
}

impl TableCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![Paragraph::text(text)],
            ..Default::default()
        }
    }

    pub fn with_span(mut self, rowspan: u32, colspan: u32) -> Self {
        self.rowspan = rowspan.max(1);
        self.colspan = colspan.max(1);
        self
    }

    /// Cell paragraphs joined by newlines.
    pub fn plain_text(&self) -> String {
        self.content
            .iter()
            .map(Paragraph::plain_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[inline]
    pub fn is_merged(&self) -> bool {
        self.rowspan > 1 || self.colspan > 1
    }
}

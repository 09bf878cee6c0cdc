//! Document, sections and blocks.

use super::{Metadata, Paragraph, Resource, Table};
use crate::common::Result;
use serde::Serialize;

/// A parsed document: metadata, sections in reading order and resources in
/// discovery order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Document {
    pub metadata: Metadata,
    pub sections: Vec<Section>,
    pub resources: Vec<Resource>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Number of top-level paragraphs across all sections.
    ///
    /// Paragraphs inside table cells are not counted.
    pub fn paragraph_count(&self) -> usize {
        self.paragraphs().count()
    }

    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.sections.iter().flat_map(|s| {
            s.content.iter().filter_map(|b| match b {
                Block::Paragraph(p) => Some(p),
                Block::Table(_) => None,
            })
        })
    }

    pub fn image_count(&self) -> usize {
        self.resources.iter().filter(|r| r.is_image()).count()
    }

    pub fn resource(&self, id: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.id == id)
    }

    /// Add a resource unless one with the same id is already present.
    ///
    /// Returns `false` for a duplicate id; the first occurrence wins.
    pub fn add_resource(&mut self, resource: Resource) -> bool {
        if self.resource(&resource.id).is_some() {
            log::debug!("duplicate resource id '{}' ignored", resource.id);
            return false;
        }
        self.resources.push(resource);
        true
    }

    /// Plain text: one line per paragraph and per table cell.
    pub fn plain_text(&self) -> String {
        let mut lines = Vec::new();
        for section in &self.sections {
            for block in &section.content {
                match block {
                    Block::Paragraph(p) => lines.push(p.plain_text()),
                    Block::Table(t) => lines.extend(t.cells().map(|c| c.plain_text())),
                }
            }
        }
        lines.join("\n")
    }

    /// Serialize the content tree as JSON.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Section {
    /// Zero-based position in the document
    pub index: usize,
    pub content: Vec<Block>,
}

impl Section {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            content: Vec::new(),
        }
    }

    #[inline]
    pub fn push_paragraph(&mut self, paragraph: Paragraph) {
        self.content.push(Block::Paragraph(paragraph));
    }

    #[inline]
    pub fn push_table(&mut self, table: Table) {
        self.content.push(Block::Table(table));
    }
}

/// Block-level content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TableCell, TableRow};

    fn sample() -> Document {
        let mut doc = Document::new();
        let mut section = Section::new(0);
        section.push_paragraph(Paragraph::text("first"));
        let mut table = Table::new();
        table.rows.push(TableRow {
            cells: vec![TableCell::text("a"), TableCell::text("b")],
        });
        section.push_table(table);
        section.push_paragraph(Paragraph::text("last"));
        doc.sections.push(section);
        doc.add_resource(Resource::from_file_name("BIN0001.png", vec![1u8]));
        doc.add_resource(Resource::from_file_name("BIN0002.ole", vec![2u8]));
        doc
    }

    #[test]
    fn test_counts() {
        let doc = sample();
        assert_eq!(doc.section_count(), 1);
        assert_eq!(doc.paragraph_count(), 2);
        assert_eq!(doc.image_count(), 1);
    }

    #[test]
    fn test_plain_text_includes_cells() {
        assert_eq!(sample().plain_text(), "first\na\nb\nlast");
    }

    #[test]
    fn test_duplicate_resource_rejected() {
        let mut doc = sample();
        assert!(!doc.add_resource(Resource::from_file_name("BIN0001.png", vec![9u8])));
        assert_eq!(doc.resources.len(), 2);
        assert_eq!(&doc.resource("BIN0001.png").unwrap().data[..], &[1u8]);
    }

    #[test]
    fn test_json_shapes() {
        let doc = sample();
        let compact = doc.to_json(false).unwrap();
        let pretty = doc.to_json(true).unwrap();
        assert!(!compact.contains('\n'));
        assert!(pretty.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&compact).unwrap();
        assert_eq!(value["sections"][0]["index"], 0);
        assert_eq!(value["resources"][1]["id"], "BIN0002.ole");
    }
}

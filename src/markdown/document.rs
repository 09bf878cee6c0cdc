/// ToMarkdown implementations for the content model.
use super::config::RenderOptions;
use super::traits::ToMarkdown;
use super::writer::MarkdownWriter;
use crate::common::Result;
use crate::model::{Document, Paragraph, Table};

impl ToMarkdown for Document {
    fn to_markdown_with_options(&self, options: &RenderOptions) -> Result<String> {
        let mut writer = MarkdownWriter::new(options).with_resources(self);
        writer.write_document(self)?;
        Ok(writer.finish())
    }
}

impl ToMarkdown for Paragraph {
    fn to_markdown_with_options(&self, options: &RenderOptions) -> Result<String> {
        let mut writer = MarkdownWriter::new(options);
        writer.write_paragraph(self)?;
        Ok(writer.finish().trim_end().to_string())
    }
}

impl ToMarkdown for Table {
    fn to_markdown_with_options(&self, options: &RenderOptions) -> Result<String> {
        let mut writer = MarkdownWriter::new(options);
        writer.write_table(self)?;
        Ok(writer.finish().trim_end().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Section, TableCell, TableRow};

    #[test]
    fn test_document_render_is_repeatable() {
        let mut doc = Document::new();
        let mut section = Section::new(0);
        section.push_paragraph(Paragraph::text("a_b"));
        doc.sections.push(section);
        doc.metadata.title = Some("t".to_string());
        let before = doc.clone();

        let plain = doc.to_markdown().unwrap();
        let escaped = doc
            .to_markdown_with_options(&RenderOptions::new().with_escaping(true).with_frontmatter(true))
            .unwrap();
        assert_eq!(plain, "a_b\n");
        assert!(escaped.starts_with("---\ntitle: "));
        assert!(escaped.ends_with("a\\_b\n"));
        assert_eq!(doc, before);
        assert_eq!(doc.to_markdown().unwrap(), plain);
    }

    #[test]
    fn test_table_fragment() {
        let mut table = Table::new();
        table.rows.push(TableRow {
            cells: vec![TableCell::text("h1"), TableCell::text("h2")],
        });
        table.rows.push(TableRow {
            cells: vec![TableCell::text("1"), TableCell::text("2")],
        });
        assert_eq!(
            table.to_markdown().unwrap(),
            "| h1 | h2 |\n| --- | --- |\n| 1 | 2 |"
        );
    }
}

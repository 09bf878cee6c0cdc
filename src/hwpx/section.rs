//! `Contents/sectionN.xml`: paragraphs, runs, tables and inline objects.
//!
//! The parser is recursive descent over reader events: each `parse_*` method
//! is entered just after its start tag and returns after the matching end tag.

use super::header::HeaderInfo;
use super::xml::{attr, attr_u32, local_name, reference, skip, text};
use crate::common::Result;
use crate::model::{
    Equation, ImageRef, InlineContent, Paragraph, Section, Table, TableCell, TableRow, TextRun,
    TextStyle,
};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;

/// Lookup tables shared by every section of a package.
pub struct SectionContext<'a> {
    pub header: &'a HeaderInfo,
    /// `binaryItemIDRef` → resource id
    pub images: &'a HashMap<String, String>,
}

pub fn parse_section(xml: &str, index: usize, context: &SectionContext<'_>) -> Result<Section> {
    let mut parser = SectionParser {
        reader: Reader::from_str(xml),
        context,
    };
    let mut section = Section::new(index);
    loop {
        match parser.reader.read_event()? {
            Event::Start(e) if local_name(&e) == "p" => {
                let (paragraph, tables) = parser.parse_paragraph(&e)?;
                if !paragraph.is_empty() {
                    section.push_paragraph(paragraph);
                }
                for table in tables {
                    section.push_table(table);
                }
            },
            Event::Eof => break,
            _ => {},
        }
    }
    Ok(section)
}

struct SectionParser<'x, 'c> {
    reader: Reader<&'x [u8]>,
    context: &'c SectionContext<'c>,
}

impl<'x> SectionParser<'x, '_> {
    /// Returns the paragraph and the tables anchored in it.
    fn parse_paragraph(&mut self, start: &BytesStart<'_>) -> Result<(Paragraph, Vec<Table>)> {
        let style = self
            .context
            .header
            .paragraph_style(attr_u32(start, "paraPrIDRef"), attr_u32(start, "styleIDRef"));
        let mut paragraph = Paragraph::with_style(style);
        let mut tables = Vec::new();
        loop {
            match self.reader.read_event()? {
                Event::Start(e) => match local_name(&e).as_ref() {
                    "run" => self.parse_run(&e, &mut paragraph, &mut tables)?,
                    _ => skip(&mut self.reader, &e)?,
                },
                Event::End(e) if e.local_name().as_ref() == b"p" => break,
                Event::Eof => break,
                _ => {},
            }
        }
        Ok((paragraph, tables))
    }

    fn parse_run(
        &mut self,
        start: &BytesStart<'_>,
        paragraph: &mut Paragraph,
        tables: &mut Vec<Table>,
    ) -> Result<()> {
        let style = self.context.header.char_style(attr_u32(start, "charPrIDRef"));
        loop {
            match self.reader.read_event()? {
                Event::Start(e) => match local_name(&e).as_ref() {
                    "t" => self.parse_text(paragraph, style)?,
                    "tbl" => {
                        if let Some(table) = self.parse_table()? {
                            tables.push(table);
                        }
                    },
                    "pic" => {
                        if let Some(image) = self.parse_picture(&e)? {
                            paragraph.push(InlineContent::Image(image));
                        }
                    },
                    "equation" => {
                        if let Some(equation) = self.parse_equation()? {
                            paragraph.push(InlineContent::Equation(equation));
                        }
                    },
                    "footNote" | "endNote" => {
                        let note = self.parse_note(&e)?;
                        if !note.is_empty() {
                            paragraph.push(InlineContent::Footnote(note));
                        }
                    },
                    // Container for notes and fields; its children are handled here
                    "ctrl" => {},
                    _ => skip(&mut self.reader, &e)?,
                },
                Event::End(e) if e.local_name().as_ref() == b"run" => break,
                Event::Eof => break,
                _ => {},
            }
        }
        Ok(())
    }

    /// Mixed content of `<t>`: text, references and inline markers.
    fn parse_text(&mut self, paragraph: &mut Paragraph, style: TextStyle) -> Result<()> {
        let mut buffer = String::new();
        let flush = |buffer: &mut String, paragraph: &mut Paragraph| {
            if !buffer.is_empty() {
                paragraph.push_text(TextRun::with_style(std::mem::take(buffer), style));
            }
        };
        loop {
            match self.reader.read_event()? {
                Event::Text(t) => buffer.push_str(&text(&t)),
                Event::CData(t) => buffer.push_str(&String::from_utf8_lossy(&t)),
                Event::GeneralRef(r) => {
                    if let Some(resolved) = reference(&r) {
                        buffer.push_str(&resolved);
                    }
                },
                Event::Empty(e) => match local_name(&e).as_ref() {
                    "lineBreak" => {
                        flush(&mut buffer, paragraph);
                        paragraph.push_line_break();
                    },
                    "tab" => buffer.push('\t'),
                    "nbSpace" | "fwSpace" => buffer.push(' '),
                    "hyphen" => buffer.push('-'),
                    _ => {},
                },
                Event::Start(e) => skip(&mut self.reader, &e)?,
                Event::End(e) if e.local_name().as_ref() == b"t" => break,
                Event::Eof => break,
                _ => {},
            }
        }
        flush(&mut buffer, paragraph);
        Ok(())
    }

    fn parse_table(&mut self) -> Result<Option<Table>> {
        let mut table = Table::new();
        loop {
            match self.reader.read_event()? {
                Event::Start(e) => match local_name(&e).as_ref() {
                    "tr" => table.rows.push(self.parse_row()?),
                    _ => skip(&mut self.reader, &e)?,
                },
                Event::End(e) if e.local_name().as_ref() == b"tbl" => break,
                Event::Eof => break,
                _ => {},
            }
        }
        table.rows.retain(|row| !row.cells.is_empty());
        if table.rows.is_empty() {
            return Ok(None);
        }
        table.has_header = table.rows.len() > 1;
        Ok(Some(table))
    }

    fn parse_row(&mut self) -> Result<TableRow> {
        let mut row = TableRow::new();
        loop {
            match self.reader.read_event()? {
                Event::Start(e) => match local_name(&e).as_ref() {
                    "tc" => row.cells.push(self.parse_cell(&e)?),
                    _ => skip(&mut self.reader, &e)?,
                },
                Event::End(e) if e.local_name().as_ref() == b"tr" => break,
                Event::Eof => break,
                _ => {},
            }
        }
        Ok(row)
    }

    fn parse_cell(&mut self, start: &BytesStart<'_>) -> Result<TableCell> {
        // Older writers put the spans on <tc> itself
        let mut rowspan = attr_u32(start, "rowSpan").unwrap_or(1);
        let mut colspan = attr_u32(start, "colSpan").unwrap_or(1);
        let mut content = Vec::new();
        loop {
            match self.reader.read_event()? {
                Event::Start(e) => match local_name(&e).as_ref() {
                    "subList" => {},
                    "p" => {
                        let (paragraph, nested) = self.parse_paragraph(&e)?;
                        if !paragraph.is_empty() {
                            content.push(paragraph);
                        }
                        content.extend(nested.iter().flat_map(flatten_table));
                    },
                    _ => skip(&mut self.reader, &e)?,
                },
                Event::Empty(e) if local_name(&e) == "cellSpan" => {
                    rowspan = attr_u32(&e, "rowSpan").unwrap_or(rowspan);
                    colspan = attr_u32(&e, "colSpan").unwrap_or(colspan);
                },
                Event::End(e) if e.local_name().as_ref() == b"tc" => break,
                Event::Eof => break,
                _ => {},
            }
        }
        let mut cell = TableCell::new().with_span(rowspan, colspan);
        cell.content = content;
        Ok(cell)
    }

    fn parse_picture(&mut self, start: &BytesStart<'_>) -> Result<Option<ImageRef>> {
        let mut image = None;
        let mut depth = 1usize;
        loop {
            match self.reader.read_event()? {
                Event::Start(e) => {
                    depth += 1;
                    if local_name(&e) == "img" {
                        image = image.or_else(|| self.image_ref(&e));
                    }
                },
                Event::Empty(e) if local_name(&e) == "img" => {
                    image = image.or_else(|| self.image_ref(&e));
                },
                Event::End(_) => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                },
                Event::Eof => break,
                _ => {},
            }
        }
        if image.is_none() {
            log::debug!("picture {:?} without binary item", attr(start, "id"));
        }
        Ok(image)
    }

    fn image_ref(&self, e: &BytesStart<'_>) -> Option<ImageRef> {
        let item = attr(e, "binaryItemIDRef")?;
        let id = self.context.images.get(&item).cloned().unwrap_or(item);
        Some(ImageRef::new(id))
    }

    fn parse_equation(&mut self) -> Result<Option<Equation>> {
        let mut script = String::new();
        let mut in_script = false;
        loop {
            match self.reader.read_event()? {
                Event::Start(e) if local_name(&e) == "script" => in_script = true,
                Event::Start(e) => skip(&mut self.reader, &e)?,
                Event::Text(t) if in_script => script.push_str(&text(&t)),
                Event::GeneralRef(r) if in_script => {
                    if let Some(resolved) = reference(&r) {
                        script.push_str(&resolved);
                    }
                },
                Event::End(e) => match e.local_name().as_ref() {
                    b"script" => in_script = false,
                    b"equation" => break,
                    _ => {},
                },
                Event::Eof => break,
                _ => {},
            }
        }
        let script = script.trim();
        Ok((!script.is_empty()).then(|| Equation::new(script)))
    }

    /// Plain text of a footnote or endnote body.
    fn parse_note(&mut self, start: &BytesStart<'_>) -> Result<String> {
        let end = start.local_name().as_ref().to_vec();
        let mut parts = Vec::new();
        loop {
            match self.reader.read_event()? {
                Event::Start(e) => match local_name(&e).as_ref() {
                    "subList" => {},
                    "p" => {
                        let (paragraph, _) = self.parse_paragraph(&e)?;
                        let text = paragraph.plain_text();
                        if !text.trim().is_empty() {
                            parts.push(text.trim().to_string());
                        }
                    },
                    _ => skip(&mut self.reader, &e)?,
                },
                Event::End(e) if e.local_name().as_ref() == end.as_slice() => break,
                Event::Eof => break,
                _ => {},
            }
        }
        Ok(parts.join(" "))
    }
}

/// Nested tables are reduced to one text paragraph per row.
fn flatten_table(table: &Table) -> Vec<Paragraph> {
    table
        .rows
        .iter()
        .map(|row| {
            let cells: Vec<String> = row.cells.iter().map(TableCell::plain_text).collect();
            Paragraph::text(cells.join(" | "))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hwpx::fixtures::section_xml;
    use crate::model::{Block, ListStyle};

    fn header() -> HeaderInfo {
        let mut header = HeaderInfo::default();
        header.char_properties.insert(1, TextStyle::bold());
        header
            .para_properties
            .insert(1, crate::model::ParagraphStyle::heading(1));
        header.para_properties.insert(
            2,
            crate::model::ParagraphStyle::list(ListStyle::Ordered, 0),
        );
        header
    }

    fn parse(body: &str) -> Section {
        let header = header();
        let mut images = HashMap::new();
        images.insert("image1".to_string(), "image1.png".to_string());
        let context = SectionContext {
            header: &header,
            images: &images,
        };
        parse_section(&section_xml(body), 0, &context).unwrap()
    }

    fn paragraph(section: &Section, index: usize) -> &Paragraph {
        match &section.content[index] {
            Block::Paragraph(p) => p,
            Block::Table(_) => panic!("expected paragraph at {}", index),
        }
    }

    #[test]
    fn test_runs_and_styles() {
        let section = parse(
            r#"<hp:p paraPrIDRef="1"><hp:run charPrIDRef="0"><hp:t>제목</hp:t></hp:run></hp:p>
<hp:p paraPrIDRef="0"><hp:run charPrIDRef="0"><hp:t>plain </hp:t></hp:run><hp:run charPrIDRef="1"><hp:t>bold</hp:t></hp:run><hp:linesegarray><hp:lineseg textpos="0"/></hp:linesegarray></hp:p>
<hp:p paraPrIDRef="2"><hp:run><hp:t>item</hp:t></hp:run></hp:p>
<hp:p><hp:run><hp:t/></hp:run></hp:p>"#,
        );
        assert_eq!(section.content.len(), 3);
        assert_eq!(paragraph(&section, 0).style.heading_level, 1);
        let body = paragraph(&section, 1);
        assert_eq!(body.plain_text(), "plain bold");
        assert!(matches!(&body.content[1], InlineContent::Text(run) if run.style.bold));
        assert!(paragraph(&section, 2).style.is_list_item());
    }

    #[test]
    fn test_inline_markers() {
        let section = parse(
            r#"<hp:p><hp:run><hp:t>a<hp:tab/>b<hp:lineBreak/>c &amp; d</hp:t></hp:run></hp:p>"#,
        );
        let para = paragraph(&section, 0);
        assert_eq!(para.plain_text(), "a\tb\nc & d");
    }

    #[test]
    fn test_table_with_spans() {
        let section = parse(
            r#"<hp:p><hp:run><hp:tbl rowCnt="2" colCnt="2"><hp:sz width="100" height="100"/>
<hp:tr><hp:tc><hp:subList><hp:p><hp:run><hp:t>wide</hp:t></hp:run></hp:p></hp:subList><hp:cellAddr colAddr="0" rowAddr="0"/><hp:cellSpan colSpan="2" rowSpan="1"/></hp:tc></hp:tr>
<hp:tr><hp:tc><hp:subList><hp:p><hp:run><hp:t>x</hp:t></hp:run></hp:p></hp:subList><hp:cellSpan colSpan="1" rowSpan="1"/></hp:tc><hp:tc><hp:subList><hp:p><hp:run><hp:t>y</hp:t></hp:run></hp:p></hp:subList></hp:tc></hp:tr>
</hp:tbl></hp:run></hp:p>"#,
        );
        assert_eq!(section.content.len(), 1);
        let Block::Table(table) = &section.content[0] else {
            panic!("expected table");
        };
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[0].cells[0].colspan, 2);
        assert_eq!(table.rows[1].cells[1].plain_text(), "y");
        assert!(table.has_header);
    }

    #[test]
    fn test_picture_equation_footnote() {
        let section = parse(
            r#"<hp:p><hp:run><hp:t>see</hp:t><hp:pic id="5"><hp:imgRect><hc:pt0 x="0" y="0"/></hp:imgRect><hc:img binaryItemIDRef="image1" bright="0"/></hp:pic></hp:run>
<hp:run><hp:equation><hp:script>x ^{2}</hp:script></hp:equation></hp:run>
<hp:run><hp:ctrl><hp:footNote number="1"><hp:subList><hp:p><hp:run><hp:t>각주</hp:t></hp:run></hp:p></hp:subList></hp:footNote></hp:ctrl></hp:run></hp:p>"#,
        );
        let para = paragraph(&section, 0);
        assert_eq!(para.images().next().map(|i| i.id.as_str()), Some("image1.png"));
        assert!(para
            .content
            .iter()
            .any(|c| matches!(c, InlineContent::Equation(e) if e.script == "x ^{2}")));
        assert!(para
            .content
            .iter()
            .any(|c| matches!(c, InlineContent::Footnote(t) if t == "각주")));
        assert_eq!(para.plain_text(), "see");
    }

    #[test]
    fn test_malformed_xml() {
        let header = header();
        let images = HashMap::new();
        let context = SectionContext {
            header: &header,
            images: &images,
        };
        assert!(parse_section("<hs:sec><hp:p></hs:sec>", 0, &context).is_err());
    }
}

//! `BodyText/SectionN` streams: paragraphs and their controls.
//!
//! A paragraph is a `PARA_HEADER` record whose children carry its text,
//! character shape runs and one `CTRL_HEADER` per extended control character
//! in the text. Control subtrees hold tables, drawing objects, equations and
//! notes, which may in turn contain paragraphs.

use super::docinfo::DocInfo;
use super::record::{Record, children, read_records, subtree_end, tag};
use crate::common::Result;
use crate::common::binary::{ByteCursor, read_u16_le, read_u32_le};
use crate::model::{
    Equation, ImageRef, InlineContent, Paragraph, Section, Table, TableCell, TableRow, TextRun,
    TextStyle,
};
use smallvec::SmallVec;

/// Builds a control id from its four-character tag.
const fn ctrl_id(name: &[u8; 4]) -> u32 {
    u32::from_be_bytes(*name)
}

const CTRL_TABLE: u32 = ctrl_id(b"tbl ");
const CTRL_DRAWING: u32 = ctrl_id(b"gso ");
const CTRL_EQUATION: u32 = ctrl_id(b"eqed");
const CTRL_FOOTNOTE: u32 = ctrl_id(b"fn  ");
const CTRL_ENDNOTE: u32 = ctrl_id(b"en  ");

const PICTURE_BIN_ID_OFFSET: usize = 71;

const CH_LINE_BREAK: u16 = 0x0A;
const CH_PARA_END: u16 = 0x0D;
const CH_TAB: u16 = 0x09;
const CH_HYPHEN: u16 = 0x18;
const CH_NBSPACE: u16 = 0x1E;
const CH_FWSPACE: u16 = 0x1F;

/// Control characters that occupy 8 WCHARs in the text.
#[inline]
fn is_wide_control(unit: u16) -> bool {
    matches!(unit, 1..=9 | 11 | 12 | 14..=23)
}

/// Wide controls that have a matching `CTRL_HEADER` record.
#[inline]
fn is_extended_control(unit: u16) -> bool {
    matches!(unit, 1..=3 | 11 | 12 | 14..=18 | 21..=23)
}

/// Parse one decompressed section stream.
pub fn parse_section(data: &[u8], index: usize, docinfo: &DocInfo) -> Result<Section> {
    let records = read_records(data)?;
    let mut section = Section::new(index);
    let base_level = records.first().map_or(0, |r| r.level);
    let mut i = 0;
    while i < records.len() {
        let record = &records[i];
        if record.tag == tag::PARA_HEADER && record.level == base_level {
            let parsed = ParagraphParser::new(&records, docinfo).parse(i);
            if !parsed.paragraph.is_empty() {
                section.push_paragraph(parsed.paragraph);
            }
            for table in parsed.tables {
                section.push_table(table);
            }
            i = subtree_end(&records, i);
        } else {
            i += 1;
        }
    }
    log::trace!("section {}: {} blocks", index, section.content.len());
    Ok(section)
}

/// A paragraph together with the tables anchored in it.
struct ParsedParagraph {
    paragraph: Paragraph,
    tables: Vec<Table>,
}

struct ParagraphParser<'r, 'a> {
    records: &'r [Record<'a>],
    docinfo: &'r DocInfo,
}

impl<'r, 'a> ParagraphParser<'r, 'a> {
    fn new(records: &'r [Record<'a>], docinfo: &'r DocInfo) -> Self {
        Self { records, docinfo }
    }

    fn parse(&self, index: usize) -> ParsedParagraph {
        let header = self.records[index].data;
        let para_shape_id = read_u16_le(header, 8).unwrap_or(0);
        let style_id = header.get(10).copied().unwrap_or(0);
        let style = self.docinfo.paragraph_style(para_shape_id, style_id);

        let mut text: &[u8] = &[];
        let mut char_runs = CharRuns::new();
        let mut controls = Vec::new();
        for child in children(self.records, index) {
            let record = &self.records[child];
            match record.tag {
                tag::PARA_TEXT => text = record.data,
                tag::PARA_CHAR_SHAPE => char_runs = parse_char_runs(record.data),
                tag::CTRL_HEADER => controls.push(child),
                _ => {},
            }
        }

        let mut builder = RunBuilder::new(Paragraph::with_style(style));
        let mut tables = Vec::new();
        let mut controls = controls.into_iter();
        let units: Vec<u16> = text
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect();
        let mut styles = StyleCursor::new(&char_runs, self.docinfo);

        let mut pos = 0;
        while pos < units.len() {
            let unit = units[pos];
            let style = styles.at(pos as u32);
            match unit {
                CH_LINE_BREAK => builder.push_inline(InlineContent::LineBreak),
                CH_PARA_END => break,
                CH_HYPHEN => builder.push_unit(u16::from(b'-'), style),
                CH_NBSPACE | CH_FWSPACE => builder.push_unit(u16::from(b' '), style),
                CH_TAB => builder.push_unit(u16::from(b'\t'), style),
                u if is_extended_control(u) => match controls.next() {
                    Some(ctrl) => match self.control(ctrl) {
                        Some(ControlContent::Inline(item)) => builder.push_inline(item),
                        Some(ControlContent::Table(table)) => tables.push(table),
                        None => {},
                    },
                    None => log::debug!("control char {:#x} without CTRL_HEADER", u),
                },
                0..=0x1F => {},
                _ => builder.push_unit(unit, style),
            }
            pos += if is_wide_control(unit) { 8 } else { 1 };
        }

        ParsedParagraph {
            paragraph: builder.finish(),
            tables,
        }
    }

    fn control(&self, index: usize) -> Option<ControlContent> {
        let id = read_u32_le(self.records[index].data, 0).ok()?;
        match id {
            CTRL_TABLE => self.table(index).map(ControlContent::Table),
            CTRL_DRAWING => self.drawing(index).map(ControlContent::Inline),
            CTRL_EQUATION => self.equation(index).map(ControlContent::Inline),
            CTRL_FOOTNOTE | CTRL_ENDNOTE => {
                let text = self.nested_text(index, " ");
                (!text.is_empty()).then_some(ControlContent::Inline(InlineContent::Footnote(text)))
            },
            _ => {
                log::trace!("ignoring control {:?}", id.to_be_bytes().map(char::from));
                None
            },
        }
    }

    /// Descendants of a record, excluding the record itself.
    fn subtree(&self, index: usize) -> std::ops::Range<usize> {
        index + 1..subtree_end(self.records, index)
    }

    fn table(&self, index: usize) -> Option<Table> {
        let cell_level = self.records[index].level + 1;
        let range = self.subtree(index);
        let declared_rows = range
            .clone()
            .find(|&i| self.records[i].tag == tag::TABLE)
            .and_then(|i| read_u16_le(self.records[i].data, 4).ok())
            .unwrap_or(0) as usize;

        let mut rows: Vec<Vec<(u16, TableCell)>> = vec![Vec::new(); declared_rows];
        let mut i = range.start;
        while i < range.end {
            let record = &self.records[i];
            if record.tag != tag::LIST_HEADER || record.level != cell_level {
                i += 1;
                continue;
            }
            let (row, col, cell, next) = self.cell(i, range.end);
            if rows.len() <= row as usize {
                rows.resize_with(row as usize + 1, Vec::new);
            }
            rows[row as usize].push((col, cell));
            i = next;
        }

        let mut table = Table::new();
        for mut cells in rows {
            cells.sort_by_key(|(col, _)| *col);
            table.rows.push(TableRow {
                cells: cells.into_iter().map(|(_, cell)| cell).collect(),
            });
        }
        table.rows.retain(|r| !r.cells.is_empty());
        if table.rows.is_empty() {
            return None;
        }
        table.has_header = table.rows.len() > 1;
        Some(table)
    }

    /// Parse a cell starting at its `LIST_HEADER`; returns its address, the
    /// cell and the index where the next cell may start.
    fn cell(&self, index: usize, end: usize) -> (u16, u16, TableCell, usize) {
        let header = self.records[index].data;
        let mut cursor = ByteCursor::new(header);
        let _ = cursor.skip(8);
        let col = cursor.read_u16().unwrap_or(0);
        let row = cursor.read_u16().unwrap_or(0);
        let colspan = cursor.read_u16().unwrap_or(1);
        let rowspan = cursor.read_u16().unwrap_or(1);

        let level = self.records[index].level;
        let mut cell = TableCell::new().with_span(rowspan as u32, colspan as u32);
        let mut i = index + 1;
        while i < end {
            let record = &self.records[i];
            if record.level < level || (record.level == level && record.tag == tag::LIST_HEADER) {
                break;
            }
            if record.level == level && record.tag == tag::PARA_HEADER {
                let parsed = self.parse(i);
                if !parsed.paragraph.is_empty() {
                    cell.content.push(parsed.paragraph);
                }
                cell.content
                    .extend(parsed.tables.iter().flat_map(flatten_table));
                i = subtree_end(self.records, i);
            } else {
                i += 1;
            }
        }
        (row, col, cell, i)
    }

    fn drawing(&self, index: usize) -> Option<InlineContent> {
        let range = self.subtree(index);
        if let Some(picture) = range
            .clone()
            .find(|&i| self.records[i].tag == tag::SHAPE_COMPONENT_PICTURE)
        {
            let bin_id = read_u16_le(self.records[picture].data, PICTURE_BIN_ID_OFFSET).ok()?;
            return match self.docinfo.bin_item(bin_id) {
                Some(item) => Some(InlineContent::Image(ImageRef::new(item.stream_name.clone()))),
                None => {
                    log::debug!("picture references unknown bin item {}", bin_id);
                    None
                },
            };
        }
        // Text boxes keep their text inline
        let text = self.nested_text(index, " ");
        (!text.is_empty()).then(|| InlineContent::Text(TextRun::new(text)))
    }

    fn equation(&self, index: usize) -> Option<InlineContent> {
        let record = self
            .subtree(index)
            .map(|i| &self.records[i])
            .find(|r| r.tag == tag::EQEDIT)?;
        let mut cursor = ByteCursor::new(record.data);
        cursor.skip(4).ok()?;
        let script = cursor.read_hwp_string().ok()?;
        let script = script.trim();
        (!script.is_empty()).then(|| InlineContent::Equation(Equation::new(script)))
    }

    /// Plain text of every paragraph under a control.
    fn nested_text(&self, index: usize, separator: &str) -> String {
        let range = self.subtree(index);
        let mut parts = Vec::new();
        let mut i = range.start;
        while i < range.end {
            if self.records[i].tag == tag::PARA_HEADER {
                let text = self.parse(i).paragraph.plain_text();
                let text = text.trim();
                if !text.is_empty() {
                    parts.push(text.to_string());
                }
                i = subtree_end(self.records, i);
            } else {
                i += 1;
            }
        }
        parts.join(separator)
    }
}

enum ControlContent {
    Inline(InlineContent),
    Table(Table),
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

/// `(position, char shape id)` pairs; positions are WCHAR offsets.
///
/// Most paragraphs switch character shape only a few times.
type CharRuns = SmallVec<[(u32, u32); 4]>;

fn parse_char_runs(data: &[u8]) -> CharRuns {
    data.chunks_exact(8)
        .map(|c| {
            (
                u32::from_le_bytes([c[0], c[1], c[2], c[3]]),
                u32::from_le_bytes([c[4], c[5], c[6], c[7]]),
            )
        })
        .collect()
}

/// Resolves the character style at increasing text positions.
struct StyleCursor<'r> {
    runs: &'r [(u32, u32)],
    next: usize,
    current: TextStyle,
    docinfo: &'r DocInfo,
}

impl<'r> StyleCursor<'r> {
    fn new(runs: &'r [(u32, u32)], docinfo: &'r DocInfo) -> Self {
        Self {
            runs,
            next: 0,
            current: TextStyle::default(),
            docinfo,
        }
    }

    fn at(&mut self, pos: u32) -> TextStyle {
        while let Some(&(start, shape)) = self.runs.get(self.next) {
            if start > pos {
                break;
            }
            self.current = self.docinfo.char_style(shape);
            self.next += 1;
        }
        self.current
    }
}

/// Accumulates UTF-16 units into styled runs; surrogate pairs are decoded
/// together.
struct RunBuilder {
    paragraph: Paragraph,
    units: Vec<u16>,
    style: TextStyle,
}

impl RunBuilder {
    fn new(paragraph: Paragraph) -> Self {
        Self {
            paragraph,
            units: Vec::new(),
            style: TextStyle::default(),
        }
    }

    fn push_unit(&mut self, unit: u16, style: TextStyle) {
        if style != self.style {
            self.flush();
            self.style = style;
        }
        self.units.push(unit);
    }

    fn push_inline(&mut self, item: InlineContent) {
        self.flush();
        self.paragraph.push(item);
    }

    fn flush(&mut self) {
        if self.units.is_empty() {
            return;
        }
        let text = String::from_utf16_lossy(&self.units);
        self.units.clear();
        self.paragraph.push_text(TextRun::with_style(text, self.style));
    }

    fn finish(mut self) -> Paragraph {
        self.flush();
        self.paragraph
    }
}

/// Builders for body text records used by the reader tests.
#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::hwp5::record::encode;

    pub(crate) fn para_header(level: u16, para_shape_id: u16) -> Vec<u8> {
        let mut data = vec![0u8; 22];
        data[8..10].copy_from_slice(&para_shape_id.to_le_bytes());
        encode(tag::PARA_HEADER, level, &data)
    }

    /// Text units for a paragraph; `\u{2}`-style placeholders are expanded
    /// into 8-WCHAR controls.
    pub(crate) fn para_text(level: u16, text: &str) -> Vec<u8> {
        let mut data = Vec::new();
        for unit in text.encode_utf16() {
            if is_wide_control(unit) {
                for _ in 0..8 {
                    data.extend_from_slice(&unit.to_le_bytes());
                }
            } else {
                data.extend_from_slice(&unit.to_le_bytes());
            }
        }
        data.extend_from_slice(&CH_PARA_END.to_le_bytes());
        encode(tag::PARA_TEXT, level, &data)
    }

    pub(crate) fn char_runs(level: u16, runs: &[(u32, u32)]) -> Vec<u8> {
        let mut data = Vec::new();
        for (pos, id) in runs {
            data.extend_from_slice(&pos.to_le_bytes());
            data.extend_from_slice(&id.to_le_bytes());
        }
        encode(tag::PARA_CHAR_SHAPE, level, &data)
    }

    pub(crate) fn ctrl_header(level: u16, name: &[u8; 4]) -> Vec<u8> {
        let mut data = ctrl_id(name).to_le_bytes().to_vec();
        data.extend_from_slice(&[0u8; 40]);
        encode(tag::CTRL_HEADER, level, &data)
    }

    /// A simple paragraph at `level`.
    pub(crate) fn paragraph(level: u16, text: &str) -> Vec<u8> {
        let mut out = para_header(level, 0);
        out.extend(para_text(level + 1, text));
        out
    }

    pub(crate) fn table_record(level: u16, rows: u16, cols: u16) -> Vec<u8> {
        let mut data = vec![0u8; 18];
        data[4..6].copy_from_slice(&rows.to_le_bytes());
        data[6..8].copy_from_slice(&cols.to_le_bytes());
        encode(tag::TABLE, level, &data)
    }

    pub(crate) fn cell_header(level: u16, row: u16, col: u16, rowspan: u16, colspan: u16) -> Vec<u8> {
        let mut data = vec![0u8; 34];
        data[0..2].copy_from_slice(&1u16.to_le_bytes());
        data[8..10].copy_from_slice(&col.to_le_bytes());
        data[10..12].copy_from_slice(&row.to_le_bytes());
        data[12..14].copy_from_slice(&colspan.to_le_bytes());
        data[14..16].copy_from_slice(&rowspan.to_le_bytes());
        encode(tag::LIST_HEADER, level, &data)
    }

    /// A paragraph anchoring a table; `cells` are `(row, col, text)`.
    pub(crate) fn table_paragraph(rows: u16, cols: u16, cells: &[(u16, u16, &str)]) -> Vec<u8> {
        let mut out = para_header(0, 0);
        out.extend(para_text(1, "\u{B}"));
        out.extend(ctrl_header(1, b"tbl "));
        out.extend(table_record(2, rows, cols));
        for (row, col, text) in cells {
            out.extend(cell_header(2, *row, *col, 1, 1));
            out.extend(paragraph(2, text));
        }
        out
    }

    /// A paragraph holding one picture that references `bin_id`.
    pub(crate) fn picture_paragraph(bin_id: u16) -> Vec<u8> {
        let mut out = para_header(0, 0);
        out.extend(para_text(1, "\u{B}"));
        out.extend(ctrl_header(1, b"gso "));
        out.extend(encode(tag::SHAPE_COMPONENT, 2, &[0u8; 8]));
        let mut picture = vec![0u8; PICTURE_BIN_ID_OFFSET + 2];
        picture[PICTURE_BIN_ID_OFFSET..].copy_from_slice(&bin_id.to_le_bytes());
        out.extend(encode(tag::SHAPE_COMPONENT_PICTURE, 3, &picture));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::hwp5::docinfo::fixtures as docinfo_fixtures;
    use crate::hwp5::record::encode;
    use crate::model::{Block, ListStyle};

    fn docinfo() -> DocInfo {
        let mut stream = docinfo_fixtures::char_shape(0);
        stream.extend(docinfo_fixtures::char_shape(0b10));
        stream.extend(docinfo_fixtures::para_shape(0, 0));
        stream.extend(docinfo_fixtures::heading_shape(1));
        stream.extend(docinfo_fixtures::bin_item(1, "png"));
        DocInfo::parse(&stream).unwrap()
    }

    fn paragraphs(section: &Section) -> Vec<&Paragraph> {
        section
            .content
            .iter()
            .filter_map(|b| match b {
                Block::Paragraph(p) => Some(p),
                Block::Table(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_plain_paragraphs() {
        let mut stream = paragraph(0, "첫 번째 문단");
        stream.extend(paragraph(0, ""));
        stream.extend(paragraph(0, "Second\nline\tend"));
        let section = parse_section(&stream, 0, &docinfo()).unwrap();
        let paras = paragraphs(&section);
        assert_eq!(paras.len(), 2);
        assert_eq!(paras[0].plain_text(), "첫 번째 문단");
        assert_eq!(paras[1].plain_text(), "Second\nline\tend");
        assert!(matches!(paras[1].content[1], InlineContent::LineBreak));
    }

    #[test]
    fn test_char_shape_runs() {
        let mut stream = para_header(0, 0);
        stream.extend(para_text(1, "plain bold"));
        stream.extend(char_runs(1, &[(0, 0), (6, 1)]));
        let section = parse_section(&stream, 0, &docinfo()).unwrap();
        let para = paragraphs(&section)[0];
        assert_eq!(para.content.len(), 2);
        match &para.content[1] {
            InlineContent::Text(run) => {
                assert_eq!(run.text, "bold");
                assert!(run.style.bold);
            },
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_heading_from_para_shape() {
        let mut stream = para_header(0, 1);
        stream.extend(para_text(1, "Title"));
        let section = parse_section(&stream, 0, &docinfo()).unwrap();
        assert_eq!(paragraphs(&section)[0].style.heading_level, 1);
        assert_eq!(paragraphs(&section)[0].style.list_style, None::<ListStyle>);
    }

    #[test]
    fn test_surrogate_pair_and_wide_controls() {
        // Section definition control (0x02) carries no content of its own
        let mut stream = para_header(0, 0);
        stream.extend(para_text(1, "\u{2}A😀B"));
        stream.extend(ctrl_header(1, b"secd"));
        let section = parse_section(&stream, 0, &docinfo()).unwrap();
        assert_eq!(paragraphs(&section)[0].plain_text(), "A😀B");
    }

    #[test]
    fn test_table() {
        let stream = table_paragraph(2, 2, &[(0, 0, "a"), (0, 1, "b"), (1, 1, "d"), (1, 0, "c")]);
        let section = parse_section(&stream, 0, &docinfo()).unwrap();
        assert_eq!(section.content.len(), 1);
        let Block::Table(table) = &section.content[0] else {
            panic!("expected a table");
        };
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[1].cells[0].plain_text(), "c");
        assert_eq!(table.rows[1].cells[1].plain_text(), "d");
        assert!(table.has_header);
    }

    #[test]
    fn test_table_cell_spans() {
        let mut stream = para_header(0, 0);
        stream.extend(para_text(1, "\u{B}"));
        stream.extend(ctrl_header(1, b"tbl "));
        stream.extend(table_record(2, 2, 2));
        stream.extend(cell_header(2, 0, 0, 1, 2));
        stream.extend(paragraph(2, "wide"));
        stream.extend(cell_header(2, 1, 0, 1, 1));
        stream.extend(paragraph(2, "x"));
        stream.extend(cell_header(2, 1, 1, 1, 1));
        stream.extend(paragraph(2, "y"));
        let section = parse_section(&stream, 0, &docinfo()).unwrap();
        let Block::Table(table) = &section.content[0] else {
            panic!("expected a table");
        };
        assert_eq!(table.rows[0].cells[0].colspan, 2);
        assert_eq!(table.column_count(), 2);
        assert!(table.has_merged_cells());
    }

    #[test]
    fn test_picture_reference() {
        let stream = picture_paragraph(1);
        let section = parse_section(&stream, 0, &docinfo()).unwrap();
        let para = paragraphs(&section)[0];
        let images: Vec<_> = para.images().collect();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].id, "BIN0001.png");
    }

    #[test]
    fn test_equation_and_footnote() {
        let mut stream = para_header(0, 0);
        stream.extend(para_text(1, "x\u{B}y\u{11}"));
        stream.extend(ctrl_header(1, b"eqed"));
        let mut eq = 0u32.to_le_bytes().to_vec();
        eq.extend(docinfo_fixtures::hwp_string("a over b"));
        stream.extend(encode(tag::EQEDIT, 2, &eq));
        stream.extend(ctrl_header(1, b"fn  "));
        stream.extend(cell_header(2, 0, 0, 1, 1));
        stream.extend(paragraph(2, "note text"));
        let section = parse_section(&stream, 0, &docinfo()).unwrap();
        let para = paragraphs(&section)[0];
        assert!(para
            .content
            .iter()
            .any(|c| matches!(c, InlineContent::Equation(e) if e.script == "a over b")));
        assert!(para
            .content
            .iter()
            .any(|c| matches!(c, InlineContent::Footnote(t) if t == "note text")));
        assert_eq!(para.plain_text(), "xy");
    }

    #[test]
    fn test_truncated_stream_is_error() {
        let mut stream = paragraph(0, "hello world");
        stream.truncate(stream.len() - 3);
        assert!(parse_section(&stream, 0, &docinfo()).is_err());
    }
}

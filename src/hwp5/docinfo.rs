//! `DocInfo` stream: document-wide shape tables and binary item table.
//!
//! Paragraphs and text runs in the body refer to these tables by index, so
//! only the properties that survive into the content model are kept.

use super::record::{Record, RecordReader, tag};
use crate::common::Result;
use crate::common::binary::{ByteCursor, read_u16_le, read_u32_le};
use crate::model::{ListStyle, ParagraphStyle, TextStyle};
use std::collections::HashMap;

const CHAR_SHAPE_PROPERTIES_OFFSET: usize = 46;

const CHAR_PROP_ITALIC: u32 = 1 << 0;
const CHAR_PROP_BOLD: u32 = 1 << 1;
const CHAR_PROP_UNDERLINE_MASK: u32 = 0b11 << 2;
const CHAR_PROP_SUPERSCRIPT: u32 = 1 << 15;
const CHAR_PROP_SUBSCRIPT: u32 = 1 << 16;
const CHAR_PROP_STRIKEOUT_MASK: u32 = 0b111 << 18;

const PARA_SHAPE_BULLET_ID_OFFSET: usize = 30;

const HEAD_SHAPE_SHIFT: u32 = 23;
const HEAD_SHAPE_MASK: u32 = 0b11;
const HEAD_LEVEL_SHIFT: u32 = 25;
const HEAD_LEVEL_MASK: u32 = 0b111;

const BULLET_CHAR_OFFSET: usize = 12;

/// Bullet glyphs that render as a plain Markdown list item.
const PLAIN_BULLETS: &[char] = &['•', '●', '○', '◦', '■', '□', '▪', '-', '·', '∙', 'ㆍ'];

/// How a binary item is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinCompression {
    /// Follows the document's `COMPRESSED` flag
    Default,
    Compressed,
    Stored,
}

/// One `BIN_DATA` entry that points at a `BinData` stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinItem {
    pub id: u16,
    pub stream_name: String,
    pub extension: String,
    pub compression: BinCompression,
}

/// A named paragraph style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleDef {
    pub name: String,
    pub english_name: String,
    pub para_shape_id: u16,
    pub char_shape_id: u16,
}

#[derive(Debug, Clone, Default)]
pub struct DocInfo {
    /// Embedded items keyed by their storage id
    pub bin_items: HashMap<u16, BinItem>,
    /// Storage ids in declaration order; pictures may refer to an item by its
    /// one-based position here
    pub bin_order: Vec<u16>,
    pub char_shapes: Vec<TextStyle>,
    pub para_shapes: Vec<ParagraphStyle>,
    pub bullets: Vec<char>,
    pub styles: Vec<StyleDef>,
    /// Bullet id referenced by each paragraph shape (0 = none)
    para_bullet_ids: Vec<u16>,
}

impl DocInfo {
    /// Parse a decompressed `DocInfo` stream.
    ///
    /// Malformed shape records are logged and replaced by defaults so that
    /// the body's indices stay aligned.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut info = DocInfo::default();
        for record in RecordReader::new(data) {
            let record = record?;
            match record.tag {
                tag::BIN_DATA => {
                    if let Some(item) = parse_bin_item(&record) {
                        info.bin_order.push(item.id);
                        info.bin_items.insert(item.id, item);
                    }
                },
                tag::CHAR_SHAPE => info.char_shapes.push(parse_char_shape(record.data)),
                tag::PARA_SHAPE => {
                    let (style, bullet_id) = parse_para_shape(record.data);
                    info.para_shapes.push(style);
                    info.para_bullet_ids.push(bullet_id);
                },
                tag::BULLET => info
                    .bullets
                    .push(parse_bullet(record.data).unwrap_or('•')),
                tag::STYLE => match parse_style(record.data) {
                    Ok(style) => info.styles.push(style),
                    Err(e) => log::debug!("skipping malformed style record: {}", e),
                },
                _ => {},
            }
        }
        info.resolve_bullets();
        log::trace!(
            "DocInfo: {} char shapes, {} para shapes, {} styles, {} bin items",
            info.char_shapes.len(),
            info.para_shapes.len(),
            info.styles.len(),
            info.bin_items.len()
        );
        Ok(info)
    }

    // Bullet records come after paragraph shapes, so custom glyphs are
    // attached once the whole stream is read.
    fn resolve_bullets(&mut self) {
        for (shape, &bullet_id) in self.para_shapes.iter_mut().zip(&self.para_bullet_ids) {
            if shape.list_style != Some(ListStyle::Unordered) || bullet_id == 0 {
                continue;
            }
            if let Some(&glyph) = self.bullets.get(bullet_id as usize - 1)
                && !PLAIN_BULLETS.contains(&glyph)
                && !is_private_use(glyph)
            {
                shape.list_style = Some(ListStyle::CustomBullet(glyph));
            }
        }
    }

    pub fn char_style(&self, id: u32) -> TextStyle {
        self.char_shapes.get(id as usize).copied().unwrap_or_default()
    }

    /// Resolve a paragraph's style from its shape, falling back to an outline
    /// style name ("개요 N" / "Outline N") for the heading level.
    pub fn paragraph_style(&self, para_shape_id: u16, style_id: u8) -> ParagraphStyle {
        let mut style = self
            .para_shapes
            .get(para_shape_id as usize)
            .cloned()
            .unwrap_or_default();
        if !style.is_heading()
            && !style.is_list_item()
            && let Some(level) = self
                .styles
                .get(style_id as usize)
                .and_then(|s| {
                    ParagraphStyle::outline_level_from_name(&s.name)
                        .or_else(|| ParagraphStyle::outline_level_from_name(&s.english_name))
                })
        {
            style.heading_level = level;
        }
        style
    }

    /// Look up a binary item by storage id, then by declaration position.
    pub fn bin_item(&self, id: u16) -> Option<&BinItem> {
        self.bin_items.get(&id).or_else(|| {
            let position = (id as usize).checked_sub(1)?;
            self.bin_order
                .get(position)
                .and_then(|storage_id| self.bin_items.get(storage_id))
        })
    }
}

fn is_private_use(c: char) -> bool {
    ('\u{E000}'..='\u{F8FF}').contains(&c)
}

fn parse_bin_item(record: &Record<'_>) -> Option<BinItem> {
    let mut cursor = ByteCursor::new(record.data);
    let props = cursor.read_u16().ok()?;
    // 0 = link to an external file, which has no stream
    if !matches!(props & 0x000F, 1 | 2) {
        return None;
    }
    let compression = match (props >> 4) & 0b11 {
        1 => BinCompression::Compressed,
        2 => BinCompression::Stored,
        _ => BinCompression::Default,
    };
    let id = cursor.read_u16().ok()?;
    let extension = cursor
        .read_hwp_string()
        .ok()
        .filter(|ext| !ext.is_empty())
        .unwrap_or_else(|| "bin".to_string())
        .to_ascii_lowercase();
    Some(BinItem {
        id,
        stream_name: format!("BIN{:04X}.{}", id, extension),
        extension,
        compression,
    })
}

fn parse_char_shape(data: &[u8]) -> TextStyle {
    let Ok(props) = read_u32_le(data, CHAR_SHAPE_PROPERTIES_OFFSET) else {
        log::debug!("short CHAR_SHAPE record ({} bytes)", data.len());
        return TextStyle::default();
    };
    TextStyle {
        bold: props & CHAR_PROP_BOLD != 0,
        italic: props & CHAR_PROP_ITALIC != 0,
        underline: props & CHAR_PROP_UNDERLINE_MASK != 0,
        strikethrough: props & CHAR_PROP_STRIKEOUT_MASK != 0,
        superscript: props & CHAR_PROP_SUPERSCRIPT != 0,
        subscript: props & CHAR_PROP_SUBSCRIPT != 0,
    }
}

fn parse_para_shape(data: &[u8]) -> (ParagraphStyle, u16) {
    let Ok(props) = read_u32_le(data, 0) else {
        log::debug!("short PARA_SHAPE record ({} bytes)", data.len());
        return (ParagraphStyle::default(), 0);
    };
    let bullet_id = read_u16_le(data, PARA_SHAPE_BULLET_ID_OFFSET).unwrap_or(0);
    let level = ((props >> HEAD_LEVEL_SHIFT) & HEAD_LEVEL_MASK) as u8;
    let style = match (props >> HEAD_SHAPE_SHIFT) & HEAD_SHAPE_MASK {
        1 => ParagraphStyle::heading(level + 1),
        2 => ParagraphStyle::list(ListStyle::Ordered, level),
        3 => ParagraphStyle::list(ListStyle::Unordered, level),
        _ => ParagraphStyle::default(),
    };
    (style, bullet_id)
}

fn parse_bullet(data: &[u8]) -> Option<char> {
    let unit = read_u16_le(data, BULLET_CHAR_OFFSET).ok()?;
    char::from_u32(unit as u32).filter(|c| !c.is_control())
}

fn parse_style(data: &[u8]) -> Result<StyleDef> {
    let mut cursor = ByteCursor::new(data);
    let name = cursor.read_hwp_string()?;
    let english_name = cursor.read_hwp_string()?;
    let _kind = cursor.read_u8()?;
    let _next_style = cursor.read_u8()?;
    let _lang = cursor.read_u16()?;
    let para_shape_id = cursor.read_u16()?;
    let char_shape_id = cursor.read_u16()?;
    Ok(StyleDef {
        name,
        english_name,
        para_shape_id,
        char_shape_id,
    })
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_char_shape_bits() {
        let mut stream = char_shape(0);
        stream.extend(char_shape(CHAR_PROP_BOLD | CHAR_PROP_ITALIC));
        stream.extend(char_shape(1 << 2 | 1 << 18 | CHAR_PROP_SUPERSCRIPT));
        let info = DocInfo::parse(&stream).unwrap();
        assert_eq!(info.char_style(0), TextStyle::default());
        let emphasis = info.char_style(1);
        assert!(emphasis.bold && emphasis.italic && !emphasis.underline);
        let marked = info.char_style(2);
        assert!(marked.underline && marked.strikethrough && marked.superscript);
        assert!(!marked.bold);
        // Out of range ids fall back to plain text
        assert_eq!(info.char_style(99), TextStyle::default());
    }

    #[test]
    fn test_para_shape_heads() {
        let mut stream = para_shape(0, 0);
        stream.extend(heading_shape(2));
        stream.extend(para_shape(2 << HEAD_SHAPE_SHIFT | 1 << HEAD_LEVEL_SHIFT, 0));
        stream.extend(para_shape(3 << HEAD_SHAPE_SHIFT, 1));
        stream.extend(para_shape(3 << HEAD_SHAPE_SHIFT, 2));
        stream.extend(bullet('●'));
        stream.extend(bullet('※'));
        let info = DocInfo::parse(&stream).unwrap();
        assert!(!info.paragraph_style(0, 0).is_heading());
        assert_eq!(info.paragraph_style(1, 0).heading_level, 2);
        let ordered = info.paragraph_style(2, 0);
        assert_eq!(ordered.list_style, Some(ListStyle::Ordered));
        assert_eq!(ordered.indent_level, 1);
        assert_eq!(info.paragraph_style(3, 0).list_style, Some(ListStyle::Unordered));
        assert_eq!(
            info.paragraph_style(4, 0).list_style,
            Some(ListStyle::CustomBullet('※'))
        );
    }

    #[test]
    fn test_outline_style_name() {
        let mut stream = para_shape(0, 0);
        stream.extend(style("바탕글", "Normal", 0));
        stream.extend(style("개요 3", "Outline 3", 0));
        let info = DocInfo::parse(&stream).unwrap();
        assert_eq!(info.styles.len(), 2);
        assert!(!info.paragraph_style(0, 0).is_heading());
        assert_eq!(info.paragraph_style(0, 1).heading_level, 3);
    }

    #[test]
    fn test_bin_items() {
        let mut stream = bin_item(1, "PNG");
        stream.extend(bin_item(3, ""));
        // link-type items carry no stream
        stream.extend(encode_link());
        let info = DocInfo::parse(&stream).unwrap();
        assert_eq!(info.bin_items.len(), 2);
        assert_eq!(info.bin_item(1).unwrap().stream_name, "BIN0001.png");
        assert_eq!(info.bin_item(3).unwrap().stream_name, "BIN0003.bin");
        // Position fallback: the second declared item
        assert_eq!(info.bin_item(2).unwrap().id, 3);
        assert!(info.bin_item(7).is_none());
    }

    fn encode_link() -> Vec<u8> {
        crate::hwp5::record::encode(tag::BIN_DATA, 1, &[0, 0, 0, 0])
    }
}

//! `Contents/header.xml`: character and paragraph properties, named styles
//! and document options.

use super::xml::{attr, attr_bool, attr_u32, local_name};
use crate::common::Result;
use crate::model::{ListStyle, ParagraphStyle, TextStyle};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct HeaderInfo {
    pub char_properties: HashMap<u32, TextStyle>,
    pub para_properties: HashMap<u32, ParagraphStyle>,
    pub styles: HashMap<u32, NamedStyle>,
    pub is_distribution: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamedStyle {
    pub name: String,
    pub english_name: String,
    pub para_pr: Option<u32>,
}

impl HeaderInfo {
    pub fn char_style(&self, id: Option<u32>) -> TextStyle {
        id.and_then(|id| self.char_properties.get(&id))
            .copied()
            .unwrap_or_default()
    }

    /// Paragraph style from `paraPrIDRef`, falling back to the named style's
    /// own properties or outline name.
    pub fn paragraph_style(&self, para_pr: Option<u32>, style: Option<u32>) -> ParagraphStyle {
        let mut result = para_pr
            .and_then(|id| self.para_properties.get(&id))
            .cloned()
            .unwrap_or_default();
        if result.is_heading() || result.is_list_item() {
            return result;
        }
        let Some(named) = style.and_then(|id| self.styles.get(&id)) else {
            return result;
        };
        if let Some(level) = ParagraphStyle::outline_level_from_name(&named.name)
            .or_else(|| ParagraphStyle::outline_level_from_name(&named.english_name))
        {
            result.heading_level = level;
        } else if let Some(style_para) = named.para_pr.and_then(|id| self.para_properties.get(&id))
            && style_para.is_heading()
        {
            result.heading_level = style_para.heading_level;
        }
        result
    }
}

enum Scope {
    None,
    CharPr(u32, TextStyle),
    ParaPr(u32, ParagraphStyle),
}

pub fn parse_header(xml: &str) -> Result<HeaderInfo> {
    let mut info = HeaderInfo::default();
    let mut reader = Reader::from_str(xml);
    let mut scope = Scope::None;

    loop {
        let (e, empty) = match reader.read_event()? {
            Event::Start(e) => (e, false),
            Event::Empty(e) => (e, true),
            Event::End(e) => {
                if matches!(e.local_name().as_ref(), b"charPr" | b"paraPr") {
                    match std::mem::replace(&mut scope, Scope::None) {
                        Scope::CharPr(id, style) => {
                            info.char_properties.insert(id, style);
                        },
                        Scope::ParaPr(id, style) => {
                            info.para_properties.insert(id, style);
                        },
                        Scope::None => {},
                    }
                }
                continue;
            },
            Event::Eof => break,
            _ => continue,
        };
        match local_name(&e).as_ref() {
            "charPr" => {
                let id = attr_u32(&e, "id").unwrap_or(0);
                if empty {
                    info.char_properties.insert(id, TextStyle::default());
                } else {
                    scope = Scope::CharPr(id, TextStyle::default());
                }
            },
            "paraPr" => {
                let id = attr_u32(&e, "id").unwrap_or(0);
                if empty {
                    info.para_properties.insert(id, ParagraphStyle::default());
                } else {
                    scope = Scope::ParaPr(id, ParagraphStyle::default());
                }
            },
            "style" => {
                if let Some(id) = attr_u32(&e, "id") {
                    info.styles.insert(
                        id,
                        NamedStyle {
                            name: attr(&e, "name").unwrap_or_default(),
                            english_name: attr(&e, "engName").unwrap_or_default(),
                            para_pr: attr_u32(&e, "paraPrIDRef"),
                        },
                    );
                }
            },
            "docOption" => {
                if let Some(flag) = attr_bool(&e, "distribute") {
                    info.is_distribution = flag;
                }
            },
            name => match &mut scope {
                Scope::CharPr(_, style) => apply_char_child(style, name, &e),
                Scope::ParaPr(_, style) => apply_para_child(style, name, &e),
                Scope::None => {},
            },
        }
    }
    log::trace!(
        "header: {} charPr, {} paraPr, {} styles",
        info.char_properties.len(),
        info.para_properties.len(),
        info.styles.len()
    );
    Ok(info)
}

fn apply_char_child(style: &mut TextStyle, name: &str, e: &BytesStart<'_>) {
    match name {
        "bold" => style.bold = true,
        "italic" => style.italic = true,
        "underline" => style.underline = attr(e, "type").is_none_or(|t| t != "NONE"),
        "strikeout" => style.strikethrough = attr(e, "shape").is_none_or(|s| s != "NONE"),
        "supscript" | "superscript" => style.superscript = true,
        "subscript" => style.subscript = true,
        _ => {},
    }
}

fn apply_para_child(style: &mut ParagraphStyle, name: &str, e: &BytesStart<'_>) {
    if name != "heading" {
        return;
    }
    let level = attr_u32(e, "level").unwrap_or(0).min(6) as u8;
    match attr(e, "type").as_deref() {
        Some("OUTLINE") => *style = ParagraphStyle::heading(level + 1),
        Some("NUMBER") => *style = ParagraphStyle::list(ListStyle::Ordered, level),
        Some("BULLET") => *style = ParagraphStyle::list(ListStyle::Unordered, level),
        _ => {},
    }
}

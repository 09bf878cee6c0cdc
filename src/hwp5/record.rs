//! Tagged record stream shared by `DocInfo` and `BodyText/SectionN`.
//!
//! Each record starts with a 32-bit header: tag id (bits 0-9), nesting level
//! (bits 10-19) and payload size (bits 20-31). A size of `0xFFF` means the
//! real size follows as an extra u32. Records are stored in pre-order, so a
//! record's children are the following records with a greater level.

use crate::common::binary::read_u32_le;
use crate::common::{Error, Result};

/// Record tag ids.
pub mod tag {
    pub const BEGIN: u16 = 0x010;

    pub const DOCUMENT_PROPERTIES: u16 = BEGIN;
    pub const ID_MAPPINGS: u16 = BEGIN + 1;
    pub const BIN_DATA: u16 = BEGIN + 2;
    pub const FACE_NAME: u16 = BEGIN + 3;
    pub const BORDER_FILL: u16 = BEGIN + 4;
    pub const CHAR_SHAPE: u16 = BEGIN + 5;
    pub const TAB_DEF: u16 = BEGIN + 6;
    pub const NUMBERING: u16 = BEGIN + 7;
    pub const BULLET: u16 = BEGIN + 8;
    pub const PARA_SHAPE: u16 = BEGIN + 9;
    pub const STYLE: u16 = BEGIN + 10;

    pub const PARA_HEADER: u16 = BEGIN + 50;
    pub const PARA_TEXT: u16 = BEGIN + 51;
    pub const PARA_CHAR_SHAPE: u16 = BEGIN + 52;
    pub const PARA_LINE_SEG: u16 = BEGIN + 53;
    pub const PARA_RANGE_TAG: u16 = BEGIN + 54;
    pub const CTRL_HEADER: u16 = BEGIN + 55;
    pub const LIST_HEADER: u16 = BEGIN + 56;
    pub const PAGE_DEF: u16 = BEGIN + 57;
    pub const FOOTNOTE_SHAPE: u16 = BEGIN + 58;
    pub const PAGE_BORDER_FILL: u16 = BEGIN + 59;
    pub const SHAPE_COMPONENT: u16 = BEGIN + 60;
    pub const TABLE: u16 = BEGIN + 61;
    pub const SHAPE_COMPONENT_LINE: u16 = BEGIN + 62;
    pub const SHAPE_COMPONENT_RECTANGLE: u16 = BEGIN + 63;
    pub const SHAPE_COMPONENT_ELLIPSE: u16 = BEGIN + 64;
    pub const SHAPE_COMPONENT_ARC: u16 = BEGIN + 65;
    pub const SHAPE_COMPONENT_POLYGON: u16 = BEGIN + 66;
    pub const SHAPE_COMPONENT_CURVE: u16 = BEGIN + 67;
    pub const SHAPE_COMPONENT_OLE: u16 = BEGIN + 68;
    pub const SHAPE_COMPONENT_PICTURE: u16 = BEGIN + 69;
    pub const SHAPE_COMPONENT_CONTAINER: u16 = BEGIN + 70;
    pub const CTRL_DATA: u16 = BEGIN + 71;
    pub const EQEDIT: u16 = BEGIN + 72;
}

const SIZE_EXTENDED: u32 = 0xFFF;

/// A record borrowing its payload from the decompressed stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record<'a> {
    pub tag: u16,
    pub level: u16,
    pub data: &'a [u8],
}

/// Iterator over the records of a stream.
///
/// A header or payload running past the end of the stream is reported once as
/// [`Error::CorruptedFile`], after which iteration stops.
pub struct RecordReader<'a> {
    data: &'a [u8],
    pos: usize,
    failed: bool,
}

impl<'a> RecordReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            failed: false,
        }
    }

    fn read_next(&mut self) -> Result<Record<'a>> {
        let header = read_u32_le(self.data, self.pos)?;
        self.pos += 4;
        let tag = (header & 0x3FF) as u16;
        let level = ((header >> 10) & 0x3FF) as u16;
        let mut size = header >> 20;
        if size == SIZE_EXTENDED {
            size = read_u32_le(self.data, self.pos)?;
            self.pos += 4;
        }
        let end = self
            .pos
            .checked_add(size as usize)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| {
                Error::CorruptedFile(format!(
                    "record {} at offset {} overruns stream ({} bytes)",
                    tag,
                    self.pos,
                    self.data.len()
                ))
            })?;
        let record = Record {
            tag,
            level,
            data: &self.data[self.pos..end],
        };
        self.pos = end;
        Ok(record)
    }
}

impl<'a> Iterator for RecordReader<'a> {
    type Item = Result<Record<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.data.len() {
            return None;
        }
        let result = self.read_next();
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }
}

/// Read every record of a stream.
pub fn read_records(data: &[u8]) -> Result<Vec<Record<'_>>> {
    RecordReader::new(data).collect()
}

/// Index one past the last descendant of `records[index]`.
pub fn subtree_end(records: &[Record<'_>], index: usize) -> usize {
    let level = records[index].level;
    records[index + 1..]
        .iter()
        .position(|r| r.level <= level)
        .map_or(records.len(), |offset| index + 1 + offset)
}

/// Indices of the direct children of `records[index]`.
pub fn children<'a>(records: &'a [Record<'_>], index: usize) -> impl Iterator<Item = usize> + 'a {
    let child_level = records[index].level + 1;
    let end = subtree_end(records, index);
    (index + 1..end).filter(move |&i| records[i].level == child_level)
}

/// Encode one record; the inverse of [`RecordReader`].
#[cfg(test)]
pub(crate) fn encode(tag: u16, level: u16, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 8);
    let base = tag as u32 | (level as u32) << 10;
    if payload.len() >= SIZE_EXTENDED as usize {
        out.extend_from_slice(&(base | SIZE_EXTENDED << 20).to_le_bytes());
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    } else {
        out.extend_from_slice(&(base | (payload.len() as u32) << 20).to_le_bytes());
    }
    out.extend_from_slice(payload);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_fields() {
        let mut stream = encode(tag::PARA_HEADER, 0, &[1, 2, 3]);
        stream.extend(encode(tag::PARA_TEXT, 1, b"ab"));
        let records = read_records(&stream).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].tag, 66);
        assert_eq!(records[0].data, &[1, 2, 3]);
        assert_eq!(records[1].tag, 67);
        assert_eq!(records[1].level, 1);
    }

    #[test]
    fn test_extended_size() {
        let payload = vec![7u8; 5000];
        let stream = encode(tag::BIN_DATA, 2, &payload);
        let records = read_records(&stream).unwrap();
        assert_eq!(records[0].data.len(), 5000);
        assert_eq!(records[0].level, 2);
    }

    #[test]
    fn test_truncated_payload() {
        let mut stream = encode(tag::PARA_TEXT, 0, &[0u8; 16]);
        stream.truncate(10);
        let mut reader = RecordReader::new(&stream);
        assert!(matches!(reader.next(), Some(Err(Error::CorruptedFile(_)))));
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_tree_navigation() {
        let mut stream = Vec::new();
        for (tag, level) in [
            (tag::PARA_HEADER, 0),
            (tag::PARA_TEXT, 1),
            (tag::CTRL_HEADER, 1),
            (tag::LIST_HEADER, 2),
            (tag::PARA_HEADER, 2),
            (tag::PARA_HEADER, 0),
        ] {
            stream.extend(encode(tag, level, &[]));
        }
        let records = read_records(&stream).unwrap();
        assert_eq!(subtree_end(&records, 0), 5);
        assert_eq!(subtree_end(&records, 2), 5);
        assert_eq!(subtree_end(&records, 5), 6);
        assert_eq!(children(&records, 0).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(children(&records, 2).collect::<Vec<_>>(), vec![3, 4]);
    }
}

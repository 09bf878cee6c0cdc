//! In-memory HWP 5.0 documents for tests.

use super::bodytext::fixtures as body;
use super::docinfo::fixtures as info;
use super::header::{FileHeader, HeaderFlags, Version};
use crate::ole::builder::{CompoundFileBuilder, lpwstr, property_set};
use crate::ole::consts::VT_LPWSTR;
use flate2::Compression;
use flate2::write::DeflateEncoder;
use std::io::Write;

pub(crate) fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Assembles an HWP 5.0 compound file.
pub(crate) struct Hwp5Builder {
    pub(crate) flags: HeaderFlags,
    pub(crate) docinfo: Vec<u8>,
    pub(crate) sections: Vec<Vec<u8>>,
    pub(crate) bin_data: Vec<(String, Vec<u8>)>,
    pub(crate) title: Option<String>,
    pub(crate) author: Option<String>,
    pub(crate) body_storage: bool,
}

impl Hwp5Builder {
    pub(crate) fn new() -> Self {
        Self {
            flags: HeaderFlags::COMPRESSED,
            docinfo: Vec::new(),
            sections: Vec::new(),
            bin_data: Vec::new(),
            title: None,
            author: None,
            body_storage: true,
        }
    }

    pub(crate) fn section(mut self, records: Vec<u8>) -> Self {
        self.sections.push(records);
        self
    }

    pub(crate) fn image(mut self, id: u16, extension: &str, payload: &[u8]) -> Self {
        self.docinfo.extend(info::bin_item(id, extension));
        self.bin_data
            .push((format!("BIN{:04X}.{}", id, extension), payload.to_vec()));
        self
    }

    pub(crate) fn flags(mut self, flags: HeaderFlags) -> Self {
        self.flags = flags;
        self
    }

    pub(crate) fn build(&self) -> Vec<u8> {
        let compressed = self.flags.contains(HeaderFlags::COMPRESSED);
        let pack = |data: &[u8]| {
            if compressed {
                deflate(data)
            } else {
                data.to_vec()
            }
        };

        let header = FileHeader {
            version: Version::new(5, 1, 0, 1),
            flags: self.flags,
        };
        let mut builder = CompoundFileBuilder::new();
        builder.add_stream(&["FileHeader"], &header.to_bytes());
        builder.add_stream(&["DocInfo"], &pack(&self.docinfo));
        if self.body_storage {
            for (i, section) in self.sections.iter().enumerate() {
                let name = format!("Section{}", i);
                builder.add_stream(&["BodyText", name.as_str()], &pack(section));
            }
        }
        for (name, payload) in &self.bin_data {
            builder.add_stream(&["BinData", name.as_str()], &pack(payload));
        }
        let mut props = Vec::new();
        if let Some(title) = &self.title {
            props.push((2, VT_LPWSTR, lpwstr(title)));
        }
        if let Some(author) = &self.author {
            props.push((4, VT_LPWSTR, lpwstr(author)));
        }
        if !props.is_empty() {
            builder.add_stream(&[crate::ole::HWP_SUMMARY_STREAM], &property_set(&props));
        }
        builder.build()
    }
}

/// Three sections, two embedded images, a heading, a table and a summary.
pub(crate) fn sample_document() -> Vec<u8> {
    let mut docinfo_prefix = info::char_shape(0);
    docinfo_prefix.extend(info::char_shape(0b10));
    docinfo_prefix.extend(info::para_shape(0, 0));
    docinfo_prefix.extend(info::heading_shape(1));

    let mut first = body::para_header(0, 1);
    first.extend(body::para_text(1, "사업 계획서"));
    first.extend(body::paragraph(0, "첫 번째 섹션입니다."));
    first.extend(body::picture_paragraph(1));

    let mut second = body::paragraph(0, "두 번째 섹션");
    second.extend(body::table_paragraph(
        2,
        2,
        &[(0, 0, "항목"), (0, 1, "값"), (1, 0, "매출"), (1, 1, "100")],
    ));

    let mut third = body::paragraph(0, "세 번째 섹션");
    third.extend(body::picture_paragraph(2));

    let mut builder = Hwp5Builder::new()
        .section(first)
        .section(second)
        .section(third)
        .image(1, "png", b"\x89PNG\r\n\x1a\nfake-png")
        .image(2, "jpg", b"\xFF\xD8\xFFfake-jpeg");
    builder.docinfo.splice(0..0, docinfo_prefix);
    builder.title = Some("사업 계획서".to_string());
    builder.author = Some("홍길동".to_string());
    builder.build()
}

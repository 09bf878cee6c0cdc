//! HWP 3.x body text: EUC-KR/CP949 bytes interleaved with control codes.

use crate::common::{Error, Result};
use crate::model::{Paragraph, Section, TextRun, TextStyle};
use encoding_rs::EUC_KR;
use flate2::read::ZlibDecoder;
use std::io::Read;

mod control {
    pub const TAB: u8 = 0x09;
    pub const LINE_BREAK: u8 = 0x0A;
    pub const PARA_END: u8 = 0x0D;
    /// Followed by one style toggle byte
    pub const ESCAPE: u8 = 0x1B;
    pub const HARD_SPACE: u8 = 0xA0;

    pub const BOLD: u8 = 0x01;
    pub const ITALIC: u8 = 0x02;
    pub const UNDERLINE: u8 = 0x03;
}

#[inline]
fn is_lead_byte(byte: u8) -> bool {
    (0x81..=0xFE).contains(&byte)
}

#[inline]
fn is_trail_byte(byte: u8) -> bool {
    matches!(byte, 0x41..=0x5A | 0x61..=0x7A | 0x81..=0xFE)
}

pub fn decode_euckr(data: &[u8]) -> String {
    let (text, _, had_errors) = EUC_KR.decode(data);
    if had_errors {
        log::trace!("replacement characters in {} byte run", data.len());
    }
    text.into_owned()
}

/// Inflate a zlib-compressed body.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len() * 4);
    ZlibDecoder::new(data)
        .read_to_end(&mut out)
        .map_err(|e| Error::Decompression(e.to_string()))?;
    Ok(out)
}

/// Split a decoded body into paragraphs. HWP 3.x documents have one section.
pub fn parse_body(data: &[u8]) -> Section {
    let mut builder = BodyBuilder::default();
    let mut i = 0;
    while i < data.len() {
        let byte = data[i];
        match byte {
            control::PARA_END => builder.end_paragraph(),
            control::LINE_BREAK => builder.line_break(),
            control::TAB => builder.pending.push(b'\t'),
            control::HARD_SPACE => builder.pending.push(b' '),
            control::ESCAPE => {
                if let Some(&code) = data.get(i + 1) {
                    builder.toggle(code);
                    i += 1;
                }
            },
            b if is_lead_byte(b) => {
                match data.get(i + 1) {
                    Some(&trail) if is_trail_byte(trail) => {
                        builder.pending.extend_from_slice(&[b, trail]);
                        i += 1;
                    },
                    // Orphan lead byte
                    _ => {},
                }
            },
            b if b >= 0x20 && b != 0x7F => builder.pending.push(b),
            _ => {},
        }
        i += 1;
    }
    builder.finish()
}

#[derive(Default)]
struct BodyBuilder {
    section: Section,
    paragraph: Paragraph,
    style: TextStyle,
    /// Undecoded bytes in the current style
    pending: Vec<u8>,
}

impl BodyBuilder {
    fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let text = decode_euckr(&self.pending);
        self.pending.clear();
        self.paragraph.push_text(TextRun::with_style(text, self.style));
    }

    fn toggle(&mut self, code: u8) {
        self.flush();
        match code {
            control::BOLD => self.style.bold = !self.style.bold,
            control::ITALIC => self.style.italic = !self.style.italic,
            control::UNDERLINE => self.style.underline = !self.style.underline,
            other => log::trace!("ignoring control 0x1B 0x{:02X}", other),
        }
    }

    fn line_break(&mut self) {
        self.flush();
        self.paragraph.push_line_break();
    }

    fn end_paragraph(&mut self) {
        self.flush();
        let paragraph = std::mem::take(&mut self.paragraph);
        if !paragraph.is_empty() {
            self.section.push_paragraph(paragraph);
        }
    }

    fn finish(mut self) -> Section {
        self.end_paragraph();
        self.section
    }
}

//! Legacy HWP 3.x reader.
//!
//! HWP 3.x files are a flat binary layout: a 128-byte header whose signature
//! carries the version, followed by document info and a body of EUC-KR text
//! with inline control codes. The body may be zlib-compressed.

mod body;
mod header;

pub use body::{decode_euckr, parse_body};
pub use header::{HEADER_SIZE, Hwp3Header, Hwp3Version};

use crate::common::{Error, Result};
use crate::model::{Document, Metadata};
use crate::parse_options::ParseOptions;
use std::io::{Read, Seek, SeekFrom};

pub struct Hwp3Reader {
    data: Vec<u8>,
    header: Hwp3Header,
}

impl Hwp3Reader {
    /// Read the file and validate its header.
    ///
    /// Encrypted documents fail with [`Error::Encrypted`].
    pub fn open<R: Read + Seek>(mut reader: R) -> Result<Self> {
        reader.seek(SeekFrom::Start(0))?;
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        let header = Hwp3Header::parse(&data)?;
        log::debug!(
            "HWP {} (compressed: {}, encrypted: {})",
            header.version,
            header.compressed,
            header.encrypted
        );
        if header.encrypted {
            return Err(Error::Encrypted);
        }
        Ok(Self { data, header })
    }

    #[inline]
    pub fn header(&self) -> &Hwp3Header {
        &self.header
    }

    /// Read the body as a single section.
    ///
    /// HWP 3.x has no embedded resource table that is read here, so the
    /// document never carries resources.
    pub fn parse(self, options: &ParseOptions) -> Result<Document> {
        let range = self.header.body_range(self.data.len())?;
        let raw = &self.data[range];
        let decoded = if self.header.compressed && !raw.is_empty() {
            match body::decompress(raw) {
                Ok(decoded) => decoded,
                Err(e) if options.is_lenient() => {
                    log::warn!("body not decompressible, reading it as stored: {}", e);
                    raw.to_vec()
                },
                Err(e) => return Err(e),
            }
        } else {
            raw.to_vec()
        };

        let mut document = Document::new();
        document.sections.push(parse_body(&decoded));
        document.metadata = Metadata {
            format_version: Some(self.header.version.to_string()),
            ..Default::default()
        };
        Ok(document)
    }
}

//! HWP 5.0 reader.
//!
//! An HWP 5.0 file is a compound file holding:
//!
//! - `FileHeader`: signature, version and document flags
//! - `DocInfo`: shape, style and binary item tables
//! - `BodyText/Section0..N`: one record stream per section
//! - `BinData/BIN####.ext`: embedded images and OLE objects
//! - `\u{5}HwpSummaryInformation`: title, author and dates
//!
//! All streams except the summary are raw-deflate compressed when the header's
//! `COMPRESSED` flag is set.
//!
//! # Example
//!
//! ```rust,no_run
//! use unhwp::hwp5::Hwp5Reader;
//! use unhwp::ParseOptions;
//!
//! let file = std::fs::File::open("report.hwp")?;
//! let document = Hwp5Reader::open(file)?.parse(&ParseOptions::default())?;
//! println!("{} sections", document.section_count());
//! # Ok::<(), unhwp::Error>(())
//! ```

mod bodytext;
mod docinfo;
mod header;
mod record;

#[cfg(test)]
pub(crate) mod fixtures;

pub use docinfo::{BinCompression, BinItem, DocInfo, StyleDef};
pub use header::{FileHeader, HeaderFlags, Version};
pub use record::{Record, RecordReader, tag};

use crate::common::{Error, Result};
use crate::model::{Document, Metadata, Resource, Section};
use crate::ole::OleFile;
use crate::parse_options::ParseOptions;
use flate2::read::DeflateDecoder;
use rayon::prelude::*;
use std::io::{Read, Seek};

/// Reader over an opened HWP 5.0 compound file.
pub struct Hwp5Reader<R: Read + Seek> {
    ole: OleFile<R>,
    header: FileHeader,
}

impl<R: Read + Seek> Hwp5Reader<R> {
    /// Open the container and validate the file header.
    ///
    /// Fails with [`Error::Encrypted`] for password-protected documents.
    pub fn open(reader: R) -> Result<Self> {
        let mut ole = OleFile::open(reader)?;
        let header = FileHeader::parse(&ole.open_stream(&["FileHeader"])?)?;
        log::debug!(
            "HWP {} (compressed: {}, distribution: {})",
            header.version,
            header.is_compressed(),
            header.is_distribution()
        );
        if header.is_encrypted() {
            return Err(Error::Encrypted);
        }
        Ok(Self { ole, header })
    }

    #[inline]
    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    /// Read the whole document.
    pub fn parse(mut self, options: &ParseOptions) -> Result<Document> {
        let section_names = self.section_names()?;
        let docinfo = DocInfo::parse(&self.read_stream(&["DocInfo"])?)?;

        let mut raw_sections = Vec::with_capacity(section_names.len());
        for (number, name) in &section_names {
            match self.ole.open_stream(&["BodyText", name.as_str()]) {
                Ok(data) => raw_sections.push((*number as usize, data)),
                Err(e) if options.is_lenient() => {
                    log::warn!("skipping unreadable section {}: {}", name, e);
                },
                Err(e) => return Err(e.into()),
            }
        }

        let compressed = self.header.is_compressed();
        let decode = |(index, data): (usize, Vec<u8>)| -> Result<Section> {
            let data = if compressed { inflate(&data)? } else { data };
            bodytext::parse_section(&data, index, &docinfo)
        };
        let results: Vec<(usize, Result<Section>)> = if options.parallel {
            raw_sections
                .into_par_iter()
                .map(|raw| (raw.0, decode(raw)))
                .collect()
        } else {
            raw_sections
                .into_iter()
                .map(|raw| (raw.0, decode(raw)))
                .collect()
        };

        let mut document = Document::new();
        for (index, result) in results {
            match result {
                Ok(section) => document.sections.push(section),
                Err(e) if options.is_lenient() => {
                    log::warn!("skipping section {}: {}", index, e);
                },
                Err(e) => return Err(e),
            }
        }

        document.metadata = self.metadata();
        if options.extract_resources {
            for resource in self.resources(&docinfo) {
                document.add_resource(resource);
            }
        }
        log::debug!(
            "parsed {} sections, {} resources",
            document.section_count(),
            document.resources.len()
        );
        Ok(document)
    }

    /// `SectionN` stream names under `BodyText`, in numeric order.
    fn section_names(&self) -> Result<Vec<(u32, String)>> {
        let entries = match self.ole.list_children(&["BodyText"]) {
            Ok(entries) => entries,
            Err(_) if self.header.is_distribution() => {
                return Err(Error::Distribution(
                    "body text is only stored in the protected ViewText storage".to_string(),
                ));
            },
            Err(e) => return Err(e.into()),
        };
        let mut names: Vec<(u32, String)> = entries
            .into_iter()
            .filter(|e| e.is_stream())
            .filter_map(|e| {
                let number = e.name.strip_prefix("Section")?.parse().ok()?;
                Some((number, e.name))
            })
            .collect();
        names.sort_by_key(|(number, _)| *number);
        Ok(names)
    }

    fn read_stream(&mut self, path: &[&str]) -> Result<Vec<u8>> {
        let data = self.ole.open_stream(path)?;
        if self.header.is_compressed() {
            inflate(&data)
        } else {
            Ok(data)
        }
    }

    fn metadata(&mut self) -> Metadata {
        let summary = self.ole.hwp_summary();
        let mut metadata = Metadata {
            title: summary.title,
            author: summary.author,
            subject: summary.subject,
            created: summary.created,
            modified: summary.modified,
            format_version: Some(self.header.version.to_string()),
            is_distribution: self.header.is_distribution(),
            ..Default::default()
        };
        if let Some(keywords) = summary.keywords {
            metadata.set_keywords(&keywords);
        }
        metadata
    }

    /// Streams under `BinData`, sorted by name. Unreadable streams are
    /// skipped.
    fn resources(&mut self, docinfo: &DocInfo) -> Vec<Resource> {
        let Ok(entries) = self.ole.list_children(&["BinData"]) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .into_iter()
            .filter(|e| e.is_stream())
            .map(|e| e.name)
            .collect();
        names.sort();

        let mut resources = Vec::with_capacity(names.len());
        for name in names {
            let raw = match self.ole.open_stream(&["BinData", name.as_str()]) {
                Ok(raw) => raw,
                Err(e) => {
                    log::warn!("skipping resource {}: {}", name, e);
                    continue;
                },
            };
            let item = docinfo
                .bin_items
                .values()
                .find(|item| item.stream_name.eq_ignore_ascii_case(&name));
            let compressed = match item.map(|i| i.compression) {
                Some(BinCompression::Compressed) => true,
                Some(BinCompression::Stored) => false,
                Some(BinCompression::Default) | None => self.header.is_compressed(),
            };
            let data = if compressed {
                inflate(&raw).unwrap_or_else(|e| {
                    log::debug!("{} kept as stored: {}", name, e);
                    raw
                })
            } else {
                raw
            };
            let id = item.map_or(name, |i| i.stream_name.clone());
            resources.push(Resource::from_file_name(id, data));
        }
        resources
    }
}

/// Decompress a raw deflate stream.
fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len() * 4);
    DeflateDecoder::new(data)
        .read_to_end(&mut out)
        .map_err(|e| Error::Decompression(e.to_string()))?;
    Ok(out)
}

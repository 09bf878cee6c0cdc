//! HWPX (OWPML, KS X 6101) reader.
//!
//! An HWPX document is a ZIP package:
//!
//! - `mimetype`: `application/hwp+zip`
//! - `version.xml`: writer and format version
//! - `Contents/content.hpf`: OPF metadata, manifest and spine
//! - `Contents/header.xml`: character/paragraph properties and styles
//! - `Contents/sectionN.xml`: body text, one part per section
//! - `BinData/*`: embedded images
//!
//! # Example
//!
//! ```rust,no_run
//! use unhwp::hwpx::HwpxReader;
//! use unhwp::ParseOptions;
//!
//! let file = std::fs::File::open("report.hwpx")?;
//! let document = HwpxReader::open(file)?.parse(&ParseOptions::default())?;
//! println!("{}", document.plain_text());
//! # Ok::<(), unhwp::Error>(())
//! ```

mod container;
mod header;
mod manifest;
mod section;
mod xml;

#[cfg(test)]
pub(crate) mod fixtures;

pub use container::HwpxPackage;
pub use header::{HeaderInfo, NamedStyle, parse_header};
pub use manifest::{Manifest, ManifestItem, parse_manifest, parse_version};
pub use section::{SectionContext, parse_section};

use crate::common::Result;
use crate::model::{Document, Resource, Section};
use crate::parse_options::ParseOptions;
use rayon::prelude::*;
use std::collections::HashMap;
use std::io::{Read, Seek};

/// Reader over an opened HWPX package.
pub struct HwpxReader<R: Read + Seek> {
    package: HwpxPackage<R>,
}

impl<R: Read + Seek> HwpxReader<R> {
    pub fn open(reader: R) -> Result<Self> {
        Ok(Self {
            package: HwpxPackage::open(reader)?,
        })
    }

    /// Read the whole document.
    ///
    /// `content.hpf`, `header.xml` and `version.xml` are optional; without a
    /// spine, sections are taken in numeric file order.
    pub fn parse(mut self, options: &ParseOptions) -> Result<Document> {
        let manifest = match self.optional_part(container::CONTENT_HPF) {
            Some(xml) => parse_manifest(&xml)?,
            None => Manifest::default(),
        };
        let header = match self.optional_part(container::HEADER_XML) {
            Some(xml) => parse_header(&xml)?,
            None => HeaderInfo::default(),
        };
        let (format_version, application) = match self.optional_part(container::VERSION_XML) {
            Some(xml) => parse_version(&xml)?,
            None => (None, None),
        };

        let mut section_paths: Vec<String> = manifest
            .section_paths()
            .into_iter()
            .filter(|path| self.package.contains(path))
            .collect();
        if section_paths.is_empty() {
            section_paths = self.package.section_names();
        }
        log::debug!("HWPX package with {} sections", section_paths.len());

        let mut raw_sections = Vec::with_capacity(section_paths.len());
        for (index, path) in section_paths.iter().enumerate() {
            match self.package.read_string(path) {
                Ok(xml) => raw_sections.push((index, xml)),
                Err(e) if options.is_lenient() => {
                    log::warn!("skipping unreadable section {}: {}", path, e);
                },
                Err(e) => return Err(e),
            }
        }

        let images = self.image_ids(&manifest);
        let context = SectionContext {
            header: &header,
            images: &images,
        };
        let decode = |(index, xml): &(usize, String)| parse_section(xml, *index, &context);
        let results: Vec<(usize, Result<Section>)> = if options.parallel {
            raw_sections
                .par_iter()
                .map(|raw| (raw.0, decode(raw)))
                .collect()
        } else {
            raw_sections.iter().map(|raw| (raw.0, decode(raw))).collect()
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

        document.metadata = manifest.metadata;
        document.metadata.format_version = format_version.or_else(|| Some("HWPX".to_string()));
        if document.metadata.creator_app.is_none() {
            document.metadata.creator_app = application;
        }
        document.metadata.is_distribution = header.is_distribution;

        if options.extract_resources {
            for resource in self.resources() {
                document.add_resource(resource);
            }
        }
        Ok(document)
    }

    fn optional_part(&mut self, name: &str) -> Option<String> {
        if !self.package.contains(name) {
            return None;
        }
        match self.package.read_string(name) {
            Ok(xml) => Some(xml),
            Err(e) => {
                log::warn!("ignoring unreadable {}: {}", name, e);
                None
            },
        }
    }

    /// Map `binaryItemIDRef` values to resource ids.
    ///
    /// Manifest items pointing into `BinData/` resolve through their href;
    /// the file's base name is accepted as well.
    fn image_ids(&self, manifest: &Manifest) -> HashMap<String, String> {
        let mut ids = HashMap::new();
        for name in self.package.bin_data_names() {
            let file_name = resource_id(&name).to_string();
            let base = file_name
                .rsplit_once('.')
                .map_or(file_name.as_str(), |(base, _)| base)
                .to_string();
            ids.insert(base, file_name);
        }
        for item in &manifest.items {
            if item.href.starts_with(container::BINDATA_DIR) {
                ids.insert(item.id.clone(), resource_id(&item.href).to_string());
            }
        }
        ids
    }

    fn resources(&mut self) -> Vec<Resource> {
        let mut resources = Vec::new();
        for name in self.package.bin_data_names() {
            match self.package.read_bytes(&name) {
                Ok(data) => resources.push(Resource::from_file_name(resource_id(&name), data)),
                Err(e) => log::warn!("skipping resource {}: {}", name, e),
            }
        }
        resources
    }
}

/// Resource id of a `BinData/` entry: the path below the directory.
fn resource_id(path: &str) -> &str {
    path.strip_prefix(container::BINDATA_DIR).unwrap_or(path)
}

//! ZIP package access for HWPX documents.

use crate::common::{Error, Result};
use std::io::{Read, Seek};
use zip::ZipArchive;

pub const MIMETYPE: &str = "mimetype";
pub const CONTENT_HPF: &str = "Contents/content.hpf";
pub const HEADER_XML: &str = "Contents/header.xml";
pub const VERSION_XML: &str = "version.xml";
pub const BINDATA_DIR: &str = "BinData/";

/// An opened HWPX package.
pub struct HwpxPackage<R: Read + Seek> {
    archive: ZipArchive<R>,
}

impl<R: Read + Seek> HwpxPackage<R> {
    /// Open the archive and check the `mimetype` entry when present.
    pub fn open(reader: R) -> Result<Self> {
        let mut package = Self {
            archive: ZipArchive::new(reader)?,
        };
        if package.contains(MIMETYPE) {
            let mimetype = package.read_string(MIMETYPE)?;
            let mimetype = mimetype.trim();
            if !(mimetype.contains("hwp") || mimetype.contains("owpml")) {
                return Err(Error::InvalidFormat(format!(
                    "unexpected mimetype '{}'",
                    mimetype
                )));
            }
        }
        log::trace!("HWPX package with {} entries", package.archive.len());
        Ok(package)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.archive.index_for_name(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.archive.file_names()
    }

    pub fn read_bytes(&mut self, name: &str) -> Result<Vec<u8>> {
        let mut file = self
            .archive
            .by_name(name)
            .map_err(|_| Error::ComponentNotFound(name.to_string()))?;
        let mut data = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Read an entry as UTF-8, dropping a leading byte order mark.
    pub fn read_string(&mut self, name: &str) -> Result<String> {
        let data = self.read_bytes(name)?;
        let text = String::from_utf8(data)
            .map_err(|e| Error::ParseError(format!("{} is not UTF-8: {}", name, e)))?;
        Ok(match text.strip_prefix('\u{FEFF}') {
            Some(stripped) => stripped.to_string(),
            None => text,
        })
    }

    /// Entries under `BinData/`, sorted by name.
    pub fn bin_data_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .names()
            .filter(|n| n.starts_with(BINDATA_DIR) && !n.ends_with('/'))
            .map(str::to_string)
            .collect();
        names.sort();
        names
    }

    /// `Contents/sectionN.xml` entries in numeric order.
    pub fn section_names(&self) -> Vec<String> {
        let mut sections: Vec<(u32, String)> = self
            .names()
            .filter_map(|n| {
                let number = n
                    .strip_prefix("Contents/section")?
                    .strip_suffix(".xml")?
                    .parse()
                    .ok()?;
                Some((number, n.to_string()))
            })
            .collect();
        sections.sort_by_key(|(number, _)| *number);
        sections.into_iter().map(|(_, name)| name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hwpx::fixtures::zip_package;
    use std::io::Cursor;

    #[test]
    fn test_section_and_bindata_order() {
        let bytes = zip_package(&[
            ("mimetype", b"application/hwp+zip".as_slice()),
            ("Contents/section10.xml", b"<a/>"),
            ("Contents/section2.xml", b"<a/>"),
            ("BinData/image2.png", b"2"),
            ("BinData/image1.png", b"1"),
        ]);
        let package = HwpxPackage::open(Cursor::new(bytes)).unwrap();
        assert_eq!(
            package.section_names(),
            vec!["Contents/section2.xml", "Contents/section10.xml"]
        );
        assert_eq!(
            package.bin_data_names(),
            vec!["BinData/image1.png", "BinData/image2.png"]
        );
    }

    #[test]
    fn test_wrong_mimetype() {
        let bytes = zip_package(&[("mimetype", b"application/epub+zip".as_slice())]);
        assert!(matches!(
            HwpxPackage::open(Cursor::new(bytes)),
            Err(Error::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_missing_entry() {
        let bytes = zip_package(&[("mimetype", b"application/hwp+zip".as_slice())]);
        let mut package = HwpxPackage::open(Cursor::new(bytes)).unwrap();
        assert!(matches!(
            package.read_bytes("Contents/header.xml"),
            Err(Error::ComponentNotFound(_))
        ));
    }
}

//! The fixed 128-byte HWP 3.x file header.

use crate::common::binary::{read_u16_le, read_u32_le};
use crate::common::detection::hwp3::HWP3_SIGNATURE;
use crate::common::{Error, Result};
use std::fmt;

pub const HEADER_SIZE: usize = 128;

const FLAGS_OFFSET: usize = 30;
const FLAG_COMPRESSED: u8 = 0x01;
const FLAG_ENCRYPTED: u8 = 0x02;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hwp3Version {
    pub major: u8,
    pub minor: u8,
}

impl fmt::Display for Hwp3Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hwp3Header {
    pub version: Hwp3Version,
    pub compressed: bool,
    pub encrypted: bool,
    pub page_count: u16,
    /// Zero means "right after the header"
    pub body_offset: u32,
    /// Zero means "to the end of the file"
    pub body_size: u32,
}

impl Hwp3Header {
    pub fn parse(data: &[u8]) -> Result<Self> {
        if !data.starts_with(HWP3_SIGNATURE) {
            return Err(Error::NotHwpFile);
        }
        if data.len() < HEADER_SIZE {
            return Err(Error::CorruptedFile(format!(
                "HWP 3.x header is {} bytes, expected {}",
                data.len(),
                HEADER_SIZE
            )));
        }
        let flags = data[FLAGS_OFFSET];
        Ok(Self {
            version: parse_version(&data[HWP3_SIGNATURE.len()..FLAGS_OFFSET]),
            compressed: flags & FLAG_COMPRESSED != 0,
            encrypted: flags & FLAG_ENCRYPTED != 0,
            page_count: read_u16_le(data, 48)?,
            body_offset: read_u32_le(data, 96)?,
            body_size: read_u32_le(data, 100)?,
        })
    }

    /// Byte range of the body within a file of `file_len` bytes.
    pub fn body_range(&self, file_len: usize) -> Result<std::ops::Range<usize>> {
        let start = match self.body_offset {
            0 => HEADER_SIZE,
            offset => offset as usize,
        };
        let end = match self.body_size {
            0 => file_len,
            size => start.saturating_add(size as usize),
        };
        if start > file_len || end > file_len {
            return Err(Error::CorruptedFile(format!(
                "body {}..{} exceeds file size {}",
                start, end, file_len
            )));
        }
        Ok(start..end)
    }
}

/// `"3.0"` style version following the signature; 3.0 when unreadable.
fn parse_version(raw: &[u8]) -> Hwp3Version {
    let text: String = raw
        .iter()
        .take_while(|b| b.is_ascii_digit() || **b == b'.')
        .map(|&b| b as char)
        .collect();
    let mut parts = text.split('.').map(|p| p.parse::<u8>().ok());
    match (parts.next().flatten(), parts.next().flatten()) {
        (Some(major), Some(minor)) => Hwp3Version { major, minor },
        _ => Hwp3Version { major: 3, minor: 0 },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hwp3::fixtures::header_bytes;

    #[test]
    fn test_parse_header() {
        let header = Hwp3Header::parse(&header_bytes("3.00", FLAG_COMPRESSED)).unwrap();
        assert_eq!(header.version.to_string(), "3.0");
        assert!(header.compressed);
        assert!(!header.encrypted);
        assert_eq!(header.page_count, 3);
        assert_eq!(header.body_range(200).unwrap(), 128..200);
    }

    #[test]
    fn test_unreadable_version_defaults() {
        let header = Hwp3Header::parse(&header_bytes("x", FLAG_ENCRYPTED)).unwrap();
        assert_eq!(header.version, Hwp3Version { major: 3, minor: 0 });
        assert!(header.encrypted);
    }

    #[test]
    fn test_truncated_and_foreign() {
        assert!(matches!(
            Hwp3Header::parse(b"HWP Document File V3.00"),
            Err(Error::CorruptedFile(_))
        ));
        assert!(matches!(
            Hwp3Header::parse(&[0u8; 200]),
            Err(Error::NotHwpFile)
        ));
    }

    #[test]
    fn test_body_range_out_of_bounds() {
        let mut data = header_bytes("3.00", 0);
        data[96..100].copy_from_slice(&300u32.to_le_bytes());
        let header = Hwp3Header::parse(&data).unwrap();
        assert!(header.body_range(200).is_err());
    }
}

//! `FileHeader` stream: signature, version and document flags.

use crate::common::binary::read_u32_le;
use crate::common::{Error, Result};
use bitflags::bitflags;
use std::fmt;

/// Signature at the start of the `FileHeader` stream
pub const SIGNATURE: &[u8] = b"HWP Document File";

/// Size of the `FileHeader` stream
pub const FILE_HEADER_SIZE: usize = 256;

bitflags! {
    /// Document property bits (offset 36 of the file header)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct HeaderFlags: u32 {
        /// Streams are deflate-compressed
        const COMPRESSED = 0x0001;
        /// Password protected
        const ENCRYPTED = 0x0002;
        /// Distribution document
        const DISTRIBUTION = 0x0004;
        /// Contains scripts
        const SCRIPT = 0x0008;
        /// DRM protected
        const DRM = 0x0010;
        /// Has an XML template storage
        const XML_TEMPLATE = 0x0020;
        /// Keeps document history
        const HISTORY = 0x0040;
        /// Carries an electronic signature
        const SIGNATURE = 0x0080;
    }
}

/// Format version, stored as `MM nn PP rr` (major first when printed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
    pub build: u8,
    pub revision: u8,
}

impl Version {
    pub fn new(major: u8, minor: u8, build: u8, revision: u8) -> Self {
        Self {
            major,
            minor,
            build,
            revision,
        }
    }

    fn from_raw(raw: u32) -> Self {
        Self {
            major: (raw >> 24) as u8,
            minor: (raw >> 16) as u8,
            build: (raw >> 8) as u8,
            revision: raw as u8,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub version: Version,
    pub flags: HeaderFlags,
}

impl FileHeader {
    pub fn parse(data: &[u8]) -> Result<Self> {
        if !data.starts_with(SIGNATURE) {
            return Err(Error::NotHwpFile);
        }
        if data.len() < 40 {
            return Err(Error::CorruptedFile(format!(
                "file header too short: {} bytes",
                data.len()
            )));
        }
        let version = Version::from_raw(read_u32_le(data, 32)?);
        let flags = HeaderFlags::from_bits_retain(read_u32_le(data, 36)?);
        Ok(Self { version, flags })
    }

    #[inline]
    pub fn is_compressed(&self) -> bool {
        self.flags.contains(HeaderFlags::COMPRESSED)
    }

    #[inline]
    pub fn is_encrypted(&self) -> bool {
        self.flags.contains(HeaderFlags::ENCRYPTED)
    }

    #[inline]
    pub fn is_distribution(&self) -> bool {
        self.flags.contains(HeaderFlags::DISTRIBUTION)
    }

    /// Serialize back into a 256-byte header stream.
    #[cfg(test)]
    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        let mut data = vec![0u8; FILE_HEADER_SIZE];
        data[..SIGNATURE.len()].copy_from_slice(SIGNATURE);
        let raw = (self.version.major as u32) << 24
            | (self.version.minor as u32) << 16
            | (self.version.build as u32) << 8
            | self.version.revision as u32;
        data[32..36].copy_from_slice(&raw.to_le_bytes());
        data[36..40].copy_from_slice(&self.flags.bits().to_le_bytes());
        data
    }
}

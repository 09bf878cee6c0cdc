//! HWP 5.0 detection (compound file container).

use std::io::{Read, Seek};

use crate::ole::OleFile;

/// Compound file signature
pub const OLE_SIGNATURE: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Signature at the start of the `FileHeader` stream
pub const HWP5_SIGNATURE: &[u8] = b"HWP Document File";

/// Classify a reader whose first bytes carry the compound file signature.
///
/// Returns `Some(true)` when the container holds an HWP `FileHeader`,
/// `Some(false)` when it is a readable compound file of another kind (a Word
/// or Excel binary file, say), and `None` when the container itself cannot be
/// read. Callers treat `None` as HWP 5.0 so that a damaged document reaches
/// the parser and fails there with a parse error.
pub fn sniff_hwp5<R: Read + Seek>(reader: R) -> Option<bool> {
    let mut ole = OleFile::open(reader).ok()?;
    match ole.open_stream(&["FileHeader"]) {
        Ok(header) => Some(header.starts_with(HWP5_SIGNATURE)),
        Err(_) if ole.exists(&["FileHeader"]) => None,
        Err(_) => Some(false),
    }
}

//! HWPX detection (OWPML package in a ZIP container).

use memchr::memmem;

/// Local file header signature
pub const ZIP_SIGNATURE: &[u8] = &[0x50, 0x4B, 0x03, 0x04];

/// Markers that identify an OWPML package.
///
/// Entry names are stored uncompressed in local file headers, so they can be
/// found without inflating anything. The `mimetype` entry is conventionally
/// first and stored, which makes its content visible too.
const HWPX_MARKERS: &[&[u8]] = &[
    b"application/hwp+zip",
    b"Contents/content.hpf",
    b"Contents/header.xml",
    b"Contents/section",
];

/// Check whether the head of a ZIP archive belongs to an HWPX package.
pub fn sniff_hwpx(head: &[u8]) -> bool {
    head.starts_with(ZIP_SIGNATURE)
        && HWPX_MARKERS
            .iter()
            .any(|marker| memmem::find(head, marker).is_some())
}

//! Legacy HWP 3.x detection.

/// Signature at offset 0 of an HWP 3.x file, followed by the version
pub const HWP3_SIGNATURE: &[u8] = b"HWP Document File V";

#[inline]
pub fn sniff_hwp3(head: &[u8]) -> bool {
    head.starts_with(HWP3_SIGNATURE)
}

//! Document format enumeration.

use serde::Serialize;
use std::fmt;

/// Document formats recognized by the detector.
///
/// The numeric tags are part of the native boundary (`unhwp_detect_format`
/// returns them), so variants are ordered by tag and the values never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[repr(i32)]
pub enum FormatKind {
    /// Not a recognized HWP document
    #[default]
    Unknown = 0,
    /// HWP 5.0 binary document (compound file container)
    Hwp5 = 1,
    /// HWPX document (OWPML, ZIP container)
    Hwpx = 2,
    /// Legacy HWP 3.x document
    Hwp3 = 3,
}

impl FormatKind {
    /// All known formats in tag order.
    pub const ALL: [FormatKind; 4] = [
        FormatKind::Unknown,
        FormatKind::Hwp5,
        FormatKind::Hwpx,
        FormatKind::Hwp3,
    ];

    /// Map a numeric tag back to a format; unmapped tags are `Unknown`.
    #[inline]
    pub fn from_i32(tag: i32) -> Self {
        match tag {
            1 => FormatKind::Hwp5,
            2 => FormatKind::Hwpx,
            3 => FormatKind::Hwp3,
            _ => FormatKind::Unknown,
        }
    }

    /// Numeric tag used across the native boundary.
    #[inline]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Bit used by `unhwp_supported_formats`.
    #[inline]
    pub fn support_bit(self) -> u32 {
        match self {
            FormatKind::Unknown => 0,
            FormatKind::Hwp5 => 0x01,
            FormatKind::Hwpx => 0x02,
            FormatKind::Hwp3 => 0x04,
        }
    }

    #[inline]
    pub fn is_known(self) -> bool {
        self != FormatKind::Unknown
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FormatKind::Unknown => "Unknown",
            FormatKind::Hwp5 => "HWP 5.0",
            FormatKind::Hwpx => "HWPX",
            FormatKind::Hwp3 => "HWP 3.x",
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_are_stable_and_ordered() {
        for (i, kind) in FormatKind::ALL.iter().enumerate() {
            assert_eq!(kind.as_i32(), i as i32);
            assert_eq!(FormatKind::from_i32(i as i32), *kind);
        }
        assert!(FormatKind::Unknown < FormatKind::Hwp5);
        assert!(FormatKind::Hwpx < FormatKind::Hwp3);
        assert_eq!(FormatKind::from_i32(42), FormatKind::Unknown);
        assert_eq!(FormatKind::from_i32(-1), FormatKind::Unknown);
    }

    #[test]
    fn test_support_bits() {
        let all: u32 = FormatKind::ALL.iter().map(|k| k.support_bit()).sum();
        assert_eq!(all, 0x07);
    }
}

//! Core format detection functions.
//!
//! Detection sniffs content: container signatures first, then the markers
//! that distinguish an HWP container from other documents using the same
//! container. None of these functions fail; anything unreadable or
//! unrecognized is [`FormatKind::Unknown`].

use std::fs::File;
use std::io::{Cursor, Read, Seek, SeekFrom};
use std::path::Path;

use super::hwp3::sniff_hwp3;
use super::hwp5::{OLE_SIGNATURE, sniff_hwp5};
use super::hwpx::{ZIP_SIGNATURE, sniff_hwpx};
use super::types::FormatKind;

/// Number of leading bytes inspected for ZIP and HWP 3.x markers.
const HEAD_LEN: u64 = 4096;

/// Detect the format of a file on disk.
///
/// Nonexistent or unreadable paths yield [`FormatKind::Unknown`].
///
/// # Examples
///
/// ```rust,no_run
/// use unhwp::common::detection::{detect_format, FormatKind};
///
/// if detect_format("report.hwp") == FormatKind::Hwp5 {
///     println!("binary HWP document");
/// }
/// ```
pub fn detect_format<P: AsRef<Path>>(path: P) -> FormatKind {
    match File::open(path.as_ref()) {
        Ok(mut file) => detect_format_from_reader(&mut file),
        Err(e) => {
            log::trace!("detect: cannot open {}: {}", path.as_ref().display(), e);
            FormatKind::Unknown
        },
    }
}

/// Detect the format of an in-memory buffer.
///
/// # Examples
///
/// ```rust
/// use unhwp::common::detection::{detect_format_from_bytes, FormatKind};
///
/// assert_eq!(detect_format_from_bytes(b""), FormatKind::Unknown);
/// assert_eq!(detect_format_from_bytes(b"plain text"), FormatKind::Unknown);
/// ```
pub fn detect_format_from_bytes(bytes: &[u8]) -> FormatKind {
    detect_format_from_reader(&mut Cursor::new(bytes))
}

/// Detect the format of any seekable reader.
///
/// The reader is rewound to its start before returning.
pub fn detect_format_from_reader<R: Read + Seek>(reader: &mut R) -> FormatKind {
    let kind = classify(reader).unwrap_or(FormatKind::Unknown);
    let _ = reader.seek(SeekFrom::Start(0));
    kind
}

fn classify<R: Read + Seek>(reader: &mut R) -> std::io::Result<FormatKind> {
    reader.seek(SeekFrom::Start(0))?;
    let mut head = Vec::with_capacity(HEAD_LEN as usize);
    reader.by_ref().take(HEAD_LEN).read_to_end(&mut head)?;

    if head.starts_with(OLE_SIGNATURE) {
        reader.seek(SeekFrom::Start(0))?;
        return Ok(match sniff_hwp5(&mut *reader) {
            Some(true) | None => FormatKind::Hwp5,
            Some(false) => FormatKind::Unknown,
        });
    }

    if head.starts_with(ZIP_SIGNATURE) {
        return Ok(if sniff_hwpx(&head) {
            FormatKind::Hwpx
        } else {
            FormatKind::Unknown
        });
    }

    if sniff_hwp3(&head) {
        return Ok(FormatKind::Hwp3);
    }

    Ok(FormatKind::Unknown)
}

/// Guess the format from the file extension alone.
///
/// This is a degraded mode for hosts that cannot read the file: `.hwp` maps to
/// [`FormatKind::Hwp5`] and `.hwpx` to [`FormatKind::Hwpx`], anything else is
/// `Unknown`. It misclassifies renamed files and reports HWP 3.x documents
/// (which also use `.hwp`) as HWP 5.0. Prefer [`detect_format`].
pub fn detect_format_by_extension<P: AsRef<Path>>(path: P) -> FormatKind {
    let ext = path
        .as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("hwp") => FormatKind::Hwp5,
        Some("hwpx") => FormatKind::Hwpx,
        _ => FormatKind::Unknown,
    }
}

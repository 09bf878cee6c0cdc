//! Boundary error taxonomy.
//!
//! Every failure that crosses the engine boundary is reported as one
//! [`ErrorKind`]. The mapping from native status codes is an explicit table:
//! the current generation reports negative codes, the legacy result-handle
//! binding reported positive ones. Anything outside both tables is `Unknown`.

use super::types::Error;

/// Kind of a boundary failure.
///
/// Variants are ordered by their native code magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorKind {
    /// Input path does not exist
    FileNotFound,
    /// Malformed or unreadable container structure
    ParseError,
    /// Content model valid, rendering failed
    RenderError,
    /// Bad options, flags or arguments
    InvalidArgument,
    /// Recognized but unhandled document subtype (encrypted, DRM)
    UnsupportedFormat,
    /// Operation against a closed or never-valid handle
    InvalidState,
    /// Requested resource id does not exist
    NotFound,
    /// Opaque engine message
    Unknown,
}

/// Native status code for success.
pub const STATUS_OK: i32 = 0;

/// Current generation code table.
const NATIVE_CODES: &[(i32, ErrorKind)] = &[
    (-1, ErrorKind::FileNotFound),
    (-2, ErrorKind::ParseError),
    (-3, ErrorKind::RenderError),
    (-4, ErrorKind::InvalidArgument),
    (-5, ErrorKind::UnsupportedFormat),
    (-6, ErrorKind::InvalidState),
    (-7, ErrorKind::NotFound),
    (-99, ErrorKind::Unknown),
];

/// Legacy result-handle binding code table.
const LEGACY_CODES: &[(i32, ErrorKind)] = &[
    (1, ErrorKind::FileNotFound),
    (2, ErrorKind::ParseError),
    (3, ErrorKind::RenderError),
    (4, ErrorKind::InvalidArgument),
    (5, ErrorKind::UnsupportedFormat),
    (99, ErrorKind::Unknown),
];

impl ErrorKind {
    /// Native status code reported at the C ABI.
    pub fn code(self) -> i32 {
        NATIVE_CODES
            .iter()
            .find(|(_, kind)| *kind == self)
            .map(|(code, _)| *code)
            .unwrap_or(-99)
    }

    /// Translate a native status code from either generation.
    ///
    /// Returns `None` for [`STATUS_OK`]. Codes outside both tables are
    /// `Some(ErrorKind::Unknown)`.
    pub fn from_code(code: i32) -> Option<Self> {
        if code == STATUS_OK {
            return None;
        }
        NATIVE_CODES
            .iter()
            .chain(LEGACY_CODES.iter())
            .find(|(c, _)| *c == code)
            .map(|(_, kind)| *kind)
            .or(Some(ErrorKind::Unknown))
    }

    /// Stable name used in logs and host-language exception mapping.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::FileNotFound => "FileNotFound",
            ErrorKind::ParseError => "ParseError",
            ErrorKind::RenderError => "RenderError",
            ErrorKind::InvalidArgument => "InvalidArgument",
            ErrorKind::UnsupportedFormat => "UnsupportedFormat",
            ErrorKind::InvalidState => "InvalidState",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// Classify this error into the boundary taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::FileNotFound(_) => ErrorKind::FileNotFound,
            Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound => ErrorKind::FileNotFound,
            Error::Io(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => ErrorKind::ParseError,
            Error::Io(_) => ErrorKind::Unknown,
            Error::ParseError(_)
            | Error::InvalidFormat(_)
            | Error::NotHwpFile
            | Error::CorruptedFile(_)
            | Error::ComponentNotFound(_)
            | Error::XmlError(_)
            | Error::ZipError(_)
            | Error::Decompression(_) => ErrorKind::ParseError,
            Error::Encrypted | Error::Distribution(_) | Error::Unsupported(_) => {
                ErrorKind::UnsupportedFormat
            },
            Error::RenderError(_) => ErrorKind::RenderError,
            Error::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Error::InvalidState(_) => ErrorKind::InvalidState,
            Error::ResourceNotFound(_) => ErrorKind::NotFound,
            Error::Other(_) => ErrorKind::Unknown,
        }
    }

    /// Rebuild an error from a native code and its message.
    ///
    /// Used when a failure is only available as a status code plus text (the
    /// last-error channel, or an embedded error string). The message is kept
    /// verbatim.
    pub fn from_native(code: i32, message: impl Into<String>) -> Self {
        let message = message.into();
        match ErrorKind::from_code(code) {
            Some(ErrorKind::FileNotFound) => Error::FileNotFound(message.into()),
            Some(ErrorKind::ParseError) => Error::ParseError(message),
            Some(ErrorKind::RenderError) => Error::RenderError(message),
            Some(ErrorKind::InvalidArgument) => Error::InvalidArgument(message),
            Some(ErrorKind::UnsupportedFormat) => Error::Unsupported(message),
            Some(ErrorKind::InvalidState) => Error::InvalidState(message),
            Some(ErrorKind::NotFound) => Error::ResourceNotFound(message),
            Some(ErrorKind::Unknown) | None => Error::Other(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_table_round_trip() {
        for (code, kind) in NATIVE_CODES {
            assert_eq!(kind.code(), *code);
            assert_eq!(ErrorKind::from_code(*code), Some(*kind));
        }
    }

    #[test]
    fn test_legacy_codes() {
        assert_eq!(ErrorKind::from_code(2), Some(ErrorKind::ParseError));
        assert_eq!(ErrorKind::from_code(5), Some(ErrorKind::UnsupportedFormat));
        assert_eq!(ErrorKind::from_code(99), Some(ErrorKind::Unknown));
    }

    #[test]
    fn test_unknown_and_ok_codes() {
        assert_eq!(ErrorKind::from_code(0), None);
        assert_eq!(ErrorKind::from_code(-42), Some(ErrorKind::Unknown));
        assert_eq!(ErrorKind::from_code(1234), Some(ErrorKind::Unknown));
    }

    #[test]
    fn test_error_kind_classification() {
        assert_eq!(Error::Encrypted.kind(), ErrorKind::UnsupportedFormat);
        assert_eq!(
            Error::CorruptedFile("x".into()).kind(),
            ErrorKind::ParseError
        );
        let eof = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "short");
        assert_eq!(Error::Io(eof).kind(), ErrorKind::ParseError);
        assert_eq!(
            Error::ResourceNotFound("BIN0001.png".into()).kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_from_native_preserves_message() {
        let err = Error::from_native(-1234, "engine exploded: code 7");
        assert_eq!(err.kind(), ErrorKind::Unknown);
        assert_eq!(err.to_string(), "engine exploded: code 7");

        let err = Error::from_native(-6, "handle closed");
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }
}

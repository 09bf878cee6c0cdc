//! Error conversion implementations.
//!
//! This module contains From trait implementations to convert from internal
//! error types to the unified Error type.

use super::types::Error;
use crate::common::binary::BinaryError;
use crate::ole::OleError;

impl From<OleError> for Error {
    fn from(err: OleError) -> Self {
        match err {
            OleError::Io(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                Error::CorruptedFile("Compound file is truncated".to_string())
            },
            OleError::Io(e) => Error::Io(e),
            OleError::InvalidFormat(s) => Error::InvalidFormat(s),
            OleError::InvalidData(s) => Error::InvalidFormat(s),
            OleError::NotOleFile => Error::NotHwpFile,
            OleError::CorruptedFile(s) => Error::CorruptedFile(s),
            OleError::StreamNotFound(s) => Error::ComponentNotFound(s),
        }
    }
}

impl From<BinaryError> for Error {
    fn from(err: BinaryError) -> Self {
        match err {
            BinaryError::InsufficientData { .. } => Error::CorruptedFile(err.to_string()),
            BinaryError::ParseError(s) => Error::ParseError(s),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::RenderError(err.to_string())
    }
}

#[cfg(feature = "hwpx")]
impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlError(err.to_string())
    }
}

#[cfg(feature = "hwpx")]
impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::XmlError(err.to_string())
    }
}

#[cfg(feature = "hwpx")]
impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            other => Error::ZipError(other.to_string()),
        }
    }
}

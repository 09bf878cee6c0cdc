//! Unified error types for unhwp.
//!
//! This module provides a single error type that covers container parsing,
//! rendering and the engine boundary, presenting a consistent API to users.
use std::path::PathBuf;

use thiserror::Error;

/// Main error type for unhwp operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Input path does not exist
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Parse error occurred
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Invalid file format
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Input is not an HWP family document
    #[error("Not a valid HWP document")]
    NotHwpFile,

    /// Corrupted or malformed file
    #[error("Corrupted file: {0}")]
    CorruptedFile(String),

    /// Stream or part not found
    #[error("Component not found: {0}")]
    ComponentNotFound(String),

    /// XML parsing error
    #[error("XML error: {0}")]
    XmlError(String),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// Stream decompression failed
    #[error("Decompression failed: {0}")]
    Decompression(String),

    /// Password-protected document
    #[error("Document is encrypted")]
    Encrypted,

    /// Distribution (DRM) document whose body cannot be read
    #[error("Distribution document: {0}")]
    Distribution(String),

    /// Content model was valid but rendering failed
    #[error("Render error: {0}")]
    RenderError(String),

    /// Unsupported feature or document subtype
    #[error("Unsupported feature: {0}")]
    Unsupported(String),

    /// Bad options, flags or arguments
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation against a closed or never-valid handle
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Resource id not present in the document
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Result type for unhwp operations.
pub type Result<T> = std::result::Result<T, Error>;

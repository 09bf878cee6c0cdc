//! Common types and utilities shared by the format readers and the engine.

// Submodule declarations
pub mod binary;
pub mod detection;
pub mod error;

// Re-exports for convenience
pub use detection::{
    FormatKind, detect_format, detect_format_by_extension, detect_format_from_bytes,
    detect_format_from_reader,
};
pub use error::{Error, ErrorKind, Result};

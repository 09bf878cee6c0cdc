//! Compound file (OLE2) container reader.
//!
//! HWP 5.0 documents are stored as compound files: a `FileHeader` stream, a
//! `DocInfo` stream, one `BodyText/SectionN` stream per section and binary
//! attachments under `BinData`. This module only exposes what the HWP reader
//! needs: stream lookup, storage listing and the summary property set.

/// Constants for the compound file format
pub mod consts;

/// Main compound file parsing implementation
mod file;

/// Summary property set extraction
mod metadata;

#[cfg(test)]
pub(crate) mod builder;

// Re-export public types for convenient access
pub use file::{DirectoryEntry, OleError, OleFile, is_ole_file};
pub use metadata::{
    HWP_SUMMARY_STREAM, PropertyValue, SummaryInfo, filetime_to_datetime, parse_property_set,
};

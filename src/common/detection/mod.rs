//! Document format detection.
//!
//! Classifies a path, buffer or reader as HWP 5.0, HWPX, HWP 3.x or unknown
//! by inspecting signatures and container structure, reading only what the
//! decision needs.

// Submodule declarations
pub mod functions;
pub mod hwp3;
pub mod hwp5;
pub mod hwpx;
pub mod types;

// Re-exports
pub use functions::{
    detect_format, detect_format_by_extension, detect_format_from_bytes,
    detect_format_from_reader,
};
pub use types::FormatKind;

//! Unified error types for unhwp.
//!
//! This module provides a unified error type that encompasses errors from the
//! HWP 5.0, HWPX and HWP 3.x readers and from the engine boundary, together
//! with the boundary taxonomy ([`ErrorKind`]) and its native code table.

// Submodule declarations
pub mod conversions;
pub mod kind;
pub mod types;

// Re-exports
pub use kind::{ErrorKind, STATUS_OK};
pub use types::{Error, Result};

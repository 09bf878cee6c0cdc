//! Format-independent content model.
//!
//! Every reader produces a [`Document`]; renderers and the engine boundary
//! only ever see this representation.

mod document;
mod metadata;
mod paragraph;
mod resource;
mod style;
mod table;

pub use document::{Block, Document, Section};
pub use metadata::{Metadata, parse_timestamp};
pub use paragraph::{Equation, ImageRef, InlineContent, Paragraph, TextRun};
pub use resource::{Resource, ResourceKind, mime_for_extension};
pub use style::{Alignment, ListStyle, ParagraphStyle, TextStyle};
pub use table::{Table, TableCell, TableRow};

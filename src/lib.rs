//! DXF drawing parser.
//!
//! Walks the line-oriented group stream of a DXF text file, dispatches the
//! HEADER, TABLES, BLOCKS and ENTITIES sections to dedicated sub-parsers and
//! returns a fully materialized [`Document`]. 3DSOLID entities additionally
//! get their embedded ACIS SAT payload de-obfuscated and resolved into a
//! typed B-rep graph (see [`acis`]).
//!
//! ```no_run
//! let document = ezdxf::parse_file("part.dxf")?;
//! for entity in &document.entities {
//!     println!("{} on layer {}", entity.common.handle, entity.common.layer);
//! }
//! # Ok::<(), ezdxf::DxfError>(())
//! ```

pub mod acis;
pub mod core;
pub mod document;
pub mod dxf;
pub mod entities;
pub mod scan;

pub use crate::core::config::ParseConfig;
pub use crate::core::error::DxfError;
pub use crate::core::result::Result;
pub use crate::document::{Document, HeaderValue, Point};
pub use crate::dxf::Parser;
pub use crate::entities::{Entity, EntityData, EntityHandler};

/// Parses a complete DXF text buffer with the default handler set.
pub fn parse_str(source: &str) -> Result<Document> {
    Parser::new().parse_str(source)
}

/// Reads and parses a DXF file, decoding legacy codepages when needed.
pub fn parse_file(path: impl AsRef<std::path::Path>) -> Result<Document> {
    Parser::new().parse_file(path)
}

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a parse call. Anomalies local to one entity, table
/// record or ACIS body are logged or captured as data instead (see the
/// `parse_error` field on 3DSOLID entities) and never surface here.
#[derive(Debug, Error)]
pub enum DxfError {
    #[error("empty DXF source")]
    EmptyInput,

    #[error("unexpected end of input: {0}")]
    UnexpectedEof(String),

    #[error("cannot read past the EOF group")]
    PastEof,

    #[error("invalid group code on line {line}: {text:?}")]
    InvalidGroupCode { line: usize, text: String },

    #[error("expected group code {expected} for point {axis}-coordinate, got {found}")]
    PointFormat { expected: i32, axis: char, found: i32 },

    #[error("failed to read {path:?}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid DXF structure: {0}")]
    Format(String),
}

impl DxfError {
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format(message.into())
    }
}

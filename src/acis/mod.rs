//! Decoder for the ACIS SAT payload carried by 3DSOLID entities: text
//! de-obfuscation, tokenization into a flat record table, and recursive
//! resolution of the table into a typed B-rep graph.

pub mod brep;
pub mod deobfuscate;
pub mod record;
pub mod resolve;
pub mod token;

use serde::Serialize;

pub use brep::AcisNode;
pub use record::{RecordTable, SatHeader, SatRecord};
pub use token::SatToken;

/// The decoded payload of one solid: the record arena plus the index of the
/// resolved body node, when resolution succeeded.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BrepModel {
    pub records: RecordTable,
    pub body: Option<usize>,
}

impl BrepModel {
    pub fn body_node(&self) -> Option<&brep::Body> {
        self.records
            .node(self.body?)
            .and_then(AcisNode::as_body)
    }

    pub fn node(&self, index: usize) -> Option<&AcisNode> {
        self.records.node(index)
    }
}

use std::collections::HashMap;

use serde::Serialize;

use crate::dxf::blocks::Block;
use crate::dxf::tables::Tables;
use crate::entities::Entity;
use crate::scan::GroupValue;

/// A 2D or 3D coordinate. Whether `z` is present is decided by the stream,
/// not by a schema (see the point-assembly rule in `entities::common`).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    pub fn with_z(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z: Some(z) }
    }
}

/// A header variable value: a scalar or an assembled 10/20/30 point.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum HeaderValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Point(Point),
}

impl From<GroupValue> for HeaderValue {
    fn from(value: GroupValue) -> Self {
        match value {
            GroupValue::Str(s) => HeaderValue::Str(s),
            GroupValue::Int(v) => HeaderValue::Int(v),
            GroupValue::Float(v) => HeaderValue::Float(v),
            GroupValue::Bool(v) => HeaderValue::Bool(v),
        }
    }
}

/// The fully materialized parse result. Built incrementally by one parse
/// call and returned once; nothing mutates it afterwards.
#[derive(Debug, Default, Serialize)]
pub struct Document {
    pub header: HashMap<String, HeaderValue>,
    pub tables: Tables,
    pub blocks: HashMap<String, Block>,
    pub entities: Vec<Entity>,
}

#[cfg(test)]
mod tests {
    use crate::dxf::Parser;

    #[test]
    fn documents_serialize_to_json() {
        let source = "0\nSECTION\n2\nENTITIES\n\
                      0\nLINE\n5\nA\n8\n0\n10\n0.0\n20\n0.0\n11\n1.0\n21\n1.0\n\
                      0\nENDSEC\n0\nEOF\n";
        let document = Parser::new().parse_str(source).unwrap();
        let json = serde_json::to_value(&document).unwrap();
        let line = &json["entities"][0];
        assert_eq!(line["type"], "Line");
        assert_eq!(line["layer"], "0");
        assert_eq!(line["end"]["x"], 1.0);
        // 2D points omit z entirely.
        assert!(line["start"].get("z").is_none());
    }
}

//! Entity handlers: one per DXF entity name, all speaking the same scanner
//! protocol. A handler is entered just past its `(0, NAME)` marker, consumes
//! groups until the next `0` marker, and hands that marker back via rewind.

pub mod arc;
pub mod attdef;
pub mod circle;
pub mod common;
pub mod ellipse;
pub mod face3d;
pub mod hatch;
pub mod helix;
pub mod insert;
pub mod line;
pub mod lwpolyline;
pub mod mesh;
pub mod point;
pub mod polyline;
pub mod solid;
pub mod solid3d;
pub mod text;

use std::collections::HashMap;

use serde::Serialize;

use crate::core::config::ParseConfig;
use crate::core::result::Result;
use crate::scan::{Group, GroupScanner};

pub use common::{EntityCommon, ExtendedData, Vertex};

pub use arc::ArcData;
pub use attdef::AttdefData;
pub use circle::CircleData;
pub use ellipse::EllipseData;
pub use face3d::Face3dData;
pub use hatch::HatchData;
pub use helix::HelixData;
pub use insert::InsertData;
pub use line::LineData;
pub use lwpolyline::LwPolylineData;
pub use mesh::MeshData;
pub use point::PointData;
pub use polyline::{PolylineData, PolylineVertex};
pub use solid::SolidData;
pub use solid3d::Solid3dData;
pub use text::TextData;

/// One parsed entity: the shared properties plus the type-specific payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entity {
    #[serde(flatten)]
    pub common: EntityCommon,
    #[serde(flatten)]
    pub data: EntityData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum EntityData {
    Arc(ArcData),
    Attdef(AttdefData),
    Circle(CircleData),
    Ellipse(EllipseData),
    Face3d(Face3dData),
    Hatch(HatchData),
    Helix(HelixData),
    Insert(InsertData),
    Line(LineData),
    LwPolyline(LwPolylineData),
    Mesh(MeshData),
    Point(PointData),
    Polyline(PolylineData),
    Solid(SolidData),
    Solid3d(Solid3dData),
    Text(TextData),
}

/// A parser for one entity name. Implementations are registered by name and
/// looked up by the dispatcher for each `(0, NAME)` marker it meets.
pub trait EntityHandler {
    /// The `(0, ...)` marker value this handler claims.
    fn entity_name(&self) -> &'static str;

    /// Parses one entity starting just past its marker group.
    fn parse_entity(&self, scanner: &mut GroupScanner, start: &Group) -> Result<Entity>;
}

pub(crate) fn register_default_entity_handlers(
    handlers: &mut HashMap<String, Box<dyn EntityHandler>>,
    config: &ParseConfig,
) {
    let defaults: Vec<Box<dyn EntityHandler>> = vec![
        Box::new(arc::ArcHandler),
        Box::new(attdef::AttdefHandler),
        Box::new(circle::CircleHandler),
        Box::new(ellipse::EllipseHandler),
        Box::new(face3d::Face3dHandler),
        Box::new(hatch::HatchHandler),
        Box::new(helix::HelixHandler),
        Box::new(insert::InsertHandler),
        Box::new(line::LineHandler),
        Box::new(lwpolyline::LwPolylineHandler),
        Box::new(mesh::MeshHandler),
        Box::new(point::PointHandler),
        Box::new(polyline::PolylineHandler),
        Box::new(solid::SolidHandler),
        Box::new(solid3d::Solid3dHandler::new(config.clone())),
        Box::new(text::TextHandler),
    ];
    for handler in defaults {
        handlers.insert(handler.entity_name().to_string(), handler);
    }
}

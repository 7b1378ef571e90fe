use serde::Serialize;

use crate::core::result::Result;
use crate::document::Point;
use crate::entities::common::{check_common_entity_properties, parse_point, EntityCommon};
use crate::entities::{Entity, EntityData, EntityHandler};
use crate::scan::{Group, GroupScanner};

/// A block reference. Rotation is in radians.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsertData {
    pub name: String,
    pub position: Point,
    pub x_scale: f64,
    pub y_scale: f64,
    pub z_scale: f64,
    pub rotation: f64,
    pub column_count: i64,
    pub row_count: i64,
    pub column_spacing: f64,
    pub row_spacing: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extrusion_direction: Option<Point>,
}

impl Default for InsertData {
    fn default() -> Self {
        Self {
            name: String::new(),
            position: Point::default(),
            x_scale: 1.0,
            y_scale: 1.0,
            z_scale: 1.0,
            rotation: 0.0,
            column_count: 1,
            row_count: 1,
            column_spacing: 0.0,
            row_spacing: 0.0,
            extrusion_direction: None,
        }
    }
}

pub struct InsertHandler;

impl EntityHandler for InsertHandler {
    fn entity_name(&self) -> &'static str {
        "INSERT"
    }

    fn parse_entity(&self, scanner: &mut GroupScanner, _start: &Group) -> Result<Entity> {
        let mut common = EntityCommon::default();
        let mut data = InsertData::default();

        let mut curr = scanner.next()?;
        while !scanner.is_eof() && curr.code != 0 {
            match curr.code {
                2 => data.name = curr.string(),
                10 => data.position = parse_point(scanner, &curr)?,
                41 => data.x_scale = curr.float(),
                42 => data.y_scale = curr.float(),
                43 => data.z_scale = curr.float(),
                44 => data.column_spacing = curr.float(),
                45 => data.row_spacing = curr.float(),
                50 => data.rotation = curr.float().to_radians(),
                70 => data.column_count = curr.int(),
                71 => data.row_count = curr.int(),
                210 => data.extrusion_direction = Some(parse_point(scanner, &curr)?),
                _ => {
                    check_common_entity_properties(&mut common, &curr, scanner)?;
                }
            }
            curr = scanner.next()?;
        }
        if curr.code == 0 {
            scanner.rewind();
        }
        Ok(Entity {
            common,
            data: EntityData::Insert(data),
        })
    }
}

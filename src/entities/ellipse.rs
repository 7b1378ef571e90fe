use serde::Serialize;

use crate::core::result::Result;
use crate::document::Point;
use crate::entities::common::{check_common_entity_properties, parse_point, EntityCommon};
use crate::entities::{Entity, EntityData, EntityHandler};
use crate::scan::{Group, GroupScanner};

/// Start and end angles are kept in radians as the stream carries them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EllipseData {
    pub center: Point,
    pub major_axis_end_point: Point,
    pub axis_ratio: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

pub struct EllipseHandler;

impl EntityHandler for EllipseHandler {
    fn entity_name(&self) -> &'static str {
        "ELLIPSE"
    }

    fn parse_entity(&self, scanner: &mut GroupScanner, _start: &Group) -> Result<Entity> {
        let mut common = EntityCommon::default();
        let mut data = EllipseData::default();

        let mut curr = scanner.next()?;
        while !scanner.is_eof() && curr.code != 0 {
            match curr.code {
                2 => data.name = Some(curr.string()),
                10 => data.center = parse_point(scanner, &curr)?,
                11 => data.major_axis_end_point = parse_point(scanner, &curr)?,
                40 => data.axis_ratio = curr.float(),
                41 => data.start_angle = curr.float(),
                42 => data.end_angle = curr.float(),
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
            data: EntityData::Ellipse(data),
        })
    }
}

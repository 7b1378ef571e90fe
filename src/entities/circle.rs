use serde::Serialize;

use crate::core::result::Result;
use crate::document::Point;
use crate::entities::common::{check_common_entity_properties, parse_point, EntityCommon};
use crate::entities::{Entity, EntityData, EntityHandler};
use crate::scan::{Group, GroupScanner};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CircleData {
    pub center: Point,
    pub radius: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extrusion_direction: Option<Point>,
}

pub struct CircleHandler;

impl EntityHandler for CircleHandler {
    fn entity_name(&self) -> &'static str {
        "CIRCLE"
    }

    fn parse_entity(&self, scanner: &mut GroupScanner, _start: &Group) -> Result<Entity> {
        let mut common = EntityCommon::default();
        let mut data = CircleData::default();

        let mut curr = scanner.next()?;
        while !scanner.is_eof() && curr.code != 0 {
            match curr.code {
                10 => data.center = parse_point(scanner, &curr)?,
                40 => data.radius = curr.float(),
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
            data: EntityData::Circle(data),
        })
    }
}

use serde::Serialize;

use crate::core::result::Result;
use crate::document::Point;
use crate::entities::common::{check_common_entity_properties, parse_point, EntityCommon};
use crate::entities::{Entity, EntityData, EntityHandler};
use crate::scan::{Group, GroupScanner};

/// A filled quad. The fourth corner repeats the third for triangles.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SolidData {
    pub corners: [Point; 4],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extrusion_direction: Option<Point>,
}

pub struct SolidHandler;

impl EntityHandler for SolidHandler {
    fn entity_name(&self) -> &'static str {
        "SOLID"
    }

    fn parse_entity(&self, scanner: &mut GroupScanner, _start: &Group) -> Result<Entity> {
        let mut common = EntityCommon::default();
        let mut data = SolidData::default();

        let mut curr = scanner.next()?;
        while !scanner.is_eof() && curr.code != 0 {
            match curr.code {
                10 => data.corners[0] = parse_point(scanner, &curr)?,
                11 => data.corners[1] = parse_point(scanner, &curr)?,
                12 => data.corners[2] = parse_point(scanner, &curr)?,
                13 => data.corners[3] = parse_point(scanner, &curr)?,
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
            data: EntityData::Solid(data),
        })
    }
}

use serde::Serialize;

use crate::core::result::Result;
use crate::document::Point;
use crate::entities::common::{check_common_entity_properties, parse_point, EntityCommon};
use crate::entities::{Entity, EntityData, EntityHandler};
use crate::scan::{Group, GroupScanner};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HelixData {
    pub major_release_number: i64,
    pub maintenance_release_number: i64,
    pub axis_base_point: Point,
    pub start_point: Point,
    pub axis_vector: Point,
    pub radius: f64,
    pub turns: f64,
    pub turn_height: f64,
    /// True for a right-handed spiral.
    pub handedness: bool,
    pub constrain: i64,
}

pub struct HelixHandler;

impl EntityHandler for HelixHandler {
    fn entity_name(&self) -> &'static str {
        "HELIX"
    }

    fn parse_entity(&self, scanner: &mut GroupScanner, _start: &Group) -> Result<Entity> {
        let mut common = EntityCommon::default();
        let mut data = HelixData::default();

        let mut curr = scanner.next()?;
        while !scanner.is_eof() && curr.code != 0 {
            match curr.code {
                90 => data.major_release_number = curr.int(),
                91 => data.maintenance_release_number = curr.int(),
                10 => data.axis_base_point = parse_point(scanner, &curr)?,
                11 => data.start_point = parse_point(scanner, &curr)?,
                12 => data.axis_vector = parse_point(scanner, &curr)?,
                40 => data.radius = curr.float(),
                41 => data.turns = curr.float(),
                42 => data.turn_height = curr.float(),
                290 => data.handedness = curr.int() != 0,
                280 => data.constrain = curr.int(),
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
            data: EntityData::Helix(data),
        })
    }
}

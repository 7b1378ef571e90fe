use serde::Serialize;

use crate::core::result::Result;
use crate::document::Point;
use crate::entities::common::{check_common_entity_properties, parse_point, EntityCommon};
use crate::entities::{Entity, EntityData, EntityHandler};
use crate::scan::{Group, GroupScanner};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LineData {
    pub start: Point,
    pub end: Point,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extrusion_direction: Option<Point>,
}

pub struct LineHandler;

impl EntityHandler for LineHandler {
    fn entity_name(&self) -> &'static str {
        "LINE"
    }

    fn parse_entity(&self, scanner: &mut GroupScanner, _start: &Group) -> Result<Entity> {
        let mut common = EntityCommon::default();
        let mut data = LineData::default();

        let mut curr = scanner.next()?;
        while !scanner.is_eof() && curr.code != 0 {
            match curr.code {
                10 => data.start = parse_point(scanner, &curr)?,
                11 => data.end = parse_point(scanner, &curr)?,
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
            data: EntityData::Line(data),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{LineData, LineHandler};
    use crate::document::Point;
    use crate::entities::{EntityData, EntityHandler};
    use crate::scan::{Group, GroupScanner, GroupValue};

    #[test]
    fn parses_endpoints_and_common_fields() {
        let source = "5\n2B\n8\nWalls\n10\n0.0\n20\n0.0\n30\n0.0\n11\n10.0\n21\n5.0\n31\n0.0\n0\nEOF";
        let mut s = GroupScanner::new(source);
        let start = Group {
            code: 0,
            value: GroupValue::Str("LINE".into()),
        };
        let entity = LineHandler.parse_entity(&mut s, &start).unwrap();
        assert_eq!(entity.common.handle, 0x2B);
        assert_eq!(entity.common.layer, "Walls");
        assert_eq!(
            entity.data,
            EntityData::Line(LineData {
                start: Point::with_z(0.0, 0.0, 0.0),
                end: Point::with_z(10.0, 5.0, 0.0),
                extrusion_direction: None,
            })
        );
    }
}

use serde::Serialize;

use crate::core::result::Result;
use crate::document::Point;
use crate::entities::common::{check_common_entity_properties, parse_point, EntityCommon};
use crate::entities::{Entity, EntityData, EntityHandler};
use crate::scan::{Group, GroupScanner};

/// Angles are stored in radians; the stream carries degrees.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ArcData {
    pub center: Point,
    pub radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    pub angle_length: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extrusion_direction: Option<Point>,
}

pub struct ArcHandler;

impl EntityHandler for ArcHandler {
    fn entity_name(&self) -> &'static str {
        "ARC"
    }

    fn parse_entity(&self, scanner: &mut GroupScanner, _start: &Group) -> Result<Entity> {
        let mut common = EntityCommon::default();
        let mut data = ArcData::default();

        let mut curr = scanner.next()?;
        while !scanner.is_eof() && curr.code != 0 {
            match curr.code {
                10 => data.center = parse_point(scanner, &curr)?,
                40 => data.radius = curr.float(),
                50 => data.start_angle = curr.float().to_radians(),
                51 => {
                    data.end_angle = curr.float().to_radians();
                    data.angle_length = data.end_angle - data.start_angle;
                }
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
            data: EntityData::Arc(data),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::ArcHandler;
    use crate::entities::{EntityData, EntityHandler};
    use crate::scan::{Group, GroupScanner, GroupValue};

    #[test]
    fn converts_angles_to_radians() {
        let source = "10\n1.0\n20\n2.0\n40\n5.0\n50\n0.0\n51\n90.0\n0\nEOF";
        let mut s = GroupScanner::new(source);
        let start = Group {
            code: 0,
            value: GroupValue::Str("ARC".into()),
        };
        let entity = ArcHandler.parse_entity(&mut s, &start).unwrap();
        let EntityData::Arc(arc) = entity.data else {
            panic!("expected an arc");
        };
        assert_eq!(arc.radius, 5.0);
        assert!((arc.end_angle - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert!((arc.angle_length - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }
}

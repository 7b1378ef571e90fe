use serde::Serialize;
use tracing::{debug, warn};

use crate::core::result::Result;
use crate::document::Point;
use crate::entities::common::{
    check_common_entity_properties, collect_vertex_run, parse_point, EntityCommon, Vertex,
    BOUNDARY_RUN,
};
use crate::entities::{Entity, EntityData, EntityHandler};
use crate::scan::{Group, GroupScanner};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LwPolylineData {
    pub vertices: Vec<Vertex>,
    pub closed: bool,
    pub has_continuous_linetype_pattern: bool,
    pub elevation: f64,
    pub depth: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extrusion_direction: Option<Point>,
}

pub struct LwPolylineHandler;

impl EntityHandler for LwPolylineHandler {
    fn entity_name(&self) -> &'static str {
        "LWPOLYLINE"
    }

    fn parse_entity(&self, scanner: &mut GroupScanner, _start: &Group) -> Result<Entity> {
        let mut common = EntityCommon::default();
        let mut data = LwPolylineData::default();
        let mut vertex_count: i64 = 0;

        let mut curr = scanner.next()?;
        while !scanner.is_eof() && curr.code != 0 {
            match curr.code {
                38 => data.elevation = curr.float(),
                39 => data.depth = curr.float(),
                43 => data.width = Some(curr.float()),
                70 => {
                    let flags = curr.int();
                    data.closed = flags & 0x01 != 0;
                    data.has_continuous_linetype_pattern = flags & 0x80 != 0;
                }
                90 => vertex_count = curr.int(),
                10 => {
                    if !data.vertices.is_empty() {
                        // Overflow past the declared count; the collected run
                        // stays as-is.
                        debug!("vertex group past the declared count, ignoring");
                    } else if vertex_count <= 0 {
                        warn!("vertex groups before a positive vertex count, skipping");
                    } else {
                        let first = curr.clone();
                        data.vertices =
                            collect_vertex_run(scanner, first, vertex_count as usize, &BOUNDARY_RUN)?;
                    }
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
            data: EntityData::LwPolyline(data),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::LwPolylineHandler;
    use crate::entities::{EntityData, EntityHandler};
    use crate::scan::{Group, GroupScanner, GroupValue};

    #[test]
    fn collects_declared_vertices_with_bulges() {
        let source = "90\n3\n70\n1\n10\n0.0\n20\n0.0\n10\n4.0\n20\n0.0\n42\n1.0\n10\n4.0\n20\n3.0\n0\nEOF";
        let mut s = GroupScanner::new(source);
        let start = Group {
            code: 0,
            value: GroupValue::Str("LWPOLYLINE".into()),
        };
        let entity = LwPolylineHandler.parse_entity(&mut s, &start).unwrap();
        let EntityData::LwPolyline(polyline) = entity.data else {
            panic!("expected a polyline");
        };
        assert!(polyline.closed);
        assert_eq!(polyline.vertices.len(), 3);
        assert_eq!(polyline.vertices[1].bulge, Some(1.0));
        assert_eq!(polyline.vertices[2].y, 3.0);
    }

    #[test]
    fn excess_vertex_groups_keep_the_declared_run() {
        // Two declared, three present: the overflow pair must not restart
        // the run and wipe the collected vertices.
        let source = "90\n2\n10\n0.0\n20\n0.0\n10\n1.0\n20\n1.0\n10\n2.0\n20\n2.0\n0\nEOF";
        let mut s = GroupScanner::new(source);
        let start = Group {
            code: 0,
            value: GroupValue::Str("LWPOLYLINE".into()),
        };
        let entity = LwPolylineHandler.parse_entity(&mut s, &start).unwrap();
        let EntityData::LwPolyline(polyline) = entity.data else {
            panic!("expected a polyline");
        };
        assert_eq!(polyline.vertices.len(), 2);
        assert_eq!(polyline.vertices[0].x, 0.0);
        assert_eq!(polyline.vertices[1].x, 1.0);
    }
}

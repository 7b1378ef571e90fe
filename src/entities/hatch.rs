use serde::Serialize;
use tracing::warn;

use crate::core::result::Result;
use crate::document::Point;
use crate::entities::common::{
    check_common_entity_properties, collect_vertex_run, parse_point, EntityCommon, Vertex,
    BOUNDARY_RUN,
};
use crate::entities::{Entity, EntityData, EntityHandler};
use crate::scan::{Group, GroupScanner};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HatchData {
    pub pattern_name: String,
    pub solid_fill: bool,
    pub associative: bool,
    pub boundary_path_count: i64,
    /// One vertex loop per boundary path, in stream order.
    pub boundaries: Vec<Vec<Vertex>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elevation: Option<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extrusion_direction: Option<Point>,
}

pub struct HatchHandler;

impl EntityHandler for HatchHandler {
    fn entity_name(&self) -> &'static str {
        "HATCH"
    }

    fn parse_entity(&self, scanner: &mut GroupScanner, _start: &Group) -> Result<Entity> {
        let mut common = EntityCommon::default();
        let mut data = HatchData::default();

        let mut curr = scanner.next()?;
        while !scanner.is_eof() && curr.code != 0 {
            match curr.code {
                2 => data.pattern_name = curr.string(),
                // 10 is the elevation point only outside a boundary; a 10
                // overflowing a declared loop must not be misread as one.
                10 if data.boundaries.is_empty() => {
                    data.elevation = Some(parse_point(scanner, &curr)?);
                }
                70 => data.solid_fill = curr.int() == 1,
                71 => data.associative = curr.int() != 0,
                91 => data.boundary_path_count = curr.int(),
                93 => {
                    // Declared vertex count of one boundary loop. A bogus
                    // count drops the loop rather than the whole entity.
                    let declared = curr.int();
                    if declared <= 0 {
                        warn!(declared, "hatch boundary with a non-positive vertex count");
                    } else {
                        let first = scanner.next()?;
                        let boundary =
                            collect_vertex_run(scanner, first, declared as usize, &BOUNDARY_RUN)?;
                        data.boundaries.push(boundary);
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
            data: EntityData::Hatch(data),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::HatchHandler;
    use crate::entities::{EntityData, EntityHandler};
    use crate::scan::{Group, GroupScanner, GroupValue};

    fn parse(source: &str) -> super::HatchData {
        let mut s = GroupScanner::new(source);
        let start = Group {
            code: 0,
            value: GroupValue::Str("HATCH".into()),
        };
        let entity = HatchHandler.parse_entity(&mut s, &start).unwrap();
        let EntityData::Hatch(hatch) = entity.data else {
            panic!("expected a hatch");
        };
        hatch
    }

    #[test]
    fn collects_boundary_loops() {
        let source = "2\nSOLID\n70\n1\n91\n1\n93\n3\n10\n0.0\n20\n0.0\n10\n4.0\n20\n0.0\n42\n0.5\n10\n4.0\n20\n3.0\n97\n0\n0\nEOF";
        let hatch = parse(source);
        assert_eq!(hatch.pattern_name, "SOLID");
        assert!(hatch.solid_fill);
        assert_eq!(hatch.boundaries.len(), 1);
        assert_eq!(hatch.boundaries[0].len(), 3);
        assert_eq!(hatch.boundaries[0][1].bulge, Some(0.5));
    }

    #[test]
    fn declared_count_caps_but_never_pads() {
        // Five declared, only two present before an unrelated group.
        let source = "93\n5\n10\n0.0\n20\n0.0\n10\n1.0\n20\n1.0\n97\n0\n0\nEOF";
        let hatch = parse(source);
        assert_eq!(hatch.boundaries.len(), 1);
        assert_eq!(hatch.boundaries[0].len(), 2);
    }

    #[test]
    fn excess_boundary_vertices_do_not_become_the_elevation() {
        // One declared vertex, two present: the overflow 10/20 pair is
        // dropped, not read as an elevation point.
        let source = "93\n1\n10\n0.0\n20\n0.0\n10\n9.0\n20\n9.0\n0\nEOF";
        let hatch = parse(source);
        assert_eq!(hatch.boundaries.len(), 1);
        assert_eq!(hatch.boundaries[0].len(), 1);
        assert!(hatch.elevation.is_none());
    }

    #[test]
    fn non_positive_count_drops_only_the_loop() {
        let source = "93\n0\n2\nANSI31\n0\nEOF";
        let hatch = parse(source);
        assert!(hatch.boundaries.is_empty());
        assert_eq!(hatch.pattern_name, "ANSI31");
    }
}

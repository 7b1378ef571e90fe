use serde::Serialize;

use crate::core::result::Result;
use crate::entities::common::{
    check_common_entity_properties, collect_vertex_run, EntityCommon, Vertex, FACE_RUN,
};
use crate::entities::{Entity, EntityData, EntityHandler};
use crate::scan::{Group, GroupScanner};

/// Three or four corners; the run ends early for triangles.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Face3dData {
    pub vertices: Vec<Vertex>,
    pub shape: bool,
    pub has_continuous_linetype_pattern: bool,
}

pub struct Face3dHandler;

impl EntityHandler for Face3dHandler {
    fn entity_name(&self) -> &'static str {
        "3DFACE"
    }

    fn parse_entity(&self, scanner: &mut GroupScanner, _start: &Group) -> Result<Entity> {
        let mut common = EntityCommon::default();
        let mut data = Face3dData::default();

        let mut curr = scanner.next()?;
        while !scanner.is_eof() && curr.code != 0 {
            match curr.code {
                70 => {
                    let flags = curr.int();
                    data.shape = flags & 0x01 != 0;
                    data.has_continuous_linetype_pattern = flags & 0x80 != 0;
                }
                10 if data.vertices.is_empty() => {
                    let first = curr.clone();
                    data.vertices = collect_vertex_run(scanner, first, 4, &FACE_RUN)?;
                }
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
            data: EntityData::Face3d(data),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Face3dHandler;
    use crate::entities::{EntityData, EntityHandler};
    use crate::scan::{Group, GroupScanner, GroupValue};

    fn parse(source: &str) -> Vec<crate::entities::Vertex> {
        let mut s = GroupScanner::new(source);
        let start = Group {
            code: 0,
            value: GroupValue::Str("3DFACE".into()),
        };
        let entity = Face3dHandler.parse_entity(&mut s, &start).unwrap();
        let EntityData::Face3d(face) = entity.data else {
            panic!("expected a face");
        };
        face.vertices
    }

    #[test]
    fn quad_face_has_four_corners() {
        let source = "10\n0.0\n20\n0.0\n30\n0.0\n11\n1.0\n21\n0.0\n31\n0.0\n12\n1.0\n22\n1.0\n32\n0.0\n13\n0.0\n23\n1.0\n33\n0.0\n0\nEOF";
        let vertices = parse(source);
        assert_eq!(vertices.len(), 4);
        assert_eq!(vertices[3].y, 1.0);
    }

    #[test]
    fn extra_corner_groups_keep_the_first_run() {
        let source = "10\n0.0\n20\n0.0\n11\n1.0\n21\n0.0\n12\n1.0\n22\n1.0\n13\n0.0\n23\n1.0\n10\n9.0\n20\n9.0\n0\nEOF";
        let vertices = parse(source);
        assert_eq!(vertices.len(), 4);
        assert_eq!(vertices[0].x, 0.0);
    }

    #[test]
    fn triangle_face_stops_at_three() {
        let source = "10\n0.0\n20\n0.0\n30\n0.0\n11\n1.0\n21\n0.0\n31\n0.0\n12\n1.0\n22\n1.0\n32\n0.0\n62\n1\n0\nEOF";
        let vertices = parse(source);
        assert_eq!(vertices.len(), 3);
        assert_eq!(vertices[2].z, Some(0.0));
    }
}

use serde::Serialize;

use crate::core::result::Result;
use crate::document::Point;
use crate::entities::common::{
    check_common_entity_properties, collect_index_run, parse_point, EntityCommon,
};
use crate::entities::{Entity, EntityData, EntityHandler};
use crate::scan::{Group, GroupScanner};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MeshData {
    pub subdivision_level: i64,
    pub vertex_count: i64,
    pub face_count: i64,
    pub edge_count: i64,
    pub vertices: Vec<Point>,
    /// Vertex-index lists, one per face. Faces wider than four indices are
    /// dropped whole.
    pub faces: Vec<Vec<i64>>,
    pub edges: Vec<Vec<i64>>,
}

pub struct MeshHandler;

impl EntityHandler for MeshHandler {
    fn entity_name(&self) -> &'static str {
        "MESH"
    }

    fn parse_entity(&self, scanner: &mut GroupScanner, _start: &Group) -> Result<Entity> {
        let mut common = EntityCommon::default();
        let mut data = MeshData::default();

        let mut curr = scanner.next()?;
        while !scanner.is_eof() && curr.code != 0 {
            match curr.code {
                71 => data.subdivision_level = curr.int(),
                91 => data.vertex_count = curr.int(),
                92 => data.face_count = curr.int(),
                10 => {
                    let vertex = parse_point(scanner, &curr)?;
                    data.vertices.push(vertex);
                    if data.vertex_count == 0 {
                        data.vertex_count = data.vertices.len() as i64;
                    }
                }
                93 => {
                    data.edge_count = curr.int();
                    let edge = collect_index_run(scanner, None, &[94, 1001])?;
                    if !edge.is_empty() {
                        data.edges.push(edge);
                    }
                }
                94 => {
                    let face_size = curr.int();
                    if face_size > 4 {
                        // Unsupported polygon width; skip its index run.
                        loop {
                            let group = scanner.next()?;
                            if group.code == 0 || matches!(group.code, 93 | 94 | 1001) {
                                scanner.rewind();
                                break;
                            }
                        }
                    } else if face_size > 0 {
                        let face = collect_index_run(
                            scanner,
                            Some(face_size as usize),
                            &[93, 94, 1001],
                        )?;
                        if !face.is_empty() {
                            data.faces.push(face);
                        }
                    }
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
            data: EntityData::Mesh(data),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::MeshHandler;
    use crate::entities::{EntityData, EntityHandler};
    use crate::scan::{Group, GroupScanner, GroupValue};

    fn parse(source: &str) -> super::MeshData {
        let mut s = GroupScanner::new(source);
        let start = Group {
            code: 0,
            value: GroupValue::Str("MESH".into()),
        };
        let entity = MeshHandler.parse_entity(&mut s, &start).unwrap();
        let EntityData::Mesh(mesh) = entity.data else {
            panic!("expected a mesh");
        };
        mesh
    }

    #[test]
    fn collects_vertices_and_faces() {
        let source = "91\n3\n10\n0.0\n20\n0.0\n30\n0.0\n10\n1.0\n20\n0.0\n30\n0.0\n10\n0.0\n20\n1.0\n30\n0.0\n92\n1\n94\n3\n95\n0\n95\n1\n95\n2\n0\nEOF";
        let mesh = parse(source);
        assert_eq!(mesh.vertex_count, 3);
        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.face_count, 1);
        assert_eq!(mesh.faces, vec![vec![0, 1, 2]]);
    }

    #[test]
    fn wide_faces_are_skipped() {
        let source = "94\n5\n95\n0\n95\n1\n95\n2\n95\n3\n95\n4\n94\n3\n95\n0\n95\n1\n95\n2\n0\nEOF";
        let mesh = parse(source);
        assert_eq!(mesh.faces, vec![vec![0, 1, 2]]);
    }

    #[test]
    fn edge_run_collects_all_indices() {
        let source = "93\n2\n95\n0\n95\n1\n95\n1\n95\n2\n94\n3\n95\n0\n95\n1\n95\n2\n0\nEOF";
        let mesh = parse(source);
        assert_eq!(mesh.edge_count, 2);
        assert_eq!(mesh.edges, vec![vec![0, 1, 1, 2]]);
        assert_eq!(mesh.faces.len(), 1);
    }
}

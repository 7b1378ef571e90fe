use serde::Serialize;
use tracing::debug;

use crate::core::result::Result;
use crate::document::Point;
use crate::entities::common::{check_common_entity_properties, parse_point, EntityCommon};
use crate::entities::{Entity, EntityData, EntityHandler};
use crate::scan::{Group, GroupScanner};

/// One VERTEX sub-entity of a heavyweight polyline.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PolylineVertex {
    pub position: Point,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bulge: Option<f64>,
    pub curve_fit_vertex: bool,
    pub spline_vertex: bool,
    pub polyface_mesh_vertex: bool,
    /// Nonzero 71-74 indices of a polyface-mesh face record.
    pub face_indices: Vec<i64>,
}

/// The heavyweight polyline: its own groups followed by a run of VERTEX
/// sub-entities closed by SEQEND.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PolylineData {
    pub vertices: Vec<PolylineVertex>,
    pub thickness: f64,
    pub closed: bool,
    pub includes_curve_fit_vertices: bool,
    pub includes_spline_fit_vertices: bool,
    pub is_3d_polyline: bool,
    pub is_3d_polygon_mesh: bool,
    pub is_polyface_mesh: bool,
    pub has_continuous_linetype_pattern: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extrusion_direction: Option<Point>,
}

pub struct PolylineHandler;

impl EntityHandler for PolylineHandler {
    fn entity_name(&self) -> &'static str {
        "POLYLINE"
    }

    fn parse_entity(&self, scanner: &mut GroupScanner, _start: &Group) -> Result<Entity> {
        let mut common = EntityCommon::default();
        let mut data = PolylineData::default();

        let mut curr = scanner.next()?;
        while !scanner.is_eof() {
            if curr.code == 0 {
                match curr.value.as_str() {
                    Some("VERTEX") => data.vertices.push(parse_vertex(scanner)?),
                    Some("SEQEND") => {
                        // The skip already hands the following marker back.
                        skip_seqend(scanner)?;
                        return Ok(Entity {
                            common,
                            data: EntityData::Polyline(data),
                        });
                    }
                    // The vertex run ended without SEQEND; hand the marker
                    // back below.
                    _ => break,
                }
            } else {
                match curr.code {
                    // Elevation placeholder point; nothing to keep.
                    10 => {
                        parse_point(scanner, &curr)?;
                    }
                    39 => data.thickness = curr.float(),
                    70 => {
                        let flags = curr.int();
                        data.closed = flags & 0x01 != 0;
                        data.includes_curve_fit_vertices = flags & 0x02 != 0;
                        data.includes_spline_fit_vertices = flags & 0x04 != 0;
                        data.is_3d_polyline = flags & 0x08 != 0;
                        data.is_3d_polygon_mesh = flags & 0x10 != 0;
                        data.is_polyface_mesh = flags & 0x40 != 0;
                        data.has_continuous_linetype_pattern = flags & 0x80 != 0;
                    }
                    210 => data.extrusion_direction = Some(parse_point(scanner, &curr)?),
                    _ => {
                        check_common_entity_properties(&mut common, &curr, scanner)?;
                    }
                }
            }
            curr = scanner.next()?;
        }
        if curr.code == 0 {
            scanner.rewind();
        }
        Ok(Entity {
            common,
            data: EntityData::Polyline(data),
        })
    }
}

fn parse_vertex(scanner: &mut GroupScanner) -> Result<PolylineVertex> {
    let mut vertex = PolylineVertex::default();
    let mut curr = scanner.next()?;
    while !scanner.is_eof() && curr.code != 0 {
        match curr.code {
            10 => vertex.position = parse_point(scanner, &curr)?,
            42 => {
                if curr.float() != 0.0 {
                    vertex.bulge = Some(curr.float());
                }
            }
            70 => {
                let flags = curr.int();
                vertex.curve_fit_vertex = flags & 0x01 != 0;
                vertex.spline_vertex = flags & 0x08 != 0;
                vertex.polyface_mesh_vertex = flags & 0x80 != 0;
            }
            71..=74 => {
                let index = curr.int();
                if index != 0 {
                    vertex.face_indices.push(index);
                }
            }
            _ => debug!(code = curr.code, "unhandled VERTEX group"),
        }
        curr = scanner.next()?;
    }
    if curr.code == 0 {
        scanner.rewind();
    }
    Ok(vertex)
}

/// Consumes the SEQEND entity's own groups up to the next marker.
fn skip_seqend(scanner: &mut GroupScanner) -> Result<()> {
    let mut curr = scanner.next()?;
    while !scanner.is_eof() && curr.code != 0 {
        curr = scanner.next()?;
    }
    if curr.code == 0 {
        scanner.rewind();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::PolylineHandler;
    use crate::entities::{EntityData, EntityHandler};
    use crate::scan::{Group, GroupScanner, GroupValue};

    fn parse(source: &str) -> super::PolylineData {
        let mut s = GroupScanner::new(source);
        let start = Group {
            code: 0,
            value: GroupValue::Str("POLYLINE".into()),
        };
        let entity = PolylineHandler.parse_entity(&mut s, &start).unwrap();
        let EntityData::Polyline(polyline) = entity.data else {
            panic!("expected a polyline");
        };
        polyline
    }

    #[test]
    fn collects_vertices_through_seqend() {
        let source = "70\n1\n\
                      0\nVERTEX\n8\n0\n10\n0.0\n20\n0.0\n30\n0.0\n\
                      0\nVERTEX\n8\n0\n10\n4.0\n20\n0.0\n30\n0.0\n42\n0.5\n\
                      0\nSEQEND\n8\n0\n\
                      0\nEOF";
        let polyline = parse(source);
        assert!(polyline.closed);
        assert_eq!(polyline.vertices.len(), 2);
        assert_eq!(polyline.vertices[1].position.x, 4.0);
        assert_eq!(polyline.vertices[1].bulge, Some(0.5));
    }

    #[test]
    fn polyface_mesh_vertices_carry_face_indices() {
        let source = "70\n64\n\
                      0\nVERTEX\n10\n0.0\n20\n0.0\n30\n0.0\n70\n128\n71\n1\n72\n2\n73\n3\n\
                      0\nSEQEND\n\
                      0\nEOF";
        let polyline = parse(source);
        assert!(polyline.is_polyface_mesh);
        let vertex = &polyline.vertices[0];
        assert!(vertex.polyface_mesh_vertex);
        assert_eq!(vertex.face_indices, vec![1, 2, 3]);
    }

    #[test]
    fn missing_seqend_hands_the_next_marker_back() {
        let source = "70\n8\n0\nVERTEX\n10\n1.0\n20\n2.0\n30\n0.0\n0\nENDSEC\n0\nEOF";
        let mut s = GroupScanner::new(source);
        let start = Group {
            code: 0,
            value: GroupValue::Str("POLYLINE".into()),
        };
        let entity = PolylineHandler.parse_entity(&mut s, &start).unwrap();
        let EntityData::Polyline(polyline) = entity.data else {
            panic!("expected a polyline");
        };
        assert!(polyline.is_3d_polyline);
        assert_eq!(polyline.vertices.len(), 1);
        assert!(s.next().unwrap().is(0, "ENDSEC"));
    }
}

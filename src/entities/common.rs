use serde::Serialize;
use tracing::{debug, warn};

use crate::core::color;
use crate::core::error::DxfError;
use crate::core::result::Result;
use crate::document::Point;
use crate::scan::{Group, GroupScanner};

/// Application-tagged extended data (group 1001 and its run).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtendedData {
    pub application_name: String,
    pub custom_strings: Vec<String>,
}

/// Properties shared by every entity type, filled by the fallback step of
/// each handler loop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityCommon {
    pub handle: u64,
    pub owner_handle: Option<u64>,
    pub layer: String,
    pub line_type: String,
    pub line_type_scale: f64,
    pub lineweight: i64,
    pub visible: bool,
    pub color_index: i64,
    pub color: u32,
    pub in_paper_space: bool,
    pub material_object_handle: Option<u64>,
    pub extended_data: ExtendedData,
}

impl Default for EntityCommon {
    fn default() -> Self {
        Self {
            handle: 0,
            owner_handle: None,
            layer: String::new(),
            line_type: String::new(),
            line_type_scale: 1.0,
            lineweight: -3,
            visible: true,
            color_index: 0,
            color: 0,
            in_paper_space: false,
            material_object_handle: None,
            extended_data: ExtendedData::default(),
        }
    }
}

/// Fallback step shared by every handler: groups the handler's own match did
/// not claim land here. Returns whether the group was recognized.
pub fn check_common_entity_properties(
    common: &mut EntityCommon,
    curr: &Group,
    scanner: &mut GroupScanner,
) -> Result<bool> {
    match curr.code {
        5 => match curr.handle() {
            Some(handle) => common.handle = handle,
            None => warn!(value = %curr.string(), "entity handle is not valid hex"),
        },
        6 => common.line_type = curr.string(),
        8 => common.layer = curr.string(),
        48 => common.line_type_scale = curr.float(),
        60 => common.visible = curr.int() == 0,
        62 => {
            // 0 is by-block and 256 by-layer; negative means the layer is
            // off. The index is kept raw, the truecolor uses its magnitude.
            common.color_index = curr.int();
            common.color = color::truecolor(common.color_index.abs());
        }
        67 => common.in_paper_space = curr.int() != 0,
        100 | 101 => {} // subclass and embedded-object markers
        330 => common.owner_handle = curr.handle(),
        347 => common.material_object_handle = curr.handle(),
        370 => common.lineweight = curr.int(),
        420 => common.color = curr.int().unsigned_abs() as u32,
        1001 => {
            common.extended_data.application_name = curr.string();
            loop {
                let next = scanner.next()?;
                match next.code {
                    1000 | 1070 | 1071 => {
                        common.extended_data.custom_strings.push(next.string());
                    }
                    _ => {
                        scanner.rewind();
                        break;
                    }
                }
            }
        }
        1000 => common.extended_data.custom_strings.push(curr.string()),
        _ => {
            debug!(code = curr.code, "unhandled entity group");
            return Ok(false);
        }
    }
    Ok(true)
}

/// Assembles a point starting at the group that carries `x` (code `c`).
/// `y` must follow as `c + 10`; a `c + 20` group is consumed as `z` when
/// present, otherwise the unrelated group is handed back via rewind.
pub fn parse_point(scanner: &mut GroupScanner, start: &Group) -> Result<Point> {
    let mut point = Point::new(start.float(), 0.0);
    let mut code = start.code + 10;

    let y_group = scanner.next()?;
    if y_group.code != code {
        return Err(DxfError::PointFormat {
            expected: code,
            axis: 'y',
            found: y_group.code,
        });
    }
    point.y = y_group.float();
    code += 10;

    if scanner.has_next() {
        let z_group = scanner.next()?;
        if z_group.code == code {
            point.z = Some(z_group.float());
        } else {
            scanner.rewind();
        }
    }
    Ok(point)
}

/// One slot of a coordinate run.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bulge: Option<f64>,
}

/// Code layout of a vertex run. Each primary code `c` starts a new slot;
/// `c + 10` is its y and, when `with_z`, `c + 20` its z.
#[derive(Debug, Clone, Copy)]
pub struct VertexRunLayout {
    pub x_codes: &'static [i32],
    pub with_z: bool,
    pub bulge_code: Option<i32>,
}

/// 3DFACE corners: up to four slots on distinct primary codes.
pub const FACE_RUN: VertexRunLayout = VertexRunLayout {
    x_codes: &[10, 11, 12, 13],
    with_z: true,
    bulge_code: None,
};

/// HATCH and LWPOLYLINE loops: repeated 10/20 pairs with optional bulge.
pub const BOUNDARY_RUN: VertexRunLayout = VertexRunLayout {
    x_codes: &[10],
    with_z: false,
    bulge_code: Some(42),
};

/// Collects up to `cap` vertices starting from the already-consumed `first`
/// group. `cap` is a maximum, never a guarantee: a repeated primary code ends
/// the slot in progress, and any group outside the layout ends the run with
/// the partial slot kept and the group handed back via rewind.
pub fn collect_vertex_run(
    scanner: &mut GroupScanner,
    first: Group,
    cap: usize,
    layout: &VertexRunLayout,
) -> Result<Vec<Vertex>> {
    let mut vertices = Vec::new();
    let mut curr = first;
    for _ in 0..cap {
        let mut vertex = Vertex::default();
        let mut started = false;
        while !scanner.is_eof() {
            if curr.code == 0 {
                break;
            }
            let code = curr.code;
            if layout.x_codes.contains(&code) {
                if started {
                    // Repeated primary code: the next slot starts on `curr`.
                    break;
                }
                vertex.x = curr.float();
                started = true;
            } else if code >= 20 && layout.x_codes.contains(&(code - 10)) {
                vertex.y = curr.float();
            } else if layout.with_z && code >= 30 && layout.x_codes.contains(&(code - 20)) {
                vertex.z = Some(curr.float());
            } else if layout.bulge_code == Some(code) {
                if curr.float() != 0.0 {
                    vertex.bulge = Some(curr.float());
                }
            } else {
                if started {
                    vertices.push(vertex);
                }
                scanner.rewind();
                return Ok(vertices);
            }
            curr = scanner.next()?;
        }
        if started {
            vertices.push(vertex);
        } else {
            break;
        }
    }
    scanner.rewind();
    Ok(vertices)
}

/// Collects an index run of `95` groups. Any code in `stop_codes` (or a `0`
/// marker) ends the run and is handed back; hitting `max` ends it with the
/// cursor left past the last index. Other codes are skipped.
pub fn collect_index_run(
    scanner: &mut GroupScanner,
    max: Option<usize>,
    stop_codes: &[i32],
) -> Result<Vec<i64>> {
    let mut indices = Vec::new();
    while !scanner.is_eof() {
        if max.is_some_and(|m| indices.len() >= m) {
            return Ok(indices);
        }
        let curr = scanner.next()?;
        if curr.code == 95 {
            indices.push(curr.int());
        } else if curr.code == 0 || stop_codes.contains(&curr.code) {
            scanner.rewind();
            return Ok(indices);
        }
    }
    Ok(indices)
}

#[cfg(test)]
mod tests {
    use super::{
        check_common_entity_properties, collect_index_run, collect_vertex_run, parse_point,
        EntityCommon, BOUNDARY_RUN, FACE_RUN,
    };
    use crate::scan::GroupScanner;

    #[test]
    fn point_with_and_without_z() {
        let mut s = GroupScanner::new("10\n1.0\n20\n2.0\n30\n3.0\n11\n4.0\n21\n5.0\n40\n9.0");
        let start = s.next().unwrap();
        let p = parse_point(&mut s, &start).unwrap();
        assert_eq!((p.x, p.y, p.z), (1.0, 2.0, Some(3.0)));

        let start = s.next().unwrap();
        let p = parse_point(&mut s, &start).unwrap();
        assert_eq!((p.x, p.y, p.z), (4.0, 5.0, None));
        // The non-z group was handed back.
        assert_eq!(s.next().unwrap().code, 40);
    }

    #[test]
    fn point_missing_y_is_an_error() {
        let mut s = GroupScanner::new("10\n1.0\n40\n2.0");
        let start = s.next().unwrap();
        assert!(parse_point(&mut s, &start).is_err());
    }

    #[test]
    fn face_run_with_three_corners() {
        // Three corners, then a layer group ends the run early.
        let source = "10\n0.0\n20\n0.0\n30\n0.0\n11\n1.0\n21\n0.0\n31\n0.0\n12\n1.0\n22\n1.0\n32\n0.0\n8\nWalls\n0\nEOF";
        let mut s = GroupScanner::new(source);
        let first = s.next().unwrap();
        let vertices = collect_vertex_run(&mut s, first, 4, &FACE_RUN).unwrap();
        assert_eq!(vertices.len(), 3);
        assert_eq!(vertices[2].y, 1.0);
        assert_eq!(s.next().unwrap().code, 8);
    }

    #[test]
    fn boundary_run_keeps_nonzero_bulges() {
        let source = "10\n0.0\n20\n0.0\n42\n0.5\n10\n4.0\n20\n0.0\n42\n0.0\n97\n0\n0\nEOF";
        let mut s = GroupScanner::new(source);
        let first = s.next().unwrap();
        let vertices = collect_vertex_run(&mut s, first, 8, &BOUNDARY_RUN).unwrap();
        assert_eq!(vertices.len(), 2);
        assert_eq!(vertices[0].bulge, Some(0.5));
        assert_eq!(vertices[1].bulge, None);
        assert_eq!(s.next().unwrap().code, 97);
    }

    #[test]
    fn index_run_stops_and_hands_back() {
        let mut s = GroupScanner::new("95\n1\n95\n2\n95\n3\n94\n4\n0\nEOF");
        let indices = collect_index_run(&mut s, None, &[94, 1001]).unwrap();
        assert_eq!(indices, vec![1, 2, 3]);
        assert_eq!(s.next().unwrap().code, 94);
    }

    #[test]
    fn index_run_respects_max_without_rewind() {
        let mut s = GroupScanner::new("95\n1\n95\n2\n95\n3\n0\nEOF");
        let indices = collect_index_run(&mut s, Some(2), &[94]).unwrap();
        assert_eq!(indices, vec![1, 2]);
        assert_eq!(indices.len(), 2);
        assert_eq!(s.next().unwrap().code, 95);
    }

    #[test]
    fn common_step_fills_shared_fields() {
        let source = "5\n1A\n8\nWalls\n62\n-3\n60\n0\n1001\nACAD\n1000\nnote\n1070\n7\n6\nDASHED\n0\nEOF";
        let mut s = GroupScanner::new(source);
        let mut common = EntityCommon::default();
        loop {
            let curr = s.next().unwrap();
            if curr.code == 0 {
                break;
            }
            check_common_entity_properties(&mut common, &curr, &mut s).unwrap();
        }
        assert_eq!(common.handle, 0x1A);
        assert_eq!(common.layer, "Walls");
        assert_eq!(common.color_index, -3);
        assert_eq!(common.color, crate::core::color::truecolor(3));
        assert!(common.visible);
        assert_eq!(common.extended_data.application_name, "ACAD");
        assert_eq!(common.extended_data.custom_strings, vec!["note", "7"]);
        assert_eq!(common.line_type, "DASHED");
    }
}

//! Recursive resolution of the flat record table into a typed B-rep graph.
//!
//! Every resolver follows the same shape: gate the record (bounds, type tag,
//! memo, attribute count), memoize a placeholder node, recurse into the
//! linked records, then patch the placeholder's links. Memoizing before the
//! recursion is what terminates the partner/next/prev cycles of the coedge
//! graph; the depth ceiling only guards against non-repeating runaway
//! chains.

use tracing::warn;

use crate::acis::brep::{
    AcisNode, Body, Coedge, Edge, Face, Loop, Lump, PlaneSurface, Point, Shell, StraightCurve,
    Vertex,
};
use crate::acis::record::RecordTable;
use crate::acis::token::SatToken;

/// Finds the unique `body` record and resolves the graph rooted at it.
/// Returns the body's record index.
pub fn resolve_model(table: &mut RecordTable, max_depth: u32) -> Result<usize, String> {
    let Some(body_index) = table.find_tag("body") else {
        return Err("no body record found in ACIS data".to_string());
    };
    match resolve_body(table, body_index as i64, 0, max_depth) {
        Some(index) => Ok(index),
        None => Err("failed to resolve ACIS body".to_string()),
    }
}

enum Gate {
    /// Already resolved; reuse the cached node.
    Resolved(usize),
    /// Fresh record, cleared for resolution.
    Attrs(Vec<SatToken>),
    Reject,
}

fn gate(
    table: &RecordTable,
    index: i64,
    tag: &str,
    min_attrs: usize,
    depth: u32,
    max_depth: u32,
) -> Gate {
    if depth > max_depth {
        warn!(index, tag, depth, "recursion ceiling reached while resolving");
        return Gate::Reject;
    }
    let Some(record) = table.get(index) else {
        warn!(index, tag, "record index out of range");
        return Gate::Reject;
    };
    if record.tag != tag {
        warn!(index, expected = tag, found = %record.tag, "record has an unexpected type tag");
        return Gate::Reject;
    }
    if record.resolved.is_some() {
        return Gate::Resolved(index as usize);
    }
    if record.attributes.len() < min_attrs {
        warn!(index, tag, count = record.attributes.len(), "record has too few attributes");
        return Gate::Reject;
    }
    Gate::Attrs(record.attributes.clone())
}

fn attr_index(attrs: &[SatToken], i: usize) -> i64 {
    attrs.get(i).and_then(SatToken::as_index).unwrap_or(-1)
}

fn attr_number(attrs: &[SatToken], i: usize) -> Option<f64> {
    attrs.get(i).and_then(SatToken::as_f64)
}

fn attr_word<'a>(attrs: &'a [SatToken], i: usize) -> Option<&'a str> {
    attrs.get(i).and_then(SatToken::as_word)
}

fn attr_triple(attrs: &[SatToken], start: usize) -> [f64; 3] {
    [
        attr_number(attrs, start).unwrap_or(0.0),
        attr_number(attrs, start + 1).unwrap_or(0.0),
        attr_number(attrs, start + 2).unwrap_or(0.0),
    ]
}

/// Walks a sibling chain linked through attribute slot 2. A link to a record
/// of the wrong type is skipped by following that record's own next slot; a
/// link out of range ends the chain.
fn resolve_chain(
    table: &mut RecordTable,
    first: i64,
    tag: &str,
    depth: u32,
    max_depth: u32,
    resolve: fn(&mut RecordTable, i64, u32, u32) -> Option<usize>,
) -> Vec<usize> {
    let mut resolved = Vec::new();
    let mut visited = Vec::new();
    let mut cursor = first;
    loop {
        if visited.contains(&cursor) {
            warn!(index = cursor, tag, "sibling chain cycles back on itself");
            break;
        }
        visited.push(cursor);
        let (tag_matches, next) = match table.get(cursor) {
            None => break,
            Some(record) => (record.tag == tag, record.ptr(2)),
        };
        if !tag_matches {
            warn!(index = cursor, expected = tag, "broken sibling link, skipping the record");
            cursor = next;
            continue;
        }
        match resolve(table, cursor, depth + 1, max_depth) {
            Some(index) => resolved.push(index),
            None => warn!(index = cursor, tag, "dropping unresolvable chain record"),
        }
        cursor = next;
    }
    resolved
}

pub fn resolve_body(table: &mut RecordTable, index: i64, depth: u32, max_depth: u32) -> Option<usize> {
    let attrs = match gate(table, index, "body", 2, depth, max_depth) {
        Gate::Resolved(i) => return Some(i),
        Gate::Reject => return None,
        Gate::Attrs(attrs) => attrs,
    };
    let index = index as usize;
    table.set_resolved(index, AcisNode::Body(Body::default()));
    let lumps = resolve_chain(table, attr_index(&attrs, 3), "lump", depth, max_depth, resolve_lump);
    if lumps.is_empty() {
        warn!(index, "no lumps resolved for body");
    }
    if let Some(AcisNode::Body(body)) = table.node_mut(index) {
        body.lumps = lumps;
    }
    Some(index)
}

fn resolve_lump(table: &mut RecordTable, index: i64, depth: u32, max_depth: u32) -> Option<usize> {
    let attrs = match gate(table, index, "lump", 2, depth, max_depth) {
        Gate::Resolved(i) => return Some(i),
        Gate::Reject => return None,
        Gate::Attrs(attrs) => attrs,
    };
    let index = index as usize;
    table.set_resolved(index, AcisNode::Lump(Lump::default()));
    let shells =
        resolve_chain(table, attr_index(&attrs, 3), "shell", depth, max_depth, resolve_shell);
    if let Some(AcisNode::Lump(lump)) = table.node_mut(index) {
        lump.shells = shells;
    }
    Some(index)
}

fn resolve_shell(table: &mut RecordTable, index: i64, depth: u32, max_depth: u32) -> Option<usize> {
    let attrs = match gate(table, index, "shell", 2, depth, max_depth) {
        Gate::Resolved(i) => return Some(i),
        Gate::Reject => return None,
        Gate::Attrs(attrs) => attrs,
    };
    let index = index as usize;
    table.set_resolved(index, AcisNode::Shell(Shell::default()));
    let faces = resolve_chain(table, attr_index(&attrs, 3), "face", depth, max_depth, resolve_face);
    if let Some(AcisNode::Shell(shell)) = table.node_mut(index) {
        shell.faces = faces;
    }
    Some(index)
}

fn resolve_face(table: &mut RecordTable, index: i64, depth: u32, max_depth: u32) -> Option<usize> {
    let attrs = match gate(table, index, "face", 6, depth, max_depth) {
        Gate::Resolved(i) => return Some(i),
        Gate::Reject => return None,
        Gate::Attrs(attrs) => attrs,
    };
    let index = index as usize;
    let face = Face {
        sense: attr_word(&attrs, 5) == Some("forward"),
        double_sided: attr_word(&attrs, 6) == Some("double"),
        ..Face::default()
    };
    table.set_resolved(index, AcisNode::Face(face));

    let surface_ptr = attr_index(&attrs, 4);
    let surface = if surface_ptr >= 0 {
        resolve_surface(table, surface_ptr, depth + 1, max_depth)
    } else {
        None
    };
    let loops = resolve_chain(table, attr_index(&attrs, 3), "loop", depth, max_depth, resolve_loop);
    if let Some(AcisNode::Face(face)) = table.node_mut(index) {
        face.surface = surface;
        face.loops = loops;
    }
    Some(index)
}

fn resolve_loop(table: &mut RecordTable, index: i64, depth: u32, max_depth: u32) -> Option<usize> {
    let attrs = match gate(table, index, "loop", 2, depth, max_depth) {
        Gate::Resolved(i) => return Some(i),
        Gate::Reject => return None,
        Gate::Attrs(attrs) => attrs,
    };
    let index = index as usize;
    table.set_resolved(index, AcisNode::Loop(Loop::default()));

    // Coedges form a closed ring through their own next links; the loop's
    // slot 3 points at an arbitrary entry coedge. Walk the ring from there.
    let mut coedges = Vec::new();
    let mut cursor = attr_index(&attrs, 3);
    while cursor >= 0 {
        let Some(coedge_index) = resolve_coedge(table, cursor, depth + 1, max_depth) else {
            break;
        };
        if coedges.contains(&coedge_index) {
            break;
        }
        coedges.push(coedge_index);
        cursor = match table.node(coedge_index).and_then(AcisNode::as_coedge) {
            Some(coedge) => match coedge.next {
                Some(next) => next as i64,
                None => break,
            },
            None => break,
        };
    }
    if let Some(AcisNode::Loop(l)) = table.node_mut(index) {
        l.coedges = coedges;
    }
    Some(index)
}

fn resolve_coedge(table: &mut RecordTable, index: i64, depth: u32, max_depth: u32) -> Option<usize> {
    let attrs = match gate(table, index, "coedge", 6, depth, max_depth) {
        Gate::Resolved(i) => return Some(i),
        Gate::Reject => return None,
        Gate::Attrs(attrs) => attrs,
    };
    let index = index as usize;
    let placeholder = Coedge {
        sense: attr_word(&attrs, 6) == Some("forward"),
        ..Coedge::default()
    };
    table.set_resolved(index, AcisNode::Coedge(placeholder));

    let resolve_link = |table: &mut RecordTable, ptr: i64, depth: u32| -> Option<usize> {
        if ptr >= 0 {
            resolve_coedge(table, ptr, depth, max_depth)
        } else {
            None
        }
    };
    let edge_ptr = attr_index(&attrs, 5);
    let edge = if edge_ptr >= 0 {
        resolve_edge(table, edge_ptr, depth + 1, max_depth)
    } else {
        None
    };
    let next = resolve_link(table, attr_index(&attrs, 2), depth + 1);
    let prev = resolve_link(table, attr_index(&attrs, 3), depth + 1);
    let partner = resolve_link(table, attr_index(&attrs, 4), depth + 1);

    if let Some(AcisNode::Coedge(coedge)) = table.node_mut(index) {
        coedge.edge = edge;
        coedge.next = next;
        coedge.prev = prev;
        coedge.partner = partner;
    }
    Some(index)
}

fn resolve_edge(table: &mut RecordTable, index: i64, depth: u32, max_depth: u32) -> Option<usize> {
    let attrs = match gate(table, index, "edge", 6, depth, max_depth) {
        Gate::Resolved(i) => return Some(i),
        Gate::Reject => return None,
        Gate::Attrs(attrs) => attrs,
    };
    let index = index as usize;
    let placeholder = Edge {
        sense: attr_word(&attrs, 5) == Some("forward"),
        start_param: attr_number(&attrs, 6),
        end_param: attr_number(&attrs, 7),
        ..Edge::default()
    };
    table.set_resolved(index, AcisNode::Edge(placeholder));

    let resolve_optional = |table: &mut RecordTable,
                            ptr: i64,
                            f: fn(&mut RecordTable, i64, u32, u32) -> Option<usize>|
     -> Option<usize> {
        if ptr >= 0 {
            f(table, ptr, depth + 1, max_depth)
        } else {
            None
        }
    };
    let start_vertex = resolve_optional(table, attr_index(&attrs, 2), resolve_vertex);
    let end_vertex = resolve_optional(table, attr_index(&attrs, 3), resolve_vertex);
    let curve = resolve_optional(table, attr_index(&attrs, 4), resolve_curve);

    if let Some(AcisNode::Edge(edge)) = table.node_mut(index) {
        edge.start_vertex = start_vertex;
        edge.end_vertex = end_vertex;
        edge.curve = curve;
    }
    Some(index)
}

fn resolve_vertex(table: &mut RecordTable, index: i64, depth: u32, max_depth: u32) -> Option<usize> {
    let attrs = match gate(table, index, "vertex", 3, depth, max_depth) {
        Gate::Resolved(i) => return Some(i),
        Gate::Reject => return None,
        Gate::Attrs(attrs) => attrs,
    };
    let index = index as usize;
    table.set_resolved(index, AcisNode::Vertex(Vertex::default()));
    let point_ptr = attr_index(&attrs, 2);
    let point = if point_ptr >= 0 {
        resolve_point(table, point_ptr, depth + 1, max_depth)
    } else {
        None
    };
    if let Some(AcisNode::Vertex(vertex)) = table.node_mut(index) {
        vertex.point = point;
    }
    Some(index)
}

fn resolve_point(table: &mut RecordTable, index: i64, depth: u32, max_depth: u32) -> Option<usize> {
    let attrs = match gate(table, index, "point", 4, depth, max_depth) {
        Gate::Resolved(i) => return Some(i),
        Gate::Reject => return None,
        Gate::Attrs(attrs) => attrs,
    };
    let index = index as usize;
    table.set_resolved(
        index,
        AcisNode::Point(Point {
            location: attr_triple(&attrs, 1),
        }),
    );
    Some(index)
}

fn resolve_curve(table: &mut RecordTable, index: i64, depth: u32, max_depth: u32) -> Option<usize> {
    let attrs = match gate(table, index, "straight-curve", 7, depth, max_depth) {
        Gate::Resolved(i) => return Some(i),
        Gate::Reject => return None,
        Gate::Attrs(attrs) => attrs,
    };
    let index = index as usize;
    table.set_resolved(
        index,
        AcisNode::StraightCurve(StraightCurve {
            origin: attr_triple(&attrs, 1),
            direction: attr_triple(&attrs, 4),
        }),
    );
    Some(index)
}

fn resolve_surface(table: &mut RecordTable, index: i64, depth: u32, max_depth: u32) -> Option<usize> {
    let attrs = match gate(table, index, "plane-surface", 17, depth, max_depth) {
        Gate::Resolved(i) => return Some(i),
        Gate::Reject => return None,
        Gate::Attrs(attrs) => attrs,
    };
    let index = index as usize;
    table.set_resolved(
        index,
        AcisNode::PlaneSurface(PlaneSurface {
            origin: attr_triple(&attrs, 1),
            normal: attr_triple(&attrs, 4),
            u_dir: attr_triple(&attrs, 7),
            v_dir: attr_triple(&attrs, 10),
            reverse_v: attr_word(&attrs, 13) == Some("reverse_v"),
            u_closed: attr_word(&attrs, 14) == Some("I"),
            v_closed: attr_word(&attrs, 15) == Some("I"),
            self_intersect: attr_word(&attrs, 16) == Some("I"),
        }),
    );
    Some(index)
}

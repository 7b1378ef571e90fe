use serde::Serialize;

/// A resolved B-rep node. All links are indices into the owning
/// [`RecordTable`](crate::acis::RecordTable); none of them own anything, so
/// the partner/next/prev cycles of the coedge graph are just numbers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum AcisNode {
    Body(Body),
    Lump(Lump),
    Shell(Shell),
    Face(Face),
    Loop(Loop),
    Coedge(Coedge),
    Edge(Edge),
    Vertex(Vertex),
    Point(Point),
    StraightCurve(StraightCurve),
    PlaneSurface(PlaneSurface),
}

impl AcisNode {
    pub fn as_body(&self) -> Option<&Body> {
        match self {
            AcisNode::Body(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_loop(&self) -> Option<&Loop> {
        match self {
            AcisNode::Loop(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_coedge(&self) -> Option<&Coedge> {
        match self {
            AcisNode::Coedge(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_edge(&self) -> Option<&Edge> {
        match self {
            AcisNode::Edge(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_point(&self) -> Option<&Point> {
        match self {
            AcisNode::Point(v) => Some(v),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Body {
    pub lumps: Vec<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Lump {
    pub shells: Vec<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Shell {
    pub faces: Vec<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Face {
    pub loops: Vec<usize>,
    pub surface: Option<usize>,
    /// True when the face normal agrees with the surface normal.
    pub sense: bool,
    pub double_sided: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Loop {
    pub coedges: Vec<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Coedge {
    pub edge: Option<usize>,
    pub partner: Option<usize>,
    pub next: Option<usize>,
    pub prev: Option<usize>,
    pub sense: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Edge {
    pub start_vertex: Option<usize>,
    pub end_vertex: Option<usize>,
    pub curve: Option<usize>,
    pub sense: bool,
    pub start_param: Option<f64>,
    pub end_param: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Vertex {
    pub point: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Point {
    pub location: [f64; 3],
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StraightCurve {
    pub origin: [f64; 3],
    pub direction: [f64; 3],
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlaneSurface {
    pub origin: [f64; 3],
    pub normal: [f64; 3],
    pub u_dir: [f64; 3],
    pub v_dir: [f64; 3],
    pub reverse_v: bool,
    pub u_closed: bool,
    pub v_closed: bool,
    pub self_intersect: bool,
}

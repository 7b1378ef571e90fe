//! TABLES section: VPORT, LTYPE and LAYER tables. Each table carries a
//! declared record count (code 70) that is checked against the records
//! actually parsed; a mismatch is a warning, never a failure.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::core::color;
use crate::core::result::Result;
use crate::document::Point;
use crate::dxf::ParseRun;
use crate::entities::common::parse_point;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Tables {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_port: Option<ViewPortTable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_type: Option<LineTypeTable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer: Option<LayerTable>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ViewPortTable {
    pub handle: Option<u64>,
    pub owner_handle: Option<u64>,
    /// All VPORT records in stream order; the active configuration is
    /// conventionally the one named `*ACTIVE`, and duplicates are kept.
    pub view_ports: Vec<ViewPort>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LineTypeTable {
    pub handle: Option<u64>,
    pub owner_handle: Option<u64>,
    pub line_types: HashMap<String, LineType>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LayerTable {
    pub handle: Option<u64>,
    pub owner_handle: Option<u64>,
    pub layers: HashMap<String, Layer>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ViewPort {
    pub name: Option<String>,
    pub lower_left_corner: Option<Point>,
    pub upper_right_corner: Option<Point>,
    pub center: Option<Point>,
    pub snap_base_point: Option<Point>,
    pub snap_spacing: Option<Point>,
    pub grid_spacing: Option<Point>,
    pub view_direction_from_target: Option<Point>,
    pub view_target: Option<Point>,
    pub lens_length: Option<f64>,
    pub front_clipping_plane: Option<f64>,
    pub back_clipping_plane: Option<f64>,
    pub view_height: Option<f64>,
    pub snap_rotation_angle: Option<f64>,
    pub view_twist_angle: Option<f64>,
    pub orthographic_type: Option<i64>,
    pub ucs_origin: Option<Point>,
    pub ucs_x_axis: Option<Point>,
    pub ucs_y_axis: Option<Point>,
    pub render_mode: Option<i64>,
    pub default_lighting_type: Option<i64>,
    pub default_lighting_on: Option<bool>,
    pub owner_handle: Option<u64>,
    pub ambient_color: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LineType {
    pub name: String,
    pub description: String,
    /// Dash/dot/space element lengths (code 49 run).
    pub pattern: Vec<f64>,
    pub pattern_length: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Layer {
    pub name: String,
    /// False when the stored color index is negative (layer turned off).
    pub visible: bool,
    pub color_index: i64,
    pub color: u32,
    pub frozen: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TableKind {
    ViewPort,
    LineType,
    Layer,
}

impl TableKind {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "VPORT" => Some(TableKind::ViewPort),
            "LTYPE" => Some(TableKind::LineType),
            "LAYER" => Some(TableKind::Layer),
            _ => None,
        }
    }

    fn record_tag(self) -> &'static str {
        match self {
            TableKind::ViewPort => "VPORT",
            TableKind::LineType => "LTYPE",
            TableKind::Layer => "LAYER",
        }
    }
}

enum TableRecords {
    ViewPorts(Vec<ViewPort>),
    LineTypes(HashMap<String, LineType>),
    Layers(HashMap<String, Layer>),
}

impl TableRecords {
    fn len(&self) -> usize {
        match self {
            TableRecords::ViewPorts(v) => v.len(),
            TableRecords::LineTypes(m) => m.len(),
            TableRecords::Layers(m) => m.len(),
        }
    }
}

impl ParseRun<'_, '_> {
    pub(crate) fn parse_tables(&mut self) -> Result<Tables> {
        let mut tables = Tables::default();
        loop {
            let curr = self.scanner.next()?;
            if curr.is(0, "ENDSEC") {
                break;
            }
            if !curr.is(0, "TABLE") {
                continue;
            }
            let tag_group = self.scanner.next()?;
            let tag = tag_group.string();
            match TableKind::from_tag(&tag) {
                Some(kind) => {
                    debug!(table = %tag, "parsing table");
                    self.parse_table(kind, &mut tables)?;
                }
                None => debug!(table = %tag, "unhandled table"),
            }
        }
        Ok(tables)
    }

    fn parse_table(&mut self, kind: TableKind, tables: &mut Tables) -> Result<()> {
        let mut handle = None;
        let mut owner_handle = None;
        let mut expected_count: i64 = 0;
        let mut records: Option<TableRecords> = None;

        loop {
            let curr = self.scanner.next()?;
            if curr.is(0, "ENDTAB") {
                break;
            }
            match curr.code {
                5 => handle = curr.handle(),
                70 => expected_count = curr.int(),
                100 => {}
                330 => owner_handle = curr.handle(),
                0 if curr.value.as_str() == Some(kind.record_tag()) => {
                    records = Some(match kind {
                        TableKind::ViewPort => {
                            TableRecords::ViewPorts(self.parse_view_port_records()?)
                        }
                        TableKind::LineType => {
                            TableRecords::LineTypes(self.parse_line_type_records()?)
                        }
                        TableKind::Layer => TableRecords::Layers(self.parse_layer_records()?),
                    });
                }
                _ => debug!(code = curr.code, "unhandled table group"),
            }
        }

        if let Some(records) = &records {
            let actual = records.len();
            if expected_count >= 0 && expected_count as usize != actual {
                warn!(
                    table = kind.record_tag(),
                    expected = expected_count,
                    actual,
                    "table record count differs from its declared count"
                );
            }
        }
        match records {
            Some(TableRecords::ViewPorts(view_ports)) => {
                tables.view_port = Some(ViewPortTable {
                    handle,
                    owner_handle,
                    view_ports,
                });
            }
            Some(TableRecords::LineTypes(line_types)) => {
                tables.line_type = Some(LineTypeTable {
                    handle,
                    owner_handle,
                    line_types,
                });
            }
            Some(TableRecords::Layers(layers)) => {
                tables.layer = Some(LayerTable {
                    handle,
                    owner_handle,
                    layers,
                });
            }
            None => {}
        }
        Ok(())
    }

    /// VPORT records until ENDTAB, which is handed back to `parse_table`.
    fn parse_view_port_records(&mut self) -> Result<Vec<ViewPort>> {
        let mut view_ports = Vec::new();
        let mut view_port = ViewPort::default();
        loop {
            let curr = self.scanner.next()?;
            if curr.is(0, "ENDTAB") {
                self.scanner.rewind();
                view_ports.push(view_port);
                return Ok(view_ports);
            }
            match curr.code {
                2 => view_port.name = Some(curr.string()),
                10 => view_port.lower_left_corner = Some(parse_point(&mut self.scanner, &curr)?),
                11 => view_port.upper_right_corner = Some(parse_point(&mut self.scanner, &curr)?),
                12 => view_port.center = Some(parse_point(&mut self.scanner, &curr)?),
                13 => view_port.snap_base_point = Some(parse_point(&mut self.scanner, &curr)?),
                14 => view_port.snap_spacing = Some(parse_point(&mut self.scanner, &curr)?),
                15 => view_port.grid_spacing = Some(parse_point(&mut self.scanner, &curr)?),
                16 => {
                    view_port.view_direction_from_target =
                        Some(parse_point(&mut self.scanner, &curr)?);
                }
                17 => view_port.view_target = Some(parse_point(&mut self.scanner, &curr)?),
                42 => view_port.lens_length = Some(curr.float()),
                43 => view_port.front_clipping_plane = Some(curr.float()),
                44 => view_port.back_clipping_plane = Some(curr.float()),
                45 => view_port.view_height = Some(curr.float()),
                50 => view_port.snap_rotation_angle = Some(curr.float()),
                51 => view_port.view_twist_angle = Some(curr.float()),
                79 => view_port.orthographic_type = Some(curr.int()),
                110 => view_port.ucs_origin = Some(parse_point(&mut self.scanner, &curr)?),
                111 => view_port.ucs_x_axis = Some(parse_point(&mut self.scanner, &curr)?),
                112 => view_port.ucs_y_axis = Some(parse_point(&mut self.scanner, &curr)?),
                281 => view_port.render_mode = Some(curr.int()),
                282 => view_port.default_lighting_type = Some(curr.int()),
                292 => view_port.default_lighting_on = Some(curr.int() != 0),
                330 => view_port.owner_handle = curr.handle(),
                63 | 421 => view_port.ambient_color = Some(curr.int()),
                0 if curr.value.as_str() == Some("VPORT") => {
                    view_ports.push(std::mem::take(&mut view_port));
                }
                0 => debug!(marker = %curr.string(), "stray record marker in VPORT table"),
                _ => debug!(code = curr.code, "unhandled VPORT group"),
            }
        }
    }

    fn parse_line_type_records(&mut self) -> Result<HashMap<String, LineType>> {
        let mut line_types = HashMap::new();
        let mut line_type = LineType::default();
        let mut declared_elements: i64 = 0;
        loop {
            let curr = self.scanner.next()?;
            if curr.is(0, "ENDTAB") {
                self.scanner.rewind();
                flush_line_type(&mut line_types, line_type, declared_elements);
                return Ok(line_types);
            }
            match curr.code {
                2 => line_type.name = curr.string(),
                3 => line_type.description = curr.string(),
                40 => line_type.pattern_length = curr.float(),
                49 => line_type.pattern.push(curr.float()),
                73 => declared_elements = curr.int(),
                0 => {
                    flush_line_type(
                        &mut line_types,
                        std::mem::take(&mut line_type),
                        declared_elements,
                    );
                    declared_elements = 0;
                }
                _ => debug!(code = curr.code, "unhandled LTYPE group"),
            }
        }
    }

    fn parse_layer_records(&mut self) -> Result<HashMap<String, Layer>> {
        let mut layers = HashMap::new();
        let mut layer = Layer::default();
        loop {
            let curr = self.scanner.next()?;
            if curr.is(0, "ENDTAB") {
                self.scanner.rewind();
                flush_layer(&mut layers, layer);
                return Ok(layers);
            }
            match curr.code {
                2 => layer.name = curr.string(),
                62 => {
                    // A negative index stores the layer's color while the
                    // layer itself is off.
                    let stored = curr.int();
                    layer.visible = stored >= 0;
                    layer.color_index = stored.abs();
                    layer.color = color::truecolor(layer.color_index);
                }
                70 => layer.frozen = curr.int() & 0b11 != 0,
                420 => layer.color = curr.int().unsigned_abs() as u32,
                0 => flush_layer(&mut layers, std::mem::take(&mut layer)),
                _ => debug!(code = curr.code, "unhandled LAYER group"),
            }
        }
    }
}

fn flush_line_type(
    line_types: &mut HashMap<String, LineType>,
    line_type: LineType,
    declared_elements: i64,
) {
    if declared_elements > 0 && declared_elements as usize != line_type.pattern.len() {
        warn!(
            name = %line_type.name,
            declared = declared_elements,
            actual = line_type.pattern.len(),
            "line type pattern element count differs from its declared count"
        );
    }
    if line_type.name.is_empty() {
        debug!("dropping unnamed line type record");
        return;
    }
    line_types.insert(line_type.name.clone(), line_type);
}

fn flush_layer(layers: &mut HashMap<String, Layer>, layer: Layer) {
    if layer.name.is_empty() {
        debug!("dropping unnamed layer record");
        return;
    }
    layers.insert(layer.name.clone(), layer);
}

#[cfg(test)]
mod tests {
    use crate::core::color;
    use crate::dxf::Parser;

    fn tables_section(body: &str) -> String {
        format!("0\nSECTION\n2\nTABLES\n{body}0\nENDSEC\n0\nEOF\n")
    }

    fn table(tag: &str, count: i64, body: &str) -> String {
        format!("0\nTABLE\n2\n{tag}\n5\n8\n330\n0\n70\n{count}\n{body}0\nENDTAB\n")
    }

    #[test]
    fn layer_visibility_and_color() {
        let body = table(
            "LAYER",
            2,
            "0\nLAYER\n2\nWalls\n62\n1\n70\n0\n0\nLAYER\n2\nHidden\n62\n-5\n70\n1\n420\n1193046\n",
        );
        let document = Parser::new().parse_str(&tables_section(&body)).unwrap();
        let layers = &document.tables.layer.as_ref().unwrap().layers;
        assert_eq!(layers.len(), 2);

        let walls = &layers["Walls"];
        assert!(walls.visible);
        assert!(!walls.frozen);
        assert_eq!(walls.color, color::truecolor(1));

        let hidden = &layers["Hidden"];
        assert!(!hidden.visible);
        assert_eq!(hidden.color_index, 5);
        assert!(hidden.frozen);
        // Truecolor group overrides the index-derived color.
        assert_eq!(hidden.color, 1193046);
    }

    #[test]
    fn line_type_patterns() {
        let body = table(
            "LTYPE",
            1,
            "0\nLTYPE\n2\nDASHED\n3\n__ __ __\n73\n2\n40\n0.75\n49\n0.5\n49\n-0.25\n",
        );
        let document = Parser::new().parse_str(&tables_section(&body)).unwrap();
        let line_types = &document.tables.line_type.as_ref().unwrap().line_types;
        let dashed = &line_types["DASHED"];
        assert_eq!(dashed.pattern, vec![0.5, -0.25]);
        assert_eq!(dashed.pattern_length, 0.75);
    }

    #[test]
    fn multiple_view_ports_are_kept_in_order() {
        let body = table(
            "VPORT",
            2,
            "0\nVPORT\n2\n*ACTIVE\n10\n0.0\n20\n0.0\n45\n10.0\n0\nVPORT\n2\n*ACTIVE\n10\n0.5\n20\n0.5\n45\n20.0\n",
        );
        let document = Parser::new().parse_str(&tables_section(&body)).unwrap();
        let view_ports = &document.tables.view_port.as_ref().unwrap().view_ports;
        assert_eq!(view_ports.len(), 2);
        assert_eq!(view_ports[0].view_height, Some(10.0));
        assert_eq!(view_ports[1].view_height, Some(20.0));
        assert_eq!(view_ports[1].name.as_deref(), Some("*ACTIVE"));
    }

    #[test]
    fn declared_count_mismatch_still_yields_records() {
        let body = table("LAYER", 70, "0\nLAYER\n2\nOnly\n62\n7\n");
        let document = Parser::new().parse_str(&tables_section(&body)).unwrap();
        assert_eq!(document.tables.layer.as_ref().unwrap().layers.len(), 1);
    }

    #[test]
    fn table_handles_are_parsed() {
        let body = table("LAYER", 1, "0\nLAYER\n2\nA\n62\n7\n");
        let document = Parser::new().parse_str(&tables_section(&body)).unwrap();
        let layer_table = document.tables.layer.as_ref().unwrap();
        assert_eq!(layer_table.handle, Some(8));
        assert_eq!(layer_table.owner_handle, Some(0));
    }
}

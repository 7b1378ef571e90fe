use serde::Serialize;
use tracing::warn;

use crate::acis::record::parse_sat;
use crate::acis::{deobfuscate, resolve, BrepModel, SatHeader};
use crate::core::config::ParseConfig;
use crate::core::result::Result;
use crate::entities::common::{check_common_entity_properties, EntityCommon};
use crate::entities::{Entity, EntityData, EntityHandler};
use crate::scan::{Group, GroupScanner};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Solid3dData {
    pub modeler_format_version: i64,
    pub has_solid_history: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_object_handle: Option<u64>,
    /// Obfuscated source lines as they appeared in the stream.
    pub proprietary_data: Vec<String>,
    pub additional_proprietary_data: Vec<String>,
    /// The de-obfuscated SAT text.
    pub acis_data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acis_header: Option<SatHeader>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<BrepModel>,
    /// A decode or resolution failure, captured as data. The entity itself
    /// always parses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_error: Option<String>,
}

pub struct Solid3dHandler {
    config: ParseConfig,
}

impl Solid3dHandler {
    pub fn new(config: ParseConfig) -> Self {
        Self { config }
    }

    fn decode_acis(&self, data: &mut Solid3dData) {
        match parse_sat(&data.acis_data) {
            Ok((header, mut table)) => {
                data.acis_header = Some(header);
                if !self.config.resolve_solid_bodies {
                    data.model = Some(BrepModel {
                        records: table,
                        body: None,
                    });
                    return;
                }
                match resolve::resolve_model(&mut table, self.config.max_resolve_depth) {
                    Ok(body) => {
                        data.model = Some(BrepModel {
                            records: table,
                            body: Some(body),
                        });
                    }
                    Err(message) => {
                        warn!(%message, "ACIS body resolution failed");
                        data.parse_error = Some(message);
                        data.model = Some(BrepModel {
                            records: table,
                            body: None,
                        });
                    }
                }
            }
            Err(message) => {
                warn!(%message, "ACIS decode failed");
                data.parse_error = Some(message);
            }
        }
    }
}

impl EntityHandler for Solid3dHandler {
    fn entity_name(&self) -> &'static str {
        "3DSOLID"
    }

    fn parse_entity(&self, scanner: &mut GroupScanner, _start: &Group) -> Result<Entity> {
        let mut common = EntityCommon::default();
        let mut data = Solid3dData::default();

        let mut curr = scanner.next()?;
        while !scanner.is_eof() && curr.code != 0 {
            match curr.code {
                1 => data.proprietary_data.push(curr.string()),
                3 => data.additional_proprietary_data.push(curr.string()),
                70 => data.modeler_format_version = curr.int(),
                290 => data.has_solid_history = curr.int() != 0,
                350 => data.history_object_handle = curr.handle(),
                _ => {
                    check_common_entity_properties(&mut common, &curr, scanner)?;
                }
            }
            curr = scanner.next()?;
        }
        if curr.code == 0 {
            scanner.rewind();
        }

        let mut lines = data.proprietary_data.clone();
        lines.extend(data.additional_proprietary_data.iter().cloned());
        data.acis_data = deobfuscate::decode_lines(&lines);
        self.decode_acis(&mut data);

        Ok(Entity {
            common,
            data: EntityData::Solid3d(data),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Solid3dHandler;
    use crate::acis::deobfuscate::encode_line;
    use crate::acis::AcisNode;
    use crate::core::config::ParseConfig;
    use crate::entities::{EntityData, EntityHandler};
    use crate::scan::{Group, GroupScanner, GroupValue};

    fn parse(source: &str) -> super::Solid3dData {
        let mut s = GroupScanner::new(source);
        let start = Group {
            code: 0,
            value: GroupValue::Str("3DSOLID".into()),
        };
        let handler = Solid3dHandler::new(ParseConfig::default());
        let entity = handler.parse_entity(&mut s, &start).unwrap();
        let EntityData::Solid3d(solid) = entity.data else {
            panic!("expected a solid");
        };
        solid
    }

    #[test]
    fn decodes_and_resolves_a_minimal_body() {
        let sat = "208 2 1 0 # body $-1 $-1 $-1 $1 # lump $-1 $-1 $-1 $-1 $0 #";
        // Split mid-record to prove group 1/3 concatenation has no seams.
        let wire = encode_line(sat);
        let (first, second) = wire.split_at(wire.len() / 2);
        let source = format!("70\n1\n1\n{first}\n3\n{second}\n0\nEOF");
        let solid = parse(&source);
        assert_eq!(solid.modeler_format_version, 1);
        assert_eq!(solid.acis_data, sat);
        assert!(solid.parse_error.is_none());
        let model = solid.model.unwrap();
        assert_eq!(model.body, Some(0));
        assert_eq!(model.body_node().unwrap().lumps, vec![1]);
        assert!(matches!(model.node(1), Some(AcisNode::Lump(_))));
    }

    #[test]
    fn missing_payload_is_captured_not_fatal() {
        let solid = parse("70\n1\n0\nEOF");
        assert!(solid.parse_error.is_some());
        assert!(solid.model.is_none());
    }

    #[test]
    fn missing_body_record_is_captured_as_parse_error() {
        let sat = "208 1 1 0 # lump $-1 $-1 $-1 $-1 $-1 #";
        let source = format!("1\n{}\n0\nEOF", encode_line(sat));
        let solid = parse(&source);
        assert!(solid.parse_error.is_some());
        // The record table is still available for inspection.
        let model = solid.model.unwrap();
        assert!(model.body.is_none());
        assert_eq!(model.records.len(), 1);
    }
}

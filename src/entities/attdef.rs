use serde::Serialize;

use crate::core::result::Result;
use crate::document::Point;
use crate::entities::common::{check_common_entity_properties, parse_point, EntityCommon};
use crate::entities::{Entity, EntityData, EntityHandler};
use crate::scan::{Group, GroupScanner};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttdefData {
    pub text: String,
    pub tag: String,
    pub prompt: String,
    pub text_style: String,
    pub start_point: Point,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_point: Option<Point>,
    pub thickness: f64,
    pub text_height: f64,
    pub scale: f64,
    pub rotation: f64,
    pub oblique_angle: f64,
    pub invisible: bool,
    pub constant: bool,
    pub verification_required: bool,
    pub preset: bool,
    pub backwards: bool,
    pub mirrored: bool,
    pub horizontal_justification: i64,
    pub vertical_justification: i64,
    pub field_length: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extrusion_direction: Option<Point>,
}

impl Default for AttdefData {
    fn default() -> Self {
        Self {
            text: String::new(),
            tag: String::new(),
            prompt: String::new(),
            text_style: "STANDARD".to_string(),
            start_point: Point::default(),
            end_point: None,
            thickness: 0.0,
            text_height: 0.0,
            scale: 1.0,
            rotation: 0.0,
            oblique_angle: 0.0,
            invisible: false,
            constant: false,
            verification_required: false,
            preset: false,
            backwards: false,
            mirrored: false,
            horizontal_justification: 0,
            vertical_justification: 0,
            field_length: 0,
            extrusion_direction: None,
        }
    }
}

pub struct AttdefHandler;

impl EntityHandler for AttdefHandler {
    fn entity_name(&self) -> &'static str {
        "ATTDEF"
    }

    fn parse_entity(&self, scanner: &mut GroupScanner, _start: &Group) -> Result<Entity> {
        let mut common = EntityCommon::default();
        let mut data = AttdefData::default();

        let mut curr = scanner.next()?;
        while !scanner.is_eof() && curr.code != 0 {
            match curr.code {
                1 => data.text = curr.string(),
                2 => data.tag = curr.string(),
                3 => data.prompt = curr.string(),
                7 => data.text_style = curr.string(),
                10 => data.start_point = parse_point(scanner, &curr)?,
                11 => data.end_point = Some(parse_point(scanner, &curr)?),
                39 => data.thickness = curr.float(),
                40 => data.text_height = curr.float(),
                41 => data.scale = curr.float(),
                50 => data.rotation = curr.float(),
                51 => data.oblique_angle = curr.float(),
                70 => {
                    let flags = curr.int();
                    data.invisible = flags & 0x01 != 0;
                    data.constant = flags & 0x02 != 0;
                    data.verification_required = flags & 0x04 != 0;
                    data.preset = flags & 0x08 != 0;
                }
                71 => {
                    let flags = curr.int();
                    data.backwards = flags & 0x02 != 0;
                    data.mirrored = flags & 0x04 != 0;
                }
                72 => data.horizontal_justification = curr.int(),
                73 => data.field_length = curr.int(),
                74 => data.vertical_justification = curr.int(),
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
            data: EntityData::Attdef(data),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::AttdefHandler;
    use crate::entities::{EntityData, EntityHandler};
    use crate::scan::{Group, GroupScanner, GroupValue};

    #[test]
    fn unpacks_flag_bits() {
        let source = "2\nROOM_NO\n70\n5\n71\n6\n0\nEOF";
        let mut s = GroupScanner::new(source);
        let start = Group {
            code: 0,
            value: GroupValue::Str("ATTDEF".into()),
        };
        let entity = AttdefHandler.parse_entity(&mut s, &start).unwrap();
        let EntityData::Attdef(attdef) = entity.data else {
            panic!("expected an attdef");
        };
        assert_eq!(attdef.tag, "ROOM_NO");
        assert!(attdef.invisible);
        assert!(!attdef.constant);
        assert!(attdef.verification_required);
        assert!(attdef.backwards);
        assert!(attdef.mirrored);
        assert_eq!(attdef.text_style, "STANDARD");
    }
}

use serde::Serialize;

use crate::core::result::Result;
use crate::document::Point;
use crate::entities::common::{check_common_entity_properties, parse_point, EntityCommon};
use crate::entities::{Entity, EntityData, EntityHandler};
use crate::scan::{Group, GroupScanner};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TextData {
    pub start_point: Point,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_point: Option<Point>,
    pub text_height: f64,
    pub x_scale: f64,
    pub rotation: f64,
    pub text: String,
    pub half_align: i64,
    pub vertical_align: i64,
}

pub struct TextHandler;

impl EntityHandler for TextHandler {
    fn entity_name(&self) -> &'static str {
        "TEXT"
    }

    fn parse_entity(&self, scanner: &mut GroupScanner, _start: &Group) -> Result<Entity> {
        let mut common = EntityCommon::default();
        let mut data = TextData::default();

        let mut curr = scanner.next()?;
        while !scanner.is_eof() && curr.code != 0 {
            match curr.code {
                1 => data.text = curr.string(),
                10 => data.start_point = parse_point(scanner, &curr)?,
                11 => data.end_point = Some(parse_point(scanner, &curr)?),
                40 => data.text_height = curr.float(),
                41 => data.x_scale = curr.float(),
                50 => data.rotation = curr.float(),
                72 => data.half_align = curr.int(),
                73 => data.vertical_align = curr.int(),
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
            data: EntityData::Text(data),
        })
    }
}

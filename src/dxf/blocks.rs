//! BLOCKS section: named block definitions, each carrying its own entity
//! list parsed with the shared entity loop.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, error, warn};

use crate::core::result::Result;
use crate::document::Point;
use crate::dxf::{EntityContext, ParseRun};
use crate::entities::common::parse_point;
use crate::entities::Entity;

#[derive(Debug, Clone, Default, Serialize)]
pub struct Block {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xref_path: Option<String>,
    pub handle: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_handle: Option<u64>,
    pub layer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Point>,
    pub paper_space: bool,
    pub type_flags: i64,
    pub entities: Vec<Entity>,
}

impl ParseRun<'_, '_> {
    pub(crate) fn parse_blocks(&mut self) -> Result<HashMap<String, Block>> {
        let mut blocks = HashMap::new();
        loop {
            let curr = self.scanner.next()?;
            if curr.is(0, "ENDSEC") {
                break;
            }
            if !curr.is(0, "BLOCK") {
                debug!(code = curr.code, "stray group in BLOCKS section");
                continue;
            }
            let mut block = self.parse_block()?;
            if block.handle == 0 {
                block.handle = self.synthesize_handle();
            }
            // A nameless block would otherwise be unaddressable; key it by
            // its handle so its entities stay reachable.
            let key = match &block.name {
                Some(name) => name.clone(),
                None => {
                    error!(handle = block.handle, "block is missing a name, keyed by handle");
                    format!("{:X}", block.handle)
                }
            };
            if blocks.contains_key(&key) {
                warn!(name = %key, "duplicate block name, the later definition wins");
            }
            blocks.insert(key, block);
        }
        Ok(blocks)
    }

    fn parse_block(&mut self) -> Result<Block> {
        let mut block = Block::default();
        loop {
            let curr = self.scanner.next()?;
            match curr.code {
                1 => block.xref_path = Some(curr.string()),
                2 => block.name = Some(curr.string()),
                3 => block.name2 = Some(curr.string()),
                5 => block.handle = curr.handle().unwrap_or(0),
                8 => block.layer = curr.string(),
                10 => block.position = Some(parse_point(&mut self.scanner, &curr)?),
                67 => block.paper_space = curr.int() != 0,
                70 => {
                    if curr.int() != 0 {
                        block.type_flags = curr.int();
                    }
                }
                100 => {}
                330 => block.owner_handle = curr.handle(),
                0 => {
                    if curr.value.as_str() == Some("ENDBLK") {
                        break;
                    }
                    // First entity marker: the shared entity loop takes over
                    // and consumes through ENDBLK.
                    self.scanner.rewind();
                    block.entities = self.parse_entities(EntityContext::Block)?;
                    break;
                }
                _ => debug!(code = curr.code, "unhandled BLOCK group"),
            }
        }
        Ok(block)
    }
}

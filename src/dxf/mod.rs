//! Section dispatcher: walks the group stream, recognizes `(0, SECTION)`
//! markers and routes each named section to its sub-parser. Unrecognized
//! sections are skipped whole; stray groups between sections are ignored
//! until the stream re-synchronizes on the next marker.

pub mod blocks;
pub mod file_open;
pub mod header;
pub mod tables;

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, error, warn};

use crate::core::config::ParseConfig;
use crate::core::error::DxfError;
use crate::core::result::Result;
use crate::document::Document;
use crate::entities::{register_default_entity_handlers, Entity, EntityHandler};
use crate::scan::GroupScanner;

/// The configured entry point. Holds the handler registry; each parse call
/// runs against its own scanner and handle counter.
pub struct Parser {
    handlers: HashMap<String, Box<dyn EntityHandler>>,
    config: ParseConfig,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Self::with_config(ParseConfig::default())
    }

    pub fn with_config(config: ParseConfig) -> Self {
        let mut handlers = HashMap::new();
        register_default_entity_handlers(&mut handlers, &config);
        Self { handlers, config }
    }

    pub fn config(&self) -> &ParseConfig {
        &self.config
    }

    /// Registers a handler under its entity name, replacing any default
    /// registered for the same name.
    pub fn register_entity_handler(&mut self, handler: Box<dyn EntityHandler>) {
        self.handlers.insert(handler.entity_name().to_string(), handler);
    }

    pub fn parse_str(&self, source: &str) -> Result<Document> {
        let scanner = GroupScanner::new(source);
        if !scanner.has_next() {
            return Err(DxfError::EmptyInput);
        }
        let run = ParseRun {
            scanner,
            handlers: &self.handlers,
            next_handle: 1,
        };
        run.parse_document()
    }

    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<Document> {
        let source = file_open::read_to_string(path)?;
        self.parse_str(&source)
    }
}

/// Terminator context for the shared entity loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EntityContext {
    Section,
    Block,
}

impl EntityContext {
    fn terminator(self) -> &'static str {
        match self {
            EntityContext::Section => "ENDSEC",
            EntityContext::Block => "ENDBLK",
        }
    }
}

/// Per-call parse state: the scanner plus the shared synthesized-handle
/// counter blocks and entities draw from.
pub(crate) struct ParseRun<'p, 's> {
    pub(crate) scanner: GroupScanner<'s>,
    handlers: &'p HashMap<String, Box<dyn EntityHandler>>,
    next_handle: u64,
}

impl ParseRun<'_, '_> {
    fn parse_document(mut self) -> Result<Document> {
        let mut document = Document::default();
        while !self.scanner.is_eof() {
            if !self.scanner.has_next() {
                warn!("input ended without an EOF marker");
                break;
            }
            let curr = self.scanner.next()?;
            if !curr.is(0, "SECTION") {
                continue;
            }
            let name_group = self.scanner.next()?;
            if name_group.code != 2 {
                error!(
                    code = name_group.code,
                    "expected a section name (code 2) after 0:SECTION"
                );
                continue;
            }
            match name_group.value.as_str().unwrap_or_default() {
                "HEADER" => document.header = self.parse_header()?,
                "TABLES" => document.tables = self.parse_tables()?,
                "BLOCKS" => document.blocks = self.parse_blocks()?,
                "ENTITIES" => {
                    document.entities = self.parse_entities(EntityContext::Section)?;
                }
                name => {
                    warn!(section = name, "skipping unrecognized section");
                    self.skip_section()?;
                }
            }
        }
        Ok(document)
    }

    /// Consumes groups up to and including the section's ENDSEC.
    fn skip_section(&mut self) -> Result<()> {
        loop {
            let curr = self.scanner.next()?;
            if curr.is(0, "ENDSEC") {
                return Ok(());
            }
            if self.scanner.is_eof() {
                return Err(DxfError::format("section not terminated by ENDSEC"));
            }
        }
    }

    /// The shared entity loop, used for the ENTITIES section and for block
    /// bodies. Consumes through the context's terminator. Entities without
    /// a handle group get a synthesized one.
    pub(crate) fn parse_entities(&mut self, context: EntityContext) -> Result<Vec<Entity>> {
        let terminator = context.terminator();
        let mut entities = Vec::new();
        loop {
            let curr = self.scanner.next()?;
            if self.scanner.is_eof() {
                return Err(DxfError::UnexpectedEof(format!(
                    "entity run ended before {terminator}"
                )));
            }
            if curr.code != 0 {
                debug!(code = curr.code, "stray group between entities");
                continue;
            }
            let name = curr.value.as_str().unwrap_or_default().to_string();
            if name == terminator {
                break;
            }
            match self.handlers.get(&name) {
                Some(handler) => {
                    debug!(entity = %name, "parsing entity");
                    let mut entity = handler.parse_entity(&mut self.scanner, &curr)?;
                    if entity.common.handle == 0 {
                        entity.common.handle = self.synthesize_handle();
                    }
                    entities.push(entity);
                }
                None => warn!(entity = %name, "unhandled entity"),
            }
        }
        Ok(entities)
    }

    /// Monotone counter shared by blocks and entities; 0 stays reserved for
    /// "unset".
    pub(crate) fn synthesize_handle(&mut self) -> u64 {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::Parser;
    use crate::document::HeaderValue;
    use crate::entities::EntityData;

    fn section(name: &str, body: &str) -> String {
        format!("0\nSECTION\n2\n{name}\n{body}0\nENDSEC\n")
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(Parser::new().parse_str("").is_err());
        assert!(Parser::new().parse_str("0").is_err());
    }

    #[test]
    fn parses_a_small_document() {
        let source = format!(
            "{}{}0\nEOF\n",
            section("HEADER", "9\n$ACADVER\n1\nAC1027\n"),
            section(
                "ENTITIES",
                "0\nLINE\n5\nA1\n8\nWalls\n10\n0.0\n20\n0.0\n11\n4.0\n21\n3.0\n0\nCIRCLE\n10\n1.0\n20\n1.0\n40\n2.5\n"
            ),
        );
        let document = Parser::new().parse_str(&source).unwrap();
        assert_eq!(
            document.header.get("$ACADVER"),
            Some(&HeaderValue::Str("AC1027".into()))
        );
        assert_eq!(document.entities.len(), 2);
        assert!(matches!(document.entities[0].data, EntityData::Line(_)));
        assert!(matches!(document.entities[1].data, EntityData::Circle(_)));
    }

    #[test]
    fn synthesized_handles_are_monotone_and_nonzero() {
        let source = format!(
            "{}0\nEOF\n",
            section(
                "ENTITIES",
                "0\nPOINT\n10\n0.0\n20\n0.0\n0\nPOINT\n10\n1.0\n20\n1.0\n0\nPOINT\n5\n2F\n10\n2.0\n20\n2.0\n0\nPOINT\n10\n3.0\n20\n3.0\n"
            ),
        );
        let document = Parser::new().parse_str(&source).unwrap();
        let handles: Vec<u64> = document.entities.iter().map(|e| e.common.handle).collect();
        assert!(handles.iter().all(|&h| h != 0));
        assert_eq!(handles[2], 0x2F);
        // Synthesized handles grow in encounter order, and an entity with an
        // explicit handle does not consume a synthesized value.
        assert!(handles[0] < handles[1]);
        assert_eq!(handles[3], handles[1] + 1);
    }

    #[test]
    fn unknown_sections_are_skipped() {
        let source = format!(
            "{}{}0\nEOF\n",
            section("CLASSES", "0\nCLASS\n1\nACDBDICTIONARYWDFLT\n"),
            section("ENTITIES", "0\nPOINT\n10\n1.0\n20\n2.0\n"),
        );
        let document = Parser::new().parse_str(&source).unwrap();
        assert_eq!(document.entities.len(), 1);
    }

    #[test]
    fn unhandled_entities_are_dropped_quietly() {
        let source = format!(
            "{}0\nEOF\n",
            section("ENTITIES", "0\nMTEXT\n1\nhello\n0\nPOINT\n10\n1.0\n20\n2.0\n"),
        );
        let document = Parser::new().parse_str(&source).unwrap();
        assert_eq!(document.entities.len(), 1);
    }

    #[test]
    fn missing_eof_marker_is_tolerated() {
        let source = section("ENTITIES", "0\nPOINT\n10\n1.0\n20\n2.0\n");
        let document = Parser::new().parse_str(&source).unwrap();
        assert_eq!(document.entities.len(), 1);
    }

    #[test]
    fn truncated_section_is_fatal() {
        let source = "0\nSECTION\n2\nENTITIES\n0\nPOINT\n10\n1.0\n20\n2.0\n";
        assert!(Parser::new().parse_str(source).is_err());
    }
}

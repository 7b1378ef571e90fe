use serde::Serialize;

use crate::acis::brep::AcisNode;
use crate::acis::token::{SatToken, SatTokenizer};

/// The positional SAT header fields. Missing trailing fields default to
/// zero or empty rather than failing the whole decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SatHeader {
    pub version: f64,
    pub num_records: i64,
    pub num_entities: i64,
    pub flags: i64,
    pub product_id: String,
    pub acis_version: String,
    pub date: String,
    pub units: f64,
    pub resabs: f64,
    pub resnor: f64,
}

impl SatHeader {
    pub fn from_tokens(tokens: &[SatToken]) -> Self {
        let number = |i: usize| tokens.get(i).and_then(SatToken::as_f64).unwrap_or(0.0);
        let text = |i: usize| tokens.get(i).map(SatToken::to_text).unwrap_or_default();
        Self {
            version: number(0),
            num_records: number(1) as i64,
            num_entities: number(2) as i64,
            flags: number(3) as i64,
            product_id: text(4),
            acis_version: text(5),
            date: text(6),
            units: number(7),
            resabs: number(8),
            resnor: number(9),
        }
    }
}

/// One flat SAT record: its type tag, raw attribute tokens and, after
/// resolution, the typed node built from them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SatRecord {
    pub tag: String,
    pub attributes: Vec<SatToken>,
    pub resolved: Option<AcisNode>,
}

impl SatRecord {
    /// The attribute at `i` as a record index; -1 (the null pointer) when
    /// absent or non-numeric.
    pub fn ptr(&self, i: usize) -> i64 {
        self.attributes
            .get(i)
            .and_then(SatToken::as_index)
            .unwrap_or(-1)
    }
}

/// The record arena. Indices into it are the only links the resolved
/// graph holds, so cyclic topology needs no ownership gymnastics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecordTable {
    records: Vec<SatRecord>,
}

impl RecordTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Bounds-checked lookup; negative indices (null pointers) yield `None`.
    pub fn get(&self, index: i64) -> Option<&SatRecord> {
        usize::try_from(index).ok().and_then(|i| self.records.get(i))
    }

    pub fn push(&mut self, record: SatRecord) {
        self.records.push(record);
    }

    pub fn node(&self, index: usize) -> Option<&AcisNode> {
        self.records.get(index).and_then(|r| r.resolved.as_ref())
    }

    pub(crate) fn node_mut(&mut self, index: usize) -> Option<&mut AcisNode> {
        self.records.get_mut(index).and_then(|r| r.resolved.as_mut())
    }

    pub(crate) fn set_resolved(&mut self, index: usize, node: AcisNode) {
        if let Some(record) = self.records.get_mut(index) {
            record.resolved = Some(node);
        }
    }

    pub fn find_tag(&self, tag: &str) -> Option<usize> {
        self.records.iter().position(|r| r.tag == tag)
    }
}

/// Splits decoded SAT text into the header and the flat record table.
/// Record indices count non-empty `#`-delimited segments after the header,
/// in stream order.
pub fn parse_sat(text: &str) -> std::result::Result<(SatHeader, RecordTable), String> {
    let sat = text.trim();
    if sat.is_empty() {
        return Err("empty ACIS data".to_string());
    }
    let segments: Vec<&str> = sat
        .split('#')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if segments.is_empty() {
        return Err("no ACIS records".to_string());
    }

    let header_tokens: Vec<SatToken> = SatTokenizer::new(segments[0]).collect();
    let header = SatHeader::from_tokens(&header_tokens);

    let mut table = RecordTable::default();
    for segment in &segments[1..] {
        let mut tokens = SatTokenizer::new(segment);
        let Some(first) = tokens.next() else { continue };
        table.push(SatRecord {
            tag: first.to_text(),
            attributes: tokens.collect(),
            resolved: None,
        });
    }
    Ok((header, table))
}

#[cfg(test)]
mod tests {
    use super::parse_sat;

    #[test]
    fn splits_header_and_records() {
        let text = "208 2 1 0 @12 ACIS BinFile @7 unknown @3 day 1 1e-06 1e-10 #\n\
                    body $-1 $-1 $-1 $1 #\n\
                    lump $-1 $-1 $-1 $0 #";
        let (header, table) = parse_sat(text).unwrap();
        assert_eq!(header.version, 208.0);
        assert_eq!(header.num_records, 2);
        assert_eq!(header.product_id, "ACIS BinFile");
        assert_eq!(header.resabs, 1e-06);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(0).unwrap().tag, "body");
        assert_eq!(table.get(1).unwrap().ptr(2), -1);
        assert_eq!(table.get(1).unwrap().ptr(3), 0);
        assert!(table.get(-1).is_none());
        assert!(table.get(2).is_none());
    }

    #[test]
    fn empty_input_is_reported() {
        assert!(parse_sat("   ").is_err());
        assert!(parse_sat("  # # ").is_err());
    }

    #[test]
    fn missing_header_fields_default() {
        let (header, table) = parse_sat("208 #").unwrap();
        assert_eq!(header.version, 208.0);
        assert_eq!(header.num_records, 0);
        assert_eq!(header.product_id, "");
        assert!(table.is_empty());
    }
}

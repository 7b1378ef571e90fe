use serde::Serialize;
use tracing::warn;

use crate::core::error::DxfError;
use crate::core::result::Result;

/// One scanned value, typed by its group code's range. Hex handle codes
/// (5, 105, 320-339) fall in the string ranges and are parsed by callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GroupValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl GroupValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            GroupValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            GroupValue::Int(v) => Some(*v),
            GroupValue::Bool(v) => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            GroupValue::Float(v) => Some(*v),
            GroupValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }
}

/// A `(code, value)` pair scanned from two consecutive source lines.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    pub code: i32,
    pub value: GroupValue,
}

impl Group {
    pub fn is(&self, code: i32, value: &str) -> bool {
        self.code == code && self.value.as_str() == Some(value)
    }

    /// The value as a float, coercing integers; 0.0 for non-numeric values.
    pub fn float(&self) -> f64 {
        self.value.as_f64().unwrap_or(0.0)
    }

    /// The value as an integer; 0 for non-integer values.
    pub fn int(&self) -> i64 {
        self.value.as_i64().unwrap_or(0)
    }

    /// The value rendered as an owned string.
    pub fn string(&self) -> String {
        match &self.value {
            GroupValue::Str(s) => s.clone(),
            GroupValue::Int(v) => v.to_string(),
            GroupValue::Float(v) => v.to_string(),
            GroupValue::Bool(v) => (*v as i32).to_string(),
        }
    }

    /// Parses a hex handle value. `None` when the value is not valid hex.
    pub fn handle(&self) -> Option<u64> {
        self.value
            .as_str()
            .and_then(|s| u64::from_str_radix(s.trim(), 16).ok())
    }
}

/// Pull-based tokenizer over the raw DXF line sequence. Owns the only cursor
/// of a parse run; every sub-parser advances through a borrowed reference.
/// Supports exactly one step of backtracking via [`GroupScanner::rewind`].
#[derive(Debug)]
pub struct GroupScanner<'a> {
    lines: Vec<&'a str>,
    pointer: usize,
    eof: bool,
    rewound: bool,
    last: Option<Group>,
}

impl<'a> GroupScanner<'a> {
    /// Splits the source on CR, LF or CRLF. No I/O happens here; the caller
    /// supplies one complete, already-decoded text buffer.
    pub fn new(source: &'a str) -> Self {
        Self {
            lines: split_lines(source),
            pointer: 0,
            eof: false,
            rewound: false,
            last: None,
        }
    }

    /// True while at least one full group (code line + value line) remains
    /// and the EOF marker has not been read.
    pub fn has_next(&self) -> bool {
        !self.eof && self.pointer + 2 <= self.lines.len()
    }

    /// True once the `(0, "EOF")` marker group has been read.
    pub fn is_eof(&self) -> bool {
        self.eof
    }

    /// Consumes exactly two lines and returns the scanned group. Reading
    /// past the end of input mid-structure is a format error.
    pub fn next(&mut self) -> Result<Group> {
        if self.eof {
            return Err(DxfError::PastEof);
        }
        if !self.has_next() {
            return Err(DxfError::UnexpectedEof(format!(
                "no group left at line {}",
                self.pointer + 1
            )));
        }
        let code_text = self.lines[self.pointer].trim();
        let code: i32 = code_text.parse().map_err(|_| DxfError::InvalidGroupCode {
            line: self.pointer + 1,
            text: code_text.to_string(),
        })?;
        self.pointer += 1;
        let value = parse_group_value(code, self.lines[self.pointer].trim());
        self.pointer += 1;

        let group = Group { code, value };
        if group.is(0, "EOF") {
            self.eof = true;
        }
        self.rewound = false;
        self.last = Some(group.clone());
        Ok(group)
    }

    /// Un-consumes the most recently returned group. Depth-1 only: a second
    /// call before the next read is a no-op; callers needing deeper lookahead
    /// must buffer groups themselves. Handing back the EOF marker clears the
    /// EOF state until it is read again.
    pub fn rewind(&mut self) {
        if self.rewound {
            return;
        }
        self.rewound = true;
        self.pointer = self.pointer.saturating_sub(2);
        if self.last.as_ref().is_some_and(|g| g.is(0, "EOF")) {
            self.eof = false;
        }
    }
}

fn split_lines(source: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let bytes = source.as_bytes();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\r' => {
                lines.push(&source[start..i]);
                if i + 1 < bytes.len() && bytes[i + 1] == b'\n' {
                    i += 1;
                }
                start = i + 1;
            }
            b'\n' => {
                lines.push(&source[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    lines.push(&source[start..]);
    lines
}

fn parse_group_value(code: i32, raw: &str) -> GroupValue {
    match code {
        0..=9 => GroupValue::Str(raw.to_string()),
        10..=59 | 110..=149 | 210..=239 | 460..=469 | 1010..=1059 => parse_float(code, raw),
        60..=99 | 160..=179 | 270..=289 | 370..=389 | 400..=409 | 420..=429 | 440..=459
        | 1060..=1071 => parse_int(code, raw),
        290..=299 => parse_bool(code, raw),
        _ => GroupValue::Str(raw.to_string()),
    }
}

fn parse_int(code: i32, raw: &str) -> GroupValue {
    match raw.parse::<i64>() {
        Ok(v) => GroupValue::Int(v),
        Err(_) => {
            warn!(code, value = raw, "group value is not a valid integer");
            GroupValue::Str(raw.to_string())
        }
    }
}

fn parse_float(code: i32, raw: &str) -> GroupValue {
    match raw.parse::<f64>() {
        Ok(v) => GroupValue::Float(v),
        Err(_) => {
            warn!(code, value = raw, "group value is not a valid float");
            GroupValue::Str(raw.to_string())
        }
    }
}

fn parse_bool(code: i32, raw: &str) -> GroupValue {
    match raw.parse::<i64>() {
        Ok(v) => GroupValue::Bool(v != 0),
        Err(_) => {
            warn!(code, value = raw, "group value is not a valid boolean");
            GroupValue::Str(raw.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Group, GroupScanner, GroupValue};

    fn scanner(source: &str) -> GroupScanner<'_> {
        GroupScanner::new(source)
    }

    #[test]
    fn scans_typed_groups() {
        let mut s = scanner("0\nLINE\n10\n1.5\n70\n6\n290\n1\n999\ncomment");
        assert_eq!(
            s.next().unwrap(),
            Group {
                code: 0,
                value: GroupValue::Str("LINE".into())
            }
        );
        assert_eq!(s.next().unwrap().value, GroupValue::Float(1.5));
        assert_eq!(s.next().unwrap().value, GroupValue::Int(6));
        assert_eq!(s.next().unwrap().value, GroupValue::Bool(true));
        assert_eq!(s.next().unwrap().value, GroupValue::Str("comment".into()));
        assert!(!s.has_next());
    }

    #[test]
    fn rewind_then_next_returns_the_same_group() {
        let mut s = scanner("0\nLINE\n8\nWalls\n62\n3");
        s.next().unwrap();
        let before = s.next().unwrap();
        s.rewind();
        assert_eq!(s.next().unwrap(), before);
        // And the stream continues where it should.
        assert_eq!(s.next().unwrap().value, GroupValue::Int(3));
    }

    #[test]
    fn repeated_rewind_steps_back_only_one_group() {
        let mut s = scanner("0\nLINE\n8\nWalls\n62\n3");
        s.next().unwrap();
        let second = s.next().unwrap();
        s.rewind();
        s.rewind();
        assert_eq!(s.next().unwrap(), second);
        assert_eq!(s.next().unwrap().value, GroupValue::Int(3));
    }

    #[test]
    fn mixed_line_endings_split_alike() {
        let mut s = scanner("0\r\nSECTION\r2\nHEADER");
        assert!(s.next().unwrap().is(0, "SECTION"));
        assert!(s.next().unwrap().is(2, "HEADER"));
    }

    #[test]
    fn eof_marker_stops_the_scan() {
        let mut s = scanner("0\nEOF\n0\nLINE");
        assert!(s.next().unwrap().is(0, "EOF"));
        assert!(s.is_eof());
        assert!(!s.has_next());
        assert!(s.next().is_err());
    }

    #[test]
    fn reading_past_the_end_is_an_error() {
        let mut s = scanner("10\n1.0");
        s.next().unwrap();
        assert!(s.next().is_err());
    }

    #[test]
    fn hex_handles_stay_strings() {
        let mut s = scanner("5\n2F1");
        let group = s.next().unwrap();
        assert_eq!(group.value, GroupValue::Str("2F1".into()));
        assert_eq!(group.handle(), Some(0x2F1));
    }
}

use serde::Serialize;

/// One SAT token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SatToken {
    /// `$n` record reference; `$-1` is the null pointer.
    Pointer(i64),
    Int(i64),
    Float(f64),
    /// `@len`-counted string payload.
    Str(String),
    /// Bareword: type tags, sense flags, closure markers.
    Word(String),
    OpenBrace,
    CloseBrace,
}

impl SatToken {
    /// The token as a record index. Plain integers double as pointers in
    /// older SAT revisions.
    pub fn as_index(&self) -> Option<i64> {
        match self {
            SatToken::Pointer(v) | SatToken::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SatToken::Int(v) => Some(*v as f64),
            SatToken::Float(v) => Some(*v),
            SatToken::Str(s) | SatToken::Word(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn as_word(&self) -> Option<&str> {
        match self {
            SatToken::Word(s) | SatToken::Str(s) => Some(s),
            _ => None,
        }
    }

    /// A plain-text rendering, used for type tags and header strings.
    pub fn to_text(&self) -> String {
        match self {
            SatToken::Pointer(v) | SatToken::Int(v) => v.to_string(),
            SatToken::Float(v) => v.to_string(),
            SatToken::Str(s) | SatToken::Word(s) => s.clone(),
            SatToken::OpenBrace => "{".to_string(),
            SatToken::CloseBrace => "}".to_string(),
        }
    }
}

/// Streaming tokenizer over one `#`-delimited SAT segment.
pub struct SatTokenizer {
    chars: Vec<char>,
    pos: usize,
}

impl SatTokenizer {
    pub fn new(segment: &str) -> Self {
        Self {
            chars: segment.chars().collect(),
            pos: 0,
        }
    }

    fn scan_pointer(&mut self) -> SatToken {
        self.pos += 1; // '$'
        let negative = self.chars.get(self.pos) == Some(&'-');
        if negative {
            self.pos += 1;
        }
        let mut value: i64 = 0;
        while let Some(c) = self.chars.get(self.pos) {
            let Some(digit) = c.to_digit(10) else { break };
            value = value * 10 + digit as i64;
            self.pos += 1;
        }
        SatToken::Pointer(if negative { -value } else { value })
    }

    /// `@len` counted string. The length is followed by padding spaces, then
    /// exactly `len` payload characters. Zero-length strings yield nothing.
    fn scan_counted_string(&mut self) -> Option<SatToken> {
        self.pos += 1; // '@'
        let mut len: usize = 0;
        while let Some(c) = self.chars.get(self.pos) {
            let Some(digit) = c.to_digit(10) else { break };
            len = len * 10 + digit as usize;
            self.pos += 1;
        }
        while self.chars.get(self.pos) == Some(&' ') {
            self.pos += 1;
        }
        let end = (self.pos + len).min(self.chars.len());
        let payload: String = self.chars[self.pos..end].iter().collect();
        self.pos = end;
        if payload.is_empty() {
            None
        } else {
            Some(SatToken::Str(payload))
        }
    }

    /// Greedy numeric scan; the result is a float exactly when the text
    /// carries a decimal point or exponent.
    fn scan_number(&mut self) -> SatToken {
        let start = self.pos;
        while let Some(c) = self.chars.get(self.pos) {
            if c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-') {
                self.pos += 1;
            } else {
                break;
            }
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        if text.contains(['.', 'e', 'E']) {
            match text.parse::<f64>() {
                Ok(v) => SatToken::Float(v),
                Err(_) => SatToken::Word(text),
            }
        } else {
            match text.parse::<i64>() {
                Ok(v) => SatToken::Int(v),
                Err(_) => match text.parse::<f64>() {
                    Ok(v) => SatToken::Float(v),
                    Err(_) => SatToken::Word(text),
                },
            }
        }
    }

    fn scan_word(&mut self) -> Option<SatToken> {
        let start = self.pos;
        while let Some(c) = self.chars.get(self.pos) {
            if c.is_whitespace() || matches!(c, '$' | '@' | '{' | '}') {
                break;
            }
            self.pos += 1;
        }
        let word: String = self.chars[start..self.pos].iter().collect();
        let word = word.trim().to_string();
        if word.is_empty() {
            None
        } else {
            Some(SatToken::Word(word))
        }
    }
}

impl Iterator for SatTokenizer {
    type Item = SatToken;

    fn next(&mut self) -> Option<SatToken> {
        loop {
            let c = *self.chars.get(self.pos)?;
            if c.is_whitespace() {
                self.pos += 1;
                continue;
            }
            match c {
                '$' => return Some(self.scan_pointer()),
                '@' => {
                    if let Some(token) = self.scan_counted_string() {
                        return Some(token);
                    }
                }
                '{' => {
                    self.pos += 1;
                    return Some(SatToken::OpenBrace);
                }
                '}' => {
                    self.pos += 1;
                    return Some(SatToken::CloseBrace);
                }
                _ if c.is_ascii_digit() || c == '.' || c == '-' => {
                    return Some(self.scan_number());
                }
                _ => {
                    if let Some(token) = self.scan_word() {
                        return Some(token);
                    }
                }
            }
        }
    }
}

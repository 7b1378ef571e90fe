//! The SAT text embedded in 3DSOLID entities is obfuscated byte-by-byte.
//! Bytes 0x41-0x5E mirror about the midpoint of their range, 0x40 and 0x5F
//! swap, 0x20 is a fixed point and everything else is XOR-ed with 0x5F. A
//! decoded 'A' (wire byte 0x5E) is followed by one pad byte to skip.

/// Decodes one obfuscated line.
pub fn decode_line(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut skip_pad = false;
    for c in text.chars() {
        if skip_pad {
            skip_pad = false;
            continue;
        }
        let code = c as u32;
        match substitute(code) {
            Some(decoded) => {
                out.push(decoded);
                skip_pad = code == 0x5E;
            }
            None => {
                if let Some(decoded) = char::from_u32(code ^ 0x5F) {
                    out.push(decoded);
                }
            }
        }
    }
    out
}

/// Decodes each line independently and concatenates the results. Groups 1
/// and 3 split the stream at arbitrary byte offsets, so no separator is
/// reintroduced between lines.
pub fn decode_lines<S: AsRef<str>>(lines: &[S]) -> String {
    lines.iter().map(|line| decode_line(line.as_ref())).collect()
}

fn substitute(code: u32) -> Option<char> {
    match code {
        0x20 => Some(' '),
        0x40 => Some('_'),
        0x5F => Some('@'),
        0x41..=0x5E => char::from_u32(0x41 + (0x5E - code)),
        _ => None,
    }
}

/// Inverse transform, emitting the pad byte the decoder skips after an 'A'.
#[cfg(test)]
pub fn encode_line(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        let code = c as u32;
        let encoded = match code {
            0x20 => 0x20,
            0x40 => 0x5F,
            0x5F => 0x40,
            0x41..=0x5E => 0x41 + (0x5E - code),
            _ => code ^ 0x5F,
        };
        out.push(char::from_u32(encoded).unwrap_or(c));
        if encoded == 0x5E {
            out.push(' ');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{decode_line, decode_lines, encode_line};

    #[test]
    fn round_trips_sat_text() {
        let plain = "body $-1 $1 $-1 $-1 #";
        assert_eq!(decode_line(&encode_line(plain)), plain);
        // '@' and '_' ride the 0x40/0x5F swap.
        let counted = "point-attrib @7 tracked _";
        assert_eq!(decode_line(&encode_line(counted)), counted);
    }

    #[test]
    fn round_trips_the_sentinel_byte() {
        // 'A' encodes to 0x5E plus a pad byte the decoder skips.
        let plain = "ACIS 208.0 NT";
        let wire = encode_line(plain);
        assert!(wire.len() > plain.len());
        assert_eq!(decode_line(&wire), plain);
    }

    #[test]
    fn concatenates_lines_without_separators() {
        let first = encode_line("lump $-1 $-1 ");
        let second = encode_line("$2 $0 #");
        assert_eq!(decode_lines(&[first, second]), "lump $-1 $-1 $2 $0 #");
    }
}

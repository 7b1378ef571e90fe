use std::fs;
use std::path::Path;

use encoding_rs::{UTF_8, WINDOWS_1252};

use crate::core::error::DxfError;
use crate::core::result::Result;

/// Reads a DXF file into one text buffer. Valid UTF-8 (with or without a
/// BOM) is taken as-is; anything else is decoded as Windows-1252, the
/// historical default of ANSI drawings.
pub fn read_to_string(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| DxfError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(decode_bytes(&bytes))
}

pub fn decode_bytes(bytes: &[u8]) -> String {
    let (text, _, had_errors) = UTF_8.decode(bytes);
    if !had_errors {
        return text.into_owned();
    }
    let (text, _, _) = WINDOWS_1252.decode(bytes);
    text.into_owned()
}

#[cfg(test)]
mod tests {
    use super::decode_bytes;

    #[test]
    fn utf8_passes_through() {
        assert_eq!(decode_bytes("0\nEOF\n".as_bytes()), "0\nEOF\n");
        // BOM is stripped.
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"0\nEOF\n");
        assert_eq!(decode_bytes(&bytes), "0\nEOF\n");
    }

    #[test]
    fn non_utf8_falls_back_to_windows_1252() {
        // 0xE9 is e-acute in Windows-1252 and invalid alone in UTF-8.
        let bytes = b"8\ncl\xE9\n";
        assert_eq!(decode_bytes(bytes), "8\ncl\u{e9}\n");
    }
}

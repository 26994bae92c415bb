//! Byte-to-lines normalization: BOM/heuristic encoding detection, UTF-16
//! transcoding, line splitting, and outer-whitespace trimming.

use crate::range::SourceRange;

/// A diagnostic emitted while normalizing raw bytes into lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextDiagnostic {
    /// Encoding was not explicitly marked by a BOM and had to be guessed.
    InvalidEncoding { label: &'static str, guessed: bool },
    /// A byte sequence could not be decoded and was replaced with U+FFFD.
    InvalidUnicode { range: SourceRange },
}

const UNICODE_WS: [char; 3] = ['\u{2003}', '\u{3000}', '\u{205F}'];

/// Normalize raw bytes into an ordered sequence of trimmed lines plus any
/// diagnostics raised while doing so.
pub fn normalize(bytes: &[u8]) -> (Vec<String>, Vec<TextDiagnostic>) {
    let mut diags = Vec::new();
    let text = decode(bytes, &mut diags);
    let lines = split_and_trim(&text, &mut diags);
    (lines, diags)
}

fn decode(bytes: &[u8], diags: &mut Vec<TextDiagnostic>) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return decode_utf8_lossy(rest, diags);
    }
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        return decode_utf16(rest, true, diags);
    }
    if let Some(rest) = bytes.strip_prefix(&[0xFF, 0xFE]) {
        return decode_utf16(rest, false, diags);
    }

    if let Some(big_endian) = guess_utf16(bytes) {
        diags.push(TextDiagnostic::InvalidEncoding {
            label: if big_endian { "UTF-16BE (guessed)" } else { "UTF-16LE (guessed)" },
            guessed: true,
        });
        return decode_utf16(bytes, big_endian, diags);
    }

    decode_utf8_lossy(bytes, diags)
}

/// Scan the first 200 bytes, counting zero bytes at even vs odd offsets.
/// If at least 20 zero bytes occur and at least 15 are biased to one
/// parity, guess UTF-16 with the matching endianness.
fn guess_utf16(bytes: &[u8]) -> Option<bool> {
    let window = &bytes[..bytes.len().min(200)];
    let mut even_zeros = 0usize;
    let mut odd_zeros = 0usize;
    for (i, &b) in window.iter().enumerate() {
        if b == 0 {
            if i % 2 == 0 {
                even_zeros += 1;
            } else {
                odd_zeros += 1;
            }
        }
    }
    let total = even_zeros + odd_zeros;
    if total < 20 {
        return None;
    }
    // Big-endian UTF-16 ASCII text has its zero high byte at even offsets;
    // little-endian has it at odd offsets.
    if even_zeros >= 15 && even_zeros > odd_zeros {
        Some(true)
    } else if odd_zeros >= 15 && odd_zeros > even_zeros {
        Some(false)
    } else {
        None
    }
}

fn decode_utf8_lossy(bytes: &[u8], diags: &mut Vec<TextDiagnostic>) -> String {
    match core::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let lossy = String::from_utf8_lossy(bytes).into_owned();
            if lossy.contains('\u{FFFD}') {
                let line = lossy[..].split('\n').count().saturating_sub(1);
                diags.push(TextDiagnostic::InvalidUnicode {
                    range: SourceRange::single(line),
                });
            }
            lossy
        }
    }
}

fn decode_utf16(bytes: &[u8], big_endian: bool, diags: &mut Vec<TextDiagnostic>) -> String {
    let mut units = Vec::with_capacity(bytes.len() / 2);
    let mut chunks = bytes.chunks_exact(2);
    for chunk in &mut chunks {
        let unit = if big_endian {
            u16::from_be_bytes([chunk[0], chunk[1]])
        } else {
            u16::from_le_bytes([chunk[0], chunk[1]])
        };
        units.push(unit);
    }

    let mut out = String::with_capacity(units.len());
    let mut line_no = 0usize;
    for decoded in core::char::decode_utf16(units) {
        match decoded {
            Ok(c) => {
                if c == '\n' {
                    line_no += 1;
                }
                out.push(c);
            }
            Err(_) => {
                diags.push(TextDiagnostic::InvalidUnicode {
                    range: SourceRange::single(line_no),
                });
                out.push('\u{FFFD}');
            }
        }
    }
    out
}

fn split_and_trim(text: &str, _diags: &mut [TextDiagnostic]) -> Vec<String> {
    text.split('\n')
        .map(trim_outer_whitespace)
        .map(str::to_string)
        .collect()
}

fn trim_outer_whitespace(line: &str) -> &str {
    line.trim_matches(|c: char| c.is_whitespace() || UNICODE_WS.contains(&c))
}

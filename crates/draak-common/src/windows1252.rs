//! Windows-1252 text encoding.
//!
//! MTF archives store entry names in the Windows-1252 code page, one byte
//! per character. Decoding is total (every byte maps to a character);
//! encoding is fallible because most of Unicode has no 1252 byte.

use std::borrow::Cow;

use crate::{Error, Result};

const fn build_table() -> [char; 256] {
    let mut table = ['\0'; 256];
    let mut i = 0usize;
    while i < 256 {
        table[i] = match i {
            0x80 => '\u{20ac}',
            0x82 => '\u{201a}',
            0x83 => '\u{0192}',
            0x84 => '\u{201e}',
            0x85 => '\u{2026}',
            0x86 => '\u{2020}',
            0x87 => '\u{2021}',
            0x88 => '\u{02c6}',
            0x89 => '\u{2030}',
            0x8a => '\u{0160}',
            0x8b => '\u{2039}',
            0x8c => '\u{0152}',
            0x8e => '\u{017d}',
            0x91 => '\u{2018}',
            0x92 => '\u{2019}',
            0x93 => '\u{201c}',
            0x94 => '\u{201d}',
            0x95 => '\u{2022}',
            0x96 => '\u{2013}',
            0x97 => '\u{2014}',
            0x98 => '\u{02dc}',
            0x99 => '\u{2122}',
            0x9a => '\u{0161}',
            0x9b => '\u{203a}',
            0x9c => '\u{0153}',
            0x9e => '\u{017e}',
            0x9f => '\u{0178}',
            // 0x81, 0x8D, 0x8F, 0x90 and 0x9D are unassigned in the code
            // page; they pass through as the matching control characters.
            i => i as u8 as char,
        };
        i += 1;
    }
    table
}

/// Byte-to-character table for the full code page.
///
/// Every entry is distinct, so the table doubles as the encoder via a
/// reverse lookup.
static TABLE: [char; 256] = build_table();

/// Decode Windows-1252 bytes into a string.
///
/// Borrows when the input is pure ASCII, allocates otherwise.
///
/// ```
/// use draak_common::windows1252;
///
/// assert_eq!(windows1252::decode(b"LEVELS\\CASTLE.O3D"), "LEVELS\\CASTLE.O3D");
/// assert_eq!(windows1252::decode(b"\x93quoted\x94"), "\u{201c}quoted\u{201d}");
/// assert_eq!(windows1252::decode(b"\xe9"), "é");
/// ```
pub fn decode(bytes: &[u8]) -> Cow<'_, str> {
    if bytes.is_ascii() {
        // Ascii is a subset of utf8, so the bytes reinterpret directly.
        debug_assert!(std::str::from_utf8(bytes).is_ok());
        let s = unsafe { std::str::from_utf8_unchecked(bytes) };
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        out.push(TABLE[b as usize]);
    }
    Cow::Owned(out)
}

/// Encode a string as Windows-1252 bytes.
///
/// Fails with [`Error::Unencodable`] on the first character outside the
/// code page.
///
/// ```
/// use draak_common::windows1252;
///
/// assert_eq!(windows1252::encode("MUSIC\\TAVERN.WAV").unwrap(), b"MUSIC\\TAVERN.WAV");
/// assert_eq!(windows1252::encode("\u{201c}").unwrap(), vec![0x93]);
/// assert!(windows1252::encode("λ").is_err());
/// ```
pub fn encode(text: &str) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(text.len());
    for ch in text.chars() {
        out.push(encode_char(ch).ok_or(Error::Unencodable { ch })?);
    }
    Ok(out)
}

/// Encode a single character, or None if it is not in the code page.
#[inline]
pub fn encode_char(ch: char) -> Option<u8> {
    if ch.is_ascii() {
        return Some(ch as u8);
    }
    TABLE.iter().position(|&t| t == ch).map(|i| i as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_borrows() {
        let decoded = decode(b"DATA\\FILE.BIN");
        assert!(matches!(decoded, Cow::Borrowed(_)));
        assert_eq!(decoded, "DATA\\FILE.BIN");
    }

    #[test]
    fn test_high_bytes_decode_to_single_chars() {
        // 0x93 is a left double quotation mark, not a multi-byte sequence.
        let decoded = decode(&[0x93, 0x41]);
        assert_eq!(decoded.chars().count(), 2);
        assert_eq!(decoded, "\u{201c}A");
    }

    #[test]
    fn test_decode_encode_round_trip_all_bytes() {
        let all: Vec<u8> = (0..=255).collect();
        let decoded = decode(&all);
        assert_eq!(encode(&decoded).unwrap(), all);
    }

    #[test]
    fn test_encode_latin1_range() {
        assert_eq!(encode("déjà").unwrap(), vec![b'd', 0xe9, b'j', 0xe0]);
    }

    #[test]
    fn test_encode_rejects_outside_code_page() {
        match encode("ok\u{4e16}") {
            Err(Error::Unencodable { ch }) => assert_eq!(ch, '\u{4e16}'),
            other => panic!("expected Unencodable, got {other:?}"),
        }
    }

    #[test]
    fn test_euro_sign() {
        assert_eq!(decode(&[0x80]), "€");
        assert_eq!(encode("€").unwrap(), vec![0x80]);
    }
}

//! Compressed-payload handling.
//!
//! A compressed payload opens with a twelve-byte sub-header: the marker
//! word `0x0BADBEAF`, the recorded compressed size and the decompressed
//! size, all little-endian. A token stream follows. Each group starts
//! with a flag byte consumed from bit 0 upward: a set bit copies one
//! literal byte to the output, a clear bit reads a little-endian word
//! describing a back-reference into bytes already produced. The word
//! packs the match length minus three in its top six bits (runs of 3 to
//! 66) and the distance in its low ten bits (1 to 1023). A zero word
//! terminates the group early; the unused bits of its flag byte are
//! abandoned and decoding resumes at the next flag byte.

use draak_common::BinaryReader;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::{Error, Result};

/// Marker word that opens every compressed payload.
pub const COMPRESSED_MARKER: u32 = 0x0bad_beaf;

/// Fixed sub-header of a compressed payload.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct CompressedHeader {
    /// Always [`COMPRESSED_MARKER`].
    pub marker: u32,
    /// Recorded size of the token stream. Archives in the wild disagree
    /// with the index entry size here, so it is informational only.
    pub compressed_size: u32,
    /// Size of the payload once decompressed.
    pub decompressed_size: u32,
}

impl CompressedHeader {
    /// Encoded length of the sub-header.
    pub const LEN: usize = 12;
}

/// Whether a stored payload is compressed.
///
/// A payload is compressed when it opens with the marker word. A raw
/// file that happens to begin with those four bytes is indistinguishable
/// from a compressed one; the format has no escape for that collision.
pub fn is_compressed(payload: &[u8]) -> bool {
    BinaryReader::new(payload)
        .peek_u32()
        .is_ok_and(|marker| marker == COMPRESSED_MARKER)
}

/// Unpack a stored payload: parse the sub-header, then decode the token
/// stream into the decompressed bytes.
pub fn unpack(payload: &[u8]) -> Result<Vec<u8>> {
    let mut reader = BinaryReader::new(payload);
    let header: CompressedHeader = reader.read_struct()?;

    let marker = header.marker;
    if marker != COMPRESSED_MARKER {
        return Err(Error::BadMarker {
            expected: COMPRESSED_MARKER,
            actual: marker,
        });
    }

    decode_tokens(
        &mut reader,
        header.decompressed_size as usize,
        header.compressed_size,
        payload.len() as u32,
    )
}

/// Decode a bare token stream (no marker, no sub-header) into
/// `decompressed_size` bytes.
pub fn decompress(input: &[u8], decompressed_size: usize) -> Result<Vec<u8>> {
    let mut reader = BinaryReader::new(input);
    let len = input.len() as u32;
    decode_tokens(
        &mut reader,
        decompressed_size,
        len,
        len.saturating_add(CompressedHeader::LEN as u32),
    )
}

fn decode_tokens(
    reader: &mut BinaryReader<'_>,
    size: usize,
    compressed_size: u32,
    stored_size: u32,
) -> Result<Vec<u8>> {
    let mut out = vec![0u8; size];
    let mut out_idx = 0;

    while out_idx < size {
        let flags = reader.read_u8()?;

        for bit in 0..8 {
            if out_idx == size {
                break;
            }

            if flags & (1 << bit) != 0 {
                out[out_idx] = reader.read_u8()?;
                out_idx += 1;
                continue;
            }

            let word = reader.read_u16()?;
            if word == 0 {
                // Group terminator. The unused bits of this flag byte
                // are abandoned.
                break;
            }

            let length = (word >> 10) as usize + 3;
            let distance = (word & 0x03ff) as usize;
            if distance == 0 || distance > out_idx {
                return Err(Error::BadBackReference {
                    distance,
                    produced: out_idx,
                });
            }

            // A match may reach into bytes it is itself producing, so
            // the copy has to run a byte at a time.
            for _ in 0..length {
                if out_idx == size {
                    return Err(Error::SizeMismatch {
                        compressed_size,
                        stored_size,
                        decompressed_size: size as u32,
                    });
                }
                out[out_idx] = out[out_idx - distance];
                out_idx += 1;
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compressed_payload(tokens: &[u8], decompressed_size: u32) -> Vec<u8> {
        let header = CompressedHeader {
            marker: COMPRESSED_MARKER,
            compressed_size: tokens.len() as u32,
            decompressed_size,
        };
        let mut payload = header.as_bytes().to_vec();
        payload.extend_from_slice(tokens);
        payload
    }

    #[test]
    fn test_is_compressed() {
        assert!(is_compressed(&[0xaf, 0xbe, 0xad, 0x0b]));
        assert!(is_compressed(&[0xaf, 0xbe, 0xad, 0x0b, 0x99]));
        assert!(!is_compressed(&[0xaf, 0xbe, 0xad]));
        assert!(!is_compressed(b"RIFF"));
        assert!(!is_compressed(&[]));
    }

    #[test]
    fn test_decompress_literals() {
        // Flag byte 0x03: bits 0 and 1 are literals. The output fills
        // after two bytes, so the trailing garbage is never read.
        let decoded = decompress(&[0x03, b'H', b'I', 0xff, 0xff], 2).unwrap();
        assert_eq!(decoded, b"HI");
    }

    #[test]
    fn test_decompress_overlapping_match() {
        // Two literals, then a match of length 10 at distance 2. The
        // match overlaps its own output, repeating the two-byte pattern.
        let word: u16 = (7 << 10) | 2;
        let mut tokens = vec![0x03, 0xaa, 0xbb];
        tokens.extend_from_slice(&word.to_le_bytes());

        let decoded = decompress(&tokens, 12).unwrap();
        assert_eq!(decoded, [0xaa, 0xbb].repeat(6));
    }

    #[test]
    fn test_decompress_group_terminator() {
        // A zero word ends the group after one literal; the remaining
        // six bits of the first flag byte never produce anything. The
        // second group carries the other literal.
        let tokens = [0x01, b'X', 0x00, 0x00, 0x01, b'Y'];
        let decoded = decompress(&tokens, 2).unwrap();
        assert_eq!(decoded, b"XY");
    }

    #[test]
    fn test_decompress_zero_size() {
        assert_eq!(decompress(&[], 0).unwrap(), Vec::<u8>::new());
        // Input is not touched when there is nothing to produce.
        assert_eq!(decompress(&[0x12, 0x34], 0).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_decompress_rejects_distance_zero() {
        // Length bits set but distance zero is not the group terminator;
        // it is a reference to the byte being written.
        let word: u16 = 1 << 10;
        let mut tokens = vec![0x01, 0xaa];
        tokens.extend_from_slice(&word.to_le_bytes());

        match decompress(&tokens, 8) {
            Err(Error::BadBackReference { distance: 0, produced: 1 }) => {}
            other => panic!("expected bad back-reference, got {:?}", other),
        }
    }

    #[test]
    fn test_decompress_rejects_distance_beyond_output() {
        let word: u16 = 5;
        let mut tokens = vec![0x00];
        tokens.extend_from_slice(&word.to_le_bytes());

        match decompress(&tokens, 8) {
            Err(Error::BadBackReference { distance: 5, produced: 0 }) => {}
            other => panic!("expected bad back-reference, got {:?}", other),
        }
    }

    #[test]
    fn test_decompress_overrun_is_size_mismatch() {
        // One literal, then a six-byte match into a four-byte output.
        let word: u16 = (3 << 10) | 1;
        let mut tokens = vec![0x01, 0xaa];
        tokens.extend_from_slice(&word.to_le_bytes());

        match decompress(&tokens, 4) {
            Err(Error::SizeMismatch { decompressed_size: 4, .. }) => {}
            other => panic!("expected size mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_decompress_truncated_stream() {
        // The flag byte promises a word that is not there.
        match decompress(&[0x01, 0xaa], 4) {
            Err(Error::Common(_)) => {}
            other => panic!("expected eof, got {:?}", other),
        }
    }

    #[test]
    fn test_unpack_round_trip() {
        let word: u16 = (7 << 10) | 2;
        let mut tokens = vec![0x03, 0xaa, 0xbb];
        tokens.extend_from_slice(&word.to_le_bytes());

        let payload = compressed_payload(&tokens, 12);
        assert!(is_compressed(&payload));
        assert_eq!(unpack(&payload).unwrap(), [0xaa, 0xbb].repeat(6));
    }

    #[test]
    fn test_unpack_bad_marker() {
        match unpack(&[0xde, 0xad, 0xbe, 0xef, 0, 0, 0, 0, 0, 0, 0, 0]) {
            Err(Error::BadMarker { actual, .. }) => assert_eq!(actual, 0xefbe_adde),
            other => panic!("expected bad marker, got {:?}", other),
        }
    }

    #[test]
    fn test_unpack_truncated_header() {
        match unpack(&[0xaf, 0xbe, 0xad, 0x0b, 0x04, 0x00]) {
            Err(Error::Common(draak_common::Error::UnexpectedEof { needed: 12, available: 6 })) => {}
            other => panic!("expected eof, got {:?}", other),
        }
    }
}

//! Bit-granular cursor over an in-memory buffer
//!
//! Encoder headers mix whole-byte fields with 4-bit and 1-bit fields:
//!
//! ```text
//! ... | "LAME3.99r" (9 bytes) | RRRR MMMM | 9 opaque bytes | P S N V .... |
//!        version string        rev  method                  flag bits
//! ```
//!
//! The cursor tracks its position in bits so both kinds of field can be read
//! in sequence. Pattern search is always byte-aligned: signatures are written
//! on byte boundaries, and matching at arbitrary bit offsets inside compressed
//! audio would only produce false positives.

use crate::error::DecodeError;
use std::borrow::Cow;

#[derive(Debug, Clone)]
pub struct BitCursor<'a> {
    data: &'a [u8],
    /// Absolute position in bits, never past `data.len() * 8`
    pos: usize,
}

impl<'a> BitCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Length of the underlying buffer in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn bit_position(&self) -> usize {
        self.pos
    }

    /// Current position in whole bytes (rounded down)
    pub fn byte_position(&self) -> usize {
        self.pos / 8
    }

    pub fn is_byte_aligned(&self) -> bool {
        self.pos % 8 == 0
    }

    pub fn remaining_bits(&self) -> usize {
        self.data.len() * 8 - self.pos
    }

    /// Move to an absolute byte offset. `offset == len` is allowed (end of buffer).
    pub fn seek_bytes(&mut self, offset: usize) -> Result<(), DecodeError> {
        if offset > self.data.len() {
            return Err(DecodeError::OutOfRange {
                offset,
                len: self.data.len(),
            });
        }
        self.pos = offset * 8;
        Ok(())
    }

    fn ensure(&self, bits: usize) -> Result<(), DecodeError> {
        let available = self.remaining_bits();
        if bits > available {
            return Err(DecodeError::Truncated {
                bit_offset: self.pos,
                needed: bits,
                available,
            });
        }
        Ok(())
    }

    fn next_bit(&mut self) -> u8 {
        let byte = self.data[self.pos / 8];
        let bit = (byte >> (7 - (self.pos % 8))) & 1;
        self.pos += 1;
        bit
    }

    /// Read `bits` (1-32) as a big-endian unsigned integer
    pub fn read_uint(&mut self, bits: u32) -> Result<u32, DecodeError> {
        if bits == 0 || bits > 32 {
            return Err(DecodeError::InvalidWidth(bits));
        }
        self.ensure(bits as usize)?;

        // Whole bytes on an aligned cursor are the common case (flags, quality)
        if self.is_byte_aligned() && bits % 8 == 0 {
            let start = self.pos / 8;
            let n = bits as usize / 8;
            let value = self.data[start..start + n]
                .iter()
                .fold(0u32, |acc, &b| (acc << 8) | u32::from(b));
            self.pos += bits as usize;
            return Ok(value);
        }

        let mut value = 0u32;
        for _ in 0..bits {
            value = (value << 1) | u32::from(self.next_bit());
        }
        Ok(value)
    }

    pub fn read_bool(&mut self) -> Result<bool, DecodeError> {
        Ok(self.read_uint(1)? == 1)
    }

    /// Read `n` bytes verbatim.
    ///
    /// Borrowed from the buffer when the cursor sits on a byte boundary,
    /// reassembled bit by bit otherwise.
    pub fn read_bytes(&mut self, n: usize) -> Result<Cow<'a, [u8]>, DecodeError> {
        self.ensure(n.saturating_mul(8))?;

        if self.is_byte_aligned() {
            let start = self.pos / 8;
            self.pos += n * 8;
            let data: &'a [u8] = self.data;
            return Ok(Cow::Borrowed(&data[start..start + n]));
        }

        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            let mut byte = 0u8;
            for _ in 0..8 {
                byte = (byte << 1) | self.next_bit();
            }
            out.push(byte);
        }
        Ok(Cow::Owned(out))
    }

    pub fn skip_bits(&mut self, n: usize) -> Result<(), DecodeError> {
        self.ensure(n)?;
        self.pos += n;
        Ok(())
    }

    pub fn skip_bytes(&mut self, n: usize) -> Result<(), DecodeError> {
        self.skip_bits(n.saturating_mul(8))
    }

    /// Find the first byte-aligned occurrence of `signature` lying entirely
    /// inside `[start, end)`. `end` is clamped to the buffer length.
    ///
    /// Does not move the cursor.
    pub fn find_aligned(&self, signature: &[u8], start: usize, end: usize) -> Option<usize> {
        let end = end.min(self.data.len());
        if signature.is_empty() || start >= end || end - start < signature.len() {
            return None;
        }

        self.data[start..end]
            .windows(signature.len())
            .position(|window| window == signature)
            .map(|rel| start + rel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================================================
    // INTEGER READS
    // ==========================================================================

    #[test]
    fn test_read_uint_32_big_endian() {
        let data = [0x00, 0x00, 0x00, 0x0F, 0xAA];
        let mut cursor = BitCursor::new(&data);

        assert_eq!(cursor.read_uint(32).unwrap(), 15);
        assert_eq!(cursor.byte_position(), 4);
    }

    #[test]
    fn test_read_nibbles() {
        // Revision in the high nibble, VBR method in the low nibble
        let data = [0x03];
        let mut cursor = BitCursor::new(&data);

        assert_eq!(cursor.read_uint(4).unwrap(), 0);
        assert_eq!(cursor.read_uint(4).unwrap(), 3);
        assert_eq!(cursor.remaining_bits(), 0);
    }

    #[test]
    fn test_read_uint_across_byte_boundary() {
        // 0b1010_1100 0b0101_0011: skip 4, read 8 => 0b1100_0101
        let data = [0xAC, 0x53];
        let mut cursor = BitCursor::new(&data);
        cursor.skip_bits(4).unwrap();

        assert_eq!(cursor.read_uint(8).unwrap(), 0xC5);
        assert_eq!(cursor.bit_position(), 12);
    }

    #[test]
    fn test_read_uint_unaligned_32_bits() {
        let data = [0x0F, 0xFF, 0xFF, 0xFF, 0xF0];
        let mut cursor = BitCursor::new(&data);
        cursor.skip_bits(4).unwrap();

        assert_eq!(cursor.read_uint(32).unwrap(), u32::MAX);
    }

    #[test]
    fn test_read_bool_sequence() {
        // 0x34 = 0011 0100
        let data = [0x34];
        let mut cursor = BitCursor::new(&data);

        let bits: Vec<bool> = (0..8).map(|_| cursor.read_bool().unwrap()).collect();
        assert_eq!(bits, vec![false, false, true, true, false, true, false, false]);
    }

    #[test]
    fn test_invalid_width_rejected() {
        let data = [0u8; 8];
        let mut cursor = BitCursor::new(&data);

        assert_eq!(cursor.read_uint(0), Err(DecodeError::InvalidWidth(0)));
        assert_eq!(cursor.read_uint(33), Err(DecodeError::InvalidWidth(33)));
        assert_eq!(cursor.bit_position(), 0, "Failed reads must not move the cursor");
    }

    // ==========================================================================
    // BOUNDS
    // ==========================================================================

    #[test]
    fn test_truncated_read() {
        let data = [0x01, 0x02, 0x03];
        let mut cursor = BitCursor::new(&data);

        let err = cursor.read_uint(32).unwrap_err();
        assert_eq!(
            err,
            DecodeError::Truncated {
                bit_offset: 0,
                needed: 32,
                available: 24
            }
        );
    }

    #[test]
    fn test_truncated_skip() {
        let data = [0u8; 10];
        let mut cursor = BitCursor::new(&data);

        assert!(matches!(
            cursor.skip_bytes(100),
            Err(DecodeError::Truncated { .. })
        ));
        assert_eq!(cursor.bit_position(), 0);
    }

    #[test]
    fn test_seek_out_of_range() {
        let data = [0u8; 4];
        let mut cursor = BitCursor::new(&data);

        assert!(cursor.seek_bytes(4).is_ok(), "Seeking to the end is allowed");
        assert_eq!(
            cursor.seek_bytes(5),
            Err(DecodeError::OutOfRange { offset: 5, len: 4 })
        );
    }

    // ==========================================================================
    // BYTE READS
    // ==========================================================================

    #[test]
    fn test_read_bytes_aligned_borrows() {
        let data = b"LAME3.99r";
        let mut cursor = BitCursor::new(data);

        let bytes = cursor.read_bytes(4).unwrap();
        assert!(matches!(bytes, Cow::Borrowed(_)));
        assert_eq!(&*bytes, b"LAME");
        assert_eq!(cursor.byte_position(), 4);
    }

    #[test]
    fn test_read_bytes_unaligned() {
        let data = [0x0A, 0xBC, 0xD0];
        let mut cursor = BitCursor::new(&data);
        cursor.skip_bits(4).unwrap();

        let bytes = cursor.read_bytes(2).unwrap();
        assert_eq!(bytes.into_owned(), vec![0xAB, 0xCD]);
    }

    // ==========================================================================
    // SIGNATURE SEARCH
    // ==========================================================================

    #[test]
    fn test_find_aligned_first_match() {
        let mut data = vec![0u8; 64];
        data[10..14].copy_from_slice(b"Xing");
        data[40..44].copy_from_slice(b"Xing");
        let cursor = BitCursor::new(&data);

        assert_eq!(cursor.find_aligned(b"Xing", 0, data.len()), Some(10));
        assert_eq!(cursor.find_aligned(b"Xing", 11, data.len()), Some(40));
    }

    #[test]
    fn test_find_aligned_respects_window() {
        let mut data = vec![0u8; 64];
        data[30..34].copy_from_slice(b"Info");
        let cursor = BitCursor::new(&data);

        // Match straddling the end of the window is rejected
        assert_eq!(cursor.find_aligned(b"Info", 0, 32), None);
        assert_eq!(cursor.find_aligned(b"Info", 0, 34), Some(30));
        // Window past the buffer is clamped
        assert_eq!(cursor.find_aligned(b"Info", 20, 10_000), Some(30));
        // Empty or inverted windows never match
        assert_eq!(cursor.find_aligned(b"Info", 40, 40), None);
        assert_eq!(cursor.find_aligned(b"Info", 50, 10), None);
    }

    #[test]
    fn test_find_aligned_ignores_bit_shifted_pattern() {
        // "Xing" shifted right by 4 bits never lands on a byte boundary
        let shifted = [0x05, 0x86, 0x96, 0xE6, 0x70];
        let cursor = BitCursor::new(&shifted);

        assert_eq!(cursor.find_aligned(b"Xing", 0, shifted.len()), None);
    }

    #[test]
    fn test_find_aligned_does_not_move_cursor() {
        let data = b"....Xing";
        let mut cursor = BitCursor::new(data);
        cursor.skip_bits(3).unwrap();

        assert_eq!(cursor.find_aligned(b"Xing", 0, data.len()), Some(4));
        assert_eq!(cursor.bit_position(), 3);
    }
}

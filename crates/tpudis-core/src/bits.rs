//! Bit-addressable views over command buffers.
//!
//! Command words are packed least-significant bit first: bit `i` of a
//! buffer is `(bytes[i / 8] >> (i % 8)) & 1`, and a field spanning bits
//! `start..end` weights bit `start + k` by `2^k`.

use std::fmt;
use std::ops::Range;

use crate::Error;

/// Widest field that can be extracted into a single integer.
pub const MAX_FIELD_BITS: usize = 64;

/// Extracts `width` bits starting at bit `start` of `bytes` as an unsigned integer.
///
/// # Example
/// ```
/// use tpudis_core::extract_bits;
/// // 0b1011_0100: bits 2..6 are 1,0,1,1 from least significant upwards
/// assert_eq!(extract_bits(&[0b1011_0100], 2, 4).unwrap(), 0b1101);
/// ```
pub fn extract_bits(bytes: &[u8], start: usize, width: usize) -> Result<u64, Error> {
    if width > MAX_FIELD_BITS {
        return Err(Error::field_too_wide(width));
    }
    let end = start + width;
    let available = bytes.len() * 8;
    if end > available {
        return Err(Error::out_of_range(start, end, available));
    }

    let mut value = 0u64;
    let mut written = 0;
    let mut pos = start;
    while written < width {
        let shift = pos % 8;
        let take = (8 - shift).min(width - written);
        let mask = (1u16 << take) - 1;
        let chunk = (u16::from(bytes[pos / 8]) >> shift) & mask;
        value |= u64::from(chunk) << written;
        written += take;
        pos += take;
    }
    Ok(value)
}

/// A borrowed window of bits inside a byte buffer.
#[derive(Clone, Copy)]
pub struct BitSlice<'a> {
    bytes: &'a [u8],
    start: usize,
    len: usize,
}

impl<'a> BitSlice<'a> {
    /// Views every bit of `bytes`.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            start: 0,
            len: bytes.len() * 8,
        }
    }

    /// Views the first `len` bits of `bytes`.
    pub fn with_len(bytes: &'a [u8], len: usize) -> Result<Self, Error> {
        let available = bytes.len() * 8;
        if len > available {
            return Err(Error::out_of_range(0, len, available));
        }
        Ok(Self {
            bytes,
            start: 0,
            len,
        })
    }

    /// Number of bits in the view.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the view holds no bits.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Reads a single bit, or `None` past the end of the view.
    pub fn bit(&self, index: usize) -> Option<bool> {
        if index >= self.len {
            return None;
        }
        let pos = self.start + index;
        Some((self.bytes[pos / 8] >> (pos % 8)) & 1 == 1)
    }

    /// Extracts the bits in `range` (relative to the view) as an unsigned integer.
    pub fn field(&self, range: Range<usize>) -> Result<u64, Error> {
        self.check(&range)?;
        extract_bits(self.bytes, self.start + range.start, range.end - range.start)
    }

    /// Narrows the view to `range`.
    pub fn slice(&self, range: Range<usize>) -> Result<BitSlice<'a>, Error> {
        self.check(&range)?;
        Ok(Self {
            bytes: self.bytes,
            start: self.start + range.start,
            len: range.end - range.start,
        })
    }

    /// Drops the first `bits` bits; an offset past the end yields an empty view.
    pub fn skip(&self, bits: usize) -> BitSlice<'a> {
        let bits = bits.min(self.len);
        Self {
            bytes: self.bytes,
            start: self.start + bits,
            len: self.len - bits,
        }
    }

    /// Returns true if every bit in the view is clear.
    pub fn is_zero(&self) -> bool {
        let mut pos = 0;
        while pos < self.len {
            let width = (self.len - pos).min(MAX_FIELD_BITS);
            match self.field(pos..pos + width) {
                Ok(0) => pos += width,
                _ => return false,
            }
        }
        true
    }

    /// Copies the view into an owned word, realigned to bit 0.
    pub fn to_raw_word(&self) -> RawWord {
        let mut bytes = Vec::with_capacity(self.len.div_ceil(8));
        let mut pos = 0;
        while pos < self.len {
            let width = (self.len - pos).min(8);
            // In range by construction of the view.
            let byte = extract_bits(self.bytes, self.start + pos, width).unwrap_or(0);
            bytes.push(byte as u8);
            pos += width;
        }
        RawWord {
            bytes,
            len: self.len,
        }
    }

    fn check(&self, range: &Range<usize>) -> Result<(), Error> {
        if range.start > range.end || range.end > self.len {
            return Err(Error::out_of_range(range.start, range.end, self.len));
        }
        Ok(())
    }
}

impl fmt::Debug for BitSlice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitSlice")
            .field("start", &self.start)
            .field("len", &self.len)
            .finish()
    }
}

/// An owned command word.
///
/// The bytes are aligned to bit 0 and the padding bits of the last byte
/// are always clear, so equality and hashing depend only on the word's
/// length and bit content.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawWord {
    bytes: Vec<u8>,
    len: usize,
}

impl RawWord {
    /// Builds a word from the first `len` bits of `bytes`.
    pub fn from_bytes(bytes: &[u8], len: usize) -> Result<Self, Error> {
        Ok(BitSlice::with_len(bytes, len)?.to_raw_word())
    }

    /// Length of the word in bits.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the word holds no bits.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The packed bytes of the word.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// A bit view over the whole word.
    pub fn bits(&self) -> BitSlice<'_> {
        BitSlice {
            bytes: &self.bytes,
            start: 0,
            len: self.len,
        }
    }
}

impl fmt::Debug for RawWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawWord({} bits: {})", self.len, self)
    }
}

impl fmt::Display for RawWord {
    /// Hex dump, least significant byte first.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.bytes {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

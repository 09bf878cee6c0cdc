//! Binary data parsing utilities shared across formats.
//!
//! HWP 5.0 records, compound-file headers and HWP 3.x headers are all
//! little-endian. This module provides bounds-checked readers for them plus
//! UTF-16LE string decoding used by record payloads and property sets.

use zerocopy::{FromBytes, LE, U16, U32};

/// Binary parsing error type
#[derive(Debug, Clone)]
pub enum BinaryError {
    /// Not enough data to read the requested type
    InsufficientData { expected: usize, available: usize },
    /// Failed to parse the data
    ParseError(String),
}

impl std::fmt::Display for BinaryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinaryError::InsufficientData {
                expected,
                available,
            } => {
                write!(
                    f,
                    "Insufficient data: expected {}, got {}",
                    expected, available
                )
            },
            BinaryError::ParseError(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for BinaryError {}

/// Result type for binary operations
pub type BinaryResult<T> = Result<T, BinaryError>;

/// Read a little-endian u16 from a byte slice at the given offset.
///
/// # Examples
///
/// ```
/// use unhwp::common::binary::read_u16_le;
/// let data = [0x34, 0x12, 0x78, 0x56];
/// assert_eq!(read_u16_le(&data, 0).unwrap(), 0x1234);
/// assert_eq!(read_u16_le(&data, 2).unwrap(), 0x5678);
/// ```
#[inline]
pub fn read_u16_le(data: &[u8], offset: usize) -> BinaryResult<u16> {
    if offset + 2 > data.len() {
        return Err(BinaryError::InsufficientData {
            expected: offset + 2,
            available: data.len(),
        });
    }
    U16::<LE>::read_from_bytes(&data[offset..offset + 2])
        .map(|v| v.get())
        .map_err(|_| BinaryError::ParseError("Failed to read u16".to_string()))
}

/// Read a little-endian u32 from a byte slice at the given offset.
///
/// # Examples
///
/// ```
/// use unhwp::common::binary::read_u32_le;
/// let data = [0x78, 0x56, 0x34, 0x12];
/// assert_eq!(read_u32_le(&data, 0).unwrap(), 0x12345678);
/// ```
#[inline]
pub fn read_u32_le(data: &[u8], offset: usize) -> BinaryResult<u32> {
    if offset + 4 > data.len() {
        return Err(BinaryError::InsufficientData {
            expected: offset + 4,
            available: data.len(),
        });
    }
    U32::<LE>::read_from_bytes(&data[offset..offset + 4])
        .map(|v| v.get())
        .map_err(|_| BinaryError::ParseError("Failed to read u32".to_string()))
}

/// Decode a run of UTF-16LE code units, stopping at the first NUL.
///
/// Unpaired surrogates are replaced with U+FFFD.
///
/// # Examples
///
/// ```
/// use unhwp::common::binary::parse_utf16le_string;
/// let data = [0x48, 0x00, 0x69, 0x00, 0x00, 0x00, 0x21, 0x00];
/// assert_eq!(parse_utf16le_string(&data), "Hi");
/// ```
pub fn parse_utf16le_string(data: &[u8]) -> String {
    let units: Vec<u16> = data
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .take_while(|&u| u != 0)
        .collect();
    String::from_utf16_lossy(&units)
}

/// Forward-only cursor over a little-endian byte slice.
///
/// Used for record payloads whose fields are read sequentially. Every read is
/// bounds-checked and advances the position only on success.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    #[inline]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    pub fn read_u8(&mut self) -> BinaryResult<u8> {
        let byte = *self.data.get(self.pos).ok_or(BinaryError::InsufficientData {
            expected: self.pos + 1,
            available: self.data.len(),
        })?;
        self.pos += 1;
        Ok(byte)
    }

    pub fn read_u16(&mut self) -> BinaryResult<u16> {
        let value = read_u16_le(self.data, self.pos)?;
        self.pos += 2;
        Ok(value)
    }

    pub fn read_u32(&mut self) -> BinaryResult<u32> {
        let value = read_u32_le(self.data, self.pos)?;
        self.pos += 4;
        Ok(value)
    }

    pub fn read_bytes(&mut self, len: usize) -> BinaryResult<&'a [u8]> {
        if self.pos + len > self.data.len() {
            return Err(BinaryError::InsufficientData {
                expected: self.pos + len,
                available: self.data.len(),
            });
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    pub fn skip(&mut self, len: usize) -> BinaryResult<()> {
        self.read_bytes(len).map(|_| ())
    }

    /// Read an HWP length-prefixed string: a u16 character count followed by
    /// that many UTF-16LE code units.
    pub fn read_hwp_string(&mut self) -> BinaryResult<String> {
        let chars = self.read_u16()? as usize;
        let bytes = self.read_bytes(chars * 2)?;
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect();
        Ok(String::from_utf16_lossy(&units))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_out_of_bounds() {
        let data = [0x01, 0x02, 0x03];
        assert!(read_u32_le(&data, 0).is_err());
        assert!(matches!(
            read_u16_le(&data, 2),
            Err(BinaryError::InsufficientData { expected: 4, available: 3 })
        ));
    }

    #[test]
    fn test_cursor_sequential_reads() {
        let data = [0x01, 0x34, 0x12, 0x78, 0x56, 0x34, 0x12, 0xAA];
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(cursor.read_u8().unwrap(), 0x01);
        assert_eq!(cursor.read_u16().unwrap(), 0x1234);
        assert_eq!(cursor.read_u32().unwrap(), 0x12345678);
        assert_eq!(cursor.remaining(), 1);
        assert!(cursor.read_u16().is_err());
        // A failed read does not move the cursor
        assert_eq!(cursor.position(), 7);
    }

    #[test]
    fn test_hwp_string() {
        // len = 2, "가A"
        let data = [0x02, 0x00, 0x00, 0xAC, 0x41, 0x00];
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(cursor.read_hwp_string().unwrap(), "가A");
    }

    #[test]
    fn test_utf16_stops_at_nul() {
        let data = [0x41, 0x00, 0x00, 0x00, 0x42, 0x00];
        assert_eq!(parse_utf16le_string(&data), "A");
    }
}

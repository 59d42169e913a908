use crate::common::error::{FormatError, Result};

/// Internal trait for serializing fixed-size data structures to bytes.
///
/// Every fixed-width field on the wire is little-endian.
pub(crate) trait Serializable<const N: usize>: Sized {
    /// Convert this value to a fixed-size byte array.
    fn to_bytes(&self) -> [u8; N];

    /// Reconstruct this value from a fixed-size byte array.
    fn from_bytes(data: [u8; N]) -> Self;
}

impl Serializable<4> for i32 {
    fn to_bytes(&self) -> [u8; 4] {
        self.to_le_bytes()
    }

    fn from_bytes(data: [u8; 4]) -> Self {
        i32::from_le_bytes(data)
    }
}

impl Serializable<4> for u32 {
    fn to_bytes(&self) -> [u8; 4] {
        self.to_le_bytes()
    }

    fn from_bytes(data: [u8; 4]) -> Self {
        u32::from_le_bytes(data)
    }
}

/// Appends a fixed-width field to `out`.
pub(crate) fn write_fixed<T: Serializable<N>, const N: usize>(value: T, out: &mut Vec<u8>) {
    out.extend_from_slice(&value.to_bytes());
}

/// Reads a fixed-width field at `offset`, returning it with the offset just past it.
pub(crate) fn read_fixed<T: Serializable<N>, const N: usize>(
    bytes: &[u8],
    offset: usize,
) -> Result<(T, usize)> {
    let end = take(bytes, offset, N)?;
    let mut raw = [0u8; N];
    raw.copy_from_slice(&bytes[offset..end]);
    Ok((T::from_bytes(raw), end))
}

/// Checks that `len` bytes are available at `offset` and returns the end offset.
pub(crate) fn take(bytes: &[u8], offset: usize, len: usize) -> Result<usize> {
    match offset.checked_add(len) {
        Some(end) if end <= bytes.len() => Ok(end),
        _ => Err(FormatError::TruncatedBuffer {
            offset,
            needed: len,
            available: bytes.len().saturating_sub(offset),
        }
        .into()),
    }
}

/// Appends a `u32` length prefix followed by the raw bytes.
pub(crate) fn write_prefixed(data: &[u8], out: &mut Vec<u8>) {
    // Callers bound `data` by a configured max that fits in u32.
    write_fixed(data.len() as u32, out);
    out.extend_from_slice(data);
}

/// Reads a `u32` length prefix, rejecting lengths above `max`, then the
/// UTF-8 payload that follows it.
pub(crate) fn read_prefixed_str(
    bytes: &[u8],
    offset: usize,
    max: Option<usize>,
) -> Result<(String, usize)> {
    let (length, start) = read_fixed::<u32, 4>(bytes, offset)?;
    let length = length as usize;

    if let Some(max) = max.filter(|&max| length > max) {
        return Err(FormatError::CorruptLength { length, max }.into());
    }

    let end = take(bytes, start, length)?;
    let text = std::str::from_utf8(&bytes[start..end])
        .map_err(|_| FormatError::DecodeUtf8(start))?;

    Ok((text.to_owned(), end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DatabaseError;

    #[test]
    fn test_fixed_fields_are_little_endian() {
        let mut out = Vec::new();
        write_fixed(1i32, &mut out);
        write_fixed(0x0102_0304u32, &mut out);
        assert_eq!(out, vec![1, 0, 0, 0, 4, 3, 2, 1]);

        let (first, offset) = read_fixed::<i32, 4>(&out, 0).unwrap();
        let (second, offset) = read_fixed::<u32, 4>(&out, offset).unwrap();
        assert_eq!((first, second, offset), (1, 0x0102_0304, 8));
    }

    #[test]
    fn test_read_fixed_truncated() {
        let result = read_fixed::<i32, 4>(&[1, 2, 3], 0);
        assert!(matches!(
            result,
            Err(DatabaseError::Format(FormatError::TruncatedBuffer {
                offset: 0,
                needed: 4,
                available: 3
            }))
        ));
    }

    #[test]
    fn test_prefixed_str_checks_max_before_payload() {
        let mut out = Vec::new();
        write_prefixed(b"hello", &mut out);

        let (text, end) = read_prefixed_str(&out, 0, Some(5)).unwrap();
        assert_eq!((text.as_str(), end), ("hello", 9));

        let result = read_prefixed_str(&out, 0, Some(4));
        assert!(matches!(
            result,
            Err(DatabaseError::Format(FormatError::CorruptLength {
                length: 5,
                max: 4
            }))
        ));
    }

    #[test]
    fn test_prefixed_str_truncated_payload() {
        let mut out = Vec::new();
        write_fixed(10u32, &mut out);
        out.extend_from_slice(b"abc");

        let result = read_prefixed_str(&out, 0, None);
        assert!(matches!(
            result,
            Err(DatabaseError::Format(FormatError::TruncatedBuffer { .. }))
        ));
    }

    #[test]
    fn test_prefixed_str_invalid_utf8() {
        let mut out = Vec::new();
        write_prefixed(&[0xff, 0xfe], &mut out);

        let result = read_prefixed_str(&out, 0, None);
        assert!(matches!(
            result,
            Err(DatabaseError::Format(FormatError::DecodeUtf8(4)))
        ));
    }
}

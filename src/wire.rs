//! Network-order primitives shared by every codec in the crate.
//!
//! The free functions operate on fixed-size windows and cannot fail. The
//! [`Reader`] cursor layers bounds checks on top of them so that lengths and
//! counts taken from the wire never index past the end of the input.

use bytes::Buf;

use crate::DecodeError;

pub fn read_i16(bytes: &[u8; 2]) -> i16 {
    i16::from_be_bytes(*bytes)
}

pub fn read_i32(bytes: &[u8; 4]) -> i32 {
    i32::from_be_bytes(*bytes)
}

pub fn read_i64(bytes: &[u8; 8]) -> i64 {
    i64::from_be_bytes(*bytes)
}

pub fn write_i16(dest: &mut [u8; 2], value: i16) {
    *dest = value.to_be_bytes();
}

pub fn write_i32(dest: &mut [u8; 4], value: i32) {
    *dest = value.to_be_bytes();
}

pub fn write_i64(dest: &mut [u8; 8], value: i64) {
    *dest = value.to_be_bytes();
}

/// The pair of sentinel bytes a boolean field is transmitted as.
///
/// The replication envelope uses raw `1`/`0`; some fields use the ASCII
/// characters `'1'`/`'0'`. The encoding is a property of the field, so it is
/// chosen by the caller rather than guessed from the byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolEncoding {
    Numeric,
    Ascii,
}

impl BoolEncoding {
    fn sentinels(self) -> (u8, u8) {
        match self {
            BoolEncoding::Numeric => (1, 0),
            BoolEncoding::Ascii => (b'1', b'0'),
        }
    }
}

pub fn read_bool(byte: u8, encoding: BoolEncoding) -> Result<bool, DecodeError> {
    let (true_byte, false_byte) = encoding.sentinels();
    if byte == true_byte {
        Ok(true)
    } else if byte == false_byte {
        Ok(false)
    } else {
        Err(DecodeError::InvalidBoolean(byte))
    }
}

pub fn write_bool(dest: &mut u8, value: bool, encoding: BoolEncoding) {
    let (true_byte, false_byte) = encoding.sentinels();
    *dest = if value { true_byte } else { false_byte };
}

/// Bounds-checked forward cursor over a borrowed buffer.
///
/// Every read either consumes exactly the bytes it reports or fails with
/// [`DecodeError::Truncated`] and leaves the cursor where it was.
#[derive(Debug, Clone, Copy)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// The unread tail of the buffer.
    pub fn rest(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    fn ensure(&self, needed: usize) -> Result<(), DecodeError> {
        if needed > self.remaining() {
            return Err(DecodeError::Truncated {
                needed,
                remaining: self.remaining(),
            });
        }
        Ok(())
    }

    pub fn advance(&mut self, count: usize) -> Result<(), DecodeError> {
        self.ensure(count)?;
        self.pos += count;
        Ok(())
    }

    pub fn peek_u8(&self) -> Option<u8> {
        self.rest().first().copied()
    }

    pub fn u8(&mut self) -> Result<u8, DecodeError> {
        self.ensure(1)?;
        let mut chunk = self.rest();
        let value = chunk.get_u8();
        self.pos += 1;
        Ok(value)
    }

    pub fn i8(&mut self) -> Result<i8, DecodeError> {
        self.u8().map(|b| b as i8)
    }

    pub fn i16(&mut self) -> Result<i16, DecodeError> {
        Ok(read_i16(&self.array()?))
    }

    pub fn i32(&mut self) -> Result<i32, DecodeError> {
        Ok(read_i32(&self.array()?))
    }

    pub fn u32(&mut self) -> Result<u32, DecodeError> {
        self.i32().map(|v| v as u32)
    }

    pub fn i64(&mut self) -> Result<i64, DecodeError> {
        Ok(read_i64(&self.array()?))
    }

    pub fn u64(&mut self) -> Result<u64, DecodeError> {
        self.i64().map(|v| v as u64)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        self.ensure(N)?;
        let mut out = [0u8; N];
        let mut chunk = self.rest();
        chunk.copy_to_slice(&mut out);
        self.pos += N;
        Ok(out)
    }

    pub fn bytes(&mut self, count: usize) -> Result<&'a [u8], DecodeError> {
        self.ensure(count)?;
        let slice = &self.buf[self.pos..self.pos + count];
        self.pos += count;
        Ok(slice)
    }

    /// Reads a NUL-terminated byte string, consuming the terminator.
    ///
    /// The returned slice excludes the NUL. A missing terminator is reported
    /// as truncation, never as a read past the buffer.
    pub fn cstr_bytes(&mut self) -> Result<&'a [u8], DecodeError> {
        let rest = self.rest();
        match rest.iter().position(|&b| b == 0) {
            Some(len) => {
                self.pos += len + 1;
                Ok(&rest[..len])
            }
            None => Err(DecodeError::Truncated {
                needed: rest.len() + 1,
                remaining: rest.len(),
            }),
        }
    }

    pub fn cstr(&mut self, field: &'static str) -> Result<String, DecodeError> {
        let mark = self.pos;
        let raw = self.cstr_bytes()?;
        match std::str::from_utf8(raw) {
            Ok(s) => Ok(s.to_owned()),
            Err(_) => {
                self.pos = mark;
                Err(DecodeError::InvalidUtf8 { field })
            }
        }
    }

    /// Reads a signed 32-bit length and rejects negative values.
    pub fn length(&mut self, field: &'static str) -> Result<usize, DecodeError> {
        let mark = self.pos;
        let value = self.i32()?;
        if value < 0 {
            self.pos = mark;
            return Err(DecodeError::NegativeLength { field, value });
        }
        Ok(value as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integers_are_big_endian() {
        assert_eq!(read_i16(&[0x01, 0x02]), 0x0102);
        assert_eq!(read_i32(&[0xff, 0xff, 0xff, 0xfe]), -2);
        assert_eq!(read_i64(&[0, 0, 0, 0, 0, 0, 1, 0]), 256);

        let mut two = [0u8; 2];
        write_i16(&mut two, -1);
        assert_eq!(two, [0xff, 0xff]);

        let mut four = [0u8; 4];
        write_i32(&mut four, 0x0a0b0c0d);
        assert_eq!(four, [0x0a, 0x0b, 0x0c, 0x0d]);

        let mut eight = [0u8; 8];
        write_i64(&mut eight, i64::MIN);
        assert_eq!(eight, [0x80, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(read_i64(&eight), i64::MIN);
    }

    #[test]
    fn test_bool_sentinels_per_encoding() {
        assert_eq!(read_bool(1, BoolEncoding::Numeric), Ok(true));
        assert_eq!(read_bool(0, BoolEncoding::Numeric), Ok(false));
        assert_eq!(read_bool(b'1', BoolEncoding::Ascii), Ok(true));
        assert_eq!(read_bool(b'0', BoolEncoding::Ascii), Ok(false));

        assert_eq!(read_bool(2, BoolEncoding::Numeric), Err(DecodeError::InvalidBoolean(2)));
        assert_eq!(
            read_bool(b'1', BoolEncoding::Numeric),
            Err(DecodeError::InvalidBoolean(b'1'))
        );
        assert_eq!(read_bool(1, BoolEncoding::Ascii), Err(DecodeError::InvalidBoolean(1)));

        let mut byte = 0xaa;
        write_bool(&mut byte, true, BoolEncoding::Ascii);
        assert_eq!(byte, b'1');
        write_bool(&mut byte, false, BoolEncoding::Numeric);
        assert_eq!(byte, 0);
    }

    #[test]
    fn test_reader_tracks_position() {
        let data = [0, 0, 0, 7, b'a', b'b', 0, 0xff];
        let mut reader = Reader::new(&data);

        assert_eq!(reader.i32().unwrap(), 7);
        assert_eq!(reader.cstr("name").unwrap(), "ab");
        assert_eq!(reader.position(), 7);
        assert_eq!(reader.i8().unwrap(), -1);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_reader_rejects_overreads() {
        let data = [0, 1, 2];
        let mut reader = Reader::new(&data);

        assert_eq!(
            reader.i32(),
            Err(DecodeError::Truncated { needed: 4, remaining: 3 })
        );
        // a failed read leaves the cursor untouched
        assert_eq!(reader.position(), 0);
        assert!(reader.bytes(4).is_err());
        assert_eq!(reader.bytes(3).unwrap(), &[0, 1, 2]);
    }

    #[test]
    fn test_cstr_without_terminator_is_truncated() {
        let mut reader = Reader::new(b"public");
        assert_eq!(
            reader.cstr("namespace"),
            Err(DecodeError::Truncated { needed: 7, remaining: 6 })
        );
    }

    #[test]
    fn test_cstr_stops_at_first_nul() {
        let mut reader = Reader::new(b"pub\0lic\0");
        assert_eq!(reader.cstr("namespace").unwrap(), "pub");
        assert_eq!(reader.cstr("name").unwrap(), "lic");
    }

    #[test]
    fn test_cstr_rejects_invalid_utf8() {
        let mut reader = Reader::new(&[0xc3, 0x28, 0]);
        assert_eq!(
            reader.cstr("prefix"),
            Err(DecodeError::InvalidUtf8 { field: "prefix" })
        );
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_negative_length_is_rejected() {
        let data = (-1i32).to_be_bytes();
        let mut reader = Reader::new(&data);
        assert_eq!(
            reader.length("content length"),
            Err(DecodeError::NegativeLength { field: "content length", value: -1 })
        );
    }
}

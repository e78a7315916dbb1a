use std::io::{self, Cursor, Read};

use super::error::FormatError;

/// Read a single byte from the reader
pub fn read_u8(reader: &mut impl Read) -> io::Result<u8> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf)?;
    Ok(buf[0])
}

/// Read a 2-byte big-endian unsigned integer (SCID 4 byte order)
pub fn read_u16_be(reader: &mut impl Read) -> io::Result<u16> {
    let mut buf = [0u8; 2];
    reader.read_exact(&mut buf)?;
    Ok(u16::from_be_bytes(buf))
}

/// Read a 3-byte big-endian unsigned integer (SCID 4 byte order)
pub fn read_u24_be(reader: &mut impl Read) -> io::Result<u32> {
    let mut buf = [0u8; 3];
    reader.read_exact(&mut buf)?;
    Ok(((buf[0] as u32) << 16) | ((buf[1] as u32) << 8) | (buf[2] as u32))
}

/// Read a 4-byte big-endian unsigned integer (SCID 4 byte order)
pub fn read_u32_be(reader: &mut impl Read) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_be_bytes(buf))
}

/// Read a 4-byte little-endian unsigned integer (SCID 5 byte order)
pub fn read_u32_le(reader: &mut impl Read) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// Read exactly `len` raw bytes
pub fn read_bytes(reader: &mut impl Read, len: usize) -> io::Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

/// Read a fixed-length NUL-padded string field
pub fn read_string(reader: &mut impl Read, len: usize) -> io::Result<String> {
    let mut buf = read_bytes(reader, len)?;
    if let Some(null_pos) = buf.iter().position(|&b| b == 0) {
        buf.truncate(null_pos);
    }
    Ok(String::from_utf8_lossy(&buf).to_string())
}

/// Read an unsigned LEB128 variable-length integer (SCID 5 name file)
///
/// Seven payload bits per byte, least significant group first; the high bit
/// marks that another byte follows.
pub fn read_varint(reader: &mut impl Read) -> io::Result<u64> {
    let mut value = 0u64;
    let mut shift = 0u32;
    loop {
        let byte = read_u8(reader)?;
        if shift >= 64 {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "varint longer than 64 bits"));
        }
        value |= ((byte & 0x7F) as u64) << shift;
        if byte & 0x80 == 0 {
            return Ok(value);
        }
        shift += 7;
    }
}

/// Sequential reader over an in-memory SCID file.
///
/// Wraps the free readers above and turns a short read into
/// `FormatError::Truncated` carrying the offset of the failed field.
pub struct FieldReader<'a> {
    cursor: Cursor<&'a [u8]>,
    file: &'static str,
}

impl<'a> FieldReader<'a> {
    pub fn new(data: &'a [u8], file: &'static str) -> Self {
        FieldReader { cursor: Cursor::new(data), file }
    }

    pub fn position(&self) -> usize {
        self.cursor.position() as usize
    }

    pub fn set_position(&mut self, pos: usize) {
        self.cursor.set_position(pos as u64);
    }

    pub fn remaining(&self) -> usize {
        self.cursor.get_ref().len().saturating_sub(self.position())
    }

    fn field<T>(&mut self, read: impl FnOnce(&mut Cursor<&'a [u8]>) -> io::Result<T>) -> Result<T, FormatError> {
        let offset = self.position();
        read(&mut self.cursor).map_err(|_| FormatError::Truncated { file: self.file, offset })
    }

    pub fn u8(&mut self) -> Result<u8, FormatError> {
        self.field(|c| read_u8(c))
    }

    pub fn u16_be(&mut self) -> Result<u16, FormatError> {
        self.field(|c| read_u16_be(c))
    }

    pub fn u24_be(&mut self) -> Result<u32, FormatError> {
        self.field(|c| read_u24_be(c))
    }

    pub fn u32_be(&mut self) -> Result<u32, FormatError> {
        self.field(|c| read_u32_be(c))
    }

    pub fn u32_le(&mut self) -> Result<u32, FormatError> {
        self.field(|c| read_u32_le(c))
    }

    pub fn varint(&mut self) -> Result<u64, FormatError> {
        self.field(|c| read_varint(c))
    }

    pub fn bytes(&mut self, len: usize) -> Result<Vec<u8>, FormatError> {
        if len > self.remaining() {
            return Err(FormatError::Truncated { file: self.file, offset: self.position() });
        }
        self.field(|c| read_bytes(c, len))
    }

    pub fn string(&mut self, len: usize) -> Result<String, FormatError> {
        self.field(|c| read_string(c, len))
    }
}

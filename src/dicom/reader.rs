//! Cursor over an in-memory byte buffer

use crate::dicom::error::FormatError;
use crate::dicom::Tag;

/// Byte order used for multi-byte reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    Little,
    Big,
}

/// Read-only cursor. Endianness is chosen per call by the parser, never inferred.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
    /// Offset of `data[0]` in the original buffer, for error reporting
    base: usize,
}

macro_rules! read_primitive {
    ($name:ident, $ty:ty) => {
        #[inline]
        pub fn $name(&mut self, endian: Endianness) -> Result<$ty, FormatError> {
            let bytes = self.read_array::<{ std::mem::size_of::<$ty>() }>()?;
            Ok(match endian {
                Endianness::Little => <$ty>::from_le_bytes(bytes),
                Endianness::Big => <$ty>::from_be_bytes(bytes),
            })
        }
    };
}

impl<'a> ByteReader<'a> {
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0, base: 0 }
    }

    /// Absolute offset of the cursor in the original buffer
    #[inline]
    #[must_use]
    pub fn position(&self) -> usize {
        self.base + self.pos
    }

    #[inline]
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    #[inline]
    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn ensure(&self, needed: usize) -> Result<(), FormatError> {
        if self.remaining() < needed {
            return Err(FormatError::TruncatedData {
                offset: self.position(),
                needed,
                available: self.remaining(),
            });
        }
        Ok(())
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], FormatError> {
        self.ensure(n)?;
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], FormatError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn skip(&mut self, n: usize) -> Result<(), FormatError> {
        self.read_bytes(n).map(|_| ())
    }

    read_primitive!(read_u16, u16);
    read_primitive!(read_i16, i16);
    read_primitive!(read_u32, u32);
    read_primitive!(read_i32, i32);
    read_primitive!(read_u64, u64);
    read_primitive!(read_i64, i64);
    read_primitive!(read_f32, f32);
    read_primitive!(read_f64, f64);

    pub fn read_tag(&mut self, endian: Endianness) -> Result<Tag, FormatError> {
        let group = self.read_u16(endian)?;
        let element = self.read_u16(endian)?;
        Ok(Tag(group, element))
    }

    /// Look at the next tag without consuming it
    pub fn peek_tag(&self, endian: Endianness) -> Result<Tag, FormatError> {
        self.clone().read_tag(endian)
    }

    /// Split off the next `n` bytes as an independent reader and advance past them
    pub fn sub_reader(&mut self, n: usize) -> Result<ByteReader<'a>, FormatError> {
        let base = self.position();
        let data = self.read_bytes(n)?;
        Ok(ByteReader { data, pos: 0, base })
    }
}

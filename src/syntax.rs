//! Syntactical layer of a MagicaVoxel file: a bounds-checked cursor over the raw bytes and the
//! framing of chunks, strings, dictionaries and arrays.
//!
//! All integers are little-endian. Nothing here allocates except [`Dict`], which copies its
//! keys and values out of the buffer.
use std::fmt::{self, Formatter};

use indexmap::IndexMap;
use nom::{
    bytes::complete::take,
    combinator::map,
    multi::length_data,
    number::complete::{le_i32, le_u32},
    IResult,
};

use crate::error::VoxError;

pub const MAGIC_PREFIX: ChunkTag = ChunkTag(*b"VOX ");

/// Size of a chunk header: tag, content size, children size.
pub const CHUNK_HEADER_LEN: usize = 12;

/// Attribute dictionary of a chunk. Later duplicate keys overwrite earlier ones.
pub type Dict = IndexMap<String, String>;

/// Four ASCII bytes naming a chunk, not null-terminated.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkTag(pub [u8; 4]);

impl ChunkTag {
    pub const MAIN: Self = ChunkTag(*b"MAIN");
    pub const SIZE: Self = ChunkTag(*b"SIZE");
    pub const XYZI: Self = ChunkTag(*b"XYZI");
    pub const RGBA: Self = ChunkTag(*b"RGBA");
    pub const MATL: Self = ChunkTag(*b"MATL");
    pub const TRANSFORM: Self = ChunkTag(*b"nTRN");
    pub const GROUP: Self = ChunkTag(*b"nGRP");
    pub const SHAPE: Self = ChunkTag(*b"nSHP");
}

impl fmt::Debug for ChunkTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&String::from_utf8_lossy(&self.0), f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub tag: ChunkTag,
    /// Number of content bytes following the header.
    pub content_size: u32,
    /// Number of bytes of child chunks. Always zero in practice, never used for skipping.
    pub children_size: u32,
}

/// A view of a length-prefixed array of little-endian `u32`s, aliasing the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeU32Array<'a>(&'a [u8]);

impl<'a> LeU32Array<'a> {
    pub(crate) fn len(&self) -> usize {
        self.0.len() / 4
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + 'a {
        self.0
            .chunks_exact(4)
            .map(|bytes| u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

fn chunk_tag(i: &[u8]) -> IResult<&[u8], ChunkTag> {
    map(take(4usize), |bytes: &[u8]| {
        ChunkTag([bytes[0], bytes[1], bytes[2], bytes[3]])
    })(i)
}

fn string(i: &[u8]) -> IResult<&[u8], &[u8]> {
    length_data(le_u32)(i)
}

/// Sequential reader over an immutable byte buffer.
///
/// Every read either completes within the buffer or fails with [`VoxError::TruncatedData`],
/// leaving the cursor where it was.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    input: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Cursor { input: bytes, offset: 0 }
    }

    /// Byte offset from the start of the buffer.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub(crate) fn remaining(&self) -> usize {
        self.input.len()
    }

    pub fn is_at_end(&self) -> bool {
        self.remaining() == 0
    }

    fn run<T>(
        &mut self,
        reading: &'static str,
        mut parser: impl FnMut(&'a [u8]) -> IResult<&'a [u8], T>,
    ) -> Result<T, VoxError> {
        match parser(self.input) {
            Ok((rest, value)) => {
                self.offset += self.input.len() - rest.len();
                self.input = rest;
                Ok(value)
            }
            Err(_) => Err(VoxError::TruncatedData { offset: self.offset, reading }),
        }
    }

    pub fn read_u32(&mut self) -> Result<u32, VoxError> {
        self.run("u32", le_u32)
    }

    pub fn read_i32(&mut self) -> Result<i32, VoxError> {
        self.run("i32", le_i32)
    }

    pub fn read_tag(&mut self) -> Result<ChunkTag, VoxError> {
        self.run("chunk tag", chunk_tag)
    }

    pub fn read_chunk_header(&mut self) -> Result<ChunkHeader, VoxError> {
        let mut header = self.clone();
        let parsed = ChunkHeader {
            tag: header.read_tag()?,
            content_size: header.read_u32()?,
            children_size: header.read_u32()?,
        };
        *self = header;
        Ok(parsed)
    }

    /// Take exactly `len` bytes.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], VoxError> {
        self.run("bytes", take(len))
    }

    /// Length-prefixed raw string, not required to be valid UTF-8.
    pub fn read_string(&mut self) -> Result<&'a [u8], VoxError> {
        self.run("string", string)
    }

    pub fn read_dict(&mut self) -> Result<Dict, VoxError> {
        let mut dict_cursor = self.clone();
        let len = dict_cursor.read_u32()?;
        // no preallocation, the count comes straight from the file
        let mut dict = Dict::new();
        for _ in 0..len {
            let key = dict_cursor.read_string()?;
            let value = dict_cursor.read_string()?;
            dict.insert(
                String::from_utf8_lossy(key).into_owned(),
                String::from_utf8_lossy(value).into_owned(),
            );
        }
        *self = dict_cursor;
        Ok(dict)
    }

    /// Length-prefixed array of 4-byte little-endian values.
    pub fn read_u32_array(&mut self) -> Result<LeU32Array<'a>, VoxError> {
        let mut array_cursor = self.clone();
        let count = array_cursor.read_u32()?;
        let byte_len = (count as usize).checked_mul(4).ok_or(VoxError::TruncatedData {
            offset: array_cursor.offset,
            reading: "array",
        })?;
        let bytes = array_cursor.run("array", take(byte_len))?;
        *self = array_cursor;
        Ok(LeU32Array(bytes))
    }

    pub fn skip(&mut self, len: usize) -> Result<(), VoxError> {
        self.read_bytes(len).map(drop)
    }
}

//! Header parsing and linear record scan.
//!
//! Buffer layout (LE):
//!   total_len[4]   = whole buffer, these four bytes included
//!   tag_len[2]
//!   tag[tag_len]
//!   attr_num[2]
//!   records        = see `codec`
//!
//! There is no index: every lookup walks the records in buffer order and the first
//! byte-exact key match wins. The walk steps over payloads by their width or length
//! prefix; only the matching record is decoded.

use crate::codec::{read_payload, AttrValueRef};
use crate::consts::{AttrType, HDR_FIXED_SIZE, LONG_LEN_SIZE, SHORT_LEN_SIZE, TOTAL_LEN_SIZE};
use crate::errors::{AttrError, Result};
use crate::utils::{get_u16, get_u32, read_u16, read_u32, read_u8, take};

#[derive(Debug, Clone, Copy)]
pub struct Header<'a> {
    pub total_len: u32,
    pub tag: &'a [u8],
    pub attr_num: u16,
    /// Offset of the attribute count field.
    pub attr_num_off: usize,
    /// Offset of the first record.
    pub records_off: usize,
}

impl<'a> Header<'a> {
    pub fn read(buf: &'a [u8]) -> Result<Self> {
        let mut cur = buf;
        let total_len = read_u32(&mut cur)?;
        let tag_len = read_u16(&mut cur)? as usize;
        let tag = take(&mut cur, tag_len)?;
        let attr_num = read_u16(&mut cur)?;
        let attr_num_off = TOTAL_LEN_SIZE + SHORT_LEN_SIZE + tag_len;
        Ok(Self {
            total_len,
            tag,
            attr_num,
            attr_num_off,
            records_off: attr_num_off + SHORT_LEN_SIZE,
        })
    }
}

/// One attribute record located inside a buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Record<'a> {
    pub offset: usize,
    pub len: usize,
    pub key: &'a [u8],
    pub ty: AttrType,
    /// Encoded payload, length prefix included for string and bytearray.
    pub payload: &'a [u8],
}

impl<'a> Record<'a> {
    pub fn attr_type(&self) -> AttrType {
        self.ty
    }

    /// Decodes the payload. Fails only on a string that is not UTF-8.
    pub fn value(&self) -> Result<AttrValueRef<'a>> {
        let mut cur = self.payload;
        read_payload(self.ty, &mut cur)
    }

    /// Offset of the type tag byte; the payload follows it.
    pub fn type_offset(&self) -> usize {
        self.offset + SHORT_LEN_SIZE + self.key.len()
    }

    pub fn end(&self) -> usize {
        self.offset + self.len
    }
}

/// Reads the record starting at `offset`, bounded by the end of `buf`.
pub fn read_record(buf: &[u8], offset: usize) -> Result<Record<'_>> {
    let mut cur = buf.get(offset..).ok_or(AttrError::Truncated)?;
    let start_len = cur.len();
    let key_len = read_u16(&mut cur)? as usize;
    let key = take(&mut cur, key_len)?;
    let raw = read_u8(&mut cur)?;
    let ty = AttrType::from_u8(raw).ok_or(AttrError::UnknownType(raw))?;
    let width = payload_width(ty, cur)?;
    let payload = take(&mut cur, width)?;
    Ok(Record { offset, len: start_len - cur.len(), key, ty, payload })
}

fn payload_width(ty: AttrType, cur: &[u8]) -> Result<usize> {
    if let Some(n) = ty.fixed_size() { return Ok(n); }
    match ty {
        AttrType::String if cur.len() >= SHORT_LEN_SIZE => Ok(SHORT_LEN_SIZE + get_u16(cur, 0) as usize),
        AttrType::ByteArray if cur.len() >= LONG_LEN_SIZE => Ok(LONG_LEN_SIZE + get_u32(cur, 0) as usize),
        _ => Err(AttrError::Truncated),
    }
}

/// Iterates the records of a well-formed buffer. Stops early on malformed input.
pub struct RecordIter<'a> {
    buf: &'a [u8],
    pos: usize,
    remaining: u16,
}

impl<'a> RecordIter<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        match Header::read(buf) {
            Ok(h) => Self { buf, pos: h.records_off, remaining: h.attr_num },
            Err(_) => Self { buf, pos: 0, remaining: 0 },
        }
    }
}

impl<'a> Iterator for RecordIter<'a> {
    type Item = Record<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 { return None; }
        match read_record(self.buf, self.pos) {
            Ok(rec) => {
                self.pos = rec.end();
                self.remaining -= 1;
                Some(rec)
            }
            Err(_) => {
                self.remaining = 0;
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining as usize))
    }
}

pub fn find<'a>(buf: &'a [u8], key: &[u8]) -> Option<Record<'a>> {
    RecordIter::new(buf).find(|r| r.key == key)
}

/// Checks `bytes` holds a complete container and returns the encoded length.
/// Bytes past the length field's value are not inspected.
pub fn validate(bytes: &[u8]) -> Result<usize> {
    if bytes.len() < HDR_FIXED_SIZE { return Err(AttrError::Truncated); }
    let total = get_u32(bytes, 0) as usize;
    if total < HDR_FIXED_SIZE { return Err(AttrError::Corrupt("length field smaller than header")); }
    if bytes.len() < total { return Err(AttrError::Truncated); }
    let buf = &bytes[..total];
    let hdr = Header::read(buf).map_err(|_| AttrError::Corrupt("tag overruns buffer"))?;
    let mut pos = hdr.records_off;
    for _ in 0..hdr.attr_num {
        let rec = read_record(buf, pos).map_err(|e| match e {
            AttrError::Truncated => AttrError::Corrupt("attribute overruns buffer"),
            other => other,
        })?;
        rec.value()?;
        pos = rec.end();
    }
    if pos != total { return Err(AttrError::Corrupt("trailing bytes after last attribute")); }
    Ok(total)
}

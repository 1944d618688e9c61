//! Little-endian field access over the container buffer.
//!
//! Readers take a cursor (`&mut &[u8]`) and map short input to [`AttrError::Truncated`];
//! writers patch a fixed offset of an already sized buffer.

use crate::errors::{AttrError, Result};
use byteorder::{ByteOrder, LittleEndian as LE, ReadBytesExt};
use std::io;

pub(crate) fn eof(e: io::Error) -> AttrError {
    if e.kind() == io::ErrorKind::UnexpectedEof { AttrError::Truncated } else { AttrError::Io(e) }
}

pub fn read_u8(r: &mut &[u8]) -> Result<u8> { r.read_u8().map_err(eof) }
pub fn read_u16(r: &mut &[u8]) -> Result<u16> { r.read_u16::<LE>().map_err(eof) }
pub fn read_u32(r: &mut &[u8]) -> Result<u32> { r.read_u32::<LE>().map_err(eof) }

/// Split `n` bytes off the front of the cursor.
pub fn take<'a>(r: &mut &'a [u8], n: usize) -> Result<&'a [u8]> {
    if r.len() < n { return Err(AttrError::Truncated); }
    let whole: &'a [u8] = *r;
    let (head, tail) = whole.split_at(n);
    *r = tail;
    Ok(head)
}

#[inline]
pub fn get_u16(buf: &[u8], off: usize) -> u16 { LE::read_u16(&buf[off..off + 2]) }
#[inline]
pub fn get_u32(buf: &[u8], off: usize) -> u32 { LE::read_u32(&buf[off..off + 4]) }
#[inline]
pub fn put_u16(buf: &mut [u8], off: usize, v: u16) { LE::write_u16(&mut buf[off..off + 2], v) }
#[inline]
pub fn put_u32(buf: &mut [u8], off: usize, v: u32) { LE::write_u32(&mut buf[off..off + 4], v) }

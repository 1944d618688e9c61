//! Owned attribute container.
//!
//! The whole container lives in one buffer laid out as described in `lookup`; the
//! buffer's length is always the encoded length, so serializing is a plain copy.
//! Setters rewrite records in place when the encoded size is unchanged, and otherwise
//! compact the old record away and append the new one at the end.

use crate::alloc::{BufferAllocator, SystemAllocator};
use crate::codec::{check_key, record_size, write_record, AttrValueRef};
use crate::config::ContainerConfig;
use crate::consts::{
    FLAGS_SIZE, HDR_FIXED_SIZE, MAX_ATTR_NUM, MAX_TAG_LEN, MAX_TOTAL_LEN, SHORT_LEN_SIZE,
    TOTAL_LEN_SIZE, TYPE_TAG_SIZE,
};
use crate::errors::{AttrError, Result};
use crate::flags::{Flags, StorageMode};
use crate::lookup;
use crate::read::AttrRead;
use crate::utils::{get_u16, put_u16, put_u32};
use std::fmt;
use tracing::{debug, trace};

pub struct AttrContainer<A: BufferAllocator = SystemAllocator> {
    flags: Flags,
    buf: Vec<u8>,
    alloc: A,
    config: ContainerConfig,
}

/// A rejected consuming set: the container comes back unchanged with the reason.
pub struct SetError<A: BufferAllocator = SystemAllocator> {
    pub container: AttrContainer<A>,
    pub error: AttrError,
}

impl AttrContainer<SystemAllocator> {
    /// Empty mutable container holding only `tag`.
    pub fn create(tag: impl AsRef<[u8]>) -> Result<Self> {
        Self::create_in(tag, SystemAllocator, ContainerConfig::default())
    }

    /// Empty readonly container.
    pub fn constant(tag: impl AsRef<[u8]>) -> Result<Self> {
        Ok(Self::create(tag)?.freeze())
    }

    /// Loads serialized bytes into a mutable container.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        Self::parse_in(bytes, SystemAllocator, ContainerConfig::default(), Flags::mutable())
    }

    /// Loads serialized bytes into a readonly container.
    pub fn parse_constant(bytes: &[u8]) -> Result<Self> {
        Self::parse_in(bytes, SystemAllocator, ContainerConfig::default(), Flags::constant())
    }

    /// Loads `[flags0, flags1] ++ buffer`, honouring the readonly bit.
    pub fn parse_flagged(bytes: &[u8]) -> Result<Self> {
        let flags = split_flags(bytes)?;
        Self::parse_in(&bytes[FLAGS_SIZE..], SystemAllocator, ContainerConfig::default(), flags)
    }
}

pub(crate) fn split_flags(bytes: &[u8]) -> Result<Flags> {
    if bytes.len() < FLAGS_SIZE { return Err(AttrError::Truncated); }
    Flags::from_wire([bytes[0], bytes[1]])
}

impl<A: BufferAllocator> AttrContainer<A> {
    pub fn create_in(tag: impl AsRef<[u8]>, alloc: A, config: ContainerConfig) -> Result<Self> {
        let tag = tag.as_ref();
        if tag.len() > MAX_TAG_LEN { return Err(AttrError::TagTooLong(tag.len())); }
        let len = HDR_FIXED_SIZE + tag.len();
        let cap = len.max(config.initial_capacity);
        let mut buf = alloc.allocate(cap).ok_or(AttrError::Alloc { requested: cap })?;
        buf.extend_from_slice(&(len as u32).to_le_bytes());
        buf.extend_from_slice(&(tag.len() as u16).to_le_bytes());
        buf.extend_from_slice(tag);
        buf.extend_from_slice(&0u16.to_le_bytes());
        debug!(tag = %String::from_utf8_lossy(tag), len, cap, "attr container created");
        Ok(Self { flags: Flags::mutable(), buf, alloc, config })
    }

    pub fn parse_in(bytes: &[u8], alloc: A, config: ContainerConfig, flags: Flags) -> Result<Self> {
        if flags.storage != StorageMode::Buffer { return Err(AttrError::Unsupported); }
        let total = lookup::validate(bytes)?;
        let cap = total.max(config.initial_capacity);
        let mut buf = alloc.allocate(cap).ok_or(AttrError::Alloc { requested: cap })?;
        buf.extend_from_slice(&bytes[..total]);
        trace!(len = total, readonly = flags.readonly, "attr container parsed");
        Ok(Self { flags, buf, alloc, config })
    }

    /// Releases the buffer through the allocator.
    pub fn destroy(self) {
        drop(self);
    }

    /// Marks the container readonly. There is no way back.
    pub fn freeze(mut self) -> Self {
        self.flags.readonly = true;
        self
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// `[flags0, flags1] ++ buffer`.
    pub fn to_flagged_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(FLAGS_SIZE + self.buf.len());
        out.extend_from_slice(&self.flags.to_wire());
        out.extend_from_slice(&self.buf);
        out
    }

    fn attr_num_off(&self) -> usize {
        TOTAL_LEN_SIZE + SHORT_LEN_SIZE + get_u16(&self.buf, TOTAL_LEN_SIZE) as usize
    }

    /// Makes room for a buffer of `needed` bytes. Leaves the buffer untouched on failure.
    fn reserve_total(&mut self, needed: usize) -> Result<()> {
        if needed > MAX_TOTAL_LEN { return Err(AttrError::BufferTooLarge(needed)); }
        let cap = self.buf.capacity();
        if needed <= cap { return Ok(()); }
        let target = self.config.grow_to(cap, needed);
        let before = self.buf.as_ptr();
        if !self.alloc.reallocate(&mut self.buf, target) {
            // amortized target refused; settle for the exact size
            if target == needed || !self.alloc.reallocate(&mut self.buf, needed) {
                debug!(needed, target, "attr container growth failed");
                return Err(AttrError::Alloc { requested: target });
            }
        }
        trace!(
            old_cap = cap,
            new_cap = self.buf.capacity(),
            relocated = before != self.buf.as_ptr(),
            "attr container grown"
        );
        Ok(())
    }

    /// Sets `key` to `value`, replacing any existing record with that key.
    ///
    /// Same encoded size: payload and type rewritten in place. Different size: the old
    /// record is removed and the new one appended. New key: appended, count + 1.
    pub fn set<'v>(&mut self, key: impl AsRef<[u8]>, value: impl Into<AttrValueRef<'v>>) -> Result<()> {
        let key = key.as_ref();
        let value = value.into();
        if self.flags.readonly {
            debug!(key = %String::from_utf8_lossy(key), "set on readonly attr container");
            return Err(AttrError::ReadOnly);
        }
        check_key(key)?;
        value.check_len()?;

        let rec_size = record_size(key, &value);
        let total = self.buf.len();
        match lookup::find(&self.buf, key).map(|r| (r.offset, r.len)) {
            Some((off, len)) if len == rec_size => {
                let ty_off = off + SHORT_LEN_SIZE + key.len();
                self.buf[ty_off] = value.attr_type() as u8;
                let mut dst = &mut self.buf[ty_off + TYPE_TAG_SIZE..off + len];
                value.write_payload(&mut dst)?;
            }
            Some((off, len)) => {
                self.reserve_total(total - len + rec_size)?;
                self.buf.drain(off..off + len);
                write_record(&mut self.buf, key, &value)?;
            }
            None => {
                let num_off = self.attr_num_off();
                let num = get_u16(&self.buf, num_off);
                if num == MAX_ATTR_NUM { return Err(AttrError::TooManyAttributes); }
                self.reserve_total(total + rec_size)?;
                write_record(&mut self.buf, key, &value)?;
                put_u16(&mut self.buf, num_off, num + 1);
            }
        }
        let len = self.buf.len() as u32;
        put_u32(&mut self.buf, 0, len);
        Ok(())
    }

    /// Consuming form of [`AttrContainer::set`]; a rejected set hands the container back.
    pub fn with<'v>(
        mut self,
        key: impl AsRef<[u8]>,
        value: impl Into<AttrValueRef<'v>>,
    ) -> std::result::Result<Self, SetError<A>> {
        match self.set(key, value) {
            Ok(()) => Ok(self),
            Err(error) => Err(SetError { container: self, error }),
        }
    }

    pub fn set_short(&mut self, key: impl AsRef<[u8]>, value: i16) -> Result<()> {
        self.set(key, AttrValueRef::Short(value))
    }

    pub fn set_int(&mut self, key: impl AsRef<[u8]>, value: i32) -> Result<()> {
        self.set(key, AttrValueRef::Int(value))
    }

    pub fn set_int64(&mut self, key: impl AsRef<[u8]>, value: i64) -> Result<()> {
        self.set(key, AttrValueRef::Int64(value))
    }

    pub fn set_byte(&mut self, key: impl AsRef<[u8]>, value: i8) -> Result<()> {
        self.set(key, AttrValueRef::Byte(value))
    }

    pub fn set_uint16(&mut self, key: impl AsRef<[u8]>, value: u16) -> Result<()> {
        self.set(key, AttrValueRef::Uint16(value))
    }

    pub fn set_float(&mut self, key: impl AsRef<[u8]>, value: f32) -> Result<()> {
        self.set(key, AttrValueRef::Float(value))
    }

    pub fn set_double(&mut self, key: impl AsRef<[u8]>, value: f64) -> Result<()> {
        self.set(key, AttrValueRef::Double(value))
    }

    pub fn set_bool(&mut self, key: impl AsRef<[u8]>, value: bool) -> Result<()> {
        self.set(key, AttrValueRef::Bool(value))
    }

    pub fn set_string(&mut self, key: impl AsRef<[u8]>, value: &str) -> Result<()> {
        self.set(key, AttrValueRef::String(value))
    }

    pub fn set_bytearray(&mut self, key: impl AsRef<[u8]>, value: &[u8]) -> Result<()> {
        self.set(key, AttrValueRef::ByteArray(value))
    }
}

impl<A: BufferAllocator> AttrRead for AttrContainer<A> {
    fn encoded(&self) -> &[u8] {
        &self.buf
    }

    fn is_constant(&self) -> bool {
        self.flags.readonly
    }
}

impl<A: BufferAllocator> Drop for AttrContainer<A> {
    fn drop(&mut self) {
        self.alloc.release(std::mem::take(&mut self.buf));
    }
}

impl<A: BufferAllocator + Clone> Clone for AttrContainer<A> {
    fn clone(&self) -> Self {
        Self {
            flags: self.flags,
            buf: self.buf.clone(),
            alloc: self.alloc.clone(),
            config: self.config.clone(),
        }
    }
}

impl<A: BufferAllocator> fmt::Debug for AttrContainer<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttrContainer")
            .field("tag", &String::from_utf8_lossy(self.tag()))
            .field("attr_num", &self.attr_num())
            .field("len", &self.buf.len())
            .field("flags", &self.flags)
            .finish()
    }
}

impl<A: BufferAllocator> SetError<A> {
    pub fn into_parts(self) -> (AttrContainer<A>, AttrError) {
        (self.container, self.error)
    }
}

impl<A: BufferAllocator> fmt::Debug for SetError<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetError")
            .field("container", &self.container)
            .field("error", &self.error)
            .finish()
    }
}

impl<A: BufferAllocator> fmt::Display for SetError<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

impl<A: BufferAllocator> std::error::Error for SetError<A> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

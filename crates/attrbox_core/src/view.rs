//! Zero-copy readonly container over serialized bytes.

use crate::container::{split_flags, AttrContainer};
use crate::consts::FLAGS_SIZE;
use crate::errors::{AttrError, Result};
use crate::flags::StorageMode;
use crate::lookup;
use crate::read::AttrRead;

/// Borrows a serialized container. Always readonly.
#[derive(Debug, Clone, Copy)]
pub struct AttrView<'a> {
    buf: &'a [u8],
}

impl<'a> AttrView<'a> {
    /// Validates `bytes`; anything past the encoded length is ignored.
    pub fn new(bytes: &'a [u8]) -> Result<Self> {
        let total = lookup::validate(bytes)?;
        Ok(Self { buf: &bytes[..total] })
    }

    /// Reads the flagged envelope. The readonly bit is irrelevant to a view.
    pub fn from_flagged(bytes: &'a [u8]) -> Result<Self> {
        let flags = split_flags(bytes)?;
        if flags.storage != StorageMode::Buffer { return Err(AttrError::Unsupported); }
        Self::new(&bytes[FLAGS_SIZE..])
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.buf
    }

    /// Mutable owned copy.
    pub fn to_container(&self) -> Result<AttrContainer> {
        AttrContainer::parse(self.buf)
    }
}

impl AttrRead for AttrView<'_> {
    fn encoded(&self) -> &[u8] {
        self.buf
    }

    fn is_constant(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_reads_what_container_wrote() {
        let mut c = AttrContainer::create("evt").unwrap();
        c.set_int("code", 404).unwrap();
        c.set_string("msg", "not found").unwrap();
        let bytes = c.to_bytes();

        let v = AttrView::new(&bytes).unwrap();
        assert!(v.is_constant());
        assert_eq!(v.tag(), b"evt");
        assert_eq!(v.attr_num(), 2);
        assert_eq!(v.get_as_int("code"), 404);
        assert_eq!(v.get_as_string("msg"), Some("not found"));
        assert_eq!(v.as_bytes(), &bytes[..]);
    }

    #[test]
    fn flagged_view_skips_prefix() {
        let mut c = AttrContainer::create("t").unwrap();
        c.set_bool("on", true).unwrap();
        let c = c.freeze();
        let env = c.to_flagged_bytes();
        assert_eq!(env[0], 0b100);
        let v = AttrView::from_flagged(&env).unwrap();
        assert!(v.get_as_bool("on"));
        assert!(matches!(AttrView::from_flagged(&[0b001, 0, 0, 0]), Err(AttrError::Unsupported)));
        assert!(matches!(AttrView::from_flagged(&[0]), Err(AttrError::Truncated)));
    }

    #[test]
    fn to_container_is_mutable() {
        let c = AttrContainer::constant("t").unwrap();
        let bytes = c.to_bytes();
        let mut owned = AttrView::new(&bytes).unwrap().to_container().unwrap();
        assert!(!owned.is_constant());
        owned.set_byte("b", -1).unwrap();
        assert_eq!(owned.get_as_byte("b"), -1);
    }
}

//! Read access shared by owned containers and borrowed views.

use crate::codec::AttrValueRef;
use crate::dump::Dump;
use crate::errors::{AttrError, Result};
use crate::lookup::{self, Header, RecordIter};
use crate::utils::get_u32;

macro_rules! scalar_getter {
    ($(#[$m:meta])* $name:ident, $conv:ident, $t:ty) => {
        $(#[$m])*
        fn $name<K: AsRef<[u8]>>(&self, key: K) -> $t {
            self.get(key).map(|v| v.$conv()).unwrap_or_default()
        }
    };
}

/// Lookup, typed getters and serialization over an encoded container.
///
/// Getters never fail: a missing key yields the type's zero value (`0`, `0.0`,
/// `false`, `None`). Use [`AttrRead::contains_key`] to tell "absent" from "zero".
pub trait AttrRead {
    /// The encoded container, exactly [`AttrRead::serialize_length`] bytes.
    fn encoded(&self) -> &[u8];

    fn is_constant(&self) -> bool;

    fn tag(&self) -> &[u8] {
        Header::read(self.encoded()).map(|h| h.tag).unwrap_or_default()
    }

    fn tag_str(&self) -> Option<&str> {
        std::str::from_utf8(self.tag()).ok()
    }

    fn attr_num(&self) -> u16 {
        Header::read(self.encoded()).map(|h| h.attr_num).unwrap_or(0)
    }

    fn serialize_length(&self) -> u32 {
        get_u32(self.encoded(), 0)
    }

    fn records(&self) -> RecordIter<'_> {
        RecordIter::new(self.encoded())
    }

    fn contains_key<K: AsRef<[u8]>>(&self, key: K) -> bool {
        lookup::find(self.encoded(), key.as_ref()).is_some()
    }

    /// The stored value with its stored type.
    fn get<K: AsRef<[u8]>>(&self, key: K) -> Option<AttrValueRef<'_>> {
        lookup::find(self.encoded(), key.as_ref()).and_then(|r| r.value().ok())
    }

    scalar_getter!(get_as_short, as_short, i16);
    scalar_getter!(get_as_int, as_int, i32);
    scalar_getter!(get_as_int64, as_int64, i64);
    scalar_getter!(get_as_byte, as_byte, i8);
    scalar_getter!(get_as_uint16, as_uint16, u16);
    scalar_getter!(get_as_float, as_float, f32);
    scalar_getter!(get_as_double, as_double, f64);
    scalar_getter!(get_as_bool, as_bool, bool);

    fn get_as_string<K: AsRef<[u8]>>(&self, key: K) -> Option<&str> {
        self.get(key).and_then(|v| v.as_str())
    }

    /// Payload bytes; the slice length is the stored length, zero bytes included.
    fn get_as_bytearray<K: AsRef<[u8]>>(&self, key: K) -> Option<&[u8]> {
        self.get(key).and_then(|v| v.as_bytes())
    }

    /// Copies the encoded bytes into the front of `dst` and returns how many were written.
    fn serialize(&self, dst: &mut [u8]) -> Result<usize> {
        let src = self.encoded();
        if dst.len() < src.len() {
            return Err(AttrError::DestinationTooSmall { needed: src.len(), available: dst.len() });
        }
        dst[..src.len()].copy_from_slice(src);
        Ok(src.len())
    }

    fn to_bytes(&self) -> Vec<u8> {
        self.encoded().to_vec()
    }

    fn dump(&self) -> Dump<'_, Self> {
        Dump(self)
    }
}

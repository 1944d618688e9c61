//! Field codec: attribute values and their record encoding.
//!
//! Record layout (LE):
//!   key_len[2]
//!   key[key_len]
//!   type[1]        = AttrType (1..=10)
//!   payload        = fixed width for scalars,
//!                    len[2] + bytes for string, len[4] + bytes for bytearray
//!
//! Accessors on [`AttrValueRef`] convert between types when the stored type differs from
//! the requested one; the stored payload is always decoded with its own width first.

use crate::consts::{
    AttrType, LONG_LEN_SIZE, MAX_BYTEARRAY_LEN, MAX_KEY_LEN, MAX_STRING_LEN, SHORT_LEN_SIZE,
    TYPE_TAG_SIZE,
};
use crate::errors::{AttrError, Result};
use crate::utils::{eof, take};
use byteorder::{LittleEndian as LE, ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;

/// A decoded attribute borrowing string and bytearray payloads from the buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttrValueRef<'a> {
    Short(i16),
    Int(i32),
    Int64(i64),
    Byte(i8),
    Uint16(u16),
    Float(f32),
    Double(f64),
    Bool(bool),
    String(&'a str),
    ByteArray(&'a [u8]),
}

/// Owned attribute value. Bytearrays serialize as hex strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum AttrValue {
    Short(i16),
    Int(i32),
    Int64(i64),
    Byte(i8),
    Uint16(u16),
    Float(f32),
    Double(f64),
    Bool(bool),
    String(String),
    ByteArray(#[serde(with = "hex_serde")] Vec<u8>),
}

mod hex_serde {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(b: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(b))
    }
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(d)?;
        hex::decode(s).map_err(D::Error::custom)
    }
}

macro_rules! numeric_accessor {
    ($(#[$m:meta])* $name:ident, $t:ty) => {
        $(#[$m])*
        pub fn $name(&self) -> $t {
            match *self {
                Self::Short(v) => v as $t,
                Self::Int(v) => v as $t,
                Self::Int64(v) => v as $t,
                Self::Byte(v) => v as $t,
                Self::Uint16(v) => v as $t,
                Self::Float(v) => v as $t,
                Self::Double(v) => v as $t,
                Self::Bool(v) => u8::from(v) as $t,
                Self::String(_) | Self::ByteArray(_) => 0 as $t,
            }
        }
    };
}

impl<'a> AttrValueRef<'a> {
    pub fn attr_type(&self) -> AttrType {
        match self {
            Self::Short(_) => AttrType::Short,
            Self::Int(_) => AttrType::Int,
            Self::Int64(_) => AttrType::Int64,
            Self::Byte(_) => AttrType::Byte,
            Self::Uint16(_) => AttrType::Uint16,
            Self::Float(_) => AttrType::Float,
            Self::Double(_) => AttrType::Double,
            Self::Bool(_) => AttrType::Bool,
            Self::String(_) => AttrType::String,
            Self::ByteArray(_) => AttrType::ByteArray,
        }
    }

    /// Encoded payload width, length prefix included.
    pub fn payload_len(&self) -> usize {
        match self {
            Self::String(s) => SHORT_LEN_SIZE + s.len(),
            Self::ByteArray(b) => LONG_LEN_SIZE + b.len(),
            other => other.attr_type().fixed_size().unwrap_or(0),
        }
    }

    /// Fails when a length prefix cannot represent the payload.
    pub fn check_len(&self) -> Result<()> {
        match self {
            Self::String(s) if s.len() > MAX_STRING_LEN => {
                Err(AttrError::ValueTooLong { kind: "string", len: s.len() })
            }
            Self::ByteArray(b) if b.len() > MAX_BYTEARRAY_LEN => {
                Err(AttrError::ValueTooLong { kind: "bytearray", len: b.len() })
            }
            _ => Ok(()),
        }
    }

    pub fn write_payload<W: Write>(&self, w: &mut W) -> Result<()> {
        match *self {
            Self::Short(v) => w.write_i16::<LE>(v)?,
            Self::Int(v) => w.write_i32::<LE>(v)?,
            Self::Int64(v) => w.write_i64::<LE>(v)?,
            Self::Byte(v) => w.write_i8(v)?,
            Self::Uint16(v) => w.write_u16::<LE>(v)?,
            Self::Float(v) => w.write_f32::<LE>(v)?,
            Self::Double(v) => w.write_f64::<LE>(v)?,
            Self::Bool(v) => w.write_u8(u8::from(v))?,
            Self::String(s) => {
                w.write_u16::<LE>(s.len() as u16)?;
                w.write_all(s.as_bytes())?;
            }
            Self::ByteArray(b) => {
                w.write_u32::<LE>(b.len() as u32)?;
                w.write_all(b)?;
            }
        }
        Ok(())
    }

    numeric_accessor!(as_short, i16);
    numeric_accessor!(as_int, i32);
    numeric_accessor!(as_int64, i64);
    numeric_accessor!(as_byte, i8);
    numeric_accessor!(as_uint16, u16);
    numeric_accessor!(as_float, f32);
    numeric_accessor!(as_double, f64);

    pub fn as_bool(&self) -> bool {
        match *self {
            Self::Short(v) => v != 0,
            Self::Int(v) => v != 0,
            Self::Int64(v) => v != 0,
            Self::Byte(v) => v != 0,
            Self::Uint16(v) => v != 0,
            Self::Float(v) => v != 0.0,
            Self::Double(v) => v != 0.0,
            Self::Bool(v) => v,
            Self::String(_) | Self::ByteArray(_) => false,
        }
    }

    /// String records, or bytearray records holding valid UTF-8.
    pub fn as_str(&self) -> Option<&'a str> {
        match *self {
            Self::String(s) => Some(s),
            Self::ByteArray(b) => std::str::from_utf8(b).ok(),
            _ => None,
        }
    }

    /// Raw payload of string and bytearray records, without length prefix.
    pub fn as_bytes(&self) -> Option<&'a [u8]> {
        match *self {
            Self::String(s) => Some(s.as_bytes()),
            Self::ByteArray(b) => Some(b),
            _ => None,
        }
    }

    pub fn to_owned_value(&self) -> AttrValue {
        match *self {
            Self::Short(v) => AttrValue::Short(v),
            Self::Int(v) => AttrValue::Int(v),
            Self::Int64(v) => AttrValue::Int64(v),
            Self::Byte(v) => AttrValue::Byte(v),
            Self::Uint16(v) => AttrValue::Uint16(v),
            Self::Float(v) => AttrValue::Float(v),
            Self::Double(v) => AttrValue::Double(v),
            Self::Bool(v) => AttrValue::Bool(v),
            Self::String(s) => AttrValue::String(s.to_owned()),
            Self::ByteArray(b) => AttrValue::ByteArray(b.to_vec()),
        }
    }
}

impl AttrValue {
    pub fn as_ref(&self) -> AttrValueRef<'_> {
        match self {
            Self::Short(v) => AttrValueRef::Short(*v),
            Self::Int(v) => AttrValueRef::Int(*v),
            Self::Int64(v) => AttrValueRef::Int64(*v),
            Self::Byte(v) => AttrValueRef::Byte(*v),
            Self::Uint16(v) => AttrValueRef::Uint16(*v),
            Self::Float(v) => AttrValueRef::Float(*v),
            Self::Double(v) => AttrValueRef::Double(*v),
            Self::Bool(v) => AttrValueRef::Bool(*v),
            Self::String(s) => AttrValueRef::String(s),
            Self::ByteArray(b) => AttrValueRef::ByteArray(b),
        }
    }

    pub fn attr_type(&self) -> AttrType {
        self.as_ref().attr_type()
    }
}

impl<'a> From<&'a AttrValue> for AttrValueRef<'a> {
    fn from(v: &'a AttrValue) -> Self {
        v.as_ref()
    }
}

impl<'a> From<&'a str> for AttrValueRef<'a> {
    fn from(s: &'a str) -> Self {
        Self::String(s)
    }
}

impl<'a> From<&'a [u8]> for AttrValueRef<'a> {
    fn from(b: &'a [u8]) -> Self {
        Self::ByteArray(b)
    }
}

impl fmt::Display for AttrValueRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Short(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::Byte(v) => write!(f, "{v}"),
            Self::Uint16(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::ByteArray(b) => write!(f, "[{}] {}", b.len(), hex::encode(b)),
        }
    }
}

/// Bytes a record for `key` holding `value` occupies.
#[inline]
pub fn record_size(key: &[u8], value: &AttrValueRef<'_>) -> usize {
    SHORT_LEN_SIZE + key.len() + TYPE_TAG_SIZE + value.payload_len()
}

pub fn check_key(key: &[u8]) -> Result<()> {
    if key.len() > MAX_KEY_LEN { Err(AttrError::KeyTooLong(key.len())) } else { Ok(()) }
}

pub fn write_record<W: Write>(w: &mut W, key: &[u8], value: &AttrValueRef<'_>) -> Result<()> {
    w.write_u16::<LE>(key.len() as u16)?;
    w.write_all(key)?;
    w.write_u8(value.attr_type() as u8)?;
    value.write_payload(w)
}

/// Decodes one payload of type `ty` from the front of the cursor.
pub fn read_payload<'a>(ty: AttrType, r: &mut &'a [u8]) -> Result<AttrValueRef<'a>> {
    Ok(match ty {
        AttrType::Short => AttrValueRef::Short(r.read_i16::<LE>().map_err(eof)?),
        AttrType::Int => AttrValueRef::Int(r.read_i32::<LE>().map_err(eof)?),
        AttrType::Int64 => AttrValueRef::Int64(r.read_i64::<LE>().map_err(eof)?),
        AttrType::Byte => AttrValueRef::Byte(r.read_i8().map_err(eof)?),
        AttrType::Uint16 => AttrValueRef::Uint16(r.read_u16::<LE>().map_err(eof)?),
        AttrType::Float => AttrValueRef::Float(r.read_f32::<LE>().map_err(eof)?),
        AttrType::Double => AttrValueRef::Double(r.read_f64::<LE>().map_err(eof)?),
        AttrType::Bool => AttrValueRef::Bool(r.read_u8().map_err(eof)? != 0),
        AttrType::String => {
            let n = r.read_u16::<LE>().map_err(eof)? as usize;
            let raw = take(r, n)?;
            let s = std::str::from_utf8(raw).map_err(|_| AttrError::Corrupt("string payload is not UTF-8"))?;
            AttrValueRef::String(s)
        }
        AttrType::ByteArray => {
            let n = r.read_u32::<LE>().map_err(eof)? as usize;
            AttrValueRef::ByteArray(take(r, n)?)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(key: &[u8], v: AttrValueRef<'_>) -> Vec<u8> {
        let mut out = Vec::new();
        write_record(&mut out, key, &v).unwrap();
        out
    }

    #[test]
    fn record_layout_int() {
        let rec = encode(b"code", AttrValueRef::Int(404));
        assert_eq!(rec.len(), record_size(b"code", &AttrValueRef::Int(404)));
        assert_eq!(&rec[..2], &[4, 0]);
        assert_eq!(&rec[2..6], b"code");
        assert_eq!(rec[6], AttrType::Int as u8);
        assert_eq!(&rec[7..], &404i32.to_le_bytes());
    }

    #[test]
    fn string_has_u16_prefix_and_no_terminator() {
        let v = AttrValueRef::String("hi");
        let rec = encode(b"k", v);
        assert_eq!(&rec[4..], &[2, 0, b'h', b'i']);
        assert_eq!(v.payload_len(), 4);
    }

    #[test]
    fn bytearray_keeps_zero_bytes() {
        let data = [0x00u8, 0xFF, 0x10];
        let v = AttrValueRef::ByteArray(&data);
        let mut out = Vec::new();
        v.write_payload(&mut out).unwrap();
        assert_eq!(out, [3, 0, 0, 0, 0x00, 0xFF, 0x10]);
        let mut cur: &[u8] = &out;
        assert_eq!(read_payload(AttrType::ByteArray, &mut cur).unwrap(), v);
        assert!(cur.is_empty());
    }

    #[test]
    fn floats_decode_bit_exact() {
        let f = f32::from_bits(0x7FC0_0001);
        let mut out = Vec::new();
        AttrValueRef::Float(f).write_payload(&mut out).unwrap();
        AttrValueRef::Double(-0.0).write_payload(&mut out).unwrap();
        let mut cur: &[u8] = &out;
        match read_payload(AttrType::Float, &mut cur).unwrap() {
            AttrValueRef::Float(g) => assert_eq!(g.to_bits(), f.to_bits()),
            other => panic!("unexpected {other:?}"),
        }
        match read_payload(AttrType::Double, &mut cur).unwrap() {
            AttrValueRef::Double(g) => assert_eq!(g.to_bits(), (-0.0f64).to_bits()),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn short_payload_is_truncated() {
        let mut cur: &[u8] = &[1, 2];
        assert!(matches!(read_payload(AttrType::Int, &mut cur), Err(AttrError::Truncated)));
        let mut cur: &[u8] = &[5, 0, b'a'];
        assert!(matches!(read_payload(AttrType::String, &mut cur), Err(AttrError::Truncated)));
    }

    #[test]
    fn invalid_utf8_string_is_corrupt() {
        let mut cur: &[u8] = &[1, 0, 0xFF];
        assert!(matches!(read_payload(AttrType::String, &mut cur), Err(AttrError::Corrupt(_))));
    }

    #[test]
    fn numeric_coercion() {
        let s = AttrValueRef::Short(-2);
        assert_eq!(s.as_int(), -2);
        assert_eq!(s.as_int64(), -2);
        assert_eq!(s.as_uint16(), 0xFFFE);
        assert_eq!(s.as_double(), -2.0);
        assert!(s.as_bool());

        let big = AttrValueRef::Int64(0x1_0000_0005);
        assert_eq!(big.as_int(), 5);
        assert_eq!(big.as_byte(), 5);

        let d = AttrValueRef::Double(-3.75);
        assert_eq!(d.as_int(), -3);
        assert_eq!(d.as_float(), -3.75);
        assert_eq!(AttrValueRef::Double(1e20).as_int(), i32::MAX);

        assert_eq!(AttrValueRef::Bool(true).as_int(), 1);
        assert_eq!(AttrValueRef::Bool(true).as_float(), 1.0);
        assert!(!AttrValueRef::Float(0.0).as_bool());
    }

    #[test]
    fn scalar_accessors_on_text_yield_zero() {
        let s = AttrValueRef::String("42");
        assert_eq!(s.as_int(), 0);
        assert_eq!(s.as_double(), 0.0);
        assert!(!s.as_bool());
        assert_eq!(AttrValueRef::Int(42).as_str(), None);
        assert_eq!(AttrValueRef::Int(42).as_bytes(), None);
    }

    #[test]
    fn text_and_bytes_cross_access() {
        assert_eq!(AttrValueRef::String("ab").as_bytes(), Some(&b"ab"[..]));
        assert_eq!(AttrValueRef::ByteArray(b"ok").as_str(), Some("ok"));
        assert_eq!(AttrValueRef::ByteArray(&[0xFF]).as_str(), None);
    }

    #[test]
    fn length_limits() {
        let long = "x".repeat(MAX_STRING_LEN + 1);
        assert!(matches!(
            AttrValueRef::String(&long).check_len(),
            Err(AttrError::ValueTooLong { kind: "string", .. })
        ));
        assert!(AttrValueRef::String(&long[1..]).check_len().is_ok());
        let key = vec![b'k'; MAX_KEY_LEN + 1];
        assert!(matches!(check_key(&key), Err(AttrError::KeyTooLong(_))));
        assert!(check_key(&key[1..]).is_ok());
    }

    #[test]
    fn owned_value_json_uses_hex_for_bytes() {
        let v = AttrValue::ByteArray(vec![0x00, 0xFF, 0x10]);
        let js = serde_json::to_string(&v).unwrap();
        assert_eq!(js, r#"{"type":"bytearray","value":"00ff10"}"#);
        let back: AttrValue = serde_json::from_str(&js).unwrap();
        assert_eq!(back, v);
        let i: AttrValue = serde_json::from_str(r#"{"type":"int","value":404}"#).unwrap();
        assert_eq!(i.as_ref(), AttrValueRef::Int(404));
    }
}

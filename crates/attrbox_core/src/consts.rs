// crates/attrbox_core/src/consts.rs

use core::mem::size_of;

/// Width of the leading total-length field.
pub const TOTAL_LEN_SIZE: usize = size_of::<u32>();
/// Width of the tag length, key length, attribute count and string length fields.
pub const SHORT_LEN_SIZE: usize = size_of::<u16>();
/// Width of the bytearray length field.
pub const LONG_LEN_SIZE: usize = size_of::<u32>();
pub const TYPE_TAG_SIZE: usize = 1;

/// Header bytes that do not depend on the tag: total length, tag length, attribute count.
pub const HDR_FIXED_SIZE: usize = TOTAL_LEN_SIZE + SHORT_LEN_SIZE + SHORT_LEN_SIZE;
/// Bytes of the flag prefix in the flagged envelope.
pub const FLAGS_SIZE: usize = 2;

pub const MAX_TAG_LEN: usize = u16::MAX as usize;
pub const MAX_KEY_LEN: usize = u16::MAX as usize;
pub const MAX_STRING_LEN: usize = u16::MAX as usize;
pub const MAX_BYTEARRAY_LEN: usize = u32::MAX as usize;
pub const MAX_ATTR_NUM: u16 = u16::MAX;
pub const MAX_TOTAL_LEN: usize = u32::MAX as usize;

/// Wire type tag of an attribute record.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttrType {
    Short = 1,
    Int = 2,
    Int64 = 3,
    Byte = 4,
    Uint16 = 5,
    Float = 6,
    Double = 7,
    Bool = 8,
    String = 9,
    ByteArray = 10,
}

impl AttrType {
    pub const ALL: [AttrType; 10] = [
        AttrType::Short,
        AttrType::Int,
        AttrType::Int64,
        AttrType::Byte,
        AttrType::Uint16,
        AttrType::Float,
        AttrType::Double,
        AttrType::Bool,
        AttrType::String,
        AttrType::ByteArray,
    ];

    #[inline]
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            1 => Some(Self::Short),
            2 => Some(Self::Int),
            3 => Some(Self::Int64),
            4 => Some(Self::Byte),
            5 => Some(Self::Uint16),
            6 => Some(Self::Float),
            7 => Some(Self::Double),
            8 => Some(Self::Bool),
            9 => Some(Self::String),
            10 => Some(Self::ByteArray),
            _ => None,
        }
    }

    /// Payload width for fixed-size types, `None` for string and bytearray.
    #[inline]
    pub fn fixed_size(self) -> Option<usize> {
        match self {
            Self::Short | Self::Uint16 => Some(2),
            Self::Int | Self::Float => Some(4),
            Self::Int64 | Self::Double => Some(8),
            Self::Byte | Self::Bool => Some(1),
            Self::String | Self::ByteArray => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Int => "int",
            Self::Int64 => "int64",
            Self::Byte => "byte",
            Self::Uint16 => "uint16",
            Self::Float => "float",
            Self::Double => "double",
            Self::Bool => "bool",
            Self::String => "string",
            Self::ByteArray => "bytearray",
        }
    }
}

impl std::fmt::Display for AttrType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

const _: () = { assert!(HDR_FIXED_SIZE == 8); };

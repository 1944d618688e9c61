use thiserror::Error;

#[derive(Debug, Error)]
pub enum AttrError {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("allocation of {requested} bytes failed")]
    Alloc { requested: usize },

    #[error("container is read-only")]
    ReadOnly,

    #[error("tag is {0} bytes, limit is 65535")]
    TagTooLong(usize),

    #[error("key is {0} bytes, limit is 65535")]
    KeyTooLong(usize),

    #[error("{kind} value is {len} bytes, over the field limit")]
    ValueTooLong { kind: &'static str, len: usize },

    #[error("attribute count limit (65535) reached")]
    TooManyAttributes,

    #[error("encoded size {0} does not fit the u32 length field")]
    BufferTooLarge(usize),

    #[error("destination holds {available} bytes, {needed} needed")]
    DestinationTooSmall { needed: usize, available: usize },

    #[error("input ends before the encoded length")]
    Truncated,

    #[error("corrupt container: {0}")]
    Corrupt(&'static str),

    #[error("unknown attribute type tag {0}")]
    UnknownType(u8),

    #[error("unsupported storage mode")]
    Unsupported,
}

pub type Result<T> = std::result::Result<T, AttrError>;

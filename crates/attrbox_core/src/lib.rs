//! Self-describing binary attribute containers.
//!
//! A container is a tag plus an ordered set of typed key/value attributes, held in a
//! single little-endian buffer that is also its wire form.

pub mod alloc;
pub mod codec;
pub mod config;
pub mod consts;
pub mod container;
pub mod dump;
pub mod errors;
pub mod flags;
pub mod lookup;
pub mod read;
pub mod utils;
pub mod view;

pub use alloc::{BufferAllocator, CappedAllocator, SystemAllocator};
pub use codec::{AttrValue, AttrValueRef};
pub use config::{ContainerConfig, GrowthPolicy};
pub use consts::AttrType;
pub use container::{AttrContainer, SetError};
pub use dump::{dump_to, log_dump, Dump};
pub use errors::{AttrError, Result};
pub use flags::{Flags, StorageMode};
pub use read::AttrRead;
pub use view::AttrView;

//! Human-readable rendering for diagnostics. The text format is not stable.

use crate::read::AttrRead;
use std::fmt;
use tracing::debug;

/// `Display` adapter returned by [`AttrRead::dump`].
pub struct Dump<'a, R: ?Sized>(pub(crate) &'a R);

impl<R: AttrRead + ?Sized> fmt::Display for Dump<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        dump_to(self.0, f)
    }
}

/// Writes the dump into any text sink.
pub fn dump_to<R: AttrRead + ?Sized, W: fmt::Write + ?Sized>(c: &R, out: &mut W) -> fmt::Result {
    writeln!(out, "tag: {}", String::from_utf8_lossy(c.tag()))?;
    writeln!(out, "attributes: {}", c.attr_num())?;
    writeln!(out, "length: {}", c.serialize_length())?;
    if c.is_constant() {
        writeln!(out, "readonly")?;
    }
    for rec in c.records() {
        let key = String::from_utf8_lossy(rec.key);
        match rec.value() {
            Ok(v) => writeln!(out, "  {} ({}): {}", key, rec.attr_type(), v)?,
            Err(e) => writeln!(out, "  {} ({}): <{}>", key, rec.attr_type(), e)?,
        }
    }
    Ok(())
}

/// Emits one debug event per attribute.
pub fn log_dump<R: AttrRead + ?Sized>(c: &R) {
    let tag = String::from_utf8_lossy(c.tag());
    debug!(tag = %tag, attrs = c.attr_num(), len = c.serialize_length(), "attr container");
    for rec in c.records() {
        let Ok(value) = rec.value() else { continue };
        debug!(
            tag = %tag,
            key = %String::from_utf8_lossy(rec.key),
            ty = %rec.attr_type(),
            value = %value,
            "attribute"
        );
    }
}

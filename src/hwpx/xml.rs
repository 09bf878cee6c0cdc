//! Small helpers over quick-xml events shared by the HWPX part parsers.
//!
//! HWPX parts use several namespace prefixes (`hp:`, `hh:`, `hc:`, `opf:`)
//! that vary between writers, so elements and attributes are matched by local
//! name only.

use crate::common::Result;
use quick_xml::Reader;
use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesRef, BytesStart, BytesText};
use std::borrow::Cow;

#[inline]
pub fn local_name<'a>(e: &'a BytesStart<'_>) -> Cow<'a, str> {
    String::from_utf8_lossy(e.local_name().into_inner())
}

/// Attribute value by local name, with entities resolved.
pub fn attr(e: &BytesStart<'_>, name: &str) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == name.as_bytes())
        .map(|a| {
            let raw = String::from_utf8_lossy(&a.value).into_owned();
            match unescape(&raw) {
                Ok(value) => value.into_owned(),
                Err(_) => raw,
            }
        })
}

pub fn attr_u32(e: &BytesStart<'_>, name: &str) -> Option<u32> {
    attr(e, name)?.trim().parse().ok()
}

/// OWPML booleans are written as `1`/`0` or `true`/`false`.
pub fn attr_bool(e: &BytesStart<'_>, name: &str) -> Option<bool> {
    attr(e, name).map(|v| matches!(v.trim(), "1" | "true" | "TRUE" | "True"))
}

/// Text content; any entities left in the raw bytes are resolved.
pub fn text(t: &BytesText<'_>) -> String {
    let raw = String::from_utf8_lossy(t);
    if !raw.contains('&') {
        return raw.into_owned();
    }
    match unescape(&raw) {
        Ok(value) => value.into_owned(),
        Err(_) => raw.into_owned(),
    }
}

/// Expand an entity or character reference; unknown entities are dropped.
pub fn reference(r: &BytesRef<'_>) -> Option<String> {
    let name = std::str::from_utf8(r).ok()?;
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse().ok()?,
        };
        return char::from_u32(code).map(String::from);
    }
    resolve_predefined_entity(name).map(str::to_string)
}

/// Consume events up to and including the end tag matching `start`.
pub fn skip(reader: &mut Reader<&[u8]>, start: &BytesStart<'_>) -> Result<()> {
    reader.read_to_end(start.to_end().name())?;
    Ok(())
}

use super::consts::*;
use super::file::{OleError, OleFile};
use crate::common::binary::{read_u16_le, read_u32_le};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::io::{Read, Seek};

/// Stream name of the HWP summary property set
pub const HWP_SUMMARY_STREAM: &str = "\u{0005}HwpSummaryInformation";

/// Properties read from a summary information property set
#[derive(Debug, Default, Clone)]
pub struct SummaryInfo {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub author: Option<String>,
    pub keywords: Option<String>,
    pub comments: Option<String>,
    pub last_saved_by: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
}

/// Property value types
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    I2(i16),
    I4(i32),
    UI2(u16),
    UI4(u32),
    Bool(bool),
    Lpstr(String),
    Lpwstr(String),
    Filetime(u64),
    Empty,
}

impl<R: Read + Seek> OleFile<R> {
    /// Read the HWP summary property set.
    ///
    /// A missing or malformed stream yields an empty [`SummaryInfo`]; document
    /// metadata is optional.
    pub fn hwp_summary(&mut self) -> SummaryInfo {
        match self.open_stream(&[HWP_SUMMARY_STREAM]) {
            Ok(data) => match parse_property_set(&data) {
                Ok(props) => summary_from_properties(&props),
                Err(e) => {
                    log::debug!("summary property set unreadable: {}", e);
                    SummaryInfo::default()
                },
            },
            Err(_) => SummaryInfo::default(),
        }
    }
}

/// Parse the first section of a property set stream
///
/// Layout: 28-byte header, one FMTID/offset pair per section; the section
/// starts with its size and property count followed by (id, offset) pairs.
pub fn parse_property_set(data: &[u8]) -> Result<HashMap<u32, PropertyValue>, OleError> {
    if data.len() < 48 {
        return Err(OleError::InvalidFormat(
            "Property stream too short".to_string(),
        ));
    }

    let section_offset = read_u32(data, 44)? as usize;
    let num_props = read_u32(data, section_offset + 4)?.min(1000);

    let mut properties = HashMap::new();
    for i in 0..num_props as usize {
        let entry = section_offset + 8 + i * 8;
        let (Ok(prop_id), Ok(rel_offset)) = (read_u32(data, entry), read_u32(data, entry + 4))
        else {
            break;
        };
        let value_offset = section_offset + rel_offset as usize;
        let Ok(prop_type) = read_u16_le(data, value_offset) else {
            continue;
        };
        if let Ok(value) = parse_property_value(data, value_offset + 4, prop_type) {
            properties.insert(prop_id, value);
        }
    }

    Ok(properties)
}

fn read_u32(data: &[u8], offset: usize) -> Result<u32, OleError> {
    read_u32_le(data, offset).map_err(|e| OleError::InvalidData(e.to_string()))
}

fn parse_property_value(
    data: &[u8],
    offset: usize,
    prop_type: u16,
) -> Result<PropertyValue, OleError> {
    let overflow = || OleError::InvalidFormat("Property value overflow".to_string());

    match prop_type {
        VT_I2 => {
            let v = read_u16_le(data, offset).map_err(|_| overflow())?;
            Ok(PropertyValue::I2(v as i16))
        },
        VT_UI2 => {
            let v = read_u16_le(data, offset).map_err(|_| overflow())?;
            Ok(PropertyValue::UI2(v))
        },
        VT_I4 => Ok(PropertyValue::I4(read_u32(data, offset)? as i32)),
        VT_UI4 => Ok(PropertyValue::UI4(read_u32(data, offset)?)),
        VT_BOOL => {
            let v = read_u16_le(data, offset).map_err(|_| overflow())?;
            Ok(PropertyValue::Bool(v != 0))
        },
        VT_LPSTR | VT_BSTR => {
            let len = read_u32(data, offset)? as usize;
            let bytes = data.get(offset + 4..offset + 4 + len).ok_or_else(overflow)?;
            let s = String::from_utf8_lossy(bytes)
                .trim_end_matches('\0')
                .to_string();
            Ok(PropertyValue::Lpstr(s))
        },
        VT_LPWSTR => {
            let chars = read_u32(data, offset)? as usize;
            let bytes = data
                .get(offset + 4..offset + 4 + chars * 2)
                .ok_or_else(overflow)?;
            Ok(PropertyValue::Lpwstr(
                crate::common::binary::parse_utf16le_string(bytes),
            ))
        },
        VT_FILETIME => {
            let low = read_u32(data, offset)? as u64;
            let high = read_u32(data, offset + 4)? as u64;
            Ok(PropertyValue::Filetime(low | (high << 32)))
        },
        VT_EMPTY | VT_NULL => Ok(PropertyValue::Empty),
        _ => Ok(PropertyValue::Empty),
    }
}

fn summary_from_properties(props: &HashMap<u32, PropertyValue>) -> SummaryInfo {
    let string = |id: u32| props.get(&id).and_then(extract_string);
    let time = |id: u32| match props.get(&id) {
        Some(PropertyValue::Filetime(ft)) => filetime_to_datetime(*ft),
        _ => None,
    };

    SummaryInfo {
        title: string(2),
        subject: string(3),
        author: string(4),
        keywords: string(5),
        comments: string(6),
        last_saved_by: string(8),
        created: time(12),
        modified: time(13),
    }
}

fn extract_string(value: &PropertyValue) -> Option<String> {
    match value {
        PropertyValue::Lpstr(s) | PropertyValue::Lpwstr(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        },
        _ => None,
    }
}

/// Convert a Windows FILETIME (100ns ticks since 1601-01-01) to UTC.
///
/// Zero means "not set".
pub fn filetime_to_datetime(filetime: u64) -> Option<DateTime<Utc>> {
    const EPOCH_DIFF_SECS: i64 = 11_644_473_600;
    if filetime == 0 {
        return None;
    }
    let secs = (filetime / 10_000_000) as i64 - EPOCH_DIFF_SECS;
    let nanos = ((filetime % 10_000_000) * 100) as u32;
    DateTime::<Utc>::from_timestamp(secs, nanos)
}

//! Scalar field reads and writes.

use std::net::Ipv4Addr;

use bytestream::{ByteReader, ByteWriter};
use chrono::{Datelike, NaiveDate};
use schema::{FieldDef, FieldKind, IntKind, Value};

use crate::error::{CodecError, CodecResult, ValueReason};

/// Day count of 0001-01-01 on the wire. Smaller counts mean "no date".
pub const DATE_EPOCH_DAYS: u32 = 366;

pub(crate) fn read_string(reader: &mut ByteReader<'_>) -> CodecResult<Value> {
    Ok(Value::Str(
        String::from_utf8_lossy(reader.read_cstr()?).into_owned(),
    ))
}

pub(crate) fn read_json(field: &FieldDef, reader: &mut ByteReader<'_>) -> CodecResult<Value> {
    let raw = reader.read_cstr()?;
    if raw.is_empty() {
        return Ok(Value::Json(serde_json::Value::Null));
    }
    serde_json::from_slice(raw)
        .map(Value::Json)
        .map_err(|e| CodecError::InvalidJson {
            field: field.name.clone(),
            message: e.to_string(),
        })
}

pub(crate) fn read_ipv4(reader: &mut ByteReader<'_>) -> CodecResult<Value> {
    Ok(Value::Ipv4(Ipv4Addr::from(reader.read_u32()?.to_le_bytes())))
}

pub(crate) fn read_date(field: &FieldDef, reader: &mut ByteReader<'_>) -> CodecResult<Value> {
    date_from_days(field, reader.read_u32()?).map(Value::Date)
}

pub(crate) fn read_int(kind: IntKind, reader: &mut ByteReader<'_>) -> CodecResult<Value> {
    let value = match kind {
        IntKind::U8 => Value::UInt(reader.read_u8()?.into()),
        IntKind::U16 => Value::UInt(reader.read_u16()?.into()),
        IntKind::U32 => Value::UInt(reader.read_u32()?.into()),
        IntKind::U64 => Value::UInt(reader.read_u64()?),
        IntKind::I8 => Value::Int(reader.read_i8()?.into()),
        IntKind::I16 => Value::Int(reader.read_i16()?.into()),
        IntKind::I32 => Value::Int(reader.read_i32()?.into()),
        IntKind::I64 => Value::Int(reader.read_i64()?),
    };
    Ok(value)
}

/// Reads a sequence count prefix.
pub(crate) fn read_count(kind: IntKind, reader: &mut ByteReader<'_>) -> CodecResult<usize> {
    let count = match read_int(kind, reader)? {
        Value::UInt(v) => usize::try_from(v).unwrap_or(usize::MAX),
        Value::Int(v) => usize::try_from(v).unwrap_or(0),
        _ => 0,
    };
    Ok(count)
}

fn date_from_days(field: &FieldDef, days: u32) -> CodecResult<Option<NaiveDate>> {
    if days < DATE_EPOCH_DAYS {
        return Ok(None);
    }
    i32::try_from(days - (DATE_EPOCH_DAYS - 1))
        .ok()
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .map(Some)
        .ok_or_else(|| CodecError::InvalidValue {
            field: field.name.clone(),
            reason: ValueReason::DateOutOfRange {
                days: i64::from(days),
            },
        })
}

fn days_from_date(field: &FieldDef, date: Option<NaiveDate>) -> CodecResult<u32> {
    let Some(date) = date else {
        return Ok(0);
    };
    let days = i64::from(date.num_days_from_ce()) + i64::from(DATE_EPOCH_DAYS - 1);
    u32::try_from(days)
        .ok()
        .filter(|d| *d >= DATE_EPOCH_DAYS)
        .ok_or_else(|| CodecError::InvalidValue {
            field: field.name.clone(),
            reason: ValueReason::DateOutOfRange { days },
        })
}

/// Writes one non-aggregate field.
pub(crate) fn write_field_value(
    field: &FieldDef,
    value: &Value,
    writer: &mut ByteWriter,
) -> CodecResult<()> {
    match (&field.kind, value) {
        (FieldKind::Int(kind), Value::UInt(_) | Value::Int(_)) => {
            let v = value.as_i128().unwrap_or_default();
            write_int(&field.name, *kind, v, writer)?;
        }
        (FieldKind::Bool, Value::Bool(v)) => writer.write_u8(u8::from(*v)),
        (FieldKind::Bytes { len }, Value::Bytes(bytes)) => {
            if bytes.len() != *len {
                return Err(CodecError::CountMismatch {
                    field: field.name.clone(),
                    expected: *len,
                    actual: bytes.len(),
                });
            }
            writer.write_bytes(bytes);
        }
        (FieldKind::Str { trim_length }, Value::Str(s)) => {
            if let Some(offset) = s.bytes().position(|b| b == 0) {
                return Err(CodecError::InvalidValue {
                    field: field.name.clone(),
                    reason: ValueReason::InteriorNul { offset },
                });
            }
            writer.write_cstr(trimmed(s, *trim_length).as_bytes());
        }
        (FieldKind::Date, Value::Date(date)) => {
            writer.write_u32(days_from_date(field, *date)?);
        }
        (FieldKind::Json { max_length }, Value::Json(json)) => {
            let text = json.to_string();
            if text.len() >= *max_length {
                return Err(CodecError::JsonTooLong {
                    field: field.name.clone(),
                    length: text.len(),
                    max: *max_length,
                });
            }
            writer.write_cstr(text.as_bytes());
        }
        (FieldKind::Ipv4, Value::Ipv4(addr)) => writer.write_bytes(&addr.octets()),
        (kind, value) => {
            return Err(CodecError::TypeMismatch {
                field: field.name.clone(),
                expected: expected_type(kind),
                found: value.type_name(),
            });
        }
    }
    Ok(())
}

/// Writes an integer of the given width, rejecting values outside its range.
pub(crate) fn write_int(
    name: &str,
    kind: IntKind,
    value: i128,
    writer: &mut ByteWriter,
) -> CodecResult<()> {
    let out_of_range = |_| CodecError::InvalidValue {
        field: name.to_owned(),
        reason: ValueReason::OutOfRange {
            min: kind.min(),
            max: kind.max(),
            value,
        },
    };
    match kind {
        IntKind::U8 => writer.write_u8(u8::try_from(value).map_err(out_of_range)?),
        IntKind::U16 => writer.write_u16(u16::try_from(value).map_err(out_of_range)?),
        IntKind::U32 => writer.write_u32(u32::try_from(value).map_err(out_of_range)?),
        IntKind::U64 => writer.write_u64(u64::try_from(value).map_err(out_of_range)?),
        IntKind::I8 => writer.write_i8(i8::try_from(value).map_err(out_of_range)?),
        IntKind::I16 => writer.write_i16(i16::try_from(value).map_err(out_of_range)?),
        IntKind::I32 => writer.write_i32(i32::try_from(value).map_err(out_of_range)?),
        IntKind::I64 => writer.write_i64(i64::try_from(value).map_err(out_of_range)?),
    }
    Ok(())
}

/// Cuts `s` so it fits a `trim_length` buffer including its terminator.
fn trimmed(s: &str, trim_length: Option<usize>) -> &str {
    let Some(max) = trim_length.map(|t| t.saturating_sub(1)) else {
        return s;
    };
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

pub(crate) const fn expected_type(kind: &FieldKind) -> &'static str {
    match kind {
        FieldKind::Int(kind) if kind.is_signed() => "int",
        FieldKind::Int(_) => "uint",
        FieldKind::Bool => "bool",
        FieldKind::Bytes { .. } => "bytes",
        FieldKind::Str { .. } => "str",
        FieldKind::Date => "date",
        FieldKind::Json { .. } => "json",
        FieldKind::Ipv4 => "ipv4",
        FieldKind::Repeating { .. } | FieldKind::Looping { .. } => "list",
        FieldKind::Grouped { .. } => "record",
    }
}

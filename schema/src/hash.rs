//! Deterministic schema fingerprints.

use blake3::Hasher;

use crate::field::{FieldDef, FieldKind, IntKind, RepeatCount};
use crate::layout::Layout;
use crate::packet::PacketSchema;
use crate::value::Value;

/// Computes a deterministic fingerprint of a schema's structure.
///
/// Covers the name, id, tags, version options and every field attribute
/// that affects the wire or validation. Predicate validators contribute
/// their name only.
#[must_use]
pub fn fingerprint(schema: &PacketSchema) -> u64 {
    let mut hasher = Hasher::new();
    write_str(&mut hasher, schema.name());
    write_opt_u32(&mut hasher, schema.id().map(u32::from));
    write_u8(&mut hasher, schema.protocol() as u8);
    write_u8(&mut hasher, schema.direction() as u8);
    write_u8(&mut hasher, u8::from(schema.is_abstract()));
    write_u8(&mut hasher, u8::from(schema.overrides()));
    write_opt_u32(&mut hasher, schema.default_version());
    write_layout(&mut hasher, schema.layout());

    let hash = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}

fn write_layout(hasher: &mut Hasher, layout: &Layout) {
    write_usize(hasher, layout.fields().len());
    for field in layout.fields() {
        write_field(hasher, field);
    }
}

fn write_field(hasher: &mut Hasher, field: &FieldDef) {
    write_str(hasher, &field.name);
    hasher.update(&field.ordering.to_le_bytes());
    write_kind(hasher, &field.kind);
    match &field.default {
        Some(value) => {
            write_u8(hasher, 1);
            write_value(hasher, value);
        }
        None => write_u8(hasher, 0),
    }
    write_usize(hasher, field.validators.len());
    for validator in &field.validators {
        write_str(hasher, &validator.to_string());
    }
    write_opt_u32(hasher, field.required_version);
    write_u8(hasher, u8::from(field.is_version_identifier));
    write_u8(hasher, u8::from(field.is_continue_flag));
}

fn write_kind(hasher: &mut Hasher, kind: &FieldKind) {
    match kind {
        FieldKind::Int(int) => {
            write_u8(hasher, 0);
            write_int_kind(hasher, *int);
        }
        FieldKind::Bool => write_u8(hasher, 1),
        FieldKind::Bytes { len } => {
            write_u8(hasher, 2);
            write_usize(hasher, *len);
        }
        FieldKind::Str { trim_length } => {
            write_u8(hasher, 3);
            write_usize(hasher, trim_length.unwrap_or(0));
        }
        FieldKind::Date => write_u8(hasher, 4),
        FieldKind::Json { max_length } => {
            write_u8(hasher, 5);
            write_usize(hasher, *max_length);
        }
        FieldKind::Ipv4 => write_u8(hasher, 6),
        FieldKind::Repeating { count, layout } => {
            write_u8(hasher, 7);
            match count {
                RepeatCount::Fixed(n) => {
                    write_u8(hasher, 0);
                    write_usize(hasher, *n);
                }
                RepeatCount::Prefixed(int) => {
                    write_u8(hasher, 1);
                    write_int_kind(hasher, *int);
                }
            }
            write_layout(hasher, layout);
        }
        FieldKind::Grouped {
            layout,
            expect_count,
        } => {
            write_u8(hasher, 8);
            write_usize(hasher, expect_count.unwrap_or(usize::MAX));
            write_layout(hasher, layout);
        }
        FieldKind::Looping { layout } => {
            write_u8(hasher, 9);
            write_layout(hasher, layout);
        }
    }
}

fn write_int_kind(hasher: &mut Hasher, kind: IntKind) {
    write_u8(hasher, u8::from(kind.is_signed()));
    write_usize(hasher, kind.width());
}

fn write_value(hasher: &mut Hasher, value: &Value) {
    match value {
        Value::Bool(v) => {
            write_u8(hasher, 0);
            write_u8(hasher, u8::from(*v));
        }
        Value::UInt(v) => {
            write_u8(hasher, 1);
            hasher.update(&v.to_le_bytes());
        }
        Value::Int(v) => {
            write_u8(hasher, 2);
            hasher.update(&v.to_le_bytes());
        }
        Value::Bytes(v) => {
            write_u8(hasher, 3);
            write_bytes(hasher, v);
        }
        Value::Str(v) => {
            write_u8(hasher, 4);
            write_str(hasher, v);
        }
        Value::Ipv4(v) => {
            write_u8(hasher, 5);
            hasher.update(&v.octets());
        }
        Value::Date(v) => {
            write_u8(hasher, 6);
            write_str(hasher, &v.map(|d| d.to_string()).unwrap_or_default());
        }
        Value::Json(v) => {
            write_u8(hasher, 7);
            write_str(hasher, &v.to_string());
        }
        Value::List(records) => {
            write_u8(hasher, 8);
            write_usize(hasher, records.len());
            for record in records {
                write_record(hasher, record.iter());
            }
        }
        Value::Record(record) => {
            write_u8(hasher, 9);
            write_record(hasher, record.iter());
        }
    }
}

fn write_record<'a>(hasher: &mut Hasher, fields: impl Iterator<Item = (&'a str, &'a Value)>) {
    for (name, value) in fields {
        write_str(hasher, name);
        write_value(hasher, value);
    }
    write_u8(hasher, 0xFF);
}

fn write_u8(hasher: &mut Hasher, value: u8) {
    hasher.update(&[value]);
}

fn write_usize(hasher: &mut Hasher, value: usize) {
    hasher.update(&(value as u64).to_le_bytes());
}

fn write_opt_u32(hasher: &mut Hasher, value: Option<u32>) {
    match value {
        Some(v) => {
            write_u8(hasher, 1);
            hasher.update(&v.to_le_bytes());
        }
        None => write_u8(hasher, 0),
    }
}

fn write_bytes(hasher: &mut Hasher, bytes: &[u8]) {
    write_usize(hasher, bytes.len());
    hasher.update(bytes);
}

fn write_str(hasher: &mut Hasher, value: &str) {
    write_bytes(hasher, value.as_bytes());
}

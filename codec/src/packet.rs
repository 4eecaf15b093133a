//! Packet body encoding and decoding.
//!
//! Both directions walk a schema's prepared plan. A merged step is one
//! bounds-checked span: the decoder takes the whole span before reading any
//! member, and the encoder writes the span only when every member encoded.

use std::borrow::Cow;
use std::mem;

use bytestream::{ByteReader, ByteWriter};
use schema::{FieldDef, FieldKind, Layout, PacketSchema, PlanStep, Record, RepeatCount, Value};

use crate::context::{ProtocolContext, VersionCursor};
use crate::error::{CodecError, CodecResult, LimitKind};
use crate::limits::CodecLimits;
use crate::value::{
    expected_type, read_count, read_date, read_int, read_ipv4, read_json, read_string,
    write_field_value, write_int,
};

/// Decodes a packet body into a record.
///
/// Fields gated out at the working version are filled with their defaults.
/// On success a version read from the body becomes the context's version;
/// a failed decode leaves the context untouched.
pub fn decode_packet(
    schema: &PacketSchema,
    body: &[u8],
    ctx: &mut ProtocolContext,
    limits: &CodecLimits,
) -> CodecResult<Record> {
    ensure_concrete(schema)?;
    let mut decoder = Decoder {
        reader: ByteReader::new(body),
        cursor: ctx.cursor(schema),
        limits,
    };
    let record = decoder.layout(schema.layout())?;
    if !limits.allow_trailing_bytes && !decoder.reader.is_empty() {
        return Err(CodecError::TrailingBytes {
            packet: schema.name().to_owned(),
            remaining: decoder.reader.remaining(),
        });
    }
    ctx.commit(&decoder.cursor);
    Ok(record)
}

/// Encodes a record into a packet body.
///
/// Missing values fall back to field defaults, except a missing version
/// identifier, which takes the working version.
pub fn encode_packet(
    schema: &PacketSchema,
    record: &Record,
    ctx: &ProtocolContext,
) -> CodecResult<Vec<u8>> {
    ensure_concrete(schema)?;
    let mut encoder = Encoder {
        writer: ByteWriter::new(),
        cursor: ctx.cursor(schema),
    };
    encoder.layout(schema.layout(), record)?;
    Ok(encoder.writer.finish())
}

/// Encodes a record and prepends the frame header.
pub fn encode_frame(
    schema: &PacketSchema,
    record: &Record,
    ctx: &ProtocolContext,
) -> CodecResult<Vec<u8>> {
    let id = ensure_concrete(schema)?;
    let body = encode_packet(schema, record, ctx)?;
    let mut out = Vec::with_capacity(wire::HEADER_SIZE + body.len());
    wire::encode_frame(id, &body, &mut out)?;
    Ok(out)
}

fn ensure_concrete(schema: &PacketSchema) -> CodecResult<u8> {
    match schema.id() {
        Some(id) if !schema.is_abstract() => Ok(id),
        _ => Err(CodecError::AbstractSchema {
            packet: schema.name().to_owned(),
        }),
    }
}

fn identify(cursor: &mut VersionCursor, field: &FieldDef, value: &Value) {
    if field.is_version_identifier {
        if let Some(version) = value.as_u64() {
            cursor.identify(u32::try_from(version).unwrap_or(u32::MAX));
        }
    }
}

struct Decoder<'a, 'l> {
    reader: ByteReader<'a>,
    cursor: VersionCursor,
    limits: &'l CodecLimits,
}

impl Decoder<'_, '_> {
    fn layout(&mut self, layout: &Layout) -> CodecResult<Record> {
        let fields = layout.fields();
        let mut record = Record::new();
        for step in layout.plan() {
            if !self.cursor.allows(&fields[step.leader()]) {
                for index in step.indices() {
                    let field = &fields[index];
                    record.insert(field.name.clone(), field.default_or_kind());
                }
                continue;
            }

            let outer = match step {
                PlanStep::Single(_) => None,
                PlanStep::Merged { width, .. } => {
                    let span = self.reader.read_bytes(*width)?;
                    Some(mem::replace(&mut self.reader, ByteReader::new(span)))
                }
            };
            let result = step.indices().try_for_each(|index| {
                let field = &fields[index];
                let value = self.field(field)?;
                identify(&mut self.cursor, field, &value);
                record.insert(field.name.clone(), value);
                Ok::<_, CodecError>(())
            });
            if let Some(outer) = outer {
                self.reader = outer;
            }
            result?;
        }
        Ok(record)
    }

    fn field(&mut self, field: &FieldDef) -> CodecResult<Value> {
        let reader = &mut self.reader;
        let value = match &field.kind {
            FieldKind::Int(kind) => read_int(*kind, reader)?,
            FieldKind::Bool => Value::Bool(reader.read_u8()? != 0),
            FieldKind::Bytes { len } => Value::Bytes(reader.read_bytes(*len)?.to_vec()),
            FieldKind::Str { .. } => read_string(reader)?,
            FieldKind::Date => read_date(field, reader)?,
            FieldKind::Json { .. } => read_json(field, reader)?,
            FieldKind::Ipv4 => read_ipv4(reader)?,
            FieldKind::Repeating { count, layout } => {
                let count = match count {
                    RepeatCount::Fixed(n) => *n,
                    RepeatCount::Prefixed(kind) => read_count(*kind, reader)?,
                };
                self.check_sequence(count)?;
                let mut items = Vec::with_capacity(count.min(self.reader.remaining()));
                for _ in 0..count {
                    items.push(self.layout(layout)?);
                }
                Value::List(items)
            }
            FieldKind::Grouped { layout, .. } => Value::Record(self.layout(layout)?),
            FieldKind::Looping { layout } => {
                let mut items = Vec::new();
                while self.reader.read_u8()? != 0 {
                    self.check_sequence(items.len() + 1)?;
                    items.push(self.layout(layout)?);
                }
                Value::List(items)
            }
        };
        Ok(value)
    }

    fn check_sequence(&self, len: usize) -> CodecResult<()> {
        if len > self.limits.max_sequence_len {
            return Err(CodecError::LimitsExceeded {
                kind: LimitKind::SequenceLength,
                limit: self.limits.max_sequence_len,
                actual: len,
            });
        }
        Ok(())
    }
}

struct Encoder {
    writer: ByteWriter,
    cursor: VersionCursor,
}

impl Encoder {
    fn layout(&mut self, layout: &Layout, record: &Record) -> CodecResult<()> {
        let fields = layout.fields();
        for step in layout.plan() {
            if !self.cursor.allows(&fields[step.leader()]) {
                continue;
            }
            match step {
                PlanStep::Single(index) => self.field(&fields[*index], record)?,
                PlanStep::Merged { width, .. } => {
                    let outer = mem::replace(&mut self.writer, ByteWriter::with_capacity(*width));
                    let result = step
                        .indices()
                        .try_for_each(|index| self.field(&fields[index], record));
                    let span = mem::replace(&mut self.writer, outer);
                    result?;
                    debug_assert_eq!(span.len(), *width);
                    self.writer.write_bytes(span.as_slice());
                }
            }
        }
        Ok(())
    }

    fn field(&mut self, field: &FieldDef, record: &Record) -> CodecResult<()> {
        let value = match record.get(&field.name) {
            Some(value) => Cow::Borrowed(value),
            None if field.is_version_identifier => {
                Cow::Owned(Value::UInt(self.cursor.current().into()))
            }
            None => Cow::Owned(field.default_or_kind()),
        };
        if let Some(validator) = field.validators.iter().find(|v| !v.accepts(&value)) {
            return Err(CodecError::Validator {
                field: field.name.clone(),
                validator: validator.to_string(),
            });
        }

        match (&field.kind, value.as_ref()) {
            (FieldKind::Repeating { count, layout }, Value::List(items)) => {
                match count {
                    RepeatCount::Fixed(n) if items.len() != *n => {
                        return Err(CodecError::CountMismatch {
                            field: field.name.clone(),
                            expected: *n,
                            actual: items.len(),
                        });
                    }
                    RepeatCount::Fixed(_) => {}
                    RepeatCount::Prefixed(kind) => {
                        let len = i128::try_from(items.len()).unwrap_or(i128::MAX);
                        write_int(&field.name, *kind, len, &mut self.writer)?;
                    }
                }
                for item in items {
                    self.layout(layout, item)?;
                }
            }
            (FieldKind::Grouped { layout, .. }, Value::Record(inner)) => {
                self.layout(layout, inner)?;
            }
            (FieldKind::Looping { layout }, Value::List(items)) => {
                for item in items {
                    self.writer.write_u8(1);
                    self.layout(layout, item)?;
                }
                self.writer.write_u8(0);
            }
            (
                kind @ (FieldKind::Repeating { .. }
                | FieldKind::Grouped { .. }
                | FieldKind::Looping { .. }),
                other,
            ) => {
                return Err(CodecError::TypeMismatch {
                    field: field.name.clone(),
                    expected: expected_type(kind),
                    found: other.type_name(),
                });
            }
            (_, scalar) => write_field_value(field, scalar, &mut self.writer)?,
        }

        identify(&mut self.cursor, field, &value);
        Ok(())
    }
}

//! Decoding of one record payload into typed values.

use std::io::{self, Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};
use encoding_rs::{UTF_16LE, UTF_8};
use uuid::Uuid;

use crate::error::{CatalogError, Result};
use crate::types::{FieldType, Value};

use super::field_descriptor::FieldDescriptor;
use super::varint::read_varuint;

/// Ordered values of one record, aligned with the table's field descriptors.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// 1-based row number
    pub object_id: i64,
    pub values: Vec<Value>,
}

impl Record {
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Move a value out of the record, leaving a null of the same type.
    pub fn take(&mut self, index: usize) -> Option<Value> {
        let slot = self.values.get_mut(index)?;
        let null = Value::Null(slot.field_type());
        Some(std::mem::replace(slot, null))
    }
}

/// Decodes record payloads for one table layout.
pub struct RecordDecoder<'a> {
    fields: &'a [FieldDescriptor],
}

impl<'a> RecordDecoder<'a> {
    pub fn new(fields: &'a [FieldDescriptor]) -> Self {
        Self { fields }
    }

    /// Decode a payload (null bitmask followed by the present values).
    ///
    /// Any field running past the end of the payload fails the whole
    /// record; no partial record is returned.
    pub fn decode(&self, object_id: i64, payload: &[u8]) -> Result<Record> {
        let mask_len = self.fields.len().div_ceil(8);
        if payload.len() < mask_len {
            return Err(CatalogError::format(format!(
                "record {} is shorter than its null bitmask",
                object_id
            )));
        }
        let (mask, data) = payload.split_at(mask_len);
        let mut cursor = Cursor::new(data);

        let mut values = Vec::with_capacity(self.fields.len());
        for (i, field) in self.fields.iter().enumerate() {
            if field.field_type == FieldType::ObjectId {
                values.push(Value::ObjectId(object_id));
                continue;
            }
            if !is_present(mask, i) {
                values.push(Value::Null(field.field_type));
                continue;
            }
            let value = self
                .decode_value(field.field_type, &mut cursor)
                .map_err(|e| field_error(object_id, field, e))?;
            values.push(value);
        }

        Ok(Record { object_id, values })
    }

    fn decode_value(&self, field_type: FieldType, cursor: &mut Cursor<&[u8]>) -> io::Result<Value> {
        let value = match field_type {
            FieldType::ShortInt => Value::Int16(cursor.read_i16::<LittleEndian>()?),
            FieldType::LongInt => Value::Int32(cursor.read_i32::<LittleEndian>()?),
            FieldType::Float32 => Value::Float32(cursor.read_f32::<LittleEndian>()?),
            FieldType::Float64 => Value::Float64(cursor.read_f64::<LittleEndian>()?),
            FieldType::Date => Value::Date(cursor.read_f64::<LittleEndian>()?),
            FieldType::Guid => Value::Guid(read_guid(cursor)?),
            FieldType::GlobalId => Value::GlobalId(read_guid(cursor)?),
            FieldType::Text => {
                let bytes = read_prefixed(cursor)?;
                Value::Text(decode_text(&bytes)?)
            }
            FieldType::Geometry => Value::Geometry(read_prefixed(cursor)?),
            FieldType::Blob => Value::Blob(read_prefixed(cursor)?),
            FieldType::Xml => Value::Xml(read_prefixed(cursor)?),
            FieldType::ObjectId => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "object ids are not stored in records",
                ))
            }
        };
        Ok(value)
    }

}

/// Decode a `Text` value, stored as UTF-16LE.
///
/// Bytes that cannot be UTF-16LE (odd length or unpaired surrogates) are
/// read as UTF-8 instead; anything else is invalid.
pub fn decode_text(bytes: &[u8]) -> io::Result<String> {
    if bytes.len() % 2 == 0 {
        if let Some(text) = UTF_16LE.decode_without_bom_handling_and_without_replacement(bytes) {
            return Ok(text.into_owned());
        }
    }
    UTF_8
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "text is neither UTF-16LE nor UTF-8"))
}

/// Bit `i % 8` of byte `i / 8`; a set bit means the value is stored.
pub fn is_present(mask: &[u8], index: usize) -> bool {
    mask.get(index / 8)
        .map_or(false, |byte| byte & (1 << (index % 8)) != 0)
}

fn read_guid(cursor: &mut Cursor<&[u8]>) -> io::Result<Uuid> {
    let mut bytes = [0u8; 16];
    cursor.read_exact(&mut bytes)?;
    Ok(Uuid::from_bytes_le(bytes))
}

fn read_prefixed(cursor: &mut Cursor<&[u8]>) -> io::Result<Vec<u8>> {
    let len = read_varuint(cursor)?;
    let remaining = (cursor.get_ref().len() as u64).saturating_sub(cursor.position());
    if len > remaining {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("declares {} bytes but only {} remain", len, remaining),
        ));
    }
    let mut bytes = vec![0u8; len as usize];
    cursor.read_exact(&mut bytes)?;
    Ok(bytes)
}

fn field_error(object_id: i64, field: &FieldDescriptor, err: io::Error) -> CatalogError {
    let detail = match err.kind() {
        io::ErrorKind::UnexpectedEof if err.get_ref().is_none() => "runs past end of record".to_string(),
        _ => err.to_string(),
    };
    CatalogError::format(format!(
        "record {}: field '{}' ({}) {}",
        object_id, field.name, field.field_type, detail
    ))
}

//! Decoded field values

use uuid::Uuid;

use super::FieldType;

/// Unix timestamp, in seconds, of the date epoch 1899-12-30T00:00:00Z.
pub const DATE_EPOCH_UNIX_SECONDS: i64 = -2_209_161_600;

/// Convert a stored date (days since 1899-12-30) to Unix seconds.
pub fn days_to_unix_seconds(days: f64) -> f64 {
    DATE_EPOCH_UNIX_SECONDS as f64 + days * 86_400.0
}

/// One typed, nullable field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent value of the declared type
    Null(FieldType),
    Int16(i16),
    Int32(i32),
    Float32(f32),
    Float64(f64),
    Text(String),
    /// Days (and fractional days) since 1899-12-30
    Date(f64),
    ObjectId(i64),
    Geometry(Vec<u8>),
    Blob(Vec<u8>),
    Guid(Uuid),
    GlobalId(Uuid),
    /// Raw definition bytes, decoded by the metadata parser
    Xml(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null(_))
    }

    /// Declared type this value was decoded as
    pub fn field_type(&self) -> FieldType {
        match self {
            Value::Null(ty) => *ty,
            Value::Int16(_) => FieldType::ShortInt,
            Value::Int32(_) => FieldType::LongInt,
            Value::Float32(_) => FieldType::Float32,
            Value::Float64(_) => FieldType::Float64,
            Value::Text(_) => FieldType::Text,
            Value::Date(_) => FieldType::Date,
            Value::ObjectId(_) => FieldType::ObjectId,
            Value::Geometry(_) => FieldType::Geometry,
            Value::Blob(_) => FieldType::Blob,
            Value::Guid(_) => FieldType::Guid,
            Value::GlobalId(_) => FieldType::GlobalId,
            Value::Xml(_) => FieldType::Xml,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int16(v) => Some(i64::from(*v)),
            Value::Int32(v) => Some(i64::from(*v)),
            Value::ObjectId(v) => Some(*v),
            _ => None,
        }
    }

    /// GUID of a `Guid` or `GlobalId` value
    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            Value::Guid(id) | Value::GlobalId(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Geometry(b) | Value::Blob(b) | Value::Xml(b) => Some(b),
            _ => None,
        }
    }

    /// Move the bytes out of a `Geometry`, `Blob` or `Xml` value.
    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Value::Geometry(b) | Value::Blob(b) | Value::Xml(b) => Some(b),
            _ => None,
        }
    }
}

//! Field types and descriptor flags

use bitflags::bitflags;

/// Declared type of a table field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    ShortInt,
    LongInt,
    Float32,
    Float64,
    Text,
    Date,
    ObjectId,
    Geometry,
    Blob,
    Guid,
    GlobalId,
    Xml,
}

impl FieldType {
    /// Map an on-disk type code. Codes this reader cannot decode return `None`.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(FieldType::ShortInt),
            1 => Some(FieldType::LongInt),
            2 => Some(FieldType::Float32),
            3 => Some(FieldType::Float64),
            4 => Some(FieldType::Text),
            5 => Some(FieldType::Date),
            6 => Some(FieldType::ObjectId),
            7 => Some(FieldType::Geometry),
            8 => Some(FieldType::Blob),
            10 => Some(FieldType::Guid),
            11 => Some(FieldType::GlobalId),
            12 => Some(FieldType::Xml),
            _ => None,
        }
    }

    /// On-disk type code
    pub fn code(&self) -> u8 {
        match self {
            FieldType::ShortInt => 0,
            FieldType::LongInt => 1,
            FieldType::Float32 => 2,
            FieldType::Float64 => 3,
            FieldType::Text => 4,
            FieldType::Date => 5,
            FieldType::ObjectId => 6,
            FieldType::Geometry => 7,
            FieldType::Blob => 8,
            FieldType::Guid => 10,
            FieldType::GlobalId => 11,
            FieldType::Xml => 12,
        }
    }

    /// Map an `esriFieldType*` name as found in item definitions.
    pub fn from_esri_name(name: &str) -> Option<Self> {
        let name = name.strip_prefix("esriFieldType").unwrap_or(name);
        match name {
            "SmallInteger" => Some(FieldType::ShortInt),
            "Integer" => Some(FieldType::LongInt),
            "Single" => Some(FieldType::Float32),
            "Double" => Some(FieldType::Float64),
            "String" => Some(FieldType::Text),
            "Date" => Some(FieldType::Date),
            "OID" => Some(FieldType::ObjectId),
            "Geometry" => Some(FieldType::Geometry),
            "Blob" => Some(FieldType::Blob),
            "GUID" => Some(FieldType::Guid),
            "GlobalID" => Some(FieldType::GlobalId),
            "XML" => Some(FieldType::Xml),
            _ => None,
        }
    }

    /// Width in bytes of the stored value, `None` for length-prefixed types.
    ///
    /// Object ids are implicit and occupy no bytes in a record.
    pub fn fixed_width(&self) -> Option<usize> {
        match self {
            FieldType::ShortInt => Some(2),
            FieldType::LongInt | FieldType::Float32 => Some(4),
            FieldType::Float64 | FieldType::Date => Some(8),
            FieldType::Guid | FieldType::GlobalId => Some(16),
            FieldType::ObjectId => Some(0),
            FieldType::Text | FieldType::Geometry | FieldType::Blob | FieldType::Xml => None,
        }
    }

    /// Returns `true` for length-prefixed types.
    pub fn is_variable_width(&self) -> bool {
        self.fixed_width().is_none()
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

bitflags! {
    /// Per-field flags byte of a field descriptor.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FieldFlags: u8 {
        const NULLABLE = 0x01;
        const REQUIRED = 0x04;
        const EDITABLE = 0x08;
    }
}

//! Core types used throughout fgdb-tools-rs

pub mod field_type;
pub mod geometry;
pub mod kind;
pub mod value;

pub use field_type::{FieldFlags, FieldType};
pub use geometry::{Extent, GeometryType};
pub use kind::Kind;
pub use value::{days_to_unix_seconds, Value, DATE_EPOCH_UNIX_SECONDS};

/// Table magic numbers accepted in the first four bytes of a `.gdbtable`.
///
/// 3 is written by ArcGIS 9.x/10.x, 4 by the 64-bit layout.
pub const TABLE_MAGICS: [u32; 2] = [3, 4];

/// Record format version enumeration, read from the field descriptor block
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TableVersion {
    /// Unknown version
    Unknown,
    /// File geodatabase 9.x (code 3)
    Fgdb9,
    /// File geodatabase 10.x (code 4)
    Fgdb10,
}

impl TableVersion {
    /// Get the version string (e.g., "10.x")
    pub fn as_str(&self) -> &'static str {
        match self {
            TableVersion::Unknown => "UNKNOWN",
            TableVersion::Fgdb9 => "9.x",
            TableVersion::Fgdb10 => "10.x",
        }
    }

    /// Get the numeric version code
    pub fn version_code(&self) -> u32 {
        match self {
            TableVersion::Unknown => 0,
            TableVersion::Fgdb9 => 3,
            TableVersion::Fgdb10 => 4,
        }
    }

    /// Create version from numeric code
    pub fn from_version_code(code: u32) -> Self {
        match code {
            3 => TableVersion::Fgdb9,
            4 => TableVersion::Fgdb10,
            _ => TableVersion::Unknown,
        }
    }
}

impl std::fmt::Display for TableVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

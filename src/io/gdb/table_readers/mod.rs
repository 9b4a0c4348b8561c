//! Physical table access: headers, field descriptors, indexes and records.

pub mod field_descriptor;
pub mod record_decoder;
pub mod table_header;
pub mod table_index;
pub mod table_reader;
pub mod varint;

pub use field_descriptor::{FieldDescriptor, GeometryDef};
pub use record_decoder::{Record, RecordDecoder};
pub use table_header::{TableHeader, TABLE_HEADER_SIZE};
pub use table_index::TableIndex;
pub use table_reader::{Records, TableReader, INDEX_EXTENSION, TABLE_EXTENSION};

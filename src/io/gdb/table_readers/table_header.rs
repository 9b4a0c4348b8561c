//! `.gdbtable` header and field descriptor block.

use std::io::{Read, Seek, SeekFrom};

use byteorder::{LittleEndian, ReadBytesExt};
use nom::number::complete::{le_i32, le_u16, le_u32, le_u64};
use nom::IResult;

use crate::error::{CatalogError, Result};
use crate::types::{GeometryType, TableVersion, TABLE_MAGICS};

use super::field_descriptor::FieldDescriptor;

/// Size of the fixed header at the start of every table file.
pub const TABLE_HEADER_SIZE: usize = 40;

/// Fixed-size prelude of a table file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TablePrelude {
    magic: u32,
    record_count: i32,
    max_record_size: u32,
    file_size: u64,
    descriptor_offset: u64,
}

fn table_prelude(input: &[u8]) -> IResult<&[u8], TablePrelude> {
    let (input, magic) = le_u32(input)?;
    let (input, record_count) = le_i32(input)?;
    let (input, max_record_size) = le_u32(input)?;
    let (input, _reserved) = le_u32(input)?;
    let (input, _reserved) = le_u64(input)?;
    let (input, file_size) = le_u64(input)?;
    let (input, descriptor_offset) = le_u64(input)?;
    Ok((
        input,
        TablePrelude {
            magic,
            record_count,
            max_record_size,
            file_size,
            descriptor_offset,
        },
    ))
}

fn descriptor_prelude(input: &[u8]) -> IResult<&[u8], (u32, u32, u16)> {
    let (input, version) = le_u32(input)?;
    let (input, layer_flags) = le_u32(input)?;
    let (input, field_count) = le_u16(input)?;
    Ok((input, (version, layer_flags, field_count)))
}

/// Parsed header of one table file.
#[derive(Debug, Clone, PartialEq)]
pub struct TableHeader {
    /// Table magic (see [`TABLE_MAGICS`])
    pub magic: u32,
    /// Number of valid (non-deleted) records
    pub record_count: i32,
    /// Size of the largest record as recorded by the writer
    pub max_record_size: u32,
    /// File size as recorded by the writer
    pub file_size: u64,
    /// Record format version from the descriptor block
    pub version: TableVersion,
    /// Geometry type from the layer flags, `None` for plain tables
    pub geometry_type: GeometryType,
    pub fields: Vec<FieldDescriptor>,
    /// Offset of the first record
    pub data_offset: u64,
}

impl TableHeader {
    /// Read the header and the field descriptor block from a table stream.
    ///
    /// `max_descriptor_size` bounds the allocation for the descriptor block.
    pub fn read<R: Read + Seek>(reader: &mut R, max_descriptor_size: u32) -> Result<Self> {
        let mut fixed = [0u8; TABLE_HEADER_SIZE];
        reader.seek(SeekFrom::Start(0))?;
        reader
            .read_exact(&mut fixed)
            .map_err(|_| CatalogError::format("file too short for a table header"))?;

        let (_, prelude) = table_prelude(&fixed)
            .map_err(|_| CatalogError::format("unreadable table header"))?;

        if !TABLE_MAGICS.contains(&prelude.magic) {
            return Err(CatalogError::format(format!(
                "unknown table magic {:#x}",
                prelude.magic
            )));
        }
        if prelude.record_count < 0 {
            return Err(CatalogError::format(format!(
                "negative record count {}",
                prelude.record_count
            )));
        }

        reader.seek(SeekFrom::Start(prelude.descriptor_offset))?;
        let block_size = reader
            .read_u32::<LittleEndian>()
            .map_err(|_| CatalogError::format("missing field descriptor block"))?;
        if block_size > max_descriptor_size {
            return Err(CatalogError::format(format!(
                "field descriptor block of {} bytes exceeds limit of {}",
                block_size, max_descriptor_size
            )));
        }

        let mut block = vec![0u8; block_size as usize];
        reader
            .read_exact(&mut block)
            .map_err(|_| CatalogError::format("truncated field descriptor block"))?;

        let (version, geometry_type, fields) = Self::parse_descriptors(&block)?;

        Ok(Self {
            magic: prelude.magic,
            record_count: prelude.record_count,
            max_record_size: prelude.max_record_size,
            file_size: prelude.file_size,
            version,
            geometry_type,
            fields,
            data_offset: prelude.descriptor_offset + 4 + u64::from(block_size),
        })
    }

    fn parse_descriptors(block: &[u8]) -> Result<(TableVersion, GeometryType, Vec<FieldDescriptor>)> {
        let (mut input, (version_code, layer_flags, field_count)) = descriptor_prelude(block)
            .map_err(|_| CatalogError::format("truncated field descriptor block"))?;

        let version = TableVersion::from_version_code(version_code);
        if version == TableVersion::Unknown {
            return Err(CatalogError::format(format!(
                "unknown record format version {}",
                version_code
            )));
        }

        let mut fields = Vec::with_capacity(usize::from(field_count));
        for _ in 0..field_count {
            let (rest, field) = FieldDescriptor::parse(input)?;
            fields.push(field);
            input = rest;
        }

        let geometry_type = GeometryType::from_layer_code((layer_flags & 0xFF) as u8);
        Ok((version, geometry_type, fields))
    }

    /// Number of declared fields
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Size in bytes of each record's null bitmask
    pub fn null_mask_len(&self) -> usize {
        self.fields.len().div_ceil(8)
    }

    /// Case-insensitive lookup of a field position.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|f| f.name.eq_ignore_ascii_case(name))
    }
}

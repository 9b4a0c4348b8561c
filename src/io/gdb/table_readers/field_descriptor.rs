//! Field descriptors of a `.gdbtable` header.
//!
//! Each descriptor starts with a UTF-16LE name and alias, followed by a
//! one-byte type code. The bytes after the type code depend on the type:
//!
//! | Type | Layout |
//! |---|---|
//! | ShortInt, LongInt, Float32, Float64, Date | width, flags, default length, default |
//! | Text | u32 max width, flags, varuint default length, default |
//! | ObjectId, Guid, GlobalId | width, flags |
//! | Blob, Xml | reserved, flags |
//! | Geometry | reserved, flags, spatial reference and grid block |

use encoding_rs::UTF_16LE;
use nom::bytes::complete::take;
use nom::combinator::verify;
use nom::multi::count;
use nom::number::complete::{le_f64, le_u16, le_u32, le_u8};
use nom::IResult;

use crate::error::{CatalogError, Result};
use crate::types::{Extent, FieldFlags, FieldType};

use super::varint::parse_varuint;

/// Upper bound on spatial index grid levels in a geometry descriptor.
const MAX_GRID_SIZES: u32 = 16;

const GEOMETRY_HAS_M: u8 = 0x02;
const GEOMETRY_HAS_Z: u8 = 0x04;

/// Spatial definition attached to a geometry field.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryDef {
    /// Spatial reference as well-known text
    pub wkt: String,
    pub has_z: bool,
    pub has_m: bool,
    pub extent: Extent,
    pub grid_sizes: Vec<f64>,
}

/// One field of a table, immutable once parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub alias: String,
    pub field_type: FieldType,
    pub flags: FieldFlags,
    /// Declared maximum width of a `Text` field
    pub max_width: Option<u32>,
    /// Spatial definition of a `Geometry` field
    pub geometry: Option<GeometryDef>,
}

impl FieldDescriptor {
    /// Create a descriptor without a geometry definition.
    pub fn new(name: impl Into<String>, field_type: FieldType, flags: FieldFlags) -> Self {
        Self {
            name: name.into(),
            alias: String::new(),
            field_type,
            flags,
            max_width: None,
            geometry: None,
        }
    }

    pub fn is_nullable(&self) -> bool {
        self.flags.contains(FieldFlags::NULLABLE)
    }

    /// Width in bytes of the stored value, `None` for length-prefixed types.
    pub fn fixed_width(&self) -> Option<usize> {
        self.field_type.fixed_width()
    }

    /// Parse one descriptor, returning the remaining input.
    pub fn parse(input: &[u8]) -> Result<(&[u8], FieldDescriptor)> {
        let (input, (name, alias, code)) = field_prelude(input)
            .map_err(|_| CatalogError::format("truncated field descriptor"))?;

        let field_type = FieldType::from_code(code).ok_or_else(|| {
            CatalogError::format(format!("field '{}' has unsupported type code {}", name, code))
        })?;

        let (input, layout) = field_layout(field_type, input).map_err(|_| {
            CatalogError::format(format!("truncated descriptor for field '{}'", name))
        })?;

        Ok((
            input,
            FieldDescriptor {
                name,
                alias,
                field_type,
                flags: layout.flags,
                max_width: layout.max_width,
                geometry: layout.geometry,
            },
        ))
    }
}

struct FieldLayout {
    flags: FieldFlags,
    max_width: Option<u32>,
    geometry: Option<GeometryDef>,
}

impl FieldLayout {
    fn flags(flags: u8) -> Self {
        Self {
            flags: FieldFlags::from_bits_truncate(flags),
            max_width: None,
            geometry: None,
        }
    }
}

/// UTF-16LE string prefixed by its length in characters.
pub(crate) fn utf16_prefixed(input: &[u8]) -> IResult<&[u8], String> {
    let (input, chars) = le_u8(input)?;
    let (input, bytes) = take(usize::from(chars) * 2)(input)?;
    let (text, _) = UTF_16LE.decode_without_bom_handling(bytes);
    Ok((input, text.into_owned()))
}

fn field_prelude(input: &[u8]) -> IResult<&[u8], (String, String, u8)> {
    let (input, name) = utf16_prefixed(input)?;
    let (input, alias) = utf16_prefixed(input)?;
    let (input, code) = le_u8(input)?;
    Ok((input, (name, alias, code)))
}

fn field_layout(field_type: FieldType, input: &[u8]) -> IResult<&[u8], FieldLayout> {
    match field_type {
        FieldType::ShortInt
        | FieldType::LongInt
        | FieldType::Float32
        | FieldType::Float64
        | FieldType::Date => {
            let (input, _width) = le_u8(input)?;
            let (input, flags) = le_u8(input)?;
            let (input, default_len) = le_u8(input)?;
            let (input, _default) = take(default_len)(input)?;
            Ok((input, FieldLayout::flags(flags)))
        }
        FieldType::Text => {
            let (input, max_width) = le_u32(input)?;
            let (input, flags) = le_u8(input)?;
            let (input, default_len) = parse_varuint(input)?;
            let (input, _default) = take(default_len as usize)(input)?;
            Ok((
                input,
                FieldLayout {
                    max_width: Some(max_width),
                    ..FieldLayout::flags(flags)
                },
            ))
        }
        FieldType::ObjectId
        | FieldType::Guid
        | FieldType::GlobalId
        | FieldType::Blob
        | FieldType::Xml => {
            let (input, _width) = le_u8(input)?;
            let (input, flags) = le_u8(input)?;
            Ok((input, FieldLayout::flags(flags)))
        }
        FieldType::Geometry => {
            let (input, _reserved) = le_u8(input)?;
            let (input, flags) = le_u8(input)?;
            let (input, geometry) = geometry_def(input)?;
            Ok((
                input,
                FieldLayout {
                    geometry: Some(geometry),
                    ..FieldLayout::flags(flags)
                },
            ))
        }
    }
}

fn geometry_def(input: &[u8]) -> IResult<&[u8], GeometryDef> {
    let (input, wkt_len) = le_u16(input)?;
    let (input, wkt_bytes) = take(wkt_len)(input)?;
    let (wkt, _) = UTF_16LE.decode_without_bom_handling(wkt_bytes);

    let (input, geometry_flags) = le_u8(input)?;
    let has_m = geometry_flags & GEOMETRY_HAS_M != 0;
    let has_z = geometry_flags & GEOMETRY_HAS_Z != 0;
    let extra_axes = usize::from(has_m) + usize::from(has_z);

    // origins and scales, then tolerances
    let (input, _xy_origin_scale) = count(le_f64, 3)(input)?;
    let (input, _mz_origin_scale) = count(le_f64, 2 * extra_axes)(input)?;
    let (input, _xy_tolerance) = le_f64(input)?;
    let (input, _mz_tolerance) = count(le_f64, extra_axes)(input)?;

    let (input, xmin) = le_f64(input)?;
    let (input, ymin) = le_f64(input)?;
    let (input, xmax) = le_f64(input)?;
    let (input, ymax) = le_f64(input)?;
    let (input, _zm_bounds) = count(le_f64, 2 * extra_axes)(input)?;

    let (input, _reserved) = le_u8(input)?;
    let (input, grid_count) = verify(le_u32, |n: &u32| *n <= MAX_GRID_SIZES)(input)?;
    let (input, grid_sizes) = count(le_f64, grid_count as usize)(input)?;

    Ok((
        input,
        GeometryDef {
            wkt: wkt.into_owned(),
            has_z,
            has_m,
            extent: Extent::new(xmin, ymin, xmax, ymax),
            grid_sizes,
        },
    ))
}

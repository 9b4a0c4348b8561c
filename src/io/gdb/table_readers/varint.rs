//! Unsigned LEB128 integers used for variable-width lengths.

use std::io::{self, Read};

use byteorder::ReadBytesExt;
use nom::error::{Error, ErrorKind};
use nom::number::complete::le_u8;
use nom::IResult;

/// Parse a varuint from a byte slice.
pub fn parse_varuint(input: &[u8]) -> IResult<&[u8], u64> {
    let mut value = 0u64;
    let mut shift = 0u32;
    let mut rest = input;
    loop {
        let (next, byte) = le_u8(rest)?;
        rest = next;
        if shift >= 64 {
            return Err(nom::Err::Error(Error::new(input, ErrorKind::TooLarge)));
        }
        value |= u64::from(byte & 0x7F) << shift;
        if byte & 0x80 == 0 {
            return Ok((rest, value));
        }
        shift += 7;
    }
}

/// Read a varuint from a stream.
pub fn read_varuint<R: Read>(reader: &mut R) -> io::Result<u64> {
    let mut value = 0u64;
    let mut shift = 0u32;
    loop {
        let byte = reader.read_u8()?;
        if shift >= 64 {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "varuint overflows 64 bits"));
        }
        value |= u64::from(byte & 0x7F) << shift;
        if byte & 0x80 == 0 {
            return Ok(value);
        }
        shift += 7;
    }
}

//! `.gdbtablx` companion index: per-row offsets into the table file.

use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::{CatalogError, Result};

/// Rows covered by one index block.
pub const ROWS_PER_BLOCK: usize = 1024;

const INDEX_HEADER_SIZE: usize = 16;
const INDEX_MAGIC: u32 = 3;

/// Decoded row offsets of a table.
///
/// Only live rows are kept, as `(object_id, offset)` in row order; the
/// declared row count can be far larger than what the file stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableIndex {
    row_count: usize,
    live: Vec<(i64, u64)>,
}

impl TableIndex {
    /// Parse a complete index file.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < INDEX_HEADER_SIZE {
            return Err(CatalogError::format("index file too short"));
        }

        let mut cursor = Cursor::new(bytes);
        let magic = cursor.read_u32::<LittleEndian>()?;
        let blocks = cursor.read_u32::<LittleEndian>()? as usize;
        let total_rows = cursor.read_u32::<LittleEndian>()? as usize;
        let offset_size = cursor.read_u32::<LittleEndian>()? as usize;

        if magic != INDEX_MAGIC {
            return Err(CatalogError::format(format!("unknown index magic {:#x}", magic)));
        }
        if !(4..=6).contains(&offset_size) {
            return Err(CatalogError::format(format!("unsupported offset width {}", offset_size)));
        }

        let stored = blocks
            .checked_mul(ROWS_PER_BLOCK * offset_size)
            .filter(|len| *len <= bytes.len() - INDEX_HEADER_SIZE)
            .ok_or_else(|| CatalogError::format("index declares more blocks than it holds"))?;

        let mut block_offsets = Vec::with_capacity(blocks * ROWS_PER_BLOCK);
        for _ in 0..blocks * ROWS_PER_BLOCK {
            block_offsets.push(read_offset(&mut cursor, offset_size)?);
        }
        debug_assert_eq!(cursor.position() as usize, INDEX_HEADER_SIZE + stored);

        let required_blocks = total_rows.div_ceil(ROWS_PER_BLOCK);
        let live = if blocks >= required_blocks {
            block_offsets.truncate(total_rows);
            live_in_block(0, &block_offsets, total_rows).collect()
        } else {
            Self::expand_sparse(&mut cursor, &block_offsets, blocks, total_rows)?
        };

        Ok(Self {
            row_count: total_rows,
            live,
        })
    }

    /// Place the stored blocks among all rows using the trailing block bitmap.
    fn expand_sparse(
        cursor: &mut Cursor<&[u8]>,
        block_offsets: &[u64],
        blocks: usize,
        total_rows: usize,
    ) -> Result<Vec<(i64, u64)>> {
        let truncated = |_| CatalogError::format("truncated index block bitmap");
        let words = cursor.read_u32::<LittleEndian>().map_err(truncated)? as usize;
        let total_blocks = cursor.read_u32::<LittleEndian>().map_err(truncated)? as usize;
        let present_blocks = cursor.read_u32::<LittleEndian>().map_err(truncated)? as usize;
        let _leading_words = cursor.read_u32::<LittleEndian>().map_err(truncated)?;

        let remaining = cursor.get_ref().len() - cursor.position() as usize;
        if present_blocks != blocks || words.saturating_mul(4) > remaining || words * 32 < total_blocks {
            return Err(CatalogError::format("inconsistent index block bitmap"));
        }
        if total_blocks < total_rows.div_ceil(ROWS_PER_BLOCK) {
            return Err(CatalogError::format("index block bitmap does not cover every row"));
        }

        let mut bitmap = Vec::with_capacity(words);
        for _ in 0..words {
            bitmap.push(cursor.read_u32::<LittleEndian>().map_err(truncated)?);
        }

        let mut live = Vec::new();
        let mut stored = block_offsets.chunks(ROWS_PER_BLOCK);
        for block in 0..total_blocks {
            if bitmap[block / 32] & (1 << (block % 32)) == 0 {
                continue;
            }
            let chunk = stored
                .next()
                .ok_or_else(|| CatalogError::format("index bitmap marks more blocks than stored"))?;
            live.extend(live_in_block(block * ROWS_PER_BLOCK, chunk, total_rows));
        }
        Ok(live)
    }

    /// Total rows, deleted ones included
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Rows that still point at a record
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// `(object_id, offset)` of every live row, in row order.
    pub fn live_rows(&self) -> impl Iterator<Item = (i64, u64)> + '_ {
        self.live.iter().copied()
    }

    /// Check the index against its table; an index failing this is not used.
    pub fn validate(&self, record_count: i32, data_offset: u64, table_len: u64) -> Result<()> {
        let live = self.live_count();
        if live != record_count as usize {
            return Err(CatalogError::format(format!(
                "index lists {} live records but header declares {}",
                live, record_count
            )));
        }
        if let Some((object_id, offset)) = self
            .live_rows()
            .find(|(_, offset)| *offset < data_offset || offset + 4 > table_len)
        {
            return Err(CatalogError::format(format!(
                "index offset {} of row {} lies outside the record area",
                offset, object_id
            )));
        }
        Ok(())
    }
}

/// Non-zero offsets of one run of rows starting at row index `start`.
fn live_in_block(
    start: usize,
    offsets: &[u64],
    total_rows: usize,
) -> impl Iterator<Item = (i64, u64)> + '_ {
    offsets
        .iter()
        .enumerate()
        .map(move |(i, offset)| (start + i, *offset))
        .filter(move |(row, offset)| *offset != 0 && *row < total_rows)
        .map(|(row, offset)| (row as i64 + 1, offset))
}

fn read_offset<R: Read>(reader: &mut R, width: usize) -> Result<u64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf[..width])?;
    Ok(u64::from_le_bytes(buf))
}

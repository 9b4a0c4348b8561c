//! Reader for one physical `.gdbtable` file.
//!
//! The reader parses the header once at open time. Every call to
//! [`TableReader::records`] opens a fresh file handle, so scans are
//! restartable and independent; the handle is closed when the returned
//! iterator is dropped, whether it ran to completion or not.

use std::fs::{self, File};
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, ReadBytesExt};
use tracing::debug;

use crate::error::{CatalogError, Result};
use crate::io::gdb::gdb_reader_configuration::GdbReaderConfiguration;

use super::field_descriptor::FieldDescriptor;
use super::record_decoder::{Record, RecordDecoder};
use super::table_header::TableHeader;
use super::table_index::TableIndex;

/// Extension of table data files
pub const TABLE_EXTENSION: &str = "gdbtable";
/// Extension of table index files
pub const INDEX_EXTENSION: &str = "gdbtablx";

/// An opened table: header plus the means to scan its records.
#[derive(Debug)]
pub struct TableReader {
    path: PathBuf,
    header: TableHeader,
    index: Option<TableIndex>,
    file_len: u64,
    max_record_size: u32,
}

impl TableReader {
    /// Open a table file, reading its header and, when configured, its index.
    ///
    /// A companion index is used only if it is well-formed and agrees with
    /// the header; otherwise records are found by a linear scan.
    pub fn open(path: impl AsRef<Path>, configuration: &GdbReaderConfiguration) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let file_len = file.metadata()?.len();
        let mut reader = BufReader::new(file);

        let header = TableHeader::read(&mut reader, configuration.max_descriptor_size)
            .map_err(|e| in_table(&path, e))?;

        let index = if configuration.use_index {
            Self::load_index(&path, &header, file_len)
        } else {
            None
        };

        debug!(
            table = %path.display(),
            records = header.record_count,
            fields = header.field_count(),
            indexed = index.is_some(),
            "opened table"
        );

        Ok(Self {
            path,
            header,
            index,
            file_len,
            max_record_size: configuration.max_record_size,
        })
    }

    fn load_index(path: &Path, header: &TableHeader, file_len: u64) -> Option<TableIndex> {
        let index_path = path.with_extension(INDEX_EXTENSION);
        let bytes = match fs::read(&index_path) {
            Ok(bytes) => bytes,
            Err(_) => {
                debug!(table = %path.display(), "no index file, using linear scan");
                return None;
            }
        };

        let index = TableIndex::parse(&bytes)
            .and_then(|index| {
                index.validate(header.record_count, header.data_offset, file_len)?;
                Ok(index)
            });

        match index {
            Ok(index) => Some(index),
            Err(e) => {
                debug!(table = %path.display(), error = %e, "index unusable, using linear scan");
                None
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name of the table, used in messages
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn header(&self) -> &TableHeader {
        &self.header
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.header.fields
    }

    /// Case-insensitive lookup of a field position.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.header.field_index(name)
    }

    /// Returns `true` when scans seek through the companion index.
    pub fn uses_index(&self) -> bool {
        self.index.is_some()
    }

    /// Start a fresh scan over the table's records.
    ///
    /// Items are `Err` for records that could not be decoded; such errors
    /// affect only that record and the scan continues. A structural error
    /// that prevents walking further ends the scan after being yielded.
    pub fn records(&self) -> Result<Records<'_>> {
        let file = File::open(&self.path)?;
        let mode = match &self.index {
            Some(index) => ScanMode::Indexed {
                rows: Box::new(index.live_rows()),
            },
            None => ScanMode::Linear {
                position: self.header.data_offset,
                next_object_id: 1,
                live_seen: 0,
            },
        };

        Ok(Records {
            table: self,
            reader: BufReader::new(file),
            decoder: RecordDecoder::new(&self.header.fields),
            mode,
            finished: false,
        })
    }
}

enum ScanMode<'a> {
    Indexed {
        rows: Box<dyn Iterator<Item = (i64, u64)> + 'a>,
    },
    Linear {
        position: u64,
        next_object_id: i64,
        live_seen: i64,
    },
}

/// Lazy sequence of decoded records from one table.
pub struct Records<'a> {
    table: &'a TableReader,
    reader: BufReader<File>,
    decoder: RecordDecoder<'a>,
    mode: ScanMode<'a>,
    finished: bool,
}

impl<'a> Records<'a> {
    fn read_length_at(&mut self, offset: u64) -> Result<i32> {
        self.reader.seek(SeekFrom::Start(offset))?;
        Ok(self.reader.read_i32::<LittleEndian>()?)
    }

    fn read_payload(&mut self, offset: u64, len: u32) -> Result<Vec<u8>> {
        if len > self.table.max_record_size {
            return Err(CatalogError::format(format!(
                "record at offset {} claims {} bytes, limit is {}",
                offset, len, self.table.max_record_size
            )));
        }
        if offset + 4 + u64::from(len) > self.table.file_len {
            return Err(CatalogError::format(format!(
                "record at offset {} claims {} bytes past end of file",
                offset, len
            )));
        }
        let mut payload = vec![0u8; len as usize];
        self.reader.read_exact(&mut payload)?;
        Ok(payload)
    }

    fn next_indexed(&mut self) -> Option<Result<Record>> {
        loop {
            let (object_id, offset) = match &mut self.mode {
                ScanMode::Indexed { rows } => rows.next()?,
                ScanMode::Linear { .. } => return None,
            };

            let len = match self.read_length_at(offset) {
                Ok(len) => len,
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            };
            if len <= 0 {
                continue;
            }

            let record = self
                .read_payload(offset, len as u32)
                .and_then(|payload| self.decoder.decode(object_id, &payload));
            return Some(record);
        }
    }

    fn next_linear(&mut self) -> Option<Result<Record>> {
        loop {
            let (position, object_id, live_seen) = match &self.mode {
                ScanMode::Linear {
                    position,
                    next_object_id,
                    live_seen,
                } => (*position, *next_object_id, *live_seen),
                ScanMode::Indexed { .. } => return None,
            };

            let record_count = i64::from(self.table.header.record_count);
            if live_seen >= record_count {
                return None;
            }
            if position + 4 > self.table.file_len {
                self.finished = true;
                return Some(Err(CatalogError::format(format!(
                    "header declares {} records, file holds {}",
                    record_count, live_seen
                ))));
            }

            let len = match self.read_length_at(position) {
                Ok(len) => len,
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            };

            let span = u64::from(len.unsigned_abs());
            if let ScanMode::Linear {
                position,
                next_object_id,
                live_seen,
            } = &mut self.mode
            {
                *position += 4 + span;
                *next_object_id += 1;
                if len > 0 {
                    *live_seen += 1;
                }
            }

            if len <= 0 {
                continue;
            }

            let payload = match self.read_payload(position, len as u32) {
                Ok(payload) => payload,
                Err(e) => {
                    // the walk cannot continue past a bogus length
                    self.finished = true;
                    return Some(Err(e));
                }
            };
            return Some(self.decoder.decode(object_id, &payload));
        }
    }
}

impl<'a> Iterator for Records<'a> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let item = match self.mode {
            ScanMode::Indexed { .. } => self.next_indexed(),
            ScanMode::Linear { .. } => self.next_linear(),
        };
        match item {
            Some(Err(e)) => Some(Err(in_table(&self.table.path, e))),
            other => {
                if other.is_none() {
                    self.finished = true;
                }
                other
            }
        }
    }
}

fn in_table(path: &Path, err: CatalogError) -> CatalogError {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match err {
        CatalogError::Format(message) => CatalogError::Format(format!("{}: {}", name, message)),
        other => other,
    }
}

//! Locates the master catalog and the items table of a geodatabase.
//!
//! Tables are stored as `a<hex8>.gdbtable` files. Table 1 is the master
//! catalog: row *n* names table *n*, its first row names itself, and the
//! row named `GDB_Items` identifies the items table.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{CatalogError, Result};
use crate::io::gdb::gdb_reader_configuration::GdbReaderConfiguration;
use crate::io::gdb::table_readers::{TableReader, TABLE_EXTENSION};
use crate::notification::{Notification, NotificationType};
use crate::types::Value;

/// Table number of the master catalog
pub const MASTER_CATALOG_NUMBER: u32 = 1;
/// Name the master catalog gives itself in its first row
pub const MASTER_CATALOG_NAME: &str = "GDB_SystemCatalog";
/// Name of the items table in the master catalog
pub const ITEMS_TABLE_NAME: &str = "GDB_Items";

/// File name of table number `number`.
pub fn table_file_name(number: u32) -> String {
    format!("a{:08x}.{}", number, TABLE_EXTENSION)
}

/// Table number encoded in a table file name, if it is one.
pub fn table_number(file_name: &str) -> Option<u32> {
    let stem = file_name.strip_suffix(TABLE_EXTENSION)?.strip_suffix('.')?;
    let hex = stem.strip_prefix('a').or_else(|| stem.strip_prefix('A'))?;
    if hex.len() != 8 {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

/// One row of the master catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemCatalogEntry {
    /// Table number, equal to the row number
    pub number: u32,
    pub name: String,
    pub file_format: Option<i64>,
    /// Whether the table's data file is present in the directory
    pub exists: bool,
}

/// The two system tables needed to resolve a catalog.
#[derive(Debug)]
pub struct SystemCatalog {
    directory: PathBuf,
    entries: Vec<SystemCatalogEntry>,
    items: TableReader,
    items_number: u32,
    notifications: Vec<Notification>,
}

impl SystemCatalog {
    /// Find and open the system tables of the geodatabase at `directory`.
    pub fn locate(directory: impl AsRef<Path>, configuration: &GdbReaderConfiguration) -> Result<Self> {
        let directory = directory.as_ref().to_path_buf();
        if !directory.is_dir() {
            return Err(CatalogError::not_found(format!(
                "{} is not a directory",
                directory.display()
            )));
        }

        let tables = list_tables(&directory)?;
        let master_path = tables.get(&MASTER_CATALOG_NUMBER).ok_or_else(|| {
            CatalogError::not_found(format!(
                "{} has no master catalog {}",
                directory.display(),
                table_file_name(MASTER_CATALOG_NUMBER)
            ))
        })?;

        let master = TableReader::open(master_path, configuration)?;
        let mut notifications = Vec::new();
        let entries = read_entries(&master, &tables, &mut notifications)?;

        match entries.first() {
            Some(first) if first.number == MASTER_CATALOG_NUMBER
                && first.name.eq_ignore_ascii_case(MASTER_CATALOG_NAME) => {}
            _ => {
                return Err(CatalogError::not_found(format!(
                    "{} does not describe itself as {}",
                    master.name(),
                    MASTER_CATALOG_NAME
                )))
            }
        }

        let items_entry = entries
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(ITEMS_TABLE_NAME))
            .ok_or_else(|| {
                CatalogError::not_found(format!("master catalog lists no {}", ITEMS_TABLE_NAME))
            })?;
        let items_path = tables.get(&items_entry.number).ok_or_else(|| {
            CatalogError::not_found(format!(
                "{} is table {} but {} is missing",
                ITEMS_TABLE_NAME,
                items_entry.number,
                table_file_name(items_entry.number)
            ))
        })?;
        let items_number = items_entry.number;
        let items = TableReader::open(items_path, configuration)?;

        debug!(
            directory = %directory.display(),
            tables = tables.len(),
            items_table = items_number,
            "located system catalog"
        );

        Ok(Self {
            directory,
            entries,
            items,
            items_number,
            notifications,
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Rows of the master catalog, in table-number order.
    pub fn entries(&self) -> &[SystemCatalogEntry] {
        &self.entries
    }

    pub fn items_table(&self) -> &TableReader {
        &self.items
    }

    pub fn items_table_number(&self) -> u32 {
        self.items_number
    }

    /// Records of the master catalog that could not be read.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }
}

fn list_tables(directory: &Path) -> Result<BTreeMap<u32, PathBuf>> {
    let mut tables = BTreeMap::new();
    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        let file_name = entry.file_name();
        if let Some(number) = file_name.to_str().and_then(table_number) {
            tables.insert(number, entry.path());
        }
    }
    Ok(tables)
}

fn read_entries(
    master: &TableReader,
    tables: &BTreeMap<u32, PathBuf>,
    notifications: &mut Vec<Notification>,
) -> Result<Vec<SystemCatalogEntry>> {
    let name_column = master.field_index("Name").ok_or_else(|| {
        CatalogError::not_found(format!("{} has no 'Name' column", master.name()))
    })?;
    let format_column = master.field_index("FileFormat");

    let mut entries = Vec::new();
    for (position, record) in master.records()?.enumerate() {
        let mut record = match record {
            Ok(record) => record,
            // without its first row the catalog cannot be trusted
            Err(e) if position == 0 => {
                return Err(CatalogError::not_found(format!("unreadable master catalog: {}", e)))
            }
            Err(e) => {
                debug!(table = %master.name(), error = %e, "skipped master catalog record");
                notifications.push(
                    Notification::new(NotificationType::SkippedRecord, e.to_string())
                        .with_subject(master.name()),
                );
                continue;
            }
        };

        let Ok(number) = u32::try_from(record.object_id) else {
            continue;
        };
        let name = match record.take(name_column) {
            Some(Value::Text(name)) => name,
            _ => String::new(),
        };
        let file_format = format_column
            .and_then(|i| record.get(i))
            .and_then(Value::as_i64);

        entries.push(SystemCatalogEntry {
            number,
            name,
            file_format,
            exists: tables.contains_key(&number),
        });
    }
    Ok(entries)
}

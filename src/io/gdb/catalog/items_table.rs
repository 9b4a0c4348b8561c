//! Reads catalog entries out of the `GDB_Items` table.

use tracing::debug;
use uuid::Uuid;

use crate::error::{CatalogError, Result};
use crate::io::gdb::table_readers::{Record, TableReader};
use crate::notification::{Notification, NotificationType};
use crate::types::Value;

use super::catalog_item::CatalogItem;
use super::item_classifier::is_workspace;

/// Column positions of the items table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemsColumns {
    pub uuid: usize,
    pub type_id: usize,
    pub name: usize,
    pub path: usize,
    pub physical_name: Option<usize>,
    pub definition: Option<usize>,
    pub documentation: Option<usize>,
}

impl ItemsColumns {
    /// Resolve column positions by name, case-insensitively.
    pub fn locate(table: &TableReader) -> Result<Self> {
        let required = |name: &str| {
            table.field_index(name).ok_or_else(|| {
                CatalogError::not_found(format!(
                    "items table {} has no '{}' column",
                    table.name(),
                    name
                ))
            })
        };

        Ok(Self {
            uuid: required("UUID")?,
            type_id: required("Type")?,
            name: required("Name")?,
            path: required("Path")?,
            physical_name: table.field_index("PhysicalName"),
            definition: table.field_index("Definition"),
            documentation: table.field_index("Documentation"),
        })
    }
}

/// Entries read from the items table, with the records that were passed over.
#[derive(Debug, Default)]
pub struct ItemsRead {
    pub items: Vec<CatalogItem>,
    pub notifications: Vec<Notification>,
}

/// Read every usable entry of the items table in scan order.
///
/// Records that fail to decode, or that lack a type or a name, are
/// reported as skipped and never reach the result. Items without a
/// readable `UUID` are kept with a warning.
pub fn read_items(table: &TableReader) -> Result<ItemsRead> {
    let columns = ItemsColumns::locate(table)?;
    let mut read = ItemsRead::default();

    for record in table.records()? {
        let skip = |message: String| {
            debug!(table = %table.name(), reason = %message, "skipped items record");
            Notification::new(NotificationType::SkippedRecord, message).with_subject(table.name())
        };
        match record {
            Ok(record) => match to_item(record, &columns) {
                Ok(item) => {
                    if item.uuid.is_none() && !is_workspace(&item.type_id) {
                        read.notifications.push(
                            Notification::new(NotificationType::MetadataWarning, "item has no readable UUID")
                                .with_subject(item.name.clone()),
                        );
                    }
                    read.items.push(item);
                }
                Err(message) => read.notifications.push(skip(message)),
            },
            Err(e) => read.notifications.push(skip(e.to_string())),
        }
    }

    Ok(read)
}

fn to_item(mut record: Record, columns: &ItemsColumns) -> std::result::Result<CatalogItem, String> {
    let object_id = record.object_id;

    let type_id = record
        .take(columns.type_id)
        .as_ref()
        .and_then(guid_of)
        .ok_or_else(|| format!("record {}: missing item type", object_id))?;
    let name = record
        .take(columns.name)
        .and_then(text_of)
        .filter(|name| !name.is_empty() || is_workspace(&type_id))
        .ok_or_else(|| format!("record {}: missing item name", object_id))?;

    Ok(CatalogItem {
        uuid: record.take(columns.uuid).as_ref().and_then(guid_of),
        type_id,
        name,
        physical_name: columns.physical_name.and_then(|i| record.take(i)).and_then(text_of),
        path: record.take(columns.path).and_then(text_of).unwrap_or_default(),
        definition: columns.definition.and_then(|i| record.take(i)).and_then(bytes_of),
        documentation: columns.documentation.and_then(|i| record.take(i)).and_then(bytes_of),
    })
}

/// GUID from a GUID column or from its braced text form.
fn guid_of(value: &Value) -> Option<Uuid> {
    match value {
        Value::Text(text) => Uuid::parse_str(text.trim().trim_start_matches('{').trim_end_matches('}')).ok(),
        other => other.as_uuid(),
    }
}

fn text_of(value: Value) -> Option<String> {
    match value {
        Value::Text(text) => Some(text),
        _ => None,
    }
}

fn bytes_of(value: Value) -> Option<Vec<u8>> {
    match value {
        Value::Text(text) => Some(text.into_bytes()),
        other => other.into_bytes(),
    }
}

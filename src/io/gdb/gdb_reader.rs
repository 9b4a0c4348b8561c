//! Geodatabase catalog reader.
//!
//! Resolution runs in four passes over one directory:
//! 1. Locate the master catalog and the items table
//! 2. Read the items table
//! 3. Classify every item and parse its definition
//! 4. Place the items into an [`ItemTree`]
//!
//! Nothing is cached between runs; reading the same directory twice
//! yields equal trees.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::Result;
use crate::notification::{Notification, NotificationType};

use super::catalog::item_classifier::{classify, is_workspace, type_label};
use super::catalog::items_table::{read_items, ItemsRead};
use super::catalog::metadata_parser::{parse_definition, ParsedMetadata};
use super::catalog::system_catalog::SystemCatalog;
use super::catalog::{CatalogItem, ClassifiedItem, HierarchyBuilder, ItemTree};
use super::gdb_reader_configuration::GdbReaderConfiguration;

/// Reads the catalog of one geodatabase directory.
///
/// # Example
///
/// ```rust,ignore
/// use fgdb_tools_rs::io::gdb::{GdbReader, GdbReaderConfiguration};
///
/// let tree = GdbReader::new("parcels.gdb", GdbReaderConfiguration::default()).read()?;
/// for (id, item) in tree.iter() {
///     println!("{:?} {} ({})", id, item.name(), item.kind());
/// }
/// ```
#[derive(Debug)]
pub struct GdbReader {
    path: PathBuf,
    /// Reader configuration.
    configuration: GdbReaderConfiguration,
    /// Collected notifications.
    notifications: Vec<Notification>,
}

impl GdbReader {
    pub fn new(path: impl AsRef<Path>, configuration: GdbReaderConfiguration) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            configuration,
            notifications: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn configuration(&self) -> &GdbReaderConfiguration {
        &self.configuration
    }

    /// Resolve the catalog into an item tree.
    ///
    /// Fails only when the directory holds no usable system catalog or a
    /// system table cannot be read at all. Everything recoverable is
    /// reported through [`ItemTree::notifications`].
    pub fn read(&mut self) -> Result<ItemTree> {
        // 1. System tables
        let mut catalog = SystemCatalog::locate(&self.path, &self.configuration)?;
        self.notifications.extend(catalog.take_notifications());

        // 2. Items
        let ItemsRead {
            items,
            notifications,
        } = read_items(catalog.items_table())?;
        self.notifications.extend(notifications);
        let items = self.filter_items(items);

        // 3. Classification and definitions
        let resolved = self.resolve_items(items);

        // 4. Hierarchy
        let mut placed = Vec::with_capacity(resolved.len());
        for (item, warnings) in resolved {
            for warning in warnings {
                self.notify(warning, NotificationType::MetadataWarning, item.name());
            }
            placed.push(item);
        }

        let mut builder = HierarchyBuilder::with_notifications(std::mem::take(&mut self.notifications));
        for item in placed {
            builder.add(item);
        }
        let tree = builder.build();

        if tree.has_conflicts() {
            warn!(
                geodatabase = %self.path.display(),
                "catalog has structural conflicts"
            );
        }
        debug!(
            geodatabase = %self.path.display(),
            items = tree.len(),
            notifications = tree.notifications().len(),
            "resolved catalog"
        );

        Ok(tree)
    }

    fn filter_items(&self, items: Vec<CatalogItem>) -> Vec<CatalogItem> {
        let keep_unknown = self.configuration.keep_unknown_items;
        items
            .into_iter()
            .filter(|item| {
                if is_workspace(&item.type_id) {
                    debug!(path = %item.path, "skipping workspace item");
                    return false;
                }
                keep_unknown || type_label(&item.type_id).is_some()
            })
            .collect()
    }

    fn resolve_items(&self, items: Vec<CatalogItem>) -> Vec<(ClassifiedItem, Vec<String>)> {
        let parse_metadata = self.configuration.parse_metadata;
        let resolve = move |item: CatalogItem| {
            let kind = classify(&item.type_id);
            let label = type_label(&item.type_id);
            let parsed = if parse_metadata {
                parse_definition(item.definition.as_deref(), kind)
            } else {
                ParsedMetadata::default()
            };
            (ClassifiedItem::new(item, kind, label, parsed.metadata), parsed.warnings)
        };

        if self.configuration.parallel_metadata {
            items.into_par_iter().map(resolve).collect()
        } else {
            items.into_iter().map(resolve).collect()
        }
    }

    /// Record a notification.
    fn notify(&mut self, message: impl Into<String>, notification_type: NotificationType, subject: &str) {
        self.notifications
            .push(Notification::new(notification_type, message).with_subject(subject));
    }
}

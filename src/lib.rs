//! # fgdb-tools-rs
//!
//! Resolves the catalog of an Esri File Geodatabase directory into a
//! navigable tree of feature datasets, feature classes, tables and raster
//! datasets, without any vendor library.
//!
//! ## Example
//!
//! ```rust,ignore
//! let tree = fgdb_tools_rs::resolve_catalog("parcels.gdb")?;
//! for name in tree.child_names(None) {
//!     println!("{}", name);
//! }
//! for note in tree.notifications() {
//!     eprintln!("{}", note);
//! }
//! ```

pub mod error;
pub mod io;
pub mod notification;
pub mod types;

pub use error::{CatalogError, Result};
pub use io::gdb::catalog::{
    CatalogItem, ClassifiedItem, ItemFlags, ItemId, ItemMetadata, ItemTree, MetadataField,
};
pub use io::{GdbReader, GdbReaderConfiguration};
pub use notification::{Notification, NotificationType};
pub use types::{Extent, FieldType, GeometryType, Kind, Value};

use std::path::Path;

/// Resolve the catalog of the geodatabase at `path` with default settings.
///
/// Fails with [`CatalogError::CatalogNotFound`] when `path` is not a
/// geodatabase directory and with [`CatalogError::Format`] when one of its
/// system tables is unreadable. Recoverable problems are listed in
/// [`ItemTree::notifications`].
pub fn resolve_catalog(path: impl AsRef<Path>) -> Result<ItemTree> {
    resolve_catalog_with(path, &GdbReaderConfiguration::default())
}

/// Resolve the catalog of the geodatabase at `path` with `configuration`.
pub fn resolve_catalog_with(
    path: impl AsRef<Path>,
    configuration: &GdbReaderConfiguration,
) -> Result<ItemTree> {
    GdbReader::new(path, configuration.clone()).read()
}

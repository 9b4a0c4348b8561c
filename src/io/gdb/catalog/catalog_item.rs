//! Catalog items as read from `GDB_Items`, and their classified form.

use bitflags::bitflags;
use uuid::Uuid;

use crate::types::{Extent, FieldType, GeometryType, Kind};

/// One row of the items table, as stored.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogItem {
    /// `None` when the row carries no readable identifier
    pub uuid: Option<Uuid>,
    pub type_id: Uuid,
    pub name: String,
    pub physical_name: Option<String>,
    /// Catalog path, e.g. `\Transportation\Roads`
    pub path: String,
    /// Raw XML definition
    pub definition: Option<Vec<u8>>,
    /// Raw XML documentation
    pub documentation: Option<Vec<u8>>,
}

/// A field listed in an item definition.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataField {
    pub name: String,
    /// `None` when the definition uses a type outside the record vocabulary
    pub field_type: Option<FieldType>,
    /// Type as written in the definition (e.g. `esriFieldTypeString`)
    pub type_name: String,
}

/// Structural facts extracted from an item definition.
///
/// Every field is optional and present only when the definition holds it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemMetadata {
    /// Local name of the definition's root element (e.g. `DEFeatureClassInfo`)
    pub definition_root: Option<String>,
    /// Declared `DatasetType` (e.g. `esriDTFeatureClass`)
    pub dataset_type: Option<String>,
    pub geometry_type: Option<GeometryType>,
    /// Well-known id of the spatial reference
    pub spatial_reference: Option<i32>,
    pub fields: Option<Vec<MetadataField>>,
    pub extent: Option<Extent>,
    pub band_count: Option<u32>,
    pub pixel_type: Option<String>,
}

impl ItemMetadata {
    pub fn is_empty(&self) -> bool {
        *self == ItemMetadata::default()
    }

    /// Names of the listed fields, in definition order
    pub fn field_names(&self) -> Vec<&str> {
        self.fields
            .iter()
            .flatten()
            .map(|f| f.name.as_str())
            .collect()
    }
}

bitflags! {
    /// Structural flags raised while placing an item in the tree.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ItemFlags: u8 {
        /// Another item already claimed this name in the same container
        const AMBIGUOUS = 0x01;
        /// The catalog path implies a nesting the format does not allow
        const ANOMALOUS = 0x02;
    }
}

/// Index of an item in its [`ItemTree`](super::ItemTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub usize);

/// A catalog item with its resolved kind, metadata and placement.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedItem {
    pub item: CatalogItem,
    pub kind: Kind,
    /// Registry label of the type GUID, when registered
    pub type_label: Option<&'static str>,
    pub metadata: ItemMetadata,
    /// Containing feature dataset, `None` for the root container
    pub parent: Option<String>,
    pub flags: ItemFlags,
}

impl ClassifiedItem {
    pub fn new(item: CatalogItem, kind: Kind, type_label: Option<&'static str>, metadata: ItemMetadata) -> Self {
        Self {
            item,
            kind,
            type_label,
            metadata,
            parent: None,
            flags: ItemFlags::empty(),
        }
    }

    pub fn name(&self) -> &str {
        &self.item.name
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn catalog_path(&self) -> &str {
        &self.item.path
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn metadata(&self) -> &ItemMetadata {
        &self.metadata
    }

    pub fn is_ambiguous(&self) -> bool {
        self.flags.contains(ItemFlags::AMBIGUOUS)
    }

    pub fn is_anomalous(&self) -> bool {
        self.flags.contains(ItemFlags::ANOMALOUS)
    }
}

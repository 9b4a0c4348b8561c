//! Logical catalog: system tables, item classification, definitions and
//! the resulting item hierarchy.

pub mod catalog_item;
pub mod hierarchy_builder;
pub mod item_classifier;
pub mod item_tree;
pub mod items_table;
pub mod metadata_parser;
pub mod system_catalog;

pub use catalog_item::{CatalogItem, ClassifiedItem, ItemFlags, ItemId, ItemMetadata, MetadataField};
pub use hierarchy_builder::{path_segments, HierarchyBuilder};
pub use item_classifier::{classify, item_type, type_label, ItemType};
pub use item_tree::ItemTree;
pub use items_table::{read_items, ItemsColumns, ItemsRead};
pub use metadata_parser::{parse_definition, ParsedMetadata};
pub use system_catalog::{table_file_name, SystemCatalog, SystemCatalogEntry};
